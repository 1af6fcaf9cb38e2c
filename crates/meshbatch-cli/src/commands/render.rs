//! Preview and contact-sheet CLI commands.

use std::path::PathBuf;

use clap::Args;

use crate::output::{self, OutputFormat};
use meshbatch_core::config::render::GridPolicy;
use meshbatch_core::error::AppError;
use meshbatch_render::{ContactSheet, PreviewRenderer};

/// Arguments for `render`
#[derive(Debug, Args)]
pub struct RenderArgs {
    /// STL mesh
    pub mesh: PathBuf,
    /// PNG to write
    pub image: PathBuf,
    /// Image width (defaults to `render.width`)
    #[arg(long)]
    pub width: Option<u32>,
    /// Image height (defaults to `render.height`)
    #[arg(long)]
    pub height: Option<u32>,
}

/// Arguments for `sheet`
#[derive(Debug, Args)]
pub struct SheetArgs {
    /// PNG to write
    pub output: PathBuf,
    /// Images to tile, in order
    #[arg(required = true)]
    pub images: Vec<PathBuf>,
    /// Grid policy: floor or ceil (defaults to `contact_sheet.grid_policy`)
    #[arg(short, long)]
    pub policy: Option<GridPolicy>,
    /// Skip file-name labels
    #[arg(long)]
    pub no_labels: bool,
}

/// Execute `render`
pub async fn render(args: &RenderArgs, env: &str) -> Result<(), AppError> {
    let config = super::load_config(env)?;
    let mut render_config = config.render.clone();
    if let Some(width) = args.width {
        render_config.width = width;
    }
    if let Some(height) = args.height {
        render_config.height = height;
    }

    PreviewRenderer::new(render_config)
        .render(&args.mesh, &args.image)
        .await?;

    output::print_success(&format!("Preview written to {}", args.image.display()));
    Ok(())
}

/// Execute `sheet`
pub async fn sheet(args: &SheetArgs, env: &str, format: OutputFormat) -> Result<(), AppError> {
    let config = super::load_config(env)?;
    let mut sheet_config = config.contact_sheet.clone();
    if let Some(policy) = args.policy {
        sheet_config.grid_policy = policy;
    }
    if args.no_labels {
        sheet_config.labels = false;
    }

    let summary = ContactSheet::from_config(&sheet_config)
        .compose(&args.images, &args.output)
        .await?;

    match format {
        OutputFormat::Table => {
            output::print_success(&format!("Contact sheet written to {}", args.output.display()));
            output::print_kv("Grid", &format!("{0}x{0}", summary.side));
            output::print_kv("Size", &format!("{}x{}", summary.width, summary.height));
            output::print_kv("Placed", &summary.placed.to_string());
            if summary.dropped > 0 {
                output::print_warning(&format!(
                    "{} image(s) did not fit the grid; use --policy ceil to keep them",
                    summary.dropped
                ));
            }
        }
        OutputFormat::Json => output::print_item(&summary, format),
    }
    Ok(())
}
