//! Contact-sheet compositing.
//!
//! Tiles a batch of images row-major into a square grid whose cells are as
//! large as the largest input, then labels each cell with its file name.
//! Unused cells stay black.

use std::path::{Path, PathBuf};

use ab_glyph::{FontVec, PxScale};
use image::{DynamicImage, Rgb, RgbImage};
use serde::Serialize;

use meshbatch_core::config::render::{ContactSheetConfig, GridPolicy};
use meshbatch_core::error::{AppError, ErrorKind};
use meshbatch_core::result::AppResult;

/// How cell labels are drawn.
#[derive(Debug, Clone)]
pub struct LabelStyle {
    /// TrueType font file.
    pub font_path: PathBuf,
    /// Font size in pixels.
    pub size: f32,
    /// Offset from the cell's left edge.
    pub offset_x: i32,
    /// Offset up from the cell's bottom edge.
    pub offset_y: i32,
}

impl LabelStyle {
    fn load_font(&self) -> AppResult<FontVec> {
        let data = std::fs::read(&self.font_path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::not_found(format!("Font not found: {}", self.font_path.display()))
            } else {
                AppError::from(e)
            }
        })?;

        FontVec::try_from_vec(data).map_err(|e| {
            AppError::with_source(
                ErrorKind::Render,
                format!("Invalid font {}", self.font_path.display()),
                e,
            )
        })
    }
}

/// Loaded inputs plus the computed grid geometry.
#[derive(Debug)]
pub struct ImageGrid {
    /// Images in input order, with the path they were read from.
    pub images: Vec<(PathBuf, DynamicImage)>,
    /// Widest input.
    pub cell_width: u32,
    /// Tallest input.
    pub cell_height: u32,
    /// Cells per row and per column.
    pub side: u32,
}

impl ImageGrid {
    /// Read every input and size the grid under `policy`.
    pub fn load(paths: &[PathBuf], policy: GridPolicy) -> AppResult<Self> {
        if paths.is_empty() {
            return Err(AppError::validation("Contact sheet needs at least one image"));
        }

        let images = paths
            .iter()
            .map(|path| Ok((path.clone(), open_image(path)?)))
            .collect::<AppResult<Vec<_>>>()?;

        let cell_width = images.iter().map(|(_, img)| img.width()).max().unwrap_or(0);
        let cell_height = images.iter().map(|(_, img)| img.height()).max().unwrap_or(0);
        let side = policy.side(images.len()) as u32;

        Ok(Self {
            images,
            cell_width,
            cell_height,
            side,
        })
    }

    /// Number of cells in the grid.
    pub fn capacity(&self) -> usize {
        (self.side as usize) * (self.side as usize)
    }

    /// Top-left pixel of cell `index`, row-major.
    pub fn cell_origin(&self, index: usize) -> (u32, u32) {
        let side = self.side.max(1) as usize;
        let col = (index % side) as u32;
        let row = (index / side) as u32;
        (col * self.cell_width, row * self.cell_height)
    }
}

fn open_image(path: &Path) -> AppResult<DynamicImage> {
    if !path.exists() {
        return Err(AppError::not_found(format!(
            "Image not found: {}",
            path.display()
        )));
    }
    image::open(path).map_err(|e| {
        AppError::with_source(
            ErrorKind::Render,
            format!("Failed to read image {}", path.display()),
            e,
        )
    })
}

/// Result of composing a sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetSummary {
    /// Where the sheet was written; `None` when composed in memory.
    pub output: Option<PathBuf>,
    /// Cells per row and per column.
    pub side: u32,
    /// Cell width in pixels.
    pub cell_width: u32,
    /// Cell height in pixels.
    pub cell_height: u32,
    /// Sheet width in pixels.
    pub width: u32,
    /// Sheet height in pixels.
    pub height: u32,
    /// Images drawn onto the sheet.
    pub placed: usize,
    /// Images that did not fit the grid.
    pub dropped: usize,
}

/// Composes labelled image grids.
#[derive(Debug, Clone)]
pub struct ContactSheet {
    policy: GridPolicy,
    label: Option<LabelStyle>,
}

impl ContactSheet {
    /// Create a compositor. `label: None` disables captions.
    pub fn new(policy: GridPolicy, label: Option<LabelStyle>) -> Self {
        Self { policy, label }
    }

    /// Build a compositor from configuration.
    pub fn from_config(config: &ContactSheetConfig) -> Self {
        let label = config.labels.then(|| LabelStyle {
            font_path: PathBuf::from(&config.font_path),
            size: config.font_size,
            offset_x: config.label_offset_x,
            offset_y: config.label_offset_y,
        });
        Self::new(config.grid_policy, label)
    }

    /// Grid policy in effect.
    pub fn policy(&self) -> GridPolicy {
        self.policy
    }

    /// Compose `inputs` and save the sheet to `output`.
    pub async fn compose(&self, inputs: &[PathBuf], output: &Path) -> AppResult<SheetSummary> {
        let sheet = self.clone();
        let inputs = inputs.to_vec();
        let output = output.to_path_buf();

        tokio::task::spawn_blocking(move || sheet.compose_blocking(&inputs, &output))
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Internal, "Contact sheet task panicked", e)
            })?
    }

    /// Synchronous body of [`ContactSheet::compose`].
    pub fn compose_blocking(&self, inputs: &[PathBuf], output: &Path) -> AppResult<SheetSummary> {
        let (canvas, mut summary) = self.compose_image(inputs)?;

        if let Some(parent) = output.parent() {
            std::fs::create_dir_all(parent)?;
        }
        canvas.save(output).map_err(|e| {
            AppError::with_source(
                ErrorKind::Render,
                format!("Failed to save contact sheet {}", output.display()),
                e,
            )
        })?;

        summary.output = Some(output.to_path_buf());
        tracing::info!(
            output = %output.display(),
            side = summary.side,
            placed = summary.placed,
            "Saved contact sheet"
        );
        Ok(summary)
    }

    /// Compose `inputs` into an in-memory sheet.
    pub fn compose_image(&self, inputs: &[PathBuf]) -> AppResult<(RgbImage, SheetSummary)> {
        let font = self
            .label
            .as_ref()
            .map(|style| style.load_font().map(|font| (style, font)))
            .transpose()?;

        let grid = ImageGrid::load(inputs, self.policy)?;
        let width = grid.side * grid.cell_width;
        let height = grid.side * grid.cell_height;
        let mut canvas = RgbImage::new(width, height);

        let placed = grid.images.len().min(grid.capacity());
        let dropped = grid.images.len() - placed;
        if dropped > 0 {
            tracing::warn!(
                total = grid.images.len(),
                side = grid.side,
                dropped,
                "Grid too small for all images; trailing images dropped"
            );
        }

        for (index, (path, img)) in grid.images.iter().take(placed).enumerate() {
            let (x, y) = grid.cell_origin(index);
            image::imageops::overlay(&mut canvas, &img.to_rgb8(), i64::from(x), i64::from(y));

            if let Some((style, font)) = &font {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();
                imageproc::drawing::draw_text_mut(
                    &mut canvas,
                    Rgb([0, 0, 0]),
                    x as i32 + style.offset_x,
                    (y + grid.cell_height) as i32 - style.offset_y,
                    PxScale::from(style.size),
                    font,
                    &name,
                );
            }
        }

        let summary = SheetSummary {
            output: None,
            side: grid.side,
            cell_width: grid.cell_width,
            cell_height: grid.cell_height,
            width,
            height,
            placed,
            dropped,
        };
        Ok((canvas, summary))
    }
}
