//! Fixed-viewport preview rendering.
//!
//! The camera is an isometric orthographic view whose frame is the cube
//! `[-h, h]³` regardless of the mesh's own bounds, so previews of different
//! parts share one scale. Geometry outside the cube's projection is clipped.

use std::path::Path;

use image::{Rgb, RgbImage};

use meshbatch_core::config::render::RenderConfig;
use meshbatch_core::error::{AppError, ErrorKind};
use meshbatch_core::result::AppResult;

use crate::mesh::TriangleMesh;

/// Ambient term of the flat shading.
const AMBIENT: f32 = 0.25;

type Vec3 = [f32; 3];

fn dot(a: Vec3, b: Vec3) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn cross(a: Vec3, b: Vec3) -> Vec3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn sub(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn normalize(v: Vec3) -> Option<Vec3> {
    let len = dot(v, v).sqrt();
    (len > f32::EPSILON).then(|| [v[0] / len, v[1] / len, v[2] / len])
}

/// Orthographic camera mapping model space to pixel space.
#[derive(Debug, Clone, Copy)]
struct Camera {
    right: Vec3,
    up: Vec3,
    /// Points away from the viewer; larger depth is farther.
    forward: Vec3,
    scale: f32,
    center_x: f32,
    center_y: f32,
}

impl Camera {
    /// Isometric camera framing the cube `[-half_extent, half_extent]³`.
    fn isometric(width: u32, height: u32, half_extent: f32) -> Self {
        let forward = [-1.0 / 3f32.sqrt(); 3];
        let right = [-1.0 / 2f32.sqrt(), 1.0 / 2f32.sqrt(), 0.0];
        let up = cross(right, forward);

        // Projected half-widths of the cube along each screen axis.
        let extent_x = half_extent * right.iter().map(|c| c.abs()).sum::<f32>();
        let extent_y = half_extent * up.iter().map(|c| c.abs()).sum::<f32>();
        let scale = (width as f32 / (2.0 * extent_x)).min(height as f32 / (2.0 * extent_y));

        Self {
            right,
            up,
            forward,
            scale,
            center_x: width as f32 / 2.0,
            center_y: height as f32 / 2.0,
        }
    }

    /// Project to `(pixel_x, pixel_y, depth)`.
    fn project(&self, p: Vec3) -> Vec3 {
        [
            self.center_x + dot(p, self.right) * self.scale,
            self.center_y - dot(p, self.up) * self.scale,
            dot(p, self.forward),
        ]
    }
}

/// Renders STL meshes to PNG previews.
#[derive(Debug, Clone)]
pub struct PreviewRenderer {
    config: RenderConfig,
}

impl PreviewRenderer {
    /// Create a renderer with the given settings.
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Load `mesh_path`, render it, and write the image to `image_path`.
    pub async fn render(&self, mesh_path: &Path, image_path: &Path) -> AppResult<()> {
        let renderer = self.clone();
        let mesh_path = mesh_path.to_path_buf();
        let image_path = image_path.to_path_buf();

        tokio::task::spawn_blocking(move || renderer.render_blocking(&mesh_path, &image_path))
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Internal, "Render task panicked", e))?
    }

    /// Synchronous body of [`PreviewRenderer::render`].
    pub fn render_blocking(&self, mesh_path: &Path, image_path: &Path) -> AppResult<()> {
        let mesh = TriangleMesh::load_stl(mesh_path)?;
        let image = self.rasterize(&mesh);

        if let Some(parent) = image_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        image.save(image_path).map_err(|e| {
            AppError::with_source(
                ErrorKind::Render,
                format!("Failed to save preview {}", image_path.display()),
                e,
            )
        })?;

        tracing::info!(
            mesh = %mesh_path.display(),
            image = %image_path.display(),
            triangles = mesh.len(),
            "Rendered preview"
        );
        Ok(())
    }

    /// Rasterize `mesh` with flat shading and a depth buffer.
    pub fn rasterize(&self, mesh: &TriangleMesh) -> RgbImage {
        let (width, height) = (self.config.width, self.config.height);
        let camera = Camera::isometric(width, height, self.config.viewport_half_extent);
        let mut image = RgbImage::from_pixel(width, height, Rgb(self.config.background));
        let mut depth = vec![f32::INFINITY; (width as usize) * (height as usize)];

        let toward_viewer = camera.forward.map(|c| -c);

        for tri in &mesh.triangles {
            let Some(normal) = normalize(cross(sub(tri[1], tri[0]), sub(tri[2], tri[0]))) else {
                continue;
            };
            // Two-sided: STL winding is not trustworthy.
            let intensity = AMBIENT + (1.0 - AMBIENT) * dot(normal, toward_viewer).abs();
            let color = Rgb(self
                .config
                .mesh_color
                .map(|c| (c as f32 * intensity).round().clamp(0.0, 255.0) as u8));

            let projected = tri.map(|p| camera.project(p));
            Self::fill_triangle(&mut image, &mut depth, projected, color);
        }

        image
    }

    fn fill_triangle(image: &mut RgbImage, depth: &mut [f32], tri: [Vec3; 3], color: Rgb<u8>) {
        let (width, height) = image.dimensions();
        let [a, b, c] = tri;

        let area = (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0]);
        if area.abs() < f32::EPSILON {
            return;
        }

        let min_x = a[0].min(b[0]).min(c[0]).floor().max(0.0);
        let max_x = a[0].max(b[0]).max(c[0]).ceil().min(width as f32 - 1.0);
        let min_y = a[1].min(b[1]).min(c[1]).floor().max(0.0);
        let max_y = a[1].max(b[1]).max(c[1]).ceil().min(height as f32 - 1.0);
        if min_x > max_x || min_y > max_y {
            return;
        }

        for y in min_y as u32..=max_y as u32 {
            for x in min_x as u32..=max_x as u32 {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                let w0 = ((b[0] - px) * (c[1] - py) - (b[1] - py) * (c[0] - px)) / area;
                let w1 = ((c[0] - px) * (a[1] - py) - (c[1] - py) * (a[0] - px)) / area;
                let w2 = 1.0 - w0 - w1;
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                let z = w0 * a[2] + w1 * b[2] + w2 * c[2];
                let idx = y as usize * width as usize + x as usize;
                if z < depth[idx] {
                    depth[idx] = z;
                    image.put_pixel(x, y, color);
                }
            }
        }
    }
}
