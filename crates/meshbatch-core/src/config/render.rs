//! Preview renderer and contact-sheet configuration.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Preview renderer settings.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RenderConfig {
    /// Output image width in pixels.
    #[serde(default = "default_width")]
    #[validate(range(min = 1, max = 8192))]
    pub width: u32,
    /// Output image height in pixels.
    #[serde(default = "default_height")]
    #[validate(range(min = 1, max = 8192))]
    pub height: u32,
    /// Half the edge length of the fixed viewing cube centred on the origin.
    #[serde(default = "default_half_extent")]
    #[validate(range(exclusive_min = 0.0))]
    pub viewport_half_extent: f32,
    /// Background colour as RGB.
    #[serde(default = "default_background")]
    pub background: [u8; 3],
    /// Base mesh colour as RGB, modulated by flat shading.
    #[serde(default = "default_mesh_color")]
    pub mesh_color: [u8; 3],
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            viewport_half_extent: default_half_extent(),
            background: default_background(),
            mesh_color: default_mesh_color(),
        }
    }
}

/// How the compositor sizes its square grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridPolicy {
    /// `side = floor(sqrt(n))`. Images past `side²` are dropped.
    #[default]
    Floor,
    /// `side = ceil(sqrt(n))`. Every image gets a cell.
    Ceil,
}

impl GridPolicy {
    /// Grid side length for `count` images.
    pub fn side(self, count: usize) -> usize {
        let root = count.isqrt();
        match self {
            Self::Floor => root,
            Self::Ceil if root * root == count => root,
            Self::Ceil => root + 1,
        }
    }
}

impl std::str::FromStr for GridPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "floor" => Ok(Self::Floor),
            "ceil" => Ok(Self::Ceil),
            other => Err(format!("unknown grid policy '{other}' (expected floor or ceil)")),
        }
    }
}

/// Contact-sheet compositor settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactSheetConfig {
    /// TrueType font used for cell labels.
    #[serde(default = "default_font_path")]
    pub font_path: String,
    /// Label font size in pixels.
    #[serde(default = "default_font_size")]
    pub font_size: f32,
    /// Label offset from the cell's left edge.
    #[serde(default = "default_label_offset_x")]
    pub label_offset_x: i32,
    /// Label offset up from the cell's bottom edge.
    #[serde(default = "default_label_offset_y")]
    pub label_offset_y: i32,
    /// Grid sizing policy.
    #[serde(default)]
    pub grid_policy: GridPolicy,
    /// Whether to draw file-name labels at all.
    #[serde(default = "default_labels")]
    pub labels: bool,
}

impl Default for ContactSheetConfig {
    fn default() -> Self {
        Self {
            font_path: default_font_path(),
            font_size: default_font_size(),
            label_offset_x: default_label_offset_x(),
            label_offset_y: default_label_offset_y(),
            grid_policy: GridPolicy::default(),
            labels: default_labels(),
        }
    }
}

fn default_width() -> u32 {
    1024
}

fn default_height() -> u32 {
    768
}

fn default_half_extent() -> f32 {
    0.5
}

fn default_background() -> [u8; 3] {
    [255, 255, 255]
}

fn default_mesh_color() -> [u8; 3] {
    [200, 200, 210]
}

fn default_font_path() -> String {
    "arial.ttf".to_string()
}

fn default_font_size() -> f32 {
    16.0
}

fn default_label_offset_x() -> i32 {
    10
}

fn default_label_offset_y() -> i32 {
    30
}

fn default_labels() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floor_side() {
        assert_eq!(GridPolicy::Floor.side(0), 0);
        assert_eq!(GridPolicy::Floor.side(1), 1);
        assert_eq!(GridPolicy::Floor.side(4), 2);
        assert_eq!(GridPolicy::Floor.side(6), 2);
        assert_eq!(GridPolicy::Floor.side(9), 3);
    }

    #[test]
    fn test_ceil_side() {
        assert_eq!(GridPolicy::Ceil.side(0), 0);
        assert_eq!(GridPolicy::Ceil.side(4), 2);
        assert_eq!(GridPolicy::Ceil.side(5), 3);
        assert_eq!(GridPolicy::Ceil.side(6), 3);
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("FLOOR".parse::<GridPolicy>(), Ok(GridPolicy::Floor));
        assert_eq!("ceil".parse::<GridPolicy>(), Ok(GridPolicy::Ceil));
        assert!("round".parse::<GridPolicy>().is_err());
    }
}
