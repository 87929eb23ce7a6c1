use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::surface::CursorStyle;

/// Tunables for [`PickingRouter`](crate::PickingRouter).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Cursor while a connected object is under the pointer.
    pub hover_cursor: CursorStyle,
    /// Cursor everywhere else.
    pub idle_cursor: CursorStyle,
    /// NDC depth of the point unprojected to aim the picking ray.
    pub ndc_depth: f32,
    /// Whether the intersection provider should descend into children.
    pub recursive: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            hover_cursor: CursorStyle::Pointer,
            idle_cursor: CursorStyle::Inherit,
            ndc_depth: 0.5,
            recursive: true,
        }
    }
}

impl RouterConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("invalid router configuration")
    }

    /// Loads configuration from `path`, falling back to defaults on errors.
    pub fn load_from_path(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match Self::from_toml_str(&contents) {
                Ok(config) => config,
                Err(err) => {
                    warn!(
                        "Failed to parse {}: {err:#}. Using defaults",
                        path.display()
                    );
                    Self::default()
                }
            },
            Err(err) => {
                warn!("Failed to read {}: {err}. Using defaults", path.display());
                Self::default()
            }
        }
    }
}
