//! Engine configuration exposed to the host UI.

use serde::{Deserialize, Serialize};

/// Fixed canvas page presets. Arbitrary sizes are not supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PageSize {
    #[default]
    Portrait,
    Landscape,
}

impl PageSize {
    /// Raster dimensions in pixels, (width, height).
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            PageSize::Portrait => (850, 1100),
            PageSize::Landscape => (1100, 850),
        }
    }

    pub fn width(&self) -> u32 {
        self.dimensions().0
    }

    pub fn height(&self) -> u32 {
        self.dimensions().1
    }
}

/// Host-settable toggles for one canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasConfig {
    /// Enables the silent debounced recognition pipeline.
    pub auto_convert: bool,
    /// Enables post-stroke smoothing on pen stroke completion.
    pub stroke_smoothing: bool,
    /// Page preset for the raster surface.
    pub page: PageSize,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            auto_convert: true,
            stroke_smoothing: true,
            page: PageSize::default(),
        }
    }
}
