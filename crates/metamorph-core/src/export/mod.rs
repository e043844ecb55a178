use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod raster;
pub mod svg;

pub use raster::{PendingExport, RasterExporter};
pub use svg::render_svg;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    Svg,
    Png,
}

impl ExportFormat {
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Svg => "visualization.svg",
            Self::Png => "visualization.png",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            Self::Svg => "image/svg+xml",
            Self::Png => "image/png",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExportError {
    #[error("an export is already in progress")]
    Busy,
    #[error("canvas size {width}x{height} cannot be rasterized")]
    Canvas { width: u32, height: u32 },
    #[error("failed to decode vector scene: {0}")]
    Decode(String),
    #[error("failed to encode image: {0}")]
    Encode(String),
    #[error("export ended without a result")]
    Cancelled,
}
