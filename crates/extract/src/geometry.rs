//! Output-size resolution for extracted frames.
//!
//! A quality tier anchors the long-edge pixel count; the secondary
//! dimension is derived from the measured aspect ratio of the source, so
//! no separate portrait/landscape resolution tables are needed.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Output-resolution class anchoring the long-edge pixel count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum QualityTier {
    /// 720p-class output (long edge 1280).
    Low,
    /// 1080p-class output (long edge 1920).
    #[default]
    High,
    /// 4K-class output (long edge 3840).
    Ultra,
}

impl QualityTier {
    /// Long-edge pixel count for this tier.
    pub fn long_edge(self) -> u32 {
        match self {
            QualityTier::Low => 1280,
            QualityTier::High => 1920,
            QualityTier::Ultra => 3840,
        }
    }

    /// Nominal 16:9 landscape size, used when the source cannot be probed.
    pub fn nominal(self) -> (u32, u32) {
        match self {
            QualityTier::Low => (1280, 720),
            QualityTier::High => (1920, 1080),
            QualityTier::Ultra => (3840, 2160),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            QualityTier::Low => "low",
            QualityTier::High => "high",
            QualityTier::Ultra => "ultra",
        }
    }
}

impl fmt::Display for QualityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QualityTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(QualityTier::Low),
            "high" => Ok(QualityTier::High),
            "ultra" => Ok(QualityTier::Ultra),
            other => Err(format!("Unknown quality tier: {other}. Use: low, high, ultra")),
        }
    }
}

/// Resolve the output pixel size for a source of the given dimensions.
///
/// Landscape sources pin the output width to the tier's long edge and derive
/// the height from the aspect ratio; portrait sources pin the output
/// *height* to the same long-edge constant and derive the width. Sources
/// that could not be probed fall back to the tier's nominal 16:9 size.
pub fn resolve_output_size(original: Option<(u32, u32)>, tier: QualityTier) -> (u32, u32) {
    let Some((width, height)) = original else {
        return tier.nominal();
    };
    if width == 0 || height == 0 {
        return tier.nominal();
    }

    let aspect = height as f64 / width as f64;
    if height > width {
        let out_h = tier.long_edge();
        let out_w = (out_h as f64 / aspect) as u32;
        (out_w.max(1), out_h)
    } else {
        let out_w = tier.long_edge();
        let out_h = (out_w as f64 * aspect) as u32;
        (out_w, out_h.max(1))
    }
}
