use rand::Rng;
use serde::Serialize;

use crate::features::stats::{ChannelStats, DominantChannel, Rgb};
use crate::features::theme::{ColorTheme, COLOR_THEME};

pub const FALLBACK_ERROR: &str = "Could not extract features";

const CNN_CONNECTION: &str =
    "Real CNNs extract thousands of features like edges, textures, and shapes - not just colors!";

/// Half-width of the interval fallback coordinates are drawn from.
pub const FALLBACK_RANGE: f64 = 5.0;

/// Statistics reported for a successfully analysed image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageFeatures {
    pub mean_colors: Rgb<f64>,
    pub texture: Rgb<f64>,
    pub brightness: f64,
    pub contrast: f64,
    pub dominant_color: DominantChannel,
}

/// Either the extracted statistics or an error marker in their place.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Features {
    Extracted(ImageFeatures),
    Failed { error: &'static str },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EducationalInfo {
    pub explanation: String,
    pub position_meaning: String,
    pub cnn_connection: &'static str,
}

/// Text shown next to the plotted point. Serializes as `{}` when absent so
/// both result shapes expose the same keys.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Explanation {
    Detailed(EducationalInfo),
    Empty {},
}

/// Everything the visualizer needs to plot and describe one image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureResult {
    pub coordinates: [f64; 3],
    pub features: Features,
    pub educational_info: Explanation,
    pub color_theme: &'static ColorTheme,
}

impl FeatureResult {
    /// Builds the full result from channel statistics.
    pub fn from_stats(stats: &ChannelStats) -> FeatureResult {
        let coordinates = stats.coordinates();
        let [x, y, z] = coordinates;
        let mean = stats.mean;

        let info = EducationalInfo {
            explanation: format!(
                "This image has {:.1}% red, {:.1}% green, and {:.1}% blue content.",
                mean.r * 100.0,
                mean.g * 100.0,
                mean.b * 100.0
            ),
            position_meaning: format!(
                "Position ({:.1}, {:.1}, {:.1}) represents color intensity in 3D space.",
                x, y, z
            ),
            cnn_connection: CNN_CONNECTION,
        };

        FeatureResult {
            coordinates,
            features: Features::Extracted(ImageFeatures {
                mean_colors: stats.mean,
                texture: stats.std,
                brightness: stats.brightness(),
                contrast: stats.contrast(),
                dominant_color: stats.dominant(),
            }),
            educational_info: Explanation::Detailed(info),
            color_theme: &COLOR_THEME,
        }
    }

    /// Placeholder returned when an image cannot be analysed: a random point
    /// in `[-5, 5]` on each axis and an error marker instead of statistics.
    pub fn fallback<R: Rng>(rng: &mut R) -> FeatureResult {
        let mut coord = || rng.gen_range(-FALLBACK_RANGE..=FALLBACK_RANGE);
        FeatureResult {
            coordinates: [coord(), coord(), coord()],
            features: Features::Failed { error: FALLBACK_ERROR },
            educational_info: Explanation::Empty {},
            color_theme: &COLOR_THEME,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self.features, Features::Failed { .. })
    }
}
