pub mod extractor;
pub mod result;
pub mod stats;
pub mod theme;

pub use extractor::{extract, extract_file, extract_with_rng, prepare_image, try_extract, TARGET_SIZE};
pub use result::{EducationalInfo, Explanation, FeatureResult, Features, ImageFeatures};
pub use stats::{ChannelStats, DominantChannel, Rgb};
pub use theme::{ColorTheme, COLOR_THEME};
