pub mod error;
pub mod features;

// Convenience re-exports
pub use error::ExtractError;
pub use features::extractor::{extract, extract_file, extract_with_rng, try_extract};
pub use features::result::{FeatureResult, Features};
pub use features::stats::{ChannelStats, DominantChannel};
pub use features::theme::{ColorTheme, COLOR_THEME};
