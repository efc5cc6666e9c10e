//! Image → feature pipeline.
//!
//! Decodes bytes (PNG/JPEG/BMP/GIF), forces three 8-bit colour channels,
//! resizes to a fixed `TARGET_SIZE × TARGET_SIZE` grid and summarizes each
//! channel. The public entry points never fail: any error along the way is
//! logged and replaced by [`FeatureResult::fallback`].
use std::path::Path;

use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbImage};
use rand::Rng;
use tracing::{debug, warn};

use crate::error::ExtractError;
use crate::features::result::FeatureResult;
use crate::features::stats::ChannelStats;

/// Width and height every image is resized to before analysis.
pub const TARGET_SIZE: u32 = 224;

/// Converts to RGB8 (dropping alpha, expanding grayscale) and resizes, without
/// cropping, to exactly `TARGET_SIZE × TARGET_SIZE` with a bicubic filter.
pub fn prepare_image(image: &DynamicImage) -> RgbImage {
    let rgb = image.to_rgb8();
    imageops::resize(&rgb, TARGET_SIZE, TARGET_SIZE, FilterType::CatmullRom)
}

/// Success path only: decode, normalize and compute the full result.
pub fn try_extract(bytes: &[u8]) -> Result<FeatureResult, ExtractError> {
    let decoded = image::load_from_memory(bytes)?;
    let prepared = prepare_image(&decoded);
    let stats = ChannelStats::from_rgb(&prepared)?;
    Ok(FeatureResult::from_stats(&stats))
}

/// Extracts features from `bytes`, drawing fallback coordinates from `rng`
/// if the image cannot be analysed.
pub fn extract_with_rng<R: Rng>(bytes: &[u8], rng: &mut R) -> FeatureResult {
    settle(try_extract(bytes), rng)
}

/// Extracts features from `bytes` using the thread-local RNG for the fallback.
pub fn extract(bytes: &[u8]) -> FeatureResult {
    extract_with_rng(bytes, &mut rand::thread_rng())
}

/// Reads the image at `path` and extracts its features. An unreadable file
/// is treated like an undecodable one.
pub fn extract_file<R: Rng>(path: &Path, rng: &mut R) -> FeatureResult {
    let outcome = std::fs::read(path)
        .map_err(ExtractError::from)
        .and_then(|bytes| try_extract(&bytes));
    settle(outcome, rng)
}

fn settle<R: Rng>(outcome: Result<FeatureResult, ExtractError>, rng: &mut R) -> FeatureResult {
    match outcome {
        Ok(result) => {
            debug!(coordinates = ?result.coordinates, "features extracted");
            result
        }
        Err(e) => {
            warn!(error = %e, "feature extraction failed, using random coordinates");
            FeatureResult::fallback(rng)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::result::Features;
    use crate::features::stats::DominantChannel;
    use image::{ImageBuffer, ImageOutputFormat, Luma, Rgb, Rgba};
    use rand::{rngs::StdRng, SeedableRng};
    use std::io::Cursor;

    // Resampling may shift a channel by one intensity step.
    const EPS: f64 = 0.05;

    fn encode(image: DynamicImage, format: ImageOutputFormat) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        image.write_to(&mut cursor, format).unwrap();
        cursor.into_inner()
    }

    fn solid_png(w: u32, h: u32, px: [u8; 3]) -> Vec<u8> {
        let buf: RgbImage = ImageBuffer::from_pixel(w, h, Rgb(px));
        encode(DynamicImage::ImageRgb8(buf), ImageOutputFormat::Png)
    }

    fn gradient_png(w: u32, h: u32) -> Vec<u8> {
        let buf: RgbImage = ImageBuffer::from_fn(w, h, |x, y| {
            Rgb([(x * 255 / w.max(1)) as u8, (y * 255 / h.max(1)) as u8, 90])
        });
        encode(DynamicImage::ImageRgb8(buf), ImageOutputFormat::Png)
    }

    fn extracted(result: &FeatureResult) -> &crate::features::result::ImageFeatures {
        match &result.features {
            Features::Extracted(f) => f,
            Features::Failed { error } => panic!("unexpected fallback: {error}"),
        }
    }

    #[test]
    fn mid_gray_has_only_the_texture_offset() {
        let result = try_extract(&solid_png(50, 80, [128, 128, 128])).unwrap();
        let f = extracted(&result);
        let mean = 128.0 / 255.0;
        let expected = (mean - 0.5) * 8.0 - 1.0;
        for v in result.coordinates {
            assert!((v - expected).abs() < EPS, "{v} != {expected}");
        }
        assert!(f.contrast.abs() < EPS);
        assert_eq!(f.dominant_color, DominantChannel::Red);
    }

    #[test]
    fn pure_red_maps_to_three_minus_five_minus_five() {
        let result = try_extract(&solid_png(10, 10, [255, 0, 0])).unwrap();
        let f = extracted(&result);
        assert!((f.mean_colors.r - 1.0).abs() < EPS);
        assert!(f.mean_colors.g.abs() < EPS);
        assert!(f.mean_colors.b.abs() < EPS);
        let [x, y, z] = result.coordinates;
        assert!((x - 3.0).abs() < EPS);
        assert!((y + 5.0).abs() < EPS);
        assert!((z + 5.0).abs() < EPS);
        assert_eq!(f.dominant_color, DominantChannel::Red);
        assert!((f.brightness - 1.0 / 3.0).abs() < EPS);
    }

    #[test]
    fn same_bytes_give_identical_results() {
        let bytes = gradient_png(317, 129);
        let mut rng = StdRng::seed_from_u64(0);
        let a = extract_with_rng(&bytes, &mut rng);
        let b = extract_with_rng(&bytes, &mut rng);
        assert!(!a.is_fallback());
        assert_eq!(a, b);
    }

    #[test]
    fn any_input_size_is_resized_to_the_target_grid() {
        for (w, h) in [(1, 1), (500, 30), (224, 224), (13, 900)] {
            let img = DynamicImage::ImageRgb8(ImageBuffer::from_pixel(w, h, Rgb([1, 2, 3])));
            let prepared = prepare_image(&img);
            assert_eq!(prepared.dimensions(), (TARGET_SIZE, TARGET_SIZE));
        }
    }

    #[test]
    fn grayscale_input_is_expanded_to_three_channels() {
        let gray = ImageBuffer::from_pixel(40, 40, Luma([100u8]));
        let bytes = encode(DynamicImage::ImageLuma8(gray), ImageOutputFormat::Png);
        let result = try_extract(&bytes).unwrap();
        let m = extracted(&result).mean_colors;
        for v in [m.r, m.g, m.b] {
            assert!((v - 100.0 / 255.0).abs() < EPS);
        }
    }

    #[test]
    fn alpha_channel_is_discarded() {
        let rgba = ImageBuffer::from_pixel(16, 16, Rgba([0u8, 0, 255, 0]));
        let bytes = encode(DynamicImage::ImageRgba8(rgba), ImageOutputFormat::Png);
        let result = try_extract(&bytes).unwrap();
        assert_eq!(extracted(&result).dominant_color, DominantChannel::Blue);
    }

    #[test]
    fn bmp_input_is_supported() {
        let buf: RgbImage = ImageBuffer::from_pixel(9, 7, Rgb([0, 255, 0]));
        let bytes = encode(DynamicImage::ImageRgb8(buf), ImageOutputFormat::Bmp);
        let result = try_extract(&bytes).unwrap();
        assert_eq!(extracted(&result).dominant_color, DominantChannel::Green);
    }

    #[test]
    fn corrupt_bytes_fall_back() {
        assert!(matches!(try_extract(b"definitely not an image"), Err(ExtractError::Decode(_))));

        let mut rng = StdRng::seed_from_u64(11);
        let result = extract_with_rng(b"definitely not an image", &mut rng);
        assert!(result.is_fallback());
        assert!(result.coordinates.iter().all(|v| (-5.0..=5.0).contains(v)));

        let again = extract_with_rng(b"definitely not an image", &mut StdRng::seed_from_u64(11));
        assert_eq!(result, again);
    }

    #[test]
    fn empty_input_falls_back() {
        assert!(extract(&[]).is_fallback());
    }

    #[test]
    fn unreadable_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.png");
        let result = extract_file(&missing, &mut StdRng::seed_from_u64(5));
        assert!(result.is_fallback());
    }

    #[test]
    fn file_on_disk_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("red.png");
        std::fs::write(&path, solid_png(4, 4, [255, 0, 0])).unwrap();
        let result = extract_file(&path, &mut StdRng::seed_from_u64(5));
        assert!(!result.is_fallback());
        assert!((result.coordinates[0] - 3.0).abs() < EPS);
    }
}
