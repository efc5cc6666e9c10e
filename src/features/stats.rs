use image::RgbImage;
use serde::Serialize;

use crate::error::ExtractError;

/// One value per colour channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rgb<T> {
    pub r: T,
    pub g: T,
    pub b: T,
}

impl<T: Copy> Rgb<T> {
    /// Channels in Red, Green, Blue order.
    pub fn to_array(self) -> [T; 3] {
        [self.r, self.g, self.b]
    }
}

/// The colour channel with the highest mean intensity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DominantChannel {
    Red,
    Green,
    Blue,
}

impl DominantChannel {
    const ORDER: [DominantChannel; 3] = [
        DominantChannel::Red,
        DominantChannel::Green,
        DominantChannel::Blue,
    ];
}

/// Per-channel mean and population standard deviation, both scaled to [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelStats {
    pub mean: Rgb<f64>,
    pub std: Rgb<f64>,
}

impl ChannelStats {
    /// Computes the statistics over every pixel of `image`.
    ///
    /// Uses two passes (mean, then squared deviations) so the variance does
    /// not suffer from cancellation on near-uniform images.
    pub fn from_rgb(image: &RgbImage) -> Result<ChannelStats, ExtractError> {
        let count = image.width() as usize * image.height() as usize;
        if count == 0 {
            return Err(ExtractError::EmptyImage);
        }
        let n = count as f64;

        let mut sums = [0.0f64; 3];
        for pixel in image.pixels() {
            for (c, sum) in sums.iter_mut().enumerate() {
                *sum += pixel.0[c] as f64;
            }
        }
        let means = sums.map(|s| s / n);

        let mut sq_devs = [0.0f64; 3];
        for pixel in image.pixels() {
            for (c, acc) in sq_devs.iter_mut().enumerate() {
                let d = pixel.0[c] as f64 - means[c];
                *acc += d * d;
            }
        }
        let stds = sq_devs.map(|s| (s / n).sqrt());

        Ok(ChannelStats {
            mean: Rgb { r: means[0] / 255.0, g: means[1] / 255.0, b: means[2] / 255.0 },
            std:  Rgb { r: stds[0] / 255.0,  g: stds[1] / 255.0,  b: stds[2] / 255.0 },
        })
    }

    /// Mean of the three channel means.
    pub fn brightness(&self) -> f64 {
        (self.mean.r + self.mean.g + self.mean.b) / 3.0
    }

    /// Mean of the three channel standard deviations.
    pub fn contrast(&self) -> f64 {
        (self.std.r + self.std.g + self.std.b) / 3.0
    }

    /// Argmax over the channel means; ties go to the earliest channel in
    /// Red, Green, Blue order.
    pub fn dominant(&self) -> DominantChannel {
        let means = self.mean.to_array();
        let mut best = 0;
        for c in 1..means.len() {
            if means[c] > means[best] {
                best = c;
            }
        }
        DominantChannel::ORDER[best]
    }

    /// Maps the statistics onto a point in 3D space, one axis per channel.
    ///
    /// A channel value of 0.5 sits at the origin; the mean contributes with
    /// weight 8 and the texture (std) with weight 2.
    pub fn coordinates(&self) -> [f64; 3] {
        let axis = |mean: f64, std: f64| (mean - 0.5) * 8.0 + (std - 0.5) * 2.0;
        [
            axis(self.mean.r, self.std.r),
            axis(self.mean.g, self.std.g),
            axis(self.mean.b, self.std.b),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb as Pixel};

    const EPS: f64 = 1e-9;

    fn stats(mean: [f64; 3], std: [f64; 3]) -> ChannelStats {
        ChannelStats {
            mean: Rgb { r: mean[0], g: mean[1], b: mean[2] },
            std:  Rgb { r: std[0],  g: std[1],  b: std[2] },
        }
    }

    #[test]
    fn uniform_image_has_zero_std() {
        let img: RgbImage = ImageBuffer::from_pixel(8, 4, Pixel([10u8, 200, 51]));
        let s = ChannelStats::from_rgb(&img).unwrap();
        assert!((s.mean.r - 10.0 / 255.0).abs() < EPS);
        assert!((s.mean.g - 200.0 / 255.0).abs() < EPS);
        assert!((s.mean.b - 0.2).abs() < EPS);
        assert_eq!(s.std.to_array(), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn std_is_population_not_sample() {
        // Two pixels 0 and 255 in the red channel: population std = 127.5.
        let mut img: RgbImage = ImageBuffer::new(2, 1);
        img.put_pixel(0, 0, Pixel([0, 0, 0]));
        img.put_pixel(1, 0, Pixel([255, 0, 0]));
        let s = ChannelStats::from_rgb(&img).unwrap();
        assert!((s.mean.r - 0.5).abs() < EPS);
        assert!((s.std.r - 0.5).abs() < EPS);
        assert_eq!(s.std.g, 0.0);
    }

    #[test]
    fn empty_image_is_rejected() {
        let img: RgbImage = ImageBuffer::new(0, 0);
        assert!(matches!(ChannelStats::from_rgb(&img), Err(ExtractError::EmptyImage)));
    }

    #[test]
    fn dominant_breaks_ties_in_rgb_order() {
        assert_eq!(stats([0.5, 0.5, 0.5], [0.0; 3]).dominant(), DominantChannel::Red);
        assert_eq!(stats([0.1, 0.7, 0.7], [0.0; 3]).dominant(), DominantChannel::Green);
        assert_eq!(stats([0.1, 0.2, 0.3], [0.0; 3]).dominant(), DominantChannel::Blue);
    }

    #[test]
    fn coordinates_of_pure_red() {
        let c = stats([1.0, 0.0, 0.0], [0.0; 3]).coordinates();
        assert!((c[0] - 3.0).abs() < EPS);
        assert!((c[1] + 5.0).abs() < EPS);
        assert!((c[2] + 5.0).abs() < EPS);
    }

    #[test]
    fn brightness_and_contrast_average_channels() {
        let s = stats([0.3, 0.6, 0.9], [0.1, 0.2, 0.3]);
        assert!((s.brightness() - 0.6).abs() < EPS);
        assert!((s.contrast() - 0.2).abs() < EPS);
    }
}
