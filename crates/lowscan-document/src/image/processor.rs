// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor — decoding, proportional resize, channel extraction, and
// brightness adjustment. Operates on in-memory images using the `image` crate.

use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use lowscan_core::{ChannelPreference, LowscanError, Result};
use tracing::{debug, info, instrument};

/// Image plumbing around a single in-memory image.
///
/// Each transformation consumes `self` and returns a new `ImageProcessor`
/// wrapping the result, so the caller's original image is never mutated.
///
/// ```ignore
/// let gray = ImageProcessor::open("receipt.jpg")?
///     .resize_to_height(500)
///     .extract_channel(ChannelPreference::Green);
/// ```
pub struct ImageProcessor {
    /// The current working image.
    image: DynamicImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Load an image from a file path.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let img = image::open(path.as_ref()).map_err(|err| {
            LowscanError::InvalidInput(format!(
                "failed to open {}: {}",
                path.as_ref().display(),
                err
            ))
        })?;
        info!(width = img.width(), height = img.height(), "Image loaded");
        Self::checked(img)
    }

    /// Create a processor from raw encoded bytes (JPEG, PNG, etc.).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.is_empty() {
            return Err(LowscanError::InvalidInput("empty image buffer".into()));
        }
        let img = image::load_from_memory(data).map_err(|err| {
            LowscanError::InvalidInput(format!("failed to decode image: {}", err))
        })?;
        debug!(
            width = img.width(),
            height = img.height(),
            "Image decoded from bytes"
        );
        Self::checked(img)
    }

    /// Wrap an already-decoded `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    fn checked(image: DynamicImage) -> Result<Self> {
        if image.width() == 0 || image.height() == 0 {
            return Err(LowscanError::InvalidInput(format!(
                "image has no pixels ({}x{})",
                image.width(),
                image.height()
            )));
        }
        Ok(Self { image })
    }

    // -- Accessors ------------------------------------------------------------

    /// Current image width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Current image height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Borrow the underlying `DynamicImage`.
    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.image
    }

    /// Consume the processor and return the underlying `DynamicImage`.
    pub fn into_dynamic(self) -> DynamicImage {
        self.image
    }

    // -- Transformations ------------------------------------------------------

    /// Resize so the height equals `target_height`, preserving aspect ratio.
    ///
    /// The width becomes `round(width * target_height / height)`, never less
    /// than one pixel. Linear (triangle) filtering keeps downscaling smooth.
    #[instrument(skip(self), fields(target_height))]
    pub fn resize_to_height(self, target_height: u32) -> Self {
        let (width, height) = (self.image.width(), self.image.height());
        if height == target_height || height == 0 {
            return self;
        }
        let (new_w, new_h) = proportional_size(width, height, target_height);
        info!(
            from_w = width,
            from_h = height,
            new_w,
            new_h,
            "Resizing image"
        );
        Self {
            image: self.image.resize_exact(new_w, new_h, FilterType::Triangle),
        }
    }

    /// Reduce to a single channel.
    ///
    /// Red, green, and blue read that channel directly; grayscale uses the
    /// luminance conversion.
    pub fn extract_channel(&self, channel: ChannelPreference) -> GrayImage {
        match channel.rgb_index() {
            Some(index) => {
                let rgb = self.image.to_rgb8();
                GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
                    Luma([rgb.get_pixel(x, y).0[index]])
                })
            }
            None => self.image.to_luma8(),
        }
    }

    /// Replace the working image with one of its channels.
    pub fn channel(self, channel: ChannelPreference) -> Self {
        let gray = self.extract_channel(channel);
        Self {
            image: DynamicImage::ImageLuma8(gray),
        }
    }

    /// Add `delta` to every colour channel, clamping to [0, 255].
    ///
    /// Single-channel images stay single-channel; alpha is left alone.
    #[instrument(skip(self), fields(delta))]
    pub fn adjust_brightness(self, delta: f64) -> Self {
        let offset = delta.round() as i32;
        debug!(offset, "Adjusting brightness");
        let adjust = |channel: u8| -> u8 { (channel as i32 + offset).clamp(0, 255) as u8 };

        let image = match self.image {
            DynamicImage::ImageLuma8(gray) => {
                let adjusted = GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
                    Luma([adjust(gray.get_pixel(x, y).0[0])])
                });
                DynamicImage::ImageLuma8(adjusted)
            }
            other => {
                let rgba = other.to_rgba8();
                let adjusted = image::ImageBuffer::from_fn(rgba.width(), rgba.height(), |x, y| {
                    let image::Rgba([r, g, b, a]) = *rgba.get_pixel(x, y);
                    image::Rgba([adjust(r), adjust(g), adjust(b), a])
                });
                DynamicImage::ImageRgba8(adjusted)
            }
        };
        Self { image }
    }

    // -- Output ---------------------------------------------------------------

    /// Encode the current image as PNG bytes.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        let mut cursor = std::io::Cursor::new(&mut buffer);
        self.image
            .write_to(&mut cursor, ImageFormat::Png)
            .map_err(|err| LowscanError::Image(format!("image encoding failed: {}", err)))?;
        Ok(buffer)
    }

    /// Write the image to a file. The format is inferred from the file extension.
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        self.image.save(path.as_ref()).map_err(|err| {
            LowscanError::Image(format!(
                "failed to save image to {}: {}",
                path.as_ref().display(),
                err
            ))
        })
    }
}

/// Width and height after scaling `height` to `target_height`.
pub fn proportional_size(width: u32, height: u32, target_height: u32) -> (u32, u32) {
    let scale = target_height as f64 / height as f64;
    let new_w = (width as f64 * scale).round().max(1.0) as u32;
    (new_w, target_height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn resize_keeps_aspect_ratio() {
        for &(w, h, target) in &[
            (1000u32, 2000u32, 500u32),
            (3024, 4032, 500),
            (4032, 3024, 500),
            (333, 777, 500),
            (10, 3, 500),
            (640, 480, 240),
        ] {
            let img = DynamicImage::ImageRgb8(RgbImage::new(w, h));
            let out = ImageProcessor::from_dynamic(img).resize_to_height(target);
            let expected_w = (w as f64 * target as f64 / h as f64).round() as i64;
            assert_eq!(out.height(), target, "{w}x{h}");
            assert!(
                (out.width() as i64 - expected_w).abs() <= 1,
                "{w}x{h} -> {} (expected {expected_w})",
                out.width()
            );
        }
    }

    #[test]
    fn resize_to_current_height_is_identity() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(7, 500, Rgb([1, 2, 3])));
        let out = ImageProcessor::from_dynamic(img.clone()).resize_to_height(500);
        assert_eq!(out.as_dynamic(), &img);
    }

    #[test]
    fn extract_channel_reads_requested_component() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(2, 2, Rgb([10, 20, 30])));
        let processor = ImageProcessor::from_dynamic(img);
        assert_eq!(processor.extract_channel(ChannelPreference::Red).get_pixel(0, 0)[0], 10);
        assert_eq!(processor.extract_channel(ChannelPreference::Green).get_pixel(1, 1)[0], 20);
        assert_eq!(processor.extract_channel(ChannelPreference::Blue).get_pixel(0, 1)[0], 30);
    }

    #[test]
    fn grayscale_channel_uses_luminance() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(1, 1, Rgb([255, 255, 255])));
        let gray = ImageProcessor::from_dynamic(img).extract_channel(ChannelPreference::Grayscale);
        assert_eq!(gray.get_pixel(0, 0)[0], 255);
    }

    #[test]
    fn brightness_clamps_at_black() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(3, 3, Luma([20])));
        let out = ImageProcessor::from_dynamic(img).adjust_brightness(-30.0);
        match out.as_dynamic() {
            DynamicImage::ImageLuma8(gray) => assert_eq!(gray.get_pixel(1, 1)[0], 0),
            other => panic!("expected luma output, got {:?}", other.color()),
        }
    }

    #[test]
    fn brightness_on_colour_image_keeps_alpha() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(1, 1, Rgb([100, 150, 200])));
        let out = ImageProcessor::from_dynamic(img).adjust_brightness(-50.0).into_dynamic();
        let px = out.to_rgba8().get_pixel(0, 0).0;
        assert_eq!(px, [50, 100, 150, 255]);
    }

    #[test]
    fn empty_bytes_are_invalid_input() {
        assert!(matches!(
            ImageProcessor::from_bytes(&[]),
            Err(LowscanError::InvalidInput(_))
        ));
    }

    #[test]
    fn garbage_bytes_are_invalid_input() {
        assert!(matches!(
            ImageProcessor::from_bytes(b"definitely not an image"),
            Err(LowscanError::InvalidInput(_))
        ));
    }

    #[test]
    fn png_round_trip_through_bytes() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(4, 6, Luma([77])));
        let bytes = ImageProcessor::from_dynamic(img).to_png_bytes().expect("encode");
        let decoded = ImageProcessor::from_bytes(&bytes).expect("decode");
        assert_eq!((decoded.width(), decoded.height()), (4, 6));
    }
}
