// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Preprocessing — shrink to the working height, keep the best-contrast
// channel, and smooth with a fixed-size Gaussian kernel.

use image::{DynamicImage, GrayImage, Luma};
use imageproc::definitions::Image;
use imageproc::filter::separable_filter_equal;
use imageproc::map::map_subpixels;
use lowscan_core::{Result, ScanConfig};
use tracing::{debug, instrument};

use crate::image::processor::ImageProcessor;

/// Resize to `config.target_height`, extract `config.channel`, and blur.
///
/// The caller's image is only borrowed; a new single-channel image is
/// returned.
#[instrument(skip(image, config), fields(width = image.width(), height = image.height()))]
pub fn preprocess(image: &DynamicImage, config: &ScanConfig) -> Result<GrayImage> {
    config.validate()?;
    let reduced = ImageProcessor::from_dynamic(image.clone()).resize_to_height(config.target_height);
    let channel = reduced.extract_channel(config.channel);
    debug!(
        channel = ?config.channel,
        width = channel.width(),
        height = channel.height(),
        "Channel extracted"
    );
    Ok(gaussian_blur(&channel, config.blur_kernel_size, config.blur_sigma()))
}

/// Normalised 1-D Gaussian weights for an odd `size`.
pub fn gaussian_kernel(size: u32, sigma: f64) -> Vec<f32> {
    let radius = (size / 2) as i64;
    let two_sigma_sq = 2.0 * sigma * sigma;
    let raw: Vec<f64> = (-radius..=radius)
        .map(|i| (-((i * i) as f64) / two_sigma_sq).exp())
        .collect();
    let sum: f64 = raw.iter().sum();
    raw.into_iter().map(|w| (w / sum) as f32).collect()
}

/// Separable Gaussian blur with a `size`×`size` kernel.
///
/// Samples outside the image repeat the nearest edge pixel. Accumulation
/// happens in `f32` and is rounded once at the end.
pub fn gaussian_blur(image: &GrayImage, size: u32, sigma: f64) -> GrayImage {
    let kernel = gaussian_kernel(size, sigma);
    let samples: Image<Luma<f32>> = map_subpixels(image, f32::from);
    let blurred = separable_filter_equal(&samples, &kernel);
    map_subpixels(&blurred, |v: f32| v.round().clamp(0.0, 255.0) as u8)
}
