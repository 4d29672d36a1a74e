// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Detection configuration.

use serde::{Deserialize, Serialize};

use crate::error::{LowscanError, Result};

/// Which single channel carries the ink/background contrast used for edge
/// detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelPreference {
    Red,
    /// Usually the strongest contrast for blue or black ink on white paper.
    #[default]
    Green,
    Blue,
    /// Luminance conversion of all three channels.
    Grayscale,
}

impl ChannelPreference {
    /// Index into an RGB pixel, or `None` for luminance.
    pub fn rgb_index(&self) -> Option<usize> {
        match self {
            Self::Red => Some(0),
            Self::Green => Some(1),
            Self::Blue => Some(2),
            Self::Grayscale => None,
        }
    }
}

/// Largest accepted working height.
pub const MAX_TARGET_HEIGHT: u32 = 10_000;

/// Parameters for one detection run.
///
/// Every field has a default, so a partial JSON document deserialises into a
/// complete configuration. Changing a parameter means re-running detection
/// with a new `ScanConfig`; nothing is cached between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Height (pixels) of the reduced image the pipeline works on.
    pub target_height: u32,
    /// Channel used for edge detection.
    pub channel: ChannelPreference,
    /// Side length of the square Gaussian kernel. Must be odd.
    pub blur_kernel_size: u32,
    /// Lower hysteresis threshold of the edge detector.
    pub canny_low: f32,
    /// Upper hysteresis threshold of the edge detector.
    pub canny_high: f32,
    /// Polygon approximation tolerance as a fraction of contour perimeter.
    pub approx_tolerance_factor: f64,
    /// A nested quadrilateral must be larger than this fraction of the previous one.
    pub nesting_lower_bound: f64,
    /// A nested quadrilateral must be smaller than this fraction of the previous one.
    pub nesting_upper_bound: f64,
    /// The first quadrilateral is rejected when it covers at least this
    /// fraction of the frame (it is the photo border, not the page).
    pub border_exclusion_factor: f64,
    /// Brightness offset applied to the preview image, in [-100, 0].
    pub brightness_delta: f64,
    /// Preview shows the selected channel instead of the colour image.
    pub grayscale_preview: bool,
    /// Only the largest `n` contours are approximated. `None` scans all.
    pub max_candidates: Option<usize>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            target_height: 500,
            channel: ChannelPreference::Green,
            blur_kernel_size: 5,
            canny_low: 75.0,
            canny_high: 200.0,
            approx_tolerance_factor: 0.02,
            nesting_lower_bound: 0.7,
            nesting_upper_bound: 0.9,
            border_exclusion_factor: 0.99,
            brightness_delta: -30.0,
            grayscale_preview: false,
            max_candidates: None,
        }
    }
}

impl ScanConfig {
    /// Parse a JSON configuration; absent fields take their defaults.
    pub fn from_json(data: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(data)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject parameters that would make the geometry undefined.
    pub fn validate(&self) -> Result<()> {
        if self.target_height == 0 || self.target_height > MAX_TARGET_HEIGHT {
            return Err(invalid(format!(
                "target_height must be in 1..={MAX_TARGET_HEIGHT}, got {}",
                self.target_height
            )));
        }
        if self.blur_kernel_size == 0 || self.blur_kernel_size % 2 == 0 {
            return Err(invalid(format!(
                "blur_kernel_size must be a positive odd number, got {}",
                self.blur_kernel_size
            )));
        }
        if !(self.canny_low.is_finite() && self.canny_high.is_finite())
            || self.canny_low <= 0.0
            || self.canny_high < self.canny_low
        {
            return Err(invalid(format!(
                "edge thresholds must satisfy 0 < low <= high, got {}/{}",
                self.canny_low, self.canny_high
            )));
        }
        if !(self.approx_tolerance_factor > 0.0 && self.approx_tolerance_factor < 1.0) {
            return Err(invalid(format!(
                "approx_tolerance_factor must be in (0, 1), got {}",
                self.approx_tolerance_factor
            )));
        }
        if !(self.nesting_lower_bound > 0.0
            && self.nesting_lower_bound < self.nesting_upper_bound
            && self.nesting_upper_bound <= 1.0)
        {
            return Err(invalid(format!(
                "nesting bounds must satisfy 0 < lower < upper <= 1, got {}/{}",
                self.nesting_lower_bound, self.nesting_upper_bound
            )));
        }
        if !(self.border_exclusion_factor > 0.0 && self.border_exclusion_factor <= 1.0) {
            return Err(invalid(format!(
                "border_exclusion_factor must be in (0, 1], got {}",
                self.border_exclusion_factor
            )));
        }
        if !(-100.0..=0.0).contains(&self.brightness_delta) {
            return Err(invalid(format!(
                "brightness_delta must be in [-100, 0], got {}",
                self.brightness_delta
            )));
        }
        if self.max_candidates == Some(0) {
            return Err(invalid("max_candidates must be positive when set"));
        }
        Ok(())
    }

    /// Sigma of the Gaussian kernel, derived from its size.
    pub fn blur_sigma(&self) -> f64 {
        0.3 * ((self.blur_kernel_size as f64 - 1.0) * 0.5 - 1.0) + 0.8
    }
}

fn invalid(msg: impl Into<String>) -> LowscanError {
    LowscanError::Configuration(msg.into())
}
