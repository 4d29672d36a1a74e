// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan settings resolution: JSON settings file, then command-line overrides.

use std::path::Path;

use lowscan_core::{ChannelPreference, Result, ScanConfig};
use tracing::{debug, info};

/// Single-field overrides given on the command line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    pub channel: Option<ChannelPreference>,
    pub target_height: Option<u32>,
    pub brightness_delta: Option<f64>,
    pub grayscale_preview: bool,
}

/// Load settings from `path`, or the defaults when no file is given.
///
/// Fields missing from the file keep their default values.
pub fn load_config(path: Option<&Path>) -> Result<ScanConfig> {
    let Some(path) = path else {
        debug!("No settings file, using defaults");
        return Ok(ScanConfig::default());
    };
    let data = std::fs::read_to_string(path)?;
    let config = ScanConfig::from_json(&data)?;
    info!(path = %path.display(), "Settings loaded");
    Ok(config)
}

/// Apply command-line overrides on top of `config` and re-validate.
pub fn apply_overrides(mut config: ScanConfig, overrides: &Overrides) -> Result<ScanConfig> {
    if let Some(channel) = overrides.channel {
        config.channel = channel;
    }
    if let Some(height) = overrides.target_height {
        config.target_height = height;
    }
    if let Some(delta) = overrides.brightness_delta {
        config.brightness_delta = delta;
    }
    if overrides.grayscale_preview {
        config.grayscale_preview = true;
    }
    config.validate()?;
    Ok(config)
}

/// Resolve the effective settings for one run.
pub fn resolve(path: Option<&Path>, overrides: &Overrides) -> Result<ScanConfig> {
    let config = load_config(path)?;
    apply_overrides(config, overrides)
}
