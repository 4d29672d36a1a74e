// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Lowscan — find the corners of a photographed document.
//
// Entry point. Initialises logging, resolves settings, runs detection, and
// prints the ordered corners as JSON.

mod services;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use lowscan_core::human_errors::humanize_error;
use lowscan_core::{ChannelPreference, Result};
use lowscan_document::{DocumentDetector, ImageProcessor};

use services::output::{render_json, render_report, write_image};
use services::settings::{Overrides, resolve};

#[derive(Parser)]
#[command(name = "lowscan")]
#[command(about = "Find the four corners of a document in a photo")]
struct Cli {
    /// Path to input image file
    #[arg(value_name = "IMAGE")]
    image_path: PathBuf,

    /// JSON settings file (missing fields use defaults)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Channel used for edge detection
    #[arg(long, value_enum)]
    channel: Option<ChannelArg>,

    /// Working height in pixels
    #[arg(long)]
    target_height: Option<u32>,

    /// Preview brightness offset, -100 to 0
    #[arg(long, allow_hyphen_values = true)]
    brightness: Option<f64>,

    /// Preview the selected channel instead of the colour image
    #[arg(long)]
    grayscale: bool,

    /// Write the brightness-adjusted preview image here
    #[arg(long, value_name = "FILE")]
    preview: Option<PathBuf>,

    /// Write the edge map here
    #[arg(long, value_name = "FILE")]
    edges: Option<PathBuf>,

    /// Print detection statistics to stderr and log at debug level
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ChannelArg {
    Red,
    Green,
    Blue,
    Grayscale,
}

impl From<ChannelArg> for ChannelPreference {
    fn from(arg: ChannelArg) -> Self {
        match arg {
            ChannelArg::Red => Self::Red,
            ChannelArg::Green => Self::Green,
            ChannelArg::Blue => Self::Blue,
            ChannelArg::Grayscale => Self::Grayscale,
        }
    }
}

fn main() -> ExitCode {
    let args = Cli::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "lowscan failed");
            eprintln!("{}", humanize_error(&err));
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Cli) -> Result<()> {
    let overrides = Overrides {
        channel: args.channel.map(ChannelPreference::from),
        target_height: args.target_height,
        brightness_delta: args.brightness,
        grayscale_preview: args.grayscale,
    };
    let config = resolve(args.config.as_deref(), &overrides)?;
    let detector = DocumentDetector::new(config)?;

    let input = ImageProcessor::open(&args.image_path)?;
    let image = input.as_dynamic();

    let report = detector.detect_with_report(image)?;
    println!("{}", render_json(&report)?);
    if args.verbose {
        eprintln!("{}", render_report(&report)?);
    }

    if let Some(path) = &args.preview {
        let preview = ImageProcessor::from_dynamic(detector.render_preview(image)?);
        write_image(&preview, path, "preview")?;
    }
    if let Some(path) = &args.edges {
        let edges = ImageProcessor::from_dynamic(image::DynamicImage::ImageLuma8(
            detector.edge_map(image)?,
        ));
        write_image(&edges, path, "edge map")?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_names_parse_to_preferences() {
        let cli = Cli::try_parse_from(["lowscan", "photo.jpg", "--channel", "blue"])
            .expect("valid arguments");
        assert_eq!(cli.channel.map(ChannelPreference::from), Some(ChannelPreference::Blue));
    }

    #[test]
    fn misspelt_channel_is_rejected_at_parse_time() {
        let err = Cli::try_parse_from(["lowscan", "photo.jpg", "--channel", "gren"])
            .err()
            .expect("typo must not parse");
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
    }

    #[test]
    fn negative_brightness_is_accepted() {
        let cli = Cli::try_parse_from(["lowscan", "photo.jpg", "--brightness", "-45"])
            .expect("valid arguments");
        assert_eq!(cli.brightness, Some(-45.0));
    }
}
