// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document detection pipeline — preprocessing, edge map, contours, candidate
// selection, and corner ordering, with results mapped back to the source
// resolution.

use image::{DynamicImage, GrayImage};
use lowscan_core::{LowscanError, OrderedCorners, Result, ScanConfig};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use super::contours::{detect_edges, extract_contours};
use super::geometry::order_corners;
use super::preprocess::preprocess;
use super::select::{SelectionParams, scan_candidates};
use crate::image::processor::ImageProcessor;

/// Locates a document in a photograph.
///
/// The detector only holds its configuration, so one instance can be shared
/// between threads and reused for any number of images. Every call is
/// independent of every other call.
///
/// ## Pipeline
///
/// 1. Resize so the height equals `target_height`
/// 2. Keep the preferred colour channel (or luminance)
/// 3. Gaussian blur with a fixed odd kernel
/// 4. Canny edge detection
/// 5. Border following with simple chain approximation
/// 6. Polygon approximation of the largest contours and the nested-rectangle
///    selection
/// 7. Corner ordering, then scaling back to the source resolution
#[derive(Debug, Clone, Default)]
pub struct DocumentDetector {
    config: ScanConfig,
}

/// Detection result with the numbers behind it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionReport {
    /// Ordered corners in source image coordinates.
    pub corners: Option<OrderedCorners>,
    pub source_width: u32,
    pub source_height: u32,
    pub processing_width: u32,
    pub processing_height: u32,
    /// Multiplier from processing coordinates to source coordinates.
    pub scale_factor: f64,
    /// Contours traced in the edge map.
    pub contours: usize,
    /// Contours that approximated to exactly four vertices.
    pub quad_candidates: usize,
}

impl DocumentDetector {
    /// Build a detector, rejecting out-of-range parameters.
    pub fn new(config: ScanConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Find the document and return its corners in source coordinates, or
    /// `None` when no quadrilateral satisfies the selection rules.
    pub fn detect(&self, image: &DynamicImage) -> Result<Option<OrderedCorners>> {
        Ok(self.detect_with_report(image)?.corners)
    }

    /// Decode encoded image bytes and run [`detect`](Self::detect).
    pub fn detect_bytes(&self, data: &[u8]) -> Result<Option<OrderedCorners>> {
        let processor = ImageProcessor::from_bytes(data)?;
        self.detect(processor.as_dynamic())
    }

    /// Run the full pipeline and report intermediate counts.
    #[instrument(skip(self, image), fields(width = image.width(), height = image.height()))]
    pub fn detect_with_report(&self, image: &DynamicImage) -> Result<DetectionReport> {
        check_input(image)?;
        info!("Starting document detection");

        let blurred = preprocess(image, &self.config)?;
        let (processing_width, processing_height) = blurred.dimensions();

        let edges = detect_edges(&blurred, self.config.canny_low, self.config.canny_high);
        let contours = extract_contours(&edges);

        let params = SelectionParams::from(&self.config);
        let selection = scan_candidates(&contours, processing_width, processing_height, &params);
        debug!(
            contours = contours.len(),
            quad_candidates = selection.quad_candidates,
            "Candidate scan complete"
        );

        let scale_factor = image.height() as f64 / processing_height as f64;
        let corners = selection
            .best
            .map(|quad| order_corners(quad.points()).scaled(scale_factor));

        match &corners {
            Some(found) => info!(corners = %found, "Document found"),
            None => warn!(
                contours = contours.len(),
                quad_candidates = selection.quad_candidates,
                "No document found"
            ),
        }

        Ok(DetectionReport {
            corners,
            source_width: image.width(),
            source_height: image.height(),
            processing_width,
            processing_height,
            scale_factor,
            contours: contours.len(),
            quad_candidates: selection.quad_candidates,
        })
    }

    /// The Canny edge map at processing resolution.
    #[instrument(skip(self, image))]
    pub fn edge_map(&self, image: &DynamicImage) -> Result<GrayImage> {
        check_input(image)?;
        let blurred = preprocess(image, &self.config)?;
        Ok(detect_edges(&blurred, self.config.canny_low, self.config.canny_high))
    }

    /// On-screen preview at processing resolution.
    ///
    /// The reduced colour image, or the selected channel when
    /// `grayscale_preview` is on, with `brightness_delta` applied.
    #[instrument(skip(self, image))]
    pub fn render_preview(&self, image: &DynamicImage) -> Result<DynamicImage> {
        check_input(image)?;
        let mut processor =
            ImageProcessor::from_dynamic(image.clone()).resize_to_height(self.config.target_height);
        if self.config.grayscale_preview {
            processor = processor.channel(self.config.channel);
        }
        Ok(processor
            .adjust_brightness(self.config.brightness_delta)
            .into_dynamic())
    }
}

/// One-shot detection with the given configuration.
pub fn detect_document(image: &DynamicImage, config: &ScanConfig) -> Result<Option<OrderedCorners>> {
    DocumentDetector::new(config.clone())?.detect(image)
}

fn check_input(image: &DynamicImage) -> Result<()> {
    if image.width() == 0 || image.height() == 0 {
        return Err(LowscanError::InvalidInput(format!(
            "image has no pixels ({}x{})",
            image.width(),
            image.height()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::imageops::{self, FilterType};
    use image::{Rgb, RgbImage};
    use imageproc::drawing::draw_polygon_mut;
    use imageproc::point::Point;
    use lowscan_core::Point2D;

    const TABLE: Rgb<u8> = Rgb([40, 45, 50]);
    const PAPER: Rgb<u8> = Rgb([235, 235, 225]);

    /// Dark table with a bright sheet of paper covering `[x0, x1) x [y0, y1)`.
    fn photo(width: u32, height: u32, x0: u32, y0: u32, x1: u32, y1: u32) -> DynamicImage {
        let mut img = RgbImage::from_pixel(width, height, TABLE);
        for y in y0..y1 {
            for x in x0..x1 {
                img.put_pixel(x, y, PAPER);
            }
        }
        DynamicImage::ImageRgb8(img)
    }

    /// Dark table with a sheet photographed at an angle.
    fn tilted_photo(width: u32, height: u32, corners: [(i32, i32); 4]) -> DynamicImage {
        let mut img = RgbImage::from_pixel(width, height, TABLE);
        let poly: Vec<Point<i32>> = corners.iter().map(|&(x, y)| Point::new(x, y)).collect();
        draw_polygon_mut(&mut img, &poly, PAPER);
        DynamicImage::ImageRgb8(img)
    }

    fn assert_near(actual: Point2D, expected: Point2D, tolerance: f64) {
        assert!(
            (actual.x - expected.x).abs() <= tolerance && (actual.y - expected.y).abs() <= tolerance,
            "expected {expected} +/- {tolerance}, got {actual}"
        );
    }

    #[test]
    fn finds_paper_on_dark_background() {
        let img = photo(375, 500, 50, 60, 300, 440);
        let corners = DocumentDetector::default()
            .detect(&img)
            .expect("valid input")
            .expect("document should be found");

        assert_near(corners.top_left, Point2D::new(50.0, 60.0), 4.0);
        assert_near(corners.top_right, Point2D::new(300.0, 60.0), 4.0);
        assert_near(corners.bottom_left, Point2D::new(50.0, 440.0), 4.0);
        assert_near(corners.bottom_right, Point2D::new(300.0, 440.0), 4.0);
    }

    #[test]
    fn corners_are_reported_at_source_resolution() {
        let img = photo(750, 1000, 100, 120, 600, 880);
        let report = DocumentDetector::default()
            .detect_with_report(&img)
            .expect("valid input");
        assert_eq!((report.processing_width, report.processing_height), (375, 500));
        assert!((report.scale_factor - 2.0).abs() < 1e-12);

        let corners = report.corners.expect("document should be found");
        assert_near(corners.top_left, Point2D::new(100.0, 120.0), 8.0);
        assert_near(corners.bottom_right, Point2D::new(600.0, 880.0), 8.0);
    }

    #[test]
    fn upscaled_copy_gives_scaled_corners() {
        let small = photo(375, 500, 50, 60, 300, 440);
        let large = DynamicImage::ImageRgb8(imageops::resize(
            &small.to_rgb8(),
            750,
            1000,
            FilterType::Nearest,
        ));
        let detector = DocumentDetector::default();

        let a = detector.detect(&small).expect("valid").expect("found");
        let b = detector.detect(&large).expect("valid").expect("found");

        for (pa, pb) in a.to_array().into_iter().zip(b.to_array()) {
            assert_near(pb, pa.scaled(2.0), 4.0);
        }
    }

    #[test]
    fn finds_tilted_sheet() {
        let img = tilted_photo(750, 1000, [(120, 80), (620, 140), (560, 900), (60, 820)]);
        let corners = DocumentDetector::default()
            .detect(&img)
            .expect("valid input")
            .expect("document should be found");

        assert_near(corners.top_left, Point2D::new(120.0, 80.0), 8.0);
        assert_near(corners.top_right, Point2D::new(620.0, 140.0), 8.0);
        assert_near(corners.bottom_left, Point2D::new(60.0, 820.0), 8.0);
        assert_near(corners.bottom_right, Point2D::new(560.0, 900.0), 8.0);
    }

    #[test]
    fn printed_frame_inside_the_page_wins() {
        // Sheet 670x920 with a 12px dark frame whose outer edge is 570x800,
        // about three quarters of the sheet.
        let mut img = photo(750, 1000, 40, 40, 710, 960).to_rgb8();
        let ink = Rgb([30, 30, 30]);
        for y in 100..900u32 {
            for x in 90..660u32 {
                let in_band = x < 102 || x >= 648 || y < 112 || y >= 888;
                if in_band {
                    img.put_pixel(x, y, ink);
                }
            }
        }
        let report = DocumentDetector::default()
            .detect_with_report(&DynamicImage::ImageRgb8(img))
            .expect("valid input");
        assert!(report.quad_candidates >= 2, "report {report:?}");

        let corners = report.corners.expect("document should be found");
        assert_near(corners.top_left, Point2D::new(90.0, 100.0), 8.0);
        assert_near(corners.top_right, Point2D::new(660.0, 100.0), 8.0);
        assert_near(corners.bottom_left, Point2D::new(90.0, 900.0), 8.0);
        assert_near(corners.bottom_right, Point2D::new(660.0, 900.0), 8.0);
    }

    #[test]
    fn repeated_detection_is_identical() {
        let img = photo(420, 560, 60, 50, 360, 500);
        let detector = DocumentDetector::default();
        let first = detector.detect_with_report(&img).expect("valid");
        let second = detector.detect_with_report(&img).expect("valid");
        assert_eq!(first, second);
    }

    #[test]
    fn blank_photo_has_no_document() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(300, 400, Rgb([128, 128, 128])));
        let report = DocumentDetector::default()
            .detect_with_report(&img)
            .expect("valid input");
        assert_eq!(report.corners, None);
        assert_eq!(report.contours, 0);
    }

    #[test]
    fn empty_image_is_invalid_input() {
        let img = DynamicImage::new_rgb8(0, 0);
        assert!(matches!(
            DocumentDetector::default().detect(&img),
            Err(LowscanError::InvalidInput(_))
        ));
    }

    #[test]
    fn undecodable_bytes_are_invalid_input() {
        assert!(matches!(
            DocumentDetector::default().detect_bytes(&[0u8, 1, 2, 3]),
            Err(LowscanError::InvalidInput(_))
        ));
    }

    #[test]
    fn out_of_range_config_fails_fast() {
        let config = ScanConfig {
            border_exclusion_factor: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            DocumentDetector::new(config),
            Err(LowscanError::Configuration(_))
        ));
    }

    #[test]
    fn free_function_matches_detector() {
        let img = photo(375, 500, 50, 60, 300, 440);
        let config = ScanConfig::default();
        let via_fn = detect_document(&img, &config).expect("valid");
        let via_detector = DocumentDetector::new(config).expect("valid").detect(&img).expect("valid");
        assert_eq!(via_fn, via_detector);
    }

    #[test]
    fn edge_map_is_at_processing_resolution() {
        let img = photo(750, 1000, 100, 120, 600, 880);
        let edges = DocumentDetector::default().edge_map(&img).expect("valid");
        assert_eq!(edges.dimensions(), (375, 500));
        assert!(edges.pixels().any(|p| p.0[0] == 255));
    }

    #[test]
    fn colour_preview_is_darkened() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(100, 500, Rgb([200, 150, 100])));
        let preview = DocumentDetector::default().render_preview(&img).expect("valid");
        assert_eq!(preview.to_rgba8().get_pixel(50, 250).0, [170, 120, 70, 255]);
    }

    #[test]
    fn grayscale_preview_uses_selected_channel() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(100, 500, Rgb([200, 150, 100])));
        let config = ScanConfig {
            grayscale_preview: true,
            brightness_delta: 0.0,
            ..Default::default()
        };
        let preview = DocumentDetector::new(config)
            .expect("valid")
            .render_preview(&img)
            .expect("valid");
        match preview {
            DynamicImage::ImageLuma8(gray) => assert_eq!(gray.get_pixel(10, 10).0[0], 150),
            other => panic!("expected single channel preview, got {:?}", other.color()),
        }
    }
}
