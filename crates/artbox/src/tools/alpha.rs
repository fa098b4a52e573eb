//! Normalize the color of fully transparent pixels
//!
//! Editors leave arbitrary RGB values behind alpha 0, which shows up as
//! fringes once the image is scaled. Every such pixel is set to one
//! background value.

use std::path::Path;

use image::{DynamicImage, Rgba, RgbaImage};
use tracing::{debug, info, span, Level};

use crate::core::raster::{load_image, save_png};
use crate::core::{ArtboxError, BatchReport};

const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Background for transparent pixels: the first pixel if it is transparent, else all zero
pub fn transparent_background(image: &RgbaImage) -> Rgba<u8> {
    match image.pixels().next() {
        Some(first) if first[3] == 0 => *first,
        _ => CLEAR,
    }
}

/// Set every alpha-0 pixel to the background; returns how many pixels changed
pub fn normalize_transparent_pixels(image: &mut RgbaImage) -> usize {
    let background = transparent_background(image);
    let mut changed = 0;
    for pixel in image.pixels_mut() {
        if pixel[3] == 0 && *pixel != background {
            *pixel = background;
            changed += 1;
        }
    }
    changed
}

/// Normalize one PNG in place; only 8-bit RGBA images are accepted
pub fn normalize_alpha_file(path: &Path) -> Result<usize, ArtboxError> {
    let DynamicImage::ImageRgba8(mut image) = load_image(path)? else {
        return Err(ArtboxError::NotRgba {
            path: path.to_path_buf(),
        });
    };

    let changed = normalize_transparent_pixels(&mut image);
    save_png(&image, path)?;
    debug!(path = %path.display(), changed, "Normalized transparent pixels");
    Ok(changed)
}

/// Normalize every file matching the glob `pattern`
pub fn normalize_alpha(pattern: &str) -> Result<BatchReport, ArtboxError> {
    let alpha_span = span!(Level::INFO, "normalize_alpha", pattern);
    let _enter = alpha_span.enter();

    let entries = glob::glob(pattern).map_err(|err| ArtboxError::InvalidPattern {
        pattern: pattern.to_string(),
        message: err.to_string(),
    })?;

    let mut report = BatchReport::new();
    for entry in entries {
        report.processed += 1;
        match entry {
            Ok(path) => match normalize_alpha_file(&path) {
                Ok(_) => {
                    info!(path = %path.display(), "Normalized");
                    report.record_written(path);
                }
                Err(err) => report.record_failure(&path, err),
            },
            Err(err) => {
                let path = err.path().to_path_buf();
                report.record_failure(&path, err);
            }
        }
    }

    info!(%report, "Alpha normalization finished");
    Ok(report)
}
