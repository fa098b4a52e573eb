//! Raster load/save helpers shared by the image tools

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use tracing::trace;

use super::error::ArtboxError;
use super::geometry::{Rect, Size};

/// JPEG quality used for every JPEG the tools write
pub const JPEG_QUALITY: u8 = 90;

/// Opaque white, the default background of collages and thumbnails
pub const WHITE: Rgba<u8> = Rgba([0xFF, 0xFF, 0xFF, 0xFF]);

/// Lowercased extension of `path`, empty when there is none
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default()
}

/// Replace the extension of `path` (given without the leading dot)
pub fn replace_ext(path: &Path, ext: &str) -> PathBuf {
    path.with_extension(ext)
}

/// Decode an image, guessing the format from its contents
pub fn load_image(path: &Path) -> Result<DynamicImage, ArtboxError> {
    trace!(path = %path.display(), "Decoding image");
    let reader = image::ImageReader::open(path)?.with_guessed_format()?;
    Ok(reader.decode()?)
}

/// Pixel size of a decoded image
pub fn size_of(image: &DynamicImage) -> Size {
    Size::new(image.width(), image.height())
}

pub(crate) fn ensure_parent(path: &Path) -> Result<(), ArtboxError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Write `image` as PNG, creating parent directories
pub fn save_png(image: &RgbaImage, path: &Path) -> Result<(), ArtboxError> {
    ensure_parent(path)?;
    image.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}

/// Write `image` as JPEG at [`JPEG_QUALITY`], creating parent directories
///
/// Alpha is dropped; callers composite onto a background first.
pub fn save_jpg(image: &RgbaImage, path: &Path) -> Result<(), ArtboxError> {
    ensure_parent(path)?;
    let rgb = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
    let writer = BufWriter::new(File::create(path)?);
    let mut encoder = JpegEncoder::new_with_quality(writer, JPEG_QUALITY);
    encoder.encode_image(&rgb)?;
    Ok(())
}

/// Write `image` in the format named by the extension of `path`
pub fn save_image(image: &RgbaImage, path: &Path) -> Result<(), ArtboxError> {
    match extension_of(path).as_str() {
        "png" => save_png(image, path),
        "jpg" | "jpeg" => save_jpg(image, path),
        other => Err(ArtboxError::unsupported_format(other)),
    }
}

/// New canvas filled with opaque white
pub fn white_canvas(size: Size) -> RgbaImage {
    RgbaImage::from_pixel(size.width, size.height, WHITE)
}

/// Resample `source` into `target` with Catmull-Rom and alpha-composite it onto `canvas`
pub fn scale_over(canvas: &mut RgbaImage, source: &DynamicImage, target: Rect) {
    if target.width == 0 || target.height == 0 {
        return;
    }
    let scaled = imageops::resize(source, target.width, target.height, FilterType::CatmullRom);
    imageops::overlay(canvas, &scaled, target.x, target.y);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of(Path::new("a/b.PNG")), "png");
        assert_eq!(extension_of(Path::new("a/b")), "");
    }

    #[test]
    fn test_replace_ext() {
        assert_eq!(
            replace_ext(Path::new("out/gopher.svg"), "png"),
            PathBuf::from("out/gopher.png")
        );
    }

    #[test]
    fn test_save_image_rejects_unknown_extension() {
        let image = white_canvas(Size::new(2, 2));
        let err = save_image(&image, Path::new("out.bmp")).unwrap_err();
        assert!(matches!(err, ArtboxError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_scale_over_fills_target_only() {
        let mut canvas = white_canvas(Size::new(4, 4));
        let source = DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 8, Rgba([0, 0, 0, 255])));
        scale_over(&mut canvas, &source, Rect::new(2, 2, 2, 2));
        assert_eq!(canvas.get_pixel(0, 0), &WHITE);
        assert_eq!(canvas.get_pixel(3, 3)[0], 0);
    }
}
