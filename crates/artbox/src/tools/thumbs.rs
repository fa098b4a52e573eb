//! JPEG thumbnails mirroring a directory tree

use std::path::{Path, PathBuf};

use tracing::{info, span, Level};

use crate::core::geometry::scale_to_long_side;
use crate::core::raster::{
    extension_of, load_image, replace_ext, save_jpg, scale_over, size_of, white_canvas,
};
use crate::core::walk::{collect_files, file_name_of, RASTER_EXTENSIONS};
use crate::core::{ArtboxError, BatchReport, Rect};

/// Files whose name contains this marker are never thumbnailed
pub const SKETCH_MARKER: &str = ".sketch.";

/// Options for [`make_thumbs`]
#[derive(Debug, Clone)]
pub struct ThumbsOptions {
    /// Long side of every thumbnail in pixels
    pub cell: u32,
    /// Root the thumbnails are written under
    pub output: PathBuf,
}

impl Default for ThumbsOptions {
    fn default() -> Self {
        Self {
            cell: 128,
            output: PathBuf::from(".thumb"),
        }
    }
}

fn wants_thumbnail(path: &Path, output: &Path) -> bool {
    RASTER_EXTENSIONS.contains(&extension_of(path).as_str())
        && !file_name_of(path).contains(SKETCH_MARKER)
        && !path.starts_with(output)
}

/// Thumbnail of one image: long side `cell`, flattened onto white, saved as JPEG
pub fn make_thumb(source: &Path, target: &Path, cell: u32) -> Result<(), ArtboxError> {
    let image = load_image(source)?;
    let size = scale_to_long_side(size_of(&image), cell);

    let mut canvas = white_canvas(size);
    scale_over(&mut canvas, &image, Rect::new(0, 0, size.width, size.height));
    save_jpg(&canvas, target)
}

/// Thumbnail every raster under `dir` into `options.output`, keeping relative paths
pub fn make_thumbs(dir: &Path, options: &ThumbsOptions) -> Result<BatchReport, ArtboxError> {
    let thumbs_span = span!(Level::INFO, "thumbs", dir = %dir.display());
    let _enter = thumbs_span.enter();

    let mut report = BatchReport::new();
    for path in collect_files(dir, |path| wants_thumbnail(path, &options.output))? {
        report.processed += 1;
        let relative = path.strip_prefix(dir).unwrap_or(&path);
        let target = replace_ext(&options.output.join(relative), "jpg");

        match make_thumb(&path, &target, options.cell) {
            Ok(()) => {
                info!(path = %target.display(), "Wrote thumbnail");
                report.record_written(target);
            }
            Err(err) => report.record_failure(&path, err),
        }
    }

    info!(%report, "Thumbnails finished");
    Ok(report)
}
