//! Grid collages of a directory of images

use std::fs;
use std::path::{Path, PathBuf};

use image::{DynamicImage, RgbaImage};
use rand::seq::SliceRandom;
use tracing::{debug, info, span, warn, Level};

use crate::core::geometry::{fit_centered, fit_into_frame, grid_rows};
use crate::core::raster::{load_image, save_image, scale_over, size_of, white_canvas};
use crate::core::walk::{collect_with_extensions, sorted_entries, RASTER_EXTENSIONS};
use crate::core::{ArtboxError, Rect, Size};

/// How an image sits inside its grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Placement {
    /// Centered on both axes
    #[default]
    Centered,
    /// Horizontally centered, resting on the bottom edge
    Bottom,
}

impl Placement {
    fn fit(self, size: Size, cell: Rect) -> Rect {
        match self {
            Placement::Centered => fit_centered(size, cell),
            Placement::Bottom => fit_into_frame(size, cell),
        }
    }
}

/// Options for [`make_collage`]
#[derive(Debug, Clone)]
pub struct CollageOptions {
    pub columns: usize,
    /// Edge length of one square cell in pixels
    pub cell: u32,
    /// Images narrower or shorter than this are left out
    pub min_side: u32,
    /// Output file; the extension picks the encoder
    pub output: PathBuf,
    /// Random cell order instead of path order
    pub shuffle: bool,
}

impl Default for CollageOptions {
    fn default() -> Self {
        Self {
            columns: 8,
            cell: 128,
            min_side: 64,
            output: PathBuf::from("collage.jpg"),
            shuffle: false,
        }
    }
}

/// A placed image: where it came from and where it landed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageLink {
    pub source: PathBuf,
    pub bounds: Rect,
}

/// Canvas plus a cursor that fills cells left to right, top to bottom
#[derive(Debug)]
pub struct CollageGrid {
    canvas: RgbaImage,
    columns: usize,
    cell: u32,
    placement: Placement,
    cursor: usize,
    links: Vec<ImageLink>,
}

impl CollageGrid {
    /// White canvas sized for `count` images
    pub fn new(count: usize, columns: usize, cell: u32, placement: Placement) -> Self {
        let columns = columns.max(1);
        let rows = grid_rows(count, columns) as u32;
        let size = Size::new(cell * columns as u32, cell * rows);
        debug!(count, columns, rows, width = size.width, height = size.height, "Collage canvas");

        Self {
            canvas: white_canvas(size),
            columns,
            cell,
            placement,
            cursor: 0,
            links: Vec::new(),
        }
    }

    /// Bounds of the cell at `index`
    pub fn cell_bounds(&self, index: usize) -> Rect {
        let column = (index % self.columns) as i64;
        let row = (index / self.columns) as i64;
        let cell = self.cell as i64;
        Rect::new(column * cell, row * cell, self.cell, self.cell)
    }

    /// Draw `image` into the next free cell
    pub fn push(&mut self, source: &Path, image: &DynamicImage) -> Rect {
        let cell = self.cell_bounds(self.cursor);
        let bounds = self.placement.fit(size_of(image), cell);
        scale_over(&mut self.canvas, image, bounds);

        self.cursor += 1;
        self.links.push(ImageLink {
            source: source.to_path_buf(),
            bounds,
        });
        bounds
    }

    pub fn placed(&self) -> usize {
        self.cursor
    }

    pub fn links(&self) -> &[ImageLink] {
        &self.links
    }

    pub fn canvas(&self) -> &RgbaImage {
        &self.canvas
    }

    pub fn into_parts(self) -> (RgbaImage, Vec<ImageLink>) {
        (self.canvas, self.links)
    }
}

/// A written collage
#[derive(Debug, Clone)]
pub struct Collage {
    pub output: PathBuf,
    pub links: Vec<ImageLink>,
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Decode `paths`, skipping undecodable files and images below `min_side`
fn load_usable(paths: &[PathBuf], min_side: u32) -> Vec<(PathBuf, DynamicImage)> {
    let mut images = Vec::with_capacity(paths.len());
    for path in paths {
        let image = match load_image(path) {
            Ok(image) => image,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "Skipping undecodable image");
                continue;
            }
        };
        if image.width() < min_side || image.height() < min_side {
            debug!(path = %path.display(), "Skipping small image");
            continue;
        }
        images.push((path.clone(), image));
    }
    images
}

/// Lay out every raster image under `dir` in a grid and save it
pub fn make_collage(dir: &Path, options: &CollageOptions) -> Result<Collage, ArtboxError> {
    let collage_span = span!(Level::INFO, "collage", dir = %dir.display());
    let _enter = collage_span.enter();

    let paths: Vec<PathBuf> = collect_with_extensions(dir, RASTER_EXTENSIONS)?
        .into_iter()
        .filter(|path| !same_file(path, &options.output))
        .collect();

    let mut images = load_usable(&paths, options.min_side);
    if images.is_empty() {
        return Err(ArtboxError::empty_input(format!(
            "no usable images under {}",
            dir.display()
        )));
    }

    if options.shuffle {
        images.shuffle(&mut rand::thread_rng());
    }

    let mut grid = CollageGrid::new(images.len(), options.columns, options.cell, Placement::Centered);
    for (path, image) in &images {
        grid.push(path, image);
    }

    let (canvas, links) = grid.into_parts();
    save_image(&canvas, &options.output)?;
    info!(output = %options.output.display(), images = links.len(), "Wrote collage");

    Ok(Collage {
        output: options.output.clone(),
        links,
    })
}

/// Collage of the files directly inside `folder`, bottom aligned
///
/// Columns are capped at `max_columns` and at the number of files.
pub fn make_folder_collage(
    folder: &Path,
    output: &Path,
    cell: u32,
    max_columns: usize,
) -> Result<Collage, ArtboxError> {
    let paths: Vec<PathBuf> = sorted_entries(folder)?
        .into_iter()
        .filter(|path| path.is_file())
        .collect();
    let images = load_usable(&paths, 0);
    if images.is_empty() {
        return Err(ArtboxError::empty_input(format!(
            "no images in {}",
            folder.display()
        )));
    }

    let columns = max_columns.min(images.len());
    let mut grid = CollageGrid::new(images.len(), columns, cell, Placement::Bottom);
    for (path, image) in &images {
        grid.push(path, image);
    }

    let (canvas, links) = grid.into_parts();
    save_image(&canvas, output)?;
    info!(output = %output.display(), "Wrote folder collage");

    Ok(Collage {
        output: output.to_path_buf(),
        links,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::raster::{save_png, WHITE};
    use crate::core::walk::file_name_of;
    use image::Rgba;

    fn workdir() -> tempfile::TempDir {
        tempfile::Builder::new().prefix("artbox").tempdir().unwrap()
    }

    fn solid(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba([10, 20, 30, 255]))
    }

    #[test]
    fn test_grid_cells_fill_rows_first() {
        let grid = CollageGrid::new(3, 2, 10, Placement::Centered);
        assert_eq!(grid.canvas().dimensions(), (20, 20));
        assert_eq!(grid.cell_bounds(1), Rect::new(10, 0, 10, 10));
        assert_eq!(grid.cell_bounds(2), Rect::new(0, 10, 10, 10));
    }

    #[test]
    fn test_push_records_links() {
        let mut grid = CollageGrid::new(1, 4, 8, Placement::Bottom);
        let image = DynamicImage::ImageRgba8(solid(4, 8));
        let bounds = grid.push(Path::new("a.png"), &image);
        assert_eq!(bounds, Rect::new(2, 0, 4, 8));
        assert_eq!(grid.placed(), 1);
        assert_eq!(grid.links()[0].source, PathBuf::from("a.png"));
        assert_eq!(grid.canvas().get_pixel(0, 0), &WHITE);
    }

    #[test]
    fn test_collage_skips_small_and_broken_files() {
        let dir = workdir();
        save_png(&solid(80, 80), &dir.path().join("big.png")).unwrap();
        save_png(&solid(10, 10), &dir.path().join("small.png")).unwrap();
        fs::write(dir.path().join("broken.jpg"), b"not an image").unwrap();

        let options = CollageOptions {
            output: dir.path().join("collage.png"),
            ..CollageOptions::default()
        };
        let collage = make_collage(dir.path(), &options).unwrap();
        assert_eq!(collage.links.len(), 1);

        let written = load_image(&options.output).unwrap();
        assert_eq!((written.width(), written.height()), (8 * 128, 128));
    }

    #[test]
    fn test_shuffled_collage_places_every_image() {
        let dir = workdir();
        for name in ["a", "b", "c", "d", "e"] {
            save_png(&solid(80, 80), &dir.path().join(format!("{}.png", name))).unwrap();
        }
        save_png(&solid(10, 10), &dir.path().join("tiny.png")).unwrap();

        let options = CollageOptions {
            columns: 2,
            cell: 16,
            output: dir.path().join("collage.png"),
            shuffle: true,
            ..CollageOptions::default()
        };
        let collage = make_collage(dir.path(), &options).unwrap();

        let mut sources: Vec<_> = collage
            .links
            .iter()
            .map(|link| file_name_of(&link.source))
            .collect();
        sources.sort();
        assert_eq!(sources, ["a.png", "b.png", "c.png", "d.png", "e.png"]);

        let mut cells: Vec<_> = collage
            .links
            .iter()
            .map(|link| (link.bounds.x, link.bounds.y))
            .collect();
        cells.sort();
        cells.dedup();
        assert_eq!(cells.len(), 5);

        let written = load_image(&options.output).unwrap();
        assert_eq!((written.width(), written.height()), (32, 48));
    }

    #[test]
    fn test_collage_without_images_is_empty_input() {
        let dir = workdir();
        let options = CollageOptions {
            output: dir.path().join("collage.jpg"),
            ..CollageOptions::default()
        };
        assert!(matches!(
            make_collage(dir.path(), &options),
            Err(ArtboxError::EmptyInput { .. })
        ));
    }

    #[test]
    fn test_folder_collage_caps_columns() {
        let dir = workdir();
        save_png(&solid(20, 40), &dir.path().join("a.png")).unwrap();
        save_png(&solid(40, 20), &dir.path().join("b.png")).unwrap();
        let output = dir.path().join("out").join("c.png");

        let collage = make_folder_collage(dir.path(), &output, 16, 6).unwrap();
        assert_eq!(collage.links.len(), 2);
        let written = load_image(&output).unwrap();
        assert_eq!((written.width(), written.height()), (32, 16));
    }
}
