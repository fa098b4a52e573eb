//! README gallery index
//!
//! The repository keeps artwork in `vector/<set>/` and `sketch/<set>/`.
//! Every set gets thumbnails under `.thumb/<section>/<set>/` and a block of
//! linked images in `README.md`. Paths in the README are relative to the
//! gallery root and always use forward slashes.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use image::RgbaImage;
use tracing::{debug, info, span, warn, Level};

use super::collage::{make_folder_collage, Collage};
use crate::core::geometry::scale_to_height;
use crate::core::raster::{extension_of, load_image, replace_ext, save_png, scale_over, size_of};
use crate::core::walk::{file_name_of, sorted_entries};
use crate::core::{ArtboxError, Rect};

/// Thumbnail height in pixels
pub const THUMBNAIL_SIZE: u32 = 128;
/// Columns of a folder collage
pub const COLLAGE_COLUMNS: usize = 6;
/// Files whose name contains this marker are left out of the index
pub const SHEET_MARKER: &str = ".sheet.";

pub const DEFAULT_HEADER: &str = "# Artwork\n\nClick a thumbnail to open the full-size file.\n";
pub const VECTOR_HEADER: &str = "\n## Vector\n";
pub const SKETCHES_HEADER: &str = "\n## Sketches\n";

/// Turns an `.svg` into a PNG of a given height
pub trait SvgRasterizer {
    fn rasterize(&self, svg: &Path, png: &Path, height: u32) -> Result<(), ArtboxError>;
}

/// Rasterizer backed by the Inkscape command line
#[derive(Debug, Clone)]
pub struct InkscapeCommand {
    pub program: PathBuf,
}

impl Default for InkscapeCommand {
    fn default() -> Self {
        Self {
            program: PathBuf::from("inkscape"),
        }
    }
}

impl SvgRasterizer for InkscapeCommand {
    fn rasterize(&self, svg: &Path, png: &Path, height: u32) -> Result<(), ArtboxError> {
        let command = self.program.display().to_string();
        debug!(%command, svg = %svg.display(), "Exporting vector");
        let status = Command::new(&self.program)
            .arg("-h")
            .arg(height.to_string())
            .arg("-e")
            .arg(png)
            .arg(svg)
            .status()
            .map_err(|err| ArtboxError::command(&command, err.to_string()))?;

        if status.success() {
            Ok(())
        } else {
            Err(ArtboxError::command(command, format!("exited with {}", status)))
        }
    }
}

/// One thumbnail pointing at its full-size file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbLink {
    pub thumb: PathBuf,
    pub actual: PathBuf,
    pub bounds: Rect,
}

/// Thumbnails of one artwork folder
#[derive(Debug, Clone)]
pub struct ThumbSet {
    pub name: String,
    pub folder: PathBuf,
    pub output: PathBuf,
    pub links: Vec<ThumbLink>,
}

/// Options for [`update_readme`]
#[derive(Debug, Clone)]
pub struct UpdateOptions {
    /// Gallery root containing `vector/` and `sketch/`
    pub root: PathBuf,
    /// Thumbnail directory, relative to the root
    pub thumb_dir: PathBuf,
    /// README file, relative to the root
    pub readme: PathBuf,
    pub header: String,
    /// Emit a `### [Name](folder)` title above every set
    pub with_titles: bool,
    /// One collage per sketch folder instead of individual thumbnails
    pub sketch_collages: bool,
}

impl Default for UpdateOptions {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            thumb_dir: PathBuf::from(".thumb"),
            readme: PathBuf::from("README.md"),
            header: DEFAULT_HEADER.to_string(),
            with_titles: false,
            sketch_collages: false,
        }
    }
}

/// Forward-slash rendering of a relative path
pub fn to_slash(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Capitalize the first letter of every word
pub fn title_case(name: &str) -> String {
    let mut title = String::with_capacity(name.len());
    let mut at_word_start = true;
    for ch in name.chars() {
        if at_word_start {
            title.extend(ch.to_uppercase());
        } else {
            title.push(ch);
        }
        at_word_start = !ch.is_alphanumeric();
    }
    title
}

/// Thumbnail every file directly inside `root/folder` into `root/output`
///
/// Vectors go through `rasterizer`; a failed export is logged and the link is
/// kept. Rasters that fail to decode or save are logged and left out.
pub fn make_thumb_set(
    root: &Path,
    name: &str,
    folder: &Path,
    output: &Path,
    rasterizer: &dyn SvgRasterizer,
) -> Result<ThumbSet, ArtboxError> {
    let entries: Vec<PathBuf> = sorted_entries(&root.join(folder))?
        .into_iter()
        .filter(|path| path.is_file())
        .collect();
    if entries.is_empty() {
        return Err(ArtboxError::empty_input(format!(
            "no files in {}",
            folder.display()
        )));
    }

    let mut set = ThumbSet {
        name: name.to_string(),
        folder: folder.to_path_buf(),
        output: output.to_path_buf(),
        links: Vec::new(),
    };

    for entry in entries {
        let file_name = file_name_of(&entry);
        if file_name.contains(SHEET_MARKER) {
            continue;
        }
        let actual = folder.join(&file_name);
        let thumb = replace_ext(&output.join(&file_name), "png");
        let thumb_on_disk = root.join(&thumb);

        if extension_of(&entry) == "svg" {
            // inkscape refuses to overwrite some targets
            let _ = fs::remove_file(&thumb_on_disk);
            if let Some(parent) = thumb_on_disk.parent() {
                fs::create_dir_all(parent)?;
            }
            if let Err(err) = rasterizer.rasterize(&entry, &thumb_on_disk, THUMBNAIL_SIZE) {
                warn!(path = %entry.display(), error = %err, "Vector export failed");
            }
            set.links.push(ThumbLink {
                thumb,
                actual,
                bounds: Rect::new(0, 0, 0, THUMBNAIL_SIZE),
            });
            continue;
        }

        let image = match load_image(&entry) {
            Ok(image) => image,
            Err(err) => {
                warn!(path = %entry.display(), error = %err, "Skipping undecodable file");
                continue;
            }
        };
        let size = scale_to_height(size_of(&image), THUMBNAIL_SIZE);
        let bounds = Rect::new(0, 0, size.width, size.height);
        let mut canvas = RgbaImage::new(size.width, size.height);
        scale_over(&mut canvas, &image, bounds);
        if let Err(err) = save_png(&canvas, &thumb_on_disk) {
            warn!(path = %thumb.display(), error = %err, "Failed to write thumbnail");
            continue;
        }
        set.links.push(ThumbLink {
            thumb,
            actual,
            bounds,
        });
    }

    debug!(set = name, links = set.links.len(), "Built thumbnail set");
    Ok(set)
}

/// Sub-directories of `root/section`, sorted; a missing section is empty
fn section_folders(root: &Path, section: &str) -> Vec<String> {
    match sorted_entries(&root.join(section)) {
        Ok(entries) => entries
            .into_iter()
            .filter(|path| path.is_dir())
            .map(|path| file_name_of(&path))
            .collect(),
        Err(err) => {
            warn!(section, error = %err, "Section not readable");
            Vec::new()
        }
    }
}

/// Thumbnail sets for every folder of `section`
pub fn build_section(
    root: &Path,
    section: &str,
    thumb_dir: &Path,
    rasterizer: &dyn SvgRasterizer,
) -> Vec<ThumbSet> {
    let section_span = span!(Level::INFO, "section", section);
    let _enter = section_span.enter();

    let mut sets = Vec::new();
    for folder in section_folders(root, section) {
        let relative = Path::new(section).join(&folder);
        let output = thumb_dir.join(section).join(&folder);
        match make_thumb_set(root, &title_case(&folder), &relative, &output, rasterizer) {
            Ok(set) => sets.push(set),
            Err(err) => warn!(folder = %relative.display(), error = %err, "Skipping folder"),
        }
    }
    sets
}

/// One collage per folder of `section`, written to `<thumb_dir>/<section>/<folder>.jpg`
pub fn build_section_collages(root: &Path, section: &str, thumb_dir: &Path) -> Vec<(String, Collage)> {
    let mut collages = Vec::new();
    for folder in section_folders(root, section) {
        let relative = Path::new(section).join(&folder);
        let output = thumb_dir.join(section).join(format!("{}.jpg", folder));
        match make_folder_collage(
            &root.join(&relative),
            &root.join(&output),
            THUMBNAIL_SIZE,
            COLLAGE_COLUMNS,
        ) {
            Ok(mut collage) => {
                collage.output = output;
                collages.push((title_case(&folder), collage));
            }
            Err(err) => warn!(folder = %relative.display(), error = %err, "Skipping folder"),
        }
    }
    collages
}

/// Index block for thumbnail sets
pub fn render_thumbs_index(with_titles: bool, sets: &[ThumbSet]) -> String {
    let mut out = String::new();
    for set in sets {
        if with_titles {
            let _ = writeln!(out, "\n### [{}]({})\n", set.name, to_slash(&set.folder));
        }
        for link in &set.links {
            let _ = writeln!(
                out,
                "[<img src=\"{}\">]({})",
                to_slash(&link.thumb),
                to_slash(&link.actual)
            );
        }
    }
    // All sets form one paragraph
    out.push_str("\n\n");
    out
}

/// Index block for folder collages, one linked image per folder
pub fn render_collage_index(with_titles: bool, root: &Path, collages: &[(String, Collage)]) -> String {
    let mut out = String::new();
    for (name, collage) in collages {
        let folder = collage
            .links
            .first()
            .and_then(|link| link.source.parent())
            .map(|parent| parent.strip_prefix(root).unwrap_or(parent).to_path_buf())
            .unwrap_or_default();
        if with_titles {
            let _ = writeln!(out, "\n### [{}]({})\n", name, to_slash(&folder));
        }
        let _ = writeln!(
            out,
            "[<img src=\"{}\">]({})",
            to_slash(&collage.output),
            to_slash(&folder)
        );
    }
    out
}

/// Regenerate thumbnails and write the README; returns the README path
pub fn update_readme(
    options: &UpdateOptions,
    rasterizer: &dyn SvgRasterizer,
) -> Result<PathBuf, ArtboxError> {
    let update_span = span!(Level::INFO, "update", root = %options.root.display());
    let _enter = update_span.enter();

    let root = options.root.as_path();
    let vectors = build_section(root, "vector", &options.thumb_dir, rasterizer);
    let sketches = if options.sketch_collages {
        let collages = build_section_collages(root, "sketch", &options.thumb_dir);
        render_collage_index(options.with_titles, root, &collages)
    } else {
        let sets = build_section(root, "sketch", &options.thumb_dir, rasterizer);
        render_thumbs_index(options.with_titles, &sets)
    };

    let mut readme = String::new();
    readme.push_str(&options.header);
    readme.push('\n');
    readme.push_str(VECTOR_HEADER);
    readme.push('\n');
    readme.push_str(&render_thumbs_index(options.with_titles, &vectors));
    readme.push_str(SKETCHES_HEADER);
    readme.push('\n');
    readme.push_str(&sketches);

    let path = root.join(&options.readme);
    fs::write(&path, readme)?;
    info!(path = %path.display(), vector_sets = vectors.len(), "Wrote README");
    Ok(path)
}
