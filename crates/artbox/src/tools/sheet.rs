//! Split a sprite sheet into one PNG per animation tag
//!
//! The atlas is the JSON written by Aseprite's "Export Sprite Sheet". Frames
//! come either as an array or as an object keyed by frame name; for the
//! object form the key order of the file is the frame order.

use std::fs;
use std::path::{Path, PathBuf};

use image::{imageops, RgbaImage};
use serde::Deserialize;
use tracing::{debug, info, span, Level};

use crate::core::raster::{load_image, save_png, white_canvas};
use crate::core::{ArtboxError, Rect, Size};

/// Sheet atlas as exported by Aseprite; unknown fields are ignored
#[derive(Debug, Clone, Deserialize)]
pub struct Atlas {
    pub frames: Frames,
    #[serde(default)]
    pub meta: Meta,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Frames {
    List(Vec<FrameEntry>),
    Named(serde_json::Map<String, serde_json::Value>),
}

#[derive(Debug, Clone, Deserialize)]
pub struct FrameEntry {
    pub frame: FrameRect,
}

/// Frame rectangle in sheet pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct FrameRect {
    pub x: i64,
    pub y: i64,
    pub w: u32,
    pub h: u32,
}

impl From<FrameRect> for Rect {
    fn from(frame: FrameRect) -> Self {
        Rect::new(frame.x, frame.y, frame.w, frame.h)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Meta {
    #[serde(rename = "frameTags", default)]
    pub frame_tags: Vec<FrameTag>,
}

/// Named animation starting at frame `from`
#[derive(Debug, Clone, Deserialize)]
pub struct FrameTag {
    pub name: String,
    pub from: usize,
}

impl Atlas {
    pub fn from_json(json: &str) -> Result<Self, ArtboxError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, ArtboxError> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    /// Frames in file order
    pub fn frame_rects(&self) -> Result<Vec<Rect>, ArtboxError> {
        match &self.frames {
            Frames::List(entries) => Ok(entries.iter().map(|entry| entry.frame.into()).collect()),
            Frames::Named(entries) => entries
                .iter()
                .map(|(name, value)| {
                    serde_json::from_value::<FrameEntry>(value.clone())
                        .map(|entry| entry.frame.into())
                        .map_err(|err| ArtboxError::atlas(format!("frame '{}': {}", name, err)))
                })
                .collect(),
        }
    }
}

/// Options for [`split_sheet`]
#[derive(Debug, Clone)]
pub struct SheetOptions {
    /// Keep the sheet's alpha instead of flattening onto white
    pub transparent: bool,
    /// Output files are named `<prefix>-<tag>.png`
    pub prefix: String,
}

impl Default for SheetOptions {
    fn default() -> Self {
        Self {
            transparent: true,
            prefix: "gopher".to_string(),
        }
    }
}

/// Copy `area` out of `sheet`; pixels outside the sheet stay transparent
pub fn crop(sheet: &RgbaImage, area: Rect) -> RgbaImage {
    let mut target = RgbaImage::new(area.width, area.height);
    imageops::replace(&mut target, sheet, -area.x, -area.y);
    target
}

/// Write one PNG per frame tag of `atlas` into `out_dir`
pub fn split_sheet(
    sheet: &Path,
    atlas: &Path,
    out_dir: &Path,
    options: &SheetOptions,
) -> Result<Vec<PathBuf>, ArtboxError> {
    let sheet_span = span!(Level::INFO, "split_sheet", sheet = %sheet.display());
    let _enter = sheet_span.enter();

    let source = load_image(sheet)?.to_rgba8();
    let atlas = Atlas::from_path(atlas)?;
    let frames = atlas.frame_rects()?;
    debug!(
        frames = frames.len(),
        tags = atlas.meta.frame_tags.len(),
        "Loaded atlas"
    );

    let mut written = Vec::with_capacity(atlas.meta.frame_tags.len());
    for tag in &atlas.meta.frame_tags {
        let area = *frames.get(tag.from).ok_or_else(|| {
            ArtboxError::atlas(format!(
                "tag '{}' starts at frame {} but the atlas has {} frames",
                tag.name,
                tag.from,
                frames.len()
            ))
        })?;

        let mut frame = crop(&source, area);
        if !options.transparent {
            let mut canvas = white_canvas(Size::new(area.width, area.height));
            imageops::overlay(&mut canvas, &frame, 0, 0);
            frame = canvas;
        }

        let path = out_dir.join(format!("{}-{}.png", options.prefix, tag.name));
        save_png(&frame, &path)?;
        info!(path = %path.display(), "Wrote frame");
        written.push(path);
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

    #[test]
    fn test_frames_as_array() {
        let atlas = Atlas::from_json(
            r#"{"frames":[{"frame":{"x":0,"y":0,"w":4,"h":4},"duration":100}],"meta":{"frameTags":[{"name":"idle","from":0,"to":0}]}}"#,
        )
        .unwrap();
        assert_eq!(atlas.frame_rects().unwrap(), vec![Rect::new(0, 0, 4, 4)]);
        assert_eq!(atlas.meta.frame_tags[0].name, "idle");
    }

    #[test]
    fn test_named_frames_keep_file_order() {
        let atlas = Atlas::from_json(
            r#"{"frames":{"z.png":{"frame":{"x":8,"y":0,"w":2,"h":2}},"a.png":{"frame":{"x":0,"y":0,"w":2,"h":2}}},"meta":{}}"#,
        )
        .unwrap();
        let rects = atlas.frame_rects().unwrap();
        assert_eq!(rects[0].x, 8);
        assert_eq!(rects[1].x, 0);
    }

    #[test]
    fn test_crop_outside_sheet_is_transparent() {
        let sheet = RgbaImage::from_pixel(4, 4, RED);
        let frame = crop(&sheet, Rect::new(2, 2, 4, 4));
        assert_eq!(frame.get_pixel(0, 0), &RED);
        assert_eq!(frame.get_pixel(3, 3), &Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn test_split_sheet_writes_each_tag() {
        let dir = tempfile::Builder::new().prefix("artbox").tempdir().unwrap();
        let sheet_path = dir.path().join("sheet.png");
        let mut sheet = RgbaImage::new(8, 4);
        for x in 0..4 {
            for y in 0..4 {
                sheet.put_pixel(x, y, RED);
            }
        }
        save_png(&sheet, &sheet_path).unwrap();

        let atlas_path = dir.path().join("sheet.json");
        fs::write(
            &atlas_path,
            r#"{"frames":[{"frame":{"x":0,"y":0,"w":4,"h":4}},{"frame":{"x":4,"y":0,"w":4,"h":4}}],
               "meta":{"frameTags":[{"name":"walk","from":0},{"name":"blank","from":1}]}}"#,
        )
        .unwrap();

        let options = SheetOptions {
            transparent: false,
            prefix: "hero".to_string(),
        };
        let out = dir.path().join("out");
        let written = split_sheet(&sheet_path, &atlas_path, &out, &options).unwrap();
        assert_eq!(written, vec![out.join("hero-walk.png"), out.join("hero-blank.png")]);

        let blank = load_image(&out.join("hero-blank.png")).unwrap().to_rgba8();
        assert_eq!(blank.get_pixel(1, 1), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_tag_past_last_frame_is_an_atlas_error() {
        let dir = tempfile::Builder::new().prefix("artbox").tempdir().unwrap();
        let sheet_path = dir.path().join("sheet.png");
        save_png(&RgbaImage::new(2, 2), &sheet_path).unwrap();
        let atlas_path = dir.path().join("sheet.json");
        fs::write(
            &atlas_path,
            r#"{"frames":[],"meta":{"frameTags":[{"name":"run","from":3}]}}"#,
        )
        .unwrap();

        let err = split_sheet(&sheet_path, &atlas_path, dir.path(), &SheetOptions::default())
            .unwrap_err();
        assert!(matches!(err, ArtboxError::Atlas { .. }));
    }
}
