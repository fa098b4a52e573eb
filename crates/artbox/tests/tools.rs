//! Batch tools against real files in temporary directories

use std::fs;
use std::path::Path;

use artbox::core::raster::{load_image, save_png};
use artbox::tools::{
    make_collage, make_thumbs, normalize_alpha, split_sheet, twitterify, CollageOptions,
    SheetOptions, ThumbsOptions, TwitterifyOptions,
};
use artbox::{ArtboxError, Size};
use image::{Rgba, RgbaImage};

fn workdir() -> tempfile::TempDir {
    tempfile::Builder::new().prefix("artbox").tempdir().unwrap()
}

fn checker(path: &Path, width: u32, height: u32) {
    let image = RgbaImage::from_fn(width, height, |x, y| {
        if (x + y) % 2 == 0 {
            Rgba([0, 0, 0, 255])
        } else {
            Rgba([255, 0, 0, 255])
        }
    });
    save_png(&image, path).unwrap();
}

#[test]
fn collage_grid_size_follows_image_count() {
    let dir = workdir();
    for i in 0..10 {
        checker(&dir.path().join(format!("art/{i:02}.png")), 100, 70);
    }

    let options = CollageOptions {
        columns: 4,
        cell: 32,
        output: dir.path().join("collage.jpg"),
        ..CollageOptions::default()
    };
    let collage = make_collage(&dir.path().join("art"), &options).unwrap();
    assert_eq!(collage.links.len(), 10);
    assert!(collage.links[0].source.ends_with("00.png"));

    let written = load_image(&options.output).unwrap();
    assert_eq!((written.width(), written.height()), (128, 96));
}

#[test]
fn collage_does_not_include_previous_output() {
    let dir = workdir();
    checker(&dir.path().join("a.png"), 80, 80);
    let options = CollageOptions {
        output: dir.path().join("collage.png"),
        ..CollageOptions::default()
    };

    make_collage(dir.path(), &options).unwrap();
    let again = make_collage(dir.path(), &options).unwrap();
    assert_eq!(again.links.len(), 1);
}

#[test]
fn thumbs_are_written_as_jpeg() {
    let dir = workdir();
    checker(&dir.path().join("src/a/tall.png"), 50, 200);

    let options = ThumbsOptions {
        cell: 64,
        output: dir.path().join("out"),
    };
    let report = make_thumbs(&dir.path().join("src"), &options).unwrap();
    assert!(report.is_success());

    let thumb = dir.path().join("out/a/tall.jpg");
    let image = load_image(&thumb).unwrap();
    assert_eq!((image.width(), image.height()), (16, 64));
}

#[test]
fn split_sheet_with_named_frames() {
    let dir = workdir();
    checker(&dir.path().join("hero.png"), 8, 4);
    fs::write(
        dir.path().join("hero.json"),
        r#"{"frames":{"hero 0.aseprite":{"frame":{"x":0,"y":0,"w":4,"h":4}},"hero 1.aseprite":{"frame":{"x":4,"y":0,"w":4,"h":4}}},
           "meta":{"app":"http://www.aseprite.org/","frameTags":[{"name":"idle","from":0,"to":0,"direction":"forward"},{"name":"jump","from":1,"to":1}]}}"#,
    )
    .unwrap();

    let out = dir.path().join("frames");
    let written = split_sheet(
        &dir.path().join("hero.png"),
        &dir.path().join("hero.json"),
        &out,
        &SheetOptions::default(),
    )
    .unwrap();
    assert_eq!(written, vec![out.join("gopher-idle.png"), out.join("gopher-jump.png")]);

    let jump = load_image(&out.join("gopher-jump.png")).unwrap().to_rgba8();
    assert_eq!(jump.dimensions(), (4, 4));
    assert_eq!(jump.get_pixel(0, 0), &Rgba([0, 0, 0, 255]));
    assert_eq!(jump.get_pixel(1, 0), &Rgba([255, 0, 0, 255]));
}

#[test]
fn normalize_alpha_uses_transparent_corner() {
    let dir = workdir();
    let path = dir.path().join("sprite.png");
    let mut image = RgbaImage::from_pixel(3, 3, Rgba([1, 2, 3, 0]));
    image.put_pixel(1, 1, Rgba([50, 50, 50, 255]));
    image.put_pixel(2, 2, Rgba([99, 99, 99, 0]));
    save_png(&image, &path).unwrap();

    let report = normalize_alpha(&format!("{}/*.png", dir.path().display())).unwrap();
    assert!(report.is_success());

    let fixed = load_image(&path).unwrap().to_rgba8();
    assert_eq!(fixed.get_pixel(2, 2), &Rgba([1, 2, 3, 0]));
    assert_eq!(fixed.get_pixel(1, 1), &Rgba([50, 50, 50, 255]));
}

#[test]
fn twitterify_transparent_png() {
    let dir = workdir();
    checker(&dir.path().join("in.png"), 20, 200);

    let options = TwitterifyOptions {
        min_size: Size::new(100, 50),
        transparent: true,
        ..TwitterifyOptions::default()
    };
    let output = dir.path().join("out/padded.png");
    twitterify(&dir.path().join("in.png"), &output, &options).unwrap();

    let padded = load_image(&output).unwrap().to_rgba8();
    assert_eq!(padded.dimensions(), (100, 200));
    assert_eq!(padded.get_pixel(0, 0)[3], 0);
    assert_eq!(padded.get_pixel(40, 0)[3], 255);
}

#[test]
fn twitterify_missing_input() {
    let dir = workdir();
    let err = twitterify(
        &dir.path().join("nope.png"),
        &dir.path().join("out.png"),
        &TwitterifyOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, ArtboxError::Io { .. } | ArtboxError::Image { .. }));
}
