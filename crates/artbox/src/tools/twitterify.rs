//! Pad images and animations to a minimum canvas
//!
//! Timelines crop small images aggressively; centering the artwork on a
//! canvas of at least 506x128 keeps it whole. Animated GIFs are padded frame
//! by frame and can be lengthened so short loops do not flicker.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use image::codecs::gif::{GifDecoder, GifEncoder, Repeat};
use image::{imageops, AnimationDecoder, Delay, Frame, Rgba, RgbaImage};
use tracing::{debug, info, span, Level};

use crate::core::geometry::center_offset;
use crate::core::raster::{ensure_parent, extension_of, load_image, save_png, WHITE};
use crate::core::{ArtboxError, Size};

/// Options for [`twitterify`]
#[derive(Debug, Clone)]
pub struct TwitterifyOptions {
    /// Smallest canvas; larger sources keep their size on that axis
    pub min_size: Size,
    /// How many times the GIF frame sequence is played per loop
    pub repeat: usize,
    /// Leave the padding transparent
    pub transparent: bool,
    /// Emit each GIF frame twice at half its delay
    pub duplicate: bool,
    /// Frame delay override in centiseconds; 0 keeps the source delays
    pub duration: u32,
}

impl Default for TwitterifyOptions {
    fn default() -> Self {
        Self {
            min_size: Size::new(506, 128),
            repeat: 3,
            transparent: false,
            duplicate: false,
            duration: 0,
        }
    }
}

/// Center `source` on a canvas filled with `background`
pub fn pad_image(source: &RgbaImage, min_size: Size, background: Rgba<u8>) -> RgbaImage {
    let source_size = Size::new(source.width(), source.height());
    let canvas_size = source_size.max(min_size);
    let mut canvas = RgbaImage::from_pixel(canvas_size.width, canvas_size.height, background);

    let (x, y) = center_offset(source_size, canvas_size);
    imageops::overlay(&mut canvas, source, x, y);
    canvas
}

fn halve(delay: Delay) -> Delay {
    let (numer, denom) = delay.numer_denom_ms();
    Delay::from_numer_denom_ms(numer, denom.saturating_mul(2))
}

/// Pad every frame and apply the delay, duplicate and repeat options
pub fn pad_frames(frames: Vec<Frame>, options: &TwitterifyOptions) -> Vec<Frame> {
    let padded: Vec<Frame> = frames
        .into_iter()
        .map(|frame| {
            let delay = if options.duration > 0 {
                Delay::from_numer_denom_ms(options.duration * 10, 1)
            } else {
                frame.delay()
            };
            let buffer = frame.buffer();
            let background = if options.transparent {
                Rgba([0, 0, 0, 0])
            } else {
                buffer.pixels().next().copied().unwrap_or(WHITE)
            };
            Frame::from_parts(pad_image(buffer, options.min_size, background), 0, 0, delay)
        })
        .collect();

    if options.duplicate {
        let last = padded.len().saturating_sub(1);
        let mut doubled = Vec::with_capacity(padded.len() * 2);
        for (index, frame) in padded.into_iter().enumerate() {
            let delay = halve(frame.delay());
            let buffer = frame.into_buffer();
            if index != last {
                doubled.push(Frame::from_parts(buffer.clone(), 0, 0, delay));
            }
            doubled.push(Frame::from_parts(buffer, 0, 0, delay));
        }
        return doubled;
    }

    let repeat = options.repeat.max(1);
    let mut repeated = Vec::with_capacity(padded.len() * repeat);
    for _ in 0..repeat {
        repeated.extend(padded.iter().cloned());
    }
    repeated
}

fn twitterify_png(input: &Path, output: &Path, options: &TwitterifyOptions) -> Result<(), ArtboxError> {
    let source = load_image(input)?.to_rgba8();
    let background = if options.transparent {
        Rgba([0, 0, 0, 0])
    } else {
        WHITE
    };
    save_png(&pad_image(&source, options.min_size, background), output)
}

fn twitterify_gif(input: &Path, output: &Path, options: &TwitterifyOptions) -> Result<(), ArtboxError> {
    let decoder = GifDecoder::new(BufReader::new(File::open(input)?))?;
    let frames = decoder.into_frames().collect_frames()?;
    if frames.is_empty() {
        return Err(ArtboxError::empty_input(format!(
            "no frames in {}",
            input.display()
        )));
    }
    debug!(frames = frames.len(), "Decoded animation");

    let frames = pad_frames(frames, options);
    ensure_parent(output)?;
    let mut encoder = GifEncoder::new(BufWriter::new(File::create(output)?));
    encoder.set_repeat(Repeat::Infinite)?;
    encoder.encode_frames(frames)?;
    Ok(())
}

/// Pad `input` (PNG or GIF) and write the result to `output`
pub fn twitterify(input: &Path, output: &Path, options: &TwitterifyOptions) -> Result<(), ArtboxError> {
    let twitterify_span = span!(Level::INFO, "twitterify", input = %input.display());
    let _enter = twitterify_span.enter();

    match extension_of(input).as_str() {
        "png" => twitterify_png(input, output, options)?,
        "gif" => twitterify_gif(input, output, options)?,
        other => return Err(ArtboxError::unsupported_format(other)),
    }

    info!(output = %output.display(), "Wrote padded image");
    Ok(())
}
