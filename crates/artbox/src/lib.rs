//! Artbox - maintenance tools for an artwork repository
//!
//! The centerpiece is an SVG cleanup that replaces references to single-stop
//! gradients with plain colors and removes the gradient definitions that are
//! no longer needed. Around it sit the raster chores of a gallery: collages,
//! thumbnails, sprite-sheet splitting, alpha cleanup, canvas padding and a
//! generated README index.
//!
//! # Quick Start
//!
//! ```rust
//! use artbox::fix_svg;
//!
//! let svg = r#"<svg><defs><linearGradient id="a"><stop style="stop-color:#123456;"/></linearGradient></defs><path style="fill:url(#a)"/></svg>"#;
//! let fixed = fix_svg(svg).unwrap();
//! assert_eq!(fixed, r#"<svg><defs></defs><path style="fill:#123456"/></svg>"#);
//! ```
//!
//! # Advanced Usage
//!
//! ```rust
//! use artbox::prelude::*;
//!
//! let mut document = Document::parse(r#"<svg><linearGradient id="g"/></svg>"#).unwrap();
//! let mut resolver = GradientResolver::new(&document);
//! assert_eq!(resolver.resolve(&document, "g").unwrap().to_string(), TRANSPARENT);
//! assert!(!fix_document(&mut document).unwrap());
//! ```

pub mod core;
pub mod svg;
pub mod tools;

use std::path::Path;

use anyhow::Context;

pub use crate::core::{ArtboxError, BatchReport, Failure, Rect, Size};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::core::{ArtboxError, BatchReport, Rect, Size};
    pub use crate::svg::{
        fix_document, fix_markup, ColorExpr, Document, GradientResolver, NodeId, TRANSPARENT,
    };
    pub use crate::tools::{
        CollageOptions, SheetOptions, SvgRasterizer, ThumbsOptions, TwitterifyOptions,
        UpdateOptions,
    };
}

/// Fix SVG markup, returning it unchanged when nothing needed fixing
///
/// # Example
/// ```rust
/// let svg = r#"<svg><rect style="fill:#000"/></svg>"#;
/// assert_eq!(artbox::fix_svg(svg).unwrap(), svg);
/// ```
pub fn fix_svg(markup: &str) -> anyhow::Result<String> {
    let fixed = svg::fix_markup(markup).context("Failed to fix SVG markup")?;
    Ok(fixed.unwrap_or_else(|| markup.to_string()))
}

/// Fix every SVG below `dir` in place
///
/// Fails when the directory cannot be walked or any file failed.
pub fn fix_directory(dir: &Path) -> anyhow::Result<BatchReport> {
    let report = svg::fix_svg_tree(dir)
        .with_context(|| format!("Failed to scan {}", dir.display()))?;
    if !report.is_success() {
        anyhow::bail!(
            "{} of {} files could not be fixed",
            report.failures.len(),
            report.processed
        );
    }
    Ok(report)
}
