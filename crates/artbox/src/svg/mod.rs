//! SVG processing
//!
//! A small arena-backed markup tree plus the gradient-style fix built on it.
//!
//! ```rust
//! use artbox::svg::fix_markup;
//!
//! let svg = r#"<svg><defs><linearGradient id="g"><stop style="stop-color:#f00;"/></linearGradient></defs><rect style="fill:url(#g)"/></svg>"#;
//! let fixed = fix_markup(svg).unwrap().unwrap();
//! assert!(fixed.contains("fill:#f00"));
//! assert!(!fixed.contains("linearGradient"));
//! ```

mod document;
mod fix;
mod gradient;
mod style;

pub use document::{Document, Element, NodeId, NodeKind};
pub use fix::{
    fix_document, fix_markup, fix_svg_file, fix_svg_tree, prune_dead_gradients, rewrite_styles,
    DEFAULT_VECTOR_DIR,
};
pub use gradient::{
    is_gradient_tag, walk_chain, ColorExpr, GradientResolver, IdIndex, GRADIENT_TAGS, TRANSPARENT,
};
pub use style::{rewrite_paint_attribute, rewrite_style, strip_default_visibility};
