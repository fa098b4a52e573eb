//! Shared building blocks for the tools
//!
//! Errors, logging, integer geometry, raster I/O, directory walking and the
//! per-run batch report.

mod error;
pub mod geometry;
pub mod logging;
pub mod raster;
mod report;
pub mod walk;

pub use error::*;
pub use geometry::{Rect, Size};
pub use report::*;
