//! Batch tools for an artwork repository
//!
//! Every tool takes an options struct whose `Default` matches the command
//! line defaults, logs through `tracing`, and keeps going past a single bad
//! file where that makes sense.

mod alpha;
mod collage;
mod readme;
mod sheet;
mod thumbs;
mod twitterify;

use serde::Serialize;

pub use alpha::*;
pub use collage::*;
pub use readme::*;
pub use sheet::*;
pub use thumbs::*;
pub use twitterify::*;

/// Name and one-line summary of a tool, as listed by `artbox tools`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ToolInfo {
    pub name: &'static str,
    pub description: &'static str,
}

const TOOLS: &[ToolInfo] = &[
    ToolInfo {
        name: "collage",
        description: "Lay out every image of a directory in a grid",
    },
    ToolInfo {
        name: "thumbs",
        description: "Write JPEG thumbnails mirroring a directory tree",
    },
    ToolInfo {
        name: "split-sheet",
        description: "Split an Aseprite sprite sheet into one PNG per tag",
    },
    ToolInfo {
        name: "normalize-alpha",
        description: "Give fully transparent pixels one background color",
    },
    ToolInfo {
        name: "fix-svg-style",
        description: "Flatten single-stop gradients and prune dead definitions",
    },
    ToolInfo {
        name: "twitterify",
        description: "Pad a PNG or GIF to a minimum canvas",
    },
    ToolInfo {
        name: "update",
        description: "Regenerate gallery thumbnails and README.md",
    },
];

/// All tools in command-line order
pub fn catalog() -> &'static [ToolInfo] {
    TOOLS
}
