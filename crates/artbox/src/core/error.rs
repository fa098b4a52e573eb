//! Core error types for the batch tools
//!
//! This module defines the error type shared by the SVG resolver and the image tools.

use std::path::PathBuf;

use thiserror::Error;

/// Core error types for batch processing
#[derive(Error, Debug)]
pub enum ArtboxError {
    #[error("Markup error: {message} at byte {position}")]
    Markup { message: String, position: u64 },

    #[error("Malformed gradient stop: gradient '{gradient}' has a single stop without stop-color")]
    MalformedGradientStop { gradient: String },

    #[error("Atlas error: {message}")]
    Atlas { message: String },

    #[error("Unsupported format: '{extension}'")]
    UnsupportedFormat { extension: String },

    #[error("Not an 8-bit RGBA image: {}", path.display())]
    NotRgba { path: PathBuf },

    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("External command failed: {command}: {message}")]
    Command { command: String, message: String },

    #[error("Nothing to process: {what}")]
    EmptyInput { what: String },

    #[error("Image error: {source}")]
    Image {
        #[from]
        source: image::ImageError,
    },

    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl ArtboxError {
    /// Create a new markup error
    pub fn markup(message: impl Into<String>, position: u64) -> Self {
        Self::Markup {
            message: message.into(),
            position,
        }
    }

    /// Create a new malformed-stop error for the given gradient id
    pub fn malformed_stop(gradient: impl Into<String>) -> Self {
        Self::MalformedGradientStop {
            gradient: gradient.into(),
        }
    }

    /// Create a new atlas error
    pub fn atlas(message: impl Into<String>) -> Self {
        Self::Atlas {
            message: message.into(),
        }
    }

    /// Create a new unsupported-format error
    pub fn unsupported_format(extension: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            extension: extension.into(),
        }
    }

    /// Create a new external-command error
    pub fn command(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Command {
            command: command.into(),
            message: message.into(),
        }
    }

    /// Create a new empty-input error
    pub fn empty_input(what: impl Into<String>) -> Self {
        Self::EmptyInput { what: what.into() }
    }
}

impl From<quick_xml::Error> for ArtboxError {
    fn from(err: quick_xml::Error) -> Self {
        Self::markup(err.to_string(), 0)
    }
}

impl From<serde_json::Error> for ArtboxError {
    fn from(err: serde_json::Error) -> Self {
        Self::atlas(err.to_string())
    }
}
