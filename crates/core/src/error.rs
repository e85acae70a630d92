//! Error types for deck filling.

use crate::types::{ShapeId, ShapeRole};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the I/O edges of the engine: document containers,
/// intent files and configuration files.
///
/// Per-item and per-slide problems during matching, verification and
/// repair are never reported through this type; they are values in the
/// reports.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to open or read a file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// Intent or configuration JSON could not be decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// ZIP archive error (for PPTX).
    #[error("ZIP error: {0}")]
    Zip(String),

    /// XML parsing or writing error (for PPTX).
    #[error("XML error: {0}")]
    Xml(String),

    /// The PPTX package structure is not usable.
    #[error("PPTX parsing error: {0}")]
    PptxParse(String),

    /// The intended content is unusable as a whole.
    #[error("Invalid intended content: {0}")]
    InvalidIntent(String),

    /// A configuration value is out of range.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Failure to write text into a shape.
///
/// Always non-fatal: the caller records it and treats the content item
/// as unmatched.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplyError {
    /// The shape is no longer part of the slide.
    #[error("shape {shape} on slide {slide} is detached or missing")]
    StaleShape { slide: usize, shape: ShapeId },

    /// The shape is a picture, table or slide number and never takes text.
    #[error("shape {shape} on slide {slide} is a {role:?} shape and cannot take text")]
    ExcludedShape {
        slide: usize,
        shape: ShapeId,
        role: ShapeRole,
    },
}
