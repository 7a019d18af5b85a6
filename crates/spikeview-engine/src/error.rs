//! Error types for visual setters and GPU programs.
//!
//! Both are programming-error classes: they abort the calling operation before
//! any partial mutation and leave the process in a usable state.

use thiserror::Error;

use crate::data::Shape;

/// Rejected attribute update.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VisualError {
    /// Data inconsistent with previously established row/column counts.
    #[error("shape mismatch for `{attribute}`: expected {expected}, got {actual}")]
    ShapeMismatch {
        attribute: &'static str,
        expected: Shape,
        actual: Shape,
    },

    /// Data with a valid shape but unusable contents.
    #[error("invalid value for `{attribute}`: {reason}")]
    InvalidValue { attribute: &'static str, reason: String },
}

/// Mismatch between a program's declared layout and what a caller uploads.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProgramError {
    #[error("no shader named `{0}`")]
    UnknownShader(String),

    #[error("program `{program}` has no uniform `{name}`")]
    UnknownUniform { program: &'static str, name: String },

    #[error("uniform `{name}` takes {expected} components, got {actual}")]
    UniformComponents { name: String, expected: u32, actual: u32 },

    #[error("program `{program}` has no attribute `{name}`")]
    UnknownAttribute { program: &'static str, name: String },

    #[error("attribute `{name}` takes {expected} components per vertex, got {actual}")]
    AttributeComponents { name: String, expected: u32, actual: u32 },

    #[error("attribute `{name}`: {len} floats is not a whole number of {components}-component vertices")]
    AttributeLength { name: String, len: usize, components: u32 },

    #[error("program `{program}` has no texture `{name}`")]
    UnknownTexture { program: &'static str, name: String },

    #[error("texture `{name}`: {len} bytes cannot fill {width}x{height} RGBA8")]
    TextureSize { name: String, width: u32, height: u32, len: usize },
}
