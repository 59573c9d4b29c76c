use formprims_schema::{ScalarKind, SchemaError};
use formprims_value::Value;

use crate::path::FieldPath;

/// Errors raised while building forms or extracting their data.
#[derive(Debug, thiserror::Error)]
pub enum FieldError {
    /// A required field is missing or holds a value of the wrong shape.
    #[error("invalid {kind} value at {path}: {raw}")]
    Invalid {
        path: FieldPath,
        kind: ScalarKind,
        raw: Value,
    },

    /// A number field holds an integer an `f64` cannot represent exactly.
    #[error("number at {path} cannot be represented exactly: {raw}")]
    PrecisionLoss { path: FieldPath, raw: String },

    /// Data extraction was handed a field that is not an object field.
    #[error("unexpected field at {path}: expected object, found {found}")]
    UnexpectedField { path: FieldPath, found: &'static str },

    /// The form schema could not be parsed or resolved.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl FieldError {
    /// Path of the offending field, when the error concerns one.
    pub fn path(&self) -> Option<&FieldPath> {
        match self {
            FieldError::Invalid { path, .. }
            | FieldError::PrecisionLoss { path, .. }
            | FieldError::UnexpectedField { path, .. } => Some(path),
            FieldError::Schema(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, FieldError>;
