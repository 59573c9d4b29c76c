/// Errors that can occur while parsing or loading schemas.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// A schema node is outside the recognized vocabulary.
    #[error("unexpected field type at {path}: {found}")]
    UnexpectedFieldType { path: String, found: String },

    /// The schema document is not valid JSON.
    #[error("schema is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// The schema file could not be loaded.
    #[error("failed to load schema: {0}")]
    LoadFailed(String),

    /// No schema registered under the given name.
    #[error("no schema registered for form {0:?}")]
    NoSchema(String),
}

pub type Result<T> = std::result::Result<T, SchemaError>;
