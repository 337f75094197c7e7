/// Errors that can occur while loading schemas or validating values.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// The schema file could not be loaded.
    #[error("failed to load schema: {0}")]
    LoadFailed(String),

    /// The schema could not be compiled.
    #[error("failed to compile schema: {0}")]
    CompileFailed(String),

    /// The value failed schema validation.
    #[error("validation failed: {message}")]
    ValidationFailed { message: String },

    /// The value passed the schema but does not decode into the target type.
    #[error("value does not match target type: {0}")]
    TypeMismatch(#[source] serde_json::Error),

    /// A typed value could not be encoded to JSON.
    #[error("value could not be encoded: {0}")]
    Encode(#[source] serde_json::Error),

    /// Schema text or payload bytes are not valid JSON.
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SchemaError>;
