use std::fmt;
use std::io::Read;
use std::marker::PhantomData;
use std::path::Path;
use std::sync::Arc;

use jsonschema::Validator;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::config::SchemaConfig;
use crate::error::{Result, SchemaError};
use crate::strict::apply_strict_mode;
use crate::validator::validate_value;

/// A compiled JSON Schema bound to the Rust type its values decode into.
///
/// Cloning is cheap: clones share the compiled validator.
pub struct Schema<T> {
    compiled: Arc<Compiled>,
    _marker: PhantomData<fn() -> T>,
}

struct Compiled {
    document: Value,
    validator: Validator,
}

impl<T> Schema<T> {
    /// Compile a schema document with default config.
    pub fn new(document: Value) -> Result<Self> {
        Self::with_config(document, &SchemaConfig::default())
    }

    /// Compile a schema document with explicit config.
    pub fn with_config(mut document: Value, config: &SchemaConfig) -> Result<Self> {
        if config.strict_mode {
            apply_strict_mode(&mut document);
        }

        let validator = jsonschema::validator_for(&document)
            .map_err(|err| SchemaError::CompileFailed(err.to_string()))?;

        Ok(Self {
            compiled: Arc::new(Compiled {
                document,
                validator,
            }),
            _marker: PhantomData,
        })
    }

    /// Compile a schema from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        Self::from_json_with_config(text, &SchemaConfig::default())
    }

    /// Compile a schema from JSON text with explicit config.
    pub fn from_json_with_config(text: &str, config: &SchemaConfig) -> Result<Self> {
        let document: Value = serde_json::from_str(text)?;
        Self::with_config(document, config)
    }

    /// Load and compile a schema file.
    pub fn from_file(path: &Path) -> Result<Self> {
        Self::from_file_with_config(path, &SchemaConfig::default())
    }

    /// Load and compile a schema file with explicit config.
    ///
    /// Symlinks are refused and the file must not exceed
    /// [`SchemaConfig::max_schema_file_size`].
    pub fn from_file_with_config(path: &Path, config: &SchemaConfig) -> Result<Self> {
        let text = read_schema_file(path, config.max_schema_file_size)?;
        Self::from_json_with_config(&text, config)
    }

    /// The schema document as compiled (after strict-mode rewriting).
    pub fn document(&self) -> &Value {
        &self.compiled.document
    }

    /// Validate a value without decoding it.
    pub fn validate(&self, value: &Value) -> Result<()> {
        validate_value(value, &self.compiled.validator)
    }

    /// Whether a value satisfies the schema.
    pub fn is_valid(&self, value: &Value) -> bool {
        self.compiled.validator.is_valid(value)
    }

    /// Reinterpret the schema as producing a different Rust type.
    pub fn cast<U>(self) -> Schema<U> {
        Schema {
            compiled: self.compiled,
            _marker: PhantomData,
        }
    }
}

impl<T: DeserializeOwned> Schema<T> {
    /// Validate a value and decode it into `T`.
    pub fn parse(&self, value: Value) -> Result<T> {
        self.validate(&value)?;
        serde_json::from_value(value).map_err(SchemaError::TypeMismatch)
    }
}

impl<T: Serialize> Schema<T> {
    /// Encode a typed value and validate the encoding.
    pub fn encode(&self, value: &T) -> Result<Value> {
        let value = serde_json::to_value(value).map_err(SchemaError::Encode)?;
        self.validate(&value)?;
        Ok(value)
    }
}

impl<T> Clone for Schema<T> {
    fn clone(&self) -> Self {
        Self {
            compiled: Arc::clone(&self.compiled),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Schema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("type", &std::any::type_name::<T>())
            .field("document", &self.compiled.document)
            .finish()
    }
}

fn read_schema_file(path: &Path, max_bytes: usize) -> Result<String> {
    let path_metadata = std::fs::symlink_metadata(path)
        .map_err(|err| SchemaError::LoadFailed(format!("{}: {err}", path.display())))?;
    let file_type = path_metadata.file_type();

    if file_type.is_symlink() {
        return Err(SchemaError::LoadFailed(format!(
            "refusing to load schema symlink: {}",
            path.display()
        )));
    }
    if !file_type.is_file() {
        return Err(SchemaError::LoadFailed(format!(
            "not a regular file: {}",
            path.display()
        )));
    }

    let file = std::fs::File::open(path).map_err(|err| {
        SchemaError::LoadFailed(format!("failed opening schema {}: {err}", path.display()))
    })?;
    let opened_metadata = file
        .metadata()
        .map_err(|err| SchemaError::LoadFailed(err.to_string()))?;

    #[cfg(unix)]
    {
        if !same_file_identity(&path_metadata, &opened_metadata) {
            return Err(SchemaError::LoadFailed(format!(
                "schema file changed during load: {}",
                path.display()
            )));
        }
    }

    if opened_metadata.len() > max_bytes as u64 {
        return Err(SchemaError::LoadFailed(format!(
            "schema file too large ({} bytes, max {max_bytes}): {}",
            opened_metadata.len(),
            path.display()
        )));
    }

    let read_limit = u64::try_from(max_bytes.saturating_add(1)).unwrap_or(u64::MAX);
    let mut content = String::new();
    file.take(read_limit)
        .read_to_string(&mut content)
        .map_err(|err| {
            SchemaError::LoadFailed(format!("failed reading schema {}: {err}", path.display()))
        })?;
    if content.len() > max_bytes {
        return Err(SchemaError::LoadFailed(format!(
            "schema file too large while reading: {}",
            path.display()
        )));
    }

    tracing::debug!(path = %path.display(), size = content.len(), "loaded schema file");
    Ok(content)
}

#[cfg(unix)]
fn same_file_identity(
    path_metadata: &std::fs::Metadata,
    opened_metadata: &std::fs::Metadata,
) -> bool {
    use std::os::unix::fs::MetadataExt;
    path_metadata.dev() == opened_metadata.dev() && path_metadata.ino() == opened_metadata.ino()
}
