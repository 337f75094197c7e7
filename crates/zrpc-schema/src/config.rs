/// Controls schema compilation and loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaConfig {
    /// When true, object schemas reject properties they do not declare.
    pub strict_mode: bool,
    /// Maximum bytes allowed for a schema file loaded from disk.
    pub max_schema_file_size: usize,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            strict_mode: false,
            max_schema_file_size: 256 * 1024,
        }
    }
}
