use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::config::RegistryConfig;
use crate::error::{Result, SchemaError};
use crate::schema::Schema;

const SCHEMA_SUFFIX: &str = ".form.json";

/// Name-keyed registry of parsed form schemas.
pub struct SchemaRegistry {
    schemas: HashMap<String, Schema>,
    config: RegistryConfig,
}

impl SchemaRegistry {
    /// Create an empty registry with default config.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create an empty registry with explicit config.
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            schemas: HashMap::new(),
            config,
        }
    }

    /// Register a schema for a form from a JSON string.
    pub fn register(&mut self, name: &str, schema_json: &str) -> Result<()> {
        let schema: Value = serde_json::from_str(schema_json)?;
        self.register_value(name, &schema)
    }

    /// Register a schema for a form from a JSON value.
    pub fn register_value(&mut self, name: &str, schema: &Value) -> Result<()> {
        let parsed = Schema::from_json(schema)?;
        self.register_schema(name, parsed);
        Ok(())
    }

    /// Register an already parsed schema, replacing any previous one.
    pub fn register_schema(&mut self, name: &str, schema: Schema) {
        debug!(form = name, "registered form schema");
        self.schemas.insert(name.to_string(), schema);
    }

    /// Load schemas from a directory.
    pub fn from_directory(path: &Path) -> Result<Self> {
        Self::from_directory_with_config(path, RegistryConfig::default())
    }

    /// Load schemas from a directory with explicit config.
    ///
    /// Every `<name>.form.json` file is registered under `<name>`; other
    /// files are ignored. Symlinked schema files are refused.
    pub fn from_directory_with_config(path: &Path, config: RegistryConfig) -> Result<Self> {
        let mut registry = Self::with_config(config);
        let entries = std::fs::read_dir(path)
            .map_err(|err| load_failed(format!("{}: {err}", path.display())))?;

        let mut count = 0usize;
        for entry in entries {
            let entry = entry.map_err(|err| load_failed(err.to_string()))?;
            let file_name = entry.file_name().to_string_lossy().into_owned();
            if !file_name.ends_with(SCHEMA_SUFFIX) {
                continue;
            }

            let entry_path = entry.path();
            let link_meta =
                std::fs::symlink_metadata(&entry_path).map_err(|err| load_failed(err.to_string()))?;
            if link_meta.file_type().is_symlink() {
                return Err(load_failed(format!("{file_name}: schema symlinks are not loaded")));
            }
            if !link_meta.is_file() {
                continue;
            }

            let name = form_name_from_file_name(&file_name)
                .ok_or_else(|| load_failed(format!("{file_name}: invalid form name")))?;

            count += 1;
            if count > registry.config.max_schemas_from_directory {
                return Err(load_failed(format!(
                    "{}: more than {} schemas",
                    path.display(),
                    registry.config.max_schemas_from_directory
                )));
            }

            let content = read_schema_file(
                &entry_path,
                &link_meta,
                registry.config.max_schema_file_size,
            )?;
            registry.register(name, &content)?;
        }

        debug!(dir = %path.display(), count, "loaded form schemas from directory");
        Ok(registry)
    }

    /// Load from embedded schema strings.
    pub fn from_embedded(schemas: &[(&str, &str)]) -> Result<Self> {
        let mut registry = Self::new();
        for (name, schema) in schemas {
            registry.register(name, schema)?;
        }
        Ok(registry)
    }

    /// Look up a schema by form name.
    pub fn get(&self, name: &str) -> Option<&Schema> {
        self.schemas.get(name)
    }

    /// Look up a schema by form name, failing when it is not registered.
    pub fn require(&self, name: &str) -> Result<&Schema> {
        self.get(name)
            .ok_or_else(|| SchemaError::NoSchema(name.to_string()))
    }

    /// Check if a form has a registered schema.
    pub fn has_schema(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    /// Get form names that have registered schemas, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.schemas.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Get registry configuration.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn form_name_from_file_name(file_name: &str) -> Option<&str> {
    let name = file_name.strip_suffix(SCHEMA_SUFFIX)?;
    let valid = !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');
    valid.then_some(name)
}

fn load_failed(message: String) -> SchemaError {
    SchemaError::LoadFailed(message)
}

/// Read one schema file, refusing files over `max_bytes` or files swapped
/// out between the directory scan and the open.
fn read_schema_file(path: &Path, scanned: &std::fs::Metadata, max_bytes: usize) -> Result<String> {
    let file = std::fs::File::open(path)
        .map_err(|err| load_failed(format!("{}: cannot open: {err}", path.display())))?;
    let opened = file
        .metadata()
        .map_err(|err| load_failed(err.to_string()))?;

    #[cfg(unix)]
    {
        if !same_file_identity(scanned, &opened) {
            return Err(load_failed(format!("{}: replaced while loading", path.display())));
        }
    }
    #[cfg(not(unix))]
    let _ = scanned;

    let too_large = || load_failed(format!("{}: larger than {max_bytes} bytes", path.display()));
    if opened.len() > max_bytes as u64 {
        return Err(too_large());
    }

    let mut content = String::new();
    let limit = u64::try_from(max_bytes.saturating_add(1)).unwrap_or(u64::MAX);
    file.take(limit)
        .read_to_string(&mut content)
        .map_err(|err| load_failed(format!("{}: cannot read: {err}", path.display())))?;
    if content.len() > max_bytes {
        return Err(too_large());
    }
    Ok(content)
}

#[cfg(unix)]
fn same_file_identity(a: &std::fs::Metadata, b: &std::fs::Metadata) -> bool {
    use std::os::unix::fs::MetadataExt;
    a.dev() == b.dev() && a.ino() == b.ino()
}
