//! Schema Registry for Version Management
//!
//! Schemas are registered under qualified names of the form
//! `<name>_<version>` (e.g. `measurement_v1`), so a reader can ask for a
//! specific version or for the latest one.

use apache_avro::Schema;
use lazy_static::lazy_static;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::SchemaError;

/// Thread-safe schema registry with version tracking
pub struct SchemaRegistry {
    /// Schemas indexed by qualified name
    schemas: RwLock<HashMap<String, Schema>>,

    /// Version mappings (name -> [versions])
    versions: RwLock<HashMap<String, Vec<String>>>,
}

impl SchemaRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            schemas: RwLock::new(HashMap::new()),
            versions: RwLock::new(HashMap::new()),
        }
    }

    /// Register a schema under `<name>_<version>`
    pub fn register(&self, qualified_name: &str, schema: Schema) -> Result<(), SchemaError> {
        let (name, version) = split_qualified(qualified_name)?;

        let mut schemas = self.schemas.write().map_err(|_| poisoned())?;
        if schemas.contains_key(qualified_name) {
            return Err(SchemaError::Parse(format!(
                "schema {qualified_name} already registered"
            )));
        }
        schemas.insert(qualified_name.to_string(), schema);

        let mut versions = self.versions.write().map_err(|_| poisoned())?;
        versions
            .entry(name.to_string())
            .or_default()
            .push(version.to_string());

        Ok(())
    }

    /// Get schema by qualified name
    pub fn get(&self, qualified_name: &str) -> Result<Schema, SchemaError> {
        self.schemas
            .read()
            .map_err(|_| poisoned())?
            .get(qualified_name)
            .cloned()
            .ok_or_else(|| SchemaError::NotFound(qualified_name.to_string()))
    }

    /// Get the most recently registered version of a schema
    pub fn get_latest(&self, name: &str) -> Result<Schema, SchemaError> {
        let latest = self
            .versions
            .read()
            .map_err(|_| poisoned())?
            .get(name)
            .and_then(|versions| versions.last().cloned())
            .ok_or_else(|| SchemaError::NotFound(name.to_string()))?;

        self.get(&format!("{name}_{latest}"))
    }

    /// All registered versions of a schema, oldest first
    pub fn get_versions(&self, name: &str) -> Result<Vec<String>, SchemaError> {
        self.versions
            .read()
            .map_err(|_| poisoned())?
            .get(name)
            .cloned()
            .ok_or_else(|| SchemaError::NotFound(name.to_string()))
    }

    /// Load all built-in templog schemas
    pub fn load_defaults(&self) -> Result<(), SchemaError> {
        use crate::schemas;

        self.register("measurement_v1", schemas::measurement_v1()?)
    }
}

lazy_static! {
    static ref DEFAULTS: Result<SchemaRegistry, String> = {
        let registry = SchemaRegistry::new();
        registry
            .load_defaults()
            .map(|()| registry)
            .map_err(|e| e.to_string())
    };
}

/// Process-wide registry holding the built-in schemas, parsed on first use
pub fn defaults() -> Result<&'static SchemaRegistry, SchemaError> {
    DEFAULTS.as_ref().map_err(|e| SchemaError::Parse(e.clone()))
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn split_qualified(qualified_name: &str) -> Result<(&str, &str), SchemaError> {
    qualified_name
        .rsplit_once('_')
        .filter(|(name, version)| !name.is_empty() && version.starts_with('v'))
        .ok_or_else(|| {
            SchemaError::Parse(format!("{qualified_name} is not of the form <name>_v<N>"))
        })
}

fn poisoned() -> SchemaError {
    SchemaError::Parse("schema registry lock poisoned".to_string())
}
