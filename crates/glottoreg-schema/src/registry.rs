//! Central schema registry for all glottoreg types.
//!
//! The `SchemaRegistry` builds JSON Schemas from `glottoreg-core` types at
//! construction time using [`schemars::schema_for!`] and provides
//! validation via `jsonschema`. The generated `resource` schema is patched
//! with the regex patterns (`glottocode`, `resource_id`) that the derive
//! cannot express, so the registry stays the single authority every other
//! component consumes.

use std::collections::HashMap;

use schemars::schema_for;
use serde_json::Value;

use glottoreg_core::record::{GLOTTOCODE_PATTERN, RESOURCE_ID_PATTERN};

use crate::error::SchemaError;

/// Central store of all JSON Schemas in the glottoreg system.
pub struct SchemaRegistry {
    schemas: HashMap<&'static str, Value>,
}

/// Insert a schema into the map, converting the `schemars` output to a
/// `serde_json::Value`. Panics if `serde_json::to_value` fails (infallible
/// for valid `schemars` output).
macro_rules! register {
    ($map:expr, $name:expr, $ty:ty) => {
        $map.insert($name, serde_json::to_value(schema_for!($ty)).unwrap());
    };
}

impl SchemaRegistry {
    /// Build a new registry containing the record schema, its nested
    /// object schemas, and the report types.
    ///
    /// # Panics
    ///
    /// Panics if `serde_json::to_value` fails on any `schemars`-generated
    /// schema. Not expected in practice: `schemars` always produces valid
    /// JSON-serialisable output.
    #[must_use]
    pub fn new() -> Self {
        let mut schemas = HashMap::new();

        // --- Record and nested objects (6) ---
        register!(schemas, "resource", glottoreg_core::record::Record);
        register!(schemas, "link", glottoreg_core::record::Link);
        register!(schemas, "access", glottoreg_core::record::Access);
        register!(schemas, "citation", glottoreg_core::record::Citation);
        register!(schemas, "provenance", glottoreg_core::record::Provenance);
        register!(schemas, "curation", glottoreg_core::record::Curation);

        // --- Report types (2) ---
        register!(schemas, "violation", glottoreg_core::report::Violation);
        register!(schemas, "report", glottoreg_core::report::Report);

        let mut registry = Self { schemas };
        registry.patch_resource_patterns();
        registry
    }

    /// Add the pattern constraints the derive cannot express.
    fn patch_resource_patterns(&mut self) {
        if let Some(resource) = self.schemas.get_mut("resource") {
            patch_pattern(resource, "/properties/glottocode", GLOTTOCODE_PATTERN);
            patch_pattern(resource, "/properties/resource_id", RESOURCE_ID_PATTERN);
            patch_pattern(
                resource,
                "/properties/glottocodes_secondary/items",
                GLOTTOCODE_PATTERN,
            );
        }
    }

    /// Get a schema by name. Returns `None` if not found.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.schemas.get(name)
    }

    /// Compile a named schema into a reusable validator with format
    /// assertions enabled (so `date` strings are actually checked).
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::NotFound` for an unknown name, or
    /// `SchemaError::Compilation` if the schema fails to compile.
    pub fn compile(&self, name: &str) -> Result<jsonschema::Validator, SchemaError> {
        let schema = self
            .get(name)
            .ok_or_else(|| SchemaError::NotFound(name.to_string()))?;

        jsonschema::options()
            .should_validate_formats(true)
            .build(schema)
            .map_err(|e| SchemaError::Compilation(format!("{e}")))
    }

    /// Validate a JSON value against a named schema, collecting all
    /// errors.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::NotFound` if the schema name is unknown, or
    /// `SchemaError::ValidationFailed` if validation produces errors.
    pub fn validate(&self, name: &str, instance: &Value) -> Result<(), SchemaError> {
        let validator = self.compile(name)?;

        let errors: Vec<String> = validator
            .iter_errors(instance)
            .map(|e| format!("{e}"))
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(SchemaError::ValidationFailed { errors })
        }
    }

    /// List all registered schema names.
    #[must_use]
    pub fn list(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.schemas.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Number of registered schemas.
    #[must_use]
    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Insert a `pattern` keyword at a JSON-pointer location inside a
/// generated schema. A miss is a programming error in the patch list.
fn patch_pattern(schema: &mut Value, pointer: &str, pattern: &str) {
    if let Some(target) = schema.pointer_mut(pointer).and_then(Value::as_object_mut) {
        target.insert("pattern".to_string(), Value::String(pattern.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn registry() -> SchemaRegistry {
        SchemaRegistry::new()
    }

    fn valid_resource() -> Value {
        json!({
            "resource_id": "demo-corpus",
            "glottocode": "stan1293",
            "title": "Demo corpus",
            "resource_type": "corpus",
            "license": "CC-BY-4.0",
            "access": {"level": "open"},
            "links": [{"kind": "landing", "url": "https://example.org/demo"}],
            "created": "2024-03-01",
            "curation": {"status": "seed", "maintainers": ["@you"]}
        })
    }

    #[test]
    fn registry_has_expected_count() {
        // 6 record schemas + 2 report schemas
        assert_eq!(registry().schema_count(), 8);
    }

    #[test]
    fn registry_list_is_sorted() {
        let names = registry().list();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
    }

    #[test]
    fn get_nonexistent_schema() {
        assert!(registry().get("nonexistent").is_none());
    }

    #[test]
    fn resource_schema_carries_patterns() {
        let reg = registry();
        let schema = reg.get("resource").unwrap();
        assert_eq!(
            schema.pointer("/properties/glottocode/pattern"),
            Some(&json!(GLOTTOCODE_PATTERN))
        );
        assert_eq!(
            schema.pointer("/properties/resource_id/pattern"),
            Some(&json!(RESOURCE_ID_PATTERN))
        );
    }

    #[test]
    fn validate_valid_resource() {
        assert!(registry().validate("resource", &valid_resource()).is_ok());
    }

    #[test]
    fn validate_rejects_missing_required_field() {
        let mut instance = valid_resource();
        instance.as_object_mut().unwrap().remove("title");
        let result = registry().validate("resource", &instance);
        let Err(SchemaError::ValidationFailed { errors }) = result else {
            panic!("expected ValidationFailed");
        };
        assert!(errors.iter().any(|e| e.contains("title")));
    }

    #[test]
    fn validate_rejects_bad_glottocode_format() {
        let mut instance = valid_resource();
        instance["glottocode"] = json!("STAN129");
        assert!(registry().validate("resource", &instance).is_err());
    }

    #[test]
    fn validate_rejects_non_open_access() {
        let mut instance = valid_resource();
        instance["access"]["level"] = json!("restricted");
        assert!(registry().validate("resource", &instance).is_err());
    }

    #[test]
    fn validate_rejects_unknown_field() {
        let mut instance = valid_resource();
        instance["popularity"] = json!(9000);
        let result = registry().validate("resource", &instance);
        assert!(result.is_err());
    }

    #[test]
    fn validate_rejects_malformed_date() {
        let mut instance = valid_resource();
        instance["created"] = json!("not-a-date");
        assert!(registry().validate("resource", &instance).is_err());
    }

    #[test]
    fn validate_nonexistent_schema_returns_not_found() {
        let result = registry().validate("bogus", &json!({}));
        assert!(matches!(result, Err(SchemaError::NotFound(_))));
    }

    #[test]
    fn all_expected_schemas_present() {
        let reg = registry();
        for name in [
            "resource",
            "link",
            "access",
            "citation",
            "provenance",
            "curation",
            "violation",
            "report",
        ] {
            assert!(reg.get(name).is_some(), "Missing expected schema: {name}");
        }
    }
}
