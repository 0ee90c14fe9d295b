//! Models rendered into `src/models.ts`.
//!
//! Full schema resolution belongs to the host tooling; [`ModelResolver`] is
//! the seam it plugs into. [`SchemaResolver`] is a shallow stand-in that
//! understands top-level properties, `definitions`, and local `$ref`s.

use crate::error::{PluginError, Result};
use serde::Serialize;
use serde_json::{Map, Value};

/// Name of the model generated from the schema's top-level properties.
pub const RESOURCE_MODEL: &str = "ResourceModel";

/// TypeScript reserved words that cannot be used as bare property names.
const RESERVED: &[&str] = &[
    "break", "case", "catch", "class", "const", "continue", "debugger", "default", "delete", "do",
    "else", "enum", "export", "extends", "false", "finally", "for", "function", "if", "import",
    "in", "instanceof", "new", "null", "return", "super", "switch", "this", "throw", "true", "try",
    "typeof", "var", "void", "while", "with",
];

/// Appends `_` to names that collide with reserved words.
pub fn safe_reserved(name: &str) -> String {
    if RESERVED.contains(&name) {
        format!("{name}_")
    } else {
        name.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Property {
    /// Property name as it appears in the schema.
    pub name: String,
    /// Name usable as a TypeScript identifier.
    pub identifier: String,
    /// TypeScript type expression.
    pub ty: String,
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Model {
    pub name: String,
    pub properties: Vec<Property>,
}

/// Turns a resource schema into the models to render.
///
/// The first returned model must be the resource model.
pub trait ModelResolver {
    fn resolve(&self, schema: &Value) -> Result<Vec<Model>>;
}

/// Shallow resolver over `properties` and `definitions`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SchemaResolver;

impl ModelResolver for SchemaResolver {
    fn resolve(&self, schema: &Value) -> Result<Vec<Model>> {
        let root = schema
            .as_object()
            .ok_or_else(|| PluginError::Config("resource schema must be a JSON object".into()))?;

        let mut models = vec![model_from(RESOURCE_MODEL, root)];

        if let Some(definitions) = root.get("definitions").and_then(Value::as_object) {
            for (name, definition) in definitions {
                if let Some(object) = definition.as_object() {
                    models.push(model_from(name, object));
                }
            }
        }

        Ok(models)
    }
}

fn model_from(name: &str, object: &Map<String, Value>) -> Model {
    let required: Vec<&str> = object
        .get("required")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    let properties = object
        .get("properties")
        .and_then(Value::as_object)
        .map(|props| {
            props
                .iter()
                .map(|(prop, schema)| Property {
                    name: prop.clone(),
                    identifier: safe_reserved(prop),
                    ty: ts_type(schema),
                    required: required.contains(&prop.as_str()),
                })
                .collect()
        })
        .unwrap_or_default();

    Model {
        name: name.to_string(),
        properties,
    }
}

/// Maps a property schema onto a TypeScript type expression.
fn ts_type(schema: &Value) -> String {
    if let Some(reference) = schema.get("$ref").and_then(Value::as_str) {
        return reference
            .strip_prefix("#/definitions/")
            .map(String::from)
            .unwrap_or_else(|| "object".to_string());
    }

    match schema.get("type").and_then(Value::as_str) {
        Some("string") => "string".to_string(),
        Some("integer") | Some("number") => "number".to_string(),
        Some("boolean") => "boolean".to_string(),
        Some("array") => {
            let item = schema.get("items").map(ts_type).unwrap_or_else(|| "any".to_string());
            format!("Array<{item}>")
        }
        Some("object") | None => "object".to_string(),
        Some(_) => "any".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn resolves_properties_and_definitions() {
        let schema = json!({
            "definitions": {
                "Tag": {
                    "type": "object",
                    "properties": {"Key": {"type": "string"}, "Value": {"type": "string"}},
                    "required": ["Key"]
                }
            },
            "properties": {
                "Title": {"type": "string"},
                "Count": {"type": "integer"},
                "Tags": {"type": "array", "items": {"$ref": "#/definitions/Tag"}},
                "Enabled": {"type": "boolean"}
            },
            "required": ["Title"]
        });

        let models = SchemaResolver.resolve(&schema).unwrap();
        assert_eq!(models.len(), 2);
        assert_eq!(models[0].name, RESOURCE_MODEL);
        assert_eq!(models[1].name, "Tag");

        let ty = |name: &str| {
            models[0]
                .properties
                .iter()
                .find(|p| p.name == name)
                .map(|p| (p.ty.clone(), p.required))
                .unwrap()
        };
        assert_eq!(ty("Title"), ("string".to_string(), true));
        assert_eq!(ty("Count"), ("number".to_string(), false));
        assert_eq!(ty("Tags"), ("Array<Tag>".to_string(), false));
        assert_eq!(ty("Enabled"), ("boolean".to_string(), false));

        assert!(models[1].properties.iter().any(|p| p.name == "Key" && p.required));
    }

    #[test]
    fn reserved_property_names_get_suffix() {
        assert_eq!(safe_reserved("class"), "class_");
        assert_eq!(safe_reserved("Class"), "Class");

        let models = SchemaResolver
            .resolve(&json!({"properties": {"default": {"type": "string"}}}))
            .unwrap();
        assert_eq!(models[0].properties[0].identifier, "default_");
        assert_eq!(models[0].properties[0].name, "default");
    }

    #[test]
    fn non_object_schema_is_rejected() {
        assert!(SchemaResolver.resolve(&json!([1, 2])).is_err());
    }
}
