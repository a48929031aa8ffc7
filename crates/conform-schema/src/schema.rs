//! The raw schema document model: a typed view over `serde_json::Value`
//! restricted to the keywords §6 recognizes (§4.3.1: "a registry of
//! (absolute URI -> schema) pairs").

use indexmap::IndexMap;
use serde_json::Value;

use crate::error::SchemaError;

/// A JSON Schema node: either a boolean schema (`true`/`false`, Draft
/// 2020-12's "anything"/"nothing") or an object of keywords (§3's
/// supplemented feature).
#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    Bool(bool),
    Object(SchemaObject),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaObject {
    pub id: Option<String>,
    pub reference: Option<String>,
    pub defs: IndexMap<String, Schema>,

    pub all_of: Vec<Schema>,
    pub any_of: Vec<Schema>,
    pub one_of: Vec<Schema>,

    pub r#type: Option<TypeSet>,
    pub r#enum: Option<Vec<Value>>,
    pub r#const: Option<Value>,

    pub properties: IndexMap<String, Schema>,
    pub required: Vec<String>,
    pub additional_properties: Option<Box<Schema>>,

    pub prefix_items: Option<Vec<Schema>>,
    pub items: Option<Box<Schema>>,
    pub min_items: Option<u64>,
    pub max_items: Option<u64>,

    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub exclusive_minimum: Option<f64>,
    pub exclusive_maximum: Option<f64>,

    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub pattern: Option<String>,
    pub format: Option<String>,
}

/// `type` as a single string or an array of strings (§4.3.2's dispatch
/// step 7).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSet(pub Vec<String>);

impl TypeSet {
    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|t| t == name)
    }
}

const IGNORED_KEYWORDS: &[&str] = &[
    "$schema",
    "$comment",
    "title",
    "description",
    "default",
    "examples",
    "$anchor",
    "discriminator",
];

/// Keywords that are part of JSON Schema but explicitly out of scope
/// (§1 Non-goals, §6): present means "reserved, not an error to use in
/// general JSON Schema, but unsupported here".
const RESERVED_UNSUPPORTED_KEYWORDS: &[&str] = &[
    "unevaluatedProperties",
    "unevaluatedItems",
    "if",
    "then",
    "else",
    "contains",
    "minContains",
    "maxContains",
    "dependentRequired",
    "dependentSchemas",
    "patternProperties",
    "propertyNames",
    "contentEncoding",
    "contentMediaType",
    "contentSchema",
    "multipleOf",
    "uniqueItems",
    "$vocabulary",
    "$dynamicRef",
    "$dynamicAnchor",
    "not",
];

pub fn parse_schema(value: &Value) -> Result<Schema, SchemaError> {
    match value {
        Value::Bool(b) => Ok(Schema::Bool(*b)),
        Value::Object(map) => {
            for key in map.keys() {
                if RESERVED_UNSUPPORTED_KEYWORDS.contains(&key.as_str()) {
                    return Err(SchemaError::UnsupportedKeyword { keyword: key.clone() });
                }
            }
            let mut obj = SchemaObject::default();
            obj.id = str_field(map, "$id");
            obj.reference = str_field(map, "$ref");

            for defs_key in ["$defs", "definitions"] {
                if let Some(Value::Object(defs)) = map.get(defs_key) {
                    for (name, sub) in defs {
                        obj.defs.insert(name.clone(), parse_schema(sub)?);
                    }
                }
            }

            obj.all_of = schema_array(map, "allOf")?;
            obj.any_of = schema_array(map, "anyOf")?;
            obj.one_of = schema_array(map, "oneOf")?;

            obj.r#type = match map.get("type") {
                Some(Value::String(s)) => Some(TypeSet(vec![s.clone()])),
                Some(Value::Array(items)) => Some(TypeSet(
                    items.iter().filter_map(|v| v.as_str().map(str::to_string)).collect(),
                )),
                _ => None,
            };
            obj.r#enum = map.get("enum").and_then(|v| v.as_array()).cloned();
            obj.r#const = map.get("const").cloned();

            if let Some(Value::Object(props)) = map.get("properties") {
                for (name, sub) in props {
                    obj.properties.insert(name.clone(), parse_schema(sub)?);
                }
            }
            obj.required = map
                .get("required")
                .and_then(|v| v.as_array())
                .map(|a| a.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
                .unwrap_or_default();
            obj.additional_properties = match map.get("additionalProperties") {
                Some(v) => Some(Box::new(parse_schema(v)?)),
                None => None,
            };

            obj.prefix_items = match map.get("prefixItems") {
                Some(Value::Array(items)) => {
                    Some(items.iter().map(parse_schema).collect::<Result<_, _>>()?)
                }
                _ => None,
            };
            obj.items = match map.get("items") {
                Some(v) => Some(Box::new(parse_schema(v)?)),
                None => None,
            };
            obj.min_items = u64_field(map, "minItems");
            obj.max_items = u64_field(map, "maxItems");

            obj.minimum = f64_field(map, "minimum");
            obj.maximum = f64_field(map, "maximum");
            obj.exclusive_minimum = f64_field(map, "exclusiveMinimum");
            obj.exclusive_maximum = f64_field(map, "exclusiveMaximum");

            obj.min_length = u64_field(map, "minLength");
            obj.max_length = u64_field(map, "maxLength");
            obj.pattern = str_field(map, "pattern");
            obj.format = str_field(map, "format");

            Ok(Schema::Object(obj))
        }
        _ => Err(SchemaError::Json("schema must be a JSON object or boolean".to_string())),
    }
}

fn schema_array(map: &serde_json::Map<String, Value>, key: &str) -> Result<Vec<Schema>, SchemaError> {
    match map.get(key) {
        Some(Value::Array(items)) => items.iter().map(parse_schema).collect(),
        _ => Ok(Vec::new()),
    }
}

fn str_field(map: &serde_json::Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(|v| v.as_str()).map(str::to_string)
}

fn u64_field(map: &serde_json::Map<String, Value>, key: &str) -> Option<u64> {
    map.get(key).and_then(|v| v.as_u64())
}

fn f64_field(map: &serde_json::Map<String, Value>, key: &str) -> Option<f64> {
    map.get(key).and_then(|v| v.as_f64())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn bool_schema_parses_as_bool_variant() {
        assert_eq!(parse_schema(&json!(true)).unwrap(), Schema::Bool(true));
        assert_eq!(parse_schema(&json!(false)).unwrap(), Schema::Bool(false));
    }

    #[test]
    fn reserved_unsupported_keyword_is_rejected() {
        let err = parse_schema(&json!({"not": {"type": "string"}})).unwrap_err();
        assert!(matches!(err, SchemaError::UnsupportedKeyword { keyword } if keyword == "not"));
    }

    #[test]
    fn type_as_single_string_or_array_both_parse() {
        let single = parse_schema(&json!({"type": "string"})).unwrap();
        let Schema::Object(obj) = single else { panic!("expected object schema") };
        assert_eq!(obj.r#type, Some(TypeSet(vec!["string".to_string()])));

        let multi = parse_schema(&json!({"type": ["string", "null"]})).unwrap();
        let Schema::Object(obj) = multi else { panic!("expected object schema") };
        assert!(obj.r#type.unwrap().contains("null"));
    }

    #[test]
    fn defs_and_definitions_are_both_registered() {
        let schema = parse_schema(&json!({
            "$defs": {"A": {"type": "boolean"}},
            "definitions": {"B": {"type": "null"}}
        }))
        .unwrap();
        let Schema::Object(obj) = schema else { panic!("expected object schema") };
        assert!(obj.defs.contains_key("A"));
        assert!(obj.defs.contains_key("B"));
    }

    #[test]
    fn is_empty_object_is_true_only_with_no_keywords() {
        assert!(SchemaObject::default().is_empty_object());
        let with_type = SchemaObject { r#type: Some(TypeSet(vec!["string".to_string()])), ..SchemaObject::default() };
        assert!(!with_type.is_empty_object());
    }

    #[test]
    fn has_combinator_detects_any_of_the_three() {
        let obj = SchemaObject { any_of: vec![Schema::Bool(true)], ..SchemaObject::default() };
        assert!(obj.has_combinator());
        assert!(!SchemaObject::default().has_combinator());
    }
}

impl SchemaObject {
    pub fn has_combinator(&self) -> bool {
        !self.all_of.is_empty() || !self.any_of.is_empty() || !self.one_of.is_empty()
    }

    pub fn is_empty_object(&self) -> bool {
        self.id.is_none()
            && self.reference.is_none()
            && self.defs.is_empty()
            && !self.has_combinator()
            && self.r#type.is_none()
            && self.r#enum.is_none()
            && self.r#const.is_none()
            && self.properties.is_empty()
            && self.required.is_empty()
            && self.additional_properties.is_none()
            && self.prefix_items.is_none()
            && self.items.is_none()
    }
}
