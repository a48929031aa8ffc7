//! `allOf` merging (§4.3.2 step 2): "intersect types, union required,
//! concatenate properties per key ..., intersect enums, unify const,
//! recurse through `$ref`. ... Other keys propagate unchanged; duplicates
//! of unmergeable keys raise `AllOfUnsupportedDuplicate`."

use crate::error::SchemaError;
use crate::resolver::resolve_uri;
use crate::resolver::Resolver;
use crate::schema::Schema;
use crate::schema::SchemaObject;

/// Dereferences a branch that is *only* a `$ref` (no sibling keywords) so
/// `allOf` merging sees through it, per §4.3.2's "recurse through `$ref`".
/// A `$ref` with siblings is left alone — step 4 of the dispatch (wrap in
/// `allOf`) handles that shape, not this one.
fn flatten_branch<'doc>(
    schema: &Schema,
    resolver: &Resolver<'doc>,
    base: &str,
) -> Result<SchemaObject, SchemaError> {
    match schema {
        Schema::Bool(true) => Ok(SchemaObject::default()),
        Schema::Bool(false) => Err(SchemaError::AllOfConflict {
            reason: "an allOf branch is the `false` schema, which matches nothing".to_string(),
        }),
        Schema::Object(obj) => {
            if let Some(r) = &obj.reference {
                if obj.is_empty_object() {
                    let uri = resolve_uri(base, r);
                    let target = resolver
                        .lookup(&uri)
                        .ok_or_else(|| SchemaError::RefNotFound { uri: uri.clone() })?;
                    return flatten_branch(target, resolver, &uri);
                }
            }
            // A branch that is itself (or carries) an `allOf` must be fully
            // folded before its fields are read, or its own allOf branches
            // silently vanish (never visited by `merge_all_of`'s loop,
            // which only reads `flat`'s scalar/collection fields).
            if !obj.all_of.is_empty() {
                let mut direct = obj.clone();
                direct.all_of = Vec::new();
                let mut branches = obj.all_of.clone();
                branches.push(Schema::Object(direct));
                return merge_all_of(&branches, resolver, base);
            }
            Ok(obj.clone())
        }
    }
}

pub fn merge_all_of<'doc>(
    branches: &[Schema],
    resolver: &Resolver<'doc>,
    base: &str,
) -> Result<SchemaObject, SchemaError> {
    let mut merged = SchemaObject::default();
    let mut type_set: Option<Vec<String>> = None;

    for branch in branches {
        let flat = flatten_branch(branch, resolver, base)?;

        if let Some(t) = &flat.r#type {
            type_set = Some(match type_set {
                None => t.0.clone(),
                Some(existing) => existing.into_iter().filter(|x| t.0.contains(x)).collect(),
            });
        }

        merged.required.extend(flat.required.iter().cloned());

        for (key, value) in flat.properties {
            match merged.properties.shift_remove(&key) {
                Some(existing) => {
                    let combined = Schema::Object(SchemaObject {
                        all_of: vec![existing, value],
                        ..SchemaObject::default()
                    });
                    merged.properties.insert(key, combined);
                }
                None => {
                    merged.properties.insert(key, value);
                }
            }
        }

        if let Some(e) = &flat.r#enum {
            merged.r#enum = Some(match &merged.r#enum {
                None => e.clone(),
                Some(existing) => existing.iter().filter(|v| e.contains(v)).cloned().collect(),
            });
        }

        if let Some(c) = &flat.r#const {
            match &merged.r#const {
                None => merged.r#const = Some(c.clone()),
                Some(existing) if existing == c => {}
                Some(_) => {
                    return Err(SchemaError::AllOfConflict {
                        reason: "conflicting const values across allOf branches".to_string(),
                    })
                }
            }
        }

        merge_other(&mut merged.pattern, flat.pattern, "pattern")?;
        merge_other(&mut merged.format, flat.format, "format")?;
        merge_other(&mut merged.min_length, flat.min_length, "minLength")?;
        merge_other(&mut merged.max_length, flat.max_length, "maxLength")?;
        merge_other(&mut merged.minimum, flat.minimum, "minimum")?;
        merge_other(&mut merged.maximum, flat.maximum, "maximum")?;
        merge_other(&mut merged.exclusive_minimum, flat.exclusive_minimum, "exclusiveMinimum")?;
        merge_other(&mut merged.exclusive_maximum, flat.exclusive_maximum, "exclusiveMaximum")?;
        merge_other(&mut merged.min_items, flat.min_items, "minItems")?;
        merge_other(&mut merged.max_items, flat.max_items, "maxItems")?;
        merge_other(&mut merged.prefix_items, flat.prefix_items, "prefixItems")?;
        merge_other(&mut merged.items, flat.items, "items")?;
        merge_other(&mut merged.additional_properties, flat.additional_properties, "additionalProperties")?;
    }

    if let Some(ts) = type_set {
        if ts.is_empty() {
            return Err(SchemaError::AllOfConflict {
                reason: "allOf branches intersect to an empty type set".to_string(),
            });
        }
        merged.r#type = Some(crate::schema::TypeSet(ts));
    }

    Ok(merged)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::merge_all_of;
    use crate::compile_schema;
    use crate::error::SchemaError;
    use crate::resolver::Resolver;
    use crate::schema::parse_schema;
    use crate::schema::Schema;

    #[test]
    fn branch_carrying_its_own_all_of_is_fully_folded() {
        // A schema with both `allOf` and `anyOf`/`oneOf` is rewritten as
        // `anyOf`/`oneOf` of `allOf`s (§4.3.2 step 1): each branch is merged
        // against a "siblings" schema that still carries the original
        // `allOf` list. `merge_all_of` must fold that nested `allOf` rather
        // than silently dropping it.
        let root = Schema::Bool(true);
        let resolver = Resolver::new("#", &root);
        let branch_b =
            parse_schema(&json!({"type": "object", "properties": {"b": {"type": "boolean"}}, "required": ["b"]}))
                .unwrap();
        let siblings_with_nested_all_of = parse_schema(&json!({
            "allOf": [{"type": "object", "properties": {"a": {"type": "boolean"}}, "required": ["a"]}]
        }))
        .unwrap();

        let merged = merge_all_of(&[branch_b, siblings_with_nested_all_of], &resolver, "#").unwrap();
        assert!(merged.properties.contains_key("a"), "allOf's own property was dropped");
        assert!(merged.properties.contains_key("b"));
        assert!(merged.required.contains(&"a".to_string()), "allOf's own requirement was dropped");
        assert!(merged.required.contains(&"b".to_string()));
    }

    #[test]
    fn all_of_alongside_any_of_merges_both_requirements() {
        let schema = json!({
            "allOf": [{"type": "object", "properties": {"a": {"type": "boolean"}}, "required": ["a"]}],
            "anyOf": [{"type": "object", "properties": {"b": {"type": "boolean"}}, "required": ["b"]}]
        });
        let without_a = json!({
            "anyOf": [{"type": "object", "properties": {"b": {"type": "boolean"}}, "required": ["b"]}]
        });
        let (with_allof, _) = compile_schema(&schema, true).unwrap();
        let (bare_any_of, _) = compile_schema(&without_a, true).unwrap();
        // The allOf's own requirement must change the compiled grammar;
        // previously it was dropped and both schemas compiled identically.
        assert_ne!(with_allof, bare_any_of);
    }

    #[test]
    fn required_is_unioned_across_branches() {
        let schema = json!({
            "allOf": [
                {"type": "object", "properties": {"a": {"type": "boolean"}}, "required": ["a"]},
                {"type": "object", "properties": {"b": {"type": "boolean"}}, "required": ["b"]}
            ]
        });
        let (grammar, _) = compile_schema(&schema, true).unwrap();
        assert!(!conform_ir::first_bytes::is_nullable(&grammar));
    }

    #[test]
    fn conflicting_type_sets_are_rejected() {
        let schema = json!({"allOf": [{"type": "string"}, {"type": "boolean"}]});
        let err = compile_schema(&schema, true).unwrap_err();
        assert!(matches!(err, SchemaError::AllOfConflict { .. }));
    }

    #[test]
    fn conflicting_const_values_are_rejected() {
        let schema = json!({"allOf": [{"const": 1}, {"const": 2}]});
        let err = compile_schema(&schema, true).unwrap_err();
        assert!(matches!(err, SchemaError::AllOfConflict { .. }));
    }

    #[test]
    fn duplicate_unmergeable_keyword_is_an_error() {
        let schema = json!({
            "allOf": [
                {"type": "string", "pattern": "^a$"},
                {"type": "string", "pattern": "^b$"}
            ]
        });
        let err = compile_schema(&schema, true).unwrap_err();
        assert!(matches!(err, SchemaError::AllOfUnsupportedDuplicate { .. }));
    }

    #[test]
    fn same_property_in_two_branches_is_merged_via_nested_all_of() {
        let schema = json!({
            "allOf": [
                {"type": "object", "properties": {"a": {"type": "integer", "minimum": 0}}},
                {"type": "object", "properties": {"a": {"type": "integer", "maximum": 10}}}
            ]
        });
        assert!(compile_schema(&schema, true).is_ok());
    }
}

fn merge_other<T: PartialEq>(
    existing: &mut Option<T>,
    new: Option<T>,
    keyword: &'static str,
) -> Result<(), SchemaError> {
    if let Some(n) = new {
        if existing.is_some() {
            return Err(SchemaError::AllOfUnsupportedDuplicate {
                keyword: keyword.to_string(),
            });
        }
        *existing = Some(n);
    }
    Ok(())
}
