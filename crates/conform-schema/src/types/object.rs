//! `object` compilation (§4.3.3): `properties` become an ordered-optional
//! sequence keyed by `required` (§4.3.4); `additionalProperties` becomes a
//! repeated `"key": value` tail whose keys exclude the already-declared
//! property names.
//!
//! A missing `additionalProperties` is treated as `false` (a closed
//! object): the point of this compiler is to constrain generation to an
//! exact shape, and an open-ended "any extra key" tail would let the model
//! wander outside the declared properties whenever a schema simply doesn't
//! mention the keyword. This is a deliberate departure from JSON Schema
//! *validation* semantics (where an absent `additionalProperties` defaults
//! to `true`) — see DESIGN.md.

use conform_ir::builder::byte_range;
use conform_ir::builder::join;
use conform_ir::builder::json_string_lexeme;
use conform_ir::builder::select;
use conform_ir::builder::string;
use conform_ir::subgrammar::exclude_literals;
use conform_ir::Node;

use crate::compiler::compile as compile_schema;
use crate::compiler::CompileCtx;
use crate::error::SchemaError;
use crate::repeat::repeat_homogeneous;
use crate::schema::Schema;
use crate::schema::SchemaObject;
use crate::sequence::build_sequence;
use crate::sequence::SequenceItem;
use crate::types::any;

/// Printable ASCII excluding `"` and `\`, approximating legal JSON string
/// content for additional-property keys. Full Unicode key content would
/// need `exclude_literals` to understand multi-byte lead/continuation
/// sequences, which it doesn't (see DESIGN.md).
fn key_content_class() -> Node {
    select(
        [byte_range(0x20, 0x21), byte_range(0x23, 0x5b), byte_range(0x5d, 0x7e)],
        false,
    )
}

fn quoted_key(name: &str) -> Node {
    string(format!("\"{name}\"").as_bytes())
}

pub fn compile(ctx: &mut CompileCtx<'_>, obj: &SchemaObject, base: &str) -> Result<Node, SchemaError> {
    let mut items = Vec::with_capacity(obj.properties.len() + 1);
    for (name, schema) in &obj.properties {
        let value = compile_schema(ctx, schema, base)?;
        let entry = join([quoted_key(name), ctx.colon(), value]);
        if obj.required.contains(name) {
            items.push(SequenceItem::required(entry));
        } else {
            items.push(SequenceItem::optional(entry));
        }
    }

    if let Some(extra) = &obj.additional_properties {
        if !matches!(extra.as_ref(), Schema::Bool(false)) {
            let value = match extra.as_ref() {
                Schema::Bool(true) => any::compile(),
                other => compile_schema(ctx, other, base)?,
            };
            let excluded: Vec<&[u8]> = obj.properties.keys().map(|k| k.as_bytes()).collect();
            let key = json_string_lexeme(exclude_literals(key_content_class(), &excluded), true);
            let pair = join([key, ctx.colon(), value]);
            let tail = repeat_homogeneous(pair, ctx.comma(), 0, None);
            items.push(SequenceItem::optional(tail));
        }
    } else {
        for name in &obj.required {
            if !obj.properties.contains_key(name) {
                return Err(SchemaError::UnsatisfiableObject {
                    reason: format!("\"{name}\" is required but not declared in properties, and additionalProperties is closed"),
                });
            }
        }
    }

    let body = build_sequence(&items, &ctx.comma());
    Ok(join([string(b"{"), ctx.ws(), body, ctx.ws(), string(b"}")]))
}

#[cfg(test)]
mod tests {
    use conform_ir::first_bytes::is_nullable;
    use serde_json::json;

    use crate::compile_schema;
    use crate::error::SchemaError;

    #[test]
    fn missing_additional_properties_matches_explicit_false() {
        let open_by_silence = compile_schema(
            &json!({"type": "object", "properties": {"a": {"type": "boolean"}}}),
            true,
        )
        .unwrap();
        let explicitly_closed = compile_schema(
            &json!({"type": "object", "properties": {"a": {"type": "boolean"}}, "additionalProperties": false}),
            true,
        )
        .unwrap();
        assert_eq!(open_by_silence.0, explicitly_closed.0);
    }

    #[test]
    fn required_key_missing_from_properties_is_unsatisfiable() {
        let schema = json!({
            "type": "object",
            "properties": {},
            "required": ["a"]
        });
        let err = compile_schema(&schema, true).unwrap_err();
        assert!(matches!(err, SchemaError::UnsatisfiableObject { .. }));
    }

    #[test]
    fn additional_properties_true_allows_any_extra_key() {
        let schema = json!({
            "type": "object",
            "properties": {"a": {"type": "boolean"}},
            "additionalProperties": true
        });
        let (grammar, _) = compile_schema(&schema, true).unwrap();
        assert!(is_nullable(&grammar));
    }

    #[test]
    fn additional_properties_false_is_equivalent_to_absent() {
        let with_false = compile_schema(
            &json!({"type": "object", "properties": {}, "additionalProperties": false}),
            true,
        )
        .unwrap();
        let absent = compile_schema(&json!({"type": "object", "properties": {}}), true).unwrap();
        assert_eq!(with_false.0, absent.0);
    }
}
