//! `array` compilation (§4.3.3): `prefixItems` become an ordered-optional
//! sequence (§4.3.4); trailing elements, governed by `items` and bounded by
//! `minItems`/`maxItems`, join that same sequence as one more (possibly
//! required) entry so the shared leading/trailing-comma logic in
//! `sequence::build_sequence` doesn't need to know repetition from a single
//! value.

use conform_ir::builder::join;
use conform_ir::builder::string;
use conform_ir::Node;

use crate::compiler::compile as compile_schema;
use crate::compiler::CompileCtx;
use crate::error::SchemaError;
use crate::repeat::repeat_homogeneous;
use crate::schema::SchemaObject;
use crate::sequence::build_sequence;
use crate::sequence::SequenceItem;
use crate::types::any;

pub fn compile(ctx: &mut CompileCtx<'_>, obj: &SchemaObject, base: &str) -> Result<Node, SchemaError> {
    let min_items = obj.min_items.unwrap_or(0);
    if let Some(max_items) = obj.max_items {
        if max_items < min_items {
            return Err(SchemaError::BadArrayBounds { min: min_items, max: max_items });
        }
    }

    let prefix_items = obj.prefix_items.as_deref().unwrap_or(&[]);
    let prefix_len = prefix_items.len() as u64;
    let required_prefix = min_items.min(prefix_len);

    let mut items = Vec::with_capacity(prefix_items.len() + 1);
    for (i, schema) in prefix_items.iter().enumerate() {
        let grammar = compile_schema(ctx, schema, base)?;
        if (i as u64) < required_prefix {
            items.push(SequenceItem::required(grammar));
        } else {
            items.push(SequenceItem::optional(grammar));
        }
    }

    let tail_min = min_items.saturating_sub(prefix_len);
    let tail_max = obj.max_items.map(|m| m.saturating_sub(prefix_len));

    if tail_max != Some(0) {
        let item_grammar = match &obj.items {
            Some(schema) if tail_min > 0 && matches!(schema.as_ref(), crate::schema::Schema::Bool(false)) => {
                return Err(SchemaError::UnsatisfiableArray {
                    reason: "minItems/prefixItems require trailing elements but items is `false`".to_string(),
                })
            }
            Some(schema) => compile_schema(ctx, schema, base)?,
            None if tail_min > 0 => {
                return Err(SchemaError::UnsatisfiableArray {
                    reason: "minItems/prefixItems require trailing elements but no items schema is given".to_string(),
                })
            }
            None => any::compile(),
        };
        let tail = repeat_homogeneous(item_grammar, ctx.comma(), tail_min, tail_max);
        if tail_min > 0 {
            items.push(SequenceItem::required(tail));
        } else {
            items.push(SequenceItem::optional(tail));
        }
    }

    let body = build_sequence(&items, &ctx.comma());
    Ok(join([string(b"["), ctx.ws(), body, ctx.ws(), string(b"]")]))
}

#[cfg(test)]
mod tests {
    use conform_ir::first_bytes::is_nullable;
    use serde_json::json;

    use crate::compile_schema;
    use crate::error::SchemaError;

    #[test]
    fn empty_array_bounds_default_to_unbounded() {
        let schema = json!({"type": "array", "items": {"type": "boolean"}});
        let (grammar, _) = compile_schema(&schema, true).unwrap();
        assert!(is_nullable(&grammar));
    }

    #[test]
    fn min_items_without_items_schema_is_unsatisfiable() {
        let schema = json!({"type": "array", "minItems": 2});
        let err = compile_schema(&schema, true).unwrap_err();
        assert!(matches!(err, SchemaError::UnsatisfiableArray { .. }));
    }

    #[test]
    fn max_less_than_min_is_rejected() {
        let schema = json!({"type": "array", "minItems": 3, "maxItems": 1, "items": {"type": "boolean"}});
        let err = compile_schema(&schema, true).unwrap_err();
        assert!(matches!(err, SchemaError::BadArrayBounds { min: 3, max: 1 }));
    }

    #[test]
    fn items_false_with_unmet_min_items_is_unsatisfiable() {
        let schema = json!({
            "type": "array",
            "prefixItems": [{"type": "boolean"}],
            "minItems": 3,
            "items": false
        });
        let err = compile_schema(&schema, true).unwrap_err();
        assert!(matches!(err, SchemaError::UnsatisfiableArray { .. }));
    }

    #[test]
    fn items_false_with_min_items_met_by_prefix_is_fine() {
        let schema = json!({
            "type": "array",
            "prefixItems": [{"type": "boolean"}, {"type": "boolean"}],
            "minItems": 2,
            "items": false
        });
        assert!(compile_schema(&schema, true).is_ok());
    }

    #[test]
    fn prefix_items_beyond_min_items_are_optional() {
        let schema = json!({
            "type": "array",
            "prefixItems": [{"type": "boolean"}, {"type": "null"}],
            "minItems": 1
        });
        let (grammar, _) = compile_schema(&schema, true).unwrap();
        // minItems: 1 means the empty array `[]` is no longer reachable.
        assert!(!is_nullable(&grammar));
    }
}
