//! `anyOf`/`oneOf` dispatch (§4.3.2 step 3): sibling keywords distribute
//! into each branch via a synthesized `allOf`, then the branches are
//! compiled and joined with `select`. `oneOf` with exactly one branch is
//! exact; with more than one it falls back to `anyOf` semantics (plain
//! union, no exclusivity check) and records `Warning::OneOfFallback`,
//! since enforcing "exactly one branch matches" against a byte grammar
//! would need runtime backtracking this IR doesn't do (§9).

use conform_ir::builder::select;
use conform_ir::Node;

use crate::compiler::compile_object_direct;
use crate::compiler::CompileCtx;
use crate::diagnostics::Warning;
use crate::error::SchemaError;
use crate::schema::Schema;
use crate::schema::SchemaObject;

pub fn compile_distributed<'doc>(
    ctx: &mut CompileCtx<'doc>,
    obj: &SchemaObject,
    base: &str,
) -> Result<Node, SchemaError> {
    let branches: &[Schema] = if !obj.any_of.is_empty() { &obj.any_of } else { &obj.one_of };
    let is_one_of = obj.any_of.is_empty();

    if is_one_of && branches.len() > 1 {
        ctx.diagnostics.push(Warning::OneOfFallback { pointer: base.to_string() });
    }

    let mut siblings = obj.clone();
    siblings.any_of.clear();
    siblings.one_of.clear();

    let alts: Result<Vec<Node>, SchemaError> = branches
        .iter()
        .map(|branch| {
            if siblings.is_empty_object() {
                return compile_branch(ctx, branch, base);
            }
            // Distribute the sibling keywords into this branch via a
            // synthesized two-way `allOf` (§4.3.2 step 3), then merge it
            // the same way an explicit `allOf` would be.
            let pair = [branch.clone(), Schema::Object(siblings.clone())];
            let merged = crate::allof::merge_all_of(&pair, &ctx.resolver, base)?;
            compile_object_direct(ctx, &merged, base)
        })
        .collect();
    Ok(select(alts?, false))
}

fn compile_branch<'doc>(ctx: &mut CompileCtx<'doc>, branch: &Schema, base: &str) -> Result<Node, SchemaError> {
    match branch {
        Schema::Bool(true) => Ok(crate::types::any::compile()),
        Schema::Bool(false) => Ok(select(Vec::new(), false)),
        Schema::Object(obj) => compile_object_direct(ctx, obj, base),
    }
}

#[cfg(test)]
mod tests {
    use conform_ir::first_bytes::first_bytes;
    use serde_json::json;

    use crate::compile_schema;

    #[test]
    fn any_of_offers_every_branchs_first_byte() {
        let schema = json!({"anyOf": [{"type": "string"}, {"type": "integer"}]});
        let (grammar, _) = compile_schema(&schema, true).unwrap();
        let first = first_bytes(&grammar);
        assert!(first.contains(b'"'));
        assert!(first.contains(b'0') || first.contains(b'-'));
    }

    #[test]
    fn one_of_with_multiple_branches_warns_and_falls_back_to_any_of() {
        let schema = json!({"oneOf": [{"type": "string"}, {"type": "integer"}]});
        let (_, diagnostics) = compile_schema(&schema, true).unwrap();
        assert!(!diagnostics.is_empty());
    }

    #[test]
    fn one_of_with_a_single_branch_has_no_warning() {
        let schema = json!({"oneOf": [{"type": "string"}]});
        let (_, diagnostics) = compile_schema(&schema, true).unwrap();
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn sibling_keywords_distribute_into_each_branch() {
        let schema = json!({
            "anyOf": [{"type": "object", "properties": {"a": {"type": "boolean"}}}],
            "required": ["a"]
        });
        let (grammar, _) = compile_schema(&schema, true).unwrap();
        assert!(!conform_ir::first_bytes::is_nullable(&grammar));
    }
}
