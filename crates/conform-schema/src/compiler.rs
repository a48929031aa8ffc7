//! The main schema-to-grammar dispatch (§4.3.2): the 7-step keyword
//! precedence order, delegating to `allof`/`anyof` for combinators and to
//! `types::*` once `type` is known.

use std::collections::HashMap;

use conform_ir::builder::join;
use conform_ir::builder::null;
use conform_ir::builder::select;
use conform_ir::builder::string;
use conform_ir::node::DeferredReference;
use conform_ir::regex::compile_pattern;
use conform_ir::regex::CompileOptions;
use conform_ir::Node;

use crate::allof::merge_all_of;
use crate::anyof;
use crate::diagnostics::Diagnostics;
use crate::error::SchemaError;
use crate::resolver::resolve_uri;
use crate::resolver::Resolver;
use crate::schema::Schema;
use crate::schema::SchemaObject;
use crate::types;

enum RefState {
    InProgress(DeferredReference),
    Done(Node),
}

/// Threaded through a single top-level `compile_schema` call: the `$ref`
/// resolver, the `$ref` cycle-closing cache, collected non-fatal warnings,
/// and the whitespace policy (§4.4: whether array/object separators may be
/// surrounded by flexible whitespace or must be exact).
pub struct CompileCtx<'doc> {
    pub resolver: Resolver<'doc>,
    pub diagnostics: Diagnostics,
    pub whitespace_flexible: bool,
    ref_cache: HashMap<String, RefState>,
}

impl<'doc> CompileCtx<'doc> {
    pub fn new(root_uri: impl Into<String>, root: &'doc Schema, whitespace_flexible: bool) -> Self {
        Self {
            resolver: Resolver::new(root_uri, root),
            diagnostics: Diagnostics::new(),
            whitespace_flexible,
            ref_cache: HashMap::new(),
        }
    }

    /// The whitespace a JSON writer may put between tokens (`, `, `: `,
    /// around brackets...), or nothing at all when exact formatting is
    /// required.
    pub fn ws(&self) -> Node {
        if self.whitespace_flexible {
            compile_pattern("[ \\t\\n\\r]*", CompileOptions::default())
                .expect("built-in whitespace pattern must compile")
        } else {
            null()
        }
    }

    pub fn comma(&self) -> Node {
        join([self.ws(), string(b","), self.ws()])
    }

    pub fn colon(&self) -> Node {
        join([self.ws(), string(b":"), self.ws()])
    }
}

/// Registers every `$defs`/`definitions` entry found anywhere in the
/// document tree under its absolute URI, so `$ref`s to them resolve
/// regardless of nesting depth (§4.3.1).
pub fn register_defs<'doc>(resolver: &mut Resolver<'doc>, schema: &'doc Schema, base: &str) {
    if let Schema::Object(obj) = schema {
        let base = match &obj.id {
            Some(id) => resolve_uri(base, id),
            None => base.to_string(),
        };
        for (name, sub) in &obj.defs {
            let uri = format!("{base}#/$defs/{name}");
            resolver.register(uri.clone(), sub);
            register_defs(resolver, sub, &uri);
        }
        for sub in obj.properties.values() {
            register_defs(resolver, sub, &base);
        }
        if let Some(sub) = &obj.additional_properties {
            register_defs(resolver, sub, &base);
        }
        if let Some(items) = &obj.prefix_items {
            for sub in items {
                register_defs(resolver, sub, &base);
            }
        }
        if let Some(sub) = &obj.items {
            register_defs(resolver, sub, &base);
        }
        for sub in obj.all_of.iter().chain(&obj.any_of).chain(&obj.one_of) {
            register_defs(resolver, sub, &base);
        }
    }
}

/// Compiles any schema node. `schema` is a plain borrow, not tied to the
/// document arena lifetime `'doc`: only `$ref` lookups through
/// `ctx.resolver` need that longer lifetime, and they fetch their own
/// `&'doc Schema` directly rather than receiving one here. This lets
/// synthesized schemas (the output of `allOf` merging, `anyOf` branch
/// distribution) recurse through the same dispatch as document-native ones.
pub fn compile(ctx: &mut CompileCtx<'_>, schema: &Schema, base: &str) -> Result<Node, SchemaError> {
    match schema {
        Schema::Bool(true) => Ok(types::any::compile()),
        Schema::Bool(false) => Ok(select(Vec::new(), false)),
        Schema::Object(obj) => compile_object(ctx, obj, base),
    }
}

fn compile_object(ctx: &mut CompileCtx<'_>, obj: &SchemaObject, base: &str) -> Result<Node, SchemaError> {
    let base = match &obj.id {
        Some(id) => resolve_uri(base, id),
        None => base.to_string(),
    };

    // Step 1: allOf alongside anyOf/oneOf rewrites as anyOf/oneOf-of-allOf,
    // since `merge_all_of` can't see the disjunction itself.
    if !obj.all_of.is_empty() && (!obj.any_of.is_empty() || !obj.one_of.is_empty()) {
        return anyof::compile_distributed(ctx, obj, &base);
    }

    // Step 2: allOf alone.
    if !obj.all_of.is_empty() {
        let merged = merge_all_of(&obj.all_of, &ctx.resolver, &base)?;
        return compile_merged(ctx, &merged, obj, &base);
    }

    // Step 3: anyOf/oneOf, possibly with sibling keywords distributed in.
    if !obj.any_of.is_empty() || !obj.one_of.is_empty() {
        return anyof::compile_distributed(ctx, obj, &base);
    }

    // Step 4: a bare `$ref` with siblings is an implicit allOf; a `$ref`
    // with no siblings resolves directly.
    if let Some(r) = &obj.reference {
        let uri = resolve_uri(&base, r);
        if obj.is_empty_object() {
            return compile_ref(ctx, &uri);
        }
        let target = ctx
            .resolver
            .lookup(&uri)
            .ok_or_else(|| SchemaError::RefNotFound { uri: uri.clone() })?;
        let target_obj = match target {
            Schema::Object(o) => o.clone(),
            Schema::Bool(_) => SchemaObject::default(),
        };
        let referenced = Schema::Object(SchemaObject { reference: None, ..target_obj });
        let mut siblings = obj.clone();
        siblings.reference = None;
        let merged = merge_all_of(&[referenced, Schema::Object(siblings)], &ctx.resolver, &base)?;
        return compile_object_direct(ctx, &merged, &base);
    }

    compile_object_direct(ctx, obj, &base)
}

/// Resolves an absolute `$ref` URI, closing cycles the way
/// `conform_ir::deferred::recursive` does: a `$ref` already being compiled
/// further up the call stack gets the same `DeferredReference`'s node
/// instead of recursing forever (§4.3.1).
fn compile_ref(ctx: &mut CompileCtx<'_>, uri: &str) -> Result<Node, SchemaError> {
    if let Some(state) = ctx.ref_cache.get(uri) {
        return Ok(match state {
            RefState::InProgress(d) => Node::new_deferred(d.clone()),
            RefState::Done(n) => n.clone(),
        });
    }
    let target = ctx
        .resolver
        .lookup(uri)
        .ok_or_else(|| SchemaError::RefNotFound { uri: uri.to_string() })?;
    let deferred = DeferredReference::new();
    ctx.ref_cache.insert(uri.to_string(), RefState::InProgress(deferred.clone()));

    let built = compile(ctx, target, uri)?;

    deferred
        .resolve(built.clone())
        .expect("compiler: ref target resolved twice for the same URI");
    ctx.ref_cache.insert(uri.to_string(), RefState::Done(Node::new_deferred(deferred)));
    Ok(built)
}

fn compile_merged(
    ctx: &mut CompileCtx<'_>,
    merged: &SchemaObject,
    original: &SchemaObject,
    base: &str,
) -> Result<Node, SchemaError> {
    if !original.any_of.is_empty() || !original.one_of.is_empty() {
        let mut combined = merged.clone();
        combined.any_of = original.any_of.clone();
        combined.one_of = original.one_of.clone();
        return anyof::compile_distributed(ctx, &combined, base);
    }
    compile_object_direct(ctx, merged, base)
}

/// The body of step 5 through step 7, once any combinator/`$ref` above has
/// been resolved away: `const`, then `enum`, then `type` dispatch.
pub fn compile_object_direct(ctx: &mut CompileCtx<'_>, obj: &SchemaObject, base: &str) -> Result<Node, SchemaError> {
    if let Some(c) = &obj.r#const {
        let text = serde_json::to_string(c).map_err(|e| SchemaError::Json(e.to_string()))?;
        return Ok(string(text.as_bytes()));
    }

    if let Some(values) = &obj.r#enum {
        let alts: Result<Vec<Node>, SchemaError> = values
            .iter()
            .filter(|v| obj.r#type.as_ref().map_or(true, |t| t.contains(json_type_name(v))))
            .map(|v| {
                serde_json::to_string(v)
                    .map(|text| string(text.as_bytes()))
                    .map_err(|e| SchemaError::Json(e.to_string()))
            })
            .collect();
        return Ok(select(alts?, false));
    }

    match &obj.r#type {
        Some(types) if types.0.len() == 1 => compile_single_type(ctx, &types.0[0], obj, base),
        Some(types) => {
            let alts: Result<Vec<Node>, SchemaError> =
                types.0.iter().map(|t| compile_single_type(ctx, t, obj, base)).collect();
            Ok(select(alts?, false))
        }
        None => Ok(types::any::compile()),
    }
}

fn compile_single_type(
    ctx: &mut CompileCtx<'_>,
    type_name: &str,
    obj: &SchemaObject,
    base: &str,
) -> Result<Node, SchemaError> {
    match type_name {
        "null" => Ok(types::null::compile()),
        "boolean" => Ok(types::boolean::compile()),
        "integer" => types::integer::compile(obj),
        "number" => types::number::compile(obj),
        "string" => types::string::compile(ctx, obj, base),
        "array" => types::array::compile(ctx, obj, base),
        "object" => types::object::compile(ctx, obj, base),
        other => Err(SchemaError::UnsupportedKeyword { keyword: format!("type: {other}") }),
    }
}

#[cfg(test)]
mod tests {
    use conform_ir::first_bytes::is_nullable;
    use serde_json::json;

    use crate::compile_schema;
    use crate::error::SchemaError;

    #[test]
    fn ref_to_a_sibling_def_resolves() {
        let schema = json!({
            "$defs": {"Flag": {"type": "boolean"}},
            "$ref": "#/$defs/Flag"
        });
        assert!(compile_schema(&schema, true).is_ok());
    }

    #[test]
    fn ref_with_siblings_is_an_implicit_all_of() {
        let schema = json!({
            "$defs": {"Base": {"type": "object", "properties": {"a": {"type": "boolean"}}}},
            "allOf": [{"$ref": "#/$defs/Base"}],
            "required": ["a"]
        });
        let (grammar, _) = compile_schema(&schema, true).unwrap();
        assert!(!is_nullable(&grammar));
    }

    #[test]
    fn unresolvable_ref_is_an_error() {
        let schema = json!({"$ref": "#/$defs/Missing"});
        let err = compile_schema(&schema, true).unwrap_err();
        assert!(matches!(err, SchemaError::RefNotFound { .. }));
    }

    #[test]
    fn recursive_ref_compiles_without_infinite_recursion() {
        let schema = json!({
            "$defs": {
                "Node": {
                    "type": "object",
                    "properties": {
                        "value": {"type": "integer"},
                        "next": {"anyOf": [{"$ref": "#/$defs/Node"}, {"type": "null"}]}
                    },
                    "required": ["value", "next"]
                }
            },
            "$ref": "#/$defs/Node"
        });
        assert!(compile_schema(&schema, true).is_ok());
    }

    #[test]
    fn const_compiles_to_its_literal_json_encoding() {
        let schema = json!({"const": 42});
        let (grammar, _) = compile_schema(&schema, true).unwrap();
        assert!(!is_nullable(&grammar));
    }

    #[test]
    fn enum_is_filtered_by_a_sibling_type() {
        let schema = json!({"type": "string", "enum": ["a", 1, "b"]});
        assert!(compile_schema(&schema, true).is_ok());
    }

    #[test]
    fn multiple_types_compile_to_a_union() {
        let schema = json!({"type": ["string", "null"]});
        assert!(compile_schema(&schema, true).is_ok());
    }

    #[test]
    fn untyped_schema_is_the_any_grammar() {
        let schema = json!({});
        let (grammar, _) = compile_schema(&schema, true).unwrap();
        assert!(!is_nullable(&grammar));
    }

    #[test]
    fn true_schema_is_the_any_grammar() {
        assert!(compile_schema(&json!(true), true).is_ok());
    }

    #[test]
    fn false_schema_matches_nothing() {
        let (grammar, _) = compile_schema(&json!(false), true).unwrap();
        assert!(!is_nullable(&grammar));
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
