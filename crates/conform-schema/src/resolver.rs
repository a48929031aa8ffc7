//! `$id`/`$ref` resolution (§4.3.1).
//!
//! Mirrors the memoized-thunk trick `conform_ir::deferred::recursive` uses
//! for self-referential grammars, but keyed by absolute URI instead of a
//! closure's `TypeId` — a `$ref` target is only known at schema-compile
//! time, not at a fixed call site, so the thread-local/`TypeId` scope from
//! `conform-ir` doesn't apply here.
//!
//! This module only holds the document registry (URI -> schema). The
//! in-progress/compiled cache for `$ref` thunks lives on `CompileCtx`
//! instead, since closing a cycle needs to re-enter `compiler::compile`,
//! which needs the whole context, not just the resolver.

use std::collections::HashMap;

use crate::schema::Schema;

/// A document registry: every schema reachable from the root, keyed by
/// absolute URI (§4.3.1).
pub struct Resolver<'doc> {
    documents: HashMap<String, &'doc Schema>,
}

impl<'doc> Resolver<'doc> {
    pub fn new(root_uri: impl Into<String>, root: &'doc Schema) -> Self {
        let mut documents = HashMap::new();
        documents.insert(root_uri.into(), root);
        Self { documents }
    }

    /// Registers an additional document (e.g. found while walking `$defs`)
    /// under its absolute URI so later `$ref`s can resolve to it.
    pub fn register(&mut self, uri: impl Into<String>, schema: &'doc Schema) {
        self.documents.insert(uri.into(), schema);
    }

    pub fn lookup(&self, uri: &str) -> Option<&'doc Schema> {
        self.documents.get(uri).copied()
    }
}

/// Joins a JSON Pointer fragment onto a base URI the way `$ref: "#/$defs/X"`
/// resolves against the document it's written in (§4.3.1: "fragments
/// beginning with `#` append to the current base").
pub fn resolve_uri(base: &str, reference: &str) -> String {
    if let Some(fragment) = reference.strip_prefix('#') {
        let base = base.split('#').next().unwrap_or(base);
        format!("{base}#{fragment}")
    } else {
        reference.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Schema;
    use crate::schema::SchemaObject;

    #[test]
    fn fragment_reference_appends_to_base() {
        assert_eq!(resolve_uri("#", "#/$defs/Foo"), "#/$defs/Foo");
    }

    #[test]
    fn fragment_reference_replaces_an_existing_fragment() {
        assert_eq!(resolve_uri("#/$defs/Outer", "#/$defs/Foo"), "#/$defs/Foo");
    }

    #[test]
    fn absolute_reference_ignores_the_base() {
        assert_eq!(resolve_uri("#/$defs/Outer", "https://example.com/other.json"), "https://example.com/other.json");
    }

    #[test]
    fn lookup_finds_a_registered_document() {
        let root = Schema::Object(SchemaObject::default());
        let mut resolver = Resolver::new("#", &root);
        let extra = Schema::Object(SchemaObject::default());
        resolver.register("#/$defs/Foo", &extra);
        assert!(resolver.lookup("#/$defs/Foo").is_some());
        assert!(resolver.lookup("#/$defs/Bar").is_none());
    }
}
