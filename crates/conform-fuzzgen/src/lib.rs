//! Arbitrary-based generators for random JSON Schemas and regex patterns
//! (§8's round-trip and JSON-validity properties), mirroring the way
//! `apollo-smith::DocumentBuilder` builds random-but-structurally-valid
//! GraphQL documents from an `arbitrary::Unstructured` byte source instead
//! of writing a generator by hand for every test.

pub mod regex;
pub mod schema;

pub use regex::RegexBuilder;
pub use schema::SchemaBuilder;

#[cfg(test)]
mod tests {
    use arbitrary::Unstructured;

    /// Every schema this crate generates either compiles to a grammar or
    /// fails with a structured `SchemaError` — never panics (§8's
    /// "round-trip" property, exercised here rather than only in the fuzz
    /// crate's binary targets, so `cargo test` alone already covers it).
    #[test]
    fn generated_schemas_compile_or_fail_cleanly() {
        let bytes: Vec<u8> = (0u8..=255).cycle().take(4096).collect();
        let mut u = Unstructured::new(&bytes);
        for _ in 0..16 {
            let schema = crate::SchemaBuilder::new(&mut u).arbitrary_schema().unwrap();
            let _ = conform_schema::compile_schema(&schema, true);
        }
    }

    /// Every pattern this crate generates either compiles to a regex AST or
    /// fails with a structured `RegexError` — never panics.
    #[test]
    fn generated_patterns_compile_or_fail_cleanly() {
        let bytes: Vec<u8> = (0u8..=255).cycle().take(2048).collect();
        let mut u = Unstructured::new(&bytes);
        for _ in 0..16 {
            let pattern = crate::RegexBuilder::new(&mut u).arbitrary_pattern().unwrap();
            let _ = conform_ir::regex::parse(&pattern);
        }
    }
}
