//! JSON-Schema-to-grammar compilation (§4.3): turns a Draft 2020-12 subset
//! of JSON Schema into a `conform_ir::Node` that accepts exactly (or, where
//! noted, approximately) the JSON instances the schema would validate.

pub mod allof;
pub mod anyof;
pub mod compiler;
pub mod diagnostics;
pub mod error;
pub mod format;
pub mod number;
pub mod repeat;
pub mod resolver;
pub mod schema;
pub mod sequence;
pub mod types;

pub use compiler::CompileCtx;
pub use diagnostics::Diagnostics;
pub use diagnostics::Warning;
pub use error::SchemaError;
pub use schema::Schema;
pub use schema::SchemaObject;

use conform_ir::Node;

/// Compiles a JSON Schema document into a grammar.
///
/// `whitespace_flexible` controls whether array/object separators (`,`,
/// `:`, the brackets) may be surrounded by insignificant whitespace the way
/// a human-formatted JSON document would be, or must be emitted exactly
/// with no padding (§4.4). Returns the compiled grammar plus any non-fatal
/// warnings collected along the way (§7).
pub fn compile_schema(
    document: &serde_json::Value,
    whitespace_flexible: bool,
) -> Result<(Node, Diagnostics), SchemaError> {
    let root = schema::parse_schema(document)?;
    let mut ctx = CompileCtx::new("#", &root, whitespace_flexible);
    compiler::register_defs(&mut ctx.resolver, &root, "#");
    let node = compiler::compile(&mut ctx, &root, "#")?;
    Ok((node, ctx.diagnostics))
}
