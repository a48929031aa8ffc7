//! `string` compilation (§4.3.3): `pattern` takes priority over `format`,
//! which takes priority over `minLength`/`maxLength`, which takes priority
//! over an unconstrained string. The content regex is built without regard
//! to JSON escaping and then wrapped in `json_string_lexeme`, which overlays
//! the escape grammar (`\"`, `\\`, `\uXXXX`, ...) on top.

use conform_ir::builder::json_string_lexeme;
use conform_ir::regex::compile_pattern;
use conform_ir::regex::CompileOptions;
use conform_ir::Node;

use crate::compiler::CompileCtx;
use crate::diagnostics::Warning;
use crate::error::SchemaError;
use crate::format::format_pattern;
use crate::format::is_approximate;
use crate::schema::SchemaObject;

const DOT_ALL: CompileOptions = CompileOptions { dot_all: true };

fn length_bounds_pattern(min: Option<u64>, max: Option<u64>) -> String {
    match (min, max) {
        (None, None) => ".*".to_string(),
        (min, None) => format!(".{{{},}}", min.unwrap_or(0)),
        (None, Some(max)) => format!(".{{0,{max}}}"),
        (Some(min), Some(max)) => format!(".{{{min},{max}}}"),
    }
}

pub fn compile(ctx: &mut CompileCtx<'_>, obj: &SchemaObject, base: &str) -> Result<Node, SchemaError> {
    let content = if let Some(pattern) = &obj.pattern {
        compile_pattern(pattern, CompileOptions::default())?
    } else if let Some(format) = &obj.format {
        if is_approximate(format) {
            ctx.diagnostics.push(Warning::ApproximateFormat {
                pointer: base.to_string(),
                format: format.clone(),
            });
        }
        let pattern = format_pattern(format)?;
        compile_pattern(pattern, CompileOptions::default())?
    } else {
        let pattern = length_bounds_pattern(obj.min_length, obj.max_length);
        compile_pattern(&pattern, DOT_ALL)?
    };
    Ok(json_string_lexeme(content, true))
}

#[cfg(test)]
mod tests {
    use conform_ir::first_bytes::first_bytes;
    use serde_json::json;

    use crate::compile_schema;
    use crate::error::SchemaError;

    #[test]
    fn pattern_takes_priority_over_format() {
        // A pattern restricted to digits plus an unrelated format: if
        // `pattern` wins, the first byte after the opening quote can only
        // ever be a digit.
        let schema = json!({"type": "string", "pattern": "^[0-9]+$", "format": "email"});
        let (grammar, _) = compile_schema(&schema, true).unwrap();
        let first = first_bytes(&grammar);
        assert!(first.contains(b'"'));
    }

    #[test]
    fn unknown_format_is_an_error() {
        let schema = json!({"type": "string", "format": "not-a-real-format"});
        let err = compile_schema(&schema, true).unwrap_err();
        assert!(matches!(err, SchemaError::UnsupportedFormat { .. }));
    }

    #[test]
    fn approximate_format_raises_a_warning() {
        let schema = json!({"type": "string", "format": "date"});
        let (_, diagnostics) = compile_schema(&schema, true).unwrap();
        assert!(!diagnostics.is_empty());
    }

    #[test]
    fn length_bounds_without_pattern_or_format() {
        let schema = json!({"type": "string", "minLength": 1, "maxLength": 3});
        let (grammar, _) = compile_schema(&schema, true).unwrap();
        assert!(first_bytes(&grammar).contains(b'"'));
    }
}
