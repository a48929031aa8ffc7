use conform_ir::regex::compile_pattern;
use conform_ir::regex::CompileOptions;
use conform_ir::Node;

use crate::error::SchemaError;
use crate::number::integer_range_pattern;
use crate::schema::SchemaObject;

/// Resolves `minimum`/`exclusiveMinimum` and `maximum`/`exclusiveMaximum`
/// into a single inclusive bound each, "by coercion to half-open integer
/// intervals" (§4.3.3).
fn resolve_bounds(obj: &SchemaObject) -> (Option<i64>, Option<i64>) {
    let mut min = obj.minimum.map(|m| m.ceil() as i64);
    if let Some(em) = obj.exclusive_minimum {
        let candidate = if em.fract() == 0.0 { em as i64 + 1 } else { em.ceil() as i64 };
        min = Some(min.map_or(candidate, |m| m.max(candidate)));
    }

    let mut max = obj.maximum.map(|m| m.floor() as i64);
    if let Some(em) = obj.exclusive_maximum {
        let candidate = if em.fract() == 0.0 { em as i64 - 1 } else { em.floor() as i64 };
        max = Some(max.map_or(candidate, |m| m.min(candidate)));
    }

    (min, max)
}

pub fn compile(obj: &SchemaObject) -> Result<Node, SchemaError> {
    let (min, max) = resolve_bounds(obj);
    let pattern = integer_range_pattern(min, max);
    Ok(compile_pattern(&pattern, CompileOptions::default())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exclusive_minimum_excludes_the_boundary() {
        let obj = SchemaObject { exclusive_minimum: Some(5.0), ..SchemaObject::default() };
        assert_eq!(resolve_bounds(&obj).0, Some(6));
    }

    #[test]
    fn exclusive_maximum_excludes_the_boundary() {
        let obj = SchemaObject { exclusive_maximum: Some(5.0), ..SchemaObject::default() };
        assert_eq!(resolve_bounds(&obj).1, Some(4));
    }

    #[test]
    fn inclusive_and_exclusive_bound_take_the_tighter_one() {
        let obj = SchemaObject { minimum: Some(3.0), exclusive_minimum: Some(5.0), ..SchemaObject::default() };
        assert_eq!(resolve_bounds(&obj).0, Some(6));
    }

    #[test]
    fn no_bounds_compiles_to_the_unbounded_pattern() {
        let obj = SchemaObject::default();
        assert!(compile(&obj).is_ok());
    }
}
