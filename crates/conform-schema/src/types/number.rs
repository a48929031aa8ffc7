use conform_ir::regex::compile_pattern;
use conform_ir::regex::CompileOptions;
use conform_ir::Node;

use crate::error::SchemaError;
use crate::number::number_range_pattern;
use crate::schema::SchemaObject;

/// `exclusiveMinimum`/`exclusiveMaximum` are folded straight into
/// `minimum`/`maximum` for `number`: the regex this produces is already an
/// approximation (see `number_range_pattern`), so nudging a float bound by
/// an epsilon wouldn't buy any real precision.
fn resolve_bounds(obj: &SchemaObject) -> (Option<f64>, Option<f64>) {
    let min = match (obj.minimum, obj.exclusive_minimum) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, b) => a.or(b),
    };
    let max = match (obj.maximum, obj.exclusive_maximum) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    };
    (min, max)
}

pub fn compile(obj: &SchemaObject) -> Result<Node, SchemaError> {
    let (min, max) = resolve_bounds(obj);
    let pattern = number_range_pattern(min, max);
    Ok(compile_pattern(&pattern, CompileOptions::default())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exclusive_and_inclusive_minimum_take_the_tighter_one() {
        let obj = SchemaObject { minimum: Some(1.0), exclusive_minimum: Some(2.5), ..SchemaObject::default() };
        assert_eq!(resolve_bounds(&obj).0, Some(2.5));
    }

    #[test]
    fn exclusive_and_inclusive_maximum_take_the_tighter_one() {
        let obj = SchemaObject { maximum: Some(9.0), exclusive_maximum: Some(4.0), ..SchemaObject::default() };
        assert_eq!(resolve_bounds(&obj).1, Some(4.0));
    }

    #[test]
    fn fractional_bounds_compile() {
        let obj = SchemaObject { minimum: Some(0.5), maximum: Some(10.25), ..SchemaObject::default() };
        assert!(compile(&obj).is_ok());
    }
}
