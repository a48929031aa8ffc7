//! Random JSON Schema generation, restricted to the keyword subset
//! `conform-schema` actually recognizes (§4.3's dispatch table) so that a
//! generated document is either accepted or rejected for a reason worth
//! fuzzing, never an immediate `UnsupportedKeyword`.

use arbitrary::Result;
use arbitrary::Unstructured;
use serde_json::json;
use serde_json::Value;

/// How deep `SchemaBuilder` will nest `object`/`array` schemas before
/// forcing a scalar leaf, the same role `apollo-smith`'s recursion-limited
/// selection-set builder plays for GraphQL documents: without a cap,
/// `Unstructured`'s own length bound is the only thing standing between a
/// fuzz target and a stack overflow.
const MAX_DEPTH: usize = 4;

pub struct SchemaBuilder<'a, 'u> {
    u: &'a mut Unstructured<'u>,
}

impl<'a, 'u> SchemaBuilder<'a, 'u> {
    pub fn new(u: &'a mut Unstructured<'u>) -> Self {
        Self { u }
    }

    /// Generates one arbitrary schema document (§4.3.2's type dispatch:
    /// object, array, string, integer, number, boolean, null, or a bare
    /// boolean schema).
    pub fn arbitrary_schema(&mut self) -> Result<Value> {
        self.arbitrary_schema_at_depth(0)
    }

    fn arbitrary_schema_at_depth(&mut self, depth: usize) -> Result<Value> {
        if self.u.int_in_range(0..=15usize)? == 0 {
            // Draft 2020-12's boolean schema (§3's supplemented feature).
            return Ok(Value::Bool(self.u.arbitrary()?));
        }

        let choices: &[fn(&mut Self, usize) -> Result<Value>] = if depth >= MAX_DEPTH {
            &[Self::arbitrary_string, Self::arbitrary_integer, Self::arbitrary_number, Self::arbitrary_boolean]
        } else {
            &[
                Self::arbitrary_object,
                Self::arbitrary_array,
                Self::arbitrary_string,
                Self::arbitrary_integer,
                Self::arbitrary_number,
                Self::arbitrary_boolean,
            ]
        };
        let pick = self.u.int_in_range(0..=(choices.len() - 1))?;
        choices[pick](self, depth)
    }

    fn arbitrary_object(&mut self, depth: usize) -> Result<Value> {
        let field_count = self.u.int_in_range(0..=4)?;
        let mut properties = serde_json::Map::new();
        let mut required = Vec::new();
        for i in 0..field_count {
            let name = format!("field{i}");
            properties.insert(name.clone(), self.arbitrary_schema_at_depth(depth + 1)?);
            if self.u.arbitrary()? {
                required.push(Value::String(name));
            }
        }
        let mut schema = json!({
            "type": "object",
            "properties": properties,
            "required": required,
        });
        if self.u.arbitrary()? {
            schema["additionalProperties"] = Value::Bool(false);
        }
        Ok(schema)
    }

    fn arbitrary_array(&mut self, depth: usize) -> Result<Value> {
        let item_schema = self.arbitrary_schema_at_depth(depth + 1)?;
        let min_items: u64 = self.u.int_in_range(0..=3)?;
        let max_items = min_items + u64::from(self.u.int_in_range(0..=3)?);
        Ok(json!({
            "type": "array",
            "items": item_schema,
            "minItems": min_items,
            "maxItems": max_items,
        }))
    }

    fn arbitrary_string(&mut self, _depth: usize) -> Result<Value> {
        let min_length: u64 = self.u.int_in_range(0..=8)?;
        let max_length = min_length + u64::from(self.u.int_in_range(0..=8)?);
        Ok(json!({
            "type": "string",
            "minLength": min_length,
            "maxLength": max_length,
        }))
    }

    fn arbitrary_integer(&mut self, _depth: usize) -> Result<Value> {
        let minimum: i64 = self.u.int_in_range(-1000..=1000)?;
        let maximum = minimum + i64::from(self.u.int_in_range(0..=2000)?);
        Ok(json!({
            "type": "integer",
            "minimum": minimum,
            "maximum": maximum,
        }))
    }

    fn arbitrary_number(&mut self, _depth: usize) -> Result<Value> {
        Ok(json!({ "type": "number" }))
    }

    fn arbitrary_boolean(&mut self, _depth: usize) -> Result<Value> {
        Ok(json!({ "type": "boolean" }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_a_schema_from_arbitrary_bytes() {
        let bytes: Vec<u8> = (0u8..=255).cycle().take(512).collect();
        let mut u = Unstructured::new(&bytes);
        let schema = SchemaBuilder::new(&mut u).arbitrary_schema().unwrap();
        assert!(schema.is_object() || schema.is_boolean());
    }
}
