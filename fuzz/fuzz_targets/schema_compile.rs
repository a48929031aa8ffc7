#![no_main]
use conform_fuzzgen::SchemaBuilder;
use libfuzzer_sys::arbitrary::Unstructured;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);
    let Ok(schema) = SchemaBuilder::new(&mut u).arbitrary_schema() else {
        return;
    };
    // Never panics: every generated schema either compiles to a grammar or
    // returns a structured `SchemaError` (§7).
    let _ = conform_schema::compile_schema(&schema, true);
});
