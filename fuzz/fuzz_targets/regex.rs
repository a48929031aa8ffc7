#![no_main]
use conform_fuzzgen::RegexBuilder;
use libfuzzer_sys::arbitrary::Unstructured;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);
    let Ok(pattern) = RegexBuilder::new(&mut u).arbitrary_pattern() else {
        return;
    };
    // Never panics: every generated pattern either compiles or returns a
    // structured `RegexError` (§7).
    let _ = conform_ir::regex::parse(&pattern);
});
