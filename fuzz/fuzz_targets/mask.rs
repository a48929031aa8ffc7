#![no_main]
use conform_fuzzgen::SchemaBuilder;
use conform_parser::mask;
use conform_parser::trie::VocabEntry;
use conform_parser::trie::VocabTrie;
use libfuzzer_sys::arbitrary::Arbitrary;
use libfuzzer_sys::arbitrary::Unstructured;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);
    let Ok(schema) = SchemaBuilder::new(&mut u).arbitrary_schema() else {
        return;
    };
    let Ok((grammar, _)) = conform_schema::compile_schema(&schema, true) else {
        return;
    };

    // A small vocabulary: every single byte plus a handful of arbitrary
    // multi-byte fragments drawn from the remaining fuzz input, so the trie
    // walk in `mask::compute` (§4.5) exercises shared-prefix branching, not
    // just single-byte tokens.
    let mut vocab: Vec<VocabEntry> = (0u32..256).map(|b| VocabEntry { token_id: b, bytes: vec![b as u8] }).collect();
    let mut next_id = 256u32;
    while let Ok(fragment) = Vec::<u8>::arbitrary(&mut u) {
        if fragment.is_empty() || fragment.len() > 8 {
            break;
        }
        vocab.push(VocabEntry { token_id: next_id, bytes: fragment });
        next_id += 1;
        if next_id > 2000 {
            break;
        }
    }

    let eos_token_id = next_id;
    let trie = VocabTrie::build(&vocab, eos_token_id);
    // Never panics: either a mask, or `Unresolved` from an unresolved
    // `DeferredReference`, which a freshly compiled grammar never reaches.
    let _ = mask::compute(&trie, &grammar, eos_token_id as usize + 1);
});
