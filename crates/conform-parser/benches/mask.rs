use conform_ir::builder::byte_range;
use conform_ir::builder::join;
use conform_ir::builder::select;
use conform_ir::builder::string;
use conform_parser::mask;
use conform_parser::trie::VocabEntry;
use conform_parser::trie::VocabTrie;
use criterion::*;

fn digits() -> conform_ir::node::Node {
    byte_range(b'0', b'9')
}

fn build_grammar() -> conform_ir::node::Node {
    // A modest object-shaped grammar: `{"id": <int>, "name": "<word>"}`,
    // wide enough to exercise a realistic number of live alternatives per
    // byte without needing the full JSON-Schema compiler in this bench.
    let name_char = select((b'a'..=b'z').map(|c| byte_range(c, c)).collect::<Vec<_>>(), false);
    join([
        string(b"{\"id\":"),
        digits(),
        string(b",\"name\":\""),
        name_char.clone(),
        name_char.clone(),
        name_char,
        string(b"\"}"),
    ])
}

fn build_vocab() -> Vec<VocabEntry> {
    let mut vocab = Vec::new();
    let mut id = 0u32;
    for fragment in ["{\"id\":", ",\"name\":\"", "\"}", "1", "12", "123", "ab", "z"] {
        vocab.push(VocabEntry {
            token_id: id,
            bytes: fragment.as_bytes().to_vec(),
        });
        id += 1;
    }
    for b in 0..=255u16 {
        vocab.push(VocabEntry {
            token_id: id,
            bytes: vec![b as u8],
        });
        id += 1;
    }
    vocab
}

fn bench_mask_computation(c: &mut Criterion) {
    let grammar = build_grammar();
    let vocab = build_vocab();
    let trie = VocabTrie::build(&vocab, vocab.len() as u32);
    let vocab_size = vocab.len() + 1;

    c.bench_function("mask_compute_at_root", move |b| {
        b.iter(|| mask::compute(&trie, black_box(&grammar), vocab_size).unwrap())
    });
}

criterion_group!(benches, bench_mask_computation);
criterion_main!(benches);
