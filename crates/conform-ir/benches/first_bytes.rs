use conform_ir::builder::byte;
use conform_ir::builder::join;
use conform_ir::builder::null;
use conform_ir::builder::recursive;
use conform_ir::builder::select;
use conform_ir::first_bytes::first_bytes;
use conform_ir::Node;
use criterion::*;

/// A `digits+` grammar nested `depth` `Select`s deep, to stress the
/// fixpoint worklist over a wide reachable-node set.
fn nested_digits(depth: usize) -> Node {
    fn one_level(depth: usize) -> Node {
        if depth == 0 {
            return select((b'0'..=b'9').map(byte), false);
        }
        let inner = one_level(depth - 1);
        select([inner.clone(), join([inner, select((b'0'..=b'9').map(byte), false)])], false)
    }
    one_level(depth)
}

fn recursive_list() -> Node {
    recursive(|| select([null(), join([byte(b'a'), recursive_list()])], false))
}

fn bench_first_bytes_shallow(c: &mut Criterion) {
    let grammar = nested_digits(8);
    c.bench_function("first_bytes_nested_select_depth_8", move |b| {
        b.iter(|| black_box(first_bytes(&grammar)));
    });
}

fn bench_first_bytes_deep(c: &mut Criterion) {
    let grammar = nested_digits(32);
    c.bench_function("first_bytes_nested_select_depth_32", move |b| {
        b.iter(|| black_box(first_bytes(&grammar)));
    });
}

fn bench_first_bytes_recursive(c: &mut Criterion) {
    let grammar = recursive_list();
    c.bench_function("first_bytes_self_referential", move |b| {
        b.iter(|| black_box(first_bytes(&grammar)));
    });
}

criterion_group!(
    benches,
    bench_first_bytes_shallow,
    bench_first_bytes_deep,
    bench_first_bytes_recursive
);
criterion_main!(benches);
