use conform_ir::builder::select;
use conform_ir::builder::string;
use conform_ir::Node;

pub fn compile() -> Node {
    select([string(b"true"), string(b"false")], false)
}

#[cfg(test)]
mod tests {
    use conform_ir::first_bytes::first_bytes;
    use conform_ir::first_bytes::is_nullable;

    use super::*;

    #[test]
    fn accepts_exactly_true_or_false() {
        let g = compile();
        assert!(!is_nullable(&g));
        let first = first_bytes(&g);
        assert!(first.contains(b't'));
        assert!(first.contains(b'f'));
        assert_eq!(first.len(), 2u32);
    }
}
