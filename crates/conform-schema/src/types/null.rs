use conform_ir::builder::string;
use conform_ir::Node;

pub fn compile() -> Node {
    string(b"null")
}

#[cfg(test)]
mod tests {
    use conform_ir::first_bytes::first_bytes;
    use conform_ir::first_bytes::is_nullable;

    use super::*;

    #[test]
    fn accepts_exactly_the_literal_null() {
        let g = compile();
        assert!(!is_nullable(&g));
        assert!(first_bytes(&g).contains(b'n'));
    }
}
