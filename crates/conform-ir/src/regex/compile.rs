//! Compiles a [`RegexAst`] into the byte grammar IR (§4.2).

use super::ast::ByteClass;
use super::ast::RegexAst;
use super::classes;
use crate::builder::capture;
use crate::builder::join;
use crate::builder::null;
use crate::builder::recursive;
use crate::builder::select;
use crate::byteset::ByteSet;
use crate::node::Node;

/// Options affecting compilation that aren't expressible in the pattern
/// text itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompileOptions {
    /// Whether `.` matches `\n` too.
    pub dot_all: bool,
}

pub fn compile(ast: &RegexAst, opts: CompileOptions) -> Node {
    match ast {
        RegexAst::Literal(bytes) => crate::builder::string(bytes),
        RegexAst::AnyChar => classes::compile_any_char(opts.dot_all),
        RegexAst::Class(class) => compile_class(class),
        RegexAst::Concat(parts) => join(parts.iter().map(|p| compile(p, opts))),
        RegexAst::Alt(branches) => select(branches.iter().map(|b| compile(b, opts)), false),
        RegexAst::Repeat { inner, min, max } => compile_repeat(inner, *min, *max, opts),
        // A named group records its matched bytes as a `Capture`; an
        // anonymous group is grouping only and compiles to its contents.
        RegexAst::Group { inner, name } => match name {
            Some(n) => capture(compile(inner, opts), n.as_str(), false),
            None => compile(inner, opts),
        },
    }
}

fn compile_class(class: &ByteClass) -> Node {
    let mut set = ByteSet::EMPTY;
    for &(lo, hi) in &class.ranges {
        set.union_with(&ByteSet::range(lo, hi));
    }
    if class.negated {
        set = classes::utf8_start_set().iter().filter(|b| !set.contains(*b)).collect();
    }
    classes::compile_utf8_leads(set)
}

fn compile_repeat(inner_ast: &RegexAst, min: u32, max: Option<u32>, opts: CompileOptions) -> Node {
    let inner = compile(inner_ast, opts);
    let mut mandatory = Vec::with_capacity(min as usize);
    for _ in 0..min {
        mandatory.push(inner.clone());
    }
    let tail = match max {
        None => unbounded_tail(inner),
        Some(max) => bounded_tail(inner, max.saturating_sub(min)),
    };
    mandatory.push(tail);
    join(mandatory)
}

/// `inner*` — reused for the open-ended part of `{m,}` once the `m`
/// mandatory copies are emitted.
fn unbounded_tail(inner: Node) -> Node {
    recursive(move || select([null(), join([inner.clone(), unbounded_tail(inner.clone())])], false))
}

/// `inner?` nested `extra` times deep: `(inner(inner...)?)?`, the standard
/// expansion of a bounded optional tail (§4.2's `{m,n}`).
fn bounded_tail(inner: Node, extra: u32) -> Node {
    if extra == 0 {
        return null();
    }
    let rest = bounded_tail(inner.clone(), extra - 1);
    select([null(), join([inner, rest])], false)
}
