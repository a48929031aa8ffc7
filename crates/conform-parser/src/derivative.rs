//! Byte-at-a-time Brzozowski derivative over the grammar IR: the core
//! primitive the rest of this crate builds on.
//!
//! The parser's "frontier" (§3, §4.5) is represented not as an explicit set
//! of Earley items but as a single residual [`Node`] — the grammar that
//! remains to be matched after the bytes consumed so far. Ambiguity (more
//! than one grammar position being simultaneously live) is represented the
//! same way the IR already represents choice: as a `Select` of residuals.
//! This keeps every other module (`mask`, `heal`, `state`) working with
//! plain `Node`s instead of a parallel bookkeeping structure, and lets
//! `conform_ir::first_bytes`'s existing fixpoint analysis double as the
//! pruning and accepting-state test for this crate too.

use conform_ir::builder::join;
use conform_ir::builder::select;
use conform_ir::node::GenSpec;
use conform_ir::node::Node;
use conform_ir::node::NodeKind;
use conform_ir::first_bytes::is_nullable;

/// A single consumed byte either narrows the grammar to a residual, or is
/// rejected outright (no live position can extend with that byte).
pub enum Step {
    Ok(Node),
    Reject,
}

/// `node` reached a `Deferred` reference with nothing written to its
/// `value` yet (§4.1: "constructing a grammar with an unresolved
/// DeferredReference at parse time fails with `UnresolvedReference`").
pub struct Unresolved;

/// The byte-wise derivative of `node` with respect to `b`: the grammar that
/// remains after consuming `b`, or [`Step::Reject`] if no alternative of
/// `node` can start with `b`.
pub fn derivative(node: &Node, b: u8) -> Result<Step, Unresolved> {
    match node.kind() {
        NodeKind::Null => Ok(Step::Reject),
        NodeKind::Byte(x) => Ok(if *x == b { Step::Ok(conform_ir::builder::null()) } else { Step::Reject }),
        NodeKind::ByteRange(lo, hi) => {
            Ok(if *lo <= b && b <= *hi { Step::Ok(conform_ir::builder::null()) } else { Step::Reject })
        }
        NodeKind::Join(children) => join_derivative(children, b),
        NodeKind::Select(alts, _recurse) => {
            let mut options = Vec::new();
            for alt in alts {
                if let Step::Ok(residual) = derivative(alt, b)? {
                    options.push(residual);
                }
            }
            Ok(combine(options))
        }
        NodeKind::Gen(spec) => gen_derivative(spec, b),
        NodeKind::Lexeme(spec) => match derivative(&spec.regex, b)? {
            Step::Ok(residual) => {
                Ok(Step::Ok(conform_ir::builder::lexeme(residual, spec.contextual)))
            }
            Step::Reject => Ok(Step::Reject),
        },
        NodeKind::Capture(child, name, list_append) => match derivative(child, b)? {
            Step::Ok(residual) => {
                Ok(Step::Ok(conform_ir::builder::capture(residual, name.clone(), *list_append)))
            }
            Step::Reject => Ok(Step::Reject),
        },
        NodeKind::WithTemperature(child, t) => match derivative(child, b)? {
            Step::Ok(residual) => Ok(Step::Ok(conform_ir::builder::with_temperature(residual, t.get()))),
            Step::Reject => Ok(Step::Reject),
        },
        NodeKind::TokenLimit(child, n) => {
            if *n == 0 {
                // Exhausted: §5, "forces the parser into an
                // accepting-state-or-fail closure" — this position offers
                // no further bytes of its own (its `is_nullable` fact,
                // computed by `conform_ir::first_bytes`, is already `true`
                // when `n == 0`, which is what lets a surrounding `Join`
                // skip past it).
                return Ok(Step::Reject);
            }
            match derivative(child, b)? {
                Step::Ok(residual) => Ok(Step::Ok(conform_ir::builder::token_limit(residual, *n))),
                Step::Reject => Ok(Step::Reject),
            }
        }
        NodeKind::Deferred(_) => match node.follow() {
            Some(value) => derivative(value, b),
            None => Err(Unresolved),
        },
    }
}

fn combine(options: Vec<Node>) -> Step {
    if options.is_empty() {
        Step::Reject
    } else {
        Step::Ok(select(options, false))
    }
}

/// The derivative of an ordered sequence: consume `b` as part of the first
/// child, or — if the first child can already accept the empty string —
/// also try consuming `b` as part of the remaining children (§4.3.4's
/// `T_i` construction is the grammar-construction-time special case of
/// this same idea; here it's the general byte-stepping rule it compiles
/// down to).
fn join_derivative(children: &[Node], b: u8) -> Result<Step, Unresolved> {
    let Some((first, rest)) = children.split_first() else {
        return Ok(Step::Reject);
    };
    let mut options = Vec::new();
    if let Step::Ok(residual) = derivative(first, b)? {
        options.push(join([residual, join(rest.iter().cloned())]));
    }
    if is_nullable(first) {
        if let Step::Ok(residual) = join_derivative(rest, b)? {
            options.push(residual);
        }
    }
    Ok(combine(options))
}

/// The derivative of a bounded free-generation region (§3, `Gen`; §4.6's
/// scenario "gen with stop"). Two alternatives are always tried at once:
/// continuing to generate body bytes, and — if `stop_regex` is present —
/// starting or continuing a stop-sequence match from here. Passing the
/// *original* `stop_regex` forward on the body-continuation branch (rather
/// than retaining a derivative of it) is what lets a fresh stop attempt
/// start at every position in the region, not only at its first byte. Once
/// the stop sequence is fully matched, the residual becomes `spec.suffix`
/// (if one was configured) rather than `null` directly, so a trailing
/// literal is still required before the enclosing grammar resumes.
fn gen_derivative(spec: &GenSpec, b: u8) -> Result<Step, Unresolved> {
    let mut options = Vec::new();

    // `body_regex.is_null()` marks a region that has already committed to
    // matching its stop sequence (see the other branch below) and should
    // no longer offer "more body" bytes.
    if !spec.body_regex.is_null() {
        if let Step::Ok(body_residual) = derivative(&spec.body_regex, b)? {
            options.push(conform_ir::builder::gen_with_suffix(
                body_residual,
                spec.stop_regex.clone(),
                spec.save_stop_text,
                spec.max_tokens,
                spec.suffix.clone(),
            ));
        }
    }

    if let Some(stop) = &spec.stop_regex {
        if let Step::Ok(stop_residual) = derivative(stop, b)? {
            if is_nullable(&stop_residual) {
                // The stop sequence just completed: the region is over.
                // If a suffix literal was configured, it must still be
                // consumed before the enclosing grammar takes over.
                options.push(spec.suffix.clone().unwrap_or_else(conform_ir::builder::null));
            } else {
                options.push(conform_ir::builder::gen_with_suffix(
                    conform_ir::builder::null(),
                    Some(stop_residual),
                    spec.save_stop_text,
                    spec.max_tokens,
                    spec.suffix.clone(),
                ));
            }
        }
    }

    Ok(combine(options))
}

/// Folds [`derivative`] over every byte of `bytes`, short-circuiting on the
/// first rejection.
pub fn derivative_str(node: &Node, bytes: &[u8]) -> Result<Step, Unresolved> {
    let mut current = node.clone();
    for &b in bytes {
        match derivative(&current, b)? {
            Step::Ok(residual) => current = residual,
            Step::Reject => return Ok(Step::Reject),
        }
    }
    Ok(Step::Ok(current))
}

#[cfg(test)]
mod tests {
    use super::*;
    use conform_ir::builder::byte;
    use conform_ir::builder::select as sel;
    use conform_ir::builder::string;

    #[test]
    fn literal_byte_accepts_exact_match() {
        let g = byte(b'x');
        match derivative(&g, b'x').unwrap() {
            Step::Ok(residual) => assert!(is_nullable(&residual)),
            Step::Reject => panic!("expected acceptance"),
        }
    }

    #[test]
    fn literal_byte_rejects_mismatch() {
        let g = byte(b'x');
        assert!(matches!(derivative(&g, b'y').unwrap(), Step::Reject));
    }

    #[test]
    fn string_steps_through_in_order() {
        let g = string(b"ab");
        let Step::Ok(after_a) = derivative(&g, b'a').unwrap() else { panic!() };
        assert!(!is_nullable(&after_a));
        let Step::Ok(after_b) = derivative(&after_a, b'b').unwrap() else { panic!() };
        assert!(is_nullable(&after_b));
    }

    #[test]
    fn select_rejects_unless_some_alt_accepts() {
        let g = sel([byte(b'a'), byte(b'b')], false);
        assert!(matches!(derivative(&g, b'a').unwrap(), Step::Ok(_)));
        assert!(matches!(derivative(&g, b'c').unwrap(), Step::Reject));
    }
}
