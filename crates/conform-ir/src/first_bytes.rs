//! FIRST-set and forced-prefix computation over the grammar graph (§4.1).
//!
//! Both are least-fixpoint computations because `Deferred` closes cycles:
//! a recursive grammar's FIRST set can depend on itself. The fixpoint
//! starts at the lattice bottom (`nullable = false`, `first = {}`) and
//! monotonically grows until stable, which is guaranteed to terminate
//! because the byte alphabet is finite and the node set reachable from any
//! root is finite (§4.1: "the function must terminate for all cycles").

use std::collections::HashMap;
use std::collections::HashSet;

use crate::byteset::ByteSet;
use crate::node::GenSpec;
use crate::node::Node;
use crate::node::NodeKind;

#[derive(Clone, Copy, Default)]
struct Facts {
    nullable: bool,
    first: ByteSet,
}

/// Computes the FIRST set of `node`: every byte that can begin some string
/// accepted starting from this grammar position.
pub fn first_bytes(node: &Node) -> ByteSet {
    analyze(node).first
}

/// Whether the empty string is accepted starting from this position.
pub fn is_nullable(node: &Node) -> bool {
    analyze(node).nullable
}

fn analyze(root: &Node) -> Facts {
    let nodes = reachable(root);
    let mut facts: HashMap<usize, Facts> = nodes.iter().map(|n| (n.id(), Facts::default())).collect();

    let mut changed = true;
    while changed {
        changed = false;
        for node in &nodes {
            let new = step(node, &facts);
            let slot = facts.get_mut(&node.id()).expect("node collected in reachable()");
            if new.nullable != slot.nullable || new.first != slot.first {
                *slot = new;
                changed = true;
            }
        }
    }

    *facts.get(&root.id()).expect("root is always reachable from itself")
}

fn lookup(facts: &HashMap<usize, Facts>, node: &Node) -> Facts {
    facts.get(&node.id()).copied().unwrap_or_default()
}

fn step(node: &Node, facts: &HashMap<usize, Facts>) -> Facts {
    match node.kind() {
        NodeKind::Null => Facts {
            nullable: true,
            first: ByteSet::EMPTY,
        },
        NodeKind::Byte(b) => Facts {
            nullable: false,
            first: ByteSet::single(*b),
        },
        NodeKind::ByteRange(lo, hi) => Facts {
            nullable: false,
            first: ByteSet::range(*lo, *hi),
        },
        NodeKind::Join(children) => {
            let mut first = ByteSet::EMPTY;
            let mut nullable = true;
            for child in children {
                if !nullable {
                    break;
                }
                let f = lookup(facts, child);
                first.union_with(&f.first);
                nullable = f.nullable;
            }
            Facts { nullable, first }
        }
        NodeKind::Select(alts, _recurse) => {
            let mut first = ByteSet::EMPTY;
            let mut nullable = false;
            for alt in alts {
                let f = lookup(facts, alt);
                first.union_with(&f.first);
                nullable |= f.nullable;
            }
            Facts { nullable, first }
        }
        NodeKind::Gen(GenSpec { body_regex, .. }) => lookup(facts, body_regex),
        NodeKind::Lexeme(spec) => lookup(facts, &spec.regex),
        NodeKind::Capture(child, _, _) => lookup(facts, child),
        NodeKind::WithTemperature(child, _) => lookup(facts, child),
        NodeKind::TokenLimit(child, n) => {
            if *n == 0 {
                Facts {
                    nullable: true,
                    first: ByteSet::EMPTY,
                }
            } else {
                lookup(facts, child)
            }
        }
        NodeKind::Deferred(d) => match d.value() {
            Some(v) => lookup(facts, v),
            None => Facts::default(),
        },
    }
}

/// Collects every node reachable from `root`, following `Deferred`
/// references, visiting each allocation once.
fn reachable(root: &Node) -> Vec<Node> {
    let mut visited = HashSet::new();
    let mut out = Vec::new();
    let mut stack = vec![root.clone()];
    while let Some(node) = stack.pop() {
        if !visited.insert(node.id()) {
            continue;
        }
        match node.kind() {
            NodeKind::Null | NodeKind::Byte(_) | NodeKind::ByteRange(_, _) => {}
            NodeKind::Join(children) | NodeKind::Select(children, _) => {
                stack.extend(children.iter().cloned());
            }
            NodeKind::Gen(g) => {
                stack.push(g.body_regex.clone());
                if let Some(stop) = &g.stop_regex {
                    stack.push(stop.clone());
                }
                if let Some(suffix) = &g.suffix {
                    stack.push(suffix.clone());
                }
            }
            NodeKind::Lexeme(spec) => stack.push(spec.regex.clone()),
            NodeKind::Capture(child, _, _)
            | NodeKind::WithTemperature(child, _)
            | NodeKind::TokenLimit(child, _) => stack.push(child.clone()),
            NodeKind::Deferred(d) => {
                if let Some(v) = d.value() {
                    stack.push(v.clone());
                }
            }
        }
        out.push(node);
    }
    out
}

/// Longest byte string that every accepting string from `node` starts with
/// (§4.1). Used to detect unambiguous fast-forward triggers. Conservative
/// in the presence of cycles and free-generation regions: it never claims
/// more than is actually guaranteed, but may under-report.
pub fn forced_prefix(node: &Node) -> Vec<u8> {
    let mut visiting = HashSet::new();
    forced_prefix_inner(node, &mut visiting)
}

fn forced_prefix_inner(node: &Node, visiting: &mut HashSet<usize>) -> Vec<u8> {
    match node.kind() {
        NodeKind::Null => vec![],
        NodeKind::Byte(b) => vec![*b],
        NodeKind::ByteRange(_, _) => vec![],
        NodeKind::Join(children) => {
            let mut out = Vec::new();
            for child in children {
                out.extend(forced_prefix_inner(child, visiting));
                if !is_exact(child, &mut HashSet::new()) {
                    break;
                }
            }
            out
        }
        NodeKind::Select(alts, _) => {
            let mut iter = alts.iter();
            let Some(first_alt) = iter.next() else {
                return vec![];
            };
            let mut common = forced_prefix_inner(first_alt, visiting);
            for alt in iter {
                if common.is_empty() {
                    break;
                }
                let p = forced_prefix_inner(alt, visiting);
                let n = common.iter().zip(p.iter()).take_while(|(a, b)| a == b).count();
                common.truncate(n);
            }
            common
        }
        NodeKind::Gen(_) | NodeKind::Lexeme(_) => vec![],
        NodeKind::Capture(child, _, _) | NodeKind::WithTemperature(child, _) => {
            forced_prefix_inner(child, visiting)
        }
        NodeKind::TokenLimit(child, n) => {
            if *n == 0 {
                vec![]
            } else {
                forced_prefix_inner(child, visiting)
            }
        }
        NodeKind::Deferred(d) => {
            if let Some(v) = d.value() {
                if visiting.insert(node.id()) {
                    let r = forced_prefix_inner(v, visiting);
                    visiting.remove(&node.id());
                    r
                } else {
                    vec![]
                }
            } else {
                vec![]
            }
        }
    }
}

/// Whether `node` accepts exactly one string (so a sibling after it in a
/// `Join` can still be forced).
fn is_exact(node: &Node, visiting: &mut HashSet<usize>) -> bool {
    match node.kind() {
        NodeKind::Null | NodeKind::Byte(_) => true,
        NodeKind::ByteRange(_, _) | NodeKind::Select(_, _) | NodeKind::Gen(_) | NodeKind::Lexeme(_) => {
            false
        }
        NodeKind::Join(children) => children.iter().all(|c| is_exact(c, visiting)),
        NodeKind::Capture(child, _, _) | NodeKind::WithTemperature(child, _) => {
            is_exact(child, visiting)
        }
        NodeKind::TokenLimit(child, n) => *n != 0 && is_exact(child, visiting),
        NodeKind::Deferred(d) => {
            if let Some(v) = d.value() {
                if visiting.insert(node.id()) {
                    let r = is_exact(v, visiting);
                    visiting.remove(&node.id());
                    r
                } else {
                    false
                }
            } else {
                false
            }
        }
    }
}
