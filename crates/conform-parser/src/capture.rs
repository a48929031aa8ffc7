//! Capture bookkeeping (§3, "Capture record"; §4.5, "Captures").
//!
//! There is no explicit open/close continuation stack here — the residual
//! `Node` already records which `Capture` wrappers are still reachable, so
//! open/close transitions are found by diffing that set before and after
//! each step, rather than threading a parallel scope stack through
//! `derivative`. The cost is a graph walk per step instead of an O(1)
//! stack pop; acceptable since captures change at token granularity, not
//! per byte, and `conform-schema` grammars don't currently nest captures
//! deeply enough for the walk to matter.
//!
//! One simplification worth naming: if a grammar is ambiguous enough that
//! the same capture name is simultaneously satisfied along one residual
//! branch and still open along another, this tracker keeps it open until
//! *every* reachable occurrence is done. A per-thread-precise tracker would
//! close the satisfied branch's capture earlier; this one is conservative
//! instead, and documented as such in DESIGN.md.

use ahash::AHashMap;
use conform_ir::capture::CaptureName;
use conform_ir::node::Node;
use conform_ir::node::NodeKind;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Occurrence {
    /// At least one reachable `Capture` for this name still has more to
    /// match.
    Open,
    /// Every reachable `Capture` for this name wraps an already-exhausted
    /// (`Null`) child.
    Satisfied,
}

fn occurrences(residual: &Node) -> AHashMap<CaptureName, Occurrence> {
    let mut out = AHashMap::new();
    collect(residual, &mut out);
    out
}

fn collect(node: &Node, out: &mut AHashMap<CaptureName, Occurrence>) {
    match node.kind() {
        NodeKind::Null | NodeKind::Byte(_) | NodeKind::ByteRange(_, _) => {}
        NodeKind::Join(children) | NodeKind::Select(children, _) => {
            for child in children {
                collect(child, out);
            }
        }
        NodeKind::Gen(g) => {
            collect(&g.body_regex, out);
            if let Some(stop) = &g.stop_regex {
                collect(stop, out);
            }
            if let Some(suffix) = &g.suffix {
                collect(suffix, out);
            }
        }
        NodeKind::Lexeme(spec) => collect(&spec.regex, out),
        NodeKind::Capture(child, name, _) => {
            let status = if child.is_null() { Occurrence::Satisfied } else { Occurrence::Open };
            out.entry(name.clone())
                .and_modify(|existing| {
                    if status == Occurrence::Open {
                        *existing = Occurrence::Open;
                    }
                })
                .or_insert(status);
            collect(child, out);
        }
        NodeKind::WithTemperature(child, _) | NodeKind::TokenLimit(child, _) => collect(child, out),
        NodeKind::Deferred(d) => {
            if let Some(v) = d.value() {
                collect(v, out);
            }
        }
    }
}

/// One completed capture: the name, the bytes it spanned, and (for
/// `list_append` captures) whether this occurrence should be appended to a
/// list rather than overwrite a single value (§3, "Capture record").
#[derive(Clone)]
pub struct ClosedCapture {
    pub name: CaptureName,
    pub bytes: Vec<u8>,
    pub list_append: bool,
    pub log_prob: f32,
}

#[derive(Clone)]
struct OpenCapture {
    start_offset: usize,
    list_append: bool,
    log_prob: f32,
}

/// Tracks which captures are currently open and accumulates completed ones
/// across an entire generation.
#[derive(Default, Clone)]
pub struct CaptureTracker {
    open: AHashMap<CaptureName, OpenCapture>,
    closed: Vec<ClosedCapture>,
}

impl CaptureTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called after each derivative step with the grammar positions just
    /// before and after the step, the full byte sequence committed so far
    /// (*after* this step), the offset it had before this step, and the
    /// log-probability to attribute to this step (accumulated into every
    /// capture open across it, including ones that close this step).
    pub fn observe(&mut self, before: &Node, after: &Node, bytes_committed: &[u8], offset_before: usize, step_log_prob: f32) {
        for open in self.open.values_mut() {
            open.log_prob += step_log_prob;
        }

        let before_set = occurrences(before);
        let after_set = occurrences(after);

        for name in before_set.keys() {
            let still_open = matches!(after_set.get(name), Some(Occurrence::Open));
            if !still_open {
                if let Some(open) = self.open.remove(name) {
                    self.closed.push(ClosedCapture {
                        name: name.clone(),
                        bytes: bytes_committed[open.start_offset..].to_vec(),
                        list_append: open.list_append,
                        log_prob: open.log_prob,
                    });
                }
            }
        }

        for (name, status) in &after_set {
            if *status == Occurrence::Open && !self.open.contains_key(name) {
                self.open.insert(
                    name.clone(),
                    OpenCapture {
                        start_offset: offset_before,
                        list_append: find_flag(after, name).unwrap_or(false),
                        log_prob: 0.0,
                    },
                );
            }
        }
    }

    pub fn take_closed(&mut self) -> Vec<ClosedCapture> {
        std::mem::take(&mut self.closed)
    }

    pub fn has_open(&self) -> bool {
        !self.open.is_empty()
    }
}

/// Looks up the `list_append` flag of the (first reachable) `Capture` node
/// named `name`, for bookkeeping when a capture first opens.
fn find_flag(node: &Node, name: &CaptureName) -> Option<bool> {
    match node.kind() {
        NodeKind::Capture(child, n, list_append) => {
            if n == name {
                Some(*list_append)
            } else {
                find_flag(child, name)
            }
        }
        NodeKind::Join(children) | NodeKind::Select(children, _) => children.iter().find_map(|c| find_flag(c, name)),
        NodeKind::Gen(g) => find_flag(&g.body_regex, name)
            .or_else(|| g.stop_regex.as_ref().and_then(|s| find_flag(s, name)))
            .or_else(|| g.suffix.as_ref().and_then(|s| find_flag(s, name))),
        NodeKind::Lexeme(spec) => find_flag(&spec.regex, name),
        NodeKind::WithTemperature(child, _) | NodeKind::TokenLimit(child, _) => find_flag(child, name),
        NodeKind::Deferred(d) => d.value().and_then(|v| find_flag(v, name)),
        NodeKind::Null | NodeKind::Byte(_) | NodeKind::ByteRange(_, _) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conform_ir::builder::byte;
    use conform_ir::builder::capture;
    use conform_ir::builder::join;
    use crate::derivative::derivative;
    use crate::derivative::Step;

    fn step(node: &Node, b: u8) -> Node {
        match derivative(node, b).unwrap() {
            Step::Ok(n) => n,
            Step::Reject => panic!("unexpected rejection"),
        }
    }

    #[test]
    fn closes_capture_once_child_is_exhausted() {
        let grammar = join([capture(byte(b'x'), "field", false), byte(b'y')]);
        let mut tracker = CaptureTracker::new();

        let after_x = step(&grammar, b'x');
        tracker.observe(&grammar, &after_x, b"x", 0, 0.0);
        assert!(tracker.take_closed().is_empty());

        let after_y = step(&after_x, b'y');
        tracker.observe(&after_x, &after_y, b"xy", 1, 0.0);
        let closed = tracker.take_closed();
        assert_eq!(closed.len(), 1);
        assert_eq!(closed[0].bytes, b"x");
        assert_eq!(closed[0].name.as_str(), "field");
    }
}
