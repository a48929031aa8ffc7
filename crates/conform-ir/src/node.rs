use std::cell::OnceCell;
use std::fmt;
use std::hash::Hash;
use std::hash::Hasher;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use crate::arc::Rc;
use crate::capture::CaptureName;
use crate::error::IrError;
use crate::lexeme::LexemeSpec;

/// A node in the byte grammar graph (§3, "Grammar node").
///
/// Cheaply `Clone`-able: cloning bumps a refcount rather than copying the
/// subtree, so the same compiled grammar can be shared across many parallel
/// parses (§5).
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct Node(pub(crate) Rc<NodeKind>);

#[derive(Eq, PartialEq, Hash)]
pub enum NodeKind {
    Byte(u8),
    ByteRange(u8, u8),
    Join(Vec<Node>),
    Select(Vec<Node>, Recurse),
    Gen(GenSpec),
    Lexeme(LexemeSpec),
    Capture(Node, CaptureName, ListAppend),
    WithTemperature(Node, TempBits),
    TokenLimit(Node, usize),
    Deferred(DeferredReference),
    Null,
}

/// Whether a `Select` may re-enter itself; encodes Kleene-star semantics
/// without a separate "Repeat" node kind (§3).
pub type Recurse = bool;
pub type ListAppend = bool;

/// `f32` wrapper with a total `Eq`/`Hash` so `WithTemperature` can live in a
/// structurally-deduplicated node kind. Temperatures are never NaN in
/// practice (the builder rejects them), so bit-pattern equality is sound.
#[derive(Clone, Copy)]
pub struct TempBits(u32);

impl TempBits {
    pub fn new(t: f32) -> Self {
        Self(t.to_bits())
    }

    pub fn get(self) -> f32 {
        f32::from_bits(self.0)
    }
}

impl Eq for TempBits {}
impl PartialEq for TempBits {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}
impl Hash for TempBits {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state)
    }
}

/// A bounded free-generation region (§3, `Gen`). `suffix`, when present, is
/// a literal appended once the stop sequence completes (the original
/// `guidance` library's `gen(..., suffix=...)`; not part of spec.md's
/// prose but carried over as a supplemented feature — see SPEC_FULL.md §3).
#[derive(Eq, PartialEq, Hash)]
pub struct GenSpec {
    pub body_regex: Node,
    pub stop_regex: Option<Node>,
    pub save_stop_text: bool,
    pub max_tokens: Option<u32>,
    pub suffix: Option<Node>,
}

/// A forward reference placeholder, resolved exactly once. Closes cycles in
/// the IR graph (§3 invariants, §9 "Recursive grammar construction").
///
/// Equality and hashing are by *identity*, not by the eventually-resolved
/// value: two references can only be compared once both are resolved, which
/// would require walking a cycle to termination, so the graph instead
/// treats distinct `DeferredReference` slots as distinct nodes even if they
/// end up pointing at structurally equal grammars. This is an
/// implementation decision not pinned down by the data model in §3; see
/// DESIGN.md.
#[derive(Clone)]
pub struct DeferredReference(Rc<DeferredInner>);

struct DeferredInner {
    id: u64,
    value: OnceCell<Node>,
}

fn next_deferred_id() -> u64 {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    COUNTER.fetch_add(1, Ordering::Relaxed)
}

impl DeferredReference {
    pub fn new() -> Self {
        Self(Rc::new(DeferredInner {
            id: next_deferred_id(),
            value: OnceCell::new(),
        }))
    }

    /// Fills in the referent. Returns `Err` if already resolved (write-once,
    /// per §3's invariants).
    pub fn resolve(&self, value: Node) -> Result<(), IrError> {
        self.0
            .value
            .set(value)
            .map_err(|_| IrError::AlreadyResolved)
    }

    pub fn value(&self) -> Option<&Node> {
        self.0.value.get()
    }

    pub fn id(&self) -> u64 {
        self.0.id
    }
}

impl Default for DeferredReference {
    fn default() -> Self {
        Self::new()
    }
}

impl Eq for DeferredReference {}
impl PartialEq for DeferredReference {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}
impl Hash for DeferredReference {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.id.hash(state)
    }
}

impl fmt::Debug for DeferredReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DeferredReference(#{})", self.0.id)
    }
}

impl Node {
    pub(crate) fn new(kind: NodeKind) -> Self {
        Self(Rc::new(kind))
    }

    /// Wraps an already-constructed `DeferredReference` as a `Node`.
    ///
    /// Exposed (unlike the other `NodeKind` variants, which only the
    /// builder module constructs) because callers outside this crate —
    /// `conform-schema`'s `$ref` resolver, in particular — need to close
    /// cycles keyed by something other than a closure's `TypeId`, so they
    /// must manage `DeferredReference`s directly.
    pub fn new_deferred(reference: DeferredReference) -> Self {
        Self::new(NodeKind::Deferred(reference))
    }

    pub fn kind(&self) -> &NodeKind {
        &self.0
    }

    /// A stable identity for this node's allocation, used as a fixpoint key
    /// by `first_bytes` (pointer identity is fine: nodes are never moved or
    /// reallocated once built, per the IR's immutability invariant).
    pub fn id(&self) -> usize {
        self.0.as_ptr() as usize
    }

    pub fn is_null(&self) -> bool {
        matches!(self.kind(), NodeKind::Null)
    }

    /// If this node is a `Deferred` that has been resolved, follow it to
    /// its referent (recursively, in case of deferred-to-deferred chains).
    /// Returns `None` for an unresolved reference.
    pub fn follow(&self) -> Option<&Node> {
        match self.kind() {
            NodeKind::Deferred(d) => d.value().and_then(|n| n.follow().or(Some(n))),
            _ => Some(self),
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            NodeKind::Byte(b) => write!(f, "Byte({:#04x})", b),
            NodeKind::ByteRange(lo, hi) => write!(f, "ByteRange({:#04x}..={:#04x})", lo, hi),
            NodeKind::Join(children) => f.debug_tuple("Join").field(children).finish(),
            NodeKind::Select(alts, recurse) => f
                .debug_struct("Select")
                .field("alternatives", alts)
                .field("recurse", recurse)
                .finish(),
            NodeKind::Gen(g) => f
                .debug_struct("Gen")
                .field("max_tokens", &g.max_tokens)
                .finish(),
            NodeKind::Lexeme(l) => f.debug_tuple("Lexeme").field(&l.regex).finish(),
            NodeKind::Capture(child, name, list_append) => f
                .debug_struct("Capture")
                .field("name", &name.as_str())
                .field("list_append", list_append)
                .field("child", child)
                .finish(),
            NodeKind::WithTemperature(child, t) => f
                .debug_struct("WithTemperature")
                .field("t", &t.get())
                .field("child", child)
                .finish(),
            NodeKind::TokenLimit(child, n) => {
                f.debug_struct("TokenLimit").field("n", n).field("child", child).finish()
            }
            NodeKind::Deferred(d) => d.fmt(f),
            NodeKind::Null => write!(f, "Null"),
        }
    }
}
