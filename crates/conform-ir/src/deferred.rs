use std::any::TypeId;
use std::cell::RefCell;
use std::collections::HashMap;

use crate::node::DeferredReference;
use crate::node::Node;
use crate::node::NodeKind;

thread_local! {
    // Per-thread, per-construction scope holding the `DeferredReference` for
    // whichever recursive grammar-building closures are currently on the
    // call stack. Keyed by the closure's own (monomorphized, hence
    // per-call-site) `TypeId` rather than any process-global mutable slot,
    // per §5's "never a process-global mutable slot" and §9's design note.
    static IN_PROGRESS: RefCell<HashMap<TypeId, DeferredReference>> =
        RefCell::new(HashMap::new());
}

/// Builds a self-referential grammar.
///
/// `f` is the grammar-building closure. If, while `f` runs, the *same*
/// closure expression is invoked again (directly or through some chain of
/// ordinary function calls) before the first call has returned, the inner
/// call returns a placeholder `Deferred` node instead of re-running `f` —
/// that's the self-reference. Once the outermost call's `f` returns, the
/// placeholder is resolved to the built node, closing the cycle.
///
/// ```
/// use conform_ir::builder::{byte, join, null, recursive, select};
///
/// fn digits() -> conform_ir::Node {
///     recursive(|| {
///         select([
///             null(),
///             join([byte(b'0'), digits()]),
///         ])
///     })
/// }
/// let g = digits();
/// assert!(!g.is_null());
/// ```
pub fn recursive<F>(f: F) -> Node
where
    F: FnOnce() -> Node + 'static,
{
    let key = TypeId::of::<F>();

    if let Some(existing) = IN_PROGRESS.with(|m| m.borrow().get(&key).cloned()) {
        return Node::new(NodeKind::Deferred(existing));
    }

    let deferred = DeferredReference::new();
    IN_PROGRESS.with(|m| {
        m.borrow_mut().insert(key, deferred.clone());
    });

    // Run `f` even if it panics' cleanup is not our concern here: grammar
    // construction is expected to run to completion before any parser sees
    // the result, and a panic unwinds past this thread-local entry, which
    // is harmless since the slot is re-created fresh on next use of `f`.
    let built = f();

    IN_PROGRESS.with(|m| {
        m.borrow_mut().remove(&key);
    });

    deferred
        .resolve(built)
        .expect("recursive(): closure returned after its own deferred reference was resolved");

    Node::new(NodeKind::Deferred(deferred))
}
