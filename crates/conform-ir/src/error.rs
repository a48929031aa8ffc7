use thiserror::Error;

/// Errors raised while building or finalizing the grammar IR (§7).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum IrError {
    /// A `DeferredReference` was read (e.g. via `Node::follow`, or reached
    /// by `first_bytes`) before its recursive-construction closure
    /// returned and filled it in.
    #[error("grammar contains an unresolved forward reference")]
    UnresolvedReference,

    /// A `DeferredReference` was resolved twice; its `value` is write-once
    /// per the IR invariants in §3.
    #[error("forward reference was already resolved")]
    AlreadyResolved,
}
