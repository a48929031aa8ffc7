use std::fmt;

/// Tracks utilization against a bound, reporting the high-water mark over
/// the tracker's lifetime.
///
/// Used both for the grammar-construction recursion limit (guarding against
/// a `DeferredReference` cycle that never bottoms out into a choice) and,
/// reused by `conform-parser`, for the per-subtree token cap of
/// `TokenLimit` (§3, §5: "exceeding it is not an error but forces the
/// parser into an accepting-state-or-fail closure").
///
/// ```
/// use conform_ir::LimitTracker;
///
/// let mut limit = LimitTracker::new(4);
/// for _ in 0..3 {
///     limit.consume();
/// }
/// assert!(!limit.limited());
/// limit.consume();
/// limit.consume();
/// assert!(limit.limited());
/// ```
#[derive(PartialEq, Eq, Clone, Copy)]
pub struct LimitTracker {
    current: usize,
    /// High water mark for this limit.
    pub high: usize,
    /// The configured limit.
    pub limit: usize,
}

impl Default for LimitTracker {
    fn default() -> Self {
        Self {
            current: 0,
            high: 0,
            limit: 4_096,
        }
    }
}

impl LimitTracker {
    pub fn new(limit: usize) -> Self {
        Self {
            current: 0,
            high: 0,
            limit,
        }
    }

    pub fn limited(&self) -> bool {
        self.current > self.limit
    }

    pub fn consume(&mut self) {
        self.current += 1;
        if self.current > self.high {
            self.high = self.current;
        }
    }

    pub fn release(&mut self) {
        self.current = self.current.saturating_sub(1);
    }

    pub fn reset(&mut self) {
        self.current = 0;
    }
}

impl fmt::Debug for LimitTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "limit: {}, high: {}", self.limit, self.high)
    }
}
