use std::collections::hash_map::RandomState;
use std::fmt;
use std::hash::BuildHasher;
use std::hash::Hash;
use std::hash::Hasher;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::OnceLock;

/// A thread-safe reference-counted smart pointer that caches `Hash`.
///
/// Weak references are not supported. Used to intern grammar nodes: two
/// `Rc`s holding structurally-equal values compare and hash equal without
/// re-walking the subgraph every time, which is what lets the `Select`
/// de-duplication and byte-terminal interning promised by the IR invariants
/// stay cheap even on deeply nested grammars.
///
/// For the cache to be correct, **`T` is expected to have a stable hash**
/// as long as no `&mut T` exclusive reference to it is given out. The IR is
/// immutable after construction so this always holds for grammar nodes.
pub struct Rc<T>(triomphe::Arc<RcInner<T>>);

#[derive(Clone)]
struct RcInner<T> {
    hash_cache: HashCache,
    value: T,
}

struct HashCache(AtomicU64);

impl<T> Rc<T> {
    pub fn new(value: T) -> Self {
        Self(triomphe::Arc::new(RcInner {
            hash_cache: HashCache::new(),
            value,
        }))
    }

    /// Returns whether two `Rc`s point to the same allocation.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        triomphe::Arc::ptr_eq(&self.0, &other.0)
    }

    /// Returns a mutable reference to `T`, cloning it if necessary.
    pub fn make_mut(&mut self) -> &mut T
    where
        T: Clone,
    {
        let inner = triomphe::Arc::make_mut(&mut self.0);
        inner.hash_cache.clear();
        &mut inner.value
    }

    pub fn get_mut(&mut self) -> Option<&mut T> {
        triomphe::Arc::get_mut(&mut self.0).map(|inner| &mut inner.value)
    }

    /// Stable identity for the backing allocation, for use as a fixpoint /
    /// memoization key (e.g. `Node::id`). Not meaningful across processes.
    pub fn as_ptr(&self) -> *const () {
        triomphe::Arc::as_ptr(&self.0) as *const ()
    }
}

impl<T> std::ops::Deref for Rc<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0.value
    }
}

impl<T> Clone for Rc<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T: Eq> Eq for Rc<T> {}

impl<T: PartialEq> PartialEq for Rc<T> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.0.value == other.0.value
    }
}

impl<T: Hash> Hash for Rc<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash_cache.get(&self.0.value).hash(state)
    }
}

impl HashCache {
    const NOT_COMPUTED_YET: u64 = 0;

    fn new() -> Self {
        Self(AtomicU64::new(Self::NOT_COMPUTED_YET))
    }

    fn clear(&mut self) {
        *self.0.get_mut() = Self::NOT_COMPUTED_YET
    }

    fn get<T: ?Sized + Hash>(&self, value: &T) -> u64 {
        let hash = self.0.load(Ordering::Relaxed);
        if hash != Self::NOT_COMPUTED_YET {
            hash
        } else {
            self.get_slow_path(value)
        }
    }

    #[cold]
    #[inline(never)]
    fn get_slow_path<T: ?Sized + Hash>(&self, value: &T) -> u64 {
        // Shared process-wide so that two `Rc`s constructed independently
        // from equal values still hash equal, which is what makes the
        // Select-alternative de-duplication in the builder work via a
        // plain `HashSet`.
        static SHARED_RANDOM: OnceLock<RandomState> = OnceLock::new();
        let mut hasher = SHARED_RANDOM.get_or_init(RandomState::new).build_hasher();
        value.hash(&mut hasher);
        let mut hash = hasher.finish();
        if hash == Self::NOT_COMPUTED_YET {
            hash += 1
        }
        self.0.store(hash, Ordering::Relaxed);
        hash
    }
}

impl Clone for HashCache {
    fn clone(&self) -> Self {
        Self(AtomicU64::new(self.0.load(Ordering::Relaxed)))
    }
}

impl<T: fmt::Debug> fmt::Debug for Rc<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.value.fmt(f)
    }
}

impl<T> AsRef<T> for Rc<T> {
    fn as_ref(&self) -> &T {
        self
    }
}
