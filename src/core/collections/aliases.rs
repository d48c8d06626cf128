use rustc_hash::FxHashSet;
use smallvec::SmallVec;

// Import slotmap types for storage backend
#[cfg(not(feature = "dense-slotmap"))]
use slotmap::SlotMap;

#[cfg(feature = "dense-slotmap")]
use slotmap::DenseSlotMap;

// =============================================================================
// STORAGE BACKEND
// =============================================================================

/// Internal storage backend for the skeleton's vertex arena and graph nodes.
///
/// This type alias abstracts over the concrete storage implementation,
/// allowing the choice between `SlotMap` (**default**) and `DenseSlotMap`
/// (with the `dense-slotmap` feature) without exposing the choice in public APIs.
///
/// Keys handed out by either backend stay valid until the element is removed,
/// which is what lets vertices and nodes reference each other by key instead
/// of by pointer.
///
/// # Examples
///
/// ```rust,ignore
/// // Internal use - not exposed in public API
/// let vertices: StorageMap<VertexKey, WeightSpaceVertex> = StorageMap::with_key();
/// ```
#[cfg(not(feature = "dense-slotmap"))]
pub type StorageMap<K, V> = SlotMap<K, V>;

#[cfg(feature = "dense-slotmap")]
pub type StorageMap<K, V> = DenseSlotMap<K, V>;

// =============================================================================
// CORE OPTIMIZED TYPES
// =============================================================================

/// Optimized `HashSet` type for membership tests inside the update algorithm.
///
/// Iteration order of an `FxHashSet` depends only on its contents and
/// insertion history, never on a random seed, so repeated runs over the same
/// input hand out untested weights in the same order.
///
/// # Examples
///
/// ```rust
/// use weight_space::core::collections::FastHashSet;
///
/// let mut set: FastHashSet<u64> = FastHashSet::default();
/// set.insert(789);
/// assert!(set.contains(&789));
/// ```
pub type FastHashSet<T> = FxHashSet<T>;

/// Small-optimized Vec that uses stack allocation for small collections.
///
/// # Size Guidelines
///
/// - **N=2**: Edge endpoints
/// - **N=8**: Weights, defining facet sets and node degrees
/// - **N=16**: Per-update scratch buffers
///
/// # Examples
///
/// ```rust
/// use weight_space::core::collections::SmallBuffer;
///
/// let mut buffer: SmallBuffer<i32, 8> = SmallBuffer::new();
/// for i in 0..5 {
///     buffer.push(i);
/// }
/// assert!(!buffer.spilled());
/// ```
pub type SmallBuffer<T, const N: usize> = SmallVec<[T; N]>;

// =============================================================================
// SEMANTIC SIZE CONSTANTS
// =============================================================================

/// Inline capacity for per-objective buffers.
///
/// Multi-objective solvers rarely go beyond five or six objectives, so 8 keeps
/// weights and defining facet sets on the stack in practice.
pub const MAX_PRACTICAL_OBJECTIVES: usize = 8;
