use crate::core::facet::FacetId;
use crate::core::skeleton_graph::NodeKey;

use super::{MAX_PRACTICAL_OBJECTIVES, SmallBuffer};
use slotmap::SparseSecondaryMap;

// =============================================================================
// ALGORITHM-SPECIFIC BUFFER TYPES
// =============================================================================

/// Size constant for per-update scratch buffers.
///
/// A single cut usually excises a handful of vertices, so 16 keeps the
/// obsolete set, the cut edges and the new vertices on the stack.
pub const UPDATE_BUFFER_SIZE: usize = 16;

/// A weight vector (or any other per-objective vector).
///
/// # Examples
///
/// ```rust
/// use weight_space::core::collections::WeightBuffer;
///
/// let weight: WeightBuffer = WeightBuffer::from_slice(&[0.5, 0.5]);
/// assert_eq!(weight.len(), 2);
/// ```
pub type WeightBuffer = SmallBuffer<f64, MAX_PRACTICAL_OBJECTIVES>;

/// Sorted set of facet ids defining a vertex.
///
/// Always holds exactly `p` ids for a skeleton over `p` objectives; kept
/// sorted so that intersections are a linear merge.
pub type FacetIdBuffer = SmallBuffer<FacetId, MAX_PRACTICAL_OBJECTIVES>;

/// Adjacency list of a single graph node.
pub type NeighborBuffer = SmallBuffer<NodeKey, MAX_PRACTICAL_OBJECTIVES>;

/// Node keys collected during an update (obsolete nodes, new nodes).
pub type NodeKeyBuffer = SmallBuffer<NodeKey, UPDATE_BUFFER_SIZE>;

/// Cut edges as `(obsolete, surviving)` node pairs.
///
/// Storing the pair oriented avoids a second membership lookup when the
/// intermediate vertex is built.
pub type CutEdgeBuffer = SmallBuffer<(NodeKey, NodeKey), UPDATE_BUFFER_SIZE>;

/// Sparse per-node side table, e.g. the membership map of an obsolete region.
///
/// # Examples
///
/// ```rust
/// use weight_space::core::collections::NodeSecondaryMap;
/// use weight_space::core::skeleton_graph::NodeKey;
/// use slotmap::SlotMap;
///
/// let mut nodes: SlotMap<NodeKey, ()> = SlotMap::with_key();
/// let n = nodes.insert(());
/// let mut marks: NodeSecondaryMap<()> = NodeSecondaryMap::new();
/// marks.insert(n, ());
/// assert!(marks.contains_key(n));
/// ```
pub type NodeSecondaryMap<V> = SparseSecondaryMap<NodeKey, V>;
