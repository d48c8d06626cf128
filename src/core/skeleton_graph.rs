//! Index-based 1-skeleton graph of the weight space polyhedron.
//!
//! Nodes live in a [`StorageMap`] keyed by [`NodeKey`]; each node records the
//! [`VertexKey`] of the vertex it represents and an adjacency list of
//! neighbouring nodes. The graph owns only topology; vertices are owned by
//! the [`Skeleton`](crate::core::skeleton::Skeleton)'s vertex arena.
//!
//! Besides topology the graph tracks
//!
//! - the **untested** set: nodes whose weight has not been handed to the oracle yet;
//! - **`last_returned`**: the node most recently handed out by
//!   [`SkeletonGraph::take_untested`].

use crate::core::collections::{FastHashSet, NeighborBuffer, StorageMap, fast_hash_set_with_capacity};
use crate::core::edge::EdgeKey;
use slotmap::new_key_type;

// Define key types for storage maps using slotmap's new_key_type! macro

new_key_type! {
    /// Key type for accessing vertices in the skeleton's vertex arena.
    ///
    /// A `VertexKey` stays valid after its vertex is detached from the graph,
    /// as long as the arena retains the slot.
    pub struct VertexKey;
}

new_key_type! {
    /// Key type for accessing nodes of the skeleton graph.
    pub struct NodeKey;
}

/// A graph node: the vertex it stands for and its neighbours.
#[derive(Clone, Debug)]
pub struct SkeletonNode {
    vertex: VertexKey,
    neighbors: NeighborBuffer,
}

impl SkeletonNode {
    /// Key of the vertex this node represents.
    #[inline]
    #[must_use]
    pub const fn vertex(&self) -> VertexKey {
        self.vertex
    }

    /// Adjacent nodes, in insertion order.
    #[inline]
    #[must_use]
    pub fn neighbors(&self) -> &[NodeKey] {
        &self.neighbors
    }
}

/// Undirected simple graph over [`NodeKey`]s with untested-node bookkeeping.
///
/// # Examples
///
/// ```rust
/// use weight_space::core::skeleton_graph::{SkeletonGraph, VertexKey};
/// use slotmap::SlotMap;
///
/// let mut arena: SlotMap<VertexKey, ()> = SlotMap::with_key();
/// let mut graph = SkeletonGraph::new();
/// let a = graph.add_node(arena.insert(()), true);
/// let b = graph.add_node(arena.insert(()), false);
/// graph.add_edge(a, b);
///
/// assert_eq!(graph.number_of_edges(), 1);
/// assert!(graph.has_untested());
/// assert_eq!(graph.take_untested(), Some(a));
/// assert_eq!(graph.last_returned(), Some(a));
/// assert!(!graph.has_untested());
/// ```
#[derive(Clone, Debug, Default)]
pub struct SkeletonGraph {
    nodes: StorageMap<NodeKey, SkeletonNode>,
    untested: FastHashSet<NodeKey>,
    last_returned: Option<NodeKey>,
}

impl SkeletonGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: StorageMap::with_key(),
            untested: FastHashSet::default(),
            last_returned: None,
        }
    }

    /// Creates an empty graph with room for `capacity` nodes.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: StorageMap::with_capacity_and_key(capacity),
            untested: fast_hash_set_with_capacity(capacity),
            last_returned: None,
        }
    }

    // -------------------------------------------------------------------------
    // Nodes
    // -------------------------------------------------------------------------

    /// Adds an isolated node for `vertex`, optionally marking it untested.
    pub fn add_node(&mut self, vertex: VertexKey, mark_untested: bool) -> NodeKey {
        let key = self.nodes.insert(SkeletonNode {
            vertex,
            neighbors: NeighborBuffer::new(),
        });
        if mark_untested {
            self.untested.insert(key);
        }
        key
    }

    /// Removes a node together with its incident edges.
    ///
    /// The node leaves the untested set, and `last_returned` is cleared if it
    /// pointed at this node. Returns the key of the vertex the node represented.
    pub fn remove_node(&mut self, node: NodeKey) -> Option<VertexKey> {
        let removed = self.nodes.remove(node)?;
        for &neighbor in &removed.neighbors {
            if let Some(n) = self.nodes.get_mut(neighbor) {
                n.neighbors.retain(|k| *k != node);
            }
        }
        self.untested.remove(&node);
        if self.last_returned == Some(node) {
            self.last_returned = None;
        }
        Some(removed.vertex)
    }

    /// Returns `true` if `node` is part of the graph.
    #[inline]
    #[must_use]
    pub fn contains_node(&self, node: NodeKey) -> bool {
        self.nodes.contains_key(node)
    }

    /// Looks up a node.
    #[inline]
    #[must_use]
    pub fn node(&self, node: NodeKey) -> Option<&SkeletonNode> {
        self.nodes.get(node)
    }

    /// Key of the vertex represented by `node`.
    #[inline]
    #[must_use]
    pub fn vertex_of(&self, node: NodeKey) -> Option<VertexKey> {
        self.nodes.get(node).map(SkeletonNode::vertex)
    }

    /// Neighbours of `node` (empty if the node does not exist).
    #[inline]
    #[must_use]
    pub fn neighbors(&self, node: NodeKey) -> &[NodeKey] {
        self.nodes
            .get(node)
            .map(|n| n.neighbors.as_slice())
            .unwrap_or_default()
    }

    /// Iterates over all nodes.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeKey, &SkeletonNode)> {
        self.nodes.iter()
    }

    /// Number of nodes.
    #[inline]
    #[must_use]
    pub fn number_of_nodes(&self) -> usize {
        self.nodes.len()
    }

    // -------------------------------------------------------------------------
    // Edges
    // -------------------------------------------------------------------------

    /// Adds the undirected edge `{u, v}`.
    ///
    /// Self-loops, duplicate edges and edges to missing nodes are ignored.
    /// Returns `true` if an edge was inserted.
    pub fn add_edge(&mut self, u: NodeKey, v: NodeKey) -> bool {
        if u == v || !self.nodes.contains_key(u) || !self.nodes.contains_key(v) {
            return false;
        }
        if self.contains_edge(u, v) {
            return false;
        }
        if let Some(n) = self.nodes.get_mut(u) {
            n.neighbors.push(v);
        }
        if let Some(n) = self.nodes.get_mut(v) {
            n.neighbors.push(u);
        }
        true
    }

    /// Detaches `node` from all of its neighbours, keeping the node itself.
    pub fn clear_edges(&mut self, node: NodeKey) {
        let Some(n) = self.nodes.get_mut(node) else {
            return;
        };
        let neighbors = std::mem::take(&mut n.neighbors);
        for neighbor in neighbors {
            if let Some(other) = self.nodes.get_mut(neighbor) {
                other.neighbors.retain(|k| *k != node);
            }
        }
    }

    /// Returns `true` if `{u, v}` is an edge.
    #[must_use]
    pub fn contains_edge(&self, u: NodeKey, v: NodeKey) -> bool {
        self.nodes
            .get(u)
            .is_some_and(|n| n.neighbors.contains(&v))
    }

    /// Iterates over every edge exactly once, as canonical [`EdgeKey`]s.
    pub fn edges(&self) -> impl Iterator<Item = EdgeKey> + '_ {
        self.nodes.iter().flat_map(|(key, node)| {
            node.neighbors
                .iter()
                .filter(move |&&other| EdgeKey::new(key, other).v0() == key)
                .map(move |&other| EdgeKey::new(key, other))
        })
    }

    /// Number of edges.
    #[must_use]
    pub fn number_of_edges(&self) -> usize {
        self.nodes.values().map(|n| n.neighbors.len()).sum::<usize>() / 2
    }

    // -------------------------------------------------------------------------
    // Untested bookkeeping
    // -------------------------------------------------------------------------

    /// Returns `true` if some node still awaits evaluation.
    #[inline]
    #[must_use]
    pub fn has_untested(&self) -> bool {
        !self.untested.is_empty()
    }

    /// Removes an arbitrary untested node, records it as `last_returned` and returns it.
    pub fn take_untested(&mut self) -> Option<NodeKey> {
        let node = self.untested.iter().next().copied()?;
        self.untested.remove(&node);
        self.last_returned = Some(node);
        Some(node)
    }

    /// Marks `node` as untested. Returns `false` if the node does not exist
    /// or was already untested.
    pub fn mark_untested(&mut self, node: NodeKey) -> bool {
        self.nodes.contains_key(node) && self.untested.insert(node)
    }

    /// Removes `node` from the untested set. Returns `true` if it was there.
    pub fn unmark_untested(&mut self, node: NodeKey) -> bool {
        self.untested.remove(&node)
    }

    /// Returns `true` if `node` awaits evaluation.
    #[inline]
    #[must_use]
    pub fn is_untested(&self, node: NodeKey) -> bool {
        self.untested.contains(&node)
    }

    /// Iterates over the untested nodes.
    pub fn untested(&self) -> impl Iterator<Item = NodeKey> + '_ {
        self.untested.iter().copied()
    }

    /// Number of untested nodes.
    #[inline]
    #[must_use]
    pub fn number_of_untested(&self) -> usize {
        self.untested.len()
    }

    /// The node most recently handed out by [`take_untested`](Self::take_untested),
    /// if it is still part of the graph.
    #[inline]
    #[must_use]
    pub const fn last_returned(&self) -> Option<NodeKey> {
        self.last_returned
    }
}
