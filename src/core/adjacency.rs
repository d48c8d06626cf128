//! Combinatorial adjacency between skeleton vertices.
//!
//! Two vertices of the weight space polyhedron are joined by an edge iff they
//! share all but one of their `p` defining facets. Defining facet sets are
//! kept sorted, so the test is a linear merge of two short slices.

use crate::core::collections::{SmallBuffer, UPDATE_BUFFER_SIZE, sorted_intersection_len};
use crate::core::vertex::WeightSpaceVertex;

/// Returns `true` if `a` and `b` share exactly `p - 1` defining facets.
///
/// # Examples
///
/// ```rust
/// use weight_space::core::adjacency::is_neighbour;
/// use weight_space::core::facet::FacetId;
/// use weight_space::core::vertex::WeightSpaceVertex;
///
/// let c0 = WeightSpaceVertex::corner(0, 2, 3.0, FacetId(2));
/// let c1 = WeightSpaceVertex::corner(1, 2, 5.0, FacetId(2));
/// assert!(is_neighbour(&c0, &c1));
/// assert!(!is_neighbour(&c0, &c0));
/// ```
#[must_use]
pub fn is_neighbour(a: &WeightSpaceVertex, b: &WeightSpaceVertex) -> bool {
    let p = a.number_of_objectives();
    p == b.number_of_objectives()
        && sorted_intersection_len(a.defining_facets(), b.defining_facets()) + 1 == p
}

/// Index pairs `(i, j)` with `i < j` of mutually adjacent vertices in `vertices`.
///
/// Quadratic in the slice length; the update algorithm only calls it on the
/// handful of vertices produced by a single cut.
#[must_use]
pub fn adjacent_pairs<'a, I>(vertices: I) -> SmallBuffer<(usize, usize), UPDATE_BUFFER_SIZE>
where
    I: IntoIterator<Item = &'a WeightSpaceVertex>,
{
    let vertices: SmallBuffer<&WeightSpaceVertex, UPDATE_BUFFER_SIZE> =
        vertices.into_iter().collect();
    let mut pairs = SmallBuffer::new();
    for (j, later) in vertices.iter().enumerate() {
        for (i, earlier) in vertices[..j].iter().enumerate() {
            if is_neighbour(earlier, later) {
                pairs.push((i, j));
            }
        }
    }
    pairs
}
