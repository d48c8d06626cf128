use super::FastHashSet;
use rustc_hash::FxBuildHasher;

// =============================================================================
// UTILITY FUNCTIONS
// =============================================================================

/// Creates a `FastHashSet` with pre-allocated capacity using the optimal hasher.
///
/// # Examples
///
/// ```rust
/// use weight_space::core::collections::fast_hash_set_with_capacity;
///
/// let set = fast_hash_set_with_capacity::<u64>(100);
/// assert!(set.capacity() >= 100);
/// ```
#[inline]
#[must_use]
pub fn fast_hash_set_with_capacity<T>(capacity: usize) -> FastHashSet<T> {
    FastHashSet::with_capacity_and_hasher(capacity, FxBuildHasher)
}

/// Counts the common elements of two sorted slices.
///
/// Both inputs must be sorted ascending and free of duplicates; this is the
/// representation used for defining facet sets.
///
/// # Examples
///
/// ```rust
/// use weight_space::core::collections::sorted_intersection_len;
///
/// assert_eq!(sorted_intersection_len(&[1, 2, 4, 7], &[2, 3, 4, 8]), 2);
/// assert_eq!(sorted_intersection_len::<u32>(&[], &[1]), 0);
/// ```
#[must_use]
pub fn sorted_intersection_len<T: Ord>(a: &[T], b: &[T]) -> usize {
    let (mut i, mut j, mut count) = (0, 0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                count += 1;
                i += 1;
                j += 1;
            }
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_helpers() {
        let set = fast_hash_set_with_capacity::<u64>(50);
        assert!(set.capacity() >= 50);
    }

    #[test]
    fn test_sorted_intersection_len() {
        assert_eq!(sorted_intersection_len(&[0, 1, 2], &[0, 1, 2]), 3);
        assert_eq!(sorted_intersection_len(&[0, 1, 2], &[3, 4, 5]), 0);
        assert_eq!(sorted_intersection_len(&[0, 2, 3], &[1, 2, 3]), 2);
        assert_eq!(sorted_intersection_len(&[5], &[1, 2, 3, 4, 5]), 1);
    }
}
