use std::collections::HashSet;
use std::hash::Hash;

/// Compute the Jaccard similarity between two sets: `|A ∩ B| / |A ∪ B|`.
///
/// Returns `0.0` when both sets are empty.
pub fn jaccard_similarity<T: Eq + Hash>(set1: &HashSet<T>, set2: &HashSet<T>) -> f64 {
    let intersection_size = set1.intersection(set2).count();
    let union_size = set1.union(set2).count();

    if union_size == 0 {
        0.0 // Avoid division by zero if both sets are empty
    } else {
        intersection_size as f64 / union_size as f64
    }
}
