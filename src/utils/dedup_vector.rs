use std::collections::HashSet;
use std::hash::Hash;

/// First occurrence of each item, in input order.
///
/// Used for facts inferred from stacked legal suffixes ("Holdings Ltd Plc"), where the same
/// company type can show up more than once.
pub fn dedup_vector<T: Eq + Hash + Clone>(items: &[T]) -> Vec<T> {
    let mut seen = HashSet::with_capacity(items.len());

    items
        .iter()
        .filter(|item| seen.insert(*item))
        .cloned()
        .collect()
}
