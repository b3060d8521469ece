use crate::models::ResolvedEntity;

/// Ranks resolved entities.
///
/// ### Sorting Order:
/// - **Primary:** Sorts by confidence score in descending order (higher score first).
/// - **Secondary:** If two entities have the same score, the one appearing earlier in the
///   text comes first.
/// - **Tertiary:** Remaining ties are broken by entity type priority
///   (ticker > company > company_intl > company_abbrev > company_context).
///
/// The order is fully deterministic for identical input.
///
/// ### Parameters:
/// - `results`: The scored entities of one resolution call, in any order.
///
/// ### Returns:
/// - The same entities, sorted as described above.
pub fn sort_results(results: Vec<ResolvedEntity>) -> Vec<ResolvedEntity> {
    let mut sorted_results = results;

    sorted_results.sort_by(|a, b| {
        b.confidence
            .score
            .partial_cmp(&a.confidence.score) // Sort by score (descending)
            .unwrap_or(std::cmp::Ordering::Equal) // Handle NaN gracefully
            .then_with(|| a.offset.cmp(&b.offset))
            .then_with(|| {
                a.entity_type
                    .priority()
                    .cmp(&b.entity_type.priority())
            })
    });

    sorted_results
}
