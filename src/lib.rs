#[cfg(doctest)]
doc_comment::doctest!("../README.md");

mod config;
pub use config::{
    DEFAULT_CONFIDENCE_THRESHOLDS, DEFAULT_CONFIDENCE_WEIGHTS, DEFAULT_EXTRACTION_DEADLINE,
    DEFAULT_FUZZY_WEIGHTS, DEFAULT_RESULT_CACHE_CONFIG, DEFAULT_SITE_ID,
};
mod constants;
pub mod models;
pub use models::{
    CompanyType, Confidence, ConfidenceLevel, Diagnostic, EntityResolver, EntityResolverBuilder,
    Error, FuzzyMatcher, KnowledgeBase, KnowledgeBaseError, KnownOrganization, Normalizer,
    PatternExtractor, ResolutionResult, ResolvedEntity, ResolverConfig, SearchOptions,
    StructuralHints,
};
pub mod types;
mod utils;
pub use types::{
    AlternateCompanyName, ByteOffset, CompanyName, EntityType, OrganizationId,
    OrganizationSeedList, Score, TickerSymbol,
};
pub use utils::{sanitize_text, sort_results, tokenize};

/// Resolves the organization entities in `text` with the default configuration and the
/// embedded seed knowledge base.
///
/// Builds a fresh [`EntityResolver`] on every call; keep a resolver around to benefit from
/// its caches.
pub fn resolve_entities_from_text(text: &str) -> Result<Vec<ResolvedEntity>, Error> {
    resolve_entities_from_text_with_custom_config(ResolverConfig::default(), text)
}

pub fn resolve_entities_from_text_with_custom_config(
    resolver_config: ResolverConfig,
    text: &str,
) -> Result<Vec<ResolvedEntity>, Error> {
    let resolver = EntityResolver::with_config(resolver_config)?;

    let result = resolver.resolve(text, DEFAULT_SITE_ID, &StructuralHints::default());

    Ok(result.entities)
}
