pub mod confidence_scorer;
pub use confidence_scorer::{
    Confidence, ConfidenceBreakdown, ConfidenceLevel, ConfidenceScorer, ConfidenceThresholds,
    ConfidenceWeights, CrossReference, CrossReferenceKind, ExtractionSignal, ScorerConfig,
    ScoringInput,
};

pub mod coreference;
pub use coreference::{
    AnaphorLink, CoreferenceLinks, CoreferenceResolver, Mention, NearestAntecedentResolver,
};

pub mod entity_resolver;
pub use entity_resolver::{EntityResolver, EntityResolverBuilder, ResolverConfig};

pub mod error;
pub use error::{Error, KnowledgeBaseError, ScoringError};

pub mod fuzzy_matcher;
pub use fuzzy_matcher::{FuzzyMatch, FuzzyMatcher, FuzzyMatcherConfig, FuzzyWeights};

pub mod knowledge_base;
pub use knowledge_base::{
    KnowledgeBase, KnownOrganization, MatchedField, SearchMatch, SearchOptions,
};

pub mod normalizer;
pub use normalizer::{CompanyType, LegalSuffix, NormalizedForm, Normalizer, NormalizerConfig};

pub mod organization_list_preprocessor;
pub use organization_list_preprocessor::OrganizationListPreprocessor;

pub mod pattern_extractor;
pub use pattern_extractor::{
    CandidateEntity, ExtractionOutcome, ExtractorConfig, PatternExtractor, PatternFailure,
    PatternRuleSpec, Validator,
};

pub mod resolved_entity;
pub use resolved_entity::{
    Diagnostic, EntityReference, ReferenceKind, ResolutionResult, ResolvedEntity,
};

pub mod resolver_stats;
pub use resolver_stats::{ResolverStats, ResolverStatsSnapshot};

pub mod structural_context_analyzer;
pub use structural_context_analyzer::{
    ClueType, ContextClue, StructuralConfig, StructuralContext, StructuralContextAnalyzer,
};

pub mod structural_hints;
pub use structural_hints::{AttributeHint, HintMetadata, StructuralHints};

pub mod ttl_cache;
pub use ttl_cache::{CacheConfig, TtlCache};
