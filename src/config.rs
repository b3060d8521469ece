use crate::models::{CacheConfig, ConfidenceThresholds, ConfidenceWeights, FuzzyWeights};
use std::time::Duration;

// Heuristic defaults. None of these values are derived; they are tuning knobs and every one
// of them can be overridden through the corresponding config struct.

pub const DEFAULT_MAX_ENTITY_LENGTH: usize = 256;

pub const DEFAULT_FUZZY_WEIGHTS: FuzzyWeights = FuzzyWeights {
    ratio: 0.2,
    partial_ratio: 0.2,
    token_sort_ratio: 0.3,
    token_set_ratio: 0.3,
};

pub const DEFAULT_ABBREVIATION_BONUS: f64 = 0.1;

pub const DEFAULT_FUZZY_MATCH_THRESHOLD: f64 = 0.75;

pub const DEFAULT_SEARCH_LIMIT: usize = 10;

pub const NAME_MATCH_WEIGHT: f64 = 1.0;

pub const ALIAS_MATCH_WEIGHT: f64 = 0.95;

pub const TICKER_MATCH_WEIGHT: f64 = 0.9;

pub const DEFAULT_KNOWLEDGE_BASE_QUERY_CACHE_CONFIG: CacheConfig = CacheConfig {
    capacity: 512,
    ttl: Duration::from_secs(60),
};

pub const DEFAULT_MAX_ENTITIES: usize = 50;

pub const DEFAULT_EXTRACTION_DEADLINE: Duration = Duration::from_millis(50);

pub const DEFAULT_STRUCTURAL_WEIGHT: f64 = 0.5;

pub const DEFAULT_SITE_PATTERN_CONFIDENCE: f64 = 0.6;

pub const DEFAULT_STRUCTURAL_CACHE_CONFIG: CacheConfig = CacheConfig {
    capacity: 256,
    ttl: Duration::from_secs(5),
};

pub const DEFAULT_CONFIDENCE_WEIGHTS: ConfidenceWeights = ConfidenceWeights {
    pattern: 0.25,
    structural: 0.20,
    extraction: 0.25,
    cross_reference: 0.15,
    consistency: 0.15,
};

pub const DEFAULT_CONFIDENCE_THRESHOLDS: ConfidenceThresholds = ConfidenceThresholds {
    high: 0.85,
    medium: 0.65,
    low: 0.45,
};

pub const DEFAULT_UNKNOWN_CROSS_REFERENCE_SCORE: f64 = 0.3;

pub const DEFAULT_RESULT_CACHE_CONFIG: CacheConfig = CacheConfig {
    capacity: 1000,
    ttl: Duration::from_secs(300),
};

pub const DEFAULT_MAX_RESULTS: usize = 20;

pub const DEFAULT_MAX_TEXT_LENGTH: usize = 10_000;

pub const DEFAULT_MIN_KNOWLEDGE_BASE_SCORE: f64 = DEFAULT_FUZZY_MATCH_THRESHOLD;

pub const DEFAULT_SITE_ID: &str = "generic";
