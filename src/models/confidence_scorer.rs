use crate::config::{
    DEFAULT_CONFIDENCE_THRESHOLDS, DEFAULT_CONFIDENCE_WEIGHTS,
    DEFAULT_UNKNOWN_CROSS_REFERENCE_SCORE,
};
use crate::models::{ClueType, FuzzyMatcher, ScoringError, StructuralContext};
use crate::types::{EntityType, Score};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;

const MAX_CORROBORATION_BOOST: Score = 0.15;
const CORROBORATION_STEP: Score = 0.05;
const HEADLINE_MULTIPLIER: Score = 1.2;
const FIRST_PARAGRAPH_MULTIPLIER: Score = 1.1;
const INDUSTRY_AGREEMENT_BONUS: Score = 0.1;
const INDUSTRY_DISAGREEMENT_PENALTY: Score = 0.15;
const TEXT_AGREEMENT_SHARE: Score = 0.6;
const CLUE_AGREEMENT_SHARE: Score = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceWeights {
    pub pattern: Score,
    pub structural: Score,
    pub extraction: Score,
    pub cross_reference: Score,
    pub consistency: Score,
}

impl Default for ConfidenceWeights {
    fn default() -> Self {
        DEFAULT_CONFIDENCE_WEIGHTS
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceThresholds {
    pub high: Score,
    pub medium: Score,
    pub low: Score,
}

impl Default for ConfidenceThresholds {
    fn default() -> Self {
        DEFAULT_CONFIDENCE_THRESHOLDS
    }
}

impl ConfidenceThresholds {
    /// Buckets a score. Monotonic: a higher score never maps to a lower level.
    pub fn level_for(&self, score: Score) -> ConfidenceLevel {
        if score >= self.high {
            ConfidenceLevel::High
        } else if score >= self.medium {
            ConfidenceLevel::Medium
        } else if score >= self.low {
            ConfidenceLevel::Low
        } else {
            ConfidenceLevel::Reject
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
    Reject,
    /// The scorer failed internally; the score is `0.0`.
    Error,
}

impl ConfidenceLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            ConfidenceLevel::High => "high",
            ConfidenceLevel::Medium => "medium",
            ConfidenceLevel::Low => "low",
            ConfidenceLevel::Reject => "reject",
            ConfidenceLevel::Error => "error",
        }
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The five clamped sub-scores behind a confidence value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceBreakdown {
    pub pattern: Score,
    pub structural: Score,
    pub extraction: Score,
    pub cross_reference: Score,
    pub consistency: Score,
}

impl ConfidenceBreakdown {
    fn factors(&self) -> [(&'static str, Score); 5] {
        [
            ("pattern match", self.pattern),
            ("structural context", self.structural),
            ("extraction", self.extraction),
            ("knowledge base cross-reference", self.cross_reference),
            ("signal consistency", self.consistency),
        ]
    }

    /// The lowest sub-score. Ties go to the earlier factor.
    pub fn weakest_factor(&self) -> (&'static str, Score) {
        let factors = self.factors();
        let mut weakest = factors[0];

        for factor in &factors[1..] {
            if factor.1 < weakest.1 {
                weakest = *factor;
            }
        }

        weakest
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Confidence {
    pub score: Score,
    pub level: ConfidenceLevel,
    pub breakdown: ConfidenceBreakdown,
    pub recommendation: Option<String>,
}

impl Confidence {
    /// Score `0.0` at [`ConfidenceLevel::Error`].
    pub fn failed(error: &ScoringError) -> Self {
        Self {
            score: 0.0,
            level: ConfidenceLevel::Error,
            breakdown: ConfidenceBreakdown::default(),
            recommendation: Some(format!("Scoring failed: {}", error)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossReferenceKind {
    Exact,
    Fuzzy,
    None,
}

/// How the entity resolved against the knowledge base.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossReference {
    pub kind: CrossReferenceKind,
    /// Search score for fuzzy matches; ignored otherwise.
    pub score: Score,
    /// Industry of the matched organization.
    pub industry: Option<String>,
}

impl CrossReference {
    pub fn none() -> Self {
        Self {
            kind: CrossReferenceKind::None,
            score: 0.0,
            industry: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExtractionSignal {
    pub aggregate_confidence: Score,
    /// Other mentions in the same text that resolved to this entity.
    pub corroborating_matches: usize,
}

/// Everything the scorer looks at for one entity.
#[derive(Debug, Clone)]
pub struct ScoringInput<'a> {
    pub entity_type: EntityType,
    pub base_confidence: Score,
    /// Raw text the pattern matched.
    pub matched_text: &'a str,
    /// Normalized entity text.
    pub resolved_text: &'a str,
    /// Normalized canonical name (or ticker, for tickers) of the matched organization.
    pub reference_text: Option<&'a str>,
    pub structural: &'a StructuralContext,
    pub extraction: ExtractionSignal,
    pub cross_reference: CrossReference,
    pub document_industry: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScorerConfig {
    pub weights: ConfidenceWeights,
    pub thresholds: ConfidenceThresholds,
    pub unknown_cross_reference_score: Score,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            weights: DEFAULT_CONFIDENCE_WEIGHTS,
            thresholds: DEFAULT_CONFIDENCE_THRESHOLDS,
            unknown_cross_reference_score: DEFAULT_UNKNOWN_CROSS_REFERENCE_SCORE,
        }
    }
}

/// Fuses pattern, structural, extraction, knowledge-base and consistency signals into one
/// calibrated confidence.
///
/// Each sub-score is clamped to `[0, 1]` first; the final score is the weighted average of
/// the clamped sub-scores, clamped again. Scoring never fails outward: an internal failure
/// yields score `0.0` at [`ConfidenceLevel::Error`].
#[derive(Debug, Clone, Default)]
pub struct ConfidenceScorer {
    config: ScorerConfig,
    fuzzy_matcher: FuzzyMatcher,
}

impl ConfidenceScorer {
    pub fn new(config: ScorerConfig, fuzzy_matcher: FuzzyMatcher) -> Self {
        Self {
            config,
            fuzzy_matcher,
        }
    }

    pub fn config(&self) -> &ScorerConfig {
        &self.config
    }

    pub fn score(&self, input: &ScoringInput) -> Confidence {
        match self.try_score(input) {
            Ok(confidence) => confidence,
            Err(e) => {
                warn!("Scoring failed for `{}`: {}", input.resolved_text, e);
                Confidence::failed(&e)
            }
        }
    }

    pub fn try_score(&self, input: &ScoringInput) -> Result<Confidence, ScoringError> {
        validate_input(input)?;

        let weights = &self.config.weights;
        let weight_values = [
            weights.pattern,
            weights.structural,
            weights.extraction,
            weights.cross_reference,
            weights.consistency,
        ];

        if weight_values.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(ScoringError::InvalidWeights);
        }

        let weight_sum: Score = weight_values.iter().sum();

        if weight_sum <= 0.0 {
            return Err(ScoringError::InvalidWeights);
        }

        let breakdown = ConfidenceBreakdown {
            pattern: self.pattern_score(input),
            structural: self.structural_score(input),
            extraction: self.extraction_score(input),
            cross_reference: self.cross_reference_score(input),
            consistency: self.consistency_score(input),
        };

        let weighted = weights.pattern * breakdown.pattern
            + weights.structural * breakdown.structural
            + weights.extraction * breakdown.extraction
            + weights.cross_reference * breakdown.cross_reference
            + weights.consistency * breakdown.consistency;

        let score = (weighted / weight_sum).clamp(0.0, 1.0);

        if !score.is_finite() {
            return Err(ScoringError::NonFiniteInput("final score"));
        }

        let level = self.config.thresholds.level_for(score);

        let recommendation = if level == ConfidenceLevel::High {
            None
        } else {
            let (factor, value) = breakdown.weakest_factor();
            Some(format!(
                "Weakest factor is {} ({:.2}); corroborate it to raise confidence",
                factor, value
            ))
        };

        debug!(
            "Scored `{}` ({}): {:.3} {}",
            input.resolved_text, input.entity_type, score, level
        );

        Ok(Confidence {
            score,
            level,
            breakdown,
            recommendation,
        })
    }

    fn pattern_score(&self, input: &ScoringInput) -> Score {
        let type_factor = match input.entity_type {
            EntityType::Ticker => 1.05,
            EntityType::Company => 1.05,
            EntityType::CompanyIntl => 1.0,
            EntityType::CompanyAbbrev => 0.9,
            EntityType::CompanyContext => 0.85,
        };

        (input.base_confidence * type_factor).clamp(0.0, 1.0)
    }

    fn structural_score(&self, input: &ScoringInput) -> Score {
        let structural = input.structural;

        let position_multiplier = if structural.has_position("headline") {
            HEADLINE_MULTIPLIER
        } else if structural.has_position("first_paragraph") {
            FIRST_PARAGRAPH_MULTIPLIER
        } else {
            1.0
        };

        let clue_bonus: Score = structural
            .clues
            .iter()
            .map(|clue| {
                let factor = match clue.clue_type {
                    ClueType::TickerAttribute => 0.10,
                    ClueType::CompanyAttribute => 0.08,
                    ClueType::FinancialLink => 0.05,
                    ClueType::SitePattern => 0.05,
                    ClueType::FinancialSection => 0.03,
                };
                factor * clue.confidence
            })
            .sum();

        ((0.5 + 0.5 * structural.weight) * position_multiplier + clue_bonus).clamp(0.0, 1.0)
    }

    fn extraction_score(&self, input: &ScoringInput) -> Score {
        let boost = (CORROBORATION_STEP * input.extraction.corroborating_matches as Score)
            .min(MAX_CORROBORATION_BOOST);

        (input.extraction.aggregate_confidence + boost).clamp(0.0, 1.0)
    }

    fn cross_reference_score(&self, input: &ScoringInput) -> Score {
        let cross_reference = &input.cross_reference;

        let base = match cross_reference.kind {
            CrossReferenceKind::Exact => 1.0,
            CrossReferenceKind::Fuzzy => cross_reference.score,
            CrossReferenceKind::None => {
                return self.config.unknown_cross_reference_score.clamp(0.0, 1.0);
            }
        };

        let adjustment = match (input.document_industry, cross_reference.industry.as_deref()) {
            (Some(document), Some(known)) if !document.trim().is_empty() => {
                if document.trim().eq_ignore_ascii_case(known.trim()) {
                    INDUSTRY_AGREEMENT_BONUS
                } else {
                    -INDUSTRY_DISAGREEMENT_PENALTY
                }
            }
            _ => 0.0,
        };

        (base + adjustment).clamp(0.0, 1.0)
    }

    fn consistency_score(&self, input: &ScoringInput) -> Score {
        let text_agreement = match input.reference_text {
            Some(reference) => self
                .fuzzy_matcher
                .company_name_ratio(input.resolved_text, reference),
            None => self
                .fuzzy_matcher
                .company_name_ratio(input.matched_text, input.resolved_text),
        };

        let clues = &input.structural.clues;
        let clue_agreement = if clues.is_empty() {
            1.0
        } else {
            let compatible = clues
                .iter()
                .filter(|clue| clue_is_compatible(clue.clue_type, input.entity_type))
                .count();
            compatible as Score / clues.len() as Score
        };

        (TEXT_AGREEMENT_SHARE * text_agreement + CLUE_AGREEMENT_SHARE * clue_agreement)
            .clamp(0.0, 1.0)
    }
}

fn clue_is_compatible(clue_type: ClueType, entity_type: EntityType) -> bool {
    match clue_type {
        ClueType::TickerAttribute => entity_type.is_ticker(),
        ClueType::CompanyAttribute => !entity_type.is_ticker(),
        ClueType::FinancialLink | ClueType::SitePattern | ClueType::FinancialSection => true,
    }
}

fn validate_input(input: &ScoringInput) -> Result<(), ScoringError> {
    let checks = [
        (input.base_confidence, "base confidence"),
        (input.structural.weight, "structural weight"),
        (
            input.extraction.aggregate_confidence,
            "aggregate extraction confidence",
        ),
        (input.cross_reference.score, "cross-reference score"),
    ];

    for (value, name) in checks {
        if !value.is_finite() {
            return Err(ScoringError::NonFiniteInput(name));
        }
    }

    if input
        .structural
        .clues
        .iter()
        .any(|clue| !clue.confidence.is_finite())
    {
        return Err(ScoringError::NonFiniteInput("clue confidence"));
    }

    Ok(())
}
