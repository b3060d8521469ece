use crate::config::{DEFAULT_EXTRACTION_DEADLINE, DEFAULT_MAX_ENTITIES};
use crate::constants::{
    AMBIGUOUS_COMPANY_WORDS, COMPANY_ABBREVIATIONS, NON_TICKER_WORDS, SENTENCE_LEAD_WORDS,
    SUPPORTING_CONTEXT_PATTERN,
};
use crate::types::{ByteOffset, EntityType, Score};
use crate::Error;
use log::{debug, warn};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::{Duration, Instant};

/// Post-filter applied to a match: `(entity text, full text, entity byte offset)`.
pub type Validator = fn(entity: &str, text: &str, offset: ByteOffset) -> bool;

// A capitalized name word: "Apple", "JPMorgan", "Coca-Cola", "P&G", "Amazon.com", "Nestlé".
const NAME_WORD: &str = r"\p{Lu}[\p{L}\p{N}&\-]*(?:\.[a-z]{2,4})?";

const FORMAL_SUFFIXES: &str =
    r"(?:Incorporated|Inc|Corporation|Corp|Company|Co|Limited|Ltd|L\.L\.C|LLC|LLP|LP|PLC|[Pp]lc)";

const INTERNATIONAL_SUFFIXES: &str = r"(?:Pty\.?\s+Ltd|GmbH|AG|S\.p\.A|SpA|S\.r\.l|Srl|S\.A|SA|SARL|N\.V|NV|B\.V|BV|ASA|AB|Oyj|K\.K|SE)";

/// Describes one extraction rule before its patterns are compiled.
#[derive(Debug, Clone)]
pub struct PatternRuleSpec {
    pub name: String,
    pub patterns: Vec<String>,
    pub entity_type: EntityType,
    pub base_confidence: Score,
    pub validator: Option<Validator>,
}

impl PatternRuleSpec {
    pub fn new(
        name: &str,
        patterns: &[&str],
        entity_type: EntityType,
        base_confidence: Score,
    ) -> Self {
        Self {
            name: name.to_string(),
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
            entity_type,
            base_confidence,
            validator: None,
        }
    }

    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }

    /// The built-in rule table, in priority order. The informal-abbreviation rule is built
    /// from `abbreviations` so it stays in sync with the normalizer's table.
    pub fn default_rules(abbreviations: &[(String, String)]) -> Vec<PatternRuleSpec> {
        let name = name_pattern();

        let mut rules = vec![
            PatternRuleSpec::new(
                "ticker_symbol",
                &[
                    r"\$(?P<entity>[A-Z]{1,5}(?:\.[A-Z])?)\b",
                    r"\b(?:NYSE|NASDAQ|Nasdaq|NYSEARCA|AMEX|LSE|TSX)\s*:\s*(?P<entity>[A-Z]{1,5}(?:\.[A-Z])?)\b",
                ],
                EntityType::Ticker,
                0.95,
            )
            .with_validator(validate_ticker_symbol),
            PatternRuleSpec {
                name: "formal_suffix".to_string(),
                patterns: vec![format!(
                    r"\b{}(?:,?\s+(?:&\s+)?{}\b\.?){{1,2}}",
                    name, FORMAL_SUFFIXES
                )],
                entity_type: EntityType::Company,
                base_confidence: 0.90,
                validator: Some(validate_formal_name),
            },
            PatternRuleSpec {
                name: "international_suffix".to_string(),
                patterns: vec![format!(r"\b{},?\s+{}\b\.?", name, INTERNATIONAL_SUFFIXES)],
                entity_type: EntityType::CompanyIntl,
                base_confidence: 0.85,
                validator: None,
            },
        ];

        if !abbreviations.is_empty() {
            let alternatives = abbreviations
                .iter()
                .map(|(abbr, _)| regex::escape(abbr))
                .collect::<Vec<_>>()
                .join("|");

            rules.push(PatternRuleSpec {
                name: "informal_abbreviation".to_string(),
                patterns: vec![format!(r"\b(?P<entity>{})\b", alternatives)],
                entity_type: EntityType::CompanyAbbrev,
                base_confidence: 0.60,
                validator: None,
            });
        }

        rules.push(PatternRuleSpec {
            name: "context_indicator".to_string(),
            patterns: vec![
                format!(r"\b(?i:shares)\s+of\s+(?P<entity>{})", name),
                format!(r"\b(?P<entity>{})(?:'s)?\s+(?:stock|shares)\b", name),
                format!(
                    r"\b(?P<entity>{})\s+(?:announced|reported|said|posted|unveiled|launched)\b",
                    name
                ),
                format!(
                    r"\b(?:acquired|acquire|acquisition\s+of|rival|competitor|partnered\s+with)\s+(?P<entity>{})",
                    name
                ),
            ],
            entity_type: EntityType::CompanyContext,
            base_confidence: 0.50,
            validator: None,
        });

        rules
    }
}

fn name_pattern() -> String {
    format!(r"{w}(?:\s+(?:&\s+|of\s+)?{w}){{0,5}}", w = NAME_WORD)
}

/// Rejects single letters and common all-caps words.
pub fn validate_ticker_symbol(entity: &str, _text: &str, _offset: ByteOffset) -> bool {
    let symbol = entity.split('.').next().unwrap_or(entity);

    symbol.chars().count() > 1 && !NON_TICKER_WORDS.contains(&symbol)
}

/// "BHP Pty Ltd" belongs to the international rule, not "BHP Pty" + "Ltd".
fn validate_formal_name(entity: &str, _text: &str, _offset: ByteOffset) -> bool {
    !entity
        .split_whitespace()
        .any(|token| token.trim_end_matches('.') == "Pty")
}

#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    pub rules: Vec<PatternRuleSpec>,
    /// Cap on distinct (text, type) pairs; repeated mentions are not counted.
    pub max_entities: usize,
    pub deadline: Duration,
    /// (word, industry keyword pattern) pairs that need supporting context to be kept.
    pub ambiguous_words: Vec<(String, String)>,
    pub supporting_context_pattern: String,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        let abbreviations: Vec<(String, String)> = COMPANY_ABBREVIATIONS
            .iter()
            .map(|(abbr, expansion)| (abbr.to_string(), expansion.to_string()))
            .collect();

        Self {
            rules: PatternRuleSpec::default_rules(&abbreviations),
            max_entities: DEFAULT_MAX_ENTITIES,
            deadline: DEFAULT_EXTRACTION_DEADLINE,
            ambiguous_words: AMBIGUOUS_COMPANY_WORDS
                .iter()
                .map(|(word, industry)| (word.to_string(), industry.to_string()))
                .collect(),
            supporting_context_pattern: SUPPORTING_CONTEXT_PATTERN.to_string(),
        }
    }
}

/// A rule that failed to compile and was left out of the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternFailure {
    pub rule: String,
    pub message: String,
}

impl From<PatternFailure> for Error {
    fn from(failure: PatternFailure) -> Error {
        Error::PatternError {
            rule: failure.rule,
            message: failure.message,
        }
    }
}

/// One pattern match. Never mutated after extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateEntity {
    /// The entity text (the `entity` capture, or the whole match), lead words trimmed.
    pub text: String,
    /// The full text of the pattern match.
    pub matched_text: String,
    pub offset: ByteOffset,
    pub end: ByteOffset,
    /// Name of the rule that produced the match.
    pub category: String,
    pub entity_type: EntityType,
    pub base_confidence: Score,
}

#[derive(Debug, Clone, Default)]
pub struct ExtractionOutcome {
    /// Sorted by offset.
    pub candidates: Vec<CandidateEntity>,
    pub timed_out: bool,
    pub failed_rules: Vec<PatternFailure>,
    pub elapsed: Duration,
}

impl ExtractionOutcome {
    /// Mean base confidence over every candidate, or `0.0` if there are none.
    pub fn aggregate_confidence(&self) -> Score {
        if self.candidates.is_empty() {
            return 0.0;
        }

        self.candidates
            .iter()
            .map(|candidate| candidate.base_confidence)
            .sum::<Score>()
            / self.candidates.len() as Score
    }
}

#[derive(Debug, Clone)]
struct PatternRule {
    name: String,
    patterns: Vec<Regex>,
    entity_type: EntityType,
    base_confidence: Score,
    validator: Option<Validator>,
}

#[derive(Debug, Clone)]
struct AmbiguousWord {
    word: String,
    industry_pattern: Option<Regex>,
}

/// Table-driven lexical extraction of organization mentions.
#[derive(Debug, Clone)]
pub struct PatternExtractor {
    rules: Vec<PatternRule>,
    failed_rules: Vec<PatternFailure>,
    ambiguous_words: Vec<AmbiguousWord>,
    supporting_context: Option<Regex>,
    max_entities: usize,
    deadline: Duration,
}

impl Default for PatternExtractor {
    fn default() -> Self {
        Self::new(ExtractorConfig::default())
    }
}

impl PatternExtractor {
    /// Compiles the rule table. A rule with any invalid pattern is left out and reported
    /// through [`PatternExtractor::failed_rules`].
    pub fn new(config: ExtractorConfig) -> Self {
        let mut rules = Vec::with_capacity(config.rules.len());
        let mut failed_rules = Vec::new();

        for spec in config.rules {
            match compile_rule(&spec) {
                Ok(rule) => rules.push(rule),
                Err(failure) => {
                    warn!(
                        "Skipping pattern rule `{}`: {}",
                        failure.rule, failure.message
                    );
                    failed_rules.push(failure);
                }
            }
        }

        let ambiguous_words = config
            .ambiguous_words
            .into_iter()
            .map(|(word, industry)| {
                let industry_pattern = match Regex::new(&industry) {
                    Ok(regex) => Some(regex),
                    Err(e) => {
                        warn!("Invalid industry pattern for `{}`: {}", word, e);
                        None
                    }
                };

                AmbiguousWord {
                    word,
                    industry_pattern,
                }
            })
            .collect();

        let supporting_context = match Regex::new(&config.supporting_context_pattern) {
            Ok(regex) => Some(regex),
            Err(e) => {
                warn!("Invalid supporting-context pattern: {}", e);
                None
            }
        };

        Self {
            rules,
            failed_rules,
            ambiguous_words,
            supporting_context,
            max_entities: config.max_entities,
            deadline: config.deadline,
        }
    }

    pub fn failed_rules(&self) -> &[PatternFailure] {
        &self.failed_rules
    }

    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|rule| rule.name.as_str()).collect()
    }

    pub fn extract(&self, text: &str) -> ExtractionOutcome {
        let started_at = Instant::now();
        self.extract_until(text, started_at + self.deadline)
    }

    /// Runs every rule in order until `deadline`. On timeout the candidates collected so far
    /// are returned with `timed_out` set.
    pub fn extract_until(&self, text: &str, deadline: Instant) -> ExtractionOutcome {
        let started_at = Instant::now();
        let mut candidates: Vec<CandidateEntity> = Vec::new();
        let mut distinct: HashSet<(String, EntityType)> = HashSet::new();
        let mut timed_out = false;

        'rules: for rule in &self.rules {
            if Instant::now() >= deadline {
                timed_out = true;
                break;
            }

            for pattern in &rule.patterns {
                for captures in pattern.captures_iter(text) {
                    if Instant::now() >= deadline {
                        timed_out = true;
                        break 'rules;
                    }

                    let Some(whole) = captures.get(0) else {
                        continue;
                    };
                    let entity = captures.name("entity").unwrap_or(whole);

                    let lead = trim_lead_words(entity.as_str());
                    let entity_text = &entity.as_str()[lead..];
                    let offset = entity.start() + lead;
                    let end = entity.end();

                    if entity_text.is_empty() || is_lead_word(entity_text) {
                        continue;
                    }

                    if candidates
                        .iter()
                        .any(|existing| offset < existing.end && existing.offset < end)
                    {
                        debug!(
                            "Skipping overlapping match `{}` ({})",
                            entity_text, rule.name
                        );
                        continue;
                    }

                    if let Some(validator) = rule.validator {
                        if !validator(entity_text, text, offset) {
                            debug!("Validator rejected `{}` ({})", entity_text, rule.name);
                            continue;
                        }
                    }

                    if !self.passes_disambiguation(entity_text, text) {
                        debug!(
                            "Dropping ambiguous `{}` without supporting context",
                            entity_text
                        );
                        continue;
                    }

                    // Repeats stay for coreference but only distinct entities count
                    // toward the cap.
                    let distinct_key = (entity_text.to_string(), rule.entity_type);
                    if !distinct.contains(&distinct_key) {
                        if distinct.len() >= self.max_entities {
                            debug!("Entity cap reached; skipping `{}`", entity_text);
                            continue;
                        }
                        distinct.insert(distinct_key);
                    }

                    candidates.push(CandidateEntity {
                        text: entity_text.to_string(),
                        matched_text: whole.as_str().to_string(),
                        offset,
                        end,
                        category: rule.name.clone(),
                        entity_type: rule.entity_type,
                        base_confidence: rule.base_confidence,
                    });
                }
            }
        }

        if timed_out {
            warn!(
                "Extraction deadline exceeded; returning {} partial candidates",
                candidates.len()
            );
        }

        candidates.sort_by(|a, b| a.offset.cmp(&b.offset).then_with(|| a.end.cmp(&b.end)));

        ExtractionOutcome {
            candidates,
            timed_out,
            failed_rules: self.failed_rules.clone(),
            elapsed: started_at.elapsed(),
        }
    }

    /// An ambiguous word is kept only with financial context or an industry keyword nearby.
    fn passes_disambiguation(&self, entity_text: &str, text: &str) -> bool {
        let Some(ambiguous) = self
            .ambiguous_words
            .iter()
            .find(|ambiguous| ambiguous.word.eq_ignore_ascii_case(entity_text))
        else {
            return true;
        };

        let has_supporting_context = self
            .supporting_context
            .as_ref()
            .is_some_and(|regex| regex.is_match(text));

        let has_industry_context = ambiguous
            .industry_pattern
            .as_ref()
            .is_some_and(|regex| regex.is_match(text));

        has_supporting_context || has_industry_context
    }
}

fn compile_rule(spec: &PatternRuleSpec) -> Result<PatternRule, PatternFailure> {
    if spec.patterns.is_empty() {
        return Err(PatternFailure {
            rule: spec.name.clone(),
            message: "rule has no patterns".to_string(),
        });
    }

    let patterns = spec
        .patterns
        .iter()
        .map(|pattern| Regex::new(pattern))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| PatternFailure {
            rule: spec.name.clone(),
            message: e.to_string(),
        })?;

    Ok(PatternRule {
        name: spec.name.clone(),
        patterns,
        entity_type: spec.entity_type,
        base_confidence: spec.base_confidence.clamp(0.0, 1.0),
        validator: spec.validator,
    })
}

fn is_lead_word(token: &str) -> bool {
    SENTENCE_LEAD_WORDS.contains(&token) || token == "&" || token == "of"
}

/// Byte length of the leading sentence words ("Shares of", "According", ...) to drop from a
/// multi-word capture. The last word is never dropped.
fn trim_lead_words(entity: &str) -> usize {
    let mut start = 0;

    while let Some(token_len) = entity[start..].find(char::is_whitespace) {
        let token = &entity[start..start + token_len];

        if !is_lead_word(token) {
            break;
        }

        let rest = &entity[start + token_len..];
        start += token_len + (rest.len() - rest.trim_start().len());
    }

    start
}
