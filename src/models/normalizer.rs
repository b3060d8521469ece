use crate::config::DEFAULT_MAX_ENTITY_LENGTH;
use crate::constants::{COMPANY_ABBREVIATIONS, LEGAL_SUFFIXES};
use crate::utils::dedup_vector;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Closed set of legal-form tags inferred from legal suffixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompanyType {
    Corporation,
    Company,
    Limited,
    LimitedLiabilityCompany,
    Partnership,
    PublicLimitedCompany,
    StockCorporation,
    EuropeanCompany,
}

/// A legal-entity suffix, the legal form it implies and the jurisdictions it hints at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegalSuffix {
    pub canonical: String,
    pub company_type: CompanyType,
    pub jurisdictions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizerConfig {
    pub legal_suffixes: Vec<LegalSuffix>,
    /// (surface form, expansion). Surface forms are matched case-insensitively.
    pub abbreviations: Vec<(String, String)>,
    pub max_entity_length: usize,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            legal_suffixes: LEGAL_SUFFIXES
                .iter()
                .map(|(canonical, company_type, jurisdictions)| LegalSuffix {
                    canonical: canonical.to_string(),
                    company_type: *company_type,
                    jurisdictions: jurisdictions.iter().map(|j| j.to_string()).collect(),
                })
                .collect(),
            abbreviations: COMPANY_ABBREVIATIONS
                .iter()
                .map(|(abbr, expansion)| (abbr.to_string(), expansion.to_string()))
                .collect(),
            max_entity_length: DEFAULT_MAX_ENTITY_LENGTH,
        }
    }
}

/// Everything the normalizer can derive from a raw entity string.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NormalizedForm {
    pub base_name: String,
    /// Canonical suffixes found, outermost first.
    pub legal_suffixes: Vec<String>,
    pub company_types: Vec<CompanyType>,
    pub jurisdictions: Vec<String>,
}

/// Canonicalizes organization names.
///
/// Normalization is deterministic and idempotent: running it on its own output yields the
/// same string.
#[derive(Debug, Clone)]
pub struct Normalizer {
    config: NormalizerConfig,
    // (suffix key tokens, index into `config.legal_suffixes`), longest first
    suffix_keys: Vec<(Vec<String>, usize)>,
    abbreviations: HashMap<String, String>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(NormalizerConfig::default())
    }
}

impl Normalizer {
    pub fn new(config: NormalizerConfig) -> Self {
        let mut suffix_keys: Vec<(Vec<String>, usize)> = config
            .legal_suffixes
            .iter()
            .enumerate()
            .map(|(idx, suffix)| {
                let key_tokens = suffix
                    .canonical
                    .split_whitespace()
                    .map(suffix_token_key)
                    .collect::<Vec<_>>();
                (key_tokens, idx)
            })
            .filter(|(key_tokens, _)| !key_tokens.is_empty())
            .collect();

        // Longest match first: more tokens, then more characters.
        suffix_keys.sort_by(|(a, a_idx), (b, b_idx)| {
            b.len()
                .cmp(&a.len())
                .then_with(|| {
                    let a_chars: usize = a.iter().map(|t| t.len()).sum();
                    let b_chars: usize = b.iter().map(|t| t.len()).sum();
                    b_chars.cmp(&a_chars)
                })
                .then_with(|| a_idx.cmp(b_idx))
        });

        let abbreviations = config
            .abbreviations
            .iter()
            .map(|(abbr, expansion)| (abbr.to_lowercase(), expansion.clone()))
            .collect();

        Self {
            config,
            suffix_keys,
            abbreviations,
        }
    }

    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    /// Returns the canonical base name: noise removed, legal suffixes stripped, whitespace
    /// collapsed and known abbreviations expanded. Empty input yields an empty string.
    pub fn normalize(&self, raw: &str) -> String {
        self.analyze(raw).base_name
    }

    /// Lowercased canonical form, used as a lookup key.
    pub fn normalize_key(&self, raw: &str) -> String {
        self.normalize(raw).to_lowercase()
    }

    /// Canonical suffixes found in `raw`, outermost first.
    pub fn extract_suffixes(&self, raw: &str) -> Vec<String> {
        self.analyze(raw).legal_suffixes
    }

    pub fn infer_company_types(&self, raw: &str) -> Vec<CompanyType> {
        self.analyze(raw).company_types
    }

    /// Country codes hinted at by the legal suffixes, sorted and deduplicated.
    pub fn infer_jurisdictions(&self, raw: &str) -> Vec<String> {
        self.analyze(raw).jurisdictions
    }

    /// Expansion for an abbreviation, if `raw` is exactly one.
    pub fn expand_abbreviation(&self, raw: &str) -> Option<&str> {
        self.abbreviations
            .get(&raw.trim().to_lowercase())
            .map(|s| s.as_str())
    }

    pub fn analyze(&self, raw: &str) -> NormalizedForm {
        let mut tokens = self.clean_tokens(raw);
        let mut matched_suffixes: Vec<usize> = Vec::new();

        loop {
            trim_edge_punctuation(&mut tokens);

            if tokens.len() >= 2 && tokens[0].eq_ignore_ascii_case("the") {
                tokens.remove(0);
                continue;
            }

            if let Some((token_count, suffix_idx)) = self.match_trailing_suffix(&tokens) {
                tokens.truncate(tokens.len() - token_count);
                matched_suffixes.push(suffix_idx);
                continue;
            }

            break;
        }

        let joined = tokens.join(" ");
        let base_name = match self.abbreviations.get(&joined.to_lowercase()) {
            Some(expansion) => expansion.clone(),
            None => joined,
        };

        let suffixes: Vec<&LegalSuffix> = matched_suffixes
            .iter()
            .map(|idx| &self.config.legal_suffixes[*idx])
            .collect();

        let company_types = dedup_vector(
            &suffixes
                .iter()
                .map(|suffix| suffix.company_type)
                .collect::<Vec<_>>(),
        );

        let jurisdictions: BTreeSet<String> = suffixes
            .iter()
            .flat_map(|suffix| suffix.jurisdictions.iter().cloned())
            .collect();

        NormalizedForm {
            base_name,
            legal_suffixes: suffixes.iter().map(|s| s.canonical.clone()).collect(),
            company_types,
            jurisdictions: jurisdictions.into_iter().collect(),
        }
    }

    fn clean_tokens(&self, raw: &str) -> Vec<String> {
        raw.chars()
            .take(self.config.max_entity_length)
            .map(|c| {
                if is_noise_char(c) || c.is_control() {
                    ' '
                } else {
                    c
                }
            })
            .collect::<String>()
            .split_whitespace()
            .map(|token| token.to_string())
            .collect()
    }

    /// Finds the longest legal suffix at the end of `tokens`, leaving at least one token.
    fn match_trailing_suffix(&self, tokens: &[String]) -> Option<(usize, usize)> {
        self.suffix_keys
            .iter()
            .find(|(key_tokens, _)| {
                tokens.len() > key_tokens.len()
                    && tokens[tokens.len() - key_tokens.len()..]
                        .iter()
                        .zip(key_tokens)
                        .all(|(token, key)| suffix_token_key(token) == *key)
            })
            .map(|(key_tokens, idx)| (key_tokens.len(), *idx))
    }
}

fn suffix_token_key(token: &str) -> String {
    token
        .chars()
        .filter(|c| *c != '.')
        .flat_map(|c| c.to_lowercase())
        .collect()
}

fn is_noise_char(c: char) -> bool {
    matches!(
        c,
        '"' | '\u{201C}'
            | '\u{201D}'
            | '\u{00AB}'
            | '\u{00BB}'
            | '('
            | ')'
            | '['
            | ']'
            | '{'
            | '}'
            | '<'
            | '>'
            | '*'
            | '#'
            | '|'
            | ';'
            | ':'
            | '!'
            | '?'
            | ','
            | '`'
            | '~'
            | '^'
            | '='
            | '@'
    )
}

/// Removes non-alphanumeric characters from the front of the first token and the back of the
/// last token, dropping tokens that become empty.
fn trim_edge_punctuation(tokens: &mut Vec<String>) {
    while let Some(first) = tokens.first_mut() {
        let trimmed = first.trim_start_matches(|c: char| !c.is_alphanumeric());
        if trimmed.is_empty() {
            tokens.remove(0);
        } else {
            *first = trimmed.to_string();
            break;
        }
    }

    while let Some(last) = tokens.last_mut() {
        let trimmed = last.trim_end_matches(|c: char| !c.is_alphanumeric());
        if trimmed.is_empty() {
            tokens.pop();
        } else {
            *last = trimmed.to_string();
            break;
        }
    }
}
