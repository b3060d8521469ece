use crate::config::{
    DEFAULT_ABBREVIATION_BONUS, DEFAULT_FUZZY_MATCH_THRESHOLD, DEFAULT_FUZZY_WEIGHTS,
};
use crate::constants::{COMPANY_STOP_WORDS, FUZZY_ABBREVIATION_PAIRS};
use crate::types::Score;
use crate::utils::{jaccard_similarity, preprocess, tokenize};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Weights of the four similarity primitives inside the company-name ratio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FuzzyWeights {
    pub ratio: f64,
    pub partial_ratio: f64,
    pub token_sort_ratio: f64,
    pub token_set_ratio: f64,
}

impl Default for FuzzyWeights {
    fn default() -> Self {
        DEFAULT_FUZZY_WEIGHTS
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuzzyMatcherConfig {
    pub weights: FuzzyWeights,
    pub abbreviation_bonus: f64,
    pub match_threshold: f64,
    pub stop_words: Vec<String>,
    pub abbreviation_pairs: Vec<(String, String)>,
}

impl Default for FuzzyMatcherConfig {
    fn default() -> Self {
        Self {
            weights: DEFAULT_FUZZY_WEIGHTS,
            abbreviation_bonus: DEFAULT_ABBREVIATION_BONUS,
            match_threshold: DEFAULT_FUZZY_MATCH_THRESHOLD,
            stop_words: COMPANY_STOP_WORDS.iter().map(|w| w.to_string()).collect(),
            abbreviation_pairs: FUZZY_ABBREVIATION_PAIRS
                .iter()
                .map(|(abbr, full)| (abbr.to_string(), full.to_string()))
                .collect(),
        }
    }
}

/// A ranked choice returned by [`FuzzyMatcher::extract_best`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuzzyMatch {
    pub choice: String,
    pub index: usize,
    pub score: Score,
}

/// String-similarity primitives for organization names.
///
/// Every function returns a value in `[0, 1]`. Inputs are compared after lowercasing and
/// replacing punctuation (other than `&`) with spaces. Identical non-empty inputs always
/// score `1.0`; an input that is empty after preprocessing scores `0.0`.
#[derive(Debug, Clone)]
pub struct FuzzyMatcher {
    config: FuzzyMatcherConfig,
    stop_words: HashSet<String>,
}

impl Default for FuzzyMatcher {
    fn default() -> Self {
        Self::new(FuzzyMatcherConfig::default())
    }
}

impl FuzzyMatcher {
    pub fn new(config: FuzzyMatcherConfig) -> Self {
        let stop_words = config.stop_words.iter().map(|w| w.to_lowercase()).collect();

        Self { config, stop_words }
    }

    pub fn config(&self) -> &FuzzyMatcherConfig {
        &self.config
    }

    /// Edit-distance ratio: `1 - levenshtein / max(len)`.
    pub fn ratio(&self, a: &str, b: &str) -> Score {
        if let Some(score) = identical_score(a, b) {
            return score;
        }

        edit_ratio(&preprocess(a), &preprocess(b))
    }

    /// Best ratio of the shorter string against every equal-length window of the longer one.
    ///
    /// Not guaranteed to be symmetric: the first argument is treated as the shorter one when
    /// both have the same length.
    pub fn partial_ratio(&self, a: &str, b: &str) -> Score {
        if let Some(score) = identical_score(a, b) {
            return score;
        }

        let (a, b) = (preprocess(a), preprocess(b));
        let (shorter, longer) = if a.chars().count() <= b.chars().count() {
            (a, b)
        } else {
            (b, a)
        };

        let shorter_len = shorter.chars().count();
        let longer_chars: Vec<char> = longer.chars().collect();

        if shorter_len == 0 {
            return 0.0;
        }

        let mut best: Score = 0.0;
        for start in 0..=(longer_chars.len() - shorter_len) {
            let window: String = longer_chars[start..start + shorter_len].iter().collect();
            let score = edit_ratio(&shorter, &window);

            if score > best {
                best = score;
                if best >= 1.0 {
                    break;
                }
            }
        }

        best
    }

    /// Ratio after sorting each side's whitespace tokens.
    pub fn token_sort_ratio(&self, a: &str, b: &str) -> Score {
        if let Some(score) = identical_score(a, b) {
            return score;
        }

        edit_ratio(&sorted_tokens(a), &sorted_tokens(b))
    }

    /// Jaccard similarity of the token sets with company stopwords removed.
    ///
    /// Falls back to the unfiltered sets if filtering would empty either side.
    pub fn token_set_ratio(&self, a: &str, b: &str) -> Score {
        if let Some(score) = identical_score(a, b) {
            return score;
        }

        let set_a = token_set(a);
        let set_b = token_set(b);

        let filtered_a = self.without_stop_words(&set_a);
        let filtered_b = self.without_stop_words(&set_b);

        if filtered_a.is_empty() || filtered_b.is_empty() {
            jaccard_similarity(&set_a, &set_b)
        } else {
            jaccard_similarity(&filtered_a, &filtered_b)
        }
    }

    /// Weighted average of the four primitives.
    pub fn company_name_ratio(&self, a: &str, b: &str) -> Score {
        let weights = &self.config.weights;
        let weight_sum = weights.ratio
            + weights.partial_ratio
            + weights.token_sort_ratio
            + weights.token_set_ratio;

        if weight_sum <= 0.0 || !weight_sum.is_finite() {
            return 0.0;
        }

        let weighted = weights.ratio * self.ratio(a, b)
            + weights.partial_ratio * self.partial_ratio(a, b)
            + weights.token_sort_ratio * self.token_sort_ratio(a, b)
            + weights.token_set_ratio * self.token_set_ratio(a, b);

        (weighted / weight_sum).clamp(0.0, 1.0)
    }

    /// Company-name ratio plus a fixed bonus when the pair differs by a known
    /// abbreviation/expansion (e.g. "corp" vs "corporation"). Clamped to `1.0`.
    pub fn enhanced_company_ratio(&self, a: &str, b: &str) -> Score {
        let base = self.company_name_ratio(a, b);

        if self.has_abbreviation_pair(a, b) {
            (base + self.config.abbreviation_bonus.max(0.0)).clamp(0.0, 1.0)
        } else {
            base
        }
    }

    pub fn is_match(&self, a: &str, b: &str) -> bool {
        self.enhanced_company_ratio(a, b) >= self.config.match_threshold
    }

    /// Ranks `choices` against `query` by company-name ratio, best first. Ties keep the
    /// original choice order.
    pub fn extract_best<S: AsRef<str>>(
        &self,
        query: &str,
        choices: &[S],
        limit: usize,
    ) -> Vec<FuzzyMatch> {
        let mut matches: Vec<FuzzyMatch> = choices
            .iter()
            .enumerate()
            .map(|(index, choice)| FuzzyMatch {
                choice: choice.as_ref().to_string(),
                index,
                score: self.company_name_ratio(query, choice.as_ref()),
            })
            .collect();

        matches.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        matches.truncate(limit);

        matches
    }

    pub fn extract_one<S: AsRef<str>>(&self, query: &str, choices: &[S]) -> Option<FuzzyMatch> {
        self.extract_best(query, choices, 1).into_iter().next()
    }

    fn without_stop_words(&self, set: &HashSet<String>) -> HashSet<String> {
        set.iter()
            .filter(|token| !self.stop_words.contains(*token))
            .cloned()
            .collect()
    }

    fn has_abbreviation_pair(&self, a: &str, b: &str) -> bool {
        let set_a = token_set(a);
        let set_b = token_set(b);

        self.config.abbreviation_pairs.iter().any(|(abbr, full)| {
            (set_a.contains(abbr) && set_b.contains(full))
                || (set_a.contains(full) && set_b.contains(abbr))
        })
    }
}

fn identical_score(a: &str, b: &str) -> Option<Score> {
    if a == b {
        Some(if a.trim().is_empty() { 0.0 } else { 1.0 })
    } else {
        None
    }
}

fn edit_ratio(a: &str, b: &str) -> Score {
    let max_len = a.chars().count().max(b.chars().count());

    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let distance = strsim::levenshtein(a, b);

    (1.0 - distance as f64 / max_len as f64).clamp(0.0, 1.0)
}

fn sorted_tokens(text: &str) -> String {
    let processed = preprocess(text);
    let mut tokens: Vec<&str> = processed.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

fn token_set(text: &str) -> HashSet<String> {
    tokenize(text).into_iter().collect()
}
