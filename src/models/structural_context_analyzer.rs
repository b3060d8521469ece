use crate::config::{
    DEFAULT_SITE_PATTERN_CONFIDENCE, DEFAULT_STRUCTURAL_CACHE_CONFIG, DEFAULT_STRUCTURAL_WEIGHT,
};
use crate::constants::{
    FINANCIAL_LINK_MARKERS, FINANCIAL_SECTIONS, POSITION_WEIGHTS, SITE_MICRO_PATTERNS,
};
use crate::models::{CacheConfig, HintMetadata, StructuralHints, TtlCache};
use crate::types::Score;
use crate::utils::tokenize;
use log::debug;
use serde::{Deserialize, Serialize};

const TICKER_ATTRIBUTE_CONFIDENCE: Score = 0.95;
const COMPANY_ATTRIBUTE_CONFIDENCE: Score = 0.85;
const ORGANIZATION_ITEMTYPE_CONFIDENCE: Score = 0.8;
const TICKER_CLASS_CONFIDENCE: Score = 0.6;
const FINANCIAL_LINK_CONFIDENCE: Score = 0.7;
const FINANCIAL_SECTION_CONFIDENCE: Score = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClueType {
    TickerAttribute,
    CompanyAttribute,
    FinancialLink,
    SitePattern,
    FinancialSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextClue {
    pub clue_type: ClueType,
    pub value: String,
    pub confidence: Score,
}

/// What the analyzer derived from a hint descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuralContext {
    pub weight: Score,
    /// Recognized position tags, lowercased, in hint order.
    pub positions: Vec<String>,
    pub clues: Vec<ContextClue>,
    pub metadata: HintMetadata,
}

impl Default for StructuralContext {
    fn default() -> Self {
        Self {
            weight: DEFAULT_STRUCTURAL_WEIGHT,
            positions: Vec::new(),
            clues: Vec::new(),
            metadata: HintMetadata::default(),
        }
    }
}

impl StructuralContext {
    pub fn has_position(&self, position: &str) -> bool {
        self.positions.iter().any(|p| p == position)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuralConfig {
    pub position_weights: Vec<(String, Score)>,
    pub default_weight: Score,
    /// Per site id: (micro-pattern name, confidence).
    pub site_patterns: Vec<(String, Vec<(String, Score)>)>,
    pub default_site_pattern_confidence: Score,
    pub financial_link_markers: Vec<String>,
    pub financial_sections: Vec<String>,
    pub cache: CacheConfig,
}

impl Default for StructuralConfig {
    fn default() -> Self {
        Self {
            position_weights: POSITION_WEIGHTS
                .iter()
                .map(|(tag, weight)| (tag.to_string(), *weight))
                .collect(),
            default_weight: DEFAULT_STRUCTURAL_WEIGHT,
            site_patterns: SITE_MICRO_PATTERNS
                .iter()
                .map(|(site, patterns)| {
                    (
                        site.to_string(),
                        patterns
                            .iter()
                            .map(|(pattern, confidence)| (pattern.to_string(), *confidence))
                            .collect(),
                    )
                })
                .collect(),
            default_site_pattern_confidence: DEFAULT_SITE_PATTERN_CONFIDENCE,
            financial_link_markers: FINANCIAL_LINK_MARKERS
                .iter()
                .map(|marker| marker.to_string())
                .collect(),
            financial_sections: FINANCIAL_SECTIONS
                .iter()
                .map(|section| section.to_string())
                .collect(),
            cache: DEFAULT_STRUCTURAL_CACHE_CONFIG,
        }
    }
}

/// Turns a [`StructuralHints`] descriptor into a weight, typed clues and metadata.
///
/// Only the descriptor is inspected, never the text span itself. Results are cached per
/// `(element_id, site)` for a short TTL.
#[derive(Debug)]
pub struct StructuralContextAnalyzer {
    config: StructuralConfig,
    cache: TtlCache<(String, String), StructuralContext>,
}

impl Default for StructuralContextAnalyzer {
    fn default() -> Self {
        Self::new(StructuralConfig::default())
    }
}

impl StructuralContextAnalyzer {
    pub fn new(config: StructuralConfig) -> Self {
        let cache = TtlCache::new(config.cache);

        Self { config, cache }
    }

    pub fn config(&self) -> &StructuralConfig {
        &self.config
    }

    pub fn analyze(&self, site_id: &str, hints: &StructuralHints) -> StructuralContext {
        let Some(element_id) = hints.element_id.as_ref() else {
            return self.compute(site_id, hints);
        };

        let cache_key = (element_id.clone(), site_id.to_string());

        if let Some(cached) = self.cache.get(&cache_key) {
            debug!("Structural cache hit for `{}` on `{}`", element_id, site_id);
            return cached;
        }

        let context = self.compute(site_id, hints);
        self.cache.insert(cache_key, context.clone());

        context
    }

    /// Uncached analysis.
    pub fn compute(&self, site_id: &str, hints: &StructuralHints) -> StructuralContext {
        let (weight, positions) = self.position_weight(hints);

        let mut clues = self.attribute_clues(hints);

        if let Some(link_target) = hints.link_target.as_deref() {
            let link = link_target.to_lowercase();

            if self
                .config
                .financial_link_markers
                .iter()
                .any(|marker| link.contains(&marker.to_lowercase()))
            {
                clues.push(ContextClue {
                    clue_type: ClueType::FinancialLink,
                    value: link_target.to_string(),
                    confidence: FINANCIAL_LINK_CONFIDENCE,
                });
            }
        }

        clues.extend(self.site_pattern_clues(site_id, hints));

        let metadata = extract_metadata(hints);

        if let Some(section) = metadata.section.as_deref() {
            let section_tokens = tokenize(section);

            if self.config.financial_sections.iter().any(|financial| {
                let financial = financial.to_lowercase();
                section_tokens.iter().any(|token| *token == financial)
            }) {
                clues.push(ContextClue {
                    clue_type: ClueType::FinancialSection,
                    value: section.to_string(),
                    confidence: FINANCIAL_SECTION_CONFIDENCE,
                });
            }
        }

        StructuralContext {
            weight,
            positions,
            clues,
            metadata,
        }
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Max weight over the recognized position tags, or the default weight if none is known.
    fn position_weight(&self, hints: &StructuralHints) -> (Score, Vec<String>) {
        let mut weight: Option<Score> = None;
        let mut positions = Vec::new();

        for position in &hints.positions {
            let tag = position.trim().to_lowercase();

            if let Some((_, tag_weight)) = self
                .config
                .position_weights
                .iter()
                .find(|(known, _)| *known == tag)
            {
                weight = Some(weight.map_or(*tag_weight, |w| w.max(*tag_weight)));

                if !positions.contains(&tag) {
                    positions.push(tag);
                }
            }
        }

        (weight.unwrap_or(self.config.default_weight), positions)
    }

    fn attribute_clues(&self, hints: &StructuralHints) -> Vec<ContextClue> {
        let mut clues = Vec::new();

        for attribute in &hints.attributes {
            let value = attribute.value.trim();

            if value.is_empty() {
                continue;
            }

            let clue = match attribute.name.trim().to_lowercase().as_str() {
                "data-ticker" | "data-symbol" => {
                    Some((ClueType::TickerAttribute, TICKER_ATTRIBUTE_CONFIDENCE))
                }
                "data-company" | "data-org" | "data-entity" => {
                    Some((ClueType::CompanyAttribute, COMPANY_ATTRIBUTE_CONFIDENCE))
                }
                "itemtype"
                    if value.contains("Organization") || value.contains("Corporation") =>
                {
                    Some((ClueType::CompanyAttribute, ORGANIZATION_ITEMTYPE_CONFIDENCE))
                }
                "class" => {
                    let class = value.to_lowercase();

                    if ["ticker", "symbol", "quote"]
                        .iter()
                        .any(|marker| class.contains(marker))
                    {
                        Some((ClueType::TickerAttribute, TICKER_CLASS_CONFIDENCE))
                    } else {
                        None
                    }
                }
                _ => None,
            };

            if let Some((clue_type, confidence)) = clue {
                clues.push(ContextClue {
                    clue_type,
                    value: value.to_string(),
                    confidence,
                });
            }
        }

        clues
    }

    fn site_pattern_clues(&self, site_id: &str, hints: &StructuralHints) -> Vec<ContextClue> {
        let site_table = self
            .config
            .site_patterns
            .iter()
            .find(|(site, _)| site.eq_ignore_ascii_case(site_id))
            .map(|(_, patterns)| patterns.as_slice())
            .unwrap_or(&[]);

        hints
            .site_patterns
            .iter()
            .filter(|pattern| !pattern.trim().is_empty())
            .map(|pattern| {
                let confidence = site_table
                    .iter()
                    .find(|(known, _)| known.eq_ignore_ascii_case(pattern.trim()))
                    .map(|(_, confidence)| *confidence)
                    .unwrap_or(self.config.default_site_pattern_confidence);

                ContextClue {
                    clue_type: ClueType::SitePattern,
                    value: pattern.trim().to_string(),
                    confidence,
                }
            })
            .collect()
    }
}

/// Metadata from the descriptor, falling back to well-known attributes.
fn extract_metadata(hints: &StructuralHints) -> HintMetadata {
    let from_attributes = |names: &[&str]| {
        names
            .iter()
            .find_map(|name| hints.attribute(name))
            .map(|value| value.to_string())
    };

    HintMetadata {
        author: hints
            .metadata
            .author
            .clone()
            .or_else(|| from_attributes(&["data-author", "author"])),
        published: hints
            .metadata
            .published
            .clone()
            .or_else(|| from_attributes(&["datetime", "data-published"])),
        section: hints
            .metadata
            .section
            .clone()
            .or_else(|| from_attributes(&["data-section"])),
        industry: hints
            .metadata
            .industry
            .clone()
            .or_else(|| from_attributes(&["data-industry"])),
    }
}
