use crate::config::{
    DEFAULT_KNOWLEDGE_BASE_QUERY_CACHE_CONFIG, DEFAULT_MAX_RESULTS, DEFAULT_MAX_TEXT_LENGTH,
    DEFAULT_MIN_KNOWLEDGE_BASE_SCORE, DEFAULT_RESULT_CACHE_CONFIG,
};
use crate::models::knowledge_base::ticker_key;
use crate::models::{
    CacheConfig, CandidateEntity, Confidence, ConfidenceLevel, ConfidenceScorer,
    CoreferenceLinks, CoreferenceResolver, CrossReference, CrossReferenceKind, Diagnostic,
    EntityReference, ExtractionSignal, ExtractorConfig, FuzzyMatcher, FuzzyMatcherConfig,
    KnowledgeBase, KnowledgeBaseError, KnownOrganization, Mention, NearestAntecedentResolver,
    NormalizedForm, Normalizer, NormalizerConfig, PatternExtractor, ReferenceKind,
    ResolutionResult, ResolvedEntity, ResolverStats, ResolverStatsSnapshot, ScorerConfig,
    ScoringInput, SearchMatch, SearchOptions, StructuralConfig, StructuralContext,
    StructuralContextAnalyzer, StructuralHints, TtlCache,
};
use crate::types::{EntityType, Score};
use crate::utils::{hash_cache_key, sanitize_text, sort_results};
use crate::Error;
use log::{debug, error, info};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Instant;

/// Every tunable of the pipeline. Defaults come from `config.rs`.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    pub normalizer: NormalizerConfig,
    pub fuzzy_matcher: FuzzyMatcherConfig,
    pub extractor: ExtractorConfig,
    pub structural: StructuralConfig,
    pub scorer: ScorerConfig,
    /// Result cache.
    pub cache: CacheConfig,
    /// Query cache of the default knowledge base.
    pub knowledge_base_cache: CacheConfig,
    pub max_results: usize,
    pub max_text_length: usize,
    /// Minimum search score for a fuzzy knowledge-base match.
    pub min_knowledge_base_score: Score,
    /// Keep `reject`-level entities in results.
    pub retain_rejected: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            normalizer: NormalizerConfig::default(),
            fuzzy_matcher: FuzzyMatcherConfig::default(),
            extractor: ExtractorConfig::default(),
            structural: StructuralConfig::default(),
            scorer: ScorerConfig::default(),
            cache: DEFAULT_RESULT_CACHE_CONFIG,
            knowledge_base_cache: DEFAULT_KNOWLEDGE_BASE_QUERY_CACHE_CONFIG,
            max_results: DEFAULT_MAX_RESULTS,
            max_text_length: DEFAULT_MAX_TEXT_LENGTH,
            min_knowledge_base_score: DEFAULT_MIN_KNOWLEDGE_BASE_SCORE,
            retain_rejected: false,
        }
    }
}

/// Assembles an [`EntityResolver`] from explicit collaborators.
///
/// Anything not supplied falls back to its default: the embedded seed knowledge base and
/// [`NearestAntecedentResolver`].
#[derive(Debug, Default)]
pub struct EntityResolverBuilder {
    config: ResolverConfig,
    knowledge_base: Option<KnowledgeBase>,
    coreference_resolver: Option<Box<dyn CoreferenceResolver>>,
}

impl EntityResolverBuilder {
    pub fn config(mut self, config: ResolverConfig) -> Self {
        self.config = config;
        self
    }

    pub fn knowledge_base(mut self, knowledge_base: KnowledgeBase) -> Self {
        self.knowledge_base = Some(knowledge_base);
        self
    }

    pub fn coreference_resolver<C>(mut self, coreference_resolver: C) -> Self
    where
        C: CoreferenceResolver + 'static,
    {
        self.coreference_resolver = Some(Box::new(coreference_resolver));
        self
    }

    /// Fails only when the default knowledge base cannot load its seed data.
    pub fn build(self) -> Result<EntityResolver, Error> {
        let config = self.config;
        let normalizer = Normalizer::new(config.normalizer.clone());
        let fuzzy_matcher = FuzzyMatcher::new(config.fuzzy_matcher.clone());

        let knowledge_base = match self.knowledge_base {
            Some(knowledge_base) => knowledge_base,
            None => KnowledgeBase::seeded(
                normalizer.clone(),
                fuzzy_matcher.clone(),
                config.knowledge_base_cache,
            )?,
        };

        let extractor = PatternExtractor::new(config.extractor.clone());
        let structural_analyzer = StructuralContextAnalyzer::new(config.structural.clone());
        let scorer = ConfidenceScorer::new(config.scorer.clone(), fuzzy_matcher);
        let result_cache = TtlCache::new(config.cache);

        info!(
            "Entity resolver ready: {} organizations, {} pattern rules",
            knowledge_base.len(),
            extractor.rule_names().len()
        );

        Ok(EntityResolver {
            config,
            normalizer,
            extractor,
            structural_analyzer,
            scorer,
            coreference_resolver: self
                .coreference_resolver
                .unwrap_or_else(|| Box::new(NearestAntecedentResolver)),
            knowledge_base: RwLock::new(knowledge_base),
            result_cache,
            stats: ResolverStats::new(),
        })
    }
}

/// A candidate that survived normalization and knowledge-base lookup.
struct CandidateResolution<'c> {
    candidate: &'c CandidateEntity,
    form: NormalizedForm,
    known_organization: Option<KnownOrganization>,
    cross_reference: CrossReference,
    /// Normalized name (or ticker) of the known organization that matched.
    reference: Option<String>,
}

/// Runs the entity resolution pipeline over short text spans.
///
/// `resolve` takes `&self`; the resolver is `Send + Sync` and can be shared across threads.
/// The result cache, the knowledge base and the statistics are each guarded independently.
#[derive(Debug)]
pub struct EntityResolver {
    config: ResolverConfig,
    normalizer: Normalizer,
    extractor: PatternExtractor,
    structural_analyzer: StructuralContextAnalyzer,
    scorer: ConfidenceScorer,
    coreference_resolver: Box<dyn CoreferenceResolver>,
    knowledge_base: RwLock<KnowledgeBase>,
    result_cache: TtlCache<String, ResolutionResult>,
    stats: ResolverStats,
}

impl EntityResolver {
    pub fn builder() -> EntityResolverBuilder {
        EntityResolverBuilder::default()
    }

    /// A resolver with default configuration and the seeded knowledge base.
    pub fn new() -> Result<Self, Error> {
        Self::builder().build()
    }

    pub fn with_config(config: ResolverConfig) -> Result<Self, Error> {
        Self::builder().config(config).build()
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolves the organization entities in `text`.
    ///
    /// Never fails: timeouts, malformed input and per-candidate failures degrade the result
    /// and are reported through [`ResolutionResult::diagnostics`]. A panic inside the
    /// pipeline yields an empty result with [`Diagnostic::PipelineFailure`].
    pub fn resolve(&self, text: &str, site_id: &str, hints: &StructuralHints) -> ResolutionResult {
        let started_at = Instant::now();

        let result = match panic::catch_unwind(AssertUnwindSafe(|| {
            self.resolve_uncaught(text, site_id, hints)
        })) {
            Ok(result) => result,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!("Entity resolution pipeline failed: {}", message);
                self.stats.record_pipeline_failure();

                ResolutionResult {
                    entities: Vec::new(),
                    diagnostics: vec![Diagnostic::PipelineFailure { message }],
                    timed_out: false,
                }
            }
        };

        self.stats.record_call(started_at.elapsed(), result.entities.len());

        result
    }

    fn resolve_uncaught(
        &self,
        text: &str,
        site_id: &str,
        hints: &StructuralHints,
    ) -> ResolutionResult {
        let (sanitized, truncated) = sanitize_text(text, self.config.max_text_length);

        let hints_key = serde_json::to_string(hints).unwrap_or_default();
        let cache_key = hash_cache_key(&[site_id, &sanitized, &hints_key]);

        if let Some(cached) = self.result_cache.get(&cache_key) {
            debug!("Result cache hit for site `{}`", site_id);
            self.stats.record_cache_hit();
            return cached;
        }

        let mut diagnostics = Vec::new();

        if truncated {
            diagnostics.push(Diagnostic::InputTruncated {
                max_chars: self.config.max_text_length,
            });
        }

        let outcome = self.extractor.extract(&sanitized);

        for failure in &outcome.failed_rules {
            diagnostics.push(Diagnostic::PatternRuleFailed {
                rule: failure.rule.clone(),
                message: failure.message.clone(),
            });
        }

        if outcome.timed_out {
            self.stats.record_timeout();
            diagnostics.push(Diagnostic::ExtractionTimedOut {
                candidates_collected: outcome.candidates.len(),
            });
        }

        info!(
            "Extracted {} candidates in {:?} (site `{}`)",
            outcome.candidates.len(),
            outcome.elapsed,
            site_id
        );

        let resolutions = self.cross_reference_candidates(&outcome.candidates, &mut diagnostics);

        let mentions: Vec<Mention> = resolutions
            .iter()
            .map(|resolution| Mention {
                text: resolution.candidate.text.clone(),
                normalized: resolution.form.base_name.clone(),
                entity_type: resolution.candidate.entity_type,
                offset: resolution.candidate.offset,
                end: resolution.candidate.end,
                organization_id: resolution
                    .known_organization
                    .as_ref()
                    .map(|organization| organization.id.clone()),
            })
            .collect();

        let links = self.coreference_resolver.resolve(&sanitized, &mentions);
        let roots = root_indexes(&links, mentions.len());

        let structural = self.structural_analyzer.analyze(site_id, hints);
        let aggregate_confidence = outcome.aggregate_confidence();

        let mut entities = Vec::new();

        for (index, resolution) in resolutions.iter().enumerate() {
            if roots[index] != index {
                continue;
            }

            let mut variations: Vec<EntityReference> = resolutions
                .iter()
                .enumerate()
                .filter(|(other, _)| *other != index && roots[*other] == index)
                .map(|(_, other)| EntityReference {
                    text: other.candidate.text.clone(),
                    offset: other.candidate.offset,
                    kind: ReferenceKind::Mention,
                })
                .collect();

            let corroborating_matches = variations.len();

            variations.extend(
                links
                    .anaphors
                    .iter()
                    .filter(|anaphor| roots.get(anaphor.antecedent) == Some(&index))
                    .map(|anaphor| EntityReference {
                        text: anaphor.text.clone(),
                        offset: anaphor.offset,
                        kind: ReferenceKind::Anaphor,
                    }),
            );
            variations.sort_by_key(|variation| variation.offset);

            let confidence = self.score_resolution(
                resolution,
                &structural,
                ExtractionSignal {
                    aggregate_confidence,
                    corroborating_matches,
                },
                &mut diagnostics,
            );

            entities.push(ResolvedEntity {
                text: resolution.candidate.text.clone(),
                normalized: resolution.form.base_name.clone(),
                entity_type: resolution.candidate.entity_type,
                offset: resolution.candidate.offset,
                confidence,
                known_organization: resolution.known_organization.clone(),
                variations,
                context_metadata: if structural.metadata.is_empty() {
                    None
                } else {
                    Some(structural.metadata.clone())
                },
                legal_suffixes: resolution.form.legal_suffixes.clone(),
                company_types: resolution.form.company_types.clone(),
                jurisdictions: resolution.form.jurisdictions.clone(),
            });
        }

        let mut entities = sort_results(entities);

        if !self.config.retain_rejected {
            entities.retain(|entity| entity.confidence.level != ConfidenceLevel::Reject);
        }
        entities.truncate(self.config.max_results);

        let result = ResolutionResult {
            entities,
            diagnostics,
            timed_out: outcome.timed_out,
        };

        // A timed-out result is partial; let the next call try again.
        if !result.timed_out {
            self.result_cache.insert(cache_key, result.clone());
        }

        result
    }

    /// Normalizes each candidate and looks it up in the knowledge base. Candidates that
    /// normalize to nothing are dropped with a diagnostic.
    fn cross_reference_candidates<'c>(
        &self,
        candidates: &'c [CandidateEntity],
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Vec<CandidateResolution<'c>> {
        let knowledge_base = self.read_knowledge_base();

        let mut resolutions = Vec::with_capacity(candidates.len());

        for candidate in candidates {
            let form = if candidate.entity_type.is_ticker() {
                NormalizedForm {
                    base_name: ticker_key(&candidate.text),
                    ..NormalizedForm::default()
                }
            } else {
                self.normalizer.analyze(&candidate.text)
            };

            if form.base_name.is_empty() {
                debug!("Dropping `{}`: empty normalization", candidate.text);
                diagnostics.push(Diagnostic::CandidateDropped {
                    text: candidate.text.clone(),
                    reason: "normalized to an empty name".to_string(),
                });
                continue;
            }

            let (known_organization, cross_reference, reference) =
                self.lookup(&knowledge_base, candidate.entity_type, &form.base_name);

            debug!(
                "Candidate `{}` -> `{}` ({:?})",
                candidate.text, form.base_name, cross_reference.kind
            );

            resolutions.push(CandidateResolution {
                candidate,
                form,
                known_organization,
                cross_reference,
                reference,
            });
        }

        resolutions
    }

    fn lookup(
        &self,
        knowledge_base: &KnowledgeBase,
        entity_type: EntityType,
        normalized: &str,
    ) -> (Option<KnownOrganization>, CrossReference, Option<String>) {
        if entity_type.is_ticker() {
            return match knowledge_base.find_by_ticker(normalized) {
                Some(organization) => (
                    Some(organization.clone()),
                    exact_cross_reference(organization),
                    organization.ticker.as_deref().map(ticker_key),
                ),
                None => (None, CrossReference::none(), None),
            };
        }

        if let Some(organization) = knowledge_base.find_exact(normalized) {
            return (
                Some(organization.clone()),
                exact_cross_reference(organization),
                Some(normalized.to_string()),
            );
        }

        let options = SearchOptions {
            limit: 1,
            threshold: self.config.min_knowledge_base_score,
            include_aliases: true,
            include_tickers: false,
        };

        match knowledge_base.search(normalized, &options).into_iter().next() {
            Some(search_match) => {
                let reference = self.normalizer.normalize(&search_match.matched_value);

                (
                    Some(search_match.organization.clone()),
                    CrossReference {
                        kind: CrossReferenceKind::Fuzzy,
                        score: search_match.score,
                        industry: search_match.organization.industry.clone(),
                    },
                    Some(reference),
                )
            }
            None => (None, CrossReference::none(), None),
        }
    }

    fn score_resolution(
        &self,
        resolution: &CandidateResolution,
        structural: &StructuralContext,
        extraction: ExtractionSignal,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Confidence {
        let input = ScoringInput {
            entity_type: resolution.candidate.entity_type,
            base_confidence: resolution.candidate.base_confidence,
            matched_text: &resolution.candidate.matched_text,
            resolved_text: &resolution.form.base_name,
            reference_text: resolution.reference.as_deref(),
            structural,
            extraction,
            cross_reference: resolution.cross_reference.clone(),
            document_industry: structural.metadata.industry.as_deref(),
        };

        match self.scorer.try_score(&input) {
            Ok(confidence) => confidence,
            Err(e) => {
                error!("Scoring failed for `{}`: {}", resolution.candidate.text, e);
                diagnostics.push(Diagnostic::ScoringFailed {
                    text: resolution.candidate.text.clone(),
                    message: e.to_string(),
                });
                Confidence::failed(&e)
            }
        }
    }

    pub fn add_organization(&self, record: KnownOrganization) -> Result<(), KnowledgeBaseError> {
        self.write_knowledge_base().add_organization(record)
    }

    pub fn update_organization(
        &self,
        record: KnownOrganization,
    ) -> Result<(), KnowledgeBaseError> {
        self.write_knowledge_base().update_organization(record)
    }

    pub fn remove_organization(&self, id: &str) -> Option<KnownOrganization> {
        self.write_knowledge_base().remove_organization(id)
    }

    pub fn search_organizations(&self, query: &str, options: &SearchOptions) -> Vec<SearchMatch> {
        self.read_knowledge_base().search(query, options)
    }

    pub fn export_state(&self) -> Result<String, KnowledgeBaseError> {
        self.read_knowledge_base().export_state()
    }

    /// Replaces the knowledge base contents. On failure nothing changes.
    pub fn import_state(&self, payload: &str) -> Result<usize, KnowledgeBaseError> {
        self.write_knowledge_base().import_state(payload)
    }

    /// Read access to the knowledge base. Holding the guard blocks administrative writes.
    pub fn knowledge_base(&self) -> RwLockReadGuard<'_, KnowledgeBase> {
        self.read_knowledge_base()
    }

    pub fn stats(&self) -> ResolverStatsSnapshot {
        self.stats.snapshot()
    }

    /// Drops every cached result and structural analysis.
    pub fn clear_cache(&self) {
        self.result_cache.clear();
        self.structural_analyzer.clear_cache();
    }

    fn read_knowledge_base(&self) -> RwLockReadGuard<'_, KnowledgeBase> {
        self.knowledge_base
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_knowledge_base(&self) -> RwLockWriteGuard<'_, KnowledgeBase> {
        self.knowledge_base
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn exact_cross_reference(organization: &KnownOrganization) -> CrossReference {
    CrossReference {
        kind: CrossReferenceKind::Exact,
        score: 1.0,
        industry: organization.industry.clone(),
    }
}

/// Root mention index for every mention. Links from a custom resolver that point forward or
/// out of range are treated as new entities.
fn root_indexes(links: &CoreferenceLinks, mention_count: usize) -> Vec<usize> {
    let mut roots: Vec<usize> = Vec::with_capacity(mention_count);

    for index in 0..mention_count {
        let root = match links.antecedents.get(index).copied().flatten() {
            Some(antecedent) if antecedent < index => roots[antecedent],
            _ => index,
        };
        roots.push(root);
    }

    roots
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
