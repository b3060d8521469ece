use company_sniffer::models::{
    CacheConfig, ConfidenceThresholds, ConfidenceWeights, CoreferenceLinks, CoreferenceResolver,
    ExtractorConfig, Mention, PatternRuleSpec, ReferenceKind, ScorerConfig,
};
use company_sniffer::{
    resolve_entities_from_text, ConfidenceLevel, Diagnostic, EntityResolver, EntityType,
    KnownOrganization, ResolverConfig, StructuralHints, DEFAULT_SITE_ID,
};
use std::time::Duration;

#[cfg(test)]
mod tests {
    use super::*;

    const BLACKROCK: &str = "BlackRock Inc. manages $9 trillion in client assets.";
    const ACME: &str = "Acme Widgets Corp. announced a recall.";

    fn resolver() -> EntityResolver {
        EntityResolver::new().expect("Failed to build resolver")
    }

    fn no_hints() -> StructuralHints {
        StructuralHints::default()
    }

    #[derive(Debug)]
    struct NoCoreference;

    impl CoreferenceResolver for NoCoreference {
        fn resolve(&self, _text: &str, mentions: &[Mention]) -> CoreferenceLinks {
            CoreferenceLinks {
                antecedents: vec![None; mentions.len()],
                anaphors: Vec::new(),
            }
        }
    }

    #[derive(Debug)]
    struct PanickingCoreference;

    impl CoreferenceResolver for PanickingCoreference {
        fn resolve(&self, _text: &str, _mentions: &[Mention]) -> CoreferenceLinks {
            panic!("coreference exploded");
        }
    }

    #[test]
    fn test_pipeline_panic_yields_empty_result_with_diagnostic() {
        let resolver = EntityResolver::builder()
            .coreference_resolver(PanickingCoreference)
            .build()
            .unwrap();

        let result = resolver.resolve(BLACKROCK, DEFAULT_SITE_ID, &no_hints());

        assert!(result.entities.is_empty());
        assert!(!result.timed_out);
        assert_eq!(
            result.diagnostics,
            vec![Diagnostic::PipelineFailure {
                message: "coreference exploded".to_string()
            }]
        );
        assert_eq!(resolver.stats().pipeline_failures, 1);
    }

    #[test]
    fn test_scoring_failure_keeps_entity_at_error_level() {
        let config = ResolverConfig {
            scorer: ScorerConfig {
                weights: ConfidenceWeights {
                    pattern: 0.0,
                    structural: 0.0,
                    extraction: 0.0,
                    cross_reference: 0.0,
                    consistency: 0.0,
                },
                ..ScorerConfig::default()
            },
            ..ResolverConfig::default()
        };
        let resolver = EntityResolver::with_config(config).unwrap();

        let result = resolver.resolve(BLACKROCK, DEFAULT_SITE_ID, &no_hints());

        assert_eq!(result.entities.len(), 1);
        assert_eq!(result.entities[0].normalized, "BlackRock");
        assert_eq!(result.entities[0].confidence.score, 0.0);
        assert_eq!(result.entities[0].confidence.level, ConfidenceLevel::Error);
        assert!(result
            .diagnostics
            .iter()
            .any(|diagnostic| matches!(diagnostic, Diagnostic::ScoringFailed { text, .. } if text == "BlackRock Inc.")));
    }

    #[test]
    fn test_resolver_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<EntityResolver>();
    }

    #[test]
    fn test_formal_name_resolves_with_high_confidence() {
        let result = resolver().resolve(BLACKROCK, DEFAULT_SITE_ID, &no_hints());

        assert_eq!(result.entities.len(), 1);

        let entity = &result.entities[0];
        assert_eq!(entity.text, "BlackRock Inc.");
        assert_eq!(entity.normalized, "BlackRock");
        assert_eq!(entity.entity_type, EntityType::Company);
        assert_eq!(entity.offset, 0);
        assert_eq!(entity.confidence.level, ConfidenceLevel::High);
        assert!((entity.confidence.score - 0.91125).abs() < 1e-9);
        assert_eq!(entity.known_organization.as_ref().unwrap().id, "blackrock");
        assert_eq!(entity.legal_suffixes, vec!["Inc"]);
        assert!(entity.jurisdictions.contains(&"US".to_string()));
        assert!(result.diagnostics.is_empty());
        assert!(!result.timed_out);
    }

    #[test]
    fn test_cashtag_resolves_to_ticker() {
        let result = resolver().resolve("$AAPL rose 3% today.", DEFAULT_SITE_ID, &no_hints());

        assert_eq!(result.entities.len(), 1);

        let entity = &result.entities[0];
        assert_eq!(entity.normalized, "AAPL");
        assert_eq!(entity.entity_type, EntityType::Ticker);
        assert_eq!(entity.known_organization.as_ref().unwrap().id, "apple");
        assert!(entity.confidence.score > 0.9);
    }

    #[test]
    fn test_bare_ambiguous_word_yields_nothing() {
        let result = resolver().resolve("Apple", DEFAULT_SITE_ID, &no_hints());

        assert!(result.is_empty());
    }

    #[test]
    fn test_empty_and_whitespace_text() {
        let resolver = resolver();

        assert!(resolver.resolve("", DEFAULT_SITE_ID, &no_hints()).is_empty());
        assert!(resolver.resolve(" \n\t ", DEFAULT_SITE_ID, &no_hints()).is_empty());
    }

    #[test]
    fn test_anaphors_are_merged_into_variations() {
        let text = "Tesla Inc. reported record deliveries, and the company raised its outlook.";
        let result = resolver().resolve(text, DEFAULT_SITE_ID, &no_hints());

        assert_eq!(result.entities.len(), 1);

        let entity = &result.entities[0];
        assert_eq!(entity.normalized, "Tesla");

        let anaphors: Vec<&str> = entity
            .variations
            .iter()
            .filter(|variation| variation.kind == ReferenceKind::Anaphor)
            .map(|variation| variation.text.as_str())
            .collect();
        assert_eq!(anaphors, vec!["the company", "its"]);
    }

    #[test]
    fn test_custom_coreference_resolver_is_used() {
        let resolver = EntityResolver::builder()
            .coreference_resolver(NoCoreference)
            .build()
            .unwrap();

        let text = "Tesla Inc. reported record deliveries, and the company raised its outlook.";
        let result = resolver.resolve(text, DEFAULT_SITE_ID, &no_hints());

        assert_eq!(result.entities.len(), 1);
        assert!(result.entities[0].variations.is_empty());
    }

    #[test]
    fn test_ticker_and_name_stay_separate_entities() {
        let text = "$TSLA jumped after Tesla Inc. reported deliveries.";
        let result = resolver().resolve(text, DEFAULT_SITE_ID, &no_hints());

        let types: Vec<EntityType> = result
            .entities
            .iter()
            .map(|entity| entity.entity_type)
            .collect();

        assert_eq!(result.entities.len(), 2);
        assert!(types.contains(&EntityType::Ticker));
        assert!(types.contains(&EntityType::Company));
        assert!(result
            .entities
            .iter()
            .all(|entity| entity.known_organization.as_ref().unwrap().id == "tesla"));
    }

    #[test]
    fn test_unknown_company_is_kept_without_record() {
        let result = resolver().resolve(ACME, DEFAULT_SITE_ID, &no_hints());

        assert_eq!(result.entities.len(), 1);

        let entity = &result.entities[0];
        assert_eq!(entity.normalized, "Acme Widgets");
        assert!(entity.known_organization.is_none());
        assert_eq!(entity.confidence.level, ConfidenceLevel::Medium);
        assert!(entity.confidence.recommendation.is_some());
    }

    #[test]
    fn test_results_are_sorted_by_score() {
        let text = "IBM shares rose while BlackRock Inc. and Acme Widgets Corp. fell.";
        let result = resolver().resolve(text, DEFAULT_SITE_ID, &no_hints());

        assert_eq!(result.entities.len(), 3);

        for pair in result.entities.windows(2) {
            assert!(pair[0].confidence.score >= pair[1].confidence.score);
        }
        assert_eq!(result.entities[0].normalized, "BlackRock");
    }

    #[test]
    fn test_max_results_truncates() {
        let resolver = EntityResolver::with_config(ResolverConfig {
            max_results: 1,
            ..ResolverConfig::default()
        })
        .unwrap();

        let text = "JPMorgan Chase & Co. and The Goldman Sachs Group Inc. both reported earnings.";
        let result = resolver.resolve(text, DEFAULT_SITE_ID, &no_hints());

        assert_eq!(result.entities.len(), 1);
    }

    #[test]
    fn test_rejected_entities_are_dropped_unless_retained() {
        let unreachable = ScorerConfig {
            thresholds: ConfidenceThresholds {
                high: 2.0,
                medium: 2.0,
                low: 2.0,
            },
            ..ScorerConfig::default()
        };

        let dropping = EntityResolver::with_config(ResolverConfig {
            scorer: unreachable.clone(),
            ..ResolverConfig::default()
        })
        .unwrap();
        assert!(dropping.resolve(BLACKROCK, DEFAULT_SITE_ID, &no_hints()).is_empty());

        let retaining = EntityResolver::with_config(ResolverConfig {
            scorer: unreachable,
            retain_rejected: true,
            ..ResolverConfig::default()
        })
        .unwrap();
        let result = retaining.resolve(BLACKROCK, DEFAULT_SITE_ID, &no_hints());

        assert_eq!(result.entities.len(), 1);
        assert_eq!(result.entities[0].confidence.level, ConfidenceLevel::Reject);
    }

    #[test]
    fn test_structural_hints_raise_confidence() {
        let resolver = resolver();

        let plain = resolver.resolve(BLACKROCK, DEFAULT_SITE_ID, &no_hints());
        let headline = resolver.resolve(
            BLACKROCK,
            DEFAULT_SITE_ID,
            &StructuralHints::new()
                .with_position("headline")
                .with_section("Markets"),
        );

        assert!(headline.entities[0].confidence.score > plain.entities[0].confidence.score);
        assert_eq!(
            headline.entities[0]
                .context_metadata
                .as_ref()
                .and_then(|metadata| metadata.section.as_deref()),
            Some("Markets")
        );
        assert!(plain.entities[0].context_metadata.is_none());
    }

    #[test]
    fn test_cached_result_is_identical() {
        let resolver = resolver();

        let first = resolver.resolve(BLACKROCK, DEFAULT_SITE_ID, &no_hints());
        let second = resolver.resolve(BLACKROCK, DEFAULT_SITE_ID, &no_hints());

        assert_eq!(first, second);

        let stats = resolver.stats();
        assert_eq!(stats.calls, 2);
        assert_eq!(stats.cache_hits, 1);
        assert_eq!(stats.entities_returned, 2);
    }

    #[test]
    fn test_cache_key_includes_site_and_hints() {
        let resolver = resolver();

        resolver.resolve(BLACKROCK, DEFAULT_SITE_ID, &no_hints());
        resolver.resolve(BLACKROCK, "reuters", &no_hints());
        resolver.resolve(
            BLACKROCK,
            DEFAULT_SITE_ID,
            &StructuralHints::new().with_position("footer"),
        );

        assert_eq!(resolver.stats().cache_hits, 0);
    }

    #[test]
    fn test_cached_results_survive_until_cleared() {
        let resolver = resolver();

        let before = resolver.resolve(ACME, DEFAULT_SITE_ID, &no_hints());
        assert!(before.entities[0].known_organization.is_none());

        resolver
            .add_organization(KnownOrganization::new("acme", "Acme Widgets Corp."))
            .unwrap();

        // Within the TTL the cached result is served
        let cached = resolver.resolve(ACME, DEFAULT_SITE_ID, &no_hints());
        assert_eq!(cached, before);

        resolver.clear_cache();

        let fresh = resolver.resolve(ACME, DEFAULT_SITE_ID, &no_hints());
        assert_eq!(
            fresh.entities[0].known_organization.as_ref().unwrap().id,
            "acme"
        );
    }

    #[test]
    fn test_expired_cache_reflects_knowledge_base_changes() {
        let resolver = EntityResolver::with_config(ResolverConfig {
            cache: CacheConfig {
                capacity: 16,
                ttl: Duration::ZERO,
            },
            ..ResolverConfig::default()
        })
        .unwrap();

        let before = resolver.resolve(ACME, DEFAULT_SITE_ID, &no_hints());
        assert!(before.entities[0].known_organization.is_none());

        resolver
            .add_organization(
                KnownOrganization::new("acme", "Acme Widgets Corp.").with_industry("Industrials"),
            )
            .unwrap();

        let after = resolver.resolve(ACME, DEFAULT_SITE_ID, &no_hints());
        let entity = &after.entities[0];

        assert_eq!(entity.known_organization.as_ref().unwrap().id, "acme");
        assert!(entity.confidence.score > before.entities[0].confidence.score);
        assert_eq!(resolver.stats().cache_hits, 0);
    }

    #[test]
    fn test_truncated_input_is_reported() {
        let resolver = EntityResolver::with_config(ResolverConfig {
            max_text_length: 16,
            ..ResolverConfig::default()
        })
        .unwrap();

        let result = resolver.resolve(BLACKROCK, DEFAULT_SITE_ID, &no_hints());

        assert!(result
            .diagnostics
            .contains(&Diagnostic::InputTruncated { max_chars: 16 }));
        assert_eq!(result.entities[0].normalized, "BlackRock");
    }

    #[test]
    fn test_markup_is_stripped_before_extraction() {
        let result = resolver().resolve(
            "<p><b>BlackRock Inc.</b> manages &amp; grows assets.</p>",
            DEFAULT_SITE_ID,
            &no_hints(),
        );

        assert_eq!(result.entities.len(), 1);
        assert_eq!(result.entities[0].text, "BlackRock Inc.");
    }

    #[test]
    fn test_extraction_timeout_is_reported_and_not_cached() {
        let resolver = EntityResolver::with_config(ResolverConfig {
            extractor: ExtractorConfig {
                deadline: Duration::ZERO,
                ..ExtractorConfig::default()
            },
            ..ResolverConfig::default()
        })
        .unwrap();

        let first = resolver.resolve(BLACKROCK, DEFAULT_SITE_ID, &no_hints());
        let second = resolver.resolve(BLACKROCK, DEFAULT_SITE_ID, &no_hints());

        assert!(first.timed_out);
        assert!(first.diagnostics.iter().any(|diagnostic| matches!(
            diagnostic,
            Diagnostic::ExtractionTimedOut { .. }
        )));
        assert!(second.timed_out);

        let stats = resolver.stats();
        assert_eq!(stats.timeouts, 2);
        assert_eq!(stats.cache_hits, 0);
    }

    #[test]
    fn test_failed_pattern_rule_is_reported() {
        let mut extractor = ExtractorConfig::default();
        extractor.rules.push(PatternRuleSpec::new(
            "broken",
            &["[unclosed"],
            EntityType::Company,
            0.9,
        ));

        let resolver = EntityResolver::with_config(ResolverConfig {
            extractor,
            ..ResolverConfig::default()
        })
        .unwrap();

        let result = resolver.resolve(BLACKROCK, DEFAULT_SITE_ID, &no_hints());

        assert_eq!(result.entities.len(), 1);
        assert!(result.diagnostics.iter().any(|diagnostic| matches!(
            diagnostic,
            Diagnostic::PatternRuleFailed { rule, .. } if rule == "broken"
        )));
    }

    #[test]
    fn test_knowledge_base_admin_round_trip() {
        let resolver = resolver();
        let snapshot = resolver.export_state().unwrap();

        assert!(resolver.import_state("{ corrupted").is_err());
        assert_eq!(resolver.export_state().unwrap(), snapshot);

        let removed = resolver.remove_organization("blackrock").unwrap();
        assert_eq!(removed.ticker.as_deref(), Some("BLK"));
        assert!(resolver.knowledge_base().get("blackrock").is_none());

        let count = resolver.import_state(&snapshot).unwrap();
        assert_eq!(count, resolver.knowledge_base().len());
        assert!(resolver.knowledge_base().get("blackrock").is_some());

        let matches = resolver.search_organizations("BlackRock", &Default::default());
        assert_eq!(matches[0].organization.id, "blackrock");
    }

    #[test]
    fn test_concurrent_resolution() {
        let resolver = resolver();
        let texts = [
            BLACKROCK,
            "$AAPL rose 3% today.",
            ACME,
            "IBM shares rose after the earnings call.",
        ];

        let expected: Vec<_> = texts
            .iter()
            .map(|text| resolver.resolve(text, DEFAULT_SITE_ID, &no_hints()))
            .collect();

        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    for (text, expected) in texts.iter().zip(&expected) {
                        let result = resolver.resolve(text, DEFAULT_SITE_ID, &no_hints());
                        assert_eq!(&result, expected);
                    }
                });
            }
        });

        assert_eq!(resolver.stats().calls, 20);
    }

    #[test]
    fn test_resolve_entities_from_text() {
        let entities = resolve_entities_from_text(BLACKROCK).unwrap();

        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].normalized, "BlackRock");
    }
}
