use company_sniffer::models::{MatchedField, OrganizationListPreprocessor};
use company_sniffer::{KnowledgeBase, KnowledgeBaseError, KnownOrganization, SearchOptions};

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> KnowledgeBase {
        KnowledgeBase::with_seed_data().expect("Failed to load seed data")
    }

    #[test]
    fn test_seed_data_loads() {
        let knowledge_base = seeded();

        assert!(knowledge_base.len() >= 40);

        let apple = knowledge_base.get("apple").unwrap();
        assert_eq!(apple.canonical_name, "Apple Inc.");
        assert_eq!(apple.ticker.as_deref(), Some("AAPL"));
        assert_eq!(apple.prior_names, vec!["Apple Computer"]);
    }

    #[test]
    fn test_search_finds_canonical_name() {
        let knowledge_base = seeded();

        let matches = knowledge_base.search("Apple", &SearchOptions::default());

        assert!(!matches.is_empty());
        assert_eq!(matches[0].organization.id, "apple");
        assert!(matches[0].score >= 0.9);
        assert_eq!(matches[0].matched_field, MatchedField::Name);
    }

    #[test]
    fn test_search_by_alias_and_ticker() {
        let knowledge_base = seeded();

        let matches = knowledge_base.search("Google", &SearchOptions::default());
        assert_eq!(matches[0].organization.id, "alphabet");
        assert_eq!(matches[0].matched_field, MatchedField::Alias);

        let matches = knowledge_base.search("$TSLA", &SearchOptions::default());
        assert_eq!(matches[0].organization.id, "tesla");
        assert_eq!(matches[0].matched_field, MatchedField::Ticker);
    }

    #[test]
    fn test_search_respects_limit_and_threshold() {
        let knowledge_base = seeded();

        let options = SearchOptions {
            limit: 1,
            threshold: 0.0,
            ..SearchOptions::default()
        };
        assert_eq!(knowledge_base.search("Morgan", &options).len(), 1);

        let strict = SearchOptions {
            threshold: 0.99,
            ..SearchOptions::default()
        };
        assert!(knowledge_base.search("Zyxwvut Widgets", &strict).is_empty());
        assert!(knowledge_base.search("", &SearchOptions::default()).is_empty());
    }

    #[test]
    fn test_search_results_are_sorted() {
        let knowledge_base = seeded();
        let options = SearchOptions {
            threshold: 0.0,
            limit: 20,
            ..SearchOptions::default()
        };

        let matches = knowledge_base.search("General", &options);

        for pair in matches.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn test_exact_lookups() {
        let knowledge_base = seeded();

        assert_eq!(knowledge_base.find_by_name("Tesla").unwrap().id, "tesla");
        assert_eq!(knowledge_base.find_by_name("tesla, inc.").unwrap().id, "tesla");
        assert_eq!(knowledge_base.find_by_alias("Big Blue").unwrap().id, "ibm");
        assert_eq!(knowledge_base.find_by_ticker("$brk.b").unwrap().id, "berkshire_hathaway");
        assert_eq!(knowledge_base.find_exact("Disney").unwrap().id, "walt_disney");
        assert_eq!(knowledge_base.find_exact("Facebook").unwrap().id, "meta");
        assert!(knowledge_base.find_by_ticker("ZZZZ").is_none());
    }

    #[test]
    fn test_add_update_remove() {
        let mut knowledge_base = seeded();

        let record = KnownOrganization::new("acme", "Acme Widgets Corp.")
            .with_ticker("ACMW")
            .with_alias("Acme")
            .with_industry("Industrials");

        knowledge_base.add_organization(record.clone()).unwrap();
        assert_eq!(knowledge_base.find_by_ticker("ACMW").unwrap().id, "acme");

        let duplicate = knowledge_base.add_organization(record.clone());
        assert!(matches!(duplicate, Err(KnowledgeBaseError::DuplicateId(id)) if id == "acme"));

        let renamed = KnownOrganization::new("acme", "Acme Gadgets Corp.").with_ticker("ACMG");
        knowledge_base.update_organization(renamed).unwrap();

        assert!(knowledge_base.find_by_ticker("ACMW").is_none());
        assert!(knowledge_base.find_by_alias("Acme").is_none());
        assert_eq!(knowledge_base.find_by_name("Acme Gadgets").unwrap().id, "acme");

        let removed = knowledge_base.remove_organization("acme").unwrap();
        assert_eq!(removed.canonical_name, "Acme Gadgets Corp.");
        assert!(knowledge_base.get("acme").is_none());
        assert!(knowledge_base.remove_organization("acme").is_none());
    }

    #[test]
    fn test_shared_keys_survive_removal_of_other_owner() {
        let mut knowledge_base = KnowledgeBase::default();

        knowledge_base
            .add_organization(KnownOrganization::new("a", "Acme").with_ticker("ACM"))
            .unwrap();
        knowledge_base
            .add_organization(KnownOrganization::new("b", "Acme Inc.").with_ticker("ACM"))
            .unwrap();

        assert_eq!(knowledge_base.find_by_name("Acme").unwrap().id, "b");

        knowledge_base
            .update_organization(KnownOrganization::new("b", "Bolt Corp"))
            .unwrap();

        assert_eq!(knowledge_base.find_by_name("Acme").unwrap().id, "a");
        assert_eq!(knowledge_base.find_by_ticker("ACM").unwrap().id, "a");
        assert_eq!(knowledge_base.find_by_name("Bolt").unwrap().id, "b");

        knowledge_base.remove_organization("a").unwrap();

        assert!(knowledge_base.find_by_name("Acme").is_none());
        assert!(knowledge_base.find_by_ticker("ACM").is_none());
    }

    #[test]
    fn test_search_cache_separates_queries_by_ticker() {
        let mut knowledge_base = KnowledgeBase::default();

        knowledge_base
            .add_organization(
                KnownOrganization::new("ibm", "International Business Machines").with_ticker("XYZ"),
            )
            .unwrap();
        knowledge_base
            .add_organization(KnownOrganization::new("zeta", "Zeta Holdings").with_ticker("IBM"))
            .unwrap();

        let options = SearchOptions::default();

        // Both queries normalize to the same name key
        knowledge_base.search("International Business Machines", &options);
        let matches = knowledge_base.search("IBM", &options);

        let zeta = matches
            .iter()
            .find(|found| found.organization.id == "zeta")
            .expect("ticker owner missing");

        assert_eq!(zeta.matched_field, MatchedField::Ticker);
        assert!((zeta.score - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_update_unknown_id_fails() {
        let mut knowledge_base = seeded();

        let result = knowledge_base.update_organization(KnownOrganization::new("nope", "Nope Inc."));

        assert!(matches!(result, Err(KnowledgeBaseError::NotFound(_))));
    }

    #[test]
    fn test_rejects_invalid_records() {
        let mut knowledge_base = seeded();

        let empty_id = knowledge_base.add_organization(KnownOrganization::new(" ", "Valid Name"));
        assert!(matches!(empty_id, Err(KnowledgeBaseError::InvalidRecord(_))));

        let empty_name = knowledge_base.add_organization(KnownOrganization::new("x", " , "));
        assert!(matches!(empty_name, Err(KnowledgeBaseError::InvalidRecord(_))));
    }

    #[test]
    fn test_mutation_invalidates_search_cache() {
        let mut knowledge_base = seeded();
        let options = SearchOptions::default();

        assert!(knowledge_base.search("Acme Widgets", &options).is_empty());

        knowledge_base
            .add_organization(KnownOrganization::new("acme", "Acme Widgets Corp."))
            .unwrap();

        let matches = knowledge_base.search("Acme Widgets", &options);
        assert_eq!(matches[0].organization.id, "acme");
    }

    #[test]
    fn test_export_import_round_trip() {
        let knowledge_base = seeded();
        let payload = knowledge_base.export_state().unwrap();

        let mut restored = KnowledgeBase::default();
        let count = restored.import_state(&payload).unwrap();

        assert_eq!(count, knowledge_base.len());
        assert_eq!(
            restored.organizations().collect::<Vec<_>>(),
            knowledge_base.organizations().collect::<Vec<_>>()
        );
        assert_eq!(restored.find_by_ticker("BLK").unwrap().id, "blackrock");
    }

    #[test]
    fn test_corrupted_import_leaves_state_unchanged() {
        let mut knowledge_base = seeded();
        let before = knowledge_base.export_state().unwrap();

        let corrupted = [
            "not json",
            r#"{"version": 99, "organizations": []}"#,
            r#"{"version": 1, "organizations": [{"id": "", "canonical_name": "X Inc."}]}"#,
            r#"{"version": 1, "organizations": [
                {"id": "a", "canonical_name": "A Inc."},
                {"id": "a", "canonical_name": "B Inc."}
            ]}"#,
        ];

        for payload in corrupted {
            let result = knowledge_base.import_state(payload);
            assert!(matches!(result, Err(KnowledgeBaseError::ImportError(_))));
        }

        assert_eq!(knowledge_base.export_state().unwrap(), before);
        assert_eq!(knowledge_base.find_by_name("Apple").unwrap().id, "apple");
    }

    #[test]
    fn test_is_same_company() {
        let knowledge_base = seeded();

        assert!(knowledge_base.is_same_company("Goldman Sachs", "The Goldman Sachs Group Inc."));
        assert!(knowledge_base.is_same_company("Google", "Alphabet Inc."));
        assert!(!knowledge_base.is_same_company("Pfizer", "Boeing"));
    }

    #[test]
    fn test_custom_seed_csv() {
        let csv = "Id,Company Name,Symbol\nacme,Acme Widgets Corp.,ACMW\nglobex,Globex Corporation,\n";

        let seed_list =
            OrganizationListPreprocessor::read_organization_list_from_string(csv).unwrap();
        assert_eq!(seed_list.len(), 2);

        let knowledge_base = KnowledgeBase::from_csv_reader(csv.as_bytes()).unwrap();
        assert_eq!(knowledge_base.len(), 2);
        assert_eq!(knowledge_base.find_by_ticker("ACMW").unwrap().id, "acme");
        assert!(knowledge_base.get("globex").unwrap().ticker.is_none());
    }
}
