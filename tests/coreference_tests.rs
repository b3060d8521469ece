use company_sniffer::models::{CoreferenceResolver, Mention, NearestAntecedentResolver};
use company_sniffer::EntityType;

#[cfg(test)]
mod tests {
    use super::*;

    fn mention(
        text: &str,
        full_text: &str,
        normalized: &str,
        entity_type: EntityType,
        organization_id: Option<&str>,
    ) -> Mention {
        // Last occurrence, so a short mention never lands inside an earlier long one
        let offset = full_text.rfind(text).expect("mention not in text");

        Mention {
            text: text.to_string(),
            normalized: normalized.to_string(),
            entity_type,
            offset,
            end: offset + text.len(),
            organization_id: organization_id.map(|id| id.to_string()),
        }
    }

    #[test]
    fn test_shorter_name_merges_into_earlier_full_name() {
        let text = "Goldman Sachs Group Inc. said Goldman would hire.";
        let mentions = vec![
            mention(
                "Goldman Sachs Group Inc.",
                text,
                "Goldman Sachs Group",
                EntityType::Company,
                Some("goldman_sachs"),
            ),
            mention("Goldman", text, "Goldman", EntityType::CompanyContext, None),
        ];

        let links = NearestAntecedentResolver.resolve(text, &mentions);

        assert_eq!(links.antecedents, vec![None, Some(0)]);
    }

    #[test]
    fn test_same_record_same_type_merges() {
        let text = "Alphabet Inc. and Google Inc. are the same.";
        let mentions = vec![
            mention(
                "Alphabet Inc.",
                text,
                "Alphabet",
                EntityType::Company,
                Some("alphabet"),
            ),
            mention("Google Inc.", text, "Google", EntityType::Company, Some("alphabet")),
        ];

        let links = NearestAntecedentResolver.resolve(text, &mentions);

        assert_eq!(links.antecedents, vec![None, Some(0)]);
    }

    #[test]
    fn test_different_records_never_merge() {
        let text = "Morgan Stanley and JPMorgan Chase & Co. disagree.";
        let mentions = vec![
            mention(
                "Morgan Stanley",
                text,
                "Morgan Stanley",
                EntityType::CompanyContext,
                Some("morgan_stanley"),
            ),
            mention(
                "JPMorgan Chase & Co.",
                text,
                "JPMorgan Chase",
                EntityType::Company,
                Some("jpmorgan_chase"),
            ),
        ];

        let links = NearestAntecedentResolver.resolve(text, &mentions);

        assert_eq!(links.antecedents, vec![None, None]);
    }

    #[test]
    fn test_ticker_does_not_merge_into_company_by_text() {
        let text = "Tesla Inc. ($TSLA) rallied.";
        let mentions = vec![
            mention("Tesla Inc.", text, "Tesla", EntityType::Company, Some("tesla")),
            mention("TSLA", text, "TSLA", EntityType::Ticker, Some("tesla")),
        ];

        let links = NearestAntecedentResolver.resolve(text, &mentions);

        assert_eq!(links.antecedents, vec![None, None]);
    }

    #[test]
    fn test_anaphors_attach_to_nearest_preceding_root() {
        let text = "Tesla Inc. reported record deliveries, and the company raised its outlook.";
        let mentions = vec![mention(
            "Tesla Inc.",
            text,
            "Tesla",
            EntityType::Company,
            Some("tesla"),
        )];

        let links = NearestAntecedentResolver.resolve(text, &mentions);

        let anaphors: Vec<&str> = links
            .anaphors
            .iter()
            .map(|anaphor| anaphor.text.as_str())
            .collect();

        assert_eq!(anaphors, vec!["the company", "its"]);
        assert!(links.anaphors.iter().all(|anaphor| anaphor.antecedent == 0));
    }

    #[test]
    fn test_anaphor_before_any_mention_is_ignored() {
        let text = "It said BlackRock Inc. would grow.";
        let mentions = vec![mention(
            "BlackRock Inc.",
            text,
            "BlackRock",
            EntityType::Company,
            Some("blackrock"),
        )];

        let links = NearestAntecedentResolver.resolve(text, &mentions);

        assert!(links.anaphors.is_empty());
    }

    #[test]
    fn test_anaphor_resolves_to_root_of_merged_mention() {
        let text = "Goldman Sachs Group Inc. hired; Goldman said the firm would grow.";
        let mentions = vec![
            mention(
                "Goldman Sachs Group Inc.",
                text,
                "Goldman Sachs Group",
                EntityType::Company,
                Some("goldman_sachs"),
            ),
            Mention {
                text: "Goldman".to_string(),
                normalized: "Goldman".to_string(),
                entity_type: EntityType::CompanyContext,
                offset: text.rfind("Goldman").unwrap(),
                end: text.rfind("Goldman").unwrap() + "Goldman".len(),
                organization_id: None,
            },
        ];

        let links = NearestAntecedentResolver.resolve(text, &mentions);

        assert_eq!(links.antecedents, vec![None, Some(0)]);
        assert_eq!(links.anaphors.len(), 1);
        assert_eq!(links.anaphors[0].text, "the firm");
        assert_eq!(links.anaphors[0].antecedent, 0);
    }

    #[test]
    fn test_no_mentions() {
        let links = NearestAntecedentResolver.resolve("It rained.", &[]);

        assert!(links.antecedents.is_empty());
        assert!(links.anaphors.is_empty());
    }
}
