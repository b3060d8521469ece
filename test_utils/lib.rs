#![allow(dead_code)]

use company_sniffer::{EntityResolver, ResolvedEntity, StructuralHints, DEFAULT_SITE_ID};
use std::collections::HashSet;
use std::{fs, path::Path};

pub const TEST_FILES_DIRECTORY: &str = "tests/test_files";

pub const DEFAULT_FALSE_NEGATIVE_WEIGHT: f32 = 2.0; // Higher penalty for missing entities
pub const DEFAULT_FALSE_POSITIVE_WEIGHT: f32 = 1.0; // Lower penalty for unexpected entities

/// Lines with these prefixes are test metadata and never reach the resolver.
const METADATA_PREFIXES: &[&str] = &["EXPECTED:", "COMMENT:"];

// Helper function to get the expected normalized entity names from the text file
pub fn get_expected_entities(file_path: &Path) -> Vec<String> {
    let content = fs::read_to_string(file_path).expect("Failed to read test file");

    content
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            line.strip_prefix("EXPECTED:")
                .map(|expected| expected.trim().to_string())
        })
        .collect()
}

/// Reads a test file and strips its metadata lines.
pub fn read_test_text(file_path: &Path) -> String {
    let raw_text = fs::read_to_string(file_path).expect("Failed to read test file");

    raw_text
        .lines()
        .filter(|line| {
            let line = line.trim_start();
            !METADATA_PREFIXES
                .iter()
                .any(|prefix| line.starts_with(prefix))
        })
        .collect::<Vec<&str>>()
        .join("\n")
}

/// Resolves `text` with a fresh default resolver and no structural hints.
pub fn resolve_plain(text: &str) -> Vec<ResolvedEntity> {
    let resolver = EntityResolver::new().expect("Failed to build resolver");

    resolver
        .resolve(text, DEFAULT_SITE_ID, &StructuralHints::default())
        .entities
}

// Helper function to run the test for each file in the directory
pub fn run_test_for_file(
    resolver: &EntityResolver,
    test_file_path: &str,
    use_assertions: bool,
) -> (usize, f32) {
    let path = Path::new(test_file_path);
    let filtered_text = read_test_text(path);

    eprintln!("Testing file: {}", test_file_path);

    let result = resolver.resolve(&filtered_text, DEFAULT_SITE_ID, &StructuralHints::default());

    let results: Vec<String> = result
        .entities
        .iter()
        .map(|entity| entity.normalized.clone())
        .collect();

    let expected_entities = get_expected_entities(path);

    let mut entity_counts = std::collections::HashMap::new();
    for entity in &results {
        *entity_counts.entry(entity).or_insert(0) += 1;
    }
    let duplicate_entities: Vec<&String> = entity_counts
        .iter()
        .filter(|(_, &count)| count > 1)
        .map(|(entity, _)| *entity)
        .collect();

    let missing_entities: Vec<&String> = expected_entities
        .iter()
        .filter(|entity| !results.contains(entity))
        .collect();

    let unexpected_entities: Vec<&String> = results
        .iter()
        .filter(|entity| !expected_entities.contains(entity))
        .collect();

    let error_count =
        missing_entities.len() + unexpected_entities.len() + duplicate_entities.len();

    if use_assertions {
        assert!(
            missing_entities.is_empty(),
            "{} - Expected entities {:?} were not found in results {:?}.",
            test_file_path,
            missing_entities,
            results
        );

        assert!(
            unexpected_entities.is_empty(),
            "{} - Unexpected entities {:?} found in results.",
            test_file_path,
            unexpected_entities
        );

        assert!(
            duplicate_entities.is_empty(),
            "{} - Duplicate entities found in results: {:?}",
            test_file_path,
            duplicate_entities
        );
    }

    (error_count, compute_mse(&expected_entities, &results))
}

/// Weighted mean squared error over the union of expected and returned entities.
pub fn compute_mse(expected: &[String], results: &[String]) -> f32 {
    let expected_set: HashSet<&String> = expected.iter().collect();
    let results_set: HashSet<&String> = results.iter().collect();

    let false_negatives = expected_set.difference(&results_set).count();
    let false_positives = results_set.difference(&expected_set).count();
    let total = expected_set.union(&results_set).count();

    if total == 0 {
        return 0.0;
    }

    (false_negatives as f32 * DEFAULT_FALSE_NEGATIVE_WEIGHT
        + false_positives as f32 * DEFAULT_FALSE_POSITIVE_WEIGHT)
        / total as f32
}
