#[path = "../test_utils/lib.rs"]
mod test_utils;

use company_sniffer::EntityResolver;
use std::fs::read_dir;
use test_utils::{run_test_for_file, TEST_FILES_DIRECTORY};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_entities_from_multiple_files() {
        let resolver = EntityResolver::new().expect("Failed to build resolver");

        let files = read_dir(TEST_FILES_DIRECTORY).expect("Failed to read test files directory");

        let mut file_count = 0;

        for file in files {
            let file = file.expect("Failed to read file");
            let file_path = file.path();

            if file_path.is_file() {
                run_test_for_file(&resolver, file_path.to_str().unwrap(), true);
                file_count += 1;
            }
        }

        assert!(file_count > 0, "No test files found");
    }

    #[test]
    fn test_results_are_stable_across_repeated_runs() {
        let resolver = EntityResolver::new().expect("Failed to build resolver");

        for _ in 0..2 {
            let (error_count, mse) = run_test_for_file(
                &resolver,
                "tests/test_files/multiple_banks.txt",
                false,
            );

            assert_eq!(error_count, 0);
            assert_eq!(mse, 0.0);
        }
    }
}
