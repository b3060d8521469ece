pub mod dedup_vector;
pub mod hash_cache_key;
pub mod jaccard_similarity;
pub mod sanitize_text;
pub mod sort_results;
pub mod tokenize;

pub use dedup_vector::dedup_vector;
pub use hash_cache_key::hash_cache_key;
pub use jaccard_similarity::jaccard_similarity;
pub use sanitize_text::sanitize_text;
pub use sort_results::sort_results;
pub use tokenize::{preprocess, tokenize};
