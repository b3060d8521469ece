use sha2::{Digest, Sha256};

/// Compute a content-addressed cache key from an ordered list of parts.
///
/// Parts are length-prefixed before hashing so that `["ab", "c"]` and `["a", "bc"]` never
/// collide.
pub fn hash_cache_key(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();

    for part in parts {
        hasher.update((part.len() as u64).to_le_bytes());
        hasher.update(part.as_bytes());
    }

    hex::encode(hasher.finalize())
}
