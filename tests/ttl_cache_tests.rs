use company_sniffer::models::{CacheConfig, TtlCache};
use std::time::{Duration, Instant};

#[cfg(test)]
mod tests {
    use super::*;

    fn cache(capacity: usize, ttl_secs: u64) -> TtlCache<String, u32> {
        TtlCache::new(CacheConfig {
            capacity,
            ttl: Duration::from_secs(ttl_secs),
        })
    }

    #[test]
    fn test_returns_fresh_entries() {
        let cache = cache(4, 60);
        cache.insert("a".to_string(), 1);

        assert_eq!(cache.get(&"a".to_string()), Some(1));
        assert_eq!(cache.get(&"b".to_string()), None);
    }

    #[test]
    fn test_entries_expire_after_ttl() {
        let cache = cache(4, 10);
        let start = Instant::now();

        cache.insert_at("a".to_string(), 1, start);

        assert_eq!(
            cache.get_at(&"a".to_string(), start + Duration::from_secs(9)),
            Some(1)
        );
        assert_eq!(
            cache.get_at(&"a".to_string(), start + Duration::from_secs(10)),
            None
        );

        // Expired entries are dropped on read
        assert!(cache.is_empty());
    }

    #[test]
    fn test_zero_ttl_never_hits() {
        let cache = cache(4, 0);
        cache.insert("a".to_string(), 1);

        assert_eq!(cache.get(&"a".to_string()), None);
    }

    #[test]
    fn test_capacity_evicts_least_recently_used() {
        let cache = cache(2, 60);
        let start = Instant::now();

        cache.insert_at("a".to_string(), 1, start);
        cache.insert_at("b".to_string(), 2, start + Duration::from_millis(1));
        cache.insert_at("c".to_string(), 3, start + Duration::from_millis(2));

        let now = start + Duration::from_millis(3);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get_at(&"a".to_string(), now), None);
        assert_eq!(cache.get_at(&"b".to_string(), now), Some(2));
        assert_eq!(cache.get_at(&"c".to_string(), now), Some(3));
    }

    #[test]
    fn test_reinserted_key_counts_as_recently_used() {
        let cache = cache(2, 60);
        let start = Instant::now();

        cache.insert_at("a".to_string(), 1, start);
        cache.insert_at("b".to_string(), 2, start + Duration::from_millis(1));
        cache.insert_at("a".to_string(), 10, start + Duration::from_millis(2));
        cache.insert_at("c".to_string(), 3, start + Duration::from_millis(3));

        let now = start + Duration::from_millis(4);

        assert_eq!(cache.get_at(&"a".to_string(), now), Some(10));
        assert_eq!(cache.get_at(&"b".to_string(), now), None);
        assert_eq!(cache.get_at(&"c".to_string(), now), Some(3));
    }

    #[test]
    fn test_zero_capacity_stores_nothing() {
        let cache = cache(0, 60);
        cache.insert("a".to_string(), 1);

        assert!(cache.is_empty());
    }

    #[test]
    fn test_clear_and_remove() {
        let cache = cache(4, 60);
        cache.insert("a".to_string(), 1);
        cache.insert("b".to_string(), 2);

        assert_eq!(cache.remove(&"a".to_string()), Some(1));
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_shared_across_threads() {
        let cache = cache(8, 60);

        std::thread::scope(|scope| {
            for worker in 0..4u32 {
                let cache = &cache;
                scope.spawn(move || {
                    for i in 0..8u32 {
                        cache.insert(format!("{}-{}", worker, i), i);
                    }
                });
            }
        });

        assert!(cache.len() <= 8);
        assert!(!cache.is_empty());
    }
}
