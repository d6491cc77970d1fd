use newsimpact::application::cache::{Fingerprint, TtlCache};
use serde_json::json;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[test]
fn test_set_then_get_returns_value() {
    let cache: TtlCache = TtlCache::new(10, Duration::from_secs(3600));
    let values = [
        json!(null),
        json!(42),
        json!("삼성전자"),
        json!({"label": "negative", "hits": [1, 2, 3]}),
    ];
    for (i, value) in values.iter().enumerate() {
        let key = format!("k{}", i);
        cache.set(key.clone(), value.clone());
        assert_eq!(cache.get(&key).as_ref(), Some(value));
    }
}

#[test]
fn test_count_never_exceeds_capacity() {
    let cache: TtlCache = TtlCache::new(5, Duration::from_secs(3600));
    for i in 0..50 {
        cache.set(format!("k{}", i % 17), json!(i));
        if i % 3 == 0 {
            cache.get(&format!("k{}", i % 7));
        }
        assert!(cache.stats().count <= 5);
    }
}

#[test]
fn test_concurrent_writers_respect_capacity() {
    let cache: Arc<TtlCache> = Arc::new(TtlCache::new(8, Duration::from_secs(3600)));
    let handles: Vec<_> = (0..4)
        .map(|t| {
            let cache = cache.clone();
            thread::spawn(move || {
                for i in 0..100 {
                    cache.set(format!("t{}-{}", t, i), json!(i));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    assert!(cache.stats().count <= 8);
}

#[test]
fn test_fingerprint_memoization_round_trip() {
    let cache: TtlCache = TtlCache::new(10, Duration::from_secs(60));
    let key = Fingerprint::builder("extract_securities")
        .arg("삼성전자 실적 발표")
        .named("min_confidence", &0.6)
        .finish();

    let first: Vec<String> = cache.memoize(key.clone(), || vec!["삼성전자".to_string()]);
    let second: Vec<String> = cache.memoize(key, || unreachable!("served from cache"));
    assert_eq!(first, second);
    assert_eq!(cache.stats().hits, 1);
}
