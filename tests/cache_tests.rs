// Response cache behaviour through the public API
// Author: kelexine (https://github.com/kelexine)

mod common;

use common::ScriptedGenerator;
use folio_gateway::cache::{normalize_key, CacheConfig, ResponseCache};
use folio_gateway::error::GatewayError;
use folio_gateway::gemini::TextGenerator;
use proptest::prelude::*;
use std::sync::Arc;
use std::time::Duration;

fn cache(coalesce_inflight: bool) -> ResponseCache {
    ResponseCache::new(CacheConfig {
        coalesce_inflight,
        ..CacheConfig::default()
    })
}

#[test]
fn test_cache_config_defaults() {
    let config = CacheConfig::default();

    assert_eq!(config.ttl_seconds, 300);
    assert_eq!(config.max_entries, 1000);
    assert!(config.coalesce_inflight);
}

#[tokio::test]
async fn test_repeated_prompt_generates_once() {
    let cache = cache(true);
    let generator = Arc::new(ScriptedGenerator::echo());
    let dyn_gen: Arc<dyn TextGenerator> = generator.clone();

    let first = cache
        .get_or_generate("Tell me about your skills", dyn_gen.clone())
        .await
        .unwrap();
    let second = cache
        .get_or_generate(" tell me about your skills ", dyn_gen.clone())
        .await
        .unwrap();
    let third = cache
        .get_or_generate("TELL ME ABOUT YOUR SKILLS", dyn_gen)
        .await
        .unwrap();

    assert_eq!(generator.calls(), 1);
    assert_eq!(first, second);
    assert_eq!(second, third);
    assert_eq!(cache.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_expired_entry_triggers_fresh_generation() {
    let cache = cache(true);
    let generator = Arc::new(ScriptedGenerator::with_outcomes(vec![
        Ok("first".to_string()),
        Ok("second".to_string()),
    ]));
    let dyn_gen: Arc<dyn TextGenerator> = generator.clone();

    assert_eq!(cache.get_or_generate("q", dyn_gen.clone()).await.unwrap(), "first");

    tokio::time::advance(Duration::from_secs(299)).await;
    assert_eq!(cache.get_or_generate("q", dyn_gen.clone()).await.unwrap(), "first");
    assert_eq!(generator.calls(), 1);

    tokio::time::advance(Duration::from_secs(2)).await;
    assert_eq!(cache.get_or_generate("q", dyn_gen).await.unwrap(), "second");
    assert_eq!(generator.calls(), 2);
}

#[tokio::test]
async fn test_failures_are_not_cached() {
    let cache = cache(true);
    let generator = Arc::new(ScriptedGenerator::with_outcomes(vec![
        Err(GatewayError::EmptyResponse),
        Ok("recovered".to_string()),
    ]));
    let dyn_gen: Arc<dyn TextGenerator> = generator.clone();

    let err = cache.get_or_generate("q", dyn_gen.clone()).await.unwrap_err();
    assert_eq!(err, GatewayError::EmptyResponse);
    assert!(cache.is_empty());
    assert_eq!(cache.inflight(), 0);

    assert_eq!(cache.get_or_generate("q", dyn_gen).await.unwrap(), "recovered");
    assert_eq!(generator.calls(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_identical_prompts_share_one_generation() {
    let cache = cache(true);
    let generator = Arc::new(ScriptedGenerator::echo().delayed(Duration::from_millis(100)));

    let tasks: Vec<_> = (0..8)
        .map(|i| {
            let cache = cache.clone();
            let dyn_gen: Arc<dyn TextGenerator> = generator.clone();
            let prompt = if i % 2 == 0 { "What do you do?" } else { "  what do you do?" };
            tokio::spawn(async move { cache.get_or_generate(prompt, dyn_gen).await })
        })
        .collect();

    let mut answers = Vec::new();
    for task in tasks {
        answers.push(task.await.unwrap().unwrap());
    }

    assert_eq!(generator.calls(), 1);
    assert!(answers.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(cache.inflight(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_without_coalescing_concurrent_misses_each_generate() {
    let cache = cache(false);
    let generator = Arc::new(ScriptedGenerator::echo().delayed(Duration::from_millis(100)));

    let tasks: Vec<_> = (0..3)
        .map(|_| {
            let cache = cache.clone();
            let dyn_gen: Arc<dyn TextGenerator> = generator.clone();
            tokio::spawn(async move { cache.get_or_generate("same", dyn_gen).await })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    assert_eq!(generator.calls(), 3);
    // Still at most one entry per key
    assert_eq!(cache.len(), 1);
}

#[tokio::test]
async fn test_coalesced_waiters_share_errors() {
    let cache = cache(true);
    let generator = Arc::new(
        ScriptedGenerator::failing(GatewayError::RateLimit("quota".to_string()))
            .delayed(Duration::from_millis(50)),
    );

    let a = cache.get_or_generate("q", generator.clone());
    let b = cache.get_or_generate("Q", generator.clone());
    let (a, b) = tokio::join!(a, b);

    assert!(matches!(a, Err(GatewayError::RateLimit(_))));
    assert!(matches!(b, Err(GatewayError::RateLimit(_))));
    assert_eq!(generator.calls(), 1);
}

#[tokio::test]
async fn test_generation_survives_caller_cancellation() {
    let cache = cache(true);
    let generator = Arc::new(ScriptedGenerator::echo().delayed(Duration::from_millis(50)));

    let abandoned = tokio::time::timeout(
        Duration::from_millis(5),
        cache.get_or_generate("slow", generator.clone()),
    )
    .await;
    assert!(abandoned.is_err());

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(cache.get("slow"), Some("answer to: slow".to_string()));
    assert_eq!(generator.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_sweeper_purges_expired_entries() {
    let cache = ResponseCache::new(CacheConfig {
        ttl_seconds: 10,
        ..CacheConfig::default()
    });
    cache.set("q", "a".to_string());
    let sweeper = cache.spawn_sweeper(Duration::from_secs(5));

    tokio::time::sleep(Duration::from_secs(16)).await;
    assert!(cache.is_empty());
    sweeper.abort();
}

proptest! {
    #[test]
    fn normalize_key_is_idempotent(prompt in "[a-zA-Z0-9ÀÉÎÕÜäöüß ,.?!\t]{0,64}") {
        let once = normalize_key(&prompt);
        prop_assert_eq!(normalize_key(&once), once.clone());
    }

    #[test]
    fn surrounding_whitespace_and_case_do_not_matter(
        prompt in "[a-zA-Z ]{1,32}",
        left in "[ \t\n]{0,4}",
        right in "[ \t\n]{0,4}",
    ) {
        let padded = format!("{}{}{}", left, prompt.to_uppercase(), right);
        prop_assert_eq!(normalize_key(&padded), normalize_key(&prompt));
    }
}
