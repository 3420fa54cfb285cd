//! Integration tests for behavior every provider shares.

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use cachehub::config::options::NCacheOptions;
use cachehub::{
    CacheBuilder, CacheEntry, CacheManager, CacheProvider, CacheProviderExt, CacheResult,
    ErrorKind, Expiration,
};

/// A manager with one in-process provider of every kind.
fn in_process_manager() -> CacheManager {
    let configure = |options: &mut NCacheOptions| -> CacheResult<()> {
        options.cache_id = "demoCache".to_string();
        Ok(())
    };

    CacheManager::new(
        CacheBuilder::new()
            .add_memory_cache("memory")
            .unwrap()
            .add_enterprise_library_cache("legacy")
            .unwrap()
            .with_ncache_connector(Arc::new(helpers::FakeConnector::default()))
            .add_ncache(Some(&configure), "ncache")
            .unwrap()
            .build(),
    )
}

fn providers(manager: &CacheManager) -> Vec<Arc<dyn CacheProvider>> {
    manager
        .names()
        .iter()
        .map(|name| manager.resolve(name.as_str()).unwrap())
        .collect()
}

#[tokio::test]
async fn test_add_none_creates_nothing() {
    let manager = CacheManager::new(
        CacheBuilder::new()
            .add_memory_cache("memory")
            .unwrap()
            .add_enterprise_library_cache("legacy")
            .unwrap()
            .add_redis_cache_with(helpers::unreachable_redis("127.0.0.1:1"), "redis")
            .unwrap()
            .with_ncache_connector(Arc::new(helpers::FakeConnector::default()))
            .add_ncache_with(
                NCacheOptions {
                    cache_id: "demoCache".to_string(),
                    ..Default::default()
                },
                "ncache",
            )
            .unwrap()
            .build(),
    );

    for provider in providers(&manager) {
        assert!(!provider.add(None).await.unwrap(), "provider {}", provider.name());
    }
}

#[tokio::test]
async fn test_roundtrip() {
    let manager = in_process_manager();
    for provider in providers(&manager) {
        let entry = CacheEntry::new("greeting", "hello").unwrap();
        assert!(provider.add(Some(entry)).await.unwrap());
        assert_eq!(
            provider.get("greeting").await.unwrap(),
            Some(Bytes::from("hello")),
            "provider {}",
            provider.name()
        );
        assert!(provider.contains("greeting").await.unwrap());
    }
}

#[tokio::test]
async fn test_missing_keys() {
    let manager = in_process_manager();
    for provider in providers(&manager) {
        assert_eq!(provider.get("absent").await.unwrap(), None);
        assert!(!provider.contains("absent").await.unwrap());
        assert!(!provider.remove("absent").await.unwrap());
    }
}

#[tokio::test]
async fn test_blank_keys_rejected() {
    let manager = in_process_manager();
    for provider in providers(&manager) {
        for result in [
            provider.get("").await.map(|_| ()),
            provider.contains(" ").await.map(|_| ()),
            provider.remove("\t").await.map(|_| ()),
        ] {
            assert_eq!(result.unwrap_err().kind, ErrorKind::InvalidArgument);
        }
    }
}

#[tokio::test]
async fn test_absolute_expiration() {
    let manager = in_process_manager();
    let providers = providers(&manager);

    for provider in &providers {
        let entry = CacheEntry::new("short", "lived")
            .unwrap()
            .expires_after(Duration::from_secs(1));
        provider.set(entry).await.unwrap();
        assert!(provider.get("short").await.unwrap().is_some());
    }

    tokio::time::sleep(Duration::from_millis(1_200)).await;

    for provider in &providers {
        assert_eq!(
            provider.get("short").await.unwrap(),
            None,
            "provider {}",
            provider.name()
        );
        assert!(!provider.contains("short").await.unwrap());
    }
}

#[tokio::test]
async fn test_remove_expired_reports_false() {
    let manager = in_process_manager();
    let providers = providers(&manager);

    for provider in &providers {
        let entry = CacheEntry::new("e", "v")
            .unwrap()
            .expires_after(Duration::from_millis(100));
        provider.set(entry).await.unwrap();
    }

    tokio::time::sleep(Duration::from_millis(300)).await;

    for provider in &providers {
        assert!(
            !provider.remove("e").await.unwrap(),
            "provider {}",
            provider.name()
        );
    }
}

#[tokio::test]
async fn test_padded_keys_are_distinct() {
    let manager = in_process_manager();
    for provider in providers(&manager) {
        provider.set(CacheEntry::new("a", "1").unwrap()).await.unwrap();
        provider.set(CacheEntry::new("a ", "2").unwrap()).await.unwrap();
        provider.set(CacheEntry::new(" k ", "padded").unwrap()).await.unwrap();

        assert_eq!(
            provider.get("a").await.unwrap(),
            Some(Bytes::from("1")),
            "provider {}",
            provider.name()
        );
        assert_eq!(provider.get("a ").await.unwrap(), Some(Bytes::from("2")));
        assert_eq!(provider.get(" k ").await.unwrap(), Some(Bytes::from("padded")));
        assert_eq!(provider.get("k").await.unwrap(), None);

        assert!(provider.remove("a ").await.unwrap());
        assert!(provider.contains("a").await.unwrap());
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_access() {
    const TASKS: usize = 16;
    const ROUNDS: usize = 50;

    let manager = in_process_manager();
    for name in manager.names() {
        let tasks = (0..TASKS).map(|t| {
            let provider = manager.resolve(name.as_str()).unwrap();
            tokio::spawn(async move {
                for round in 0..ROUNDS {
                    let shared = format!("shared{}", round % 4);
                    let value = format!("t{t}");
                    provider
                        .add(Some(CacheEntry::new(&shared, value).unwrap()))
                        .await?;
                    if let Some(found) = provider.get(&shared).await? {
                        assert!(found.starts_with(b"t"));
                    }
                    provider.contains(&shared).await?;
                    if round % 3 == 0 {
                        provider.remove(&shared).await?;
                    }
                }
                provider
                    .set(CacheEntry::new(format!("own{t}"), format!("t{t}")).unwrap())
                    .await
            })
        });

        for result in futures::future::join_all(tasks).await {
            result.expect("task panicked").unwrap();
        }

        let provider = manager.resolve(name.as_str()).unwrap();
        for t in 0..TASKS {
            assert_eq!(
                provider.get(&format!("own{t}")).await.unwrap(),
                Some(Bytes::from(format!("t{t}"))),
                "provider {name}"
            );
        }
        for i in 0..4 {
            if let Some(found) = provider.get(&format!("shared{i}")).await.unwrap() {
                assert!(found.starts_with(b"t"), "provider {name}");
            }
        }
    }
}

#[tokio::test]
async fn test_clear_removes_everything() {
    let manager = in_process_manager();
    for provider in providers(&manager) {
        for i in 0..3 {
            provider
                .set(CacheEntry::new(format!("k{i}"), "v").unwrap())
                .await
                .unwrap();
        }
        provider.clear().await.unwrap();
        for i in 0..3 {
            assert!(!provider.contains(&format!("k{i}")).await.unwrap());
        }
    }
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Profile {
    id: u32,
    display_name: String,
}

#[tokio::test]
async fn test_typed_values() {
    let manager = in_process_manager();
    let profile = Profile {
        id: 7,
        display_name: "Ada".to_string(),
    };

    for provider in providers(&manager) {
        provider
            .add_json("profile:7", &profile, Expiration::Never)
            .await
            .unwrap();
        let loaded: Option<Profile> = provider.get_json("profile:7").await.unwrap();
        assert_eq!(loaded.as_ref(), Some(&profile));
    }
}

#[tokio::test]
async fn test_typed_decode_failure() {
    let manager = in_process_manager();
    let provider = manager.resolve("memory").unwrap();
    provider
        .set(CacheEntry::new("raw", "not json").unwrap())
        .await
        .unwrap();

    let err = provider.get_json::<Profile>("raw").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Serialization);
}
