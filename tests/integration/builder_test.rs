//! Integration tests for provider registration.

mod helpers;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use cachehub::config::CacheSettings;
use cachehub::config::options::{EnterpriseLibraryOptions, MemoryOptions, NCacheOptions};
use cachehub::providers::{EnterpriseLibraryCacheProvider, MemoryCacheProvider};
use cachehub::{CacheBuilder, CacheError, CacheManager, CacheResult, ErrorKind, ProviderKind};

#[test]
fn test_memory_cache_default_name() {
    let registry = CacheBuilder::new().add_memory_cache(None).unwrap().build();
    assert_eq!(registry.names(), vec!["default".to_string()]);

    let registry = CacheBuilder::new().add_memory_cache("  ").unwrap().build();
    assert!(registry.contains("default"));
}

#[test]
fn test_redis_requires_connection_string() {
    for connection_string in [None, Some(""), Some("   ")] {
        let err = CacheBuilder::new()
            .add_redis_cache(connection_string, "name")
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
        assert!(err.message.contains("connection_string"));
    }
}

#[test]
fn test_redis_name_defaults_to_identity() {
    let registry = CacheBuilder::new()
        .add_redis_cache("conn-string", None)
        .unwrap()
        .build();
    assert_eq!(registry.names(), vec!["conn-string:6379/0".to_string()]);
}

#[test]
fn test_redis_rejects_malformed_connection_string() {
    let err = CacheBuilder::new()
        .add_redis_cache("host:notaport", "r")
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidArgument);
}

#[test]
fn test_ncache_requires_configure() {
    let connector = Arc::new(helpers::FakeConnector::default());
    let err = CacheBuilder::new()
        .with_ncache_connector(connector.clone())
        .add_ncache(None, "name")
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidArgument);
    assert_eq!(connector.connect_count(), 0);
}

#[test]
fn test_ncache_configure_runs_once_on_fresh_options() {
    let calls = AtomicUsize::new(0);
    let configure = |options: &mut NCacheOptions| -> CacheResult<()> {
        calls.fetch_add(1, Ordering::SeqCst);
        assert!(options.cache_id.is_empty());
        options.cache_id = "demoCache".to_string();
        options.property("client.retries", "3");
        Ok(())
    };

    let registry = CacheBuilder::new()
        .with_ncache_connector(Arc::new(helpers::FakeConnector::default()))
        .add_ncache(Some(&configure), None)
        .unwrap()
        .build();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let provider = registry.get("demoCache").unwrap();
    assert_eq!(provider.kind(), ProviderKind::NCache);
}

#[test]
fn test_ncache_configure_error_propagates() {
    let configure = |_: &mut NCacheOptions| -> CacheResult<()> {
        Err(CacheError::invalid_argument("cache id is not allowed"))
    };
    let err = CacheBuilder::new()
        .with_ncache_connector(Arc::new(helpers::FakeConnector::default()))
        .add_ncache(Some(&configure), "n")
        .unwrap_err();
    assert_eq!(err.message, "cache id is not allowed");
}

#[test]
fn test_ncache_requires_connector() {
    let configure = |options: &mut NCacheOptions| -> CacheResult<()> {
        options.cache_id = "demoCache".to_string();
        Ok(())
    };
    let err = CacheBuilder::new()
        .add_ncache(Some(&configure), "n")
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Configuration);
}

#[test]
fn test_ncache_rejects_blank_cache_id() {
    let configure = |_: &mut NCacheOptions| -> CacheResult<()> { Ok(()) };
    let err = CacheBuilder::new()
        .with_ncache_connector(Arc::new(helpers::FakeConnector::default()))
        .add_ncache(Some(&configure), "n")
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidArgument);
}

#[test]
fn test_add_provider_rejects_blank_name() {
    let provider = Arc::new(helpers::FailingDisposeProvider::new(" "));
    let err = CacheBuilder::new().add_provider(provider).unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidArgument);
}

#[test]
fn test_invalid_memory_options_fail_at_registration() {
    let options = MemoryOptions {
        max_capacity: 0,
        default_ttl_seconds: None,
    };
    let err = CacheBuilder::new()
        .add_memory_cache_with(options, "m")
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidArgument);
}

#[tokio::test]
async fn test_duplicate_name_replaces_earlier_provider() {
    let manager = CacheManager::new(
        CacheBuilder::new()
            .add_memory_cache("shared")
            .unwrap()
            .add_enterprise_library_cache_with(EnterpriseLibraryOptions::default(), "shared")
            .unwrap()
            .build(),
    );

    assert_eq!(manager.names(), vec!["shared".to_string()]);
    let provider = manager.resolve("shared").unwrap();
    assert_eq!(provider.kind(), ProviderKind::EnterpriseLibrary);
}

#[tokio::test]
async fn test_enterprise_library_uses_known_section() {
    let section = EnterpriseLibraryOptions {
        section_name: "Orders".to_string(),
        max_elements_before_scavenging: 2,
        elements_to_remove_when_scavenging: 1,
        ..Default::default()
    };
    let manager = CacheManager::new(
        CacheBuilder::new()
            .with_enterprise_section(section)
            .add_enterprise_library_cache("Orders")
            .unwrap()
            .add_enterprise_library_cache(None)
            .unwrap()
            .build(),
    );

    assert_eq!(
        manager.names(),
        vec!["Cache Manager".to_string(), "Orders".to_string()]
    );

    let orders = manager.resolve("Orders").unwrap();
    for key in ["a", "b", "c"] {
        orders
            .set(cachehub::CacheEntry::new(key, "v").unwrap())
            .await
            .unwrap();
    }
    let mut live = 0;
    for key in ["a", "b", "c"] {
        if orders.contains(key).await.unwrap() {
            live += 1;
        }
    }
    assert_eq!(live, 2);
}

#[tokio::test]
async fn test_custom_provider_registration() {
    let memory = MemoryCacheProvider::new("mine", &MemoryOptions::default()).unwrap();
    let legacy = EnterpriseLibraryCacheProvider::new(Some("legacy"), Default::default()).unwrap();

    let registry = CacheBuilder::new()
        .add_provider(Arc::new(memory))
        .unwrap()
        .add_provider(Arc::new(legacy))
        .unwrap()
        .default_provider("legacy")
        .unwrap()
        .build();

    assert_eq!(registry.len(), 2);
    assert_eq!(registry.default_name(), "legacy");
}

#[test]
fn test_default_provider_rejects_blank() {
    let err = CacheBuilder::new().default_provider("").unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidArgument);
}

const SETTINGS: &str = r#"
default_provider = "local"

[[providers]]
kind = "memory"
name = "local"

[providers.options]
max_capacity = 100

[[providers]]
kind = "redis"
name = "shared"

[providers.options]
connection_string = "127.0.0.1:1,connectTimeout=200"
key_prefix = "app:"

[[providers]]
kind = "enterprise_library"
section = "legacy"

[enterprise_library.legacy]
max_elements_before_scavenging = 10
elements_to_remove_when_scavenging = 2
"#;

#[tokio::test]
async fn test_configure_from_settings_file() {
    let file = helpers::settings_file(SETTINGS);
    let settings = CacheSettings::load(file.path().to_str().unwrap()).unwrap();

    let manager = CacheManager::new(CacheBuilder::new().configure(&settings).unwrap().build());
    assert_eq!(
        manager.names(),
        vec![
            "legacy".to_string(),
            "local".to_string(),
            "shared".to_string()
        ]
    );
    assert_eq!(manager.default_provider().unwrap().name(), "local");
    assert_eq!(
        manager.resolve("shared").unwrap().kind(),
        ProviderKind::Redis
    );
}

#[test]
fn test_configure_ncache_without_connector_fails() {
    let file = helpers::settings_file(
        r#"
[[providers]]
kind = "ncache"

[providers.options]
cache_id = "demoCache"
"#,
    );
    let settings = CacheSettings::load(file.path().to_str().unwrap()).unwrap();
    let err = CacheBuilder::new().configure(&settings).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Configuration);
}
