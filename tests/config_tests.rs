//! Tests for the type-safe configuration builder pattern

use kodegen_tools_storybook::{StorybookConfig, StorybookError};
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_builder_requires_base_url() {
    // This should not compile if uncommented - build() needs a base URL
    // let config = StorybookConfig::builder().build();

    let config = StorybookConfig::builder()
        .base_url("http://localhost:6006")
        .build()
        .unwrap();

    assert_eq!(config.base_url(), "http://localhost:6006");
}

#[test]
fn test_builder_optional_fields_have_defaults() {
    let config = StorybookConfig::builder()
        .base_url("https://storybook.example.com")
        .build()
        .unwrap();

    assert!(config.headless());
    assert_eq!(config.navigation_timeout(), Duration::from_secs(30));
    assert_eq!(config.cache_ttl(), Duration::from_secs(300));
    assert_eq!(config.index_timeout(), Duration::from_secs(10));
    assert_eq!(config.commit_settle(), Duration::from_secs(2));
    assert_eq!(config.render_settle(), Duration::from_secs(2));
    assert_eq!(config.expand_settle(), Duration::from_secs(1));
    assert_eq!(config.window_size(), (1920, 1080));
    assert_eq!(config.chrome_data_dir(), None);
}

#[test]
fn test_builder_with_all_optional_fields() {
    let temp_dir = TempDir::new().unwrap();

    let config = StorybookConfig::builder()
        .headless(false)
        .navigation_timeout(Duration::from_secs(45))
        .base_url("https://design.example.com/storybook/")
        .cache_ttl(Duration::from_secs(60))
        .index_timeout(Duration::from_secs(3))
        .commit_settle(Duration::from_millis(250))
        .render_settle(Duration::from_millis(750))
        .expand_settle(Duration::from_millis(100))
        .window_size(1280, 800)
        .chrome_data_dir(temp_dir.path())
        .build()
        .unwrap();

    assert_eq!(config.base_url(), "https://design.example.com/storybook");
    assert!(!config.headless());
    assert_eq!(config.navigation_timeout(), Duration::from_secs(45));
    assert_eq!(config.cache_ttl(), Duration::from_secs(60));
    assert_eq!(config.index_timeout(), Duration::from_secs(3));
    assert_eq!(config.commit_settle(), Duration::from_millis(250));
    assert_eq!(config.render_settle(), Duration::from_millis(750));
    assert_eq!(config.expand_settle(), Duration::from_millis(100));
    assert_eq!(config.window_size(), (1280, 800));
    assert_eq!(
        config.chrome_data_dir(),
        Some(&PathBuf::from(temp_dir.path()))
    );
}

#[test]
fn test_base_url_normalized() {
    let cases = [
        ("http://localhost:6006/", "http://localhost:6006"),
        ("https://sb.example.com/?path=/story/button--primary", "https://sb.example.com"),
        ("https://sb.example.com/v2/index.html", "https://sb.example.com/v2"),
        ("  https://sb.example.com/v2/  ", "https://sb.example.com/v2"),
    ];

    for (raw, expected) in cases {
        let config = StorybookConfig::builder().base_url(raw).build().unwrap();
        assert_eq!(config.base_url(), expected, "normalizing {raw:?}");
    }
}

#[test]
fn test_non_http_base_urls_rejected() {
    for raw in ["", "localhost:6006", "ftp://sb.example.com", "file:///srv/storybook", "javascript:alert(1)"] {
        let result = StorybookConfig::builder().base_url(raw).build();
        assert!(
            matches!(result, Err(StorybookError::Configuration(_))),
            "{raw:?} should be rejected"
        );
    }
}

#[test]
fn test_config_serializes() {
    let config = StorybookConfig::builder()
        .base_url("http://localhost:6006")
        .build()
        .unwrap();

    let json = serde_json::to_value(&config).unwrap();
    assert_eq!(json["base_url"], "http://localhost:6006");
    assert_eq!(json["navigation_timeout_ms"], 30_000);

    let back: StorybookConfig = serde_json::from_value(json).unwrap();
    assert_eq!(back.base_url(), config.base_url());
}
