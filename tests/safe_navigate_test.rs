//! Tests for escalating navigation

use kodegen_tools_storybook::browser::NavigationTiming;
use kodegen_tools_storybook::{LoadState, StorybookError, safe_navigate};
use std::time::Duration;

mod common;
use common::{MockPage, NavBehavior};

const URL: &str = "http://localhost:6006/";

fn timing() -> NavigationTiming {
    NavigationTiming {
        timeout: Duration::from_millis(50),
        commit_settle: Duration::from_millis(5),
    }
}

#[tokio::test]
async fn test_first_strategy_wins() {
    common::init_test_logging();
    let page = MockPage::new();

    let state = safe_navigate(&page, URL, timing()).await.unwrap();

    assert_eq!(state, LoadState::DomContentLoaded);
    assert_eq!(page.navigations(), vec![(URL.to_string(), LoadState::DomContentLoaded)]);
}

#[tokio::test]
async fn test_escalates_past_transient_failures() {
    let page = MockPage::new();
    page.set_behavior(LoadState::DomContentLoaded, NavBehavior::Timeout)
        .set_behavior(LoadState::Load, NavBehavior::NetworkError);

    let state = safe_navigate(&page, URL, timing()).await.unwrap();

    assert_eq!(state, LoadState::NetworkIdle);
    let tried: Vec<LoadState> = page.navigations().into_iter().map(|(_, s)| s).collect();
    assert_eq!(
        tried,
        vec![LoadState::DomContentLoaded, LoadState::Load, LoadState::NetworkIdle]
    );
}

#[tokio::test]
async fn test_commit_fallback_when_every_strategy_times_out() {
    let page = MockPage::new();
    for wait in LoadState::ESCALATION {
        page.set_behavior(wait, NavBehavior::Timeout);
    }

    let state = safe_navigate(&page, URL, timing()).await.unwrap();

    assert_eq!(state, LoadState::Commit);
    assert_eq!(page.navigations().len(), 4);
    assert_eq!(page.navigations().last().unwrap().1, LoadState::Commit);
}

#[tokio::test]
async fn test_fatal_error_aborts_immediately() {
    let page = MockPage::new();
    page.set_behavior(LoadState::DomContentLoaded, NavBehavior::Fatal);

    let err = safe_navigate(&page, URL, timing()).await.unwrap_err();

    assert!(matches!(err, StorybookError::Navigation { .. }));
    assert_eq!(page.navigations().len(), 1, "no further strategies after a fatal error");
}

#[tokio::test]
async fn test_fatal_error_mid_escalation_aborts() {
    let page = MockPage::new();
    page.set_behavior(LoadState::DomContentLoaded, NavBehavior::Timeout)
        .set_behavior(LoadState::Load, NavBehavior::Fatal);

    let err = safe_navigate(&page, URL, timing()).await.unwrap_err();

    assert!(matches!(err, StorybookError::Navigation { .. }));
    assert_eq!(page.navigations().len(), 2);
}

#[tokio::test]
async fn test_total_failure_reports_first_error() {
    let page = MockPage::new();
    page.set_behavior(LoadState::DomContentLoaded, NavBehavior::NetworkError)
        .set_behavior(LoadState::Load, NavBehavior::Timeout)
        .set_behavior(LoadState::NetworkIdle, NavBehavior::Timeout)
        .set_behavior(LoadState::Commit, NavBehavior::Timeout);

    let err = safe_navigate(&page, URL, timing()).await.unwrap_err();

    match err {
        StorybookError::Navigation { url, message } => {
            assert_eq!(url, URL);
            assert!(
                message.contains("ERR_CONNECTION_REFUSED"),
                "first (network) error should be surfaced, got: {message}"
            );
        }
        other => panic!("expected Navigation error, got {other:?}"),
    }
    assert_eq!(page.navigations().len(), 4);
}
