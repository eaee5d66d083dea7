// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Delivery worker timing and ordering on a paused clock.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing_test::traced_test;

use herald_agent::{AccountRuntime, DelayPolicy};
use herald_core::Account;
use herald_rules::{RuleStore, SharedRuleStore};
use herald_test_utils::MockClient;

fn rules(dir: &tempfile::TempDir, rules: &[(&str, &str)]) -> SharedRuleStore {
    let mut store = RuleStore::open(dir.path().join("rules.json"), "Default response");
    for (keyword, response) in rules {
        store.add(keyword, response, false).unwrap();
    }
    Arc::new(RwLock::new(store))
}

fn account(phone: &str) -> Account {
    Account {
        id: 1,
        api_id: 1,
        api_hash: "hash".into(),
        phone: phone.into(),
        twofa: None,
        user_id: None,
        username: None,
        name: None,
    }
}

async fn start(
    runtime: &AccountRuntime,
    phone: &str,
    base_delay: Duration,
) -> Arc<MockClient> {
    let client = Arc::new(MockClient::new(phone));
    runtime
        .activate(&account(phone), client.clone(), base_delay)
        .await
        .unwrap();
    client
}

#[tokio::test(start_paused = true)]
async fn replies_follow_match_order() {
    let dir = tempfile::tempdir().unwrap();
    let runtime = AccountRuntime::new(
        rules(&dir, &[("hi", "hello"), ("price", "DM me")]),
        DelayPolicy::default(),
    );
    let client = start(&runtime, "+100", Duration::from_secs(1)).await;

    assert!(client.inject_text(7, "hi there", false).await);
    assert!(client.inject_text(8, "what is the price?", true).await);
    assert!(client.inject_text(9, "ok cool", true).await);
    tokio::time::sleep(Duration::from_secs(200)).await;

    let replies = client.replies().await;
    assert_eq!(replies.len(), 2);
    assert_eq!(replies[0].text, "hello");
    assert_eq!(replies[0].conversation.0, 7);
    assert_eq!(replies[1].text, "DM me");
    assert_eq!(replies[1].conversation.0, 8);
    assert!(replies[0].sent_at <= replies[1].sent_at);

    runtime.stop_all().await;
}

#[tokio::test(start_paused = true)]
async fn delay_without_cooldown_stays_in_range() {
    let dir = tempfile::tempdir().unwrap();
    let runtime = AccountRuntime::new(rules(&dir, &[("hi", "hello")]), DelayPolicy::default());
    let client = start(&runtime, "+100", Duration::from_secs(1)).await;

    // Leave the cooldown window that starts at activation.
    tokio::time::sleep(Duration::from_secs(31)).await;
    let sent = Instant::now();
    client.inject_text(1, "hi", true).await;
    tokio::time::sleep(Duration::from_secs(60)).await;

    let replies = client.replies().await;
    assert_eq!(replies.len(), 1);
    let elapsed = replies[0].sent_at - sent;
    // [0.5, 1.5] response delay + [0.8, 1.2] typing + 0.5 pacing
    assert!(elapsed >= Duration::from_millis(1_790), "{elapsed:?}");
    assert!(elapsed <= Duration::from_millis(3_210), "{elapsed:?}");

    let typing = client.typing_records().await;
    assert_eq!(typing.len(), 1);
    assert!(typing[0].duration >= Duration::from_millis(790));
    assert!(typing[0].duration <= Duration::from_millis(1_210));
}

#[tokio::test(start_paused = true)]
async fn reply_inside_cooldown_window_is_penalized() {
    let dir = tempfile::tempdir().unwrap();
    let runtime = AccountRuntime::new(rules(&dir, &[("hi", "hello")]), DelayPolicy::default());
    let client = start(&runtime, "+100", Duration::from_secs(1)).await;

    let sent = Instant::now();
    client.inject_text(1, "hi", true).await;
    tokio::time::sleep(Duration::from_secs(120)).await;

    let replies = client.replies().await;
    assert_eq!(replies.len(), 1);
    let elapsed = replies[0].sent_at - sent;
    // penalty of [10, 40] on top of the regular stages
    assert!(elapsed >= Duration::from_millis(11_790), "{elapsed:?}");
    assert!(elapsed <= Duration::from_millis(43_210), "{elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn deactivation_discards_queued_items() {
    let dir = tempfile::tempdir().unwrap();
    let runtime = AccountRuntime::new(rules(&dir, &[("hi", "hello")]), DelayPolicy::default());
    let client = start(&runtime, "+100", Duration::from_secs(30)).await;

    for conversation in 1..=3 {
        client.inject_text(conversation, "hi", true).await;
    }
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(runtime.active_accounts().await[0].pending, 2);

    let started = Instant::now();
    runtime.deactivate("+100").await.unwrap();
    assert!(started.elapsed() < Duration::from_secs(1));
    assert!(!runtime.is_active("+100").await);
    assert_eq!(client.disconnect_count(), 1);
    assert!(!client.is_subscribed().await);

    tokio::time::sleep(Duration::from_secs(600)).await;
    assert!(client.replies().await.is_empty());
}

#[tokio::test(start_paused = true)]
#[traced_test]
async fn failed_delivery_is_logged_and_worker_continues() {
    let dir = tempfile::tempdir().unwrap();
    let runtime = AccountRuntime::new(rules(&dir, &[("hi", "hello")]), DelayPolicy::default());
    let client = start(&runtime, "+100", Duration::from_secs(1)).await;

    client.fail_replies(true);
    client.inject_text(1, "hi", true).await;
    tokio::time::sleep(Duration::from_secs(100)).await;
    assert!(client.replies().await.is_empty());
    assert!(logs_contain("delivery failed"));

    client.fail_replies(false);
    client.inject_text(2, "hi again", true).await;
    tokio::time::sleep(Duration::from_secs(100)).await;
    assert_eq!(client.reply_texts().await, vec!["hello"]);
    assert!(runtime.is_active("+100").await);
}

#[tokio::test(start_paused = true)]
async fn rule_edits_apply_to_active_accounts() {
    let dir = tempfile::tempdir().unwrap();
    let store = rules(&dir, &[("hi", "hello")]);
    let runtime = AccountRuntime::new(store.clone(), DelayPolicy::default());
    let client = start(&runtime, "+100", Duration::from_secs(1)).await;

    store.write().await.add("bye", "see you", false).unwrap();
    client.inject_text(1, "bye now", false).await;
    tokio::time::sleep(Duration::from_secs(100)).await;

    assert_eq!(client.reply_texts().await, vec!["see you"]);
}
