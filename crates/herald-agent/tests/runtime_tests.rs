// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Activation, deactivation, and activation planning.

use std::sync::Arc;
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;

use herald_agent::{
    AccountRuntime, AccountSelection, DelayPolicy, activate_plan, plan_activation,
};
use herald_core::{AccountStore, HeraldError};
use herald_test_utils::{MockClient, TestHarness};

fn policy() -> DelayPolicy {
    DelayPolicy {
        activation_stagger: Duration::ZERO,
        ..DelayPolicy::default()
    }
}

async fn harness() -> TestHarness {
    TestHarness::builder()
        .with_rule("hi", &["hello"], false)
        .with_account("+100")
        .with_account("+200")
        .with_account("+300")
        .build()
        .await
        .unwrap()
}

#[tokio::test]
async fn unauthorized_account_is_refused_and_disconnected() {
    let h = harness().await;
    let runtime = AccountRuntime::new(h.rules.clone(), policy());
    let client = h.client("+100").await.unwrap();
    client.set_authorized(false);

    let account = h.account("+100").await.unwrap();
    let err = runtime
        .activate(&account, client.clone(), Duration::from_secs(1))
        .await
        .unwrap_err();

    assert!(matches!(err, HeraldError::Authorization { .. }));
    assert!(!runtime.is_active("+100").await);
    assert_eq!(client.disconnect_count(), 1);
}

#[tokio::test]
async fn second_activation_is_rejected() {
    let h = harness().await;
    let runtime = AccountRuntime::new(h.rules.clone(), policy());
    let account = h.account("+100").await.unwrap();

    let first = h.client("+100").await.unwrap();
    runtime
        .activate(&account, first.clone(), Duration::from_secs(1))
        .await
        .unwrap();

    let second = Arc::new(MockClient::new("+100"));
    let err = runtime
        .activate(&account, second.clone(), Duration::from_secs(1))
        .await
        .unwrap_err();
    assert!(matches!(err, HeraldError::AlreadyActive(_)));
    assert_eq!(second.disconnect_count(), 1);
    assert_eq!(first.disconnect_count(), 0);
    assert_eq!(runtime.active_count().await, 1);

    runtime.stop_all().await;
}

#[tokio::test]
async fn closed_subscription_is_reported_as_not_listening() {
    let h = harness().await;
    let runtime = AccountRuntime::new(h.rules.clone(), policy());
    let account = h.account("+100").await.unwrap();
    let client = h.client("+100").await.unwrap();
    runtime
        .activate(&account, client.clone(), Duration::from_secs(1))
        .await
        .unwrap();
    assert!(runtime.active_accounts().await[0].listening);

    client.close_subscription().await;
    tokio::time::timeout(Duration::from_secs(5), async {
        while runtime.active_accounts().await[0].listening {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("listener should stop after the subscription closes");

    assert!(runtime.is_active("+100").await);
    assert_eq!(runtime.stop_all().await, 1);
    assert_eq!(client.disconnect_count(), 1);
}

#[tokio::test]
async fn subscribe_failure_leaves_account_inactive() {
    let h = harness().await;
    let runtime = AccountRuntime::new(h.rules.clone(), policy());
    let client = h.client("+200").await.unwrap();
    client.fail_subscribe(true);

    let account = h.account("+200").await.unwrap();
    assert!(
        runtime
            .activate(&account, client.clone(), Duration::from_secs(1))
            .await
            .is_err()
    );
    assert_eq!(runtime.active_count().await, 0);
    assert_eq!(client.disconnect_count(), 1);
}

#[tokio::test]
async fn deactivating_unknown_account_is_not_found() {
    let h = harness().await;
    let runtime = AccountRuntime::new(h.rules.clone(), policy());
    assert!(matches!(
        runtime.deactivate("+999").await,
        Err(HeraldError::NotFound { .. })
    ));
}

#[tokio::test]
async fn stop_all_disconnects_every_account_despite_failures() {
    let h = harness().await;
    let runtime = AccountRuntime::new(h.rules.clone(), policy());
    for phone in ["+100", "+200", "+300"] {
        let account = h.account(phone).await.unwrap();
        runtime
            .activate_account(h.factory.as_ref(), &account, Duration::from_secs(5))
            .await
            .unwrap();
    }
    h.client("+200").await.unwrap().fail_disconnect(true);

    let active = runtime.active_accounts().await;
    assert_eq!(
        active.iter().map(|s| s.phone.as_str()).collect::<Vec<_>>(),
        vec!["+100", "+200", "+300"]
    );

    assert_eq!(runtime.stop_all().await, 3);
    assert_eq!(runtime.active_count().await, 0);
    for phone in ["+100", "+200", "+300"] {
        assert_eq!(h.client(phone).await.unwrap().disconnect_count(), 1);
    }
}

#[tokio::test]
async fn activation_plan_skips_failing_accounts() {
    let h = harness().await;
    let runtime = AccountRuntime::new(h.rules.clone(), policy());
    h.client("+200").await.unwrap().set_authorized(false);
    h.factory.fail_connect("+300").await;

    let accounts = h.accounts.list_accounts().await.unwrap();
    let mut rng = StdRng::seed_from_u64(11);
    let selected = AccountSelection::All.pick(&accounts, &mut rng).unwrap();
    let plan = plan_activation(selected, Duration::from_secs(30), runtime.policy(), &mut rng);

    let report = activate_plan(&runtime, h.factory.as_ref(), plan)
        .await
        .unwrap();
    assert_eq!(report.started, vec!["+100"]);
    assert_eq!(report.skipped.len(), 2);
    assert!(runtime.is_active("+100").await);
    assert!(!runtime.is_active("+200").await);

    let info = &runtime.active_accounts().await[0];
    assert!(info.base_delay >= Duration::from_millis(7_999));
    assert!(info.base_delay <= Duration::from_millis(12_001));

    runtime.stop_all().await;
}

#[tokio::test]
async fn activation_requires_rules() {
    let h = TestHarness::builder()
        .with_account("+100")
        .build()
        .await
        .unwrap();
    let runtime = AccountRuntime::new(h.rules.clone(), policy());
    let accounts = h.accounts.list_accounts().await.unwrap();
    let mut rng = StdRng::seed_from_u64(1);
    let plan = plan_activation(accounts, Duration::from_secs(10), runtime.policy(), &mut rng);

    let err = activate_plan(&runtime, h.factory.as_ref(), plan)
        .await
        .unwrap_err();
    assert!(matches!(err, HeraldError::Validation(_)));
    assert_eq!(runtime.active_count().await, 0);
}
