// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wiring of stores, the responder runtime, the task scheduler, and the
//! work cycle for one process.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use tokio::sync::{RwLock, mpsc};
use tracing::{info, warn};

use herald_agent::{AccountRuntime, AccountService, DelayPolicy};
use herald_config::HeraldConfig;
use herald_core::{AccountStore, ClientFactory, HeraldError};
use herald_cron::{TaskEvent, TaskScheduler, WorkCycle};
use herald_rules::{RuleStore, SharedRuleStore};
use herald_storage::SqliteAccountStore;

use crate::status::StatusReport;

/// Everything the operator console drives.
pub struct App {
    pub config: HeraldConfig,
    pub rules: SharedRuleStore,
    pub accounts: Arc<SqliteAccountStore>,
    pub service: AccountService,
    pub runtime: AccountRuntime,
    pub scheduler: TaskScheduler,
    pub work_cycle: WorkCycle,
    task_events: Mutex<mpsc::UnboundedReceiver<TaskEvent>>,
    started_at: Instant,
}

impl App {
    /// Opens the account database and rule file, and re-arms pending tasks.
    pub async fn open(
        config: HeraldConfig,
        factory: Arc<dyn ClientFactory>,
    ) -> Result<Self, HeraldError> {
        let accounts = Arc::new(SqliteAccountStore::open(&config.storage).await?);
        let rules: SharedRuleStore = Arc::new(RwLock::new(RuleStore::open(
            &config.rules.rules_file,
            config.rules.default_response.clone(),
        )));
        let runtime = AccountRuntime::new(
            rules.clone(),
            DelayPolicy::from_config(&config.responder),
        );
        let service = AccountService::new(
            accounts.clone(),
            factory,
            config.accounts.default_2fa.clone(),
        );
        let (scheduler, task_events) = TaskScheduler::load(&config.tasks.tasks_file).await;
        let work_cycle = WorkCycle::from_config(&config.work_cycle);

        info!(
            rules = rules.read().await.len(),
            accounts = accounts.count_accounts().await?,
            "herald started"
        );

        Ok(Self {
            config,
            rules,
            accounts,
            service,
            runtime,
            scheduler,
            work_cycle,
            task_events: Mutex::new(task_events),
            started_at: Instant::now(),
        })
    }

    /// Task completions reported since the last call.
    pub fn drain_task_events(&self) -> Vec<TaskEvent> {
        let Ok(mut events) = self.task_events.lock() else {
            warn!("task event receiver poisoned");
            return Vec::new();
        };
        let mut drained = Vec::new();
        while let Ok(event) = events.try_recv() {
            drained.push(event);
        }
        drained
    }

    pub async fn status(&self) -> Result<StatusReport, HeraldError> {
        let cycle = self.work_cycle.status().await;
        Ok(StatusReport {
            running: true,
            uptime_secs: Some(self.started_at.elapsed().as_secs()),
            total_accounts: self.accounts.count_accounts().await?,
            active_accounts: self.runtime.active_count().await,
            rules: self.rules.read().await.len(),
            pending_tasks: Some(self.scheduler.pending_count().await),
            work_cycle_running: Some(cycle.running),
            work_cycle_iteration: Some(cycle.iteration),
        })
    }

    /// Stops every active account, the work cycle, and the task timers.
    pub async fn shutdown(&self) {
        let stopped = self.runtime.stop_all().await;
        self.work_cycle.stop().await;
        self.scheduler.shutdown().await;
        info!(stopped_accounts = stopped, "herald shut down");
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use herald_agent::{AccountSelection, activate_plan, plan_activation};
    use herald_cron::TaskSpec;
    use herald_test_utils::TestHarness;

    async fn open_app(harness: &TestHarness) -> App {
        App::open(harness.config.clone(), harness.factory.clone())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn status_reports_accounts_and_rules() {
        let harness = TestHarness::builder()
            .with_rule("hi", &["hello"], false)
            .with_account("+15550001")
            .with_account("+15550002")
            .build()
            .await
            .unwrap();
        let app = open_app(&harness).await;

        let report = app.status().await.unwrap();
        assert!(report.running);
        assert_eq!(report.total_accounts, 2);
        assert_eq!(report.active_accounts, 0);
        assert_eq!(report.rules, 1);
        assert_eq!(report.pending_tasks, Some(0));
        assert_eq!(report.work_cycle_running, Some(false));
    }

    #[tokio::test]
    async fn shutdown_stops_active_accounts() {
        let harness = TestHarness::builder()
            .with_rule("hi", &["hello"], false)
            .with_account("+15550001")
            .build()
            .await
            .unwrap();
        let mut config = harness.config.clone();
        config.responder.activation_stagger_ms = 0;
        let app = App::open(config, harness.factory.clone()).await.unwrap();

        let accounts = app.service.list().await.unwrap();
        let selected = AccountSelection::All
            .pick(&accounts, &mut rand::thread_rng())
            .unwrap();
        let plan = plan_activation(
            selected,
            Duration::from_secs(10),
            app.runtime.policy(),
            &mut rand::thread_rng(),
        );
        let report = activate_plan(&app.runtime, app.service.factory().as_ref(), plan)
            .await
            .unwrap();
        assert_eq!(report.started, vec!["+15550001".to_string()]);
        app.work_cycle.start().await;

        app.shutdown().await;

        assert_eq!(app.runtime.active_count().await, 0);
        assert!(!app.work_cycle.status().await.running);
        assert_eq!(harness.client("+15550001").await.unwrap().disconnect_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn finished_tasks_are_drained_once() {
        let harness = TestHarness::builder().build().await.unwrap();
        let app = open_app(&harness).await;
        app.scheduler
            .add("note", TaskSpec::reminder("water plants"), Duration::from_secs(5))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_secs(6)).await;
        tokio::task::yield_now().await;

        let events = app.drain_task_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].result, "REMINDER: water plants");
        assert!(app.drain_task_events().is_empty());
    }
}
