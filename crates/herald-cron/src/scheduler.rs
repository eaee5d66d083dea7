// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One-shot task scheduler persisted to a JSON file.
//!
//! Each pending task owns a timer task that sleeps until the task's
//! `execute_at` and then runs it. Timers are cancelled through a
//! per-task [`CancellationToken`] on delete, re-run, and shutdown.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDateTime};
use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use herald_core::HeraldError;
use herald_core::persist::{read_json, write_json};

use crate::task::{ScheduledTask, TaskSpec, execute};

/// Reported on the event channel each time a task finishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskEvent {
    pub id: u64,
    pub name: String,
    pub result: String,
    pub finished_at: NaiveDateTime,
}

struct State {
    tasks: BTreeMap<u64, ScheduledTask>,
    timers: HashMap<u64, CancellationToken>,
    next_id: u64,
}

struct Inner {
    path: PathBuf,
    state: Mutex<State>,
    events: mpsc::UnboundedSender<TaskEvent>,
}

/// Handle to the scheduler; clones share the same tasks.
#[derive(Clone)]
pub struct TaskScheduler {
    inner: Arc<Inner>,
}

impl TaskScheduler {
    /// Loads the tasks file and re-arms every pending task.
    ///
    /// Executed tasks and tasks with an unreadable time are dropped. Overdue
    /// tasks run immediately. A missing or unreadable file starts empty.
    pub async fn load(
        path: impl Into<PathBuf>,
    ) -> (Self, mpsc::UnboundedReceiver<TaskEvent>) {
        let path = path.into();
        let (tx, rx) = mpsc::unbounded_channel();

        let mut tasks = BTreeMap::new();
        match read_json::<BTreeMap<String, serde_json::Value>>(&path) {
            Ok(Some(raw)) => {
                for (key, value) in raw {
                    let Ok(id) = key.parse::<u64>() else {
                        warn!(task_id = %key, "skipping task with non-numeric id");
                        continue;
                    };
                    match serde_json::from_value::<ScheduledTask>(value) {
                        Ok(task) if !task.executed => {
                            tasks.insert(id, task);
                        }
                        Ok(_) => {}
                        Err(e) => warn!(task_id = id, error = %e, "skipping unreadable task"),
                    }
                }
            }
            Ok(None) => {}
            Err(e) => error!(path = %path.display(), error = %e, "failed to load tasks"),
        }

        let next_id = tasks.keys().next_back().map_or(1, |id| id + 1);
        let ids: Vec<u64> = tasks.keys().copied().collect();
        let scheduler = Self {
            inner: Arc::new(Inner {
                path,
                state: Mutex::new(State {
                    tasks,
                    timers: HashMap::new(),
                    next_id,
                }),
                events: tx,
            }),
        };

        {
            let mut state = scheduler.inner.state.lock().await;
            for id in &ids {
                scheduler.arm(&mut state, *id);
            }
        }
        info!(count = ids.len(), path = %scheduler.inner.path.display(), "scheduled tasks loaded");
        (scheduler, rx)
    }

    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Schedules a task to run `delay` from now.
    ///
    /// When the tasks file cannot be written the task stays scheduled and
    /// the persistence error is returned.
    pub async fn add(
        &self,
        name: &str,
        spec: TaskSpec,
        delay: Duration,
    ) -> Result<String, HeraldError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(HeraldError::Validation("Task name must not be empty".into()));
        }
        if spec.command.trim().is_empty() {
            return Err(HeraldError::Validation("Task command must not be empty".into()));
        }
        let offset = chrono::Duration::from_std(delay)
            .map_err(|_| HeraldError::Validation("Invalid delay".into()))?;
        let execute_at = Local::now().naive_local() + offset;

        let mut state = self.inner.state.lock().await;
        let id = state.next_id;
        state.next_id += 1;
        state.tasks.insert(
            id,
            ScheduledTask {
                name: name.to_string(),
                kind: spec.kind,
                command: spec.command,
                execute_at,
                executed: false,
                result: None,
            },
        );
        self.arm(&mut state, id);
        info!(task_id = id, name, execute_at = %execute_at, "task scheduled");

        self.persist(&state)?;
        Ok(format!(
            "Task '{name}' scheduled at {} with ID {id}",
            execute_at.format("%Y-%m-%d %H:%M:%S")
        ))
    }

    /// Pending tasks first, then executed ones, each in id order.
    pub async fn list(&self) -> Vec<(u64, ScheduledTask)> {
        let state = self.inner.state.lock().await;
        let (mut pending, executed): (Vec<_>, Vec<_>) = state
            .tasks
            .iter()
            .map(|(id, task)| (*id, task.clone()))
            .partition(|(_, task)| !task.executed);
        pending.extend(executed);
        pending
    }

    pub async fn get(&self, id: u64) -> Option<ScheduledTask> {
        self.inner.state.lock().await.tasks.get(&id).cloned()
    }

    pub async fn delete(&self, id: u64) -> Result<String, HeraldError> {
        let mut state = self.inner.state.lock().await;
        if state.tasks.remove(&id).is_none() {
            return Err(HeraldError::not_found("task", id));
        }
        if let Some(timer) = state.timers.remove(&id) {
            timer.cancel();
        }
        info!(task_id = id, "task deleted");
        self.persist(&state)?;
        Ok(format!("Task {id} deleted"))
    }

    /// Runs the task now, cancelling its pending timer. Executed tasks run
    /// again.
    pub async fn execute_now(&self, id: u64) -> Result<String, HeraldError> {
        let mut state = self.inner.state.lock().await;
        let task = state
            .tasks
            .get_mut(&id)
            .ok_or_else(|| HeraldError::not_found("task", id))?;
        task.execute_at = Local::now().naive_local();
        let name = task.name.clone();
        self.arm(&mut state, id);
        Ok(format!("Task '{name}' will run now"))
    }

    /// Cancels every timer. Tasks stay in the file and re-arm on next load.
    pub async fn shutdown(&self) {
        let mut state = self.inner.state.lock().await;
        for (_, timer) in state.timers.drain() {
            timer.cancel();
        }
    }

    pub async fn pending_count(&self) -> usize {
        self.inner
            .state
            .lock()
            .await
            .tasks
            .values()
            .filter(|t| !t.executed)
            .count()
    }

    /// Starts (or restarts) the timer for task `id`.
    fn arm(&self, state: &mut State, id: u64) {
        let Some(task) = state.tasks.get(&id) else {
            return;
        };
        let delay = (task.execute_at - Local::now().naive_local())
            .to_std()
            .unwrap_or(Duration::ZERO);

        let token = CancellationToken::new();
        if let Some(previous) = state.timers.insert(id, token.clone()) {
            previous.cancel();
        }

        let scheduler = self.clone();
        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => return,
                _ = tokio::time::sleep(delay) => {}
            }
            scheduler.fire(id, token).await;
        });
    }

    async fn fire(&self, id: u64, token: CancellationToken) {
        let Some(task) = self.get(id).await else {
            return;
        };
        let result = tokio::select! {
            biased;
            _ = token.cancelled() => return,
            result = execute(task.kind, &task.command) => result,
        };

        let mut state = self.inner.state.lock().await;
        if token.is_cancelled() {
            return;
        }
        state.timers.remove(&id);
        let Some(task) = state.tasks.get_mut(&id) else {
            return;
        };
        task.executed = true;
        task.result = Some(result.clone());
        let name = task.name.clone();
        info!(task_id = id, name = %name, result = %result, "task executed");

        if let Err(e) = self.persist(&state) {
            warn!(task_id = id, error = %e, "task result not saved");
        }
        let _ = self.inner.events.send(TaskEvent {
            id,
            name,
            result,
            finished_at: Local::now().naive_local(),
        });
    }

    fn persist(&self, state: &State) -> Result<(), HeraldError> {
        let document: BTreeMap<String, &ScheduledTask> = state
            .tasks
            .iter()
            .map(|(id, task)| (id.to_string(), task))
            .collect();
        write_json(&self.inner.path, &document).inspect_err(|e| {
            error!(path = %self.inner.path.display(), error = %e, "failed to save tasks");
        })
    }
}
