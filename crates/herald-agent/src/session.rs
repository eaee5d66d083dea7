// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Runtime state of one active account.
//!
//! An [`AccountSession`] owns everything that lives only while the account
//! is active: the inbound listener task, the delivery worker task, the
//! queue between them, the cooldown clock, and the response history.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use herald_core::{HeraldError, InboundEvent, MessagingClient};
use herald_rules::{ResponseHistory, SharedRuleStore, select_response};

use crate::delivery::{DeliveryWorker, QueueItem};
use crate::policy::DelayPolicy;

/// State touched by both the listener and the worker.
pub(crate) struct SessionShared {
    pub(crate) phone: String,
    /// Time of the last successful reply; starts at activation.
    pub(crate) last_response_at: Mutex<Instant>,
    /// Items queued but not yet picked up by the worker.
    pub(crate) pending: AtomicUsize,
    producer: Mutex<ProducerState>,
    queue: mpsc::UnboundedSender<QueueItem>,
}

struct ProducerState {
    history: ResponseHistory,
    rng: StdRng,
}

impl SessionShared {
    /// Classifies an inbound message and queues a reply when a rule matches.
    ///
    /// Never blocks on the network or sleeps.
    pub(crate) async fn on_inbound(
        &self,
        event: InboundEvent,
        rules: &SharedRuleStore,
        policy: &DelayPolicy,
    ) {
        let matched = {
            let store = rules.read().await;
            store
                .find_match(event.text.as_deref(), event.is_private)
                .map(|(id, rule)| (id.to_string(), rule.clone()))
        };
        let Some((rule_id, rule)) = matched else {
            return;
        };

        let since_last = self.last_response_at.lock().await.elapsed();
        let (response, extra_delay) = {
            let mut producer = self.producer.lock().await;
            let ProducerState { history, rng } = &mut *producer;
            let response = select_response(&rule_id, &rule, history, rng);
            (response, policy.cooldown_penalty(since_last, rng))
        };
        if response.trim().is_empty() {
            warn!(phone = %self.phone, rule_id = %rule_id, "matched rule has no response, ignoring");
            return;
        }

        debug!(
            phone = %self.phone,
            rule_id = %rule_id,
            conversation = %event.conversation,
            extra_delay = ?extra_delay,
            "queued auto-response"
        );
        let item = QueueItem {
            event,
            response,
            rule_id,
            extra_delay,
        };
        self.pending.fetch_add(1, Ordering::Relaxed);
        if self.queue.send(item).is_err() {
            self.pending.fetch_sub(1, Ordering::Relaxed);
            warn!(phone = %self.phone, "delivery queue closed, message dropped");
        }
    }
}

/// Snapshot of an active account for status displays.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionInfo {
    pub account_id: i64,
    pub phone: String,
    pub base_delay: Duration,
    pub active_for: Duration,
    pub pending: usize,
    /// False once the inbound subscription has closed; the account then
    /// stays registered until it is deactivated.
    pub listening: bool,
}

/// An active account: listener and worker tasks plus their shared state.
pub struct AccountSession {
    account_id: i64,
    base_delay: Duration,
    activated_at: Instant,
    shared: Arc<SessionShared>,
    client: Arc<dyn MessagingClient>,
    cancel: CancellationToken,
    listener: JoinHandle<()>,
    worker: JoinHandle<()>,
}

impl AccountSession {
    /// Spawns the listener and worker for a connected, authorized client.
    pub(crate) fn start(
        account_id: i64,
        client: Arc<dyn MessagingClient>,
        events: mpsc::Receiver<InboundEvent>,
        rules: SharedRuleStore,
        policy: DelayPolicy,
        base_delay: Duration,
    ) -> Self {
        let phone = client.phone().to_string();
        let activated_at = Instant::now();
        let (tx, rx) = mpsc::unbounded_channel();
        let shared = Arc::new(SessionShared {
            phone,
            last_response_at: Mutex::new(activated_at),
            pending: AtomicUsize::new(0),
            producer: Mutex::new(ProducerState {
                history: ResponseHistory::new(),
                rng: StdRng::from_entropy(),
            }),
            queue: tx,
        });
        let cancel = CancellationToken::new();

        let worker = tokio::spawn(
            DeliveryWorker::new(
                client.clone(),
                shared.clone(),
                policy.clone(),
                base_delay,
                rx,
                cancel.clone(),
            )
            .run(),
        );
        let listener = tokio::spawn(listen(
            shared.clone(),
            events,
            rules,
            policy,
            cancel.clone(),
        ));

        Self {
            account_id,
            base_delay,
            activated_at,
            shared,
            client,
            cancel,
            listener,
            worker,
        }
    }

    pub fn phone(&self) -> &str {
        &self.shared.phone
    }

    pub fn info(&self) -> SessionInfo {
        SessionInfo {
            account_id: self.account_id,
            phone: self.shared.phone.clone(),
            base_delay: self.base_delay,
            active_for: self.activated_at.elapsed(),
            pending: self.shared.pending.load(Ordering::Relaxed),
            listening: !self.listener.is_finished(),
        }
    }

    /// Signals both tasks to stop without waiting for them.
    pub(crate) fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Stops both tasks, discards queued items, and disconnects the client.
    pub(crate) async fn shutdown(self) -> Result<(), HeraldError> {
        self.cancel.cancel();
        for (task, handle) in [("listener", self.listener), ("worker", self.worker)] {
            if let Err(e) = handle.await
                && !e.is_cancelled()
            {
                warn!(phone = %self.shared.phone, task, error = %e, "session task panicked");
            }
        }
        self.client.disconnect().await
    }
}

async fn listen(
    shared: Arc<SessionShared>,
    mut events: mpsc::Receiver<InboundEvent>,
    rules: SharedRuleStore,
    policy: DelayPolicy,
    cancel: CancellationToken,
) {
    loop {
        let event = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            event = events.recv() => match event {
                Some(event) => event,
                None => {
                    warn!(phone = %shared.phone, "message subscription closed, account no longer receives messages");
                    break;
                }
            },
        };
        shared.on_inbound(event, &rules, &policy).await;
    }
    debug!(phone = %shared.phone, "listener stopped");
}
