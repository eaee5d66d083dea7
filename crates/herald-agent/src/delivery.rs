// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-account delivery worker.
//!
//! The worker drains the account's FIFO queue one item at a time. Every wait
//! (the poll, the response delay, the typing indicator, the send pacing, and
//! the reply call itself) races the session's [`CancellationToken`], so
//! deactivation interrupts a pending delay instead of waiting it out.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use herald_core::{HeraldError, InboundEvent, MessagingClient};

use crate::policy::DelayPolicy;
use crate::session::SessionShared;

/// A reply waiting to be delivered.
#[derive(Debug, Clone)]
pub struct QueueItem {
    /// The message being answered.
    pub event: InboundEvent,
    pub response: String,
    pub rule_id: String,
    /// Cooldown penalty computed when the item was queued.
    pub extra_delay: Duration,
}

/// Timing of one successful delivery.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeliveryTiming {
    pub response_delay: Duration,
    pub typing: Duration,
}

pub(crate) struct DeliveryWorker {
    client: Arc<dyn MessagingClient>,
    shared: Arc<SessionShared>,
    policy: DelayPolicy,
    base_delay: Duration,
    queue: mpsc::UnboundedReceiver<QueueItem>,
    cancel: CancellationToken,
    rng: StdRng,
}

impl DeliveryWorker {
    pub(crate) fn new(
        client: Arc<dyn MessagingClient>,
        shared: Arc<SessionShared>,
        policy: DelayPolicy,
        base_delay: Duration,
        queue: mpsc::UnboundedReceiver<QueueItem>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            client,
            shared,
            policy,
            base_delay,
            queue,
            cancel,
            rng: StdRng::from_entropy(),
        }
    }

    /// Runs until the session is cancelled or its queue is closed.
    pub(crate) async fn run(mut self) {
        let phone = self.shared.phone.clone();
        debug!(%phone, "delivery worker started");

        loop {
            let polled = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                polled = tokio::time::timeout(self.policy.poll_interval, self.queue.recv()) => polled,
            };
            let item = match polled {
                Err(_) => continue,
                Ok(None) => break,
                Ok(Some(item)) => item,
            };
            self.shared.pending.fetch_sub(1, Ordering::Relaxed);

            let rule_id = item.rule_id.clone();
            let sender = item.event.sender_id;
            match self.deliver(item).await {
                Ok(timing) => info!(
                    %phone,
                    sender = ?sender,
                    rule_id = %rule_id,
                    delay = ?timing.response_delay,
                    typing = ?timing.typing,
                    "auto-responded"
                ),
                Err(HeraldError::Cancelled) => break,
                Err(e) => {
                    error!(%phone, rule_id = %rule_id, error = %e, "delivery failed, message dropped");
                    if self.pause(self.policy.error_backoff).await.is_err() {
                        break;
                    }
                }
            }
        }

        debug!(%phone, "delivery worker stopped");
    }

    async fn deliver(&mut self, item: QueueItem) -> Result<DeliveryTiming, HeraldError> {
        let response_delay =
            self.policy
                .response_delay(self.base_delay, item.extra_delay, &mut self.rng);
        self.pause(response_delay).await?;

        let typing = self.policy.typing_duration(&item.response, &mut self.rng);
        self.cancellable(
            self.client
                .simulate_typing(item.event.conversation, typing),
        )
        .await?;

        self.pause(self.policy.send_pacing).await?;

        self.cancellable(self.client.reply(&item.event, &item.response))
            .await?;
        *self.shared.last_response_at.lock().await = Instant::now();

        Ok(DeliveryTiming {
            response_delay,
            typing,
        })
    }

    /// Sleeps for `duration` unless cancelled first.
    async fn pause(&self, duration: Duration) -> Result<(), HeraldError> {
        self.cancellable(async {
            tokio::time::sleep(duration).await;
            Ok(())
        })
        .await
    }

    async fn cancellable<F>(&self, fut: F) -> Result<(), HeraldError>
    where
        F: Future<Output = Result<(), HeraldError>>,
    {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(HeraldError::Cancelled),
            result = fut => result,
        }
    }
}
