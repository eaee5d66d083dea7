// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Registry of active accounts.
//!
//! [`AccountRuntime`] maps each active account's phone to its
//! [`AccountSession`]. Activation and deactivation are atomic per account:
//! an account is either fully registered (listener and worker running) or
//! absent.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::Mutex;
use tracing::{info, warn};

use herald_core::{Account, ClientFactory, HeraldError, MessagingClient};
use herald_rules::SharedRuleStore;

use crate::policy::DelayPolicy;
use crate::session::{AccountSession, SessionInfo};

/// Owns every active account session.
pub struct AccountRuntime {
    rules: SharedRuleStore,
    policy: DelayPolicy,
    sessions: Mutex<HashMap<String, AccountSession>>,
}

impl AccountRuntime {
    pub fn new(rules: SharedRuleStore, policy: DelayPolicy) -> Self {
        Self {
            rules,
            policy,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn rules(&self) -> &SharedRuleStore {
        &self.rules
    }

    pub fn policy(&self) -> &DelayPolicy {
        &self.policy
    }

    /// Connects the account through `factory` and activates it.
    pub async fn activate_account(
        &self,
        factory: &dyn ClientFactory,
        account: &Account,
        base_delay: Duration,
    ) -> Result<SessionInfo, HeraldError> {
        if self.is_active(&account.phone).await {
            return Err(HeraldError::AlreadyActive(account.phone.clone()));
        }
        let client = factory.connect(&account.credentials()).await?;
        self.activate(account, client, base_delay).await
    }

    /// Starts listening and delivering for an already connected client.
    ///
    /// On any failure the client is disconnected and the account stays
    /// inactive.
    pub async fn activate(
        &self,
        account: &Account,
        client: Arc<dyn MessagingClient>,
        base_delay: Duration,
    ) -> Result<SessionInfo, HeraldError> {
        let phone = account.phone.clone();
        if self.is_active(&phone).await {
            release(&client, &phone).await;
            return Err(HeraldError::AlreadyActive(phone));
        }

        match client.is_authorized().await {
            Ok(true) => {}
            Ok(false) => {
                release(&client, &phone).await;
                return Err(HeraldError::authorization(format!(
                    "account {phone} is not authorized"
                )));
            }
            Err(e) => {
                release(&client, &phone).await;
                return Err(e);
            }
        }

        let events = match client.subscribe().await {
            Ok(events) => events,
            Err(e) => {
                release(&client, &phone).await;
                return Err(e);
            }
        };

        let mut sessions = self.sessions.lock().await;
        if sessions.contains_key(&phone) {
            drop(sessions);
            release(&client, &phone).await;
            return Err(HeraldError::AlreadyActive(phone));
        }
        let session = AccountSession::start(
            account.id,
            client,
            events,
            self.rules.clone(),
            self.policy.clone(),
            base_delay,
        );
        let info = session.info();
        sessions.insert(phone.clone(), session);
        drop(sessions);

        info!(%phone, base_delay = ?base_delay, "auto-responder activated");
        Ok(info)
    }

    /// Stops the account's listener and worker, discards its queue, and
    /// disconnects it.
    pub async fn deactivate(&self, phone: &str) -> Result<String, HeraldError> {
        let session = self
            .sessions
            .lock()
            .await
            .remove(phone)
            .ok_or_else(|| HeraldError::not_found("active account", phone))?;

        if let Err(e) = session.shutdown().await {
            warn!(%phone, error = %e, "disconnect failed");
        }
        info!(%phone, "auto-responder deactivated");
        Ok(format!("Auto-responder stopped for {phone}"))
    }

    /// Deactivates every account. Returns how many were stopped.
    ///
    /// All sessions are cancelled before any disconnect is awaited, so one
    /// hung disconnect does not delay cancelling the others.
    pub async fn stop_all(&self) -> usize {
        let sessions: Vec<AccountSession> = {
            let mut map = self.sessions.lock().await;
            map.drain().map(|(_, session)| session).collect()
        };
        for session in &sessions {
            session.cancel();
        }

        let count = sessions.len();
        let results = join_all(sessions.into_iter().map(|session| async move {
            let phone = session.phone().to_string();
            (phone, session.shutdown().await)
        }))
        .await;
        for (phone, result) in results {
            match result {
                Ok(()) => info!(%phone, "auto-responder deactivated"),
                Err(e) => warn!(%phone, error = %e, "disconnect failed"),
            }
        }
        count
    }

    pub async fn is_active(&self, phone: &str) -> bool {
        self.sessions.lock().await.contains_key(phone)
    }

    pub async fn active_count(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Snapshots of every active account, ordered by account id.
    pub async fn active_accounts(&self) -> Vec<SessionInfo> {
        let mut infos: Vec<SessionInfo> = self
            .sessions
            .lock()
            .await
            .values()
            .map(AccountSession::info)
            .collect();
        infos.sort_by_key(|info| info.account_id);
        infos
    }
}

async fn release(client: &Arc<dyn MessagingClient>, phone: &str) {
    if let Err(e) = client.disconnect().await {
        warn!(%phone, error = %e, "disconnect failed");
    }
}
