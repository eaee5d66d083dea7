// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Account registration and login flows.
//!
//! Every flow connects a client through the [`ClientFactory`], and every
//! flow disconnects it again, whether it succeeds or fails.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{info, warn};

use herald_core::{
    Account, AccountCredentials, AccountStore, ClientFactory, ConnectionReport,
    ConnectionStatus, CredentialPrompt, HeraldError, MessagingClient, NewAccount, SelfInfo,
    SignInOutcome,
};

/// Result of a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Login {
    profile: SelfInfo,
    /// Password that completed sign-in, when one was needed.
    password: Option<String>,
}

/// Registers, re-authorizes, tests, and deletes account records.
pub struct AccountService {
    store: Arc<dyn AccountStore>,
    factory: Arc<dyn ClientFactory>,
    default_2fa: Option<String>,
}

impl AccountService {
    pub fn new(
        store: Arc<dyn AccountStore>,
        factory: Arc<dyn ClientFactory>,
        default_2fa: Option<String>,
    ) -> Self {
        Self {
            store,
            factory,
            default_2fa,
        }
    }

    pub fn store(&self) -> &Arc<dyn AccountStore> {
        &self.store
    }

    pub fn factory(&self) -> &Arc<dyn ClientFactory> {
        &self.factory
    }

    pub async fn list(&self) -> Result<Vec<Account>, HeraldError> {
        self.store.list_accounts().await
    }

    /// Logs a new account in and stores it. An existing record with the same
    /// phone is updated instead.
    pub async fn register(
        &self,
        api_id: i64,
        api_hash: &str,
        phone: &str,
        prompt: &dyn CredentialPrompt,
    ) -> Result<Account, HeraldError> {
        let api_hash = api_hash.trim();
        let phone = phone.trim();
        if api_id <= 0 || api_hash.is_empty() || phone.is_empty() {
            return Err(HeraldError::Validation(
                "API ID, API hash and phone are required".into(),
            ));
        }

        let credentials = AccountCredentials {
            api_id,
            api_hash: api_hash.to_string(),
            phone: phone.to_string(),
        };
        let login = self.login(&credentials, None, prompt).await?;

        let id = self
            .store
            .upsert_account(&NewAccount {
                api_id,
                api_hash: credentials.api_hash.clone(),
                phone: credentials.phone.clone(),
                twofa: login.password.or_else(|| self.default_2fa.clone()),
                user_id: Some(login.profile.user_id),
                username: login.profile.username.clone(),
                name: login.profile.display_name.clone(),
            })
            .await?;
        info!(%phone, id, "account registered");

        self.store
            .get_account(id)
            .await?
            .ok_or_else(|| HeraldError::not_found("account", id))
    }

    /// Re-authorizes an existing account and refreshes its stored profile.
    pub async fn refresh(
        &self,
        id: i64,
        prompt: &dyn CredentialPrompt,
    ) -> Result<Account, HeraldError> {
        let account = self.account(id).await?;
        let login = self
            .login(&account.credentials(), account.twofa.as_deref(), prompt)
            .await?;
        self.store.update_profile(id, &login.profile).await?;
        info!(phone = %account.phone, id, "account profile refreshed");
        self.account(id).await
    }

    /// Re-runs the login flow for an account whose connection test failed.
    ///
    /// A newly entered 2FA password replaces the stored one.
    pub async fn repair(
        &self,
        id: i64,
        prompt: &dyn CredentialPrompt,
    ) -> Result<Account, HeraldError> {
        let account = self.account(id).await?;
        let login = self
            .login(&account.credentials(), account.twofa.as_deref(), prompt)
            .await?;
        if let Some(password) = &login.password
            && account.twofa.as_deref() != Some(password.as_str())
        {
            self.store.update_twofa(id, password).await?;
        }
        self.store.update_profile(id, &login.profile).await?;
        info!(phone = %account.phone, id, "account repaired");
        self.account(id).await
    }

    /// Deletes the account record.
    pub async fn delete(&self, id: i64) -> Result<String, HeraldError> {
        let account = self.account(id).await?;
        if !self.store.delete_account(id).await? {
            return Err(HeraldError::not_found("account", id));
        }
        info!(phone = %account.phone, id, "account deleted");
        Ok(format!("Account {} deleted", account.phone))
    }

    /// Connects one account and reports whether its session is authorized.
    pub async fn test_connection(&self, id: i64) -> Result<ConnectionReport, HeraldError> {
        let account = self.account(id).await?;
        Ok(self.probe(&account).await)
    }

    /// Tests every stored account concurrently, in id order.
    pub async fn test_connections(&self) -> Result<Vec<ConnectionReport>, HeraldError> {
        let accounts = self.store.list_accounts().await?;
        Ok(join_all(accounts.iter().map(|account| self.probe(account))).await)
    }

    async fn probe(&self, account: &Account) -> ConnectionReport {
        let status = match self.factory.connect(&account.credentials()).await {
            Ok(client) => {
                let status = match client.is_authorized().await {
                    Ok(true) => ConnectionStatus::Authorized,
                    Ok(false) => ConnectionStatus::Unauthorized,
                    Err(e) => ConnectionStatus::Error(e.to_string()),
                };
                release(client.as_ref()).await;
                status
            }
            Err(e) => ConnectionStatus::Error(e.to_string()),
        };
        ConnectionReport {
            account_id: account.id,
            phone: account.phone.clone(),
            status,
        }
    }

    async fn account(&self, id: i64) -> Result<Account, HeraldError> {
        self.store
            .get_account(id)
            .await?
            .ok_or_else(|| HeraldError::not_found("account", id))
    }

    async fn login(
        &self,
        credentials: &AccountCredentials,
        stored_password: Option<&str>,
        prompt: &dyn CredentialPrompt,
    ) -> Result<Login, HeraldError> {
        let client = self.factory.connect(credentials).await?;
        let result = self.authorize(client.as_ref(), stored_password, prompt).await;
        release(client.as_ref()).await;
        result
    }

    async fn authorize(
        &self,
        client: &dyn MessagingClient,
        stored_password: Option<&str>,
        prompt: &dyn CredentialPrompt,
    ) -> Result<Login, HeraldError> {
        let phone = client.phone().to_string();
        let mut password = None;

        if !client.is_authorized().await? {
            client.request_login_code().await?;
            let code = prompt.login_code(&phone).await?;
            let code = code.trim();
            if code.is_empty() {
                return Err(HeraldError::authorization("login code is empty"));
            }

            if client.sign_in(code).await? == SignInOutcome::PasswordRequired {
                password = Some(self.complete_password(client, stored_password, prompt).await?);
            }
        }

        let profile = client.get_self().await?;
        Ok(Login { profile, password })
    }

    /// Tries the stored password, then the configured default, then asks.
    async fn complete_password(
        &self,
        client: &dyn MessagingClient,
        stored_password: Option<&str>,
        prompt: &dyn CredentialPrompt,
    ) -> Result<String, HeraldError> {
        let phone = client.phone();
        let mut candidates: Vec<&str> = Vec::new();
        for candidate in [stored_password, self.default_2fa.as_deref()]
            .into_iter()
            .flatten()
        {
            if !candidate.is_empty() && !candidates.contains(&candidate) {
                candidates.push(candidate);
            }
        }

        for candidate in candidates {
            match client.sign_in_with_password(candidate).await {
                Ok(()) => return Ok(candidate.to_string()),
                Err(HeraldError::Authorization { message, .. }) => {
                    warn!(%phone, reason = %message, "saved 2FA password rejected");
                }
                Err(e) => return Err(e),
            }
        }

        let entered = prompt.password(phone).await?;
        if entered.is_empty() {
            return Err(HeraldError::authorization("2FA password is required"));
        }
        client.sign_in_with_password(&entered).await?;
        Ok(entered)
    }
}

async fn release(client: &dyn MessagingClient) {
    if let Err(e) = client.disconnect().await {
        warn!(phone = %client.phone(), error = %e, "disconnect failed");
    }
}
