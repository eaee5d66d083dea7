// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Messaging client traits (Telegram, test mocks).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::HeraldError;
use crate::types::{AccountCredentials, ConversationId, InboundEvent, SelfInfo, SignInOutcome};

/// A connected session for one messaging account.
///
/// Implementations must be cheap to share behind an `Arc`: the responder
/// runtime holds one handle in the listener task and one in the delivery
/// worker for the same account.
#[async_trait]
pub trait MessagingClient: Send + Sync {
    /// Phone number (or account key) this client was created for.
    fn phone(&self) -> &str;

    /// Returns whether the session is logged in.
    async fn is_authorized(&self) -> Result<bool, HeraldError>;

    /// Asks the service to send a login code to the account.
    async fn request_login_code(&self) -> Result<(), HeraldError>;

    /// Submits the login code received by the account owner.
    async fn sign_in(&self, code: &str) -> Result<SignInOutcome, HeraldError>;

    /// Completes sign-in for accounts with two-step verification.
    async fn sign_in_with_password(&self, password: &str) -> Result<(), HeraldError>;

    /// Fetches the profile of the logged-in user.
    async fn get_self(&self) -> Result<SelfInfo, HeraldError>;

    /// Starts receiving new messages. Each call replaces any previous
    /// subscription.
    async fn subscribe(&self) -> Result<mpsc::Receiver<InboundEvent>, HeraldError>;

    /// Sends `text` as a reply to `event` in its conversation.
    async fn reply(&self, event: &InboundEvent, text: &str) -> Result<(), HeraldError>;

    /// Shows a typing indicator in `conversation` and returns once `duration`
    /// has elapsed.
    async fn simulate_typing(
        &self,
        conversation: ConversationId,
        duration: Duration,
    ) -> Result<(), HeraldError>;

    /// Ends the session and stops any subscription.
    async fn disconnect(&self) -> Result<(), HeraldError>;
}

/// Builds connected [`MessagingClient`]s from stored credentials.
#[async_trait]
pub trait ClientFactory: Send + Sync {
    /// Creates a client and connects it. If connecting fails the client is
    /// disconnected before the error is returned.
    async fn connect(
        &self,
        credentials: &AccountCredentials,
    ) -> Result<Arc<dyn MessagingClient>, HeraldError>;
}
