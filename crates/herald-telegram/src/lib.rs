// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram messaging client for Herald.
//!
//! Implements [`MessagingClient`] over the Telegram Bot API via teloxide.
//! A bot account is stored like any other account: `api_id` holds the
//! numeric bot id and `api_hash` the secret half of the bot token, so the
//! token is `"{api_id}:{api_hash}"`. Bots are authorized by their token
//! alone and never go through the code/password login.

pub mod handler;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use herald_core::error::HeraldError;
use herald_core::traits::{ClientFactory, MessagingClient};
use herald_core::types::{
    AccountCredentials, ConversationId, InboundEvent, SelfInfo, SignInOutcome,
};
use teloxide::prelude::*;
use teloxide::types::{ChatAction, MessageId, ReplyParameters};
use teloxide::{ApiError, RequestError};
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Telegram keeps a typing indicator visible for about five seconds.
const TYPING_REFRESH: Duration = Duration::from_secs(4);

const EVENT_BUFFER: usize = 100;

/// Builds the bot token from stored credentials.
pub fn bot_token(credentials: &AccountCredentials) -> Result<String, HeraldError> {
    let secret = credentials.api_hash.trim();
    if credentials.api_id <= 0 {
        return Err(HeraldError::Validation(
            "bot id (API ID) must be a positive number".into(),
        ));
    }
    if secret.is_empty() || secret.contains(':') || secret.contains(char::is_whitespace) {
        return Err(HeraldError::Validation(
            "bot secret (API hash) must be a single non-empty token".into(),
        ));
    }
    Ok(format!("{}:{secret}", credentials.api_id))
}

/// A Telegram bot session for one account.
pub struct TelegramClient {
    bot: Bot,
    phone: String,
    polling_handle: Mutex<Option<JoinHandle<()>>>,
}

impl TelegramClient {
    pub fn new(credentials: &AccountCredentials) -> Result<Self, HeraldError> {
        let token = bot_token(credentials)?;
        Ok(Self {
            bot: Bot::new(token),
            phone: credentials.phone.clone(),
            polling_handle: Mutex::new(None),
        })
    }

    /// Returns a reference to the underlying teloxide Bot.
    pub fn bot(&self) -> &Bot {
        &self.bot
    }
}

fn client_error(context: &str, e: RequestError) -> HeraldError {
    HeraldError::Client {
        message: format!("{context}: {e}"),
        source: Some(Box::new(e)),
    }
}

fn delivery_error(context: &str, e: RequestError) -> HeraldError {
    HeraldError::Delivery {
        message: format!("{context}: {e}"),
        source: Some(Box::new(e)),
    }
}

fn token_login_only() -> HeraldError {
    HeraldError::authorization("bot accounts sign in with their token, not a login code")
}

#[async_trait]
impl MessagingClient for TelegramClient {
    fn phone(&self) -> &str {
        &self.phone
    }

    async fn is_authorized(&self) -> Result<bool, HeraldError> {
        match self.bot.get_me().await {
            Ok(_) => Ok(true),
            Err(RequestError::Api(ApiError::InvalidToken)) => Ok(false),
            Err(e) => Err(client_error("Telegram getMe failed", e)),
        }
    }

    async fn request_login_code(&self) -> Result<(), HeraldError> {
        Err(token_login_only())
    }

    async fn sign_in(&self, _code: &str) -> Result<SignInOutcome, HeraldError> {
        Err(token_login_only())
    }

    async fn sign_in_with_password(&self, _password: &str) -> Result<(), HeraldError> {
        Err(token_login_only())
    }

    async fn get_self(&self) -> Result<SelfInfo, HeraldError> {
        let me = self
            .bot
            .get_me()
            .await
            .map_err(|e| client_error("Telegram getMe failed", e))?;
        let user_id = i64::try_from(me.user.id.0)
            .map_err(|_| HeraldError::Internal(format!("user id {} out of range", me.user.id.0)))?;
        Ok(SelfInfo {
            user_id,
            username: me.user.username.clone(),
            display_name: Some(me.user.full_name()),
        })
    }

    async fn subscribe(&self) -> Result<mpsc::Receiver<InboundEvent>, HeraldError> {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let bot = self.bot.clone();
        let phone = self.phone.clone();

        info!(phone = %phone, "starting Telegram long polling");

        let handle = tokio::spawn(async move {
            let handler = Update::filter_message().endpoint(move |msg: Message| {
                let tx = tx.clone();
                async move {
                    match handler::to_inbound_event(&msg) {
                        Some(event) => {
                            if tx.send(event).await.is_err() {
                                warn!("inbound channel closed, dropping message");
                            }
                        }
                        None => debug!(msg_id = msg.id.0, "ignoring non-text message"),
                    }
                    respond(())
                }
            });

            Dispatcher::builder(bot, handler)
                .default_handler(|_| async {})
                .build()
                .dispatch()
                .await;
            debug!(phone = %phone, "Telegram polling ended");
        });

        if let Some(previous) = self.polling_handle.lock().await.replace(handle) {
            previous.abort();
        }
        Ok(rx)
    }

    async fn reply(&self, event: &InboundEvent, text: &str) -> Result<(), HeraldError> {
        let mut request = self.bot.send_message(ChatId(event.conversation.0), text);
        if let Ok(id) = i32::try_from(event.message_id) {
            request = request
                .reply_parameters(ReplyParameters::new(MessageId(id)).allow_sending_without_reply());
        }
        request
            .await
            .map_err(|e| delivery_error("failed to send message", e))?;
        Ok(())
    }

    async fn simulate_typing(
        &self,
        conversation: ConversationId,
        duration: Duration,
    ) -> Result<(), HeraldError> {
        let deadline = tokio::time::Instant::now() + duration;
        loop {
            let now = tokio::time::Instant::now();
            if now >= deadline {
                return Ok(());
            }
            self.bot
                .send_chat_action(ChatId(conversation.0), ChatAction::Typing)
                .await
                .map_err(|e| delivery_error("failed to send typing indicator", e))?;
            tokio::time::sleep(TYPING_REFRESH.min(deadline - now)).await;
        }
    }

    async fn disconnect(&self) -> Result<(), HeraldError> {
        if let Some(handle) = self.polling_handle.lock().await.take() {
            handle.abort();
            debug!(phone = %self.phone, "Telegram polling stopped");
        }
        Ok(())
    }
}

/// Creates [`TelegramClient`]s from stored account credentials.
#[derive(Debug, Default, Clone, Copy)]
pub struct TelegramClientFactory;

#[async_trait]
impl ClientFactory for TelegramClientFactory {
    async fn connect(
        &self,
        credentials: &AccountCredentials,
    ) -> Result<Arc<dyn MessagingClient>, HeraldError> {
        let client = TelegramClient::new(credentials)?;
        Ok(Arc::new(client))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials(api_id: i64, api_hash: &str) -> AccountCredentials {
        AccountCredentials {
            api_id,
            api_hash: api_hash.into(),
            phone: "+15550001".into(),
        }
    }

    #[test]
    fn token_joins_id_and_secret() {
        let token = bot_token(&credentials(123456, " AAE-secret ")).unwrap();
        assert_eq!(token, "123456:AAE-secret");
    }

    #[test]
    fn malformed_credentials_are_rejected() {
        assert!(bot_token(&credentials(0, "secret")).is_err());
        assert!(bot_token(&credentials(1, "")).is_err());
        assert!(bot_token(&credentials(1, "a:b")).is_err());
        assert!(bot_token(&credentials(1, "has space")).is_err());
    }

    #[tokio::test]
    async fn factory_builds_client_without_network() {
        let client = TelegramClientFactory
            .connect(&credentials(42, "secret"))
            .await
            .unwrap();
        assert_eq!(client.phone(), "+15550001");
        client.disconnect().await.unwrap();
    }

    #[tokio::test]
    async fn code_login_is_not_supported() {
        let client = TelegramClient::new(&credentials(42, "secret")).unwrap();
        assert!(matches!(
            client.request_login_code().await,
            Err(HeraldError::Authorization { .. })
        ));
        assert!(matches!(
            client.sign_in("12345").await,
            Err(HeraldError::Authorization { .. })
        ));
    }
}
