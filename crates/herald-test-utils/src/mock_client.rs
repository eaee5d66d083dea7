// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock messaging client for deterministic testing.
//!
//! `MockClient` implements `MessagingClient` with injectable inbound events,
//! captured replies and typing indicators, and switchable failures.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, mpsc};
use tokio::time::Instant;

use herald_core::{
    AccountCredentials, ClientFactory, ConversationId, HeraldError, InboundEvent,
    MessagingClient, SelfInfo, SignInOutcome,
};

/// A reply captured by [`MockClient::reply`].
#[derive(Debug, Clone, PartialEq)]
pub struct SentReply {
    pub conversation: ConversationId,
    /// Id of the message being answered.
    pub reply_to: i64,
    pub text: String,
    /// Virtual-clock instant the reply was sent.
    pub sent_at: Instant,
}

/// A typing indicator captured by [`MockClient::simulate_typing`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TypingRecord {
    pub conversation: ConversationId,
    pub duration: Duration,
}

/// A mock messaging account.
///
/// Starts authorized with no password. Login flows are scripted with
/// [`set_authorized`](Self::set_authorized),
/// [`require_password`](Self::require_password), and
/// [`expect_code`](Self::expect_code).
pub struct MockClient {
    phone: String,
    profile: SelfInfo,
    authorized: AtomicBool,
    expected_code: Mutex<Option<String>>,
    password: Mutex<Option<String>>,
    awaiting_password: AtomicBool,
    fail_reply: AtomicBool,
    fail_typing: AtomicBool,
    fail_subscribe: AtomicBool,
    fail_disconnect: AtomicBool,
    subscriber: Mutex<Option<mpsc::Sender<InboundEvent>>>,
    replies: Mutex<Vec<SentReply>>,
    typing: Mutex<Vec<TypingRecord>>,
    codes_requested: AtomicUsize,
    passwords_tried: Mutex<Vec<String>>,
    disconnects: AtomicUsize,
    next_message_id: AtomicI64,
}

impl MockClient {
    pub fn new(phone: impl Into<String>) -> Self {
        let phone = phone.into();
        let user_id = phone
            .chars()
            .filter(char::is_ascii_digit)
            .collect::<String>()
            .parse()
            .unwrap_or(1);
        Self {
            profile: SelfInfo {
                user_id,
                username: Some(format!("user{user_id}")),
                display_name: Some("Mock User".into()),
            },
            phone,
            authorized: AtomicBool::new(true),
            expected_code: Mutex::new(None),
            password: Mutex::new(None),
            awaiting_password: AtomicBool::new(false),
            fail_reply: AtomicBool::new(false),
            fail_typing: AtomicBool::new(false),
            fail_subscribe: AtomicBool::new(false),
            fail_disconnect: AtomicBool::new(false),
            subscriber: Mutex::new(None),
            replies: Mutex::new(Vec::new()),
            typing: Mutex::new(Vec::new()),
            codes_requested: AtomicUsize::new(0),
            passwords_tried: Mutex::new(Vec::new()),
            disconnects: AtomicUsize::new(0),
            next_message_id: AtomicI64::new(1),
        }
    }

    pub fn set_authorized(&self, authorized: bool) {
        self.authorized.store(authorized, Ordering::SeqCst);
    }

    /// Only `code` will be accepted by `sign_in`.
    pub async fn expect_code(&self, code: impl Into<String>) {
        *self.expected_code.lock().await = Some(code.into());
    }

    /// Makes `sign_in` ask for a password; only `password` is accepted.
    pub async fn require_password(&self, password: impl Into<String>) {
        *self.password.lock().await = Some(password.into());
    }

    pub fn fail_replies(&self, fail: bool) {
        self.fail_reply.store(fail, Ordering::SeqCst);
    }

    pub fn fail_typing(&self, fail: bool) {
        self.fail_typing.store(fail, Ordering::SeqCst);
    }

    pub fn fail_subscribe(&self, fail: bool) {
        self.fail_subscribe.store(fail, Ordering::SeqCst);
    }

    pub fn fail_disconnect(&self, fail: bool) {
        self.fail_disconnect.store(fail, Ordering::SeqCst);
    }

    /// Delivers `event` to the current subscriber.
    ///
    /// Returns `false` when nothing is subscribed.
    pub async fn inject(&self, event: InboundEvent) -> bool {
        let subscriber = self.subscriber.lock().await.clone();
        match subscriber {
            Some(tx) => tx.send(event).await.is_ok(),
            None => false,
        }
    }

    /// Injects a text message with a fresh message id.
    pub async fn inject_text(&self, conversation: i64, text: &str, is_private: bool) -> bool {
        let message_id = self.next_message_id.fetch_add(1, Ordering::SeqCst);
        self.inject(text_event(message_id, conversation, text, is_private))
            .await
    }

    pub async fn replies(&self) -> Vec<SentReply> {
        self.replies.lock().await.clone()
    }

    pub async fn reply_texts(&self) -> Vec<String> {
        self.replies
            .lock()
            .await
            .iter()
            .map(|r| r.text.clone())
            .collect()
    }

    pub async fn typing_records(&self) -> Vec<TypingRecord> {
        self.typing.lock().await.clone()
    }

    pub async fn passwords_tried(&self) -> Vec<String> {
        self.passwords_tried.lock().await.clone()
    }

    pub fn codes_requested(&self) -> usize {
        self.codes_requested.load(Ordering::SeqCst)
    }

    pub fn disconnect_count(&self) -> usize {
        self.disconnects.load(Ordering::SeqCst)
    }

    /// Drops the inbound sender as a lost connection would.
    pub async fn close_subscription(&self) {
        self.subscriber.lock().await.take();
    }

    pub async fn is_subscribed(&self) -> bool {
        self.subscriber
            .lock()
            .await
            .as_ref()
            .is_some_and(|tx| !tx.is_closed())
    }
}

/// Builds an inbound text message received now.
pub fn text_event(message_id: i64, conversation: i64, text: &str, is_private: bool) -> InboundEvent {
    InboundEvent {
        message_id,
        conversation: ConversationId(conversation),
        sender_id: Some(conversation),
        text: Some(text.to_string()),
        is_private,
        received_at: Utc::now(),
    }
}

#[async_trait]
impl MessagingClient for MockClient {
    fn phone(&self) -> &str {
        &self.phone
    }

    async fn is_authorized(&self) -> Result<bool, HeraldError> {
        Ok(self.authorized.load(Ordering::SeqCst))
    }

    async fn request_login_code(&self) -> Result<(), HeraldError> {
        self.codes_requested.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn sign_in(&self, code: &str) -> Result<SignInOutcome, HeraldError> {
        if let Some(expected) = self.expected_code.lock().await.as_deref()
            && expected != code
        {
            return Err(HeraldError::authorization("invalid login code"));
        }
        if self.password.lock().await.is_some() {
            self.awaiting_password.store(true, Ordering::SeqCst);
            return Ok(SignInOutcome::PasswordRequired);
        }
        self.authorized.store(true, Ordering::SeqCst);
        Ok(SignInOutcome::Authorized)
    }

    async fn sign_in_with_password(&self, password: &str) -> Result<(), HeraldError> {
        self.passwords_tried.lock().await.push(password.to_string());
        if !self.awaiting_password.load(Ordering::SeqCst) {
            return Err(HeraldError::authorization("no sign-in in progress"));
        }
        if self.password.lock().await.as_deref() != Some(password) {
            return Err(HeraldError::authorization("invalid password"));
        }
        self.awaiting_password.store(false, Ordering::SeqCst);
        self.authorized.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn get_self(&self) -> Result<SelfInfo, HeraldError> {
        if !self.authorized.load(Ordering::SeqCst) {
            return Err(HeraldError::authorization("not authorized"));
        }
        Ok(self.profile.clone())
    }

    async fn subscribe(&self) -> Result<mpsc::Receiver<InboundEvent>, HeraldError> {
        if self.fail_subscribe.load(Ordering::SeqCst) {
            return Err(HeraldError::Client {
                message: "subscription refused".into(),
                source: None,
            });
        }
        let (tx, rx) = mpsc::channel(64);
        *self.subscriber.lock().await = Some(tx);
        Ok(rx)
    }

    async fn reply(&self, event: &InboundEvent, text: &str) -> Result<(), HeraldError> {
        if self.fail_reply.load(Ordering::SeqCst) {
            return Err(HeraldError::delivery("mock reply failure"));
        }
        self.replies.lock().await.push(SentReply {
            conversation: event.conversation,
            reply_to: event.message_id,
            text: text.to_string(),
            sent_at: Instant::now(),
        });
        Ok(())
    }

    async fn simulate_typing(
        &self,
        conversation: ConversationId,
        duration: Duration,
    ) -> Result<(), HeraldError> {
        if self.fail_typing.load(Ordering::SeqCst) {
            return Err(HeraldError::delivery("mock typing failure"));
        }
        self.typing.lock().await.push(TypingRecord {
            conversation,
            duration,
        });
        tokio::time::sleep(duration).await;
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), HeraldError> {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        self.subscriber.lock().await.take();
        if self.fail_disconnect.load(Ordering::SeqCst) {
            return Err(HeraldError::Client {
                message: "mock disconnect failure".into(),
                source: None,
            });
        }
        Ok(())
    }
}

/// Hands out [`MockClient`]s by phone.
///
/// Unregistered phones get a fresh authorized client, remembered so tests
/// can inspect it afterwards.
#[derive(Default)]
pub struct MockClientFactory {
    clients: Mutex<HashMap<String, Arc<MockClient>>>,
    failing: Mutex<HashSet<String>>,
    connects: AtomicUsize,
}

impl MockClientFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) the client returned for its phone.
    pub async fn register(&self, client: Arc<MockClient>) {
        self.clients
            .lock()
            .await
            .insert(client.phone.clone(), client);
    }

    /// Makes `connect` fail for `phone`.
    pub async fn fail_connect(&self, phone: &str) {
        self.failing.lock().await.insert(phone.to_string());
    }

    /// The client handed out for `phone`, if any.
    pub async fn client(&self, phone: &str) -> Option<Arc<MockClient>> {
        self.clients.lock().await.get(phone).cloned()
    }

    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ClientFactory for MockClientFactory {
    async fn connect(
        &self,
        credentials: &AccountCredentials,
    ) -> Result<Arc<dyn MessagingClient>, HeraldError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if self.failing.lock().await.contains(&credentials.phone) {
            return Err(HeraldError::Client {
                message: format!("cannot connect {}", credentials.phone),
                source: None,
            });
        }
        let client = self
            .clients
            .lock()
            .await
            .entry(credentials.phone.clone())
            .or_insert_with(|| Arc::new(MockClient::new(credentials.phone.clone())))
            .clone();
        Ok(client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn inject_requires_subscription() {
        let client = MockClient::new("+100");
        assert!(!client.inject_text(1, "hi", true).await);

        let mut rx = client.subscribe().await.unwrap();
        assert!(client.inject_text(1, "hi", true).await);
        let event = rx.recv().await.unwrap();
        assert_eq!(event.text.as_deref(), Some("hi"));
        assert_eq!(event.conversation, ConversationId(1));
    }

    #[tokio::test]
    async fn password_flow() {
        let client = MockClient::new("+100");
        client.set_authorized(false);
        client.require_password("secret").await;

        assert_eq!(
            client.sign_in("12345").await.unwrap(),
            SignInOutcome::PasswordRequired
        );
        assert!(client.sign_in_with_password("wrong").await.is_err());
        client.sign_in_with_password("secret").await.unwrap();
        assert!(client.is_authorized().await.unwrap());
    }

    #[tokio::test]
    async fn disconnect_closes_subscription() {
        let client = MockClient::new("+100");
        let _rx = client.subscribe().await.unwrap();
        assert!(client.is_subscribed().await);
        client.disconnect().await.unwrap();
        assert!(!client.is_subscribed().await);
        assert_eq!(client.disconnect_count(), 1);
    }

    #[tokio::test]
    async fn factory_reuses_clients_per_phone() {
        let factory = MockClientFactory::new();
        let creds = AccountCredentials {
            api_id: 1,
            api_hash: "h".into(),
            phone: "+100".into(),
        };
        factory.connect(&creds).await.unwrap();
        factory.connect(&creds).await.unwrap();
        assert_eq!(factory.connect_count(), 2);
        assert!(factory.client("+100").await.is_some());

        factory.fail_connect("+100").await;
        assert!(factory.connect(&creds).await.is_err());
    }
}
