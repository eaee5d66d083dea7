// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Herald integration tests.
//!
//! Mock collaborators and harness infrastructure for fast, deterministic
//! tests without a real messaging service.
//!
//! # Components
//!
//! - [`MockClient`] - Mock messaging account with event injection and reply capture
//! - [`MockClientFactory`] - Hands out mock clients by phone
//! - [`ScriptedPrompt`] - Canned login codes and passwords
//! - [`TestHarness`] - Temp-dir rule store, account database, and mock factory

pub mod harness;
pub mod mock_client;
pub mod prompt;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_client::{MockClient, MockClientFactory, SentReply, TypingRecord, text_event};
pub use prompt::ScriptedPrompt;
