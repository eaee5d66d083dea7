// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keyword rules for the auto-responder.
//!
//! [`RuleStore`] owns the persisted rule set, [`match_rule`] finds the rule
//! an inbound message triggers, and [`select_response`] picks which of the
//! rule's alternative responses to send.

pub mod matcher;
pub mod model;
pub mod selector;
pub mod store;

pub use matcher::match_rule;
pub use model::{Rule, RuleSet};
pub use selector::{HISTORY_LIMIT, ResponseHistory, select_response};
pub use store::RuleStore;

/// Rule store shared between the operator surface and account listeners.
pub type SharedRuleStore = std::sync::Arc<tokio::sync::RwLock<RuleStore>>;
