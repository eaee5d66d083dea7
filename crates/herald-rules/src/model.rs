// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rule types and the on-disk rule document.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Rules keyed by id, in insertion order.
pub type RuleSet = IndexMap<String, Rule>;

/// A keyword rule with one or more alternative responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rule {
    /// Matched case-insensitively as a substring of the message text.
    pub keyword: String,
    /// Alternative replies; never empty once the rule has been stored.
    pub responses: Vec<String>,
    /// Only match messages from one-to-one conversations.
    pub private_only: bool,
}

impl Rule {
    pub fn new(keyword: impl Into<String>, response: impl Into<String>, private_only: bool) -> Self {
        Self {
            keyword: keyword.into(),
            responses: vec![response.into()],
            private_only,
        }
    }
}

/// A rule as found in a document, tolerating the legacy single-`response`
/// shape.
#[derive(Debug, Clone, Deserialize)]
struct StoredRule {
    #[serde(default)]
    keyword: String,
    #[serde(default)]
    responses: Option<Vec<String>>,
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    private_only: bool,
}

impl StoredRule {
    fn is_legacy(&self) -> bool {
        self.response.is_some()
    }

    fn into_rule(self) -> Rule {
        let responses = match (self.responses, self.response) {
            (Some(list), _) => list,
            (None, Some(single)) => vec![single],
            (None, None) => Vec::new(),
        };
        Rule {
            keyword: self.keyword,
            responses,
            private_only: self.private_only,
        }
    }
}

/// Result of reading a rule document.
#[derive(Debug, Default)]
pub struct RuleDocument {
    pub rules: RuleSet,
    /// Number of entries rewritten from the legacy shape.
    pub migrated: usize,
}

impl<'de> Deserialize<'de> for RuleDocument {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let stored = IndexMap::<String, StoredRule>::deserialize(deserializer)?;
        let mut migrated = 0;
        let rules = stored
            .into_iter()
            .map(|(id, rule)| {
                if rule.is_legacy() {
                    migrated += 1;
                }
                (id, rule.into_rule())
            })
            .collect();
        Ok(Self { rules, migrated })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_response_becomes_list() {
        let doc: RuleDocument = serde_json::from_str(
            r#"{"1": {"keyword": "hi", "response": "hello", "private_only": true}}"#,
        )
        .unwrap();
        assert_eq!(doc.migrated, 1);
        assert_eq!(doc.rules["1"], Rule::new("hi", "hello", true));
    }

    #[test]
    fn list_wins_over_stray_legacy_field() {
        let doc: RuleDocument = serde_json::from_str(
            r#"{"1": {"keyword": "hi", "responses": ["a", "b"], "response": "old"}}"#,
        )
        .unwrap();
        assert_eq!(doc.rules["1"].responses, vec!["a", "b"]);
        assert!(!doc.rules["1"].private_only);
    }

    #[test]
    fn document_order_is_preserved() {
        let doc: RuleDocument = serde_json::from_str(
            r#"{"3": {"keyword": "c", "responses": ["x"]}, "1": {"keyword": "a", "responses": ["y"]}}"#,
        )
        .unwrap();
        let ids: Vec<&str> = doc.rules.keys().map(String::as_str).collect();
        assert_eq!(ids, vec!["3", "1"]);
        assert_eq!(doc.migrated, 0);
    }

    #[test]
    fn serialized_rule_has_no_legacy_field() {
        let json = serde_json::to_value(Rule::new("k", "r", false)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"keyword": "k", "responses": ["r"], "private_only": false})
        );
    }
}
