// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! First-match keyword matching.

use crate::model::{Rule, RuleSet};

/// Returns the first rule, in insertion order, whose keyword occurs in
/// `text` ignoring case.
///
/// Rules flagged `private_only` are skipped unless `is_private`. Missing or
/// empty text never matches, and neither does a blank keyword.
pub fn match_rule<'a>(
    rules: &'a RuleSet,
    text: Option<&str>,
    is_private: bool,
) -> Option<(&'a str, &'a Rule)> {
    let text = text.filter(|t| !t.is_empty())?.to_lowercase();

    rules
        .iter()
        .filter(|(_, rule)| is_private || !rule.private_only)
        .find(|(_, rule)| {
            !rule.keyword.trim().is_empty() && text.contains(&rule.keyword.to_lowercase())
        })
        .map(|(id, rule)| (id.as_str(), rule))
}
