// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Response selection with short-window repetition avoidance.

use std::collections::{HashMap, VecDeque};

use rand::Rng;
use rand::seq::SliceRandom;

use crate::model::Rule;

/// Number of recent responses remembered per rule.
pub const HISTORY_LIMIT: usize = 2;

/// Recently sent responses for one account, per rule id.
///
/// Lives in the account's runtime session and is dropped with it.
#[derive(Debug, Default, Clone)]
pub struct ResponseHistory {
    recent: HashMap<String, VecDeque<String>>,
}

impl ResponseHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recent responses for `rule_id`, oldest first.
    pub fn recent(&self, rule_id: &str) -> Vec<&str> {
        self.recent
            .get(rule_id)
            .map(|q| q.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Records `text`, keeping only the newest [`HISTORY_LIMIT`] entries.
    pub fn record(&mut self, rule_id: &str, text: &str) {
        let queue = self.recent.entry(rule_id.to_string()).or_default();
        queue.push_back(text.to_string());
        while queue.len() > HISTORY_LIMIT {
            queue.pop_front();
        }
    }

    fn contains(&self, rule_id: &str, text: &str) -> bool {
        self.recent
            .get(rule_id)
            .is_some_and(|q| q.iter().any(|r| r == text))
    }

    pub fn clear(&mut self) {
        self.recent.clear();
    }
}

/// Picks a response for `rule`, avoiding the ones in `history` when an
/// alternative exists.
///
/// A rule with a single response always yields it and leaves the history
/// untouched. Otherwise the pick is uniform among responses not recently
/// used (or among all of them when every one was recent), and is recorded.
pub fn select_response<R: Rng + ?Sized>(
    rule_id: &str,
    rule: &Rule,
    history: &mut ResponseHistory,
    rng: &mut R,
) -> String {
    let all = &rule.responses;
    if all.len() <= 1 {
        return all.first().cloned().unwrap_or_default();
    }

    let available: Vec<&String> = all
        .iter()
        .filter(|r| !history.contains(rule_id, r))
        .collect();
    let chosen = if available.is_empty() {
        all.choose(rng)
    } else {
        available.choose(rng).copied()
    }
    .cloned()
    .unwrap_or_default();

    history.record(rule_id, &chosen);
    chosen
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn rule(responses: &[&str]) -> Rule {
        Rule {
            keyword: "hi".into(),
            responses: responses.iter().map(|s| s.to_string()).collect(),
            private_only: false,
        }
    }

    #[test]
    fn single_response_ignores_history() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut history = ResponseHistory::new();
        history.record("1", "hello");
        history.record("1", "hello");
        assert_eq!(select_response("1", &rule(&["hello"]), &mut history, &mut rng), "hello");
        assert_eq!(history.recent("1"), vec!["hello", "hello"]);
    }

    #[test]
    fn empty_rule_yields_empty_text() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut history = ResponseHistory::new();
        assert_eq!(select_response("1", &rule(&[]), &mut history, &mut rng), "");
    }

    #[test]
    fn two_picks_cover_both_responses() {
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut history = ResponseHistory::new();
            let r = rule(&["hello", "hey"]);
            let first = select_response("1", &r, &mut history, &mut rng);
            let second = select_response("1", &r, &mut history, &mut rng);
            assert_ne!(first, second, "seed {seed} repeated a response");
        }
    }

    #[test]
    fn exhausted_history_falls_back_to_all() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut history = ResponseHistory::new();
        history.record("1", "a");
        history.record("1", "b");
        let pick = select_response("1", &rule(&["a", "b"]), &mut history, &mut rng);
        assert!(pick == "a" || pick == "b");
        assert_eq!(history.recent("1").len(), HISTORY_LIMIT);
    }

    #[test]
    fn history_is_per_rule() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut history = ResponseHistory::new();
        history.record("1", "a");
        let pick = select_response("2", &rule(&["a", "b"]), &mut history, &mut rng);
        assert!(!pick.is_empty());
        assert_eq!(history.recent("1"), vec!["a"]);
        assert_eq!(history.recent("2"), vec![pick.as_str()]);
    }

    #[test]
    fn clear_forgets_everything() {
        let mut history = ResponseHistory::new();
        history.record("1", "a");
        history.clear();
        assert!(history.recent("1").is_empty());
    }
}
