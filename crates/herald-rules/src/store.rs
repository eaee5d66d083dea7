// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The authoritative rule store, persisted as a JSON document.
//!
//! Every mutation is written through to disk. A failed write is reported as
//! [`HeraldError::Persistence`] and the in-memory change is kept, so the
//! caller can retry by saving again.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use rand::seq::SliceRandom;
use tracing::{debug, error, info, warn};

use herald_core::HeraldError;
use herald_core::persist::{read_json, write_json};

use crate::matcher::match_rule;
use crate::model::{Rule, RuleDocument, RuleSet};

/// Keyword rules keyed by id, in insertion order.
#[derive(Debug)]
pub struct RuleStore {
    path: PathBuf,
    rules: RuleSet,
    /// Response stored when the last alternative of a rule is deleted.
    default_response: String,
    /// Ids deleted since load; new rules never reuse them.
    retired: HashSet<String>,
}

impl RuleStore {
    /// Loads the rule document at `path`.
    ///
    /// A missing file starts an empty store and writes it. An unreadable or
    /// malformed file is logged and yields an empty store. Legacy entries are
    /// upgraded and the document is re-saved once.
    pub fn open(path: impl Into<PathBuf>, default_response: impl Into<String>) -> Self {
        let mut store = Self {
            path: path.into(),
            rules: RuleSet::new(),
            default_response: default_response.into(),
            retired: HashSet::new(),
        };
        store.load();
        store
    }

    fn load(&mut self) {
        match read_json::<RuleDocument>(&self.path) {
            Ok(Some(doc)) => {
                self.rules = doc.rules;
                debug!(count = self.rules.len(), path = %self.path.display(), "rules loaded");
                if doc.migrated > 0 {
                    match self.save() {
                        Ok(()) => info!(migrated = doc.migrated, "rules migrated to multi-response format"),
                        Err(e) => error!(error = %e, "failed to save migrated rules"),
                    }
                }
            }
            Ok(None) => {
                self.rules.clear();
                if let Err(e) = self.save() {
                    error!(error = %e, "failed to create rules file");
                }
            }
            Err(e) => {
                error!(error = %e, "error loading rules, starting empty");
                self.rules.clear();
            }
        }
    }

    /// Writes the full rule set to the store's file.
    pub fn save(&self) -> Result<(), HeraldError> {
        write_json(&self.path, &self.rules)?;
        debug!(count = self.rules.len(), "rules saved");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn get(&self, id: &str) -> Option<&Rule> {
        self.rules.get(id)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// First rule matching the message, see [`match_rule`].
    pub fn find_match(&self, text: Option<&str>, is_private: bool) -> Option<(&str, &Rule)> {
        match_rule(&self.rules, text, is_private)
    }

    /// Id of the first rule matching the message.
    pub fn match_message(&self, text: Option<&str>, is_private: bool) -> Option<String> {
        self.find_match(text, is_private).map(|(id, _)| id.to_string())
    }

    /// Adds a rule with a single response.
    ///
    /// The id is `count + 1`, moved forward past any id that is in use or was
    /// deleted earlier in this session.
    pub fn add(
        &mut self,
        keyword: &str,
        response: &str,
        private_only: bool,
    ) -> Result<String, HeraldError> {
        if keyword.trim().is_empty() || response.trim().is_empty() {
            return Err(HeraldError::Validation(
                "Keyword and response must not be empty".into(),
            ));
        }

        let mut n = self.rules.len() + 1;
        while self.rules.contains_key(&n.to_string()) || self.retired.contains(&n.to_string()) {
            n += 1;
        }
        let id = n.to_string();
        self.rules
            .insert(id.clone(), Rule::new(keyword, response, private_only));
        info!(rule_id = %id, keyword, "rule added");
        self.persist(format!("Rule {id} added"))
    }

    /// Edits a rule. A non-blank `keyword` replaces the keyword, a non-blank
    /// `response` is appended as a new alternative, and `private_only`
    /// replaces the flag when given.
    pub fn update(
        &mut self,
        id: &str,
        keyword: Option<&str>,
        response: Option<&str>,
        private_only: Option<bool>,
    ) -> Result<String, HeraldError> {
        let rule = self
            .rules
            .get_mut(id)
            .ok_or_else(|| HeraldError::not_found("rule", id))?;

        if let Some(keyword) = keyword.filter(|k| !k.trim().is_empty()) {
            rule.keyword = keyword.to_string();
        }
        if let Some(response) = response.filter(|r| !r.trim().is_empty()) {
            rule.responses.push(response.to_string());
        }
        if let Some(flag) = private_only {
            rule.private_only = flag;
        }
        info!(rule_id = %id, "rule updated");
        self.persist(format!("Rule {id} updated"))
    }

    pub fn delete(&mut self, id: &str) -> Result<String, HeraldError> {
        if self.rules.shift_remove(id).is_none() {
            return Err(HeraldError::not_found("rule", id));
        }
        self.retired.insert(id.to_string());
        info!(rule_id = %id, "rule deleted");
        self.persist(format!("Rule {id} deleted"))
    }

    /// Removes one alternative response. The last one is replaced by the
    /// default response so a rule never ends up with none.
    pub fn delete_response(&mut self, id: &str, index: usize) -> Result<String, HeraldError> {
        let rule = self
            .rules
            .get_mut(id)
            .ok_or_else(|| HeraldError::not_found("rule", id))?;
        if rule.responses.is_empty() {
            return Err(HeraldError::Validation(format!("Rule {id} has no responses")));
        }
        if index >= rule.responses.len() {
            return Err(HeraldError::Validation(format!(
                "Invalid response index {index}"
            )));
        }

        rule.responses.remove(index);
        if rule.responses.is_empty() {
            rule.responses.push(self.default_response.clone());
        }
        info!(rule_id = %id, index, "response deleted");
        self.persist(format!("Response {index} removed from rule {id}"))
    }

    /// A uniformly random response of the rule, or `None` when the rule is
    /// unknown or has no responses.
    pub fn get_random_response(&self, id: &str) -> Option<String> {
        self.rules
            .get(id)?
            .responses
            .choose(&mut rand::thread_rng())
            .cloned()
    }

    /// Writes the rule set to `path`. Fails when there are no rules.
    pub fn export(&self, path: &Path) -> Result<String, HeraldError> {
        if self.rules.is_empty() {
            return Err(HeraldError::Validation("No rules to export".into()));
        }
        write_json(path, &self.rules)?;
        info!(count = self.rules.len(), path = %path.display(), "rules exported");
        Ok(format!(
            "Exported {} rules to {}",
            self.rules.len(),
            path.display()
        ))
    }

    /// Reads rules from `path`.
    ///
    /// With `replace` the store becomes exactly the imported set. Otherwise
    /// new ids are inserted as-is and colliding ones are renumbered from one
    /// running counter that starts at the highest existing numeric id.
    pub fn import(&mut self, path: &Path, replace: bool) -> Result<String, HeraldError> {
        let doc = read_json::<RuleDocument>(path)
            .inspect_err(|e| warn!(error = %e, "failed to import rules"))?
            .ok_or_else(|| HeraldError::not_found("file", path.display()))?;
        if doc.rules.is_empty() {
            return Err(HeraldError::Validation("No rules to import".into()));
        }
        let imported = doc.rules.len();

        if replace {
            self.rules = doc.rules;
            self.retired.clear();
        } else {
            let mut highest = self
                .rules
                .keys()
                .filter_map(|id| id.parse::<u64>().ok())
                .max()
                .unwrap_or(0);
            for (id, rule) in doc.rules {
                if self.rules.contains_key(&id) {
                    highest += 1;
                    debug!(from = %id, to = highest, "renumbered colliding rule");
                    self.rules.insert(highest.to_string(), rule);
                } else {
                    self.rules.insert(id, rule);
                }
            }
        }

        info!(imported, total = self.rules.len(), replace, "rules imported");
        self.persist(format!(
            "Imported {imported} rules. Total rules: {}",
            self.rules.len()
        ))
    }

    fn persist(&self, message: String) -> Result<String, HeraldError> {
        self.save()
            .inspect_err(|e| error!(error = %e, "error saving rules"))?;
        Ok(message)
    }
}
