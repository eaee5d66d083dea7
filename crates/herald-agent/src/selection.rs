// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Choosing which accounts to start and how fast each one replies.

use std::time::Duration;

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{info, warn};

use herald_core::{Account, ClientFactory, HeraldError};

use crate::policy::DelayPolicy;
use crate::runtime::AccountRuntime;

/// Which registered accounts the responder should start on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountSelection {
    /// One account by its record id.
    Specific(i64),
    All,
    /// `n` accounts chosen at random; all of them when `n` exceeds the total.
    Random(usize),
}

impl AccountSelection {
    /// Applies the selection to `accounts`, preserving their order except
    /// for random picks.
    pub fn pick<R: Rng + ?Sized>(
        &self,
        accounts: &[Account],
        rng: &mut R,
    ) -> Result<Vec<Account>, HeraldError> {
        if accounts.is_empty() {
            return Err(HeraldError::Validation("No accounts found".into()));
        }
        match *self {
            Self::Specific(id) => accounts
                .iter()
                .find(|a| a.id == id)
                .cloned()
                .map(|a| vec![a])
                .ok_or_else(|| HeraldError::not_found("account", id)),
            Self::All => Ok(accounts.to_vec()),
            Self::Random(0) => Err(HeraldError::Validation(
                "Number of accounts must be at least 1".into(),
            )),
            Self::Random(n) if n >= accounts.len() => Ok(accounts.to_vec()),
            Self::Random(n) => Ok(accounts
                .choose_multiple(rng, n)
                .cloned()
                .collect()),
        }
    }
}

/// One account and the base delay it will reply with.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedActivation {
    pub account: Account,
    pub base_delay: Duration,
}

/// Spreads `total_window` over the selected accounts.
pub fn plan_activation<R: Rng + ?Sized>(
    selected: Vec<Account>,
    total_window: Duration,
    policy: &DelayPolicy,
    rng: &mut R,
) -> Vec<PlannedActivation> {
    let count = selected.len();
    selected
        .into_iter()
        .map(|account| PlannedActivation {
            base_delay: policy.spread_base_delay(total_window, count, rng),
            account,
        })
        .collect()
}

/// Outcome of starting the responder on a set of accounts.
#[derive(Debug, Default)]
pub struct ActivationReport {
    /// Phones that were activated.
    pub started: Vec<String>,
    /// Phones that were skipped, with the reason.
    pub skipped: Vec<(String, String)>,
}

impl ActivationReport {
    pub fn summary(&self) -> String {
        format!(
            "Auto-responder started on {} account(s), {} skipped",
            self.started.len(),
            self.skipped.len()
        )
    }
}

/// Activates each planned account in turn, pausing `activation_stagger`
/// between them. Accounts that cannot be activated are skipped.
///
/// Fails without activating anything when there are no rules.
pub async fn activate_plan(
    runtime: &AccountRuntime,
    factory: &dyn ClientFactory,
    plan: Vec<PlannedActivation>,
) -> Result<ActivationReport, HeraldError> {
    if runtime.rules().read().await.is_empty() {
        return Err(HeraldError::Validation(
            "No rules defined. Add at least one rule first".into(),
        ));
    }

    let stagger = runtime.policy().activation_stagger;
    let mut report = ActivationReport::default();
    for (index, planned) in plan.into_iter().enumerate() {
        if index > 0 && !stagger.is_zero() {
            tokio::time::sleep(stagger).await;
        }
        let phone = planned.account.phone.clone();
        match runtime
            .activate_account(factory, &planned.account, planned.base_delay)
            .await
        {
            Ok(_) => report.started.push(phone),
            Err(e) => {
                warn!(%phone, error = %e, "account skipped");
                report.skipped.push((phone, e.to_string()));
            }
        }
    }
    info!(
        started = report.started.len(),
        skipped = report.skipped.len(),
        "activation finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn accounts(n: i64) -> Vec<Account> {
        (1..=n)
            .map(|id| Account {
                id,
                api_id: id,
                api_hash: format!("h{id}"),
                phone: format!("+{id}00"),
                twofa: None,
                user_id: None,
                username: None,
                name: None,
            })
            .collect()
    }

    #[test]
    fn specific_picks_one() {
        let mut rng = StdRng::seed_from_u64(0);
        let picked = AccountSelection::Specific(2)
            .pick(&accounts(3), &mut rng)
            .unwrap();
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].phone, "+200");
    }

    #[test]
    fn specific_unknown_is_not_found() {
        let mut rng = StdRng::seed_from_u64(0);
        let err = AccountSelection::Specific(9)
            .pick(&accounts(3), &mut rng)
            .unwrap_err();
        assert!(matches!(err, HeraldError::NotFound { .. }));
    }

    #[test]
    fn random_zero_is_rejected() {
        let mut rng = StdRng::seed_from_u64(0);
        let err = AccountSelection::Random(0)
            .pick(&accounts(3), &mut rng)
            .unwrap_err();
        assert!(matches!(err, HeraldError::Validation(_)));
    }

    #[test]
    fn random_caps_at_total_and_has_no_duplicates() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(
            AccountSelection::Random(10)
                .pick(&accounts(3), &mut rng)
                .unwrap()
                .len(),
            3
        );

        let mut picked: Vec<i64> = AccountSelection::Random(2)
            .pick(&accounts(5), &mut rng)
            .unwrap()
            .into_iter()
            .map(|a| a.id)
            .collect();
        picked.sort();
        picked.dedup();
        assert_eq!(picked.len(), 2);
    }

    #[test]
    fn empty_account_list_is_rejected() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(AccountSelection::All.pick(&[], &mut rng).is_err());
    }

    #[test]
    fn plan_spreads_window_across_accounts() {
        let mut rng = StdRng::seed_from_u64(3);
        let policy = DelayPolicy::default();
        let plan = plan_activation(accounts(4), Duration::from_secs(40), &policy, &mut rng);
        assert_eq!(plan.len(), 4);
        for planned in plan {
            // 40s / 4 accounts * [0.8, 1.2]
            assert!(planned.base_delay >= Duration::from_millis(7_999));
            assert!(planned.base_delay <= Duration::from_millis(12_001));
        }
    }
}
