// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Auto-responder runtime for the Herald workspace.
//!
//! - [`AccountRuntime`] is the registry of active accounts. Each entry is an
//!   [`AccountSession`] with an inbound listener and a delivery worker.
//! - [`DelayPolicy`] holds the humanized timing constants.
//! - [`AccountService`] runs the login flows that put accounts into the
//!   account store.
//! - [`selection`] decides which accounts start and with what base delay.

pub mod accounts;
pub mod delivery;
pub mod policy;
pub mod runtime;
pub mod selection;
pub mod session;
pub mod shutdown;

pub use accounts::AccountService;
pub use delivery::{DeliveryTiming, QueueItem};
pub use policy::DelayPolicy;
pub use runtime::AccountRuntime;
pub use selection::{
    AccountSelection, ActivationReport, PlannedActivation, activate_plan, plan_activation,
};
pub use session::{AccountSession, SessionInfo};
pub use shutdown::install_signal_handler;
