// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Task scheduling for the Herald operator console.
//!
//! [`TaskScheduler`] runs one-shot shell commands, scripts, and reminders at
//! a chosen time and keeps them in a JSON file across restarts.
//! [`WorkCycle`] is a periodic background loop with an iteration counter.

pub mod scheduler;
pub mod task;
pub mod work_cycle;

pub use scheduler::{TaskEvent, TaskScheduler};
pub use task::{ScheduledTask, TaskKind, TaskSpec};
pub use work_cycle::{WorkCycle, WorkCycleStatus};
