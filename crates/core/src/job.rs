// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job lifecycle states and results.

use serde::{Deserialize, Serialize};
use thiserror::Error;

crate::define_id! {
    /// Identifier of one job run on one agent.
    pub struct JobId("job-");
}

/// Lifecycle phase of a job run.
///
/// States only move forward; see [`JobState::can_advance_to`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobState {
    Scheduled,
    Assigned,
    Preparing,
    Building,
    Completing,
    Completed,
    Rescheduled,
    Discontinued,
}

impl JobState {
    fn rank(self) -> u8 {
        match self {
            JobState::Scheduled => 0,
            JobState::Assigned => 1,
            JobState::Preparing => 2,
            JobState::Building => 3,
            JobState::Completing => 4,
            JobState::Completed | JobState::Rescheduled | JobState::Discontinued => 5,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Completed | JobState::Rescheduled | JobState::Discontinued)
    }

    /// True when `next` is strictly later in the lifecycle.
    ///
    /// Repeating the current state is not an advance; terminal states never
    /// advance.
    pub fn can_advance_to(self, next: JobState) -> bool {
        !self.is_terminal() && next.rank() > self.rank()
    }
}

crate::simple_display! {
    JobState {
        Scheduled => "Scheduled",
        Assigned => "Assigned",
        Preparing => "Preparing",
        Building => "Building",
        Completing => "Completing",
        Completed => "Completed",
        Rescheduled => "Rescheduled",
        Discontinued => "Discontinued",
    }
}

crate::simple_parse! {
    JobState, UnknownJobState {
        Scheduled => "Scheduled",
        Assigned => "Assigned",
        Preparing => "Preparing",
        Building => "Building",
        Completing => "Completing",
        Completed => "Completed",
        Rescheduled => "Rescheduled",
        Discontinued => "Discontinued",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown job state: {0:?}")]
pub struct UnknownJobState(pub String);

impl From<String> for UnknownJobState {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Terminal outcome of a job run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum JobResult {
    #[default]
    Passed,
    Failed,
    Cancelled,
    Unknown,
}

impl JobResult {
    pub fn is_failed(self) -> bool {
        self == JobResult::Failed
    }

    pub fn is_passed(self) -> bool {
        self == JobResult::Passed
    }
}

crate::simple_display! {
    JobResult {
        Passed => "Passed",
        Failed => "Failed",
        Cancelled => "Cancelled",
        Unknown => "Unknown",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("job result already set to {existing}, refusing {attempted}")]
pub struct ResultAlreadySet {
    pub existing: JobResult,
    pub attempted: JobResult,
}

/// Write-once holder for a job's final result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobOutcome(Option<JobResult>);

impl JobOutcome {
    pub fn new() -> Self {
        Self(None)
    }

    pub fn get(&self) -> Option<JobResult> {
        self.0
    }

    /// Record the result. Repeating the same result is accepted; a different
    /// one is refused.
    pub fn set_once(&mut self, result: JobResult) -> Result<JobResult, ResultAlreadySet> {
        match self.0 {
            None => {
                self.0 = Some(result);
                Ok(result)
            }
            Some(existing) if existing == result => Ok(result),
            Some(existing) => Err(ResultAlreadySet { existing, attempted: result }),
        }
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
