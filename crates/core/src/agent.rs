// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent runtime status and its two derived views.
//!
//! The server tracks an agent's own runtime status, but jobs and the agent
//! lifecycle each want a narrower view of it. Both views are projections
//! read out of one static table so that adding a variant without mapping it
//! fails the totality test.

use serde::{Deserialize, Serialize};

/// Runtime status reported by or inferred about an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum AgentRuntimeStatus {
    Idle = 0,
    Building = 1,
    Cancelled = 2,
    LostContact = 3,
    Missing = 4,
    Unknown = 5,
}

/// Agent status as seen by the job it is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentBuildingState {
    Idle,
    Building,
    Cancelled,
    Unknown,
}

/// Agent status as seen by the agent lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentState {
    Idle,
    Building,
    LostContact,
    Missing,
    Unknown,
}

/// One row per runtime status, in discriminant order.
const PROJECTIONS: [(AgentRuntimeStatus, AgentBuildingState, AgentState); 6] = [
    (AgentRuntimeStatus::Idle, AgentBuildingState::Idle, AgentState::Idle),
    (AgentRuntimeStatus::Building, AgentBuildingState::Building, AgentState::Building),
    // A cancelling agent is still building from its own point of view.
    (AgentRuntimeStatus::Cancelled, AgentBuildingState::Cancelled, AgentState::Building),
    (AgentRuntimeStatus::LostContact, AgentBuildingState::Unknown, AgentState::LostContact),
    (AgentRuntimeStatus::Missing, AgentBuildingState::Unknown, AgentState::Missing),
    (AgentRuntimeStatus::Unknown, AgentBuildingState::Unknown, AgentState::Unknown),
];

impl AgentRuntimeStatus {
    pub const ALL: [AgentRuntimeStatus; 6] = [
        AgentRuntimeStatus::Idle,
        AgentRuntimeStatus::Building,
        AgentRuntimeStatus::Cancelled,
        AgentRuntimeStatus::LostContact,
        AgentRuntimeStatus::Missing,
        AgentRuntimeStatus::Unknown,
    ];

    fn row(self) -> (AgentRuntimeStatus, AgentBuildingState, AgentState) {
        PROJECTIONS[self as usize]
    }

    pub fn to_job_facing_state(self) -> AgentBuildingState {
        self.row().1
    }

    pub fn to_agent_facing_state(self) -> AgentState {
        self.row().2
    }
}

crate::simple_display! {
    AgentRuntimeStatus {
        Idle => "Idle",
        Building => "Building",
        Cancelled => "Cancelled",
        LostContact => "LostContact",
        Missing => "Missing",
        Unknown => "Unknown",
    }
}

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;
