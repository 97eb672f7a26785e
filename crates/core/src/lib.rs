// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! relay-core: build-command tree, job/agent state machines, and build causes
//! shared by the relay server and agent.

pub mod macros;

pub mod agent;
pub mod build_cause;
pub mod command;
pub mod id;
pub mod job;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use agent::{AgentBuildingState, AgentRuntimeStatus, AgentState};
pub use build_cause::{BuildCause, Material, MaterialRevision, MaterialRevisions, Modification};
pub use command::{ArgValue, BuildCommand, Operation, RunIf, RunIfParseError, UnknownOperation};
pub use id::short;
pub use job::{JobId, JobOutcome, JobResult, JobState, ResultAlreadySet, UnknownJobState};
