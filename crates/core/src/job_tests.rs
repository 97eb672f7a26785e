// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_support::strategies::*;
use proptest::prelude::*;

#[test]
fn job_id_has_prefix() {
    let id = JobId::new();
    assert!(id.as_str().starts_with("job-"));
}

#[test]
fn job_id_serde() {
    let id = JobId::from("job-abc");
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, "\"job-abc\"");
    let parsed: JobId = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, id);
}

#[yare::parameterized(
    preparing_to_building  = { JobState::Preparing, JobState::Building, true },
    building_to_completing = { JobState::Building, JobState::Completing, true },
    skip_ahead             = { JobState::Assigned, JobState::Completed, true },
    same_state             = { JobState::Building, JobState::Building, false },
    backwards              = { JobState::Completing, JobState::Building, false },
    out_of_completed       = { JobState::Completed, JobState::Rescheduled, false },
    rescheduled_mid_build  = { JobState::Building, JobState::Rescheduled, true },
)]
fn can_advance_to(from: JobState, to: JobState, expected: bool) {
    assert_eq!(from.can_advance_to(to), expected);
}

#[yare::parameterized(
    scheduled    = { JobState::Scheduled, false },
    building     = { JobState::Building, false },
    completing   = { JobState::Completing, false },
    completed    = { JobState::Completed, true },
    rescheduled  = { JobState::Rescheduled, true },
    discontinued = { JobState::Discontinued, true },
)]
fn is_terminal(state: JobState, expected: bool) {
    assert_eq!(state.is_terminal(), expected);
}

#[test]
fn job_state_parses_case_insensitively() {
    assert_eq!("building".parse::<JobState>().unwrap(), JobState::Building);
    assert_eq!("Completing".parse::<JobState>().unwrap(), JobState::Completing);
    assert!("Flying".parse::<JobState>().is_err());
}

#[test]
fn job_result_serializes_as_variant_name() {
    assert_eq!(serde_json::to_string(&JobResult::Cancelled).unwrap(), "\"Cancelled\"");
}

#[test]
fn outcome_is_write_once() {
    let mut outcome = JobOutcome::new();
    assert_eq!(outcome.get(), None);
    assert_eq!(outcome.set_once(JobResult::Failed), Ok(JobResult::Failed));
    assert_eq!(outcome.set_once(JobResult::Failed), Ok(JobResult::Failed));
    let err = outcome.set_once(JobResult::Passed).unwrap_err();
    assert_eq!(err.existing, JobResult::Failed);
    assert_eq!(outcome.get(), Some(JobResult::Failed));
}

proptest! {
    #[test]
    fn advancing_is_never_symmetric(a in arb_job_state(), b in arb_job_state()) {
        prop_assert!(!(a.can_advance_to(b) && b.can_advance_to(a)));
    }

    #[test]
    fn display_round_trips_through_parse(state in arb_job_state()) {
        prop_assert_eq!(state.to_string().parse::<JobState>().unwrap(), state);
    }
}
