// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

// ── Proptest strategies ─────────────────────────────────────────────────

/// Proptest strategies for command trees and state machine types.
pub mod strategies {
    use crate::command::{ArgValue, BuildCommand, RunIf};
    use crate::job::JobState;
    use proptest::prelude::*;

    pub fn arb_job_state() -> impl Strategy<Value = JobState> {
        prop_oneof![
            Just(JobState::Scheduled),
            Just(JobState::Assigned),
            Just(JobState::Preparing),
            Just(JobState::Building),
            Just(JobState::Completing),
            Just(JobState::Completed),
            Just(JobState::Rescheduled),
            Just(JobState::Discontinued),
        ]
    }

    pub fn arb_run_if() -> impl Strategy<Value = RunIf> {
        prop_oneof![Just(RunIf::Passed), Just(RunIf::Failed), Just(RunIf::Any)]
    }

    pub fn arb_arg_value() -> impl Strategy<Value = ArgValue> {
        prop_oneof![
            ".{0,12}".prop_map(ArgValue::Str),
            any::<bool>().prop_map(ArgValue::Bool),
            prop::collection::vec(".{0,8}", 0..4).prop_map(ArgValue::Array),
        ]
    }

    fn arb_leaf() -> impl Strategy<Value = BuildCommand> {
        (
            "[a-zA-Z]{1,10}",
            prop::collection::vec(("[a-z]{1,6}", arb_arg_value()), 0..3),
            arb_run_if(),
            proptest::option::of("[a-z/]{1,8}"),
        )
            .prop_map(|(name, args, run_if, dir)| {
                let node = BuildCommand::with_args(name, args).run_if(run_if);
                match dir {
                    Some(dir) => node.with_working_directory(dir),
                    None => node,
                }
            })
    }

    /// Arbitrary trees up to a few levels deep, with populated `test` and
    /// `on_cancel` branches.
    pub fn arb_build_command() -> impl Strategy<Value = BuildCommand> {
        arb_leaf().prop_recursive(4, 32, 4, |inner| {
            (
                prop::collection::vec(inner.clone(), 0..4),
                arb_run_if(),
                proptest::option::of(inner.clone()),
                proptest::option::of(inner),
            )
                .prop_map(|(children, run_if, test, on_cancel)| {
                    let mut node = BuildCommand::compose(children).run_if(run_if);
                    if let Some(test) = test {
                        node = node.with_test(test);
                    }
                    if let Some(on_cancel) = on_cancel {
                        node = node.with_on_cancel(on_cancel);
                    }
                    node
                })
        })
    }
}
