// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use proptest::prelude::*;
use relay_core::test_support::strategies::arb_build_command;

fn block_on<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(future)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn every_tree_completes_exactly_once(tree in arb_build_command()) {
        let h = harness();
        let result = block_on(h.run(tree));

        prop_assert_ne!(result, JobResult::Cancelled);
        let states = h.reporter.states();
        prop_assert_eq!(&states[states.len() - 2..], &[JobState::Completing, JobState::Completed]);
        prop_assert_eq!(h.reporter.results(), vec![result, result]);
    }

    #[test]
    fn cancelled_trees_always_end_cancelled(tree in arb_build_command()) {
        let h = harness();
        h.session.cancel();
        let result = block_on(h.run(tree));

        prop_assert_eq!(result, JobResult::Cancelled);
        prop_assert_eq!(h.reporter.completed_result(), Some(JobResult::Cancelled));
    }
}
