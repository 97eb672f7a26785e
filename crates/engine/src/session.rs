// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Build session: walks a command tree and drives one job to completion.

mod scope;

pub(crate) use scope::{Output, RunState, Scope};

use std::future::Future;
use std::pin::Pin;
use std::time::Instant;

use relay_adapters::{ArtifactFetcher, ArtifactUploader, ConsoleSink, StatusReporter};
use relay_core::{BuildCommand, JobResult, JobState};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::config::SessionConfig;

/// Errors that prevent a build from starting at all.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    MalformedTree(#[from] relay_wire::WireError),
}

/// Collaborators of a [`BuildSession`].
#[derive(Clone)]
pub struct SessionDeps<R, C, U, F> {
    pub reporter: R,
    pub console: C,
    pub uploader: U,
    pub fetcher: F,
}

type WalkFuture<'a> = Pin<Box<dyn Future<Output = ()> + Send + 'a>>;

/// Interprets build command trees for one job.
///
/// Cancellation is cooperative: [`BuildSession::cancel`] (or the token from
/// [`BuildSession::cancel_token`]) is observed at node boundaries. A node
/// reached after cancellation runs its `on_cancel` subtree instead of its
/// body; a node whose body was interrupted runs `on_cancel` after the body
/// returns. Leaf operations already in progress are never preempted.
pub struct BuildSession<R, C, U, F> {
    pub(crate) config: SessionConfig,
    pub(crate) deps: SessionDeps<R, C, U, F>,
    cancel: CancellationToken,
}

impl<R, C, U, F> BuildSession<R, C, U, F>
where
    R: StatusReporter,
    C: ConsoleSink,
    U: ArtifactUploader,
    F: ArtifactFetcher,
{
    pub fn new(config: SessionConfig, deps: SessionDeps<R, C, U, F>) -> Self {
        Self { config, deps, cancel: CancellationToken::new() }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Request cancellation of the running build.
    pub fn cancel(&self) {
        tracing::info!(job_id = %self.config.job_id, "cancellation requested");
        self.cancel.cancel();
    }

    /// Token that cancels this session when triggered.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Decode a transported tree and build it.
    ///
    /// A tree that does not decode is rejected before any side effect.
    pub async fn build_encoded(&self, text: &str) -> Result<JobResult, SessionError> {
        let command = relay_wire::decode(text)?;
        Ok(self.build(&command).await)
    }

    /// Run `command` to completion and report the job's final result.
    pub async fn build(&self, command: &BuildCommand) -> JobResult {
        let job_id = &self.config.job_id;
        let started = Instant::now();
        tracing::info!(%job_id, command = command.name(), "build started");

        let mut run = RunState::new(&self.config);
        let mut scope = Scope::console();
        self.walk(command, &mut run, &mut scope).await;

        let result = if self.cancel.is_cancelled() { JobResult::Cancelled } else { scope.result };
        let result = match run.outcome.set_once(result) {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(%job_id, error = %e, "job result already decided");
                e.existing
            }
        };

        self.report_completing(&mut run, result).await;
        self.report_completed(&mut run, result).await;

        tracing::info!(
            %job_id,
            %result,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "build finished"
        );
        result
    }

    fn cancelled(&self, scope: &Scope) -> bool {
        !scope.cleanup && self.cancel.is_cancelled()
    }

    /// Walk one node under the normal gating rules.
    pub(crate) fn walk<'a>(
        &'a self,
        command: &'a BuildCommand,
        run: &'a mut RunState,
        scope: &'a mut Scope,
    ) -> WalkFuture<'a> {
        Box::pin(async move {
            if self.cancelled(scope) {
                self.run_on_cancel(command, run, scope).await;
                return;
            }

            if let Some(test) = command.test_command() {
                if !self.evaluate_test(test, run, scope.cleanup).await {
                    tracing::debug!(command = command.name(), "test did not pass, skipping");
                    return;
                }
                if self.cancelled(scope) {
                    self.run_on_cancel(command, run, scope).await;
                    return;
                }
            }

            if !command.run_condition().admits(scope.result) {
                tracing::debug!(
                    command = command.name(),
                    run_if = %command.run_condition(),
                    result = %scope.result,
                    "run condition not met, skipping"
                );
                return;
            }

            self.execute(command, run, scope).await;

            if self.cancelled(scope) {
                self.run_on_cancel(command, run, scope).await;
            }
        })
    }

    /// Run the `on_cancel` subtree of `command`, if any.
    ///
    /// The subtree root runs regardless of its run condition and test; its
    /// descendants follow the usual rules but are not cut short by the
    /// cancellation being handled.
    fn run_on_cancel<'a>(
        &'a self,
        command: &'a BuildCommand,
        run: &'a mut RunState,
        scope: &'a mut Scope,
    ) -> WalkFuture<'a> {
        Box::pin(async move {
            let Some(on_cancel) = command.on_cancel_command() else {
                return;
            };
            tracing::debug!(command = command.name(), "running on-cancel");
            let was_cleanup = std::mem::replace(&mut scope.cleanup, true);
            self.execute(on_cancel, run, scope).await;
            scope.cleanup = was_cleanup;
        })
    }

    /// Evaluate a guard in an isolated scope: output is discarded and the
    /// outcome never touches the job result.
    async fn evaluate_test(&self, test: &BuildCommand, run: &mut RunState, cleanup: bool) -> bool {
        let mut scope = Scope::capture();
        scope.cleanup = cleanup;
        self.walk(test, run, &mut scope).await;
        !scope.result.is_failed()
    }

    /// Run `command` in a capturing scope and return its trimmed output.
    pub(crate) async fn capture_output(
        &self,
        command: &BuildCommand,
        run: &mut RunState,
        cleanup: bool,
    ) -> String {
        let mut scope = Scope::capture();
        scope.cleanup = cleanup;
        self.walk(command, run, &mut scope).await;
        scope.captured().trim().to_string()
    }

    /// Emit one console line for the scope, with secrets masked.
    pub(crate) fn emit(&self, run: &RunState, scope: &mut Scope, line: &str) {
        let line = run.secrets.mask(line);
        match &mut scope.output {
            Output::Console => self.deps.console.line(&line),
            Output::Capture(lines) => lines.push(line),
        }
    }

    /// Report a state transition, dropping reports that would go backwards.
    pub(crate) async fn report_state(&self, run: &mut RunState, state: JobState) {
        let job_id = &self.config.job_id;
        if let Some(last) = run.last_state {
            if !last.can_advance_to(state) {
                tracing::warn!(%job_id, from = %last, to = %state, "ignoring non-monotonic state report");
                return;
            }
        }
        run.last_state = Some(state);
        if let Err(e) = self.deps.reporter.report_state(job_id, state).await {
            tracing::warn!(%job_id, %state, error = %e, "failed to report state");
        }
    }

    /// Report Completing once per run.
    pub(crate) async fn report_completing(&self, run: &mut RunState, result: JobResult) {
        if run.completing_reported {
            return;
        }
        run.completing_reported = true;
        run.last_state = Some(JobState::Completing);
        let job_id = &self.config.job_id;
        if let Err(e) = self.deps.reporter.report_completing(job_id, result).await {
            tracing::warn!(%job_id, %result, error = %e, "failed to report completing");
        }
    }

    async fn report_completed(&self, run: &mut RunState, result: JobResult) {
        run.last_state = Some(JobState::Completed);
        let job_id = &self.config.job_id;
        if let Err(e) = self.deps.reporter.report_completed(job_id, result).await {
            tracing::warn!(%job_id, %result, error = %e, "failed to report completed");
        }
    }
}

#[cfg(test)]
#[path = "session_tests/mod.rs"]
mod tests;
