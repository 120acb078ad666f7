//! The delta sampler: polls one process at a fixed interval and tags every
//! counter relative to the previous successful sample.

pub mod cancel;
pub mod compare;
pub mod render;

use std::time::Duration;

use futures::Stream;
use futures::stream;
use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::system::{LookupFailure, ProcessIdentity, ResourceSnapshot, SnapshotSource};
pub use cancel::{CancelSignal, Canceller, cancel_on_ctrl_c, cancel_pair};
pub use compare::{Trend, compare};
pub use render::{FieldKind, RenderedField, RenderedLine, render};

pub const DEFAULT_ITERATIONS: usize = 30;
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(2);

/// When a session ends. Both budgets unset means run until cancelled.
#[derive(Clone, Debug)]
pub struct StopCondition {
    pub max_iterations: Option<usize>,
    pub max_duration: Option<Duration>,
    pub cancel: Option<CancelSignal>,
}

impl Default for StopCondition {
    fn default() -> Self {
        Self {
            max_iterations: Some(DEFAULT_ITERATIONS),
            max_duration: None,
            cancel: None,
        }
    }
}

impl StopCondition {
    pub fn iterations(count: usize) -> Self {
        Self {
            max_iterations: Some(count),
            ..Self::default()
        }
    }

    pub fn unbounded() -> Self {
        Self {
            max_iterations: None,
            ..Self::default()
        }
    }

    pub fn with_max_duration(mut self, duration: Duration) -> Self {
        self.max_duration = Some(duration);
        self
    }

    pub fn with_cancel(mut self, signal: CancelSignal) -> Self {
        self.cancel = Some(signal);
        self
    }
}

#[derive(Clone, Debug)]
pub struct SamplerOptions {
    pub interval: Duration,
    pub stop: StopCondition,
}

impl Default for SamplerOptions {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            stop: StopCondition::default(),
        }
    }
}

/// One item of a monitoring session. Iterations are 1-based.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SampleLine {
    Sample {
        iteration: usize,
        line: RenderedLine,
    },
    Failure {
        iteration: usize,
        failure: LookupFailure,
    },
}

impl SampleLine {
    pub fn iteration(&self) -> usize {
        match self {
            SampleLine::Sample { iteration, .. } | SampleLine::Failure { iteration, .. } => {
                *iteration
            }
        }
    }

    pub fn rendered(&self) -> Option<&RenderedLine> {
        match self {
            SampleLine::Sample { line, .. } => Some(line),
            SampleLine::Failure { .. } => None,
        }
    }
}

pub struct Sampler<S> {
    source: S,
    identity: ProcessIdentity,
    options: SamplerOptions,
    /// Last successful snapshot; failed fetches leave it untouched.
    history: Option<ResourceSnapshot>,
    iteration: usize,
    deadline: Option<Instant>,
}

impl<S: SnapshotSource> Sampler<S> {
    pub fn new(source: S, identity: ProcessIdentity, options: SamplerOptions) -> Self {
        Self {
            source,
            identity,
            options,
            history: None,
            iteration: 0,
            deadline: None,
        }
    }

    /// Consumes the sampler; the stream is finite unless the stop condition
    /// is open-ended, and cannot be restarted.
    pub fn into_stream(self) -> impl Stream<Item = SampleLine> {
        stream::unfold(self, |mut sampler| async move {
            let line = sampler.next_line().await?;
            Some((line, sampler))
        })
    }

    async fn next_line(&mut self) -> Option<SampleLine> {
        if self.iteration == 0 {
            // A bound too far out to represent is no bound at all.
            self.deadline = self
                .options
                .stop
                .max_duration
                .and_then(|d| Instant::now().checked_add(d));
            info!(
                pid = self.identity.pid,
                interval_ms = self.options.interval.as_millis() as u64,
                "monitoring session started"
            );
        } else {
            if self.budget_spent() {
                return self.finish();
            }
            if !self.wait().await {
                return self.finish();
            }
        }
        if self.should_stop() {
            return self.finish();
        }
        self.iteration += 1;
        Some(self.sample())
    }

    fn finish(&self) -> Option<SampleLine> {
        info!(
            pid = self.identity.pid,
            iterations = self.iteration,
            "monitoring session finished"
        );
        None
    }

    fn budget_spent(&self) -> bool {
        self.options
            .stop
            .max_iterations
            .is_some_and(|max| self.iteration >= max)
    }

    fn should_stop(&self) -> bool {
        let stop = &self.options.stop;
        self.budget_spent()
            || self.deadline.is_some_and(|d| Instant::now() >= d)
            || stop.cancel.as_ref().is_some_and(|c| c.is_cancelled())
    }

    /// Returns `false` if the wait was cut short by cancellation or the deadline.
    async fn wait(&mut self) -> bool {
        let sleep = tokio::time::sleep(self.options.interval);
        let deadline = self.deadline;
        let cancel = self.options.stop.cancel.as_mut();
        tokio::select! {
            _ = sleep => true,
            _ = until(deadline) => false,
            _ = cancelled(cancel) => false,
        }
    }

    fn sample(&mut self) -> SampleLine {
        let iteration = self.iteration;
        match self.fetch() {
            Ok(snapshot) => {
                let line = render(&snapshot, self.history.as_ref());
                self.history = Some(snapshot);
                debug!(iteration, "sample rendered");
                SampleLine::Sample { iteration, line }
            }
            Err(failure) => {
                info!(iteration, %failure, "sample failed, keeping previous snapshot");
                SampleLine::Failure { iteration, failure }
            }
        }
    }

    fn fetch(&mut self) -> Result<ResourceSnapshot, LookupFailure> {
        let snapshot = self.source.snapshot(self.identity.pid)?;
        self.identity.verify(&snapshot)?;
        Ok(snapshot)
    }
}

async fn until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

async fn cancelled(signal: Option<&mut CancelSignal>) {
    match signal {
        Some(signal) => signal.cancelled().await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::ProcessEntry;
    use futures::StreamExt;
    use std::collections::VecDeque;

    struct Scripted {
        script: VecDeque<Result<ResourceSnapshot, LookupFailure>>,
    }

    impl SnapshotSource for Scripted {
        fn list_processes(&mut self) -> Vec<ProcessEntry> {
            Vec::new()
        }

        fn snapshot(&mut self, pid: u32) -> Result<ResourceSnapshot, LookupFailure> {
            self.script
                .pop_front()
                .unwrap_or(Err(LookupFailure::NotFound { pid }))
        }
    }

    fn snap(working_set: u64) -> ResourceSnapshot {
        ResourceSnapshot {
            pid: 5,
            start_time: 1_000,
            working_set_bytes: working_set,
            user_cpu_time: Duration::ZERO,
            privileged_cpu_time: Duration::ZERO,
            total_cpu_time: Duration::ZERO,
            paged_system_memory_bytes: 0,
            paged_memory_bytes: 0,
        }
    }

    fn options(iterations: usize) -> SamplerOptions {
        SamplerOptions {
            interval: Duration::ZERO,
            stop: StopCondition::iterations(iterations),
        }
    }

    #[tokio::test]
    async fn zero_iterations_yields_nothing() {
        let source = Scripted {
            script: VecDeque::from([Ok(snap(1))]),
        };
        let lines: Vec<SampleLine> =
            Sampler::new(source, ProcessIdentity::new(5, 1_000), options(0))
                .into_stream()
                .collect()
                .await;
        assert!(lines.is_empty());
    }

    #[tokio::test]
    async fn identity_is_adopted_then_enforced() {
        let mut reused = snap(3);
        reused.start_time = 2_000;
        let source = Scripted {
            script: VecDeque::from([Ok(snap(1)), Ok(reused)]),
        };
        let sampler = Sampler::new(source, ProcessIdentity::unverified(5), options(2));
        let lines: Vec<SampleLine> = sampler.into_stream().collect().await;
        assert!(matches!(lines[0], SampleLine::Sample { iteration: 1, .. }));
        assert_eq!(
            lines[1],
            SampleLine::Failure {
                iteration: 2,
                failure: LookupFailure::IdentityChanged {
                    pid: 5,
                    expected: 1_000,
                    found: 2_000
                }
            }
        );
    }

    #[tokio::test]
    async fn unrepresentable_wall_clock_bound_is_ignored() {
        let source = Scripted {
            script: VecDeque::from([Ok(snap(1)), Ok(snap(2))]),
        };
        let stop = StopCondition::iterations(2).with_max_duration(Duration::from_secs(u64::MAX));
        let options = SamplerOptions {
            interval: Duration::ZERO,
            stop,
        };
        let lines: Vec<SampleLine> =
            Sampler::new(source, ProcessIdentity::new(5, 1_000), options)
                .into_stream()
                .collect()
                .await;
        assert_eq!(lines.len(), 2);
    }

    #[derive(Clone, Default)]
    struct Captured(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn failed_samples_stay_below_default_log_level() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_writer(move || writer.clone())
            .finish();
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();

        let lines = tracing::subscriber::with_default(subscriber, || {
            let source = Scripted {
                script: VecDeque::from([Ok(snap(1)), Err(LookupFailure::NotFound { pid: 5 })]),
            };
            runtime.block_on(
                Sampler::new(source, ProcessIdentity::new(5, 1_000), options(2))
                    .into_stream()
                    .collect::<Vec<SampleLine>>(),
            )
        });

        assert!(matches!(lines[1], SampleLine::Failure { .. }));
        assert!(captured.0.lock().unwrap().is_empty());
    }

    #[test]
    fn default_stop_is_thirty_iterations() {
        let options = SamplerOptions::default();
        assert_eq!(options.interval, Duration::from_secs(2));
        assert_eq!(options.stop.max_iterations, Some(30));
        assert!(options.stop.max_duration.is_none());
    }
}
