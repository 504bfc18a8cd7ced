use std::{
    panic::{AssertUnwindSafe, catch_unwind},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
        mpsc,
    },
    thread::JoinHandle,
};

use crate::{
    foundation::error::{RegenError, RegenResult},
    pipeline::{
        config::RunConfig,
        events::{LogLine, RunEvent, RunObserver},
        run::{CancelToken, GenerationPipeline, RunOutcome, RunSummary, panic_message},
    },
};

/// Owns the single background thread that executes runs.
///
/// Only one run may be in flight per worker; [`RegenWorker::start`] rejects a second one with
/// [`RegenError::Busy`].
#[derive(Debug, Default)]
pub struct RegenWorker {
    active: Arc<AtomicBool>,
    cancel: Option<CancelToken>,
    handle: Option<JoinHandle<RunSummary>>,
}

impl RegenWorker {
    /// Create an idle worker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `true` while a run has not yet delivered its completion event.
    pub fn is_running(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Start a run on a background thread and return its event stream.
    ///
    /// The stream always ends with [`RunEvent::Finished`], including when the run panics.
    pub fn start(&mut self, config: RunConfig) -> RegenResult<mpsc::Receiver<RunEvent>> {
        if self.is_running() {
            return Err(RegenError::Busy);
        }
        // Reap the previous run; its completion event has already been sent.
        self.join();

        let (tx, rx) = mpsc::channel();
        let cancel = CancelToken::new();
        let pipeline = GenerationPipeline::new(config, cancel.clone());
        let mut channel = WorkerChannel {
            tx,
            active: self.active.clone(),
        };

        self.active.store(true, Ordering::SeqCst);
        let spawned = std::thread::Builder::new()
            .name("regen-worker".to_string())
            .spawn(move || run_guarded(pipeline, &mut channel));
        let handle = match spawned {
            Ok(handle) => handle,
            Err(err) => {
                self.active.store(false, Ordering::SeqCst);
                return Err(anyhow::Error::new(err)
                    .context("spawn regen worker thread")
                    .into());
            }
        };

        self.cancel = Some(cancel);
        self.handle = Some(handle);
        Ok(rx)
    }

    /// Ask the current run to stop before its next record. Returns `false` when idle.
    pub fn stop(&self) -> bool {
        match &self.cancel {
            Some(cancel) if self.is_running() => {
                cancel.cancel();
                true
            }
            _ => false,
        }
    }

    /// Wait for the current run's thread and return its summary.
    pub fn join(&mut self) -> Option<RunSummary> {
        let handle = self.handle.take()?;
        self.cancel = None;
        match handle.join() {
            Ok(summary) => Some(summary),
            Err(payload) => {
                tracing::error!(
                    panic = %panic_message(payload.as_ref()),
                    "regen worker thread panicked"
                );
                None
            }
        }
    }

    /// Stop the current run, if any, and wait for it.
    pub fn shutdown(&mut self) -> Option<RunSummary> {
        self.stop();
        self.join()
    }
}

impl Drop for RegenWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Sender that marks the worker idle just before the completion event goes out.
struct WorkerChannel {
    tx: mpsc::Sender<RunEvent>,
    active: Arc<AtomicBool>,
}

impl RunObserver for WorkerChannel {
    fn log(&mut self, line: LogLine) {
        self.tx.log(line);
    }

    fn progress(&mut self, percent: u8) {
        self.tx.progress(percent);
    }

    fn finished(&mut self, summary: &RunSummary) {
        self.active.store(false, Ordering::SeqCst);
        self.tx.finished(summary);
    }
}

fn run_guarded(pipeline: GenerationPipeline, channel: &mut WorkerChannel) -> RunSummary {
    match catch_unwind(AssertUnwindSafe(|| pipeline.run(&mut *channel))) {
        Ok(summary) => summary,
        Err(payload) => {
            let msg = format!("worker panicked: {}", panic_message(payload.as_ref()));
            tracing::error!("{msg}");
            let summary = RunSummary {
                outcome: RunOutcome::Fatal(msg.clone()),
                ..RunSummary::default()
            };
            channel.log(LogLine::fatal(msg));
            channel.finished(&summary);
            summary
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/worker.rs"]
mod tests;
