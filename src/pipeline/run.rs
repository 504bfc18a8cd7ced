use std::{
    any::Any,
    panic::{AssertUnwindSafe, catch_unwind},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use crate::{
    assets::library::LayerLibrary,
    encode::sink::{OutputSink, PngDirSink, output_file_name},
    foundation::error::{RegenError, RegenResult},
    metadata::store::{MetadataRecord, MetadataStore},
    pipeline::{
        config::RunConfig,
        events::{LogLine, RunObserver, Severity},
    },
    render::compositor::Compositor,
};

/// Cooperative stop flag shared between a run and its controller.
///
/// The run polls it between records; a record that is already rendering always finishes.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create an unset token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a stop.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Return `true` once a stop has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Lifecycle of one pipeline run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineState {
    /// Constructed, not started.
    Idle,
    /// Validating inputs and reading metadata.
    Discovering,
    /// Processing records.
    Running,
    /// Every record was handled.
    Completed,
    /// Stopped on request between records.
    Cancelled,
    /// Ended early by an error outside the per-record boundary.
    Fatal,
}

impl PipelineState {
    /// Return `true` for end states.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Fatal)
    }
}

/// How a run ended.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum RunOutcome {
    /// All records were handled (possibly zero).
    #[default]
    Completed,
    /// A stop request was honoured.
    Cancelled,
    /// The run aborted; carries the cause.
    Fatal(String),
}

/// Counters reported when a run ends.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// How the run ended.
    pub outcome: RunOutcome,
    /// Records discovered.
    pub total: usize,
    /// Records handled, whatever their result.
    pub processed: usize,
    /// Images written.
    pub saved: usize,
    /// Records skipped with a warning.
    pub skipped: usize,
    /// Records that failed.
    pub failed: usize,
    /// Attributes that resolved to no layer, across all records.
    pub misses: usize,
}

/// Mutable bookkeeping for the run in flight.
#[derive(Debug)]
struct RunState {
    phase: PipelineState,
    cancel: CancelToken,
    total: usize,
    index: usize,
}

enum ItemOutcome {
    Saved { file_name: String, misses: usize },
    NoAttributes,
    AlreadyExists { file_name: String },
}

/// Regenerates every record of a collection, one at a time.
///
/// A pipeline runs once: [`GenerationPipeline::run`] consumes it.
#[derive(Debug)]
pub struct GenerationPipeline {
    config: RunConfig,
    state: RunState,
}

impl GenerationPipeline {
    /// Prepare a run; nothing is read until [`GenerationPipeline::run`].
    pub fn new(config: RunConfig, cancel: CancelToken) -> Self {
        Self {
            config,
            state: RunState {
                phase: PipelineState::Idle,
                cancel,
                total: 0,
                index: 0,
            },
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> PipelineState {
        self.state.phase
    }

    /// Run against the configured output directory.
    pub fn run(self, observer: &mut dyn RunObserver) -> RunSummary {
        let mut sink = PngDirSink::new(self.config.out_dir.clone());
        self.run_with_sink(&mut sink, observer)
    }

    /// Run, writing finished images to `sink`.
    ///
    /// Never fails: fatal errors are reported as a `[FATAL]` line and a [`RunOutcome::Fatal`]
    /// summary. `observer.finished` is always called last.
    pub fn run_with_sink(
        mut self,
        sink: &mut dyn OutputSink,
        observer: &mut dyn RunObserver,
    ) -> RunSummary {
        let mut summary = RunSummary::default();
        summary.outcome = match self.execute(sink, observer, &mut summary) {
            Ok(outcome) => outcome,
            Err(err) => {
                self.enter(PipelineState::Fatal);
                let msg = err.to_string();
                emit(observer, LogLine::fatal(msg.clone()));
                RunOutcome::Fatal(msg)
            }
        };
        tracing::info!(
            outcome = ?summary.outcome,
            total = summary.total,
            saved = summary.saved,
            skipped = summary.skipped,
            failed = summary.failed,
            misses = summary.misses,
            "run finished"
        );
        observer.finished(&summary);
        summary
    }

    fn execute(
        &mut self,
        sink: &mut dyn OutputSink,
        observer: &mut dyn RunObserver,
        summary: &mut RunSummary,
    ) -> RegenResult<RunOutcome> {
        self.enter(PipelineState::Discovering);
        self.config.validate()?;

        let records = MetadataStore::discover(&self.config.metadata_dir)?.into_records();
        self.state.total = records.len();
        summary.total = records.len();
        if records.is_empty() {
            emit(observer, LogLine::notice("No valid metadata files found."));
            self.enter(PipelineState::Completed);
            return Ok(RunOutcome::Completed);
        }

        sink.begin(self.config.canvas)?;
        let library = LayerLibrary::open(&self.config.layer_dir)?;
        let compositor = Compositor::new(self.config.canvas, self.config.filter)?;

        self.enter(PipelineState::Running);
        for record in &records {
            if self.state.cancel.is_cancelled() {
                emit(observer, LogLine::notice("Stopped by user."));
                self.enter(PipelineState::Cancelled);
                return Ok(RunOutcome::Cancelled);
            }
            self.state.index += 1;

            let result = catch_unwind(AssertUnwindSafe(|| {
                self.process(record, &library, &compositor, &mut *sink, &mut *observer)
            }))
            .unwrap_or_else(|payload| {
                Err(RegenError::render(format!(
                    "panicked: {}",
                    panic_message(payload.as_ref())
                )))
            });

            match result {
                Ok(ItemOutcome::Saved { file_name, misses }) => {
                    summary.saved += 1;
                    summary.misses += misses;
                    emit(observer, LogLine::ok(format!("Saved {file_name}")));
                }
                Ok(ItemOutcome::NoAttributes) => {
                    summary.skipped += 1;
                    emit(
                        observer,
                        LogLine::warn(format!("{}: no attributes found.", record.id)),
                    );
                }
                Ok(ItemOutcome::AlreadyExists { file_name }) => {
                    summary.skipped += 1;
                    emit(
                        observer,
                        LogLine::warn(format!("{}: {file_name} already exists.", record.id)),
                    );
                }
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => {
                    summary.failed += 1;
                    emit(observer, LogLine::err(format!("{}: {err:#}", record.id)));
                }
            }

            summary.processed += 1;
            observer.progress(percent(self.state.index, self.state.total));
        }

        emit(observer, LogLine::done("Regeneration complete."));
        self.enter(PipelineState::Completed);
        Ok(RunOutcome::Completed)
    }

    fn process(
        &self,
        record: &MetadataRecord,
        library: &LayerLibrary,
        compositor: &Compositor,
        sink: &mut dyn OutputSink,
        observer: &mut dyn RunObserver,
    ) -> RegenResult<ItemOutcome> {
        if record.attributes.is_empty() {
            return Ok(ItemOutcome::NoAttributes);
        }
        if !self.config.overwrite && sink.contains(&record.id) {
            return Ok(ItemOutcome::AlreadyExists {
                file_name: output_file_name(&record.id),
            });
        }

        let composite = compositor.render(record, library, &mut |attr| {
            emit(
                observer,
                LogLine::miss(format!("{}/{}", attr.trait_type, attr.value)),
            );
        })?;
        let file_name = sink.write(&record.id, &composite.image)?;
        Ok(ItemOutcome::Saved {
            file_name,
            misses: composite.misses,
        })
    }

    fn enter(&mut self, next: PipelineState) {
        tracing::debug!(from = ?self.state.phase, to = ?next, "pipeline state");
        self.state.phase = next;
    }
}

/// `floor(done / total * 100)`, saturating at 100.
pub fn percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    ((done.min(total) * 100) / total) as u8
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn emit(observer: &mut dyn RunObserver, line: LogLine) {
    match line.severity {
        Severity::Err | Severity::Fatal => {
            tracing::error!(target: "regen::events", "{line}");
        }
        Severity::Warn | Severity::Miss => {
            tracing::warn!(target: "regen::events", "{line}");
        }
        Severity::Ok | Severity::Notice | Severity::Done => {
            tracing::info!(target: "regen::events", "{line}");
        }
    }
    observer.log(line);
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/run.rs"]
mod tests;
