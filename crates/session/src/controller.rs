//! Upload session lifecycle.
//!
//! The controller owns the staged-file set, the current lifecycle step,
//! and all derived metrics. It consumes validation results and engine
//! events and produces state transitions; nothing else mutates its state.
//! All commands toward the engine are fire-and-forget: their outcomes
//! come back on the event channel, one event at a time.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use uplift_engine::{EngineEvent, EventReceiver, FileCandidate, FileId, StagedFile, UploadEngine};

use crate::chunk::{MIN_CHUNK_SIZE, optimal_chunk_size};
use crate::notify::{Notice, NoticeQueue};
use crate::policy::UploadPolicy;
use crate::progress::ProgressSnapshot;
use crate::throughput::ThroughputEstimator;

/// Lifecycle step of an upload session. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UploadStep {
    /// No files staged.
    Default,
    /// At least one file staged, upload not started.
    AddFiles,
    /// Engine actively transferring.
    Uploading,
    /// Terminal display state after success.
    UploadComplete,
    /// Terminal display state after failure.
    UploadError,
}

impl fmt::Display for UploadStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UploadStep::Default => "default",
            UploadStep::AddFiles => "add-files",
            UploadStep::Uploading => "uploading",
            UploadStep::UploadComplete => "upload-complete",
            UploadStep::UploadError => "upload-error",
        };
        f.write_str(s)
    }
}

/// Drives one upload session from file staging to a terminal outcome.
///
/// Single-consumer by construction: create one per application session,
/// feed it the engine's event channel (directly or via [`run`](Self::run)),
/// and tear it down with [`cancel`](Self::cancel) on shutdown.
pub struct SessionController {
    engine: Arc<dyn UploadEngine>,
    policy: UploadPolicy,
    step: UploadStep,
    files: Vec<StagedFile>,
    bytes_uploaded: u64,
    bytes_total: u64,
    throughput: ThroughputEstimator,
    paused: bool,
    error: Option<String>,
    started_at: Option<Instant>,
    /// Bumped on every cancel or reset; engine events from an older
    /// generation are discarded.
    generation: u64,
    chunk_size: u64,
    notices: NoticeQueue,
}

impl SessionController {
    pub fn new(engine: Arc<dyn UploadEngine>, policy: UploadPolicy) -> Self {
        Self {
            engine,
            policy,
            step: UploadStep::Default,
            files: Vec::new(),
            bytes_uploaded: 0,
            bytes_total: 0,
            throughput: ThroughputEstimator::new(),
            paused: false,
            error: None,
            started_at: None,
            generation: 0,
            chunk_size: MIN_CHUNK_SIZE,
            notices: NoticeQueue::new(),
        }
    }

    // -----------------------------------------------------------------
    // User commands
    // -----------------------------------------------------------------

    /// Validates a dropped or selected file and hands it to the engine.
    ///
    /// Returns the engine-assigned id, or `None` with a queued notice on
    /// rejection. The file joins the staged set only once the engine
    /// confirms with `FileAdded`.
    pub fn stage_file(&mut self, candidate: FileCandidate) -> Option<FileId> {
        if !matches!(self.step, UploadStep::Default | UploadStep::AddFiles) {
            warn!(step = %self.step, "ignoring file staged outside selection");
            return None;
        }

        let name = candidate.name.clone();
        match self.policy.check(&candidate, self.files.len()) {
            Ok(category) => {
                debug!(file = %name, ?category, size = candidate.size, "file passed validation");
            }
            Err(reason) => {
                self.notices.error(reason.to_string());
                return None;
            }
        }

        match self.engine.add_file(candidate) {
            Ok(id) => Some(id),
            Err(e) => {
                warn!(file = %name, error = %e, "engine rejected intake");
                self.notices.error(format!("Failed to add file: {name}"));
                None
            }
        }
    }

    /// Removes a staged file before the upload starts.
    pub fn remove_file(&mut self, id: &FileId) {
        if self.step != UploadStep::AddFiles {
            return;
        }
        if let Err(e) = self.engine.remove_file(id) {
            warn!(file = %id, error = %e, "remove command not accepted");
        }
    }

    /// Removes every staged file before the upload starts.
    ///
    /// The set empties as the engine confirms each removal; the final
    /// `FileRemoved` returns the session to `default`.
    pub fn clear(&mut self) {
        if self.step != UploadStep::AddFiles {
            return;
        }
        let ids: Vec<FileId> = self.files.iter().map(|f| f.id.clone()).collect();
        for id in ids {
            if let Err(e) = self.engine.remove_file(&id) {
                warn!(file = %id, error = %e, "remove command not accepted");
            }
        }
    }

    /// Starts transferring the staged set.
    pub fn start_upload(&mut self) {
        if self.step != UploadStep::AddFiles || self.files.is_empty() {
            warn!(step = %self.step, "ignoring upload start outside file selection");
            return;
        }

        self.throughput.reset();
        self.started_at = Some(Instant::now());
        self.chunk_size = optimal_chunk_size(self.bytes_total, 0.0);
        debug!(
            generation = self.generation,
            chunk_size = self.chunk_size,
            "starting upload"
        );

        if let Err(e) = self.engine.upload(self.generation) {
            warn!(error = %e, "upload command not accepted");
            self.notices.error("Failed to start upload");
            self.started_at = None;
        }
    }

    /// Toggles the paused flag and forwards pause/resume to the engine.
    ///
    /// The flag is controller-owned; the engine call is fire-and-forget.
    pub fn toggle_pause(&mut self) {
        if self.step != UploadStep::Uploading {
            return;
        }
        self.paused = !self.paused;
        let result = if self.paused {
            self.engine.pause_all()
        } else {
            self.engine.resume_all()
        };
        if let Err(e) = result {
            warn!(paused = self.paused, error = %e, "pause command not accepted");
        }
    }

    /// Aborts the session and clears local state immediately.
    ///
    /// Local state is optimistic: the engine acknowledges later with a
    /// `CancelledAll` event, which by then is stale and gets discarded.
    pub fn cancel(&mut self) {
        if !matches!(self.step, UploadStep::AddFiles | UploadStep::Uploading) {
            return;
        }
        if let Err(e) = self.engine.cancel_all(self.generation) {
            warn!(error = %e, "cancel command not accepted");
        }
        info!(generation = self.generation, "session cancelled");
        self.reset_to_default();
    }

    /// Returns from a terminal display state to `default`.
    pub fn acknowledge(&mut self) {
        if matches!(self.step, UploadStep::UploadComplete | UploadStep::UploadError) {
            self.error = None;
            self.step = UploadStep::Default;
        }
    }

    // -----------------------------------------------------------------
    // Engine events
    // -----------------------------------------------------------------

    /// Folds one engine event into the session. Total: every event maps
    /// to exactly one outcome, stale-generation events are discarded.
    pub fn handle_event(&mut self, event: EngineEvent) {
        if let Some(generation) = event.generation()
            && generation != self.generation
        {
            warn!(
                event_generation = generation,
                current = self.generation,
                "discarding stale engine event"
            );
            return;
        }

        match event {
            EngineEvent::FileAdded(file) => {
                if !matches!(self.step, UploadStep::Default | UploadStep::AddFiles) {
                    warn!(file = %file.name, step = %self.step, "file added outside selection");
                    return;
                }
                debug!(file = %file.name, size = file.size, "file staged");
                self.bytes_total += file.size;
                self.notices
                    .success(format!("File {} added successfully", file.name));
                self.files.push(file);
                self.step = UploadStep::AddFiles;
            }
            EngineEvent::FileRemoved(id) => {
                self.files.retain(|f| f.id != id);
                self.bytes_total = self.files.iter().map(|f| f.size).sum();
                if self.files.is_empty() && self.step == UploadStep::AddFiles {
                    self.step = UploadStep::Default;
                }
            }
            EngineEvent::UploadStarted { .. } => {
                if self.step == UploadStep::AddFiles {
                    info!(
                        files = self.files.len(),
                        total_bytes = self.bytes_total,
                        "upload started"
                    );
                    self.step = UploadStep::Uploading;
                }
            }
            EngineEvent::Progress {
                bytes_uploaded,
                bytes_total,
                ..
            } => {
                if self.step != UploadStep::Uploading {
                    return;
                }
                self.bytes_total = bytes_total;
                self.bytes_uploaded = bytes_uploaded.min(bytes_total);
                self.throughput.tick(self.bytes_uploaded);
                self.chunk_size =
                    optimal_chunk_size(self.bytes_total, self.throughput.bytes_per_sec());
            }
            EngineEvent::Succeeded { file, .. } => {
                if self.step != UploadStep::Uploading {
                    return;
                }
                let name = self.file_name(&file);
                info!(file = %name, "upload complete");
                self.notices.success(format!("Successfully uploaded {name}"));
                self.finish(UploadStep::UploadComplete, None);
            }
            EngineEvent::Failed { file, message, .. } => {
                if self.step != UploadStep::Uploading {
                    return;
                }
                let name = self.file_name(&file);
                info!(file = %name, error = %message, "upload failed");
                self.notices
                    .error(format!("Failed to upload {name}: {message}"));
                self.finish(UploadStep::UploadError, Some(message));
            }
            EngineEvent::Retrying { file, .. } => {
                let name = self.file_name(&file);
                self.notices.info(format!("Retrying upload for {name}..."));
            }
            EngineEvent::RestrictionFailed { name, message } => {
                self.notices.error(format!("{message} for file {name}"));
            }
            EngineEvent::CancelledAll { .. } => {
                // Engine-initiated abort; controller-initiated cancels
                // have already bumped the generation and never get here.
                info!(generation = self.generation, "engine cancelled all transfers");
                self.reset_to_default();
            }
        }
    }

    /// Consumes engine events until the channel closes or `shutdown`
    /// fires. Shutdown tears the session down by cancelling.
    pub async fn run(&mut self, events: &mut EventReceiver, shutdown: CancellationToken) {
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    debug!("session loop shutting down");
                    self.cancel();
                    break;
                }
                event = events.recv() => match event {
                    Some(event) => self.handle_event(event),
                    None => {
                        debug!("engine event channel closed");
                        break;
                    }
                },
            }
        }
    }

    // -----------------------------------------------------------------
    // Derived state
    // -----------------------------------------------------------------

    /// Current progress metrics.
    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot::new(
            self.bytes_uploaded,
            self.bytes_total,
            self.throughput.bytes_per_sec(),
        )
    }

    pub fn step(&self) -> UploadStep {
        self.step
    }

    pub fn files(&self) -> &[StagedFile] {
        &self.files
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Message of the last transfer failure while in `upload-error`.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Time since the current upload started, if one is running.
    pub fn elapsed(&self) -> Option<Duration> {
        self.started_at.map(|t| t.elapsed())
    }

    /// Chunk size last suggested for this session, re-evaluated on each
    /// progress tick. Engines with a static chunk size may ignore it.
    pub fn chunk_size(&self) -> u64 {
        self.chunk_size
    }

    /// Removes and returns pending notices for display.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.notices.drain()
    }

    pub fn notices(&self) -> &NoticeQueue {
        &self.notices
    }

    // -----------------------------------------------------------------

    fn file_name(&self, id: &FileId) -> String {
        self.files
            .iter()
            .find(|f| f.id == *id)
            .map(|f| f.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    /// Transition into a terminal display state, clearing the staged set
    /// and all metrics. Bumps the generation so residual engine events
    /// from the finished transfer are recognized as stale.
    fn finish(&mut self, step: UploadStep, error: Option<String>) {
        self.generation += 1;
        self.files.clear();
        self.bytes_uploaded = 0;
        self.bytes_total = 0;
        self.throughput.reset();
        self.paused = false;
        self.started_at = None;
        self.error = error;
        self.step = step;
    }

    fn reset_to_default(&mut self) {
        self.finish(UploadStep::Default, None);
        self.chunk_size = MIN_CHUNK_SIZE;
    }
}
