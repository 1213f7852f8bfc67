//! Events an engine pushes to its host.

use crate::types::{FileId, StagedFile};

/// Sender half an engine is constructed with.
pub type EventSender = tokio::sync::mpsc::UnboundedSender<EngineEvent>;

/// Receiver half the session layer consumes.
pub type EventReceiver = tokio::sync::mpsc::UnboundedReceiver<EngineEvent>;

/// Asynchronous outcome of engine commands and transfer activity.
///
/// Transfer events carry the `generation` of the session they belong to.
/// The session layer bumps its generation on every cancel or reset, so a
/// late event from an aborted transfer can be recognized and discarded.
/// Intake events (`FileAdded`, `FileRemoved`, `RestrictionFailed`) are
/// generation-free: they mutate the staged set, not a transfer.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// A file passed engine-internal restrictions and was staged.
    FileAdded(StagedFile),
    /// A staged file was removed before or during transfer.
    FileRemoved(FileId),
    /// The engine began transferring the staged set.
    UploadStarted { generation: u64 },
    /// Byte-progress across the whole staged set.
    Progress {
        generation: u64,
        file: FileId,
        bytes_uploaded: u64,
        bytes_total: u64,
    },
    /// A file finished uploading.
    Succeeded { generation: u64, file: FileId },
    /// A file failed permanently (retries exhausted).
    Failed {
        generation: u64,
        file: FileId,
        message: String,
    },
    /// A failed request is being retried.
    Retrying { generation: u64, file: FileId },
    /// Engine-internal policy rejected a file at intake.
    RestrictionFailed { name: String, message: String },
    /// All transfers were aborted.
    CancelledAll { generation: u64 },
}

impl EngineEvent {
    /// Generation this event belongs to, if it is a transfer event.
    pub fn generation(&self) -> Option<u64> {
        match self {
            EngineEvent::UploadStarted { generation }
            | EngineEvent::Progress { generation, .. }
            | EngineEvent::Succeeded { generation, .. }
            | EngineEvent::Failed { generation, .. }
            | EngineEvent::Retrying { generation, .. }
            | EngineEvent::CancelledAll { generation } => Some(*generation),
            EngineEvent::FileAdded(_)
            | EngineEvent::FileRemoved(_)
            | EngineEvent::RestrictionFailed { .. } => None,
        }
    }
}
