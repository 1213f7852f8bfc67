//! The engine command surface.

use crate::EngineError;
use crate::types::{FileCandidate, FileId};

/// Abstract resumable-upload engine.
///
/// Implementations own chunk transfer and the wire protocol; the session
/// layer drives them through this trait and reads outcomes from the
/// [`EngineEvent`](crate::EngineEvent) channel the engine was constructed
/// with. Using a trait keeps session logic decoupled from transport and
/// testable with mocks.
///
/// Every command is fire-and-forget from the caller's perspective: a
/// returned `Ok` means the command was accepted, not that it took effect.
/// Completion, progress, and failure all arrive later as discrete events.
pub trait UploadEngine: Send + Sync {
    /// Registers a file with the engine and returns its assigned id.
    ///
    /// Engine-internal restrictions (file count, size bounds) may reject
    /// the candidate independently of host-side validation. On success
    /// the engine emits `FileAdded`.
    fn add_file(&self, candidate: FileCandidate) -> Result<FileId, EngineError>;

    /// Begins transferring all staged files under `generation`.
    fn upload(&self, generation: u64) -> Result<(), EngineError>;

    /// Pauses all in-flight transfers.
    fn pause_all(&self) -> Result<(), EngineError>;

    /// Resumes previously paused transfers.
    fn resume_all(&self) -> Result<(), EngineError>;

    /// Aborts all transfers belonging to `generation` and drops the
    /// staged set. Emits `CancelledAll` when done.
    fn cancel_all(&self, generation: u64) -> Result<(), EngineError>;

    /// Removes a staged file before upload starts. Emits `FileRemoved`.
    fn remove_file(&self, id: &FileId) -> Result<(), EngineError>;
}
