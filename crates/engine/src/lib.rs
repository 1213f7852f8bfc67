//! Contract between the upload session layer and a resumable-upload engine.
//!
//! An engine owns the wire protocol: chunk negotiation, offset queries,
//! HTTP-level retries. This crate does **not** implement any of that — it
//! defines the command surface a session controller drives, the event
//! stream an engine pushes back, and the static configuration an engine
//! is constructed with. Real engines and test mocks implement
//! [`UploadEngine`] over a `tokio` mpsc channel supplied by the host.

pub mod config;
pub mod contract;
pub mod events;
pub mod request;
pub mod types;

pub use config::EngineConfig;
pub use contract::UploadEngine;
pub use events::{EngineEvent, EventReceiver, EventSender};
pub use request::{BearerAuth, RequestDecorator, RequestMeta};
pub use types::{FileCandidate, FileId, FileSource, StagedFile};

/// Errors produced at the engine boundary.
///
/// These cover intake and command dispatch only. Transfer failures are
/// reported asynchronously as [`EngineEvent::Failed`], never as command
/// return values.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("file rejected: {0}")]
    Rejected(String),

    #[error("unknown file: {0}")]
    UnknownFile(FileId),

    #[error("engine shut down")]
    ShutDown,

    #[error("event channel closed")]
    ChannelClosed,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
