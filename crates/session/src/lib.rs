//! Upload session orchestration.
//!
//! Sits between a UI shell and an [`uplift_engine::UploadEngine`]: validates
//! files against category policies, drives the session state machine, and
//! derives progress, throughput and chunk-size metrics from engine events.

pub mod chunk;
pub mod controller;
pub mod notify;
pub mod policy;
pub mod progress;
pub mod throughput;

pub use chunk::{MAX_CHUNK_SIZE, MIN_CHUNK_SIZE, optimal_chunk_size};
pub use controller::{SessionController, UploadStep};
pub use notify::{Notice, NoticeQueue, Severity};
pub use policy::{FileCategory, PolicyError, UploadPolicy};
pub use progress::{ProgressSnapshot, format_bytes, format_duration};
pub use throughput::ThroughputEstimator;
