//! Static engine configuration.

use std::time::Duration;

/// Maximum number of files an engine accepts per session.
pub const DEFAULT_MAX_FILES: usize = 5;

/// Engine-level cap on a single file (5 GiB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 5 * 1024 * 1024 * 1024;

/// Engine-level floor on a single file (~1 MB).
pub const DEFAULT_MIN_FILE_SIZE: u64 = 1_000_000;

/// Initial chunk size an engine starts a session with (5 MiB).
pub const DEFAULT_INITIAL_CHUNK_SIZE: u64 = 5 * 1024 * 1024;

/// Maximum concurrent chunk requests.
pub const DEFAULT_CONCURRENCY: usize = 5;

/// Configuration an engine is constructed with, fixed for its lifetime.
///
/// Restrictions here are enforced inside the engine, independently of any
/// host-side validation policy. A violation surfaces as
/// [`EngineEvent::RestrictionFailed`](crate::EngineEvent::RestrictionFailed)
/// or an intake error, never as a silent drop.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Upload endpoint URL.
    pub endpoint: String,
    pub max_files: usize,
    pub max_file_size: u64,
    pub min_file_size: u64,
    /// Chunk size the engine starts with. A request decorator may suggest
    /// a different value per request; whether the engine honors it is
    /// implementation-defined.
    pub chunk_size: u64,
    /// Maximum in-flight chunk requests.
    pub concurrency: usize,
    /// Delays between successive retry attempts for a failed request.
    pub retry_delays: Vec<Duration>,
    /// Forget the resume fingerprint once a file uploads successfully.
    pub remove_fingerprint_on_success: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            max_files: DEFAULT_MAX_FILES,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            min_file_size: DEFAULT_MIN_FILE_SIZE,
            chunk_size: DEFAULT_INITIAL_CHUNK_SIZE,
            concurrency: DEFAULT_CONCURRENCY,
            retry_delays: vec![
                Duration::ZERO,
                Duration::from_secs(1),
                Duration::from_secs(3),
                Duration::from_secs(5),
            ],
            remove_fingerprint_on_success: true,
        }
    }
}

impl EngineConfig {
    /// Default configuration pointed at `endpoint`.
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }
}
