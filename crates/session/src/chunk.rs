//! Adaptive chunk sizing.

/// Smallest chunk the estimator will produce (5 MiB, the S3 part minimum).
pub const MIN_CHUNK_SIZE: u64 = 5 * 1024 * 1024;

/// Largest chunk the estimator will produce (50 MiB).
pub const MAX_CHUNK_SIZE: u64 = 50 * 1024 * 1024;

/// Target chunk count for large files.
pub const OPTIMAL_CHUNK_COUNT: u64 = 10_000;

/// Target transfer time per chunk at the current speed, in seconds.
const CHUNK_TIME_BUDGET_SECS: f64 = 1.5;

const MIB: u64 = 1024 * 1024;

/// Picks a chunk size for `file_size` given a smoothed throughput
/// estimate in bytes/second (0 when no estimate is available).
///
/// The baseline divides the file into [`OPTIMAL_CHUNK_COUNT`] chunks.
/// With a throughput estimate, the chunk is additionally capped so that
/// one chunk takes about 1.5 s to send at the current speed. The result
/// is clamped to `[MIN_CHUNK_SIZE, MAX_CHUNK_SIZE]` and rounded up to a
/// whole MiB. Pure and deterministic.
pub fn optimal_chunk_size(file_size: u64, bytes_per_sec: f64) -> u64 {
    let mut chunk = file_size.div_ceil(OPTIMAL_CHUNK_COUNT);

    if bytes_per_sec > 0.0 {
        let budget = (bytes_per_sec * CHUNK_TIME_BUDGET_SECS) as u64;
        chunk = chunk.min(budget);
    }

    chunk = chunk.clamp(MIN_CHUNK_SIZE, MAX_CHUNK_SIZE);
    chunk.div_ceil(MIB) * MIB
}
