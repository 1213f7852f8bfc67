//! File identity and staging types shared by engines and the session layer.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier an engine assigns to a staged file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(String);

impl FileId {
    /// Generates a fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for FileId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FileId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Raw data handle for a file awaiting upload.
///
/// Small files arrive as in-memory buffers (drag/drop payloads); large
/// files stay on disk and are read chunk-by-chunk by the engine.
#[derive(Debug, Clone)]
pub enum FileSource {
    Memory(Vec<u8>),
    Disk(PathBuf),
}

/// A user-selected file before validation and engine intake.
#[derive(Debug, Clone)]
pub struct FileCandidate {
    pub name: String,
    /// Declared MIME type, e.g. `video/mp4`. Not verified against content.
    pub media_type: String,
    pub size: u64,
    pub source: FileSource,
}

impl FileCandidate {
    /// Builds a candidate from an in-memory buffer. Size is taken from
    /// the buffer length.
    pub fn from_bytes(
        name: impl Into<String>,
        media_type: impl Into<String>,
        data: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            size: data.len() as u64,
            source: FileSource::Memory(data),
        }
    }

    /// Builds a candidate backed by a file on disk.
    pub fn from_path(
        name: impl Into<String>,
        media_type: impl Into<String>,
        size: u64,
        path: PathBuf,
    ) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            size,
            source: FileSource::Disk(path),
        }
    }
}

/// A file accepted by the engine, awaiting or undergoing transfer.
#[derive(Debug, Clone)]
pub struct StagedFile {
    pub id: FileId,
    pub name: String,
    pub media_type: String,
    pub size: u64,
    pub source: FileSource,
}

impl StagedFile {
    /// Promotes a candidate to a staged file under the given id.
    pub fn from_candidate(id: FileId, candidate: FileCandidate) -> Self {
        Self {
            id,
            name: candidate.name,
            media_type: candidate.media_type,
            size: candidate.size,
            source: candidate.source,
        }
    }
}
