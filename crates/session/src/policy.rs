//! File intake validation.
//!
//! Pre-validation runs before a candidate is handed to the engine; the
//! engine applies its own restrictions independently. A rejection here
//! produces a human-readable reason and never changes session state.

use uplift_engine::FileCandidate;

use crate::progress::format_bytes;

const MIB: u64 = 1024 * 1024;
const GIB: u64 = 1024 * MIB;

/// Default deployment-wide cap on any single file (5 GiB).
///
/// Deployments have shipped with caps as low as 500 MB; the cap is
/// configuration, not a constant of the domain.
pub const DEFAULT_OVERALL_CAP: u64 = 5 * GIB;

/// Default maximum number of staged files per session.
pub const DEFAULT_MAX_FILES: usize = 5;

/// Accepted file categories, each with its own MIME allow-list and cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileCategory {
    Video,
    Image,
    Pdf,
    Audio,
    Document,
}

impl FileCategory {
    /// Classifies a declared MIME type, or `None` if unsupported.
    pub fn for_media_type(media_type: &str) -> Option<Self> {
        match media_type {
            "video/mp4" | "video/webm" | "video/ogg" => Some(Self::Video),
            "image/jpeg" | "image/png" | "image/gif" | "image/webp" => Some(Self::Image),
            "application/pdf" => Some(Self::Pdf),
            "audio/mpeg" | "audio/wav" | "audio/ogg" => Some(Self::Audio),
            "application/msword"
            | "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            | "application/vnd.ms-excel"
            | "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet" => {
                Some(Self::Document)
            }
            _ => None,
        }
    }

    /// Maximum byte size for files of this category.
    pub fn max_size(self) -> u64 {
        match self {
            Self::Video => 5 * GIB,
            Self::Image => 50 * MIB,
            Self::Pdf => 100 * MIB,
            Self::Audio => 100 * MIB,
            Self::Document => 50 * MIB,
        }
    }
}

fn fmt_limit(v: &u64) -> String {
    format_bytes(*v)
}

/// Why a candidate was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolicyError {
    #[error("file type {0} is not supported")]
    UnsupportedType(String),

    #[error("file size exceeds the maximum limit of {}", fmt_limit(.limit))]
    TooLarge { limit: u64 },

    #[error("file size is below the minimum of {}", fmt_limit(.min))]
    TooSmall { min: u64 },

    #[error("no more than {max} files per upload")]
    TooManyFiles { max: usize },
}

/// Intake policy: category allow-lists plus deployment-level bounds.
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    /// Deployment-wide cap applied on top of the category cap.
    pub overall_cap: Option<u64>,
    /// Optional floor; tiny files are better sent unchunked elsewhere.
    pub min_size: Option<u64>,
    pub max_files: usize,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            overall_cap: Some(DEFAULT_OVERALL_CAP),
            min_size: None,
            max_files: DEFAULT_MAX_FILES,
        }
    }
}

impl UploadPolicy {
    /// Validates a candidate against this policy.
    ///
    /// `staged_count` is the number of files already staged; the
    /// candidate itself is not counted.
    pub fn check(
        &self,
        candidate: &FileCandidate,
        staged_count: usize,
    ) -> Result<FileCategory, PolicyError> {
        if staged_count >= self.max_files {
            return Err(PolicyError::TooManyFiles {
                max: self.max_files,
            });
        }

        let category = FileCategory::for_media_type(&candidate.media_type)
            .ok_or_else(|| PolicyError::UnsupportedType(candidate.media_type.clone()))?;

        let mut limit = category.max_size();
        if let Some(cap) = self.overall_cap {
            limit = limit.min(cap);
        }
        if candidate.size > limit {
            return Err(PolicyError::TooLarge { limit });
        }

        if let Some(min) = self.min_size
            && candidate.size < min
        {
            return Err(PolicyError::TooSmall { min });
        }

        Ok(category)
    }
}
