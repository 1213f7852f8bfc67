//! Transient notification queue.
//!
//! Validation failures, intake errors, retries, and success messages are
//! surfaced here for a UI layer to drain and display. Notices never drive
//! session state.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};

/// Oldest notices are dropped beyond this bound.
const MAX_PENDING: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Error,
}

/// A single transient notification.
#[derive(Debug, Clone)]
pub struct Notice {
    pub id: u64,
    pub severity: Severity,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Bounded FIFO of notices awaiting display.
#[derive(Debug, Default)]
pub struct NoticeQueue {
    pending: VecDeque<Notice>,
    next_id: u64,
}

impl NoticeQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a notice and returns its id.
    pub fn push(&mut self, severity: Severity, message: impl Into<String>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.pending.push_back(Notice {
            id,
            severity,
            message: message.into(),
            created_at: Utc::now(),
        });
        if self.pending.len() > MAX_PENDING {
            self.pending.pop_front();
        }
        id
    }

    pub fn info(&mut self, message: impl Into<String>) -> u64 {
        self.push(Severity::Info, message)
    }

    pub fn success(&mut self, message: impl Into<String>) -> u64 {
        self.push(Severity::Success, message)
    }

    pub fn error(&mut self, message: impl Into<String>) -> u64 {
        self.push(Severity::Error, message)
    }

    /// Removes and returns all pending notices, oldest first.
    pub fn drain(&mut self) -> Vec<Notice> {
        self.pending.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
