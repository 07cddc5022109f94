//! Per-run outcome summary.

use chrono::{DateTime, Utc};
use serde::Serialize;

use orgsync_core::RepoName;
use orgsync_github::FileChange;

use crate::writer::WriteResult;

/// One repository's outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoResult {
    pub repo: RepoName,
    /// Destination path in the repository.
    pub path: String,
    #[serde(flatten)]
    pub result: WriteResult,
}

/// Everything one run did.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// The `what` identifier that was processed.
    pub target: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub results: Vec<RepoResult>,
}

impl RunReport {
    /// `false` when any write failed.
    pub fn is_success(&self) -> bool {
        !self.results.iter().any(|r| r.result.is_failed())
    }

    /// Remote files created or updated.
    pub fn written(&self) -> usize {
        self.count(|r| {
            matches!(
                r,
                WriteResult::Changed {
                    change: FileChange::Created | FileChange::Updated
                }
            )
        })
    }

    pub fn deleted(&self) -> usize {
        self.count(|r| {
            matches!(
                r,
                WriteResult::Changed {
                    change: FileChange::Deleted
                }
            )
        })
    }

    /// Writes that turned out to be no-ops.
    pub fn unchanged(&self) -> usize {
        self.count(|r| {
            matches!(
                r,
                WriteResult::Changed {
                    change: FileChange::Unchanged | FileChange::Absent
                }
            )
        })
    }

    pub fn would_write(&self) -> usize {
        self.count(|r| matches!(r, WriteResult::WouldWrite { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|r| matches!(r, WriteResult::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(WriteResult::is_failed)
    }

    fn count(&self, pred: impl Fn(&WriteResult) -> bool) -> usize {
        self.results.iter().filter(|r| pred(&r.result)).count()
    }
}
