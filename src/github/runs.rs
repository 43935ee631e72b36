use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

/// How long a completed run still counts as "recent" for the status check.
/// The window is strict: a run that finished exactly 60 seconds ago is stale.
pub const RECENT_WINDOW_SECS: i64 = 60;

/// Status of a GitHub Actions workflow run
#[derive(Debug, Clone, PartialEq)]
pub enum RunStatus {
    Queued,
    InProgress,
    Completed,
    Unknown(String),
}

impl From<&str> for RunStatus {
    fn from(status: &str) -> Self {
        match status {
            "queued" => RunStatus::Queued,
            "in_progress" => RunStatus::InProgress,
            "completed" => RunStatus::Completed,
            _ => RunStatus::Unknown(status.to_string()),
        }
    }
}

/// Workflow run information (the subset of GitHub's run object we consume)
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowRun {
    pub id: u64,
    pub name: String,
    pub status: String,
    pub conclusion: Option<String>,
    pub html_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Response shape of the run-listing endpoint
#[derive(Debug, Deserialize)]
pub struct RunListing {
    pub workflow_runs: Vec<WorkflowRun>,
}

impl WorkflowRun {
    pub fn status(&self) -> RunStatus {
        RunStatus::from(self.status.as_str())
    }

    /// True when the run is still going, or completed within the recency
    /// window before `now`.
    pub fn is_active_or_recent(&self, now: DateTime<Utc>) -> bool {
        match self.status() {
            RunStatus::Queued | RunStatus::InProgress => true,
            RunStatus::Completed => now - self.updated_at < Duration::seconds(RECENT_WINDOW_SECS),
            RunStatus::Unknown(_) => false,
        }
    }
}
