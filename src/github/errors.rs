use thiserror::Error;

/// Errors from the GitHub Actions REST calls.
///
/// `Dispatch` carries the provider's status code and body text verbatim;
/// its message ends up on the rendered error page.
#[derive(Debug, Error)]
pub enum ActionsError {
    #[error("GitHub API responded with {status}: {body}")]
    Dispatch { status: u16, body: String },

    #[error("Failed to check workflow status (HTTP {status})")]
    RunListing { status: u16 },

    #[error("GitHub API request failed: {0}")]
    Transport(#[from] reqwest::Error),
}
