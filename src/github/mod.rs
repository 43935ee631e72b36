//! GitHub Actions API integration: listing workflow runs and issuing
//! repository_dispatch events over the REST API.

pub mod client;
pub mod errors;
pub mod runs;

pub use client::ActionsClient;
pub use errors::ActionsError;
pub use runs::{RunStatus, WorkflowRun};
