use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde_json::json;
use tracing::debug;

use super::errors::ActionsError;
use super::runs::{RunListing, WorkflowRun};
use crate::config::GitHubConfig;

const USER_AGENT: &str = "InstaBotTrigger/1.0";
const ACCEPT_GITHUB_V3: &str = "application/vnd.github.v3+json";

/// How many runs the status check inspects
const RUN_LIST_PAGE_SIZE: u32 = 10;

/// Raw REST client for the two GitHub Actions calls the relay makes
#[derive(Debug, Clone)]
pub struct ActionsClient {
    http: reqwest::Client,
    api_base: String,
    owner: String,
    repo: String,
    token: String,
}

impl ActionsClient {
    pub fn new(config: &GitHubConfig) -> Result<Self, ActionsError> {
        let http = reqwest::Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            owner: config.owner.clone(),
            repo: config.repo.clone(),
            token: config.token.clone().unwrap_or_default(),
        })
    }

    /// Fetch the most recent workflow runs for the repository
    pub async fn list_recent_runs(&self) -> Result<Vec<WorkflowRun>, ActionsError> {
        let url = format!(
            "{}/repos/{}/{}/actions/runs?per_page={}",
            self.api_base, self.owner, self.repo, RUN_LIST_PAGE_SIZE
        );

        debug!(url = %url, "Listing recent workflow runs");

        let response = self
            .http
            .get(&url)
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .header(ACCEPT, ACCEPT_GITHUB_V3)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ActionsError::RunListing {
                status: response.status().as_u16(),
            });
        }

        let listing: RunListing = response.json().await?;
        Ok(listing.workflow_runs)
    }

    /// Issue a repository_dispatch event to start a new workflow run
    pub async fn dispatch(
        &self,
        event_type: &str,
        client_payload: Option<serde_json::Value>,
    ) -> Result<(), ActionsError> {
        let url = format!("{}/repos/{}/{}/dispatches", self.api_base, self.owner, self.repo);

        let mut body = json!({ "event_type": event_type });
        if let Some(payload) = client_payload {
            body["client_payload"] = payload;
        }

        debug!(url = %url, event_type = event_type, "Sending repository dispatch");

        let response = self
            .http
            .post(&url)
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .header(ACCEPT, ACCEPT_GITHUB_V3)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ActionsError::Dispatch { status, body });
        }

        Ok(())
    }
}
