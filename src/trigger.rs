//! The relay sequence: check whether a run is already active or freshly
//! finished, dispatch a new one if not, wait, and confirm it started.

use std::time::Duration;

use serde_json::json;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::TriggerConfig;
use crate::device::{ClientHints, DeviceCollector, DeviceInfo};
use crate::github::{ActionsClient, ActionsError};
use crate::observability::relay_metrics;

#[derive(Debug, Error)]
pub enum TriggerError {
    #[error(transparent)]
    Actions(#[from] ActionsError),

    #[error("Failed to start workflow")]
    NotStarted,
}

/// What the relay sequence ended up doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// A matching run was already in progress, queued, or freshly finished
    AlreadyActive,
    /// A new run was dispatched and confirmed to have started
    Started,
}

/// One configured relay. Cheap to clone; axum hands a clone to every request.
#[derive(Debug, Clone)]
pub struct TriggerService {
    client: ActionsClient,
    device: Option<DeviceCollector>,
    workflow_name: String,
    event_type: String,
    confirm_delay: Duration,
}

impl TriggerService {
    pub fn from_config(config: &TriggerConfig) -> Result<Self, ActionsError> {
        let device = if config.device.enabled {
            Some(DeviceCollector::new(&config.device.ip_lookup_url)?)
        } else {
            None
        };

        Ok(Self {
            client: ActionsClient::new(&config.github)?,
            device,
            workflow_name: config.github.workflow_name.clone(),
            event_type: config.github.event_type.clone(),
            confirm_delay: Duration::from_millis(config.trigger.confirm_delay_ms),
        })
    }

    /// Status check. Swallows every failure and degrades to "not running";
    /// the original deployment relied on this so a flaky check still leads
    /// to a dispatch attempt rather than an error page.
    pub async fn workflow_active(&self) -> bool {
        let runs = match self.client.list_recent_runs().await {
            Ok(runs) => runs,
            Err(error) => {
                warn!(error = %error, "Error checking workflow status");
                return false;
            }
        };

        let now = chrono::Utc::now();
        let matching: Vec<_> = runs
            .iter()
            .filter(|run| run.name == self.workflow_name && run.is_active_or_recent(now))
            .collect();

        for run in &matching {
            info!(
                run.id = run.id,
                run.status = %run.status,
                run.updated_at = %run.updated_at,
                "Recent workflow run"
            );
        }

        !matching.is_empty()
    }

    /// The full relay sequence for one inbound request.
    pub async fn run(&self, hints: ClientHints) -> Result<TriggerOutcome, TriggerError> {
        self.run_inner(hints, false).await
    }

    /// Same sequence but skipping the initial status check, dispatching
    /// unconditionally. Used by `trigger --force`.
    pub async fn run_forced(&self, hints: ClientHints) -> Result<TriggerOutcome, TriggerError> {
        self.run_inner(hints, true).await
    }

    async fn run_inner(
        &self,
        hints: ClientHints,
        force: bool,
    ) -> Result<TriggerOutcome, TriggerError> {
        let device_info = match &self.device {
            Some(collector) => {
                let info = collector.collect(hints).await;
                info!(device_info = ?info, "Collected device info");
                Some(info)
            }
            None => None,
        };

        if !force && self.workflow_active().await {
            info!("Workflow is already running or recently completed");
            relay_metrics().record_already_active();
            return Ok(TriggerOutcome::AlreadyActive);
        }

        info!("No recent workflow found, triggering new one");
        let client_payload = device_info
            .as_ref()
            .map(|info: &DeviceInfo| json!({ "device_info": info }));
        self.client.dispatch(&self.event_type, client_payload).await?;
        relay_metrics().record_dispatch();

        // Give the provider a moment to materialize the run before checking
        tokio::time::sleep(self.confirm_delay).await;

        if !self.workflow_active().await {
            return Err(TriggerError::NotStarted);
        }

        Ok(TriggerOutcome::Started)
    }
}
