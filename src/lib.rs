// Instabot Trigger Library - GitHub Actions workflow trigger relay
// This exposes the core components for testing and integration

pub mod config;
pub mod device;
pub mod github;
pub mod observability;
pub mod server;
pub mod telemetry;
pub mod trigger;

// Re-export key types for easy access
pub use config::{config, init_config, TriggerConfig};
pub use device::{ClientHints, DeviceCollector, DeviceInfo};
pub use github::{ActionsClient, ActionsError, RunStatus, WorkflowRun};
pub use observability::{relay_metrics, RelayMetrics};
pub use server::{RunningTriggerServer, TriggerServer};
pub use telemetry::{generate_correlation_id, init_telemetry, shutdown_telemetry};
pub use trigger::{TriggerError, TriggerOutcome, TriggerService};
