//! Best-effort caller metadata, forwarded to the workflow as dispatch
//! payload context. Collection never fails the request: any lookup error
//! degrades to a marker record.

use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

const LOOKUP_FAILED: &str = "Failed to get device info";

/// One collected device record, serialized camelCase on the dispatch wire
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum DeviceInfo {
    #[serde(rename_all = "camelCase")]
    Collected {
        ip: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        user_agent: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        platform: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        language: Option<String>,
        timestamp: DateTime<Utc>,
        #[serde(skip_serializing_if = "Option::is_none")]
        timezone: Option<String>,
    },
    Unavailable {
        error: String,
        timestamp: DateTime<Utc>,
    },
}

/// Client hints pulled from the inbound request headers
#[derive(Debug, Clone, Default)]
pub struct ClientHints {
    pub user_agent: Option<String>,
    pub platform: Option<String>,
    pub language: Option<String>,
    pub timezone: Option<String>,
}

impl ClientHints {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let text = |name: &str| {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
        };

        Self {
            user_agent: text("user-agent"),
            // sec-ch-ua-platform arrives quoted, e.g. "\"Android\""
            platform: text("sec-ch-ua-platform").map(|p| p.trim_matches('"').to_string()),
            language: text("accept-language"),
            timezone: text("time-zone"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct IpLookup {
    ip: String,
}

/// Collects caller metadata via a public IP-lookup service plus header hints
#[derive(Debug, Clone)]
pub struct DeviceCollector {
    http: reqwest::Client,
    lookup_url: String,
}

impl DeviceCollector {
    pub fn new(lookup_url: &str) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            lookup_url: lookup_url.to_string(),
        })
    }

    pub async fn collect(&self, hints: ClientHints) -> DeviceInfo {
        match self.lookup_ip().await {
            Ok(ip) => DeviceInfo::Collected {
                ip,
                user_agent: hints.user_agent,
                platform: hints.platform,
                language: hints.language,
                timestamp: Utc::now(),
                timezone: hints.timezone,
            },
            Err(error) => {
                warn!(error = %error, "Error getting device info");
                DeviceInfo::Unavailable {
                    error: LOOKUP_FAILED.to_string(),
                    timestamp: Utc::now(),
                }
            }
        }
    }

    async fn lookup_ip(&self) -> Result<String, reqwest::Error> {
        let lookup: IpLookup = self
            .http
            .get(&self.lookup_url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(lookup.ip)
    }
}
