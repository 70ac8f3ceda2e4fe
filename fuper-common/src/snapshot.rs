use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::Result;

/// One scraped quota/usage record.
///
/// Data volumes are in megabytes and speeds in kilobits per second. Every
/// numeric field is zero when the status page did not provide a usable value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Address of the account the page reports on (e.g. "10.0.0.17").
    #[serde(rename = "ip")]
    pub address: String,

    /// Data volume already used, in MB.
    #[serde(rename = "transfered")]
    pub transferred_amount: i64,

    /// Maximum data volume allowed, in MB.
    #[serde(rename = "canBeTransfered")]
    pub quota_amount: i64,

    /// Quota utilization in percent.
    #[serde(rename = "percent")]
    pub usage_percent: i64,

    /// Guaranteed bandwidth floor, in kb/s.
    #[serde(rename = "minSpeed")]
    pub min_guaranteed_speed: i64,

    /// Bandwidth ceiling, in kb/s.
    #[serde(rename = "maxSpeed")]
    pub max_allowed_speed: i64,
}

impl Snapshot {
    /// Serialize to the flat JSON object served to HTTP clients.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a snapshot from its JSON wire form.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Get the current timestamp in milliseconds since Unix epoch.
///
/// Returns 0 if system time is before Unix epoch (should never happen in practice).
pub fn current_timestamp_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
