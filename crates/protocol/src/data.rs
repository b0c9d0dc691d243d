//! Outbound telemetry and device-status records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Value of a single tag reading.
///
/// Untagged: integers must come before floats so that whole numbers
/// deserialize as `Integer` rather than `Float`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

/// One (device, tag, value) triple within a sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagReading {
    pub device_id: String,
    pub tag_name: String,
    pub value: TagValue,
}

/// One timestamped batch of tag readings sent to the broker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetrySample {
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tag_list: Vec<TagReading>,
}

/// Online/offline state of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceState {
    #[serde(rename = "online")]
    Online,
    #[serde(rename = "offline")]
    Offline,
}

/// Per-device entry in a status snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEntry {
    pub id: String,
    pub status: DeviceState,
}

/// Timestamped device-status report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSnapshot {
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub device_list: Vec<StatusEntry>,
}
