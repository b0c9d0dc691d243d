//! Inbound control messages from the broker.
//!
//! On the wire each message is an [`Envelope`] carrying a kind tag and a
//! raw payload; [`Envelope::decode`] turns it into the closed
//! [`BrokerMessage`] variant type the router dispatches on. Kinds this
//! agent does not know about decode to [`BrokerMessage::Unknown`] instead
//! of failing, so newer brokers can talk to older agents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::data::TagValue;

/// Kind tag of an inbound broker message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageKind {
    #[serde(rename = "write_value")]
    WriteValue,
    #[serde(rename = "config_ack")]
    ConfigAck,
    #[serde(rename = "time_sync")]
    TimeSync,

    /// Forward compatibility: unknown kinds deserialize here.
    #[serde(other)]
    Unknown,
}

/// A tag write requested by the broker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagWrite {
    pub name: String,
    pub value: TagValue,
}

/// Writes addressed to one device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceWrite {
    pub id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tag_list: Vec<TagWrite>,
}

/// Echo of a write command: per-device tag writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteValueMessage {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub device_list: Vec<DeviceWrite>,
}

/// Acknowledgment of a configuration upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigAckMessage {
    pub result: bool,
}

/// Broker time, for clock synchronization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSyncMessage {
    pub utc_time: DateTime<Utc>,
}

/// A decoded broker message, one variant per known kind.
#[derive(Debug, Clone, PartialEq)]
pub enum BrokerMessage {
    WriteValue(WriteValueMessage),
    ConfigAck(ConfigAckMessage),
    TimeSync(TimeSyncMessage),
    /// Kind not recognized by this agent version.
    Unknown,
}

/// Wire envelope for broker messages.
///
/// The `payload` field uses `serde_json::value::RawValue` so the payload is
/// only parsed once the kind is known.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub kind: MessageKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Box<serde_json::value::RawValue>>,
}

impl Envelope {
    /// Creates an envelope with the given kind and payload.
    pub fn new<T: Serialize>(
        kind: MessageKind,
        payload: Option<&T>,
    ) -> Result<Self, serde_json::Error> {
        let raw = match payload {
            Some(p) => {
                let json = serde_json::to_string(p)?;
                Some(serde_json::value::RawValue::from_string(json)?)
            }
            None => None,
        };
        Ok(Self { kind, payload: raw })
    }

    /// Decodes the payload according to the kind tag.
    ///
    /// Unknown kinds decode to [`BrokerMessage::Unknown`] regardless of
    /// payload; known kinds with a missing or malformed payload are an error.
    pub fn decode(&self) -> Result<BrokerMessage, serde_json::Error> {
        match self.kind {
            MessageKind::WriteValue => Ok(BrokerMessage::WriteValue(self.parse_payload()?)),
            MessageKind::ConfigAck => Ok(BrokerMessage::ConfigAck(self.parse_payload()?)),
            MessageKind::TimeSync => Ok(BrokerMessage::TimeSync(self.parse_payload()?)),
            MessageKind::Unknown => Ok(BrokerMessage::Unknown),
        }
    }

    fn parse_payload<T: for<'de> Deserialize<'de>>(&self) -> Result<T, serde_json::Error> {
        match &self.payload {
            Some(raw) => serde_json::from_str(raw.get()),
            None => serde_json::from_str("null"),
        }
    }
}
