//! Data model for EdgeLink edge-to-broker communication.
//!
//! Defines the device/tag topology uploaded to the broker, the telemetry
//! and status records published by the agent, and the inbound control
//! messages the broker sends back. All types are plain serde value records;
//! the transport that carries them lives behind the broker-link seam in
//! `edgelink-agent`.

mod config;
mod data;
mod messages;

pub use config::{
    AnalogTagConfig, BlockConfig, ConfigAction, ConfigError, DeviceConfig, DiscreteTagConfig,
    EdgeConfig, NodeConfig, NodeType, TextTagConfig,
};
pub use data::{DeviceState, StatusEntry, StatusSnapshot, TagReading, TagValue, TelemetrySample};
pub use messages::{
    BrokerMessage, ConfigAckMessage, DeviceWrite, Envelope, MessageKind, TagWrite,
    TimeSyncMessage, WriteValueMessage,
};
