//! Connection options for the edge agent.

use std::time::Duration;

use edgelink_simulator::TopologySpec;
use uuid::Uuid;

/// Broker transport target.
///
/// The two demo deployments differ only here and in topology shape; there
/// is one code path for both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transport {
    /// Generic cloud IoT hub, addressed by connection string.
    IotHub { connection_string: String },
    /// Vendor cloud connectivity service, addressed by API URL plus key.
    Dccs { api_url: String, credential_key: String },
}

impl Transport {
    /// Loggable target description. Never includes credentials.
    pub fn target(&self) -> String {
        match self {
            Transport::IotHub { .. } => "iot-hub".into(),
            Transport::Dccs { api_url, .. } => format!("dccs {api_url}"),
        }
    }
}

/// Everything the agent needs to run a session against a broker.
#[derive(Debug, Clone)]
pub struct AgentOptions {
    /// Persistent node identifier presented to the broker.
    pub node_id: String,
    pub transport: Transport,
    /// Whether the link should buffer and replay data across outages.
    /// Honored by the link implementation, not by the router.
    pub data_recover: bool,
    /// Interval between telemetry publications.
    pub publish_period: Duration,
    /// Fire each publication on its own task rather than sequentially.
    pub concurrent_publish: bool,
    pub topology: TopologySpec,
}

impl AgentOptions {
    /// Options with a fresh node id and the defaults the demos use.
    pub fn new(transport: Transport, topology: TopologySpec) -> Self {
        Self {
            node_id: Uuid::new_v4().to_string(),
            transport,
            data_recover: true,
            publish_period: Duration::from_secs(10),
            concurrent_publish: true,
            topology,
        }
    }

    /// Overrides the generated node id with a persistent one.
    pub fn with_node_id(mut self, node_id: impl Into<String>) -> Self {
        self.node_id = node_id.into();
        self
    }

    pub fn with_publish_period(mut self, period: Duration) -> Self {
        self.publish_period = period;
        self
    }
}
