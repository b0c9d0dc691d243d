//! Deterministic construction of the device/tag configuration tree.

use edgelink_protocol::{
    AnalogTagConfig, BlockConfig, DeviceConfig, DiscreteTagConfig, EdgeConfig, NodeConfig,
    NodeType, TextTagConfig,
};

/// Shape of the demo topology.
///
/// Devices are named `Device1..DeviceN`; tags `ATag`/`DTag`/`TTag` with a
/// 1-based index. When `block_names` is non-empty, every device carries one
/// identically shaped block per name instead of direct tag lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopologySpec {
    pub device_count: usize,
    pub analog_count: usize,
    pub discrete_count: usize,
    pub text_count: usize,
    pub block_names: Vec<String>,
}

impl TopologySpec {
    /// Spec with the given per-kind tag counts and no block grouping.
    pub fn flat(device_count: usize, analog: usize, discrete: usize, text: usize) -> Self {
        Self {
            device_count,
            analog_count: analog,
            discrete_count: discrete,
            text_count: text,
            block_names: Vec::new(),
        }
    }

    /// Adds named block grouping to the spec.
    pub fn with_blocks(mut self, names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.block_names = names.into_iter().map(Into::into).collect();
        self
    }
}

/// Builds the full configuration tree for a spec. Pure; always succeeds.
pub fn build_config(spec: &TopologySpec) -> EdgeConfig {
    let device_list = (1..=spec.device_count).map(|i| build_device(spec, i)).collect();
    EdgeConfig {
        node: NodeConfig {
            node_type: NodeType::Gateway,
            device_list,
        },
    }
}

fn build_device(spec: &TopologySpec, idx: usize) -> DeviceConfig {
    let mut device = DeviceConfig {
        id: format!("Device{idx}"),
        name: format!("Device{idx}"),
        device_type: "Smart Device".into(),
        description: format!("Device {idx}"),
        analog_tag_list: Vec::new(),
        discrete_tag_list: Vec::new(),
        text_tag_list: Vec::new(),
        block_list: Vec::new(),
    };

    if spec.block_names.is_empty() {
        device.analog_tag_list = (1..=spec.analog_count).map(analog_tag).collect();
        device.discrete_tag_list = (1..=spec.discrete_count).map(discrete_tag).collect();
        device.text_tag_list = (1..=spec.text_count).map(text_tag).collect();
    } else {
        device.block_list = spec
            .block_names
            .iter()
            .map(|name| BlockConfig {
                name: name.clone(),
                analog_tag_list: (1..=spec.analog_count).map(analog_tag).collect(),
                discrete_tag_list: (1..=spec.discrete_count).map(discrete_tag).collect(),
                text_tag_list: (1..=spec.text_count).map(text_tag).collect(),
            })
            .collect();
    }
    device
}

fn analog_tag(idx: usize) -> AnalogTagConfig {
    AnalogTagConfig {
        name: format!("ATag{idx}"),
        description: format!("ATag {idx}"),
        read_only: false,
        array_size: 0,
        span_high: 1000.0,
        span_low: 0.0,
        engineer_unit: String::new(),
        integer_display_format: 4,
        fraction_display_format: 2,
    }
}

fn discrete_tag(idx: usize) -> DiscreteTagConfig {
    DiscreteTagConfig {
        name: format!("DTag{idx}"),
        description: format!("DTag {idx}"),
        read_only: true,
        array_size: 0,
        state0: "No".into(),
        state1: "Yes".into(),
    }
}

fn text_tag(idx: usize) -> TextTagConfig {
    TextTagConfig {
        name: format!("TTag{idx}"),
        description: format!("TTag {idx}"),
        read_only: false,
        array_size: 0,
    }
}
