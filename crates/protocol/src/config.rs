//! Device/tag topology descriptors.
//!
//! The topology is a static tree: a node owns devices, a device owns either
//! three tag lists directly or a set of named blocks that each own the three
//! lists. It is built once at startup and uploaded as a whole; nothing here
//! is mutated afterwards.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// How an uploaded topology is applied on the broker side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigAction {
    #[serde(rename = "insert")]
    Insert,
    #[serde(rename = "delete")]
    Delete,
    /// Delete-then-insert: full replace of the remote topology.
    #[serde(rename = "delsert")]
    Delsert,
}

/// Role of the edge node within the broker's device model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeType {
    #[serde(rename = "gateway")]
    Gateway,
    #[serde(rename = "device")]
    Device,
}

/// Top-level configuration uploaded to the broker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeConfig {
    pub node: NodeConfig,
}

/// One edge agent instance and the devices it fronts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeConfig {
    pub node_type: NodeType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub device_list: Vec<DeviceConfig>,
}

/// A single device: identity plus either direct tag lists or named blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceConfig {
    pub id: String,
    pub name: String,
    pub device_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub analog_tag_list: Vec<AnalogTagConfig>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub discrete_tag_list: Vec<DiscreteTagConfig>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub text_tag_list: Vec<TextTagConfig>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub block_list: Vec<BlockConfig>,
}

/// A named tag grouping within a device (e.g. "Pump01").
///
/// Block names namespace tag names: readings for a blocked tag are reported
/// as `"<block>:<tag>"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub analog_tag_list: Vec<AnalogTagConfig>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub discrete_tag_list: Vec<DiscreteTagConfig>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub text_tag_list: Vec<TextTagConfig>,
}

/// A continuous-valued tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalogTagConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub read_only: bool,
    pub array_size: u32,
    pub span_high: f64,
    pub span_low: f64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub engineer_unit: String,
    pub integer_display_format: u32,
    pub fraction_display_format: u32,
}

/// A two-state tag with labels for states "0" and "1".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscreteTagConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub read_only: bool,
    pub array_size: u32,
    pub state0: String,
    pub state1: String,
}

/// A string-valued tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextTagConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub read_only: bool,
    pub array_size: u32,
}

/// Topology invariant violations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("duplicate device id '{0}'")]
    DuplicateDevice(String),

    #[error("duplicate block name '{block}' in device '{device}'")]
    DuplicateBlock { device: String, block: String },

    #[error("duplicate tag name '{tag}' in {owner}")]
    DuplicateTag { owner: String, tag: String },
}

impl NodeConfig {
    /// Checks the topology invariants: device ids unique within the node,
    /// block names unique within their device, and tag names unique within
    /// their owning list.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut device_ids = HashSet::new();
        for device in &self.device_list {
            if !device_ids.insert(device.id.as_str()) {
                return Err(ConfigError::DuplicateDevice(device.id.clone()));
            }
            check_tag_lists(
                &format!("device '{}'", device.id),
                &device.analog_tag_list,
                &device.discrete_tag_list,
                &device.text_tag_list,
            )?;

            let mut block_names = HashSet::new();
            for block in &device.block_list {
                if !block_names.insert(block.name.as_str()) {
                    return Err(ConfigError::DuplicateBlock {
                        device: device.id.clone(),
                        block: block.name.clone(),
                    });
                }
                check_tag_lists(
                    &format!("block '{}' of device '{}'", block.name, device.id),
                    &block.analog_tag_list,
                    &block.discrete_tag_list,
                    &block.text_tag_list,
                )?;
            }
        }
        Ok(())
    }
}

/// Uniqueness is per owning list; the same name may appear in different lists.
fn check_tag_lists(
    owner: &str,
    analog: &[AnalogTagConfig],
    discrete: &[DiscreteTagConfig],
    text: &[TextTagConfig],
) -> Result<(), ConfigError> {
    check_unique(owner, analog.iter().map(|t| t.name.as_str()))?;
    check_unique(owner, discrete.iter().map(|t| t.name.as_str()))?;
    check_unique(owner, text.iter().map(|t| t.name.as_str()))
}

fn check_unique<'a>(
    owner: &str,
    names: impl Iterator<Item = &'a str>,
) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(ConfigError::DuplicateTag {
                owner: owner.to_string(),
                tag: name.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analog(name: &str) -> AnalogTagConfig {
        AnalogTagConfig {
            name: name.into(),
            description: String::new(),
            read_only: false,
            array_size: 0,
            span_high: 1000.0,
            span_low: 0.0,
            engineer_unit: String::new(),
            integer_display_format: 4,
            fraction_display_format: 2,
        }
    }

    fn device(id: &str) -> DeviceConfig {
        DeviceConfig {
            id: id.into(),
            name: id.into(),
            device_type: "Smart Device".into(),
            description: String::new(),
            analog_tag_list: vec![],
            discrete_tag_list: vec![],
            text_tag_list: vec![],
            block_list: vec![],
        }
    }

    #[test]
    fn config_action_serialization() {
        assert_eq!(
            serde_json::to_string(&ConfigAction::Delsert).unwrap(),
            "\"delsert\""
        );
        assert_eq!(
            serde_json::to_string(&ConfigAction::Insert).unwrap(),
            "\"insert\""
        );
    }

    #[test]
    fn device_config_field_names() {
        let mut dev = device("Device1");
        dev.analog_tag_list.push(analog("ATag1"));
        let json = serde_json::to_string(&dev).unwrap();
        assert!(json.contains("\"deviceType\""));
        assert!(json.contains("\"analogTagList\""));
        assert!(json.contains("\"spanHigh\""));
        assert!(json.contains("\"fractionDisplayFormat\""));
    }

    #[test]
    fn device_config_omit_empty_lists() {
        let dev = device("Device1");
        let json = serde_json::to_string(&dev).unwrap();
        assert!(!json.contains("analogTagList"));
        assert!(!json.contains("blockList"));
        assert!(!json.contains("description"));
    }

    #[test]
    fn node_config_json_roundtrip() {
        let mut dev = device("Device1");
        dev.analog_tag_list.push(analog("ATag1"));
        let node = NodeConfig {
            node_type: NodeType::Gateway,
            device_list: vec![dev],
        };
        let json = serde_json::to_string(&node).unwrap();
        let parsed: NodeConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(node, parsed);
    }

    #[test]
    fn validate_empty_node() {
        let node = NodeConfig {
            node_type: NodeType::Gateway,
            device_list: vec![],
        };
        assert!(node.validate().is_ok());
    }

    #[test]
    fn validate_rejects_duplicate_device() {
        let node = NodeConfig {
            node_type: NodeType::Gateway,
            device_list: vec![device("Device1"), device("Device1")],
        };
        assert!(matches!(
            node.validate(),
            Err(ConfigError::DuplicateDevice(id)) if id == "Device1"
        ));
    }

    #[test]
    fn validate_rejects_duplicate_tag() {
        let mut dev = device("Device1");
        dev.analog_tag_list.push(analog("ATag1"));
        dev.analog_tag_list.push(analog("ATag1"));
        let node = NodeConfig {
            node_type: NodeType::Gateway,
            device_list: vec![dev],
        };
        assert!(matches!(
            node.validate(),
            Err(ConfigError::DuplicateTag { tag, .. }) if tag == "ATag1"
        ));
    }

    #[test]
    fn validate_allows_same_tag_in_different_lists() {
        // Uniqueness is per owning list, not per device.
        let mut dev = device("Device1");
        dev.analog_tag_list.push(analog("Tag1"));
        dev.text_tag_list.push(TextTagConfig {
            name: "Tag1".into(),
            description: String::new(),
            read_only: false,
            array_size: 0,
        });
        let node = NodeConfig {
            node_type: NodeType::Gateway,
            device_list: vec![dev],
        };
        assert!(node.validate().is_ok());
    }

    #[test]
    fn validate_rejects_duplicate_block() {
        let mut dev = device("Device1");
        let block = BlockConfig {
            name: "Pump01".into(),
            analog_tag_list: vec![analog("ATag1")],
            discrete_tag_list: vec![],
            text_tag_list: vec![],
        };
        dev.block_list.push(block.clone());
        dev.block_list.push(block);
        let node = NodeConfig {
            node_type: NodeType::Gateway,
            device_list: vec![dev],
        };
        assert!(matches!(
            node.validate(),
            Err(ConfigError::DuplicateBlock { block, .. }) if block == "Pump01"
        ));
    }

    #[test]
    fn validate_rejects_duplicate_tag_inside_block() {
        let mut dev = device("Device1");
        dev.block_list.push(BlockConfig {
            name: "Pump01".into(),
            analog_tag_list: vec![analog("ATag1"), analog("ATag1")],
            discrete_tag_list: vec![],
            text_tag_list: vec![],
        });
        let node = NodeConfig {
            node_type: NodeType::Gateway,
            device_list: vec![dev],
        };
        assert!(node.validate().is_err());
    }
}
