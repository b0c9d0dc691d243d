//! Random telemetry samples and device-status snapshots.

use chrono::Utc;
use edgelink_protocol::{
    DeviceState, StatusEntry, StatusSnapshot, TagReading, TagValue, TelemetrySample,
};
use rand::Rng;

use crate::topology::TopologySpec;

/// Upper bound (exclusive) for random discrete readings.
const DISCRETE_STATES: i64 = 7;

/// Generates one sample covering every device and tag in the spec.
///
/// Analog values are uniform in [0,1), discrete values random integers in
/// [0,7), text values the fixed placeholder `Test{i}` by position. Tags in
/// blocks are qualified as `"<block>:<tag>"`.
pub fn generate_sample(spec: &TopologySpec) -> TelemetrySample {
    let mut rng = rand::thread_rng();
    let mut tag_list = Vec::new();

    for idx in 1..=spec.device_count {
        let device_id = format!("Device{idx}");
        if spec.block_names.is_empty() {
            push_readings(&mut rng, &mut tag_list, &device_id, None, spec);
        } else {
            for block in &spec.block_names {
                push_readings(&mut rng, &mut tag_list, &device_id, Some(block), spec);
            }
        }
    }

    TelemetrySample {
        timestamp: Utc::now(),
        tag_list,
    }
}

/// Reports every device in the spec as online.
pub fn generate_status(spec: &TopologySpec) -> StatusSnapshot {
    StatusSnapshot {
        timestamp: Utc::now(),
        device_list: (1..=spec.device_count)
            .map(|idx| StatusEntry {
                id: format!("Device{idx}"),
                status: DeviceState::Online,
            })
            .collect(),
    }
}

fn push_readings(
    rng: &mut impl Rng,
    out: &mut Vec<TagReading>,
    device_id: &str,
    block: Option<&str>,
    spec: &TopologySpec,
) {
    for i in 1..=spec.analog_count {
        out.push(TagReading {
            device_id: device_id.into(),
            tag_name: qualify(block, &format!("ATag{i}")),
            value: TagValue::Float(rng.gen_range(0.0..1.0)),
        });
    }
    for i in 1..=spec.discrete_count {
        out.push(TagReading {
            device_id: device_id.into(),
            tag_name: qualify(block, &format!("DTag{i}")),
            value: TagValue::Integer(rng.gen_range(0..DISCRETE_STATES)),
        });
    }
    for i in 1..=spec.text_count {
        out.push(TagReading {
            device_id: device_id.into(),
            tag_name: qualify(block, &format!("TTag{i}")),
            value: TagValue::Text(format!("Test{i}")),
        });
    }
}

fn qualify(block: Option<&str>, tag: &str) -> String {
    match block {
        Some(b) => format!("{b}:{tag}"),
        None => tag.to_string(),
    }
}
