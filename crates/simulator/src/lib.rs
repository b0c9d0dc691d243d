//! Static topology builder and random telemetry generator.
//!
//! Everything here is shaped by a [`TopologySpec`]: the same spec that
//! builds the configuration tree also drives sample and status generation,
//! so the published tag names always match the uploaded topology.

mod sample;
mod topology;

pub use sample::{generate_sample, generate_status};
pub use topology::{TopologySpec, build_config};
