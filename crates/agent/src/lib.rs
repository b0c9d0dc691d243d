//! Agent-side wiring between an edge node and its cloud broker.
//!
//! The broker connection itself (transport, framing, reconnection) lives
//! behind the [`BrokerLink`] trait and is supplied by the caller; this crate
//! provides the [`EventRouter`] that reacts to connect/disconnect/message
//! events, the connection [`AgentOptions`], and an in-process
//! [`LoopbackLink`] for demos and tests.

mod link;
mod loopback;
mod options;
mod router;

pub use link::{BrokerLink, LinkError, LinkFuture};
pub use loopback::LoopbackLink;
pub use options::{AgentOptions, Transport};
pub use router::{EventRouter, Handlers, MessageFn, NotifyFn};
