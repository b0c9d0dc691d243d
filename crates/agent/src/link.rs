//! The broker-link seam.
//!
//! A [`BrokerLink`] is the external collaborator that owns the connection
//! to the cloud broker. This crate only consumes it: the router calls these
//! methods and never looks inside.

use std::future::Future;
use std::pin::Pin;

use edgelink_protocol::{ConfigAction, EdgeConfig, StatusSnapshot, TelemetrySample};

/// A boxed future returned by link methods.
pub type LinkFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Errors surfaced by a broker link.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    #[error("not connected to broker")]
    NotConnected,

    #[error("broker rejected request: {0}")]
    Rejected(String),

    #[error("transport failure: {0}")]
    Transport(String),
}

/// Connection to a cloud broker, consumed by the [`EventRouter`].
///
/// Implementations own all transport concerns. `send_data` reports plain
/// success/failure; the caller decides what to do with a drop (the router
/// logs it and moves on).
///
/// [`EventRouter`]: crate::EventRouter
pub trait BrokerLink: Send + Sync + 'static {
    /// Opens the connection to the broker.
    fn connect(&self) -> LinkFuture<'_, Result<(), LinkError>>;

    /// Uploads a configuration tree with the given apply semantics.
    fn upload_config(
        &self,
        action: ConfigAction,
        config: EdgeConfig,
    ) -> LinkFuture<'_, Result<(), LinkError>>;

    /// Pushes a device-status snapshot.
    fn send_device_status(
        &self,
        snapshot: StatusSnapshot,
    ) -> LinkFuture<'_, Result<(), LinkError>>;

    /// Publishes one telemetry sample. Returns `false` if the sample was
    /// dropped.
    fn send_data(&self, sample: TelemetrySample) -> LinkFuture<'_, bool>;
}
