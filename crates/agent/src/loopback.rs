//! In-process broker link for demos and tests.
//!
//! Stands in for a real broker connection: outbound traffic is logged and
//! counted, config uploads are answered with a `config_ack` envelope, and
//! inbound messages surface through an mpsc receiver the caller feeds into
//! the router. No transport is involved.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info, warn};

use edgelink_protocol::{
    BrokerMessage, ConfigAckMessage, ConfigAction, EdgeConfig, Envelope, MessageKind,
    StatusSnapshot, TelemetrySample,
};

use crate::link::{BrokerLink, LinkError, LinkFuture};
use crate::options::AgentOptions;

/// Inbound queue depth. The demo consumes promptly; overflow is dropped.
const INBOUND_BUFFER: usize = 64;

pub struct LoopbackLink {
    node_id: String,
    target: String,
    data_recover: bool,
    connected: AtomicBool,
    inbound_tx: mpsc::Sender<BrokerMessage>,
    inbound_rx: Mutex<Option<mpsc::Receiver<BrokerMessage>>>,
    samples_sent: AtomicU64,
}

impl LoopbackLink {
    pub fn new(options: &AgentOptions) -> Self {
        let (inbound_tx, inbound_rx) = mpsc::channel(INBOUND_BUFFER);
        Self {
            node_id: options.node_id.clone(),
            target: options.transport.target(),
            data_recover: options.data_recover,
            connected: AtomicBool::new(false),
            inbound_tx,
            inbound_rx: Mutex::new(Some(inbound_rx)),
            samples_sent: AtomicU64::new(0),
        }
    }

    /// Takes the inbound message receiver. Can only be called once.
    pub async fn take_inbound(&self) -> Option<mpsc::Receiver<BrokerMessage>> {
        self.inbound_rx.lock().await.take()
    }

    /// Simulates broker-originated traffic: decodes the envelope and queues
    /// the result for the consumer.
    pub fn inject(&self, envelope: &Envelope) {
        match envelope.decode() {
            Ok(msg) => self.queue(msg),
            Err(e) => warn!(error = %e, "dropping undecodable inbound envelope"),
        }
    }

    /// Number of telemetry samples accepted so far.
    pub fn samples_sent(&self) -> u64 {
        self.samples_sent.load(Ordering::SeqCst)
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn queue(&self, msg: BrokerMessage) {
        if self.inbound_tx.try_send(msg).is_err() {
            warn!("inbound queue full, dropping broker message");
        }
    }
}

impl BrokerLink for LoopbackLink {
    fn connect(&self) -> LinkFuture<'_, Result<(), LinkError>> {
        Box::pin(async move {
            self.connected.store(true, Ordering::SeqCst);
            info!(
                node = %self.node_id,
                target = %self.target,
                data_recover = self.data_recover,
                "loopback link connected"
            );
            Ok(())
        })
    }

    fn upload_config(
        &self,
        action: ConfigAction,
        config: EdgeConfig,
    ) -> LinkFuture<'_, Result<(), LinkError>> {
        Box::pin(async move {
            if !self.is_connected() {
                return Err(LinkError::NotConnected);
            }
            // A real broker would reject a malformed tree; do the same.
            config
                .node
                .validate()
                .map_err(|e| LinkError::Rejected(e.to_string()))?;

            info!(
                action = ?action,
                devices = config.node.device_list.len(),
                "config upload accepted"
            );

            let ack = Envelope::new(
                MessageKind::ConfigAck,
                Some(&ConfigAckMessage { result: true }),
            )
            .map_err(|e| LinkError::Transport(e.to_string()))?;
            self.inject(&ack);
            Ok(())
        })
    }

    fn send_device_status(
        &self,
        snapshot: StatusSnapshot,
    ) -> LinkFuture<'_, Result<(), LinkError>> {
        Box::pin(async move {
            if !self.is_connected() {
                return Err(LinkError::NotConnected);
            }
            debug!(devices = snapshot.device_list.len(), "device status accepted");
            Ok(())
        })
    }

    fn send_data(&self, sample: TelemetrySample) -> LinkFuture<'_, bool> {
        Box::pin(async move {
            if !self.is_connected() {
                return false;
            }
            self.samples_sent.fetch_add(1, Ordering::SeqCst);
            debug!(
                readings = sample.tag_list.len(),
                timestamp = %sample.timestamp,
                "telemetry sample accepted"
            );
            true
        })
    }
}
