//! Dispatches broker events to the session lifecycle and display handlers.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use edgelink_protocol::{BrokerMessage, ConfigAction};
use edgelink_publisher::{Action, PublishHandle};
use edgelink_simulator::{build_config, generate_sample, generate_status};

use crate::link::BrokerLink;
use crate::options::AgentOptions;

/// Notification callback for connect/disconnect events.
pub type NotifyFn = Box<dyn Fn() + Send + Sync + 'static>;

/// Display callback for recognized broker messages.
pub type MessageFn = Box<dyn Fn(&BrokerMessage) + Send + Sync + 'static>;

/// The three display handlers, injected at router construction.
pub struct Handlers {
    pub on_connected: NotifyFn,
    pub on_disconnected: NotifyFn,
    pub on_message: MessageFn,
}

impl Handlers {
    /// Handlers that render every event through `tracing`.
    pub fn logging() -> Self {
        Self {
            on_connected: Box::new(|| info!("connected to broker")),
            on_disconnected: Box::new(|| info!("disconnected from broker")),
            on_message: Box::new(render_message),
        }
    }
}

fn render_message(msg: &BrokerMessage) {
    match msg {
        BrokerMessage::WriteValue(write) => {
            for device in &write.device_list {
                for tag in &device.tag_list {
                    info!(
                        device = %device.id,
                        tag = %tag.name,
                        value = ?tag.value,
                        "write value received"
                    );
                }
            }
        }
        BrokerMessage::ConfigAck(ack) => {
            info!(result = ack.result, "config ack received");
        }
        BrokerMessage::TimeSync(sync) => {
            info!(utc_time = %sync.utc_time, "time sync received");
        }
        BrokerMessage::Unknown => {}
    }
}

/// Routes broker events for one agent session.
///
/// On connect it uploads the configuration (full replace), pushes a status
/// snapshot, and starts the periodic publisher; reconnects within the same
/// session reuse the running publisher. Upload and status failures are
/// logged and deliberately not retried — the next connect repeats the full
/// replace anyway.
pub struct EventRouter<L: BrokerLink> {
    link: Arc<L>,
    options: AgentOptions,
    handlers: Handlers,
    publisher: Mutex<Option<PublishHandle>>,
}

impl<L: BrokerLink> EventRouter<L> {
    pub fn new(link: Arc<L>, options: AgentOptions, handlers: Handlers) -> Self {
        Self {
            link,
            options,
            handlers,
            publisher: Mutex::new(None),
        }
    }

    /// Handles a (re)connect: config upload, status push, publisher start.
    pub async fn handle_connect(&self) {
        (self.handlers.on_connected)();

        let config = build_config(&self.options.topology);
        if let Err(e) = self
            .link
            .upload_config(ConfigAction::Delsert, config)
            .await
        {
            warn!(error = %e, "config upload failed, not retrying");
        }

        let status = generate_status(&self.options.topology);
        if let Err(e) = self.link.send_device_status(status).await {
            warn!(error = %e, "device status push failed, not retrying");
        }

        let mut publisher = self.publisher.lock().await;
        if publisher.is_some() {
            debug!("publisher already running, reconnect keeps it");
            return;
        }
        *publisher = Some(edgelink_publisher::start(
            self.publish_action(),
            self.options.publish_period,
            self.options.concurrent_publish,
        ));
        info!(
            period = ?self.options.publish_period,
            concurrent = self.options.concurrent_publish,
            "periodic publisher started"
        );
    }

    /// Handles a disconnect. Notification only: the publisher keeps
    /// running and its sends fail loudly until the link is back.
    pub async fn handle_disconnect(&self) {
        (self.handlers.on_disconnected)();
    }

    /// Handles one inbound message. Unknown kinds are dropped without any
    /// observable action.
    pub async fn handle_message(&self, msg: BrokerMessage) {
        if matches!(msg, BrokerMessage::Unknown) {
            return;
        }
        (self.handlers.on_message)(&msg);
    }

    /// Returns `true` while the periodic publisher is running.
    pub async fn is_publishing(&self) -> bool {
        self.publisher.lock().await.is_some()
    }

    /// Stops the periodic publisher. Ends the session.
    pub async fn shutdown(&self) {
        if let Some(handle) = self.publisher.lock().await.take() {
            handle.cancel();
            info!("periodic publisher stopped");
        }
    }

    fn publish_action(&self) -> Action {
        let link = Arc::clone(&self.link);
        let topology = self.options.topology.clone();
        Box::new(move || {
            let link = Arc::clone(&link);
            let topology = topology.clone();
            Box::pin(async move {
                let sample = generate_sample(&topology);
                let readings = sample.tag_list.len();
                if link.send_data(sample).await {
                    debug!(readings, "telemetry sample published");
                } else {
                    warn!(readings, "telemetry sample dropped by link");
                }
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    use edgelink_protocol::{
        ConfigAckMessage, EdgeConfig, StatusSnapshot, TelemetrySample, TimeSyncMessage,
    };
    use edgelink_simulator::TopologySpec;

    use crate::link::{LinkError, LinkFuture};
    use crate::options::Transport;

    /// Link stub that counts calls and optionally fails everything.
    #[derive(Default)]
    struct StubLink {
        uploads: AtomicU32,
        status_pushes: AtomicU32,
        samples: AtomicU32,
        fail: bool,
    }

    impl BrokerLink for StubLink {
        fn connect(&self) -> LinkFuture<'_, Result<(), LinkError>> {
            Box::pin(async { Ok(()) })
        }

        fn upload_config(
            &self,
            _action: ConfigAction,
            _config: EdgeConfig,
        ) -> LinkFuture<'_, Result<(), LinkError>> {
            self.uploads.fetch_add(1, Ordering::SeqCst);
            let fail = self.fail;
            Box::pin(async move {
                if fail {
                    Err(LinkError::Transport("stub".into()))
                } else {
                    Ok(())
                }
            })
        }

        fn send_device_status(
            &self,
            _snapshot: StatusSnapshot,
        ) -> LinkFuture<'_, Result<(), LinkError>> {
            self.status_pushes.fetch_add(1, Ordering::SeqCst);
            let fail = self.fail;
            Box::pin(async move {
                if fail {
                    Err(LinkError::NotConnected)
                } else {
                    Ok(())
                }
            })
        }

        fn send_data(&self, _sample: TelemetrySample) -> LinkFuture<'_, bool> {
            self.samples.fetch_add(1, Ordering::SeqCst);
            let ok = !self.fail;
            Box::pin(async move { ok })
        }
    }

    fn test_options() -> AgentOptions {
        AgentOptions::new(
            Transport::IotHub {
                connection_string: "HostName=test".into(),
            },
            TopologySpec::flat(1, 3, 2, 1),
        )
        .with_publish_period(Duration::from_secs(1))
    }

    fn counting_handlers(messages: Arc<AtomicU32>) -> Handlers {
        Handlers {
            on_connected: Box::new(|| {}),
            on_disconnected: Box::new(|| {}),
            on_message: Box::new(move |_| {
                messages.fetch_add(1, Ordering::SeqCst);
            }),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn connect_uploads_config_and_status_then_publishes() {
        let link = Arc::new(StubLink::default());
        let router = EventRouter::new(Arc::clone(&link), test_options(), Handlers::logging());

        router.handle_connect().await;
        assert_eq!(link.uploads.load(Ordering::SeqCst), 1);
        assert_eq!(link.status_pushes.load(Ordering::SeqCst), 1);
        assert!(router.is_publishing().await);

        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert_eq!(link.samples.load(Ordering::SeqCst), 2);

        router.shutdown().await;
        assert!(!router.is_publishing().await);
    }

    #[tokio::test(start_paused = true)]
    async fn reconnect_does_not_start_second_publisher() {
        let link = Arc::new(StubLink::default());
        let router = EventRouter::new(Arc::clone(&link), test_options(), Handlers::logging());

        router.handle_connect().await;
        router.handle_connect().await;

        // Config is re-uploaded per connect, but ticks arrive at the
        // single-publisher rate.
        assert_eq!(link.uploads.load(Ordering::SeqCst), 2);
        tokio::time::sleep(Duration::from_millis(3500)).await;
        assert_eq!(link.samples.load(Ordering::SeqCst), 3);

        router.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn disconnect_is_notification_only() {
        let link = Arc::new(StubLink::default());
        let router = EventRouter::new(Arc::clone(&link), test_options(), Handlers::logging());

        router.handle_connect().await;
        router.handle_disconnect().await;
        assert!(router.is_publishing().await);

        router.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn upload_failures_do_not_stop_publisher_start() {
        let link = Arc::new(StubLink {
            fail: true,
            ..StubLink::default()
        });
        let router = EventRouter::new(Arc::clone(&link), test_options(), Handlers::logging());

        router.handle_connect().await;
        assert!(router.is_publishing().await);

        // Dropped sends are logged, never retried.
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(link.samples.load(Ordering::SeqCst), 1);

        router.shutdown().await;
    }

    #[tokio::test]
    async fn recognized_messages_reach_the_handler() {
        let messages = Arc::new(AtomicU32::new(0));
        let link = Arc::new(StubLink::default());
        let router = EventRouter::new(
            link,
            test_options(),
            counting_handlers(Arc::clone(&messages)),
        );

        router
            .handle_message(BrokerMessage::ConfigAck(ConfigAckMessage { result: true }))
            .await;
        router
            .handle_message(BrokerMessage::TimeSync(TimeSyncMessage {
                utc_time: chrono::Utc::now(),
            }))
            .await;
        assert_eq!(messages.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn unknown_message_is_dropped_silently() {
        let messages = Arc::new(AtomicU32::new(0));
        let link = Arc::new(StubLink::default());
        let router = EventRouter::new(
            link,
            test_options(),
            counting_handlers(Arc::clone(&messages)),
        );

        router.handle_message(BrokerMessage::Unknown).await;
        assert_eq!(messages.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn shutdown_is_idempotent() {
        let link = Arc::new(StubLink::default());
        let router = EventRouter::new(link, test_options(), Handlers::logging());
        router.handle_connect().await;
        router.shutdown().await;
        router.shutdown().await;
    }
}
