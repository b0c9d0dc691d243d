//! Demo session wiring and the run-until-interrupted loop.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use tracing::info;

use edgelink_agent::{AgentOptions, BrokerLink, EventRouter, Handlers, LoopbackLink, Transport};
use edgelink_protocol::{Envelope, MessageKind, TimeSyncMessage};
use edgelink_simulator::TopologySpec;

/// How often the simulated broker pushes a time sync.
const TIME_SYNC_PERIOD: Duration = Duration::from_secs(30);

/// Builds the options for one of the two demo deployments.
///
/// The variants differ only in transport target and topology shape; the
/// session logic is identical. Parameters are hard-coded demo values, as in
/// a real deployment they would come from provisioning.
pub fn demo_options(variant: &str) -> anyhow::Result<AgentOptions> {
    match variant {
        // Generic cloud IoT hub: one device with direct tag lists.
        "hub" => Ok(AgentOptions::new(
            Transport::IotHub {
                connection_string: "HostName=example.invalid;DeviceId=edge-node".into(),
            },
            TopologySpec::flat(1, 3, 2, 1),
        )),
        // Vendor connectivity service: one device, tags grouped in blocks.
        "blocks" => Ok(AgentOptions::new(
            Transport::Dccs {
                api_url: "https://api.dccs.example.invalid/".into(),
                credential_key: "demo-credential".into(),
            },
            TopologySpec::flat(1, 1, 1, 1).with_blocks(["Pump01", "Pump02"]),
        )
        .with_publish_period(Duration::from_secs(1))),
        other => bail!("unknown variant '{other}' (expected 'hub' or 'blocks')"),
    }
}

/// Runs one agent session until interrupted.
pub async fn run(options: AgentOptions) -> anyhow::Result<()> {
    let link = Arc::new(LoopbackLink::new(&options));
    let mut inbound = link
        .take_inbound()
        .await
        .context("inbound receiver already taken")?;
    let router = EventRouter::new(Arc::clone(&link), options, Handlers::logging());

    // A connect failure is reported once and ends the process.
    link.connect().await.context("failed to connect to broker")?;
    router.handle_connect().await;

    spawn_time_sync(Arc::clone(&link));

    // Run until interrupted; this is the intended lifecycle terminator.
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("interrupt received, shutting down");
                break;
            }
            msg = inbound.recv() => match msg {
                Some(msg) => router.handle_message(msg).await,
                None => {
                    router.handle_disconnect().await;
                    break;
                }
            }
        }
    }

    router.shutdown().await;
    Ok(())
}

/// Simulated broker clock: pushes a `time_sync` envelope periodically.
fn spawn_time_sync(link: Arc<LoopbackLink>) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(TIME_SYNC_PERIOD);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let sync = TimeSyncMessage {
                utc_time: chrono::Utc::now(),
            };
            match Envelope::new(MessageKind::TimeSync, Some(&sync)) {
                Ok(env) => link.inject(&env),
                Err(e) => tracing::warn!(error = %e, "failed to build time sync"),
            }
        }
    });
}
