use color_eyre::{eyre::eyre, Result};
use crowdpad::actuator::{Actuator, DryRunActuator, PacedActuator};
use crowdpad::config::{self, AppConfig};
use crowdpad::console;
use crowdpad::mapping::{EngineComponents, SystemClock, TranslationEngineHandle};
use crowdpad::mqtt::MqttBridge;
use crowdpad::profile::ProfileTable;
use crowdpad::telemetry::{ChannelSink, Sink, TracingSink};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    setup()?;

    let config_path = config::config_path();
    config::ensure_default_config(&config_path).await?;
    let app_config = AppConfig::load(&config_path).await?;

    let profiles = ProfileTable::with_overrides(app_config.profiles.clone());
    let profile = profiles
        .get(&app_config.profile)
        .map_err(|e| eyre!("{} (available: {:?})", e, profiles.ids().collect::<Vec<_>>()))?
        .clone();

    // Actuator: Pacing-Worker vor dem Backend
    info!("Using dry-run actuator backend");
    let backend: Arc<dyn Actuator> = Arc::new(DryRunActuator::default());
    let (paced, pacing_worker) = PacedActuator::spawn(backend, &app_config.pacing);

    let cancel = CancellationToken::new();

    // Telemetrie geht über MQTT, wenn aktiviert, sonst ins Log
    let mut telemetry_rx = None;
    let sink: Arc<dyn Sink> = if app_config.mqtt.enabled {
        let (telemetry_tx, rx) = mpsc::channel(app_config.mqtt.channel_capacity.max(1));
        telemetry_rx = Some(rx);
        Arc::new(ChannelSink::new(telemetry_tx))
    } else {
        Arc::new(TracingSink)
    };

    let components = EngineComponents {
        actuator: Arc::new(paced),
        sink,
        clock: Arc::new(SystemClock),
    };

    let mut engine = TranslationEngineHandle::new(format!("translator-{}", profile.id));
    let command_tx = engine
        .start(
            profile,
            components,
            app_config.to_dispatch_settings(),
            app_config.pacing.queue_capacity,
        )
        .map_err(|e| eyre!("Failed to start translation engine: {}", e))?;

    let mqtt_task = telemetry_rx.map(|telemetry_rx| {
        let bridge = MqttBridge::new(app_config.mqtt.clone(), command_tx.clone(), telemetry_rx);
        tokio::spawn(bridge.run(cancel.clone()))
    });

    let console_task = app_config
        .console
        .then(|| tokio::spawn(console::run(command_tx.clone(), cancel.clone())));

    drop(command_tx);

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| eyre!("Failed to listen for Ctrl-C: {}", e))?;
    info!("Ctrl-C received, shutting down");
    cancel.cancel();

    if let Some(task) = console_task {
        // stdin-Lesevorgänge lassen sich nicht abbrechen
        task.abort();
    }
    if let Some(task) = mqtt_task {
        match task.await {
            Ok(status) => {
                info!(
                    "MQTT bridge stopped ({} received, {} sent, last activity {:?})",
                    status.messages_received, status.messages_sent, status.last_activity
                );
                if let Some(last_error) = status.last_error {
                    warn!(
                        "MQTT bridge saw {} errors, last: {}",
                        status.error_count, last_error
                    );
                }
            }
            Err(e) => warn!("MQTT bridge task failed: {}", e),
        }
    }

    let processed = engine
        .shutdown()
        .await
        .map_err(|e| eyre!("Engine shutdown failed: {}", e))?;
    info!("Processed {} commands", processed);

    // Die Engine hat den Actuator freigegeben, der Worker arbeitet die Queue ab
    info!("Waiting for pacing worker to release queued input");
    tokio::select! {
        result = pacing_worker => {
            if let Err(e) = result {
                warn!("Pacing worker task failed: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            warn!("Second Ctrl-C received, queued input is discarded");
        }
    }
    Ok(())
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    setup_logging_env();
    Ok(())
}

fn setup_logging_env() {
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();
}
