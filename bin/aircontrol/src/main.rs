use std::sync::Arc;
use std::time::Duration;

use aircontrol::{handle_command, Config, DeviceSync, MqttInventory, Poller, Registry};
use philips::Client;
use transport::{connect_mqtt, Topic};

use futures_util::stream::StreamExt;
use log::{debug, error, info};
use paho_mqtt::{AsyncClient as MqClient, QOS_1};
use tokio::signal::unix::{signal, SignalKind};
use tokio::{task, time};

type ErasedError = Box<dyn std::error::Error + Send + Sync + 'static>;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<(), ErasedError> {
    pretty_env_logger::init_timed();

    info!("aircontrol version {VERSION}");

    let config = Config::from_env()?;

    let client = Client::connect(&config.address, config.protocol)
        .await
        .map_err(aircontrol::Error::from)?;

    let mqtt_client = connect_mqtt(
        config.mqtt.address,
        config.mqtt.username,
        config.mqtt.password,
        "aircontrol",
    )
    .await?;
    info!("connected mqtt");

    let prefix = config.mqtt.prefix;
    let inventory = MqttInventory::new(mqtt_client.clone(), prefix.clone());

    let sync = Arc::new(DeviceSync::new(client, Registry::new(inventory)));
    sync.start().await?;

    let poller = Poller::start(sync.clone(), config.poll_interval);
    let commands = task::spawn(subscribe_commands(mqtt_client, sync.clone(), prefix));

    let mut sigterm = signal(SignalKind::terminate())?;

    tokio::select! {
        result = commands => {
            if let Ok(Err(err)) = result {
                error!("command subscription failed: {err}");
            }
        },
        _ = sigterm.recv() => info!("got SIGTERM, exiting..."),
        _ = tokio::signal::ctrl_c() => info!("got SIGINT, exiting..."),
    };

    poller.stop().await?;
    sync.stop()?;

    Ok(())
}

async fn subscribe_commands<C, I>(
    mut mqtt: MqClient,
    sync: Arc<DeviceSync<C, I>>,
    prefix: String,
) -> Result<(), ErasedError>
where
    C: philips::DeviceClient,
    I: aircontrol::Inventory,
{
    let mut stream = mqtt.get_stream(None);

    let filter = Topic::set_filter(&prefix);
    mqtt.subscribe(&filter, QOS_1).await?;
    info!("Subscribed to topic: {filter}");

    while let Some(msg_opt) = stream.next().await {
        if let Some(msg) = msg_opt {
            debug!("got message on {}", msg.topic());

            if let Err(err) = handle_command(&sync, &prefix, msg.topic(), msg.payload()).await {
                debug!("command on {} not applied: {err}", msg.topic());
            }
        } else {
            error!("Lost MQTT connection. Attempting reconnect.");
            while let Err(err) = mqtt.reconnect().await {
                error!("Error MQTT reconnecting: {err}");
                time::sleep(Duration::from_secs(1)).await;
            }

            mqtt.subscribe(&filter, QOS_1).await?;
        }
    }

    Ok(())
}
