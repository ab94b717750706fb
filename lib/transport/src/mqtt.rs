use std::time::Duration;

use log::debug;
use paho_mqtt::{AsyncClient, ConnectOptionsBuilder, CreateOptionsBuilder, SslOptions};

/// Connects to the broker, using TLS when the address asks for it.
pub async fn connect_mqtt(
    address: String,
    username: String,
    password: String,
    client_id: &str,
) -> paho_mqtt::Result<AsyncClient> {
    let use_tls = address.starts_with("ssl://") || address.starts_with("mqtts://");

    let create_opts = CreateOptionsBuilder::new_v3()
        .server_uri(address)
        .client_id(client_id)
        .finalize();

    let client = AsyncClient::new(create_opts)?;

    let mut conn_opts = ConnectOptionsBuilder::new_v3();
    conn_opts
        .keep_alive_interval(Duration::from_secs(30))
        .clean_session(false)
        .user_name(username)
        .password(password);

    if use_tls {
        conn_opts.ssl_options(SslOptions::new());
    }

    client.connect(conn_opts.finalize()).await?;
    debug!("mqtt session established as {client_id}");

    Ok(client)
}
