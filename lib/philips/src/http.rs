mod envelope;
mod exchange;

use chipp_http::{HttpClient as Transport, HttpMethod, NoInterceptor};
use crypto::Token;
use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::{DeviceClient, Error, Result, Status, Values};
use exchange::KeyPair;

/// Client for legacy firmware serving `/di/v1/products` over plain HTTP.
///
/// Every payload is AES encrypted with a session key agreed on once in
/// [`HttpClient::connect`].
pub struct HttpClient {
    transport: Transport<NoInterceptor>,
    session_key: Token<16>,
}

#[derive(Serialize)]
struct ExchangeRequest {
    diffie: String,
}

#[derive(Deserialize)]
struct ExchangeResponse {
    key: String,
    hellman: String,
}

impl HttpClient {
    pub async fn connect(address: &str) -> Result<Self> {
        let base_url = format!("http://{address}/di/v1/products");
        let transport = Transport::new(base_url.as_str())?;

        let session_key = Self::exchange_key(&transport).await?;
        debug!("negotiated session key with {address}");

        Ok(Self {
            transport,
            session_key,
        })
    }

    async fn exchange_key(transport: &Transport<NoInterceptor>) -> Result<Token<16>> {
        let key_pair = KeyPair::generate();

        let mut request = transport.new_request(["0", "security"]);
        request.set_json_body(&ExchangeRequest {
            diffie: key_pair.public_hex(),
        });
        request.set_method(HttpMethod::Put);

        let response: ExchangeResponse = transport
            .perform_request(request, chipp_http::json::parse_json)
            .await?;

        let shared = key_pair.shared_secret(&response.hellman)?;
        exchange::session_key(&response.key, shared)
    }

    async fn perform(&self, method: HttpMethod, body: Option<Vec<u8>>) -> Result<Vec<u8>> {
        let mut request = self.transport.new_request(["1", "air"]);
        request.method = method;
        request.body = body;

        let reply = self
            .transport
            .perform_request(request, |req, res| {
                if res.status_code == 200 {
                    Ok(Ok(res.body))
                } else if (400..500).contains(&res.status_code) {
                    Ok(Err(format!("status code {}", res.status_code)))
                } else {
                    Err((req, res).into())
                }
            })
            .await?;

        reply.map_err(Error::Rejected)
    }
}

#[async_trait::async_trait]
impl DeviceClient for HttpClient {
    async fn get_status(&self) -> Result<Status> {
        let body = self.perform(HttpMethod::Get, None).await?;
        envelope::open(&body, self.session_key)
    }

    async fn set_values(&self, values: Values) -> Result<()> {
        let body = envelope::seal(&values, self.session_key)?;
        let reply = self.perform(HttpMethod::Put, Some(body.into_bytes())).await?;

        let status = envelope::open(&reply, self.session_key)?;
        trace!("status after update: {status:?}");

        Ok(())
    }
}
