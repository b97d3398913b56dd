use crate::SdkError;
use enslookup_types::Address;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Default request timeout for JSON-RPC and metadata requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// JSON-RPC 2.0 client for an Ethereum node over HTTP.
#[derive(Clone)]
pub struct RpcClient {
    endpoint: Url,
    http: Client,
    next_id: Arc<AtomicU64>,
}

impl RpcClient {
    /// Create a new client for the node at `endpoint`
    /// (e.g. `https://eth-mainnet.g.alchemy.com/v2/<key>`).
    pub fn new(endpoint: impl AsRef<str>) -> Result<Self, SdkError> {
        Self::with_timeout(endpoint, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(endpoint: impl AsRef<str>, timeout: Duration) -> Result<Self, SdkError> {
        Self::with_http_client(endpoint, Client::builder().timeout(timeout).build()?)
    }

    /// Use an existing reqwest client (useful for custom TLS or proxies).
    pub fn with_http_client(endpoint: impl AsRef<str>, http: Client) -> Result<Self, SdkError> {
        let endpoint = Url::parse(endpoint.as_ref())
            .map_err(|_| SdkError::InvalidBaseUrl(endpoint.as_ref().to_string()))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(SdkError::InvalidBaseUrl(endpoint.to_string()));
        }
        Ok(Self {
            endpoint,
            http,
            next_id: Arc::new(AtomicU64::new(1)),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Issue a raw JSON-RPC request and deserialize its `result`.
    pub async fn request<T>(&self, method: &str, params: Value) -> Result<T, SdkError>
    where
        T: DeserializeOwned,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let payload = RpcRequest {
            jsonrpc: "2.0",
            id,
            method,
            params,
        };
        debug!(%method, id, "sending json-rpc request");

        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&payload)
            .send()
            .await?;
        let envelope: RpcResponse<T> = Self::map_response(response).await?;

        if let Some(err) = envelope.error {
            debug!(%method, id, code = err.code, message = %err.message, "json-rpc error");
            return Err(err.into_sdk_error());
        }
        envelope
            .result
            .ok_or_else(|| SdkError::parse_error(format!("response to {method} has no result")))
    }

    /// `eth_call` against the latest block, returning the raw return data.
    pub async fn eth_call(&self, to: &Address, data: &[u8]) -> Result<Vec<u8>, SdkError> {
        let params = json!([
            {
                "to": to.to_checksum(),
                "data": format!("0x{}", hex::encode(data)),
            },
            "latest"
        ]);
        let result: String = self.request("eth_call", params).await?;
        decode_hex_data(&result)
    }

    /// Fetch and deserialize a JSON document, e.g. NFT metadata.
    pub async fn get_json<T>(&self, url: &str) -> Result<T, SdkError>
    where
        T: DeserializeOwned,
    {
        let url = Url::parse(url)?;
        let response = self.http.get(url).send().await?;
        Self::map_response(response).await
    }

    /// POST a JSON body and deserialize the JSON answer, e.g. from an
    /// offchain lookup gateway.
    pub async fn post_json<B, T>(&self, url: &str, body: &B) -> Result<T, SdkError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = Url::parse(url)?;
        let response = self.http.post(url).json(body).send().await?;
        Self::map_response(response).await
    }

    async fn map_response<T>(response: Response) -> Result<T, SdkError>
    where
        T: DeserializeOwned,
    {
        let status = response.status();
        if !status.is_success() {
            let bytes = response.bytes().await.unwrap_or_default();
            let text = String::from_utf8_lossy(&bytes).to_string();
            return Err(SdkError::server_error(status.as_u16(), text));
        }
        Ok(response.json::<T>().await?)
    }
}

pub(crate) fn decode_hex_data(raw: &str) -> Result<Vec<u8>, SdkError> {
    let digits = raw.strip_prefix("0x").unwrap_or(raw);
    hex::decode(digits).map_err(|err| SdkError::parse_error(format!("invalid hex data: {err}")))
}

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

impl RpcErrorObject {
    /// Code 3 is the execution-reverted code; older nodes only say so in the
    /// message.
    fn is_revert(&self) -> bool {
        self.code == 3 || self.message.to_lowercase().contains("revert")
    }

    /// Revert data, either a hex string or nested as `{ "data": "0x.." }`.
    fn revert_data(&self) -> Vec<u8> {
        let raw = match &self.data {
            Some(Value::String(raw)) => Some(raw.as_str()),
            Some(Value::Object(fields)) => fields.get("data").and_then(Value::as_str),
            _ => None,
        };
        raw.and_then(|raw| decode_hex_data(raw).ok())
            .unwrap_or_default()
    }

    fn into_sdk_error(self) -> SdkError {
        if self.is_revert() {
            SdkError::Reverted {
                data: self.revert_data(),
                message: self.message,
            }
        } else {
            SdkError::Rpc {
                code: self.code,
                message: self.message,
            }
        }
    }
}
