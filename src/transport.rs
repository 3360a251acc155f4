//! The request function the client is built on. `HttpTransport` talks to the
//! real API over `reqwest::blocking`; tests plug in an in-memory implementation.

use crate::config::ClientOptions;
use crate::error::{Error, RemoteError, Result};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde_json::Value;
use std::collections::BTreeMap;

/// Request parameters: string keys, stringified scalar values.
pub type Params = BTreeMap<String, String>;

/// Build `Params` from `(key, value)` pairs.
pub fn params<I, K, V>(pairs: I) -> Params
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: ToString,
{
    pairs.into_iter().map(|(k, v)| (k.into(), v.to_string())).collect()
}

pub trait Transport: Send + Sync {
    /// Issue one API call and return the decoded JSON body.
    /// Non-success HTTP statuses must surface as `RemoteError::Status`.
    fn call(&self, method: &str, params: &Params) -> std::result::Result<Value, RemoteError>;

    /// Fetch raw bytes from an absolute URL (photo downloads).
    fn download(&self, url: &str) -> std::result::Result<Vec<u8>, RemoteError>;
}

/// Blocking HTTP transport. Adds `access_token` to every call.
pub struct HttpTransport {
    client: Client,
    base_url: String,
    token: String,
}

impl HttpTransport {
    pub fn new(opts: &ClientOptions) -> Result<Self> {
        let token = opts
            .token
            .clone()
            .ok_or_else(|| Error::Config("access token is required (set VK_TOKEN)".to_string()))?;
        let client = Client::builder()
            .timeout(opts.timeout)
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {}", e)))?;
        Ok(Self { client, base_url: opts.base_url.clone(), token })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(&ClientOptions::from_env())
    }
}

impl Transport for HttpTransport {
    fn call(&self, method: &str, params: &Params) -> std::result::Result<Value, RemoteError> {
        let url = format!("{}/{}", self.base_url, method);
        let response = self
            .client
            .get(&url)
            .query(params)
            .query(&[("access_token", self.token.as_str())])
            .send()
            .map_err(|e| RemoteError::Transport { method: method.to_string(), reason: e.to_string() })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(RemoteError::Status { status: status.as_u16(), method: method.to_string() });
        }

        response
            .json::<Value>()
            .map_err(|e| RemoteError::Malformed { method: method.to_string(), reason: e.to_string() })
    }

    fn download(&self, url: &str) -> std::result::Result<Vec<u8>, RemoteError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| RemoteError::Transport { method: url.to_string(), reason: e.to_string() })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(RemoteError::Status { status: status.as_u16(), method: url.to_string() });
        }
        let bytes = response
            .bytes()
            .map_err(|e| RemoteError::Transport { method: url.to_string(), reason: e.to_string() })?;
        Ok(bytes.to_vec())
    }
}
