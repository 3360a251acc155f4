use crate::config::ClientOptions;
use crate::error::{Error, RemoteError, Result};
use crate::transport::{params, HttpTransport, Params, Transport};
use crate::util::init_tracing_once;
use regex::Regex;
use serde_json::Value;
use std::sync::{Arc, OnceLock};

/// Explicit client value passed to every fetch; there is no module-level session.
#[derive(Clone)]
pub struct VkClient {
    transport: Arc<dyn Transport>,
    pub(crate) opts: ClientOptions,
}

/// A user reference after local canonicalization.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UserRef {
    Id(i64),
    Domain(String),
}

impl VkClient {
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self::with_options(transport, ClientOptions::default())
    }

    pub fn with_options(transport: impl Transport + 'static, opts: ClientOptions) -> Self {
        init_tracing_once();
        Self { transport: Arc::new(transport), opts }
    }

    /// HTTP client configured from `VK_*` environment variables.
    pub fn from_env() -> Result<Self> {
        let opts = ClientOptions::from_env();
        let transport = HttpTransport::new(&opts)?;
        Ok(Self::with_options(transport, opts))
    }

    // -------- Builder methods --------
    pub fn api_version(mut self, v: impl Into<String>) -> Self { self.opts = self.opts.with_api_version(v); self }
    pub fn lang(mut self, lang: impl Into<String>) -> Self { self.opts = self.opts.with_lang(lang); self }
    pub fn user_concurrency(mut self, n: usize) -> Self { self.opts = self.opts.with_user_concurrency(n); self }
    pub fn download_workers(mut self, n: usize) -> Self { self.opts = self.opts.with_download_workers(n); self }
    pub fn progress(mut self, yes: bool) -> Self { self.opts = self.opts.with_progress(yes); self }
    pub fn exclude_fields<I, S>(mut self, fields: I) -> Self where I: IntoIterator<Item = S>, S: Into<String> { self.opts = self.opts.with_exclude_fields(fields); self }
    pub fn write_buffer(mut self, bytes: usize) -> Self { self.opts = self.opts.with_write_buffer(bytes); self }

    pub fn options(&self) -> &ClientOptions {
        &self.opts
    }

    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    /// Issue one logical request. `v` and `lang` are filled in only when the caller
    /// did not pass them. Returns the `response` payload or the normalized failure.
    pub fn invoke(&self, method: &str, params: &Params) -> std::result::Result<Value, RemoteError> {
        let mut params = params.clone();
        params.entry("v".to_string()).or_insert_with(|| self.opts.api_version.clone());
        params.entry("lang".to_string()).or_insert_with(|| self.opts.lang.clone());

        tracing::debug!(method, ?params, "request");
        let mut body = self.transport.call(method, &params)?;

        if let Some(payload) = body.get_mut("response") {
            return Ok(payload.take());
        }
        if let Some(err) = body.get("error") {
            params.remove("access_token");
            return Err(RemoteError::Service {
                code: err.get("error_code").and_then(|c| c.as_i64()).unwrap_or(0),
                message: err.get("error_msg").and_then(|m| m.as_str()).unwrap_or_default().to_string(),
                method: method.to_string(),
                params,
            });
        }
        Err(RemoteError::Malformed {
            method: method.to_string(),
            reason: "neither `response` nor `error` present".to_string(),
        })
    }

    /// Canonical numeric id for a user reference; names are resolved through `users.get`.
    pub fn resolve_user_id(&self, domain: &str) -> Result<i64> {
        match canonical_user(domain) {
            UserRef::Id(id) => Ok(id),
            UserRef::Domain(name) => {
                let response = self.invoke("users.get", &params([("user_ids", name.as_str())]))?;
                let id = response
                    .as_array()
                    .and_then(|users| users.first())
                    .and_then(|u| u.get("id"))
                    .and_then(|id| id.as_i64());
                match id {
                    Some(id) => Ok(id),
                    None => {
                        tracing::warn!(domain = %name, "user could not be resolved");
                        Err(Error::UnresolvedIdentifier(name))
                    }
                }
            }
        }
    }

    /// Canonical numeric id for a community; names are resolved through `groups.getById`.
    pub fn resolve_group_id(&self, domain: &str) -> Result<i64> {
        let name = strip_site_prefix(domain);
        if let Ok(id) = name.parse::<i64>() {
            return Ok(id);
        }
        let response = self.invoke("groups.getById", &params([("group_id", name)]))?;
        response
            .as_array()
            .and_then(|groups| groups.first())
            .and_then(|g| g.get("id"))
            .and_then(|id| id.as_i64())
            .ok_or_else(|| Error::UnresolvedIdentifier(name.to_string()))
    }
}

fn site_prefix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?:https?://)?(?:www\.|m\.)?vk\.com/").expect("valid regex"))
}

fn user_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?:id)?(\d+)$").expect("valid regex"))
}

/// Strip a `https://vk.com/` style prefix and surrounding whitespace/slashes.
pub fn strip_site_prefix(s: &str) -> &str {
    let s = s.trim();
    let s = match site_prefix_re().find(s) {
        Some(m) => &s[m.end()..],
        None => s,
    };
    s.trim_end_matches('/')
}

/// `id123` and `123` are ids; anything else is a screen name.
pub fn canonical_user(s: &str) -> UserRef {
    let s = strip_site_prefix(s);
    if let Some(caps) = user_id_re().captures(s) {
        if let Ok(id) = caps[1].parse::<i64>() {
            return UserRef::Id(id);
        }
    }
    UserRef::Domain(s.to_string())
}
