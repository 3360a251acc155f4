use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.vk.com/method";
pub const DEFAULT_API_VERSION: &str = "5.122";
pub const DEFAULT_LANG: &str = "ru";

/// Bookkeeping fields stripped before full-record comparison and output.
pub const DEFAULT_EXCLUDE_FIELDS: [&str; 2] = ["track_code", "lists"];

/// User-facing options with sensible defaults and builder chaining.
#[derive(Clone, Debug)]
pub struct ClientOptions {
    pub base_url: String,
    pub api_version: String,          // injected as `v` unless the caller passes one
    pub lang: String,                 // injected as `lang` unless the caller passes one
    pub token: Option<String>,
    pub timeout: Duration,
    pub user_concurrency: usize,      // users fetched in parallel by the multi-user helpers
    pub download_workers: usize,      // photo download pool size
    pub progress: bool,               // show progress bars
    pub exclude_fields: Vec<String>,

    // output
    pub write_buffer_bytes: usize,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            lang: DEFAULT_LANG.to_string(),
            token: None,
            timeout: Duration::from_secs(30),
            user_concurrency: 4,
            download_workers: 4,
            progress: false,
            exclude_fields: DEFAULT_EXCLUDE_FIELDS.iter().map(|s| s.to_string()).collect(),
            write_buffer_bytes: 256 * 1024,
        }
    }
}

impl ClientOptions {
    /// Defaults overridden by `VK_TOKEN`, `VK_API_VERSION`, `VK_LANG` and `VK_EXCLUDE_FIELDS`.
    pub fn from_env() -> Self {
        let mut opts = Self::default();
        if let Ok(t) = std::env::var("VK_TOKEN") {
            if !t.trim().is_empty() {
                opts.token = Some(t.trim().to_string());
            }
        }
        if let Ok(v) = std::env::var("VK_API_VERSION") {
            if !v.trim().is_empty() {
                opts.api_version = v.trim().to_string();
            }
        }
        if let Ok(l) = std::env::var("VK_LANG") {
            if !l.trim().is_empty() {
                opts.lang = l.trim().to_string();
            }
        }
        crate::util::merge_extra_exclusions(&mut opts.exclude_fields);
        opts
    }

    pub fn with_base_url(mut self, url: impl AsRef<str>) -> Self {
        self.base_url = url.as_ref().trim().trim_end_matches('/').to_string();
        self
    }
    pub fn with_api_version(mut self, v: impl Into<String>) -> Self {
        self.api_version = v.into();
        self
    }
    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
    pub fn with_user_concurrency(mut self, n: usize) -> Self {
        self.user_concurrency = n.max(1);
        self
    }
    pub fn with_download_workers(mut self, n: usize) -> Self {
        self.download_workers = n.max(1);
        self
    }
    pub fn with_progress(mut self, yes: bool) -> Self {
        self.progress = yes;
        self
    }
    pub fn with_exclude_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_fields = fields.into_iter().map(Into::into).collect();
        self
    }
    pub fn with_write_buffer(mut self, bytes: usize) -> Self {
        self.write_buffer_bytes = bytes.max(8 * 1024);
        self
    }
}
