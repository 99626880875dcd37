use crate::error::RelayError;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_BIND_HOST: &str = "0.0.0.0";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_LINE_API_BASE_URL: &str = "https://api.line.me";
pub const DEFAULT_MODEL: &str = "text-davinci-003";
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

/// Runtime configuration for the relay, sourced from the process environment.
///
/// Environment:
/// - CHANNEL_ACCESS_TOKEN (required)  -> bearer for the LINE reply endpoint
/// - CHANNEL_SECRET (required)        -> HMAC key for `x-line-signature`
/// - OPENAI_API_KEY (required)        -> bearer for the completion endpoint
/// - PORT                             -> listen port (default 3000)
/// - BIND_HOST                        -> listen host (default 0.0.0.0)
/// - OPENAI_BASE_URL                  -> completion API base
/// - LINE_API_BASE_URL                -> messaging API base
/// - COMPLETION_MODEL                 -> model id (default text-davinci-003)
/// - COMPLETION_MAX_TOKENS            -> max output tokens (default 1000)
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub channel_access_token: String,
    pub channel_secret: String,
    pub openai_api_key: String,
    pub port: u16,
    pub bind_host: String,
    pub openai_base_url: String,
    pub line_api_base_url: String,
    pub model: String,
    pub max_tokens: u32,
}

impl RelayConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, RelayError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, RelayError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let required = |key: &str| {
            get(key).ok_or_else(|| RelayError::Config(format!("{key} is not set")))
        };

        let port = match get("PORT") {
            Some(p) => p
                .parse::<u16>()
                .map_err(|e| RelayError::Config(format!("PORT={p:?} is not a valid port: {e}")))?,
            None => DEFAULT_PORT,
        };
        let max_tokens = match get("COMPLETION_MAX_TOKENS") {
            Some(n) => n.parse::<u32>().map_err(|e| {
                RelayError::Config(format!("COMPLETION_MAX_TOKENS={n:?} is not a number: {e}"))
            })?,
            None => DEFAULT_MAX_TOKENS,
        };

        Ok(Self {
            channel_access_token: required("CHANNEL_ACCESS_TOKEN")?,
            channel_secret: required("CHANNEL_SECRET")?,
            openai_api_key: required("OPENAI_API_KEY")?,
            port,
            bind_host: get("BIND_HOST").unwrap_or_else(|| DEFAULT_BIND_HOST.to_string()),
            openai_base_url: trim_base(
                get("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            ),
            line_api_base_url: trim_base(
                get("LINE_API_BASE_URL").unwrap_or_else(|| DEFAULT_LINE_API_BASE_URL.to_string()),
            ),
            model: get("COMPLETION_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_tokens,
        })
    }

    /// `host:port` the HTTP listener binds to.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_host, self.port)
    }
}

fn trim_base(url: String) -> String {
    url.trim_end_matches('/').to_string()
}
