//!
//! _Config builder_
//!
//! Helps build the configuration for the client
//!

use std::{env, fmt, fs, path::Path, time::Duration};

use serde::Deserialize;

use crate::error::{Error, Result};

/// Endpoint used by accounts on the free plan
pub const FREE_API_URL: &str = "https://api-free.deepl.com";
/// Endpoint used by accounts on a paid plan
pub const PRO_API_URL: &str = "https://api.deepl.com";
/// Environment variable the api key is read from by default
pub const DEFAULT_API_KEY_ENV: &str = "DEEPL_API_KEY";
/// Log target used when none is configured
pub const DEFAULT_LOG_TARGET: &str = "deepl_client";
/// Sent as `User-Agent` on every request
pub const DEFAULT_USER_AGENT: &str = concat!("deepl-client-rs/", env!("CARGO_PKG_VERSION"));

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Where the api key comes from
#[derive(Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// Read the named environment variable on every call
    Env(String),
    /// A fixed key
    Static(String),
}

impl Default for CredentialSource {
    fn default() -> Self {
        CredentialSource::Env(DEFAULT_API_KEY_ENV.to_string())
    }
}

impl fmt::Debug for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::Env(var) => f.debug_tuple("Env").field(var).finish(),
            CredentialSource::Static(_) => f.debug_tuple("Static").field(&"***").finish(),
        }
    }
}

impl CredentialSource {
    /// Returns the key, failing when it is missing or empty
    pub fn resolve(&self) -> Result<String> {
        match self {
            CredentialSource::Env(var) => match env::var(var) {
                Ok(key) if key.is_empty() => Err(Error::config(format!("{var} is empty"))),
                Ok(key) => Ok(key),
                Err(env::VarError::NotPresent) => Err(Error::config(format!(
                    "API key environment variable {var} is not set"
                ))),
                Err(env::VarError::NotUnicode(_)) => Err(Error::config(format!(
                    "{var} does not contain valid unicode"
                ))),
            },
            CredentialSource::Static(key) if key.is_empty() => {
                Err(Error::config("API key is empty"))
            }
            CredentialSource::Static(key) => Ok(key.clone()),
        }
    }
}

/// Client configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    ///Base url of the api, without the `/v2` part
    pub base_url: String,
    ///Where the api key is read from
    pub credential: CredentialSource,
    ///Value of the `User-Agent` header
    pub user_agent: String,
    ///Upper bound for every request. Default: 30s
    pub timeout: Option<Duration>,
    ///Target for log records. Default: `deepl_client`
    pub log_target: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: FREE_API_URL.to_string(),
            credential: Default::default(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Some(DEFAULT_TIMEOUT),
            log_target: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    base_url: Option<String>,
    api_key: Option<String>,
    api_key_env: Option<String>,
    user_agent: Option<String>,
    timeout_secs: Option<u64>,
    log_target: Option<String>,
}

impl Config {
    /// Return the defaults pointed at `base_url`
    pub fn new<S: Into<String>>(base_url: S) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Base url of the api
    pub fn base_url<S: Into<String>>(&mut self, url: S) -> &mut Self {
        self.base_url = url.into();
        self
    }

    /// Use a fixed api key
    pub fn api_key<S: Into<String>>(&mut self, key: S) -> &mut Self {
        self.credential = CredentialSource::Static(key.into());
        self
    }

    /// Read the api key from this environment variable on every call
    pub fn api_key_env<S: Into<String>>(&mut self, var: S) -> &mut Self {
        self.credential = CredentialSource::Env(var.into());
        self
    }

    ///Credential source
    pub fn credential(&mut self, source: CredentialSource) -> &mut Self {
        self.credential = source;
        self
    }

    ///User agent header
    pub fn user_agent<S: Into<String>>(&mut self, agent: S) -> &mut Self {
        self.user_agent = agent.into();
        self
    }

    ///Request timeout, `None` disables it
    pub fn timeout(&mut self, timeout: Option<Duration>) -> &mut Self {
        self.timeout = timeout;
        self
    }

    ///Log target
    pub fn log_target<S: Into<String>>(&mut self, target: S) -> &mut Self {
        self.log_target = Some(target.into());
        self
    }

    /// Build the config
    pub fn build(&self) -> Self {
        self.clone()
    }

    /// Parse a toml document. Missing keys keep their defaults.
    ///
    /// ```toml
    /// base_url = "https://api.deepl.com"
    /// api_key_env = "DEEPL_PRO_API_KEY"
    /// timeout_secs = 10
    /// ```
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let file: FileConfig =
            toml::from_str(s).map_err(|e| Error::config(format!("Invalid config: {e}")))?;

        if file.api_key.is_some() && file.api_key_env.is_some() {
            return Err(Error::config(
                "Invalid config: api_key and api_key_env are mutually exclusive",
            ));
        }

        let mut cfg = Config::default();
        if let Some(url) = file.base_url {
            cfg.base_url(url);
        }
        if let Some(key) = file.api_key {
            cfg.api_key(key);
        }
        if let Some(var) = file.api_key_env {
            cfg.api_key_env(var);
        }
        if let Some(agent) = file.user_agent {
            cfg.user_agent(agent);
        }
        if let Some(secs) = file.timeout_secs {
            cfg.timeout(Some(Duration::from_secs(secs)));
        }
        if let Some(target) = file.log_target {
            cfg.log_target(target);
        }
        Ok(cfg.build())
    }

    /// Read and parse a toml config file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Could not read config {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&contents)
    }

    /// Defaults with the base url taken from `DEEPL_BASE_URL` when set.
    ///
    /// A `.env` file in the working directory is loaded first.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let base_url = env::var("DEEPL_BASE_URL")
            .ok()
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| FREE_API_URL.to_string());

        Config::new(base_url)
    }
}
