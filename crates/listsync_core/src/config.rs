//! Backend connection settings.
//!
//! # Responsibility
//! - Hold the project URL, API key and collection names used by repositories.
//! - Load settings from `LISTSYNC_*` environment variables.
//!
//! # Invariants
//! - `project_url` is an absolute http(s) URL that can carry path segments.
//! - `api_key` and collection names are never blank.
//! - `Debug` output never contains the API key.

use crate::model::record::RecordKind;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::time::Duration;
use url::Url;

pub const ENV_PROJECT_URL: &str = "LISTSYNC_PROJECT_URL";
pub const ENV_API_KEY: &str = "LISTSYNC_API_KEY";
pub const ENV_API_KEY_PLACEMENT: &str = "LISTSYNC_API_KEY_PLACEMENT";
pub const ENV_TIMEOUT_SECS: &str = "LISTSYNC_TIMEOUT_SECS";
pub const ENV_SONGS_COLLECTION: &str = "LISTSYNC_SONGS_COLLECTION";
pub const ENV_WEAPONS_COLLECTION: &str = "LISTSYNC_WEAPONS_COLLECTION";
pub const ENV_PROXY_URL: &str = "LISTSYNC_PROXY_URL";

/// Request timeout applied when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

const REST_PATH_SEGMENTS: [&str; 2] = ["rest", "v1"];

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Invalid or missing backend setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    InvalidUrl { value: String, reason: String },
    BlankApiKey,
    InvalidPlacement(String),
    InvalidTimeout(String),
    InvalidCollection(String),
    InvalidProxy(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing(name) => write!(f, "missing required setting `{name}`"),
            Self::InvalidUrl { value, reason } => {
                write!(f, "invalid project url `{value}`: {reason}")
            }
            Self::BlankApiKey => write!(f, "api key must not be blank"),
            Self::InvalidPlacement(value) => write!(
                f,
                "unsupported api key placement `{value}`; expected query|header"
            ),
            Self::InvalidTimeout(value) => {
                write!(f, "invalid timeout `{value}`; expected whole seconds")
            }
            Self::InvalidCollection(value) => write!(
                f,
                "invalid collection name `{value}`; must be non-blank and contain no `/`"
            ),
            Self::InvalidProxy(value) => write!(f, "invalid proxy url `{value}`"),
        }
    }
}

impl Error for ConfigError {}

/// Where the API key travels on each request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApiKeyPlacement {
    /// `apikey=<key>` query parameter, as the backend was originally called.
    #[default]
    Query,
    /// `apikey: <key>` request header.
    Header,
}

impl ApiKeyPlacement {
    pub fn parse(value: &str) -> ConfigResult<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "query" => Ok(Self::Query),
            "header" => Ok(Self::Header),
            other => Err(ConfigError::InvalidPlacement(other.to_string())),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Header => "header",
        }
    }
}

/// Connection settings injected into repositories at construction time.
#[derive(Clone, PartialEq, Eq)]
pub struct BackendConfig {
    project_url: Url,
    api_key: String,
    api_key_placement: ApiKeyPlacement,
    timeout: Option<Duration>,
    songs_collection: String,
    weapons_collection: String,
    proxy_url: Option<Url>,
}

impl BackendConfig {
    /// Creates settings with default placement, timeout and collections.
    ///
    /// # Errors
    /// - `InvalidUrl` when `project_url` is not an absolute http(s) URL.
    /// - `BlankApiKey` when `api_key` is blank.
    pub fn new(project_url: &str, api_key: &str) -> ConfigResult<Self> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(ConfigError::BlankApiKey);
        }
        Ok(Self {
            project_url: parse_project_url(project_url)?,
            api_key: api_key.to_string(),
            api_key_placement: ApiKeyPlacement::default(),
            timeout: Some(DEFAULT_TIMEOUT),
            songs_collection: RecordKind::Song.default_collection().to_string(),
            weapons_collection: RecordKind::Weapon.default_collection().to_string(),
            proxy_url: None,
        })
    }

    /// Reads settings from the process environment.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads settings through `lookup`, keyed by the `LISTSYNC_*` names.
    ///
    /// Blank values are treated as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<Self> {
        let read = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let project_url = read(ENV_PROJECT_URL).ok_or(ConfigError::Missing(ENV_PROJECT_URL))?;
        let api_key = read(ENV_API_KEY).ok_or(ConfigError::Missing(ENV_API_KEY))?;
        let mut config = Self::new(&project_url, &api_key)?;

        if let Some(value) = read(ENV_API_KEY_PLACEMENT) {
            config = config.with_api_key_placement(ApiKeyPlacement::parse(&value)?);
        }
        if let Some(value) = read(ENV_TIMEOUT_SECS) {
            config = config.with_timeout(parse_timeout_secs(&value)?);
        }
        if let Some(value) = read(ENV_SONGS_COLLECTION) {
            config = config.with_collection(RecordKind::Song, &value)?;
        }
        if let Some(value) = read(ENV_WEAPONS_COLLECTION) {
            config = config.with_collection(RecordKind::Weapon, &value)?;
        }
        if let Some(value) = read(ENV_PROXY_URL) {
            config = config.with_proxy_url(&value)?;
        }
        Ok(config)
    }

    pub fn with_api_key_placement(mut self, placement: ApiKeyPlacement) -> Self {
        self.api_key_placement = placement;
        self
    }

    /// `None` disables the request timeout.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_collection(mut self, kind: RecordKind, name: &str) -> ConfigResult<Self> {
        let name = name.trim();
        if name.is_empty() || name.contains('/') {
            return Err(ConfigError::InvalidCollection(name.to_string()));
        }
        match kind {
            RecordKind::Song => self.songs_collection = name.to_string(),
            RecordKind::Weapon => self.weapons_collection = name.to_string(),
        }
        Ok(self)
    }

    /// Routes requests through `proxy_url`. Without one, requests go direct
    /// regardless of proxy environment variables.
    ///
    /// The URL must be one the HTTP client can use as a proxy
    /// (`http`, `https`, `socks4`, `socks4a`, `socks5`, `socks5h`).
    pub fn with_proxy_url(mut self, proxy_url: &str) -> ConfigResult<Self> {
        let trimmed = proxy_url.trim();
        let invalid = || ConfigError::InvalidProxy(trimmed.to_string());
        let url = Url::parse(trimmed).map_err(|_| invalid())?;
        ureq::Proxy::new(url.as_str()).map_err(|_| invalid())?;
        self.proxy_url = Some(url);
        Ok(self)
    }

    pub fn project_url(&self) -> &Url {
        &self.project_url
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn api_key_placement(&self) -> ApiKeyPlacement {
        self.api_key_placement
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn proxy_url(&self) -> Option<&Url> {
        self.proxy_url.as_ref()
    }

    pub fn collection(&self, kind: RecordKind) -> &str {
        match kind {
            RecordKind::Song => &self.songs_collection,
            RecordKind::Weapon => &self.weapons_collection,
        }
    }

    /// Returns `<project_url>/rest/v1/<collection>` without any query.
    pub fn collection_url(&self, kind: RecordKind) -> Url {
        let mut url = self.project_url.clone();
        // `parse_project_url` guarantees the URL can be a base.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(REST_PATH_SEGMENTS)
                .push(self.collection(kind));
        }
        url
    }
}

impl Debug for BackendConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("project_url", &self.project_url.as_str())
            .field("api_key", &"<redacted>")
            .field("api_key_placement", &self.api_key_placement)
            .field("timeout", &self.timeout)
            .field("songs_collection", &self.songs_collection)
            .field("weapons_collection", &self.weapons_collection)
            .field("proxy_url", &self.proxy_url.as_ref().map(Url::as_str))
            .finish()
    }
}

fn parse_project_url(value: &str) -> ConfigResult<Url> {
    let trimmed = value.trim();
    let invalid = |reason: &str| ConfigError::InvalidUrl {
        value: trimmed.to_string(),
        reason: reason.to_string(),
    };

    let url = Url::parse(trimmed).map_err(|err| invalid(&err.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("scheme must be http or https"));
    }
    if url.cannot_be_a_base() {
        return Err(invalid("url cannot carry path segments"));
    }
    if url.query().is_some() {
        return Err(invalid("query parameters are not allowed"));
    }
    Ok(url)
}

fn parse_timeout_secs(value: &str) -> ConfigResult<Option<Duration>> {
    let secs: u64 = value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidTimeout(value.to_string()))?;
    if secs == 0 {
        return Ok(None);
    }
    Ok(Some(Duration::from_secs(secs)))
}
