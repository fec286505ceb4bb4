use serde::{Deserialize, Serialize};
use std::{
    fmt,
    num::NonZeroUsize,
    time::Duration,
};
use url::Url;

pub const DEFAULT_CLASSIFIER_URL: &str = "https://mood-based-doorbell-backend.onrender.com";
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
pub const DEFAULT_HISTORY_CAPACITY: usize = 10;
pub const DEFAULT_RING_COOLDOWN_SECS: u64 = 30;
pub const ENV_CLASSIFIER_URL: &str = "MOOD_CLASSIFIER_URL";
pub const ENV_CLASSIFIER_TOKEN: &str = "MOOD_CLASSIFIER_TOKEN";

/// Base URL of the mood-detection service. Always ends in `/` so endpoint
/// paths join underneath it.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClassifierEndpoint(Url);

impl ClassifierEndpoint {
    pub fn new(value: &str) -> Result<Self, ConfigError> {
        let mut url = Url::parse(value.trim())
            .map_err(|e| ConfigError::InvalidClassifierUrl(format!("{value}: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidClassifierUrl(format!(
                "{value}: scheme must be http or https"
            )));
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(Self(url))
    }

    pub fn url(&self) -> &Url {
        &self.0
    }

    pub fn join(&self, endpoint: &str) -> Result<Url, url::ParseError> {
        self.0.join(endpoint)
    }
}

#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new<S: Into<String>>(value: S) -> Result<Self, ConfigError> {
        let v = value.into();
        if v.trim().is_empty() {
            return Err(ConfigError::EmptyApiKey);
        }
        Ok(Self(v))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(**redacted**)")
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RequestTimeout {
    pub millis: u64,
}

impl RequestTimeout {
    pub fn new(millis: u64) -> Result<Self, ConfigError> {
        if millis == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(Self { millis })
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.millis)
    }
}

impl Default for RequestTimeout {
    fn default() -> Self {
        Self {
            millis: DEFAULT_TIMEOUT_MS,
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryCapacity(NonZeroUsize);

impl HistoryCapacity {
    pub fn new(entries: usize) -> Result<Self, ConfigError> {
        NonZeroUsize::new(entries)
            .map(Self)
            .ok_or(ConfigError::ZeroHistoryCapacity)
    }

    pub fn get(&self) -> NonZeroUsize {
        self.0
    }
}

impl Default for HistoryCapacity {
    fn default() -> Self {
        Self(NonZeroUsize::new(DEFAULT_HISTORY_CAPACITY).unwrap_or(NonZeroUsize::MIN))
    }
}

/// What a doorbell ring does when the classifier call fails.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Log the failure and resolve empty scores (neutral, no signal).
    #[default]
    NoSignal,
    /// Return the failure to the caller without resolving.
    Surface,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClassifierConfig {
    pub endpoint: ClassifierEndpoint,
    pub api_key: Option<ApiKey>,
    pub timeout: RequestTimeout,
    pub retry_attempts: u32,
}

impl ClassifierConfig {
    pub fn new(endpoint: ClassifierEndpoint) -> Self {
        Self {
            endpoint,
            api_key: None,
            timeout: RequestTimeout::default(),
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    pub classifier: ClassifierConfig,
    pub history_capacity: HistoryCapacity,
    pub ring_cooldown: Duration,
    pub failure_policy: FailurePolicy,
    pub muted: bool,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid classifier url: {0}")]
    InvalidClassifierUrl(String),
    #[error("api key must not be empty")]
    EmptyApiKey,
    #[error("timeout must be > 0 ms")]
    ZeroTimeout,
    #[error("history capacity must be > 0")]
    ZeroHistoryCapacity,
}

pub trait Env {
    fn var(&self, key: &str) -> Option<String>;
}

#[derive(Clone, Debug, Default)]
pub struct StdEnv;

impl Env for StdEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

#[derive(Clone, Debug, Default)]
pub struct MapEnv {
    vars: std::collections::BTreeMap<String, String>,
}

impl MapEnv {
    pub fn with_var(mut self, key: &str, value: &str) -> Self {
        self.vars.insert(key.to_owned(), value.to_owned());
        self
    }
}

impl Env for MapEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

pub fn resolve_api_key(
    cli_value: Option<String>,
    env_key: &str,
    env: &impl Env,
) -> Result<Option<ApiKey>, ConfigError> {
    match cli_value {
        Some(v) => Ok(Some(ApiKey::new(v)?)),
        None => match env.var(env_key) {
            Some(v) => Ok(Some(ApiKey::new(v)?)),
            None => Ok(None),
        },
    }
}

pub fn resolve_string_with_default(
    cli_value: Option<String>,
    env_key: &str,
    env: &impl Env,
    default: &str,
) -> String {
    match cli_value {
        Some(v) => v,
        None => env.var(env_key).unwrap_or_else(|| default.to_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_cli_takes_precedence_over_env() {
        let env = MapEnv::default().with_var(ENV_CLASSIFIER_TOKEN, "env-token");
        let key = resolve_api_key(Some("cli-token".to_owned()), ENV_CLASSIFIER_TOKEN, &env)
            .expect("valid key")
            .expect("present");
        assert_eq!(key.expose(), "cli-token");
    }

    #[test]
    fn api_key_env_used_when_cli_missing() {
        let env = MapEnv::default().with_var(ENV_CLASSIFIER_TOKEN, "env-token");
        let key = resolve_api_key(None, ENV_CLASSIFIER_TOKEN, &env)
            .expect("valid key")
            .expect("present");
        assert_eq!(key.expose(), "env-token");
    }

    #[test]
    fn blank_api_key_is_rejected() {
        let env = MapEnv::default().with_var(ENV_CLASSIFIER_TOKEN, "   ");
        assert_eq!(
            resolve_api_key(None, ENV_CLASSIFIER_TOKEN, &env),
            Err(ConfigError::EmptyApiKey)
        );
    }

    #[test]
    fn api_key_debug_is_redacted() {
        let key = ApiKey::new("secret").expect("non-empty");
        assert_eq!(format!("{key:?}"), "ApiKey(**redacted**)");
    }

    #[test]
    fn endpoint_gets_trailing_slash() {
        let endpoint = ClassifierEndpoint::new("http://localhost:8000/api").expect("valid url");
        assert_eq!(endpoint.url().as_str(), "http://localhost:8000/api/");
        assert_eq!(
            endpoint.join("detect-mood").expect("joins").as_str(),
            "http://localhost:8000/api/detect-mood"
        );
    }

    #[test]
    fn default_endpoint_joins_at_root() {
        let endpoint = ClassifierEndpoint::new(DEFAULT_CLASSIFIER_URL).expect("valid url");
        assert_eq!(
            endpoint.join("detect-voice-mood").expect("joins").as_str(),
            "https://mood-based-doorbell-backend.onrender.com/detect-voice-mood"
        );
    }

    #[test]
    fn endpoint_rejects_non_http_schemes() {
        assert!(matches!(
            ClassifierEndpoint::new("ftp://example.com"),
            Err(ConfigError::InvalidClassifierUrl(_))
        ));
        assert!(matches!(
            ClassifierEndpoint::new("not a url"),
            Err(ConfigError::InvalidClassifierUrl(_))
        ));
    }

    #[test]
    fn zero_values_are_rejected() {
        assert_eq!(RequestTimeout::new(0), Err(ConfigError::ZeroTimeout));
        assert_eq!(HistoryCapacity::new(0), Err(ConfigError::ZeroHistoryCapacity));
        assert_eq!(HistoryCapacity::default().get().get(), DEFAULT_HISTORY_CAPACITY);
    }

    #[test]
    fn resolve_string_with_default_prefers_cli_then_env() {
        let env = MapEnv::default().with_var(ENV_CLASSIFIER_URL, "http://env");
        assert_eq!(
            resolve_string_with_default(Some("http://cli".to_owned()), ENV_CLASSIFIER_URL, &env, "def"),
            "http://cli"
        );
        assert_eq!(
            resolve_string_with_default(None, ENV_CLASSIFIER_URL, &env, "def"),
            "http://env"
        );
        assert_eq!(
            resolve_string_with_default(None, ENV_CLASSIFIER_URL, &MapEnv::default(), "def"),
            "def"
        );
    }
}
