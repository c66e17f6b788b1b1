//! Client configuration read from the environment.

use std::time::Duration;

use crate::error::ApiError;

pub const API_URL_VAR: &str = "ROUTEMASTER_API_URL";
pub const TIMEOUT_VAR: &str = "ROUTEMASTER_TIMEOUT_SECS";
pub const DEFAULT_API_URL: &str = "http://localhost:2017";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: String,
    /// Applied by the transport to the whole round-trip. `None` waits forever.
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout: None,
        }
    }
}

impl ClientConfig {
    /// Read `ROUTEMASTER_API_URL` and `ROUTEMASTER_TIMEOUT_SECS`, falling back
    /// to the defaults for unset variables.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ApiError> {
        let api_url = lookup(API_URL_VAR).unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let timeout = match lookup(TIMEOUT_VAR) {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| {
                    ApiError::InvalidConfig(format!("{TIMEOUT_VAR}={raw:?} is not a whole number of seconds"))
                })?;
                Some(Duration::from_secs(secs))
            }
            None => None,
        };
        Ok(Self { api_url, timeout })
    }

    /// Build a blocking API client over a fresh `ureq` agent.
    #[cfg(feature = "ureq")]
    pub fn connect(&self) -> Result<crate::RoutemasterApi<crate::UreqTransport>, ApiError> {
        crate::RoutemasterApi::new(&self.api_url, crate::UreqTransport::new(self.timeout))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.api_url, "http://localhost:2017");
    }

    #[test]
    fn reads_url_and_timeout() {
        let config = ClientConfig::from_lookup(lookup(&[
            (API_URL_VAR, "https://routemaster.example.com/"),
            (TIMEOUT_VAR, "15"),
        ]))
        .unwrap();
        assert_eq!(config.api_url, "https://routemaster.example.com/");
        assert_eq!(config.timeout, Some(Duration::from_secs(15)));
    }

    #[test]
    fn rejects_non_numeric_timeout() {
        let err = ClientConfig::from_lookup(lookup(&[(TIMEOUT_VAR, "soon")])).unwrap_err();
        assert!(matches!(err, ApiError::InvalidConfig(_)));
    }

    #[cfg(feature = "ureq")]
    #[test]
    fn connect_rejects_bad_url() {
        let config = ClientConfig {
            api_url: "::not-a-url".to_string(),
            timeout: None,
        };
        assert!(matches!(config.connect(), Err(ApiError::InvalidUrl(_))));
    }
}
