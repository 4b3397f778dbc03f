//! Environment-driven configuration.
//!
//! Values are read from raw environment variables (figment lower-cases the keys),
//! so `CACHE_TTL=12h` lands in [`Config::cache_ttl`]. Durations accept either a
//! bare number of seconds or a human string understood by `fundu`.

use figment::{Figment, providers::Env};
use serde::{Deserialize, Deserializer};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Bearer credential for the pricing API. Optional at startup; searches fail without it.
    #[serde(default)]
    pub kicksdb_key: Option<String>,
    #[serde(default = "default_base_url")]
    pub kicksdb_base_url: String,

    #[serde(
        default = "default_cache_ttl",
        deserialize_with = "deserialize_duration"
    )]
    pub cache_ttl: Duration,
    #[serde(
        default = "default_upstream_timeout",
        deserialize_with = "deserialize_duration"
    )]
    pub upstream_timeout: Duration,
    #[serde(
        default = "default_shutdown_timeout",
        deserialize_with = "deserialize_duration"
    )]
    pub shutdown_timeout: Duration,

    #[serde(default = "default_min_query_length")]
    pub min_query_length: usize,
    #[serde(default = "default_limit")]
    pub default_limit: u32,
    #[serde(default = "default_max_limit")]
    pub max_limit: u32,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn load() -> Result<Self, figment::Error> {
        Self::from_figment(Figment::new().merge(Env::raw()))
    }

    pub fn from_figment(figment: Figment) -> Result<Self, figment::Error> {
        let mut config: Config = figment.extract()?;
        // An empty `KICKSDB_KEY=` counts as unset.
        config.kicksdb_key = config
            .kicksdb_key
            .take()
            .map(|k| k.trim().to_owned())
            .filter(|k| !k.is_empty());

        if config.max_limit == 0 {
            return Err(figment::Error::from("MAX_LIMIT must be at least 1".to_owned()));
        }
        if config.default_limit > config.max_limit {
            return Err(figment::Error::from(format!(
                "DEFAULT_LIMIT ({}) must not exceed MAX_LIMIT ({})",
                config.default_limit, config.max_limit
            )));
        }
        Ok(config)
    }
}

fn default_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_owned()
}

fn default_base_url() -> String {
    "https://api.kicks.dev".to_owned()
}

fn default_cache_ttl() -> Duration {
    Duration::from_secs(12 * 60 * 60)
}

fn default_upstream_timeout() -> Duration {
    Duration::from_secs(15)
}

fn default_shutdown_timeout() -> Duration {
    Duration::from_secs(8)
}

fn default_min_query_length() -> usize {
    3
}

fn default_limit() -> u32 {
    20
}

fn default_max_limit() -> u32 {
    30
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{Error, Visitor};
    use std::fmt;

    struct DurationVisitor;

    impl Visitor<'_> for DurationVisitor {
        type Value = Duration;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a number of seconds or a duration string like \"12h\"")
        }

        fn visit_u64<E: Error>(self, v: u64) -> Result<Duration, E> {
            Ok(Duration::from_secs(v))
        }

        fn visit_i64<E: Error>(self, v: i64) -> Result<Duration, E> {
            u64::try_from(v)
                .map(Duration::from_secs)
                .map_err(|_| E::custom(format!("duration cannot be negative: {v}")))
        }

        fn visit_str<E: Error>(self, v: &str) -> Result<Duration, E> {
            let parsed = fundu::DurationParser::with_all_time_units()
                .parse(v.trim())
                .map_err(|e| E::custom(format!("invalid duration '{v}': {e}")))?;
            Duration::try_from(parsed).map_err(|e| E::custom(format!("invalid duration '{v}': {e}")))
        }
    }

    deserializer.deserialize_any(DurationVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::providers::Serialized;

    fn load(pairs: &[(&str, serde_json::Value)]) -> Config {
        let mut figment = Figment::new();
        for (key, value) in pairs {
            figment = figment.merge(Serialized::default(key, value.clone()));
        }
        Config::from_figment(figment).unwrap()
    }

    #[test]
    fn defaults_apply_when_environment_is_empty() {
        let config = load(&[]);
        assert_eq!(config.port, 3000);
        assert_eq!(config.cache_ttl, Duration::from_secs(43_200));
        assert_eq!(config.min_query_length, 3);
        assert_eq!(config.default_limit, 20);
        assert_eq!(config.max_limit, 30);
        assert!(config.kicksdb_key.is_none());
    }

    #[test]
    fn durations_accept_strings_and_seconds() {
        let config = load(&[
            ("cache_ttl", serde_json::json!("90m")),
            ("upstream_timeout", serde_json::json!(20)),
        ]);
        assert_eq!(config.cache_ttl, Duration::from_secs(90 * 60));
        assert_eq!(config.upstream_timeout, Duration::from_secs(20));
    }

    #[test]
    fn blank_credential_is_treated_as_missing() {
        let config = load(&[("kicksdb_key", serde_json::json!("   "))]);
        assert!(config.kicksdb_key.is_none());
    }

    #[test]
    fn limits_that_cannot_be_satisfied_are_rejected() {
        let zero_max = Figment::new().merge(Serialized::default("max_limit", 0));
        let err = Config::from_figment(zero_max).unwrap_err();
        assert!(err.to_string().contains("MAX_LIMIT"));

        let inverted = Figment::new()
            .merge(Serialized::default("default_limit", 40))
            .merge(Serialized::default("max_limit", 30));
        assert!(Config::from_figment(inverted).is_err());

        let config = load(&[
            ("default_limit", serde_json::json!(5)),
            ("max_limit", serde_json::json!(5)),
        ]);
        assert_eq!(config.max_limit, 5);
    }
}
