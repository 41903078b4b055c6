//! Service configuration and the settings boundary it is read from

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use serde::{Deserialize, Serialize};
use log::debug;

use crate::error::Error;

pub const DEFAULT_BASE_URL: &str
  = "https://api.morphllm.com/v1";
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

pub const SETTING_ENABLED: &str = "morph.enabled";
pub const SETTING_API_KEY: &str = "morph.apiKey";
pub const SETTING_BASE_URL: &str = "morph.baseUrl";
pub const SETTING_TIMEOUT_MS: &str = "morph.timeoutMs";

/// Read-only view of an external settings store
pub trait SettingsSource
{   fn get(&self, key: &str) -> Option<String>;
}

impl SettingsSource for HashMap<String, String>
{   fn get(&self, key: &str) -> Option<String>
    {   HashMap::get(self, key).cloned()
    }
}

/// Settings read from `MORPH_*` environment variables
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSettings;

impl EnvSettings
{   fn var_name(key: &str) -> Option<&'static str>
    {   match key
        {   SETTING_ENABLED => Some("MORPH_ENABLED")
          , SETTING_API_KEY => Some("MORPH_API_KEY")
          , SETTING_BASE_URL => Some("MORPH_BASE_URL")
          , SETTING_TIMEOUT_MS => Some("MORPH_TIMEOUT_MS")
          , _ => None
        }
    }
}

impl SettingsSource for EnvSettings
{   fn get(&self, key: &str) -> Option<String>
    {   Self::var_name(key)
          .and_then(|name| std::env::var(name).ok())
    }
}

/// Connection settings for the completion service
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceConfig
{   /// Bearer credential
    pub api_key: String
  , /// API base URL, without trailing slash
    #[serde(default = "default_base_url")]
    pub base_url: String
  , /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64
}

fn default_base_url() -> String
{   DEFAULT_BASE_URL.to_string()
}

fn default_timeout_ms() -> u64
{   DEFAULT_TIMEOUT_MS
}

impl ServiceConfig
{   /// Config with default endpoint and timeout
    pub fn new(api_key: impl Into<String>) -> Self
    {   ServiceConfig
        {   api_key: api_key.into()
          , base_url: default_base_url()
          , timeout_ms: DEFAULT_TIMEOUT_MS
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>)
      -> Self
    {   self.base_url = base_url.into()
          .trim_end_matches('/')
          .to_string();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self
    {   self.timeout_ms = timeout_ms;
        self
    }

    pub fn timeout(&self) -> Duration
    {   Duration::from_millis(self.timeout_ms)
    }

    /// Build a config from settings, ignoring the enabled flag
    pub fn resolve(source: &dyn SettingsSource)
      -> Result<Self, Error>
    {   let api_key = source.get(SETTING_API_KEY)
          .filter(|k| !k.trim().is_empty())
          .ok_or_else(|| {
            Error::InvalidConfiguration(
              format!("{} is not set", SETTING_API_KEY)
            )
          })?;

        let mut config = ServiceConfig::new(api_key.trim());

        if let Some(url) = source.get(SETTING_BASE_URL)
        {   let url = url.trim();
            if !url.is_empty()
            {   if !url.starts_with("http://")
                  && !url.starts_with("https://")
                {   return Err(Error::InvalidConfiguration(
                      format!("{} must be an http(s) URL: {}"
                      , SETTING_BASE_URL, url)
                    ));
                }
                config = config.with_base_url(url);
            }
        }

        if let Some(raw) = source.get(SETTING_TIMEOUT_MS)
        {   let timeout_ms = raw.trim().parse::<u64>()
              .ok()
              .filter(|ms| *ms > 0)
              .ok_or_else(|| {
                Error::InvalidConfiguration(
                  format!("{} must be a positive integer: {}"
                  , SETTING_TIMEOUT_MS, raw)
                )
              })?;
            config = config.with_timeout_ms(timeout_ms);
        }

        debug!("Resolved service config: {:?}", config);
        Ok(config)
    }

    /// Build a config only when the feature is enabled
    pub fn from_settings(source: &dyn SettingsSource)
      -> Result<Option<Self>, Error>
    {   if !is_enabled(source)
        {   debug!("Fast apply disabled in settings");
            return Ok(None);
        }
        Self::resolve(source).map(Some)
    }
}

fn is_enabled(source: &dyn SettingsSource) -> bool
{   source.get(SETTING_ENABLED)
      .map(|v| matches!(
        v.trim().to_ascii_lowercase().as_str()
      , "true" | "1" | "yes"
      ))
      .unwrap_or(false)
}

impl fmt::Debug for ServiceConfig
{   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {   let key = if self.api_key.is_empty()
        {   "<empty>"
        } else
        {   "<set>"
        };
        f.debug_struct("ServiceConfig")
          .field("api_key", &key)
          .field("base_url", &self.base_url)
          .field("timeout_ms", &self.timeout_ms)
          .finish()
    }
}

#[cfg(test)]
mod tests
{   use super::*;

    fn settings(pairs: &[(&str, &str)]) -> HashMap<String, String>
    {   pairs.iter()
          .map(|(k, v)| (k.to_string(), v.to_string()))
          .collect()
    }

    #[test]
    fn defaults_apply_when_only_key_is_set()
    {   let src = settings(&[(SETTING_API_KEY, "sk-1")]);
        let config = ServiceConfig::resolve(&src).unwrap();
        assert_eq!(config.api_key, "sk-1");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout_ms, 30_000);
    }

    #[test]
    fn overrides_are_applied()
    {   let src = settings(&[
          (SETTING_API_KEY, "sk-1")
        , (SETTING_BASE_URL, "http://localhost:9000/v1/")
        , (SETTING_TIMEOUT_MS, "500")
        ]);
        let config = ServiceConfig::resolve(&src).unwrap();
        assert_eq!(config.base_url, "http://localhost:9000/v1");
        assert_eq!(config.timeout(), Duration::from_millis(500));
    }

    #[test]
    fn blank_key_is_rejected()
    {   let src = settings(&[(SETTING_API_KEY, "   ")]);
        assert!(matches!(
          ServiceConfig::resolve(&src)
        , Err(Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn bad_timeout_and_url_are_rejected()
    {   let src = settings(&[
          (SETTING_API_KEY, "sk-1")
        , (SETTING_TIMEOUT_MS, "0")
        ]);
        assert!(ServiceConfig::resolve(&src).is_err());

        let src = settings(&[
          (SETTING_API_KEY, "sk-1")
        , (SETTING_BASE_URL, "ftp://example.com")
        ]);
        assert!(ServiceConfig::resolve(&src).is_err());
    }

    #[test]
    fn disabled_feature_yields_no_config()
    {   let src = settings(&[(SETTING_API_KEY, "sk-1")]);
        assert_eq!(ServiceConfig::from_settings(&src), Ok(None));

        let src = settings(&[
          (SETTING_ENABLED, "TRUE")
        , (SETTING_API_KEY, "sk-1")
        ]);
        assert!(matches!(
          ServiceConfig::from_settings(&src)
        , Ok(Some(_))
        ));
    }

    #[test]
    fn debug_output_redacts_key()
    {   let rendered = format!("{:?}", ServiceConfig::new("sk-secret"));
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("<set>"));
    }

    #[test]
    fn deserializes_with_defaults()
    {   let config: ServiceConfig
          = serde_json::from_str(r#"{"api_key":"sk-1"}"#).unwrap();
        assert_eq!(config, ServiceConfig::new("sk-1"));
    }
}
