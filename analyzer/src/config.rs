use crate::error::{AnalyzerError, Result};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_MAX_TOKENS: u32 = 2000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Runtime settings shared by the server and the command-line uploader.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub max_tokens: u32,
    /// `None` leaves upstream calls unbounded.
    pub request_timeout: Option<Duration>,
    pub bind_addr: String,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
}

impl Config {
    /// Loads `.env` (if present) and reads the process environment.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("ANTHROPIC_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                AnalyzerError::Config("ANTHROPIC_API_KEY environment variable not set".to_string())
            })?;

        let timeout_secs: u64 = parse_or(&lookup, "LLM_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
        let request_timeout = (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs));

        let base_url = lookup("ANTHROPIC_BASE_URL")
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            api_key,
            model: lookup("ANTHROPIC_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url,
            max_tokens: parse_or(&lookup, "ANTHROPIC_MAX_TOKENS", DEFAULT_MAX_TOKENS)?,
            request_timeout,
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            upload_dir: lookup("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(env::temp_dir),
            max_upload_bytes: parse_or(&lookup, "MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw.trim().parse().map_err(|_| {
            AnalyzerError::Config(format!("invalid value for {}: {}", key, raw))
        }),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_with_only_api_key() {
        let config = Config::from_lookup(lookup_from(&[("ANTHROPIC_API_KEY", "sk-ant-test")])).unwrap();

        assert_eq!(config.api_key, "sk-ant-test");
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.max_tokens, 2000);
        assert_eq!(config.request_timeout, Some(Duration::from_secs(120)));
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
    }

    #[test]
    fn test_missing_api_key_is_an_error() {
        let err = Config::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(err.to_string().contains("ANTHROPIC_API_KEY"));

        let err = Config::from_lookup(lookup_from(&[("ANTHROPIC_API_KEY", "  ")])).unwrap_err();
        assert!(matches!(err, AnalyzerError::Config(_)));
    }

    #[test]
    fn test_overrides_and_zero_timeout() {
        let config = Config::from_lookup(lookup_from(&[
            ("ANTHROPIC_API_KEY", "key"),
            ("ANTHROPIC_BASE_URL", "http://127.0.0.1:9999/"),
            ("ANTHROPIC_MAX_TOKENS", "512"),
            ("LLM_TIMEOUT_SECS", "0"),
            ("UPLOAD_DIR", "/var/tmp/uploads"),
        ]))
        .unwrap();

        assert_eq!(config.base_url, "http://127.0.0.1:9999");
        assert_eq!(config.max_tokens, 512);
        assert_eq!(config.request_timeout, None);
        assert_eq!(config.upload_dir, PathBuf::from("/var/tmp/uploads"));
    }

    #[test]
    fn test_invalid_number_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[
            ("ANTHROPIC_API_KEY", "key"),
            ("ANTHROPIC_MAX_TOKENS", "lots"),
        ]))
        .unwrap_err();

        assert_eq!(err.to_string(), "configuration error: invalid value for ANTHROPIC_MAX_TOKENS: lots");
    }
}
