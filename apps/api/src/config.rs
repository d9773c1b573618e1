use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};

use crate::llm_client::{LlmProvider, LlmSettings};
use crate::screening::pipeline::InputLimits;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_REPORTS_DIR: &str = "reports";
const DEFAULT_RESUME_MAX_CHARS: usize = 5000;
const DEFAULT_JD_MAX_CHARS: usize = 3000;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Fails at startup if the selected provider's credentials are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub llm: LlmSettings,
    pub port: u16,
    /// `tracing_subscriber::EnvFilter` directives.
    pub rust_log: String,
    pub reports_dir: PathBuf,
    pub resume_max_chars: usize,
    pub jd_max_chars: usize,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let provider: LlmProvider = match get("LLM_PROVIDER") {
            Some(name) => name.parse().context("LLM_PROVIDER is invalid")?,
            None => LlmProvider::Anthropic,
        };

        let api_key = match provider.api_key_var() {
            Some(var) => Some(get(var).ok_or_else(|| {
                anyhow!("Required environment variable '{var}' is not set for provider '{provider}'")
            })?),
            None => None,
        };

        Ok(Config {
            llm: LlmSettings {
                provider,
                model: get("LLM_MODEL").unwrap_or_else(|| provider.default_model().to_string()),
                base_url: get("LLM_BASE_URL")
                    .unwrap_or_else(|| provider.default_base_url().to_string()),
                api_key,
            },
            port: parse_or(&get, "PORT", DEFAULT_PORT)?,
            rust_log: get("RUST_LOG")
                .unwrap_or_else(|| format!("{}=info", env!("CARGO_PKG_NAME"))),
            reports_dir: get("REPORTS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_REPORTS_DIR)),
            resume_max_chars: parse_or(&get, "RESUME_MAX_CHARS", DEFAULT_RESUME_MAX_CHARS)?,
            jd_max_chars: parse_or(&get, "JD_MAX_CHARS", DEFAULT_JD_MAX_CHARS)?,
            max_upload_bytes: parse_or(&get, "MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
        })
    }

    pub fn input_limits(&self) -> InputLimits {
        InputLimits {
            resume_max_chars: self.resume_max_chars,
            jd_max_chars: self.jd_max_chars,
        }
    }
}

fn parse_or<T>(get: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow!("{key} must be a valid number: {e}")),
        None => Ok(default),
    }
}
