use secrecy::Secret;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use validator::Validate;

/// Upload ceiling for card images (16 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash-lite";

pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Clone, Validate)]
pub struct CardConfig {
    pub common: core_config::Config,
    #[validate(nested)]
    pub gemini: GeminiSettings,
    #[validate(nested)]
    pub upload: UploadConfig,
}

#[derive(Debug, Clone, Validate)]
pub struct GeminiSettings {
    /// Absent when neither `GEMINI_API_KEY` nor `GOOGLE_API_KEY` is set. The
    /// service still starts; extraction requests then fail as unconfigured.
    pub api_key: Option<Secret<String>>,
    #[validate(length(min = 1))]
    pub model: String,
    #[validate(length(min = 1))]
    pub api_base: String,
    /// Per-request timeout for the Gemini call. `None` waits indefinitely.
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Validate)]
pub struct UploadConfig {
    #[validate(range(min = 1))]
    pub max_bytes: usize,
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            common: core_config::Config::default(),
            gemini: GeminiSettings {
                api_key: None,
                model: DEFAULT_GEMINI_MODEL.to_string(),
                api_base: DEFAULT_GEMINI_API_BASE.to_string(),
                timeout_secs: None,
            },
            upload: UploadConfig {
                max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            },
        }
    }
}

impl CardConfig {
    pub fn load() -> Result<Self, AppError> {
        // Handles .env and APP__ prefixed variables
        let common_config = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        let config = CardConfig {
            common: common_config,
            gemini: GeminiSettings {
                api_key: optional_env("GEMINI_API_KEY")
                    .or_else(|| optional_env("GOOGLE_API_KEY"))
                    .map(Secret::new),
                model: get_env("GEMINI_MODEL", Some(DEFAULT_GEMINI_MODEL), is_prod)?,
                api_base: get_env("GEMINI_API_BASE", Some(DEFAULT_GEMINI_API_BASE), false)?,
                timeout_secs: optional_env("GEMINI_TIMEOUT_SECS")
                    .map(|v| parse_env("GEMINI_TIMEOUT_SECS", &v))
                    .transpose()?,
            },
            upload: UploadConfig {
                max_bytes: parse_env(
                    "CARD_MAX_UPLOAD_BYTES",
                    &get_env(
                        "CARD_MAX_UPLOAD_BYTES",
                        Some(&DEFAULT_MAX_UPLOAD_BYTES.to_string()),
                        false,
                    )?,
                )?,
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// True when a Gemini credential is available.
    pub fn has_credential(&self) -> bool {
        self.gemini.api_key.is_some()
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}

/// Unset and blank values are both treated as missing.
fn optional_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, value: &str) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| {
        AppError::ConfigError(anyhow::anyhow!("{} has invalid value '{}': {}", key, value, e))
    })
}
