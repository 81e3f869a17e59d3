use secrecy::Secret;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Hosted text-to-text model used when `INFERENCE_ENDPOINT` is not set.
pub const DEFAULT_INFERENCE_ENDPOINT: &str =
    "https://api-inference.huggingface.co/models/google/flan-t5-base";

/// Upper bound on a single inference call.
pub const DEFAULT_INFERENCE_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub common: core_config::Config,
    pub inference: InferenceConfig,
    pub catalog: CatalogConfig,
    pub static_assets: StaticAssetsConfig,
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone)]
pub struct InferenceConfig {
    pub endpoint: String,
    /// Bearer token; public models accept anonymous low-volume traffic.
    pub api_token: Option<Secret<String>>,
    pub timeout_secs: u64,
}

impl InferenceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct StaticAssetsConfig {
    /// Directory holding the built client bundle.
    pub dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
}

impl RelayConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        Ok(RelayConfig {
            common: common_config,
            inference: InferenceConfig {
                endpoint: get_env("INFERENCE_ENDPOINT", Some(DEFAULT_INFERENCE_ENDPOINT), is_prod)?,
                api_token: env::var("INFERENCE_API_TOKEN")
                    .ok()
                    .filter(|t| !t.is_empty())
                    .map(Secret::new),
                timeout_secs: get_env(
                    "INFERENCE_TIMEOUT_SECS",
                    Some(&DEFAULT_INFERENCE_TIMEOUT_SECS.to_string()),
                    false,
                )?
                .parse()
                .map_err(|e| {
                    AppError::ConfigError(anyhow::anyhow!("INFERENCE_TIMEOUT_SECS: {}", e))
                })?,
            },
            catalog: CatalogConfig {
                path: get_env("CATALOG_PATH", Some("data/movies.json"), is_prod)?.into(),
            },
            static_assets: StaticAssetsConfig {
                dir: get_env("STATIC_DIR", Some("client/build"), false)?.into(),
            },
            observability: ObservabilityConfig {
                log_level: get_env("LOG_LEVEL", Some("info"), false)?,
                otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|e| !e.is_empty()),
            },
        })
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_env_falls_back_to_default_outside_prod() {
        let value = get_env("KINO_TEST_UNSET_VARIABLE", Some("fallback"), false).unwrap();
        assert_eq!(value, "fallback");
    }

    #[test]
    fn get_env_requires_value_in_prod() {
        let err = get_env("KINO_TEST_UNSET_VARIABLE", Some("fallback"), true).unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));
    }

    #[test]
    fn timeout_is_expressed_in_seconds() {
        let config = InferenceConfig {
            endpoint: DEFAULT_INFERENCE_ENDPOINT.to_string(),
            api_token: None,
            timeout_secs: DEFAULT_INFERENCE_TIMEOUT_SECS,
        };
        assert_eq!(config.timeout(), Duration::from_secs(60));
    }
}
