//! Metadata provider preflight check.

use super::CheckResult;
use crate::models::config::{Config, ProviderKind};
use crate::services::build_provider;

/// Check that the configured provider is reachable and accepts the key.
pub async fn check(config: &Config) -> CheckResult {
    let name = match config.provider {
        ProviderKind::Tmdb => "TMDB API",
        ProviderKind::Omdb => "OMDb API",
    };
    let env_var = match config.provider {
        ProviderKind::Tmdb => "TMDB_API_KEY",
        ProviderKind::Omdb => "OMDB_API_KEY",
    };

    let provider = match build_provider(config) {
        Ok(provider) => provider,
        Err(_) => {
            return CheckResult::fail(
                name,
                "API key not configured",
                &format!("Set {} or the api_key entry in config.toml", env_var),
            )
        }
    };

    match provider.verify_credentials().await {
        Ok(true) => CheckResult::ok(name, "connected"),
        Ok(false) => CheckResult::fail(
            name,
            "invalid API key",
            &format!("Check your {} environment variable", env_var),
        ),
        Err(e) if e.is_transient() => CheckResult::fail(
            name,
            "connection failed",
            "Check your network connection",
        ),
        Err(e) => CheckResult::fail(name, &e.to_string(), "Check your provider settings"),
    }
}
