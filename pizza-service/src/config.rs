use anyhow::{Context, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub jwt_secret: String,
    pub token_ttl_seconds: i64,
    pub default_page_limit: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "dev-secret-change-me".to_string(),
            token_ttl_seconds: 86_400,
            default_page_limit: 10,
        }
    }
}

pub fn load_service_config() -> Result<ServiceConfig> {
    let defaults = ServiceConfig::default();

    let jwt_secret = env::var("JWT_SECRET").unwrap_or(defaults.jwt_secret);

    let token_ttl_seconds = env::var("TOKEN_TTL_SECONDS")
        .ok()
        .map(|value| value.trim().parse::<i64>())
        .transpose()
        .context("Failed to parse TOKEN_TTL_SECONDS")?
        .unwrap_or(defaults.token_ttl_seconds);

    let default_page_limit = env::var("LIST_PAGE_LIMIT")
        .ok()
        .map(|value| value.trim().parse::<usize>())
        .transpose()
        .context("Failed to parse LIST_PAGE_LIMIT")?
        .unwrap_or(defaults.default_page_limit);

    Ok(ServiceConfig {
        jwt_secret,
        token_ttl_seconds,
        default_page_limit,
    })
}
