use anyhow::{Ok, Result};

use crate::config::{config_model::DotEnvyConfig, stage::Stage};

use super::config_model::ProviderEndpoint;

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let server = super::config_model::Server {
        port: std::env::var("SERVER_PORT")
            .expect("SERVER_PORT is invalid")
            .parse()?,
        body_limit: std::env::var("SERVER_BODY_LIMIT")
            .expect("SERVER_BODY_LIMIT is invalid")
            .parse()?,
        timeout: std::env::var("SERVER_TIMEOUT")
            .expect("SERVER_TIMEOUT is invalid")
            .parse()?,
    };

    let credits = super::config_model::Credits {
        initial_grant: env_or("INITIAL_CREDIT_GRANT", 20),
    };

    let dispatch = super::config_model::Dispatch {
        attempt_timeout_secs: env_or("DISPATCH_ATTEMPT_TIMEOUT_SECS", 30),
        poll_timeout_secs: env_or("DISPATCH_POLL_TIMEOUT_SECS", 10),
        max_poll_attempts: env_or("DISPATCH_MAX_POLL_ATTEMPTS", 60),
        max_poll_window_secs: env_or("DISPATCH_MAX_POLL_WINDOW_SECS", 600),
    };

    let providers = super::config_model::Providers {
        flux: provider_endpoint("FLUX", "https://queue.fal.run"),
        stability: provider_endpoint("STABILITY", "https://api.stability.ai"),
        veo: provider_endpoint("VEO", "https://generativelanguage.googleapis.com"),
        luma: provider_endpoint("LUMA", "https://api.lumalabs.ai"),
    };

    Ok(DotEnvyConfig {
        server,
        credits,
        dispatch,
        providers,
    })
}

pub fn get_stage() -> Stage {
    dotenvy::dotenv().ok();

    let stage_str = std::env::var("STAGE").unwrap_or("".to_string());
    Stage::try_from(&stage_str).unwrap_or_default()
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

fn provider_endpoint(prefix: &str, default_base_url: &str) -> ProviderEndpoint {
    ProviderEndpoint {
        base_url: std::env::var(format!("{}_BASE_URL", prefix))
            .unwrap_or_else(|_| default_base_url.to_string()),
        api_key: std::env::var(format!("{}_API_KEY", prefix)).unwrap_or_default(),
    }
}
