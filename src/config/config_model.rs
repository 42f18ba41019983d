#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub server: Server,
    pub credits: Credits,
    pub dispatch: Dispatch,
    pub providers: Providers,
}

#[derive(Debug, Clone)]
pub struct Server {
    pub port: u16,
    pub body_limit: u64,
    pub timeout: u64,
}

#[derive(Debug, Clone)]
pub struct Credits {
    pub initial_grant: i64,
}

/// Bounds for the background dispatch and the deferred-poll state machine.
/// Open-ended polling is disallowed; whichever bound trips first forces the
/// job to fail.
#[derive(Debug, Clone)]
pub struct Dispatch {
    pub attempt_timeout_secs: u64,
    pub poll_timeout_secs: u64,
    pub max_poll_attempts: i32,
    pub max_poll_window_secs: u64,
}

#[derive(Debug, Clone)]
pub struct Providers {
    pub flux: ProviderEndpoint,
    pub stability: ProviderEndpoint,
    pub veo: ProviderEndpoint,
    pub luma: ProviderEndpoint,
}

/// An empty api_key is a valid configuration: the adapter faults on use and
/// the chain falls through to the next provider.
#[derive(Debug, Clone)]
pub struct ProviderEndpoint {
    pub base_url: String,
    pub api_key: String,
}
