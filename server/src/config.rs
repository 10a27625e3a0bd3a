//! Runtime configuration for the Pong server.

use once_cell::sync::Lazy;
use std::env;

#[derive(Debug)]
pub struct Settings {
    pub database_url: String,
    pub max_connections: u32,
    pub redis_url: String,
    pub server_addr: String,
    /// HS256 signing secret for access tokens.
    pub jwt_secret: String,
    /// Access-token lifetime (minutes).
    pub access_token_minutes: i64,
    /// Refresh-token TTL in Redis (seconds).
    pub refresh_token_secs: u64,
    /// How many player profiles one account may own.
    pub max_players_per_user: i64,
    pub bcrypt_cost: u32,
    /// Where finished tournaments are relayed for on-chain recording.
    /// `None` disables recording.
    pub chain_relay_url: Option<String>,
}

fn parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl Settings {
    fn from_env() -> Self {
        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            log::warn!("JWT_SECRET not set; using an insecure development secret");
            "pong-dev-secret".into()
        });

        Settings {
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://pong.db".into()),
            max_connections: parsed("DATABASE_MAX_CONNECTIONS", 5),
            redis_url: env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1/".into()),
            server_addr: env::var("SERVER_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".into()),
            jwt_secret,
            access_token_minutes: parsed("ACCESS_TOKEN_MINUTES", 15),
            refresh_token_secs: parsed("REFRESH_TOKEN_SECS", 30 * 24 * 3_600),
            max_players_per_user: parsed("MAX_PLAYERS_PER_USER", 8),
            bcrypt_cost: parsed("BCRYPT_COST", bcrypt::DEFAULT_COST),
            chain_relay_url: env::var("CHAIN_RELAY_URL").ok().filter(|v| !v.is_empty()),
        }
    }
}

static SETTINGS: Lazy<Settings> = Lazy::new(Settings::from_env);

pub fn settings() -> &'static Settings {
    &SETTINGS
}
