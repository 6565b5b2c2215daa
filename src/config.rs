use anyhow::{Context, Result, anyhow};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: String,
    /// Single base URL of the attendance backend, e.g. `http://localhost:5001`
    pub api_base_url: String,
    pub api_prefix: String,

    pub session_secret: String,
    pub session_ttl: usize,
    pub secure_cookies: bool,

    pub request_timeout: Duration,
    pub scan_timeout: Duration,
    pub notification_poll: Duration,
    pub camera_switch_delay: Duration,
    pub jpeg_quality: u8,
    pub stats_cache_ttl: Duration,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_scan_per_min: u32,
    pub rate_protected_per_min: u32,
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_or<T>(key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = var_or(key, default);
    raw.trim()
        .parse::<T>()
        .map_err(|e| anyhow!("{key} has invalid value {raw:?}: {e}"))
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let api_base_url = var_or("API_BASE_URL", "http://localhost:5001")
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            server_addr: var_or("SERVER_ADDR", "127.0.0.1:8080"),
            api_base_url,
            api_prefix: var_or("API_PREFIX", "/api"),

            session_secret: env::var("SESSION_SECRET").context("SESSION_SECRET must be set")?,
            session_ttl: parse_or("SESSION_TTL", "43200")?, // 12h
            secure_cookies: parse_or("SECURE_COOKIES", "false")?,

            request_timeout: Duration::from_secs(parse_or("REQUEST_TIMEOUT_SECS", "15")?),
            scan_timeout: Duration::from_secs(parse_or("SCAN_TIMEOUT_SECS", "20")?),
            notification_poll: Duration::from_secs(parse_or("NOTIFICATION_POLL_SECS", "30")?),
            camera_switch_delay: Duration::from_millis(parse_or("CAMERA_SWITCH_DELAY_MS", "200")?),
            jpeg_quality: parse_or("JPEG_QUALITY", "85")?,
            stats_cache_ttl: Duration::from_secs(parse_or("STATS_CACHE_TTL_SECS", "60")?),

            rate_login_per_min: parse_or("RATE_LOGIN_PER_MIN", "60")?,
            rate_scan_per_min: parse_or("RATE_SCAN_PER_MIN", "120")?,
            rate_protected_per_min: parse_or("RATE_PROTECTED_PER_MIN", "1000")?,
        })
    }

    /// Settings used by handler tests; points at `api_base_url`.
    #[cfg(test)]
    pub fn for_tests(api_base_url: &str) -> Self {
        Self {
            server_addr: "127.0.0.1:0".into(),
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            api_prefix: "/api".into(),
            session_secret: "test-secret".into(),
            session_ttl: 3600,
            secure_cookies: false,
            request_timeout: Duration::from_secs(5),
            scan_timeout: Duration::from_secs(5),
            notification_poll: Duration::from_secs(30),
            camera_switch_delay: Duration::from_millis(1),
            jpeg_quality: 85,
            stats_cache_ttl: Duration::from_secs(60),
            rate_login_per_min: 1000,
            rate_scan_per_min: 1000,
            rate_protected_per_min: 1000,
        }
    }
}
