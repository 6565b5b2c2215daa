use moka::Expiry;
use moka::future::Cache;
use once_cell::sync::Lazy;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Keeps a revoked jti until the token itself would have expired.
struct UntilTokenExpiry;

impl Expiry<String, u64> for UntilTokenExpiry {
    fn expire_after_create(&self, _jti: &String, exp: &u64, _created_at: Instant) -> Option<Duration> {
        Some(Duration::from_secs(exp.saturating_sub(unix_now())))
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// jti of every session logged out before it expired, mapped to its `exp`.
static REVOKED_SESSIONS: Lazy<Cache<String, u64>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(100_000)
        .expire_after(UntilTokenExpiry)
        .build()
});

pub async fn revoke(jti: &str, exp: u64) {
    REVOKED_SESSIONS.insert(jti.to_string(), exp).await;
    log::info!("session {} revoked until {}", jti, exp);
}

pub async fn is_revoked(jti: &str) -> bool {
    REVOKED_SESSIONS.get(jti).await.is_some()
}
