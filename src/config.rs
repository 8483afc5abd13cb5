//! Configuration Module
//!
//! Handles loading server configuration from environment variables.

use std::env;
use std::time::Duration;

use tracing::warn;

use crate::cache::EvictionStrategy;
use crate::error::ConfigError;

/// Token used when `VIBE_AUTH_TOKEN` is unset.
pub const DEFAULT_AUTH_TOKEN: &str = "default-secret-token";

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of entries the cache can hold
    pub capacity: usize,
    /// Cache-wide entry lifetime
    pub expiration: Duration,
    /// Eviction policy
    pub strategy: EvictionStrategy,
    /// HTTP server port
    pub server_port: u16,
    /// Bearer token required on cache endpoints
    pub auth_token: String,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `VIBE_CACHE_CAPACITY` - Maximum cache entries (default: 1000)
    /// - `VIBE_CACHE_EXPIRATION` - Entry lifetime, e.g. `500ms`, `1.5s`, `1m30s` (default: 10s)
    /// - `VIBE_EVICTION_STRATEGY` - `lru` or `lfu` (default: lru)
    /// - `VIBE_PORT` - HTTP server port (default: 8080)
    /// - `VIBE_AUTH_TOKEN` - Bearer token (default: a fixed token, with a warning)
    ///
    /// Unparseable values fall back to their default.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let expiration = match env::var("VIBE_CACHE_EXPIRATION") {
            Ok(raw) => parse_duration(&raw).unwrap_or_else(|err| {
                warn!(%err, "falling back to default expiration");
                defaults.expiration
            }),
            Err(_) => defaults.expiration,
        };

        let strategy = match env::var("VIBE_EVICTION_STRATEGY") {
            Ok(raw) => raw.parse().unwrap_or_else(|err| {
                warn!(%err, "falling back to default eviction strategy");
                defaults.strategy
            }),
            Err(_) => defaults.strategy,
        };

        let auth_token = match env::var("VIBE_AUTH_TOKEN") {
            Ok(token) if !token.is_empty() => token,
            _ => {
                warn!("No auth token provided, using default token");
                defaults.auth_token
            }
        };

        Self {
            capacity: env::var("VIBE_CACHE_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.capacity),
            expiration,
            strategy,
            server_port: env::var("VIBE_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
            auth_token,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: 1000,
            expiration: Duration::from_secs(10),
            strategy: EvictionStrategy::Lru,
            server_port: 8080,
            auth_token: DEFAULT_AUTH_TOKEN.to_string(),
        }
    }
}

// == Duration Parsing ==
const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Unit suffixes and their length in nanoseconds.
const UNITS: [(&str, u128); 7] = [
    ("ns", 1),
    ("us", 1_000),
    ("µs", 1_000),
    ("ms", 1_000_000),
    ("s", NANOS_PER_SEC),
    ("m", 60 * NANOS_PER_SEC),
    ("h", 3_600 * NANOS_PER_SEC),
];

/// Fraction digits beyond this are dropped; they are below nanosecond precision.
const MAX_FRACTION_DIGITS: usize = 18;

/// Parses Go-style durations: one or more `<number><unit>` segments such as
/// `250ms`, `1.5s` or `1h30m`, with units `ns`, `us`/`µs`, `ms`, `s`, `m`, `h`.
/// A bare number is seconds. Negative durations are rejected.
pub fn parse_duration(raw: &str) -> std::result::Result<Duration, ConfigError> {
    let raw = raw.trim();
    let invalid = || ConfigError::InvalidDuration(raw.to_string());

    let body = raw.strip_prefix('+').unwrap_or(raw);
    if body.is_empty() {
        return Err(invalid());
    }
    if body.bytes().all(|b| b.is_ascii_digit()) {
        return body
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| invalid());
    }

    let mut total: u128 = 0;
    let mut rest = body;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let (number, tail) = rest.split_at(number_len);
        let unit_len = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_len);

        let scale = UNITS
            .iter()
            .find(|(name, _)| *name == unit)
            .map(|(_, scale)| *scale)
            .ok_or_else(invalid)?;
        let nanos = segment_nanos(number, scale).ok_or_else(invalid)?;
        total = total.checked_add(nanos).ok_or_else(invalid)?;
        rest = tail;
    }

    let secs = u64::try_from(total / NANOS_PER_SEC).map_err(|_| invalid())?;
    // remainder is below one second
    let nanos = (total % NANOS_PER_SEC) as u32;
    Ok(Duration::new(secs, nanos))
}

/// `number` (`12`, `1.5`, `.5`, `3.`) times `scale` nanoseconds.
fn segment_nanos(number: &str, scale: u128) -> Option<u128> {
    let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    if !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let whole: u128 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let mut nanos = whole.checked_mul(scale)?;

    let fraction = &fraction[..fraction.len().min(MAX_FRACTION_DIGITS)];
    if !fraction.is_empty() {
        let digits: u128 = fraction.parse().ok()?;
        let divisor = 10u128.pow(fraction.len() as u32);
        nanos = nanos.checked_add(digits * scale / divisor)?;
    }
    Some(nanos)
}
