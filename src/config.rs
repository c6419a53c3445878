// Runtime configuration loaded from the process environment (.env supported)

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_MAX_BET: i64 = 10_000;
pub const DEFAULT_AUTOSAVE_SECS: u64 = 3;
pub const DEFAULT_SESSION_TTL_SECS: u64 = 900;

#[derive(Debug, Clone)]
pub struct Config {
    /// Shared secret the chat gateway presents on admin routes
    pub bot_token: Option<String>,
    pub balances_file: PathBuf,
    pub transactions_file: PathBuf,
    pub max_bet: i64,
    pub autosave_interval: Duration,
    pub session_ttl: Duration,
    pub bind_addr: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bot_token: None,
            balances_file: PathBuf::from("balances.json"),
            transactions_file: PathBuf::from("transactions.json"),
            max_bet: DEFAULT_MAX_BET,
            autosave_interval: Duration::from_secs(DEFAULT_AUTOSAVE_SECS),
            session_ttl: Duration::from_secs(DEFAULT_SESSION_TTL_SECS),
            bind_addr: "0.0.0.0:1234".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup; unset or unparseable values keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let bot_token = lookup("BOT_TOKEN").filter(|t| !t.trim().is_empty());
        if bot_token.is_none() {
            warn!("BOT_TOKEN not set; admin routes will reject every request");
        }

        Self {
            bot_token,
            balances_file: lookup("BALANCES_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.balances_file),
            transactions_file: lookup("TRANSACTIONS_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.transactions_file),
            max_bet: parse_or(&lookup, "MAX_BET", defaults.max_bet),
            autosave_interval: Duration::from_secs(parse_or(
                &lookup,
                "AUTOSAVE_INTERVAL_SECS",
                DEFAULT_AUTOSAVE_SECS,
            )),
            session_ttl: Duration::from_secs(parse_or(
                &lookup,
                "SESSION_TTL_SECS",
                DEFAULT_SESSION_TTL_SECS,
            )),
            bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Copy + std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => match raw.trim().parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                warn!("{} has invalid value {:?}, using default {}", key, raw, default);
                default
            }
        },
        None => default,
    }
}
