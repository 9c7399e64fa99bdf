use std::env;

use chrono::{Duration, Utc};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Token settings handed to the token maker at startup.
pub struct TokenConfig {
    /// Raw symmetric key; the token maker insists on exactly 32 bytes.
    pub symmetric_key: String,
    pub access_token_duration: Duration,
}

pub struct Config {
    pub app_env: String,
    pub database_url: String,
    pub server_port: u16,
    pub server_host: String,
    pub cors_allowed_origin: String,
    pub token: TokenConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let server_port = match env::var("SERVER_PORT") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                var: "SERVER_PORT",
                reason: format!("{:?} is not a port number", raw),
            })?,
            Err(_) => 8080,
        };

        let access_token_duration = match env::var("ACCESS_TOKEN_DURATION") {
            Ok(raw) => parse_duration(&raw).map_err(|reason| ConfigError::Invalid {
                var: "ACCESS_TOKEN_DURATION",
                reason,
            })?,
            Err(_) => Duration::minutes(15),
        };

        Ok(Self {
            app_env: env::var("APP_ENV").unwrap_or_else(|_| "local".to_string()),
            database_url: required("DATABASE_URL")?,
            server_port,
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            cors_allowed_origin: env::var("CORS_ALLOWED_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            token: TokenConfig {
                symmetric_key: required("TOKEN_SYMMETRIC_KEY")?,
                access_token_duration,
            },
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

fn required(var: &'static str) -> Result<String, ConfigError> {
    match env::var(var) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(var)),
    }
}

/// Parses durations written as unit-suffixed segments: `90s`, `15m`, `24h`, `1h30m`.
///
/// A bare integer is read as seconds. Durations that would carry an expiry past the
/// calendar's range are rejected.
pub fn parse_duration(raw: &str) -> Result<Duration, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err("empty duration".to_string());
    }
    let out_of_range = || format!("{:?} is out of range", raw);

    let total = match raw.parse::<i64>() {
        Ok(seconds) => Duration::try_seconds(seconds).ok_or_else(out_of_range)?,
        Err(_) => parse_segments(raw)?,
    };

    Utc::now()
        .checked_add_signed(total)
        .ok_or_else(out_of_range)?;
    Ok(total)
}

fn parse_segments(raw: &str) -> Result<Duration, String> {
    let mut total = Duration::zero();
    let mut digits = String::new();
    for c in raw.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }

        let amount: i64 = digits
            .parse()
            .map_err(|_| format!("expected a number before '{}' in {:?}", c, raw))?;
        digits.clear();

        let segment = match c {
            'h' => Duration::try_hours(amount),
            'm' => Duration::try_minutes(amount),
            's' => Duration::try_seconds(amount),
            other => return Err(format!("unknown unit '{}' in {:?}", other, raw)),
        };
        total = segment
            .and_then(|segment| total.checked_add(&segment))
            .ok_or_else(|| format!("{:?} is out of range", raw))?;
    }

    if !digits.is_empty() {
        return Err(format!("missing unit after {:?} in {:?}", digits, raw));
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lazy_static::lazy_static;
    use std::sync::Mutex;

    lazy_static! {
        static ref ENV_LOCK: Mutex<()> = Mutex::new(());
    }

    const VARS: [&str; 7] = [
        "APP_ENV",
        "DATABASE_URL",
        "SERVER_PORT",
        "SERVER_HOST",
        "CORS_ALLOWED_ORIGIN",
        "TOKEN_SYMMETRIC_KEY",
        "ACCESS_TOKEN_DURATION",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_config_from_env() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();

        env::set_var("DATABASE_URL", "postgres://test");
        env::set_var("TOKEN_SYMMETRIC_KEY", "12345678901234567890123456789012");

        let config = Config::from_env().unwrap();

        assert_eq!(config.app_env, "local");
        assert_eq!(config.database_url, "postgres://test");
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.server_host, "127.0.0.1");
        assert_eq!(config.token.access_token_duration, Duration::minutes(15));

        env::set_var("SERVER_PORT", "3000");
        env::set_var("SERVER_HOST", "0.0.0.0");
        env::set_var("ACCESS_TOKEN_DURATION", "24h");

        let config = Config::from_env().unwrap();

        assert_eq!(config.server_port, 3000);
        assert_eq!(config.server_host, "0.0.0.0");
        assert_eq!(config.server_url(), "http://0.0.0.0:3000");
        assert_eq!(config.token.access_token_duration, Duration::hours(24));

        clear_env();
    }

    #[test]
    fn test_missing_and_invalid_values() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();

        env::set_var("DATABASE_URL", "postgres://test");
        assert_eq!(
            Config::from_env().err(),
            Some(ConfigError::Missing("TOKEN_SYMMETRIC_KEY"))
        );

        env::set_var("TOKEN_SYMMETRIC_KEY", "12345678901234567890123456789012");
        env::set_var("SERVER_PORT", "eighty");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Invalid {
                var: "SERVER_PORT",
                ..
            })
        ));

        clear_env();
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("90s"), Ok(Duration::seconds(90)));
        assert_eq!(parse_duration("15m"), Ok(Duration::minutes(15)));
        assert_eq!(parse_duration("24h"), Ok(Duration::hours(24)));
        assert_eq!(
            parse_duration("1h30m"),
            Ok(Duration::hours(1) + Duration::minutes(30))
        );
        assert_eq!(parse_duration("3600"), Ok(Duration::hours(1)));

        assert!(parse_duration("").is_err());
        assert!(parse_duration("15").is_ok());
        assert!(parse_duration("15x").is_err());
        assert!(parse_duration("m").is_err());
        assert!(parse_duration("1h30").is_err());
    }

    #[test]
    fn test_parse_duration_rejects_out_of_range_values() {
        assert!(parse_duration("2500000000h").is_err());
        assert!(parse_duration("99999999999999999h").is_err());
        assert!(parse_duration("9223372036854775807").is_err());
        assert!(parse_duration("99999999999999999999s").is_err());
        assert!(parse_duration("2000000000h2000000000h").is_err());

        assert_eq!(parse_duration("87600h"), Ok(Duration::hours(87600)));
    }

    #[test]
    fn test_out_of_range_duration_is_a_config_error() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();

        env::set_var("DATABASE_URL", "postgres://test");
        env::set_var("TOKEN_SYMMETRIC_KEY", "12345678901234567890123456789012");
        env::set_var("ACCESS_TOKEN_DURATION", "2500000000h");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Invalid {
                var: "ACCESS_TOKEN_DURATION",
                ..
            })
        ));

        clear_env();
    }
}
