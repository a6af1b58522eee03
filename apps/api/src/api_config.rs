use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use chrono::TimeDelta;
use classbook_core::AppError;
use classbook_infrastructure::{
    DEFAULT_TOKEN_TTL_HOURS, MAX_TOKEN_TTL_HOURS, MIN_SECRET_LENGTH,
};
use tracing_subscriber::EnvFilter;

/// Credentials for the administrator created on startup.
#[derive(Debug, Clone)]
pub struct BootstrapAdmin {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub jwt_secret: String,
    pub api_host: String,
    pub api_port: u16,
    pub frontend_url: String,
    pub token_ttl: TimeDelta,
    pub user_lookup_timeout: Duration,
    pub bootstrap_admin: Option<BootstrapAdmin>,
    pub seed_demo_data: bool,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let jwt_secret = required_non_empty_env("JWT_SECRET")?;
        if jwt_secret.len() < MIN_SECRET_LENGTH {
            return Err(AppError::Validation(format!(
                "JWT_SECRET must be at least {MIN_SECRET_LENGTH} characters"
            )));
        }

        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());
        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = env::var("API_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3001);

        let token_ttl =
            bounded_token_ttl(parsed_env("TOKEN_TTL_HOURS", DEFAULT_TOKEN_TTL_HOURS)?)?;

        let user_lookup_timeout_ms = parsed_env("USER_LOOKUP_TIMEOUT_MS", 2000_u64)?;

        let bootstrap_admin = match (
            optional_env("BOOTSTRAP_ADMIN_EMAIL"),
            optional_env("BOOTSTRAP_ADMIN_PASSWORD"),
        ) {
            (Some(email), Some(password)) => Some(BootstrapAdmin { email, password }),
            (None, None) => None,
            _ => {
                return Err(AppError::Validation(
                    "BOOTSTRAP_ADMIN_EMAIL and BOOTSTRAP_ADMIN_PASSWORD must be set together"
                        .to_owned(),
                ));
            }
        };

        let seed_demo_data = env::var("SEED_DEMO_DATA")
            .unwrap_or_else(|_| "false".to_owned())
            .eq_ignore_ascii_case("true");

        Ok(Self {
            jwt_secret,
            api_host,
            api_port,
            frontend_url,
            token_ttl,
            user_lookup_timeout: Duration::from_millis(user_lookup_timeout_ms),
            bootstrap_admin,
            seed_demo_data,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn bounded_token_ttl(hours: i64) -> Result<TimeDelta, AppError> {
    if !(1..=MAX_TOKEN_TTL_HOURS).contains(&hours) {
        return Err(AppError::Validation(format!(
            "TOKEN_TTL_HOURS must be between 1 and {MAX_TOKEN_TTL_HOURS}"
        )));
    }

    Ok(TimeDelta::hours(hours))
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn required_non_empty_env(name: &str) -> Result<String, AppError> {
    let value = required_env(name)?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}

fn optional_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn parsed_env<T>(name: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match optional_env(name) {
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|error| AppError::Validation(format!("invalid {name}: {error}"))),
        None => Ok(default),
    }
}
