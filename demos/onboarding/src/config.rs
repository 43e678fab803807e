// demos/onboarding/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub user_name: String,
  /// Makes the group step report a failure, which rolls the new user back.
  pub fail_groups: bool,
  /// Requests cancellation right after the user is created.
  pub cancel_before_groups: bool,
  pub step_delay_ms: u64,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present

    let user_name = env::var("ONBOARDING_USER_NAME").unwrap_or_else(|_| "ada".to_string());
    if user_name.trim().is_empty() {
      return Err(AppError::Config("ONBOARDING_USER_NAME cannot be blank".to_string()));
    }
    let fail_groups = parse_or("ONBOARDING_FAIL_GROUPS", false)?;
    let cancel_before_groups = parse_or("ONBOARDING_CANCEL_BEFORE_GROUPS", false)?;
    let step_delay_ms = parse_or("ONBOARDING_STEP_DELAY_MS", 0_u64)?;

    tracing::info!("Application configuration loaded successfully.");

    Ok(Self {
      user_name,
      fail_groups,
      cancel_before_groups,
      step_delay_ms,
    })
  }
}

fn parse_or<T>(var_name: &str, default: T) -> Result<T>
where
  T: FromStr,
  T::Err: std::fmt::Display,
{
  match env::var(var_name) {
    Ok(raw) => raw
      .trim()
      .parse::<T>()
      .map_err(|e| AppError::Config(format!("Invalid {} value '{}': {}", var_name, raw, e))),
    Err(_) => Ok(default),
  }
}
