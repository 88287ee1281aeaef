use std::env;

use crate::error::Error;
use crate::owm::BASE_URL;

pub const API_KEY_VAR: &str = "API_KEY";
pub const BASE_URL_VAR: &str = "SKYWATCH_BASE_URL";

/// Settings read once at start-up.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub base_url: String,
}

impl Config {
    /// Loads `.env` if there is one, then reads the process environment.
    pub fn from_env() -> Result<Self, Error> {
        // A missing .env file is the normal case outside development.
        let _ = dotenv::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let api_key = lookup(API_KEY_VAR)
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or(Error::MissingEnv(API_KEY_VAR))?;

        let base_url = lookup(BASE_URL_VAR)
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| BASE_URL.to_string());

        Ok(Self { api_key, base_url })
    }
}
