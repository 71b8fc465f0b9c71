use std::env;
use std::time::Duration;

use tracing::warn;

use crate::api_connection::endpoints::{
    DEFAULT_COCKTAILDB_BASE_URL, DEFAULT_MEALDB_BASE_URL, DEFAULT_REGIONAL_BASE_URL,
};

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

pub const SUPABASE_URL_ENV_VAR: &str = "SUPABASE_URL";
pub const SUPABASE_ANON_KEY_ENV_VAR: &str = "SUPABASE_ANON_KEY";
pub const SUPABASE_ACCESS_TOKEN_ENV_VAR: &str = "SUPABASE_ACCESS_TOKEN";

/// Connection details for the hosted auth/storage backend.
#[derive(Debug, Clone)]
pub struct SupabaseSettings {
    pub url: String,
    pub anon_key: String,
    /// Session token of the signed-in user. Without it every request runs
    /// as the anonymous role and `current_user` yields nothing.
    pub access_token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub mealdb_base_url: String,
    pub cocktaildb_base_url: String,
    pub regional_base_url: String,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    pub supabase: Option<SupabaseSettings>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            mealdb_base_url: DEFAULT_MEALDB_BASE_URL.to_string(),
            cocktaildb_base_url: DEFAULT_COCKTAILDB_BASE_URL.to_string(),
            regional_base_url: DEFAULT_REGIONAL_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            supabase: None,
        }
    }
}

impl AppConfig {
    /// Reads the configuration from the process environment. Call
    /// `dotenv::dotenv()` beforehand to pick up a local `.env` file.
    pub fn from_env() -> Self {
        let supabase = match (
            env::var(SUPABASE_URL_ENV_VAR).ok(),
            env::var(SUPABASE_ANON_KEY_ENV_VAR).ok(),
        ) {
            (Some(url), Some(anon_key)) => Some(SupabaseSettings {
                url,
                anon_key,
                access_token: env::var(SUPABASE_ACCESS_TOKEN_ENV_VAR).ok(),
            }),
            _ => None,
        };

        Self {
            mealdb_base_url: env::var("MEALDB_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_MEALDB_BASE_URL.into()),
            cocktaildb_base_url: env::var("COCKTAILDB_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_COCKTAILDB_BASE_URL.into()),
            regional_base_url: env::var("REGIONAL_FOOD_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_REGIONAL_BASE_URL.into()),
            request_timeout: Duration::from_secs(secs_from_env(
                "REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )),
            connect_timeout: Duration::from_secs(secs_from_env(
                "CONNECT_TIMEOUT_SECS",
                DEFAULT_CONNECT_TIMEOUT_SECS,
            )),
            supabase,
        }
    }
}

fn secs_from_env(key: &str, default: u64) -> u64 {
    match env::var(key) {
        Ok(raw) => raw.parse::<u64>().unwrap_or_else(|e| {
            warn!("Invalid {key} value {raw:?}: {e}; using default {default}");
            default
        }),
        Err(_) => default,
    }
}
