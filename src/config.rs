use std::env;
use std::time::Duration;

use crate::error::{CatalogError, Result};

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub square: SquareConfig,
}

/// Square API access settings. The merchant and location ids are optional:
/// without them the service still works, but booking links fall back to the
/// internal booking page instead of the Square appointments flow.
#[derive(Debug, Clone)]
pub struct SquareConfig {
    pub access_token: String,
    pub environment: SquareEnvironment,
    pub merchant_id: Option<String>,
    pub location_id: Option<String>,
    pub request_timeout: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SquareEnvironment {
    Production,
    Sandbox,
}

impl SquareEnvironment {
    pub fn base_url(&self) -> &'static str {
        match self {
            SquareEnvironment::Production => "https://connect.squareup.com",
            SquareEnvironment::Sandbox => "https://connect.squareupsandbox.com",
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let access_token = env::var("SQUARE_ACCESS_TOKEN")
            .map_err(|_| CatalogError::Config("SQUARE_ACCESS_TOKEN is not set".to_string()))?;

        // Anything other than an explicit "production" selects the sandbox catalog
        let environment = match env::var("SQUARE_ENVIRONMENT") {
            Ok(value) if value == "production" => SquareEnvironment::Production,
            _ => SquareEnvironment::Sandbox,
        };

        let merchant_id = env::var("SQUARE_MERCHANT_ID").ok().filter(|v| !v.is_empty());
        let location_id = env::var("SQUARE_LOCATION_ID").ok().filter(|v| !v.is_empty());

        let timeout_seconds = match env::var("SQUARE_TIMEOUT_SECONDS") {
            Ok(value) => value.parse::<u64>().map_err(|_| {
                CatalogError::Config(format!("invalid SQUARE_TIMEOUT_SECONDS value '{value}'"))
            })?,
            Err(_) => DEFAULT_TIMEOUT_SECONDS,
        };

        let port = match env::var("PORT") {
            Ok(value) => value
                .parse::<u16>()
                .map_err(|_| CatalogError::Config(format!("invalid PORT value '{value}'")))?,
            Err(_) => DEFAULT_PORT,
        };

        Ok(Self {
            port,
            square: SquareConfig {
                access_token,
                environment,
                merchant_id,
                location_id,
                request_timeout: Duration::from_secs(timeout_seconds),
            },
        })
    }
}
