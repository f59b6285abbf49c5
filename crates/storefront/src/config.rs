//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `ARTIFI_SHIPPING_FLAT_RATE` - Shipping charged below the threshold (default: 9.99)
//! - `ARTIFI_TAX_RATE` - Tax rate applied to the subtotal (default: 0.08)
//! - `ARTIFI_FREE_SHIPPING_THRESHOLD` - Subtotal that ships free (default: 100.00, `off` disables)
//! - `ORDER_PLACEMENT_TIMEOUT_SECS` - Give up on the order service after this long (default: 30)
//! - `ORDER_SIMULATED_LATENCY_MS` - Processing delay of the simulated order service (default: 1500)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.1)

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use artifi_core::PricingConfig;
use artifi_core::cart::MAX_CART_TOTAL;
use rust_decimal::Decimal;
use secrecy::SecretString;
use thiserror::Error;

/// Values of `ARTIFI_FREE_SHIPPING_THRESHOLD` that turn free shipping off.
const THRESHOLD_DISABLED: &[&str] = &["off", "none", "disabled"];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Shipping and tax rates
    pub pricing: PricingConfig,
    /// Order placement settings
    pub orders: OrderServiceConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. "production")
    pub sentry_environment: Option<String>,
    /// Fraction of errors sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced
    pub sentry_traces_sample_rate: f32,
}

/// Order placement service configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderServiceConfig {
    /// How long a single placement attempt may take.
    pub placement_timeout: Duration,
    /// Artificial processing delay of the simulated service.
    pub simulated_latency: Duration,
}

impl Default for OrderServiceConfig {
    fn default() -> Self {
        Self {
            placement_timeout: Duration::from_secs(30),
            simulated_latency: Duration::from_millis(1500),
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("STOREFRONT_DATABASE_URL")?;
        let host = parse_env("STOREFRONT_HOST", &get_env_or_default("STOREFRONT_HOST", "127.0.0.1"))?;
        let port = parse_env("STOREFRONT_PORT", &get_env_or_default("STOREFRONT_PORT", "3000"))?;
        let base_url = get_required_env("STOREFRONT_BASE_URL")?;

        let pricing = pricing_from_env()?;
        let orders = OrderServiceConfig::from_env()?;

        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = parse_rate(
            "SENTRY_SAMPLE_RATE",
            &get_env_or_default("SENTRY_SAMPLE_RATE", "1.0"),
        )?;
        let sentry_traces_sample_rate = parse_rate(
            "SENTRY_TRACES_SAMPLE_RATE",
            &get_env_or_default("SENTRY_TRACES_SAMPLE_RATE", "0.1"),
        )?;

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            pricing,
            orders,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the storefront is served over HTTPS.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl OrderServiceConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let placement_timeout = match get_optional_env("ORDER_PLACEMENT_TIMEOUT_SECS") {
            Some(value) => {
                let secs: u64 = parse_env("ORDER_PLACEMENT_TIMEOUT_SECS", &value)?;
                if secs == 0 {
                    return Err(ConfigError::InvalidEnvVar(
                        "ORDER_PLACEMENT_TIMEOUT_SECS".to_string(),
                        "must be at least 1".to_string(),
                    ));
                }
                Duration::from_secs(secs)
            }
            None => defaults.placement_timeout,
        };
        let simulated_latency = match get_optional_env("ORDER_SIMULATED_LATENCY_MS") {
            Some(value) => Duration::from_millis(parse_env("ORDER_SIMULATED_LATENCY_MS", &value)?),
            None => defaults.simulated_latency,
        };

        Ok(Self {
            placement_timeout,
            simulated_latency,
        })
    }
}

/// Build the pricing rate table, falling back to the standard Artifi rates.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` if a rate is not a non-negative number,
/// the tax rate is above 1 (100%) or the flat rate is above the cart limit.
pub fn pricing_from_env() -> Result<PricingConfig, ConfigError> {
    let defaults = PricingConfig::DEFAULT;

    let shipping_flat_rate = get_optional_env("ARTIFI_SHIPPING_FLAT_RATE")
        .map(|v| parse_bounded("ARTIFI_SHIPPING_FLAT_RATE", &v, MAX_CART_TOTAL))
        .transpose()?
        .unwrap_or(defaults.shipping_flat_rate);
    let tax_rate = get_optional_env("ARTIFI_TAX_RATE")
        .map(|v| parse_bounded("ARTIFI_TAX_RATE", &v, Decimal::ONE))
        .transpose()?
        .unwrap_or(defaults.tax_rate);
    let free_shipping_threshold = match get_optional_env("ARTIFI_FREE_SHIPPING_THRESHOLD") {
        Some(v) => parse_threshold("ARTIFI_FREE_SHIPPING_THRESHOLD", &v)?,
        None => defaults.free_shipping_threshold,
    };

    Ok(PricingConfig {
        shipping_flat_rate,
        tax_rate,
        free_shipping_threshold,
    })
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL` (used by Fly.io postgres attach).
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable. Empty values count as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

fn parse_env<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse a non-negative decimal amount or rate.
fn parse_amount(key: &str, value: &str) -> Result<Decimal, ConfigError> {
    let amount: Decimal = parse_env(key, value)?;
    if amount.is_sign_negative() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must not be negative (got {amount})"),
        ));
    }
    Ok(amount)
}

/// Parse a non-negative amount no larger than `max`.
fn parse_bounded(key: &str, value: &str, max: Decimal) -> Result<Decimal, ConfigError> {
    let amount = parse_amount(key, value)?;
    if amount > max {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must be at most {max} (got {amount})"),
        ));
    }
    Ok(amount)
}

/// Parse the free shipping threshold; `off` disables free shipping.
fn parse_threshold(key: &str, value: &str) -> Result<Option<Decimal>, ConfigError> {
    if THRESHOLD_DISABLED
        .iter()
        .any(|word| value.trim().eq_ignore_ascii_case(word))
    {
        return Ok(None);
    }
    parse_amount(key, value).map(Some)
}

/// Parse a sampling rate in `[0, 1]`.
fn parse_rate(key: &str, value: &str) -> Result<f32, ConfigError> {
    let rate: f32 = parse_env(key, value)?;
    if !(0.0..=1.0).contains(&rate) {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must be between 0 and 1 (got {rate})"),
        ));
    }
    Ok(rate)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount() {
        assert_eq!(
            parse_amount("RATE", "9.99").unwrap(),
            Decimal::new(999, 2)
        );
        assert_eq!(parse_amount("RATE", " 0.08 ").unwrap(), Decimal::new(8, 2));
        assert!(matches!(
            parse_amount("RATE", "-1"),
            Err(ConfigError::InvalidEnvVar(key, _)) if key == "RATE"
        ));
        assert!(parse_amount("RATE", "nine").is_err());
    }

    #[test]
    fn test_parse_bounded() {
        assert_eq!(
            parse_bounded("ARTIFI_TAX_RATE", "1", Decimal::ONE).unwrap(),
            Decimal::ONE
        );
        let err = parse_bounded("ARTIFI_TAX_RATE", "8", Decimal::ONE).unwrap_err();
        assert!(err.to_string().contains("ARTIFI_TAX_RATE"));
        assert!(
            parse_bounded(
                "ARTIFI_SHIPPING_FLAT_RATE",
                "79228162514264337593543950335",
                MAX_CART_TOTAL
            )
            .is_err()
        );
    }

    #[test]
    fn test_parse_threshold() {
        assert_eq!(
            parse_threshold("T", "100.00").unwrap(),
            Some(Decimal::new(10_000, 2))
        );
        assert_eq!(parse_threshold("T", "off").unwrap(), None);
        assert_eq!(parse_threshold("T", "NONE").unwrap(), None);
        assert!(parse_threshold("T", "free").is_err());
    }

    #[test]
    fn test_parse_rate() {
        assert!((parse_rate("R", "0.25").unwrap() - 0.25).abs() < f32::EPSILON);
        assert!(parse_rate("R", "1.5").is_err());
        assert!(parse_rate("R", "-0.1").is_err());
    }

    #[test]
    fn test_parse_env_reports_key() {
        let err = parse_env::<u16>("STOREFRONT_PORT", "99999").unwrap_err();
        assert!(err.to_string().contains("STOREFRONT_PORT"));
    }

    #[test]
    fn test_order_service_defaults() {
        let defaults = OrderServiceConfig::default();
        assert_eq!(defaults.placement_timeout, Duration::from_secs(30));
        assert_eq!(defaults.simulated_latency, Duration::from_millis(1500));
    }

    #[test]
    fn test_socket_addr() {
        let config = StorefrontConfig {
            database_url: SecretString::from("postgres://localhost/test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            pricing: PricingConfig::default(),
            orders: OrderServiceConfig::default(),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.1,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
        assert!(!config.is_secure());
    }
}
