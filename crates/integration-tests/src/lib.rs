//! Integration tests for Artifi.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p artifi-integration-tests
//! ```
//!
//! No database or server is needed. The storefront router is driven
//! in-process with `tower::ServiceExt::oneshot`, sessions live in an
//! in-memory store, and the `PostgreSQL` pool is created lazily and never
//! used.
//!
//! # Test Categories
//!
//! - `checkout_flow` - Cart and checkout engine across crates
//! - `storefront_api` - HTTP cart and checkout round trips

#![allow(clippy::missing_panics_doc)]
#![allow(clippy::expect_used)]

use std::time::Duration;

use artifi_core::PricingConfig;
use artifi_storefront::config::{OrderServiceConfig, StorefrontConfig};
use artifi_storefront::middleware::session;
use artifi_storefront::state::AppState;
use axum::Router;
use axum::body::{Body, Bytes};
use axum::http::{HeaderValue, Request, StatusCode, header};
use secrecy::SecretString;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;
use tower_sessions::MemoryStore;

/// Card number the simulated order service always accepts.
pub const GOOD_CARD: &str = "4242 4242 4242 4242";

/// Card number the simulated order service always declines.
pub const DECLINED_CARD: &str = "4000 0000 0000 0002";

/// Card number that makes the simulated order service fail.
pub const PROCESSING_ERROR_CARD: &str = "4000 0000 0000 0119";

/// Storefront configuration for tests: default rates, instant order service.
#[must_use]
pub fn test_config() -> StorefrontConfig {
    StorefrontConfig {
        database_url: SecretString::from("postgres://localhost/artifi_test"),
        host: "127.0.0.1".parse().expect("valid address"),
        port: 3000,
        base_url: "http://localhost:3000".to_string(),
        pricing: PricingConfig::default(),
        orders: OrderServiceConfig {
            placement_timeout: Duration::from_secs(30),
            simulated_latency: Duration::ZERO,
        },
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

/// A response with its body collected.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: Bytes,
}

impl TestResponse {
    /// Body parsed as JSON.
    #[must_use]
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("response body is JSON")
    }

    /// Body as text.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// One visitor talking to an in-process storefront.
///
/// The session cookie handed out by the storefront is sent back on every
/// following request, like a browser would.
pub struct TestStorefront {
    router: Router,
    cookie: Option<HeaderValue>,
}

impl TestStorefront {
    /// A storefront with [`test_config`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    #[must_use]
    pub fn with_config(config: StorefrontConfig) -> Self {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/artifi_test")
            .expect("lazy pool from a well-formed URL");
        let session_layer = session::configure(MemoryStore::default(), config.is_secure());
        let state = AppState::new(config, pool);

        Self {
            router: artifi_storefront::app(state, session_layer),
            cookie: None,
        }
    }

    /// Another visitor on the same storefront and session store, without a
    /// session cookie yet.
    #[must_use]
    pub fn new_visitor(&self) -> Self {
        Self {
            router: self.router.clone(),
            cookie: None,
        }
    }

    /// The session cookie (`name=value`) this visitor sends, if any.
    #[must_use]
    pub const fn session_cookie(&self) -> Option<&HeaderValue> {
        self.cookie.as_ref()
    }

    pub async fn get(&mut self, path: &str) -> TestResponse {
        let request = Request::get(path);
        self.send(request, Body::empty()).await
    }

    pub async fn post_form(&mut self, path: &str, fields: &[(&str, &str)]) -> TestResponse {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields)
            .finish();
        let request = Request::post(path).header(
            header::CONTENT_TYPE,
            "application/x-www-form-urlencoded",
        );
        self.send(request, Body::from(body)).await
    }

    async fn send(&mut self, mut request: axum::http::request::Builder, body: Body) -> TestResponse {
        if let Some(cookie) = &self.cookie {
            request = request.header(header::COOKIE, cookie.clone());
        }
        let request = request.body(body).expect("valid request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let pair = set_cookie
                .to_str()
                .expect("ascii cookie")
                .split(';')
                .next()
                .unwrap_or_default()
                .to_string();
            self.cookie = Some(HeaderValue::from_str(&pair).expect("valid cookie pair"));
        }

        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("readable body");

        TestResponse {
            status,
            location,
            body,
        }
    }

    /// Add an artwork to the cart.
    pub async fn add_artwork(&mut self, id: &str, price: &str, quantity: u32) -> TestResponse {
        let title = format!("Artwork {id}");
        let quantity = quantity.to_string();
        self.post_form(
            "/cart/add",
            &[
                ("id", id),
                ("title", title.as_str()),
                ("artist_name", "PixelMind"),
                ("price", price),
                ("image", "/images/placeholder.png"),
                ("quantity", quantity.as_str()),
            ],
        )
        .await
    }

    /// Submit a complete shipping form.
    pub async fn submit_shipping(&mut self) -> TestResponse {
        self.post_form("/checkout/shipping", &shipping_fields()).await
    }

    /// Submit payment with the given card number.
    pub async fn pay_with(&mut self, card_number: &str) -> TestResponse {
        self.post_form(
            "/checkout/payment",
            &[
                ("card_number", card_number),
                ("card_holder", "Ada Lovelace"),
                ("exp_date", "09/29"),
                ("cvv", "123"),
            ],
        )
        .await
    }
}

impl Default for TestStorefront {
    fn default() -> Self {
        Self::new()
    }
}

/// A complete shipping form.
#[must_use]
pub fn shipping_fields() -> Vec<(&'static str, &'static str)> {
    vec![
        ("full_name", "Ada Lovelace"),
        ("email", "ada@example.com"),
        ("address", "12 Analytical Way"),
        ("city", "London"),
        ("state", "LDN"),
        ("zip_code", "N1 9GU"),
        ("country", "United Kingdom"),
        ("phone", "+44 20 7946 0958"),
    ]
}
