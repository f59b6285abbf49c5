//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.

use artifi_core::cart::InvalidItemError;
use artifi_core::checkout::{CheckoutError, OrderPlacementError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Cart input was rejected.
    #[error("Invalid item: {0}")]
    InvalidItem(#[from] InvalidItemError),

    /// A checkout transition failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Reading or writing the visitor's session failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidItem(_) => StatusCode::BAD_REQUEST,
            Self::Checkout(err) => match err {
                CheckoutError::Shipping(_) | CheckoutError::Payment(_) => StatusCode::BAD_REQUEST,
                CheckoutError::EmptyCart | CheckoutError::InvalidTransition { .. } => {
                    StatusCode::CONFLICT
                }
                CheckoutError::Placement(OrderPlacementError::Declined(_)) => {
                    StatusCode::PAYMENT_REQUIRED
                }
                CheckoutError::Placement(OrderPlacementError::Unavailable(_)) => {
                    StatusCode::BAD_GATEWAY
                }
                CheckoutError::Placement(OrderPlacementError::TimedOut(_)) => {
                    StatusCode::GATEWAY_TIMEOUT
                }
            },
            Self::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(self, Self::Session(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = self.status();

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Session(_) => "Internal server error".to_string(),
            Self::InvalidItem(err) => err.to_string(),
            Self::Checkout(CheckoutError::Placement(OrderPlacementError::Unavailable(_))) => {
                "Order service unavailable, please try again".to_string()
            }
            Self::Checkout(err) => err.to_string(),
        };

        (status, message).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("checkout", "Order placed", Some(&[("order_id", "ORD-4821")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use artifi_core::CheckoutStep;
    use artifi_core::checkout::ShippingInfoError;

    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::from(InvalidItemError::EmptyId);
        assert!(err.to_string().starts_with("Invalid item:"));
    }

    #[test]
    fn test_cart_and_checkout_status_codes() {
        assert_eq!(
            get_status(InvalidItemError::EmptyId.into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(CheckoutError::Shipping(ShippingInfoError(vec!["email"])).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(CheckoutError::EmptyCart.into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(
                CheckoutError::InvalidTransition {
                    step: CheckoutStep::Confirmation,
                    action: "go back to shipping",
                }
                .into()
            ),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_placement_status_codes() {
        let placement = |e: OrderPlacementError| AppError::from(CheckoutError::from(e));

        assert_eq!(
            get_status(placement(OrderPlacementError::Declined("no".into()))),
            StatusCode::PAYMENT_REQUIRED
        );
        assert_eq!(
            get_status(placement(OrderPlacementError::Unavailable("down".into()))),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            get_status(placement(OrderPlacementError::TimedOut(Duration::from_secs(30)))),
            StatusCode::GATEWAY_TIMEOUT
        );
    }

    #[test]
    fn test_session_failure_is_hidden() {
        let err = AppError::Session(tower_sessions::session::Error::Store(
            tower_sessions::session_store::Error::Backend("connection refused".to_string()),
        ));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
