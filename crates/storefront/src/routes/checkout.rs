//! Checkout route handlers.
//!
//! The checkout state machine is stored in the session next to the cart. Each
//! handler restores both, applies one transition and saves both back, also
//! when the transition fails, so that shipping drafts and failed payment
//! attempts are remembered.

use artifi_core::checkout::{
    Checkout, CheckoutError, CheckoutStep, Order, PaymentDetails, ShippingInfo, format_card_number,
    format_exp_date,
};
use artifi_core::{Cart, OrderTotals, Price, PricingConfig};
use axum::{
    Form, Json,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::{instrument, warn};

use crate::error::{AppError, Result, add_breadcrumb};
use crate::models::session_keys;
use crate::routes::cart::CartItemView;
use crate::services::session_cart::{SessionCart, load_cart, save_cart};
use crate::state::AppState;

// =============================================================================
// Views
// =============================================================================

/// Order summary panel.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryView {
    pub item_count: u64,
    pub subtotal: String,
    pub shipping: String,
    pub ships_free: bool,
    pub tax: String,
    pub total: String,
}

impl SummaryView {
    fn new(item_count: u64, totals: &OrderTotals) -> Self {
        Self {
            item_count,
            subtotal: Price::usd(totals.subtotal).display(),
            shipping: Price::usd(totals.shipping).display(),
            ships_free: totals.ships_free(),
            tax: Price::usd(totals.tax).display(),
            total: Price::usd(totals.amount_due()).display(),
        }
    }
}

/// A placed order as shown on the confirmation step.
#[derive(Debug, Clone, Serialize)]
pub struct OrderView {
    pub id: String,
    pub items: Vec<CartItemView>,
    pub shipping: ShippingInfo,
    pub card_last4: String,
    pub placed_at: String,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id().to_string(),
            items: order.items().iter().map(CartItemView::from).collect(),
            shipping: order.shipping().clone(),
            card_last4: order.card_last4().to_string(),
            placed_at: order.placed_at().to_rfc3339(),
        }
    }
}

/// Checkout page state.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutView {
    pub step: CheckoutStep,
    pub step_number: u8,
    pub progress_percent: u8,
    pub shipping: ShippingInfo,
    pub summary: SummaryView,
    pub failed_attempts: u32,
    pub last_error: Option<String>,
    pub order: Option<OrderView>,
}

impl CheckoutView {
    fn new(checkout: &Checkout, cart: &Cart, rates: &PricingConfig) -> Self {
        let step = checkout.step();
        let summary = checkout.order().map_or_else(
            || SummaryView::new(cart.total_items(), &OrderTotals::for_cart(cart, rates)),
            |order| SummaryView::new(order.item_count(), order.totals()),
        );

        Self {
            step,
            step_number: step.number(),
            progress_percent: step.progress_percent(),
            shipping: checkout.shipping_info().clone(),
            summary,
            failed_attempts: checkout.failed_attempts(),
            last_error: checkout.last_error().map(str::to_string),
            order: checkout.order().map(OrderView::from),
        }
    }
}

/// Card fields regrouped for the payment form while the visitor types.
#[derive(Clone, Serialize)]
pub struct PaymentInputView {
    pub card_number: String,
    pub exp_date: String,
}

// =============================================================================
// Forms
// =============================================================================

/// Shipping form data. Missing fields arrive blank and fail validation.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ShippingForm {
    pub full_name: String,
    pub email: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    pub phone: String,
}

impl From<ShippingForm> for ShippingInfo {
    fn from(form: ShippingForm) -> Self {
        let trim = |s: String| s.trim().to_string();
        Self {
            full_name: trim(form.full_name),
            email: trim(form.email),
            address: trim(form.address),
            city: trim(form.city),
            state: trim(form.state),
            zip_code: trim(form.zip_code),
            country: trim(form.country),
            phone: trim(form.phone),
        }
    }
}

/// Payment form data.
#[derive(Deserialize)]
pub struct PaymentForm {
    pub card_number: String,
    pub card_holder: String,
    pub exp_date: String,
    pub cvv: String,
}

impl std::fmt::Debug for PaymentForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentForm")
            .field("card_number", &"[REDACTED]")
            .field("card_holder", &self.card_holder)
            .field("exp_date", &self.exp_date)
            .field("cvv", &"[REDACTED]")
            .finish()
    }
}

/// Partially typed card fields.
#[derive(Default, Deserialize)]
#[serde(default)]
pub struct PaymentInputForm {
    pub card_number: String,
    pub exp_date: String,
}

// =============================================================================
// Session Helpers
// =============================================================================

/// Read the saved checkout. An unreadable entry is dropped with a warning
/// and the visitor starts over, like an unreadable cart.
async fn load_checkout(session: &Session) -> Option<Checkout> {
    match session.get::<Checkout>(session_keys::CHECKOUT).await {
        Ok(previous) => previous,
        Err(e) => {
            warn!(error = %e, key = session_keys::CHECKOUT, "discarding unreadable checkout state");
            None
        }
    }
}

/// Restore the cart and enter the checkout with it.
async fn enter(session: &Session) -> (SessionCart, std::result::Result<Checkout, CheckoutError>) {
    let cart = load_cart(session).await;
    let previous = load_checkout(session).await;
    let entered = Checkout::enter(previous, cart.cart());
    (cart, entered)
}

/// Save the checkout and the cart back to the session.
async fn save(session: &Session, checkout: &Checkout, cart: SessionCart) -> Result<()> {
    session.insert(session_keys::CHECKOUT, checkout).await?;
    save_cart(session, cart).await;
    Ok(())
}

// =============================================================================
// Handlers
// =============================================================================

/// Show the current checkout step, or send an empty cart back to `/cart`.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<Response> {
    let (cart, entered) = enter(&session).await;
    let checkout = match entered {
        Ok(checkout) => checkout,
        Err(CheckoutError::EmptyCart) => return Ok(Redirect::to("/cart").into_response()),
        Err(e) => return Err(e.into()),
    };

    let view = CheckoutView::new(&checkout, cart.cart(), state.pricing());
    save(&session, &checkout, cart).await?;
    Ok(Json(view).into_response())
}

/// Submit shipping info and move on to payment.
#[instrument(skip(state, session))]
pub async fn submit_shipping(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ShippingForm>,
) -> Result<Json<CheckoutView>> {
    let (cart, entered) = enter(&session).await;
    let mut checkout = entered?;

    let result = checkout.submit_shipping(form.into());
    let view = CheckoutView::new(&checkout, cart.cart(), state.pricing());
    save(&session, &checkout, cart).await?;
    result?;

    add_breadcrumb("checkout", "Shipping info submitted", None);
    Ok(Json(view))
}

/// Return from payment to the shipping form.
#[instrument(skip(state, session))]
pub async fn back_to_shipping(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<CheckoutView>> {
    let (cart, entered) = enter(&session).await;
    let mut checkout = entered?;

    checkout.back_to_shipping()?;

    let view = CheckoutView::new(&checkout, cart.cart(), state.pricing());
    save(&session, &checkout, cart).await?;
    Ok(Json(view))
}

/// Validate payment details and place the order.
///
/// On success the cart is emptied and the confirmation returned. On failure
/// the cart is untouched and the attempt is recorded on the payment step.
#[instrument(skip(state, session))]
pub async fn submit_payment(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<PaymentForm>,
) -> Result<Json<CheckoutView>> {
    let (mut cart, entered) = enter(&session).await;
    let mut checkout = entered?;

    let payment = PaymentDetails::parse(&form.card_number, &form.card_holder, &form.exp_date, &form.cvv)
        .map_err(|e| AppError::Checkout(e.into()))?;

    let result = checkout
        .place_order(&mut cart, &payment, state.orders(), state.pricing())
        .await;

    let view = CheckoutView::new(&checkout, cart.cart(), state.pricing());
    save(&session, &checkout, cart).await?;

    let order_id = result?;
    add_breadcrumb(
        "checkout",
        "Order placed",
        Some(&[("order_id", order_id.as_str())]),
    );
    Ok(Json(view))
}

/// Regroup card input as typed: digits in fours, expiry as `MM/YY`.
///
/// Nothing is validated or stored; that happens on submit.
#[instrument(skip_all)]
pub async fn format_payment_input(Form(form): Form<PaymentInputForm>) -> Json<PaymentInputView> {
    Json(PaymentInputView {
        card_number: format_card_number(&form.card_number),
        exp_date: format_exp_date(&form.exp_date),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn test_unreadable_checkout_state_starts_over() {
        let session = session();
        session
            .insert(
                session_keys::CHECKOUT,
                serde_json::json!({"step": "teleport", "order": 7}),
            )
            .await
            .unwrap();

        assert!(load_checkout(&session).await.is_none());
    }

    #[tokio::test]
    async fn test_saved_checkout_is_restored() {
        let session = session();
        session
            .insert(session_keys::CHECKOUT, Checkout::new())
            .await
            .unwrap();

        let restored = load_checkout(&session).await.unwrap();
        assert_eq!(restored.step(), CheckoutStep::Shipping);
    }

    #[tokio::test]
    async fn test_format_payment_input() {
        let Json(view) = format_payment_input(Form(PaymentInputForm {
            card_number: "4242-4242 424242".into(),
            exp_date: "0929".into(),
        }))
        .await;

        assert_eq!(view.card_number, "4242 4242 4242 42");
        assert_eq!(view.exp_date, "09/29");
    }

    #[test]
    fn test_shipping_form_is_trimmed() {
        let form = ShippingForm {
            full_name: "  Ada Lovelace ".into(),
            country: "United Kingdom\n".into(),
            ..ShippingForm::default()
        };
        let info = ShippingInfo::from(form);
        assert_eq!(info.full_name, "Ada Lovelace");
        assert_eq!(info.country, "United Kingdom");
        assert!(info.email.is_empty());
    }

    #[test]
    fn test_payment_form_debug_redacts() {
        let form = PaymentForm {
            card_number: "4242424242424242".into(),
            card_holder: "Ada".into(),
            exp_date: "09/29".into(),
            cvv: "321".into(),
        };
        let debug_output = format!("{form:?}");
        assert!(!debug_output.contains("4242424242424242"));
        assert!(!debug_output.contains("321"));
    }

    #[test]
    fn test_summary_view_formats_amounts() {
        let totals = OrderTotals::compute(
            rust_decimal::Decimal::new(5000, 2),
            &PricingConfig::default(),
        );
        let view = SummaryView::new(1, &totals);
        assert_eq!(view.subtotal, "$50.00");
        assert_eq!(view.shipping, "$9.99");
        assert_eq!(view.tax, "$4.00");
        assert_eq!(view.total, "$63.99");
        assert!(!view.ships_free);
    }
}
