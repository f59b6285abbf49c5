//! Cart route handlers.
//!
//! Every cart mutation restores the visitor's cart from the session, applies
//! the change and writes the new snapshot back before responding with the
//! updated cart.

use artifi_core::{Cart, CartItem, NewCartItem, Price};
use axum::{Form, Json, extract::State};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::services::session_cart::{load_cart, save_cart};
use crate::state::AppState;

/// Cart line as shown to the shopper.
#[derive(Debug, Clone, Serialize)]
pub struct CartItemView {
    pub id: String,
    pub title: String,
    pub artist_name: String,
    pub image: String,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
}

/// Cart contents as shown to the shopper.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub item_count: u64,
}

/// Cart count badge.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CartCountView {
    pub count: u64,
}

impl From<&CartItem> for CartItemView {
    fn from(item: &CartItem) -> Self {
        Self {
            id: item.id.to_string(),
            title: item.title.clone(),
            artist_name: item.artist_name.clone(),
            image: item.image.clone(),
            quantity: item.quantity,
            price: Price::usd(item.price).display(),
            line_price: Price::usd(item.line_total()).display(),
        }
    }
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.items().iter().map(CartItemView::from).collect(),
            subtotal: Price::usd(cart.total_price()).display(),
            item_count: cart.total_items(),
        }
    }
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub id: String,
    pub title: String,
    pub artist_name: String,
    pub price: Decimal,
    #[serde(default)]
    pub image: String,
    pub quantity: Option<u32>,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub id: String,
    pub quantity: i64,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub id: String,
}

/// Display the cart.
#[instrument(skip(session))]
pub async fn show(session: Session) -> Json<CartView> {
    let cart = load_cart(&session).await;
    Json(CartView::from(cart.cart()))
}

/// Add an artwork to the cart, merging with an existing line.
#[instrument(skip(session))]
pub async fn add(session: Session, Form(form): Form<AddToCartForm>) -> Result<Json<CartView>> {
    let mut cart = load_cart(&session).await;
    let item = NewCartItem {
        id: form.id,
        title: form.title,
        artist_name: form.artist_name,
        price: form.price,
        image: form.image,
    };
    cart.add_item(item, form.quantity.unwrap_or(1))?;

    let view = CartView::from(cart.cart());
    save_cart(&session, cart).await;
    Ok(Json(view))
}

/// Set a line's quantity. Zero or less removes the line.
#[instrument(skip(session))]
pub async fn update(
    session: Session,
    Form(form): Form<UpdateCartForm>,
) -> Result<Json<CartView>> {
    let mut cart = load_cart(&session).await;
    cart.set_quantity(&form.id, form.quantity)?;

    let view = CartView::from(cart.cart());
    save_cart(&session, cart).await;
    Ok(Json(view))
}

/// Remove a line from the cart.
#[instrument(skip(session))]
pub async fn remove(
    session: Session,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Json<CartView>> {
    let mut cart = load_cart(&session).await;
    cart.remove_item(&form.id)?;

    let view = CartView::from(cart.cart());
    save_cart(&session, cart).await;
    Ok(Json(view))
}

/// Empty the cart.
#[instrument(skip(session))]
pub async fn clear(session: Session) -> Json<CartView> {
    let mut cart = load_cart(&session).await;
    cart.clear();

    let view = CartView::from(cart.cart());
    save_cart(&session, cart).await;
    Json(view)
}

/// Get the cart count badge.
#[instrument(skip(session))]
pub async fn count(session: Session) -> Json<CartCountView> {
    let cart = load_cart(&session).await;
    Json(CartCountView {
        count: cart.total_items(),
    })
}

/// Price table summary for the cart page.
#[derive(Debug, Clone, Serialize)]
pub struct ShippingPolicyView {
    pub flat_rate: String,
    pub free_shipping_threshold: Option<String>,
}

/// Shipping policy shown next to the cart.
#[instrument(skip(state))]
pub async fn shipping_policy(State(state): State<AppState>) -> Json<ShippingPolicyView> {
    let rates = state.pricing();
    Json(ShippingPolicyView {
        flat_rate: Price::usd(rates.shipping_flat_rate).display(),
        free_shipping_threshold: rates
            .free_shipping_threshold
            .map(|threshold| Price::usd(threshold).display()),
    })
}
