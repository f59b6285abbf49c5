//! The cart and checkout engine driven end to end, with the storefront's
//! simulated order service as the placement collaborator.

use std::time::Duration;

use artifi_core::cart::{CART_STORAGE_KEY, MemoryStorage};
use artifi_core::checkout::{OrderPlacementError, PaymentDetails, ShippingInfo};
use artifi_core::{CartStore, Checkout, CheckoutError, CheckoutStep, NewCartItem, PricingConfig};
use artifi_integration_tests::{DECLINED_CARD, GOOD_CARD};
use artifi_storefront::services::{SimulatedOrderService, WithTimeout};
use rust_decimal::Decimal;

fn artwork(id: &str, cents: i64) -> NewCartItem {
    NewCartItem {
        id: id.to_string(),
        title: format!("Artwork {id}"),
        artist_name: "PixelMind".to_string(),
        price: Decimal::new(cents, 2),
        image: format!("/images/{id}.png"),
    }
}

fn shipping() -> ShippingInfo {
    ShippingInfo {
        full_name: "Ada Lovelace".to_string(),
        email: "ada@example.com".to_string(),
        address: "12 Analytical Way".to_string(),
        city: "London".to_string(),
        state: "LDN".to_string(),
        zip_code: "N1 9GU".to_string(),
        country: "United Kingdom".to_string(),
        phone: "+44 20 7946 0958".to_string(),
    }
}

fn card(number: &str) -> PaymentDetails {
    PaymentDetails::parse(number, "Ada Lovelace", "09/29", "123").expect("valid test card")
}

fn service() -> SimulatedOrderService {
    SimulatedOrderService::new(Duration::ZERO)
}

fn checkout_at_payment(cart: &CartStore<MemoryStorage>) -> Checkout {
    let mut checkout = Checkout::enter(None, cart.cart()).expect("cart has items");
    checkout.submit_shipping(shipping()).expect("complete shipping info");
    checkout
}

#[test]
fn test_duplicate_add_accumulates_quantity() {
    let mut cart = CartStore::new(MemoryStorage::new());

    cart.add_item(artwork("a", 10_000), 1).expect("valid item");
    cart.add_item(artwork("a", 10_000), 2).expect("valid item");

    assert_eq!(cart.cart().len(), 1);
    assert_eq!(cart.total_items(), 3);
    assert_eq!(cart.total_price(), Decimal::new(30_000, 2));
}

#[test]
fn test_set_quantity_zero_removes_item() {
    let mut cart = CartStore::new(MemoryStorage::new());
    cart.add_item(artwork("a", 1_000), 2).expect("valid item");
    cart.add_item(artwork("b", 2_000), 1).expect("valid item");

    cart.set_quantity("a", 0).expect("valid id");

    assert!(cart.cart().get("a").is_none());
    assert_eq!(cart.total_items(), 1);
}

#[test]
fn test_cart_survives_reload() {
    let mut cart = CartStore::new(MemoryStorage::new());
    cart.add_item(artwork("a", 5_000), 1).expect("valid item");
    cart.add_item(artwork("b", 3_000), 2).expect("valid item");

    let storage = cart.into_storage();
    assert!(storage.raw(CART_STORAGE_KEY).is_some());

    let reloaded = CartStore::restore(storage);
    assert_eq!(reloaded.total_items(), 3);
    assert_eq!(reloaded.total_price(), Decimal::new(11_000, 2));
    assert_eq!(
        reloaded.cart().get("b").map(|item| item.image.as_str()),
        Some("/images/b.png")
    );
}

#[tokio::test]
async fn test_decline_then_retry_reaches_confirmation() {
    let mut cart = CartStore::new(MemoryStorage::new());
    cart.add_item(artwork("a", 5_000), 1).expect("valid item");
    cart.add_item(artwork("b", 3_000), 2).expect("valid item");
    let rates = PricingConfig::default();
    let mut checkout = checkout_at_payment(&cart);

    let err = checkout
        .place_order(&mut cart, &card(DECLINED_CARD), &service(), &rates)
        .await
        .expect_err("test card is declined");
    assert!(matches!(
        err,
        CheckoutError::Placement(OrderPlacementError::Declined(_))
    ));
    assert_eq!(checkout.step(), CheckoutStep::Payment);
    assert_eq!(cart.total_items(), 3);

    let order_id = checkout
        .place_order(&mut cart, &card(GOOD_CARD), &service(), &rates)
        .await
        .expect("good card is accepted");

    assert!(order_id.as_str().starts_with("ORD-"));
    assert_eq!(checkout.step(), CheckoutStep::Confirmation);
    assert!(cart.is_empty());
    assert_eq!(
        cart.storage().raw(CART_STORAGE_KEY),
        Some("[]"),
        "cleared cart is persisted"
    );

    let order = checkout.order().expect("confirmed order");
    assert_eq!(order.id(), &order_id);
    assert_eq!(order.totals().subtotal, Decimal::new(11_000, 2));
    assert_eq!(order.totals().shipping, Decimal::ZERO);
    assert_eq!(order.amount_due(), Decimal::new(11_880, 2));
}

#[tokio::test]
async fn test_flat_rate_order_totals() {
    let mut cart = CartStore::new(MemoryStorage::new());
    cart.add_item(artwork("a", 5_000), 1).expect("valid item");
    let mut checkout = checkout_at_payment(&cart);

    checkout
        .place_order(&mut cart, &card(GOOD_CARD), &service(), &PricingConfig::default())
        .await
        .expect("good card is accepted");

    let totals = *checkout.order().expect("confirmed order").totals();
    assert_eq!(totals.shipping, Decimal::new(999, 2));
    assert_eq!(totals.tax, Decimal::new(400, 2));
    assert_eq!(totals.amount_due(), Decimal::new(6_399, 2));
}

#[tokio::test]
async fn test_repeated_declines_never_touch_the_cart() {
    let mut cart = CartStore::new(MemoryStorage::new());
    cart.add_item(artwork("a", 29_999), 1).expect("valid item");
    cart.add_item(artwork("b", 19_999), 3).expect("valid item");
    let snapshot = cart
        .storage()
        .raw(CART_STORAGE_KEY)
        .map(str::to_string);
    let mut checkout = checkout_at_payment(&cart);

    for attempt in 1..=5 {
        let result = checkout
            .place_order(&mut cart, &card(DECLINED_CARD), &service(), &PricingConfig::default())
            .await;
        assert!(result.is_err());
        assert_eq!(checkout.failed_attempts(), attempt);
    }

    assert_eq!(cart.storage().raw(CART_STORAGE_KEY).map(str::to_string), snapshot);
    assert_eq!(cart.total_items(), 4);
    assert!(checkout.order().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_timed_out_placement_is_retryable() {
    let mut cart = CartStore::new(MemoryStorage::new());
    cart.add_item(artwork("a", 5_000), 1).expect("valid item");
    let mut checkout = checkout_at_payment(&cart);
    let slow = WithTimeout::new(
        SimulatedOrderService::new(Duration::from_secs(45)),
        Duration::from_secs(30),
    );

    let err = checkout
        .place_order(&mut cart, &card(GOOD_CARD), &slow, &PricingConfig::default())
        .await
        .expect_err("slower than the limit");

    assert_eq!(
        err,
        CheckoutError::Placement(OrderPlacementError::TimedOut(Duration::from_secs(30)))
    );
    assert_eq!(checkout.step(), CheckoutStep::Payment);
    assert!(!cart.is_empty());

    let fast = WithTimeout::new(service(), Duration::from_secs(30));
    checkout
        .place_order(&mut cart, &card(GOOD_CARD), &fast, &PricingConfig::default())
        .await
        .expect("retry succeeds");
    assert!(cart.is_empty());
}

#[test]
fn test_entering_checkout_with_empty_cart_is_refused() {
    let cart = CartStore::new(MemoryStorage::new());

    assert_eq!(
        Checkout::enter(None, cart.cart()),
        Err(CheckoutError::EmptyCart)
    );
}
