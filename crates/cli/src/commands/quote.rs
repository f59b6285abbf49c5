//! Price quote for a saved cart.
//!
//! # Usage
//!
//! ```bash
//! artifi-cli quote cart.json
//! artifi-cli quote cart.json --json
//! ```
//!
//! The file holds a cart snapshot as stored by the storefront: a JSON array
//! of `{id, title, artistName, price, image, quantity}` objects. Rates come
//! from the same `ARTIFI_*` variables the storefront reads.

use std::fmt::Write as _;
use std::path::Path;

use artifi_core::{Cart, CartItem, OrderTotals, Price, PricingConfig};
use rust_decimal::Decimal;

/// Errors from producing a quote.
#[derive(Debug, thiserror::Error)]
pub enum QuoteError {
    #[error("Could not read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Not a cart snapshot: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Config(#[from] artifi_storefront::config::ConfigError),
}

/// Print the order summary for a cart snapshot file.
///
/// # Errors
///
/// Returns `QuoteError` if the file cannot be read or parsed, or the rate
/// variables are invalid.
pub async fn run(file_path: &Path, as_json: bool) -> Result<(), QuoteError> {
    dotenvy::dotenv().ok();
    let rates = artifi_storefront::config::pricing_from_env()?;

    let raw = tokio::fs::read_to_string(file_path)
        .await
        .map_err(|source| QuoteError::Read {
            path: file_path.display().to_string(),
            source,
        })?;
    let cart = parse_snapshot(&raw)?;
    let totals = OrderTotals::for_cart(&cart, &rates);

    tracing::info!(lines = cart.len(), items = cart.total_items(), "Quoting cart");

    let output = if as_json {
        serde_json::to_string_pretty(&totals)?
    } else {
        render(&cart, &totals, &rates)
    };

    #[allow(clippy::print_stdout)]
    {
        println!("{output}");
    }
    Ok(())
}

/// Parse a snapshot the same way the storefront restores one.
fn parse_snapshot(raw: &str) -> Result<Cart, serde_json::Error> {
    let items: Vec<CartItem> = serde_json::from_str(raw)?;
    Ok(Cart::from_snapshot(items))
}

/// Plain-text order summary.
fn render(cart: &Cart, totals: &OrderTotals, rates: &PricingConfig) -> String {
    let mut out = String::new();

    for item in cart.items() {
        let _ = writeln!(
            out,
            "{:>3} x {} by {} @ {} = {}",
            item.quantity,
            item.title,
            item.artist_name,
            Price::usd(item.price).display(),
            Price::usd(item.line_total()).display(),
        );
    }
    if cart.is_empty() {
        out.push_str("(empty cart)\n");
    }

    let shipping = if totals.ships_free() {
        "FREE".to_string()
    } else {
        Price::usd(totals.shipping).display()
    };
    let tax_percent = rates.tax_rate * Decimal::ONE_HUNDRED;

    let _ = writeln!(
        out,
        "Subtotal ({} items): {}",
        cart.total_items(),
        Price::usd(totals.subtotal).display()
    );
    let _ = writeln!(out, "Shipping: {shipping}");
    let _ = writeln!(
        out,
        "Tax ({}%): {}",
        tax_percent.normalize(),
        Price::usd(totals.tax).display()
    );
    let _ = write!(out, "Total: {}", Price::usd(totals.amount_due()).display());
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SNAPSHOT: &str = r#"[
        {"id": "art-1", "title": "Digital Dreams", "artistName": "AI Artist", "price": "50.00", "image": "", "quantity": 1},
        {"id": "art-2", "title": "Neon Garden", "artistName": "PixelMind", "price": "30.00", "image": "", "quantity": 2}
    ]"#;

    #[test]
    fn test_render_free_shipping_quote() {
        let cart = parse_snapshot(SNAPSHOT).unwrap();
        let rates = PricingConfig::default();
        let totals = OrderTotals::for_cart(&cart, &rates);

        let text = render(&cart, &totals, &rates);

        assert!(text.contains("1 x Digital Dreams by AI Artist @ $50.00 = $50.00"));
        assert!(text.contains("2 x Neon Garden by PixelMind @ $30.00 = $60.00"));
        assert!(text.contains("Subtotal (3 items): $110.00"));
        assert!(text.contains("Shipping: FREE"));
        assert!(text.contains("Tax (8%): $8.80"));
        assert!(text.ends_with("Total: $118.80"));
    }

    #[test]
    fn test_render_flat_rate_quote() {
        let cart = parse_snapshot(
            r#"[{"id": "a", "title": "Small Study", "artistName": "Ada", "price": "50.00", "image": "", "quantity": 1}]"#,
        )
        .unwrap();
        let rates = PricingConfig::default();
        let totals = OrderTotals::for_cart(&cart, &rates);

        let text = render(&cart, &totals, &rates);

        assert!(text.contains("Shipping: $9.99"));
        assert!(text.ends_with("Total: $63.99"));
    }

    #[test]
    fn test_empty_snapshot() {
        let cart = parse_snapshot("[]").unwrap();
        let rates = PricingConfig::default();
        let totals = OrderTotals::for_cart(&cart, &rates);

        assert!(render(&cart, &totals, &rates).contains("(empty cart)"));
    }

    #[test]
    fn test_malformed_snapshot_is_an_error() {
        assert!(parse_snapshot("{\"not\": \"a cart\"}").is_err());
    }
}
