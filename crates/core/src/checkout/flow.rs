//! The checkout state machine.
//!
//! ```text
//! Shipping ──submit_shipping──▶ Payment ──place_order (ok)──▶ Confirmation
//!     ▲                          │   ▲
//!     └──────back_to_shipping────┘   └── place_order (err): stay, count attempt
//! ```
//!
//! The cart is only cleared inside a successful `place_order`, after the
//! order snapshot has been taken. A failed placement never touches the cart.

use core::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::cart::{Cart, CartStorage, CartStore};
use crate::pricing::{OrderTotals, PricingConfig};
use crate::types::OrderId;

use super::order::Order;
use super::payment::{PaymentDetails, PaymentError};
use super::placement::{OrderPlacement, OrderPlacementError, OrderRequest};
use super::shipping::{ShippingInfo, ShippingInfoError};

/// The three checkout stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStep {
    Shipping,
    Payment,
    Confirmation,
}

impl CheckoutStep {
    /// 1-based position in the step indicator.
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::Shipping => 1,
            Self::Payment => 2,
            Self::Confirmation => 3,
        }
    }

    /// Fill of the progress bar between steps.
    #[must_use]
    pub const fn progress_percent(self) -> u8 {
        match self {
            Self::Shipping => 0,
            Self::Payment => 50,
            Self::Confirmation => 100,
        }
    }
}

impl fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Shipping => "shipping",
            Self::Payment => "payment",
            Self::Confirmation => "confirmation",
        })
    }
}

/// Errors from checkout transitions.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    /// There is nothing to buy; the caller should leave the checkout.
    #[error("cart is empty")]
    EmptyCart,
    /// The requested action is not available at the current step.
    #[error("cannot {action} during the {step} step")]
    InvalidTransition {
        step: CheckoutStep,
        action: &'static str,
    },
    #[error(transparent)]
    Shipping(#[from] ShippingInfoError),
    #[error(transparent)]
    Payment(#[from] PaymentError),
    #[error(transparent)]
    Placement(#[from] OrderPlacementError),
}

/// Checkout progress for one visitor.
///
/// Serializable so it can live in the visitor's session between requests.
/// Payment details are never part of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Checkout {
    /// Collecting shipping info. `draft` pre-fills the form.
    Shipping { draft: ShippingInfo },
    /// Shipping captured, waiting for a successful order placement.
    Payment {
        shipping: ShippingInfo,
        failed_attempts: u32,
        last_error: Option<String>,
    },
    /// Terminal: the order has been placed and the cart cleared.
    Confirmation { order: Order },
}

impl Default for Checkout {
    fn default() -> Self {
        Self::new()
    }
}

impl Checkout {
    /// A fresh checkout on the shipping step.
    #[must_use]
    pub fn new() -> Self {
        Self::Shipping {
            draft: ShippingInfo::draft(),
        }
    }

    /// Enter (or re-enter) the checkout.
    ///
    /// A just-completed order keeps showing its confirmation while the cart
    /// is empty. Otherwise an empty cart is refused, an in-progress checkout
    /// is resumed, and anything else starts fresh.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::EmptyCart` when there is nothing to buy.
    pub fn enter(previous: Option<Self>, cart: &Cart) -> Result<Self, CheckoutError> {
        match previous {
            Some(done @ Self::Confirmation { .. }) if cart.is_empty() => Ok(done),
            _ if cart.is_empty() => Err(CheckoutError::EmptyCart),
            Some(Self::Confirmation { .. }) | None => Ok(Self::new()),
            Some(in_progress) => Ok(in_progress),
        }
    }

    #[must_use]
    pub const fn step(&self) -> CheckoutStep {
        match self {
            Self::Shipping { .. } => CheckoutStep::Shipping,
            Self::Payment { .. } => CheckoutStep::Payment,
            Self::Confirmation { .. } => CheckoutStep::Confirmation,
        }
    }

    /// Shipping info as currently known: the draft on the shipping step, the
    /// captured info afterwards.
    #[must_use]
    pub fn shipping_info(&self) -> &ShippingInfo {
        match self {
            Self::Shipping { draft } => draft,
            Self::Payment { shipping, .. } => shipping,
            Self::Confirmation { order } => order.shipping(),
        }
    }

    /// The placed order, once confirmed.
    #[must_use]
    pub const fn order(&self) -> Option<&Order> {
        match self {
            Self::Confirmation { order } => Some(order),
            _ => None,
        }
    }

    /// Failed placement attempts on the current payment step.
    #[must_use]
    pub const fn failed_attempts(&self) -> u32 {
        match self {
            Self::Payment {
                failed_attempts, ..
            } => *failed_attempts,
            _ => 0,
        }
    }

    /// Message from the most recent failed placement, for display.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        match self {
            Self::Payment { last_error, .. } => last_error.as_deref(),
            _ => None,
        }
    }

    /// Capture shipping info and move to the payment step.
    ///
    /// Invalid info stays on the shipping step as the new draft.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::Shipping` if required fields are blank, or
    /// `CheckoutError::InvalidTransition` outside the shipping step.
    pub fn submit_shipping(&mut self, info: ShippingInfo) -> Result<(), CheckoutError> {
        let Self::Shipping { draft } = self else {
            return Err(self.invalid("submit shipping info"));
        };

        if let Err(e) = info.validate() {
            *draft = info;
            return Err(e.into());
        }

        *self = Self::Payment {
            shipping: info,
            failed_attempts: 0,
            last_error: None,
        };
        Ok(())
    }

    /// Return from payment to shipping, keeping the captured info as the
    /// draft.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::InvalidTransition` outside the payment step.
    pub fn back_to_shipping(&mut self) -> Result<(), CheckoutError> {
        let Self::Payment { shipping, .. } = self else {
            return Err(self.invalid("go back to shipping"));
        };
        let draft = std::mem::take(shipping);
        *self = Self::Shipping { draft };
        Ok(())
    }

    /// Place the order and, on success, clear the cart and confirm.
    ///
    /// The cart snapshot and totals are taken before the placement call. On
    /// failure the checkout stays on the payment step with the attempt
    /// recorded, and the cart is untouched.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::InvalidTransition` outside the payment step,
    /// `CheckoutError::EmptyCart` if the cart emptied in the meantime, or
    /// `CheckoutError::Placement` if the service rejects the order.
    #[instrument(skip_all, fields(step = %self.step()))]
    pub async fn place_order<S, P>(
        &mut self,
        cart: &mut CartStore<S>,
        payment: &PaymentDetails,
        service: &P,
        rates: &PricingConfig,
    ) -> Result<OrderId, CheckoutError>
    where
        S: CartStorage,
        P: OrderPlacement,
    {
        let Self::Payment { shipping, .. } = &*self else {
            return Err(self.invalid("place an order"));
        };
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let shipping = shipping.clone();
        let items = cart.cart().items().to_vec();
        let totals = OrderTotals::for_cart(cart.cart(), rates);
        let request = OrderRequest {
            items: &items,
            shipping: &shipping,
            payment,
            totals: &totals,
        };

        match service.place_order(&request).await {
            Ok(confirmation) => {
                let order_id = confirmation.order_id;
                let order = Order::new(
                    order_id.clone(),
                    items,
                    shipping,
                    totals,
                    payment.last4(),
                    Utc::now(),
                );
                cart.clear();
                info!(
                    order_id = %order_id,
                    amount_due = %order.amount_due(),
                    items = order.item_count(),
                    "order placed"
                );
                *self = Self::Confirmation { order };
                Ok(order_id)
            }
            Err(error) => {
                if let Self::Payment {
                    failed_attempts,
                    last_error,
                    ..
                } = self
                {
                    *failed_attempts = failed_attempts.saturating_add(1);
                    *last_error = Some(error.to_string());
                }
                warn!(error = %error, attempts = self.failed_attempts(), "order placement failed");
                Err(error.into())
            }
        }
    }

    const fn invalid(&self, action: &'static str) -> CheckoutError {
        CheckoutError::InvalidTransition {
            step: self.step(),
            action,
        }
    }
}
