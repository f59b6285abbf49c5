//! Card details captured on the payment step.
//!
//! The card number and CVV are held as [`SecretString`]s: they are handed to
//! the order placement service and never logged or serialized. Only the last
//! four digits survive into the order record.

use core::fmt;

use secrecy::{ExposeSecret, SecretString};

const MIN_CARD_DIGITS: usize = 16;
const MAX_CARD_DIGITS: usize = 19;
const MIN_HOLDER_LEN: usize = 3;

/// Errors that can occur when parsing [`PaymentDetails`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PaymentError {
    /// The card number contains something other than digits, spaces or dashes.
    #[error("card number may only contain digits")]
    CardNumberNotNumeric,
    /// The card number has the wrong number of digits.
    #[error("card number must be 16-19 digits (got {0})")]
    CardNumberLength(usize),
    /// The cardholder name is too short.
    #[error("cardholder name is required")]
    CardHolderTooShort,
    /// The expiry date is not `MM/YY`.
    #[error("expiry date must be in MM/YY format")]
    InvalidExpiry,
    /// The CVV is not 3-4 digits.
    #[error("CVV must be 3 or 4 digits")]
    InvalidCvv,
}

/// Validated card details.
pub struct PaymentDetails {
    card_number: SecretString,
    card_holder: String,
    exp_month: u8,
    exp_year: u8,
    cvv: SecretString,
}

impl PaymentDetails {
    /// Parse card details as entered on the payment form.
    ///
    /// Spaces and dashes in the card number are ignored.
    ///
    /// # Errors
    ///
    /// Returns the first `PaymentError` found, checking fields in form order.
    pub fn parse(
        card_number: &str,
        card_holder: &str,
        exp_date: &str,
        cvv: &str,
    ) -> Result<Self, PaymentError> {
        let digits: String = card_number
            .chars()
            .filter(|c| !matches!(c, ' ' | '-'))
            .collect();
        if !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(PaymentError::CardNumberNotNumeric);
        }
        if !(MIN_CARD_DIGITS..=MAX_CARD_DIGITS).contains(&digits.len()) {
            return Err(PaymentError::CardNumberLength(digits.len()));
        }

        let card_holder = card_holder.trim();
        if card_holder.chars().count() < MIN_HOLDER_LEN {
            return Err(PaymentError::CardHolderTooShort);
        }

        let (exp_month, exp_year) = parse_expiry(exp_date.trim())?;

        let cvv = cvv.trim();
        if !(3..=4).contains(&cvv.len()) || !cvv.chars().all(|c| c.is_ascii_digit()) {
            return Err(PaymentError::InvalidCvv);
        }

        Ok(Self {
            card_number: SecretString::from(digits),
            card_holder: card_holder.to_owned(),
            exp_month,
            exp_year,
            cvv: SecretString::from(cvv.to_owned()),
        })
    }

    /// Card number digits, without separators.
    #[must_use]
    pub const fn card_number(&self) -> &SecretString {
        &self.card_number
    }

    #[must_use]
    pub const fn cvv(&self) -> &SecretString {
        &self.cvv
    }

    #[must_use]
    pub fn card_holder(&self) -> &str {
        &self.card_holder
    }

    /// Last four digits of the card number.
    #[must_use]
    pub fn last4(&self) -> String {
        let digits = self.card_number.expose_secret();
        digits
            .get(digits.len().saturating_sub(4)..)
            .unwrap_or_default()
            .to_owned()
    }

    /// Expiry as `MM/YY`.
    #[must_use]
    pub fn expiry(&self) -> String {
        format!("{:02}/{:02}", self.exp_month, self.exp_year)
    }
}

impl fmt::Debug for PaymentDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let masked = format!("**** {}", self.last4());
        f.debug_struct("PaymentDetails")
            .field("card_number", &masked)
            .field("card_holder", &self.card_holder)
            .field("expiry", &self.expiry())
            .field("cvv", &"[REDACTED]")
            .finish()
    }
}

fn parse_expiry(value: &str) -> Result<(u8, u8), PaymentError> {
    let (month, year) = value.split_once('/').ok_or(PaymentError::InvalidExpiry)?;
    if month.len() != 2 || year.len() != 2 {
        return Err(PaymentError::InvalidExpiry);
    }
    let month: u8 = month.parse().map_err(|_| PaymentError::InvalidExpiry)?;
    let year: u8 = year.parse().map_err(|_| PaymentError::InvalidExpiry)?;
    if !(1..=12).contains(&month) {
        return Err(PaymentError::InvalidExpiry);
    }
    Ok((month, year))
}

/// Group the digits of a card number in fours ("1234 5678 9012 3456").
#[must_use]
pub fn format_card_number(input: &str) -> String {
    let digits: Vec<char> = input.chars().filter(char::is_ascii_digit).collect();
    digits
        .chunks(4)
        .map(|chunk| chunk.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Format raw expiry input as `MM/YY`, inserting the slash once two digits
/// have been typed.
#[must_use]
pub fn format_exp_date(input: &str) -> String {
    let digits: String = input.chars().filter(char::is_ascii_digit).take(4).collect();
    if digits.len() >= 2 {
        let (month, year) = digits.split_at(2);
        format!("{month}/{year}")
    } else {
        digits
    }
}
