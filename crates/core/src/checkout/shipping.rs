//! Shipping contact and address.

use serde::{Deserialize, Serialize};

/// Shipping info is missing one or more required fields.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("missing required shipping fields: {}", .0.join(", "))]
pub struct ShippingInfoError(pub Vec<&'static str>);

/// Where and to whom the order ships.
///
/// Every field is required. Format checks (email syntax, postal codes) are
/// the form layer's job; here a field only has to be non-blank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingInfo {
    pub full_name: String,
    pub email: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    pub phone: String,
}

impl ShippingInfo {
    /// Country pre-filled on a fresh form.
    pub const DEFAULT_COUNTRY: &'static str = "United States";

    /// An empty form with the default country filled in.
    #[must_use]
    pub fn draft() -> Self {
        Self {
            country: Self::DEFAULT_COUNTRY.to_string(),
            ..Self::default()
        }
    }

    /// Labels of the required fields that are blank, in form order.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("full name", &self.full_name),
            ("email", &self.email),
            ("address", &self.address),
            ("city", &self.city),
            ("state", &self.state),
            ("zip code", &self.zip_code),
            ("country", &self.country),
            ("phone", &self.phone),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(label, _)| label)
        .collect()
    }

    /// Check that all required fields are present.
    ///
    /// # Errors
    ///
    /// Returns `ShippingInfoError` listing every blank field.
    pub fn validate(&self) -> Result<(), ShippingInfoError> {
        let missing = self.missing_fields();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ShippingInfoError(missing))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> ShippingInfo {
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

    #[test]
    fn test_complete_info_is_valid() {
        assert!(complete().validate().is_ok());
    }

    #[test]
    fn test_blank_fields_are_reported_in_order() {
        let info = ShippingInfo {
            email: "   ".to_string(),
            phone: String::new(),
            ..complete()
        };
        let err = info.validate().unwrap_err();
        assert_eq!(err.0, vec!["email", "phone"]);
        assert_eq!(err.to_string(), "missing required shipping fields: email, phone");
    }

    #[test]
    fn test_draft_prefills_country_only() {
        let draft = ShippingInfo::draft();
        assert_eq!(draft.country, "United States");
        assert_eq!(draft.missing_fields().len(), 7);
    }
}
