use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An incoming payment request, supplied by the booking integration before
/// the flow starts. Never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub ticket_reference: String,
    pub amount: Decimal,
    pub currency_code: String,
    #[serde(default)]
    pub passenger_name: Option<String>,
    #[serde(default)]
    pub passenger_email: Option<String>,
    #[serde(default)]
    pub passenger_phone: Option<String>,
}

impl PaymentRequest {
    pub fn new(
        ticket_reference: impl Into<String>,
        amount: Decimal,
        currency_code: impl Into<String>,
    ) -> Self {
        Self {
            ticket_reference: ticket_reference.into(),
            amount,
            currency_code: currency_code.into(),
            passenger_name: None,
            passenger_email: None,
            passenger_phone: None,
        }
    }

    pub fn with_passenger(
        mut self,
        name: Option<&str>,
        email: Option<&str>,
        phone: Option<&str>,
    ) -> Self {
        self.passenger_name = name.map(str::to_string);
        self.passenger_email = email.map(str::to_string);
        self.passenger_phone = phone.map(str::to_string);
        self
    }

    /// The passenger email, if present and not blank.
    pub fn identity_key(&self) -> Option<&str> {
        self.passenger_email
            .as_deref()
            .map(str::trim)
            .filter(|email| !email.is_empty())
    }

    /// Amount rendered for display, e.g. `£ 550.00`. Unknown currencies fall
    /// back to their ISO code.
    pub fn display_amount(&self) -> String {
        let symbol = match self.currency_code.to_ascii_uppercase().as_str() {
            "GBP" => "£".to_string(),
            "USD" => "$".to_string(),
            "EUR" => "€".to_string(),
            "NGN" => "₦".to_string(),
            other => other.to_string(),
        };
        let mut amount = self.amount.round_dp(2);
        amount.rescale(2);
        format!("{} {}", symbol, amount)
    }
}
