use super::payer::{PayerEdit, PayerField};
use serde::{Deserialize, Serialize};

/// Characters a partial postcode needs before suggestions are offered.
pub const MIN_SUGGESTION_PREFIX: usize = 2;
/// Most postcode suggestions returned for one partial input.
pub const MAX_SUGGESTIONS: usize = 5;

/// A street registered under a UK postcode.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PostcodeAddress {
    pub postcode: String,
    pub street: String,
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub county: Option<String>,
}

impl PostcodeAddress {
    /// Address fields for the payer record once the house or flat number is
    /// known. `None` while the number is blank.
    pub fn to_edit(&self, house_number: &str) -> Option<PayerEdit> {
        let house_number = house_number.trim();
        if house_number.is_empty() {
            return None;
        }
        Some(
            PayerEdit::new()
                .set(
                    PayerField::AddressLine1,
                    format!("{}, {}", house_number, self.street),
                )
                .set(PayerField::City, self.city.clone())
                .set(PayerField::PostalCode, self.postcode.clone()),
        )
    }
}

/// Uppercased postcode with all whitespace removed, used for matching.
pub fn postcode_key(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}
