//! Turns a postcode and house number into a payer address edit.

use crate::domain::payer::PayerEdit;
use crate::domain::ports::AddressLookup;
use crate::error::{FlowError, Result};
use std::time::Duration;
use tokio::time;
use tracing::{debug, warn};

/// Looks the postcode up and builds the edit from its first street.
///
/// The lookup is bounded by `limit` like every other external call.
pub async fn address_edit(
    lookup: &dyn AddressLookup,
    postcode: &str,
    house_number: &str,
    limit: Duration,
) -> Result<PayerEdit> {
    let found = match time::timeout(limit, lookup.lookup(postcode)).await {
        Ok(found) => found?,
        Err(_) => {
            warn!(timeout_ms = limit.as_millis() as u64, "Address lookup timed out");
            return Err(FlowError::AddressLookupError(format!(
                "lookup for {} timed out",
                postcode
            )));
        }
    };

    let Some(address) = found.first() else {
        return Err(FlowError::ValidationError(format!(
            "No addresses found for postcode {}",
            postcode
        )));
    };
    if found.len() > 1 {
        debug!(street = %address.street, choices = found.len(), "Using first street for postcode");
    }
    address.to_edit(house_number).ok_or_else(|| {
        FlowError::ValidationError("A house or flat number is required".to_string())
    })
}
