//! Reset and merge rules over the mutable [`PayerRecord`].
//!
//! Every function takes the current record by value and returns the next one,
//! so the controller can swap its record in a single assignment.

use super::payer::{EntityType, PayerEdit, PayerRecord};
use super::payment::PaymentRequest;

/// Hard compliance reset used when somebody other than the passenger pays.
///
/// No field from a previous passenger prefill may survive, so this never looks
/// at the current record at all.
pub fn reset_for_third_party() -> PayerRecord {
    PayerRecord::default()
}

/// Prefills a record from the passenger data on the payment request.
///
/// The passenger name is split on its first whitespace run; everything after
/// it becomes the last name.
pub fn prefill_for_self(request: &PaymentRequest) -> PayerRecord {
    let name = request.passenger_name.as_deref().unwrap_or("").trim();
    let (first_name, last_name) = match name.split_once(char::is_whitespace) {
        Some((first, rest)) => (first.to_string(), rest.trim_start().to_string()),
        None => (name.to_string(), String::new()),
    };

    PayerRecord {
        first_name,
        last_name,
        email: request.passenger_email.clone().unwrap_or_default(),
        phone: request.passenger_phone.clone().unwrap_or_default(),
        ..PayerRecord::default()
    }
}

pub fn apply_entity_type_change(mut record: PayerRecord, new_type: EntityType) -> PayerRecord {
    if new_type == EntityType::Individual {
        record.company_name.clear();
        record.registration_number.clear();
    }
    record
}

/// Shallow merge; later entries for the same field win. No validation here.
pub fn merge_edit(mut record: PayerRecord, edit: &PayerEdit) -> PayerRecord {
    for (field, value) in &edit.0 {
        record.set(*field, value.clone());
    }
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payer::{DEFAULT_COUNTRY, PayerField};
    use rust_decimal_macros::dec;

    fn passenger_request() -> PaymentRequest {
        PaymentRequest::new("BNSCD1234567788TG", dec!(550.00), "GBP").with_passenger(
            Some("John Doe"),
            Some("john.doe@email.com"),
            Some("+44 7911 123456"),
        )
    }

    #[test]
    fn test_prefill_for_self_splits_name_and_copies_contact() {
        let record = prefill_for_self(&passenger_request());
        assert_eq!(record.first_name, "John");
        assert_eq!(record.last_name, "Doe");
        assert_eq!(record.email, "john.doe@email.com");
        assert_eq!(record.phone, "+44 7911 123456");
        assert_eq!(record.date_of_birth, "");
        assert_eq!(record.address_line1, "");
        assert_eq!(record.country, DEFAULT_COUNTRY);
    }

    #[test]
    fn test_prefill_for_self_keeps_multi_part_last_name() {
        let request = PaymentRequest::new("T1", dec!(1), "GBP").with_passenger(
            Some("  Mary   Ann de Souza "),
            None,
            None,
        );
        let record = prefill_for_self(&request);
        assert_eq!(record.first_name, "Mary");
        assert_eq!(record.last_name, "Ann de Souza");
        assert_eq!(record.email, "");
        assert_eq!(record.phone, "");
    }

    #[test]
    fn test_prefill_for_self_without_passenger_name() {
        let request = PaymentRequest::new("T1", dec!(1), "GBP");
        let record = prefill_for_self(&request);
        assert_eq!(record, PayerRecord::default());
    }

    #[test]
    fn test_reset_for_third_party_drops_prefill() {
        let prefilled = prefill_for_self(&passenger_request());
        assert_ne!(prefilled, PayerRecord::default());

        let reset = reset_for_third_party();
        assert_eq!(reset, PayerRecord::default());
        assert_eq!(reset_for_third_party(), reset);
    }

    #[test]
    fn test_entity_change_to_individual_clears_company_fields() {
        let record = PayerRecord {
            company_name: "Acme Ltd".to_string(),
            registration_number: "12345678".to_string(),
            ..PayerRecord::default()
        };

        let kept = apply_entity_type_change(record.clone(), EntityType::Company);
        assert_eq!(kept.company_name, "Acme Ltd");

        let cleared = apply_entity_type_change(record, EntityType::Individual);
        assert_eq!(cleared.company_name, "");
        assert_eq!(cleared.registration_number, "");
    }

    #[test]
    fn test_merge_edit_applies_every_field() {
        let edit = PayerEdit::new()
            .set(PayerField::City, "London")
            .set(PayerField::PostalCode, "SW1A 1AA")
            .set(PayerField::City, "Manchester");

        let record = merge_edit(PayerRecord::default(), &edit);
        assert_eq!(record.city, "Manchester");
        assert_eq!(record.postal_code, "SW1A 1AA");
        assert_eq!(record.first_name, "");
    }
}
