#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use payer_flow::application::controller::FlowController;
use payer_flow::application::profile_store::PayerProfileStore;
use payer_flow::config::{FlowConfig, SimulatorConfig};
use payer_flow::domain::payer::{PayerEdit, PayerField, PayerRecord};
use payer_flow::domain::payment::PaymentRequest;
use payer_flow::domain::ports::{IdentityVerifier, IdentityVerifierBox, SharedClock};
use payer_flow::domain::verification::VerificationOutcome;
use payer_flow::error::{FlowError, Result};
use payer_flow::infrastructure::clock::FixedClock;
use payer_flow::infrastructure::in_memory::InMemoryProfileMedium;
use payer_flow::infrastructure::simulator::{SimulatedBankConnector, SimulatedVerifier};
use rand::Rng;
use rand::seq::SliceRandom;
use rust_decimal_macros::dec;
use std::path::Path;
use std::sync::Arc;

pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
}

pub fn passenger_request(email: Option<&str>) -> PaymentRequest {
    PaymentRequest::new("BNSCD1234567788TG", dec!(550.00), "GBP").with_passenger(
        Some("John Doe"),
        email,
        Some("+44 7911 123456"),
    )
}

/// Fills the fields a passenger prefill leaves blank.
pub fn remaining_details() -> PayerEdit {
    PayerEdit::new()
        .set(PayerField::DateOfBirth, "1985-02-14")
        .set(PayerField::AddressLine1, "1 High Street")
        .set(PayerField::City, "London")
        .set(PayerField::PostalCode, "SW1A 1AA")
}

pub fn third_party_details(first_name: &str) -> PayerEdit {
    remaining_details()
        .set(PayerField::FirstName, first_name)
        .set(PayerField::LastName, "Payer")
        .set(PayerField::Email, "payer@example.com")
        .set(PayerField::Phone, "+44 7000 000000")
}

pub fn verified_record(email: &str) -> PayerRecord {
    PayerRecord {
        first_name: "John".to_string(),
        last_name: "Doe".to_string(),
        email: email.to_string(),
        phone: "+44 7911 123456".to_string(),
        date_of_birth: "1985-02-14".to_string(),
        address_line1: "1 High Street".to_string(),
        city: "London".to_string(),
        postal_code: "SW1A 1AA".to_string(),
        ..PayerRecord::default()
    }
}

/// Everything a test needs to build flows that share one medium and clock.
pub struct Harness {
    pub medium: InMemoryProfileMedium,
    pub clock: FixedClock,
    pub config: FlowConfig,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            medium: InMemoryProfileMedium::new(),
            clock: FixedClock::new(now()),
            config: FlowConfig::default(),
        }
    }

    pub fn shared_clock(&self) -> SharedClock {
        Arc::new(self.clock.clone())
    }

    pub fn store(&self) -> PayerProfileStore {
        PayerProfileStore::new(
            Box::new(self.medium.clone()),
            self.shared_clock(),
            self.config.validity_window(),
        )
    }

    pub fn controller(&self, request: PaymentRequest) -> FlowController {
        self.controller_with(
            request,
            Box::new(SimulatedVerifier::new(SimulatorConfig::default())),
        )
    }

    pub fn controller_with(
        &self,
        request: PaymentRequest,
        verifier: IdentityVerifierBox,
    ) -> FlowController {
        FlowController::new(
            request,
            self.store(),
            verifier,
            Box::new(SimulatedBankConnector::new(self.shared_clock())),
            self.config.clone(),
        )
    }
}

/// A verifier whose backend is down.
pub struct UnavailableVerifier;

#[async_trait]
impl IdentityVerifier for UnavailableVerifier {
    async fn verify(&self, _record: &PayerRecord) -> Result<VerificationOutcome> {
        Err(FlowError::VerifierError("503 Service Unavailable".to_string()))
    }
}

/// Writes an intent script. Each row is `(intent, field, value)`.
pub fn write_script(path: &Path, rows: &[(&str, &str, &str)]) -> std::io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_path(path)?;
    wtr.write_record(["intent", "field", "value"])?;
    for (intent, field, value) in rows {
        wtr.write_record([intent, field, value])?;
    }
    wtr.flush()
}

pub fn write_request(path: &Path, email: &str) -> std::io::Result<()> {
    let request = passenger_request(Some(email));
    std::fs::write(path, serde_json::to_vec_pretty(&request)?)
}

/// Script rows that take a third-party payer named `first_name` to REVIEW
/// and confirm `confirmations` times.
pub fn third_party_script(first_name: &str, confirmations: usize) -> Vec<(&str, &str, &str)> {
    let mut rows = vec![
        ("select_payer_mode", "", "third_party"),
        ("edit_field", "firstName", first_name),
        ("edit_field", "lastName", "Payer"),
        ("edit_field", "email", "payer@example.com"),
        ("edit_field", "phone", "+44 7000 000000"),
        ("edit_field", "dateOfBirth", "1985-02-14"),
        ("edit_field", "addressLine1", "1 High Street"),
        ("edit_field", "city", "London"),
        ("edit_field", "postalCode", "SW1A 1AA"),
        ("submit_details", "", ""),
    ];
    rows.extend(std::iter::repeat_n(("confirm_and_submit", "", ""), confirmations));
    rows
}

const NAMES: [&str; 6] = ["Alice", "Carol", "Dmitri", "Eun-ji", "Oluwaseun", "Zoë"];
const STREETS: [&str; 4] = ["High Street", "Station Road", "Church Lane", "Mill Way"];
const CITIES: [&str; 4] = ["London", "Leeds", "Cardiff", "Glasgow"];

/// A complete record that contains none of the default simulator triggers.
pub fn random_record<R: Rng>(rng: &mut R) -> PayerRecord {
    let first_name = NAMES.choose(rng).copied().unwrap_or("Alice");
    PayerRecord {
        first_name: first_name.to_string(),
        last_name: format!("Smith{}", rng.gen_range(1..1000)),
        email: format!("{}{}@example.com", first_name.to_lowercase(), rng.gen_range(1..10_000)),
        phone: format!("+44 7{:09}", rng.gen_range(0..1_000_000_000u32)),
        date_of_birth: format!(
            "{}-{:02}-{:02}",
            rng.gen_range(1940..2005),
            rng.gen_range(1..=12),
            rng.gen_range(1..=28)
        ),
        address_line1: format!(
            "{} {}",
            rng.gen_range(1..300),
            STREETS.choose(rng).copied().unwrap_or("High Street")
        ),
        city: CITIES.choose(rng).copied().unwrap_or("London").to_string(),
        postal_code: format!("AB{} {}CD", rng.gen_range(1..99), rng.gen_range(1..9)),
        ..PayerRecord::default()
    }
}
