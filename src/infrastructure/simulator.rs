//! Simulated KYC, bank and postcode lookup services.
//!
//! The rules here only exist to make every failure path reproducible. A real
//! verifier replaces [`SimulatedVerifier`] behind the same port and returns the
//! same outcome shape.

use crate::config::SimulatorConfig;
use crate::domain::address::{MAX_SUGGESTIONS, MIN_SUGGESTION_PREFIX, PostcodeAddress, postcode_key};
use crate::domain::flow::BankHandoff;
use crate::domain::payer::PayerRecord;
use crate::domain::payment::PaymentRequest;
use crate::domain::ports::{AddressLookup, BankConnector, IdentityVerifier, SharedClock};
use crate::domain::verification::{FailureKind, VerificationOutcome};
use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Decides the outcome for a record. First matching rule wins.
pub fn simulate(record: &PayerRecord, config: &SimulatorConfig) -> VerificationOutcome {
    if !record.missing_required_fields().is_empty() {
        return VerificationOutcome::fail(
            FailureKind::MissingFields,
            "Missing required information.",
        );
    }

    let first_name = record.first_name.to_lowercase();
    if contains_any(&first_name, &config.name_triggers) {
        return VerificationOutcome::fail_on(
            FailureKind::NameMismatch,
            "Name could not be matched to the bank account holder.",
            "name",
        );
    }

    let postal_code = record.postal_code.to_lowercase();
    let address = format!("{}{}", record.address_line1, record.address_line2).to_lowercase();
    if contains_any(&postal_code, &config.postal_triggers)
        || contains_any(&address, &config.address_markers)
    {
        return VerificationOutcome::fail_on(
            FailureKind::AddressMismatch,
            "Address could not be matched to the bank account records.",
            "address",
        );
    }

    VerificationOutcome::Pass
}

fn contains_any(haystack: &str, needles: &[String]) -> bool {
    needles
        .iter()
        .filter(|needle| !needle.is_empty())
        .any(|needle| haystack.contains(&needle.to_lowercase()))
}

pub struct SimulatedVerifier {
    config: SimulatorConfig,
}

impl SimulatedVerifier {
    pub fn new(config: SimulatorConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl IdentityVerifier for SimulatedVerifier {
    async fn verify(&self, record: &PayerRecord) -> Result<VerificationOutcome> {
        if self.config.latency_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.latency_ms)).await;
        }
        let outcome = simulate(record, &self.config);
        debug!(?outcome, "Simulated verification finished");
        Ok(outcome)
    }
}

/// Stands in for the open-banking authorization launch.
pub struct SimulatedBankConnector {
    clock: SharedClock,
    latency: Duration,
}

impl SimulatedBankConnector {
    pub fn new(clock: SharedClock) -> Self {
        Self {
            clock,
            latency: Duration::ZERO,
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

#[async_trait]
impl BankConnector for SimulatedBankConnector {
    async fn connect(&self, request: &PaymentRequest, _payer: &PayerRecord) -> Result<BankHandoff> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let now = self.clock.now();
        Ok(BankHandoff {
            reference: format!("PBB-{}-{}", request.ticket_reference, now.timestamp()),
            ticket_reference: request.ticket_reference.clone(),
            amount: request.amount,
            currency_code: request.currency_code.clone(),
            started_at: now.to_rfc3339(),
        })
    }
}

/// Demo postcode table: `(postcode, street, city, county)`.
const DEMO_ADDRESSES: &[(&str, &str, &str, &str)] = &[
    ("SW1A 1AA", "Buckingham Palace", "London", "Westminster"),
    ("EC1A 1BB", "St Bartholomew's Hospital", "London", "City of London"),
    ("W1A 0AX", "BBC Broadcasting House", "London", "Westminster"),
    ("E1 6AN", "Whitechapel Road", "London", "Tower Hamlets"),
    ("E1 6AN", "Commercial Road", "London", "Tower Hamlets"),
    ("E1 6AN", "Mile End Road", "London", "Tower Hamlets"),
    ("M1 1AE", "Piccadilly Gardens", "Manchester", "Greater Manchester"),
    ("M1 1AE", "Market Street", "Manchester", "Greater Manchester"),
    ("B1 1AA", "Victoria Square", "Birmingham", "West Midlands"),
    ("B1 1AA", "New Street", "Birmingham", "West Midlands"),
    ("LS1 1UR", "Briggate", "Leeds", "West Yorkshire"),
    ("LS1 1UR", "The Headrow", "Leeds", "West Yorkshire"),
];

/// Postcode lookup over a fixed in-process table.
///
/// Matching ignores case and whitespace. Suggestions keep table order.
pub struct SimulatedAddressLookup {
    addresses: Vec<PostcodeAddress>,
    latency: Duration,
}

impl SimulatedAddressLookup {
    pub fn new() -> Self {
        let addresses = DEMO_ADDRESSES
            .iter()
            .map(|(postcode, street, city, county)| PostcodeAddress {
                postcode: postcode.to_string(),
                street: street.to_string(),
                city: city.to_string(),
                county: Some(county.to_string()),
            })
            .collect();
        Self::with_addresses(addresses)
    }

    pub fn with_addresses(addresses: Vec<PostcodeAddress>) -> Self {
        Self {
            addresses,
            latency: Duration::ZERO,
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    async fn wait(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

impl Default for SimulatedAddressLookup {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AddressLookup for SimulatedAddressLookup {
    async fn suggest(&self, partial: &str) -> Result<Vec<String>> {
        let prefix = postcode_key(partial);
        if prefix.chars().count() < MIN_SUGGESTION_PREFIX {
            return Ok(Vec::new());
        }
        self.wait().await;

        let mut suggestions: Vec<String> = Vec::new();
        for address in &self.addresses {
            if suggestions.len() == MAX_SUGGESTIONS {
                break;
            }
            if postcode_key(&address.postcode).starts_with(&prefix)
                && !suggestions.contains(&address.postcode)
            {
                suggestions.push(address.postcode.clone());
            }
        }
        debug!(%prefix, count = suggestions.len(), "Postcode suggestions");
        Ok(suggestions)
    }

    async fn lookup(&self, postcode: &str) -> Result<Vec<PostcodeAddress>> {
        self.wait().await;
        let key = postcode_key(postcode);
        let found: Vec<PostcodeAddress> = self
            .addresses
            .iter()
            .filter(|address| postcode_key(&address.postcode) == key)
            .cloned()
            .collect();
        debug!(postcode = %key, count = found.len(), "Postcode lookup");
        Ok(found)
    }
}
