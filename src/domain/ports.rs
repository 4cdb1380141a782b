use super::address::PostcodeAddress;
use super::flow::BankHandoff;
use super::payer::PayerRecord;
use super::payment::PaymentRequest;
use super::verification::VerificationOutcome;
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Key-value medium holding serialized payer profiles.
///
/// Keys are lowercased emails. Only the profile store talks to this.
#[async_trait]
pub trait ProfileMedium: Send + Sync {
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>>;
    async fn write(&self, key: &str, value: Vec<u8>) -> Result<()>;
    async fn remove(&self, key: &str) -> Result<()>;
}

/// Identity (KYC) verification service.
///
/// An `Err` means the service could not answer. A rejection is an
/// `Ok(VerificationOutcome::Fail { .. })`.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, record: &PayerRecord) -> Result<VerificationOutcome>;
}

/// Starts the bank authorization for a verified payer.
#[async_trait]
pub trait BankConnector: Send + Sync {
    async fn connect(&self, request: &PaymentRequest, payer: &PayerRecord) -> Result<BankHandoff>;
}

/// Postcode address lookup used to fill the payer's address.
#[async_trait]
pub trait AddressLookup: Send + Sync {
    /// Known postcodes starting with `partial`. Empty below the minimum
    /// prefix length; never more than the suggestion cap.
    async fn suggest(&self, partial: &str) -> Result<Vec<String>>;
    /// Streets registered under a full postcode.
    async fn lookup(&self, postcode: &str) -> Result<Vec<PostcodeAddress>>;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub type ProfileMediumBox = Box<dyn ProfileMedium>;
pub type IdentityVerifierBox = Box<dyn IdentityVerifier>;
pub type BankConnectorBox = Box<dyn BankConnector>;
pub type AddressLookupBox = Box<dyn AddressLookup>;
pub type SharedClock = Arc<dyn Clock>;
pub type ProfileMediumFactory = Box<dyn Fn() -> ProfileMediumBox + Send + Sync>;
