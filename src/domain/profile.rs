use super::payer::{EntityType, PayerMode, PayerRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Masked account hint shown on the returning-payer review screen.
///
/// The simulation has no banking integration to ask, so every saved profile
/// carries this placeholder. A real deployment reads it from the bank.
pub const PLACEHOLDER_BANK_ACCOUNT_HINT: &str = "****1234";

/// A payer profile persisted after a successful verification, keyed by the
/// lowercased email.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct StoredProfile {
    pub email: String,
    pub payer_record: PayerRecord,
    pub entity_type: EntityType,
    pub payer_mode: PayerMode,
    /// RFC 3339 timestamp. Kept as text so an unreadable value degrades to
    /// "not fresh" instead of failing the whole lookup.
    pub verified_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_account_hint: Option<String>,
}

impl StoredProfile {
    pub fn verified_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.verified_at)
            .ok()
            .map(|ts| ts.with_timezone(&Utc))
    }
}

/// Normalizes an identity into its storage key.
pub fn identity_key(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(verified_at: &str) -> StoredProfile {
        StoredProfile {
            email: "a@b.com".to_string(),
            payer_record: PayerRecord::default(),
            entity_type: EntityType::Individual,
            payer_mode: PayerMode::SelfPay,
            verified_at: verified_at.to_string(),
            bank_account_hint: None,
        }
    }

    #[test]
    fn test_verified_at_parses_rfc3339() {
        let parsed = profile("2026-01-02T03:04:05Z").verified_at().unwrap();
        assert_eq!(parsed.to_rfc3339(), "2026-01-02T03:04:05+00:00");
        assert!(profile("yesterday").verified_at().is_none());
    }

    #[test]
    fn test_identity_key_is_lowercase_and_trimmed() {
        assert_eq!(identity_key("  John.Doe@Email.COM "), "john.doe@email.com");
    }

    #[test]
    fn test_profile_json_uses_camel_case_keys() {
        let json = serde_json::to_value(profile("2026-01-02T03:04:05Z")).unwrap();
        assert_eq!(json["verifiedAt"], "2026-01-02T03:04:05Z");
        assert_eq!(json["payerMode"], "SELF");
        assert!(json.get("bankAccountHint").is_none());
    }
}
