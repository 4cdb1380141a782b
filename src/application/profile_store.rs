use crate::domain::payer::{EntityType, PayerMode, PayerRecord};
use crate::domain::ports::{ProfileMediumBox, SharedClock};
use crate::domain::profile::{PLACEHOLDER_BANK_ACCOUNT_HINT, StoredProfile, identity_key};
use tracing::{debug, warn};

/// Reads and writes verified payer profiles through an injected medium.
///
/// Nothing here returns an error. An unreachable medium or an unreadable
/// profile is logged and treated as "no profile", so the payment flow is never
/// blocked by the repeat-payer shortcut.
pub struct PayerProfileStore {
    medium: ProfileMediumBox,
    clock: SharedClock,
    validity_window: chrono::Duration,
}

impl PayerProfileStore {
    pub fn new(medium: ProfileMediumBox, clock: SharedClock, validity_window: chrono::Duration) -> Self {
        Self {
            medium,
            clock,
            validity_window,
        }
    }

    pub async fn lookup(&self, identity: &str) -> Option<StoredProfile> {
        let key = identity_key(identity);
        if key.is_empty() {
            return None;
        }

        let bytes = match self.medium.read(&key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "Profile lookup failed, continuing without a stored profile");
                return None;
            }
        };

        match serde_json::from_slice::<StoredProfile>(&bytes) {
            Ok(profile) if identity_key(&profile.email) == key => Some(profile),
            Ok(_) => {
                warn!("Stored profile does not belong to the requested identity, ignoring it");
                None
            }
            Err(e) => {
                warn!(error = %e, "Stored profile is unreadable, ignoring it");
                None
            }
        }
    }

    /// True iff the profile was verified no longer than the validity window
    /// ago. Unparseable timestamps are never fresh.
    pub fn is_fresh(&self, profile: &StoredProfile) -> bool {
        match profile.verified_at() {
            Some(verified_at) => self.clock.now() - verified_at <= self.validity_window,
            None => false,
        }
    }

    /// Stores the profile for `record.email`, replacing any previous one.
    ///
    /// A failed write is logged; the returned profile is what was attempted.
    pub async fn save(
        &self,
        record: &PayerRecord,
        entity_type: EntityType,
        payer_mode: PayerMode,
    ) -> StoredProfile {
        let profile = StoredProfile {
            email: record.email.trim().to_string(),
            payer_record: record.clone(),
            entity_type,
            payer_mode,
            verified_at: self.clock.now().to_rfc3339(),
            bank_account_hint: Some(PLACEHOLDER_BANK_ACCOUNT_HINT.to_string()),
        };

        let key = identity_key(&profile.email);
        match serde_json::to_vec(&profile) {
            Ok(bytes) => match self.medium.write(&key, bytes).await {
                Ok(()) => debug!("Saved verified payer profile"),
                Err(e) => warn!(error = %e, "Failed to persist verified payer profile"),
            },
            Err(e) => warn!(error = %e, "Failed to serialize verified payer profile"),
        }

        profile
    }

    pub async fn clear(&self, identity: &str) {
        let key = identity_key(identity);
        if let Err(e) = self.medium.remove(&key).await {
            warn!(error = %e, "Failed to clear stored payer profile");
        }
    }
}
