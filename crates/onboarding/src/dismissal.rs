//! Persisted "don't show guided onboarding again" flag, one per account.

use carematch_core::types::{DbId, Timestamp};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::OnboardingResult;
use crate::store::PreferenceStore;

/// Stored value under an account's dismissal key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DismissalRecord {
    pub dismissed: bool,
    pub dismissed_at: Timestamp,
}

/// Preference key for `account_id`'s dismissal flag.
pub fn dismissal_key(prefix: &str, account_id: DbId) -> String {
    format!("{prefix}:account:{account_id}:guided_onboarding_dismissed")
}

/// Reads and writes the dismissal flag for one account.
pub struct DismissalFlag<'a, P: PreferenceStore + ?Sized> {
    store: &'a P,
    account_id: DbId,
    key: String,
}

impl<'a, P: PreferenceStore + ?Sized> DismissalFlag<'a, P> {
    pub fn new(store: &'a P, prefix: &str, account_id: DbId) -> Self {
        Self {
            store,
            account_id,
            key: dismissal_key(prefix, account_id),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Whether the account dismissed the prompt. A malformed stored value
    /// reads as not dismissed.
    pub fn is_dismissed(&self) -> OnboardingResult<bool> {
        Ok(self.record()?.is_some_and(|r| r.dismissed))
    }

    /// The stored record, if one parses.
    pub fn record(&self) -> OnboardingResult<Option<DismissalRecord>> {
        let Some(raw) = self.store.get(&self.key)? else {
            return Ok(None);
        };
        match serde_json::from_str::<DismissalRecord>(&raw) {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                tracing::warn!(
                    account_id = self.account_id,
                    key = %self.key,
                    error = %e,
                    "Ignoring malformed guided onboarding dismissal"
                );
                Ok(None)
            }
        }
    }

    /// Persist a dismissal stamped with the current time.
    pub fn record_dismissal(&self) -> OnboardingResult<DismissalRecord> {
        let record = DismissalRecord {
            dismissed: true,
            dismissed_at: Utc::now(),
        };
        self.store.set(&self.key, &serde_json::to_string(&record)?)?;
        tracing::info!(account_id = self.account_id, "Guided onboarding dismissed");
        Ok(record)
    }

    /// Forget the dismissal.
    pub fn reset(&self) -> OnboardingResult<()> {
        self.store.remove(&self.key)?;
        tracing::info!(account_id = self.account_id, "Guided onboarding dismissal reset");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
