//! Profile persistence seam and the section save flow.

use std::collections::HashMap;

use async_trait::async_trait;
use carematch_core::metadata::ExtendedMetadata;
use carematch_core::profile::Profile;
use carematch_core::section_update::SectionUpdate;
use carematch_core::types::DbId;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use ts_rs::TS;

use crate::error::{OnboardingError, OnboardingResult};

/// A profile together with its extended metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProfileRecord {
    pub profile: Profile,
    #[serde(default)]
    pub metadata: ExtendedMetadata,
}

impl ProfileRecord {
    pub fn new(profile: Profile, metadata: ExtendedMetadata) -> Self {
        Self { profile, metadata }
    }
}

/// Where provider profiles are loaded from and saved to.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Load a profile and its metadata.
    async fn load(&self, profile_id: DbId) -> OnboardingResult<ProfileRecord>;

    /// Replace the stored record with `record`.
    async fn save(&self, record: &ProfileRecord) -> OnboardingResult<()>;
}

// ---------------------------------------------------------------------------
// MemoryProfileStore
// ---------------------------------------------------------------------------

/// In-process profile store.
#[derive(Debug, Default)]
pub struct MemoryProfileStore {
    records: RwLock<HashMap<DbId, ProfileRecord>>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed or overwrite a record.
    pub async fn insert(&self, record: ProfileRecord) {
        self.records.write().await.insert(record.profile.id, record);
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn load(&self, profile_id: DbId) -> OnboardingResult<ProfileRecord> {
        self.records
            .read()
            .await
            .get(&profile_id)
            .cloned()
            .ok_or(OnboardingError::ProfileNotFound(profile_id))
    }

    async fn save(&self, record: &ProfileRecord) -> OnboardingResult<()> {
        let mut records = self.records.write().await;
        if !records.contains_key(&record.profile.id) {
            return Err(OnboardingError::ProfileNotFound(record.profile.id));
        }
        records.insert(record.profile.id, record.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Save flow
// ---------------------------------------------------------------------------

/// Validate `update`, merge it into the stored record and save the result.
///
/// Metadata keys belonging to other sections are carried over unchanged.
/// Nothing is written if validation or loading fails.
pub async fn save_section(
    store: &dyn ProfileStore,
    profile_id: DbId,
    update: &SectionUpdate,
) -> OnboardingResult<ProfileRecord> {
    update.validate()?;

    let mut record = store.load(profile_id).await?;
    update.apply(&mut record.profile, &mut record.metadata)?;
    store.save(&record).await?;

    tracing::info!(
        profile_id,
        section = %update.section(),
        "Profile section saved"
    );
    Ok(record)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
