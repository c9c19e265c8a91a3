//! Guided onboarding for one account, bound to its persisted dismissal flag
//! and to the profile save flow.

use carematch_core::completeness::{calculate_profile_completeness, ProfileCompleteness};
use carematch_core::guided::{
    GuidedOnboardingController, GuidedStep, OnboardingPhase, OnboardingSnapshot,
};
use carematch_core::section::ProfileSection;
use carematch_core::section_update::SectionUpdate;
use carematch_core::types::DbId;

use crate::dismissal::DismissalFlag;
use crate::error::OnboardingResult;
use crate::profile_store::{self, ProfileRecord, ProfileStore};
use crate::store::PreferenceStore;

/// Result of a successful section save.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveOutcome {
    /// The record as stored after the merge.
    pub record: ProfileRecord,
    /// Completeness recomputed from `record`.
    pub completeness: ProfileCompleteness,
    /// How the guided pointer moved.
    pub step: GuidedStep,
}

/// Guided onboarding state for one account's dashboard.
pub struct GuidedOnboardingSession<P: PreferenceStore> {
    account_id: DbId,
    store: P,
    key_prefix: String,
    controller: GuidedOnboardingController,
}

impl<P: PreferenceStore> GuidedOnboardingSession<P> {
    /// Open a session, reading the account's dismissal flag from `store`.
    pub fn open(account_id: DbId, store: P, key_prefix: impl Into<String>) -> OnboardingResult<Self> {
        let key_prefix = key_prefix.into();
        let dismissed = DismissalFlag::new(&store, &key_prefix, account_id).is_dismissed()?;
        tracing::debug!(account_id, dismissed, "Guided onboarding session opened");
        Ok(Self {
            account_id,
            store,
            key_prefix,
            controller: GuidedOnboardingController::new(dismissed),
        })
    }

    pub fn account_id(&self) -> DbId {
        self.account_id
    }

    pub fn phase(&self) -> OnboardingPhase {
        self.controller.phase()
    }

    pub fn current_section(&self) -> Option<ProfileSection> {
        self.controller.current_section()
    }

    pub fn is_dismissed(&self) -> bool {
        self.controller.is_dismissed()
    }

    pub fn refresh(&mut self, completeness: &ProfileCompleteness) -> OnboardingPhase {
        self.controller.refresh(completeness)
    }

    pub fn start(&mut self, completeness: &ProfileCompleteness) -> Option<ProfileSection> {
        self.controller.start_guided(completeness)
    }

    pub fn stop(&mut self) {
        self.controller.stop_guided();
    }

    pub fn skip(&mut self, completeness: &ProfileCompleteness) -> GuidedStep {
        self.controller.skip(completeness)
    }

    pub fn back(&mut self) -> GuidedStep {
        self.controller.go_back()
    }

    /// Dismiss the prompt for this account.
    ///
    /// The flag is written before the phase changes; if the write fails the
    /// session stays prompt-eligible. Returns `false` when the prompt is not
    /// currently shown.
    pub fn dismiss(&mut self) -> OnboardingResult<bool> {
        if self.controller.phase() != OnboardingPhase::PromptEligible {
            return Ok(false);
        }
        self.flag().record_dismissal()?;
        Ok(self.controller.dismiss())
    }

    /// Clear a stored dismissal so the prompt can show again.
    pub fn reset_dismissal(&mut self) -> OnboardingResult<()> {
        self.flag().reset()?;
        self.controller.reset_dismissal();
        Ok(())
    }

    pub fn snapshot(&self, completeness: &ProfileCompleteness) -> OnboardingSnapshot {
        self.controller.snapshot(completeness)
    }

    /// Save one section, then recompute completeness, then move the guided
    /// pointer.
    ///
    /// On error nothing moves: phase and pointer stay where they were so
    /// the provider can retry the same section.
    pub async fn save_section(
        &mut self,
        profiles: &dyn ProfileStore,
        profile_id: DbId,
        update: &SectionUpdate,
    ) -> OnboardingResult<SaveOutcome> {
        let section = update.section();
        let record = match profile_store::save_section(profiles, profile_id, update).await {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(
                    account_id = self.account_id,
                    profile_id,
                    section = %section,
                    error = %e,
                    "Section save failed"
                );
                return Err(e);
            }
        };

        let completeness = calculate_profile_completeness(&record.profile, &record.metadata);
        let step = self.controller.section_saved(section, true, &completeness);
        self.controller.refresh(&completeness);

        tracing::debug!(
            account_id = self.account_id,
            section = %section,
            overall = completeness.overall,
            step = ?step,
            "Guided onboarding save processed"
        );
        Ok(SaveOutcome {
            record,
            completeness,
            step,
        })
    }

    fn flag(&self) -> DismissalFlag<'_, P> {
        DismissalFlag::new(&self.store, &self.key_prefix, self.account_id)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OnboardingError;
    use crate::profile_store::MemoryProfileStore;
    use crate::store::MemoryPreferenceStore;
    use assert_matches::assert_matches;
    use carematch_core::metadata::{ExtendedMetadata, StaffScreening};
    use carematch_core::profile::Profile;
    use carematch_core::section_update::{AboutUpdate, ScreeningUpdate};

    fn empty_completeness() -> ProfileCompleteness {
        calculate_profile_completeness(&Profile::new(1, 10), &ExtendedMetadata::new())
    }

    #[test]
    fn dismiss_persists_and_survives_reopen() {
        let prefs = std::sync::Arc::new(MemoryPreferenceStore::new());
        let c = empty_completeness();

        let mut session = GuidedOnboardingSession::open(10, prefs.clone(), "carematch").unwrap();
        assert_eq!(session.refresh(&c), OnboardingPhase::PromptEligible);
        assert!(session.dismiss().unwrap());
        assert_eq!(session.phase(), OnboardingPhase::Dismissed);

        let mut reopened = GuidedOnboardingSession::open(10, prefs, "carematch").unwrap();
        assert!(reopened.is_dismissed());
        assert_eq!(reopened.refresh(&c), OnboardingPhase::Dismissed);
        assert!(!reopened.snapshot(&c).show_prompt);
    }

    #[test]
    fn dismiss_outside_prompt_is_a_noop() {
        let prefs = MemoryPreferenceStore::new();
        let mut session = GuidedOnboardingSession::open(10, prefs, "carematch").unwrap();
        assert!(!session.dismiss().unwrap());
        assert!(!session.is_dismissed());
    }

    #[test]
    fn reset_dismissal_allows_prompt_again() {
        let prefs = MemoryPreferenceStore::new();
        let c = empty_completeness();
        let mut session = GuidedOnboardingSession::open(10, prefs, "carematch").unwrap();
        session.refresh(&c);
        session.dismiss().unwrap();

        session.reset_dismissal().unwrap();
        assert!(!session.is_dismissed());
        assert_eq!(session.refresh(&c), OnboardingPhase::PromptEligible);
    }

    #[tokio::test]
    async fn save_advances_past_saved_section() {
        let profiles = MemoryProfileStore::new();
        profiles
            .insert(ProfileRecord::new(Profile::new(1, 10), ExtendedMetadata::new()))
            .await;
        let c = empty_completeness();
        let mut session =
            GuidedOnboardingSession::open(10, MemoryPreferenceStore::new(), "carematch").unwrap();
        session.refresh(&c);
        assert_eq!(session.start(&c), Some(ProfileSection::Overview));

        // Skip ahead to screening, then save it fully.
        session.skip(&c);
        session.skip(&c);
        assert_eq!(session.current_section(), Some(ProfileSection::Screening));

        let update = SectionUpdate::Screening(ScreeningUpdate {
            staff_screening: StaffScreening {
                background_checked: true,
                licensed: true,
                insured: true,
            },
        });
        let outcome = session.save_section(&profiles, 1, &update).await.unwrap();
        assert_eq!(outcome.completeness.section_percent(ProfileSection::Screening), 100);
        assert_eq!(outcome.step, GuidedStep::Moved(ProfileSection::Services));
        assert_eq!(session.current_section(), Some(ProfileSection::Services));
    }

    #[tokio::test]
    async fn failed_save_keeps_pointer() {
        let profiles = MemoryProfileStore::new();
        let c = empty_completeness();
        let mut session =
            GuidedOnboardingSession::open(10, MemoryPreferenceStore::new(), "carematch").unwrap();
        session.refresh(&c);
        session.start(&c);

        let update = SectionUpdate::About(AboutUpdate {
            year_founded: Some(1999),
            ..Default::default()
        });
        let result = session.save_section(&profiles, 404, &update).await;
        assert_matches!(result, Err(OnboardingError::ProfileNotFound(404)));
        assert_eq!(session.phase(), OnboardingPhase::Active);
        assert_eq!(session.current_section(), Some(ProfileSection::Overview));
    }
}
