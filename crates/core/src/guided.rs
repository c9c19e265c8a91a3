//! Guided onboarding sequencing.
//!
//! A pure state machine layered on [`ProfileCompleteness`]. It decides when
//! the dashboard may prompt a provider to finish their profile and walks
//! them through incomplete sections in canonical order. Persistence of the
//! dismissal flag is the caller's concern (see `carematch-onboarding`).
//!
//! ```text
//! Idle ──refresh(overall < 100, !dismissed)──▶ PromptEligible ──dismiss──▶ Dismissed
//!  ▲                                              │
//!  └──────── stop / finish ◀── Active ◀──start────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::completeness::ProfileCompleteness;
use crate::section::{ProfileSection, TOTAL_STEPS};

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// Where the provider is in the guided onboarding lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum OnboardingPhase {
    /// Nothing shown; the initial state on dashboard load.
    Idle,
    /// The profile is incomplete and the prompt may be shown.
    PromptEligible,
    /// The stepper is open on a section.
    Active,
    /// The provider dismissed the prompt; it stays hidden until reset.
    Dismissed,
}

impl OnboardingPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::PromptEligible => "prompt_eligible",
            Self::Active => "active",
            Self::Dismissed => "dismissed",
        }
    }
}

/// Result of a pointer-moving operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuidedStep {
    /// The pointer moved to this section.
    Moved(ProfileSection),
    /// The pointer did not move (failed save, no earlier section).
    Stayed(ProfileSection),
    /// No incomplete section remains; the flow closed.
    Finished,
    /// The controller was not active; nothing happened.
    Inactive,
}

// ---------------------------------------------------------------------------
// Sequencing lookups
// ---------------------------------------------------------------------------

/// Whether the dashboard may prompt the provider to complete their profile.
pub fn is_prompt_eligible(completeness: &ProfileCompleteness, dismissed: bool) -> bool {
    !dismissed && !completeness.is_fully_complete()
}

/// First incomplete section strictly after `current`.
pub fn next_incomplete_after(
    completeness: &ProfileCompleteness,
    current: ProfileSection,
) -> Option<ProfileSection> {
    current.following().find(|s| !completeness.is_complete(*s))
}

/// Next incomplete section after the section with id `current_id`.
///
/// `None` means the flow is finished, including when `current_id` is not a
/// known section.
pub fn next_section(completeness: &ProfileCompleteness, current_id: &str) -> Option<ProfileSection> {
    let current = ProfileSection::from_id(current_id)?;
    next_incomplete_after(completeness, current)
}

/// Section immediately before `current_id` in canonical order, regardless
/// of completion.
pub fn prev_section(current_id: &str) -> Option<ProfileSection> {
    ProfileSection::from_id(current_id)?.previous()
}

/// 1-based canonical step number for a section id.
pub fn step_number(section_id: &str) -> Option<u8> {
    ProfileSection::from_id(section_id).map(ProfileSection::step_number)
}

/// Total number of steps shown in the stepper.
pub fn total_steps() -> u8 {
    TOTAL_STEPS
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// State handed to the dashboard banner and stepper modal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OnboardingSnapshot {
    pub phase: OnboardingPhase,
    pub current_section: Option<ProfileSection>,
    pub step_number: Option<u8>,
    pub total_steps: u8,
    /// Show the completion banner.
    pub show_prompt: bool,
    /// Enable the "Back" control.
    pub can_go_back: bool,
    /// An incomplete section remains after the current one ("Save & Next").
    pub has_next: bool,
    /// The current section is the last incomplete one ("Finish").
    pub is_final_step: bool,
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// Guided onboarding state for one provider dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuidedOnboardingController {
    phase: OnboardingPhase,
    current: Option<ProfileSection>,
    dismissed: bool,
}

impl Default for GuidedOnboardingController {
    fn default() -> Self {
        Self::new(false)
    }
}

impl GuidedOnboardingController {
    /// Create a controller from the persisted per-account dismissal flag.
    /// Starts in [`OnboardingPhase::Idle`], or [`OnboardingPhase::Dismissed`]
    /// when the flag is set.
    pub fn new(dismissed: bool) -> Self {
        let phase = if dismissed {
            OnboardingPhase::Dismissed
        } else {
            OnboardingPhase::Idle
        };
        Self {
            phase,
            current: None,
            dismissed,
        }
    }

    pub fn phase(&self) -> OnboardingPhase {
        self.phase
    }

    pub fn current_section(&self) -> Option<ProfileSection> {
        self.current
    }

    pub fn is_active(&self) -> bool {
        self.phase == OnboardingPhase::Active
    }

    pub fn is_dismissed(&self) -> bool {
        self.dismissed
    }

    /// Re-evaluate prompt eligibility against fresh completeness.
    ///
    /// Moves Idle → PromptEligible when the profile is incomplete and the
    /// prompt was never dismissed, and PromptEligible → Idle once the
    /// profile is complete. Active and Dismissed are left alone.
    pub fn refresh(&mut self, completeness: &ProfileCompleteness) -> OnboardingPhase {
        let eligible = is_prompt_eligible(completeness, self.dismissed);
        match self.phase {
            OnboardingPhase::Idle if eligible => {
                self.set_phase(OnboardingPhase::PromptEligible);
            }
            OnboardingPhase::PromptEligible if !eligible => {
                self.set_phase(OnboardingPhase::Idle);
            }
            _ => {}
        }
        self.phase
    }

    /// Open the stepper on the first incomplete section.
    ///
    /// Re-entrant calls while active return the current pointer untouched.
    /// Returns `None` without changing state when nothing is incomplete or
    /// the prompt was dismissed.
    pub fn start_guided(&mut self, completeness: &ProfileCompleteness) -> Option<ProfileSection> {
        match self.phase {
            OnboardingPhase::Active => self.current,
            OnboardingPhase::Dismissed => None,
            OnboardingPhase::Idle | OnboardingPhase::PromptEligible => {
                let first = completeness.first_incomplete()?;
                self.set_phase(OnboardingPhase::Active);
                self.current = Some(first);
                tracing::debug!(section = %first, "Guided onboarding started");
                Some(first)
            }
        }
    }

    /// Close the stepper and discard the pointer.
    pub fn stop_guided(&mut self) {
        if self.phase == OnboardingPhase::Active {
            self.current = None;
            self.set_phase(OnboardingPhase::Idle);
        }
    }

    /// Hide the prompt. Only valid from PromptEligible; returns whether the
    /// phase changed. The caller persists the flag.
    pub fn dismiss(&mut self) -> bool {
        if self.phase != OnboardingPhase::PromptEligible {
            return false;
        }
        self.dismissed = true;
        self.set_phase(OnboardingPhase::Dismissed);
        true
    }

    /// Forget a previous dismissal so the prompt can be shown again.
    pub fn reset_dismissal(&mut self) {
        self.dismissed = false;
        if self.phase == OnboardingPhase::Dismissed {
            self.set_phase(OnboardingPhase::Idle);
        }
    }

    /// Leave the current section unsaved and move to the next incomplete
    /// one, closing the flow if none remain.
    pub fn skip(&mut self, completeness: &ProfileCompleteness) -> GuidedStep {
        match self.active_section() {
            Some(current) => self.advance_from(current, completeness),
            None => GuidedStep::Inactive,
        }
    }

    /// Move to the previous canonical section, complete or not.
    pub fn go_back(&mut self) -> GuidedStep {
        let Some(current) = self.active_section() else {
            return GuidedStep::Inactive;
        };
        match current.previous() {
            Some(prev) => {
                self.current = Some(prev);
                tracing::debug!(from = %current, to = %prev, "Guided onboarding moved back");
                GuidedStep::Moved(prev)
            }
            None => GuidedStep::Stayed(current),
        }
    }

    /// Record the outcome of saving `section`.
    ///
    /// `completeness` must already reflect the save. A failed save leaves
    /// the pointer where it is so the provider can retry; a successful one
    /// advances past `section` or closes the flow.
    pub fn section_saved(
        &mut self,
        section: ProfileSection,
        saved: bool,
        completeness: &ProfileCompleteness,
    ) -> GuidedStep {
        let Some(current) = self.active_section() else {
            return GuidedStep::Inactive;
        };
        if !saved {
            tracing::debug!(section = %section, "Section save failed; guided pointer unchanged");
            return GuidedStep::Stayed(current);
        }
        self.advance_from(section, completeness)
    }

    /// Snapshot for UI consumers.
    pub fn snapshot(&self, completeness: &ProfileCompleteness) -> OnboardingSnapshot {
        let current = self.active_section();
        let has_next = current
            .and_then(|s| next_incomplete_after(completeness, s))
            .is_some();
        OnboardingSnapshot {
            phase: self.phase,
            current_section: current,
            step_number: current.map(ProfileSection::step_number),
            total_steps: TOTAL_STEPS,
            show_prompt: self.phase == OnboardingPhase::PromptEligible,
            can_go_back: current.is_some_and(|s| !s.is_first()),
            has_next,
            is_final_step: current.is_some() && !has_next,
        }
    }

    fn active_section(&self) -> Option<ProfileSection> {
        if self.is_active() {
            self.current
        } else {
            None
        }
    }

    fn advance_from(
        &mut self,
        from: ProfileSection,
        completeness: &ProfileCompleteness,
    ) -> GuidedStep {
        match next_incomplete_after(completeness, from) {
            Some(next) => {
                self.current = Some(next);
                tracing::debug!(from = %from, to = %next, "Guided onboarding advanced");
                GuidedStep::Moved(next)
            }
            None => {
                self.stop_guided();
                tracing::debug!(from = %from, "Guided onboarding finished");
                GuidedStep::Finished
            }
        }
    }

    fn set_phase(&mut self, phase: OnboardingPhase) {
        if self.phase != phase {
            tracing::debug!(from = self.phase.as_str(), to = phase.as_str(), "Onboarding phase changed");
            self.phase = phase;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
