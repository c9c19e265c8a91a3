//! Profile sections and their canonical order.
//!
//! The order below is a product decision: guided onboarding collects
//! overview and pricing before anything else. Step numbers derive from this
//! order alone and never shift with completion state.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// ProfileSection
// ---------------------------------------------------------------------------

/// One of the seven completeness sections of a provider profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum ProfileSection {
    Overview,
    Pricing,
    Screening,
    Services,
    Gallery,
    About,
    Payment,
}

/// Total number of steps in the guided flow.
pub const TOTAL_STEPS: u8 = 7;

impl ProfileSection {
    /// All sections in canonical order.
    pub const ALL: [ProfileSection; TOTAL_STEPS as usize] = [
        Self::Overview,
        Self::Pricing,
        Self::Screening,
        Self::Services,
        Self::Gallery,
        Self::About,
        Self::Payment,
    ];

    /// Parse a section id. Unknown ids yield `None`.
    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "overview" => Some(Self::Overview),
            "pricing" => Some(Self::Pricing),
            "screening" => Some(Self::Screening),
            "services" => Some(Self::Services),
            "gallery" => Some(Self::Gallery),
            "about" => Some(Self::About),
            "payment" => Some(Self::Payment),
            _ => None,
        }
    }

    /// Stable string id, as used by the UI and stored preferences.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Overview => "overview",
            Self::Pricing => "pricing",
            Self::Screening => "screening",
            Self::Services => "services",
            Self::Gallery => "gallery",
            Self::About => "about",
            Self::Payment => "payment",
        }
    }

    /// Human-readable label for the sidebar checklist.
    pub fn label(self) -> &'static str {
        match self {
            Self::Overview => "Overview",
            Self::Pricing => "Pricing",
            Self::Screening => "Staff Screening",
            Self::Services => "Care Services",
            Self::Gallery => "Photo Gallery",
            Self::About => "About",
            Self::Payment => "Payment Options",
        }
    }

    /// Zero-based position in canonical order.
    pub fn index(self) -> usize {
        match self {
            Self::Overview => 0,
            Self::Pricing => 1,
            Self::Screening => 2,
            Self::Services => 3,
            Self::Gallery => 4,
            Self::About => 5,
            Self::Payment => 6,
        }
    }

    /// 1-based step number.
    pub fn step_number(self) -> u8 {
        match self {
            Self::Overview => 1,
            Self::Pricing => 2,
            Self::Screening => 3,
            Self::Services => 4,
            Self::Gallery => 5,
            Self::About => 6,
            Self::Payment => 7,
        }
    }

    /// Convert a 1-based step number back to a section.
    pub fn from_step_number(n: u8) -> Option<Self> {
        let idx = usize::from(n.checked_sub(1)?);
        Self::ALL.get(idx).copied()
    }

    /// The section immediately before this one in canonical order.
    pub fn previous(self) -> Option<Self> {
        let idx = self.index().checked_sub(1)?;
        Self::ALL.get(idx).copied()
    }

    /// Sections strictly after this one, in canonical order.
    pub fn following(self) -> impl Iterator<Item = Self> {
        Self::ALL.into_iter().skip(self.index() + 1)
    }

    pub fn is_first(self) -> bool {
        self.index() == 0
    }

    pub fn is_last(self) -> bool {
        self.index() + 1 == Self::ALL.len()
    }
}

impl std::fmt::Display for ProfileSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
