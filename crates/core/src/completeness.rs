//! Profile completeness scoring.
//!
//! Each section is scored from a checklist of equally weighted items. The
//! percentage is `earned / possible` rounded to an integer, except that a
//! partially filled checklist is clamped into `1..=99`: only an empty
//! checklist scores 0 and only a full one scores 100. The overall figure is
//! the mean of the section percentages under the same rule.
//!
//! Everything here is pure and infallible; it runs on every dashboard
//! render.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::metadata::ExtendedMetadata;
use crate::profile::{is_present, Profile};
use crate::section::ProfileSection;

/// Images needed for the gallery bonus item.
pub const GALLERY_BONUS_IMAGE_COUNT: usize = 3;

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Completion of one section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SectionCompleteness {
    pub id: ProfileSection,
    pub label: String,
    pub percent: u8,
    /// Labels of checklist items not yet provided.
    pub missing_items: Vec<String>,
}

/// Per-section and overall completion of a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProfileCompleteness {
    pub overall: u8,
    pub sections: Vec<SectionCompleteness>,
}

impl ProfileCompleteness {
    /// Percent for one section. Always present for a value built by
    /// [`calculate_profile_completeness`]; 0 otherwise.
    pub fn section_percent(&self, section: ProfileSection) -> u8 {
        self.sections
            .iter()
            .find(|s| s.id == section)
            .map_or(0, |s| s.percent)
    }

    pub fn is_complete(&self, section: ProfileSection) -> bool {
        self.section_percent(section) >= 100
    }

    pub fn is_fully_complete(&self) -> bool {
        self.overall >= 100
    }

    /// Incomplete sections in canonical order.
    pub fn incomplete_sections(&self) -> Vec<ProfileSection> {
        ProfileSection::ALL
            .into_iter()
            .filter(|s| !self.is_complete(*s))
            .collect()
    }

    /// First incomplete section in canonical order.
    pub fn first_incomplete(&self) -> Option<ProfileSection> {
        ProfileSection::ALL
            .into_iter()
            .find(|s| !self.is_complete(*s))
    }
}

// ---------------------------------------------------------------------------
// Checklists
// ---------------------------------------------------------------------------

struct ChecklistItem {
    label: &'static str,
    met: bool,
}

const fn item(label: &'static str, met: bool) -> ChecklistItem {
    ChecklistItem { label, met }
}

fn overview_items(profile: &Profile) -> Vec<ChecklistItem> {
    vec![
        item("Business name", is_present(&profile.display_name)),
        item("Category", profile.category.is_some()),
        item("Description", is_present(&profile.description)),
        item("Street address", is_present(&profile.address)),
        item("City", is_present(&profile.city)),
        item("State", is_present(&profile.state)),
        item("ZIP code", is_present(&profile.zip)),
        item("Phone", is_present(&profile.phone)),
        item("Email", is_present(&profile.email)),
        item("Website", is_present(&profile.website)),
    ]
}

fn pricing_items(metadata: &ExtendedMetadata) -> Vec<ChecklistItem> {
    let disclosed = metadata.price_range().is_some()
        || !metadata.pricing_details().is_empty()
        || metadata.contact_for_pricing();
    vec![item("Pricing information", disclosed)]
}

fn screening_items(metadata: &ExtendedMetadata) -> Vec<ChecklistItem> {
    let screening = metadata.staff_screening();
    vec![
        item("Background checks", screening.background_checked),
        item("Licensing", screening.licensed),
        item("Insurance", screening.insured),
    ]
}

fn services_items(profile: &Profile) -> Vec<ChecklistItem> {
    vec![item(
        "Care services",
        profile.listed_care_types().next().is_some(),
    )]
}

fn gallery_items(metadata: &ExtendedMetadata) -> Vec<ChecklistItem> {
    let count = metadata.images().len();
    vec![
        item("At least one photo", count >= 1),
        item("Three or more photos", count >= GALLERY_BONUS_IMAGE_COUNT),
    ]
}

fn about_items(metadata: &ExtendedMetadata) -> Vec<ChecklistItem> {
    vec![
        item("Year founded", metadata.year_founded().is_some()),
        item("Bed count", metadata.bed_count().is_some()),
        item("Staff count", metadata.staff_count().is_some()),
        item("License number", metadata.license_number().is_some()),
    ]
}

fn payment_items(metadata: &ExtendedMetadata) -> Vec<ChecklistItem> {
    vec![
        item(
            "Accepted payment methods",
            !metadata.accepted_payments().is_empty(),
        ),
        item("Medicare", metadata.accepts_medicare().is_some()),
        item("Medicaid", metadata.accepts_medicaid().is_some()),
    ]
}

fn checklist(
    section: ProfileSection,
    profile: &Profile,
    metadata: &ExtendedMetadata,
) -> Vec<ChecklistItem> {
    match section {
        ProfileSection::Overview => overview_items(profile),
        ProfileSection::Pricing => pricing_items(metadata),
        ProfileSection::Screening => screening_items(metadata),
        ProfileSection::Services => services_items(profile),
        ProfileSection::Gallery => gallery_items(metadata),
        ProfileSection::About => about_items(metadata),
        ProfileSection::Payment => payment_items(metadata),
    }
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// Scale `earned / possible` to a percentage.
///
/// Returns 0 when nothing is earned (or nothing is possible) and 100 only
/// when everything is earned; partial values land in `1..=99`.
pub fn percent_of(earned: u32, possible: u32) -> u8 {
    if possible == 0 || earned == 0 {
        return 0;
    }
    if earned >= possible {
        return 100;
    }
    let pct = (f64::from(earned) / f64::from(possible) * 100.0).round() as u8;
    pct.clamp(1, 99)
}

/// Score one section in isolation.
pub fn section_completeness(
    section: ProfileSection,
    profile: &Profile,
    metadata: &ExtendedMetadata,
) -> SectionCompleteness {
    let items = checklist(section, profile, metadata);
    let possible = items.len() as u32;
    let earned = items.iter().filter(|i| i.met).count() as u32;
    let missing_items = items
        .iter()
        .filter(|i| !i.met)
        .map(|i| i.label.to_string())
        .collect();

    SectionCompleteness {
        id: section,
        label: section.label().to_string(),
        percent: percent_of(earned, possible),
        missing_items,
    }
}

/// Score every section of a profile and aggregate the overall percentage.
pub fn calculate_profile_completeness(
    profile: &Profile,
    metadata: &ExtendedMetadata,
) -> ProfileCompleteness {
    let sections: Vec<SectionCompleteness> = ProfileSection::ALL
        .into_iter()
        .map(|s| section_completeness(s, profile, metadata))
        .collect();

    let earned: u32 = sections.iter().map(|s| u32::from(s.percent)).sum();
    let possible = 100 * sections.len() as u32;
    let overall = percent_of(earned, possible);

    tracing::trace!(profile_id = profile.id, overall, "Computed profile completeness");

    ProfileCompleteness { overall, sections }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
