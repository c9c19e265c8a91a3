//! Provider profile record, category enumeration, and care-service
//! derivation.
//!
//! The profile is the provider's public listing. Every descriptive field is
//! optional; a text field only counts as provided when it holds non-blank
//! content.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::DbId;

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// Kind of care organization a provider is listed as.
///
/// Unknown category strings deserialize to [`ProviderCategory::Other`]
/// instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum ProviderCategory {
    HomeCareAgency,
    AssistedLiving,
    MemoryCare,
    NursingHome,
    IndependentLiving,
    AdultDayCare,
    Hospice,
    PrivateCaregiver,
    #[serde(other)]
    Other,
}

impl ProviderCategory {
    /// Human-readable label for the category.
    pub fn label(self) -> &'static str {
        match self {
            Self::HomeCareAgency => "Home Care Agency",
            Self::AssistedLiving => "Assisted Living",
            Self::MemoryCare => "Memory Care",
            Self::NursingHome => "Nursing Home",
            Self::IndependentLiving => "Independent Living",
            Self::AdultDayCare => "Adult Day Care",
            Self::Hospice => "Hospice",
            Self::PrivateCaregiver => "Private Caregiver",
            Self::Other => "Other",
        }
    }

    /// Services implied by the category when a provider has not listed
    /// them explicitly.
    pub fn default_services(self) -> &'static [&'static str] {
        match self {
            Self::HomeCareAgency => &["Home Care", "Personal Care", "Companion Care"],
            Self::AssistedLiving => &["Assisted Living", "Medication Management", "Meals"],
            Self::MemoryCare => &["Memory Care", "Dementia Care"],
            Self::NursingHome => &["Skilled Nursing", "Rehabilitation"],
            Self::IndependentLiving => &["Independent Living"],
            Self::AdultDayCare => &["Adult Day Care"],
            Self::Hospice => &["Hospice Care", "Palliative Care"],
            Self::PrivateCaregiver => &["Companion Care", "Personal Care"],
            Self::Other => &[],
        }
    }
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

/// A provider's public record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Profile {
    pub id: DbId,
    pub account_id: DbId,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zip: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub category: Option<ProviderCategory>,
    #[serde(default)]
    pub care_types: Vec<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl Profile {
    /// Create an empty profile owned by `account_id`.
    pub fn new(id: DbId, account_id: DbId) -> Self {
        Self {
            id,
            account_id,
            ..Self::default()
        }
    }

    /// Explicit care types with blank entries removed.
    pub fn listed_care_types(&self) -> impl Iterator<Item = &str> {
        self.care_types
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
    }

    /// Both coordinates, when the profile has been geocoded.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => Some((lat, lon)),
            _ => None,
        }
    }
}

/// Returns `true` if an optional text field holds non-blank content.
pub fn is_present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

/// Services a provider offers: its explicit care types followed by the
/// category defaults it has not already listed.
///
/// Entries are trimmed and de-duplicated case-insensitively; the first
/// spelling wins.
pub fn derived_care_services(profile: &Profile) -> Vec<String> {
    let defaults = profile
        .category
        .map(ProviderCategory::default_services)
        .unwrap_or_default();

    let mut services: Vec<String> = Vec::new();
    for service in profile.listed_care_types().chain(defaults.iter().copied()) {
        let already = services.iter().any(|s| s.eq_ignore_ascii_case(service));
        if !already {
            services.push(service.to_string());
        }
    }
    services
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
