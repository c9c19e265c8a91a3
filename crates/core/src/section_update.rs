//! Typed per-section updates submitted from the dashboard editors.
//!
//! Each payload validates with `validator` and applies itself to a profile
//! and its metadata. Overview and services write profile columns; every
//! other section shallow-merges its keys into the metadata object, so a save
//! never touches keys owned by another section.
//!
//! For optional text fields, `None` leaves the stored value untouched and a
//! blank string clears it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use ts_rs::TS;
use validator::{Validate, ValidateEmail, ValidateUrl, ValidationError};

use crate::error::CoreError;
use crate::metadata::{
    ExtendedMetadata, PricingRow, StaffScreening, KEY_ACCEPTED_PAYMENTS, KEY_ACCEPTS_MEDICAID,
    KEY_ACCEPTS_MEDICARE, KEY_BED_COUNT, KEY_CONTACT_FOR_PRICING, KEY_IMAGES, KEY_LICENSE_NUMBER,
    KEY_PRICE_RANGE, KEY_PRICING_DETAILS, KEY_STAFF_COUNT, KEY_STAFF_SCREENING, KEY_YEAR_FOUNDED,
};
use crate::profile::{Profile, ProviderCategory};
use crate::section::ProfileSection;

/// Maximum care types a provider may list.
pub const MAX_CARE_TYPES: u64 = 30;

/// Maximum gallery images.
pub const MAX_GALLERY_IMAGES: u64 = 50;

/// Maximum accepted payment methods.
pub const MAX_PAYMENT_METHODS: u64 = 20;

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

/// Name, category, description, location and contact details.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, TS)]
#[ts(export)]
pub struct OverviewUpdate {
    #[validate(length(max = 200))]
    pub display_name: Option<String>,
    pub category: Option<ProviderCategory>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[validate(length(max = 200))]
    pub address: Option<String>,
    #[validate(length(max = 100))]
    pub city: Option<String>,
    #[validate(length(max = 50))]
    pub state: Option<String>,
    #[validate(length(max = 10))]
    pub zip: Option<String>,
    #[validate(length(max = 30))]
    pub phone: Option<String>,
    #[validate(custom(function = "email_or_blank"))]
    pub email: Option<String>,
    #[validate(custom(function = "url_or_blank"))]
    pub website: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, TS)]
#[ts(export)]
pub struct PricingUpdate {
    #[ts(optional = nullable)]
    #[validate(length(max = 120))]
    pub price_range: Option<String>,
    #[ts(optional = nullable)]
    #[validate(nested)]
    pub pricing_details: Option<Vec<PricingRow>>,
    #[ts(optional = nullable)]
    pub contact_for_pricing: Option<bool>,
}

/// Replaces all three screening flags at once.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, TS)]
#[ts(export)]
pub struct ScreeningUpdate {
    pub staff_screening: StaffScreening,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, TS)]
#[ts(export)]
pub struct ServicesUpdate {
    #[validate(length(max = MAX_CARE_TYPES))]
    pub care_types: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, TS)]
#[ts(export)]
pub struct GalleryUpdate {
    #[validate(length(max = MAX_GALLERY_IMAGES), custom(function = "image_urls"))]
    pub images: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, TS)]
#[ts(export)]
pub struct AboutUpdate {
    #[ts(optional = nullable)]
    #[validate(range(min = 1800, max = 2100))]
    pub year_founded: Option<u32>,
    #[ts(optional = nullable)]
    #[validate(range(max = 10000))]
    pub bed_count: Option<u32>,
    #[ts(optional = nullable)]
    #[validate(range(max = 100000))]
    pub staff_count: Option<u32>,
    #[ts(optional = nullable)]
    #[validate(length(max = 60))]
    pub license_number: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, TS)]
#[ts(export)]
pub struct PaymentUpdate {
    #[ts(optional = nullable)]
    #[validate(length(max = MAX_PAYMENT_METHODS))]
    pub accepted_payments: Option<Vec<String>>,
    #[ts(optional = nullable)]
    pub accepts_medicare: Option<bool>,
    #[ts(optional = nullable)]
    pub accepts_medicaid: Option<bool>,
}

// ---------------------------------------------------------------------------
// Custom validators
// ---------------------------------------------------------------------------

fn email_or_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() || value.trim().validate_email() {
        Ok(())
    } else {
        Err(ValidationError::new("email"))
    }
}

fn url_or_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() || value.trim().validate_url() {
        Ok(())
    } else {
        Err(ValidationError::new("url"))
    }
}

fn image_urls(images: &[String]) -> Result<(), ValidationError> {
    if images.iter().all(|i| i.trim().is_empty() || i.trim().validate_url()) {
        Ok(())
    } else {
        Err(ValidationError::new("image_url"))
    }
}

// ---------------------------------------------------------------------------
// SectionUpdate
// ---------------------------------------------------------------------------

/// A save from one section editor, tagged by section id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "section", rename_all = "snake_case")]
#[ts(export)]
pub enum SectionUpdate {
    Overview(OverviewUpdate),
    Pricing(PricingUpdate),
    Screening(ScreeningUpdate),
    Services(ServicesUpdate),
    Gallery(GalleryUpdate),
    About(AboutUpdate),
    Payment(PaymentUpdate),
}

impl SectionUpdate {
    /// The section this update belongs to.
    pub fn section(&self) -> ProfileSection {
        match self {
            Self::Overview(_) => ProfileSection::Overview,
            Self::Pricing(_) => ProfileSection::Pricing,
            Self::Screening(_) => ProfileSection::Screening,
            Self::Services(_) => ProfileSection::Services,
            Self::Gallery(_) => ProfileSection::Gallery,
            Self::About(_) => ProfileSection::About,
            Self::Payment(_) => ProfileSection::Payment,
        }
    }

    /// Validate field formats and limits.
    pub fn validate(&self) -> Result<(), CoreError> {
        let result = match self {
            Self::Overview(u) => u.validate(),
            Self::Pricing(u) => u.validate(),
            Self::Screening(u) => u.validate(),
            Self::Services(u) => u.validate(),
            Self::Gallery(u) => u.validate(),
            Self::About(u) => u.validate(),
            Self::Payment(u) => u.validate(),
        };
        result.map_err(|e| {
            CoreError::Validation(format!("Invalid {} section update: {e}", self.section()))
        })
    }

    /// Apply this update to `profile` and `metadata` in place.
    pub fn apply(
        &self,
        profile: &mut Profile,
        metadata: &mut ExtendedMetadata,
    ) -> Result<(), CoreError> {
        match self {
            Self::Overview(u) => {
                apply_overview(u, profile);
                Ok(())
            }
            Self::Services(u) => {
                profile.care_types = clean_list(&u.care_types);
                Ok(())
            }
            Self::Pricing(u) => {
                let mut patch = Map::new();
                if let Some(rows) = &u.pricing_details {
                    patch.insert(KEY_PRICING_DETAILS.to_string(), to_json(rows)?);
                }
                if let Some(v) = u.contact_for_pricing {
                    patch.insert(KEY_CONTACT_FOR_PRICING.to_string(), Value::Bool(v));
                }
                metadata.merge(patch);
                set_metadata_text(metadata, KEY_PRICE_RANGE, &u.price_range);
                Ok(())
            }
            Self::Screening(u) => {
                let mut patch = Map::new();
                patch.insert(KEY_STAFF_SCREENING.to_string(), to_json(&u.staff_screening)?);
                metadata.merge(patch);
                Ok(())
            }
            Self::Gallery(u) => {
                let mut patch = Map::new();
                patch.insert(KEY_IMAGES.to_string(), to_json(&clean_list(&u.images))?);
                metadata.merge(patch);
                Ok(())
            }
            Self::About(u) => {
                let mut patch = Map::new();
                for (key, value) in [
                    (KEY_YEAR_FOUNDED, u.year_founded),
                    (KEY_BED_COUNT, u.bed_count),
                    (KEY_STAFF_COUNT, u.staff_count),
                ] {
                    if let Some(n) = value {
                        patch.insert(key.to_string(), Value::from(n));
                    }
                }
                metadata.merge(patch);
                set_metadata_text(metadata, KEY_LICENSE_NUMBER, &u.license_number);
                Ok(())
            }
            Self::Payment(u) => {
                let mut patch = Map::new();
                if let Some(methods) = &u.accepted_payments {
                    patch.insert(KEY_ACCEPTED_PAYMENTS.to_string(), to_json(&clean_list(methods))?);
                }
                if let Some(v) = u.accepts_medicare {
                    patch.insert(KEY_ACCEPTS_MEDICARE.to_string(), Value::Bool(v));
                }
                if let Some(v) = u.accepts_medicaid {
                    patch.insert(KEY_ACCEPTS_MEDICAID.to_string(), Value::Bool(v));
                }
                metadata.merge(patch);
                Ok(())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn apply_overview(update: &OverviewUpdate, profile: &mut Profile) {
    set_text(&mut profile.display_name, &update.display_name);
    set_text(&mut profile.description, &update.description);
    set_text(&mut profile.address, &update.address);
    set_text(&mut profile.city, &update.city);
    set_text(&mut profile.state, &update.state);
    set_text(&mut profile.zip, &update.zip);
    set_text(&mut profile.phone, &update.phone);
    set_text(&mut profile.email, &update.email);
    set_text(&mut profile.website, &update.website);
    if let Some(category) = update.category {
        profile.category = Some(category);
    }
}

/// Trimmed text, or `None` for a blank string.
fn normalize_text(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// `None` leaves `target` alone, blank clears it, anything else is trimmed
/// and stored.
fn set_text(target: &mut Option<String>, update: &Option<String>) {
    if let Some(value) = update {
        *target = normalize_text(value);
    }
}

/// [`set_text`] for a metadata key: blank removes the key.
fn set_metadata_text(metadata: &mut ExtendedMetadata, key: &str, update: &Option<String>) {
    let Some(value) = update else {
        return;
    };
    match normalize_text(value) {
        Some(text) => {
            let mut patch = Map::new();
            patch.insert(key.to_string(), Value::String(text));
            metadata.merge(patch);
        }
        None => {
            metadata.remove(key);
        }
    }
}

/// Trim entries, drop blanks and case-insensitive duplicates.
fn clean_list(items: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for item in items.iter().map(|i| i.trim()).filter(|i| !i.is_empty()) {
        if !out.iter().any(|o| o.eq_ignore_ascii_case(item)) {
            out.push(item.to_string());
        }
    }
    out
}

fn to_json<T: Serialize>(value: &T) -> Result<Value, CoreError> {
    serde_json::to_value(value)
        .map_err(|e| CoreError::Internal(format!("Failed to serialize section update: {e}")))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
