//! Extended profile metadata: the section-grouped attribute bag stored
//! alongside a provider profile.
//!
//! The bag is free-form JSON. Readers here are lenient: a missing key, or a
//! value of the wrong JSON type, reads as "not provided" and never fails.
//! Writers go through [`ExtendedMetadata::merge`], which shallow-merges
//! top-level keys so one section's save cannot clobber another's.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use ts_rs::TS;
use validator::Validate;

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

/// Gallery image URLs.
pub const KEY_IMAGES: &str = "images";
/// Staff screening flags object.
pub const KEY_STAFF_SCREENING: &str = "staff_screening";
/// Year the organization was founded.
pub const KEY_YEAR_FOUNDED: &str = "year_founded";
/// Licensed bed count.
pub const KEY_BED_COUNT: &str = "bed_count";
/// Staff headcount.
pub const KEY_STAFF_COUNT: &str = "staff_count";
/// State license number.
pub const KEY_LICENSE_NUMBER: &str = "license_number";
/// Free-text price range, e.g. `"$4,000 - $6,000 / month"`.
pub const KEY_PRICE_RANGE: &str = "price_range";
/// Itemized pricing rows.
pub const KEY_PRICING_DETAILS: &str = "pricing_details";
/// Provider prefers not to publish prices.
pub const KEY_CONTACT_FOR_PRICING: &str = "contact_for_pricing";
/// Accepted payment methods.
pub const KEY_ACCEPTED_PAYMENTS: &str = "accepted_payments";
/// Medicare acceptance.
pub const KEY_ACCEPTS_MEDICARE: &str = "accepts_medicare";
/// Medicaid acceptance.
pub const KEY_ACCEPTS_MEDICAID: &str = "accepts_medicaid";

// ---------------------------------------------------------------------------
// Typed section values
// ---------------------------------------------------------------------------

/// Background-check, licensing and insurance attestations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StaffScreening {
    #[serde(default)]
    pub background_checked: bool,
    #[serde(default)]
    pub licensed: bool,
    #[serde(default)]
    pub insured: bool,
}

/// One itemized price, e.g. `{ service: "Respite", rate: "32", rateType: "hourly" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, TS)]
#[ts(export)]
pub struct PricingRow {
    #[validate(length(min = 1, max = 120))]
    pub service: String,
    #[validate(length(min = 1, max = 40))]
    pub rate: String,
    #[serde(rename = "rateType", default)]
    #[validate(length(max = 40))]
    pub rate_type: String,
}

// ---------------------------------------------------------------------------
// ExtendedMetadata
// ---------------------------------------------------------------------------

/// The metadata JSON object attached to a profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ExtendedMetadata(#[ts(type = "Record<string, unknown>")] Map<String, Value>);

impl ExtendedMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a JSON value. Anything other than an object reads as empty.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Shallow-merge `patch` into this object. Keys in `patch` overwrite;
    /// keys only present here are preserved.
    pub fn merge(&mut self, patch: Map<String, Value>) {
        for (key, value) in patch {
            self.0.insert(key, value);
        }
    }

    /// Drop `key`, returning its previous value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// Non-blank gallery image URLs.
    pub fn images(&self) -> Vec<&str> {
        string_list(self.get(KEY_IMAGES))
    }

    /// Screening flags; a missing or non-boolean flag reads as `false`.
    pub fn staff_screening(&self) -> StaffScreening {
        let obj = self.get(KEY_STAFF_SCREENING).and_then(Value::as_object);
        let flag = |name: &str| {
            obj.and_then(|o| o.get(name))
                .and_then(Value::as_bool)
                .unwrap_or(false)
        };
        StaffScreening {
            background_checked: flag("background_checked"),
            licensed: flag("licensed"),
            insured: flag("insured"),
        }
    }

    pub fn year_founded(&self) -> Option<u32> {
        non_negative_int(self.get(KEY_YEAR_FOUNDED))
    }

    pub fn bed_count(&self) -> Option<u32> {
        non_negative_int(self.get(KEY_BED_COUNT))
    }

    pub fn staff_count(&self) -> Option<u32> {
        non_negative_int(self.get(KEY_STAFF_COUNT))
    }

    pub fn license_number(&self) -> Option<&str> {
        non_blank_str(self.get(KEY_LICENSE_NUMBER))
    }

    pub fn price_range(&self) -> Option<&str> {
        non_blank_str(self.get(KEY_PRICE_RANGE))
    }

    /// Pricing rows that name a service and a rate. Malformed rows are
    /// dropped.
    pub fn pricing_details(&self) -> Vec<PricingRow> {
        let Some(rows) = self.get(KEY_PRICING_DETAILS).and_then(Value::as_array) else {
            return Vec::new();
        };
        rows.iter().filter_map(parse_pricing_row).collect()
    }

    /// `true` only when explicitly set to `true`.
    pub fn contact_for_pricing(&self) -> bool {
        self.get(KEY_CONTACT_FOR_PRICING)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    pub fn accepted_payments(&self) -> Vec<&str> {
        string_list(self.get(KEY_ACCEPTED_PAYMENTS))
    }

    /// `None` when the provider has not answered.
    pub fn accepts_medicare(&self) -> Option<bool> {
        self.get(KEY_ACCEPTS_MEDICARE).and_then(Value::as_bool)
    }

    /// `None` when the provider has not answered.
    pub fn accepts_medicaid(&self) -> Option<bool> {
        self.get(KEY_ACCEPTS_MEDICAID).and_then(Value::as_bool)
    }
}

impl From<Map<String, Value>> for ExtendedMetadata {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

// ---------------------------------------------------------------------------
// Lenient readers
// ---------------------------------------------------------------------------

fn non_blank_str(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn string_list(value: Option<&Value>) -> Vec<&str> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|v| non_blank_str(Some(v)))
                .collect()
        })
        .unwrap_or_default()
}

/// Accepts a JSON integer or a numeric string; negatives and fractions are
/// treated as absent.
fn non_negative_int(value: Option<&Value>) -> Option<u32> {
    match value? {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    }
}

fn parse_pricing_row(value: &Value) -> Option<PricingRow> {
    let obj = value.as_object()?;
    let service = non_blank_str(obj.get("service"))?;
    let rate = match obj.get("rate")? {
        Value::Number(n) => n.to_string(),
        Value::String(s) if !s.trim().is_empty() => s.trim().to_string(),
        _ => return None,
    };
    let rate_type = non_blank_str(obj.get("rateType")).unwrap_or_default();
    Some(PricingRow {
        service: service.to_string(),
        rate,
        rate_type: rate_type.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn meta(value: Value) -> ExtendedMetadata {
        ExtendedMetadata::from_value(value)
    }

    #[test]
    fn non_object_value_reads_as_empty() {
        assert_eq!(meta(json!(null)), ExtendedMetadata::new());
        assert_eq!(meta(json!([1, 2])), ExtendedMetadata::new());
        assert_eq!(meta(json!("text")), ExtendedMetadata::new());
    }

    #[test]
    fn merge_preserves_unrelated_keys() {
        let mut m = meta(json!({
            "images": ["a.jpg"],
            "price_range": "$100/day",
        }));
        let patch = json!({ "price_range": "$120/day", "bed_count": 12 });
        m.merge(patch.as_object().cloned().unwrap());

        assert_eq!(m.images(), vec!["a.jpg"]);
        assert_eq!(m.price_range(), Some("$120/day"));
        assert_eq!(m.bed_count(), Some(12));
    }

    #[test]
    fn images_skip_blank_and_non_string_entries() {
        let m = meta(json!({ "images": ["a.jpg", "", 3, null, " b.jpg "] }));
        assert_eq!(m.images(), vec!["a.jpg", "b.jpg"]);
    }

    #[test]
    fn images_of_wrong_type_read_as_empty() {
        let m = meta(json!({ "images": "a.jpg" }));
        assert!(m.images().is_empty());
    }

    #[test]
    fn staff_screening_defaults_to_false() {
        assert_eq!(meta(json!({})).staff_screening(), StaffScreening::default());

        let m = meta(json!({
            "staff_screening": { "background_checked": true, "licensed": "yes" }
        }));
        let screening = m.staff_screening();
        assert!(screening.background_checked);
        assert!(!screening.licensed);
        assert!(!screening.insured);
    }

    #[test]
    fn integers_accept_numeric_strings() {
        let m = meta(json!({
            "year_founded": "1998",
            "bed_count": 40,
            "staff_count": -3,
        }));
        assert_eq!(m.year_founded(), Some(1998));
        assert_eq!(m.bed_count(), Some(40));
        assert_eq!(m.staff_count(), None);
    }

    #[test]
    fn fractional_counts_are_absent() {
        let m = meta(json!({ "bed_count": 12.5 }));
        assert_eq!(m.bed_count(), None);
    }

    #[test]
    fn pricing_rows_drop_malformed_entries() {
        let m = meta(json!({
            "pricing_details": [
                { "service": "Respite", "rate": 32, "rateType": "hourly" },
                { "service": "", "rate": "10" },
                { "service": "Companion", "rate": "  " },
                { "service": "Overnight", "rate": "250" },
                "junk",
            ]
        }));
        let rows = m.pricing_details();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].service, "Respite");
        assert_eq!(rows[0].rate, "32");
        assert_eq!(rows[0].rate_type, "hourly");
        assert_eq!(rows[1].service, "Overnight");
        assert_eq!(rows[1].rate_type, "");
    }

    #[test]
    fn payment_answers_distinguish_unanswered() {
        let m = meta(json!({ "accepts_medicare": false }));
        assert_eq!(m.accepts_medicare(), Some(false));
        assert_eq!(m.accepts_medicaid(), None);
    }

    #[test]
    fn pricing_row_serializes_camel_case_rate_type() {
        let row = PricingRow {
            service: "Respite".to_string(),
            rate: "32".to_string(),
            rate_type: "hourly".to_string(),
        };
        let value = serde_json::to_value(&row).unwrap();
        assert_eq!(value["rateType"], "hourly");
    }
}
