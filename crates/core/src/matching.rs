//! Provider matching for families.
//!
//! Ranks providers by how many requested care services they offer, then by
//! great-circle distance from the family, then by name.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::profile::{derived_care_services, Profile};
use crate::types::DbId;

/// Mean Earth radius in statute miles.
const EARTH_RADIUS_MILES: f64 = 3958.8;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// What a family is looking for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FamilyCriteria {
    #[serde(default)]
    pub care_types: Vec<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    /// Exclude providers farther than this. Ignored when either side has
    /// no coordinates.
    #[serde(default)]
    pub max_distance_miles: Option<f64>,
}

impl FamilyCriteria {
    fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => Some((lat, lon)),
            _ => None,
        }
    }

    fn requested_services(&self) -> Vec<&str> {
        self.care_types
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .collect()
    }
}

/// One ranked provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProviderMatch {
    pub provider_id: DbId,
    pub display_name: String,
    /// Number of requested services the provider offers.
    pub service_overlap: u32,
    pub distance_miles: Option<f64>,
}

// ---------------------------------------------------------------------------
// Ranking
// ---------------------------------------------------------------------------

/// Great-circle distance between two `(lat, lon)` points in miles.
pub fn haversine_miles(from: (f64, f64), to: (f64, f64)) -> f64 {
    let (lat1, lon1) = (from.0.to_radians(), from.1.to_radians());
    let (lat2, lon2) = (to.0.to_radians(), to.1.to_radians());
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_MILES * a.sqrt().min(1.0).asin()
}

/// Rank `providers` for `criteria`, best match first.
///
/// When services were requested, providers offering none of them are
/// dropped. Providers beyond `max_distance_miles` are dropped; providers
/// with unknown distance are kept and sort after those with a distance.
pub fn rank_providers(criteria: &FamilyCriteria, providers: &[Profile]) -> Vec<ProviderMatch> {
    let requested = criteria.requested_services();
    let origin = criteria.coordinates();

    let mut matches: Vec<ProviderMatch> = providers
        .iter()
        .filter_map(|provider| {
            let offered = derived_care_services(provider);
            let overlap = requested
                .iter()
                .filter(|r| offered.iter().any(|o| o.eq_ignore_ascii_case(r)))
                .count() as u32;
            if !requested.is_empty() && overlap == 0 {
                return None;
            }

            let distance = origin
                .zip(provider.coordinates())
                .map(|(a, b)| haversine_miles(a, b));
            if let (Some(d), Some(max)) = (distance, criteria.max_distance_miles) {
                if d > max {
                    return None;
                }
            }

            Some(ProviderMatch {
                provider_id: provider.id,
                display_name: provider
                    .display_name
                    .as_deref()
                    .map(str::trim)
                    .unwrap_or_default()
                    .to_string(),
                service_overlap: overlap,
                distance_miles: distance,
            })
        })
        .collect();

    matches.sort_by(compare_matches);
    tracing::trace!(
        candidates = providers.len(),
        matched = matches.len(),
        "Ranked providers"
    );
    matches
}

fn compare_matches(a: &ProviderMatch, b: &ProviderMatch) -> Ordering {
    b.service_overlap
        .cmp(&a.service_overlap)
        .then_with(|| compare_distance(a.distance_miles, b.distance_miles))
        .then_with(|| a.display_name.to_lowercase().cmp(&b.display_name.to_lowercase()))
        .then_with(|| a.provider_id.cmp(&b.provider_id))
}

fn compare_distance(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::ProviderCategory;

    fn provider(id: DbId, name: &str, care_types: &[&str], at: Option<(f64, f64)>) -> Profile {
        Profile {
            display_name: Some(name.to_string()),
            care_types: care_types.iter().map(|s| s.to_string()).collect(),
            latitude: at.map(|c| c.0),
            longitude: at.map(|c| c.1),
            ..Profile::new(id, id)
        }
    }

    // Chicago Loop and Evanston, roughly 12 miles apart.
    const LOOP: (f64, f64) = (41.8781, -87.6298);
    const EVANSTON: (f64, f64) = (42.0451, -87.6877);

    #[test]
    fn haversine_known_distance() {
        let d = haversine_miles(LOOP, EVANSTON);
        assert!((d - 12.0).abs() < 1.0, "got {d}");
        assert_eq!(haversine_miles(LOOP, LOOP), 0.0);
    }

    #[test]
    fn overlap_ranks_first() {
        let criteria = FamilyCriteria {
            care_types: vec!["Respite".into(), "Memory Care".into()],
            ..Default::default()
        };
        let providers = vec![
            provider(1, "Alpha", &["Respite"], None),
            provider(2, "Beta", &["respite", "memory care"], None),
        ];
        let ranked = rank_providers(&criteria, &providers);
        assert_eq!(ranked[0].provider_id, 2);
        assert_eq!(ranked[0].service_overlap, 2);
        assert_eq!(ranked[1].service_overlap, 1);
    }

    #[test]
    fn zero_overlap_excluded_when_services_requested() {
        let criteria = FamilyCriteria {
            care_types: vec!["Hospice Care".into()],
            ..Default::default()
        };
        let providers = vec![provider(1, "Alpha", &["Respite"], None)];
        assert!(rank_providers(&criteria, &providers).is_empty());
    }

    #[test]
    fn category_defaults_count_toward_overlap() {
        let criteria = FamilyCriteria {
            care_types: vec!["Dementia Care".into()],
            ..Default::default()
        };
        let mut p = provider(1, "Alpha", &[], None);
        p.category = Some(ProviderCategory::MemoryCare);
        let ranked = rank_providers(&criteria, &[p]);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].service_overlap, 1);
    }

    #[test]
    fn distance_breaks_ties_and_unknown_sorts_last() {
        let criteria = FamilyCriteria {
            latitude: Some(LOOP.0),
            longitude: Some(LOOP.1),
            ..Default::default()
        };
        let providers = vec![
            provider(1, "Nowhere", &[], None),
            provider(2, "Far", &[], Some(EVANSTON)),
            provider(3, "Near", &[], Some(LOOP)),
        ];
        let ids: Vec<_> = rank_providers(&criteria, &providers)
            .iter()
            .map(|m| m.provider_id)
            .collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn max_distance_excludes_far_providers() {
        let criteria = FamilyCriteria {
            latitude: Some(LOOP.0),
            longitude: Some(LOOP.1),
            max_distance_miles: Some(5.0),
            ..Default::default()
        };
        let providers = vec![
            provider(1, "Far", &[], Some(EVANSTON)),
            provider(2, "Unknown", &[], None),
        ];
        let ids: Vec<_> = rank_providers(&criteria, &providers)
            .iter()
            .map(|m| m.provider_id)
            .collect();
        assert_eq!(ids, vec![2]);
    }

    #[test]
    fn name_then_id_break_remaining_ties() {
        let providers = vec![
            provider(3, "beta", &[], None),
            provider(2, "Alpha", &[], None),
            provider(1, "Alpha", &[], None),
        ];
        let ids: Vec<_> = rank_providers(&FamilyCriteria::default(), &providers)
            .iter()
            .map(|m| m.provider_id)
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }
}
