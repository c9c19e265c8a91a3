#![allow(dead_code)]

use std::sync::Once;

use carematch_core::metadata::{ExtendedMetadata, PricingRow, StaffScreening};
use carematch_core::profile::{Profile, ProviderCategory};
use carematch_core::section_update::{
    AboutUpdate, GalleryUpdate, OverviewUpdate, PaymentUpdate, PricingUpdate, ScreeningUpdate,
    SectionUpdate, ServicesUpdate,
};
use carematch_onboarding::profile_store::{MemoryProfileStore, ProfileRecord};

pub const ACCOUNT_ID: i64 = 100;
pub const PROFILE_ID: i64 = 1;
pub const KEY_PREFIX: &str = "carematch";

static TRACING: Once = Once::new();

/// Install a test subscriber once per binary. Filter with `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "carematch_onboarding=debug".into()),
            )
            .with_test_writer()
            .try_init();
    });
}

/// A profile store holding one empty profile.
pub async fn empty_profile_store() -> MemoryProfileStore {
    let store = MemoryProfileStore::new();
    store
        .insert(ProfileRecord::new(
            Profile::new(PROFILE_ID, ACCOUNT_ID),
            ExtendedMetadata::new(),
        ))
        .await;
    store
}

/// An update that fills `section` completely.
pub fn complete_update(section: &str) -> SectionUpdate {
    match section {
        "overview" => SectionUpdate::Overview(OverviewUpdate {
            display_name: Some("Sunrise Homecare".into()),
            category: Some(ProviderCategory::HomeCareAgency),
            description: Some("Family-owned in-home care since 1998.".into()),
            address: Some("12 Elm St".into()),
            city: Some("Springfield".into()),
            state: Some("IL".into()),
            zip: Some("62701".into()),
            phone: Some("217-555-0100".into()),
            email: Some("hello@sunrise.example".into()),
            website: Some("https://sunrise.example".into()),
        }),
        "pricing" => SectionUpdate::Pricing(PricingUpdate {
            price_range: Some("$30 - $38 / hour".into()),
            ..Default::default()
        }),
        "screening" => SectionUpdate::Screening(ScreeningUpdate {
            staff_screening: StaffScreening {
                background_checked: true,
                licensed: true,
                insured: true,
            },
        }),
        "services" => SectionUpdate::Services(ServicesUpdate {
            care_types: vec!["Home Care".into(), "Respite".into()],
        }),
        "gallery" => SectionUpdate::Gallery(GalleryUpdate {
            images: (1..=3)
                .map(|i| format!("https://cdn.sunrise.example/{i}.jpg"))
                .collect(),
        }),
        "about" => SectionUpdate::About(AboutUpdate {
            year_founded: Some(1998),
            bed_count: Some(0),
            staff_count: Some(24),
            license_number: Some("IL-HC-4471".into()),
        }),
        "payment" => SectionUpdate::Payment(PaymentUpdate {
            accepted_payments: Some(vec!["Private pay".into(), "Long-term care insurance".into()]),
            accepts_medicare: Some(false),
            accepts_medicaid: Some(true),
        }),
        other => panic!("unknown section {other}"),
    }
}

/// A pricing update whose only row has no rate.
pub fn bad_pricing() -> SectionUpdate {
    SectionUpdate::Pricing(PricingUpdate {
        pricing_details: Some(vec![PricingRow {
            service: "Respite".into(),
            rate: String::new(),
            rate_type: "hourly".into(),
        }]),
        ..Default::default()
    })
}
