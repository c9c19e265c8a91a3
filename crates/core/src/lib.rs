//! `carematch-core` -- pure provider-profile domain logic.
//!
//! Profile and metadata types, completeness scoring, guided onboarding
//! sequencing, section updates, and provider matching. The crate performs
//! no I/O; persistence lives in `carematch-onboarding`.

pub mod completeness;
pub mod error;
pub mod guided;
pub mod matching;
pub mod metadata;
pub mod profile;
pub mod section;
pub mod section_update;
pub mod types;
