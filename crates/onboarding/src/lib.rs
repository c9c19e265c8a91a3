//! `carematch-onboarding` -- the stateful side of provider onboarding.
//!
//! Preference stores for per-account flags, dismissal persistence, the
//! profile store seam with its section save flow, and the guided session
//! that ties them to `carematch-core`'s controller.

pub mod config;
pub mod dismissal;
pub mod error;
pub mod profile_store;
pub mod session;
pub mod store;
