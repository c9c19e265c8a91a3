use std::path::PathBuf;

use crate::store::JsonFilePreferenceStore;

/// Onboarding configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnboardingConfig {
    /// JSON file holding per-account preference flags.
    pub state_path: PathBuf,
    /// Namespace prepended to every preference key.
    pub key_prefix: String,
}

pub const DEFAULT_STATE_PATH: &str = "data/onboarding_state.json";
pub const DEFAULT_KEY_PREFIX: &str = "carematch";

impl Default for OnboardingConfig {
    fn default() -> Self {
        Self {
            state_path: PathBuf::from(DEFAULT_STATE_PATH),
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
        }
    }
}

impl OnboardingConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                      |
    /// |-------------------------|------------------------------|
    /// | `ONBOARDING_STATE_PATH` | `data/onboarding_state.json` |
    /// | `ONBOARDING_KEY_PREFIX` | `carematch`                  |
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read a `.env` file if one exists, then [`from_env`](Self::from_env).
    pub fn load() -> Self {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let state_path = non_blank("ONBOARDING_STATE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_PATH));

        let key_prefix = non_blank("ONBOARDING_KEY_PREFIX")
            .map(|v| v.trim().to_string())
            .unwrap_or_else(|| DEFAULT_KEY_PREFIX.into());

        Self {
            state_path,
            key_prefix,
        }
    }
}

/// Build the file-backed preference store described by `config`.
pub fn open_preference_store(config: &OnboardingConfig) -> JsonFilePreferenceStore {
    tracing::info!(path = %config.state_path.display(), "Using onboarding preference file");
    JsonFilePreferenceStore::new(config.state_path.clone())
}
