//! Mirror target configuration.
//!
//! The service mirrors every confab into a single configured repository.
//! Without a token, calls rely on the remote allowing unauthenticated
//! access to the public default confabs repo.

/// Repository used when no mirror target is configured.
pub const DEFAULT_MIRROR_OWNER: &str = "letsconfab";
pub const DEFAULT_MIRROR_REPO: &str = "confabs";

#[derive(Debug, Clone)]
pub struct Settings {
    pub mirror_owner: String,
    pub mirror_repo: String,
    pub github_token: Option<String>,
}

impl Settings {
    /// Read settings from the environment (`.env` is loaded by main).
    ///
    /// - `CONFAB_GITHUB_OWNER` / `CONFAB_GITHUB_REPO` — mirror target
    /// - `GITHUB_TOKEN` — access token; optional for the public default repo
    pub fn from_env() -> Self {
        Self {
            mirror_owner: std::env::var("CONFAB_GITHUB_OWNER")
                .unwrap_or_else(|_| DEFAULT_MIRROR_OWNER.to_string()),
            mirror_repo: std::env::var("CONFAB_GITHUB_REPO")
                .unwrap_or_else(|_| DEFAULT_MIRROR_REPO.to_string()),
            github_token: std::env::var("GITHUB_TOKEN").ok().filter(|t| !t.is_empty()),
        }
    }
}
