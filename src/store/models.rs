use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A persisted confab record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Confab {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub version: String,
    pub status: ConfabStatus,
    pub configuration: Option<serde_json::Value>,
    pub github_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConfabStatus {
    Draft,
    Published,
    Archived,
}

impl ConfabStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Archived => "archived",
        }
    }
}

impl FromStr for ConfabStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "published" => Ok(Self::Published),
            "archived" => Ok(Self::Archived),
            _ => Err(format!("Invalid confab status: {}", s)),
        }
    }
}

/// Bump a `major.minor[.patch]` version to the next minor, resetting patch.
/// Versions that do not parse are returned unchanged.
pub fn bump_version(version: &str) -> String {
    let mut parts = version.splitn(3, '.');
    let major = parts.next().and_then(|p| p.parse::<u64>().ok());
    let minor = parts.next().and_then(|p| p.parse::<u64>().ok());
    match (major, minor) {
        (Some(major), Some(minor)) => format!("{major}.{}.0", minor + 1),
        _ => version.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            ConfabStatus::Draft,
            ConfabStatus::Published,
            ConfabStatus::Archived,
        ] {
            assert_eq!(status.as_str().parse::<ConfabStatus>().unwrap(), status);
        }
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!("deleted".parse::<ConfabStatus>().is_err());
    }

    #[test]
    fn status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&ConfabStatus::Draft).unwrap(),
            "\"draft\""
        );
    }

    #[test]
    fn bump_version_increments_minor_and_resets_patch() {
        assert_eq!(bump_version("1.0.0"), "1.1.0");
        assert_eq!(bump_version("1.9.3"), "1.10.0");
        assert_eq!(bump_version("2.0"), "2.1.0");
    }

    #[test]
    fn bump_version_leaves_unparseable_versions_alone() {
        assert_eq!(bump_version("beta"), "beta");
        assert_eq!(bump_version(""), "");
    }
}
