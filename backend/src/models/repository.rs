//! Repository model and related types
//!
//! Normalized GitHub repository records shown on the apps page.

use serde::{Deserialize, Serialize};

/// Language shown when GitHub reports none
pub const UNKNOWN_LANGUAGE: &str = "Not specified";

/// Name used when an entry carries no name
pub const UNKNOWN_NAME: &str = "Unknown";

/// A single repository as rendered on the apps page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryRecord {
    pub name: String,
    pub clone_url: String,
    pub html_url: String,
    pub language: String,
    pub stargazers_count: u64,
    pub forks: u64,
    pub description: Option<String>,
    pub updated_at: Option<String>,
}

/// Repository entry as returned by the GitHub "list repositories for a user" endpoint.
///
/// Every field is optional on the wire and may be `null`; defaults are applied in
/// the conversion to [`RepositoryRecord`] rather than at each use site.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawRepository {
    pub name: Option<String>,
    pub clone_url: Option<String>,
    pub html_url: Option<String>,
    pub language: Option<String>,
    pub stargazers_count: Option<u64>,
    pub forks: Option<u64>,
    pub description: Option<String>,
    pub updated_at: Option<String>,
    pub fork: Option<bool>,
}

impl RawRepository {
    /// Whether this entry is a fork of another repository
    pub fn is_fork(&self) -> bool {
        self.fork.unwrap_or_default()
    }
}

impl From<RawRepository> for RepositoryRecord {
    fn from(raw: RawRepository) -> Self {
        Self {
            name: raw.name.unwrap_or_else(|| UNKNOWN_NAME.to_string()),
            clone_url: raw.clone_url.unwrap_or_default(),
            html_url: raw.html_url.unwrap_or_default(),
            language: raw
                .language
                .unwrap_or_else(|| UNKNOWN_LANGUAGE.to_string()),
            stargazers_count: raw.stargazers_count.unwrap_or_default(),
            forks: raw.forks.unwrap_or_default(),
            description: raw.description,
            updated_at: raw.updated_at,
        }
    }
}

/// Payload stored in an external cache backend: `{"repos": [...]}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CachedRepos {
    pub repos: Vec<RepositoryRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_get_defaults() {
        let raw: RawRepository = serde_json::from_str("{}").unwrap();
        let record = RepositoryRecord::from(raw);

        assert_eq!(record.name, UNKNOWN_NAME);
        assert_eq!(record.language, UNKNOWN_LANGUAGE);
        assert_eq!(record.stargazers_count, 0);
        assert_eq!(record.forks, 0);
        assert!(record.clone_url.is_empty());
        assert!(record.description.is_none());
    }

    #[test]
    fn test_null_language_defaults() {
        let raw: RawRepository =
            serde_json::from_str(r#"{"name": "dotfiles", "language": null}"#).unwrap();
        let record = RepositoryRecord::from(raw);

        assert_eq!(record.name, "dotfiles");
        assert_eq!(record.language, UNKNOWN_LANGUAGE);
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let raw: RawRepository = serde_json::from_str(
            r#"{"name": "site", "fork": true, "owner": {"login": "someone"}, "stargazers_count": 3}"#,
        )
        .unwrap();

        assert!(raw.is_fork());
        assert_eq!(raw.stargazers_count, Some(3));
    }

    #[test]
    fn test_null_counts_and_flags_default() {
        let raw: RawRepository = serde_json::from_str(
            r#"{"name": "real-repo", "stargazers_count": null, "forks": 2, "fork": null}"#,
        )
        .unwrap();

        assert!(!raw.is_fork());
        let record = RepositoryRecord::from(raw);
        assert_eq!(record.name, "real-repo");
        assert_eq!(record.stargazers_count, 0);
        assert_eq!(record.forks, 2);
    }

    #[test]
    fn test_cached_repos_wire_shape() {
        let payload = CachedRepos {
            repos: vec![RepositoryRecord::from(RawRepository {
                name: Some("site".to_string()),
                stargazers_count: Some(4),
                ..Default::default()
            })],
        };

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["repos"][0]["name"], "site");
        assert_eq!(value["repos"][0]["stargazers_count"], 4);
    }
}
