//! Code-hosting repository descriptors.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A connected code-hosting repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryHandle {
    /// Owning account or organization.
    pub owner: String,
    pub name: String,
    pub default_branch: String,
    pub description: Option<String>,
    /// Primary language as reported by the host.
    pub language: Option<String>,
    pub stars: u64,
    pub forks: u64,
    /// Repository size in kilobytes.
    pub size: u64,
}

impl RepositoryHandle {
    /// `owner/name`.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

impl fmt::Display for RepositoryHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Kind of a repository content entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Dir,
    Symlink,
    Submodule,
    #[serde(other)]
    Other,
}

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoEntry {
    pub name: String,
    pub path: String,
    pub kind: EntryKind,
    /// Size in bytes (zero for directories).
    pub size: u64,
}

/// A single fetched file, still in its transport encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoFile {
    pub path: String,
    pub kind: EntryKind,
    /// Transport encoding of `content` (`"base64"` for the GitHub contents API).
    pub encoding: Option<String>,
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle() -> RepositoryHandle {
        RepositoryHandle {
            owner: "acme".to_string(),
            name: "widgets".to_string(),
            default_branch: "main".to_string(),
            description: None,
            language: Some("Rust".to_string()),
            stars: 3,
            forks: 1,
            size: 120,
        }
    }

    #[test]
    fn test_full_name_and_display() {
        let repo = handle();
        assert_eq!(repo.full_name(), "acme/widgets");
        assert_eq!(repo.to_string(), "acme/widgets");
    }

    #[test]
    fn test_unknown_entry_kind_maps_to_other() {
        let kind: EntryKind = serde_json::from_str(r#""gitlink""#).unwrap();
        assert_eq!(kind, EntryKind::Other);
        let kind: EntryKind = serde_json::from_str(r#""dir""#).unwrap();
        assert_eq!(kind, EntryKind::Dir);
    }
}
