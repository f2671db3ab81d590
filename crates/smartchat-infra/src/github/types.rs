//! GitHub REST v3 response shapes, reduced to the fields the relay reads.

use serde::Deserialize;

use smartchat_types::repository::{EntryKind, RepoEntry, RepoFile, RepositoryHandle};

#[derive(Debug, Deserialize)]
pub struct GhOwner {
    pub login: String,
}

#[derive(Debug, Deserialize)]
pub struct GhRepository {
    pub name: String,
    pub owner: GhOwner,
    #[serde(default = "default_branch")]
    pub default_branch: String,
    pub description: Option<String>,
    pub language: Option<String>,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub forks_count: u64,
    #[serde(default)]
    pub size: u64,
}

fn default_branch() -> String {
    "main".to_string()
}

impl From<GhRepository> for RepositoryHandle {
    fn from(repo: GhRepository) -> Self {
        RepositoryHandle {
            owner: repo.owner.login,
            name: repo.name,
            default_branch: repo.default_branch,
            description: repo.description.filter(|d| !d.trim().is_empty()),
            language: repo.language,
            stars: repo.stargazers_count,
            forks: repo.forks_count,
            size: repo.size,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GhContent {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    #[serde(default)]
    pub size: u64,
    pub encoding: Option<String>,
    pub content: Option<String>,
}

impl From<GhContent> for RepoEntry {
    fn from(content: GhContent) -> Self {
        RepoEntry {
            name: content.name,
            path: content.path,
            kind: content.kind,
            size: content.size,
        }
    }
}

impl From<GhContent> for RepoFile {
    fn from(content: GhContent) -> Self {
        RepoFile {
            path: content.path,
            kind: content.kind,
            encoding: content.encoding,
            content: content.content.unwrap_or_default(),
        }
    }
}

/// The contents endpoint returns an object for a file and an array for a
/// directory.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum GhContents {
    Listing(Vec<GhContent>),
    Single(Box<GhContent>),
}
