//! GitHub wire structs and conversion to the Repo descriptor
use crate::utils::Repo;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};

/// Github Repo, as returned by the list endpoint
#[derive(Deserialize, Serialize, Default, Debug, Clone)]
pub struct RepoGithub {
    /// Repository ID
    pub id: u64,

    /// Repository name
    pub name: String,

    /// Repository description
    pub description: Option<String>,

    /// Repository private status
    pub private: bool,

    /// Repository size in kilobytes
    #[serde(default)]
    pub size: u64,

    /// Repository creation timestamp, RFC 3339
    pub created_at: String,
}

impl From<RepoGithub> for Repo {
    fn from(repo: RepoGithub) -> Self {
        Repo {
            name: repo.name,
            description: repo.description.unwrap_or_default(),
            private: repo.private,
            size_kb: repo.size,
            // Filled in by a per-repo probe after listing.
            uses_lfs: false,
            created_at: repo.created_at,
        }
    }
}

/// Body for the create-repository-in-organization endpoint
#[derive(Serialize, Debug, Clone)]
pub struct CreateRepoGithub {
    /// Repository name
    pub name: String,

    /// Repository description
    pub description: String,

    /// Repository private status
    pub private: bool,
}

impl From<&Repo> for CreateRepoGithub {
    fn from(repo: &Repo) -> Self {
        CreateRepoGithub {
            name: repo.name.clone(),
            description: repo.description.clone(),
            private: repo.private,
        }
    }
}

/// Organization membership, as returned by the membership endpoint
#[derive(Deserialize, Debug, Clone)]
pub struct OrgMembership {
    /// Membership state ("active", "pending")
    pub state: String,

    /// Membership role ("admin", "member")
    pub role: String,
}

/// Response of the contents endpoint, reduced to what the LFS probe needs
#[derive(Deserialize, Debug, Clone)]
pub struct FileContents {
    /// Base64-encoded file content
    #[serde(default)]
    pub content: String,
}

/// Whether a base64-encoded `.gitattributes` declares an LFS filter.
///
/// The contents API wraps the base64 payload across lines, so whitespace is
/// stripped before decoding. Undecodable content counts as "no LFS".
pub(crate) fn content_uses_lfs(base64_content: &str) -> bool {
    let compact: String = base64_content
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    match BASE64.decode(compact.as_bytes()) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).contains("filter=lfs"),
        Err(_) => false,
    }
}
