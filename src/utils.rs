//! Repository descriptor and console helpers
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::errors::OrgMoverError;

/// Repository information, snapshotted at listing time.
#[derive(Deserialize, Serialize, Debug, Default, PartialEq, Eq, Hash, Clone)]
pub struct Repo {
    /// Name of the repository
    pub name: String,

    /// Description of the repository
    pub description: String,

    /// Whether the repository is private
    pub private: bool,

    /// Size of the repository in kilobytes, as reported by the API
    pub size_kb: u64,

    /// Whether the repository stores content in git LFS
    pub uses_lfs: bool,

    /// Creation timestamp, RFC 3339. Lexicographic order is chronological.
    pub created_at: String,
}

/// Format a size in kilobytes to a human readable string.
pub fn format_size(kb: u64) -> String {
    if kb < 1024 {
        format!("{kb} KB")
    } else if kb < 1024 * 1024 {
        format!("{:.1} MB", kb as f64 / 1024.0)
    } else {
        format!("{:.1} GB", kb as f64 / (1024.0 * 1024.0))
    }
}

/// Expand `~` or a leading `~/` to the home directory.
pub(crate) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(home) = home::home_dir() {
        if path == "~" {
            return home;
        }
        if let Some(rest) = path.strip_prefix("~/") {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Get input from the user
pub(crate) fn input() -> Result<String, OrgMoverError> {
    use std::io::{stdin, stdout, Write};
    let mut s = String::new();
    let _ = stdout().flush();
    stdin()
        .read_line(&mut s)
        .map_err(|e| OrgMoverError::new_with_source("Did not enter a correct string", e))?;
    if let Some('\n') = s.chars().next_back() {
        s.pop();
    }
    if let Some('\r') = s.chars().next_back() {
        s.pop();
    }
    Ok(s)
}

/// Get password from the user
pub(crate) fn get_password() -> Result<String, OrgMoverError> {
    rpassword::read_password()
        .map_err(|e| OrgMoverError::new_with_source("Error reading password", e))
}
