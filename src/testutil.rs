//! Test doubles shared by the worker and orchestrator tests.
#![allow(clippy::unwrap_used)]
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Mutex;
use std::time::Duration;

use rand::{distributions::Alphanumeric, thread_rng, Rng};

use crate::errors::{OrgMoverError, OrgMoverErrorKind};
use crate::platform::Platform;
use crate::retry::RetryPolicy;
use crate::utils::Repo;

/// Fresh scratch directory under the system temp dir.
pub(crate) fn scratch_dir(tag: &str) -> PathBuf {
    let rand_string: String = thread_rng()
        .sample_iter(&Alphanumeric)
        .take(10)
        .map(char::from)
        .collect();
    let dir = std::env::temp_dir().join(format!("org-mover-{tag}-{rand_string}"));
    fs::create_dir_all(&dir).unwrap();
    dir
}

/// Descriptor with the fields the state machine cares about.
pub(crate) fn repo(name: &str, created_at: &str) -> Repo {
    Repo {
        name: name.to_string(),
        description: format!("{name} description"),
        created_at: created_at.to_string(),
        ..Repo::default()
    }
}

/// Retry policy that does not sleep between attempts.
pub(crate) fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        backoff: Duration::ZERO,
    }
}

/// Scriptable in-memory platform.
///
/// Clones materialize as real directories under the given target so the
/// cleanup guarantee can be observed from the outside.
#[derive(Default)]
pub(crate) struct FakePlatform {
    /// Listings per organization name
    pub listings: Mutex<HashMap<String, Vec<Repo>>>,

    /// Names cloned from the source, in call order
    pub cloned: Mutex<Vec<String>>,

    /// Names created at the destination, in call order
    pub created: Mutex<Vec<String>>,

    /// Names pushed to the destination, in call order
    pub pushed: Mutex<Vec<String>>,

    /// Remaining scripted clone failures per repository name
    pub clone_failures: Mutex<HashMap<String, u32>>,

    /// Remaining scripted push failures per repository name
    pub push_failures: Mutex<HashMap<String, u32>>,
}

impl FakePlatform {
    /// Consume one scripted failure for `name`, if any is left.
    fn take_failure(failures: &Mutex<HashMap<String, u32>>, name: &str) -> bool {
        let mut failures = failures.lock().unwrap();
        match failures.get_mut(name) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                true
            }
            _ => false,
        }
    }
}

impl Platform for FakePlatform {
    fn check_admin_access(
        &self,
        _org: &str,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<(), OrgMoverError>> + Send + '_>> {
        Box::pin(async { Ok(()) })
    }

    fn list_org_repos(
        &self,
        org: &str,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<Vec<Repo>, OrgMoverError>> + Send + '_>>
    {
        let org = org.to_string();
        Box::pin(async move {
            Ok(self
                .listings
                .lock()
                .unwrap()
                .get(&org)
                .cloned()
                .unwrap_or_default())
        })
    }

    fn create_repo(
        &self,
        org: &str,
        repo: &Repo,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<(), OrgMoverError>> + Send + '_>> {
        let org = org.to_string();
        let name = repo.name.clone();
        Box::pin(async move {
            let already_listed = self
                .listings
                .lock()
                .unwrap()
                .get(&org)
                .map(|repos| repos.iter().any(|r| r.name == name))
                .unwrap_or(false);
            let mut created = self.created.lock().unwrap();
            if already_listed || created.contains(&name) {
                return Err(OrgMoverError::new(OrgMoverErrorKind::RepoCreation)
                    .with_text(format!("name already exists: '{name}'")));
            }
            created.push(name);
            Ok(())
        })
    }

    fn clone_mirror(
        &self,
        _org: &str,
        name: &str,
        target: &Path,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<(), OrgMoverError>> + Send + '_>> {
        let name = name.to_string();
        let target = target.to_path_buf();
        Box::pin(async move {
            if Self::take_failure(&self.clone_failures, &name) {
                return Err(OrgMoverError::new(OrgMoverErrorKind::Git2)
                    .with_text(format!("scripted clone failure for '{name}'")));
            }
            fs::create_dir_all(&target)?;
            fs::write(target.join("HEAD"), "ref: refs/heads/main\n")?;
            self.cloned.lock().unwrap().push(name);
            Ok(())
        })
    }

    fn push_mirror(
        &self,
        _org: &str,
        name: &str,
        mirror: &Path,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<(), OrgMoverError>> + Send + '_>> {
        let name = name.to_string();
        let mirror = mirror.to_path_buf();
        Box::pin(async move {
            if !mirror.exists() {
                return Err(OrgMoverError::new(OrgMoverErrorKind::Git2)
                    .with_text(format!("no local mirror at '{}'", mirror.display())));
            }
            if Self::take_failure(&self.push_failures, &name) {
                return Err(OrgMoverError::new(OrgMoverErrorKind::Git2)
                    .with_text(format!("scripted push failure for '{name}'")));
            }
            self.pushed.lock().unwrap().push(name);
            Ok(())
        })
    }
}
