//! Repository transfer worker: clone, create, push, cleanup
use std::fs::remove_dir_all;
use std::path::Path;

use log::{debug, warn};

use crate::errors::{OrgMoverError, TransferStep};
use crate::platform::Platform;
use crate::retry::RetryPolicy;
use crate::utils::Repo;

/// Transfer one repository from the source to the destination organization.
///
/// Runs the three transfer steps in order, then removes the scratch clone
/// whatever their outcome. A cleanup failure is logged and never turns a
/// successful transfer into a failed one.
/// # Errors
/// `Transfer { step }` if a step failed (after retries for clone and push)
pub async fn transfer_one_repo(
    platform: &dyn Platform,
    repo: &Repo,
    source_org: &str,
    destination_org: &str,
    scratch: &Path,
    retry: &RetryPolicy,
) -> Result<(), OrgMoverError> {
    let mirror_path = scratch.join(format!("{}.git", repo.name));
    let result = run_steps(
        platform,
        repo,
        source_org,
        destination_org,
        &mirror_path,
        retry,
    )
    .await;
    if mirror_path.exists() {
        if let Err(e) = remove_dir_all(&mirror_path) {
            warn!(
                "{}: unable to remove scratch clone '{}': {e}",
                repo.name,
                mirror_path.display()
            );
        }
    }
    result
}

/// The three transfer steps, in order. Cleanup is the caller's job.
async fn run_steps(
    platform: &dyn Platform,
    repo: &Repo,
    source_org: &str,
    destination_org: &str,
    mirror_path: &Path,
    retry: &RetryPolicy,
) -> Result<(), OrgMoverError> {
    debug!("{}: cloning from '{source_org}'", repo.name);
    retry
        .run("clone", || async move {
            if mirror_path.exists() {
                // Leftover of a failed attempt; clone needs an empty target.
                remove_dir_all(mirror_path)?;
            }
            platform
                .clone_mirror(source_org, &repo.name, mirror_path)
                .await
        })
        .await
        .map_err(|e| OrgMoverError::transfer(TransferStep::Clone, e))?;

    debug!("{}: creating in '{destination_org}'", repo.name);
    // Not retried: a repeated create against an already-created destination
    // would itself be a name conflict.
    platform
        .create_repo(destination_org, repo)
        .await
        .map_err(|e| OrgMoverError::transfer(TransferStep::Create, e))?;

    debug!("{}: pushing to '{destination_org}'", repo.name);
    retry
        .run("push", || {
            platform.push_mirror(destination_org, &repo.name, mirror_path)
        })
        .await
        .map_err(|e| OrgMoverError::transfer(TransferStep::Push, e))?;
    Ok(())
}
