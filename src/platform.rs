//! Capability interface to a code-hosting platform
use std::path::Path;
use std::pin::Pin;

use crate::{errors::OrgMoverError, utils::Repo};

/// The narrow set of operations the migration needs from a hosting platform.
///
/// The orchestrator and transfer worker only ever talk to this trait, so the
/// whole state machine can be exercised against a fake implementation.
pub trait Platform: Sync + Send {
    /// Probe admin-level access to an organization. An error means the
    /// whole run must abort before anything is transferred.
    fn check_admin_access(
        &self,
        org: &str,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<(), OrgMoverError>> + Send + '_>>;

    /// List every repository of an organization, paginating as needed.
    fn list_org_repos(
        &self,
        org: &str,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<Vec<Repo>, OrgMoverError>> + Send + '_>>;

    /// Create an empty repository under an organization, copying name,
    /// visibility and description. Errors if the name is already taken.
    fn create_repo(
        &self,
        org: &str,
        repo: &Repo,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<(), OrgMoverError>> + Send + '_>>;

    /// Bare-clone all refs and full history of `org/name` into `target`.
    fn clone_mirror(
        &self,
        org: &str,
        name: &str,
        target: &Path,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<(), OrgMoverError>> + Send + '_>>;

    /// Force-push every ref of the local mirror at `mirror` to `org/name`.
    fn push_mirror(
        &self,
        org: &str,
        name: &str,
        mirror: &Path,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<(), OrgMoverError>> + Send + '_>>;
}
