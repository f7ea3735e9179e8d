//! Github Platform
use super::{GITHUB_API_HEADER, GITHUB_API_URL, GITHUB_API_VERSION, GITHUB_URL};
use crate::{
    errors::{OrgMoverError, OrgMoverErrorKind},
    github::repo::{content_uses_lfs, CreateRepoGithub, FileContents, OrgMembership, RepoGithub},
    platform::Platform,
    utils::Repo,
};
use log::{debug, info};
use reqwest::header::{ACCEPT, AUTHORIZATION, USER_AGENT};
use std::path::Path;
use std::pin::Pin;
use urlencoding::encode;

/// Github Platform
#[derive(Default, Debug, Clone)]
pub struct GithubPlatform {
    /// Github username
    username: String,

    /// Github token
    token: String,

    /// Reqwest client
    client: reqwest::Client,
}

impl GithubPlatform {
    /// Create a new GithubPlatform
    pub(crate) fn new(username: String, token: String) -> Self {
        Self {
            username,
            token,
            client: reqwest::Client::new(),
        }
    }

    /// Token credential callback for git operations over HTTPS.
    ///
    /// Built inside the transfer futures (the callbacks are not `Send`).
    fn git_credentials(username: String, token: String) -> git2::RemoteCallbacks<'static> {
        let mut callbacks = git2::RemoteCallbacks::new();
        callbacks.credentials(move |_url, username_from_url, _allowed| {
            git2::Cred::userpass_plaintext(username_from_url.unwrap_or(&username), &token)
        });
        callbacks
    }

    /// Probe one repository for git LFS usage via its `.gitattributes`.
    ///
    /// A missing file, an unreadable response, or undecodable content all
    /// count as "no LFS": the probe is advisory, never fatal.
    async fn repo_uses_lfs(&self, org: &str, name: &str) -> bool {
        let url = format!(
            "https://{}/repos/{}/{}/contents/.gitattributes",
            GITHUB_API_URL,
            encode(org),
            encode(name)
        );
        let request = self
            .client
            .get(&url)
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .header(ACCEPT, "application/vnd.github+json")
            .header(USER_AGENT, "reqwest")
            .header(GITHUB_API_HEADER, GITHUB_API_VERSION)
            .send();
        match request.await {
            Ok(response) if response.status().is_success() => match response.text().await {
                Ok(text) => match serde_json::from_str::<FileContents>(&text) {
                    Ok(contents) => content_uses_lfs(&contents.content),
                    Err(e) => {
                        debug!("{org}/{name}: unreadable .gitattributes response: {e}");
                        false
                    }
                },
                Err(_) => false,
            },
            _ => false,
        }
    }
}

impl Platform for GithubPlatform {
    fn check_admin_access(
        &self,
        org: &str,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<(), OrgMoverError>> + Send + '_>> {
        let org = org.to_string();
        Box::pin(async move {
            let url = format!(
                "https://{}/orgs/{}/memberships/{}",
                GITHUB_API_URL,
                encode(&org),
                encode(&self.username)
            );
            let request = self
                .client
                .get(&url)
                .header(AUTHORIZATION, format!("Bearer {}", self.token))
                .header(ACCEPT, "application/vnd.github+json")
                .header(USER_AGENT, "reqwest")
                .header(GITHUB_API_HEADER, GITHUB_API_VERSION)
                .send();
            let response = request.await?;
            if !response.status().is_success() {
                let text = response.text().await?;
                return Err(OrgMoverError::new(OrgMoverErrorKind::Access)
                    .with_text(format!("cannot read membership in '{org}': {text}")));
            }
            let text = response.text().await?;
            let membership: OrgMembership = serde_json::from_str(&text)?;
            if membership.role != "admin" || membership.state != "active" {
                return Err(OrgMoverError::new(OrgMoverErrorKind::Access).with_text(format!(
                    "'{}' is '{}' ({}) in '{org}', active admin required",
                    self.username, membership.role, membership.state
                )));
            }
            Ok(())
        })
    }

    fn list_org_repos(
        &self,
        org: &str,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<Vec<Repo>, OrgMoverError>> + Send + '_>>
    {
        let org = org.to_string();
        Box::pin(async move {
            let url = format!("https://{}/orgs/{}/repos", GITHUB_API_URL, encode(&org));
            let mut page: usize = 1;
            let mut all_repos: Vec<Repo> = vec![];
            loop {
                let request = self
                    .client
                    .get(&url)
                    .query(&[
                        ("type", "all"),
                        ("per_page", "100"),
                        ("page", &page.to_string()),
                    ])
                    .header(AUTHORIZATION, format!("Bearer {}", self.token))
                    .header(ACCEPT, "application/vnd.github+json")
                    .header(USER_AGENT, "reqwest")
                    .header(GITHUB_API_HEADER, GITHUB_API_VERSION)
                    .send();
                let response = request.await?;
                if !response.status().is_success() {
                    let text = response.text().await?;
                    return Err(OrgMoverError::new(OrgMoverErrorKind::ListRepos)
                        .with_text(format!("'{org}': {text}")));
                }
                let text = response.text().await?;
                let repos: Vec<RepoGithub> = serde_json::from_str(&text)?;
                info!("Requested github {org} (page {page}): {}", repos.len());
                if repos.is_empty() {
                    break;
                }
                all_repos.extend(repos.into_iter().map(Repo::from));
                page += 1;
            }
            info!("Checking {} repos for git LFS usage", all_repos.len());
            for repo in all_repos.iter_mut() {
                repo.uses_lfs = self.repo_uses_lfs(&org, &repo.name).await;
            }
            Ok(all_repos)
        })
    }

    fn create_repo(
        &self,
        org: &str,
        repo: &Repo,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<(), OrgMoverError>> + Send + '_>> {
        let org = org.to_string();
        let body = CreateRepoGithub::from(repo);
        Box::pin(async move {
            let url = format!("https://{}/orgs/{}/repos", GITHUB_API_URL, encode(&org));
            let request = self
                .client
                .post(&url)
                .header(AUTHORIZATION, format!("Bearer {}", self.token))
                .header(ACCEPT, "application/vnd.github+json")
                .header(USER_AGENT, "reqwest")
                .header(GITHUB_API_HEADER, GITHUB_API_VERSION)
                .json(&body)
                .send();
            let response = request.await?;
            if !response.status().is_success() {
                let text = response.text().await?;
                return Err(OrgMoverError::new(OrgMoverErrorKind::RepoCreation)
                    .with_text(format!("'{}' in '{org}': {text}", body.name)));
            }
            Ok(())
        })
    }

    fn clone_mirror(
        &self,
        org: &str,
        name: &str,
        target: &Path,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<(), OrgMoverError>> + Send + '_>> {
        let url = format!("https://{}/{}/{}.git", GITHUB_URL, org, name);
        let target = target.to_path_buf();
        let username = self.username.clone();
        let token = self.token.clone();
        Box::pin(async move {
            let callbacks = Self::git_credentials(username, token);
            let mut fetch_opts = git2::FetchOptions::new();
            fetch_opts.remote_callbacks(callbacks);
            fetch_opts.download_tags(git2::AutotagOption::All);
            let mut builder = git2::build::RepoBuilder::new();
            builder.bare(true);
            builder.fetch_options(fetch_opts);
            // Fetch every ref namespace, not just heads: this is a mirror.
            builder.remote_create(|repo, remote_name, remote_url| {
                repo.remote_with_fetch(remote_name, remote_url, "+refs/*:refs/*")
            });
            debug!("Cloning '{url}' into '{}'", target.display());
            builder.clone(&url, &target)?;
            Ok(())
        })
    }

    fn push_mirror(
        &self,
        org: &str,
        name: &str,
        mirror: &Path,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<(), OrgMoverError>> + Send + '_>> {
        let url = format!("https://{}/{}/{}.git", GITHUB_URL, org, name);
        let mirror = mirror.to_path_buf();
        let username = self.username.clone();
        let token = self.token.clone();
        Box::pin(async move {
            let repo = git2::Repository::open(&mirror)?;
            let mut refspecs: Vec<String> = vec![];
            for reference in repo.references()? {
                let reference = reference?;
                if let Some(ref_name) = reference.name() {
                    // Forced, so a retry overwrites a partial prior push.
                    refspecs.push(format!("+{ref_name}:{ref_name}"));
                }
            }
            debug!("Pushing {} refs to '{url}'", refspecs.len());
            let mut opts = git2::PushOptions::new();
            opts.remote_callbacks(Self::git_credentials(username, token));
            let mut remote = repo.remote_anonymous(&url)?;
            remote.push(&refspecs, Some(&mut opts))?;
            Ok(())
        })
    }
}
