//! Run orchestrator: drives the migration plan through the transfer worker
use std::fs::{create_dir_all, remove_dir_all};
use std::path::Path;
use std::time::Instant;

use log::{info, warn};
use rand::{distributions::Alphanumeric, thread_rng, Rng};

use crate::config::OrgMoverConfig;
use crate::errors::{OrgMoverError, OrgMoverErrorKind};
use crate::github::config::GithubConfig;
use crate::ledger::{ProgressLedger, RunLogs};
use crate::plan::{build_plan, find_conflicts};
use crate::platform::Platform;
use crate::retry::RetryPolicy;
use crate::transfer::transfer_one_repo;
use crate::utils::{expand_tilde, format_size, input, Repo};

/// Ledger file: one completed repository name per line
const COMPLETED_FILE: &str = "completed_repos.txt";

/// Success log: one timestamped line per completed repository
const SUCCESS_LOG: &str = "migration_log.txt";

/// Error log: one timestamped line per failed transfer
const ERROR_LOG: &str = "migration_errors.txt";

/// The durable state one run writes to: ledger plus the two run logs.
pub struct RunRecorder {
    /// Completed-set, the sole carrier of resumability across runs
    pub ledger: ProgressLedger,

    /// Success and error logs
    pub logs: RunLogs,
}

/// Counts of per-repository outcomes for one run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MigrationSummary {
    /// Repositories transferred in this run
    pub succeeded: usize,

    /// Repositories skipped because the ledger already had them
    pub skipped: usize,

    /// Repositories whose transfer failed; they stay pending for a re-run
    pub failed: usize,
}

/// Drive the plan through the transfer worker, strictly sequentially.
///
/// Per repository: a ledger hit means a skip (no clone, no push); otherwise
/// the transfer runs, a success is recorded durably in the ledger before the
/// next repository begins, and a failure is logged without halting the batch.
/// # Errors
/// Only ledger/log write failures abort the run; a repository's transfer
/// failure does not
pub async fn run_migration(
    platform: &dyn Platform,
    plan: &[Repo],
    source_org: &str,
    destination_org: &str,
    scratch: &Path,
    recorder: &mut RunRecorder,
    retry: &RetryPolicy,
) -> Result<MigrationSummary, OrgMoverError> {
    let mut summary = MigrationSummary::default();
    let total = plan.len();
    for (idx, repo) in plan.iter().enumerate() {
        println!("[{}/{}] Processing: {}", idx + 1, total, repo.name);
        if recorder.ledger.contains(&repo.name) {
            info!("{}: already migrated, skipping", repo.name);
            summary.skipped += 1;
            continue;
        }
        if repo.uses_lfs {
            warn!(
                "{}: uses git LFS; LFS-stored content may not mirror correctly, verify it manually after the run",
                repo.name
            );
        }
        let start = Instant::now();
        match transfer_one_repo(platform, repo, source_org, destination_org, scratch, retry).await
        {
            Ok(()) => {
                let elapsed = start.elapsed().as_secs_f64();
                // Durable before the next repository begins: this is what
                // makes an interrupted run resumable.
                recorder.ledger.record(&repo.name)?;
                recorder
                    .logs
                    .success
                    .append(&format!("✓ {} complete (took {elapsed:.1}s)", repo.name))?;
                info!("{}: complete ({elapsed:.1}s)", repo.name);
                summary.succeeded += 1;
            }
            Err(e) => {
                let elapsed = start.elapsed().as_secs_f64();
                recorder
                    .logs
                    .error
                    .append(&format!("✗ {} FAILED after {elapsed:.1}s: {e}", repo.name))?;
                info!("{}: failed, continuing with the next repository", repo.name);
                summary.failed += 1;
            }
        }
    }
    Ok(summary)
}

/// Print the per-repository table the operator reviews before confirming.
fn display_repo_table(repos: &[Repo], org: &str) {
    println!();
    println!("{}", "=".repeat(100));
    println!("Repositories in {org}");
    println!("{}", "=".repeat(100));
    if repos.is_empty() {
        println!("No repositories found.");
        return;
    }
    println!(
        "{:<4} {:<40} {:<12} {:<8} {:<6} {:<20}",
        "#", "Name", "Size", "Private", "LFS", "Created"
    );
    println!("{}", "-".repeat(100));
    let mut lfs_repos = vec![];
    for (idx, repo) in repos.iter().enumerate() {
        let name: String = repo.name.chars().take(39).collect();
        let created: String = repo.created_at.chars().take(10).collect();
        println!(
            "{:<4} {:<40} {:<12} {:<8} {:<6} {:<20}",
            idx + 1,
            name,
            format_size(repo.size_kb),
            if repo.private { "Yes" } else { "No" },
            if repo.uses_lfs { "YES" } else { "No" },
            created
        );
        if repo.uses_lfs {
            lfs_repos.push(repo.name.clone());
        }
    }
    println!("{}", "=".repeat(100));
    println!("Total: {} repositories", repos.len());
    println!(
        "Total size: {}",
        format_size(repos.iter().map(|r| r.size_kb).sum())
    );
    if !lfs_repos.is_empty() {
        println!();
        println!("WARNING: the following repositories use git LFS:");
        for name in &lfs_repos {
            println!("  - {name}");
        }
        println!("LFS-stored content is not guaranteed to mirror correctly; verify it manually.");
    }
    println!();
}

/// Pre-flight checks: access probes, listings, conflict guard, plan.
///
/// Returns the ordered plan plus the destination listing. Errors before
/// anything is cloned or created: a failed access probe or any name overlap
/// aborts the whole run with nothing transferred.
async fn prepare_run(
    platform: &dyn Platform,
    source_org: &str,
    destination_org: &str,
) -> Result<(Vec<Repo>, Vec<Repo>), OrgMoverError> {
    println!("Verifying organization access...");
    platform.check_admin_access(source_org).await?;
    println!("✓ Admin rights confirmed for {source_org}");
    platform.check_admin_access(destination_org).await?;
    println!("✓ Admin rights confirmed for {destination_org}");

    println!("Detecting repos in both orgs...");
    let source_repos = platform.list_org_repos(source_org).await?;
    let destination_repos = platform.list_org_repos(destination_org).await?;
    println!("✓ {} repos found in {source_org}", source_repos.len());
    println!("✓ {} repos found in {destination_org}", destination_repos.len());

    let conflicts = find_conflicts(&source_repos, &destination_repos);
    if !conflicts.is_empty() {
        eprintln!("ERROR: conflicting repository names found:");
        for name in &conflicts {
            eprintln!("  - {name}");
        }
        eprintln!("This tool only migrates a whole organization into an empty one,");
        eprintln!("and it is not built to deal with conflicts.");
        return Err(
            OrgMoverError::new(OrgMoverErrorKind::Conflict).with_text(conflicts.join(", "))
        );
    }
    println!("✓ No conflicts!");
    Ok((build_plan(source_repos), destination_repos))
}

/// Run the migration, then remove the scratch directory on both paths.
///
/// A scratch-removal failure is logged and never replaces the run's own
/// outcome.
async fn run_and_clean_up(
    platform: &dyn Platform,
    plan: &[Repo],
    source_org: &str,
    destination_org: &str,
    scratch: &Path,
    recorder: &mut RunRecorder,
    retry: &RetryPolicy,
) -> Result<MigrationSummary, OrgMoverError> {
    let result = run_migration(
        platform,
        plan,
        source_org,
        destination_org,
        scratch,
        recorder,
        retry,
    )
    .await;
    if let Err(e) = remove_dir_all(scratch) {
        warn!(
            "unable to remove scratch directory '{}': {e}",
            scratch.display()
        );
    }
    result
}

/// Main function to migrate an organization
/// # Errors
/// Error if access is denied, names conflict, or the run can't be set up
pub async fn main_migrate(config: &mut OrgMoverConfig) -> Result<(), OrgMoverError> {
    let platform = GithubConfig::get_platform(config)?;

    let source_org = match &config.cli_args.source_org {
        Some(org) => org.clone(),
        None => {
            println!("Source organization name:");
            input()?
        }
    };
    let destination_org = match &config.cli_args.destination_org {
        Some(org) => org.clone(),
        None => {
            println!("Destination organization name:");
            input()?
        }
    };
    if source_org == destination_org {
        return Err(OrgMoverError::new(OrgMoverErrorKind::Input)
            .with_text("source and destination organizations can't be the same"));
    }

    let (plan, destination_repos) = prepare_run(&platform, &source_org, &destination_org).await?;
    display_repo_table(&plan, &source_org);
    display_repo_table(&destination_repos, &destination_org);

    let scratch_root = match &config.cli_args.temp_dir {
        Some(path) => path.clone(),
        None => {
            println!("Temporary directory path (for cloning):");
            expand_tilde(&input()?)
        }
    };
    create_dir_all(&scratch_root)?;
    // Private per-run location, cleaned at the end of the run.
    let rand_string: String = thread_rng()
        .sample_iter(&Alphanumeric)
        .take(10)
        .map(char::from)
        .collect();
    let scratch = scratch_root.join(format!("org-mover-{rand_string}"));
    create_dir_all(&scratch)?;

    let ledger = ProgressLedger::open(Path::new(COMPLETED_FILE))?;
    let remaining = plan
        .iter()
        .filter(|repo| !ledger.contains(&repo.name))
        .count();
    if ledger.is_empty() {
        println!("Ready to copy {remaining} repos from {source_org} to {destination_org}");
    } else {
        println!("{} repos already completed", ledger.len());
        println!("{remaining} repos remaining");
    }

    if !config.cli_args.yes {
        println!("Type \"YES\" to continue:");
        if input()? != "YES" {
            println!("Aborted.");
            return Ok(());
        }
    }

    let mut recorder = RunRecorder {
        ledger,
        logs: RunLogs::open(Path::new(SUCCESS_LOG), Path::new(ERROR_LOG))?,
    };
    let retry = RetryPolicy::default();
    println!("Starting migration...");
    let summary = run_and_clean_up(
        &platform,
        &plan,
        &source_org,
        &destination_org,
        &scratch,
        &mut recorder,
        &retry,
    )
    .await?;

    println!("{}", "=".repeat(60));
    println!("Migration Complete");
    println!("{}", "=".repeat(60));
    println!("Total processed: {}", plan.len());
    println!("Succeeded: {}", summary.succeeded);
    println!("Skipped: {}", summary.skipped);
    println!("Failed: {}", summary.failed);
    if summary.failed > 0 {
        println!("See {ERROR_LOG} for error details");
    }
    println!("Completed repos logged in: {COMPLETED_FILE}");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod test {
    use super::*;
    use crate::testutil::{fast_retry, repo, scratch_dir, FakePlatform};
    use std::fs;

    /// Recorder whose ledger and logs live under `dir`.
    fn recorder(dir: &Path) -> RunRecorder {
        RunRecorder {
            ledger: ProgressLedger::open(&dir.join("completed.txt")).unwrap(),
            logs: RunLogs::open(&dir.join("success.log"), &dir.join("error.log")).unwrap(),
        }
    }

    /// Run the orchestrator against a fake.
    async fn run(
        fake: &FakePlatform,
        plan: &[Repo],
        dir: &Path,
        recorder: &mut RunRecorder,
    ) -> MigrationSummary {
        run_migration(fake, plan, "src", "dst", dir, recorder, &fast_retry())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn migrates_whole_plan_in_creation_order() {
        let dir = scratch_dir("migrate-order");
        let fake = FakePlatform::default();
        let plan = build_plan(vec![
            repo("b", "2022-01-01T00:00:00Z"),
            repo("a", "2020-01-01T00:00:00Z"),
        ]);
        let mut rec = recorder(&dir);
        let summary = run(&fake, &plan, &dir, &mut rec).await;
        assert_eq!(
            summary,
            MigrationSummary {
                succeeded: 2,
                skipped: 0,
                failed: 0
            }
        );
        assert_eq!(*fake.created.lock().unwrap(), ["a", "b"]);
        assert!(rec.ledger.contains("a"));
        assert!(rec.ledger.contains("b"));
        let success = fs::read_to_string(dir.join("success.log")).unwrap();
        assert_eq!(success.lines().count(), 2);
        fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn second_run_skips_everything() {
        let dir = scratch_dir("migrate-idempotent");
        let fake = FakePlatform::default();
        let plan = build_plan(vec![
            repo("a", "2020-01-01T00:00:00Z"),
            repo("b", "2022-01-01T00:00:00Z"),
        ]);
        let mut rec = recorder(&dir);
        let first = run(&fake, &plan, &dir, &mut rec).await;
        assert_eq!(first.succeeded, 2);
        let second = run(&fake, &plan, &dir, &mut rec).await;
        assert_eq!(second.succeeded, 0);
        assert_eq!(second.skipped, 2);
        // No repository was cloned or created twice.
        assert_eq!(fake.cloned.lock().unwrap().len(), 2);
        assert_eq!(fake.created.lock().unwrap().len(), 2);
        fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn resumes_after_partial_completion() {
        let dir = scratch_dir("migrate-resume");
        let fake = FakePlatform::default();
        let plan = build_plan(vec![
            repo("a", "2020-01-01T00:00:00Z"),
            repo("b", "2021-01-01T00:00:00Z"),
            repo("c", "2022-01-01T00:00:00Z"),
        ]);
        let mut rec = recorder(&dir);
        // "a" completed in a previous, interrupted run.
        rec.ledger.record("a").unwrap();
        let summary = run(&fake, &plan, &dir, &mut rec).await;
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(*fake.cloned.lock().unwrap(), ["b", "c"]);
        fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn one_failure_does_not_halt_the_batch() {
        let dir = scratch_dir("migrate-isolated-failure");
        let fake = FakePlatform::default();
        fake.push_failures
            .lock()
            .unwrap()
            .insert("c".to_string(), u32::MAX);
        let plan = build_plan(vec![
            repo("c", "2020-01-01T00:00:00Z"),
            repo("d", "2021-01-01T00:00:00Z"),
        ]);
        let mut rec = recorder(&dir);
        let summary = run(&fake, &plan, &dir, &mut rec).await;
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.succeeded, 1);
        assert!(!rec.ledger.contains("c"));
        assert!(rec.ledger.contains("d"));
        let errors = fs::read_to_string(dir.join("error.log")).unwrap();
        let lines: Vec<&str> = errors.lines().collect();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("c FAILED"));
        assert!(lines[0].contains("push"));
        fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn destination_overlap_aborts_before_any_transfer() {
        let fake = FakePlatform::default();
        {
            let mut listings = fake.listings.lock().unwrap();
            listings.insert(
                "src".to_string(),
                vec![
                    repo("Alpha", "2020-01-01T00:00:00Z"),
                    repo("beta", "2021-01-01T00:00:00Z"),
                ],
            );
            listings.insert(
                "dst".to_string(),
                vec![repo("alpha", "2019-01-01T00:00:00Z")],
            );
        }
        let err = prepare_run(&fake, "src", "dst").await.unwrap_err();
        assert!(err.is_fatal());
        assert!(err.to_string().contains("Alpha"));
        // Nothing was cloned or created at the destination.
        assert!(fake.cloned.lock().unwrap().is_empty());
        assert!(fake.created.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn pre_flight_yields_the_ordered_plan() {
        let fake = FakePlatform::default();
        fake.listings.lock().unwrap().insert(
            "src".to_string(),
            vec![
                repo("b", "2022-01-01T00:00:00Z"),
                repo("a", "2020-01-01T00:00:00Z"),
            ],
        );
        let (plan, destination) = prepare_run(&fake, "src", "dst").await.unwrap();
        let names: Vec<&str> = plan.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
        assert!(destination.is_empty());
    }

    #[tokio::test]
    async fn scratch_directory_is_removed_after_a_clean_run() {
        let dir = scratch_dir("migrate-scratch-ok");
        let fake = FakePlatform::default();
        let plan = build_plan(vec![repo("a", "2020-01-01T00:00:00Z")]);
        let mut rec = recorder(&dir);
        let scratch = dir.join("scratch");
        fs::create_dir_all(&scratch).unwrap();
        let summary = run_and_clean_up(&fake, &plan, "src", "dst", &scratch, &mut rec, &fast_retry())
            .await
            .unwrap();
        assert_eq!(summary.succeeded, 1);
        assert!(!scratch.exists());
        fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn scratch_directory_is_removed_even_when_the_run_errors() {
        let dir = scratch_dir("migrate-scratch-err");
        let fake = FakePlatform::default();
        let plan = build_plan(vec![repo("a", "2020-01-01T00:00:00Z")]);
        let mut rec = recorder(&dir);
        // A directory now sits at the ledger path, so the first `record`
        // fails and the run errors out.
        fs::create_dir(dir.join("completed.txt")).unwrap();
        let scratch = dir.join("scratch");
        fs::create_dir_all(&scratch).unwrap();
        let result =
            run_and_clean_up(&fake, &plan, "src", "dst", &scratch, &mut rec, &fast_retry()).await;
        assert!(result.is_err());
        assert!(!scratch.exists());
        fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn failed_repo_is_retried_wholesale_on_the_next_run() {
        let dir = scratch_dir("migrate-rerun-failure");
        let fake = FakePlatform::default();
        // Clone fails for the whole first run, then recovers.
        fake.clone_failures
            .lock()
            .unwrap()
            .insert("a".to_string(), 3);
        let plan = build_plan(vec![repo("a", "2020-01-01T00:00:00Z")]);
        let mut rec = recorder(&dir);
        let first = run(&fake, &plan, &dir, &mut rec).await;
        assert_eq!(first.failed, 1);
        assert!(!rec.ledger.contains("a"));
        let second = run(&fake, &plan, &dir, &mut rec).await;
        assert_eq!(second.succeeded, 1);
        assert!(rec.ledger.contains("a"));
        fs::remove_dir_all(&dir).ok();
    }
}
