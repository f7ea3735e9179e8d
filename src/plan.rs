//! Conflict guard and migration plan builder
use std::collections::HashSet;

use crate::utils::Repo;

/// Source repository names that already exist at the destination.
///
/// Names are compared case-insensitively (the hosting provider treats
/// `Repo` and `repo` as the same name); the source-side casing is what gets
/// reported. Sorted for deterministic output.
pub fn find_conflicts(source: &[Repo], destination: &[Repo]) -> Vec<String> {
    let destination_names: HashSet<String> = destination
        .iter()
        .map(|repo| repo.name.to_lowercase())
        .collect();
    let mut conflicts: Vec<String> = source
        .iter()
        .filter(|repo| destination_names.contains(&repo.name.to_lowercase()))
        .map(|repo| repo.name.clone())
        .collect();
    conflicts.sort();
    conflicts
}

/// Order the source repositories into the work queue.
///
/// Oldest first, so relative chronological order is preserved at the
/// destination; ties broken by name so the plan is deterministic.
pub fn build_plan(mut repos: Vec<Repo>) -> Vec<Repo> {
    repos.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.name.cmp(&b.name))
    });
    repos
}
