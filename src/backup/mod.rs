use std::collections::HashSet;

use crate::backup::schedule::{allocate_generation, materialized_name, order_due};
use crate::borg::Borg;
use crate::config::model::Repository;
use crate::error::Result;
use crate::state::GenerationStore;
use crate::types::{RunMode, RunOptions};

pub mod due;
pub mod schedule;

pub fn process_repository_backup(
    repo: &Repository,
    borg: &Borg,
    store: &mut GenerationStore,
    now: i64,
    run_mode: RunMode,
    opts: RunOptions,
    borg_extra: &[String],
) -> Result<()> {
    let mut live: HashSet<String> = borg.list(repo)?.into_iter().collect();

    let mut entries = Vec::new();
    for archive in &repo.archives {
        let state = store.archive(&archive.name);
        let status = due::assess(
            &archive.name,
            state.time,
            archive.interval_secs,
            now,
            opts.force,
        )?;
        if run_mode.verbose {
            println!(
                "  archive {}: age {}s of {}s interval, overdue ratio {:.2}",
                archive.name, status.age, archive.interval_secs, status.ratio
            );
        }
        entries.push((archive, status));
    }

    let due_archives = order_due(entries);
    if due_archives.is_empty() {
        println!("repository {}: nothing due", repo.name);
    }

    for (archive, status) in due_archives {
        let state = store.archive(&archive.name);
        let generation = allocate_generation(&archive.name, state.generation, &live);
        let generation_name = materialized_name(&archive.name, generation);
        println!(
            "backup {}::{} (overdue ratio {:.2})",
            repo.name, generation_name, status.ratio
        );
        borg.create(repo, archive, &generation_name, borg_extra)?;
        if !run_mode.dry_run {
            store.record_archive(&archive.name, generation, now)?;
        }
        live.insert(generation_name);

        if opts.skip_prune {
            continue;
        }
        if let Err(err) = borg.prune(repo, archive) {
            println!("prune {}: {} (backup kept)", archive.name, err);
        }
    }

    reconcile_orphans(repo, borg)?;
    Ok(())
}

fn reconcile_orphans(repo: &Repository, borg: &Borg) -> Result<()> {
    let live = borg.list(repo)?;
    let prefixes: Vec<String> = repo.archives.iter().map(|a| a.prefix()).collect();
    for orphan in select_orphans(&live, &prefixes) {
        println!("delete orphan {}::{}", repo.name, orphan);
        if let Err(err) = borg.delete(repo, &orphan) {
            println!("delete {}: {}", orphan, err);
        }
    }
    Ok(())
}

pub fn select_orphans(live: &[String], prefixes: &[String]) -> Vec<String> {
    live.iter()
        .filter(|name| !prefixes.iter().any(|prefix| name.starts_with(prefix.as_str())))
        .cloned()
        .collect()
}
