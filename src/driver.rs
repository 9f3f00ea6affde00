use std::path::Path;

use chrono::Utc;

use crate::backup;
use crate::borg::Borg;
use crate::config::model::{Repository, RuntimeConfig};
use crate::error::{ConfigError, Result};
use crate::state::GenerationStore;
use crate::sync;
use crate::types::{Action, RunOptions};
use crate::util::command::Invoker;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoOutcome {
    Processed,
    Skipped(String),
}

#[derive(Debug, Clone)]
pub struct RepoReport {
    pub name: String,
    pub outcome: RepoOutcome,
}

#[derive(Debug, Clone, Default)]
pub struct RepoFilter {
    pub only: Vec<String>,
    pub exclude: Vec<String>,
}

impl RepoFilter {
    pub fn selects(&self, name: &str) -> bool {
        if !self.only.is_empty() {
            return self.only.iter().any(|n| n == name);
        }
        !self.exclude.iter().any(|n| n == name)
    }
}

pub fn run_actions(
    cfg: &RuntimeConfig,
    actions: &[Action],
    filter: &RepoFilter,
    opts: RunOptions,
    invoker: &Invoker,
    borg_extra: &[String],
) -> Result<Vec<RepoReport>> {
    for name in filter.only.iter().chain(filter.exclude.iter()) {
        if !cfg.repositories.iter().any(|repo| &repo.name == name) {
            return Err(ConfigError::Invalid(format!("no such repository {}", name)).into());
        }
    }

    let run_mode = invoker.run_mode();
    let mut store = GenerationStore::load(&cfg.state_file)?;
    let borg = Borg::new(&cfg.borg_binary, invoker);
    let now = Utc::now().timestamp();

    let mut reports = Vec::new();
    for repo in &cfg.repositories {
        if !filter.selects(&repo.name) {
            continue;
        }
        if !repo.is_remote() && !Path::new(&repo.path).exists() {
            let reason = format!("path {} not reachable", repo.path);
            println!("skip repository {}: {}", repo.name, reason);
            reports.push(RepoReport {
                name: repo.name.clone(),
                outcome: RepoOutcome::Skipped(reason),
            });
            continue;
        }

        for action in actions {
            if run_mode.verbose {
                println!("{} repository {}", action.as_str(), repo.name);
            }
            match action {
                Action::Init => {
                    let rc = borg.init(repo)?;
                    if rc != 0 {
                        println!(
                            "init {}: exit code {} (repository likely already initialized)",
                            repo.name, rc
                        );
                    }
                }
                Action::Backup => backup::process_repository_backup(
                    repo, &borg, &mut store, now, run_mode, opts, borg_extra,
                )?,
                Action::Check => {
                    for archive in &repo.archives {
                        borg.check(repo, archive)?;
                    }
                }
                Action::Sync => {
                    run_repository_sync(cfg, repo, &mut store, now, opts, invoker)?;
                }
            }
        }
        reports.push(RepoReport {
            name: repo.name.clone(),
            outcome: RepoOutcome::Processed,
        });
    }
    Ok(reports)
}

fn run_repository_sync(
    cfg: &RuntimeConfig,
    repo: &Repository,
    store: &mut GenerationStore,
    now: i64,
    opts: RunOptions,
    invoker: &Invoker,
) -> Result<()> {
    let run_mode = invoker.run_mode();
    let target = match &repo.sync {
        Some(target) => target,
        None => {
            if run_mode.verbose {
                println!("repository {}: no sync target", repo.name);
            }
            return Ok(());
        }
    };
    let status = backup::due::assess(
        &repo.name,
        store.sync_time(&repo.name),
        target.interval_secs,
        now,
        opts.force,
    )?;
    if !status.due {
        if run_mode.verbose {
            println!(
                "repository {}: sync not due (overdue ratio {:.2})",
                repo.name, status.ratio
            );
        }
        return Ok(());
    }
    println!("sync {} -> {}", repo.name, target.target);
    sync::run_sync(&cfg.rclone_binary, repo, target, invoker)?;
    if !run_mode.dry_run {
        store.record_sync(&repo.name, now)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RunMode;
    use tempfile::TempDir;

    fn config(dir: &TempDir, repo_path: &str) -> RuntimeConfig {
        RuntimeConfig {
            repositories: vec![crate::config::model::Repository {
                name: "main".to_string(),
                path: repo_path.to_string(),
                compression: "lz4".to_string(),
                rate_limit: None,
                encryption: None,
                passphrase: None,
                sync: None,
                archives: Vec::new(),
            }],
            state_file: dir.path().join("state.json"),
            status_file: None,
            borg_binary: "borg".to_string(),
            rclone_binary: "rclone".to_string(),
        }
    }

    #[test]
    fn unreachable_path_is_skipped_not_fatal() {
        let dir = TempDir::new().expect("tempdir");
        let cfg = config(&dir, "/nonexistent/borgvault/repo");
        let invoker = Invoker::new(RunMode::default());
        let reports = run_actions(
            &cfg,
            &[Action::Backup],
            &RepoFilter::default(),
            RunOptions::default(),
            &invoker,
            &[],
        )
        .expect("run");
        assert_eq!(reports.len(), 1);
        assert!(matches!(reports[0].outcome, RepoOutcome::Skipped(_)));
    }

    #[test]
    fn unknown_filter_name_is_config_error() {
        let dir = TempDir::new().expect("tempdir");
        let cfg = config(&dir, "/nonexistent/borgvault/repo");
        let invoker = Invoker::new(RunMode::default());
        let filter = RepoFilter {
            only: vec!["missing".to_string()],
            exclude: Vec::new(),
        };
        let err = run_actions(
            &cfg,
            &[Action::Backup],
            &filter,
            RunOptions::default(),
            &invoker,
            &[],
        )
        .expect_err("unknown repo");
        assert!(err.to_string().contains("no such repository missing"));
    }

    #[test]
    fn only_list_takes_precedence_over_exclude() {
        let filter = RepoFilter {
            only: vec!["a".to_string()],
            exclude: vec!["a".to_string()],
        };
        assert!(filter.selects("a"));
        assert!(!filter.selects("b"));

        let exclude_only = RepoFilter {
            only: Vec::new(),
            exclude: vec!["b".to_string()],
        };
        assert!(exclude_only.selects("a"));
        assert!(!exclude_only.selects("b"));
    }
}
