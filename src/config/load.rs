use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::config::model::{Archive, Config, Repository, RuntimeConfig, SyncTarget};
use crate::error::{ConfigError, Result};
use crate::util::interval::parse_interval;

const DEFAULT_STATE_FILE: &str = "/var/lib/borgvault/state.json";
const DEFAULT_BORG_BINARY: &str = "borg";
const DEFAULT_RCLONE_BINARY: &str = "rclone";

pub fn load_config(path: &Path) -> Result<RuntimeConfig> {
    let mut contents = String::new();
    File::open(path)?.read_to_string(&mut contents)?;
    let cfg: Config = serde_yaml::from_str(&contents)
        .map_err(|e| ConfigError::Parse(e.to_string()))?;
    parse_runtime(cfg)
}

fn is_safe_name(name: &str) -> bool {
    if name.is_empty() || name == "." || name == ".." {
        return false;
    }
    name.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn parse_runtime(cfg: Config) -> Result<RuntimeConfig> {
    let global_excludes = cfg.excludes;
    let global_keep = cfg.keep.unwrap_or_default();

    let mut repositories = Vec::new();
    let mut repo_names = HashSet::new();
    let mut archive_names = HashSet::new();

    for repo in cfg.repositories {
        if !is_safe_name(&repo.name) {
            return Err(ConfigError::Invalid(format!(
                "repository name {:?} must use only letters, digits, '-', '_'",
                repo.name
            ))
            .into());
        }
        if repo.path.trim().is_empty() {
            return Err(ConfigError::Invalid(format!(
                "repository {}: path is empty",
                repo.name
            ))
            .into());
        }
        if !repo_names.insert(repo.name.clone()) {
            return Err(
                ConfigError::Invalid(format!("duplicate repository {}", repo.name)).into(),
            );
        }

        let mut archives = Vec::new();
        for archive in repo.archives {
            if !is_safe_name(&archive.name) {
                return Err(ConfigError::Invalid(format!(
                    "archive name {:?} must use only letters, digits, '-', '_'",
                    archive.name
                ))
                .into());
            }
            if !archive_names.insert(archive.name.clone()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate archive name {}",
                    archive.name
                ))
                .into());
            }
            if archive.sources.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "archive {}: no source paths",
                    archive.name
                ))
                .into());
            }
            for source in &archive.sources {
                if !Path::new(source).exists() {
                    return Err(ConfigError::Invalid(format!(
                        "archive {}: source path {} does not exist",
                        archive.name, source
                    ))
                    .into());
                }
            }
            let interval_secs = parse_interval(&archive.interval)
                .map_err(|e| ConfigError::Invalid(format!("archive {}: {}", archive.name, e)))?;
            let keep = archive.keep.unwrap_or_else(|| global_keep.clone());
            if keep.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "archive {}: no keep policy configured",
                    archive.name
                ))
                .into());
            }
            let mut excludes = global_excludes.clone();
            excludes.extend(archive.excludes);
            archives.push(Archive {
                name: archive.name,
                sources: archive.sources,
                interval_secs,
                excludes,
                exclude_if_present: archive.exclude_if_present,
                one_file_system: archive.one_file_system,
                check_last: archive.check_last.unwrap_or(1),
                keep,
            });
        }

        let sync = match repo.sync {
            Some(sync) => {
                let interval_secs = parse_interval(&sync.interval).map_err(|e| {
                    ConfigError::Invalid(format!("repository {} sync: {}", repo.name, e))
                })?;
                if sync.target.trim().is_empty() {
                    return Err(ConfigError::Invalid(format!(
                        "repository {} sync: target is empty",
                        repo.name
                    ))
                    .into());
                }
                Some(SyncTarget {
                    target: sync.target,
                    interval_secs,
                    config_file: sync.config_file,
                    rate_limit: sync.rate_limit,
                })
            }
            None => None,
        };

        repositories.push(Repository {
            name: repo.name,
            path: repo.path,
            compression: repo.compression,
            rate_limit: repo.rate_limit,
            encryption: repo.encryption,
            passphrase: repo.passphrase,
            sync,
            archives,
        });
    }

    Ok(RuntimeConfig {
        repositories,
        state_file: PathBuf::from(
            cfg.options
                .state_file
                .unwrap_or_else(|| DEFAULT_STATE_FILE.to_string()),
        ),
        status_file: cfg.options.status_file.map(PathBuf::from),
        borg_binary: cfg
            .options
            .borg_binary
            .unwrap_or_else(|| DEFAULT_BORG_BINARY.to_string()),
        rclone_binary: cfg
            .options
            .rclone_binary
            .unwrap_or_else(|| DEFAULT_RCLONE_BINARY.to_string()),
    })
}
