use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub repositories: Vec<RepositoryConfig>,
    #[serde(default)]
    pub excludes: Vec<String>,
    #[serde(default)]
    pub keep: Option<KeepPolicy>,
    #[serde(default)]
    pub options: ConfigOptions,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ConfigOptions {
    #[serde(default, rename = "stateFile")]
    pub state_file: Option<String>,
    #[serde(default, rename = "statusFile")]
    pub status_file: Option<String>,
    #[serde(default, rename = "borgBinary")]
    pub borg_binary: Option<String>,
    #[serde(default, rename = "rcloneBinary")]
    pub rclone_binary: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RepositoryConfig {
    pub name: String,
    pub path: String,
    #[serde(default = "default_compression")]
    pub compression: String,
    #[serde(default, rename = "rateLimit")]
    pub rate_limit: Option<u64>,
    #[serde(default)]
    pub encryption: Option<String>,
    #[serde(default)]
    pub passphrase: Option<String>,
    #[serde(default)]
    pub sync: Option<SyncConfig>,
    pub archives: Vec<ArchiveConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ArchiveConfig {
    pub name: String,
    pub sources: Vec<String>,
    pub interval: String,
    #[serde(default)]
    pub excludes: Vec<String>,
    #[serde(default, rename = "excludeIfPresent")]
    pub exclude_if_present: Option<String>,
    #[serde(default, rename = "oneFileSystem")]
    pub one_file_system: bool,
    #[serde(default, rename = "checkLast")]
    pub check_last: Option<u32>,
    #[serde(default)]
    pub keep: Option<KeepPolicy>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SyncConfig {
    pub target: String,
    pub interval: String,
    #[serde(default, rename = "configFile")]
    pub config_file: Option<String>,
    #[serde(default, rename = "rateLimit")]
    pub rate_limit: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct KeepPolicy {
    #[serde(default)]
    pub hourly: Option<u32>,
    #[serde(default)]
    pub daily: Option<u32>,
    #[serde(default)]
    pub weekly: Option<u32>,
    #[serde(default)]
    pub monthly: Option<u32>,
    #[serde(default)]
    pub yearly: Option<u32>,
}

impl KeepPolicy {
    pub fn is_empty(&self) -> bool {
        self.hourly.is_none()
            && self.daily.is_none()
            && self.weekly.is_none()
            && self.monthly.is_none()
            && self.yearly.is_none()
    }

    pub fn prune_args(&self) -> Vec<String> {
        let units = [
            ("--keep-hourly", self.hourly),
            ("--keep-daily", self.daily),
            ("--keep-weekly", self.weekly),
            ("--keep-monthly", self.monthly),
            ("--keep-yearly", self.yearly),
        ];
        let mut args = Vec::new();
        for (flag, count) in units {
            if let Some(count) = count {
                args.push(flag.to_string());
                args.push(count.to_string());
            }
        }
        args
    }
}

#[derive(Debug, Clone)]
pub struct Repository {
    pub name: String,
    pub path: String,
    pub compression: String,
    pub rate_limit: Option<u64>,
    pub encryption: Option<String>,
    pub passphrase: Option<String>,
    pub sync: Option<SyncTarget>,
    pub archives: Vec<Archive>,
}

impl Repository {
    pub fn is_remote(&self) -> bool {
        if self.path.starts_with("ssh://") {
            return true;
        }
        match (self.path.find('@'), self.path.find(':')) {
            (Some(at), Some(colon)) => at < colon,
            _ => false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Archive {
    pub name: String,
    pub sources: Vec<String>,
    pub interval_secs: u64,
    pub excludes: Vec<String>,
    pub exclude_if_present: Option<String>,
    pub one_file_system: bool,
    pub check_last: u32,
    pub keep: KeepPolicy,
}

impl Archive {
    pub fn prefix(&self) -> String {
        format!("{}.", self.name)
    }
}

#[derive(Debug, Clone)]
pub struct SyncTarget {
    pub target: String,
    pub interval_secs: u64,
    pub config_file: Option<String>,
    pub rate_limit: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub repositories: Vec<Repository>,
    pub state_file: PathBuf,
    pub status_file: Option<PathBuf>,
    pub borg_binary: String,
    pub rclone_binary: String,
}

fn default_compression() -> String {
    "lz4".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo_with_path(path: &str) -> Repository {
        Repository {
            name: "r".to_string(),
            path: path.to_string(),
            compression: "lz4".to_string(),
            rate_limit: None,
            encryption: None,
            passphrase: None,
            sync: None,
            archives: Vec::new(),
        }
    }

    #[test]
    fn remote_paths() {
        assert!(repo_with_path("ssh://backup@host.example/./repo").is_remote());
        assert!(repo_with_path("backup@host.example:repo").is_remote());
        assert!(!repo_with_path("/srv/backups/repo").is_remote());
        assert!(!repo_with_path("/srv/odd:name/repo").is_remote());
    }

    #[test]
    fn prune_args_cover_configured_units() {
        let keep = KeepPolicy {
            daily: Some(7),
            weekly: Some(4),
            ..KeepPolicy::default()
        };
        assert_eq!(
            keep.prune_args(),
            vec!["--keep-daily", "7", "--keep-weekly", "4"]
        );
    }
}
