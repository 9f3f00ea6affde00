use std::process::Command;

use crate::config::model::{Repository, SyncTarget};
use crate::error::{BorgvaultError, Result};
use crate::util::command::Invoker;

pub fn run_sync(
    binary: &str,
    repo: &Repository,
    target: &SyncTarget,
    invoker: &Invoker,
) -> Result<()> {
    let mut cmd = Command::new(binary);
    cmd.arg("sync");
    if let Some(config_file) = &target.config_file {
        cmd.arg("--config").arg(config_file);
    }
    cmd.arg("--delete-after");
    if let Some(limit) = &target.rate_limit {
        cmd.arg("--bwlimit").arg(limit);
    }
    cmd.arg(&repo.path).arg(&target.target);
    let rc = invoker.run_mutating(&mut cmd)?;
    if rc != 0 {
        return Err(BorgvaultError::message(format!(
            "sync {}: rclone exited with code {}",
            repo.name, rc
        )));
    }
    Ok(())
}
