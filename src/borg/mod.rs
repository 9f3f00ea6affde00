use std::io::Write;
use std::process::Command;

use tempfile::NamedTempFile;

use crate::config::model::{Archive, Repository};
use crate::error::{BorgvaultError, Result};
use crate::util::command::Invoker;

pub struct Borg<'a> {
    binary: &'a str,
    invoker: &'a Invoker,
}

impl<'a> Borg<'a> {
    pub fn new(binary: &'a str, invoker: &'a Invoker) -> Self {
        Self { binary, invoker }
    }

    fn command(&self, repo: &Repository) -> Command {
        let mut cmd = Command::new(self.binary);
        if let Some(passphrase) = &repo.passphrase {
            cmd.env("BORG_PASSPHRASE", passphrase);
        }
        cmd
    }

    pub fn init(&self, repo: &Repository) -> Result<i32> {
        let mut cmd = self.command(repo);
        cmd.arg("init");
        if let Some(mode) = &repo.encryption {
            cmd.arg("--encryption").arg(mode);
        }
        cmd.arg(&repo.path);
        self.invoker.run_mutating(&mut cmd)
    }

    pub fn list(&self, repo: &Repository) -> Result<Vec<String>> {
        let mut cmd = self.command(repo);
        cmd.arg("list").arg(&repo.path);
        let output = self.invoker.run_captured(&mut cmd)?;
        Ok(parse_listing(&output))
    }

    pub fn create(
        &self,
        repo: &Repository,
        archive: &Archive,
        generation_name: &str,
        extra: &[String],
    ) -> Result<()> {
        // Keep the excludes file alive until the child has exited.
        let excludes_file = write_excludes_file(&archive.excludes)?;
        let mut cmd = self.command(repo);
        cmd.arg("create")
            .arg("--compression")
            .arg(&repo.compression);
        if self.invoker.run_mode().verbose {
            cmd.arg("--stats");
        }
        if let Some(limit) = repo.rate_limit {
            cmd.arg("--remote-ratelimit").arg(limit.to_string());
        }
        if let Some(file) = &excludes_file {
            cmd.arg("--exclude-from").arg(file.path());
        }
        if let Some(marker) = &archive.exclude_if_present {
            cmd.arg("--exclude-if-present").arg(marker);
        }
        if archive.one_file_system {
            cmd.arg("--one-file-system");
        }
        for arg in extra {
            cmd.arg(arg);
        }
        cmd.arg(format!("{}::{}", repo.path, generation_name));
        for source in &archive.sources {
            cmd.arg(source);
        }
        let rc = self.invoker.run_mutating(&mut cmd)?;
        if rc != 0 {
            return Err(BorgvaultError::message(format!(
                "create {}: borg exited with code {}",
                generation_name, rc
            )));
        }
        Ok(())
    }

    pub fn check(&self, repo: &Repository, archive: &Archive) -> Result<()> {
        let mut cmd = self.command(repo);
        cmd.arg("check")
            .arg("--glob-archives")
            .arg(format!("{}*", archive.prefix()))
            .arg("--last")
            .arg(archive.check_last.to_string())
            .arg(&repo.path);
        let rc = self.invoker.run(&mut cmd)?;
        if rc != 0 {
            return Err(BorgvaultError::message(format!(
                "check {}: borg exited with code {}",
                archive.name, rc
            )));
        }
        Ok(())
    }

    pub fn prune(&self, repo: &Repository, archive: &Archive) -> Result<()> {
        let mut cmd = self.command(repo);
        cmd.arg("prune")
            .arg("--glob-archives")
            .arg(format!("{}*", archive.prefix()));
        for arg in archive.keep.prune_args() {
            cmd.arg(arg);
        }
        cmd.arg(&repo.path);
        let rc = self.invoker.run_mutating(&mut cmd)?;
        if rc != 0 {
            return Err(BorgvaultError::message(format!(
                "prune {}: borg exited with code {}",
                archive.name, rc
            )));
        }
        Ok(())
    }

    pub fn delete(&self, repo: &Repository, archive_name: &str) -> Result<()> {
        let mut cmd = self.command(repo);
        cmd.arg("delete")
            .arg(format!("{}::{}", repo.path, archive_name));
        let rc = self.invoker.run_mutating(&mut cmd)?;
        if rc != 0 {
            return Err(BorgvaultError::message(format!(
                "delete {}: borg exited with code {}",
                archive_name, rc
            )));
        }
        Ok(())
    }
}

pub fn parse_listing(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| line.split_whitespace().next())
        .map(String::from)
        .collect()
}

fn write_excludes_file(excludes: &[String]) -> Result<Option<NamedTempFile>> {
    if excludes.is_empty() {
        return Ok(None);
    }
    let mut file = NamedTempFile::new()?;
    for pattern in excludes {
        writeln!(file, "{}", pattern)?;
    }
    Ok(Some(file))
}
