use std::env;
use std::path::PathBuf;

use anyhow::Result;
use chrono::Local;
use clap::error::ErrorKind;
use clap::Parser;

use crate::cli::args::Cli;
use crate::config::load::load_config;
use crate::config::model::RuntimeConfig;
use crate::driver::{self, RepoFilter, RepoOutcome};
use crate::error::BorgvaultError;
use crate::signal_handler;
use crate::status::write_status;
use crate::types::{Action, RunMode, RunOptions};
use crate::util::command::Invoker;

const CONFIG_FILE: &str = "/etc/borgvault.yaml";
const VERSION: &str = env!("CARGO_PKG_VERSION");
const LICENSE_NAME: &str = "GNU GPL v3 or later";
const PROJECT_URL: &str = "https://github.com/borgvault/borgvault";

pub mod args;

pub fn run() -> Result<()> {
    init_tracing();
    let (cli, borg_extra) = parse_cli()?;

    print_banner();
    if cli.help {
        print_help();
        return Ok(());
    }
    if cli.version {
        println!("Project: {}", PROJECT_URL);
        println!("License: {}", LICENSE_NAME);
        return Ok(());
    }

    let actions = selected_actions(&cli);
    let run_mode = RunMode {
        dry_run: cli.dry_run,
        verbose: cli.verbose,
    };
    let opts = RunOptions {
        force: cli.force,
        skip_prune: cli.no_prune,
    };
    let filter = RepoFilter {
        only: cli.repo,
        exclude: cli.skip_repo,
    };
    let config_path = cli.config.unwrap_or_else(|| PathBuf::from(CONFIG_FILE));

    println!("{}", Local::now().format("%d-%m-%Y %H:%M"));

    let cfg = match load_config(&config_path) {
        Ok(cfg) => cfg,
        Err(err) => {
            println!("failed to load config {}: {}", config_path.display(), err);
            std::process::exit(2);
        }
    };

    if run_mode.verbose {
        println!(
            "loaded config {} with {} repositories",
            config_path.display(),
            cfg.repositories.len()
        );
    }

    let invoker = Invoker::new(run_mode);
    signal_handler::signal_handler(&invoker.tracker());

    match driver::run_actions(&cfg, &actions, &filter, opts, &invoker, &borg_extra) {
        Ok(reports) => {
            record_status(&cfg, run_mode, true, None);
            println!("{}", Local::now().format("%d-%m-%Y %H:%M"));
            let skipped: Vec<_> = reports
                .iter()
                .filter(|report| matches!(report.outcome, RepoOutcome::Skipped(_)))
                .collect();
            if !skipped.is_empty() {
                for report in &skipped {
                    if let RepoOutcome::Skipped(reason) = &report.outcome {
                        println!("skipped repository {}: {}", report.name, reason);
                    }
                }
                std::process::exit(3);
            }
            Ok(())
        }
        Err(err) => {
            record_status(&cfg, run_mode, false, Some(&err.to_string()));
            println!("run failed: {}", err);
            match err {
                BorgvaultError::Config(_) => std::process::exit(2),
                _ => std::process::exit(1),
            }
        }
    }
}

fn record_status(cfg: &RuntimeConfig, run_mode: RunMode, ok: bool, detail: Option<&str>) {
    if run_mode.dry_run {
        return;
    }
    if let Some(path) = &cfg.status_file {
        if let Err(err) = write_status(path, ok, detail) {
            println!("{}", err);
        }
    }
}

fn selected_actions(cli: &Cli) -> Vec<Action> {
    let mut actions = Vec::new();
    if cli.init {
        actions.push(Action::Init);
    }
    if cli.backup {
        actions.push(Action::Backup);
    }
    if cli.check {
        actions.push(Action::Check);
    }
    if cli.sync {
        actions.push(Action::Sync);
    }
    if actions.is_empty() {
        actions.push(Action::Backup);
    }
    actions
}

fn parse_cli() -> Result<(Cli, Vec<String>)> {
    let raw: Vec<String> = env::args().collect();
    let (args, borg_extra) = split_borg_args(raw);
    match Cli::try_parse_from(args) {
        Ok(cli) => Ok((cli, borg_extra)),
        Err(err) => {
            if err.kind() == ErrorKind::DisplayHelp {
                print_banner();
                print_help();
                std::process::exit(0);
            }
            if err.kind() == ErrorKind::DisplayVersion {
                print_banner();
                println!("Project: {}", PROJECT_URL);
                println!("License: {}", LICENSE_NAME);
                std::process::exit(0);
            }
            if err.kind() == ErrorKind::UnknownArgument {
                if let Some(arg) = err.context().find_map(|c| {
                    if let clap::error::ContextKind::InvalidArg = c.0 {
                        Some(c.1.to_string())
                    } else {
                        None
                    }
                }) {
                    println!("unknown option {}", arg);
                    std::process::exit(2);
                }
            }
            println!("{}", err);
            std::process::exit(2);
        }
    }
}

fn split_borg_args(raw: Vec<String>) -> (Vec<String>, Vec<String>) {
    let mut args = Vec::new();
    let mut borg_extra = Vec::new();
    let mut iter = raw.into_iter();
    if let Some(bin) = iter.next() {
        args.push(bin);
    }
    let mut in_borg = false;
    for arg in iter {
        if in_borg {
            borg_extra.push(arg);
            continue;
        }
        if arg == "--borg" {
            in_borg = true;
            continue;
        }
        args.push(arg);
    }
    (args, borg_extra)
}

fn print_banner() {
    println!("Borgvault {}", VERSION);
}

fn print_help() {
    println!("Usage:");
    println!("  borgvault [--init] [--backup] [--check] [--sync] [options]");
    println!("  borgvault --version");
    println!();
    println!("Actions (default: --backup; combinable, run in the order init, backup, check, sync):");
    println!("  --init                 Initialize selected repositories");
    println!("  --backup               Back up due archives and prune by keep policy");
    println!("  --check                Verify recent generations of each archive");
    println!("  --sync                 Mirror selected repositories to their sync targets");
    println!();
    println!("Options:");
    println!("  --config <path>        Config file path");
    println!("  --repo <name>          Process only selected repositories");
    println!("  --skip-repo <name>     Skip selected repositories");
    println!("  --force                Run all jobs regardless of their interval");
    println!("  --no-prune             Skip retention pruning after backups");
    println!("  --dry-run              Print tool invocations without executing them");
    println!("  --verbose              Verbose output");
    println!("  --borg <args...>       Pass remaining args to borg create");
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("info")
        .try_init();
}
