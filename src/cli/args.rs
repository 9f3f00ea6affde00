use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "borgvault", disable_help_flag = true, disable_version_flag = true)]
pub struct Cli {
    #[arg(long)]
    pub init: bool,
    #[arg(long)]
    pub backup: bool,
    #[arg(long)]
    pub check: bool,
    #[arg(long)]
    pub sync: bool,

    #[arg(long)]
    pub force: bool,
    #[arg(long)]
    pub no_prune: bool,
    #[arg(long)]
    pub dry_run: bool,
    #[arg(long, short = 'v')]
    pub verbose: bool,

    #[arg(long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub repo: Vec<String>,
    #[arg(long)]
    pub skip_repo: Vec<String>,

    #[arg(long, short = 'h')]
    pub help: bool,
    #[arg(long)]
    pub version: bool,
}
