#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Init,
    Backup,
    Check,
    Sync,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Init => "init",
            Action::Backup => "backup",
            Action::Check => "check",
            Action::Sync => "sync",
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RunMode {
    pub dry_run: bool,
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    pub force: bool,
    pub skip_prune: bool,
}
