use std::process::{Command, Stdio};
use std::sync::{Arc, Mutex};

use crate::error::{BorgvaultError, Result};
use crate::types::RunMode;

pub type ChildTracker = Arc<Mutex<Option<u32>>>;

#[derive(Clone)]
pub struct Invoker {
    run_mode: RunMode,
    active: ChildTracker,
}

pub fn maybe_print_command(cmd: &Command, run_mode: RunMode) {
    if !run_mode.dry_run && !run_mode.verbose {
        return;
    }
    let program = cmd.get_program().to_string_lossy();
    let args: Vec<String> = cmd
        .get_args()
        .map(|a| a.to_string_lossy().to_string())
        .collect();
    println!("{} {}", program, args.join(" "));
}

impl Invoker {
    pub fn new(run_mode: RunMode) -> Self {
        Self {
            run_mode,
            active: Arc::new(Mutex::new(None)),
        }
    }

    pub fn run_mode(&self) -> RunMode {
        self.run_mode
    }

    pub fn tracker(&self) -> ChildTracker {
        self.active.clone()
    }

    fn track(&self, pid: u32) {
        if let Ok(mut active) = self.active.lock() {
            *active = Some(pid);
        }
    }

    fn untrack(&self) {
        if let Ok(mut active) = self.active.lock() {
            *active = None;
        }
    }

    pub fn run(&self, cmd: &mut Command) -> Result<i32> {
        maybe_print_command(cmd, self.run_mode);
        tracing::debug!(program = %cmd.get_program().to_string_lossy(), "spawn");
        let mut child = cmd.spawn().map_err(|e| {
            BorgvaultError::message(format!(
                "{}: {}",
                cmd.get_program().to_string_lossy(),
                e
            ))
        })?;
        self.track(child.id());
        let status = child.wait();
        self.untrack();
        let status = status.map_err(|e| {
            BorgvaultError::message(format!(
                "{}: {}",
                cmd.get_program().to_string_lossy(),
                e
            ))
        })?;
        Ok(status.code().unwrap_or(1))
    }

    pub fn run_mutating(&self, cmd: &mut Command) -> Result<i32> {
        if self.run_mode.dry_run {
            maybe_print_command(cmd, self.run_mode);
            return Ok(0);
        }
        self.run(cmd)
    }

    pub fn run_captured(&self, cmd: &mut Command) -> Result<String> {
        maybe_print_command(cmd, self.run_mode);
        tracing::debug!(program = %cmd.get_program().to_string_lossy(), "spawn captured");
        cmd.stdout(Stdio::piped());
        let child = cmd.spawn().map_err(|e| {
            BorgvaultError::message(format!(
                "{}: {}",
                cmd.get_program().to_string_lossy(),
                e
            ))
        })?;
        self.track(child.id());
        let output = child.wait_with_output();
        self.untrack();
        let output = output.map_err(|e| {
            BorgvaultError::message(format!(
                "{}: {}",
                cmd.get_program().to_string_lossy(),
                e
            ))
        })?;
        if !output.status.success() {
            return Err(BorgvaultError::message(format!(
                "{} failed with exit code {}",
                cmd.get_program().to_string_lossy(),
                output.status.code().unwrap_or(1)
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}
