use std::process::Command;
use std::thread;

use signal_hook::{
    consts::{SIGINT, SIGTERM},
    iterator::Signals,
};

use crate::util::command::ChildTracker;

pub fn signal_handler(active: &ChildTracker) {
    let active = active.clone();
    thread::spawn(move || {
        let mut signals = match Signals::new([SIGINT, SIGTERM]) {
            Ok(signals) => signals,
            Err(err) => {
                eprintln!("signal handler setup failed: {}", err);
                return;
            }
        };
        if signals.forever().next().is_some() {
            let pid = match active.lock() {
                Ok(active) => *active,
                Err(_) => None,
            };
            if let Some(pid) = pid {
                let mut cmd = Command::new("kill");
                cmd.arg(pid.to_string());
                let _ = cmd.status();
            }
            std::process::exit(1);
        }
    });
}
