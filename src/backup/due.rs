use crate::error::{Result, StateError};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DueStatus {
    pub age: i64,
    pub ratio: f64,
    pub due: bool,
}

pub fn assess(
    unit: &str,
    last_time: i64,
    interval_secs: u64,
    now: i64,
    force: bool,
) -> Result<DueStatus> {
    if last_time > now {
        return Err(StateError::ClockSkew {
            unit: unit.to_string(),
            ahead: last_time - now,
        }
        .into());
    }
    let age = now - last_time;
    let ratio = age as f64 / interval_secs.max(1) as f64;
    let due = force || age > interval_secs as i64;
    Ok(DueStatus { age, ratio, due })
}
