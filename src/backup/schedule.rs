use std::collections::HashSet;

use crate::backup::due::DueStatus;

pub fn materialized_name(archive: &str, generation: u64) -> String {
    format!("{}.{}", archive, generation)
}

pub fn allocate_generation(archive: &str, current: u64, live: &HashSet<String>) -> u64 {
    let mut candidate = current + 1;
    while live.contains(&materialized_name(archive, candidate)) {
        candidate += 1;
    }
    candidate
}

pub fn order_due<T>(mut entries: Vec<(T, DueStatus)>) -> Vec<(T, DueStatus)> {
    entries.retain(|(_, status)| status.due);
    entries.sort_by(|a, b| b.1.ratio.total_cmp(&a.1.ratio));
    entries
}
