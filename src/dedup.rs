//! Optional removal of bars which appear more than once in the price file.
use crate::record::Record;
use log::info;
use std::collections::HashMap;

/// Keep only the last record for each bar name.
///
/// The kept records stay in their original relative order. Later rows are assumed to be more up
/// to date, as rows are appended when prices are re-surveyed.
pub fn deduplicate_by_name(records: &[Record]) -> Vec<Record> {
    let last_index: HashMap<&str, usize> = records
        .iter()
        .enumerate()
        .map(|(i, record)| (record.name.as_str(), i))
        .collect();

    let deduplicated: Vec<_> = records
        .iter()
        .enumerate()
        .filter(|(i, record)| last_index.get(record.name.as_str()) == Some(i))
        .map(|(_, record)| record.clone())
        .collect();

    let removed = records.len() - deduplicated.len();
    if removed > 0 {
        info!("Removed {removed} duplicate records");
    }

    deduplicated
}
