//! Coverage compares the number of bars recorded in each district with the official number of
//! bars in that district.
use crate::district::{DistrictID, district_initials};
use crate::input::{input_err_msg, read_csv};
use anyhow::{Context, Result, ensure};
use indexmap::IndexMap;
use log::warn;
use serde::{Deserialize, Serialize};
use std::path::Path;
use unicase::UniCase;

/// The name of the entry which sums coverage across all districts
pub const TOTAL_LABEL: &str = "TOTAL";

/// Official number of bars in each district of Barcelona.
///
/// Taken from the city council's open data portal. This must be updated by hand.
const BARCELONA_OFFICIAL_TOTALS: [(&str, u32); 10] = [
    ("Ciutat Vella", 405),
    ("Eixample", 1001),
    ("Gràcia", 259),
    ("Horta-Guinardó", 178),
    ("Les Corts", 168),
    ("Nou Barris", 162),
    ("Sant Andreu", 154),
    ("Sant Martí", 653),
    ("Sants-Montjuïc", 341),
    ("Sarrià-Sant Gervasi", 284),
];

/// The official number of bars for each known district.
///
/// The keys of this map are the set of valid districts for coverage purposes.
pub type ReferenceTable = IndexMap<DistrictID, u32>;

/// The reference table for Barcelona
pub fn barcelona_reference_table() -> ReferenceTable {
    BARCELONA_OFFICIAL_TOTALS
        .iter()
        .map(|(district, official)| ((*district).into(), *official))
        .collect()
}

/// A row of a reference table CSV file
#[derive(Debug, Deserialize, PartialEq)]
struct ReferenceRowRaw {
    district: String,
    official: u32,
}

/// Read a reference table from a CSV file with `district` and `official` columns.
pub fn read_reference_table(file_path: &Path) -> Result<ReferenceTable> {
    let rows = read_csv::<ReferenceRowRaw>(file_path)?;
    read_reference_table_from_iter(rows.into_iter()).with_context(|| input_err_msg(file_path))
}

fn read_reference_table_from_iter<I>(iter: I) -> Result<ReferenceTable>
where
    I: Iterator<Item = ReferenceRowRaw>,
{
    let mut table = ReferenceTable::new();
    for row in iter {
        ensure!(!row.district.is_empty(), "District name cannot be empty");
        ensure!(
            UniCase::new(row.district.as_str()) != UniCase::new(TOTAL_LABEL),
            "{TOTAL_LABEL} is reserved and cannot be used as a district name"
        );
        let district: DistrictID = row.district.into();
        ensure!(
            table.insert(district.clone(), row.official).is_none(),
            "Duplicate district: {district}"
        );
    }

    Ok(table)
}

/// Coverage of a single district (or of all districts together)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverageEntry {
    /// The district, or [`TOTAL_LABEL`]
    pub district: DistrictID,
    /// Number of bars recorded in the dataset
    pub registered: u32,
    /// Official number of bars
    pub official: u32,
    /// Number of bars not yet recorded. Negative if more bars are recorded than officially exist.
    pub missing: i64,
    /// Percentage of bars recorded, rounded to the nearest integer and capped at 100
    pub percent: u32,
}

impl CoverageEntry {
    /// Create a new entry
    pub fn new(district: DistrictID, registered: u32, official: u32) -> Self {
        Self {
            district,
            registered,
            official,
            missing: i64::from(official) - i64::from(registered),
            percent: coverage_percent(registered, official),
        }
    }

    /// A short label for the entry
    pub fn initials(&self) -> String {
        district_initials(self.district.as_str())
    }
}

/// Percentage of `official` bars which have been registered.
///
/// Zero if there are no official bars.
fn coverage_percent(registered: u32, official: u32) -> u32 {
    if official == 0 {
        return 0;
    }

    let percent = (f64::from(registered) / f64::from(official) * 100.0).round();
    percent.min(100.0) as u32
}

/// Coverage for all districts in a reference table
#[derive(Debug, Clone, PartialEq)]
pub struct Coverage {
    /// One entry per district in the reference table, in the same order
    pub entries: Vec<CoverageEntry>,
    /// The sum over all districts in the reference table
    pub total: CoverageEntry,
    /// Districts with recorded bars which are not in the reference table, with their counts
    pub unreferenced: Vec<(DistrictID, u32)>,
}

impl Coverage {
    /// Iterate over the total followed by the per-district entries
    pub fn iter(&self) -> impl Iterator<Item = &CoverageEntry> {
        std::iter::once(&self.total).chain(self.entries.iter())
    }
}

/// Compare the number of bars recorded in each district with the reference table.
///
/// Only districts in the reference table are included in the entries and in the total. Recorded
/// districts which are missing from the table are reported separately and a warning is logged for
/// each.
///
/// # Arguments
///
/// * `counts` - Number of bars recorded per district
/// * `reference` - Official number of bars per district
pub fn coverage(counts: &IndexMap<DistrictID, u32>, reference: &ReferenceTable) -> Coverage {
    let entries: Vec<_> = reference
        .iter()
        .map(|(district, official)| {
            let registered = counts.get(district).copied().unwrap_or(0);
            CoverageEntry::new(district.clone(), registered, *official)
        })
        .collect();

    for entry in entries.iter().filter(|entry| entry.missing < 0) {
        warn!(
            "District {} has {} registered bars but only {} officially",
            entry.district, entry.registered, entry.official
        );
    }

    let unreferenced: Vec<_> = counts
        .iter()
        .filter(|(district, _)| !reference.contains_key(*district))
        .map(|(district, count)| (district.clone(), *count))
        .collect();
    for (district, count) in &unreferenced {
        warn!(
            "District {district:?} ({count} bars) is not in the reference table and will be \
            excluded from coverage"
        );
    }

    let registered = entries.iter().map(|entry| entry.registered).sum();
    let official = entries.iter().map(|entry| entry.official).sum();
    let total = CoverageEntry::new(TOTAL_LABEL.into(), registered, official);

    Coverage {
        entries,
        total,
        unreferenced,
    }
}
