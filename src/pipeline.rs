//! The pipeline which turns the contents of a price file into statistics.
//!
//! Each run starts from scratch: every intermediate value is passed explicitly from one step to
//! the next and nothing is kept between runs.
use crate::coverage::{Coverage, ReferenceTable, coverage};
use crate::dedup::deduplicate_by_name;
use crate::district::{DistrictAggregate, aggregate, district_counts};
use crate::ranking::{DEFAULT_TOP_N, Rankings};
use crate::record::{ParsedRecords, Record, SkippedRow, parse_records, read_records};
use crate::statistics::{
    Description, NormalCurveSample, describe, histogram_bin_width, normal_curve,
};
use crate::summary::Summary;
use anyhow::{Result, ensure};
use itertools::Itertools;
use log::{info, warn};
use std::path::Path;

/// Options which change how the pipeline is run
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOptions {
    /// Whether to keep only the last record for each bar name
    pub deduplicate: bool,
    /// Number of bars in each ranking
    pub top_n: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            deduplicate: false,
            top_n: DEFAULT_TOP_N,
        }
    }
}

/// Everything computed from a single price file
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    /// Valid records used for the statistics
    pub records: Vec<Record>,
    /// Rows of the price file which were skipped
    pub skipped: Vec<SkippedRow>,
    /// Number of records dropped by deduplication
    pub duplicates_removed: usize,
    /// Prices aggregated by district, in first-seen order
    pub aggregates: Vec<DistrictAggregate>,
    /// Statistics for all prices
    pub description: Description,
    /// Width of the histogram bins the normal curve is scaled to
    pub bin_width: f64,
    /// The normal curve, or `None` if it is undefined because all prices are equal
    pub curve: Option<Vec<NormalCurveSample>>,
    /// Cheapest and most expensive bars
    pub rankings: Rankings,
    /// Coverage of each district in the reference table
    pub coverage: Coverage,
    /// Headline facts
    pub summary: Summary,
}

/// Run the pipeline on the contents of a price file
pub fn run_pipeline(
    csv_text: &str,
    reference: &ReferenceTable,
    options: &PipelineOptions,
) -> Result<Analysis> {
    analyse(parse_records(csv_text)?, reference, options)
}

/// Run the pipeline on the price file at `file_path`
pub fn run_pipeline_from_path(
    file_path: &Path,
    reference: &ReferenceTable,
    options: &PipelineOptions,
) -> Result<Analysis> {
    analyse(read_records(file_path)?, reference, options)
}

/// Compute statistics for records which have already been parsed.
///
/// Returns an error if there are no valid records, so that no partial results are produced.
pub fn analyse(
    parsed: ParsedRecords,
    reference: &ReferenceTable,
    options: &PipelineOptions,
) -> Result<Analysis> {
    let ParsedRecords { records, skipped } = parsed;
    ensure!(!records.is_empty(), "No valid price records found");
    ensure!(options.top_n > 0, "Number of bars to rank must be greater than zero");

    let (records, duplicates_removed) = if options.deduplicate {
        let deduplicated = deduplicate_by_name(&records);
        let removed = records.len() - deduplicated.len();
        (deduplicated, removed)
    } else {
        (records, 0)
    };

    let aggregates = aggregate(&records);
    let prices = records.iter().map(|record| record.price.value()).collect_vec();
    let description = describe(&prices)?;
    let curve = match normal_curve(&description) {
        Ok(curve) => Some(curve),
        Err(err) => {
            warn!("{err}. No normal curve will be produced.");
            None
        }
    };
    let rankings = Rankings::new(&records, options.top_n);
    let coverage = coverage(&district_counts(&aggregates), reference);
    let summary = Summary::new(&records, &aggregates)?;

    info!(
        "Computed statistics for {} bars in {} districts (mean price {:.2} €)",
        records.len(),
        aggregates.len(),
        description.mean
    );

    Ok(Analysis {
        records,
        skipped,
        duplicates_removed,
        aggregates,
        bin_width: histogram_bin_width(&description),
        description,
        curve,
        rankings,
        coverage,
        summary,
    })
}
