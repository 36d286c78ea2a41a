//! Records hold the price of a beer at a single bar, as read from a price CSV file.
//!
//! Price files are curated by hand and are known to contain gaps, so rows without a usable price
//! are not treated as errors. Instead each one is reported as a [`SkippedRow`] alongside the valid
//! records.
use crate::district::DistrictID;
use crate::input::{input_err_msg, read_text};
use crate::units::Euros;
use anyhow::{Context, Result, ensure};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Columns which must be present in the header row of a price file
const REQUIRED_COLUMNS: [&str; 3] = ["Local", "Preu", "Districte"];

/// The price of a beer at a single bar
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    /// The name of the bar
    pub name: String,
    /// The price of a beer
    pub price: Euros,
    /// The district in which the bar is found
    pub district: DistrictID,
    /// A link to the bar's location (may be empty)
    pub link: String,
}

/// A row of the price file, before the price has been cleaned.
///
/// Every field is optional so that short rows (e.g. with no trailing `Link` value) can still be
/// read.
#[derive(Debug, Deserialize, PartialEq)]
struct RecordRaw {
    #[serde(rename = "Local", default)]
    name: Option<String>,
    #[serde(rename = "Preu", default)]
    price: Option<String>,
    #[serde(rename = "Districte", default)]
    district: Option<String>,
    #[serde(rename = "Link", default)]
    link: Option<String>,
}

/// The reason a row of the price file did not produce a [`Record`]
#[derive(Debug, Clone, PartialEq, derive_more::Display)]
pub enum SkipReason {
    /// The price field is empty
    #[display("no price given")]
    MissingPrice,
    /// The price field could not be read as a number
    #[display("price {_0:?} is not a number")]
    InvalidPrice(String),
    /// The price is less than zero
    #[display("price {_0} is negative")]
    NegativePrice(f64),
    /// The row itself could not be read
    #[display("unreadable row: {_0}")]
    Unreadable(String),
}

/// A row of the price file which was skipped
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRow {
    /// Line number in the file (1-based, header included)
    pub line: u64,
    /// The bar name given on this row, if any
    pub name: String,
    /// Why the row was skipped
    pub reason: SkipReason,
}

/// The outcome of parsing a price file
#[derive(Debug, Default, PartialEq)]
pub struct ParsedRecords {
    /// Valid records, in file order
    pub records: Vec<Record>,
    /// Rows which were skipped, in file order
    pub skipped: Vec<SkippedRow>,
}

/// Clean up a price field and convert it to a number.
///
/// Euro signs are removed, a decimal comma is replaced with a decimal point and surrounding
/// whitespace is ignored, so both `"3,50 €"` and `"4.20"` are accepted.
pub fn parse_price(raw: &str) -> Result<Euros, SkipReason> {
    let cleaned = raw.replace('€', "").replace(',', ".");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return Err(SkipReason::MissingPrice);
    }

    let price: f64 = cleaned
        .parse()
        .map_err(|_| SkipReason::InvalidPrice(raw.trim().to_string()))?;
    if !price.is_finite() {
        return Err(SkipReason::InvalidPrice(raw.trim().to_string()));
    }
    if price < 0.0 {
        return Err(SkipReason::NegativePrice(price));
    }

    // "-0" is a valid price of zero
    Ok(Euros(price.abs()))
}

/// Convert a raw row into a [`Record`]
fn parse_row(raw: RecordRaw) -> Result<Record, SkipReason> {
    let price = match raw.price.as_deref() {
        Some(price) => parse_price(price)?,
        None => return Err(SkipReason::MissingPrice),
    };

    Ok(Record {
        name: raw.name.unwrap_or_default(),
        price,
        district: raw.district.unwrap_or_default().into(),
        link: raw.link.unwrap_or_default(),
    })
}

/// Parse the contents of a price file.
///
/// The header row must contain the `Local`, `Preu` and `Districte` columns. The `Link` column is
/// optional and other columns are ignored.
///
/// # Returns
///
/// The valid records and skipped rows, both in file order, or an error if the header row is
/// missing or incomplete.
pub fn parse_records(csv_text: &str) -> Result<ParsedRecords> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(csv_text.as_bytes());
    let headers = reader
        .headers()
        .context("Could not read header row")?
        .clone();
    for column in REQUIRED_COLUMNS {
        ensure!(
            headers.iter().any(|header| header == column),
            "Missing required column `{column}`"
        );
    }

    let mut parsed = ParsedRecords::default();
    for result in reader.records() {
        let row = match result {
            Ok(row) => row,
            Err(err) => {
                let line = err.position().map_or(0, csv::Position::line);
                parsed.skip(line, String::new(), SkipReason::Unreadable(err.to_string()));
                continue;
            }
        };

        let line = row.position().map_or(0, csv::Position::line);
        let raw: RecordRaw = match row.deserialize(Some(&headers)) {
            Ok(raw) => raw,
            Err(err) => {
                parsed.skip(line, String::new(), SkipReason::Unreadable(err.to_string()));
                continue;
            }
        };

        let name = raw.name.clone().unwrap_or_default();
        match parse_row(raw) {
            Ok(record) => parsed.records.push(record),
            Err(reason) => parsed.skip(line, name, reason),
        }
    }

    if parsed.records.is_empty() && !parsed.skipped.is_empty() {
        warn!("All {} rows of the price file were skipped", parsed.skipped.len());
    } else {
        info!(
            "Read {} price records ({} rows skipped)",
            parsed.records.len(),
            parsed.skipped.len()
        );
    }

    Ok(parsed)
}

impl ParsedRecords {
    fn skip(&mut self, line: u64, name: String, reason: SkipReason) {
        debug!("Skipping line {line} ({name}): {reason}");
        self.skipped.push(SkippedRow { line, name, reason });
    }
}

/// Read and parse a price file.
///
/// # Arguments
///
/// * `file_path` - Path to the price CSV file
pub fn read_records(file_path: &Path) -> Result<ParsedRecords> {
    let csv_text = read_text(file_path)?;
    parse_records(&csv_text).with_context(|| input_err_msg(file_path))
}
