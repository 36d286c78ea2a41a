//! The module responsible for writing output data to disk.
use crate::district::{DistrictID, sorted_by_average};
use crate::pipeline::Analysis;
use crate::ranking::{SortDirection, price_series};
use crate::statistics::{Description, normalise};
use crate::summary::Summary;
use crate::units::Euros;
use anyhow::{Context, Result, ensure};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

pub mod metadata;

/// The root folder in which dataset-specific output folders will be created
pub const OUTPUT_DIRECTORY_ROOT: &str = "birres_results";

/// The output file name for average prices by district
const DISTRICT_PRICES_FILE_NAME: &str = "district_prices.csv";

/// The output file name for all prices in ascending order
const PRICE_SERIES_FILE_NAME: &str = "price_series.csv";

/// The output file name for the normal curve
const NORMAL_CURVE_FILE_NAME: &str = "normal_curve.csv";

/// The output file name for the cheapest and most expensive bars
const RANKINGS_FILE_NAME: &str = "rankings.csv";

/// The output file name for district coverage
const COVERAGE_FILE_NAME: &str = "coverage.csv";

/// The output file name for rows of the price file which were skipped
const SKIPPED_ROWS_FILE_NAME: &str = "skipped_rows.csv";

/// The output file name for the summary
const SUMMARY_FILE_NAME: &str = "summary.toml";

/// Get the output directory for the price file at the specified path
pub fn get_output_dir(price_file: &Path) -> Result<PathBuf> {
    let dataset_name = price_file
        .file_stem()
        .context("Price file path has no file name")?
        .to_str()
        .context("Invalid chars in price file name")?;

    Ok([OUTPUT_DIRECTORY_ROOT, dataset_name].iter().collect())
}

/// Create a new output directory, optionally replacing an existing one.
///
/// An existing empty directory is reused.
///
/// # Returns
///
/// Whether an existing directory was overwritten, or an error if the directory exists, is not
/// empty and `allow_overwrite` is false.
pub fn create_output_directory(output_dir: &Path, allow_overwrite: bool) -> Result<bool> {
    let overwrite = if output_dir.is_dir() {
        if fs::read_dir(output_dir)?.next().is_none() {
            return Ok(false);
        }

        ensure!(
            allow_overwrite,
            "Output folder already exists and is not empty. Please delete the folder or pass the \
            --overwrite command-line option."
        );

        fs::remove_dir_all(output_dir)?;
        true
    } else {
        false
    };

    // Try to create the directory, with parents
    fs::create_dir_all(output_dir)?;

    Ok(overwrite)
}

/// Represents a row in the district prices CSV file
#[derive(Serialize, Debug, PartialEq)]
struct DistrictPriceRow {
    district: DistrictID,
    count: u32,
    total: Euros,
    average: Euros,
}

/// Represents a row in the price series CSV file
#[derive(Serialize, Debug, PartialEq)]
struct PriceSeriesRow<'a> {
    rank: usize,
    name: &'a str,
    district: &'a DistrictID,
    price: Euros,
    normalised: f64,
}

/// Represents a row in the rankings CSV file
#[derive(Serialize, Debug, PartialEq)]
struct RankingRow<'a> {
    direction: SortDirection,
    rank: usize,
    name: &'a str,
    district: &'a DistrictID,
    price: Euros,
    link: &'a str,
}

/// Represents a row in the coverage CSV file
#[derive(Serialize, Debug, PartialEq)]
struct CoverageRow<'a> {
    district: &'a DistrictID,
    initials: String,
    registered: u32,
    official: u32,
    missing: i64,
    percent: u32,
}

/// Represents a row in the skipped rows CSV file
#[derive(Serialize, Debug, PartialEq)]
struct SkippedRowRow<'a> {
    line: u64,
    name: &'a str,
    reason: String,
}

/// Counts of rows and districts, for the summary file
#[derive(Serialize)]
struct Counts {
    valid_rows: usize,
    skipped_rows: usize,
    duplicates_removed: usize,
    districts: usize,
    unreferenced_districts: Vec<String>,
}

/// Statistics for the summary file
#[derive(Serialize)]
struct Statistics<'a> {
    #[serde(flatten)]
    description: &'a Description,
    bin_width: f64,
    has_normal_curve: bool,
}

/// The contents of the summary file
#[derive(Serialize)]
struct SummaryFile<'a> {
    counts: Counts,
    statistics: Statistics<'a>,
    summary: &'a Summary,
}

/// Write everything in `analysis` to files in `output_path`
pub fn write_analysis(output_path: &Path, analysis: &Analysis) -> Result<()> {
    write_district_prices(output_path, analysis)?;
    write_price_series(output_path, analysis)?;
    write_normal_curve(output_path, analysis)?;
    write_rankings(output_path, analysis)?;
    write_coverage(output_path, analysis)?;
    write_skipped_rows(output_path, analysis)?;
    write_summary(output_path, analysis)?;

    Ok(())
}

/// Open a CSV file for writing
fn new_writer(output_path: &Path, file_name: &str) -> Result<csv::Writer<fs::File>> {
    let file_path = output_path.join(file_name);
    csv::Writer::from_path(&file_path)
        .with_context(|| format!("Could not create {}", file_path.display()))
}

/// Write average prices by district, from cheapest to most expensive
fn write_district_prices(output_path: &Path, analysis: &Analysis) -> Result<()> {
    let mut writer = new_writer(output_path, DISTRICT_PRICES_FILE_NAME)?;
    for aggregate in sorted_by_average(&analysis.aggregates) {
        writer.serialize(DistrictPriceRow {
            district: aggregate.district.clone(),
            count: aggregate.count,
            total: aggregate.total,
            average: aggregate.average,
        })?;
    }
    writer.flush()?;

    Ok(())
}

/// Write all prices from cheapest to most expensive
fn write_price_series(output_path: &Path, analysis: &Analysis) -> Result<()> {
    let mut writer = new_writer(output_path, PRICE_SERIES_FILE_NAME)?;
    let max = analysis.description.max;
    for (rank, record) in price_series(&analysis.records) {
        writer.serialize(PriceSeriesRow {
            rank,
            name: &record.name,
            district: &record.district,
            price: record.price,
            normalised: normalise(record.price.value(), max),
        })?;
    }
    writer.flush()?;

    Ok(())
}

/// Write the normal curve, if there is one
fn write_normal_curve(output_path: &Path, analysis: &Analysis) -> Result<()> {
    let Some(curve) = &analysis.curve else {
        return Ok(());
    };

    let mut writer = new_writer(output_path, NORMAL_CURVE_FILE_NAME)?;
    for sample in curve {
        writer.serialize(sample)?;
    }
    writer.flush()?;

    Ok(())
}

/// Write the cheapest and most expensive bars
fn write_rankings(output_path: &Path, analysis: &Analysis) -> Result<()> {
    let mut writer = new_writer(output_path, RANKINGS_FILE_NAME)?;
    for (direction, records) in analysis.rankings.iter() {
        for (i, record) in records.iter().enumerate() {
            writer.serialize(RankingRow {
                direction,
                rank: i + 1,
                name: &record.name,
                district: &record.district,
                price: record.price,
                link: &record.link,
            })?;
        }
    }
    writer.flush()?;

    Ok(())
}

/// Write district coverage, with the total first
fn write_coverage(output_path: &Path, analysis: &Analysis) -> Result<()> {
    let mut writer = new_writer(output_path, COVERAGE_FILE_NAME)?;
    for entry in analysis.coverage.iter() {
        writer.serialize(CoverageRow {
            district: &entry.district,
            initials: entry.initials(),
            registered: entry.registered,
            official: entry.official,
            missing: entry.missing,
            percent: entry.percent,
        })?;
    }
    writer.flush()?;

    Ok(())
}

/// Write rows which were skipped when reading the price file
fn write_skipped_rows(output_path: &Path, analysis: &Analysis) -> Result<()> {
    let mut writer = new_writer(output_path, SKIPPED_ROWS_FILE_NAME)?;
    for row in &analysis.skipped {
        writer.serialize(SkippedRowRow {
            line: row.line,
            name: &row.name,
            reason: row.reason.to_string(),
        })?;
    }
    writer.flush()?;

    Ok(())
}

/// Write the summary and descriptive statistics in TOML format
fn write_summary(output_path: &Path, analysis: &Analysis) -> Result<()> {
    let summary_file = SummaryFile {
        counts: Counts {
            valid_rows: analysis.records.len(),
            skipped_rows: analysis.skipped.len(),
            duplicates_removed: analysis.duplicates_removed,
            districts: analysis.aggregates.len(),
            unreferenced_districts: analysis
                .coverage
                .unreferenced
                .iter()
                .map(|(district, _)| district.to_string())
                .collect(),
        },
        statistics: Statistics {
            description: &analysis.description,
            bin_width: analysis.bin_width,
            has_normal_curve: analysis.curve.is_some(),
        },
        summary: &analysis.summary,
    };

    let file_path = output_path.join(SUMMARY_FILE_NAME);
    fs::write(&file_path, toml::to_string(&summary_file)?)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coverage::ReferenceTable;
    use crate::fixture::reference_table;
    use crate::pipeline::{PipelineOptions, run_pipeline};
    use rstest::{fixture, rstest};
    use std::fs::File;
    use tempfile::tempdir;

    #[fixture]
    fn analysis(reference_table: ReferenceTable) -> Analysis {
        let text = "Local,Preu,Districte,Link
Bar Ramon,\"2,50 €\",Gràcia,https://maps.example/ramon
Bodega Carol,2.00,Eixample,
Cal Pep,,Ciutat Vella,
Can Martí,5,Sant Martí,
El Tast,3,Eixample,";
        run_pipeline(text, &reference_table, &PipelineOptions::default()).unwrap()
    }

    #[test]
    fn test_get_output_dir() {
        assert_eq!(
            get_output_dir(Path::new("data/dades_birres.csv")).unwrap(),
            PathBuf::from_iter([OUTPUT_DIRECTORY_ROOT, "dades_birres"])
        );
    }

    #[test]
    fn test_create_output_directory_new_directory() {
        let temp_dir = tempdir().unwrap();
        let output_dir = temp_dir.path().join("results");
        assert!(!create_output_directory(&output_dir, false).unwrap());
        assert!(output_dir.is_dir());
    }

    #[test]
    fn test_create_output_directory_existing_empty_directory() {
        let temp_dir = tempdir().unwrap();
        assert!(!create_output_directory(temp_dir.path(), false).unwrap());
    }

    #[test]
    fn test_create_output_directory_existing_non_empty_directory() {
        let temp_dir = tempdir().unwrap();
        File::create(temp_dir.path().join("file.txt")).unwrap();

        // Not allowed to overwrite
        assert!(create_output_directory(temp_dir.path(), false).is_err());

        // Allowed to overwrite: old contents are removed
        assert!(create_output_directory(temp_dir.path(), true).unwrap());
        assert!(!temp_dir.path().join("file.txt").exists());
    }

    #[rstest]
    fn test_write_analysis(analysis: Analysis) {
        let dir = tempdir().unwrap();
        write_analysis(dir.path(), &analysis).unwrap();

        for file_name in [
            DISTRICT_PRICES_FILE_NAME,
            PRICE_SERIES_FILE_NAME,
            NORMAL_CURVE_FILE_NAME,
            RANKINGS_FILE_NAME,
            COVERAGE_FILE_NAME,
            SKIPPED_ROWS_FILE_NAME,
            SUMMARY_FILE_NAME,
        ] {
            assert!(dir.path().join(file_name).is_file(), "{file_name} missing");
        }
    }

    #[rstest]
    fn test_write_district_prices(analysis: Analysis) {
        let dir = tempdir().unwrap();
        write_district_prices(dir.path(), &analysis).unwrap();
        let contents = fs::read_to_string(dir.path().join(DISTRICT_PRICES_FILE_NAME)).unwrap();
        assert_eq!(
            contents,
            "district,count,total,average
Gràcia,1,2.5,2.5
Eixample,2,5.0,2.5
Sant Martí,1,5.0,5.0
"
        );
    }

    #[rstest]
    fn test_write_rankings(analysis: Analysis) {
        let dir = tempdir().unwrap();
        write_rankings(dir.path(), &analysis).unwrap();
        let mut reader = csv::Reader::from_path(dir.path().join(RANKINGS_FILE_NAME)).unwrap();
        let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();

        // Four bars in each direction
        assert_eq!(rows.len(), 8);
        assert_eq!(&rows[0][0], "ascending");
        assert_eq!(&rows[0][2], "Bodega Carol");
        assert_eq!(&rows[4][0], "descending");
        assert_eq!(&rows[4][2], "Can Martí");
        assert_eq!(&rows[6][2], "Bar Ramon");
        assert_eq!(&rows[6][5], "https://maps.example/ramon");
    }

    #[rstest]
    fn test_write_coverage(analysis: Analysis) {
        let dir = tempdir().unwrap();
        write_coverage(dir.path(), &analysis).unwrap();
        let contents = fs::read_to_string(dir.path().join(COVERAGE_FILE_NAME)).unwrap();
        let mut lines = contents.lines();
        assert_eq!(
            lines.next(),
            Some("district,initials,registered,official,missing,percent")
        );
        assert_eq!(lines.next(), Some("TOTAL,TOTAL,4,3605,3601,0"));
        assert_eq!(lines.next(), Some("Ciutat Vella,CV,0,405,405,0"));
        assert_eq!(lines.count(), 9);
    }

    #[rstest]
    fn test_write_skipped_rows(analysis: Analysis) {
        let dir = tempdir().unwrap();
        write_skipped_rows(dir.path(), &analysis).unwrap();
        let contents = fs::read_to_string(dir.path().join(SKIPPED_ROWS_FILE_NAME)).unwrap();
        assert_eq!(contents, "line,name,reason\n4,Cal Pep,no price given\n");
    }

    #[rstest]
    fn test_write_summary(analysis: Analysis) {
        let dir = tempdir().unwrap();
        write_summary(dir.path(), &analysis).unwrap();
        let contents = fs::read_to_string(dir.path().join(SUMMARY_FILE_NAME)).unwrap();
        let summary: toml::Table = toml::from_str(&contents).unwrap();
        assert_eq!(summary["counts"]["valid_rows"].as_integer(), Some(4));
        assert_eq!(summary["counts"]["skipped_rows"].as_integer(), Some(1));
        assert_eq!(summary["statistics"]["count"].as_integer(), Some(4));
        assert_eq!(summary["statistics"]["mean"].as_float(), Some(3.125));
        assert_eq!(
            summary["summary"]["cheapest_district"].as_str(),
            Some("Gràcia")
        );
        assert_eq!(
            summary["summary"]["most_expensive_bar"]["name"].as_str(),
            Some("Can Martí")
        );
    }
}
