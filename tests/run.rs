//! Integration tests for the `run` command.
use birres::cli::{RunOpts, handle_run_command};
use birres::settings::Settings;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

/// Get the path to the example price file.
fn get_price_file() -> PathBuf {
    PathBuf::from("demos/barcelona/barcelona.csv")
}

/// An integration test for the `run` command.
#[test]
fn test_handle_run_command() {
    unsafe { std::env::set_var("BIRRES_LOG_LEVEL", "off") };

    {
        // Save results to non-existent directory to check that directory creation works
        let tempdir = tempdir().unwrap();
        let output_dir = tempdir.path().join("results");
        let opts = RunOpts {
            output_dir: Some(output_dir.clone()),
            deduplicate: true,
            ..RunOpts::default()
        };
        handle_run_command(&get_price_file(), &opts, Some(Settings::default())).unwrap();

        for file_name in [
            "district_prices.csv",
            "price_series.csv",
            "normal_curve.csv",
            "rankings.csv",
            "coverage.csv",
            "skipped_rows.csv",
            "summary.toml",
            "metadata.toml",
            "birres_info.log",
            "birres_error.log",
        ] {
            assert!(output_dir.join(file_name).is_file(), "{file_name} missing");
        }

        // One bar has two valid prices in the example
        let summary = fs::read_to_string(output_dir.join("summary.toml")).unwrap();
        let summary: toml::Table = toml::from_str(&summary).unwrap();
        assert_eq!(summary["counts"]["duplicates_removed"].as_integer(), Some(1));
        assert_eq!(summary["counts"]["valid_rows"].as_integer(), Some(21));
        assert_eq!(summary["counts"]["skipped_rows"].as_integer(), Some(3));
    }

    // Second time will fail because the logging is already initialised
    let opts = RunOpts {
        output_dir: Some(tempdir().unwrap().path().to_path_buf()),
        ..RunOpts::default()
    };
    assert_eq!(
        handle_run_command(&get_price_file(), &opts, Some(Settings::default()))
            .unwrap_err()
            .chain()
            .next()
            .unwrap()
            .to_string(),
        "Failed to initialise logging."
    );
}
