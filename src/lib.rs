//! Beer price statistics by district, computed from a CSV file of bars.
#![warn(missing_docs)]
use std::path::PathBuf;

pub mod cli;
pub mod coverage;
pub mod dedup;
pub mod district;
pub mod id;
pub mod input;
pub mod log;
pub mod output;
pub mod pipeline;
pub mod ranking;
pub mod record;
pub mod settings;
pub mod statistics;
pub mod summary;
pub mod units;

#[cfg(test)]
mod fixture;

/// Get the directory in which the program settings file is stored
pub fn get_birres_config_dir() -> PathBuf {
    let Some(mut config_dir) = dirs::config_dir() else {
        // No config dir on this platform, so use the current directory
        return PathBuf::new();
    };
    config_dir.push("birres");

    config_dir
}
