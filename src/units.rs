//! This module defines the unit type used for prices.
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Represents an amount of money in euros.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    PartialOrd,
    Serialize,
    Deserialize,
    derive_more::Add,
    derive_more::Display,
)]
#[display("{_0:.2} €")]
pub struct Euros(pub f64);

impl Euros {
    /// Returns the value as a f64.
    pub fn value(self) -> f64 {
        self.0
    }

    /// Total ordering of amounts, as for [`f64::total_cmp`]
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}
