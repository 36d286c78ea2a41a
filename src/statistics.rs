//! Descriptive statistics for a set of prices and the normal curve drawn over their histogram.
use anyhow::{Result, ensure};
use serde::Serialize;
use std::f64::consts::PI;

/// The range of prices (in euros) over which the normal curve is sampled.
///
/// This is fixed rather than derived from the data, so curves for different datasets can be
/// compared.
pub const CURVE_DOMAIN: (f64, f64) = (0.0, 10.0);

/// The number of points at which the normal curve is sampled
pub const CURVE_POINTS: usize = 500;

/// Summary statistics for a set of prices
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Description {
    /// Number of prices
    pub count: usize,
    /// Arithmetic mean
    pub mean: f64,
    /// Population standard deviation (i.e. dividing by N, not N-1)
    pub stddev: f64,
    /// Smallest price
    pub min: f64,
    /// Largest price
    pub max: f64,
}

/// A point on the normal curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NormalCurveSample {
    /// Price
    pub x: f64,
    /// Density, scaled to the histogram of observed prices
    pub density: f64,
}

/// Compute the mean, population standard deviation, minimum and maximum of `prices`.
///
/// Returns an error if `prices` is empty.
pub fn describe(prices: &[f64]) -> Result<Description> {
    ensure!(
        !prices.is_empty(),
        "Cannot compute statistics for an empty set of prices"
    );

    let count = prices.len();
    let n = count as f64;
    let mean = prices.iter().sum::<f64>() / n;
    let variance = prices.iter().map(|price| (price - mean).powi(2)).sum::<f64>() / n;
    let min = prices.iter().copied().fold(f64::INFINITY, f64::min);
    let max = prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    Ok(Description {
        count,
        mean,
        stddev: variance.sqrt(),
        min,
        max,
    })
}

/// The width of the histogram bins which the normal curve is scaled to.
///
/// This is the price range divided by the square root of the number of prices. It is a heuristic
/// for matching the curve to a histogram visually, not an estimator.
pub fn histogram_bin_width(description: &Description) -> f64 {
    (description.max - description.min) / (description.count as f64).sqrt()
}

/// Sample the normal distribution with the mean and standard deviation of the prices.
///
/// [`CURVE_POINTS`] points are taken at equal steps from the start of [`CURVE_DOMAIN`] (the end of
/// the domain is excluded). The density is scaled by the number of prices multiplied by the
/// [`histogram_bin_width`] so that the curve overlays a histogram of counts.
///
/// Returns an error if all prices are equal, as the density is then undefined.
pub fn normal_curve(description: &Description) -> Result<Vec<NormalCurveSample>> {
    ensure!(
        description.max > description.min && description.stddev > 0.0,
        "Cannot fit a normal curve: all prices are equal"
    );
    ensure!(
        description.mean.is_finite() && description.stddev.is_finite(),
        "Cannot fit a normal curve: statistics are not finite"
    );

    let (start, end) = CURVE_DOMAIN;
    let step = (end - start) / CURVE_POINTS as f64;
    let count = description.count as f64;
    let bin_width = histogram_bin_width(description);
    let coefficient = 1.0 / (description.stddev * (2.0 * PI).sqrt());

    let curve = (0..CURVE_POINTS)
        .map(|i| {
            let x = start + i as f64 * step;
            let exponent = -0.5 * ((x - description.mean) / description.stddev).powi(2);
            let density = coefficient * exponent.exp() * count * bin_width;
            NormalCurveSample { x, density }
        })
        .collect();

    Ok(curve)
}

/// The position of `price` on a scale from zero to `max`.
///
/// Returns zero if `max` is not positive.
pub fn normalise(price: f64, max: f64) -> f64 {
    if max > 0.0 { price / max } else { 0.0 }
}
