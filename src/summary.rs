//! Headline facts about the dataset, shown as text on the statistics page.
use crate::district::{DistrictAggregate, DistrictID, sorted_by_average};
use crate::record::Record;
use crate::units::Euros;
use anyhow::{Context, Result};
use serde::Serialize;

/// A bar and its price
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarPrice {
    /// The name of the bar
    pub name: String,
    /// The bar's district
    pub district: DistrictID,
    /// The price of a beer
    pub price: Euros,
}

impl From<&Record> for BarPrice {
    fn from(record: &Record) -> Self {
        Self {
            name: record.name.clone(),
            district: record.district.clone(),
            price: record.price,
        }
    }
}

/// A district and its number of recorded bars
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistrictCount {
    /// The district
    pub district: DistrictID,
    /// Number of bars recorded
    pub count: u32,
}

impl From<&DistrictAggregate> for DistrictCount {
    fn from(aggregate: &DistrictAggregate) -> Self {
        Self {
            district: aggregate.district.clone(),
            count: aggregate.count,
        }
    }
}

/// Headline facts about the dataset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    /// Number of bars recorded
    pub bar_count: usize,
    /// Average price over all bars
    pub average_price: Euros,
    /// The cheapest district by average price
    pub cheapest_district: DistrictID,
    /// The most expensive district by average price
    pub most_expensive_district: DistrictID,
    /// The bar with the lowest price (the first one, if several share it)
    pub cheapest_bar: BarPrice,
    /// The bar with the highest price (the first one, if several share it)
    pub most_expensive_bar: BarPrice,
    /// The district with the most bars recorded
    pub most_covered_district: DistrictCount,
    /// The district with the fewest bars recorded
    pub least_covered_district: DistrictCount,
}

impl Summary {
    /// Summarise `records`, which have been aggregated into `aggregates`.
    ///
    /// Returns an error if there are no records.
    pub fn new(records: &[Record], aggregates: &[DistrictAggregate]) -> Result<Self> {
        let cheapest_bar = records
            .iter()
            .reduce(|best, record| if record.price < best.price { record } else { best })
            .context("Cannot summarise an empty set of records")?;
        let most_expensive_bar = records
            .iter()
            .reduce(|best, record| if record.price > best.price { record } else { best })
            .context("Cannot summarise an empty set of records")?;
        let average_price =
            records.iter().map(|record| record.price.value()).sum::<f64>() / records.len() as f64;

        let by_average = sorted_by_average(aggregates);
        let cheapest_district = by_average
            .first()
            .context("Cannot summarise an empty set of districts")?;
        let most_expensive_district = by_average
            .last()
            .context("Cannot summarise an empty set of districts")?;

        // Later districts win ties
        let most_covered_district = by_average
            .iter()
            .copied()
            .reduce(|a, b| if a.count > b.count { a } else { b })
            .context("Cannot summarise an empty set of districts")?;
        let least_covered_district = by_average
            .iter()
            .copied()
            .reduce(|a, b| if a.count < b.count { a } else { b })
            .context("Cannot summarise an empty set of districts")?;

        Ok(Self {
            bar_count: records.len(),
            average_price: Euros(average_price),
            cheapest_district: cheapest_district.district.clone(),
            most_expensive_district: most_expensive_district.district.clone(),
            cheapest_bar: cheapest_bar.into(),
            most_expensive_bar: most_expensive_bar.into(),
            most_covered_district: most_covered_district.into(),
            least_covered_district: least_covered_district.into(),
        })
    }
}
