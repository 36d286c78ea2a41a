//! Rankings of bars by price, e.g. the five cheapest bars.
use crate::record::Record;
use itertools::Itertools;
use serde_string_enum::SerializeLabeledStringEnum;
use strum::{EnumIter, IntoEnumIterator};

/// The default number of bars in each ranking
pub const DEFAULT_TOP_N: usize = 5;

/// The order in which bars are ranked
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, SerializeLabeledStringEnum)]
pub enum SortDirection {
    /// Cheapest first
    #[string = "ascending"]
    Ascending,
    /// Most expensive first
    #[string = "descending"]
    Descending,
}

/// Sort records by price.
///
/// The sort is stable, so bars with the same price keep their original order.
pub fn sorted_by_price(records: &[Record], direction: SortDirection) -> Vec<&Record> {
    let mut sorted = records.iter().collect_vec();
    match direction {
        SortDirection::Ascending => sorted.sort_by(|a, b| a.price.total_cmp(&b.price)),
        SortDirection::Descending => sorted.sort_by(|a, b| b.price.total_cmp(&a.price)),
    }

    sorted
}

/// The `n` cheapest or most expensive records.
///
/// Fewer than `n` records are returned if there are fewer than `n` in the input.
pub fn top_n(records: &[Record], n: usize, direction: SortDirection) -> Vec<Record> {
    sorted_by_price(records, direction)
        .into_iter()
        .take(n)
        .cloned()
        .collect()
}

/// All records from cheapest to most expensive, paired with their 1-based rank
pub fn price_series(records: &[Record]) -> impl Iterator<Item = (usize, &Record)> {
    sorted_by_price(records, SortDirection::Ascending)
        .into_iter()
        .enumerate()
        .map(|(i, record)| (i + 1, record))
}

/// The cheapest and most expensive bars, both computed up front
#[derive(Debug, Clone, PartialEq)]
pub struct Rankings {
    cheapest: Vec<Record>,
    most_expensive: Vec<Record>,
}

impl Rankings {
    /// Rank `records`, keeping `n` bars in each direction
    pub fn new(records: &[Record], n: usize) -> Self {
        Self {
            cheapest: top_n(records, n, SortDirection::Ascending),
            most_expensive: top_n(records, n, SortDirection::Descending),
        }
    }

    /// Get the ranking for the given direction
    pub fn get(&self, direction: SortDirection) -> &[Record] {
        match direction {
            SortDirection::Ascending => &self.cheapest,
            SortDirection::Descending => &self.most_expensive,
        }
    }

    /// Iterate over the rankings in both directions
    pub fn iter(&self) -> impl Iterator<Item = (SortDirection, &[Record])> {
        SortDirection::iter().map(|direction| (direction, self.get(direction)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{record, records};
    use rstest::rstest;

    fn names(records: &[Record]) -> Vec<&str> {
        records.iter().map(|r| r.name.as_str()).collect()
    }

    #[rstest]
    fn test_top_n(records: Vec<Record>) {
        let cheapest = top_n(&records, 5, SortDirection::Ascending);
        assert_eq!(
            names(&cheapest),
            ["Bodega Carol", "Bar Ramon", "El Tast", "Bar Canigó", "Cal Pep"]
        );

        let most_expensive = top_n(&records, 2, SortDirection::Descending);
        assert_eq!(names(&most_expensive), ["Can Martí", "Cal Pep"]);
    }

    #[rstest]
    fn test_top_n_extremes(records: Vec<Record>) {
        let min = records.iter().map(|r| r.price).reduce(|a, b| if b < a { b } else { a });
        let max = records.iter().map(|r| r.price).reduce(|a, b| if b > a { b } else { a });
        assert_eq!(
            top_n(&records, 5, SortDirection::Ascending)
                .first()
                .map(|r| r.price),
            min
        );
        assert_eq!(
            top_n(&records, 5, SortDirection::Descending)
                .first()
                .map(|r| r.price),
            max
        );
    }

    #[test]
    fn test_top_n_ties_are_stable() {
        let records = [
            record("A", 3.0, "X"),
            record("B", 2.0, "X"),
            record("C", 3.0, "X"),
            record("D", 2.0, "X"),
        ];
        assert_eq!(
            names(&top_n(&records, 4, SortDirection::Ascending)),
            ["B", "D", "A", "C"]
        );
        assert_eq!(
            names(&top_n(&records, 4, SortDirection::Descending)),
            ["A", "C", "B", "D"]
        );
    }

    #[rstest]
    #[case(0, 0)]
    #[case(2, 2)]
    #[case(10, 3)]
    fn test_top_n_length(#[case] n: usize, #[case] expected: usize) {
        let records = [
            record("A", 3.0, "X"),
            record("B", 2.0, "X"),
            record("C", 1.0, "X"),
        ];
        assert_eq!(top_n(&records, n, SortDirection::Ascending).len(), expected);
    }

    #[rstest]
    fn test_price_series(records: Vec<Record>) {
        let series = price_series(&records).collect_vec();
        assert_eq!(series.len(), records.len());
        assert_eq!(series[0].0, 1);
        assert_eq!(series[0].1.name, "Bodega Carol");
        assert!(
            series
                .iter()
                .tuple_windows()
                .all(|(a, b)| a.1.price <= b.1.price)
        );
    }

    #[rstest]
    fn test_rankings(records: Vec<Record>) {
        let rankings = Rankings::new(&records, 3);
        let directions = rankings.iter().map(|(direction, _)| direction).collect_vec();
        assert_eq!(
            directions,
            [SortDirection::Ascending, SortDirection::Descending]
        );
        assert_eq!(
            rankings.get(SortDirection::Ascending),
            top_n(&records, 3, SortDirection::Ascending)
        );
        assert_eq!(rankings.get(SortDirection::Descending)[0].name, "Can Martí");
    }
}
