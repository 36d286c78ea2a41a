//! Districts are the administrative subdivisions of the city by which prices are grouped.
use crate::coverage::TOTAL_LABEL;
use crate::id::define_id_type;
use crate::record::Record;
use crate::units::Euros;
use indexmap::IndexMap;
use itertools::Itertools;
use serde::Serialize;
use unicase::UniCase;

define_id_type! {DistrictID}

/// Aggregated prices for all the bars in one district
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistrictAggregate {
    /// The district
    pub district: DistrictID,
    /// Sum of all prices in the district
    pub total: Euros,
    /// Number of bars in the district
    pub count: u32,
    /// Average price in the district
    pub average: Euros,
}

/// Group records by district, computing the number of bars and the average price for each.
///
/// Districts are compared by exact string equality, so a blank district forms a group of its
/// own. Aggregates are returned in the order in which each district first appears.
pub fn aggregate(records: &[Record]) -> Vec<DistrictAggregate> {
    let mut groups: IndexMap<DistrictID, (Euros, u32)> = IndexMap::new();
    for record in records {
        let (total, count) = groups
            .entry(record.district.clone())
            .or_insert((Euros(0.0), 0));
        *total = *total + record.price;
        *count += 1;
    }

    groups
        .into_iter()
        .map(|(district, (total, count))| DistrictAggregate {
            district,
            total,
            count,
            average: Euros(total.value() / f64::from(count)),
        })
        .collect()
}

/// Number of bars per district, in the same order as `aggregates`
pub fn district_counts(aggregates: &[DistrictAggregate]) -> IndexMap<DistrictID, u32> {
    aggregates
        .iter()
        .map(|agg| (agg.district.clone(), agg.count))
        .collect()
}

/// Sort aggregates by ascending average price.
///
/// The sort is stable, so districts with equal averages keep their first-seen order.
pub fn sorted_by_average(aggregates: &[DistrictAggregate]) -> Vec<&DistrictAggregate> {
    aggregates
        .iter()
        .sorted_by(|a, b| a.average.total_cmp(&b.average))
        .collect()
}

/// A short label for a district, made from the initials of its words.
///
/// Words are separated by whitespace or dashes. If the name contains a dash, the initial of the
/// first word is separated from the rest by a dash (e.g. "Sarrià-Sant Gervasi" becomes "S-SG").
pub fn district_initials(name: &str) -> String {
    if UniCase::new(name) == UniCase::new(TOTAL_LABEL) {
        return TOTAL_LABEL.to_string();
    }

    let initials = name
        .split(|c: char| c.is_whitespace() || c == '-')
        .filter_map(|word| word.chars().next())
        .map(|c| c.to_uppercase().to_string())
        .collect_vec();

    match initials.split_first() {
        Some((first, rest)) if name.contains('-') => format!("{first}-{}", rest.join("")),
        _ => initials.join(""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{record, records};
    use float_cmp::assert_approx_eq;
    use rstest::rstest;

    #[rstest]
    fn test_aggregate(records: Vec<Record>) {
        let aggregates = aggregate(&records);
        assert_eq!(
            aggregates
                .iter()
                .map(|agg| (agg.district.as_str(), agg.count))
                .collect_vec(),
            vec![("Gràcia", 3), ("Eixample", 2), ("Sant Martí", 1)]
        );
        assert_approx_eq!(f64, aggregates[0].average.value(), 3.0);
        assert_approx_eq!(f64, aggregates[1].average.value(), 2.5);
        assert_approx_eq!(f64, aggregates[2].average.value(), 5.0);

        // Counts add up to number of records
        let total: u32 = aggregates.iter().map(|agg| agg.count).sum();
        assert_eq!(total as usize, records.len());
    }

    #[test]
    fn test_aggregate_example() {
        let records = [record("A", 3.5, "X"), record("B", 4.0, "X")];
        assert_eq!(
            aggregate(&records),
            vec![DistrictAggregate {
                district: "X".into(),
                total: Euros(7.5),
                count: 2,
                average: Euros(3.75)
            }]
        );
    }

    #[test]
    fn test_aggregate_single_and_blank() {
        let records = [record("A", 2.2, ""), record("B", 4.0, "Les Corts")];
        let aggregates = aggregate(&records);
        assert_eq!(aggregates.len(), 2);
        assert_eq!(aggregates[0].district, DistrictID::new(""));
        assert_eq!(aggregates[0].average, Euros(2.2));
        assert_eq!(aggregates[1].average, Euros(4.0));
    }

    #[test]
    fn test_aggregate_empty() {
        assert!(aggregate(&[]).is_empty());
    }

    #[rstest]
    fn test_aggregate_idempotent(records: Vec<Record>) {
        assert_eq!(aggregate(&records), aggregate(&records));
    }

    #[rstest]
    fn test_sorted_by_average(records: Vec<Record>) {
        let aggregates = aggregate(&records);
        assert_eq!(
            sorted_by_average(&aggregates)
                .iter()
                .map(|agg| agg.district.as_str())
                .collect_vec(),
            vec!["Eixample", "Gràcia", "Sant Martí"]
        );
    }

    #[rstest]
    fn test_district_counts(records: Vec<Record>) {
        let counts = district_counts(&aggregate(&records));
        assert_eq!(counts.get("Gràcia"), Some(&3));
        assert_eq!(counts.get("Nou Barris"), None);
    }

    #[rstest]
    #[case("Ciutat Vella", "CV")]
    #[case("Eixample", "E")]
    #[case("Sarrià-Sant Gervasi", "S-SG")]
    #[case("Horta-Guinardó", "H-G")]
    #[case("sant andreu", "SA")]
    #[case("Total", "TOTAL")]
    #[case("", "")]
    fn test_district_initials(#[case] name: &str, #[case] expected: &str) {
        assert_eq!(district_initials(name), expected);
    }
}
