//! Fixtures for tests

use crate::coverage::{ReferenceTable, barcelona_reference_table};
use crate::record::Record;
use crate::units::Euros;
use rstest::fixture;

/// Assert that an error with the given message occurs
macro_rules! assert_error {
    ($result:expr, $msg:expr) => {
        assert_eq!(
            $result.unwrap_err().chain().next().unwrap().to_string(),
            $msg
        );
    };
}
pub(crate) use assert_error;

/// Create a record with no link
pub fn record(name: &str, price: f64, district: &str) -> Record {
    Record {
        name: name.to_string(),
        price: Euros(price),
        district: district.into(),
        link: String::new(),
    }
}

/// Six bars in three districts.
///
/// Gràcia has three bars averaging 3.00 €, Eixample two averaging 2.50 € and Sant Martí one at
/// 5.00 €.
#[fixture]
pub fn records() -> Vec<Record> {
    vec![
        record("Bar Ramon", 2.5, "Gràcia"),
        record("Bodega Carol", 2.0, "Eixample"),
        record("Cal Pep", 3.5, "Gràcia"),
        record("Can Martí", 5.0, "Sant Martí"),
        record("El Tast", 3.0, "Eixample"),
        record("Bar Canigó", 3.0, "Gràcia"),
    ]
}

#[fixture]
pub fn reference_table() -> ReferenceTable {
    barcelona_reference_table()
}
