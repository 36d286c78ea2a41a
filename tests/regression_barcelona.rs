//! A regression test for the "barcelona" example
use regression::run_regression_test;

#[test]
fn test_regression_barcelona() {
    run_regression_test("barcelona");
}
