use super::common::{assert_close, base_profile, seeded_store};
use crate::engine::baseline::{assess, BaselineComparator};
use crate::engine::reference::{BaselineCategory, InMemoryReferenceStore};
use crate::engine::EngineError;

#[test]
fn base_profile_sits_on_every_baseline() {
    let store = seeded_store();
    let deviations = assess(&base_profile(), &store).expect("baselines on file");

    assert_close(deviations.electricity, 1.0);
    assert_close(deviations.heating.expect("heating branch present"), 1.0);
    assert_close(
        deviations.annual_miles.expect("vehicle present"),
        12_000.0 / 13_482.0,
    );
}

#[test]
fn electricity_deviation_scales_with_square_footage() {
    let store = seeded_store();

    // Twice the space per person doubles the expected spend.
    let mut profile = base_profile();
    profile.square_footage = 3_400.0;
    let deviations = assess(&profile, &store).expect("computes");
    assert_close(deviations.electricity, 0.5);

    // Zero square footage skips the scaling rather than zeroing the baseline.
    profile.square_footage = 0.0;
    let deviations = assess(&profile, &store).expect("computes");
    assert_close(deviations.electricity, 1.0);
}

#[test]
fn state_baseline_preferred_over_national() {
    let store = seeded_store();

    // CA has its own electricity row ($79/person); TX falls back to US ($58).
    let mut profile = base_profile();
    profile.state = "TX".to_string();
    let deviations = assess(&profile, &store).expect("computes");
    assert_close(deviations.electricity, 158.0 / (58.0 * 2.0));
}

#[test]
fn spend_deviation_scales_with_household_but_miles_do_not() {
    let store = seeded_store();
    let comparator = BaselineComparator::new(&store);

    let for_two = comparator
        .deviation(BaselineCategory::GasHeatingSpend, 70.0, "CA", 2)
        .expect("computes");
    let for_four = comparator
        .deviation(BaselineCategory::GasHeatingSpend, 70.0, "CA", 4)
        .expect("computes");
    assert_close(for_two, 1.0);
    assert_close(for_four, 0.5);

    let miles_two = comparator
        .deviation(BaselineCategory::AnnualMiles, 13_482.0, "CA", 2)
        .expect("computes");
    let miles_four = comparator
        .deviation(BaselineCategory::AnnualMiles, 13_482.0, "CA", 4)
        .expect("computes");
    assert_close(miles_two, 1.0);
    assert_close(miles_four, 1.0);
}

#[test]
fn absent_profile_branches_skip_their_deviations() {
    let store = seeded_store();
    let mut profile = base_profile();
    profile.heating_type = None;
    profile.monthly_heating_usd = None;
    profile.primary_vehicle = None;

    let deviations = assess(&profile, &store).expect("computes");
    assert!(deviations.heating.is_none());
    assert!(deviations.annual_miles.is_none());
}

#[test]
fn missing_baseline_is_an_error_not_a_silent_average() {
    let store = InMemoryReferenceStore::new();
    let result = assess(&base_profile(), &store);

    assert!(matches!(
        result,
        Err(EngineError::BaselineNotFound {
            category: BaselineCategory::ElectricitySpend,
            ..
        })
    ));
}
