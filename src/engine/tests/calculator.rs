use super::common::{
    assert_close, base_profile, camry, model_3, seeded_store, CA_ELECTRICITY_RATE, CA_GRID_FACTOR,
};
use crate::engine::calculator::compute;
use crate::engine::domain::{EmissionCategory, HeatingType, VehicleUsage};
use crate::engine::reference::InMemoryReferenceStore;
use crate::engine::EngineError;

#[test]
fn category_subtotals_and_total_are_exact_sums() {
    let store = seeded_store();
    let breakdown = compute(&base_profile(), &store).expect("base profile computes");

    for category in EmissionCategory::ordered() {
        let item_sum: f64 = breakdown.items_in(category).map(|item| item.co2_kg).sum();
        assert_close(breakdown.category_total(category), item_sum);
    }
    assert_close(
        breakdown.total_kg,
        breakdown.home_kg + breakdown.transport_kg + breakdown.consumption_kg,
    );
}

#[test]
fn electricity_line_uses_state_rate_and_factor() {
    let store = seeded_store();
    let breakdown = compute(&base_profile(), &store).expect("base profile computes");

    let line = breakdown
        .items_in(EmissionCategory::Home)
        .find(|item| item.source == "Electricity")
        .expect("electricity line present");

    // $158/month split over 2 people at the CA rate, then the CA grid factor.
    let expected_kwh = 158.0 / 2.0 / CA_ELECTRICITY_RATE * 12.0;
    assert_close(line.input_value, expected_kwh);
    assert_close(line.co2_kg, expected_kwh * CA_GRID_FACTOR);
    assert!(!line.estimated);
}

#[test]
fn solar_offsets_eighty_percent_of_grid_electricity() {
    let store = seeded_store();
    let without = compute(&base_profile(), &store).expect("computes");

    let mut profile = base_profile();
    profile.has_solar = true;
    let with = compute(&profile, &store).expect("computes");

    let grid_kg = |breakdown: &crate::engine::domain::Breakdown| {
        breakdown
            .items_in(EmissionCategory::Home)
            .find(|item| item.source == "Electricity")
            .map(|item| item.co2_kg)
            .expect("electricity line present")
    };

    assert_close(grid_kg(&with), grid_kg(&without) * 0.2);
}

#[test]
fn gas_heating_converts_spend_to_therms() {
    let store = seeded_store();
    let breakdown = compute(&base_profile(), &store).expect("computes");

    let line = breakdown
        .items_in(EmissionCategory::Home)
        .find(|item| item.source == "Natural Gas Heating")
        .expect("heating line present");

    // $70/month over 2 people at $1.20/therm, national gas factor 5.3.
    assert_close(line.input_value, 350.0);
    assert_close(line.co2_kg, 350.0 * 5.3);
    assert!(!line.estimated);
}

#[test]
fn heat_pump_heating_runs_on_discounted_spend() {
    let store = seeded_store();
    let mut profile = base_profile();
    profile.heating_type = Some(HeatingType::HeatPump);
    let breakdown = compute(&profile, &store).expect("computes");

    let line = breakdown
        .items_in(EmissionCategory::Home)
        .find(|item| item.source == "Heat Pump")
        .expect("heating line present");

    let expected_kwh = 70.0 * 0.6 / 2.0 / CA_ELECTRICITY_RATE * 12.0;
    assert_close(line.input_value, expected_kwh);
    assert_close(line.co2_kg, expected_kwh * CA_GRID_FACTOR);
}

#[test]
fn resolved_vehicle_uses_its_mpg() {
    let store = seeded_store();
    let breakdown = compute(&base_profile(), &store).expect("computes");

    let line = breakdown
        .items_in(EmissionCategory::Transport)
        .find(|item| item.source.starts_with("Vehicle"))
        .expect("vehicle line present");

    // 12,000 miles at 32 MPG, national gasoline factor 8.89.
    assert_close(line.input_value, 375.0);
    assert_close(line.co2_kg, 375.0 * 8.89);
    assert!(!line.estimated);
}

#[test]
fn unresolved_vehicle_falls_back_to_average_mpg_and_is_estimated() {
    let store = seeded_store();
    let mut profile = base_profile();
    profile.primary_vehicle = Some(VehicleUsage {
        year: 1987,
        make: "Yugo".to_string(),
        model: "GV".to_string(),
        annual_miles: 10_000.0,
    });
    let breakdown = compute(&profile, &store).expect("computes");

    let line = breakdown
        .items_in(EmissionCategory::Transport)
        .find(|item| item.source.starts_with("Vehicle"))
        .expect("vehicle line present");

    assert_close(line.co2_kg, 10_000.0 / 25.0 * 8.89);
    assert!(line.estimated);
}

#[test]
fn electric_vehicle_uses_per_mile_grid_emissions() {
    let store = seeded_store();
    let mut profile = base_profile();
    profile.primary_vehicle = Some(model_3(10_000.0));
    let breakdown = compute(&profile, &store).expect("computes");

    let line = breakdown
        .items_in(EmissionCategory::Transport)
        .find(|item| item.source.starts_with("Vehicle"))
        .expect("vehicle line present");

    assert_close(line.co2_kg, 10_000.0 * 0.2);
    assert!(!line.estimated);
}

#[test]
fn secondary_vehicles_contribute_their_own_lines() {
    let store = seeded_store();
    let mut profile = base_profile();
    profile.secondary_vehicles = vec![model_3(8_000.0)];
    let breakdown = compute(&profile, &store).expect("computes");

    let vehicle_kg = |source_fragment: &str| {
        breakdown
            .items_in(EmissionCategory::Transport)
            .find(|item| item.source.contains(source_fragment))
            .map(|item| item.co2_kg)
            .expect("vehicle line present")
    };

    // Each vehicle gets the per-vehicle formula: the primary at its MPG, the
    // secondary EV at per-mile grid emissions.
    assert_close(vehicle_kg("Camry"), 12_000.0 / 32.0 * 8.89);
    assert_close(vehicle_kg("Model 3"), 8_000.0 * 0.2);

    let vehicle_total: f64 = breakdown
        .items_in(EmissionCategory::Transport)
        .filter(|item| item.source.starts_with("Vehicle"))
        .map(|item| item.co2_kg)
        .sum();
    assert_close(vehicle_total, 12_000.0 / 32.0 * 8.89 + 8_000.0 * 0.2);
}

#[test]
fn zero_mile_vehicles_produce_no_line() {
    let store = seeded_store();
    let mut profile = base_profile();
    profile.secondary_vehicles = vec![camry(0.0)];
    let breakdown = compute(&profile, &store).expect("computes");

    let vehicle_lines = breakdown
        .items_in(EmissionCategory::Transport)
        .filter(|item| item.source.starts_with("Vehicle"))
        .count();
    assert_eq!(vehicle_lines, 1);
}

#[test]
fn flight_lines_use_fixed_per_trip_emissions() {
    let store = seeded_store();
    let mut profile = base_profile();
    profile.domestic_flights = 2;
    profile.international_flights = 1;
    let breakdown = compute(&profile, &store).expect("computes");

    let flight_kg = |source: &str| {
        breakdown
            .items_in(EmissionCategory::Transport)
            .find(|item| item.source == source)
            .map(|item| item.co2_kg)
            .expect("flight line present")
    };

    assert_close(flight_kg("Domestic Flights"), 800.0);
    assert_close(flight_kg("International Flights"), 1_500.0);
}

#[test]
fn consumption_lines_come_from_the_tier_tables() {
    let store = seeded_store();
    let breakdown = compute(&base_profile(), &store).expect("computes");

    // light meat diet and moderate shopping from the base profile.
    assert_close(breakdown.consumption_kg, 1_900.0 + 1_000.0);
}

#[test]
fn unknown_state_falls_back_to_national_reference_rows() {
    let store = seeded_store();
    let mut profile = base_profile();
    profile.state = "TX".to_string();
    let breakdown = compute(&profile, &store).expect("computes");

    let line = breakdown
        .items_in(EmissionCategory::Home)
        .find(|item| item.source == "Electricity")
        .expect("electricity line present");

    // TX has no rate row (fallback $0.13/kWh) and no factor row (US 0.4).
    let expected_kwh = 158.0 / 2.0 / 0.13 * 12.0;
    assert_close(line.co2_kg, expected_kwh * 0.4);
    assert!(!line.estimated);
}

#[test]
fn missing_factor_tables_tag_lines_as_estimated() {
    let store = InMemoryReferenceStore::new();
    let mut profile = base_profile();
    profile.primary_vehicle = None;
    let breakdown = compute(&profile, &store).expect("computes");

    let line = breakdown
        .items_in(EmissionCategory::Home)
        .find(|item| item.source == "Electricity")
        .expect("electricity line present");
    assert!(line.estimated);
}

#[test]
fn repeated_runs_are_bit_identical() {
    let store = seeded_store();
    let profile = base_profile();
    let first = compute(&profile, &store).expect("computes");
    let second = compute(&profile, &store).expect("computes");
    assert_eq!(first, second);
}

#[test]
fn zero_person_household_is_rejected() {
    let store = seeded_store();
    let mut profile = base_profile();
    profile.household_size = 0;

    match compute(&profile, &store) {
        Err(EngineError::InvalidProfile { field, .. }) => assert_eq!(field, "household_size"),
        other => panic!("expected invalid profile, got {other:?}"),
    }
}

#[test]
fn heating_type_without_spend_is_rejected() {
    let store = seeded_store();
    let mut profile = base_profile();
    profile.monthly_heating_usd = None;

    assert!(matches!(
        compute(&profile, &store),
        Err(EngineError::InvalidProfile {
            field: "monthly_heating_usd",
            ..
        })
    ));
}

#[test]
fn negative_electricity_spend_is_rejected() {
    let store = seeded_store();
    let mut profile = base_profile();
    profile.monthly_electricity_usd = -1.0;

    assert!(matches!(
        compute(&profile, &store),
        Err(EngineError::InvalidProfile {
            field: "monthly_electricity_usd",
            ..
        })
    ));
}
