use super::common::{assert_close, base_profile, camry, model_3, seeded_store};
use crate::engine::baseline::assess;
use crate::engine::calculator::compute;
use crate::engine::domain::{
    HeatingType, HousingType, Opportunity, OpportunityKind, Profile, TechnologyCategory,
};
use crate::engine::reference::ReferenceStore;
use crate::engine::DiagnosticEngine;

fn diagnose(profile: &Profile, store: &dyn ReferenceStore) -> Vec<Opportunity> {
    let breakdown = compute(profile, store).expect("profile computes");
    let deviations = assess(profile, store).expect("baselines on file");
    DiagnosticEngine::default().diagnose(profile, &breakdown, &deviations, store)
}

fn find(opportunities: &[Opportunity], kind: OpportunityKind) -> Option<&Opportunity> {
    opportunities.iter().find(|o| o.kind == kind)
}

#[test]
fn solar_fires_for_viable_roof_above_baseline() {
    let store = seeded_store();
    let mut profile = base_profile();
    // 1.5x the CA electricity baseline.
    profile.monthly_electricity_usd = 237.0;

    let opportunities = diagnose(&profile, &store);
    let solar =
        find(&opportunities, OpportunityKind::SolarOpportunity).expect("solar fires");

    // 80% of the electricity line: $118.50/person at $0.26/kWh, CA factor.
    let electricity_kg = 237.0 / 2.0 / 0.26 * 12.0 * 0.25;
    assert_close(solar.co2_savings_kg, electricity_kg * 0.8);
    assert_close(solar.deviation, 1.5);
    assert_eq!(solar.technologies, vec![TechnologyCategory::Solar]);
    assert!(solar.priority > 0);
}

#[test]
fn solar_silent_with_panels_installed() {
    let store = seeded_store();
    let mut profile = base_profile();
    profile.monthly_electricity_usd = 237.0;
    profile.has_solar = true;

    let opportunities = diagnose(&profile, &store);
    assert!(find(&opportunities, OpportunityKind::SolarOpportunity).is_none());
}

#[test]
fn solar_silent_without_roof_control() {
    let store = seeded_store();
    for housing in [HousingType::Apartment, HousingType::Condo] {
        let mut profile = base_profile();
        profile.monthly_electricity_usd = 237.0;
        profile.housing_type = housing;

        let opportunities = diagnose(&profile, &store);
        assert!(find(&opportunities, OpportunityKind::SolarOpportunity).is_none());
    }
}

#[test]
fn solar_silent_when_savings_too_small() {
    let store = seeded_store();
    // Exactly baseline: deviation 1.0 passes the gate but 80% of the line
    // (about 729 kg) stays under the 800 kg floor.
    let opportunities = diagnose(&base_profile(), &store);
    assert!(find(&opportunities, OpportunityKind::SolarOpportunity).is_none());
}

#[test]
fn fossil_heating_compared_against_heat_pump() {
    let store = seeded_store();
    let mut profile = base_profile();
    profile.monthly_heating_usd = Some(120.0);

    let opportunities = diagnose(&profile, &store);
    let heating = find(&opportunities, OpportunityKind::HomeHeating).expect("heating fires");

    // Gas: $60/person at $1.20/therm = 600 therms at 5.3 kg.
    // Heat pump: 60% of the spend as electricity at $0.26/kWh, CA factor.
    let gas_kg = 600.0 * 5.3;
    let heat_pump_kg = 120.0 * 0.6 / 2.0 / 0.26 * 12.0 * 0.25;
    assert_close(heating.co2_savings_kg, gas_kg - heat_pump_kg);
    assert_eq!(heating.technologies, vec![TechnologyCategory::HeatPumps]);

    // 40% of annual fuel spend stays in the household's pocket.
    assert_close(heating.cost_savings_usd, 120.0 * 0.4 * 12.0);
}

#[test]
fn heating_silent_for_non_fossil_fuels() {
    let store = seeded_store();
    for fuel in [HeatingType::Electric, HeatingType::HeatPump] {
        let mut profile = base_profile();
        profile.heating_type = Some(fuel);
        profile.monthly_heating_usd = Some(200.0);

        let opportunities = diagnose(&profile, &store);
        assert!(find(&opportunities, OpportunityKind::HomeHeating).is_none());
    }
}

#[test]
fn high_mileage_combustion_car_compared_against_ev() {
    let store = seeded_store();
    let mut profile = base_profile();
    profile.primary_vehicle = Some(camry(20_000.0));

    let opportunities = diagnose(&profile, &store);
    let transport =
        find(&opportunities, OpportunityKind::Transportation).expect("transportation fires");

    let gasoline_kg = 20_000.0 / 32.0 * 8.89;
    let ev_kg = 20_000.0 * 0.2;
    assert_close(transport.co2_savings_kg, gasoline_kg - ev_kg);
    assert_eq!(
        transport.technologies,
        vec![TechnologyCategory::ElectricVehicles]
    );

    // Fuel spend minus charging at the CA rate.
    let fuel_cost = 20_000.0 / 32.0 * 3.50;
    let charging_cost = 20_000.0 * 0.3 * 0.26;
    assert_close(transport.cost_savings_usd, fuel_cost - charging_cost);
}

#[test]
fn transportation_silent_below_average_mileage() {
    let store = seeded_store();
    // Base profile drives 12,000 miles, under the 13,482 national average.
    let opportunities = diagnose(&base_profile(), &store);
    assert!(find(&opportunities, OpportunityKind::Transportation).is_none());
}

#[test]
fn transportation_silent_for_electric_vehicles() {
    let store = seeded_store();
    let mut profile = base_profile();
    profile.primary_vehicle = Some(model_3(25_000.0));

    let opportunities = diagnose(&profile, &store);
    assert!(find(&opportunities, OpportunityKind::Transportation).is_none());
}

#[test]
fn extreme_electricity_usage_fires_home_efficiency() {
    let store = seeded_store();
    let mut profile = base_profile();
    // 1.9x the CA baseline, past the 1.8 efficiency threshold.
    profile.monthly_electricity_usd = 300.2;

    let opportunities = diagnose(&profile, &store);
    let efficiency =
        find(&opportunities, OpportunityKind::HomeEfficiency).expect("efficiency fires");

    let deviation = 300.2 / 158.0;
    let excess_monthly = 300.2 - 300.2 / deviation;
    let excess_kwh = excess_monthly / 0.26 * 12.0;
    assert_close(efficiency.co2_savings_kg, excess_kwh * 0.4 * 0.25);
    assert_eq!(efficiency.technologies.len(), 4);
}

#[test]
fn transportation_savings_and_priority_scale_with_miles() {
    let store = seeded_store();

    let mut last_savings = 0.0;
    let mut last_priority = 0;
    for miles in (14_000..=40_000).step_by(2_000) {
        let mut profile = base_profile();
        profile.primary_vehicle = Some(camry(f64::from(miles)));

        let opportunities = diagnose(&profile, &store);
        let transport = find(&opportunities, OpportunityKind::Transportation)
            .unwrap_or_else(|| panic!("transportation fires at {miles} miles"));

        assert!(
            transport.co2_savings_kg >= last_savings,
            "savings dropped from {last_savings} at {miles} miles"
        );
        assert!(
            transport.priority >= last_priority,
            "priority dropped from {last_priority} at {miles} miles"
        );
        last_savings = transport.co2_savings_kg;
        last_priority = transport.priority;
    }

    // The sweep actually moved: priority is clamped only at the top end.
    assert!(last_priority > 20);
}

#[test]
fn every_fired_opportunity_has_positive_savings() {
    let store = seeded_store();
    let mut profile = base_profile();
    profile.monthly_electricity_usd = 320.0;
    profile.monthly_heating_usd = Some(150.0);
    profile.primary_vehicle = Some(camry(22_000.0));

    let opportunities = diagnose(&profile, &store);
    assert!(opportunities.len() >= 3);
    for opportunity in &opportunities {
        assert!(opportunity.co2_savings_kg > 0.0, "{:?}", opportunity.kind);
        assert!(opportunity.priority <= 100);
        assert!(opportunity.kind.is_technology_upgrade());
    }
}
