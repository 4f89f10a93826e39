//! Deterministic emission formulas: profile in, categorized breakdown out.
//!
//! Reference lookup misses never abort a run; each one falls back to a
//! documented category-average constant and tags the line item as estimated.
//! Values are never rounded here so the breakdown sum invariants hold.

use super::domain::{
    Breakdown, EmissionCategory, HeatingType, LineItem, Profile, VehicleUsage,
};
use super::reference::{FactorCategory, ReferenceStore, NATIONAL_REGION};
use super::EngineError;

/// Average $/kWh applied when no state electricity rate is on file.
pub(crate) const FALLBACK_ELECTRICITY_RATE: f64 = 0.13;
/// Average $/therm for natural gas.
pub(crate) const THERM_PRICE_USD: f64 = 1.20;
/// Average $/gallon for heating oil.
pub(crate) const HEATING_OIL_PRICE_USD: f64 = 3.50;
/// Average $/gallon for gasoline, used for cost-savings estimates.
pub(crate) const GASOLINE_PRICE_USD: f64 = 3.50;
/// Combined MPG substituted when a vehicle does not resolve in the store.
pub(crate) const FALLBACK_MPG: f64 = 25.0;
/// kg CO2 per round trip by flight class.
pub(crate) const DOMESTIC_FLIGHT_KG: f64 = 400.0;
pub(crate) const INTERNATIONAL_FLIGHT_KG: f64 = 1500.0;
/// Average round-trip fares, for lifestyle cost savings.
pub(crate) const DOMESTIC_FLIGHT_COST_USD: f64 = 400.0;
pub(crate) const INTERNATIONAL_FLIGHT_COST_USD: f64 = 1200.0;
/// Rooftop solar offsets this share of grid electricity emissions.
pub(crate) const SOLAR_OFFSET_FRACTION: f64 = 0.8;
/// Heat pumps deliver the same heat for roughly 60% of the fuel spend.
pub(crate) const HEAT_PUMP_SPEND_MULTIPLIER: f64 = 0.6;
/// Grid-charged EV emissions per mile, kg CO2.
pub(crate) const EV_KG_PER_MILE: f64 = 0.2;
/// Typical EV consumption, kWh per mile, for charging-cost estimates.
pub(crate) const EV_KWH_PER_MILE: f64 = 0.3;

/// Hard defaults when even the national factor table misses. Lines computed
/// from these are tagged as estimates.
const DEFAULT_FACTORS: [(FactorCategory, f64); 4] = [
    (FactorCategory::Electricity, 0.4),
    (FactorCategory::NaturalGas, 5.3),
    (FactorCategory::HeatingOil, 10.16),
    (FactorCategory::Gasoline, 8.89),
];

/// State factor preferred, national fallback, hard default last. The bool is
/// true only when the hard default was used.
pub(crate) fn emission_factor(
    store: &dyn ReferenceStore,
    category: FactorCategory,
    state: &str,
) -> (f64, bool) {
    if let Some(factor) = store.emission_factor(category, state) {
        return (factor, false);
    }
    if let Some(factor) = store.emission_factor(category, NATIONAL_REGION) {
        return (factor, false);
    }
    let default = DEFAULT_FACTORS
        .iter()
        .find(|(c, _)| *c == category)
        .map(|(_, f)| *f)
        .unwrap_or(0.0);
    (default, true)
}

pub(crate) fn electricity_rate(store: &dyn ReferenceStore, state: &str) -> f64 {
    store
        .electricity_rate(state)
        .unwrap_or(FALLBACK_ELECTRICITY_RATE)
}

/// Annual kWh implied by a household's monthly bill, split per person.
pub(crate) fn annual_kwh_per_person(monthly_usd: f64, household_size: u8, rate: f64) -> f64 {
    monthly_usd / f64::from(household_size) / rate * 12.0
}

pub(crate) struct HeatingCalc {
    pub co2_kg: f64,
    pub input_value: f64,
    pub input_unit: &'static str,
    pub method: String,
    pub estimated: bool,
}

/// Per-fuel heating formula shared with the diagnostic heat-pump comparison.
pub(crate) fn heating_calc(
    store: &dyn ReferenceStore,
    fuel: HeatingType,
    monthly_usd: f64,
    household_size: u8,
    state: &str,
) -> HeatingCalc {
    let per_person = monthly_usd / f64::from(household_size);
    match fuel {
        HeatingType::Gas => {
            let annual_therms = per_person / THERM_PRICE_USD * 12.0;
            let (factor, estimated) = emission_factor(store, FactorCategory::NaturalGas, state);
            HeatingCalc {
                co2_kg: annual_therms * factor,
                input_value: annual_therms,
                input_unit: "therms/year",
                method: format!(
                    "${monthly_usd:.0}/month ÷ {household_size} people → {annual_therms:.1} therms/year × {factor:.2} kg CO2/therm"
                ),
                estimated,
            }
        }
        HeatingType::Oil => {
            let annual_gallons = per_person / HEATING_OIL_PRICE_USD * 12.0;
            let (factor, estimated) = emission_factor(store, FactorCategory::HeatingOil, state);
            HeatingCalc {
                co2_kg: annual_gallons * factor,
                input_value: annual_gallons,
                input_unit: "gallons/year",
                method: format!(
                    "{annual_gallons:.1} gallons/year × {factor:.2} kg CO2/gallon"
                ),
                estimated,
            }
        }
        HeatingType::Electric => {
            let rate = electricity_rate(store, state);
            let annual_kwh = annual_kwh_per_person(monthly_usd, household_size, rate);
            let (factor, estimated) = emission_factor(store, FactorCategory::Electricity, state);
            HeatingCalc {
                co2_kg: annual_kwh * factor,
                input_value: annual_kwh,
                input_unit: "kWh/year",
                method: format!("{annual_kwh:.1} kWh/year × {factor:.3} kg CO2/kWh"),
                estimated,
            }
        }
        HeatingType::HeatPump => {
            let rate = electricity_rate(store, state);
            let effective_spend = monthly_usd * HEAT_PUMP_SPEND_MULTIPLIER;
            let annual_kwh = annual_kwh_per_person(effective_spend, household_size, rate);
            let (factor, estimated) = emission_factor(store, FactorCategory::Electricity, state);
            HeatingCalc {
                co2_kg: annual_kwh * factor,
                input_value: annual_kwh,
                input_unit: "kWh/year",
                method: format!(
                    "{annual_kwh:.1} kWh/year × {factor:.3} kg CO2/kWh (heat pump at 60% of resistance spend)"
                ),
                estimated,
            }
        }
    }
}

pub(crate) struct VehicleCalc {
    pub co2_kg: f64,
    pub mpg_combined: f64,
    pub electric: bool,
    pub input_value: f64,
    pub input_unit: &'static str,
    pub method: String,
    pub estimated: bool,
}

/// Per-vehicle formula shared with the diagnostic EV comparison. An
/// unresolved vehicle is substituted with the category-average MPG and the
/// result tagged as estimated.
pub(crate) fn vehicle_calc(
    store: &dyn ReferenceStore,
    vehicle: &VehicleUsage,
    state: &str,
) -> VehicleCalc {
    let resolved = store.vehicle_efficiency(vehicle.year, &vehicle.make, &vehicle.model);
    let (mpg_combined, electric, lookup_missed) = match resolved {
        Some(efficiency) => (efficiency.mpg_combined, efficiency.electric, false),
        None => (FALLBACK_MPG, false, true),
    };

    if electric {
        let co2_kg = vehicle.annual_miles * EV_KG_PER_MILE;
        return VehicleCalc {
            co2_kg,
            mpg_combined,
            electric,
            input_value: vehicle.annual_miles,
            input_unit: "miles/year",
            method: format!(
                "{:.0} miles × {EV_KG_PER_MILE:.2} kg CO2/mile (grid charging)",
                vehicle.annual_miles
            ),
            estimated: false,
        };
    }

    let annual_gallons = vehicle.annual_miles / mpg_combined;
    let (factor, factor_estimated) = emission_factor(store, FactorCategory::Gasoline, state);
    VehicleCalc {
        co2_kg: annual_gallons * factor,
        mpg_combined,
        electric,
        input_value: annual_gallons,
        input_unit: "gallons/year",
        method: format!(
            "{:.0} miles ÷ {mpg_combined:.1} MPG × {factor:.2} kg CO2/gallon",
            vehicle.annual_miles
        ),
        estimated: lookup_missed || factor_estimated,
    }
}

fn validate(profile: &Profile) -> Result<(), EngineError> {
    let invalid = |field: &'static str, reason: &str| EngineError::InvalidProfile {
        field,
        reason: reason.to_string(),
    };

    if profile.household_size == 0 {
        return Err(invalid("household_size", "must be at least 1"));
    }
    if profile.square_footage < 0.0 {
        return Err(invalid("square_footage", "must be non-negative"));
    }
    if profile.monthly_electricity_usd < 0.0 {
        return Err(invalid("monthly_electricity_usd", "must be non-negative"));
    }
    match (profile.heating_type, profile.monthly_heating_usd) {
        (Some(_), None) => {
            return Err(invalid(
                "monthly_heating_usd",
                "heating type is set but no monthly heating spend was provided",
            ))
        }
        (None, Some(_)) => {
            return Err(invalid(
                "heating_type",
                "monthly heating spend is set but no heating type was provided",
            ))
        }
        (_, Some(spend)) if spend < 0.0 => {
            return Err(invalid("monthly_heating_usd", "must be non-negative"))
        }
        _ => {}
    }
    for vehicle in profile
        .primary_vehicle
        .iter()
        .chain(profile.secondary_vehicles.iter())
    {
        if vehicle.annual_miles < 0.0 {
            return Err(invalid("annual_miles", "must be non-negative"));
        }
    }
    Ok(())
}

/// Compute the categorized annual footprint for a validated profile.
///
/// Deterministic: repeated calls with an identical profile against unchanged
/// reference data yield bit-identical breakdowns.
pub fn compute(profile: &Profile, store: &dyn ReferenceStore) -> Result<Breakdown, EngineError> {
    validate(profile)?;

    let mut line_items = Vec::new();
    home_items(profile, store, &mut line_items);
    transport_items(profile, store, &mut line_items);
    consumption_items(profile, &mut line_items);

    let sum_for = |category: EmissionCategory| {
        line_items
            .iter()
            .filter(|item| item.category == category)
            .map(|item| item.co2_kg)
            .sum::<f64>()
    };

    let home_kg = sum_for(EmissionCategory::Home);
    let transport_kg = sum_for(EmissionCategory::Transport);
    let consumption_kg = sum_for(EmissionCategory::Consumption);

    Ok(Breakdown {
        total_kg: home_kg + transport_kg + consumption_kg,
        home_kg,
        transport_kg,
        consumption_kg,
        line_items,
    })
}

fn home_items(profile: &Profile, store: &dyn ReferenceStore, items: &mut Vec<LineItem>) {
    let state = profile.state.as_str();
    let rate = electricity_rate(store, state);
    let annual_kwh =
        annual_kwh_per_person(profile.monthly_electricity_usd, profile.household_size, rate);
    let (grid_factor, estimated) = emission_factor(store, FactorCategory::Electricity, state);

    let gross_kg = annual_kwh * grid_factor;
    let (co2_kg, solar_note) = if profile.has_solar {
        (gross_kg * (1.0 - SOLAR_OFFSET_FRACTION), " − 80% solar offset")
    } else {
        (gross_kg, "")
    };

    items.push(LineItem {
        category: EmissionCategory::Home,
        source: "Electricity".to_string(),
        input_value: annual_kwh,
        input_unit: "kWh/year".to_string(),
        co2_kg,
        method: format!(
            "${:.0}/month ÷ {} people → {annual_kwh:.1} kWh/year × {grid_factor:.3} kg CO2/kWh{solar_note}",
            profile.monthly_electricity_usd, profile.household_size
        ),
        estimated,
    });

    if let (Some(fuel), Some(monthly_usd)) = (profile.heating_type, profile.monthly_heating_usd) {
        let calc = heating_calc(store, fuel, monthly_usd, profile.household_size, state);
        items.push(LineItem {
            category: EmissionCategory::Home,
            source: fuel.label().to_string(),
            input_value: calc.input_value,
            input_unit: calc.input_unit.to_string(),
            co2_kg: calc.co2_kg,
            method: calc.method,
            estimated: calc.estimated,
        });
    }
}

fn transport_items(profile: &Profile, store: &dyn ReferenceStore, items: &mut Vec<LineItem>) {
    let state = profile.state.as_str();
    let vehicles = profile
        .primary_vehicle
        .iter()
        .chain(profile.secondary_vehicles.iter());

    for vehicle in vehicles {
        if vehicle.annual_miles == 0.0 {
            continue;
        }
        let calc = vehicle_calc(store, vehicle, state);
        items.push(LineItem {
            category: EmissionCategory::Transport,
            source: format!("Vehicle ({})", vehicle.display_name()),
            input_value: calc.input_value,
            input_unit: calc.input_unit.to_string(),
            co2_kg: calc.co2_kg,
            method: calc.method,
            estimated: calc.estimated,
        });
    }

    if profile.domestic_flights > 0 {
        let count = f64::from(profile.domestic_flights);
        items.push(LineItem {
            category: EmissionCategory::Transport,
            source: "Domestic Flights".to_string(),
            input_value: count,
            input_unit: "flights/year".to_string(),
            co2_kg: count * DOMESTIC_FLIGHT_KG,
            method: format!(
                "{} flights × {DOMESTIC_FLIGHT_KG:.0} kg CO2/flight",
                profile.domestic_flights
            ),
            estimated: false,
        });
    }

    if profile.international_flights > 0 {
        let count = f64::from(profile.international_flights);
        items.push(LineItem {
            category: EmissionCategory::Transport,
            source: "International Flights".to_string(),
            input_value: count,
            input_unit: "flights/year".to_string(),
            co2_kg: count * INTERNATIONAL_FLIGHT_KG,
            method: format!(
                "{} flights × {INTERNATIONAL_FLIGHT_KG:.0} kg CO2/flight",
                profile.international_flights
            ),
            estimated: false,
        });
    }
}

fn consumption_items(profile: &Profile, items: &mut Vec<LineItem>) {
    let diet_kg = profile.diet.annual_kg_co2();
    items.push(LineItem {
        category: EmissionCategory::Consumption,
        source: format!("Diet ({})", profile.diet.label()),
        input_value: 1.0,
        input_unit: "person".to_string(),
        co2_kg: diet_kg,
        method: format!("{diet_kg:.0} kg CO2/person/year (individual consumption)"),
        estimated: false,
    });

    let shopping_kg = profile.shopping.annual_kg_co2();
    items.push(LineItem {
        category: EmissionCategory::Consumption,
        source: format!("Consumer goods ({})", profile.shopping.label()),
        input_value: 1.0,
        input_unit: "person".to_string(),
        co2_kg: shopping_kg,
        method: format!("{shopping_kg:.0} kg CO2/person/year (individual consumption)"),
        estimated: false,
    });
}
