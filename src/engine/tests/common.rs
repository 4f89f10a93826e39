//! Shared fixtures for the engine test suite.
//!
//! `seeded_store` layers CA-specific reference rows over the national
//! defaults, and `base_profile` describes a deliberately average household:
//! every deviation lands at 1.0 so individual tests perturb exactly one
//! input and assert on the consequence.

use crate::engine::domain::{
    DietTier, HeatingType, HousingType, Profile, ShoppingTier, TechnologyCategory, VehicleUsage,
};
use crate::engine::reference::{
    BaselineCategory, FactorCategory, InMemoryReferenceStore, Program, ProgramJurisdiction,
    ProgramType,
};
use chrono::NaiveDate;

pub const CA_GRID_FACTOR: f64 = 0.25;
pub const CA_ELECTRICITY_RATE: f64 = 0.26;
pub const CA_ELECTRICITY_BASELINE: f64 = 79.0;

pub fn seeded_store() -> InMemoryReferenceStore {
    InMemoryReferenceStore::with_national_defaults()
        .with_emission_factor(FactorCategory::Electricity, "CA", CA_GRID_FACTOR)
        .with_electricity_rate("CA", CA_ELECTRICITY_RATE)
        .with_baseline(BaselineCategory::ElectricitySpend, "CA", CA_ELECTRICITY_BASELINE)
        .with_vehicle(2018, "Toyota", "Camry", 32.0, false)
        .with_vehicle(2022, "Tesla", "Model 3", 130.0, true)
}

/// Two-person household in a 1,700 sq ft house, sitting exactly on every
/// CA baseline: electricity $158/month, gas heat $70/month, one gasoline
/// car driven below the national average.
pub fn base_profile() -> Profile {
    Profile {
        state: "CA".to_string(),
        city: Some("Sacramento".to_string()),
        household_size: 2,
        housing_type: HousingType::House,
        square_footage: 1_700.0,
        monthly_electricity_usd: 158.0,
        heating_type: Some(HeatingType::Gas),
        monthly_heating_usd: Some(70.0),
        has_solar: false,
        primary_vehicle: Some(camry(12_000.0)),
        secondary_vehicles: Vec::new(),
        domestic_flights: 2,
        international_flights: 0,
        diet: DietTier::LightMeat,
        shopping: ShoppingTier::Moderate,
    }
}

pub fn camry(annual_miles: f64) -> VehicleUsage {
    VehicleUsage {
        year: 2018,
        make: "Toyota".to_string(),
        model: "Camry".to_string(),
        annual_miles,
    }
}

pub fn model_3(annual_miles: f64) -> VehicleUsage {
    VehicleUsage {
        year: 2022,
        make: "Tesla".to_string(),
        model: "Model 3".to_string(),
        annual_miles,
    }
}

pub struct ProgramBuilder {
    program: Program,
}

impl ProgramBuilder {
    pub fn new(name: &str, technology: TechnologyCategory) -> Self {
        Self {
            program: Program {
                name: name.to_string(),
                jurisdiction: ProgramJurisdiction::Federal,
                technology,
                program_type: ProgramType::Rebate,
                incentive_amount: None,
                percent_of_cost: None,
                percent_cap: None,
                per_unit_rate: None,
                per_unit_label: None,
                summary: String::new(),
                website_url: None,
                credible: false,
                last_updated: NaiveDate::from_ymd_opt(2024, 6, 1).expect("valid date"),
            },
        }
    }

    pub fn state(mut self, code: &str) -> Self {
        self.program.jurisdiction = ProgramJurisdiction::State(code.to_string());
        self
    }

    pub fn amount(mut self, usd: f64) -> Self {
        self.program.incentive_amount = Some(usd);
        self
    }

    pub fn percent(mut self, percent: f64) -> Self {
        self.program.percent_of_cost = Some(percent);
        self
    }

    pub fn cap(mut self, usd: f64) -> Self {
        self.program.percent_cap = Some(usd);
        self
    }

    pub fn per_unit(mut self, rate: f64, label: &str) -> Self {
        self.program.per_unit_rate = Some(rate);
        self.program.per_unit_label = Some(label.to_string());
        self
    }

    pub fn credible(mut self) -> Self {
        self.program.credible = true;
        self
    }

    pub fn updated(mut self, year: i32, month: u32, day: u32) -> Self {
        self.program.last_updated =
            NaiveDate::from_ymd_opt(year, month, day).expect("valid date");
        self
    }

    pub fn build(self) -> Program {
        self.program
    }
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}
