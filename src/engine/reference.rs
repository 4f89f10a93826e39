use super::domain::{HeatingType, TechnologyCategory};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Region key used for national-average reference rows.
pub const NATIONAL_REGION: &str = "US";

/// Emission-factor tables the engine reads, keyed by fuel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactorCategory {
    Electricity,
    NaturalGas,
    HeatingOil,
    Gasoline,
}

/// Baseline tables the comparator reads. Values are per person per month for
/// spend categories and per driver per year for miles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaselineCategory {
    ElectricitySpend,
    GasHeatingSpend,
    ElectricHeatingSpend,
    OilHeatingSpend,
    HeatPumpHeatingSpend,
    AnnualMiles,
}

impl BaselineCategory {
    pub const fn for_heating(fuel: HeatingType) -> Self {
        match fuel {
            HeatingType::Gas => Self::GasHeatingSpend,
            HeatingType::Electric => Self::ElectricHeatingSpend,
            HeatingType::Oil => Self::OilHeatingSpend,
            HeatingType::HeatPump => Self::HeatPumpHeatingSpend,
        }
    }

    /// Spend baselines scale with household size; the per-driver mileage
    /// baseline does not.
    pub const fn scales_with_household(self) -> bool {
        !matches!(self, Self::AnnualMiles)
    }
}

/// Combined fuel-efficiency record resolved from year/make/model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VehicleEfficiency {
    pub mpg_combined: f64,
    pub electric: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "level", content = "state")]
pub enum ProgramJurisdiction {
    Federal,
    State(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgramType {
    TaxCredit,
    TaxDeduction,
    Grant,
    Rebate,
    Loan,
}

/// A government financial-incentive record. Read-only to the engine; the
/// optional financial terms combine per the incentive aggregator rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub name: String,
    pub jurisdiction: ProgramJurisdiction,
    pub technology: TechnologyCategory,
    pub program_type: ProgramType,
    #[serde(default)]
    pub incentive_amount: Option<f64>,
    #[serde(default)]
    pub percent_of_cost: Option<f64>,
    #[serde(default)]
    pub percent_cap: Option<f64>,
    #[serde(default)]
    pub per_unit_rate: Option<f64>,
    #[serde(default)]
    pub per_unit_label: Option<String>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub website_url: Option<String>,
    #[serde(default)]
    pub credible: bool,
    pub last_updated: NaiveDate,
}

impl Program {
    pub fn is_federal(&self) -> bool {
        self.jurisdiction == ProgramJurisdiction::Federal
    }
}

/// Read-only reference data injected into every engine component. All
/// lookups are total: a miss is `None` or an empty vec, never an error, and
/// the caller applies the documented fallback.
pub trait ReferenceStore: Send + Sync {
    fn emission_factor(&self, category: FactorCategory, region: &str) -> Option<f64>;

    fn vehicle_efficiency(&self, year: u16, make: &str, model: &str) -> Option<VehicleEfficiency>;

    /// Average residential electricity rate in $/kWh.
    fn electricity_rate(&self, state: &str) -> Option<f64>;

    /// Per-person baseline for a category in a region (state code or "US").
    fn baseline(&self, category: BaselineCategory, region: &str) -> Option<f64>;

    /// All programs matching the technology tag: every federal program plus
    /// state programs whose state matches exactly. Unordered; the matcher
    /// ranks.
    fn programs_for(&self, technology: TechnologyCategory, state: &str) -> Vec<Program>;
}

#[derive(Debug, Clone, PartialEq)]
struct VehicleRecord {
    year: u16,
    make: String,
    model: String,
    efficiency: VehicleEfficiency,
}

/// In-memory reference store backing tests, the CLI demo, and the HTTP
/// service. Logically immutable once built; calculation runs only read.
#[derive(Debug, Default, Clone)]
pub struct InMemoryReferenceStore {
    factors: HashMap<(FactorCategory, String), f64>,
    rates: HashMap<String, f64>,
    baselines: HashMap<(BaselineCategory, String), f64>,
    vehicles: Vec<VehicleRecord>,
    programs: Vec<Program>,
}

impl InMemoryReferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with national-average factors and baselines, enough
    /// for a complete calculation with every state lookup falling back.
    pub fn with_national_defaults() -> Self {
        Self::new()
            .with_emission_factor(FactorCategory::Electricity, NATIONAL_REGION, 0.4)
            .with_emission_factor(FactorCategory::NaturalGas, NATIONAL_REGION, 5.3)
            .with_emission_factor(FactorCategory::HeatingOil, NATIONAL_REGION, 10.16)
            .with_emission_factor(FactorCategory::Gasoline, NATIONAL_REGION, 8.89)
            .with_baseline(BaselineCategory::ElectricitySpend, NATIONAL_REGION, 58.0)
            .with_baseline(BaselineCategory::GasHeatingSpend, NATIONAL_REGION, 35.0)
            .with_baseline(BaselineCategory::ElectricHeatingSpend, NATIONAL_REGION, 125.0)
            .with_baseline(BaselineCategory::OilHeatingSpend, NATIONAL_REGION, 104.0)
            .with_baseline(BaselineCategory::HeatPumpHeatingSpend, NATIONAL_REGION, 75.0)
            .with_baseline(BaselineCategory::AnnualMiles, NATIONAL_REGION, 13_482.0)
    }

    pub fn with_emission_factor(
        mut self,
        category: FactorCategory,
        region: &str,
        kg_per_unit: f64,
    ) -> Self {
        self.factors.insert((category, region.to_string()), kg_per_unit);
        self
    }

    pub fn with_electricity_rate(mut self, state: &str, rate_per_kwh: f64) -> Self {
        self.rates.insert(state.to_string(), rate_per_kwh);
        self
    }

    pub fn with_baseline(mut self, category: BaselineCategory, region: &str, value: f64) -> Self {
        self.baselines.insert((category, region.to_string()), value);
        self
    }

    pub fn with_vehicle(
        mut self,
        year: u16,
        make: &str,
        model: &str,
        mpg_combined: f64,
        electric: bool,
    ) -> Self {
        self.vehicles.push(VehicleRecord {
            year,
            make: make.to_string(),
            model: model.to_string(),
            efficiency: VehicleEfficiency {
                mpg_combined,
                electric,
            },
        });
        self
    }

    pub fn with_program(mut self, program: Program) -> Self {
        self.programs.push(program);
        self
    }

    pub fn program_count(&self) -> usize {
        self.programs.len()
    }
}

impl ReferenceStore for InMemoryReferenceStore {
    fn emission_factor(&self, category: FactorCategory, region: &str) -> Option<f64> {
        self.factors.get(&(category, region.to_string())).copied()
    }

    fn vehicle_efficiency(&self, year: u16, make: &str, model: &str) -> Option<VehicleEfficiency> {
        let make = make.to_lowercase();
        let model = model.to_lowercase();
        self.vehicles
            .iter()
            .find(|record| {
                record.year == year
                    && record.make.to_lowercase().contains(&make)
                    && record.model.to_lowercase().contains(&model)
            })
            .map(|record| record.efficiency)
    }

    fn electricity_rate(&self, state: &str) -> Option<f64> {
        self.rates.get(state).copied()
    }

    fn baseline(&self, category: BaselineCategory, region: &str) -> Option<f64> {
        self.baselines
            .get(&(category, region.to_string()))
            .copied()
    }

    fn programs_for(&self, technology: TechnologyCategory, state: &str) -> Vec<Program> {
        self.programs
            .iter()
            .filter(|program| {
                program.technology == technology
                    && match &program.jurisdiction {
                        ProgramJurisdiction::Federal => true,
                        ProgramJurisdiction::State(code) => code == state,
                    }
            })
            .cloned()
            .collect()
    }
}
