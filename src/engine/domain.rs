use serde::{Deserialize, Serialize};
use std::fmt;

/// Top-level grouping for every emission line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmissionCategory {
    Home,
    Transport,
    Consumption,
}

impl EmissionCategory {
    pub const fn ordered() -> [Self; 3] {
        [Self::Home, Self::Transport, Self::Consumption]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Home => "Home energy",
            Self::Transport => "Transportation",
            Self::Consumption => "Consumption",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeatingType {
    Gas,
    Electric,
    Oil,
    HeatPump,
}

impl HeatingType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Gas => "Natural Gas Heating",
            Self::Electric => "Electric Heating",
            Self::Oil => "Heating Oil",
            Self::HeatPump => "Heat Pump",
        }
    }

    /// Gas and oil furnaces burn fuel on site and carry the highest
    /// carbon intensity per unit of delivered heat.
    pub const fn burns_fossil_fuel(self) -> bool {
        matches!(self, Self::Gas | Self::Oil)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HousingType {
    House,
    Townhouse,
    Apartment,
    Condo,
}

impl HousingType {
    /// Rooftop solar is only recommended where the occupant controls the roof.
    pub const fn solar_viable(self) -> bool {
        matches!(self, Self::House | Self::Townhouse)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::House => "house",
            Self::Townhouse => "townhouse",
            Self::Apartment => "apartment",
            Self::Condo => "condo",
        }
    }
}

/// Five-level ordinal diet classification, monotonically decreasing in
/// annual emissions from heavy meat consumption down to vegan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DietTier {
    HeavyMeat,
    ModerateMeat,
    LightMeat,
    Vegetarian,
    Vegan,
}

impl DietTier {
    pub const fn annual_kg_co2(self) -> f64 {
        match self {
            Self::HeavyMeat => 3300.0,
            Self::ModerateMeat => 2500.0,
            Self::LightMeat => 1900.0,
            Self::Vegetarian => 1600.0,
            Self::Vegan => 1200.0,
        }
    }

    /// The next tier down, one step at a time. Recommendations never ask a
    /// household to skip tiers.
    pub const fn step_down(self) -> Option<Self> {
        match self {
            Self::HeavyMeat => Some(Self::ModerateMeat),
            Self::ModerateMeat => Some(Self::LightMeat),
            Self::LightMeat => Some(Self::Vegetarian),
            Self::Vegetarian => Some(Self::Vegan),
            Self::Vegan => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::HeavyMeat => "heavy meat",
            Self::ModerateMeat => "moderate meat",
            Self::LightMeat => "light meat",
            Self::Vegetarian => "vegetarian",
            Self::Vegan => "vegan",
        }
    }
}

/// Four-level ordinal online-shopping frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShoppingTier {
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl ShoppingTier {
    pub const fn annual_kg_co2(self) -> f64 {
        match self {
            Self::Low => 500.0,
            Self::Moderate => 1000.0,
            Self::High => 2000.0,
            Self::VeryHigh => 3000.0,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
            Self::VeryHigh => "very high",
        }
    }
}

/// A vehicle the household drives, identified well enough to resolve a
/// combined fuel-efficiency record in the reference store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleUsage {
    pub year: u16,
    pub make: String,
    pub model: String,
    pub annual_miles: f64,
}

impl VehicleUsage {
    pub fn display_name(&self) -> String {
        format!("{} {} {}", self.year, self.make, self.model)
    }
}

/// Immutable, pre-validated input record for one calculation run. The
/// conversational layer owns free-text extraction; by the time a profile
/// reaches the engine every field is already typed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Two-letter state code, e.g. "CA".
    pub state: String,
    #[serde(default)]
    pub city: Option<String>,
    pub household_size: u8,
    pub housing_type: HousingType,
    pub square_footage: f64,
    pub monthly_electricity_usd: f64,
    #[serde(default)]
    pub heating_type: Option<HeatingType>,
    #[serde(default)]
    pub monthly_heating_usd: Option<f64>,
    #[serde(default)]
    pub has_solar: bool,
    #[serde(default)]
    pub primary_vehicle: Option<VehicleUsage>,
    #[serde(default)]
    pub secondary_vehicles: Vec<VehicleUsage>,
    #[serde(default)]
    pub domestic_flights: u32,
    #[serde(default)]
    pub international_flights: u32,
    pub diet: DietTier,
    pub shopping: ShoppingTier,
}

/// One computed emission source with enough context to audit the math.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub category: EmissionCategory,
    pub source: String,
    /// The raw quantity the emission was computed from (kWh, gallons,
    /// flights, ...), before the emission factor is applied.
    pub input_value: f64,
    pub input_unit: String,
    pub co2_kg: f64,
    pub method: String,
    /// Set when a reference lookup missed and a category-average value was
    /// substituted.
    pub estimated: bool,
}

/// Categorized footprint for one calculation run. Values stay unrounded;
/// presentation layers round at the edge so the sum invariants hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breakdown {
    pub total_kg: f64,
    pub home_kg: f64,
    pub transport_kg: f64,
    pub consumption_kg: f64,
    pub line_items: Vec<LineItem>,
}

impl Breakdown {
    pub fn category_total(&self, category: EmissionCategory) -> f64 {
        match category {
            EmissionCategory::Home => self.home_kg,
            EmissionCategory::Transport => self.transport_kg,
            EmissionCategory::Consumption => self.consumption_kg,
        }
    }

    pub fn items_in(&self, category: EmissionCategory) -> impl Iterator<Item = &LineItem> {
        self.line_items
            .iter()
            .filter(move |item| item.category == category)
    }

    pub fn total_tons(&self) -> f64 {
        self.total_kg / 1000.0
    }

    pub fn context(&self) -> FootprintContext {
        let share = |kg: f64| {
            if self.total_kg > 0.0 {
                kg / self.total_kg * 100.0
            } else {
                0.0
            }
        };

        FootprintContext {
            total_tons: self.total_tons(),
            us_average_tons: US_AVERAGE_TONS,
            percent_of_us_average: self.total_tons() / US_AVERAGE_TONS * 100.0,
            home_percent: share(self.home_kg),
            transport_percent: share(self.transport_kg),
            consumption_percent: share(self.consumption_kg),
        }
    }
}

/// US per-person average annual footprint in metric tons of CO2.
pub const US_AVERAGE_TONS: f64 = 16.0;

/// Comparison context rendered alongside a breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FootprintContext {
    pub total_tons: f64,
    pub us_average_tons: f64,
    pub percent_of_us_average: f64,
    pub home_percent: f64,
    pub transport_percent: f64,
    pub consumption_percent: f64,
}

/// Fixed taxonomy of recommendation categories across both engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpportunityKind {
    SolarOpportunity,
    HomeHeating,
    Transportation,
    HomeEfficiency,
    Flights,
    Driving,
    Energy,
    Diet,
    Shopping,
}

impl OpportunityKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::SolarOpportunity => "solar opportunity",
            Self::HomeHeating => "home heating",
            Self::Transportation => "transportation",
            Self::HomeEfficiency => "home efficiency",
            Self::Flights => "flights",
            Self::Driving => "driving",
            Self::Energy => "energy",
            Self::Diet => "diet",
            Self::Shopping => "shopping",
        }
    }

    /// Technology upgrades are matched against incentive programs; lifestyle
    /// changes are not.
    pub const fn is_technology_upgrade(self) -> bool {
        matches!(
            self,
            Self::SolarOpportunity | Self::HomeHeating | Self::Transportation | Self::HomeEfficiency
        )
    }
}

impl fmt::Display for OpportunityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Behavioral sub-type attached to lifestyle opportunities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifestyleAction {
    ReduceDomesticFlights,
    ReduceInternationalFlights,
    ReduceFlights,
    DriveLess,
    ReduceEnergyUse,
    ReduceMeatConsumption,
    ReduceShoppingFrequency,
}

/// DSIRE-style technology categories used as the program matching key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TechnologyCategory {
    Solar,
    HeatPumps,
    ElectricVehicles,
    Hvac,
    Insulation,
    Appliances,
    Lighting,
}

impl TechnologyCategory {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Solar => "solar",
            Self::HeatPumps => "heat pumps",
            Self::ElectricVehicles => "electric vehicles",
            Self::Hvac => "HVAC",
            Self::Insulation => "insulation",
            Self::Appliances => "appliances",
            Self::Lighting => "lighting",
        }
    }
}

/// A candidate recommendation before program matching. Created fresh per
/// calculation run and never persisted by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    pub kind: OpportunityKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<LifestyleAction>,
    /// User value divided by the matching baseline; above 1.0 is worse.
    pub deviation: f64,
    pub co2_savings_kg: f64,
    pub cost_savings_usd: f64,
    /// Priority score in [0, 100].
    pub priority: u8,
    pub description: String,
    /// Technology categories to match incentive programs against. Empty for
    /// lifestyle opportunities.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub technologies: Vec<TechnologyCategory>,
}

/// Priority rubric shared by both engines: absolute savings set the base and
/// the deviation magnitude scales it, clamped into [0, 100]. Monotone in both
/// inputs so a larger driver never lowers a fired rule's score.
pub(crate) fn priority_score(co2_savings_kg: f64, deviation: f64) -> u8 {
    let scaled = co2_savings_kg / 50.0 * deviation.max(1.0);
    scaled.clamp(0.0, 100.0).round() as u8
}
