//! Emission calculation and recommendation-matching engine.
//!
//! Everything in this module is a pure, stateless transformation over an
//! immutable [`Profile`](domain::Profile) and an injected read-only
//! [`ReferenceStore`](reference::ReferenceStore). A calculation run flows
//! profile -> breakdown -> deviations -> opportunities -> matched programs ->
//! aggregated financial summaries, and two runs with identical inputs produce
//! identical output.

pub mod baseline;
pub mod calculator;
pub mod diagnostic;
pub mod domain;
pub mod incentives;
pub mod lifestyle;
pub mod matcher;
pub mod pipeline;
pub mod programs_csv;
pub mod reference;

#[cfg(test)]
mod tests;

pub use baseline::{BaselineComparator, Deviations};
pub use calculator::compute;
pub use diagnostic::DiagnosticEngine;
pub use domain::{
    Breakdown, DietTier, EmissionCategory, FootprintContext, HeatingType, HousingType,
    LifestyleAction, LineItem, Opportunity, OpportunityKind, Profile, ShoppingTier,
    TechnologyCategory, VehicleUsage,
};
pub use incentives::{aggregate, short_display, FinancialSummary};
pub use lifestyle::LifestyleEngine;
pub use matcher::ProgramMatcher;
pub use pipeline::{FootprintEngine, FootprintReport, Recommendation};
pub use reference::{
    BaselineCategory, FactorCategory, InMemoryReferenceStore, Program, ProgramJurisdiction,
    ProgramType, ReferenceStore, VehicleEfficiency,
};

/// Engine failure taxonomy. Reference lookup misses are not errors; they
/// recover through documented fallbacks and tag the result as estimated.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    /// A required field for the active branch is missing or contradictory.
    /// Fatal to the run and surfaced with the offending field named.
    #[error("invalid profile: {field}: {reason}")]
    InvalidProfile { field: &'static str, reason: String },

    /// Neither a jurisdiction-specific nor a national baseline exists, so a
    /// deviation ratio cannot be computed. Defaulting the ratio to 1.0 would
    /// mask missing reference data, so this is fatal.
    #[error("no baseline for {category:?} in {region} and no national fallback")]
    BaselineNotFound {
        category: BaselineCategory,
        region: String,
    },
}

/// Rule thresholds for the diagnostic and lifestyle engines. The defaults
/// reproduce the production rubric; tests override individual knobs.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EngineConfig {
    /// Minimum electricity deviation before solar is suggested.
    pub solar_min_deviation: f64,
    /// Minimum annual kg CO2 a solar install must save to be worth surfacing.
    pub solar_min_savings_kg: f64,
    /// Minimum annual kg CO2 a heat-pump conversion must save.
    pub heating_min_savings_kg: f64,
    /// Minimum annual kg CO2 an EV switch must save.
    pub ev_min_savings_kg: f64,
    /// Electricity deviation above which the home-efficiency rule fires.
    pub efficiency_deviation_threshold: f64,
    /// Share of excess usage recoverable through efficiency upgrades.
    pub efficiency_recoverable_fraction: f64,
    /// Domestic round trips per year before the flights rule fires.
    pub domestic_flight_threshold: u32,
    /// International round trips per year before the flights rule fires.
    pub international_flight_threshold: u32,
    /// Miles-over-average ratio before the driving rule fires.
    pub driving_deviation_threshold: f64,
    /// Electricity or heating deviation before the energy rule fires.
    pub energy_deviation_threshold: f64,
}

/// Shared inputs handed to every diagnostic and lifestyle rule.
pub(crate) struct RuleContext<'a> {
    pub profile: &'a domain::Profile,
    pub breakdown: &'a domain::Breakdown,
    pub deviations: &'a baseline::Deviations,
    pub config: &'a EngineConfig,
    pub store: &'a dyn reference::ReferenceStore,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            solar_min_deviation: 1.0,
            solar_min_savings_kg: 800.0,
            heating_min_savings_kg: 500.0,
            ev_min_savings_kg: 1000.0,
            efficiency_deviation_threshold: 1.8,
            efficiency_recoverable_fraction: 0.4,
            domestic_flight_threshold: 3,
            international_flight_threshold: 1,
            driving_deviation_threshold: 1.25,
            energy_deviation_threshold: 1.8,
        }
    }
}
