//! Behavioral-change analysis over the computed breakdown.
//!
//! Same table shape as the diagnostic engine, but these rules target what
//! the household does rather than what it owns: excess flights, excess
//! miles, runaway energy use, diet, and shopping frequency. Savings always
//! cover only the excess above the rule's threshold, never the full
//! category total.

mod rules;

use super::baseline::Deviations;
use super::domain::{Breakdown, Opportunity, Profile};
use super::reference::ReferenceStore;
use super::{EngineConfig, RuleContext};

type LifestyleRule = fn(&RuleContext<'_>) -> Option<Opportunity>;

const RULES: &[LifestyleRule] = &[
    rules::flights,
    rules::driving,
    rules::energy,
    rules::diet,
    rules::shopping,
];

/// Stateless engine applying the lifestyle rule table to one calculation run.
pub struct LifestyleEngine {
    config: EngineConfig,
}

impl LifestyleEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn analyze(
        &self,
        profile: &Profile,
        breakdown: &Breakdown,
        deviations: &Deviations,
        store: &dyn ReferenceStore,
    ) -> Vec<Opportunity> {
        let ctx = RuleContext {
            profile,
            breakdown,
            deviations,
            config: &self.config,
            store,
        };

        RULES.iter().filter_map(|rule| rule(&ctx)).collect()
    }
}

impl Default for LifestyleEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
