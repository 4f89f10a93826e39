//! Technology-upgrade diagnostics.
//!
//! Each rule is an independent entry in a fixed table: it inspects the
//! profile, breakdown, and deviations, and either emits an
//! [`Opportunity`](super::domain::Opportunity) with a strictly positive
//! savings estimate or stays silent. Multiple rules may fire in one run;
//! adding a rule is a table change, not a control-flow change.

mod rules;

use super::baseline::Deviations;
use super::domain::{Breakdown, Opportunity, Profile};
use super::reference::ReferenceStore;
use super::{EngineConfig, RuleContext};

type DiagnosticRule = fn(&RuleContext<'_>) -> Option<Opportunity>;

const RULES: &[DiagnosticRule] = &[
    rules::solar_opportunity,
    rules::home_heating,
    rules::transportation,
    rules::home_efficiency,
];

/// Stateless engine applying the upgrade rule table to one calculation run.
pub struct DiagnosticEngine {
    config: EngineConfig,
}

impl DiagnosticEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Evaluate every rule. Output order is the table order; the caller
    /// ranks by priority.
    pub fn diagnose(
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

impl Default for DiagnosticEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
