//! Full calculation run: profile -> breakdown -> ranked recommendations.

use super::baseline;
use super::calculator;
use super::diagnostic::DiagnosticEngine;
use super::domain::{Breakdown, FootprintContext, Opportunity, Profile};
use super::incentives::{self, FinancialSummary};
use super::lifestyle::LifestyleEngine;
use super::matcher::ProgramMatcher;
use super::reference::{Program, ReferenceStore};
use super::{EngineConfig, EngineError};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// An opportunity enriched with its matched programs and one aggregated
/// financial summary. The unit returned to callers; never further mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(flatten)]
    pub opportunity: Opportunity,
    pub programs: Vec<Program>,
    pub financial: FinancialSummary,
}

/// Result of one calculation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FootprintReport {
    pub breakdown: Breakdown,
    pub context: FootprintContext,
    pub recommendations: Vec<Recommendation>,
}

/// Orchestrates the five computation stages. Stateless apart from the rule
/// thresholds; safe to share across concurrent runs.
pub struct FootprintEngine {
    config: EngineConfig,
}

impl FootprintEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn run(
        &self,
        profile: &Profile,
        store: &dyn ReferenceStore,
    ) -> Result<FootprintReport, EngineError> {
        let breakdown = calculator::compute(profile, store)?;
        let deviations = baseline::assess(profile, store)?;

        debug!(
            total_kg = breakdown.total_kg,
            electricity_deviation = deviations.electricity,
            "breakdown computed"
        );

        let diagnostic = DiagnosticEngine::new(self.config.clone());
        let lifestyle = LifestyleEngine::new(self.config.clone());

        let mut opportunities = diagnostic.diagnose(profile, &breakdown, &deviations, store);
        opportunities.extend(lifestyle.analyze(profile, &breakdown, &deviations, store));

        let matcher = ProgramMatcher::new(store);
        let mut recommendations: Vec<Recommendation> = opportunities
            .into_iter()
            .map(|opportunity| {
                let programs = matcher.for_opportunity(&opportunity, &profile.state);
                let financial = incentives::aggregate(&programs);
                Recommendation {
                    opportunity,
                    programs,
                    financial,
                }
            })
            .collect();

        // Stable sort keeps the rule-table order among equal priorities, so
        // identical inputs always produce identical output order.
        recommendations.sort_by(|a, b| {
            b.opportunity
                .priority
                .cmp(&a.opportunity.priority)
                .then_with(|| {
                    b.opportunity
                        .co2_savings_kg
                        .total_cmp(&a.opportunity.co2_savings_kg)
                })
        });

        info!(
            total_tons = breakdown.total_tons(),
            recommendations = recommendations.len(),
            state = %profile.state,
            "footprint run complete"
        );

        Ok(FootprintReport {
            context: breakdown.context(),
            breakdown,
            recommendations,
        })
    }
}

impl Default for FootprintEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
