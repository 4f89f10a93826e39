//! Incentive program matching by technology tag and jurisdiction.
//!
//! Matching is exact: a category miss yields an empty list, never an error,
//! and downstream renders that as "no program available". Ranking is
//! deterministic and order-stable for identical inputs.

use super::domain::{Opportunity, TechnologyCategory};
use super::reference::{Program, ReferenceStore};
use std::cmp::Reverse;

pub struct ProgramMatcher<'a> {
    store: &'a dyn ReferenceStore,
}

impl<'a> ProgramMatcher<'a> {
    pub fn new(store: &'a dyn ReferenceStore) -> Self {
        Self { store }
    }

    /// All eligible programs for one technology: every federal program plus
    /// programs for the exact state, ranked federal-first, then credibility,
    /// then most recently updated, then name as the final tiebreak.
    pub fn matches(&self, technology: TechnologyCategory, state: &str) -> Vec<Program> {
        let mut programs = self.store.programs_for(technology, state);
        rank(&mut programs);
        programs
    }

    /// Union of matches across an opportunity's technology categories,
    /// deduplicated by program name, with the same ranking.
    pub fn for_opportunity(&self, opportunity: &Opportunity, state: &str) -> Vec<Program> {
        let mut programs: Vec<Program> = Vec::new();
        for technology in &opportunity.technologies {
            for program in self.store.programs_for(*technology, state) {
                if !programs.iter().any(|existing| existing.name == program.name) {
                    programs.push(program);
                }
            }
        }
        rank(&mut programs);
        programs
    }
}

fn rank(programs: &mut [Program]) {
    programs.sort_by(|a, b| {
        let key = |p: &Program| {
            (
                Reverse(p.is_federal()),
                Reverse(p.credible),
                Reverse(p.last_updated),
            )
        };
        key(a).cmp(&key(b)).then_with(|| a.name.cmp(&b.name))
    });
}
