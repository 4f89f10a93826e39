//! Deviation ratios against jurisdiction and national baselines.
//!
//! Jurisdiction-specific baselines are preferred and the national row is the
//! only fallback. A missing baseline is an error rather than a silent 1.0,
//! so absent reference data cannot masquerade as an average household.

use super::domain::Profile;
use super::reference::{BaselineCategory, ReferenceStore, NATIONAL_REGION};
use super::EngineError;

/// National average square feet per person, used to scale the expected
/// electricity spend for unusually large or small homes.
pub(crate) const SQFT_PER_PERSON: f64 = 850.0;

pub struct BaselineComparator<'a> {
    store: &'a dyn ReferenceStore,
}

impl<'a> BaselineComparator<'a> {
    pub fn new(store: &'a dyn ReferenceStore) -> Self {
        Self { store }
    }

    fn lookup(&self, category: BaselineCategory, region: &str) -> Result<f64, EngineError> {
        self.store
            .baseline(category, region)
            .or_else(|| self.store.baseline(category, NATIONAL_REGION))
            .ok_or_else(|| EngineError::BaselineNotFound {
                category,
                region: region.to_string(),
            })
    }

    /// Ratio of a user value to the matching baseline. Spend baselines are
    /// per person and scale with household size; activity baselines (miles,
    /// flights) compare directly.
    pub fn deviation(
        &self,
        category: BaselineCategory,
        value: f64,
        region: &str,
        household_size: u8,
    ) -> Result<f64, EngineError> {
        let per_person = self.lookup(category, region)?;
        let expected = if category.scales_with_household() {
            per_person * f64::from(household_size)
        } else {
            per_person
        };

        if expected <= 0.0 {
            return Err(EngineError::BaselineNotFound {
                category,
                region: region.to_string(),
            });
        }

        Ok(value / expected)
    }

    /// Electricity deviation additionally scales the expected spend by the
    /// home's square footage per person relative to the national average.
    pub fn electricity_deviation(&self, profile: &Profile) -> Result<f64, EngineError> {
        let per_person = self.lookup(BaselineCategory::ElectricitySpend, &profile.state)?;
        let mut expected = per_person * f64::from(profile.household_size);

        if profile.square_footage > 0.0 {
            let sqft_per_person = profile.square_footage / f64::from(profile.household_size);
            expected *= sqft_per_person / SQFT_PER_PERSON;
        }

        if expected <= 0.0 {
            return Err(EngineError::BaselineNotFound {
                category: BaselineCategory::ElectricitySpend,
                region: profile.state.clone(),
            });
        }

        Ok(profile.monthly_electricity_usd / expected)
    }
}

/// Deviations computed once per run and shared by both rule engines.
#[derive(Debug, Clone, PartialEq)]
pub struct Deviations {
    pub electricity: f64,
    /// Present only when the profile has a heating branch.
    pub heating: Option<f64>,
    /// Present only when the profile has a primary vehicle.
    pub annual_miles: Option<f64>,
}

/// Assess every deviation the rule engines consume. The electricity baseline
/// is required; heating and mileage deviations are skipped (not defaulted)
/// when their profile branch is absent.
pub fn assess(profile: &Profile, store: &dyn ReferenceStore) -> Result<Deviations, EngineError> {
    let comparator = BaselineComparator::new(store);

    let electricity = comparator.electricity_deviation(profile)?;

    let heating = match (profile.heating_type, profile.monthly_heating_usd) {
        (Some(fuel), Some(monthly_usd)) => Some(comparator.deviation(
            BaselineCategory::for_heating(fuel),
            monthly_usd,
            &profile.state,
            profile.household_size,
        )?),
        _ => None,
    };

    let annual_miles = match &profile.primary_vehicle {
        Some(vehicle) => Some(comparator.deviation(
            BaselineCategory::AnnualMiles,
            vehicle.annual_miles,
            &profile.state,
            profile.household_size,
        )?),
        None => None,
    };

    Ok(Deviations {
        electricity,
        heating,
        annual_miles,
    })
}
