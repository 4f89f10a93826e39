use super::super::calculator::{
    self, electricity_rate, heating_calc, vehicle_calc, EV_KG_PER_MILE, EV_KWH_PER_MILE,
    GASOLINE_PRICE_USD, SOLAR_OFFSET_FRACTION,
};
use super::super::domain::{
    priority_score, EmissionCategory, HeatingType, LineItem, Opportunity, OpportunityKind,
    TechnologyCategory,
};
use super::super::reference::FactorCategory;
use super::super::RuleContext;

fn electricity_line<'a>(ctx: &'a RuleContext<'_>) -> Option<&'a LineItem> {
    ctx.breakdown
        .items_in(EmissionCategory::Home)
        .find(|item| item.source == "Electricity")
}

/// No panels, suitable roof, above-baseline consumption. Savings follow the
/// calculator's own solar model: panels offset 80% of grid electricity
/// emissions at the current usage level.
pub(super) fn solar_opportunity(ctx: &RuleContext<'_>) -> Option<Opportunity> {
    if ctx.profile.has_solar || !ctx.profile.housing_type.solar_viable() {
        return None;
    }

    let deviation = ctx.deviations.electricity;
    if deviation < ctx.config.solar_min_deviation {
        return None;
    }

    let line = electricity_line(ctx)?;
    let co2_savings_kg = line.co2_kg * SOLAR_OFFSET_FRACTION;
    if co2_savings_kg <= ctx.config.solar_min_savings_kg {
        return None;
    }

    let annual_bill_per_person =
        ctx.profile.monthly_electricity_usd / f64::from(ctx.profile.household_size) * 12.0;

    Some(Opportunity {
        kind: OpportunityKind::SolarOpportunity,
        action: None,
        deviation,
        co2_savings_kg,
        cost_savings_usd: annual_bill_per_person * SOLAR_OFFSET_FRACTION,
        priority: priority_score(co2_savings_kg, deviation),
        description: format!(
            "No solar panels on your {} with electricity usage {:.1}x the area baseline. \
             Installing rooftop solar could avoid about {:.0} kg CO2 per year.",
            ctx.profile.housing_type.label(),
            deviation,
            co2_savings_kg
        ),
        technologies: vec![TechnologyCategory::Solar],
    })
}

/// Gas or oil heat compared against a heat pump at the same usage level.
pub(super) fn home_heating(ctx: &RuleContext<'_>) -> Option<Opportunity> {
    let fuel = ctx.profile.heating_type.filter(|fuel| fuel.burns_fossil_fuel())?;
    let monthly_usd = ctx.profile.monthly_heating_usd?;

    let current = heating_calc(
        ctx.store,
        fuel,
        monthly_usd,
        ctx.profile.household_size,
        &ctx.profile.state,
    );
    let heat_pump = heating_calc(
        ctx.store,
        HeatingType::HeatPump,
        monthly_usd,
        ctx.profile.household_size,
        &ctx.profile.state,
    );

    let co2_savings_kg = current.co2_kg - heat_pump.co2_kg;
    if co2_savings_kg <= ctx.config.heating_min_savings_kg {
        return None;
    }

    let deviation = ctx.deviations.heating.unwrap_or(1.0);
    let annual_spend_saved =
        monthly_usd * (1.0 - calculator::HEAT_PUMP_SPEND_MULTIPLIER) * 12.0;

    Some(Opportunity {
        kind: OpportunityKind::HomeHeating,
        action: None,
        deviation,
        co2_savings_kg,
        cost_savings_usd: annual_spend_saved,
        priority: priority_score(co2_savings_kg, deviation),
        description: format!(
            "Your {} produces high carbon emissions. Upgrading to a heat pump at the same \
             usage level could avoid about {:.0} kg CO2 per year.",
            fuel.label().to_lowercase(),
            co2_savings_kg
        ),
        technologies: vec![TechnologyCategory::HeatPumps],
    })
}

/// High-mileage combustion vehicle compared against an EV at the same miles.
pub(super) fn transportation(ctx: &RuleContext<'_>) -> Option<Opportunity> {
    let vehicle = ctx.profile.primary_vehicle.as_ref()?;
    let miles_deviation = ctx.deviations.annual_miles?;
    if miles_deviation <= 1.0 {
        return None;
    }

    let calc = vehicle_calc(ctx.store, vehicle, &ctx.profile.state);
    if calc.electric {
        return None;
    }

    let ev_kg = vehicle.annual_miles * EV_KG_PER_MILE;
    let co2_savings_kg = calc.co2_kg - ev_kg;
    if co2_savings_kg <= ctx.config.ev_min_savings_kg {
        return None;
    }

    let rate = electricity_rate(ctx.store, &ctx.profile.state);
    let annual_gallons = vehicle.annual_miles / calc.mpg_combined;
    let fuel_cost = annual_gallons * GASOLINE_PRICE_USD;
    let charging_cost = vehicle.annual_miles * EV_KWH_PER_MILE * rate;

    Some(Opportunity {
        kind: OpportunityKind::Transportation,
        action: None,
        deviation: miles_deviation,
        co2_savings_kg,
        cost_savings_usd: (fuel_cost - charging_cost).max(0.0),
        priority: priority_score(co2_savings_kg, miles_deviation),
        description: format!(
            "Driving {:.0} miles/year in your {} ({:.0} MPG). Switching to an EV at the \
             same mileage could avoid about {:.0} kg CO2 per year.",
            vehicle.annual_miles,
            vehicle.display_name(),
            calc.mpg_combined,
            co2_savings_kg
        ),
        technologies: vec![TechnologyCategory::ElectricVehicles],
    })
}

/// Extreme electricity deviation independent of solar status. Efficiency
/// upgrades are assumed to recover a fixed share of the excess usage.
pub(super) fn home_efficiency(ctx: &RuleContext<'_>) -> Option<Opportunity> {
    let deviation = ctx.deviations.electricity;
    if deviation <= ctx.config.efficiency_deviation_threshold {
        return None;
    }

    let monthly_bill = ctx.profile.monthly_electricity_usd;
    let expected_bill = monthly_bill / deviation;
    let excess_monthly = monthly_bill - expected_bill;

    let rate = electricity_rate(ctx.store, &ctx.profile.state);
    let excess_kwh_annual = excess_monthly / rate * 12.0;
    let (grid_factor, _) = calculator::emission_factor(
        ctx.store,
        FactorCategory::Electricity,
        &ctx.profile.state,
    );

    let co2_savings_kg =
        excess_kwh_annual * ctx.config.efficiency_recoverable_fraction * grid_factor;
    if co2_savings_kg <= 0.0 {
        return None;
    }

    Some(Opportunity {
        kind: OpportunityKind::HomeEfficiency,
        action: None,
        deviation,
        co2_savings_kg,
        cost_savings_usd: excess_monthly * ctx.config.efficiency_recoverable_fraction * 12.0,
        priority: priority_score(co2_savings_kg, deviation),
        description: format!(
            "Your ${:.0}/month electricity bill is {:.0}% above typical usage for your area. \
             Efficiency upgrades to HVAC, insulation, appliances, or lighting could avoid \
             about {:.0} kg CO2 per year.",
            monthly_bill,
            (deviation - 1.0) * 100.0,
            co2_savings_kg
        ),
        technologies: vec![
            TechnologyCategory::Hvac,
            TechnologyCategory::Insulation,
            TechnologyCategory::Appliances,
            TechnologyCategory::Lighting,
        ],
    })
}
