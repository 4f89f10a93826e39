use super::super::calculator::{
    electricity_rate, vehicle_calc, DOMESTIC_FLIGHT_COST_USD, DOMESTIC_FLIGHT_KG, EV_KWH_PER_MILE,
    GASOLINE_PRICE_USD, INTERNATIONAL_FLIGHT_COST_USD, INTERNATIONAL_FLIGHT_KG,
};
use super::super::domain::{
    priority_score, DietTier, EmissionCategory, LifestyleAction, Opportunity, OpportunityKind,
    ShoppingTier,
};
use super::super::RuleContext;

fn home_line_kg(ctx: &RuleContext<'_>, source: &str) -> f64 {
    ctx.breakdown
        .items_in(EmissionCategory::Home)
        .find(|item| item.source == source)
        .map(|item| item.co2_kg)
        .unwrap_or(0.0)
}

fn transport_line_kg(ctx: &RuleContext<'_>, source: &str) -> f64 {
    ctx.breakdown
        .items_in(EmissionCategory::Transport)
        .find(|item| item.source == source)
        .map(|item| item.co2_kg)
        .unwrap_or(0.0)
}

/// More than 3 domestic or 1 international round trips per year. Savings
/// cover only the flights above the threshold.
pub(super) fn flights(ctx: &RuleContext<'_>) -> Option<Opportunity> {
    let excess_domestic = ctx
        .profile
        .domestic_flights
        .saturating_sub(ctx.config.domestic_flight_threshold);
    let excess_international = ctx
        .profile
        .international_flights
        .saturating_sub(ctx.config.international_flight_threshold);

    if excess_domestic == 0 && excess_international == 0 {
        return None;
    }

    let co2_savings_kg = f64::from(excess_domestic) * DOMESTIC_FLIGHT_KG
        + f64::from(excess_international) * INTERNATIONAL_FLIGHT_KG;
    if co2_savings_kg <= 0.0 {
        return None;
    }

    let cost_savings_usd = f64::from(excess_domestic) * DOMESTIC_FLIGHT_COST_USD
        + f64::from(excess_international) * INTERNATIONAL_FLIGHT_COST_USD;

    let action = match (excess_domestic > 0, excess_international > 0) {
        (true, true) => LifestyleAction::ReduceFlights,
        (false, true) => LifestyleAction::ReduceInternationalFlights,
        (true, false) => LifestyleAction::ReduceDomesticFlights,
        (false, false) => unreachable!("at least one excess is non-zero"),
    };

    let deviation = (f64::from(ctx.profile.domestic_flights)
        / f64::from(ctx.config.domestic_flight_threshold))
    .max(
        f64::from(ctx.profile.international_flights)
            / f64::from(ctx.config.international_flight_threshold),
    );

    let current_kg =
        transport_line_kg(ctx, "Domestic Flights") + transport_line_kg(ctx, "International Flights");

    Some(Opportunity {
        kind: OpportunityKind::Flights,
        action: Some(action),
        deviation,
        co2_savings_kg,
        cost_savings_usd,
        priority: priority_score(co2_savings_kg, deviation),
        description: format!(
            "Your {} domestic and {} international flights produce {:.0} kg CO2 annually. \
             Cutting back to {} domestic and {} international round trips would avoid \
             about {:.0} kg CO2 per year.",
            ctx.profile.domestic_flights,
            ctx.profile.international_flights,
            current_kg,
            ctx.config.domestic_flight_threshold,
            ctx.config.international_flight_threshold,
            co2_savings_kg
        ),
        technologies: Vec::new(),
    })
}

/// Annual miles more than 1.25x the per-driver average. Savings cover only
/// the miles above the average.
pub(super) fn driving(ctx: &RuleContext<'_>) -> Option<Opportunity> {
    let vehicle = ctx.profile.primary_vehicle.as_ref()?;
    let deviation = ctx.deviations.annual_miles?;
    if deviation <= ctx.config.driving_deviation_threshold {
        return None;
    }

    let average_miles = vehicle.annual_miles / deviation;
    let excess_miles = vehicle.annual_miles - average_miles;

    let calc = vehicle_calc(ctx.store, vehicle, &ctx.profile.state);
    let co2_savings_kg = calc.co2_kg * excess_miles / vehicle.annual_miles;
    if co2_savings_kg <= 0.0 {
        return None;
    }

    let cost_savings_usd = if calc.electric {
        excess_miles * EV_KWH_PER_MILE * electricity_rate(ctx.store, &ctx.profile.state)
    } else {
        excess_miles / calc.mpg_combined * GASOLINE_PRICE_USD
    };

    Some(Opportunity {
        kind: OpportunityKind::Driving,
        action: Some(LifestyleAction::DriveLess),
        deviation,
        co2_savings_kg,
        cost_savings_usd,
        priority: priority_score(co2_savings_kg, deviation),
        description: format!(
            "You drive {:.0} miles/year, {:.0}% above the average driver. Carpooling, \
             combining errands, or remote work could trim the {:.0} excess miles and avoid \
             about {:.0} kg CO2 per year.",
            vehicle.annual_miles,
            (deviation - 1.0) * 100.0,
            excess_miles,
            co2_savings_kg
        ),
        technologies: Vec::new(),
    })
}

/// Electricity or heating spend beyond 1.8x baseline. Savings cover only the
/// emissions above the 1.8x level.
pub(super) fn energy(ctx: &RuleContext<'_>) -> Option<Opportunity> {
    let threshold = ctx.config.energy_deviation_threshold;
    let electricity_dev = ctx.deviations.electricity;
    let heating_dev = ctx.deviations.heating.unwrap_or(0.0);

    let deviation = electricity_dev.max(heating_dev);
    if deviation <= threshold {
        return None;
    }

    let mut co2_savings_kg = 0.0;
    let mut monthly_usd_saved = 0.0;

    if electricity_dev > threshold {
        let excess_fraction = 1.0 - threshold / electricity_dev;
        co2_savings_kg += home_line_kg(ctx, "Electricity") * excess_fraction;
        monthly_usd_saved += ctx.profile.monthly_electricity_usd * excess_fraction;
    }

    if heating_dev > threshold {
        if let (Some(fuel), Some(monthly_usd)) =
            (ctx.profile.heating_type, ctx.profile.monthly_heating_usd)
        {
            let excess_fraction = 1.0 - threshold / heating_dev;
            co2_savings_kg += home_line_kg(ctx, fuel.label()) * excess_fraction;
            monthly_usd_saved += monthly_usd * excess_fraction;
        }
    }

    if co2_savings_kg <= 0.0 {
        return None;
    }

    Some(Opportunity {
        kind: OpportunityKind::Energy,
        action: Some(LifestyleAction::ReduceEnergyUse),
        deviation,
        co2_savings_kg,
        cost_savings_usd: monthly_usd_saved * 12.0,
        priority: priority_score(co2_savings_kg, deviation),
        description: format!(
            "Your home energy use runs {:.0}% above typical for your area. Thermostat \
             adjustments, LED bulbs, and unplugging idle devices could avoid about {:.0} kg \
             CO2 and ${:.0}/month.",
            (deviation - 1.0) * 100.0,
            co2_savings_kg,
            monthly_usd_saved
        ),
        technologies: Vec::new(),
    })
}

/// Fixed annual cost-savings estimates for a one-tier diet step-down. No
/// user spend data exists for food, so these are national averages.
const DIET_STEP_COST_USD: f64 = 300.0;
const DIET_STEP_COST_MODERATE_USD: f64 = 200.0;

/// Heavy or moderate meat consumption steps down exactly one tier.
pub(super) fn diet(ctx: &RuleContext<'_>) -> Option<Opportunity> {
    let current = ctx.profile.diet;
    let (target, cost_savings_usd) = match current {
        DietTier::HeavyMeat => (DietTier::ModerateMeat, DIET_STEP_COST_USD),
        DietTier::ModerateMeat => (DietTier::LightMeat, DIET_STEP_COST_MODERATE_USD),
        _ => return None,
    };

    let co2_savings_kg = current.annual_kg_co2() - target.annual_kg_co2();
    if co2_savings_kg <= 0.0 {
        return None;
    }

    let deviation = current.annual_kg_co2() / target.annual_kg_co2();

    Some(Opportunity {
        kind: OpportunityKind::Diet,
        action: Some(LifestyleAction::ReduceMeatConsumption),
        deviation,
        co2_savings_kg,
        cost_savings_usd,
        priority: priority_score(co2_savings_kg, deviation),
        description: format!(
            "Your {} diet produces {:.0} kg CO2 annually. Stepping down to a {} diet, \
             perhaps with a meatless day each week, would avoid about {:.0} kg CO2 per year.",
            current.label(),
            current.annual_kg_co2(),
            target.label(),
            co2_savings_kg
        ),
        technologies: Vec::new(),
    })
}

/// Fixed annual cost-savings estimates for shopping-frequency reductions.
const SHOPPING_VERY_HIGH_COST_USD: f64 = 600.0;
const SHOPPING_HIGH_COST_USD: f64 = 300.0;

/// Very-high or high shopping frequency steps down to moderate exactly.
pub(super) fn shopping(ctx: &RuleContext<'_>) -> Option<Opportunity> {
    let current = ctx.profile.shopping;
    let cost_savings_usd = match current {
        ShoppingTier::VeryHigh => SHOPPING_VERY_HIGH_COST_USD,
        ShoppingTier::High => SHOPPING_HIGH_COST_USD,
        _ => return None,
    };

    let target = ShoppingTier::Moderate;
    let co2_savings_kg = current.annual_kg_co2() - target.annual_kg_co2();
    if co2_savings_kg <= 0.0 {
        return None;
    }

    let deviation = current.annual_kg_co2() / target.annual_kg_co2();

    Some(Opportunity {
        kind: OpportunityKind::Shopping,
        action: Some(LifestyleAction::ReduceShoppingFrequency),
        deviation,
        co2_savings_kg,
        cost_savings_usd,
        priority: priority_score(co2_savings_kg, deviation),
        description: format!(
            "Your {} shopping frequency produces {:.0} kg CO2 annually. Bundling purchases \
             and buying longer-lasting items at a moderate pace would avoid about {:.0} kg \
             CO2 per year.",
            current.label(),
            current.annual_kg_co2(),
            co2_savings_kg
        ),
        technologies: Vec::new(),
    })
}
