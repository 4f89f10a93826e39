//! Incentive aggregation: combining program financial terms into one
//! comparable summary.
//!
//! The combination rules are deliberately total; every input shape lands in
//! either a numeric combination, the complex-count fallback, or "no
//! financial data". Classification happens up front so the arithmetic and
//! the rendering never interleave:
//!
//! - *simple-fixed*: a fixed amount and nothing else; amounts sum.
//! - *simple-percent*: a percent and nothing else; percents sum.
//! - *mixed-simple*: percent plus a fixed amount with no explicit cap; the
//!   amount is assumed to be a cap rather than additive, so only the percent
//!   contributes to the combined total.
//! - *complex*: a per-unit rate, a percent with an explicit cap, or any
//!   other shape; one complex program abandons numeric combination for the
//!   whole set.

use super::reference::Program;
use serde::{Deserialize, Serialize};

/// Aggregated financial terms for one recommendation's matched programs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FinancialSummary {
    /// Zero matched programs. Never fabricates a number.
    NoData,
    /// One program, rendered from its own terms.
    Single { display: String },
    /// Numeric combination across programs that all classified simple.
    Combined {
        total_fixed_usd: Option<f64>,
        total_percent: Option<f64>,
        display: String,
    },
    /// At least one complex program; only the count is reported.
    ProgramsAvailable { count: usize, display: String },
}

impl FinancialSummary {
    pub fn display(&self) -> &str {
        match self {
            Self::NoData => "no financial data",
            Self::Single { display }
            | Self::Combined { display, .. }
            | Self::ProgramsAvailable { display, .. } => display,
        }
    }

    pub fn has_data(&self) -> bool {
        !matches!(self, Self::NoData)
    }
}

enum TermClass {
    SimpleFixed(f64),
    SimplePercent(f64),
    MixedSimple(f64),
    Complex,
}

fn classify(program: &Program) -> TermClass {
    if program.per_unit_rate.is_some() {
        return TermClass::Complex;
    }
    match (
        program.percent_of_cost,
        program.incentive_amount,
        program.percent_cap,
    ) {
        (Some(_), _, Some(_)) => TermClass::Complex,
        (Some(percent), Some(_), None) => TermClass::MixedSimple(percent),
        (Some(percent), None, None) => TermClass::SimplePercent(percent),
        (None, Some(amount), None) => TermClass::SimpleFixed(amount),
        _ => TermClass::Complex,
    }
}

/// Combine any number of programs into one summary. Total by construction:
/// zero programs yield [`FinancialSummary::NoData`] and unclassifiable
/// shapes fall back to the program count.
pub fn aggregate(programs: &[Program]) -> FinancialSummary {
    match programs {
        [] => FinancialSummary::NoData,
        [only] => FinancialSummary::Single {
            display: render_single(only),
        },
        many => {
            let mut fixed_total = None::<f64>;
            let mut percent_total = None::<f64>;

            for program in many {
                match classify(program) {
                    TermClass::SimpleFixed(amount) => {
                        fixed_total = Some(fixed_total.unwrap_or(0.0) + amount);
                    }
                    TermClass::SimplePercent(percent) | TermClass::MixedSimple(percent) => {
                        percent_total = Some(percent_total.unwrap_or(0.0) + percent);
                    }
                    TermClass::Complex => {
                        return FinancialSummary::ProgramsAvailable {
                            count: many.len(),
                            display: format!("{} incentive programs available", many.len()),
                        };
                    }
                }
            }

            let display = match (fixed_total, percent_total) {
                (Some(fixed), Some(percent)) => format!(
                    "{} + {} covered",
                    compact_currency(fixed),
                    format_percent(percent)
                ),
                (Some(fixed), None) => {
                    format!("{} of incentives available", compact_currency(fixed))
                }
                (None, Some(percent)) => {
                    format!("{} of cost covered", format_percent(percent))
                }
                (None, None) => unreachable!("every program classified into a bucket"),
            };

            FinancialSummary::Combined {
                total_fixed_usd: fixed_total,
                total_percent: percent_total,
                display,
            }
        }
    }
}

/// Render one program's own terms. A fixed amount next to an uncapped
/// percent is treated as the implicit cap on that percent.
fn render_single(program: &Program) -> String {
    let mut parts = Vec::new();

    match (
        program.percent_of_cost,
        program.incentive_amount,
        program.percent_cap,
    ) {
        (Some(percent), _, Some(cap)) => parts.push(format!(
            "{} up to {}",
            format_percent(percent),
            compact_currency(cap)
        )),
        (Some(percent), Some(amount), None) => parts.push(format!(
            "{} up to {}",
            format_percent(percent),
            compact_currency(amount)
        )),
        (Some(percent), None, None) => {
            parts.push(format!("{} of cost covered", format_percent(percent)))
        }
        (None, Some(amount), _) => {
            parts.push(format!("{} of incentives available", compact_currency(amount)))
        }
        (None, None, _) => {}
    }

    if let Some(rate) = program.per_unit_rate {
        let label = program.per_unit_label.as_deref().unwrap_or("");
        parts.push(format!("${} {}", trim_number(rate), canonical_unit(label)));
    }

    if parts.is_empty() {
        "see program details".to_string()
    } else {
        parts.join(" + ")
    }
}

/// Compact one-program form for tabbed UI chips: percent if present, else
/// fixed amount, else per-unit rate. Never combines terms.
pub fn short_display(program: &Program) -> String {
    if let Some(percent) = program.percent_of_cost {
        return format_percent(percent);
    }
    if let Some(amount) = program.incentive_amount {
        return compact_currency(amount);
    }
    if let Some(rate) = program.per_unit_rate {
        let label = program.per_unit_label.as_deref().unwrap_or("");
        let unit = canonical_unit(label);
        let unit = unit.strip_prefix("per ").unwrap_or(&unit);
        let unit = unit.split(" (").next().unwrap_or(unit);
        return format!("${}/{}", trim_number(rate), unit);
    }
    "details".to_string()
}

/// Fixed mapping from raw reference-data unit strings to display units.
const UNIT_LABELS: &[(&str, &str)] = &[
    ("$/kWh (4 years)", "per kWh (4 years)"),
    ("$/kWh", "per kWh"),
    ("$/W", "per watt"),
    ("$/watt", "per watt"),
    ("$/sq ft", "per square foot"),
    ("$/ton", "per ton"),
    ("$/mile", "per mile"),
];

fn canonical_unit(raw: &str) -> String {
    let trimmed = raw.trim();
    if let Some((_, display)) = UNIT_LABELS.iter().find(|(pattern, _)| *pattern == trimmed) {
        return (*display).to_string();
    }
    if let Some(rest) = trimmed.strip_prefix("$/") {
        return format!("per {rest}");
    }
    trimmed.to_lowercase()
}

/// Compact currency: "$500", "$1.5K", "$1.2M". Whole thousands drop the
/// decimal ("$1K", "$7.5K").
fn compact_currency(value: f64) -> String {
    if value < 1_000.0 {
        format!("${value:.0}")
    } else if value < 1_000_000.0 {
        format!("${}K", trim_number(value / 1_000.0))
    } else {
        format!("${}M", trim_number(value / 1_000_000.0))
    }
}

fn format_percent(percent: f64) -> String {
    format!("{}%", trim_number(percent))
}

/// Shortest decimal rendering: whole numbers drop the fraction, everything
/// else keeps up to two decimal places with trailing zeros trimmed.
fn trim_number(value: f64) -> String {
    if (value - value.round()).abs() < 1e-9 {
        format!("{:.0}", value.round())
    } else {
        format!("{value:.2}")
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    }
}
