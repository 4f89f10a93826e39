//! CSV loader for incentive-program reference rows.
//!
//! The engine itself never loads data; this hydrates an
//! [`InMemoryReferenceStore`](super::reference::InMemoryReferenceStore) for
//! the CLI demo, the HTTP service, and tests. Rows with unknown enum tags or
//! missing required columns fail the whole load with the line number named.

use super::domain::TechnologyCategory;
use super::reference::{InMemoryReferenceStore, Program, ProgramJurisdiction, ProgramType};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use std::io::Read;
use std::path::Path;

#[derive(Debug)]
pub enum ProgramImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    Row { line: usize, reason: String },
}

impl std::fmt::Display for ProgramImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProgramImportError::Io(err) => write!(f, "failed to read program table: {}", err),
            ProgramImportError::Csv(err) => write!(f, "invalid program CSV data: {}", err),
            ProgramImportError::Row { line, reason } => {
                write!(f, "invalid program row {}: {}", line, reason)
            }
        }
    }
}

impl std::error::Error for ProgramImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProgramImportError::Io(err) => Some(err),
            ProgramImportError::Csv(err) => Some(err),
            ProgramImportError::Row { .. } => None,
        }
    }
}

impl From<std::io::Error> for ProgramImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for ProgramImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Parse a program table from any reader.
pub fn load_programs<R: Read>(reader: R) -> Result<Vec<Program>, ProgramImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut programs = Vec::new();
    for (index, record) in csv_reader.deserialize::<ProgramRow>().enumerate() {
        // Header is line 1; the first record is line 2.
        let line = index + 2;
        let row = record?;
        programs.push(row.into_program(line)?);
    }
    Ok(programs)
}

/// Load a program table from disk into a store.
pub fn hydrate_from_path<P: AsRef<Path>>(
    store: InMemoryReferenceStore,
    path: P,
) -> Result<InMemoryReferenceStore, ProgramImportError> {
    let file = std::fs::File::open(path)?;
    let programs = load_programs(file)?;
    Ok(programs
        .into_iter()
        .fold(store, |store, program| store.with_program(program)))
}

#[derive(Debug, Deserialize)]
struct ProgramRow {
    name: String,
    level: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    state: Option<String>,
    technology: String,
    program_type: String,
    #[serde(default)]
    incentive_amount: Option<f64>,
    #[serde(default)]
    percent_of_cost: Option<f64>,
    #[serde(default)]
    percent_cap: Option<f64>,
    #[serde(default)]
    per_unit_rate: Option<f64>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    per_unit_label: Option<String>,
    #[serde(default)]
    summary: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    website_url: Option<String>,
    #[serde(default)]
    credible: bool,
    last_updated: String,
}

impl ProgramRow {
    fn into_program(self, line: usize) -> Result<Program, ProgramImportError> {
        let row_error = |reason: String| ProgramImportError::Row { line, reason };

        let jurisdiction = match self.level.to_ascii_lowercase().as_str() {
            "federal" => ProgramJurisdiction::Federal,
            "state" => {
                let code = self
                    .state
                    .ok_or_else(|| row_error("state-level program without a state code".into()))?;
                ProgramJurisdiction::State(code.to_ascii_uppercase())
            }
            other => return Err(row_error(format!("unknown program level '{other}'"))),
        };

        let technology = parse_technology(&self.technology)
            .ok_or_else(|| row_error(format!("unknown technology '{}'", self.technology)))?;
        let program_type = parse_program_type(&self.program_type)
            .ok_or_else(|| row_error(format!("unknown program type '{}'", self.program_type)))?;
        let last_updated = NaiveDate::parse_from_str(self.last_updated.trim(), "%Y-%m-%d")
            .map_err(|err| row_error(format!("bad last_updated '{}': {err}", self.last_updated)))?;

        Ok(Program {
            name: self.name,
            jurisdiction,
            technology,
            program_type,
            incentive_amount: self.incentive_amount,
            percent_of_cost: self.percent_of_cost,
            percent_cap: self.percent_cap,
            per_unit_rate: self.per_unit_rate,
            per_unit_label: self.per_unit_label,
            summary: self.summary,
            website_url: self.website_url,
            credible: self.credible,
            last_updated,
        })
    }
}

fn parse_technology(raw: &str) -> Option<TechnologyCategory> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "solar" => Some(TechnologyCategory::Solar),
        "heat_pumps" => Some(TechnologyCategory::HeatPumps),
        "electric_vehicles" => Some(TechnologyCategory::ElectricVehicles),
        "hvac" => Some(TechnologyCategory::Hvac),
        "insulation" => Some(TechnologyCategory::Insulation),
        "appliances" => Some(TechnologyCategory::Appliances),
        "lighting" => Some(TechnologyCategory::Lighting),
        _ => None,
    }
}

fn parse_program_type(raw: &str) -> Option<ProgramType> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "tax_credit" => Some(ProgramType::TaxCredit),
        "tax_deduction" => Some(ProgramType::TaxDeduction),
        "grant" => Some(ProgramType::Grant),
        "rebate" => Some(ProgramType::Rebate),
        "loan" => Some(ProgramType::Loan),
        _ => None,
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
