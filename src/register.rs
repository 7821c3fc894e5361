//! Risk register: filtering, sorting and CSV export of scored risks.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::error::UnknownLabel;
use crate::model::{FieldValue, RiskLevel};
use crate::scoring::EnrichedRisk;
use crate::settings::AppSettings;

const CUSTOM_PREFIX: &str = "customFields.";

/// A register column, addressed by the same keys the dashboard uses
/// (`projectName`, `score`, `type`, ..., `customFields.<id>`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RiskColumn {
    Project,
    Score,
    Type,
    Impact,
    Description,
    Owner,
    Mitigation,
    Custom(String),
}

impl RiskColumn {
    pub fn key(&self) -> String {
        match self {
            Self::Project => "projectName".to_string(),
            Self::Score => "score".to_string(),
            Self::Type => "type".to_string(),
            Self::Impact => "impact".to_string(),
            Self::Description => "description".to_string(),
            Self::Owner => "owner".to_string(),
            Self::Mitigation => "mitigation".to_string(),
            Self::Custom(id) => format!("{CUSTOM_PREFIX}{id}"),
        }
    }

    /// Header text; custom columns use the field's display name when defined.
    pub fn label(&self, settings: &AppSettings) -> String {
        match self {
            Self::Project => "Project".to_string(),
            Self::Score => "Score".to_string(),
            Self::Type => "Risk Type".to_string(),
            Self::Impact => "Impact".to_string(),
            Self::Description => "Description".to_string(),
            Self::Owner => "Owner".to_string(),
            Self::Mitigation => "Mitigation".to_string(),
            Self::Custom(id) => settings
                .risk_custom_fields()
                .iter()
                .find(|field| &field.id == id)
                .map_or_else(|| id.clone(), |field| field.name.clone()),
        }
    }

    fn cell<'a>(&self, risk: &'a EnrichedRisk) -> Cell<'a> {
        match self {
            Self::Project => Cell::Text(&risk.project_name),
            Self::Score => Cell::Number(risk.score as f64),
            Self::Type => Cell::Level(risk.risk.risk_type),
            Self::Impact => Cell::Level(risk.risk.impact),
            Self::Description => Cell::Text(&risk.risk.description),
            Self::Owner => Cell::Text(&risk.risk.owner),
            Self::Mitigation => Cell::Text(&risk.risk.mitigation),
            Self::Custom(id) => match risk.risk.custom_field(id) {
                Some(FieldValue::Number(n)) => n.as_f64().map_or(Cell::Missing, Cell::Number),
                Some(FieldValue::Text(s)) => Cell::Text(s),
                Some(FieldValue::Bool(b)) => Cell::Bool(*b),
                None => Cell::Missing,
            },
        }
    }

    fn render(&self, risk: &EnrichedRisk) -> String {
        match self {
            Self::Score => risk.score.to_string(),
            Self::Custom(id) => risk
                .risk
                .custom_field(id)
                .map(ToString::to_string)
                .unwrap_or_default(),
            _ => self.cell(risk).to_string(),
        }
    }
}

impl FromStr for RiskColumn {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "projectName" => Ok(Self::Project),
            "score" => Ok(Self::Score),
            "type" => Ok(Self::Type),
            "impact" => Ok(Self::Impact),
            "description" => Ok(Self::Description),
            "owner" => Ok(Self::Owner),
            "mitigation" => Ok(Self::Mitigation),
            other => match other.strip_prefix(CUSTOM_PREFIX) {
                Some(id) if !id.is_empty() => Ok(Self::Custom(id.to_string())),
                _ => Err(UnknownLabel {
                    kind: "RiskColumn",
                    label: other.to_string(),
                }),
            },
        }
    }
}

/// Sortable view of a cell. Missing values sort after every present value.
#[derive(Debug, PartialEq)]
enum Cell<'a> {
    Number(f64),
    Level(RiskLevel),
    Bool(bool),
    Text(&'a str),
    Missing,
}

impl Cell<'_> {
    fn rank(&self) -> u8 {
        match self {
            Self::Number(_) => 0,
            Self::Level(_) => 1,
            Self::Bool(_) => 2,
            Self::Text(_) => 3,
            Self::Missing => 4,
        }
    }

    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Level(a), Self::Level(b)) => a.cmp(b),
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl fmt::Display for Cell<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Level(level) => f.write_str(level.as_str()),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Text(s) => f.write_str(s),
            Self::Missing => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOrder {
    pub column: RiskColumn,
    pub direction: SortDirection,
}

impl Default for SortOrder {
    fn default() -> Self {
        Self {
            column: RiskColumn::Score,
            direction: SortDirection::Descending,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RiskFilter {
    pub risk_type: Option<RiskLevel>,
    pub project_id: Option<i64>,
}

impl RiskFilter {
    pub fn matches(&self, risk: &EnrichedRisk) -> bool {
        self.risk_type.is_none_or(|wanted| risk.risk.risk_type == wanted)
            && self.project_id.is_none_or(|wanted| risk.project_id == wanted)
    }
}

/// Risks passing `filter`, stably sorted by `order`. Missing custom values
/// stay at the end in both directions.
pub fn filter_and_sort<'a>(
    risks: &'a [EnrichedRisk],
    filter: &RiskFilter,
    order: &SortOrder,
) -> Vec<&'a EnrichedRisk> {
    let mut selected: Vec<&EnrichedRisk> = risks.iter().filter(|risk| filter.matches(risk)).collect();
    selected.sort_by(|a, b| {
        let (left, right) = (order.column.cell(a), order.column.cell(b));
        match (&left, &right) {
            (Cell::Missing, _) | (_, Cell::Missing) => left.compare(&right),
            _ => match order.direction {
                SortDirection::Ascending => left.compare(&right),
                SortDirection::Descending => right.compare(&left),
            },
        }
    });
    selected
}

/// Columns shown when none are configured: project, score, type, impact,
/// description, then every custom risk field.
pub fn default_columns(settings: &AppSettings) -> Vec<RiskColumn> {
    let mut columns = vec![
        RiskColumn::Project,
        RiskColumn::Score,
        RiskColumn::Type,
        RiskColumn::Impact,
        RiskColumn::Description,
    ];
    columns.extend(
        settings
            .risk_custom_fields()
            .iter()
            .map(|field| RiskColumn::Custom(field.id.clone())),
    );
    columns
}

/// Parses configured column keys, skipping unknown ones. An empty list
/// selects [`default_columns`].
pub fn resolve_columns(keys: &[String], settings: &AppSettings) -> Vec<RiskColumn> {
    if keys.is_empty() {
        return default_columns(settings);
    }
    keys.iter()
        .filter_map(|key| match key.parse::<RiskColumn>() {
            Ok(column) => Some(column),
            Err(err) => {
                crate::log_warn!("ignoring register column: {}", err);
                None
            }
        })
        .collect()
}

/// CSV document with a header row of column labels. Every cell is quoted;
/// embedded quotes are doubled.
pub fn to_csv(
    risks: &[&EnrichedRisk],
    columns: &[RiskColumn],
    settings: &AppSettings,
) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(vec![]);

    writer.write_record(columns.iter().map(|column| column.label(settings)))?;
    for risk in risks {
        writer.write_record(columns.iter().map(|column| column.render(risk)))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| anyhow::anyhow!("CSV writer error: {err}"))?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}
