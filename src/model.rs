//! Portfolio entities and their categorical enums.
//!
//! Field names serialize in camelCase so exported files stay readable by the
//! dashboard that produced them.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::UnknownLabel;
use crate::settings::AppSettings;

macro_rules! label_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $label)] $variant,)+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.pad(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownLabel;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($label => Ok($name::$variant),)+
                    other => Err(UnknownLabel {
                        kind: stringify!($name),
                        label: other.to_string(),
                    }),
                }
            }
        }
    };
}

label_enum! {
    /// Four-step scale shared by risk type, risk impact and project priority.
    RiskLevel {
        Low => "Low",
        Medium => "Medium",
        High => "High",
        Critical => "Critical",
    }
}

label_enum! {
    ActionPriority {
        Low => "Low",
        Medium => "Medium",
        High => "High",
        Urgent => "Urgent",
    }
}

label_enum! {
    Stage {
        Planning => "Planning",
        Poc => "POC",
        Development => "Development",
        Testing => "Testing",
        Deployment => "Deployment",
        Completed => "Completed",
    }
}

label_enum! {
    /// RAG health indicator.
    Status {
        Green => "Green",
        Amber => "Amber",
        Red => "Red",
    }
}

label_enum! {
    Trend {
        Up => "Up",
        Stable => "Stable",
        Down => "Down",
    }
}

impl Default for RiskLevel {
    fn default() -> Self {
        Self::Medium
    }
}

impl Default for ActionPriority {
    fn default() -> Self {
        Self::High
    }
}

impl Default for Stage {
    fn default() -> Self {
        Self::Planning
    }
}

impl Default for Status {
    fn default() -> Self {
        Self::Green
    }
}

impl Default for Trend {
    fn default() -> Self {
        Self::Stable
    }
}

/// Scalar value of a user-defined risk column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
}

impl FieldValue {
    /// Converts a JSON scalar; arrays, objects and null are rejected.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(Self::Bool(*b)),
            Value::Number(n) => Some(Self::Number(n.clone())),
            Value::String(s) => Some(Self::Text(s.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Risk {
    pub id: i64,
    #[serde(rename = "type")]
    pub risk_type: RiskLevel,
    pub impact: RiskLevel,
    pub description: String,
    pub owner: String,
    pub mitigation: String,
    pub is_visible_on_dashboard: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_fields: Option<BTreeMap<String, FieldValue>>,
}

impl Risk {
    pub fn new(id: i64, risk_type: RiskLevel, impact: RiskLevel) -> Self {
        Self {
            id,
            risk_type,
            impact,
            description: String::new(),
            owner: String::new(),
            mitigation: String::new(),
            is_visible_on_dashboard: true,
            custom_fields: None,
        }
    }

    pub fn custom_field(&self, key: &str) -> Option<&FieldValue> {
        self.custom_fields.as_ref().and_then(|fields| fields.get(key))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i64,
    pub description: String,
    pub is_completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    pub id: i64,
    pub priority: ActionPriority,
    pub description: String,
}

/// A tracked project with its owned risks, tasks and actions.
///
/// Fields this crate does not interpret (owner, cost and value metrics,
/// visibility flags) live in `extra` and serialize back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub stage: Stage,
    pub priority: RiskLevel,
    #[serde(default)]
    pub technology: String,
    #[serde(default)]
    pub vendor: String,
    #[serde(default)]
    pub completion_percentage: f64,
    pub start_date: NaiveDate,
    pub delivery_date: NaiveDate,
    pub status: Status,
    pub trend: Trend,
    #[serde(default)]
    pub risks: Vec<Risk>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub actions: Vec<Action>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Project {
    pub fn new(
        id: i64,
        name: impl Into<String>,
        start_date: NaiveDate,
        delivery_date: NaiveDate,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            stage: Stage::default(),
            priority: RiskLevel::default(),
            technology: "N/A".to_string(),
            vendor: "N/A".to_string(),
            completion_percentage: 0.0,
            start_date,
            delivery_date,
            status: Status::default(),
            trend: Trend::default(),
            risks: Vec::new(),
            tasks: Vec::new(),
            actions: Vec::new(),
            extra: Map::new(),
        }
    }

    pub fn open_tasks(&self) -> usize {
        self.tasks.iter().filter(|task| !task.is_completed).count()
    }
}

/// A portfolio-wide calendar entry (freeze, audit, go-live, ...).
///
/// Dates stay as text: a missing or malformed start date only means the
/// event never conflicts with anything.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimelineEvent {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Stakeholder {
    pub id: i64,
    pub name: String,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<i64>,
    pub engagement_level: String,
    pub influence: String,
    pub interest: String,
    pub communication_plan: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WeeklyTask {
    pub id: i64,
    pub description: String,
    pub week_start_date: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<i64>,
    pub priority: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Everything the dashboard exports and imports as one JSON document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppData {
    pub projects: Vec<Project>,
    #[serde(default)]
    pub settings: AppSettings,
    #[serde(default)]
    pub timeline_events: Vec<TimelineEvent>,
    #[serde(default)]
    pub stakeholders: Vec<Stakeholder>,
    #[serde(default)]
    pub weekly_tasks: Vec<WeeklyTask>,
}

impl AppData {
    pub fn project(&self, id: i64) -> Option<&Project> {
        self.projects.iter().find(|project| project.id == id)
    }

    /// Smallest id strictly greater than every project id in the set.
    pub fn next_project_id(&self) -> i64 {
        self.projects
            .iter()
            .map(|project| project.id)
            .max()
            .map_or(1, |max| max + 1)
    }
}
