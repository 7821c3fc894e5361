//! JSON import and export of the whole portfolio.
//!
//! Import is forgiving: only unparsable JSON and a missing
//! `projects` array are errors. Everything else that is absent or malformed
//! is replaced by a default, usually with a warning in the log.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::dates::parse_calendar_date;
use crate::error::ImportError;
use crate::model::{Action, ActionPriority, AppData, FieldValue, Project, Risk, Stage, Task};
use crate::settings::AppSettings;

/// Project keys the importer rebuilds; any other key is carried through.
const NORMALIZED_PROJECT_KEYS: [&str; 15] = [
    "id",
    "name",
    "description",
    "stage",
    "priority",
    "technology",
    "vendor",
    "completionPercentage",
    "startDate",
    "deliveryDate",
    "status",
    "trend",
    "risks",
    "tasks",
    "actions",
];

/// Legacy stage names and their current stage. Only the listed spellings are
/// recognized.
const STAGE_NAMES: [(&str, Stage); 7] = [
    ("planning", Stage::Planning),
    ("poc", Stage::Poc),
    ("execution", Stage::Development),
    ("development", Stage::Development),
    ("testing", Stage::Testing),
    ("deployment", Stage::Deployment),
    ("completed", Stage::Completed),
];

/// Normalizes external JSON into [`AppData`].
///
/// `today` replaces missing dates and `id_seed` is the base for generated
/// ids (`id_seed + index`), so imports are reproducible in tests.
#[derive(Debug, Clone, Copy)]
pub struct Importer {
    today: NaiveDate,
    id_seed: i64,
}

impl Importer {
    pub fn new(today: NaiveDate, id_seed: i64) -> Self {
        Self { today, id_seed }
    }

    pub fn from_clock() -> Self {
        let now = Utc::now();
        Self::new(now.date_naive(), now.timestamp_millis())
    }

    pub fn import(&self, json_text: &str) -> Result<AppData, ImportError> {
        let span = tracing::info_span!("import");
        let _entered = span.enter();

        let parsed: Value = serde_json::from_str(json_text)?;
        let source = locate_source(&parsed)
            .ok_or_else(|| ImportError::validation("\"projects\" array not found."))?;
        let raw_projects = source
            .get("projects")
            .and_then(Value::as_array)
            .ok_or_else(|| ImportError::validation("\"projects\" array not found."))?;

        let projects: Vec<Project> = raw_projects
            .iter()
            .enumerate()
            .map(|(index, raw)| self.project(raw, index))
            .collect();

        let data = AppData {
            projects,
            settings: merge_settings(source.get("settings")),
            timeline_events: records(source, "timelineEvents"),
            stakeholders: records(source, "stakeholders"),
            weekly_tasks: records(source, "weeklyTasks"),
        };

        crate::log_info!(
            projects = data.projects.len(),
            events = data.timeline_events.len(),
            stakeholders = data.stakeholders.len(),
            weekly_tasks = data.weekly_tasks.len(),
            "import complete"
        );
        Ok(data)
    }

    fn project(&self, raw: &Value, index: usize) -> Project {
        let empty = Map::new();
        let fields = raw.as_object().unwrap_or(&empty);
        let generated = self.generated_id(index);

        let risks = array(fields, "risks")
            .enumerate()
            .map(|(i, r)| self.risk(r, i))
            .collect();
        let tasks = array(fields, "tasks")
            .enumerate()
            .map(|(i, t)| self.task(t, i))
            .collect();
        let actions = array(fields, "actions")
            .enumerate()
            .map(|(i, a)| self.action(a, i))
            .collect();

        let extra = fields
            .iter()
            .filter(|(key, _)| !NORMALIZED_PROJECT_KEYS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Project {
            id: normalize_id(fields.get("id"), generated),
            name: text(fields, "name").unwrap_or_else(|| format!("Unnamed Project {}", index + 1)),
            description: text(fields, "description").unwrap_or_default(),
            stage: stage(text(fields, "stage")),
            priority: label(text(fields, "priority"), "priority"),
            technology: text(fields, "technology").unwrap_or_else(|| "N/A".to_string()),
            vendor: text(fields, "vendor").unwrap_or_else(|| "N/A".to_string()),
            completion_percentage: number(fields, "completionPercentage").unwrap_or(0.0),
            start_date: self.date(fields, "startDate"),
            delivery_date: self.date(fields, "deliveryDate"),
            status: label(text(fields, "status"), "status"),
            trend: label(text(fields, "trend"), "trend"),
            risks,
            tasks,
            actions,
            extra,
        }
    }

    fn risk(&self, raw: &Value, index: usize) -> Risk {
        let empty = Map::new();
        let fields = raw.as_object().unwrap_or(&empty);
        Risk {
            id: normalize_id(fields.get("id"), self.generated_id(index)),
            risk_type: label(text(fields, "type"), "risk type"),
            impact: label(text(fields, "impact"), "risk impact"),
            description: text(fields, "description").unwrap_or_else(|| "No description".to_string()),
            owner: text(fields, "owner").unwrap_or_else(|| "N/A".to_string()),
            mitigation: text(fields, "mitigation").unwrap_or_else(|| "N/A".to_string()),
            is_visible_on_dashboard: fields
                .get("isVisibleOnDashboard")
                .and_then(Value::as_bool)
                .unwrap_or(true),
            custom_fields: custom_fields(fields.get("customFields")),
        }
    }

    fn task(&self, raw: &Value, index: usize) -> Task {
        let empty = Map::new();
        let fields = raw.as_object().unwrap_or(&empty);
        let is_completed = match fields.get("isCompleted") {
            Some(Value::Bool(done)) => *done,
            _ => fields
                .get("completed")
                .and_then(Value::as_bool)
                .unwrap_or(false),
        };
        Task {
            id: normalize_id(fields.get("id"), self.generated_id(index)),
            description: text(fields, "description")
                .or_else(|| text(fields, "text"))
                .unwrap_or_else(|| "No description".to_string()),
            is_completed,
        }
    }

    fn action(&self, raw: &Value, index: usize) -> Action {
        let empty = Map::new();
        let fields = raw.as_object().unwrap_or(&empty);
        Action {
            id: normalize_id(fields.get("id"), self.generated_id(index)),
            priority: label::<ActionPriority>(
                text(fields, "priority").or_else(|| text(fields, "type")),
                "action priority",
            ),
            description: text(fields, "description").unwrap_or_else(|| "No description".to_string()),
        }
    }

    fn date(&self, fields: &Map<String, Value>, key: &str) -> NaiveDate {
        let parsed = match fields.get(key) {
            None | Some(Value::Null) => return self.today,
            Some(Value::String(s)) if s.trim().is_empty() => return self.today,
            Some(Value::String(s)) => parse_calendar_date(s),
            Some(Value::Number(n)) => n
                .as_i64()
                .and_then(DateTime::from_timestamp_millis)
                .map(|stamp| stamp.date_naive()),
            Some(_) => None,
        };
        parsed.unwrap_or_else(|| {
            let raw = &fields[key];
            crate::log_warn!(field = key, value = %raw, "unreadable date, using today");
            self.today
        })
    }

    fn generated_id(&self, index: usize) -> i64 {
        self.id_seed + index as i64
    }
}

/// Imports `json_text` using the wall clock for defaulted dates and ids.
pub fn import_data(json_text: &str) -> Result<AppData, ImportError> {
    Importer::from_clock().import(json_text)
}

/// Pretty-printed JSON accepted back by [`import_data`].
pub fn export_data(data: &AppData) -> serde_json::Result<String> {
    serde_json::to_string_pretty(data)
}

pub fn export_file_name(date: NaiveDate) -> String {
    format!("ppm-export-{}.json", date.format("%Y-%m-%d"))
}

/// Reads and normalizes a data file.
pub fn load_data<P: AsRef<Path>>(path: P) -> Result<AppData> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read data file: {}", path.display()))?;
    let data = import_data(&contents)
        .with_context(|| format!("Failed to import data file: {}", path.display()))?;
    Ok(data)
}

/// Writes `data` as an export document, replacing the file.
pub fn save_data<P: AsRef<Path>>(data: &AppData, path: P) -> Result<()> {
    let path = path.as_ref();
    let contents = export_data(data).context("Failed to serialize portfolio data")?;
    std::fs::write(path, contents)
        .with_context(|| format!("Failed to write data file: {}", path.display()))?;
    Ok(())
}

/// The object holding `projects`: the document itself, or its `data` member.
fn locate_source(parsed: &Value) -> Option<&Value> {
    match parsed.get("projects") {
        Some(projects) if !projects.is_null() => Some(parsed),
        _ => parsed.get("data"),
    }
}

fn array<'a>(fields: &'a Map<String, Value>, key: &str) -> impl Iterator<Item = &'a Value> {
    fields
        .get(key)
        .and_then(Value::as_array)
        .map(|items| items.iter())
        .into_iter()
        .flatten()
}

/// Non-empty text, with numbers and booleans rendered as text.
fn text(fields: &Map<String, Value>, key: &str) -> Option<String> {
    match fields.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn number(fields: &Map<String, Value>, key: &str) -> Option<f64> {
    match fields.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

fn title_case(raw: &str) -> String {
    let mut chars = raw.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Title-cases `raw` and parses it; absent or unknown values take the
/// enum's default.
fn label<T>(raw: Option<String>, field: &str) -> T
where
    T: FromStr + Default + Display,
{
    let Some(raw) = raw else {
        return T::default();
    };
    title_case(&raw).parse().unwrap_or_else(|_| {
        let fallback = T::default();
        crate::log_warn!(field, value = %raw, fallback = %fallback, "unrecognized value");
        fallback
    })
}

fn stage(raw: Option<String>) -> Stage {
    let Some(raw) = raw else {
        return Stage::default();
    };
    let lowered = raw.to_lowercase();
    STAGE_NAMES
        .iter()
        .find(|(name, _)| *name == lowered)
        .map(|(_, stage)| *stage)
        .unwrap_or_else(|| {
            crate::log_warn!(value = %raw, "unrecognized stage, using Planning");
            Stage::default()
        })
}

/// Numbers are kept, strings keep only their digits; zero, empty and other
/// values take `fallback`.
fn normalize_id(value: Option<&Value>, fallback: i64) -> i64 {
    let id = match value {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Some(Value::String(s)) => {
            let digits: String = s.chars().filter(char::is_ascii_digit).collect();
            digits.parse().ok()
        }
        _ => None,
    };
    id.filter(|&id| id != 0).unwrap_or(fallback)
}

fn custom_fields(value: Option<&Value>) -> Option<BTreeMap<String, FieldValue>> {
    let object = value?.as_object()?;
    let fields: BTreeMap<String, FieldValue> = object
        .iter()
        .filter_map(|(key, value)| FieldValue::from_json(value).map(|v| (key.clone(), v)))
        .collect();
    (!fields.is_empty()).then_some(fields)
}

/// Overlays imported settings on the defaults one top-level key at a time.
/// A key whose value does not fit the settings shape is dropped.
fn merge_settings(imported: Option<&Value>) -> AppSettings {
    let overrides = match imported {
        None | Some(Value::Null) => return AppSettings::default(),
        Some(Value::Object(overrides)) => overrides,
        Some(other) => {
            crate::log_warn!(value = %other, "settings is not an object, using defaults");
            return AppSettings::default();
        }
    };

    let mut merged = match serde_json::to_value(AppSettings::default()) {
        Ok(Value::Object(defaults)) => defaults,
        _ => return AppSettings::default(),
    };

    for (key, value) in overrides {
        let previous = merged.insert(key.clone(), value.clone());
        if let Err(err) = serde_json::from_value::<AppSettings>(Value::Object(merged.clone())) {
            crate::log_warn!(key = %key, "dropping imported setting: {}", err);
            match previous {
                Some(previous) => merged.insert(key.clone(), previous),
                None => merged.remove(key),
            };
        }
    }

    serde_json::from_value(Value::Object(merged)).unwrap_or_default()
}

/// Reads each element of the array under `key` with [`lenient_record`].
fn records<T: DeserializeOwned>(source: &Value, key: &str) -> Vec<T> {
    let items = match source.get(key) {
        None | Some(Value::Null) => return Vec::new(),
        Some(Value::Array(items)) => items,
        Some(_) => {
            crate::log_warn!(key, "expected an array, ignoring");
            return Vec::new();
        }
    };
    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| lenient_record(item, key, index))
        .collect()
}

/// Rebuilds an object record one key at a time. Nulls take the field default,
/// scalars of the wrong kind are coerced, and a value that still does not fit
/// is dropped with a warning. Only elements that are not objects are rejected.
fn lenient_record<T: DeserializeOwned>(item: &Value, key: &str, index: usize) -> Option<T> {
    let Some(fields) = item.as_object() else {
        crate::log_warn!(key, index, "dropping record that is not an object");
        return None;
    };

    let mut kept = Map::new();
    for (name, value) in fields.iter().filter(|(_, value)| !value.is_null()) {
        let mut accepted = false;
        for candidate in coercions(value) {
            kept.insert(name.clone(), candidate);
            if fits::<T>(&kept) {
                accepted = true;
                break;
            }
        }
        if !accepted {
            kept.remove(name);
            crate::log_warn!(key, index, field = %name, value = %value, "dropping unreadable field");
        }
    }

    match serde_json::from_value(Value::Object(kept)) {
        Ok(record) => Some(record),
        Err(err) => {
            crate::log_warn!(key, index, "dropping malformed record: {}", err);
            None
        }
    }
}

fn fits<T: DeserializeOwned>(fields: &Map<String, Value>) -> bool {
    serde_json::from_value::<T>(Value::Object(fields.clone())).is_ok()
}

/// `value` itself, then the scalar conversions worth trying when it does not
/// fit: numbers and booleans as text, numeric or boolean text as its value.
fn coercions(value: &Value) -> Vec<Value> {
    let mut candidates = vec![value.clone()];
    match value {
        Value::Number(n) => candidates.push(Value::String(n.to_string())),
        Value::Bool(b) => candidates.push(Value::String(b.to_string())),
        Value::String(s) => {
            let trimmed = s.trim();
            if let Ok(int) = trimmed.parse::<i64>() {
                candidates.push(Value::from(int));
            } else if let Some(float) = trimmed
                .parse::<f64>()
                .ok()
                .filter(|float| float.is_finite())
                .and_then(serde_json::Number::from_f64)
            {
                candidates.push(Value::Number(float));
            }
            if let Ok(flag) = trimmed.parse::<bool>() {
                candidates.push(Value::Bool(flag));
            }
        }
        _ => {}
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RiskLevel, Status, Trend};
    use serde_json::json;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn importer() -> Importer {
        Importer::new(ymd(2025, 3, 14), 1_000)
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = importer().import("{ \"projects\": [").unwrap_err();
        assert!(err.is_parse(), "got {err:?}");
        assert!(err.to_string().starts_with("Failed to parse JSON file:"));
    }

    #[test]
    fn missing_projects_is_a_validation_error() {
        for payload in [
            r#"{ "settings": {} }"#,
            r#"{ "data": { "projects": "nope" } }"#,
            r#"{ "projects": null }"#,
            r#"[1, 2, 3]"#,
        ] {
            let err = importer().import(payload).unwrap_err();
            assert!(err.is_validation(), "payload {payload} gave {err:?}");
            assert!(err.to_string().contains("\"projects\" array not found"));
        }
    }

    #[test]
    fn empty_projects_array_is_accepted() {
        let data = importer().import(r#"{ "projects": [] }"#).unwrap();
        assert!(data.projects.is_empty());
        assert_eq!(data.settings, AppSettings::default());
        assert!(data.timeline_events.is_empty());
        assert!(data.stakeholders.is_empty());
        assert!(data.weekly_tasks.is_empty());
    }

    #[test]
    fn wrapped_shape_is_found() {
        let data = importer()
            .import(r#"{ "data": { "projects": [ { "name": "Atlas" } ] } }"#)
            .unwrap();
        assert_eq!(data.projects.len(), 1);
        assert_eq!(data.projects[0].name, "Atlas");
    }

    #[test]
    fn bare_project_takes_defaults() {
        let data = importer().import(r#"{ "projects": [ {}, { "name": "" } ] }"#).unwrap();
        let first = &data.projects[0];
        assert_eq!(first.id, 1_000);
        assert_eq!(first.name, "Unnamed Project 1");
        assert_eq!(data.projects[1].name, "Unnamed Project 2");
        assert_eq!(data.projects[1].id, 1_001);
        assert_eq!(first.description, "");
        assert_eq!(first.stage, Stage::Planning);
        assert_eq!(first.priority, RiskLevel::Medium);
        assert_eq!(first.status, Status::Green);
        assert_eq!(first.trend, Trend::Stable);
        assert_eq!(first.technology, "N/A");
        assert_eq!(first.vendor, "N/A");
        assert_eq!(first.completion_percentage, 0.0);
        assert_eq!(first.start_date, ymd(2025, 3, 14));
        assert_eq!(first.delivery_date, ymd(2025, 3, 14));
        assert!(first.risks.is_empty() && first.tasks.is_empty() && first.actions.is_empty());
        assert!(first.extra.is_empty());
    }

    #[test]
    fn categorical_values_are_title_cased() {
        let payload = json!({ "projects": [ {
            "stage": "EXECUTION", "priority": "high", "status": "aMBER", "trend": "down"
        } ] });
        let data = importer().import(&payload.to_string()).unwrap();
        let project = &data.projects[0];
        assert_eq!(project.stage, Stage::Development);
        assert_eq!(project.priority, RiskLevel::High);
        assert_eq!(project.status, Status::Amber);
        assert_eq!(project.trend, Trend::Down);
    }

    #[test]
    fn stage_synonyms_are_limited() {
        let cases = [
            ("poc", Stage::Poc),
            ("Testing", Stage::Testing),
            ("completed", Stage::Completed),
            ("deployment", Stage::Deployment),
            ("in flight", Stage::Planning),
            ("build", Stage::Planning),
        ];
        for (raw, expected) in cases {
            let payload = json!({ "projects": [ { "stage": raw } ] });
            let data = importer().import(&payload.to_string()).unwrap();
            assert_eq!(data.projects[0].stage, expected, "stage {raw}");
        }
    }

    #[test]
    fn unknown_labels_fall_back_to_defaults() {
        let payload = json!({ "projects": [ {
            "priority": "extreme", "status": "purple", "trend": "sideways",
            "risks": [ { "type": "catastrophic", "impact": "tiny" } ]
        } ] });
        let data = importer().import(&payload.to_string()).unwrap();
        let project = &data.projects[0];
        assert_eq!(project.priority, RiskLevel::Medium);
        assert_eq!(project.status, Status::Green);
        assert_eq!(project.trend, Trend::Stable);
        assert_eq!(project.risks[0].risk_type, RiskLevel::Medium);
        assert_eq!(project.risks[0].impact, RiskLevel::Medium);
    }

    #[test]
    fn dates_are_normalized() {
        let payload = json!({ "projects": [ {
            "startDate": "2025-01-10T15:45:00.000Z",
            "deliveryDate": "someday"
        }, {
            "startDate": 1736467200000_i64,
            "deliveryDate": "2025-02-01"
        } ] });
        let data = importer().import(&payload.to_string()).unwrap();
        assert_eq!(data.projects[0].start_date, ymd(2025, 1, 10));
        assert_eq!(data.projects[0].delivery_date, ymd(2025, 3, 14));
        assert_eq!(data.projects[1].start_date, ymd(2025, 1, 10));
        assert_eq!(data.projects[1].delivery_date, ymd(2025, 2, 1));
    }

    #[test]
    fn ids_are_kept_or_reduced_to_digits() {
        let payload = json!({ "projects": [
            { "id": 42 }, { "id": "PRJ-0107" }, { "id": "none" }, { "id": 0 }
        ] });
        let data = importer().import(&payload.to_string()).unwrap();
        let ids: Vec<i64> = data.projects.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![42, 107, 1_002, 1_003]);
    }

    #[test]
    fn nested_records_take_defaults() {
        let payload = json!({ "projects": [ {
            "risks": [ { "type": "critical", "impact": "LOW", "isVisibleOnDashboard": false }, {} ],
            "tasks": [
                { "text": "legacy text", "completed": true },
                { "description": "new", "isCompleted": false, "completed": true },
                {}
            ],
            "actions": [ { "type": "urgent" }, { "priority": "low", "description": "ping" }, {} ]
        } ] });
        let data = importer().import(&payload.to_string()).unwrap();
        let project = &data.projects[0];

        let risk = &project.risks[0];
        assert_eq!(risk.risk_type, RiskLevel::Critical);
        assert_eq!(risk.impact, RiskLevel::Low);
        assert!(!risk.is_visible_on_dashboard);
        assert_eq!(risk.description, "No description");
        assert_eq!(risk.owner, "N/A");
        assert_eq!(risk.mitigation, "N/A");
        assert!(project.risks[1].is_visible_on_dashboard);
        assert_eq!(project.risks[1].risk_type, RiskLevel::Medium);

        assert_eq!(project.tasks[0].description, "legacy text");
        assert!(project.tasks[0].is_completed);
        assert!(!project.tasks[1].is_completed);
        assert_eq!(project.tasks[2].description, "No description");
        assert!(!project.tasks[2].is_completed);

        assert_eq!(project.actions[0].priority, ActionPriority::Urgent);
        assert_eq!(project.actions[1].priority, ActionPriority::Low);
        assert_eq!(project.actions[1].description, "ping");
        assert_eq!(project.actions[2].priority, ActionPriority::High);
        assert_eq!(project.actions[2].description, "No description");
    }

    #[test]
    fn unknown_project_fields_pass_through() {
        let payload = json!({ "projects": [ {
            "name": "Phoenix", "budget": 250000, "ownerId": 3,
            "roiVisibility": { "percentage": true, "analysisNotes": false }
        } ] });
        let data = importer().import(&payload.to_string()).unwrap();
        let project = &data.projects[0];
        assert_eq!(project.extra.get("budget"), Some(&json!(250000)));
        assert_eq!(project.extra.get("ownerId"), Some(&json!(3)));
        assert_eq!(project.extra["roiVisibility"]["analysisNotes"], json!(false));
        assert!(!project.extra.contains_key("name"));
    }

    #[test]
    fn normalized_fields_win_over_raw_ones() {
        let payload = json!({ "projects": [ { "status": "red", "stage": "execution" } ] });
        let data = importer().import(&payload.to_string()).unwrap();
        let exported = serde_json::to_value(&data.projects[0]).unwrap();
        assert_eq!(exported["status"], json!("Red"));
        assert_eq!(exported["stage"], json!("Development"));
    }

    #[test]
    fn risk_custom_fields_keep_scalars() {
        let payload = json!({ "projects": [ { "risks": [ {
            "customFields": { "financialImpact": 5000, "complianceCategory": "SOX", "nested": { "a": 1 } }
        } ] } ] });
        let data = importer().import(&payload.to_string()).unwrap();
        let fields = data.projects[0].risks[0].custom_fields.as_ref().unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields["complianceCategory"], FieldValue::Text("SOX".to_string()));
    }

    #[test]
    fn settings_merge_key_by_key() {
        let payload = json!({
            "projects": [],
            "settings": {
                "appName": "Imported PPM",
                "riskScoring": { "weights": { "type": 2.0, "impact": 1.0 } },
                "smtpSettings": "not an object",
                "theme": "dark"
            }
        });
        let data = importer().import(&payload.to_string()).unwrap();
        let settings = &data.settings;
        assert_eq!(settings.app_name, "Imported PPM");
        assert_eq!(settings.header_subtitle, AppSettings::default().header_subtitle);
        let scoring = settings.risk_scoring.as_ref().unwrap();
        assert_eq!(scoring.weights.as_ref().unwrap().risk_type, 2.0);
        assert!(scoring.mappings.is_none(), "shallow merge must not fill mappings");
        assert_eq!(settings.smtp_settings, AppSettings::default().smtp_settings);
        assert_eq!(settings.extra.get("theme"), Some(&json!("dark")));
    }

    #[test]
    fn side_lists_drop_non_object_records() {
        let payload = json!({
            "projects": [],
            "timelineEvents": [
                { "id": 1, "name": "Freeze", "type": "Code Freeze", "startDate": "2025-12-20", "endDate": "2026-01-05" },
                "garbage"
            ],
            "stakeholders": [ { "id": 1, "name": "Dana", "role": "Sponsor", "projectId": 4, "influence": "High" } ],
            "weeklyTasks": [ { "id": 9, "description": "Prep", "weekStartDate": "2025-03-10", "status": "To Do", "ownerId": 1 } ]
        });
        let data = importer().import(&payload.to_string()).unwrap();
        assert_eq!(data.timeline_events.len(), 1);
        assert_eq!(data.timeline_events[0].end_date.as_deref(), Some("2026-01-05"));
        assert_eq!(data.stakeholders[0].project_id, Some(4));
        assert_eq!(data.weekly_tasks[0].owner_id, Some(1));
    }

    #[test]
    fn side_list_records_survive_nulls_and_loose_types() {
        let payload = json!({
            "projects": [],
            "timelineEvents": [
                { "id": 1, "name": null, "type": "Audit", "startDate": "2025-05-01", "color": "#FF0000" },
                { "id": "2", "name": "Go-live", "type": 3, "startDate": null }
            ],
            "stakeholders": [
                { "id": 4, "name": "Dana", "influence": null, "projectId": "12", "phone": "555-0100" }
            ],
            "weeklyTasks": [
                { "id": 9, "description": "Prep", "ownerId": "7", "status": null, "projectId": [1] }
            ]
        });
        let data = importer().import(&payload.to_string()).unwrap();

        assert_eq!(data.timeline_events.len(), 2);
        let audit = &data.timeline_events[0];
        assert_eq!(audit.name, "");
        assert_eq!(audit.extra.get("color"), Some(&json!("#FF0000")));
        let go_live = &data.timeline_events[1];
        assert_eq!(go_live.id, 2);
        assert_eq!(go_live.event_type, "3");
        assert_eq!(go_live.start_date, None);

        assert_eq!(data.stakeholders.len(), 1);
        assert_eq!(data.stakeholders[0].influence, "");
        assert_eq!(data.stakeholders[0].project_id, Some(12));
        assert_eq!(data.stakeholders[0].extra.get("phone"), Some(&json!("555-0100")));

        assert_eq!(data.weekly_tasks.len(), 1);
        assert_eq!(data.weekly_tasks[0].owner_id, Some(7));
        assert_eq!(data.weekly_tasks[0].project_id, None);
        assert_eq!(data.weekly_tasks[0].description, "Prep");

        let exported: Value = serde_json::from_str(&export_data(&data).unwrap()).unwrap();
        assert_eq!(exported["timelineEvents"][0]["color"], json!("#FF0000"));
        assert_eq!(exported["stakeholders"][0]["phone"], json!("555-0100"));
    }

    #[test]
    fn non_finite_completion_is_ignored() {
        let payload = json!({ "projects": [
            { "completionPercentage": "NaN" },
            { "completionPercentage": "inf" },
            { "completionPercentage": " 42.5 " }
        ] });
        let data = importer().import(&payload.to_string()).unwrap();
        let completion: Vec<f64> = data.projects.iter().map(|p| p.completion_percentage).collect();
        assert_eq!(completion, vec![0.0, 0.0, 42.5]);

        let second = importer().import(&export_data(&data).unwrap()).unwrap();
        assert_eq!(second.projects, data.projects);
    }

    #[test]
    fn export_then_import_is_idempotent() {
        let payload = json!({ "data": { "projects": [
            {
                "id": "P-12", "name": "Phoenix", "stage": "execution", "priority": "critical",
                "status": "amber", "trend": "up", "startDate": "2025-01-10T08:00:00Z",
                "deliveryDate": "2025-06-30", "budget": 1000,
                "risks": [ { "id": 1, "type": "high", "impact": "medium" }, { "type": "low" } ],
                "tasks": [ { "text": "kickoff", "completed": true } ],
                "actions": [ { "type": "urgent", "description": "escalate" } ]
            },
            { "name": "Atlas" }
        ] } });
        let first = importer().import(&payload.to_string()).unwrap();
        let exported = export_data(&first).unwrap();
        let second = Importer::new(ymd(2030, 1, 1), 9_000).import(&exported).unwrap();

        assert_eq!(first.projects.len(), second.projects.len());
        for (a, b) in first.projects.iter().zip(&second.projects) {
            assert_eq!(a.name, b.name);
            assert_eq!(a.stage, b.stage);
            assert_eq!(a.priority, b.priority);
            assert_eq!(a.status, b.status);
            assert_eq!(a.trend, b.trend);
            assert_eq!(a.risks.len(), b.risks.len());
            assert_eq!(a.tasks.len(), b.tasks.len());
            assert_eq!(a.actions.len(), b.actions.len());
        }
        assert_eq!(first, second);
    }

    #[test]
    fn export_is_two_space_indented() {
        let exported = export_data(&AppData::default()).unwrap();
        assert!(exported.starts_with("{\n  \"projects\": []"), "got {exported}");
    }

    #[test]
    fn export_file_name_uses_date() {
        assert_eq!(export_file_name(ymd(2025, 7, 4)), "ppm-export-2025-07-04.json");
    }

    #[test]
    fn data_files_round_trip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ppm-data.json");
        let data = importer()
            .import(r#"{ "projects": [ { "id": 5, "name": "Disk", "startDate": "2025-01-01", "deliveryDate": "2025-02-01" } ] }"#)
            .unwrap();

        save_data(&data, &path).unwrap();
        let loaded = load_data(&path).unwrap();
        assert_eq!(loaded.projects, data.projects);
        assert!(load_data(dir.path().join("missing.json")).is_err());
    }
}
