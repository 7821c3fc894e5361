//! Admin-editable application settings, including the risk scoring weights.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::model::RiskLevel;

/// Per-level numeric values. Any level may be missing; lookups of a missing
/// level yield `None` and score as zero.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LevelMap {
    #[serde(rename = "Low", default, skip_serializing_if = "Option::is_none")]
    pub low: Option<f64>,
    #[serde(rename = "Medium", default, skip_serializing_if = "Option::is_none")]
    pub medium: Option<f64>,
    #[serde(rename = "High", default, skip_serializing_if = "Option::is_none")]
    pub high: Option<f64>,
    #[serde(rename = "Critical", default, skip_serializing_if = "Option::is_none")]
    pub critical: Option<f64>,
}

impl LevelMap {
    /// Low=1, Medium=2, High=3, Critical=4.
    pub fn linear() -> Self {
        Self {
            low: Some(1.0),
            medium: Some(2.0),
            high: Some(3.0),
            critical: Some(4.0),
        }
    }

    pub fn get(&self, level: RiskLevel) -> Option<f64> {
        *self.slot(level)
    }

    pub fn set(&mut self, level: RiskLevel, value: Option<f64>) {
        *self.slot_mut(level) = value;
    }

    fn slot(&self, level: RiskLevel) -> &Option<f64> {
        match level {
            RiskLevel::Low => &self.low,
            RiskLevel::Medium => &self.medium,
            RiskLevel::High => &self.high,
            RiskLevel::Critical => &self.critical,
        }
    }

    fn slot_mut(&mut self, level: RiskLevel) -> &mut Option<f64> {
        match level {
            RiskLevel::Low => &mut self.low,
            RiskLevel::Medium => &mut self.medium,
            RiskLevel::High => &mut self.high,
            RiskLevel::Critical => &mut self.critical,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    #[serde(rename = "type")]
    pub risk_type: f64,
    pub impact: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoringMappings {
    #[serde(rename = "type", default)]
    pub risk_type: LevelMap,
    #[serde(default)]
    pub impact: LevelMap,
}

/// Weights and level mappings feeding the risk score.
///
/// Both halves are optional because imported or hand-edited settings may
/// lack either; the scorer degrades to zero instead of failing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskScoringSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weights: Option<ScoringWeights>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mappings: Option<ScoringMappings>,
}

impl Default for RiskScoringSettings {
    fn default() -> Self {
        Self {
            weights: Some(ScoringWeights {
                risk_type: 1.5,
                impact: 1.0,
            }),
            mappings: Some(ScoringMappings {
                risk_type: LevelMap::linear(),
                impact: LevelMap::linear(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmtpSettings {
    pub enabled: bool,
    pub server: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
    pub from: String,
}

impl Default for SmtpSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            server: "smtp.example.com".to_string(),
            port: 587,
            user: "user@example.com".to_string(),
            pass: String::new(),
            from: "noreply@ppm.com".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiSettings {
    pub summarization_model: String,
    pub enrichment_model: String,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            summarization_model: "gemini-2.5-flash".to_string(),
            enrichment_model: "gemini-2.5-flash".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogSettings {
    pub log_project_updates: bool,
    pub log_project_additions: bool,
    pub log_email_sent: bool,
    pub log_slides_exported: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            log_project_updates: true,
            log_project_additions: true,
            log_email_sent: true,
            log_slides_exported: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomFieldType {
    Text,
    Number,
    Date,
    Select,
}

/// A user-defined risk column, e.g. `financialImpact` / "Financial Impact ($)".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomFieldDefinition {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: CustomFieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CustomFieldSettings {
    #[serde(default)]
    pub risks: Vec<CustomFieldDefinition>,
}

/// Global settings. Missing keys take the baseline values below; keys this
/// crate does not know about are preserved in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    pub app_name: String,
    pub app_logo: String,
    pub header_title: String,
    pub header_subtitle: String,
    pub app_version: String,
    pub color_primary: String,
    pub color_accent: String,
    pub color_success: String,
    pub color_warning: String,
    pub color_danger: String,
    pub chart_color1: String,
    pub chart_color2: String,
    pub chart_color3: String,
    pub chart_color4: String,
    pub chart_color5: String,
    pub risk_chart_color_low: String,
    pub risk_chart_color_medium: String,
    pub risk_chart_color_high: String,
    pub risk_chart_color_critical: String,
    pub risk_scoring: Option<RiskScoringSettings>,
    pub smtp_settings: SmtpSettings,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_fields: Option<CustomFieldSettings>,
    pub ai_settings: AiSettings,
    pub log_settings: LogSettings,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            app_name: "Enterprise PPM".to_string(),
            app_logo: String::new(),
            header_title: "Program Status Card".to_string(),
            header_subtitle: "Enterprise Project Portfolio Management".to_string(),
            app_version: "v2.2".to_string(),
            color_primary: "#106FB3".to_string(),
            color_accent: "#3EA5F1".to_string(),
            color_success: "#7CC966".to_string(),
            color_warning: "#FDBF2A".to_string(),
            color_danger: "#DC2626".to_string(),
            chart_color1: "#1480D0".to_string(),
            chart_color2: "#65B9F7".to_string(),
            chart_color3: "#074B79".to_string(),
            chart_color4: "#2090E2".to_string(),
            chart_color5: "#03274D".to_string(),
            risk_chart_color_low: "#3EA5F1".to_string(),
            risk_chart_color_medium: "#FDBF2A".to_string(),
            risk_chart_color_high: "#F97316".to_string(),
            risk_chart_color_critical: "#DC2626".to_string(),
            risk_scoring: Some(RiskScoringSettings::default()),
            smtp_settings: SmtpSettings::default(),
            custom_fields: Some(CustomFieldSettings {
                risks: vec![
                    CustomFieldDefinition {
                        id: "financialImpact".to_string(),
                        name: "Financial Impact ($)".to_string(),
                        field_type: CustomFieldType::Number,
                        options: None,
                    },
                    CustomFieldDefinition {
                        id: "complianceCategory".to_string(),
                        name: "Compliance Category".to_string(),
                        field_type: CustomFieldType::Select,
                        options: Some(
                            ["None", "SOX", "GDPR", "HIPAA"]
                                .iter()
                                .map(|s| s.to_string())
                                .collect(),
                        ),
                    },
                ],
            }),
            ai_settings: AiSettings::default(),
            log_settings: LogSettings::default(),
            extra: Map::new(),
        }
    }
}

impl AppSettings {
    pub fn risk_custom_fields(&self) -> &[CustomFieldDefinition] {
        self.custom_fields
            .as_ref()
            .map(|fields| fields.risks.as_slice())
            .unwrap_or_default()
    }
}
