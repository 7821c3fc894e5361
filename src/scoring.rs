//! Risk scoring and the scored risk projection used by the register views.

use serde::Serialize;

use crate::model::{Project, Risk, Stage, Status};
use crate::settings::AppSettings;

/// Why a score degraded to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoringWarning {
    /// `riskScoring`, its `weights`, or its `mappings` is absent.
    SettingsUndefined,
}

impl ScoringWarning {
    pub fn message(self) -> &'static str {
        match self {
            Self::SettingsUndefined => {
                "Risk scoring settings are not defined. Returning a score of 0."
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreOutcome {
    pub score: i64,
    pub warning: Option<ScoringWarning>,
}

/// Scores `risk` without logging; the warning is returned instead.
///
/// `round(type_weight * type_value + impact_weight * impact_value)`, where a
/// level missing from the mappings contributes 0 and ties round away from
/// zero.
pub fn score_risk(risk: &Risk, settings: &AppSettings) -> ScoreOutcome {
    let Some(scoring) = settings.risk_scoring.as_ref() else {
        return ScoreOutcome::degraded();
    };
    let (Some(weights), Some(mappings)) = (scoring.weights.as_ref(), scoring.mappings.as_ref())
    else {
        return ScoreOutcome::degraded();
    };

    let type_value = mappings.risk_type.get(risk.risk_type).unwrap_or(0.0);
    let impact_value = mappings.impact.get(risk.impact).unwrap_or(0.0);
    let raw = type_value * weights.risk_type + impact_value * weights.impact;

    ScoreOutcome {
        score: raw.round() as i64,
        warning: None,
    }
}

impl ScoreOutcome {
    fn degraded() -> Self {
        Self {
            score: 0,
            warning: Some(ScoringWarning::SettingsUndefined),
        }
    }
}

/// Scores `risk`, logging a warning when the settings cannot produce a score.
pub fn calculate_risk_score(risk: &Risk, settings: &AppSettings) -> i64 {
    let outcome = score_risk(risk, settings);
    if let Some(warning) = outcome.warning {
        crate::log_warn!(risk_id = risk.id, "{}", warning.message());
    }
    outcome.score
}

/// A risk joined with its parent project and its current score.
///
/// Only built for display and export; never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedRisk {
    #[serde(flatten)]
    pub risk: Risk,
    pub project_id: i64,
    pub project_name: String,
    pub project_stage: Stage,
    pub project_status: Status,
    pub score: i64,
}

/// Flattens every project's risks, scoring each against `settings`.
pub fn enrich_risks(projects: &[Project], settings: &AppSettings) -> Vec<EnrichedRisk> {
    projects
        .iter()
        .flat_map(|project| {
            project.risks.iter().map(move |risk| EnrichedRisk {
                risk: risk.clone(),
                project_id: project.id,
                project_name: project.name.clone(),
                project_stage: project.stage,
                project_status: project.status,
                score: calculate_risk_score(risk, settings),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::capture::capture_logs;
    use crate::model::RiskLevel;
    use chrono::NaiveDate;

    fn risk(risk_type: RiskLevel, impact: RiskLevel) -> Risk {
        Risk::new(1, risk_type, impact)
    }

    #[test]
    fn low_low_rounds_half_up() {
        let settings = AppSettings::default();
        assert_eq!(
            calculate_risk_score(&risk(RiskLevel::Low, RiskLevel::Low), &settings),
            3
        );
    }

    #[test]
    fn high_medium_rounds_half_up() {
        let settings = AppSettings::default();
        assert_eq!(
            calculate_risk_score(&risk(RiskLevel::High, RiskLevel::Medium), &settings),
            7
        );
    }

    #[test]
    fn critical_critical_is_ten() {
        let settings = AppSettings::default();
        assert_eq!(
            calculate_risk_score(&risk(RiskLevel::Critical, RiskLevel::Critical), &settings),
            10
        );
    }

    #[test]
    fn scoring_is_deterministic() {
        let settings = AppSettings::default();
        for &risk_type in RiskLevel::ALL {
            for &impact in RiskLevel::ALL {
                let r = risk(risk_type, impact);
                assert_eq!(score_risk(&r, &settings), score_risk(&r, &settings));
            }
        }
    }

    #[test]
    fn missing_settings_score_zero_and_warn() {
        let settings = AppSettings {
            risk_scoring: None,
            ..AppSettings::default()
        };
        let r = risk(RiskLevel::High, RiskLevel::High);

        let outcome = score_risk(&r, &settings);
        assert_eq!(outcome.score, 0);
        assert_eq!(outcome.warning, Some(ScoringWarning::SettingsUndefined));

        let (score, logs) = capture_logs(|| calculate_risk_score(&r, &settings));
        assert_eq!(score, 0);
        assert!(logs.contains("WARN"), "logs were: {logs:?}");
        assert!(
            logs.contains("Risk scoring settings are not defined. Returning a score of 0."),
            "logs were: {logs:?}"
        );
    }

    #[test]
    fn missing_weights_score_zero() {
        let mut settings = AppSettings::default();
        if let Some(scoring) = settings.risk_scoring.as_mut() {
            scoring.weights = None;
        }
        let outcome = score_risk(&risk(RiskLevel::Low, RiskLevel::Low), &settings);
        assert_eq!(outcome.score, 0);
        assert!(outcome.warning.is_some());
    }

    #[test]
    fn missing_level_mapping_contributes_zero() {
        let mut settings = AppSettings::default();
        if let Some(mappings) = settings
            .risk_scoring
            .as_mut()
            .and_then(|scoring| scoring.mappings.as_mut())
        {
            mappings.risk_type.set(RiskLevel::High, None);
        }
        let (score, logs) =
            capture_logs(|| calculate_risk_score(&risk(RiskLevel::High, RiskLevel::High), &settings));
        assert_eq!(score, 3);
        assert!(logs.is_empty(), "logs were: {logs:?}");
    }

    #[test]
    fn negative_ties_round_away_from_zero() {
        let mut settings = AppSettings::default();
        if let Some(weights) = settings
            .risk_scoring
            .as_mut()
            .and_then(|scoring| scoring.weights.as_mut())
        {
            weights.risk_type = -1.5;
            weights.impact = 0.0;
        }
        assert_eq!(
            calculate_risk_score(&risk(RiskLevel::Low, RiskLevel::Low), &settings),
            -2
        );
    }

    #[test]
    fn enrichment_joins_project_and_score() {
        let day = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
        let mut project = Project::new(42, "Phoenix", day, day);
        project.stage = Stage::Testing;
        project.status = Status::Amber;
        project.risks = vec![
            Risk::new(1, RiskLevel::Low, RiskLevel::Low),
            Risk::new(2, RiskLevel::Critical, RiskLevel::Critical),
        ];
        let empty = Project::new(43, "Atlas", day, day);

        let enriched = enrich_risks(&[project, empty], &AppSettings::default());
        assert_eq!(enriched.len(), 2);
        assert_eq!(enriched[0].project_id, 42);
        assert_eq!(enriched[0].project_name, "Phoenix");
        assert_eq!(enriched[0].project_stage, Stage::Testing);
        assert_eq!(enriched[0].project_status, Status::Amber);
        assert_eq!(enriched[0].score, 3);
        assert_eq!(enriched[1].score, 10);

        let json = serde_json::to_value(&enriched[1]).unwrap();
        assert_eq!(json["type"], "Critical");
        assert_eq!(json["projectName"], "Phoenix");
        assert_eq!(json["score"], 10);
    }
}
