//! Dashboard summary figures for a set of projects.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::{Project, RiskLevel, Status};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub total_projects: usize,
    pub status_counts: BTreeMap<Status, usize>,
    /// Share of Green projects, rounded to a whole percent.
    pub green_percentage: u32,
    pub at_risk_projects: usize,
    pub open_tasks: usize,
    /// Risks per type; types with no risks are left out.
    pub risk_distribution: BTreeMap<RiskLevel, usize>,
}

pub fn summarize(projects: &[Project]) -> PortfolioSummary {
    let mut status_counts = BTreeMap::new();
    let mut risk_distribution = BTreeMap::new();
    for project in projects {
        *status_counts.entry(project.status).or_insert(0) += 1;
        for risk in &project.risks {
            *risk_distribution.entry(risk.risk_type).or_insert(0) += 1;
        }
    }

    let total_projects = projects.len();
    let green = status_counts.get(&Status::Green).copied().unwrap_or(0);
    let green_percentage = if total_projects == 0 {
        0
    } else {
        (green as f64 / total_projects as f64 * 100.0).round() as u32
    };

    PortfolioSummary {
        total_projects,
        at_risk_projects: status_counts.get(&Status::Red).copied().unwrap_or(0),
        status_counts,
        green_percentage,
        open_tasks: projects.iter().map(Project::open_tasks).sum(),
        risk_distribution,
    }
}
