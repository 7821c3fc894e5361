//! Impact x type risk matrix with colour intensity scaling.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::{Risk, RiskLevel};

/// Risk counts keyed by impact, then by type. Every cell of the 4x4 grid is
/// present, zero or not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskHeatmap {
    pub grid: BTreeMap<RiskLevel, BTreeMap<RiskLevel, u32>>,
    pub max_count: u32,
}

impl Default for RiskHeatmap {
    fn default() -> Self {
        let row: BTreeMap<RiskLevel, u32> = RiskLevel::ALL.iter().map(|&level| (level, 0)).collect();
        Self {
            grid: RiskLevel::ALL.iter().map(|&level| (level, row.clone())).collect(),
            max_count: 0,
        }
    }
}

impl RiskHeatmap {
    pub fn count(&self, impact: RiskLevel, risk_type: RiskLevel) -> u32 {
        self.grid
            .get(&impact)
            .and_then(|row| row.get(&risk_type))
            .copied()
            .unwrap_or(0)
    }

    pub fn total(&self) -> u32 {
        self.grid.values().flat_map(|row| row.values()).sum()
    }

    fn record(&mut self, impact: RiskLevel, risk_type: RiskLevel) {
        if let Some(cell) = self
            .grid
            .get_mut(&impact)
            .and_then(|row| row.get_mut(&risk_type))
        {
            *cell += 1;
            self.max_count = self.max_count.max(*cell);
        }
    }

    /// Opacity for a cell: `None` for empty cells, 0.5 when the grid is
    /// empty, otherwise scaled linearly from 0.1 to 1.0 against `max_count`.
    pub fn intensity(&self, count: u32) -> Option<f64> {
        if count == 0 {
            return None;
        }
        if self.max_count == 0 {
            return Some(0.5);
        }
        Some(0.1 + 0.9 * (f64::from(count) / f64::from(self.max_count)))
    }

    /// CSS `rgba(...)` colour for a cell, using `base_hex` (`#RRGGBB`) at the
    /// cell's intensity. Empty cells and unreadable colours yield `None`.
    pub fn cell_color(&self, count: u32, base_hex: &str) -> Option<String> {
        let alpha = self.intensity(count)?;
        let (r, g, b) = parse_hex_color(base_hex)?;
        Some(format!("rgba({r}, {g}, {b}, {alpha})"))
    }
}

fn parse_hex_color(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).ok();
    Some((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

/// Counts risks per `(impact, type)` cell.
pub fn build_heatmap<'a>(risks: impl IntoIterator<Item = &'a Risk>) -> RiskHeatmap {
    let mut heatmap = RiskHeatmap::default();
    for risk in risks {
        heatmap.record(risk.impact, risk.risk_type);
    }
    heatmap
}

/// Counts raw `(impact, type)` labels; pairs where either label is not a
/// canonical level name are skipped.
pub fn tally_labels<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> RiskHeatmap {
    let mut heatmap = RiskHeatmap::default();
    for (impact, risk_type) in pairs {
        match (impact.parse::<RiskLevel>(), risk_type.parse::<RiskLevel>()) {
            (Ok(impact), Ok(risk_type)) => heatmap.record(impact, risk_type),
            _ => crate::log_debug!(impact, risk_type, "skipping unrecognized risk levels"),
        }
    }
    heatmap
}
