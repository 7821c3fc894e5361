//! Schedule conflicts between project date ranges and timeline events.

use chrono::NaiveDate;

use crate::dates::parse_calendar_date;
use crate::model::{Project, TimelineEvent};

/// Closed date range of an event; a missing or unreadable end date makes the
/// event a single day. `None` when the start date is missing or unreadable.
pub fn event_span(event: &TimelineEvent) -> Option<(NaiveDate, NaiveDate)> {
    let start = event.start_date.as_deref().and_then(parse_calendar_date)?;
    let end = event
        .end_date
        .as_deref()
        .and_then(parse_calendar_date)
        .unwrap_or(start);
    Some((start, end))
}

/// Events whose range intersects `[start_date, delivery_date]`, boundaries
/// included, in their original order.
pub fn find_conflicts<'a>(project: &Project, events: &'a [TimelineEvent]) -> Vec<&'a TimelineEvent> {
    events
        .iter()
        .filter(|event| match event_span(event) {
            Some((start, end)) => {
                project.start_date.max(start) <= project.delivery_date.min(end)
            }
            None => {
                crate::log_debug!(event_id = event.id, "skipping event without a usable start date");
                false
            }
        })
        .collect()
}

/// A project together with the events overlapping its schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectConflicts<'a> {
    pub project: &'a Project,
    pub events: Vec<&'a TimelineEvent>,
}

/// Runs [`find_conflicts`] for each project, keeping only projects with at
/// least one conflict.
pub fn conflicts_by_project<'a>(
    projects: &'a [Project],
    events: &'a [TimelineEvent],
) -> Vec<ProjectConflicts<'a>> {
    projects
        .iter()
        .filter_map(|project| {
            let hits = find_conflicts(project, events);
            (!hits.is_empty()).then_some(ProjectConflicts {
                project,
                events: hits,
            })
        })
        .collect()
}
