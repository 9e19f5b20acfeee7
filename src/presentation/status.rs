//! Site Visit Status Summary
//!
//! One-line summaries of where a site visit stands, and per-status counts.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use crate::models::SiteVisit;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Known site visit status codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisitStatus {
    Scheduled,
    InProgress,
    Completed,
    Other(String),
}

impl VisitStatus {
    pub fn parse(code: &str) -> Self {
        match code {
            "scheduled" => VisitStatus::Scheduled,
            "in_progress" => VisitStatus::InProgress,
            "completed" => VisitStatus::Completed,
            other => VisitStatus::Other(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            VisitStatus::Scheduled => "Scheduled",
            VisitStatus::InProgress => "In progress",
            VisitStatus::Completed => "Completed",
            VisitStatus::Other(code) => code,
        }
    }
}

fn stamp(ts: &DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Summarize a visit using the timestamp that matches its status
pub fn summarize(visit: &SiteVisit) -> String {
    let status = VisitStatus::parse(&visit.status);

    let detail = match &status {
        VisitStatus::Scheduled => visit.scheduled_at.as_ref().map(|t| format!("for {}", stamp(t))),
        VisitStatus::InProgress => visit.started_at.as_ref().map(|t| format!("since {}", stamp(t))),
        VisitStatus::Completed => visit.completed_at.as_ref().map(|t| format!("at {}", stamp(t))),
        VisitStatus::Other(_) => None,
    };

    match detail {
        Some(detail) => format!("{} {}", status.label(), detail),
        None => status.label().to_string(),
    }
}

/// Number of visits per status label
pub fn status_counts(visits: &[SiteVisit]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for visit in visits {
        let label = VisitStatus::parse(&visit.status).label().to_string();
        *counts.entry(label).or_insert(0) += 1;
    }
    counts
}
