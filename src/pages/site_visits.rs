//! Site Visits Page

use super::PageContext;
use crate::backend::{BackendResult, Select};
use crate::models::SiteVisit;
use crate::presentation::badge::{badge_color, badge_label};
use crate::presentation::status::{status_counts, summarize, VisitStatus};

pub const CACHE_KEY: &str = "site-visits";

pub fn query() -> Select {
    Select::from("site_visit")
        .columns(&[
            "id",
            "status",
            "scheduled_at",
            "started_at",
            "completed_at",
            "project_id",
        ])
        .order("scheduled_at", false)
}

pub async fn fetch_site_visits(ctx: &PageContext) -> BackendResult<Vec<SiteVisit>> {
    let client = &ctx.client;
    ctx.cached(CACHE_KEY, || async move { client.fetch(&query()).await })
        .await
}

/// Share of visits completed, as a percentage. `None` without visits.
pub fn completion_percentage(visits: &[SiteVisit]) -> Option<f64> {
    if visits.is_empty() {
        return None;
    }
    let completed = visits
        .iter()
        .filter(|v| VisitStatus::parse(&v.status) == VisitStatus::Completed)
        .count();
    Some(completed as f64 * 100.0 / visits.len() as f64)
}

/// One summary line per visit, then totals and a completion badge
pub fn render(visits: &[SiteVisit]) -> Vec<String> {
    let mut lines: Vec<String> = visits.iter().map(summarize).collect();

    if !visits.is_empty() {
        let totals = status_counts(visits)
            .into_iter()
            .map(|(label, count)| format!("{}: {}", label, count))
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(format!("Totals - {}", totals));

        let completion = completion_percentage(visits);
        lines.push(format!(
            "Completion - {} ({})",
            badge_label(completion),
            badge_color(completion).name()
        ));
    }

    lines
}
