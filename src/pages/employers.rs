//! Employers Page

use super::PageContext;
use crate::backend::{BackendResult, Select};
use crate::models::Employer;

pub const CACHE_KEY: &str = "employers";

pub fn query() -> Select {
    Select::from("employers")
        .columns(&["id", "name", "employer_type"])
        .order("name", true)
}

pub async fn fetch_employers(ctx: &PageContext) -> BackendResult<Vec<Employer>> {
    let client = &ctx.client;
    ctx.cached(CACHE_KEY, || async move { client.fetch(&query()).await })
        .await
}

/// Employer type as a label: `head_contractor` becomes `Head contractor`
pub fn type_label(employer: &Employer) -> String {
    let Some(kind) = employer.employer_type.as_deref().filter(|k| !k.is_empty()) else {
        return "Unknown".to_string();
    };

    let spaced = kind.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => "Unknown".to_string(),
    }
}

pub fn render(employers: &[Employer]) -> Vec<String> {
    employers
        .iter()
        .map(|e| format!("{} ({})", e.name, type_label(e)))
        .collect()
}
