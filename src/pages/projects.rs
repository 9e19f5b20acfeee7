//! Projects Page
//!
//! Projects with their contract value and primary job site.

use super::PageContext;
use crate::backend::{BackendResult, Select};
use crate::models::Project;

pub const CACHE_KEY: &str = "projects";

/// Shown when a project has no primary job site
pub const NO_SITE_TEXT: &str = "No site";

const COLUMNS: [&str; 4] = ["id", "name", "value", "main_job_site_id"];
const SITE_COLUMNS: [&str; 3] = ["id", "name", "full_address"];

fn base_query() -> Select {
    Select::from("projects")
        .columns(&COLUMNS)
        .embed(Some("main_job_site"), "job_sites", &SITE_COLUMNS)
}

/// The listing query
pub fn query() -> Select {
    base_query().order("name", true)
}

pub async fn fetch_projects(ctx: &PageContext) -> BackendResult<Vec<Project>> {
    let client = &ctx.client;
    ctx.cached(CACHE_KEY, || async move { client.fetch(&query()).await })
        .await
}

/// One project by id
pub async fn fetch_project(ctx: &PageContext, id: &str) -> BackendResult<Option<Project>> {
    let client = &ctx.client;
    let key = format!("project:{}", id);
    ctx.cached(&key, || async move {
        client.fetch_optional(base_query().eq("id", id)).await
    })
    .await
}

/// Primary job site name, or the fallback
pub fn site_label(project: &Project) -> &str {
    project
        .main_job_site
        .as_ref()
        .map(|site| site.name.as_str())
        .unwrap_or(NO_SITE_TEXT)
}

/// Whole-dollar value with thousands separators
pub fn format_value(value: Option<f64>) -> String {
    let Some(value) = value.filter(|v| v.is_finite()) else {
        return "-".to_string();
    };

    let whole = value.abs().round() as u64;
    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if value < 0.0 && whole > 0 {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}

pub fn render(projects: &[Project]) -> Vec<String> {
    projects
        .iter()
        .map(|p| format!("{} | {} | {}", p.name, format_value(p.value), site_label(p)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BackendError;
    use crate::models::JobSite;
    use crate::pages::test_support::context_for;
    use crate::pages::{LoadState, PageView};
    use crate::scope::ViewScope;
    use httpmock::Method::GET;
    use httpmock::MockServer;
    use serde_json::json;
    use std::time::Duration;

    fn project(name: &str, site: Option<&str>) -> Project {
        Project {
            id: name.to_lowercase(),
            name: name.to_string(),
            value: Some(1_500_000.0),
            main_job_site_id: site.map(|s| s.to_lowercase()),
            main_job_site: site.map(|s| JobSite {
                id: s.to_lowercase(),
                name: s.to_string(),
                full_address: None,
            }),
        }
    }

    #[test]
    fn test_query_shape() {
        assert_eq!(
            query().to_query_string(),
            "select=id,name,value,main_job_site_id,main_job_site:job_sites(id,name,full_address)&order=name.asc"
        );
    }

    #[test]
    fn test_site_fallback() {
        assert_eq!(site_label(&project("Depot", None)), "No site");
        assert_eq!(site_label(&project("Tower", Some("Pier 3"))), "Pier 3");
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(None), "-");
        assert_eq!(format_value(Some(f64::NAN)), "-");
        assert_eq!(format_value(Some(0.0)), "$0");
        assert_eq!(format_value(Some(999.0)), "$999");
        assert_eq!(format_value(Some(1000.0)), "$1,000");
        assert_eq!(format_value(Some(12_500_000.4)), "$12,500,000");
        assert_eq!(format_value(Some(-2500.0)), "-$2,500");
    }

    #[test]
    fn test_render() {
        let rows = render(&[project("Depot", None), project("Tower", Some("Pier 3"))]);
        assert_eq!(
            rows,
            vec!["Depot | $1,500,000 | No site", "Tower | $1,500,000 | Pier 3"]
        );
    }

    #[tokio::test]
    async fn test_fetch_projects_is_cached() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/rest/v1/projects")
                    .query_param("order", "name.asc");
                then.status(200).json_body(json!([
                    {"id": "p1", "name": "Depot", "value": null, "main_job_site_id": null, "main_job_site": null}
                ]));
            })
            .await;

        let ctx = context_for(&server);
        let first = fetch_projects(&ctx).await.unwrap();
        let second = fetch_projects(&ctx).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(render(&first), vec!["Depot | - | No site"]);
        assert_eq!(mock.hits_async().await, 1);
    }

    #[tokio::test]
    async fn test_fetch_single_project() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/rest/v1/projects")
                    .query_param("id", "eq.p7")
                    .query_param("limit", "1");
                then.status(200).json_body(json!([
                    {"id": "p7", "name": "Tower", "value": 2000000,
                     "main_job_site": {"id": "s1", "name": "Pier 3"}}
                ]));
            })
            .await;

        let ctx = context_for(&server);
        let project = fetch_project(&ctx, "p7").await.unwrap().unwrap();
        assert_eq!(site_label(&project), "Pier 3");
    }

    #[tokio::test]
    async fn test_slow_query_hits_deadline_and_is_not_cached() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/rest/v1/projects");
                then.status(200)
                    .delay(Duration::from_millis(800))
                    .json_body(json!([]));
            })
            .await;

        let mut ctx = context_for(&server);
        ctx.query_timeout_ms = 100;

        let mut view = PageView::new(ViewScope::new());
        view.load(fetch_projects(&ctx)).await;
        assert_eq!(
            view.state(),
            &LoadState::Failed("projects timed out after 100ms".to_string())
        );
        assert_eq!(ctx.cache.len().await, 0);

        let err = fetch_projects(&ctx).await.unwrap_err();
        assert!(matches!(err, BackendError::Timeout(ref t) if t.ms == 100));
        assert_eq!(ctx.cache.len().await, 0);
    }
}
