//! Worker Picker
//!
//! Workers placed with one employer, read through the placement relation.

use super::PageContext;
use crate::backend::{BackendResult, Select};
use crate::models::{Placement, Worker};

pub fn cache_key(employer_id: &str) -> String {
    format!("employer-workers:{}", employer_id)
}

pub fn query(employer_id: &str) -> Select {
    Select::from("worker_placements")
        .embed(None, "workers", &["id", "first_name", "surname"])
        .eq("employer_id", employer_id)
}

/// Workers for an employer, deduplicated and sorted by surname then first name
pub async fn fetch_workers(ctx: &PageContext, employer_id: &str) -> BackendResult<Vec<Worker>> {
    let client = &ctx.client;
    ctx.cached(&cache_key(employer_id), || async move {
        let placements: Vec<Placement> = client.fetch(&query(employer_id)).await?;
        Ok(collect_workers(placements))
    })
    .await
}

fn collect_workers(placements: Vec<Placement>) -> Vec<Worker> {
    let mut workers: Vec<Worker> = placements.into_iter().filter_map(|p| p.workers).collect();
    workers.sort_by(|a, b| {
        a.surname
            .cmp(&b.surname)
            .then_with(|| a.first_name.cmp(&b.first_name))
            .then_with(|| a.id.cmp(&b.id))
    });
    // A worker can hold more than one placement with the same employer
    workers.dedup_by(|a, b| a.id == b.id);
    workers
}

pub fn render(workers: &[Worker]) -> Vec<String> {
    workers.iter().map(Worker::display_name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::test_support::context_for;
    use httpmock::Method::GET;
    use httpmock::MockServer;
    use serde_json::json;

    #[test]
    fn test_query_shape() {
        assert_eq!(
            query("e1").to_query_string(),
            "select=workers(id,first_name,surname)&employer_id=eq.e1"
        );
        assert_eq!(cache_key("e1"), "employer-workers:e1");
    }

    #[tokio::test]
    async fn test_fetch_sorted_and_deduplicated() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/rest/v1/worker_placements")
                    .query_param("employer_id", "eq.e1");
                then.status(200).json_body(json!([
                    {"workers": {"id": "w2", "first_name": "Zoe", "surname": "Adams"}},
                    {"workers": {"id": "w1", "first_name": "Ana", "surname": "Lopez"}},
                    {"workers": null},
                    {"workers": {"id": "w3", "first_name": "Ben", "surname": "Adams"}},
                    {"workers": {"id": "w1", "first_name": "Ana", "surname": "Lopez"}}
                ]));
            })
            .await;

        let ctx = context_for(&server);
        let workers = fetch_workers(&ctx, "e1").await.unwrap();

        assert_eq!(render(&workers), vec!["Ben Adams", "Zoe Adams", "Ana Lopez"]);
    }
}
