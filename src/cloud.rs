use reqwest::StatusCode;
use serde::Deserialize;

use crate::error::{DashError, Result};
use crate::types::Stack;

/// Pagination metadata advertised by the inventory endpoint. Decoded but
/// unused by the reconciler; the inventory is treated as a single page.
#[derive(Debug, Clone, Deserialize)]
#[allow(dead_code)]
pub struct PaginatedResult {
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

#[derive(Debug, Deserialize)]
pub struct StacksResponse {
    pub stacks: Vec<Stack>,
    pub paginated_result: PaginatedResult,
}

/// Client for the stack inventory endpoint.
pub struct CloudClient {
    http: reqwest::Client,
    api_url: String,
}

impl std::fmt::Debug for CloudClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudClient")
            .field("api_url", &self.api_url)
            .finish_non_exhaustive()
    }
}

impl CloudClient {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: api_url.into(),
        }
    }

    /// Fetch the full inventory in one request and return it sorted
    /// descending by update time.
    pub async fn fetch_stacks(&self, token: &str) -> Result<Vec<Stack>> {
        tracing::debug!(url = %self.api_url, "fetching stacks");

        let response = self
            .http
            .get(&self.api_url)
            .bearer_auth(token)
            .header("User-Agent", "stackdash")
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(DashError::Auth(format!(
                    "inventory request rejected: {}",
                    response.status()
                )));
            }
            status if !status.is_success() => {
                return Err(DashError::Transport(format!(
                    "inventory request failed: {}",
                    status
                )));
            }
            _ => {}
        }

        let body: StacksResponse = response.json().await?;
        tracing::debug!(count = body.stacks.len(), "fetched stacks");

        let mut stacks = body.stacks;
        sort_stacks(&mut stacks);
        Ok(stacks)
    }
}

/// Strictly descending by `updated_at`. The sort is stable, so records
/// with equal timestamps keep their response order.
pub fn sort_stacks(stacks: &mut [Stack]) {
    stacks.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DeploymentStatus, DriftStatus, HealthStatus};
    use chrono::{TimeZone, Utc};

    fn stack(id: u64, updated: chrono::DateTime<Utc>) -> Stack {
        Stack {
            stack_id: id,
            repository: "github.com/acme/infra".to_string(),
            path: format!("/stacks/{}", id),
            default_branch: "main".to_string(),
            meta_id: format!("stack-{}", id),
            meta_name: format!("stack-{}", id),
            meta_description: String::new(),
            meta_tags: vec![],
            status: HealthStatus::Ok,
            created_at: updated,
            updated_at: updated,
            seen_at: updated,
            deployment_status: DeploymentStatus::Ok,
            drift_status: DriftStatus::Ok,
            draft: false,
        }
    }

    #[test]
    fn sorts_descending_by_updated_at() {
        let t = |h| Utc.with_ymd_and_hms(2024, 6, 1, h, 0, 0).unwrap();
        let mut stacks = vec![stack(1, t(8)), stack(2, t(12)), stack(3, t(10))];
        sort_stacks(&mut stacks);
        let ids: Vec<u64> = stacks.iter().map(|s| s.stack_id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn equal_timestamps_keep_response_order() {
        let t = |h| Utc.with_ymd_and_hms(2024, 6, 1, h, 0, 0).unwrap();
        let mut stacks = vec![
            stack(10, t(9)),
            stack(20, t(9)),
            stack(30, t(11)),
            stack(40, t(9)),
        ];
        sort_stacks(&mut stacks);
        let ids: Vec<u64> = stacks.iter().map(|s| s.stack_id).collect();
        assert_eq!(ids, vec![30, 10, 20, 40]);
    }

    #[test]
    fn decodes_inventory_response() {
        let body = r#"{
            "stacks": [{
                "stack_id": 7,
                "repository": "github.com/acme/infra",
                "path": "/prod/db",
                "default_branch": "main",
                "meta_id": "prod-db",
                "meta_name": "prod-db",
                "meta_description": "Production database",
                "meta_tags": ["prod", "db"],
                "status": "healthy",
                "created_at": "2024-01-01T00:00:00Z",
                "updated_at": "2024-06-01T10:00:00Z",
                "seen_at": "2024-06-01T10:05:00Z",
                "deployment_status": "pending",
                "drift_status": "drifted",
                "draft": false
            }],
            "paginated_result": {"total": 1, "page": 1, "per_page": 100}
        }"#;

        let response: StacksResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.stacks.len(), 1);
        assert_eq!(response.paginated_result.total, 1);
        let stack = &response.stacks[0];
        assert_eq!(stack.stack_id, 7);
        assert_eq!(stack.status, HealthStatus::Healthy);
        assert_eq!(stack.deployment_status, DeploymentStatus::Pending);
        assert_eq!(stack.drift_status, DriftStatus::Drifted);
    }
}
