use octocrab::Octocrab;
use serde_json::{json, Value};

use crate::error::{DashError, Result};
use crate::types::{Issue, IssueBatch, IssueState, PageInfo};

const SEARCH_QUERY: &str = r#"
query SearchIssues($query: String!, $limit: Int!, $endCursor: String) {
  search(type: ISSUE, query: $query, first: $limit, after: $endCursor) {
    issueCount
    pageInfo {
      endCursor
      hasNextPage
    }
    nodes {
      ... on Issue {
        number
        title
        state
        updatedAt
        url
        repository {
          nameWithOwner
          isArchived
        }
      }
    }
  }
}"#;

pub struct GitHub {
    client: Octocrab,
}

impl std::fmt::Debug for GitHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHub").finish_non_exhaustive()
    }
}

impl GitHub {
    /// Build a client. Without a token the search still runs, but the API
    /// rejects it; that failure lands in the issues pane like any other.
    pub fn new(token: Option<String>) -> Result<Self> {
        let mut builder = Octocrab::builder();
        if let Some(token) = token {
            builder = builder.personal_token(token);
        }
        let client = builder
            .build()
            .map_err(|e| DashError::Auth(e.to_string()))?;

        Ok(Self { client })
    }

    /// Run one page of the issue search. `cursor` is the page boundary
    /// returned by the previous call, or `None` for the first page.
    pub async fn search_issues(
        &self,
        query: &str,
        limit: u32,
        cursor: Option<&PageInfo>,
    ) -> Result<IssueBatch> {
        let payload = search_payload(query, limit, cursor);
        tracing::debug!(query, limit, "searching issues");

        let response: Value = self.client.graphql(&payload).await?;
        let batch = parse_search_response(&response)?;
        tracing::debug!(
            count = batch.issues.len(),
            total = batch.total_count,
            "fetched issues"
        );
        Ok(batch)
    }
}

/// The ordering qualifier is always appended to the caller's terms, never
/// substituted for them.
fn make_search_query(terms: &str) -> String {
    format!("is:issue {} sort:updated", terms.trim())
}

fn search_payload(terms: &str, limit: u32, cursor: Option<&PageInfo>) -> Value {
    json!({
        "query": SEARCH_QUERY,
        "variables": {
            "query": make_search_query(terms),
            "limit": limit,
            "endCursor": cursor.and_then(|p| p.end_cursor.clone()),
        }
    })
}

fn parse_search_response(response: &Value) -> Result<IssueBatch> {
    if let Some(errors) = response.get("errors").and_then(|e| e.as_array()) {
        if let Some(first) = errors.first() {
            let message = first
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("unknown GraphQL error");
            return Err(DashError::Transport(format!("search failed: {}", message)));
        }
    }

    let search = response
        .get("data")
        .and_then(|d| d.get("search"))
        .ok_or_else(|| DashError::Decode("search payload missing from response".to_string()))?;

    let total_count = search
        .get("issueCount")
        .and_then(|v| v.as_u64())
        .unwrap_or(0);

    let page_info: PageInfo = search
        .get("pageInfo")
        .map(|v| serde_json::from_value(v.clone()))
        .transpose()?
        .unwrap_or_default();

    // Archived repositories have no server-side search qualifier here, so
    // their issues are dropped after decoding.
    let issues = search
        .get("nodes")
        .and_then(|n| n.as_array())
        .map(|nodes| {
            nodes
                .iter()
                .filter_map(parse_issue_node)
                .filter(|issue| !issue.repo_archived)
                .collect()
        })
        .unwrap_or_default();

    Ok(IssueBatch {
        issues,
        total_count,
        page_info,
    })
}

fn parse_issue_node(node: &Value) -> Option<Issue> {
    // Non-issue search nodes come back as empty objects; skip them.
    let number = node.get("number")?.as_u64()?;
    let repository = node.get("repository")?;

    Some(Issue {
        repo: repository
            .get("nameWithOwner")?
            .as_str()?
            .to_string(),
        number,
        title: node.get("title")?.as_str()?.to_string(),
        state: match node.get("state").and_then(|s| s.as_str()) {
            Some("CLOSED") => IssueState::Closed,
            _ => IssueState::Open,
        },
        updated_at: node
            .get("updatedAt")
            .and_then(|d| d.as_str())
            .and_then(|s| chrono::DateTime::parse_from_rfc3339(s).ok())
            .map(|d| d.with_timezone(&chrono::Utc))
            .unwrap_or_else(chrono::Utc::now),
        url: node.get("url")?.as_str()?.to_string(),
        repo_archived: repository
            .get("isArchived")
            .and_then(|a| a.as_bool())
            .unwrap_or(false),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue_node(repo: &str, number: u64, archived: bool) -> Value {
        json!({
            "number": number,
            "title": format!("issue {}", number),
            "state": "OPEN",
            "updatedAt": "2024-06-01T10:00:00Z",
            "url": format!("https://github.com/{}/issues/{}", repo, number),
            "repository": {
                "nameWithOwner": repo,
                "isArchived": archived,
            }
        })
    }

    fn search_response(nodes: Vec<Value>, total: u64, cursor: Option<&str>, more: bool) -> Value {
        json!({
            "data": {
                "search": {
                    "issueCount": total,
                    "pageInfo": { "endCursor": cursor, "hasNextPage": more },
                    "nodes": nodes,
                }
            }
        })
    }

    #[test]
    fn qualifier_is_appended_to_caller_terms() {
        assert_eq!(
            make_search_query("org:acme label:bug"),
            "is:issue org:acme label:bug sort:updated"
        );
    }

    #[test]
    fn first_page_request_carries_no_cursor() {
        let payload = search_payload("org:acme", 50, None);
        assert_eq!(payload["variables"]["endCursor"], Value::Null);
        assert_eq!(payload["variables"]["limit"], 50);
    }

    #[test]
    fn next_page_request_reuses_returned_cursor_verbatim() {
        let response = search_response(vec![issue_node("acme/app", 1, false)], 120, Some("Y3Vyc29y"), true);
        let batch = parse_search_response(&response).unwrap();
        assert!(batch.page_info.has_next_page);

        let payload = search_payload("org:acme", 50, Some(&batch.page_info));
        // A cursor obtained from a page with results must never reset to
        // absent; reusing it must not request the first page again.
        assert_eq!(payload["variables"]["endCursor"], "Y3Vyc29y");
    }

    #[test]
    fn archived_repo_issues_are_dropped() {
        let response = search_response(
            vec![
                issue_node("acme/live", 1, false),
                issue_node("acme/attic", 2, true),
                issue_node("acme/live", 3, false),
            ],
            3,
            None,
            false,
        );
        let batch = parse_search_response(&response).unwrap();
        assert_eq!(batch.issues.len(), 2);
        assert!(batch.issues.iter().all(|i| !i.repo_archived));
        assert!(batch.issues.iter().all(|i| i.repo == "acme/live"));
    }

    #[test]
    fn empty_result_is_not_an_error() {
        let response = search_response(vec![], 0, None, false);
        let batch = parse_search_response(&response).unwrap();
        assert!(batch.issues.is_empty());
        assert_eq!(batch.total_count, 0);
        assert!(!batch.page_info.has_next_page);
    }

    #[test]
    fn last_page_reports_no_next_page() {
        let response = search_response(vec![issue_node("acme/app", 9, false)], 1, Some("end"), false);
        let batch = parse_search_response(&response).unwrap();
        assert!(!batch.page_info.has_next_page);
        // The cursor itself stays opaque and untouched.
        assert_eq!(batch.page_info.end_cursor.as_deref(), Some("end"));
    }

    #[test]
    fn non_issue_nodes_are_skipped() {
        let response = search_response(vec![json!({}), issue_node("acme/app", 4, false)], 2, None, false);
        let batch = parse_search_response(&response).unwrap();
        assert_eq!(batch.issues.len(), 1);
        assert_eq!(batch.issues[0].number, 4);
    }

    #[test]
    fn graphql_errors_surface_as_transport_errors() {
        let response = json!({ "errors": [{ "message": "rate limited" }] });
        let err = parse_search_response(&response).unwrap_err();
        assert!(matches!(err, DashError::Transport(_)));
    }

    #[test]
    fn missing_payload_is_a_decode_error() {
        let err = parse_search_response(&json!({ "data": {} })).unwrap_err();
        assert!(matches!(err, DashError::Decode(_)));
    }
}
