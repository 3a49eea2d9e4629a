use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One issue from the search API. Immutable once decoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    /// Repository name with owner, e.g. "acme/widgets".
    pub repo: String,
    pub number: u64,
    pub title: String,
    pub state: IssueState,
    pub updated_at: DateTime<Utc>,
    pub url: String,
    /// Archived flag of the owning repository. Archived-repo issues are
    /// dropped at the adapter boundary, never at render time.
    pub repo_archived: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IssueState {
    Open,
    Closed,
}

impl fmt::Display for IssueState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueState::Open => write!(f, "Open"),
            IssueState::Closed => write!(f, "Closed"),
        }
    }
}

/// One infrastructure stack from the inventory API. Immutable once decoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stack {
    pub stack_id: u64,
    pub repository: String,
    pub path: String,
    pub default_branch: String,
    pub meta_id: String,
    pub meta_name: String,
    #[serde(default)]
    pub meta_description: String,
    #[serde(default)]
    pub meta_tags: Vec<String>,
    pub status: HealthStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub seen_at: DateTime<Utc>,
    pub deployment_status: DeploymentStatus,
    pub drift_status: DriftStatus,
    #[serde(default)]
    pub draft: bool,
}

impl Stack {
    /// Dashboard URL for this stack: https://{host}/o/{org}/stacks/{id}
    pub fn dashboard_url(&self, host: &str, org: &str) -> String {
        format!("https://{}/o/{}/stacks/{}", host, org, self.stack_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Ok,
    Healthy,
    Unhealthy,
    Drifted,
    Failed,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentStatus {
    Ok,
    Failed,
    Pending,
    Running,
    Canceled,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriftStatus {
    Ok,
    Drifted,
    Failed,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HealthStatus::Ok => "ok",
            HealthStatus::Healthy => "healthy",
            HealthStatus::Unhealthy => "unhealthy",
            HealthStatus::Drifted => "drifted",
            HealthStatus::Failed => "failed",
            HealthStatus::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for DeploymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DeploymentStatus::Ok => "ok",
            DeploymentStatus::Failed => "failed",
            DeploymentStatus::Pending => "pending",
            DeploymentStatus::Running => "running",
            DeploymentStatus::Canceled => "canceled",
            DeploymentStatus::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for DriftStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DriftStatus::Ok => "ok",
            DriftStatus::Drifted => "drifted",
            DriftStatus::Failed => "failed",
            DriftStatus::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

/// Display bucket for a status value. The renderer maps each bucket to a
/// theme style; the mapping itself is total and stateless.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Annotation {
    Success,
    Failure,
    Warning,
}

impl HealthStatus {
    pub fn annotation(self) -> Annotation {
        match self {
            HealthStatus::Ok => Annotation::Success,
            HealthStatus::Failed => Annotation::Failure,
            HealthStatus::Healthy
            | HealthStatus::Unhealthy
            | HealthStatus::Drifted
            | HealthStatus::Unknown => Annotation::Warning,
        }
    }
}

impl DeploymentStatus {
    pub fn annotation(self) -> Annotation {
        match self {
            DeploymentStatus::Ok => Annotation::Success,
            DeploymentStatus::Failed => Annotation::Failure,
            DeploymentStatus::Pending
            | DeploymentStatus::Running
            | DeploymentStatus::Canceled
            | DeploymentStatus::Unknown => Annotation::Warning,
        }
    }
}

impl DriftStatus {
    pub fn annotation(self) -> Annotation {
        match self {
            DriftStatus::Ok => Annotation::Success,
            DriftStatus::Failed => Annotation::Failure,
            DriftStatus::Drifted | DriftStatus::Unknown => Annotation::Warning,
        }
    }
}

/// Opaque page boundary returned by the search API. Only ever fed back
/// verbatim as the `after` input of the next page request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub end_cursor: Option<String>,
    pub has_next_page: bool,
}

/// One decoded page of issue search results.
#[derive(Debug, Clone)]
pub struct IssueBatch {
    pub issues: Vec<Issue>,
    pub total_count: u64,
    pub page_info: PageInfo,
}

/// A list entry wraps exactly one record kind; a list never mixes kinds.
#[derive(Debug, Clone)]
pub enum Entry {
    Issue(Issue),
    Stack(Stack),
}

impl Entry {
    pub fn title(&self) -> String {
        match self {
            Entry::Issue(issue) => issue.title.clone(),
            Entry::Stack(stack) => stack.meta_name.clone(),
        }
    }

    pub fn description(&self) -> String {
        match self {
            Entry::Issue(issue) => format!("{} #{}", issue.repo, issue.number),
            Entry::Stack(stack) => {
                let repo = stack
                    .repository
                    .strip_prefix("github.com/")
                    .unwrap_or(&stack.repository);
                format!("{} {}", repo, stack.path)
            }
        }
    }

    /// Key the filter predicate matches against. Pure function of the
    /// wrapped record's fields.
    pub fn filter_value(&self) -> String {
        match self {
            Entry::Issue(issue) => format!("{} #{} {}", issue.repo, issue.number, issue.title),
            Entry::Stack(stack) => format!(
                "{} {} {}",
                stack.meta_name, stack.status, stack.drift_status
            ),
        }
    }

    pub fn url(&self, dashboard_host: &str, org: &str) -> String {
        match self {
            Entry::Issue(issue) => issue.url.clone(),
            Entry::Stack(stack) => stack.dashboard_url(dashboard_host, org),
        }
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        match self {
            Entry::Issue(issue) => issue.updated_at,
            Entry::Stack(stack) => stack.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_stack() -> Stack {
        Stack {
            stack_id: 42,
            repository: "github.com/acme/infra".to_string(),
            path: "/prod/vpc".to_string(),
            default_branch: "main".to_string(),
            meta_id: "prod-vpc".to_string(),
            meta_name: "prod-vpc".to_string(),
            meta_description: "Production VPC".to_string(),
            meta_tags: vec!["prod".to_string()],
            status: HealthStatus::Ok,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
            seen_at: Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
            deployment_status: DeploymentStatus::Ok,
            drift_status: DriftStatus::Ok,
            draft: false,
        }
    }

    #[test]
    fn deployment_annotation_is_total() {
        let all = [
            DeploymentStatus::Ok,
            DeploymentStatus::Failed,
            DeploymentStatus::Pending,
            DeploymentStatus::Running,
            DeploymentStatus::Canceled,
            DeploymentStatus::Unknown,
        ];
        let annotated: Vec<_> = all.iter().map(|s| s.annotation()).collect();
        assert_eq!(annotated[0], Annotation::Success);
        assert_eq!(annotated[1], Annotation::Failure);
        for a in &annotated[2..] {
            assert_eq!(*a, Annotation::Warning);
        }
    }

    #[test]
    fn health_annotation_is_total() {
        let all = [
            HealthStatus::Ok,
            HealthStatus::Healthy,
            HealthStatus::Unhealthy,
            HealthStatus::Drifted,
            HealthStatus::Failed,
            HealthStatus::Unknown,
        ];
        for status in all {
            let annotation = status.annotation();
            match status {
                HealthStatus::Ok => assert_eq!(annotation, Annotation::Success),
                HealthStatus::Failed => assert_eq!(annotation, Annotation::Failure),
                _ => assert_eq!(annotation, Annotation::Warning),
            }
        }
    }

    #[test]
    fn drift_failure_maps_to_failure_and_drifted_to_warning() {
        assert_eq!(DriftStatus::Ok.annotation(), Annotation::Success);
        assert_eq!(DriftStatus::Failed.annotation(), Annotation::Failure);
        assert_eq!(DriftStatus::Drifted.annotation(), Annotation::Warning);
        assert_eq!(DriftStatus::Unknown.annotation(), Annotation::Warning);
    }

    #[test]
    fn mixed_deployment_statuses_annotate_distinctly() {
        let mut ok = sample_stack();
        ok.deployment_status = DeploymentStatus::Ok;
        let mut failed = sample_stack();
        failed.deployment_status = DeploymentStatus::Failed;
        let mut pending = sample_stack();
        pending.deployment_status = DeploymentStatus::Pending;

        let annotations: Vec<_> = [ok, failed, pending]
            .iter()
            .map(|s| s.deployment_status.annotation())
            .collect();

        assert_eq!(
            annotations,
            vec![Annotation::Success, Annotation::Failure, Annotation::Warning]
        );
        let failures = annotations.iter().filter(|a| **a == Annotation::Failure);
        assert_eq!(failures.count(), 1);
        let successes = annotations.iter().filter(|a| **a == Annotation::Success);
        assert_eq!(successes.count(), 1);
    }

    #[test]
    fn filter_value_is_deterministic() {
        let entry = Entry::Stack(sample_stack());
        let first = entry.filter_value();
        for _ in 0..10 {
            assert_eq!(entry.filter_value(), first);
        }
        assert_eq!(first, "prod-vpc ok ok");
    }

    #[test]
    fn stack_url_uses_dashboard_host_and_org() {
        let stack = sample_stack();
        assert_eq!(
            stack.dashboard_url("cloud.example.io", "acme"),
            "https://cloud.example.io/o/acme/stacks/42"
        );
    }

    #[test]
    fn unknown_status_strings_decode_to_unknown() {
        let status: DeploymentStatus = serde_json::from_str("\"exploded\"").unwrap();
        assert_eq!(status, DeploymentStatus::Unknown);
        let drift: DriftStatus = serde_json::from_str("\"surprise\"").unwrap();
        assert_eq!(drift, DriftStatus::Unknown);
    }

    #[test]
    fn statuses_decode_from_lowercase_wire_strings() {
        let status: HealthStatus = serde_json::from_str("\"unhealthy\"").unwrap();
        assert_eq!(status, HealthStatus::Unhealthy);
        let deploy: DeploymentStatus = serde_json::from_str("\"running\"").unwrap();
        assert_eq!(deploy, DeploymentStatus::Running);
    }

    #[test]
    fn entry_description_trims_github_prefix() {
        let entry = Entry::Stack(sample_stack());
        assert_eq!(entry.description(), "acme/infra /prod/vpc");
    }
}
