use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// A citizen report. `reported_by` is a by-value copy of the reporter's
/// email or phone at creation time; renaming a user's contact does not
/// rewrite past issues.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Issue {
    pub id: Uuid,
    pub title: String,
    pub location: String,
    pub type_of_issue: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub status: String,
    pub reported_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Moderation workflow states. The column CHECK constraint enforces the same
/// set, so stored rows always parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueStatus {
    Pending,
    InProgress,
    Resolved,
}

impl IssueStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueStatus::Pending => "pending",
            IssueStatus::InProgress => "in_progress",
            IssueStatus::Resolved => "resolved",
        }
    }
}

impl FromStr for IssueStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(IssueStatus::Pending),
            "in_progress" => Ok(IssueStatus::InProgress),
            "resolved" => Ok(IssueStatus::Resolved),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_statuses() {
        assert_eq!("pending".parse::<IssueStatus>(), Ok(IssueStatus::Pending));
        assert_eq!(
            "in_progress".parse::<IssueStatus>(),
            Ok(IssueStatus::InProgress)
        );
        assert_eq!("resolved".parse::<IssueStatus>(), Ok(IssueStatus::Resolved));
    }

    #[test]
    fn rejects_arbitrary_status_strings() {
        assert!("done".parse::<IssueStatus>().is_err());
        assert!("PENDING".parse::<IssueStatus>().is_err());
        assert!("".parse::<IssueStatus>().is_err());
    }

    #[test]
    fn round_trips_through_as_str() {
        for status in [
            IssueStatus::Pending,
            IssueStatus::InProgress,
            IssueStatus::Resolved,
        ] {
            assert_eq!(status.as_str().parse::<IssueStatus>(), Ok(status));
        }
    }
}
