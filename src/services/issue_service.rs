use chrono::{DateTime, Local, TimeZone, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::config;
use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{Issue, IssueStatus};

#[derive(Debug, thiserror::Error)]
pub enum IssueError {
    #[error("title, location and typeOfIssue are required")]
    MissingFields,
    #[error("daily report limit reached")]
    DailyLimitReached,
    #[error("invalid status: {0}")]
    InvalidStatus(String),
    #[error("issue not found")]
    NotFound,
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<sqlx::Error> for IssueError {
    fn from(e: sqlx::Error) -> Self {
        IssueError::Database(DatabaseError::Sqlx(e))
    }
}

pub struct IssueService {
    pool: PgPool,
}

impl IssueService {
    pub async fn new() -> Result<Self, IssueError> {
        let pool = DatabaseManager::pool().await?;
        Ok(Self { pool })
    }

    /// Create an issue for `reporter`, enforcing the per-reporter daily cap.
    ///
    /// The cap window is the local calendar day, not a rolling 24 hours: a
    /// report at 23:59:59.999 and one at 00:00:00.000 the next day count
    /// against different windows. The count and insert run as one conditional
    /// INSERT .. SELECT statement so concurrent submissions cannot slip past
    /// the cap between a separate count and insert.
    pub async fn submit(
        &self,
        title: &str,
        location: &str,
        type_of_issue: &str,
        description: Option<&str>,
        image: Option<&str>,
        reporter: &str,
    ) -> Result<Issue, IssueError> {
        if title.trim().is_empty() || location.trim().is_empty() || type_of_issue.trim().is_empty()
        {
            return Err(IssueError::MissingFields);
        }

        let (day_start, day_end) = local_day_bounds(Local::now());
        let limit = config::config().api.daily_report_limit;

        let inserted = sqlx::query_as::<_, Issue>(
            "INSERT INTO issues (title, location, type_of_issue, description, image, reported_by) \
             SELECT $1, $2, $3, $4, $5, $6 \
             WHERE (SELECT COUNT(*) FROM issues \
                    WHERE reported_by = $6 AND created_at BETWEEN $7 AND $8) < $9 \
             RETURNING *",
        )
        .bind(title.trim())
        .bind(location.trim())
        .bind(type_of_issue.trim())
        .bind(description)
        .bind(image)
        .bind(reporter)
        .bind(day_start)
        .bind(day_end)
        .bind(limit)
        .fetch_optional(&self.pool)
        .await?;

        match inserted {
            Some(issue) => {
                tracing::info!(reporter, issue_id = %issue.id, "issue reported");
                Ok(issue)
            }
            None => {
                tracing::warn!(reporter, "daily report limit reached");
                Err(IssueError::DailyLimitReached)
            }
        }
    }

    /// All issues, newest first. No pagination; ordering is the contract.
    pub async fn list(&self) -> Result<Vec<Issue>, IssueError> {
        let issues =
            sqlx::query_as::<_, Issue>("SELECT * FROM issues ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?;
        Ok(issues)
    }

    /// Issues filed under one reporter identifier, newest first.
    pub async fn list_by_reporter(&self, identifier: &str) -> Result<Vec<Issue>, IssueError> {
        let issues = sqlx::query_as::<_, Issue>(
            "SELECT * FROM issues WHERE reported_by = $1 ORDER BY created_at DESC",
        )
        .bind(identifier)
        .fetch_all(&self.pool)
        .await?;
        Ok(issues)
    }

    /// Set an issue's status. Idempotent for a repeated status; unknown ids
    /// are a not-found error, and anything outside the workflow enum is
    /// rejected before touching the database.
    pub async fn update_status(&self, id: Uuid, status: &str) -> Result<Issue, IssueError> {
        let status: IssueStatus = status
            .parse()
            .map_err(IssueError::InvalidStatus)?;

        let updated = sqlx::query_as::<_, Issue>(
            "UPDATE issues SET status = $2, updated_at = now() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await?;

        updated.ok_or(IssueError::NotFound)
    }
}

/// Bounds of the local calendar day containing `now`, as UTC instants:
/// [00:00:00.000, 23:59:59.999].
fn local_day_bounds(now: DateTime<Local>) -> (DateTime<Utc>, DateTime<Utc>) {
    let day = now.date_naive();
    let start_naive = day.and_hms_milli_opt(0, 0, 0, 0).unwrap_or(now.naive_local());
    let end_naive = day
        .and_hms_milli_opt(23, 59, 59, 999)
        .unwrap_or(now.naive_local());

    // DST transitions can make a local wall-clock time ambiguous or missing;
    // take the earliest mapping and fall back to `now` for a missing one.
    let tz = now.timezone();
    let start = tz
        .from_local_datetime(&start_naive)
        .earliest()
        .unwrap_or(now);
    let end = tz.from_local_datetime(&end_naive).latest().unwrap_or(now);

    (start.with_timezone(&Utc), end.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Timelike};

    #[test]
    fn day_bounds_cover_the_whole_local_day() {
        let now = Local::now();
        let (start, end) = local_day_bounds(now);

        assert!(start <= now.with_timezone(&Utc));
        assert!(end >= now.with_timezone(&Utc));

        // Both bounds sit on the same local calendar date as `now`. The span
        // itself is not a fixed 24h: DST transitions stretch or shrink it.
        let start_local = start.with_timezone(&Local);
        let end_local = end.with_timezone(&Local);
        assert_eq!(start_local.date_naive(), now.date_naive());
        assert_eq!(end_local.date_naive(), now.date_naive());
        assert_eq!(start_local.num_seconds_from_midnight(), 0);
        assert_eq!(start_local.nanosecond(), 0);
        assert_eq!(end_local.num_seconds_from_midnight(), 86_399);
    }

    #[test]
    fn midnight_rolls_into_a_new_window() {
        let now = Local::now();
        let (_, end) = local_day_bounds(now);

        // The first instant after the window belongs to the next day.
        let next = end + Duration::milliseconds(1);
        let (next_start, _) = local_day_bounds(next.with_timezone(&Local));
        assert!(next_start > end);
        assert_eq!(
            next_start.with_timezone(&Local).date_naive(),
            now.date_naive() + Duration::days(1)
        );
    }

    #[test]
    fn last_millisecond_stays_in_the_current_window() {
        let now = Local::now();
        let (start, end) = local_day_bounds(now);

        let (same_start, same_end) = local_day_bounds(end.with_timezone(&Local));
        assert_eq!(same_start, start);
        assert_eq!(same_end, end);
    }
}
