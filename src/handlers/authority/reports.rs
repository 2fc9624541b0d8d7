use axum::response::Html;

use crate::database::models::Issue;
use crate::error::ApiError;
use crate::services::issue_service::IssueService;

/// GET /authority/reports - Server-rendered review table of all issues
///
/// The one human-facing page this service renders; everything else is JSON.
pub async fn reports() -> Result<Html<String>, ApiError> {
    let service = IssueService::new().await?;
    let issues = service.list().await?;
    Ok(Html(render_reports(&issues)))
}

fn render_reports(issues: &[Issue]) -> String {
    let rows: String = issues
        .iter()
        .map(|issue| {
            format!(
                "<tr>\
                 <td>{title}</td>\
                 <td class=\"desc\">{description}</td>\
                 <td>{location}</td>\
                 <td>{type_of_issue}</td>\
                 <td>{reported_by}</td>\
                 <td class=\"time\">{created_at}</td>\
                 <td><span class=\"status status-{status}\">{status}</span></td>\
                 </tr>",
                title = escape_html(&issue.title),
                description = escape_html(issue.description.as_deref().unwrap_or("")),
                location = escape_html(&issue.location),
                type_of_issue = escape_html(&issue.type_of_issue),
                reported_by = escape_html(&issue.reported_by),
                created_at = issue.created_at.format("%Y-%m-%d %H:%M:%S"),
                status = escape_html(&issue.status),
            )
        })
        .collect();

    format!(
        "<!doctype html>\n<html>\n<head>\n<meta charset=\"utf-8\"/>\n\
         <title>Authority Reports</title>\n\
         <style>\n\
         body {{ font-family: sans-serif; margin: 18px; color: #0f172a; }}\n\
         table {{ width: 100%; border-collapse: collapse; margin-top: 8px; }}\n\
         th, td {{ border: 1px solid #e6edf3; padding: 10px; text-align: left; vertical-align: top; }}\n\
         th {{ background: #2563eb; color: white; }}\n\
         .desc {{ max-width: 420px; white-space: pre-wrap; }}\n\
         .time {{ color: #6b7280; font-size: 0.9em; }}\n\
         .status {{ padding: 4px 10px; border-radius: 999px; font-weight: 700; }}\n\
         .status-pending {{ background: #fef3c7; color: #92400e; }}\n\
         .status-in_progress {{ background: #bfdbfe; color: #1e3a8a; }}\n\
         .status-resolved {{ background: #bbf7d0; color: #065f46; }}\n\
         </style>\n</head>\n<body>\n\
         <h1>Authority Portal - Received Reports</h1>\n\
         <p>Change a report's status via POST /authority/update-status.</p>\n\
         <table>\n<thead><tr>\
         <th>Title</th><th>Description</th><th>Location</th><th>Type</th>\
         <th>Reported By</th><th>Time</th><th>Status</th>\
         </tr></thead>\n<tbody>{rows}</tbody>\n</table>\n</body>\n</html>"
    )
}

fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
