pub mod issue;
pub mod user;

pub use issue::{Issue, IssueStatus};
pub use user::User;
