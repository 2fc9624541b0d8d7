mod list;
mod report;

pub use list::{list, my_issues};
pub use report::report;
