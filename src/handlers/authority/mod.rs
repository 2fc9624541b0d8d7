mod reports;
mod status;

pub use reports::reports;
pub use status::update_status;
