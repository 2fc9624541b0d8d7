mod login;
mod register;

pub use login::{login, login_phone};
pub use register::register;
