pub mod auth;
pub mod authority;
pub mod detect;
pub mod issues;
pub mod upload;
