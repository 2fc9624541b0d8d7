pub mod caption_service;
pub mod issue_service;
pub mod user_service;
