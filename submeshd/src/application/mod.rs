pub mod handlers;
pub mod use_cases;
