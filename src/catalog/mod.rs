pub mod api_types;
pub mod cache;
pub mod client;
pub mod handlers;
pub mod types;
