pub mod client;
pub mod cookies;
pub mod endpoint;
pub mod models;
