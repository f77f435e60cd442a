pub mod api;
pub mod config;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod session;
pub mod templates;
pub mod utils;
pub mod wizard;
