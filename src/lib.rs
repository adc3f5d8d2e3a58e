pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod policy;
pub mod query;
pub mod ride;
pub mod service;
pub mod store;
pub mod types;
pub mod user;
pub mod utils;
