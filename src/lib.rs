pub mod admin;
pub mod auth;
pub mod category;
pub mod client;
pub mod config;
pub mod errors;
pub mod extractors;
pub mod openapi;
pub mod routes;
pub mod summary;
pub mod transaction;
