pub mod handlers;
pub mod models;
pub mod service;

pub use handlers::{create_user, delete_user, list_users, update_user};
