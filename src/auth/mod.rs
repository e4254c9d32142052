pub mod handlers;
pub mod jwt;
pub mod models;
pub mod password;
pub mod service;

// Re-export handlers for use in main.rs
pub use handlers::{
    change_password, login, logout, refresh, register, update_user_info, user_info,
};

// Re-export for use in extractors
pub use jwt::decode_token;
