//! # Auth Module
//!
//! This module handles all authentication-related functionality including:
//! - Signup and login with salted password hashes
//! - JWT token generation and validation
//! - AuthedUser extractor and role gate for protected routes

pub mod extractors;
pub mod handlers;
pub mod models;
pub mod params;
pub mod password;
pub mod routes;
pub mod services;
pub mod tokens;
pub mod validators;


pub use extractors::AuthedUser;
pub use models::{Role, User};
pub use routes::auth_routes;

/// Auth gate rejection message
pub const NOT_AUTHORIZED: &str = "Not authorized to access this route";
