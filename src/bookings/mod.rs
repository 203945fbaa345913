//! # Bookings Module
//!
//! Customers book services; providers and admins move bookings through
//! their statuses.

pub mod handlers;
pub mod models;
pub mod params;
pub mod routes;
pub mod services;
pub mod validators;


pub use routes::booking_routes;
