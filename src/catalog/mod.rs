//! # Catalog Module
//!
//! Services offered by providers: public listing with query operators,
//! and owner-gated create, update and delete.

pub mod handlers;
pub mod models;
pub mod params;
pub mod query;
pub mod routes;
pub mod services;
pub mod validators;


pub use models::ServiceRow;
pub use routes::catalog_routes;
pub use services::CatalogService;
