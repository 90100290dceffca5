//! Restaurant module: domain inputs, request rule sets, repository seam and
//! the application service.

pub mod domain;
pub mod validation;
pub mod repository;
pub mod repo;
pub mod service;

pub use service::RestaurantService;
