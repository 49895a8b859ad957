//! Presentation layer: HTTP routes, controllers, middleware, and DTOs

pub mod controllers;
pub mod middleware;
pub mod models;
pub mod routes;
