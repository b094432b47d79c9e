// Library exports so integration tests can drive the engines and router
// directly.

pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod points;
pub mod policy;
pub mod reports;
pub mod routes;
pub mod shop;
pub mod state;
pub mod users;
