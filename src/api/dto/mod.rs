//! Request and response shapes for the REST API.

pub mod health;
pub mod links;
pub mod metrics;
pub mod shorten;
