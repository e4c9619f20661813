//! REST API handlers.

mod health;
mod links;
mod metrics;
mod redirect;
mod shorten;

pub use health::health_handler;
pub use links::{delete_link_handler, list_links_handler};
pub use metrics::{metrics_handler, stats_handler};
pub use redirect::redirect_handler;
pub use shorten::shorten_handler;
