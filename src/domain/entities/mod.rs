//! Core business entities.

mod link;
mod metric_bucket;
mod owner;

pub use link::{Link, LinkTotals, NewLink};
pub use metric_bucket::{
    MetricBucket, bucket_start_for, day_start_for, estimate_unique_visitors,
};
pub use owner::{AuthedOwner, Owner};
