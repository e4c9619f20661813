//! Per-IP rate limiting using a token bucket.

use axum::Router;
use std::sync::Arc;
use tower_governor::{
    GovernorLayer,
    governor::GovernorConfigBuilder,
    key_extractor::{PeerIpKeyExtractor, SmartIpKeyExtractor},
};

use crate::state::AppState;

/// Sustained rate for authenticated API traffic (requests per second).
const API_PER_SECOND: u64 = 2;
/// Burst allowance on top of the sustained rate.
const API_BURST: u32 = 50;

/// Wraps a router with the API rate limiter.
///
/// Requests over the limit receive `429 Too Many Requests`.
///
/// `behind_proxy` selects the client key: when `true`, the client IP is
/// read from `X-Forwarded-For` / `X-Real-IP` (set this only behind a
/// trusted reverse proxy, the headers are client-controlled otherwise);
/// when `false`, the socket peer address is used.
pub fn apply(router: Router<AppState>, behind_proxy: bool) -> Router<AppState> {
    if behind_proxy {
        let config = Arc::new(
            GovernorConfigBuilder::default()
                .key_extractor(SmartIpKeyExtractor)
                .per_second(API_PER_SECOND)
                .burst_size(API_BURST)
                .finish()
                .expect("governor config is statically valid"),
        );
        router.layer(GovernorLayer::new(config))
    } else {
        let config = Arc::new(
            GovernorConfigBuilder::default()
                .key_extractor(PeerIpKeyExtractor)
                .per_second(API_PER_SECOND)
                .burst_size(API_BURST)
                .finish()
                .expect("governor config is statically valid"),
        );
        router.layer(GovernorLayer::new(config))
    }
}
