use std::sync::Arc;

use crate::broker::MessageBroker;
use crate::jobs::store::JobStore;
use crate::profile::store::ProfileStore;

/// Shared application state injected into all route handlers via Axum
/// extractors. The stores and the broker are trait objects so handlers and
/// consumers never touch a concrete database or broker handle.
#[derive(Clone)]
pub struct AppState {
    pub jobs: Arc<dyn JobStore>,
    pub profiles: Arc<dyn ProfileStore>,
    pub broker: Arc<dyn MessageBroker>,
}
