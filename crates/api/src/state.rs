use std::sync::Arc;

use crate::config::ServerConfig;
use crate::payments::CheckoutGateway;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: tradeprep_db::DbPool,
    /// Server configuration (JWT, entitlement policy, payment settings).
    pub config: Arc<ServerConfig>,
    /// Payment-processor checkout client (stubbed in tests).
    pub payments: Arc<dyn CheckoutGateway>,
}
