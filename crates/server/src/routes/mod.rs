//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (verifies database)
//!
//! # Merchant (embedded admin, authenticated upstream)
//! GET  /app/settings           - Current store configuration (provisions on first visit)
//! POST /app/settings           - Save tier configuration (form-encoded)
//!
//! # Storefront widget
//! POST /popup                  - Dispatches on request shape: consent,
//!                                discount options, game options, stats read,
//!                                stats write
//! ```
//!
//! Every route identifies the merchant via a `?shop=` query parameter.

pub mod popup;
pub mod settings;

use axum::{
    Router,
    routing::{get, post},
};
use serde::Deserialize;

use popgames_core::ShopDomain;

use crate::error::AppError;
use crate::state::AppState;

/// The `?shop=` query parameter carried by every request.
#[derive(Debug, Deserialize)]
pub struct ShopQuery {
    pub shop: String,
}

impl ShopQuery {
    /// Parse the raw parameter into a validated [`ShopDomain`].
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` if the value is not a plain hostname.
    pub fn domain(&self) -> Result<ShopDomain, AppError> {
        ShopDomain::parse(&self.shop)
            .map_err(|e| AppError::BadRequest(format!("invalid shop parameter: {e}")))
    }
}

/// Create the application router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/app/settings",
            get(settings::show).post(settings::update),
        )
        .route("/popup", post(popup::handle))
}
