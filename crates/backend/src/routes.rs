use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{api::handlers, system};

/// Конфигурация всех роутов приложения
pub fn configure_routes() -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        // ========================================
        // D100 PHARMACY OVERVIEW DASHBOARD
        // ========================================
        .route(
            "/api/d100/dashboard",
            get(handlers::d100_pharmacy_overview::get_dashboard),
        )
        .route(
            "/api/d100/dashboard/refresh",
            post(handlers::d100_pharmacy_overview::refresh),
        )
        .route(
            "/api/d100/dashboard/retry",
            post(handlers::d100_pharmacy_overview::retry),
        )
        .layer(middleware::from_fn(
            system::middleware::request_logger::request_logger,
        ))
}
