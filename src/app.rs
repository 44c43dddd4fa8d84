use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::services::images::MAX_UPLOAD_BYTES;
use crate::state::AppState;

/// Room for multipart framing around the largest accepted image.
const UPLOAD_BODY_LIMIT: usize = MAX_UPLOAD_BYTES + 64 * 1024;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health))
        // booking page and customer page
        .route("/api/slots", get(handlers::booking::slots))
        .route("/api/statuses", get(handlers::booking::statuses))
        .route("/api/book/:name", get(handlers::customers::booking_customer))
        .route("/api/appointments", post(handlers::booking::create_appointment))
        .route(
            "/api/appointments/:id/confirm",
            post(handlers::booking::confirm_appointment),
        )
        .route(
            "/api/customers/by-name/:name/appointments",
            get(handlers::booking::customer_appointments),
        )
        .route(
            "/api/upload",
            post(handlers::booking::upload_image).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        // admin
        .route(
            "/api/admin/customers",
            get(handlers::customers::list_customers).post(handlers::customers::register_customer),
        )
        .route(
            "/api/admin/customers/:id",
            put(handlers::customers::update_customer).delete(handlers::customers::delete_customer),
        )
        .route(
            "/api/admin/customers/:id/links",
            get(handlers::customers::customer_links),
        )
        .route(
            "/api/admin/appointments",
            get(handlers::admin::list_appointments),
        )
        .route(
            "/api/admin/appointments/:id",
            delete(handlers::admin::delete_appointment),
        )
        .route(
            "/api/admin/appointments/:id/status",
            post(handlers::admin::set_status),
        )
        .route(
            "/api/admin/appointments/:id/seen",
            post(handlers::admin::mark_seen),
        )
        .route("/api/admin/overview", get(handlers::admin::overview))
        .route("/api/admin/calendar", get(handlers::admin::calendar))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
