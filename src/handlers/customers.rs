use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::Serialize;

use crate::errors::AppError;
use crate::handlers::admin::check_auth;
use crate::models::Customer;
use crate::services::booking_link::CustomerLinks;
use crate::services::customers::{CustomerInput, RegisterAction};
use crate::state::AppState;

// GET /api/admin/customers
pub async fn list_customers(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Customer>>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    Ok(Json(state.customers.list().await?))
}

// POST /api/admin/customers
#[derive(Serialize)]
pub struct RegisterResponse {
    customer: Customer,
    action: RegisterAction,
}

pub async fn register_customer(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<CustomerInput>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let (customer, action) = state.customers.register(body).await?;
    let status = match action {
        RegisterAction::Created => StatusCode::CREATED,
        RegisterAction::Updated => StatusCode::OK,
    };
    Ok((status, Json(RegisterResponse { customer, action })))
}

// PUT /api/admin/customers/:id
pub async fn update_customer(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<CustomerInput>,
) -> Result<Json<Customer>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    Ok(Json(state.customers.update(&id, body).await?))
}

// DELETE /api/admin/customers/:id
pub async fn delete_customer(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    state.customers.delete(&id).await?;
    Ok(Json(serde_json::json!({"ok": true})))
}

// GET /api/admin/customers/:id/links
pub async fn customer_links(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<CustomerLinks>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    let customer = state.customers.get(&id).await?;
    Ok(Json(CustomerLinks::for_name(
        &state.config.public_base_url,
        &customer.name,
    )))
}

// GET /api/book/:name
pub async fn booking_customer(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<Customer>, AppError> {
    Ok(Json(state.customers.by_name(&name).await?))
}
