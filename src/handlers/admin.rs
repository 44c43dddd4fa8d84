use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::{Appointment, AppointmentStatus};
use crate::services::lifecycle::TransitionOutcome;
use crate::services::projections;
use crate::state::AppState;

pub fn check_auth(headers: &HeaderMap, expected_token: &str) -> Result<(), AppError> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let token = auth.strip_prefix("Bearer ").unwrap_or("");
    if token.is_empty() || token != expected_token {
        return Err(AppError::Unauthorized);
    }
    Ok(())
}

// GET /api/admin/appointments
pub async fn list_appointments(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Appointment>>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    Ok(Json(state.appointments.list().await?))
}

// POST /api/admin/appointments/:id/status
#[derive(Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

pub async fn set_status(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<StatusRequest>,
) -> Result<Json<TransitionOutcome>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let status = AppointmentStatus::parse(&body.status)
        .ok_or_else(|| AppError::validation(format!("unknown status '{}'", body.status)))?;

    Ok(Json(state.appointments.transition(&id, status).await?))
}

// POST /api/admin/appointments/:id/seen
pub async fn mark_seen(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Appointment>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    Ok(Json(state.appointments.mark_seen(&id).await?))
}

// DELETE /api/admin/appointments/:id
pub async fn delete_appointment(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    state.appointments.delete(&id).await?;
    Ok(Json(serde_json::json!({"ok": true})))
}

// GET /api/admin/overview
#[derive(Deserialize)]
pub struct OverviewQuery {
    pub last_login: Option<String>,
}

pub async fn overview(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<OverviewQuery>,
) -> Result<Response, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let last_login = query
        .last_login
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(|s| {
            DateTime::parse_from_rfc3339(s)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|_| AppError::validation(format!("invalid last_login '{s}'")))
        })
        .transpose()?;

    let all = state.appointments.list().await?;
    let view = projections::overview(&all, Local::now().naive_local(), last_login);
    Ok(Json(view).into_response())
}

// GET /api/admin/calendar
#[derive(Serialize)]
struct CalendarDay<'a> {
    date: NaiveDate,
    appointments: Vec<&'a Appointment>,
}

pub async fn calendar(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let all = state.appointments.list().await?;
    let days: Vec<CalendarDay> = projections::calendar(&all, Local::now().naive_local())
        .into_iter()
        .map(|(date, appointments)| CalendarDay { date, appointments })
        .collect();
    Ok(Json(days).into_response())
}
