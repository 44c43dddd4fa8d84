use std::sync::Arc;

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Local;
use serde::Serialize;

use crate::errors::AppError;
use crate::models::{Appointment, AppointmentStatus, NewAppointment, SlotTime, StatusPresentation};
use crate::services::{images, projections};
use crate::state::AppState;

// GET /api/slots
pub async fn slots() -> Json<Vec<SlotTime>> {
    Json(SlotTime::bookable_day())
}

// GET /api/statuses
pub async fn statuses() -> Json<&'static [StatusPresentation]> {
    Json(AppointmentStatus::presentation_table())
}

// POST /api/appointments
pub async fn create_appointment(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NewAppointment>,
) -> Result<(StatusCode, Json<Appointment>), AppError> {
    let appointment = state.appointments.create(body).await?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

// POST /api/appointments/:id/confirm
pub async fn confirm_appointment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Appointment>, AppError> {
    Ok(Json(state.appointments.confirm_by_customer(&id).await?))
}

// GET /api/customers/by-name/:name/appointments
pub async fn customer_appointments(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Response, AppError> {
    let all = state.appointments.list().await?;
    let view = projections::for_customer(&all, name.trim(), Local::now().naive_local());
    Ok(Json(view).into_response())
}

// POST /api/upload
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    image_url: String,
}

pub async fn upload_image(mut multipart: Multipart) -> Result<Json<UploadResponse>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("malformed upload: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::validation(format!("could not read upload: {e}")))?;

        let image_url = images::normalize_image(&bytes, content_type.as_deref())?;
        return Ok(Json(UploadResponse { image_url }));
    }

    Err(AppError::validation("no file uploaded"))
}
