use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::models::{Booking, BookingUpdate, NewBooking, Specialty};
use crate::state::AppState;

fn parse_specialty(raw: &str) -> Result<Specialty, AppError> {
    Specialty::parse(raw.trim())
        .ok_or_else(|| AppError::BadRequest(format!("unknown specialty '{raw}'")))
}

fn require_name(raw: &str) -> Result<&str, AppError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("technician_name must not be empty".to_string()));
    }
    Ok(name)
}

fn not_found(id: i64) -> AppError {
    AppError::NotFound(format!("booking {id}"))
}

// GET /api/v1/bookings
pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Booking>>, AppError> {
    Ok(Json(state.store.list_all()?))
}

// GET /api/v1/bookings/:id
pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Booking>, AppError> {
    state.store.get(id)?.map(Json).ok_or_else(|| not_found(id))
}

// POST /api/v1/bookings
pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewBooking>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    let technician = require_name(&req.technician_name)?;
    let specialty = parse_specialty(&req.specialty)?;

    let id = state
        .store
        .create(technician, specialty.as_str(), req.booking_time)?;
    tracing::info!(booking_id = id, technician, %specialty, "booking created via api");

    let booking = state.store.get(id)?.ok_or_else(|| not_found(id))?;
    Ok((StatusCode::CREATED, Json(booking)))
}

// PUT /api/v1/bookings/:id
pub async fn update_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<BookingUpdate>,
) -> Result<Json<Booking>, AppError> {
    if req.is_empty() {
        return Err(AppError::BadRequest("no fields to update".to_string()));
    }

    let update = BookingUpdate {
        technician_name: req
            .technician_name
            .as_deref()
            .map(|n| require_name(n).map(str::to_string))
            .transpose()?,
        specialty: req
            .specialty
            .as_deref()
            .map(|s| parse_specialty(s).map(|sp| sp.as_str().to_string()))
            .transpose()?,
        booking_time: req.booking_time,
    };

    let booking = state.store.update(id, &update)?.ok_or_else(|| not_found(id))?;
    tracing::info!(booking_id = id, "booking updated via api");
    Ok(Json(booking))
}

// DELETE /api/v1/bookings/:id
pub async fn delete_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    if !state.store.delete(id)? {
        return Err(not_found(id));
    }
    tracing::info!(booking_id = id, "booking deleted via api");
    Ok(Json(json!({ "message": "Booking deleted successfully" })))
}
