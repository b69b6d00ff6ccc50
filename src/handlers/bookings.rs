// src/handlers/bookings.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::{
        booking::{Booking, CreateBookingPayload, UpdateBookingPayload, UpdateBookingStatusPayload},
        reports::ReportFilter,
    },
};

// GET /api/bookings
#[utoipa::path(
    get,
    path = "/api/bookings",
    tag = "Bookings",
    params(ReportFilter),
    responses(
        (status = 200, description = "Agendamentos do período", body = Vec<Booking>),
        (status = 400, description = "Período inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_bookings(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(filter): Query<ReportFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let bookings = app_state
        .booking_service
        .list_bookings(&filter)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(bookings)))
}

// POST /api/bookings
#[utoipa::path(
    post,
    path = "/api/bookings",
    tag = "Bookings",
    request_body = CreateBookingPayload,
    responses(
        (status = 201, description = "Agendamento criado", body = Booking),
        (status = 400, description = "Dados inválidos ou cliente/barbeiro/serviço inexistente")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_booking(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<CreateBookingPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let booking = app_state
        .booking_service
        .create_booking(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(booking)))
}

// GET /api/bookings/{id}
#[utoipa::path(
    get,
    path = "/api/bookings/{id}",
    tag = "Bookings",
    params(("id" = Uuid, Path, description = "ID do agendamento")),
    responses(
        (status = 200, description = "Agendamento", body = Booking),
        (status = 404, description = "Agendamento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_booking(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let booking = app_state
        .booking_service
        .get_booking(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(booking)))
}

// PUT /api/bookings/{id}
#[utoipa::path(
    put,
    path = "/api/bookings/{id}",
    tag = "Bookings",
    params(("id" = Uuid, Path, description = "ID do agendamento")),
    request_body = UpdateBookingPayload,
    responses(
        (status = 200, description = "Agendamento atualizado", body = Booking),
        (status = 404, description = "Agendamento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_booking(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateBookingPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let booking = app_state
        .booking_service
        .update_booking(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(booking)))
}

// PATCH /api/bookings/{id}/status
#[utoipa::path(
    patch,
    path = "/api/bookings/{id}/status",
    tag = "Bookings",
    params(("id" = Uuid, Path, description = "ID do agendamento")),
    request_body = UpdateBookingStatusPayload,
    responses(
        (status = 200, description = "Status atualizado", body = Booking),
        (status = 404, description = "Agendamento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_status(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateBookingStatusPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let booking = app_state
        .booking_service
        .update_status(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(booking)))
}

// DELETE /api/bookings/{id}
#[utoipa::path(
    delete,
    path = "/api/bookings/{id}",
    tag = "Bookings",
    params(("id" = Uuid, Path, description = "ID do agendamento")),
    responses(
        (status = 204, description = "Agendamento removido"),
        (status = 404, description = "Agendamento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_booking(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .booking_service
        .delete_booking(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}
