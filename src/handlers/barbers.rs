// src/handlers/barbers.rs

use axum::{
    extract::{Path, State},
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
    models::barber::{Barber, BarberPayload},
};

// GET /api/barbers
#[utoipa::path(
    get,
    path = "/api/barbers",
    tag = "Barbers",
    responses((status = 200, description = "Lista de barbeiros", body = Vec<Barber>)),
    security(("api_jwt" = []))
)]
pub async fn list_barbers(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let barbers = app_state
        .barber_service
        .list_barbers()
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(barbers)))
}

// POST /api/barbers
#[utoipa::path(
    post,
    path = "/api/barbers",
    tag = "Barbers",
    request_body = BarberPayload,
    responses(
        (status = 201, description = "Barbeiro criado", body = Barber),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_barber(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<BarberPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let barber = app_state
        .barber_service
        .create_barber(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(barber)))
}

// GET /api/barbers/{id}
#[utoipa::path(
    get,
    path = "/api/barbers/{id}",
    tag = "Barbers",
    params(("id" = Uuid, Path, description = "ID do barbeiro")),
    responses(
        (status = 200, description = "Barbeiro", body = Barber),
        (status = 404, description = "Barbeiro não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_barber(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let barber = app_state
        .barber_service
        .get_barber(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(barber)))
}

// PUT /api/barbers/{id}
#[utoipa::path(
    put,
    path = "/api/barbers/{id}",
    tag = "Barbers",
    params(("id" = Uuid, Path, description = "ID do barbeiro")),
    request_body = BarberPayload,
    responses(
        (status = 200, description = "Barbeiro atualizado", body = Barber),
        (status = 404, description = "Barbeiro não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_barber(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
    Json(payload): Json<BarberPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let barber = app_state
        .barber_service
        .update_barber(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(barber)))
}

// DELETE /api/barbers/{id}
#[utoipa::path(
    delete,
    path = "/api/barbers/{id}",
    tag = "Barbers",
    params(("id" = Uuid, Path, description = "ID do barbeiro")),
    responses(
        (status = 204, description = "Barbeiro removido"),
        (status = 404, description = "Barbeiro não encontrado"),
        (status = 409, description = "Barbeiro possui agendamentos")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_barber(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .barber_service
        .delete_barber(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}
