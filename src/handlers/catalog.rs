// src/handlers/catalog.rs

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
    models::catalog::{Service, ServicePayload},
};

// GET /api/services
#[utoipa::path(
    get,
    path = "/api/services",
    tag = "Services",
    responses((status = 200, description = "Catálogo de serviços", body = Vec<Service>)),
    security(("api_jwt" = []))
)]
pub async fn list_services(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let services = app_state
        .catalog_service
        .list_services()
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(services)))
}

// POST /api/services
#[utoipa::path(
    post,
    path = "/api/services",
    tag = "Services",
    request_body = ServicePayload,
    responses(
        (status = 201, description = "Serviço criado", body = Service),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_service(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<ServicePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let service = app_state
        .catalog_service
        .create_service(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(service)))
}

// GET /api/services/{id}
#[utoipa::path(
    get,
    path = "/api/services/{id}",
    tag = "Services",
    params(("id" = Uuid, Path, description = "ID do serviço")),
    responses(
        (status = 200, description = "Serviço", body = Service),
        (status = 404, description = "Serviço não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_service(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let service = app_state
        .catalog_service
        .get_service(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(service)))
}

// PUT /api/services/{id}
#[utoipa::path(
    put,
    path = "/api/services/{id}",
    tag = "Services",
    params(("id" = Uuid, Path, description = "ID do serviço")),
    request_body = ServicePayload,
    responses(
        (status = 200, description = "Serviço atualizado", body = Service),
        (status = 404, description = "Serviço não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_service(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
    Json(payload): Json<ServicePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let service = app_state
        .catalog_service
        .update_service(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(service)))
}

// DELETE /api/services/{id}
#[utoipa::path(
    delete,
    path = "/api/services/{id}",
    tag = "Services",
    params(("id" = Uuid, Path, description = "ID do serviço")),
    responses(
        (status = 204, description = "Serviço removido"),
        (status = 404, description = "Serviço não encontrado"),
        (status = 409, description = "Serviço possui agendamentos")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_service(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .catalog_service
        .delete_service(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}
