// src/handlers/clients.rs

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{Datelike, Local};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::client::{Client, ClientPayload, ClientSummary},
};

const DEFAULT_RETENTION_DAYS: u32 = 30;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RetentionQuery {
    /// Dias sem visita (padrão 30)
    pub days: Option<u32>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BirthdayQuery {
    /// Mês de 1 a 12 (padrão: mês atual)
    pub month: Option<u32>,
}

// GET /api/clients
#[utoipa::path(
    get,
    path = "/api/clients",
    tag = "Clients",
    responses((status = 200, description = "Lista de clientes", body = Vec<Client>)),
    security(("api_jwt" = []))
)]
pub async fn list_clients(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let clients = app_state
        .client_service
        .list_clients()
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(clients)))
}

// POST /api/clients
#[utoipa::path(
    post,
    path = "/api/clients",
    tag = "Clients",
    request_body = ClientPayload,
    responses(
        (status = 201, description = "Cliente criado", body = Client),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_client(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<ClientPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let client = app_state
        .client_service
        .create_client(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(client)))
}

// GET /api/clients/{id}
#[utoipa::path(
    get,
    path = "/api/clients/{id}",
    tag = "Clients",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Cliente", body = Client),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_client(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let client = app_state
        .client_service
        .get_client(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(client)))
}

// PUT /api/clients/{id}
#[utoipa::path(
    put,
    path = "/api/clients/{id}",
    tag = "Clients",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    request_body = ClientPayload,
    responses(
        (status = 200, description = "Cliente atualizado", body = Client),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_client(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
    Json(payload): Json<ClientPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let client = app_state
        .client_service
        .update_client(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(client)))
}

// DELETE /api/clients/{id}
#[utoipa::path(
    delete,
    path = "/api/clients/{id}",
    tag = "Clients",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 204, description = "Cliente removido"),
        (status = 404, description = "Cliente não encontrado"),
        (status = 409, description = "Cliente possui agendamentos")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_client(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .client_service
        .delete_client(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}

// GET /api/clients/summaries
#[utoipa::path(
    get,
    path = "/api/clients/summaries",
    tag = "Clients",
    responses((status = 200, description = "Clientes com totais, pontos e nível", body = Vec<ClientSummary>)),
    security(("api_jwt" = []))
)]
pub async fn list_summaries(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let summaries = app_state
        .client_service
        .list_summaries()
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(summaries)))
}

// GET /api/clients/export
#[utoipa::path(
    get,
    path = "/api/clients/export",
    tag = "Clients",
    responses((status = 200, description = "Planilha CSV de clientes", content_type = "text/csv", body = String)),
    security(("api_jwt" = []))
)]
pub async fn export_clients(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let csv = app_state
        .client_service
        .export_csv()
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let filename = format!(
        "attachment; filename=\"clientes-{}.csv\"",
        Local::now().date_naive().format("%Y-%m-%d")
    );

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, filename),
        ],
        csv,
    ))
}

// GET /api/clients/retention
#[utoipa::path(
    get,
    path = "/api/clients/retention",
    tag = "Clients",
    params(RetentionQuery),
    responses((status = 200, description = "Clientes sem visita recente", body = Vec<ClientSummary>)),
    security(("api_jwt" = []))
)]
pub async fn retention(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(query): Query<RetentionQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let today = Local::now().date_naive();
    let days = query.days.unwrap_or(DEFAULT_RETENTION_DAYS);

    let candidates = app_state
        .client_service
        .retention_candidates(today, days)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(candidates)))
}

// GET /api/clients/birthdays
#[utoipa::path(
    get,
    path = "/api/clients/birthdays",
    tag = "Clients",
    params(BirthdayQuery),
    responses(
        (status = 200, description = "Aniversariantes do mês", body = Vec<Client>),
        (status = 400, description = "Mês inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn birthdays(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(query): Query<BirthdayQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let month = query.month.unwrap_or_else(|| Local::now().month());

    let clients = app_state
        .client_service
        .birthdays(month)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(clients)))
}
