// src/handlers/loyalty.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::loyalty::{CreateTierPayload, LoyaltyTier, TierResolution},
};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ResolveQuery {
    pub points: i64,
}

// GET /api/loyalty/tiers
#[utoipa::path(
    get,
    path = "/api/loyalty/tiers",
    tag = "Loyalty",
    responses((status = 200, description = "Níveis do programa de fidelidade", body = Vec<LoyaltyTier>)),
    security(("api_jwt" = []))
)]
pub async fn list_tiers(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let tiers = app_state
        .loyalty_service
        .list_tiers()
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(tiers)))
}

// POST /api/loyalty/tiers
#[utoipa::path(
    post,
    path = "/api/loyalty/tiers",
    tag = "Loyalty",
    request_body = CreateTierPayload,
    responses(
        (status = 201, description = "Nível criado", body = LoyaltyTier),
        (status = 409, description = "Já existe nível com essa pontuação")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_tier(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<CreateTierPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let tier = app_state
        .loyalty_service
        .create_tier(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(tier)))
}

// DELETE /api/loyalty/tiers/{id}
#[utoipa::path(
    delete,
    path = "/api/loyalty/tiers/{id}",
    tag = "Loyalty",
    params(("id" = Uuid, Path, description = "ID do nível")),
    responses(
        (status = 204, description = "Nível removido"),
        (status = 400, description = "A tabela ficaria sem nível base"),
        (status = 404, description = "Nível não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_tier(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .loyalty_service
        .delete_tier(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}

// GET /api/loyalty/resolve
#[utoipa::path(
    get,
    path = "/api/loyalty/resolve",
    tag = "Loyalty",
    params(ResolveQuery),
    responses(
        (status = 200, description = "Nível correspondente à pontuação", body = TierResolution),
        (status = 400, description = "Pontuação negativa")
    ),
    security(("api_jwt" = []))
)]
pub async fn resolve_tier(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(query): Query<ResolveQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let resolution = app_state
        .loyalty_service
        .resolve(query.points)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(resolution)))
}
