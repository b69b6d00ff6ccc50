// src/handlers/reports.rs

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Local;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::reports::{
        CommissionEntry, EntityBreakdown, PaymentMethodEntry, ReportExport, ReportFilter,
        RevenueSummary, TimeSlotHistogram, TrendBucket, TrendQuery,
    },
};

const DEFAULT_TREND_BUCKETS: u32 = 6;

// GET /api/reports/summary
#[utoipa::path(
    get,
    path = "/api/reports/summary",
    tag = "Reports",
    params(ReportFilter),
    responses(
        (status = 200, description = "Receita, ticket médio e taxas do período", body = RevenueSummary),
        (status = 400, description = "Período inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn summary(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(filter): Query<ReportFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let summary = app_state
        .report_service
        .summary(&filter)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(summary)))
}

// GET /api/reports/barbers
#[utoipa::path(
    get,
    path = "/api/reports/barbers",
    tag = "Reports",
    params(ReportFilter),
    responses((status = 200, description = "Desempenho por barbeiro", body = Vec<EntityBreakdown>)),
    security(("api_jwt" = []))
)]
pub async fn barbers(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(filter): Query<ReportFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = app_state
        .report_service
        .barbers(&filter)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(rows)))
}

// GET /api/reports/services
#[utoipa::path(
    get,
    path = "/api/reports/services",
    tag = "Reports",
    params(ReportFilter),
    responses((status = 200, description = "Desempenho por serviço", body = Vec<EntityBreakdown>)),
    security(("api_jwt" = []))
)]
pub async fn services(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(filter): Query<ReportFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = app_state
        .report_service
        .services(&filter)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(rows)))
}

// GET /api/reports/commissions
#[utoipa::path(
    get,
    path = "/api/reports/commissions",
    tag = "Reports",
    params(ReportFilter),
    responses((status = 200, description = "Comissão por barbeiro", body = Vec<CommissionEntry>)),
    security(("api_jwt" = []))
)]
pub async fn commissions(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(filter): Query<ReportFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = app_state
        .report_service
        .commissions(&filter)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(rows)))
}

// GET /api/reports/trend
#[utoipa::path(
    get,
    path = "/api/reports/trend",
    tag = "Reports",
    params(TrendQuery),
    responses(
        (status = 200, description = "Série temporal, mais antigo primeiro", body = Vec<TrendBucket>),
        (status = 400, description = "Número de períodos inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn trend(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(query): Query<TrendQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let today = Local::now().date_naive();

    let buckets = app_state
        .report_service
        .trend(
            query.buckets.unwrap_or(DEFAULT_TREND_BUCKETS),
            query.granularity.unwrap_or_default(),
            today,
        )
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(buckets)))
}

// GET /api/reports/time-slots
#[utoipa::path(
    get,
    path = "/api/reports/time-slots",
    tag = "Reports",
    params(ReportFilter),
    responses((status = 200, description = "Agendamentos por faixa de horário", body = TimeSlotHistogram)),
    security(("api_jwt" = []))
)]
pub async fn time_slots(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(filter): Query<ReportFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let histogram = app_state
        .report_service
        .time_slots(&filter)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(histogram)))
}

// GET /api/reports/payment-methods
#[utoipa::path(
    get,
    path = "/api/reports/payment-methods",
    tag = "Reports",
    params(ReportFilter),
    responses((status = 200, description = "Receita por forma de pagamento", body = Vec<PaymentMethodEntry>)),
    security(("api_jwt" = []))
)]
pub async fn payment_methods(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(filter): Query<ReportFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = app_state
        .report_service
        .payment_methods(&filter)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(rows)))
}

// GET /api/reports/export
#[utoipa::path(
    get,
    path = "/api/reports/export",
    tag = "Reports",
    params(ReportFilter),
    responses((status = 200, description = "Relatório completo para download", body = ReportExport)),
    security(("api_jwt" = []))
)]
pub async fn export(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(filter): Query<ReportFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let today = Local::now().date_naive();

    let report = app_state
        .report_service
        .export(&filter, today)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let body = serde_json::to_string_pretty(&report)
        .map_err(|e| AppError::InternalServerError(e.into()).to_api_error(&locale))?;
    let disposition = format!(
        "attachment; filename=\"relatorio-{}.json\"",
        today.format("%Y-%m-%d")
    );

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}
