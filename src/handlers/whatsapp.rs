// src/handlers/whatsapp.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::whatsapp::{
        ActionResponse, QrResponse, SendMessagePayload, SendMessageResponse, SessionState,
        SessionStatus, StatusResponse,
    },
    services::whatsapp_service::render_qr_svg,
};

fn status_message(status: SessionStatus, locale: &Locale) -> Option<String> {
    let (pt, en) = match status {
        SessionStatus::QrPending => return None,
        SessionStatus::Connected => ("WhatsApp já está conectado.", "WhatsApp is already connected."),
        SessionStatus::Initializing => ("Inicializando, aguarde o QR Code.", "Initializing, wait for the QR code."),
        SessionStatus::Disconnected => ("Sessão desconectada. Gere um novo QR Code.", "Session disconnected. Generate a new QR code."),
        SessionStatus::Error => ("Sessão em erro. Reinicie o WhatsApp.", "Session failed. Restart WhatsApp."),
        SessionStatus::Unavailable => ("WhatsApp indisponível.", "WhatsApp unavailable."),
    };
    Some(if locale.is_portuguese() { pt } else { en }.to_string())
}

fn qr_response(state: SessionState, locale: &Locale) -> Result<QrResponse, AppError> {
    let qr_svg = state.qr_code.as_deref().map(render_qr_svg).transpose()?;
    let message = match (&state.qr_code, state.status) {
        (None, SessionStatus::QrPending) => Some(
            if locale.is_portuguese() { "QR Code ainda não disponível." } else { "QR code not available yet." }
                .to_string(),
        ),
        (_, status) => status_message(status, locale),
    };

    Ok(QrResponse {
        success: true,
        status: state.status,
        qr_code: state.qr_code,
        qr_svg,
        message,
    })
}

// GET /api/whatsapp/status
#[utoipa::path(
    get,
    path = "/api/whatsapp/status",
    tag = "WhatsApp",
    responses((status = 200, description = "Estado atual da sessão", body = StatusResponse))
)]
pub async fn status(State(app_state): State<AppState>) -> impl IntoResponse {
    let state = app_state.whatsapp.refresh().await;

    Json(StatusResponse {
        success: true,
        status: state.status,
        connected: state.status.is_connected(),
        has_qr: state.qr_code.is_some(),
        last_error: state.last_error,
        connected_at: state.connected_at,
    })
}

// GET /api/whatsapp/qr
#[utoipa::path(
    get,
    path = "/api/whatsapp/qr",
    tag = "WhatsApp",
    responses(
        (status = 200, description = "QR Code atual (se houver)", body = QrResponse),
        (status = 503, description = "WhatsApp não configurado")
    )
)]
pub async fn qr(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let state = app_state
        .whatsapp
        .qr()
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let response = qr_response(state, &locale).map_err(|e| e.to_api_error(&locale))?;
    Ok((StatusCode::OK, Json(response)))
}

// POST /api/whatsapp/send
#[utoipa::path(
    post,
    path = "/api/whatsapp/send",
    tag = "WhatsApp",
    request_body = SendMessagePayload,
    responses(
        (status = 200, description = "Mensagem enviada", body = SendMessageResponse),
        (status = 400, description = "Telefone ou mensagem inválidos"),
        (status = 500, description = "WhatsApp não conectado ou falha no envio"),
        (status = 503, description = "WhatsApp não configurado")
    )
)]
pub async fn send_message(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<SendMessagePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let (phone, message_id) = app_state
        .whatsapp
        .send(&payload.phone, &payload.message)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((
        StatusCode::OK,
        Json(SendMessageResponse { success: true, phone, message_id }),
    ))
}

// POST /api/whatsapp/restart
#[utoipa::path(
    post,
    path = "/api/whatsapp/restart",
    tag = "WhatsApp",
    responses(
        (status = 200, description = "Sessão reiniciada", body = ActionResponse),
        (status = 503, description = "WhatsApp não configurado")
    )
)]
pub async fn restart(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .whatsapp
        .restart()
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let message = if locale.is_portuguese() { "WhatsApp reiniciado." } else { "WhatsApp restarted." };
    Ok((
        StatusCode::OK,
        Json(ActionResponse { success: true, message: message.to_string() }),
    ))
}

// POST /api/whatsapp/disconnect
#[utoipa::path(
    post,
    path = "/api/whatsapp/disconnect",
    tag = "WhatsApp",
    responses(
        (status = 200, description = "Sessão encerrada", body = ActionResponse),
        (status = 503, description = "WhatsApp não configurado")
    )
)]
pub async fn disconnect(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .whatsapp
        .disconnect()
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let message = if locale.is_portuguese() { "WhatsApp desconectado." } else { "WhatsApp disconnected." };
    Ok((
        StatusCode::OK,
        Json(ActionResponse { success: true, message: message.to_string() }),
    ))
}

// POST /api/whatsapp/generate-qr
#[utoipa::path(
    post,
    path = "/api/whatsapp/generate-qr",
    tag = "WhatsApp",
    responses(
        (status = 200, description = "Nova sessão iniciada", body = QrResponse),
        (status = 400, description = "Sessão já conectada"),
        (status = 503, description = "WhatsApp não configurado")
    )
)]
pub async fn generate_qr(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let state = app_state
        .whatsapp
        .generate_qr()
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let response = qr_response(state, &locale).map_err(|e| e.to_api_error(&locale))?;
    Ok((StatusCode::OK, Json(response)))
}
