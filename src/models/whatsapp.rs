// src/models/whatsapp.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

// Ciclo de vida da sessão, espelhado do cliente subjacente
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Unavailable, // Ambiente sem ponte configurada
    Disconnected,
    Initializing,
    QrPending,
    Connected,
    Error,
}

impl SessionStatus {
    pub fn is_connected(self) -> bool {
        self == SessionStatus::Connected
    }
}

// Estado completo da sessão, guardado atrás de um único mutex
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub status: SessionStatus,
    pub qr_code: Option<String>,
    pub last_error: Option<String>,
    pub connected_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl SessionState {
    pub fn new(status: SessionStatus) -> Self {
        Self {
            status,
            qr_code: None,
            last_error: None,
            connected_at: None,
            updated_at: Utc::now(),
        }
    }
}

// O que o cliente reporta ao ser consultado
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientStatus {
    pub status: SessionStatus,
    pub qr_code: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SendMessagePayload {
    #[validate(length(min = 1, message = "O telefone é obrigatório."))]
    #[schema(example = "(11) 98888-7777")]
    pub phone: String,

    #[validate(length(min = 1, max = 4096, message = "A mensagem deve ter entre 1 e 4096 caracteres."))]
    #[schema(example = "Olá! Seu horário está confirmado para amanhã às 14h.")]
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub success: bool,
    pub status: SessionStatus,
    pub connected: bool,
    pub has_qr: bool,
    pub last_error: Option<String>,
    pub connected_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QrResponse {
    pub success: bool,
    pub status: SessionStatus,
    pub qr_code: Option<String>,
    // QR renderizado, pronto para <img src="data:image/svg+xml...">
    pub qr_svg: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageResponse {
    pub success: bool,
    #[schema(example = "5511988887777")]
    pub phone: String,
    pub message_id: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ActionResponse {
    pub success: bool,
    pub message: String,
}
