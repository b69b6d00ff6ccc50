// src/common/error.rs

use std::collections::HashMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::middleware::i18n::Locale;

// O erro de domínio. Os serviços e repositórios só conhecem este tipo.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Entrada inválida: {0}")]
    InvalidInput(String),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Já existe um administrador cadastrado")]
    AdminAlreadyExists,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Registro não encontrado: {0}")]
    NotFound(&'static str),

    #[error("Violação de unicidade: {0}")]
    UniqueConstraintViolation(String),

    #[error("Registro referenciado por agendamentos")]
    ReferencedByBookings,

    // Tabela de níveis vazia ou sem piso: erro de configuração, não de usuário
    #[error("Configuração de fidelidade inválida: {0}")]
    LoyaltyConfig(String),

    #[error("Telefone inválido: {0}")]
    InvalidPhone(String),

    #[error("WhatsApp não configurado")]
    WhatsAppUnavailable,

    #[error("Erro do WhatsApp: {0}")]
    WhatsApp(String),

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("Erro ao gerar CSV: {0}")]
    CsvError(#[from] csv::Error),
}

// O erro que sai pela API: status + mensagem já traduzida.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub details: Option<Value>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into(), details: None }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = json!({ "success": false, "error": self.message });
        if let Some(details) = self.details {
            body["details"] = details;
        }
        (self.status, Json(body)).into_response()
    }
}

fn tr(locale: &Locale, pt: &str, en: &str) -> String {
    if locale.is_portuguese() { pt.to_string() } else { en.to_string() }
}

impl AppError {
    pub fn to_api_error(&self, locale: &Locale) -> ApiError {
        match self {
            AppError::ValidationError(errors) => {
                let mut details: HashMap<String, Vec<String>> = HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                ApiError {
                    status: StatusCode::BAD_REQUEST,
                    message: tr(locale, "Um ou mais campos são inválidos.", "One or more fields are invalid."),
                    details: Some(json!(details)),
                }
            }
            AppError::InvalidInput(msg) => ApiError::new(StatusCode::BAD_REQUEST, msg.clone()),
            AppError::EmailAlreadyExists => ApiError::new(
                StatusCode::CONFLICT,
                tr(locale, "Este e-mail já está em uso.", "This e-mail is already in use."),
            ),
            AppError::InvalidCredentials => ApiError::new(
                StatusCode::UNAUTHORIZED,
                tr(locale, "E-mail ou senha inválidos.", "Invalid e-mail or password."),
            ),
            AppError::InvalidToken => ApiError::new(
                StatusCode::UNAUTHORIZED,
                tr(locale, "Token de autenticação inválido ou ausente.", "Missing or invalid authentication token."),
            ),
            AppError::AdminAlreadyExists => ApiError::new(
                StatusCode::FORBIDDEN,
                tr(
                    locale,
                    "Já existe um administrador. Peça a ele para cadastrar você.",
                    "An administrator already exists. Ask them to register you.",
                ),
            ),
            AppError::UserNotFound => ApiError::new(
                StatusCode::NOT_FOUND,
                tr(locale, "Usuário não encontrado.", "User not found."),
            ),
            AppError::NotFound(entity) => ApiError::new(
                StatusCode::NOT_FOUND,
                tr(
                    locale,
                    &format!("Registro não encontrado ({}).", entity),
                    &format!("Record not found ({}).", entity),
                ),
            ),
            AppError::UniqueConstraintViolation(msg) => ApiError::new(StatusCode::CONFLICT, msg.clone()),
            AppError::ReferencedByBookings => ApiError::new(
                StatusCode::CONFLICT,
                tr(
                    locale,
                    "Não é possível excluir: existem agendamentos vinculados.",
                    "Cannot delete: there are bookings referencing this record.",
                ),
            ),
            AppError::InvalidPhone(phone) => ApiError::new(
                StatusCode::BAD_REQUEST,
                tr(
                    locale,
                    &format!("Número de telefone inválido: {}", phone),
                    &format!("Invalid phone number: {}", phone),
                ),
            ),
            AppError::WhatsAppUnavailable => ApiError::new(
                StatusCode::SERVICE_UNAVAILABLE,
                tr(
                    locale,
                    "O serviço do WhatsApp não está disponível neste ambiente.",
                    "WhatsApp is not available in this environment.",
                ),
            ),
            // A mensagem da biblioteca passa adiante, como 500
            AppError::WhatsApp(msg) => {
                tracing::error!("Erro do WhatsApp: {}", msg);
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
            e => {
                tracing::error!("Erro Interno do Servidor: {:?}", e);
                ApiError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    tr(locale, "Ocorreu um erro inesperado.", "An unexpected error occurred."),
                )
            }
        }
    }
}

// Usado pelo middleware, onde ainda não temos o idioma da requisição.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_api_error(&Locale::default()).into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        err.to_api_error(&Locale::default())
    }
}

// Converte violações de FK/unicidade do Postgres nos erros de domínio.
pub(crate) fn map_constraint_error(e: sqlx::Error, unique_message: &str) -> AppError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return AppError::UniqueConstraintViolation(unique_message.to_string());
        }
        if db_err.is_foreign_key_violation() {
            return AppError::ReferencedByBookings;
        }
    }
    e.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404_in_both_languages() {
        let pt = AppError::NotFound("cliente").to_api_error(&Locale("pt".into()));
        assert_eq!(pt.status, StatusCode::NOT_FOUND);
        assert!(pt.message.contains("cliente"));

        let en = AppError::NotFound("client").to_api_error(&Locale("en".into()));
        assert_eq!(en.message, "Record not found (client).");
    }

    #[test]
    fn whatsapp_errors_pass_message_through_as_500() {
        let api = AppError::WhatsApp("session closed".into()).to_api_error(&Locale::default());
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.message, "session closed");
    }

    #[test]
    fn internal_errors_hide_details() {
        let api = AppError::InternalServerError(anyhow::anyhow!("segredo")).to_api_error(&Locale("en".into()));
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.message, "An unexpected error occurred.");
    }

    #[test]
    fn bootstrap_after_first_admin_is_forbidden() {
        let api = AppError::AdminAlreadyExists.to_api_error(&Locale("en".into()));
        assert_eq!(api.status, StatusCode::FORBIDDEN);
        assert!(api.message.contains("administrator already exists"));
    }

    #[test]
    fn loyalty_config_is_a_server_error() {
        let api = AppError::LoyaltyConfig("vazia".into()).to_api_error(&Locale::default());
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn validation_errors_carry_field_details() {
        let mut errors = validator::ValidationErrors::new();
        let mut err = validator::ValidationError::new("length");
        err.message = Some("O nome é obrigatório.".into());
        errors.add("name", err);

        let api = AppError::ValidationError(errors).to_api_error(&Locale::default());
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        let details = api.details.expect("details");
        assert_eq!(details["name"][0], "O nome é obrigatório.");
    }
}
