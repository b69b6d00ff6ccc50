// src/models/client.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: Uuid,

    #[schema(example = "João da Silva")]
    pub name: String,

    #[schema(example = "(11) 98888-7777")]
    pub phone: String,

    pub email: Option<String>,

    #[schema(value_type = Option<String>, format = Date, example = "1990-05-12")]
    pub birth_date: Option<NaiveDate>,

    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Payload de criação e edição (PUT substitui tudo)
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientPayload {
    #[validate(length(min = 2, message = "O nome deve ter no mínimo 2 caracteres."))]
    #[schema(example = "João da Silva")]
    pub name: String,

    #[validate(length(min = 8, message = "O telefone é obrigatório."))]
    #[schema(example = "(11) 98888-7777")]
    pub phone: String,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,

    #[schema(value_type = Option<String>, format = Date)]
    pub birth_date: Option<NaiveDate>,

    pub notes: Option<String>,
}

// Dados derivados dos agendamentos. Nunca persistido: recalculado a cada leitura.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientSummary {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,

    #[schema(value_type = Option<String>, format = Date)]
    pub birth_date: Option<NaiveDate>,

    pub total_bookings: usize,

    #[schema(example = "245.00")]
    pub total_spent: Decimal,

    #[schema(example = 24)]
    pub loyalty_points: i64,

    #[schema(example = "Prata")]
    pub tier: String,

    #[schema(value_type = Option<String>, format = Date)]
    pub last_visit: Option<NaiveDate>,

    pub favorite_service: Option<String>,
}
