// src/models/catalog.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::common::validation::validate_not_negative;

// Um serviço do cardápio da barbearia (corte, barba, ...)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: Uuid,

    #[schema(example = "Corte + Barba")]
    pub name: String,

    #[schema(example = "65.00")]
    pub price: Decimal,

    #[schema(example = 45)]
    pub duration_minutes: i32,

    pub description: Option<String>,
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServicePayload {
    #[validate(length(min = 2, message = "O nome deve ter no mínimo 2 caracteres."))]
    pub name: String,

    #[validate(custom(function = "validate_not_negative"))]
    pub price: Decimal,

    #[validate(range(min = 5, max = 480, message = "A duração deve estar entre 5 e 480 minutos."))]
    pub duration_minutes: i32,

    pub description: Option<String>,

    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}
