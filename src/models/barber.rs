// src/models/barber.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::common::validation::validate_rating;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Barber {
    pub id: Uuid,

    #[schema(example = "Carlos Navalha")]
    pub name: String,

    pub phone: Option<String>,

    // Persistido de verdade, nada de nota sorteada
    #[schema(example = "4.8")]
    pub rating: Decimal,

    #[schema(example = 7)]
    pub experience_years: i32,

    #[schema(example = json!(["degradê", "barba"]))]
    pub specialties: Vec<String>,

    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BarberPayload {
    #[validate(length(min = 2, message = "O nome deve ter no mínimo 2 caracteres."))]
    pub name: String,

    pub phone: Option<String>,

    #[validate(custom(function = "validate_rating"))]
    #[serde(default)]
    pub rating: Decimal,

    #[validate(range(min = 0, max = 80, message = "Experiência inválida."))]
    #[serde(default)]
    pub experience_years: i32,

    #[serde(default)]
    pub specialties: Vec<String>,

    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}
