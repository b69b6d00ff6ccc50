// src/models/loyalty.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoyaltyTier {
    pub id: Uuid,

    #[schema(example = "Ouro")]
    pub name: String,

    // Pontos mínimos para alcançar o nível
    #[schema(example = 100)]
    pub min_points: i64,

    #[schema(example = json!(["10% de desconto", "Prioridade na agenda"]))]
    pub benefits: Vec<String>,

    #[schema(example = "#FFD700")]
    pub color: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTierPayload {
    #[validate(length(min = 1, message = "O nome do nível é obrigatório."))]
    pub name: String,

    #[validate(range(min = 0, message = "A pontuação mínima não pode ser negativa."))]
    pub min_points: i64,

    #[serde(default)]
    pub benefits: Vec<String>,

    pub color: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TierResolution {
    pub points: i64,
    pub tier: LoyaltyTier,
    // Próximo nível e quantos pontos faltam, se houver
    pub next_tier: Option<String>,
    pub points_to_next: Option<i64>,
}
