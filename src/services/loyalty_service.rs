// src/services/loyalty_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::LoyaltyRepository,
    models::loyalty::{CreateTierPayload, LoyaltyTier, TierResolution},
    services::loyalty::TierTable,
};

#[derive(Clone)]
pub struct LoyaltyService {
    pool: PgPool,
    repo: LoyaltyRepository,
}

impl LoyaltyService {
    pub fn new(pool: PgPool, repo: LoyaltyRepository) -> Self {
        Self { pool, repo }
    }

    // Recarregada a cada uso: o nível nunca é salvo no cliente
    pub async fn load_table(&self) -> Result<TierTable, AppError> {
        let tiers = self.repo.list_tiers(&self.pool).await?;
        TierTable::new(tiers)
    }

    pub async fn list_tiers(&self) -> Result<Vec<LoyaltyTier>, AppError> {
        self.repo.list_tiers(&self.pool).await
    }

    pub async fn create_tier(&self, input: &CreateTierPayload) -> Result<LoyaltyTier, AppError> {
        let tier = self.repo.create_tier(&self.pool, input).await?;
        tracing::info!("🏅 Nível '{}' criado a partir de {} pontos", tier.name, tier.min_points);
        Ok(tier)
    }

    // A tabela precisa continuar válida depois da exclusão
    pub async fn delete_tier(&self, id: Uuid) -> Result<(), AppError> {
        let tiers = self.repo.list_tiers(&self.pool).await?;
        if !tiers.iter().any(|t| t.id == id) {
            return Err(AppError::NotFound("nível de fidelidade"));
        }

        let remaining: Vec<LoyaltyTier> = tiers.into_iter().filter(|t| t.id != id).collect();
        TierTable::new(remaining).map_err(|_| {
            AppError::InvalidInput("O nível base (0 pontos) não pode ser removido.".to_string())
        })?;

        self.repo.delete_tier(&self.pool, id).await?;
        Ok(())
    }

    pub async fn resolve(&self, points: i64) -> Result<TierResolution, AppError> {
        if points < 0 {
            return Err(AppError::InvalidInput("Pontuação não pode ser negativa.".to_string()));
        }
        Ok(self.load_table().await?.resolution(points))
    }
}
