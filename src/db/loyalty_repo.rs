// src/db/loyalty_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{map_constraint_error, AppError},
    models::loyalty::{CreateTierPayload, LoyaltyTier},
};

#[derive(Clone, Default)]
pub struct LoyaltyRepository;

impl LoyaltyRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn list_tiers<'e, E>(&self, executor: E) -> Result<Vec<LoyaltyTier>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let tiers = sqlx::query_as::<_, LoyaltyTier>(
            "SELECT id, name, min_points, benefits, color FROM loyalty_tiers ORDER BY min_points ASC",
        )
        .fetch_all(executor)
        .await?;
        Ok(tiers)
    }

    pub async fn create_tier<'e, E>(
        &self,
        executor: E,
        input: &CreateTierPayload,
    ) -> Result<LoyaltyTier, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let tier = sqlx::query_as::<_, LoyaltyTier>(
            r#"
            INSERT INTO loyalty_tiers (name, min_points, benefits, color)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, min_points, benefits, color
            "#,
        )
        .bind(&input.name)
        .bind(input.min_points)
        .bind(&input.benefits)
        .bind(&input.color)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            map_constraint_error(
                e,
                &format!("Já existe um nível com {} pontos.", input.min_points),
            )
        })?;
        Ok(tier)
    }

    pub async fn delete_tier<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM loyalty_tiers WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
