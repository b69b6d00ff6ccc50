// src/db/catalog_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{map_constraint_error, AppError},
    models::catalog::{Service, ServicePayload},
};

#[derive(Clone, Default)]
pub struct CatalogRepository;

impl CatalogRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn list<'e, E>(&self, executor: E) -> Result<Vec<Service>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, Service>("SELECT * FROM services ORDER BY name ASC")
            .fetch_all(executor)
            .await?;
        Ok(rows)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Service>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, Service>("SELECT * FROM services WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(row)
    }

    pub async fn create<'e, E>(&self, executor: E, input: &ServicePayload) -> Result<Service, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, Service>(
            r#"
            INSERT INTO services (name, price, duration_minutes, description, is_active)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&input.name)
        .bind(input.price)
        .bind(input.duration_minutes)
        .bind(&input.description)
        .bind(input.is_active)
        .fetch_one(executor)
        .await?;
        Ok(row)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        input: &ServicePayload,
    ) -> Result<Option<Service>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, Service>(
            r#"
            UPDATE services
            SET name = $2, price = $3, duration_minutes = $4, description = $5, is_active = $6, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(input.price)
        .bind(input.duration_minutes)
        .bind(&input.description)
        .bind(input.is_active)
        .fetch_optional(executor)
        .await?;
        Ok(row)
    }

    // Retorna quantas linhas foram removidas (0 = não existia)
    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM services WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await
            .map_err(|e| map_constraint_error(e, "Serviço duplicado."))?;
        Ok(result.rows_affected())
    }
}
