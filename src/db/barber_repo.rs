// src/db/barber_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{map_constraint_error, AppError},
    models::barber::{Barber, BarberPayload},
};

#[derive(Clone, Default)]
pub struct BarberRepository;

impl BarberRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn list<'e, E>(&self, executor: E) -> Result<Vec<Barber>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, Barber>("SELECT * FROM barbers ORDER BY name ASC")
            .fetch_all(executor)
            .await?;
        Ok(rows)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Barber>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, Barber>("SELECT * FROM barbers WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(row)
    }

    pub async fn create<'e, E>(&self, executor: E, input: &BarberPayload) -> Result<Barber, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, Barber>(
            r#"
            INSERT INTO barbers (name, phone, rating, experience_years, specialties, is_active)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&input.name)
        .bind(&input.phone)
        .bind(input.rating)
        .bind(input.experience_years)
        .bind(&input.specialties)
        .bind(input.is_active)
        .fetch_one(executor)
        .await?;
        Ok(row)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        input: &BarberPayload,
    ) -> Result<Option<Barber>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, Barber>(
            r#"
            UPDATE barbers
            SET name = $2, phone = $3, rating = $4, experience_years = $5, specialties = $6, is_active = $7, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.phone)
        .bind(input.rating)
        .bind(input.experience_years)
        .bind(&input.specialties)
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
        let result = sqlx::query("DELETE FROM barbers WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await
            .map_err(|e| map_constraint_error(e, "Barbeiro duplicado."))?;
        Ok(result.rows_affected())
    }
}
