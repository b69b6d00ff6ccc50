// src/db/client_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{map_constraint_error, AppError},
    models::client::{Client, ClientPayload},
};

#[derive(Clone, Default)]
pub struct ClientRepository;

impl ClientRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn list<'e, E>(&self, executor: E) -> Result<Vec<Client>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let clients = sqlx::query_as::<_, Client>("SELECT * FROM clients ORDER BY name ASC")
            .fetch_all(executor)
            .await?;
        Ok(clients)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Client>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let client = sqlx::query_as::<_, Client>("SELECT * FROM clients WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(client)
    }

    pub async fn create<'e, E>(&self, executor: E, input: &ClientPayload) -> Result<Client, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let client = sqlx::query_as::<_, Client>(
            r#"
            INSERT INTO clients (name, phone, email, birth_date, notes)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&input.name)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(input.birth_date)
        .bind(&input.notes)
        .fetch_one(executor)
        .await?;
        Ok(client)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        input: &ClientPayload,
    ) -> Result<Option<Client>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let client = sqlx::query_as::<_, Client>(
            r#"
            UPDATE clients
            SET name = $2, phone = $3, email = $4, birth_date = $5, notes = $6, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(input.birth_date)
        .bind(&input.notes)
        .fetch_optional(executor)
        .await?;
        Ok(client)
    }

    // Retorna quantas linhas foram removidas (0 = não existia)
    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await
            .map_err(|e| map_constraint_error(e, "Cliente duplicado."))?;
        Ok(result.rows_affected())
    }
}
