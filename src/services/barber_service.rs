// src/services/barber_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::BarberRepository,
    models::barber::{Barber, BarberPayload},
};

#[derive(Clone)]
pub struct BarberService {
    pool: PgPool,
    repo: BarberRepository,
}

impl BarberService {
    pub fn new(pool: PgPool, repo: BarberRepository) -> Self {
        Self { pool, repo }
    }

    pub async fn list_barbers(&self) -> Result<Vec<Barber>, AppError> {
        self.repo.list(&self.pool).await
    }

    pub async fn get_barber(&self, id: Uuid) -> Result<Barber, AppError> {
        self.repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or(AppError::NotFound("barbeiro"))
    }

    pub async fn create_barber(&self, input: &BarberPayload) -> Result<Barber, AppError> {
        self.repo.create(&self.pool, input).await
    }

    pub async fn update_barber(&self, id: Uuid, input: &BarberPayload) -> Result<Barber, AppError> {
        self.repo
            .update(&self.pool, id, input)
            .await?
            .ok_or(AppError::NotFound("barbeiro"))
    }

    // Barbeiro com histórico não sai: desative com is_active = false
    pub async fn delete_barber(&self, id: Uuid) -> Result<(), AppError> {
        match self.repo.delete(&self.pool, id).await? {
            0 => Err(AppError::NotFound("barbeiro")),
            _ => Ok(()),
        }
    }
}
