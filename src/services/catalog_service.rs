// src/services/catalog_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::CatalogRepository,
    models::catalog::{Service, ServicePayload},
};

#[derive(Clone)]
pub struct CatalogService {
    pool: PgPool,
    repo: CatalogRepository,
}

impl CatalogService {
    pub fn new(pool: PgPool, repo: CatalogRepository) -> Self {
        Self { pool, repo }
    }

    pub async fn list_services(&self) -> Result<Vec<Service>, AppError> {
        self.repo.list(&self.pool).await
    }

    pub async fn get_service(&self, id: Uuid) -> Result<Service, AppError> {
        self.repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or(AppError::NotFound("serviço"))
    }

    pub async fn create_service(&self, input: &ServicePayload) -> Result<Service, AppError> {
        self.repo.create(&self.pool, input).await
    }

    // Mudar o preço não mexe nos agendamentos: eles guardam o preço da época
    pub async fn update_service(&self, id: Uuid, input: &ServicePayload) -> Result<Service, AppError> {
        self.repo
            .update(&self.pool, id, input)
            .await?
            .ok_or(AppError::NotFound("serviço"))
    }

    pub async fn delete_service(&self, id: Uuid) -> Result<(), AppError> {
        match self.repo.delete(&self.pool, id).await? {
            0 => Err(AppError::NotFound("serviço")),
            _ => Ok(()),
        }
    }
}
