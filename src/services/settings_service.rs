// src/services/settings_service.rs

use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::SettingsRepository,
    models::settings::{BusinessSettings, UpdateSettingsRequest},
};

#[derive(Clone)]
pub struct SettingsService {
    pool: PgPool,
    repo: SettingsRepository,
    // Vem do ambiente; vale enquanto a barbearia não salvar a sua
    default_commission_rate: Decimal,
}

impl SettingsService {
    pub fn new(pool: PgPool, repo: SettingsRepository, default_commission_rate: Decimal) -> Self {
        Self { pool, repo, default_commission_rate }
    }

    pub async fn get_settings(&self) -> Result<BusinessSettings, AppError> {
        let settings = self.repo.get_settings(&self.pool).await?;
        Ok(settings.unwrap_or_else(|| BusinessSettings::with_defaults(self.default_commission_rate)))
    }

    pub async fn update_settings(&self, input: &UpdateSettingsRequest) -> Result<BusinessSettings, AppError> {
        input.opening_hours.validate()?;

        let settings = self.repo.update_settings(&self.pool, input).await?;
        tracing::info!(
            "⚙️ Configurações atualizadas (comissão: {})",
            settings.commission_rate
        );
        Ok(settings)
    }

    pub async fn commission_rate(&self) -> Result<Decimal, AppError> {
        Ok(self.get_settings().await?.commission_rate)
    }
}
