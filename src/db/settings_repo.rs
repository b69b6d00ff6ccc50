use sqlx::{types::Json, Executor, Postgres};
use crate::{
    common::error::AppError,
    models::settings::{BusinessSettings, UpdateSettingsRequest},
};

#[derive(Clone, Default)]
pub struct SettingsRepository;

impl SettingsRepository {
    pub fn new() -> Self {
        Self
    }

    // Linha única; None quando a barbearia ainda não salvou nada
    pub async fn get_settings<'e, E>(&self, executor: E) -> Result<Option<BusinessSettings>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let settings = sqlx::query_as::<_, BusinessSettings>(
            r#"
            SELECT business_name, phone, address, commission_rate, opening_hours, updated_at
            FROM business_settings
            WHERE id = 1
            "#,
        )
        .fetch_optional(executor)
        .await?;

        Ok(settings)
    }

    pub async fn update_settings<'e, E>(
        &self,
        executor: E,
        input: &UpdateSettingsRequest,
    ) -> Result<BusinessSettings, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // UPSERT (Insert or Update)
        let settings = sqlx::query_as::<_, BusinessSettings>(
            r#"
            INSERT INTO business_settings (id, business_name, phone, address, commission_rate, opening_hours)
            VALUES (1, $1, $2, $3, $4, $5)
            ON CONFLICT (id)
            DO UPDATE SET
                business_name = EXCLUDED.business_name,
                phone = EXCLUDED.phone,
                address = EXCLUDED.address,
                commission_rate = EXCLUDED.commission_rate,
                opening_hours = EXCLUDED.opening_hours,
                updated_at = NOW()
            RETURNING business_name, phone, address, commission_rate, opening_hours, updated_at
            "#,
        )
        .bind(&input.business_name)
        .bind(&input.phone)
        .bind(&input.address)
        .bind(input.commission_rate)
        .bind(Json(&input.opening_hours))
        .fetch_one(executor)
        .await?;

        Ok(settings)
    }
}
