// src/services/booking_service.rs

use chrono::Datelike;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{BookingRepository, CatalogRepository},
    models::{
        booking::{Booking, CreateBookingPayload, UpdateBookingPayload, UpdateBookingStatusPayload},
        reports::ReportFilter,
    },
    services::settings_service::SettingsService,
};

#[derive(Clone)]
pub struct BookingService {
    pool: PgPool,
    repo: BookingRepository,
    catalog_repo: CatalogRepository,
    settings_service: SettingsService,
}

impl BookingService {
    pub fn new(
        pool: PgPool,
        repo: BookingRepository,
        catalog_repo: CatalogRepository,
        settings_service: SettingsService,
    ) -> Self {
        Self { pool, repo, catalog_repo, settings_service }
    }

    pub async fn list_bookings(&self, filter: &ReportFilter) -> Result<Vec<Booking>, AppError> {
        validate_period(filter)?;
        self.repo.list(&self.pool, filter).await
    }

    pub async fn get_booking(&self, id: Uuid) -> Result<Booking, AppError> {
        self.repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or(AppError::NotFound("agendamento"))
    }

    pub async fn create_booking(&self, input: &CreateBookingPayload) -> Result<Booking, AppError> {
        let service = self.catalog_repo
            .find_by_id(&self.pool, input.service_id)
            .await?
            .ok_or(AppError::NotFound("serviço"))?;

        // Preço congelado no momento do agendamento
        let total_price = input.total_price.unwrap_or(service.price);

        let settings = self.settings_service.get_settings().await?;
        let day = settings.opening_hours.day(input.booking_date.weekday());
        if !day.contains(input.booking_time) {
            // O painel permite encaixes fora do expediente; só registramos
            tracing::warn!(
                "⏰ Agendamento fora do horário de funcionamento: {} {}",
                input.booking_date,
                input.booking_time
            );
        }

        let booking = self.repo.create(&self.pool, input, total_price).await?;
        tracing::info!("📅 Agendamento {} criado para {}", booking.id, booking.booking_date);
        Ok(booking)
    }

    pub async fn update_booking(&self, id: Uuid, input: &UpdateBookingPayload) -> Result<Booking, AppError> {
        self.repo
            .update(&self.pool, id, input)
            .await?
            .ok_or(AppError::NotFound("agendamento"))
    }

    // Sem transições automáticas: qualquer status pode ser definido pelo painel
    pub async fn update_status(
        &self,
        id: Uuid,
        input: &UpdateBookingStatusPayload,
    ) -> Result<Booking, AppError> {
        let booking = self.repo
            .update_status(&self.pool, id, input.status, input.payment_method)
            .await?
            .ok_or(AppError::NotFound("agendamento"))?;

        tracing::info!("🔄 Agendamento {} agora está {:?}", booking.id, booking.status);
        Ok(booking)
    }

    pub async fn delete_booking(&self, id: Uuid) -> Result<(), AppError> {
        match self.repo.delete(&self.pool, id).await? {
            0 => Err(AppError::NotFound("agendamento")),
            _ => Ok(()),
        }
    }
}

pub(crate) fn validate_period(filter: &ReportFilter) -> Result<(), AppError> {
    if let (Some(start), Some(end)) = (filter.start, filter.end) {
        if end < start {
            return Err(AppError::InvalidInput(
                "A data final deve ser posterior à data inicial.".to_string(),
            ));
        }
    }
    Ok(())
}
