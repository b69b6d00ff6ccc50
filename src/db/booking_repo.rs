// src/db/booking_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        booking::{Booking, BookingStatus, CreateBookingPayload, PaymentMethod, UpdateBookingPayload},
        reports::ReportFilter,
    },
};

// Violação de FK num agendamento = cliente/barbeiro/serviço inexistente
fn map_reference_error(e: sqlx::Error) -> AppError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_foreign_key_violation() {
            return AppError::InvalidInput(
                "Cliente, barbeiro ou serviço informado não existe.".to_string(),
            );
        }
    }
    e.into()
}

#[derive(Clone, Default)]
pub struct BookingRepository;

impl BookingRepository {
    pub fn new() -> Self {
        Self
    }

    // Todos os filtros são opcionais: NULL desliga a condição
    pub async fn list<'e, E>(&self, executor: E, filter: &ReportFilter) -> Result<Vec<Booking>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let bookings = sqlx::query_as::<_, Booking>(
            r#"
            SELECT * FROM bookings
            WHERE ($1::date IS NULL OR booking_date >= $1)
              AND ($2::date IS NULL OR booking_date < $2)
              AND ($3::uuid IS NULL OR barber_id = $3)
              AND ($4::uuid IS NULL OR service_id = $4)
            ORDER BY booking_date ASC, booking_time ASC
            "#,
        )
        .bind(filter.start)
        .bind(filter.end)
        .bind(filter.barber_id)
        .bind(filter.service_id)
        .fetch_all(executor)
        .await?;
        Ok(bookings)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Booking>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let booking = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(booking)
    }

    // Todo agendamento nasce como 'agendado'
    pub async fn create<'e, E>(
        &self,
        executor: E,
        input: &CreateBookingPayload,
        total_price: Decimal,
    ) -> Result<Booking, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let booking = sqlx::query_as::<_, Booking>(
            r#"
            INSERT INTO bookings (
                client_id, barber_id, service_id, booking_date, booking_time,
                status, total_price, payment_method, notes
            )
            VALUES ($1, $2, $3, $4, $5, 'agendado', $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(input.client_id)
        .bind(input.barber_id)
        .bind(input.service_id)
        .bind(input.booking_date)
        .bind(input.booking_time)
        .bind(total_price)
        .bind(input.payment_method)
        .bind(&input.notes)
        .fetch_one(executor)
        .await
        .map_err(map_reference_error)?;
        Ok(booking)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        input: &UpdateBookingPayload,
    ) -> Result<Option<Booking>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let booking = sqlx::query_as::<_, Booking>(
            r#"
            UPDATE bookings
            SET client_id = $2, barber_id = $3, service_id = $4,
                booking_date = $5, booking_time = $6, status = $7,
                total_price = $8, payment_method = $9, notes = $10,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(input.client_id)
        .bind(input.barber_id)
        .bind(input.service_id)
        .bind(input.booking_date)
        .bind(input.booking_time)
        .bind(input.status)
        .bind(input.total_price)
        .bind(input.payment_method)
        .bind(&input.notes)
        .fetch_optional(executor)
        .await
        .map_err(map_reference_error)?;
        Ok(booking)
    }

    // Mantém a forma de pagamento atual se nenhuma for informada
    pub async fn update_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: BookingStatus,
        payment_method: Option<PaymentMethod>,
    ) -> Result<Option<Booking>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let booking = sqlx::query_as::<_, Booking>(
            r#"
            UPDATE bookings
            SET status = $2,
                payment_method = COALESCE($3, payment_method),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(payment_method)
        .fetch_optional(executor)
        .await?;
        Ok(booking)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM bookings WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
