// src/services/report_service.rs

use chrono::{NaiveDate, Utc};
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::{BarberRepository, BookingRepository, CatalogRepository},
    models::reports::{
        CommissionEntry, EntityBreakdown, Granularity, PaymentMethodEntry, ReportExport,
        ReportFilter, RevenueSummary, TimeSlotHistogram, TrendBucket,
    },
    services::{analytics, booking_service::validate_period, settings_service::SettingsService},
};

// Janela padrão da exportação completa
const EXPORT_TREND_MONTHS: u32 = 6;
pub const MAX_TREND_BUCKETS: u32 = 366;

#[derive(Clone)]
pub struct ReportService {
    pool: PgPool,
    booking_repo: BookingRepository,
    barber_repo: BarberRepository,
    catalog_repo: CatalogRepository,
    settings_service: SettingsService,
}

// Leaderboards: maior receita primeiro
fn by_revenue_desc(mut rows: Vec<EntityBreakdown>) -> Vec<EntityBreakdown> {
    rows.sort_by(|a, b| b.metrics.total_revenue.cmp(&a.metrics.total_revenue));
    rows
}

fn by_commission_desc(mut rows: Vec<CommissionEntry>) -> Vec<CommissionEntry> {
    rows.sort_by(|a, b| b.commission.cmp(&a.commission));
    rows
}

impl ReportService {
    pub fn new(
        pool: PgPool,
        booking_repo: BookingRepository,
        barber_repo: BarberRepository,
        catalog_repo: CatalogRepository,
        settings_service: SettingsService,
    ) -> Self {
        Self { pool, booking_repo, barber_repo, catalog_repo, settings_service }
    }

    pub async fn summary(&self, filter: &ReportFilter) -> Result<RevenueSummary, AppError> {
        validate_period(filter)?;
        let bookings = self.booking_repo.list(&self.pool, filter).await?;
        Ok(analytics::summarize(&bookings, filter))
    }

    pub async fn barbers(&self, filter: &ReportFilter) -> Result<Vec<EntityBreakdown>, AppError> {
        validate_period(filter)?;
        let (bookings, barbers) = tokio::try_join!(
            self.booking_repo.list(&self.pool, filter),
            self.barber_repo.list(&self.pool),
        )?;
        Ok(by_revenue_desc(analytics::breakdown_by_barber(&bookings, &barbers, filter)))
    }

    pub async fn services(&self, filter: &ReportFilter) -> Result<Vec<EntityBreakdown>, AppError> {
        validate_period(filter)?;
        let (bookings, services) = tokio::try_join!(
            self.booking_repo.list(&self.pool, filter),
            self.catalog_repo.list(&self.pool),
        )?;
        Ok(by_revenue_desc(analytics::breakdown_by_service(&bookings, &services, filter)))
    }

    pub async fn commissions(&self, filter: &ReportFilter) -> Result<Vec<CommissionEntry>, AppError> {
        validate_period(filter)?;
        let (bookings, barbers, rate) = tokio::try_join!(
            self.booking_repo.list(&self.pool, filter),
            self.barber_repo.list(&self.pool),
            self.settings_service.commission_rate(),
        )?;

        Ok(by_commission_desc(analytics::commissions(&bookings, &barbers, rate, filter)))
    }

    pub async fn trend(
        &self,
        buckets: u32,
        granularity: Granularity,
        today: NaiveDate,
    ) -> Result<Vec<TrendBucket>, AppError> {
        if buckets == 0 || buckets > MAX_TREND_BUCKETS {
            return Err(AppError::InvalidInput(format!(
                "O número de períodos deve estar entre 1 e {}.",
                MAX_TREND_BUCKETS
            )));
        }
        // Só o período dos baldes sai do banco
        let window = analytics::trend_window(today, buckets, granularity)?;
        let bookings = self.booking_repo.list(&self.pool, &window).await?;
        analytics::trend(&bookings, buckets, granularity, today)
    }

    pub async fn time_slots(&self, filter: &ReportFilter) -> Result<TimeSlotHistogram, AppError> {
        validate_period(filter)?;
        let bookings = self.booking_repo.list(&self.pool, filter).await?;
        let histogram = analytics::time_slots(&bookings);
        if histogram.outside_hours > 0 {
            tracing::debug!(
                "{} agendamento(s) fora das faixas de horário",
                histogram.outside_hours
            );
        }
        Ok(histogram)
    }

    pub async fn payment_methods(&self, filter: &ReportFilter) -> Result<Vec<PaymentMethodEntry>, AppError> {
        validate_period(filter)?;
        let bookings = self.booking_repo.list(&self.pool, filter).await?;
        Ok(analytics::payment_methods(&bookings))
    }

    // Tudo de uma vez, a partir de uma única carga
    pub async fn export(&self, filter: &ReportFilter, today: NaiveDate) -> Result<ReportExport, AppError> {
        validate_period(filter)?;
        let all = ReportFilter::default();
        let (all_bookings, barbers, services, rate) = tokio::try_join!(
            self.booking_repo.list(&self.pool, &all),
            self.barber_repo.list(&self.pool),
            self.catalog_repo.list(&self.pool),
            self.settings_service.commission_rate(),
        )?;
        let period = analytics::filter_bookings(&all_bookings, filter);

        Ok(ReportExport {
            generated_at: Utc::now(),
            summary: analytics::summarize(&all_bookings, filter),
            barbers: by_revenue_desc(analytics::breakdown_by_barber(&all_bookings, &barbers, filter)),
            services: by_revenue_desc(analytics::breakdown_by_service(&all_bookings, &services, filter)),
            commissions: by_commission_desc(analytics::commissions(&all_bookings, &barbers, rate, filter)),
            monthly_trend: analytics::trend(&all_bookings, EXPORT_TREND_MONTHS, Granularity::Month, today)?,
            time_slots: analytics::time_slots(period.iter().copied()),
            payment_methods: analytics::payment_methods(period.iter().copied()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    use crate::services::analytics::tests::dec;

    fn breakdown(name: &str, revenue: &str) -> EntityBreakdown {
        EntityBreakdown {
            id: Uuid::new_v4(),
            name: name.to_string(),
            metrics: RevenueSummary {
                total_bookings: 1,
                completed_bookings: 1,
                cancelled_bookings: 0,
                total_revenue: dec(revenue),
                average_ticket: dec(revenue),
                completion_rate: 100.0,
                cancellation_rate: 0.0,
            },
            percentage: 0.0,
        }
    }

    fn commission(name: &str, value: &str) -> CommissionEntry {
        CommissionEntry {
            barber_id: Uuid::new_v4(),
            barber_name: name.to_string(),
            services_count: 1,
            revenue: Decimal::ZERO,
            rate: dec("0.40"),
            commission: dec(value),
        }
    }

    #[test]
    fn leaderboard_puts_highest_revenue_first() {
        let rows = vec![
            breakdown("Corte", "45.00"),
            breakdown("Barba", "120.50"),
            breakdown("Sobrancelha", "0"),
            breakdown("Pigmentação", "80"),
        ];

        let names: Vec<String> = by_revenue_desc(rows).into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["Barba", "Pigmentação", "Corte", "Sobrancelha"]);
    }

    #[test]
    fn commissions_sorted_by_amount_descending() {
        let rows = vec![
            commission("João", "18.00"),
            commission("Pedro", "72.40"),
            commission("Lucas", "18.01"),
        ];

        let sorted = by_commission_desc(rows);
        let amounts: Vec<Decimal> = sorted.iter().map(|c| c.commission).collect();
        assert_eq!(amounts, vec![dec("72.40"), dec("18.01"), dec("18.00")]);
        assert_eq!(sorted[0].barber_name, "Pedro");
    }

    #[test]
    fn sorting_empty_leaderboards_is_a_no_op() {
        assert!(by_revenue_desc(Vec::new()).is_empty());
        assert!(by_commission_desc(Vec::new()).is_empty());
    }
}
