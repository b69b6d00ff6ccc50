// src/models/reports.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

// Filtro comum aos relatórios e à listagem de agendamentos.
// 'start' é inclusivo e 'end' exclusivo, sobre booking_date.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ReportFilter {
    #[param(value_type = Option<String>, format = Date)]
    pub start: Option<NaiveDate>,
    #[param(value_type = Option<String>, format = Date)]
    pub end: Option<NaiveDate>,
    pub barber_id: Option<Uuid>,
    pub service_id: Option<Uuid>,
}

// 1. Resumo de receita e status
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RevenueSummary {
    pub total_bookings: usize,
    pub completed_bookings: usize,
    pub cancelled_bookings: usize,
    pub total_revenue: Decimal,
    pub average_ticket: Decimal,
    pub completion_rate: f64,   // %
    pub cancellation_rate: f64, // %
}

// 2. Quebra por barbeiro ou por serviço
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EntityBreakdown {
    pub id: Uuid,
    pub name: String,
    #[serde(flatten)]
    pub metrics: RevenueSummary,
    // Participação nos agendamentos do período
    pub percentage: f64,
}

// 3. Comissão por barbeiro
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommissionEntry {
    pub barber_id: Uuid,
    pub barber_name: String,
    pub services_count: usize,
    pub revenue: Decimal,
    pub rate: Decimal,
    pub commission: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    #[default]
    Month,
    Day,
}

// 4. Série temporal (mais antigo primeiro)
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrendBucket {
    #[schema(example = "10/2026")]
    pub label: String,
    #[schema(value_type = String, format = Date)]
    pub start: NaiveDate,
    #[schema(value_type = String, format = Date)]
    pub end: NaiveDate,
    pub bookings: usize,
    pub completed: usize,
    pub revenue: Decimal,
}

// 5. Histograma por faixa de horário
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlotHistogram {
    pub morning: usize,   // [8, 12)
    pub afternoon: usize, // [12, 17)
    pub evening: usize,   // [17, 20)
    // Fora de todas as faixas: não entra em nenhuma delas
    pub outside_hours: usize,
}

impl TimeSlotHistogram {
    pub fn classified(&self) -> usize {
        self.morning + self.afternoon + self.evening
    }
}

// 6. Formas de pagamento (somente concluídos)
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodEntry {
    #[schema(example = "pix")]
    pub method: String,
    pub count: usize,
    pub revenue: Decimal,
    pub percentage: f64,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct TrendQuery {
    pub buckets: Option<u32>,
    pub granularity: Option<Granularity>,
}

// Exportação completa em JSON
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportExport {
    pub generated_at: DateTime<Utc>,
    pub summary: RevenueSummary,
    pub barbers: Vec<EntityBreakdown>,
    pub services: Vec<EntityBreakdown>,
    pub commissions: Vec<CommissionEntry>,
    pub monthly_trend: Vec<TrendBucket>,
    pub time_slots: TimeSlotHistogram,
    pub payment_methods: Vec<PaymentMethodEntry>,
}
