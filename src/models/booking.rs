// src/models/booking.rs

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::common::validation::validate_not_negative;

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "booking_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Agendado,    // Criado pelo painel
    Confirmado,  // Cliente confirmou
    EmAndamento, // Na cadeira
    Concluido,   // Conta para receita e fidelidade
    Cancelado,
}

impl BookingStatus {
    pub fn is_completed(self) -> bool {
        self == BookingStatus::Concluido
    }

    pub fn is_cancelled(self) -> bool {
        self == BookingStatus::Cancelado
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "payment_method", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Dinheiro,
    Pix,
    CartaoCredito,
    CartaoDebito,
}

impl PaymentMethod {
    pub fn label(self) -> &'static str {
        match self {
            PaymentMethod::Dinheiro => "dinheiro",
            PaymentMethod::Pix => "pix",
            PaymentMethod::CartaoCredito => "cartao_credito",
            PaymentMethod::CartaoDebito => "cartao_debito",
        }
    }
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    pub client_id: Uuid,
    pub barber_id: Uuid,
    pub service_id: Uuid,

    #[schema(value_type = String, format = Date, example = "2026-10-19")]
    pub booking_date: NaiveDate,

    // Horário local da barbearia, sem fuso
    #[schema(value_type = String, example = "14:30:00")]
    pub booking_time: NaiveTime,

    pub status: BookingStatus,

    // Cópia do preço do serviço no momento do agendamento
    #[schema(example = "45.00")]
    pub total_price: Decimal,

    pub payment_method: Option<PaymentMethod>,
    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- Payloads ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingPayload {
    pub client_id: Uuid,
    pub barber_id: Uuid,
    pub service_id: Uuid,

    #[schema(value_type = String, format = Date, example = "2026-10-20")]
    pub booking_date: NaiveDate,

    #[schema(value_type = String, example = "09:30:00")]
    pub booking_time: NaiveTime,

    // Se ausente, usamos o preço atual do serviço
    #[validate(custom(function = "validate_not_negative"))]
    #[schema(example = "45.00")]
    pub total_price: Option<Decimal>,

    pub payment_method: Option<PaymentMethod>,

    #[validate(length(max = 500, message = "A observação deve ter no máximo 500 caracteres."))]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookingPayload {
    pub client_id: Uuid,
    pub barber_id: Uuid,
    pub service_id: Uuid,

    #[schema(value_type = String, format = Date, example = "2026-10-20")]
    pub booking_date: NaiveDate,

    #[schema(value_type = String, example = "10:00:00")]
    pub booking_time: NaiveTime,

    pub status: BookingStatus,

    #[validate(custom(function = "validate_not_negative"))]
    #[schema(example = "50.00")]
    pub total_price: Decimal,

    pub payment_method: Option<PaymentMethod>,

    #[validate(length(max = 500, message = "A observação deve ter no máximo 500 caracteres."))]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookingStatusPayload {
    pub status: BookingStatus,
    // Normalmente informado junto com a conclusão
    pub payment_method: Option<PaymentMethod>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_uses_portuguese_snake_case_on_the_wire() {
        let json = serde_json::to_string(&BookingStatus::EmAndamento).unwrap();
        assert_eq!(json, "\"em_andamento\"");

        let parsed: BookingStatus = serde_json::from_str("\"concluido\"").unwrap();
        assert!(parsed.is_completed());
    }

    #[test]
    fn payment_method_labels_match_serde_names() {
        for method in [
            PaymentMethod::Dinheiro,
            PaymentMethod::Pix,
            PaymentMethod::CartaoCredito,
            PaymentMethod::CartaoDebito,
        ] {
            let json = serde_json::to_string(&method).unwrap();
            assert_eq!(json, format!("\"{}\"", method.label()));
        }
    }
}
