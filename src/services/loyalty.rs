// src/services/loyalty.rs

use std::collections::HashMap;

use chrono::{Datelike, Days, NaiveDate};
use rust_decimal::{prelude::ToPrimitive, Decimal};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        booking::Booking,
        catalog::Service,
        client::{Client, ClientSummary},
        loyalty::{LoyaltyTier, TierResolution},
    },
};

// 1 ponto a cada R$ 10 gastos em atendimentos concluídos
pub const REAIS_PER_POINT: i64 = 10;

pub fn loyalty_points(total_spent: Decimal) -> i64 {
    if total_spent.is_sign_negative() {
        return 0;
    }
    (total_spent / Decimal::from(REAIS_PER_POINT))
        .floor()
        .to_i64()
        .unwrap_or(i64::MAX)
}

/// Tabela de níveis validada.
///
/// Guardada em ordem decrescente de `min_points`: o primeiro nível com
/// `min_points <= pontos` é o maior possível. A construção exige um piso
/// com `min_points == 0`, então `resolve` nunca falha.
#[derive(Debug, Clone)]
pub struct TierTable {
    tiers: Vec<LoyaltyTier>,
}

impl TierTable {
    pub fn new(mut tiers: Vec<LoyaltyTier>) -> Result<Self, AppError> {
        if tiers.is_empty() {
            return Err(AppError::LoyaltyConfig("nenhum nível cadastrado".to_string()));
        }
        if let Some(t) = tiers.iter().find(|t| t.min_points < 0) {
            return Err(AppError::LoyaltyConfig(format!(
                "o nível '{}' tem pontuação mínima negativa",
                t.name
            )));
        }
        if !tiers.iter().any(|t| t.min_points == 0) {
            return Err(AppError::LoyaltyConfig(
                "é obrigatório um nível base com 0 pontos".to_string(),
            ));
        }

        tiers.sort_by(|a, b| b.min_points.cmp(&a.min_points));
        if tiers.windows(2).any(|w| w[0].min_points == w[1].min_points) {
            return Err(AppError::LoyaltyConfig(
                "dois níveis com a mesma pontuação mínima".to_string(),
            ));
        }

        Ok(Self { tiers })
    }

    pub fn resolve(&self, points: i64) -> &LoyaltyTier {
        let floor = &self.tiers[self.tiers.len() - 1];
        self.tiers
            .iter()
            .find(|t| t.min_points <= points)
            .unwrap_or(floor)
    }

    // Menor nível ainda não alcançado
    pub fn next_tier(&self, points: i64) -> Option<&LoyaltyTier> {
        self.tiers.iter().rev().find(|t| t.min_points > points)
    }

    pub fn resolution(&self, points: i64) -> TierResolution {
        let next = self.next_tier(points);
        TierResolution {
            points,
            tier: self.resolve(points).clone(),
            next_tier: next.map(|t| t.name.clone()),
            points_to_next: next.map(|t| t.min_points - points),
        }
    }
}

// Serviço mais concluído; empate fica com o nome que ordena primeiro.
fn favorite_service(completed: &[&Booking], service_names: &HashMap<Uuid, &str>) -> Option<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for booking in completed {
        if let Some(name) = service_names.get(&booking.service_id) {
            *counts.entry(*name).or_default() += 1;
        }
    }
    counts
        .into_iter()
        .max_by(|(name_a, count_a), (name_b, count_b)| {
            count_a.cmp(count_b).then_with(|| name_b.cmp(name_a))
        })
        .map(|(name, _)| name.to_string())
}

pub fn client_summary(
    client: &Client,
    own_bookings: &[&Booking],
    service_names: &HashMap<Uuid, &str>,
    table: &TierTable,
) -> ClientSummary {
    let completed: Vec<&Booking> = own_bookings
        .iter()
        .copied()
        .filter(|b| b.status.is_completed())
        .collect();

    let total_spent: Decimal = completed.iter().map(|b| b.total_price).sum();
    let loyalty_points = loyalty_points(total_spent);

    ClientSummary {
        id: client.id,
        name: client.name.clone(),
        phone: client.phone.clone(),
        email: client.email.clone(),
        birth_date: client.birth_date,
        total_bookings: own_bookings.len(),
        total_spent,
        loyalty_points,
        tier: table.resolve(loyalty_points).name.clone(),
        last_visit: completed.iter().map(|b| b.booking_date).max(),
        favorite_service: favorite_service(&completed, service_names),
    }
}

pub fn client_summaries(
    clients: &[Client],
    bookings: &[Booking],
    services: &[Service],
    table: &TierTable,
) -> Vec<ClientSummary> {
    let mut by_client: HashMap<Uuid, Vec<&Booking>> = HashMap::new();
    for booking in bookings {
        by_client.entry(booking.client_id).or_default().push(booking);
    }
    let service_names: HashMap<Uuid, &str> =
        services.iter().map(|s| (s.id, s.name.as_str())).collect();

    clients
        .iter()
        .map(|client| {
            let own = by_client.get(&client.id).map(Vec::as_slice).unwrap_or(&[]);
            client_summary(client, own, &service_names, table)
        })
        .collect()
}

// Clientes que sumiram: última visita há mais de 'days' dias, ou que
// agendaram mas nunca concluíram um atendimento. Mais antigos primeiro.
pub fn retention_candidates(
    summaries: Vec<ClientSummary>,
    today: NaiveDate,
    days: u32,
) -> Vec<ClientSummary> {
    let cutoff = today.checked_sub_days(Days::new(u64::from(days))).unwrap_or(NaiveDate::MIN);

    let mut candidates: Vec<ClientSummary> = summaries
        .into_iter()
        .filter(|s| match s.last_visit {
            Some(last) => last < cutoff,
            None => s.total_bookings > 0,
        })
        .collect();
    candidates.sort_by_key(|s| s.last_visit);
    candidates
}

pub fn birthdays_in_month(clients: &[Client], month: u32) -> Vec<&Client> {
    let mut found: Vec<&Client> = clients
        .iter()
        .filter(|c| c.birth_date.is_some_and(|d| d.month() == month))
        .collect();
    found.sort_by_key(|c| c.birth_date.map(|d| d.day()));
    found
}
