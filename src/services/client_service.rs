// src/services/client_service.rs

use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{BookingRepository, CatalogRepository, ClientRepository},
    models::{
        client::{Client, ClientPayload, ClientSummary},
        reports::ReportFilter,
    },
    services::{loyalty, loyalty_service::LoyaltyService},
};

#[derive(Clone)]
pub struct ClientService {
    pool: PgPool,
    repo: ClientRepository,
    booking_repo: BookingRepository,
    catalog_repo: CatalogRepository,
    loyalty_service: LoyaltyService,
}

impl ClientService {
    pub fn new(
        pool: PgPool,
        repo: ClientRepository,
        booking_repo: BookingRepository,
        catalog_repo: CatalogRepository,
        loyalty_service: LoyaltyService,
    ) -> Self {
        Self { pool, repo, booking_repo, catalog_repo, loyalty_service }
    }

    pub async fn list_clients(&self) -> Result<Vec<Client>, AppError> {
        self.repo.list(&self.pool).await
    }

    pub async fn get_client(&self, id: Uuid) -> Result<Client, AppError> {
        self.repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or(AppError::NotFound("cliente"))
    }

    pub async fn create_client(&self, input: &ClientPayload) -> Result<Client, AppError> {
        self.repo.create(&self.pool, input).await
    }

    pub async fn update_client(&self, id: Uuid, input: &ClientPayload) -> Result<Client, AppError> {
        self.repo
            .update(&self.pool, id, input)
            .await?
            .ok_or(AppError::NotFound("cliente"))
    }

    pub async fn delete_client(&self, id: Uuid) -> Result<(), AppError> {
        match self.repo.delete(&self.pool, id).await? {
            0 => Err(AppError::NotFound("cliente")),
            _ => Ok(()),
        }
    }

    // Pontos, nível e afins: recalculados a cada carga
    pub async fn list_summaries(&self) -> Result<Vec<ClientSummary>, AppError> {
        let all = ReportFilter::default();
        let (clients, bookings, services, table) = tokio::try_join!(
            self.repo.list(&self.pool),
            self.booking_repo.list(&self.pool, &all),
            self.catalog_repo.list(&self.pool),
            self.loyalty_service.load_table(),
        )?;

        Ok(loyalty::client_summaries(&clients, &bookings, &services, &table))
    }

    pub async fn export_csv(&self) -> Result<String, AppError> {
        let summaries = self.list_summaries().await?;
        summaries_to_csv(&summaries)
    }

    pub async fn retention_candidates(&self, today: NaiveDate, days: u32) -> Result<Vec<ClientSummary>, AppError> {
        let summaries = self.list_summaries().await?;
        Ok(loyalty::retention_candidates(summaries, today, days))
    }

    pub async fn birthdays(&self, month: u32) -> Result<Vec<Client>, AppError> {
        if !(1..=12).contains(&month) {
            return Err(AppError::InvalidInput("Mês deve estar entre 1 e 12.".to_string()));
        }
        let clients = self.repo.list(&self.pool).await?;
        Ok(loyalty::birthdays_in_month(&clients, month).into_iter().cloned().collect())
    }
}

pub fn summaries_to_csv(summaries: &[ClientSummary]) -> Result<String, AppError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "nome",
        "telefone",
        "email",
        "total_agendamentos",
        "total_gasto",
        "pontos",
        "nivel",
        "ultima_visita",
    ])?;

    for s in summaries {
        writer.write_record([
            s.name.clone(),
            s.phone.clone(),
            s.email.clone().unwrap_or_default(),
            s.total_bookings.to_string(),
            s.total_spent.round_dp(2).to_string(),
            s.loyalty_points.to_string(),
            s.tier.clone(),
            s.last_visit.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Falha ao finalizar o CSV: {}", e))?;
    String::from_utf8(bytes).map_err(|e| AppError::InternalServerError(e.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn summary(name: &str, spent: &str, last_visit: Option<NaiveDate>) -> ClientSummary {
        let total_spent: Decimal = spent.parse().unwrap();
        ClientSummary {
            id: Uuid::new_v4(),
            name: name.to_string(),
            phone: "11988887777".to_string(),
            email: None,
            birth_date: None,
            total_bookings: 3,
            total_spent,
            loyalty_points: loyalty::loyalty_points(total_spent),
            tier: "Bronze".to_string(),
            last_visit,
            favorite_service: None,
        }
    }

    #[test]
    fn csv_has_header_and_one_row_per_client() {
        let rows = vec![
            summary("João", "245", NaiveDate::from_ymd_opt(2026, 10, 5)),
            summary("Silva, Pedro", "0", None),
        ];
        let csv = summaries_to_csv(&rows).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "nome,telefone,email,total_agendamentos,total_gasto,pontos,nivel,ultima_visita"
        );
        assert_eq!(lines[1], "João,11988887777,,3,245,24,Bronze,2026-10-05");
        // Vírgula no nome vai entre aspas
        assert!(lines[2].starts_with("\"Silva, Pedro\""));
    }
}
