// src/config.rs

use std::{env, str::FromStr, sync::Arc, time::Duration};

use anyhow::{anyhow, Context};
use rust_decimal::Decimal;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{
        BarberRepository, BookingRepository, CatalogRepository, ClientRepository,
        LoyaltyRepository, SettingsRepository, UserRepository,
    },
    services::{
        auth::AuthService,
        barber_service::BarberService,
        booking_service::BookingService,
        catalog_service::CatalogService,
        client_service::ClientService,
        loyalty_service::LoyaltyService,
        report_service::ReportService,
        settings_service::SettingsService,
        whatsapp_service::{HttpBridgeClient, WhatsAppSession},
    },
};

const DEFAULT_SERVER_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_COMMISSION_RATE: &str = "0.40";
const BRIDGE_TIMEOUT: Duration = Duration::from_secs(10);

/// Variáveis de ambiente lidas na inicialização.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    pub commission_rate: Decimal,
    pub whatsapp_bridge_url: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;
        let server_addr = env::var("SERVER_ADDR").unwrap_or_else(|_| DEFAULT_SERVER_ADDR.to_string());

        let raw_rate = env::var("COMMISSION_RATE").unwrap_or_else(|_| DEFAULT_COMMISSION_RATE.to_string());
        let commission_rate = parse_commission_rate(&raw_rate)?;

        // Variável vazia conta como ausente
        let whatsapp_bridge_url = env::var("WHATSAPP_BRIDGE_URL")
            .ok()
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());

        Ok(Self {
            database_url,
            jwt_secret,
            server_addr,
            commission_rate,
            whatsapp_bridge_url,
        })
    }
}

pub fn parse_commission_rate(raw: &str) -> anyhow::Result<Decimal> {
    let rate = Decimal::from_str(raw.trim())
        .map_err(|e| anyhow!("COMMISSION_RATE inválida '{}': {}", raw, e))?;

    if rate < Decimal::ZERO || rate > Decimal::ONE {
        return Err(anyhow!("COMMISSION_RATE deve estar entre 0 e 1, recebido {}", rate));
    }
    Ok(rate)
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub auth_service: AuthService,
    pub client_service: ClientService,
    pub barber_service: BarberService,
    pub catalog_service: CatalogService,
    pub booking_service: BookingService,
    pub loyalty_service: LoyaltyService,
    pub settings_service: SettingsService,
    pub report_service: ReportService,
    pub whatsapp: WhatsAppSession,
}

impl AppState {
    pub async fn new(config: &AppConfig) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        let whatsapp = match &config.whatsapp_bridge_url {
            Some(url) => {
                let client = HttpBridgeClient::new(url, BRIDGE_TIMEOUT)
                    .map_err(|e| anyhow!("Falha ao criar cliente do WhatsApp: {}", e))?;
                tracing::info!("📱 WhatsApp conectado à ponte em {}", url);
                WhatsAppSession::new(Arc::new(client))
            }
            None => {
                tracing::warn!("⚠️ WHATSAPP_BRIDGE_URL não definida, WhatsApp indisponível");
                WhatsAppSession::disabled()
            }
        };

        Ok(Self::from_parts(db_pool, config, whatsapp))
    }

    // --- Monta o gráfico de dependências ---
    pub fn from_parts(db_pool: PgPool, config: &AppConfig, whatsapp: WhatsAppSession) -> Self {
        let client_repo = ClientRepository::new();
        let barber_repo = BarberRepository::new();
        let catalog_repo = CatalogRepository::new();
        let booking_repo = BookingRepository::new();

        let auth_service = AuthService::new(UserRepository::new(db_pool.clone()), config.jwt_secret.clone());
        let settings_service = SettingsService::new(
            db_pool.clone(),
            SettingsRepository::new(),
            config.commission_rate,
        );
        let loyalty_service = LoyaltyService::new(db_pool.clone(), LoyaltyRepository::new());

        let client_service = ClientService::new(
            db_pool.clone(),
            client_repo,
            booking_repo.clone(),
            catalog_repo.clone(),
            loyalty_service.clone(),
        );
        let barber_service = BarberService::new(db_pool.clone(), barber_repo.clone());
        let catalog_service = CatalogService::new(db_pool.clone(), catalog_repo.clone());
        let booking_service = BookingService::new(
            db_pool.clone(),
            booking_repo.clone(),
            catalog_repo.clone(),
            settings_service.clone(),
        );
        let report_service = ReportService::new(
            db_pool.clone(),
            booking_repo,
            barber_repo,
            catalog_repo,
            settings_service.clone(),
        );

        Self {
            db_pool,
            auth_service,
            client_service,
            barber_service,
            catalog_service,
            booking_service,
            loyalty_service,
            settings_service,
            report_service,
            whatsapp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commission_rate_accepts_values_in_unit_interval() {
        assert_eq!(parse_commission_rate("0.40").unwrap(), Decimal::new(40, 2));
        assert_eq!(parse_commission_rate(" 1 ").unwrap(), Decimal::ONE);
        assert_eq!(parse_commission_rate("0").unwrap(), Decimal::ZERO);
    }

    #[test]
    fn commission_rate_rejects_out_of_range_and_garbage() {
        assert!(parse_commission_rate("1.5").is_err());
        assert!(parse_commission_rate("-0.1").is_err());
        assert!(parse_commission_rate("quarenta").is_err());
    }
}
