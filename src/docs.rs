// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::bootstrap,
        handlers::auth::register,
        handlers::auth::login,

        // --- Users ---
        handlers::auth::get_me,

        // --- Clients ---
        handlers::clients::list_clients,
        handlers::clients::create_client,
        handlers::clients::get_client,
        handlers::clients::update_client,
        handlers::clients::delete_client,
        handlers::clients::list_summaries,
        handlers::clients::export_clients,
        handlers::clients::retention,
        handlers::clients::birthdays,

        // --- Barbers ---
        handlers::barbers::list_barbers,
        handlers::barbers::create_barber,
        handlers::barbers::get_barber,
        handlers::barbers::update_barber,
        handlers::barbers::delete_barber,

        // --- Services ---
        handlers::catalog::list_services,
        handlers::catalog::create_service,
        handlers::catalog::get_service,
        handlers::catalog::update_service,
        handlers::catalog::delete_service,

        // --- Bookings ---
        handlers::bookings::list_bookings,
        handlers::bookings::create_booking,
        handlers::bookings::get_booking,
        handlers::bookings::update_booking,
        handlers::bookings::update_status,
        handlers::bookings::delete_booking,

        // --- Loyalty ---
        handlers::loyalty::list_tiers,
        handlers::loyalty::create_tier,
        handlers::loyalty::delete_tier,
        handlers::loyalty::resolve_tier,

        // --- Reports ---
        handlers::reports::summary,
        handlers::reports::barbers,
        handlers::reports::services,
        handlers::reports::commissions,
        handlers::reports::trend,
        handlers::reports::time_slots,
        handlers::reports::payment_methods,
        handlers::reports::export,

        // --- Settings ---
        handlers::settings::get_settings,
        handlers::settings::update_settings,

        // --- WhatsApp ---
        handlers::whatsapp::status,
        handlers::whatsapp::qr,
        handlers::whatsapp::send_message,
        handlers::whatsapp::restart,
        handlers::whatsapp::disconnect,
        handlers::whatsapp::generate_qr,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,

            // --- Cadastros ---
            models::client::Client,
            models::client::ClientPayload,
            models::client::ClientSummary,
            models::barber::Barber,
            models::barber::BarberPayload,
            models::catalog::Service,
            models::catalog::ServicePayload,

            // --- Bookings ---
            models::booking::BookingStatus,
            models::booking::PaymentMethod,
            models::booking::Booking,
            models::booking::CreateBookingPayload,
            models::booking::UpdateBookingPayload,
            models::booking::UpdateBookingStatusPayload,

            // --- Loyalty ---
            models::loyalty::LoyaltyTier,
            models::loyalty::CreateTierPayload,
            models::loyalty::TierResolution,

            // --- Reports ---
            models::reports::RevenueSummary,
            models::reports::EntityBreakdown,
            models::reports::CommissionEntry,
            models::reports::Granularity,
            models::reports::TrendBucket,
            models::reports::TimeSlotHistogram,
            models::reports::PaymentMethodEntry,
            models::reports::ReportExport,

            // --- Settings ---
            models::settings::DaySchedule,
            models::settings::OpeningHours,
            models::settings::BusinessSettings,
            models::settings::UpdateSettingsRequest,

            // --- WhatsApp ---
            models::whatsapp::SessionStatus,
            models::whatsapp::SessionState,
            models::whatsapp::SendMessagePayload,
            models::whatsapp::StatusResponse,
            models::whatsapp::QrResponse,
            models::whatsapp::SendMessageResponse,
            models::whatsapp::ActionResponse,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Users", description = "Dados do Administrador"),
        (name = "Clients", description = "Clientes, Fidelidade e Exportação"),
        (name = "Barbers", description = "Equipe de Barbeiros"),
        (name = "Services", description = "Catálogo de Serviços"),
        (name = "Bookings", description = "Agendamentos"),
        (name = "Loyalty", description = "Programa de Fidelidade"),
        (name = "Reports", description = "Relatórios e Indicadores"),
        (name = "Settings", description = "Configurações da Barbearia"),
        (name = "WhatsApp", description = "Sessão e Envio de Mensagens")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
