//src/main.rs

use std::time::Duration;

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, patch, post},
    Router,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::{AppConfig, AppState};
use crate::docs::ApiDoc;
use crate::middleware::auth::auth_guard;

// Intervalo em que o espelho da sessão do WhatsApp é atualizado
const WHATSAPP_POLL_INTERVAL: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let config = AppConfig::from_env()?;
    let app_state = AppState::new(&config).await?;

    // Faz o app rodar as migrações do SQLx na inicialização
    sqlx::migrate!().run(&app_state.db_pool).await?;
    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    app_state.whatsapp.spawn_poller(WHATSAPP_POLL_INTERVAL);

    let app = build_router(app_state);

    let listener = TcpListener::bind(&config.server_addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

pub fn build_router(app_state: AppState) -> Router {
    // Cadastro de novos administradores exige um já autenticado.
    // route_layer só cobre as rotas declaradas antes dele.
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route_layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ))
        // Públicas
        .route("/bootstrap", post(handlers::auth::bootstrap))
        .route("/login", post(handlers::auth::login));

    let user_routes = Router::new()
        .route("/me", get(handlers::auth::get_me));

    let client_routes = Router::new()
        .route("/"
               ,get(handlers::clients::list_clients)
               .post(handlers::clients::create_client)
        )
        .route("/summaries", get(handlers::clients::list_summaries))
        .route("/export", get(handlers::clients::export_clients))
        .route("/retention", get(handlers::clients::retention))
        .route("/birthdays", get(handlers::clients::birthdays))
        .route("/{id}"
               ,get(handlers::clients::get_client)
               .put(handlers::clients::update_client)
               .delete(handlers::clients::delete_client)
        );

    let barber_routes = Router::new()
        .route("/"
               ,get(handlers::barbers::list_barbers)
               .post(handlers::barbers::create_barber)
        )
        .route("/{id}"
               ,get(handlers::barbers::get_barber)
               .put(handlers::barbers::update_barber)
               .delete(handlers::barbers::delete_barber)
        );

    let service_routes = Router::new()
        .route("/"
               ,get(handlers::catalog::list_services)
               .post(handlers::catalog::create_service)
        )
        .route("/{id}"
               ,get(handlers::catalog::get_service)
               .put(handlers::catalog::update_service)
               .delete(handlers::catalog::delete_service)
        );

    let booking_routes = Router::new()
        .route("/"
               ,get(handlers::bookings::list_bookings)
               .post(handlers::bookings::create_booking)
        )
        .route("/{id}"
               ,get(handlers::bookings::get_booking)
               .put(handlers::bookings::update_booking)
               .delete(handlers::bookings::delete_booking)
        )
        .route("/{id}/status", patch(handlers::bookings::update_status));

    let loyalty_routes = Router::new()
        .route("/tiers"
               ,get(handlers::loyalty::list_tiers)
               .post(handlers::loyalty::create_tier)
        )
        .route("/tiers/{id}", delete(handlers::loyalty::delete_tier))
        .route("/resolve", get(handlers::loyalty::resolve_tier));

    let report_routes = Router::new()
        .route("/summary", get(handlers::reports::summary))
        .route("/barbers", get(handlers::reports::barbers))
        .route("/services", get(handlers::reports::services))
        .route("/commissions", get(handlers::reports::commissions))
        .route("/trend", get(handlers::reports::trend))
        .route("/time-slots", get(handlers::reports::time_slots))
        .route("/payment-methods", get(handlers::reports::payment_methods))
        .route("/export", get(handlers::reports::export));

    let settings_routes = Router::new()
        .route("/"
               ,get(handlers::settings::get_settings)
               .put(handlers::settings::update_settings)
        );

    // Painel administrativo: tudo protegido pelo middleware
    let admin_routes = Router::new()
        .nest("/users", user_routes)
        .nest("/clients", client_routes)
        .nest("/barbers", barber_routes)
        .nest("/services", service_routes)
        .nest("/bookings", booking_routes)
        .nest("/loyalty", loyalty_routes)
        .nest("/reports", report_routes)
        .nest("/settings", settings_routes)
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Serviço companheiro do WhatsApp (acesso local, sem JWT)
    let whatsapp_routes = Router::new()
        .route("/qr", get(handlers::whatsapp::qr))
        .route("/status", get(handlers::whatsapp::status))
        .route("/send", post(handlers::whatsapp::send_message))
        .route("/restart", post(handlers::whatsapp::restart))
        .route("/disconnect", post(handlers::whatsapp::disconnect))
        .route("/generate-qr", post(handlers::whatsapp::generate_qr));

    Router::new()
        .merge(SwaggerUi::new("/api/docs").url("/api/openapi.json", ApiDoc::openapi()))
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api/whatsapp", whatsapp_routes)
        .nest("/api", admin_routes)
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use rust_decimal::Decimal;
    use serde_json::Value;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use crate::{
        models::whatsapp::SessionStatus,
        services::whatsapp_service::{tests::FakeClient, WhatsAppSession},
    };

    // Nenhuma das rotas testadas aqui chega a tocar o banco
    fn test_app(whatsapp: WhatsAppSession) -> Router {
        let config = AppConfig {
            database_url: "postgres://localhost/barbearia_test".to_string(),
            jwt_secret: "segredo".to_string(),
            server_addr: "127.0.0.1:0".to_string(),
            commission_rate: Decimal::new(40, 2),
            whatsapp_bridge_url: None,
        };
        let pool = PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .unwrap();
        build_router(AppState::from_parts(pool, &config, whatsapp))
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_is_public() {
        let response = test_app(WhatsAppSession::disabled())
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn admin_routes_require_bearer_token() {
        let app = test_app(WhatsAppSession::disabled());

        let response = app
            .clone()
            .oneshot(Request::get("/api/reports/summary").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app
            .oneshot(
                Request::get("/api/clients")
                    .header(header::AUTHORIZATION, "Bearer nao-e-um-jwt")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await["success"], false);
    }

    #[tokio::test]
    async fn anonymous_register_is_rejected() {
        let app = test_app(WhatsAppSession::disabled());
        let payload = r#"{"email":"intruso@barbearia.com","password":"123456"}"#;

        let response = app
            .clone()
            .oneshot(
                Request::post("/api/auth/register")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(payload))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await["success"], false);

        let response = app
            .oneshot(
                Request::post("/api/auth/register")
                    .header(header::CONTENT_TYPE, "application/json")
                    .header(header::AUTHORIZATION, "Bearer nao-e-um-jwt")
                    .body(Body::from(payload))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn bootstrap_is_public_and_validates_payload() {
        let response = test_app(WhatsAppSession::disabled())
            .oneshot(
                Request::post("/api/auth/bootstrap")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"email":"nao-e-email","password":"123"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        // Sem guarda: chega ao handler e cai na validação
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert!(body["details"]["email"].is_array());
        assert!(body["details"]["password"].is_array());
    }

    #[tokio::test]
    async fn whatsapp_status_mirrors_client() {
        let fake = FakeClient::with_status(SessionStatus::QrPending, Some("qr-1"));
        let app = test_app(WhatsAppSession::new(fake));

        let response = app
            .oneshot(Request::get("/api/whatsapp/status").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["status"], "qr_pending");
        assert_eq!(body["hasQr"], true);
    }

    #[tokio::test]
    async fn whatsapp_without_bridge_is_unavailable() {
        let response = test_app(WhatsAppSession::disabled())
            .oneshot(Request::get("/api/whatsapp/qr").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json_body(response).await["success"], false);
    }

    #[tokio::test]
    async fn whatsapp_send_rejects_short_phone() {
        let fake: Arc<FakeClient> = FakeClient::with_status(SessionStatus::Connected, None);
        let app = test_app(WhatsAppSession::new(fake.clone()));

        let response = app
            .oneshot(
                Request::post("/api/whatsapp/send")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"phone":"123","message":"Olá"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(fake.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn whatsapp_send_delivers_to_normalized_chat() {
        let fake = FakeClient::with_status(SessionStatus::Connected, None);
        let app = test_app(WhatsAppSession::new(fake.clone()));

        let response = app
            .oneshot(
                Request::post("/api/whatsapp/send")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"phone":"(11) 98888-7777","message":"Olá"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["phone"], "5511988887777");
        assert_eq!(fake.sent.lock().unwrap()[0].0, "5511988887777@c.us");
    }
}
