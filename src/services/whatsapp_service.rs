// src/services/whatsapp_service.rs
//
// A automação do WhatsApp roda fora deste processo. Aqui só existe o
// contrato com ela (WhatsAppClient) e o espelho do estado da sessão.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::Utc;
use qrcode::{render::svg, QrCode};
use serde::Deserialize;
use serde_json::json;
use tokio::{sync::Mutex, task::JoinHandle};

use crate::{
    common::error::AppError,
    models::whatsapp::{ClientStatus, SessionState, SessionStatus},
};

#[async_trait]
pub trait WhatsAppClient: Send + Sync {
    async fn status(&self) -> Result<ClientStatus, AppError>;
    async fn qr(&self) -> Result<Option<String>, AppError>;
    // Retorna o id da mensagem, quando o cliente informa
    async fn send(&self, chat_id: &str, message: &str) -> Result<Option<String>, AppError>;
    async fn restart(&self) -> Result<(), AppError>;
    async fn disconnect(&self) -> Result<(), AppError>;
}

// --- Ponte HTTP (processo externo que controla o navegador) ---

pub struct HttpBridgeClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BridgeQr {
    qr_code: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BridgeSent {
    message_id: Option<String>,
}

fn bridge_error(e: reqwest::Error) -> AppError {
    AppError::WhatsApp(format!("Falha ao falar com a ponte do WhatsApp: {}", e))
}

impl HttpBridgeClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(bridge_error)?;
        Ok(Self { http, base_url: base_url.trim_end_matches('/').to_string() })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, AppError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(AppError::WhatsApp(format!("Ponte respondeu {}: {}", status, body)))
    }

    async fn post_empty(&self, path: &str) -> Result<(), AppError> {
        let response = self.http.post(self.url(path)).send().await.map_err(bridge_error)?;
        Self::check(response).await?;
        Ok(())
    }
}

#[async_trait]
impl WhatsAppClient for HttpBridgeClient {
    async fn status(&self) -> Result<ClientStatus, AppError> {
        let response = self.http.get(self.url("status")).send().await.map_err(bridge_error)?;
        Self::check(response).await?.json().await.map_err(bridge_error)
    }

    async fn qr(&self) -> Result<Option<String>, AppError> {
        let response = self.http.get(self.url("qr")).send().await.map_err(bridge_error)?;
        let body: BridgeQr = Self::check(response).await?.json().await.map_err(bridge_error)?;
        Ok(body.qr_code)
    }

    async fn send(&self, chat_id: &str, message: &str) -> Result<Option<String>, AppError> {
        let response = self.http
            .post(self.url("send"))
            .json(&json!({ "chatId": chat_id, "message": message }))
            .send()
            .await
            .map_err(bridge_error)?;
        let body: BridgeSent = Self::check(response).await?.json().await.map_err(bridge_error)?;
        Ok(body.message_id)
    }

    async fn restart(&self) -> Result<(), AppError> {
        self.post_empty("restart").await
    }

    async fn disconnect(&self) -> Result<(), AppError> {
        self.post_empty("logout").await
    }
}

// Ambiente sem ponte configurada (ex.: hospedagem sem navegador)
pub struct DisabledClient;

#[async_trait]
impl WhatsAppClient for DisabledClient {
    async fn status(&self) -> Result<ClientStatus, AppError> {
        Ok(ClientStatus { status: SessionStatus::Unavailable, qr_code: None })
    }

    async fn qr(&self) -> Result<Option<String>, AppError> {
        Err(AppError::WhatsAppUnavailable)
    }

    async fn send(&self, _chat_id: &str, _message: &str) -> Result<Option<String>, AppError> {
        Err(AppError::WhatsAppUnavailable)
    }

    async fn restart(&self) -> Result<(), AppError> {
        Err(AppError::WhatsAppUnavailable)
    }

    async fn disconnect(&self) -> Result<(), AppError> {
        Err(AppError::WhatsAppUnavailable)
    }
}

// --- Telefone ---

/// Normaliza para dígitos com DDI. Números nacionais (DDD + número,
/// 10 ou 11 dígitos) recebem o `55` do Brasil.
pub fn normalize_phone(raw: &str) -> Result<String, AppError> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    // Prefixo de tronco ("011...")
    let digits = digits.trim_start_matches('0');

    match digits.len() {
        10 | 11 => Ok(format!("55{}", digits)),
        12..=15 => Ok(digits.to_string()),
        _ => Err(AppError::InvalidPhone(raw.to_string())),
    }
}

pub fn chat_id(phone: &str) -> String {
    format!("{}@c.us", phone)
}

pub fn render_qr_svg(data: &str) -> Result<String, AppError> {
    let code = QrCode::new(data.as_bytes())
        .map_err(|e| AppError::WhatsApp(format!("QR Code inválido: {}", e)))?;
    Ok(code
        .render::<svg::Color>()
        .min_dimensions(256, 256)
        .build())
}

// --- Sessão ---

#[derive(Clone)]
pub struct WhatsAppSession {
    client: Arc<dyn WhatsAppClient>,
    state: Arc<Mutex<SessionState>>,
}

impl WhatsAppSession {
    pub fn new(client: Arc<dyn WhatsAppClient>) -> Self {
        Self {
            client,
            state: Arc::new(Mutex::new(SessionState::new(SessionStatus::Disconnected))),
        }
    }

    pub fn disabled() -> Self {
        Self {
            client: Arc::new(DisabledClient),
            state: Arc::new(Mutex::new(SessionState::new(SessionStatus::Unavailable))),
        }
    }

    pub async fn snapshot(&self) -> SessionState {
        self.state.lock().await.clone()
    }

    fn apply(state: &mut SessionState, reported: ClientStatus) {
        if state.status != reported.status {
            tracing::info!("📱 WhatsApp: {:?} -> {:?}", state.status, reported.status);
        }
        if reported.status.is_connected() && !state.status.is_connected() {
            state.connected_at = Some(Utc::now());
        }
        if !reported.status.is_connected() {
            state.connected_at = None;
        }

        state.qr_code = match reported.status {
            SessionStatus::QrPending => reported.qr_code.or(state.qr_code.take()),
            _ => None,
        };
        state.status = reported.status;
        state.last_error = None;
        state.updated_at = Utc::now();
    }

    fn fail(state: &mut SessionState, err: &AppError) {
        tracing::error!("📱 WhatsApp em erro: {}", err);
        state.status = SessionStatus::Error;
        state.last_error = Some(err.to_string());
        state.qr_code = None;
        state.connected_at = None;
        state.updated_at = Utc::now();
    }

    // Consulta o cliente e atualiza o espelho do estado
    pub async fn refresh(&self) -> SessionState {
        let reported = self.client.status().await;
        let mut state = self.state.lock().await;
        match reported {
            Ok(reported) => Self::apply(&mut state, reported),
            Err(err) => Self::fail(&mut state, &err),
        }
        state.clone()
    }

    pub async fn qr(&self) -> Result<SessionState, AppError> {
        let mut current = self.refresh().await;
        if current.status == SessionStatus::Unavailable {
            return Err(AppError::WhatsAppUnavailable);
        }
        if current.status == SessionStatus::QrPending && current.qr_code.is_none() {
            let qr = self.client.qr().await?;
            let mut state = self.state.lock().await;
            state.qr_code = qr;
            current = state.clone();
        }
        Ok(current)
    }

    pub async fn send(&self, phone: &str, message: &str) -> Result<(String, Option<String>), AppError> {
        let normalized = normalize_phone(phone)?;

        let current = self.refresh().await;
        match current.status {
            SessionStatus::Unavailable => return Err(AppError::WhatsAppUnavailable),
            SessionStatus::Connected => {}
            other => {
                return Err(AppError::WhatsApp(format!(
                    "WhatsApp não está conectado (status: {:?}).",
                    other
                )))
            }
        }

        let message_id = self.client.send(&chat_id(&normalized), message).await.map_err(|e| {
            tracing::error!("📱 Falha ao enviar mensagem para {}: {}", normalized, e);
            e
        })?;
        tracing::info!("📨 Mensagem enviada para {}", normalized);
        Ok((normalized, message_id))
    }

    pub async fn restart(&self) -> Result<(), AppError> {
        if self.snapshot().await.status == SessionStatus::Unavailable {
            return Err(AppError::WhatsAppUnavailable);
        }
        {
            let mut state = self.state.lock().await;
            state.status = SessionStatus::Initializing;
            state.qr_code = None;
            state.connected_at = None;
            state.updated_at = Utc::now();
        }

        if let Err(err) = self.client.restart().await {
            Self::fail(&mut *self.state.lock().await, &err);
            return Err(err);
        }
        tracing::info!("📱 Sessão do WhatsApp reiniciada");
        Ok(())
    }

    pub async fn disconnect(&self) -> Result<(), AppError> {
        self.client.disconnect().await?;

        let mut state = self.state.lock().await;
        state.status = SessionStatus::Disconnected;
        state.qr_code = None;
        state.connected_at = None;
        state.last_error = None;
        state.updated_at = Utc::now();
        tracing::info!("📱 Sessão do WhatsApp desconectada");
        Ok(())
    }

    // Força uma nova sessão para exibir um QR novo
    pub async fn generate_qr(&self) -> Result<SessionState, AppError> {
        if self.refresh().await.status.is_connected() {
            return Err(AppError::InvalidInput(
                "O WhatsApp já está conectado. Desconecte antes de gerar um novo QR Code.".to_string(),
            ));
        }
        self.restart().await?;
        self.qr().await
    }

    // Mantém o espelho atualizado mesmo sem ninguém consultando
    pub fn spawn_poller(&self, every: Duration) -> JoinHandle<()> {
        let session = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                session.refresh().await;
            }
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    #[derive(Default)]
    pub(crate) struct FakeClient {
        pub status: StdMutex<Option<ClientStatus>>,
        pub sent: StdMutex<Vec<(String, String)>>,
        pub restarts: StdMutex<usize>,
        pub fail_status: StdMutex<bool>,
    }

    impl FakeClient {
        pub(crate) fn with_status(status: SessionStatus, qr: Option<&str>) -> Arc<Self> {
            let fake = FakeClient::default();
            fake.set(status, qr);
            Arc::new(fake)
        }

        pub(crate) fn set(&self, status: SessionStatus, qr: Option<&str>) {
            *self.status.lock().unwrap() = Some(ClientStatus {
                status,
                qr_code: qr.map(str::to_string),
            });
        }
    }

    #[async_trait]
    impl WhatsAppClient for FakeClient {
        async fn status(&self) -> Result<ClientStatus, AppError> {
            if *self.fail_status.lock().unwrap() {
                return Err(AppError::WhatsApp("navegador caiu".to_string()));
            }
            Ok(self.status.lock().unwrap().clone().unwrap_or(ClientStatus {
                status: SessionStatus::Disconnected,
                qr_code: None,
            }))
        }

        async fn qr(&self) -> Result<Option<String>, AppError> {
            Ok(Some("qr-fresco".to_string()))
        }

        async fn send(&self, chat_id: &str, message: &str) -> Result<Option<String>, AppError> {
            self.sent.lock().unwrap().push((chat_id.to_string(), message.to_string()));
            Ok(Some("msg-1".to_string()))
        }

        async fn restart(&self) -> Result<(), AppError> {
            *self.restarts.lock().unwrap() += 1;
            self.set(SessionStatus::QrPending, None);
            Ok(())
        }

        async fn disconnect(&self) -> Result<(), AppError> {
            self.set(SessionStatus::Disconnected, None);
            Ok(())
        }
    }

    #[test]
    fn normalizes_brazilian_numbers() {
        assert_eq!(normalize_phone("(11) 98888-7777").unwrap(), "5511988887777");
        assert_eq!(normalize_phone("011 3333-4444").unwrap(), "551133334444");
        assert_eq!(normalize_phone("+55 11 98888-7777").unwrap(), "5511988887777");
        assert_eq!(normalize_phone("+351 912 345 678").unwrap(), "351912345678");
        assert!(matches!(normalize_phone("123"), Err(AppError::InvalidPhone(_))));
        assert!(matches!(normalize_phone(""), Err(AppError::InvalidPhone(_))));
    }

    #[test]
    fn renders_qr_as_svg() {
        let svg = render_qr_svg("2@abc,def,ghi").unwrap();
        assert!(svg.contains("<svg"));
    }

    #[tokio::test]
    async fn refresh_tracks_qr_then_connection() {
        let fake = FakeClient::with_status(SessionStatus::QrPending, Some("qr-1"));
        let session = WhatsAppSession::new(fake.clone());

        let state = session.refresh().await;
        assert_eq!(state.status, SessionStatus::QrPending);
        assert_eq!(state.qr_code.as_deref(), Some("qr-1"));
        assert!(state.connected_at.is_none());

        fake.set(SessionStatus::Connected, None);
        let state = session.refresh().await;
        assert!(state.status.is_connected());
        assert!(state.qr_code.is_none());
        assert!(state.connected_at.is_some());
    }

    #[tokio::test]
    async fn status_failure_moves_to_error() {
        let fake = FakeClient::with_status(SessionStatus::Connected, None);
        let session = WhatsAppSession::new(fake.clone());
        session.refresh().await;

        *fake.fail_status.lock().unwrap() = true;
        let state = session.refresh().await;
        assert_eq!(state.status, SessionStatus::Error);
        assert!(state.last_error.unwrap().contains("navegador caiu"));
        assert!(state.connected_at.is_none());
    }

    #[tokio::test]
    async fn send_requires_connection_and_normalizes_phone() {
        let fake = FakeClient::with_status(SessionStatus::QrPending, None);
        let session = WhatsAppSession::new(fake.clone());

        let err = session.send("11988887777", "Oi").await.unwrap_err();
        assert!(matches!(err, AppError::WhatsApp(_)));
        assert!(fake.sent.lock().unwrap().is_empty());

        fake.set(SessionStatus::Connected, None);
        let (phone, id) = session.send("(11) 98888-7777", "Seu horário é amanhã").await.unwrap();
        assert_eq!(phone, "5511988887777");
        assert_eq!(id.as_deref(), Some("msg-1"));
        assert_eq!(fake.sent.lock().unwrap()[0].0, "5511988887777@c.us");
    }

    #[tokio::test]
    async fn invalid_phone_fails_before_touching_client() {
        let fake = FakeClient::with_status(SessionStatus::Connected, None);
        let session = WhatsAppSession::new(fake.clone());
        assert!(matches!(session.send("99", "x").await, Err(AppError::InvalidPhone(_))));
        assert!(fake.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn generate_qr_restarts_and_fetches_code() {
        let fake = FakeClient::with_status(SessionStatus::Disconnected, None);
        let session = WhatsAppSession::new(fake.clone());

        let state = session.generate_qr().await.unwrap();
        assert_eq!(*fake.restarts.lock().unwrap(), 1);
        assert_eq!(state.status, SessionStatus::QrPending);
        assert_eq!(state.qr_code.as_deref(), Some("qr-fresco"));
    }

    #[tokio::test]
    async fn generate_qr_refuses_when_connected() {
        let fake = FakeClient::with_status(SessionStatus::Connected, None);
        let session = WhatsAppSession::new(fake.clone());
        assert!(matches!(session.generate_qr().await, Err(AppError::InvalidInput(_))));
        assert_eq!(*fake.restarts.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn disconnect_clears_session() {
        let fake = FakeClient::with_status(SessionStatus::Connected, None);
        let session = WhatsAppSession::new(fake.clone());
        session.refresh().await;

        session.disconnect().await.unwrap();
        let state = session.snapshot().await;
        assert_eq!(state.status, SessionStatus::Disconnected);
        assert!(state.connected_at.is_none());
    }

    #[tokio::test]
    async fn disabled_session_reports_unavailable() {
        let session = WhatsAppSession::disabled();
        assert_eq!(session.refresh().await.status, SessionStatus::Unavailable);
        assert!(matches!(session.send("11988887777", "x").await, Err(AppError::WhatsAppUnavailable)));
        assert!(matches!(session.qr().await, Err(AppError::WhatsAppUnavailable)));
        assert!(matches!(session.restart().await, Err(AppError::WhatsAppUnavailable)));
    }

    // --- Ponte HTTP: contrato de caminhos e campos ---

    type BridgeCalls = Arc<StdMutex<Vec<(&'static str, serde_json::Value)>>>;

    fn bridge_stub(calls: BridgeCalls) -> axum::Router {
        use axum::{
            extract::State,
            http::StatusCode,
            routing::{get, post},
            Json, Router,
        };
        use serde_json::Value;

        Router::new()
            .route("/status", get(|| async { Json(json!({ "status": "qr_pending", "qrCode": "2@abc" })) }))
            .route("/qr", get(|| async { Json(json!({ "qrCode": "2@fresco" })) }))
            .route(
                "/send",
                post(|State(calls): State<BridgeCalls>, Json(body): Json<Value>| async move {
                    calls.lock().unwrap().push(("send", body));
                    Json(json!({ "messageId": "wamid-42" }))
                }),
            )
            .route(
                "/logout",
                post(|State(calls): State<BridgeCalls>| async move {
                    calls.lock().unwrap().push(("logout", Value::Null));
                    StatusCode::OK
                }),
            )
            .route("/restart", post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "navegador caiu") }))
            .with_state(calls)
    }

    // Sobe a ponte falsa numa porta livre e devolve a URL base
    async fn spawn_bridge(calls: BridgeCalls) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let router = bridge_stub(calls);
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn bridge_client(base_url: &str) -> HttpBridgeClient {
        HttpBridgeClient::new(base_url, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn bridge_status_and_qr_read_camel_case_fields() {
        let base_url = spawn_bridge(BridgeCalls::default()).await;
        // Barra final é tolerada
        let client = bridge_client(&format!("{}/", base_url));

        let status = client.status().await.unwrap();
        assert_eq!(status.status, SessionStatus::QrPending);
        assert_eq!(status.qr_code.as_deref(), Some("2@abc"));

        assert_eq!(client.qr().await.unwrap().as_deref(), Some("2@fresco"));
    }

    #[tokio::test]
    async fn bridge_send_posts_chat_id_and_reads_message_id() {
        let calls = BridgeCalls::default();
        let client = bridge_client(&spawn_bridge(calls.clone()).await);

        let message_id = client.send("5511988887777@c.us", "Seu horário está confirmado").await.unwrap();
        assert_eq!(message_id.as_deref(), Some("wamid-42"));

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        let (path, body) = &calls[0];
        assert_eq!(*path, "send");
        assert_eq!(body["chatId"], "5511988887777@c.us");
        assert_eq!(body["message"], "Seu horário está confirmado");
    }

    #[tokio::test]
    async fn bridge_disconnect_calls_logout() {
        let calls = BridgeCalls::default();
        let client = bridge_client(&spawn_bridge(calls.clone()).await);

        client.disconnect().await.unwrap();

        let paths: Vec<&str> = calls.lock().unwrap().iter().map(|(p, _)| *p).collect();
        assert_eq!(paths, vec!["logout"]);
    }

    #[tokio::test]
    async fn bridge_error_status_becomes_whatsapp_error() {
        let client = bridge_client(&spawn_bridge(BridgeCalls::default()).await);

        let err = client.restart().await.unwrap_err();
        match &err {
            AppError::WhatsApp(msg) => {
                assert!(msg.contains("500"), "{}", msg);
                assert!(msg.contains("navegador caiu"), "{}", msg);
            }
            other => panic!("esperava AppError::WhatsApp, veio {:?}", other),
        }

        let api = err.to_api_error(&crate::middleware::i18n::Locale::default());
        assert_eq!(api.status, axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn unreachable_bridge_is_a_whatsapp_error() {
        // Porta livre sem ninguém escutando
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = bridge_client(&format!("http://{}", addr));
        assert!(matches!(client.status().await, Err(AppError::WhatsApp(_))));
    }
}
