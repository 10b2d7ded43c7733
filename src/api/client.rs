use std::sync::Arc;

use serde_json::Value;

use crate::api::models::{
    AuthResponse, ConversationsResponse, LoginRequest, MessagesResponse, RegisterClientRequest,
    RegisterCompanyRequest, SendMessageRequest, SendReceipt, User,
};
use crate::api::transport::Transport;
use crate::app::AppConfig;
use crate::error::ApiError;
use crate::session::SessionStore;

#[derive(Clone)]
pub struct ApiClient {
    transport: Transport,
}

impl ApiClient {
    pub fn new(transport: Transport) -> Self {
        Self { transport }
    }

    pub fn from_config(config: &AppConfig, session: Arc<SessionStore>) -> Result<Self, ApiError> {
        Ok(Self::new(Transport::new(config, session)?))
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        self.transport.session()
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ApiError> {
        self.transport
            .post(LOGIN, request)
            .await?
            .ok_or_else(|| ApiError::EmptyResponse(LOGIN.into()))
    }

    pub async fn register_client(&self, request: &RegisterClientRequest) -> Result<(), ApiError> {
        self.transport
            .post::<_, Value>("/registrar/cliente", request)
            .await?;
        Ok(())
    }

    pub async fn register_company(&self, request: &RegisterCompanyRequest) -> Result<(), ApiError> {
        self.transport
            .post::<_, Value>("/registrar/empresa", request)
            .await?;
        Ok(())
    }

    /// Resolves a client or company account by email.
    pub async fn find_user_by_email(&self, email: &str) -> Result<User, ApiError> {
        let encoded: String = url::form_urlencoded::byte_serialize(email.as_bytes()).collect();
        let path = format!("/usuarios/buscar-por-email?email={encoded}");
        self.transport
            .get(&path)
            .await?
            .ok_or(ApiError::EmptyResponse(path))
    }

    pub async fn conversations(&self) -> Result<ConversationsResponse, ApiError> {
        Ok(self
            .transport
            .get("/mensagens/conversas")
            .await?
            .unwrap_or_default())
    }

    pub async fn messages(&self, conversation_id: &str) -> Result<MessagesResponse, ApiError> {
        let path = format!("/mensagens/conversa/{conversation_id}");
        Ok(self.transport.get(&path).await?.unwrap_or_default())
    }

    pub async fn send_message(&self, request: &SendMessageRequest) -> Result<SendReceipt, ApiError> {
        let json: Option<Value> = self.transport.post("/mensagens", request).await?;
        Ok(SendReceipt::from_json(json.as_ref()))
    }
}

const LOGIN: &str = "/auth/login";
