use reqwest::StatusCode;
use thiserror::Error;

/// Failures talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// Non-2xx response. `body` is the raw response text as sent by the server.
    #[error("{body}")]
    Status { status: StatusCode, body: String },
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
    #[error("empty response from {0}")]
    EmptyResponse(String),
}

/// Problems caught before any request leaves the client.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Por favor, preencha email e senha.")]
    MissingCredentials,
    #[error("Por favor, preencha todos os campos obrigatórios.")]
    MissingFields(Vec<&'static str>),
    #[error("A senha e a confirmação devem ser iguais.")]
    PasswordMismatch,
    #[error("Por favor, digite uma mensagem.")]
    EmptyMessage,
    #[error("Por favor, informe o email.")]
    EmptyEmail,
    #[error("Você não pode iniciar uma conversa consigo mesmo.")]
    SelfConversation,
    #[error("Faça login para continuar.")]
    NotAuthenticated,
    #[error("Selecione uma conversa para enviar mensagens.")]
    NoConversation,
    #[error("Aguarde o envio da mensagem anterior.")]
    SendInProgress,
}

impl ValidationError {
    pub fn title(&self) -> &'static str {
        match self {
            ValidationError::MissingCredentials | ValidationError::MissingFields(_) => {
                "Campos obrigatórios"
            }
            ValidationError::PasswordMismatch => "Senhas não conferem",
            ValidationError::EmptyMessage => "Mensagem vazia",
            ValidationError::EmptyEmail => "Email obrigatório",
            ValidationError::SelfConversation => "Conversa inválida",
            ValidationError::NotAuthenticated => "Sessão encerrada",
            ValidationError::NoConversation => "Nenhuma conversa",
            ValidationError::SendInProgress => "Enviando",
        }
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("session storage io: {0}")]
    Io(#[from] std::io::Error),
    #[error("session storage is not valid toml: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("could not encode session: {0}")]
    Encode(#[from] toml::ser::Error),
}
