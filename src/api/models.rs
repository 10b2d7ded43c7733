use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Account kind. A client talks to companies and a company talks to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    #[default]
    #[serde(alias = "cliente")]
    Cliente,
    #[serde(alias = "empresa")]
    Empresa,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Cliente => "CLIENTE",
            Role::Empresa => "EMPRESA",
        }
    }

    /// How the role is shown next to the user's name.
    pub fn label(&self) -> &'static str {
        match self {
            Role::Cliente => "Cliente",
            Role::Empresa => "Empresa",
        }
    }

    /// Heading of the conversation list for a user of this role.
    pub fn counterpart_label(&self) -> &'static str {
        match self {
            Role::Cliente => "Empresas",
            Role::Empresa => "Clientes",
        }
    }

    pub fn search_placeholder(&self) -> &'static str {
        match self {
            Role::Cliente => "Buscar empresas...",
            Role::Empresa => "Buscar clientes...",
        }
    }

    pub fn add_contact_label(&self) -> &'static str {
        match self {
            Role::Cliente => "Adicionar Empresa",
            Role::Empresa => "Adicionar Cliente",
        }
    }

    pub fn empty_list_label(&self) -> &'static str {
        match self {
            Role::Cliente => "Nenhuma empresa na sua lista ainda",
            Role::Empresa => "Nenhum cliente na sua lista ainda",
        }
    }

    pub fn select_prompt(&self) -> &'static str {
        match self {
            Role::Cliente => "Selecione uma empresa para começar a conversar",
            Role::Empresa => "Selecione um cliente para começar a conversar",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Server-assigned identifier.
///
/// `/auth/login` hands out UUID strings while the messaging endpoints use
/// integers, so both are accepted. Values compare by their text and numeric
/// ids go back on the wire as JSON numbers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RemoteId(String);

pub type UserId = RemoteId;
pub type MessageId = RemoteId;

impl RemoteId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RemoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<i64> for RemoteId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for RemoteId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for RemoteId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Serialize for RemoteId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0.parse::<i64>() {
            Ok(n) => serializer.serialize_i64(n),
            Err(_) => serializer.serialize_str(&self.0),
        }
    }
}

impl<'de> Deserialize<'de> for RemoteId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            Text(String),
        }
        Ok(match Raw::deserialize(deserializer)? {
            Raw::Int(n) => RemoteId::from(n),
            Raw::Text(s) => RemoteId(s),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    #[serde(rename = "nome")]
    pub name: String,
    pub email: String,
    #[serde(rename = "tipo")]
    pub role: Role,
}

impl User {
    pub fn same_account(&self, other: &User) -> bool {
        self.id == other.id && self.role == other.role
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    #[serde(rename = "senha")]
    pub password: String,
    #[serde(rename = "tipo")]
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    pub id: UserId,
    #[serde(rename = "nome")]
    pub name: String,
    pub email: String,
    #[serde(rename = "tipo")]
    pub role: Role,
}

impl AuthResponse {
    pub fn into_parts(self) -> (String, User) {
        let user = User {
            id: self.id,
            name: self.name,
            email: self.email,
            role: self.role,
        };
        (self.session_id, user)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterClientRequest {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "sobrenome")]
    pub surname: String,
    #[serde(rename = "sexo")]
    pub sex: String,
    pub email: String,
    #[serde(rename = "cpf_cnpj")]
    pub tax_id: String,
    #[serde(rename = "senha")]
    pub password: String,
    #[serde(rename = "confirmacao_senha")]
    pub password_confirmation: String,
    #[serde(rename = "telefone")]
    pub phone: String,
    #[serde(rename = "sobre")]
    pub about: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterCompanyRequest {
    #[serde(rename = "razao_social")]
    pub legal_name: String,
    pub cnpj: String,
    #[serde(rename = "telefone")]
    pub phone: String,
    pub email: String,
    #[serde(rename = "senha")]
    pub password: String,
    #[serde(rename = "confirmacao_senha")]
    pub password_confirmation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    #[serde(rename = "conversaId")]
    pub id: String,
    #[serde(rename = "outroUsuarioId")]
    pub counterpart_id: UserId,
    #[serde(rename = "outroUsuarioNome")]
    pub counterpart_name: String,
    #[serde(rename = "outroUsuarioTipo")]
    pub counterpart_role: Role,
    #[serde(rename = "ultimaMensagem", default)]
    pub last_message: Option<String>,
    #[serde(rename = "ultimaMensagemDataHora", default)]
    pub last_message_at: Option<String>,
    #[serde(rename = "mensagensNaoLidas", default)]
    pub unread: u32,
}

impl Conversation {
    pub fn recipient(&self) -> Recipient {
        Recipient::new(self.counterpart_id.clone(), self.counterpart_role)
    }

    pub fn preview(&self) -> &str {
        match self.last_message.as_deref() {
            Some(text) if !text.is_empty() => text,
            _ => "Nenhuma mensagem ainda",
        }
    }

    pub fn time_label(&self) -> Option<&str> {
        self.last_message_at.as_deref().map(crate::utils::time_label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    #[serde(rename = "conversaId")]
    pub conversation_id: String,
    #[serde(rename = "remetenteId")]
    pub sender_id: UserId,
    #[serde(rename = "destinatarioId")]
    pub recipient_id: UserId,
    #[serde(rename = "conteudo")]
    pub content: String,
    #[serde(default)]
    pub status: String,
    #[serde(rename = "momentoEnvio", default)]
    pub sent_at: String,
}

impl Message {
    pub fn is_from(&self, user: &User) -> bool {
        self.sender_id == user.id
    }

    pub fn time_label(&self) -> &str {
        crate::utils::time_label(&self.sent_at)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationsResponse {
    #[serde(rename = "conversas", default)]
    pub conversations: Vec<Conversation>,
    #[serde(default)]
    pub total: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagesResponse {
    #[serde(rename = "mensagens", default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub total: u64,
}

/// Who a message goes to. Travels as `destinatarioId` + `tipoDestinatario`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Recipient {
    Client(UserId),
    Company(UserId),
}

impl Recipient {
    pub fn new(id: UserId, role: Role) -> Self {
        match role {
            Role::Cliente => Recipient::Client(id),
            Role::Empresa => Recipient::Company(id),
        }
    }

    pub fn id(&self) -> &UserId {
        match self {
            Recipient::Client(id) | Recipient::Company(id) => id,
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Recipient::Client(_) => Role::Cliente,
            Recipient::Company(_) => Role::Empresa,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Channel {
    Email,
    Sms,
    #[default]
    ChatOnline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    #[default]
    Nenhuma,
    Baixa,
    Alta,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendMessageRequest {
    /// `None` asks the server to create the conversation.
    pub conversation_id: Option<String>,
    pub recipient: Recipient,
    pub content: String,
    pub channel: Channel,
    pub priority: Priority,
}

impl SendMessageRequest {
    /// A plain chat message as the chat view sends it.
    pub fn chat(conversation_id: Option<String>, recipient: Recipient, content: impl Into<String>) -> Self {
        Self {
            conversation_id,
            recipient,
            content: content.into(),
            channel: Channel::ChatOnline,
            priority: Priority::Nenhuma,
        }
    }
}

impl Serialize for SendMessageRequest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Wire<'a> {
            #[serde(rename = "conversaId", skip_serializing_if = "Option::is_none")]
            conversation_id: Option<&'a str>,
            #[serde(rename = "destinatarioId")]
            recipient_id: &'a UserId,
            #[serde(rename = "tipoDestinatario")]
            recipient_role: Role,
            #[serde(rename = "conteudo")]
            content: &'a str,
            #[serde(rename = "tipo")]
            channel: Channel,
            #[serde(rename = "prioridade")]
            priority: Priority,
        }

        Wire {
            conversation_id: self.conversation_id.as_deref(),
            recipient_id: self.recipient.id(),
            recipient_role: self.recipient.role(),
            content: &self.content,
            channel: self.channel,
            priority: self.priority,
        }
        .serialize(serializer)
    }
}

/// What the server tells us about a sent message. The response shape is loose,
/// so fields are picked out of whatever JSON came back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendReceipt {
    pub conversation_id: Option<String>,
    pub message_id: Option<MessageId>,
}

impl SendReceipt {
    pub fn from_json(json: Option<&Value>) -> Self {
        let Some(json) = json else {
            return Self::default();
        };
        let nested = json.get("mensagem").or_else(|| json.get("data"));
        let conversation_id = json
            .get("conversaId")
            .or_else(|| nested.and_then(|n| n.get("conversaId")))
            .and_then(value_as_id)
            .map(|id| id.as_str().to_string());
        let message_id = json
            .get("id")
            .or_else(|| nested.and_then(|n| n.get("id")))
            .and_then(value_as_id);
        Self { conversation_id, message_id }
    }
}

fn value_as_id(v: &Value) -> Option<RemoteId> {
    match v {
        Value::String(s) if !s.is_empty() => Some(RemoteId::new(s.clone())),
        Value::Number(n) => n.as_i64().map(RemoteId::from),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn send_request_omits_missing_conversation_id() {
        let req = SendMessageRequest::chat(None, Recipient::Company(RemoteId::from(7)), "oi");
        let v = serde_json::to_value(&req).unwrap();
        assert!(v.get("conversaId").is_none());
        assert_eq!(v["destinatarioId"], 7);
        assert_eq!(v["tipoDestinatario"], "EMPRESA");
        assert_eq!(v["conteudo"], "oi");
        assert_eq!(v["tipo"], "CHAT_ONLINE");
        assert_eq!(v["prioridade"], "NENHUMA");
    }

    #[test]
    fn send_request_keeps_existing_conversation_id() {
        let req = SendMessageRequest::chat(
            Some("c-1".into()),
            Recipient::Client(RemoteId::new("a1b2")),
            "hello",
        );
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["conversaId"], "c-1");
        assert_eq!(v["destinatarioId"], "a1b2");
        assert_eq!(v["tipoDestinatario"], "CLIENTE");
    }

    #[test]
    fn remote_id_accepts_numbers_and_strings() {
        let a: RemoteId = serde_json::from_value(json!(42)).unwrap();
        let b: RemoteId = serde_json::from_value(json!("42")).unwrap();
        assert_eq!(a, b);
        let uuid: RemoteId =
            serde_json::from_value(json!("5f0c7a9e-0000-4000-8000-000000000001")).unwrap();
        assert_eq!(uuid.as_str(), "5f0c7a9e-0000-4000-8000-000000000001");
    }

    #[test]
    fn conversation_decodes_with_missing_optional_fields() {
        let c: Conversation = serde_json::from_value(json!({
            "conversaId": "c-9",
            "outroUsuarioId": 3,
            "outroUsuarioNome": "Mega Store",
            "outroUsuarioTipo": "EMPRESA"
        }))
        .unwrap();
        assert_eq!(c.unread, 0);
        assert_eq!(c.preview(), "Nenhuma mensagem ainda");
        assert_eq!(c.recipient(), Recipient::Company(RemoteId::from(3)));
    }

    #[test]
    fn role_accepts_lowercase_alias() {
        let r: Role = serde_json::from_value(json!("empresa")).unwrap();
        assert_eq!(r, Role::Empresa);
        assert_eq!(serde_json::to_value(Role::Cliente).unwrap(), json!("CLIENTE"));
    }

    #[test]
    fn role_label_is_human_readable() {
        assert_eq!(Role::Cliente.label(), "Cliente");
        assert_eq!(Role::Empresa.label(), "Empresa");
        assert_eq!(Role::Empresa.to_string(), "EMPRESA");
    }

    #[test]
    fn receipt_reads_nested_conversation_id() {
        let body = json!({"mensagem": {"id": 12, "conversaId": "c-2"}});
        let receipt = SendReceipt::from_json(Some(&body));
        assert_eq!(receipt.conversation_id.as_deref(), Some("c-2"));
        assert_eq!(receipt.message_id, Some(RemoteId::from(12)));
        assert_eq!(SendReceipt::from_json(None), SendReceipt::default());
    }

    #[test]
    fn message_ownership_compares_ids_across_encodings() {
        let me = User {
            id: RemoteId::from(1),
            name: "Ana".into(),
            email: "ana@x.com".into(),
            role: Role::Cliente,
        };
        let m: Message = serde_json::from_value(json!({
            "id": 5,
            "conversaId": "c-1",
            "remetenteId": "1",
            "destinatarioId": 2,
            "conteudo": "oi",
            "status": "ENVIADA",
            "momentoEnvio": "2025-11-02T10:20:30"
        }))
        .unwrap();
        assert!(m.is_from(&me));
        assert_eq!(m.time_label(), "10:20");
    }
}
