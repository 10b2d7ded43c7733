use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::api::client::ApiClient;
use crate::api::models::{Conversation, Message, Recipient, SendMessageRequest, SendReceipt, User};
use crate::error::{ApiError, ClientError, ValidationError};
use crate::utils::lock;

/// Coarse lifecycle of the open conversation. `typing` and `sending` are
/// separate flags that hold back the `Ready -> Loading` step for polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Ready,
}

/// The conversation the chat view is showing. A draft has no id yet; the
/// server creates the conversation on the first send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTarget {
    pub conversation_id: Option<String>,
    pub recipient: Recipient,
    pub title: String,
}

impl ChatTarget {
    pub fn draft(counterpart: &User) -> Self {
        Self {
            conversation_id: None,
            recipient: Recipient::new(counterpart.id.clone(), counterpart.role),
            title: counterpart.name.clone(),
        }
    }
}

impl From<&Conversation> for ChatTarget {
    fn from(c: &Conversation) -> Self {
        Self {
            conversation_id: Some(c.id.clone()),
            recipient: c.recipient(),
            title: c.counterpart_name.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshCause {
    Open,
    Poll,
    AfterSend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Skipped,
    Applied,
    /// The answer arrived after the view moved on, or after a newer answer.
    Stale,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshTicket {
    epoch: u64,
    seq: u64,
    pub conversation_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendTicket {
    epoch: u64,
    pub request: SendMessageRequest,
}

#[derive(Debug, Default)]
pub struct ChatState {
    target: Option<ChatTarget>,
    messages: Vec<Message>,
    input: String,
    initial_load: bool,
    loaded: bool,
    in_flight: u32,
    typing: bool,
    sending: bool,
    // bumped whenever the view switches conversation
    epoch: u64,
    next_seq: u64,
    applied_seq: u64,
}

impl ChatState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn target(&self) -> Option<&ChatTarget> {
        self.target.as_ref()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn is_typing(&self) -> bool {
        self.typing
    }

    pub fn is_sending(&self) -> bool {
        self.sending
    }

    pub fn is_initial_load(&self) -> bool {
        self.initial_load
    }

    /// True from opening a conversation until its first answer arrives,
    /// including the moment before the first fetch has started.
    pub fn shows_spinner(&self) -> bool {
        self.initial_load && !self.loaded
    }

    pub fn phase(&self) -> Phase {
        if self.in_flight > 0 {
            Phase::Loading
        } else if self.loaded {
            Phase::Ready
        } else {
            Phase::Idle
        }
    }

    /// Switches to `target`. Returns false when it is the conversation already
    /// open, in which case only the header data is updated.
    pub fn open(&mut self, target: ChatTarget) -> bool {
        let same = match (&self.target, &target.conversation_id) {
            (Some(current), Some(id)) => current.conversation_id.as_deref() == Some(id.as_str()),
            _ => false,
        };
        if same {
            self.target = Some(target);
            return false;
        }
        self.epoch += 1;
        // a draft has nothing on the server to wait for
        self.initial_load = target.conversation_id.is_some();
        self.target = Some(target);
        self.messages.clear();
        self.input.clear();
        self.loaded = false;
        self.in_flight = 0;
        self.typing = false;
        self.sending = false;
        self.applied_seq = self.next_seq;
        true
    }

    /// Takes fresh header data for the open conversation. Returns whether
    /// anything changed; a target for another conversation is ignored.
    pub fn retitle(&mut self, target: ChatTarget) -> bool {
        let Some(current) = self.target.as_mut() else {
            return false;
        };
        if target.conversation_id.is_none()
            || current.conversation_id != target.conversation_id
            || *current == target
        {
            return false;
        }
        *current = target;
        true
    }

    pub fn close(&mut self) {
        self.epoch += 1;
        self.target = None;
        self.messages.clear();
        self.input.clear();
        self.initial_load = false;
        self.loaded = false;
        self.in_flight = 0;
        self.typing = false;
        self.sending = false;
    }

    /// Every keystroke marks the user as typing until the input loses focus.
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
        self.typing = true;
    }

    pub fn blur(&mut self) {
        self.typing = false;
    }

    pub fn begin_refresh(&mut self, cause: RefreshCause) -> Option<RefreshTicket> {
        let conversation_id = self.target.as_ref()?.conversation_id.clone()?;
        if cause == RefreshCause::Poll && (self.typing || self.sending || self.in_flight > 0) {
            log::trace!("poll skipped for {conversation_id}");
            return None;
        }
        self.in_flight += 1;
        self.next_seq += 1;
        Some(RefreshTicket {
            epoch: self.epoch,
            seq: self.next_seq,
            conversation_id,
        })
    }

    pub fn finish_refresh(&mut self, ticket: &RefreshTicket, result: Result<Vec<Message>, ApiError>) -> RefreshOutcome {
        if ticket.epoch != self.epoch {
            log::debug!("dropping messages for {}: view moved on", ticket.conversation_id);
            return RefreshOutcome::Stale;
        }
        self.in_flight = self.in_flight.saturating_sub(1);
        self.initial_load = false;
        self.loaded = true;
        match result {
            Ok(_) if ticket.seq < self.applied_seq => RefreshOutcome::Stale,
            Ok(messages) => {
                self.messages = messages;
                self.applied_seq = ticket.seq;
                RefreshOutcome::Applied
            }
            Err(e) => {
                log::warn!("message refresh for {} failed: {e}", ticket.conversation_id);
                RefreshOutcome::Failed
            }
        }
    }

    pub fn prepare_send(&mut self) -> Result<SendTicket, ValidationError> {
        let content = self.input.trim();
        if content.is_empty() {
            return Err(ValidationError::EmptyMessage);
        }
        let target = self.target.as_ref().ok_or(ValidationError::NoConversation)?;
        if self.sending {
            return Err(ValidationError::SendInProgress);
        }
        let request = SendMessageRequest::chat(
            target.conversation_id.clone(),
            target.recipient.clone(),
            content,
        );
        self.sending = true;
        Ok(SendTicket {
            epoch: self.epoch,
            request,
        })
    }

    /// Settles a send. On success the input is cleared (unless the user already
    /// typed something else) and a draft adopts the server's conversation id.
    /// Returns whether the conversation can now be refreshed.
    pub fn finish_send(&mut self, ticket: &SendTicket, result: Result<SendReceipt, ApiError>) -> Result<bool, ApiError> {
        if ticket.epoch != self.epoch {
            return result.map(|_| false);
        }
        self.sending = false;
        let receipt = result?;
        if self.input.trim() == ticket.request.content {
            self.input.clear();
        }
        let Some(target) = self.target.as_mut() else {
            return Ok(false);
        };
        if target.conversation_id.is_none() {
            target.conversation_id = receipt.conversation_id;
        }
        Ok(target.conversation_id.is_some())
    }
}

/// Drives a [`ChatState`] against the backend.
#[derive(Clone)]
pub struct ChatController {
    client: ApiClient,
    state: Arc<Mutex<ChatState>>,
    reconcile_delay: Duration,
}

impl ChatController {
    pub fn new(client: ApiClient, reconcile_delay: Duration) -> Self {
        Self {
            client,
            state: Arc::new(Mutex::new(ChatState::new())),
            reconcile_delay,
        }
    }

    pub fn with_state<R>(&self, f: impl FnOnce(&mut ChatState) -> R) -> R {
        f(&mut lock(&self.state))
    }

    pub fn open(&self, target: ChatTarget) -> bool {
        self.with_state(|s| s.open(target))
    }

    pub async fn refresh(&self, cause: RefreshCause) -> RefreshOutcome {
        let Some(ticket) = self.begin_refresh(cause) else {
            return RefreshOutcome::Skipped;
        };
        self.fetch(ticket).await
    }

    /// Claims a refresh slot without touching the network, so the caller can
    /// render the loading state before the fetch starts.
    pub fn begin_refresh(&self, cause: RefreshCause) -> Option<RefreshTicket> {
        self.with_state(|s| s.begin_refresh(cause))
    }

    pub async fn fetch(&self, ticket: RefreshTicket) -> RefreshOutcome {
        let result = self
            .client
            .messages(&ticket.conversation_id)
            .await
            .map(|r| r.messages);
        self.with_state(|s| s.finish_refresh(&ticket, result))
    }

    pub async fn poll_tick(&self) -> RefreshOutcome {
        self.refresh(RefreshCause::Poll).await
    }

    /// Sends the current input. On success a follow-up refresh is scheduled
    /// after the reconcile delay so the server's id and timestamp show up; its
    /// handle is returned for callers that want to wait on it.
    pub async fn send(&self) -> Result<Option<JoinHandle<RefreshOutcome>>, ClientError> {
        let ticket = self.with_state(|s| s.prepare_send())?;
        let result = self.client.send_message(&ticket.request).await;
        if let Err(e) = &result {
            log::warn!("send failed: {e}");
        }
        let can_refresh = self.with_state(|s| s.finish_send(&ticket, result))?;
        if !can_refresh {
            return Ok(None);
        }
        let this = self.clone();
        Ok(Some(tokio::spawn(async move {
            tokio::time::sleep(this.reconcile_delay).await;
            this.refresh(RefreshCause::AfterSend).await
        })))
    }

    /// Looks up an account by email and opens a draft conversation with it.
    pub async fn start_conversation(&self, email: &str) -> Result<ChatTarget, ClientError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(ValidationError::EmptyEmail.into());
        }
        let me = self
            .client
            .session()
            .current_user()
            .ok_or(ValidationError::NotAuthenticated)?;
        let counterpart = self.client.find_user_by_email(email).await?;
        if counterpart.same_account(&me) {
            return Err(ValidationError::SelfConversation.into());
        }
        let target = ChatTarget::draft(&counterpart);
        self.open(target.clone());
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::{RemoteId, Role};
    use reqwest::StatusCode;

    fn target(id: Option<&str>) -> ChatTarget {
        ChatTarget {
            conversation_id: id.map(str::to_string),
            recipient: Recipient::Company(RemoteId::from(9)),
            title: "Mega Store".into(),
        }
    }

    fn msg(id: i64, text: &str) -> Message {
        Message {
            id: RemoteId::from(id),
            conversation_id: "c1".into(),
            sender_id: RemoteId::from(1),
            recipient_id: RemoteId::from(9),
            content: text.into(),
            status: "ENVIADA".into(),
            sent_at: "2025-11-02T10:20:30".into(),
        }
    }

    fn server_error() -> ApiError {
        ApiError::Status {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: "boom".into(),
        }
    }

    #[test]
    fn spinner_only_on_first_load() {
        let mut chat = ChatState::new();
        chat.open(target(Some("c1")));
        assert_eq!(chat.phase(), Phase::Idle);

        assert!(chat.shows_spinner());

        let first = chat.begin_refresh(RefreshCause::Open).unwrap();
        assert!(chat.shows_spinner());
        assert_eq!(chat.phase(), Phase::Loading);
        assert_eq!(chat.finish_refresh(&first, Ok(vec![msg(1, "oi")])), RefreshOutcome::Applied);
        assert_eq!(chat.phase(), Phase::Ready);
        assert!(!chat.shows_spinner());

        chat.begin_refresh(RefreshCause::Poll).unwrap();
        assert!(!chat.shows_spinner());
    }

    #[test]
    fn failed_first_load_stops_the_spinner() {
        let mut chat = ChatState::new();
        chat.open(target(Some("c1")));
        let t = chat.begin_refresh(RefreshCause::Open).unwrap();
        chat.finish_refresh(&t, Err(server_error()));
        assert!(!chat.shows_spinner());
    }

    #[test]
    fn draft_never_shows_a_spinner() {
        let mut chat = ChatState::new();
        chat.open(target(None));
        assert!(!chat.shows_spinner());
        assert!(chat.messages().is_empty());
    }

    #[test]
    fn retitle_only_touches_the_open_conversation() {
        let mut chat = ChatState::new();
        chat.open(target(Some("c1")));
        chat.set_input("oi");

        let mut renamed = target(Some("c1"));
        renamed.title = "Mega Store LTDA".into();
        assert!(chat.retitle(renamed.clone()));
        assert_eq!(chat.target().unwrap().title, "Mega Store LTDA");
        assert_eq!(chat.input(), "oi");
        assert!(!chat.retitle(renamed));

        let mut other = target(Some("c2"));
        other.title = "Fast Delivery".into();
        assert!(!chat.retitle(other));
        assert_eq!(chat.target().unwrap().conversation_id.as_deref(), Some("c1"));
    }

    #[test]
    fn polls_wait_for_typing_and_sending() {
        let mut chat = ChatState::new();
        chat.open(target(Some("c1")));
        chat.set_input("ol");
        assert!(chat.is_typing());
        assert!(chat.begin_refresh(RefreshCause::Poll).is_none());
        // a refresh the user asked for still goes through
        assert!(chat.begin_refresh(RefreshCause::AfterSend).is_some());

        let mut chat = ChatState::new();
        chat.open(target(Some("c1")));
        chat.set_input("olá");
        chat.blur();
        chat.prepare_send().unwrap();
        assert!(chat.begin_refresh(RefreshCause::Poll).is_none());
    }

    #[test]
    fn poll_does_not_pile_up_behind_a_slow_fetch() {
        let mut chat = ChatState::new();
        chat.open(target(Some("c1")));
        let _pending = chat.begin_refresh(RefreshCause::Open).unwrap();
        assert!(chat.begin_refresh(RefreshCause::Poll).is_none());
    }

    #[test]
    fn draft_has_nothing_to_refresh() {
        let mut chat = ChatState::new();
        chat.open(target(None));
        assert!(chat.begin_refresh(RefreshCause::Open).is_none());
    }

    #[test]
    fn results_for_previous_conversation_are_dropped() {
        let mut chat = ChatState::new();
        chat.open(target(Some("c1")));
        let old = chat.begin_refresh(RefreshCause::Open).unwrap();
        chat.open(target(Some("c2")));

        assert_eq!(chat.finish_refresh(&old, Ok(vec![msg(1, "old")])), RefreshOutcome::Stale);
        assert!(chat.messages().is_empty());
        assert!(chat.is_initial_load());
    }

    #[test]
    fn older_answer_never_overwrites_newer_one() {
        let mut chat = ChatState::new();
        chat.open(target(Some("c1")));
        let slow = chat.begin_refresh(RefreshCause::Open).unwrap();
        let fast = chat.begin_refresh(RefreshCause::AfterSend).unwrap();

        assert_eq!(chat.finish_refresh(&fast, Ok(vec![msg(1, "a"), msg(2, "b")])), RefreshOutcome::Applied);
        assert_eq!(chat.finish_refresh(&slow, Ok(vec![msg(1, "a")])), RefreshOutcome::Stale);
        assert_eq!(chat.messages().len(), 2);
        assert_eq!(chat.phase(), Phase::Ready);
    }

    #[test]
    fn failed_refresh_keeps_messages() {
        let mut chat = ChatState::new();
        chat.open(target(Some("c1")));
        let t = chat.begin_refresh(RefreshCause::Open).unwrap();
        chat.finish_refresh(&t, Ok(vec![msg(1, "a")]));
        let t = chat.begin_refresh(RefreshCause::Poll).unwrap();
        assert_eq!(chat.finish_refresh(&t, Err(server_error())), RefreshOutcome::Failed);
        assert_eq!(chat.messages().len(), 1);
    }

    #[test]
    fn reopening_same_conversation_keeps_state() {
        let mut chat = ChatState::new();
        chat.open(target(Some("c1")));
        let t = chat.begin_refresh(RefreshCause::Open).unwrap();
        chat.finish_refresh(&t, Ok(vec![msg(1, "a")]));

        let mut renamed = target(Some("c1"));
        renamed.title = "Mega Store LTDA".into();
        assert!(!chat.open(renamed));
        assert_eq!(chat.messages().len(), 1);
        assert_eq!(chat.target().unwrap().title, "Mega Store LTDA");
    }

    #[test]
    fn blank_input_is_rejected_without_sending_state() {
        let mut chat = ChatState::new();
        chat.open(target(Some("c1")));
        chat.set_input("   \n");
        assert_eq!(chat.prepare_send(), Err(ValidationError::EmptyMessage));
        assert!(!chat.is_sending());
    }

    #[test]
    fn send_without_conversation_is_rejected() {
        let mut chat = ChatState::new();
        chat.set_input("oi");
        assert_eq!(chat.prepare_send(), Err(ValidationError::NoConversation));
    }

    #[test]
    fn double_send_is_rejected() {
        let mut chat = ChatState::new();
        chat.open(target(Some("c1")));
        chat.set_input("oi");
        chat.prepare_send().unwrap();
        assert_eq!(chat.prepare_send(), Err(ValidationError::SendInProgress));
    }

    #[test]
    fn failed_send_keeps_input_for_retry() {
        let mut chat = ChatState::new();
        chat.open(target(Some("c1")));
        chat.set_input(" oi ");
        let ticket = chat.prepare_send().unwrap();
        assert_eq!(ticket.request.content, "oi");

        assert!(chat.finish_send(&ticket, Err(server_error())).is_err());
        assert_eq!(chat.input(), " oi ");
        assert!(!chat.is_sending());
    }

    #[test]
    fn draft_adopts_conversation_id_from_receipt() {
        let mut chat = ChatState::new();
        chat.open(target(None));
        chat.set_input("primeira mensagem");
        let ticket = chat.prepare_send().unwrap();
        assert_eq!(ticket.request.conversation_id, None);

        let receipt = SendReceipt {
            conversation_id: Some("new-c".into()),
            message_id: Some(RemoteId::from(1)),
        };
        assert!(chat.finish_send(&ticket, Ok(receipt)).unwrap());
        assert_eq!(chat.input(), "");
        assert_eq!(chat.target().unwrap().conversation_id.as_deref(), Some("new-c"));
    }

    #[test]
    fn text_typed_during_send_survives() {
        let mut chat = ChatState::new();
        chat.open(target(Some("c1")));
        chat.set_input("one");
        let ticket = chat.prepare_send().unwrap();
        chat.set_input("two");
        assert!(chat.finish_send(&ticket, Ok(SendReceipt::default())).unwrap());
        assert_eq!(chat.input(), "two");
    }

    #[test]
    fn draft_target_uses_counterpart_role() {
        let user = User {
            id: RemoteId::from(4),
            name: "João Silva".into(),
            email: "joao@email.com".into(),
            role: Role::Cliente,
        };
        let t = ChatTarget::draft(&user);
        assert_eq!(t.recipient, Recipient::Client(RemoteId::from(4)));
        assert_eq!(t.conversation_id, None);
    }
}
