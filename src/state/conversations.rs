use std::sync::{Arc, Mutex};

use crate::api::client::ApiClient;
use crate::api::models::{Conversation, Recipient, Role};
use crate::error::ApiError;
use crate::utils::lock;

/// Sidebar state: the last fetched list, the selection and the search box.
#[derive(Debug, Clone, Default)]
pub struct ConversationList {
    contacts: Vec<Conversation>,
    selected: Option<Conversation>,
    search_term: String,
}

impl ConversationList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contacts(&self) -> &[Conversation] {
        &self.contacts
    }

    pub fn selected(&self) -> Option<&Conversation> {
        self.selected.as_ref()
    }

    /// Replaces the list wholesale. A selected conversation is swapped for its
    /// fresh copy when the id is still present.
    ///
    /// A selection whose id vanished from the response is kept as it was. That
    /// leaves a dangling selection if the server deleted the conversation; the
    /// behavior is pinned by tests until someone decides it should clear.
    pub fn apply_refresh(&mut self, conversations: Vec<Conversation>) {
        if let Some(current) = &self.selected {
            match conversations.iter().find(|c| c.id == current.id) {
                Some(fresh) => self.selected = Some(fresh.clone()),
                None => log::debug!("selected conversation {} missing from refresh", current.id),
            }
        }
        self.contacts = conversations;
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    /// Case-insensitive substring match on the counterpart's name. A blank term
    /// shows everything; otherwise the term is matched as typed, spaces included.
    pub fn filtered(&self) -> Vec<&Conversation> {
        if self.search_term.trim().is_empty() {
            return self.contacts.iter().collect();
        }
        let needle = self.search_term.to_lowercase();
        self.contacts
            .iter()
            .filter(|c| c.counterpart_name.to_lowercase().contains(&needle))
            .collect()
    }

    /// What to show instead of rows, if nothing passes the filter.
    pub fn empty_message(&self, viewer: Role) -> Option<&'static str> {
        if self.contacts.is_empty() {
            Some(viewer.empty_list_label())
        } else if self.filtered().is_empty() {
            Some("Nenhum contato encontrado")
        } else {
            None
        }
    }

    pub fn select(&mut self, id: &str) -> Option<&Conversation> {
        let found = self.contacts.iter().find(|c| c.id == id)?.clone();
        self.selected = Some(found);
        self.selected.as_ref()
    }

    /// The listed conversation with `recipient`, if there is one.
    pub fn find_with(&self, recipient: &Recipient) -> Option<&Conversation> {
        self.contacts.iter().find(|c| &c.recipient() == recipient)
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.as_ref().is_some_and(|c| c.id == id)
    }

}

/// Owns the shared list and knows how to refresh it.
#[derive(Clone)]
pub struct ConversationController {
    client: ApiClient,
    state: Arc<Mutex<ConversationList>>,
}

impl ConversationController {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            state: Arc::new(Mutex::new(ConversationList::new())),
        }
    }

    pub fn with_state<R>(&self, f: impl FnOnce(&mut ConversationList) -> R) -> R {
        f(&mut lock(&self.state))
    }

    pub fn snapshot(&self) -> ConversationList {
        lock(&self.state).clone()
    }

    pub async fn refresh(&self) -> Result<(), ApiError> {
        let response = self.client.conversations().await?;
        log::debug!("fetched {} conversations", response.conversations.len());
        self.with_state(|s| s.apply_refresh(response.conversations));
        Ok(())
    }

    /// Timer and focus refresh. Failures are logged and the list left alone.
    pub async fn poll_tick(&self) {
        if let Err(e) = self.refresh().await {
            log::warn!("conversation refresh failed: {e}");
        }
    }
}
