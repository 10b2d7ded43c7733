pub mod auth;
pub mod chat;
pub mod conversations;
pub mod notice;

pub use chat::{ChatController, ChatState, ChatTarget, Phase, RefreshCause, RefreshOutcome};
pub use conversations::{ConversationController, ConversationList};
pub use notice::{Notice, NoticeLevel};

/// Screens the app can be on. Flows return one of these instead of navigating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Register,
    Home,
}
