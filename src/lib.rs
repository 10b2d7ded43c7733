pub mod api;
pub mod app;
pub mod error;
pub mod poll;
pub mod session;
pub mod state;
pub mod storage;
pub mod utils;

#[cfg(feature = "gui")]
pub mod ui;

pub use api::client::ApiClient;
pub use app::AppConfig;
pub use error::{ApiError, ClientError, StorageError, ValidationError};
pub use session::{Session, SessionStore};
