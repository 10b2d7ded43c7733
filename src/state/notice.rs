use crate::error::{ClientError, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

/// A transient message for the user (a toast in the GTK front end).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub description: String,
}

impl Notice {
    pub fn new(level: NoticeLevel, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, title, description)
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, title, description)
    }

    pub fn from_validation(err: &ValidationError) -> Self {
        let level = match err {
            ValidationError::PasswordMismatch => NoticeLevel::Error,
            _ => NoticeLevel::Warning,
        };
        Self::new(level, err.title(), err.to_string())
    }

    /// Validation failures keep their own title; server and network failures
    /// are shown under `title` with whatever text the server sent.
    pub fn from_client_error(title: &str, err: &ClientError) -> Self {
        match err {
            ClientError::Validation(v) => Self::from_validation(v),
            ClientError::Api(e) => Self::error(title, e.to_string()),
        }
    }

    pub fn text(&self) -> String {
        if self.description.is_empty() {
            self.title.clone()
        } else {
            format!("{}: {}", self.title, self.description)
        }
    }
}
