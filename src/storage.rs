use crate::error::StorageError;
use crate::session::Session;
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

// The session lives in the runtime dir when there is one, so it goes away with
// the desktop session the way a browser tab's storage does.
fn session_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("br", "bigchat", "BigChatGTK")?;
    let dir = proj
        .runtime_dir()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| proj.cache_dir().to_path_buf());
    Some(dir.join("session.toml"))
}

fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Where the session token and user are persisted. Only the session store
/// writes here.
#[derive(Debug, Clone)]
pub struct SessionStorage {
    path: Option<PathBuf>,
}

impl SessionStorage {
    pub fn default_location() -> Self {
        Self { path: session_path() }
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: Some(path.into()) }
    }

    /// Storage that keeps nothing; the session only lives in memory.
    pub fn ephemeral() -> Self {
        Self { path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn load(&self) -> Result<Option<Session>, StorageError> {
        let Some(path) = &self.path else {
            return Ok(None);
        };
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(toml::from_str(&text)?))
    }

    pub fn save(&self, session: &Session) -> Result<(), StorageError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        ensure_dir(path)?;
        fs::write(path, toml::to_string_pretty(session)?)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
        }
        Ok(())
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::{RemoteId, Role, User};

    fn session() -> Session {
        Session {
            session_id: "s1".into(),
            user: User {
                id: RemoteId::new("5f0c7a9e-0000-4000-8000-000000000001"),
                name: "Tech Solutions LTDA".into(),
                email: "contato@techsolutions.com".into(),
                role: Role::Empresa,
            },
        }
    }

    #[test]
    fn save_load_clear() {
        let dir = tempfile::tempdir().unwrap();
        let storage = SessionStorage::at(dir.path().join("nested/session.toml"));
        assert_eq!(storage.load().unwrap(), None);

        storage.save(&session()).unwrap();
        assert_eq!(storage.load().unwrap(), Some(session()));

        storage.clear().unwrap();
        assert_eq!(storage.load().unwrap(), None);
        storage.clear().unwrap();
    }

    #[test]
    fn garbage_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.toml");
        fs::write(&path, "session_id = [").unwrap();
        assert!(matches!(
            SessionStorage::at(&path).load(),
            Err(StorageError::Parse(_))
        ));
    }

    #[test]
    fn ephemeral_storage_never_touches_disk() {
        let storage = SessionStorage::ephemeral();
        storage.save(&session()).unwrap();
        assert_eq!(storage.load().unwrap(), None);
        assert!(storage.path().is_none());
    }
}
