use std::io;
use std::path::PathBuf;

use async_trait::async_trait;

use crate::domain::ports::SessionStore;
use crate::domain::session::Session;
use crate::errors::ApiError;

/// Session persistence as a JSON file, standing in for the device's
/// key-value storage. A corrupt file is treated as "not logged in" rather
/// than an error the user cannot act on.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileSessionStore { path: path.into() }
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn save(&self, session: &Session) -> Result<(), ApiError> {
        let body = serde_json::to_vec_pretty(session)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, body).await?;
        Ok(())
    }

    async fn load(&self) -> Result<Option<Session>, ApiError> {
        let body = match tokio::fs::read(&self.path).await {
            Ok(body) => body,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_slice(&body) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                log::warn!("Ignoring unreadable session file {}: {e}", self.path.display());
                Ok(None)
            }
        }
    }

    async fn clear(&self) -> Result<(), ApiError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::domain::session::UserProfile;

    fn session() -> Session {
        Session {
            token: "tok-789".to_string(),
            user: UserProfile {
                id: Uuid::new_v4(),
                name: "Ravi".to_string(),
                email: "ravi@example.test".to_string(),
                is_admin: true,
                created_at: Utc::now(),
            },
        }
    }

    #[tokio::test]
    async fn session_round_trips_through_the_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileSessionStore::new(dir.path().join("session.json"));
        let original = session();

        store.save(&original).await.expect("save");
        let loaded = store.load().await.expect("load").expect("present");

        assert_eq!(loaded.token, original.token);
        assert_eq!(loaded.user.email, original.user.email);
        assert!(loaded.user.is_admin);
    }

    #[tokio::test]
    async fn missing_file_loads_as_logged_out() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileSessionStore::new(dir.path().join("session.json"));
        assert!(store.load().await.expect("load").is_none());
    }

    #[tokio::test]
    async fn corrupt_file_loads_as_logged_out() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("session.json");
        tokio::fs::write(&path, b"{not json").await.expect("write");

        let store = FileSessionStore::new(path);
        assert!(store.load().await.expect("load").is_none());
    }

    #[tokio::test]
    async fn clear_is_idempotent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileSessionStore::new(dir.path().join("session.json"));

        store.save(&session()).await.expect("save");
        store.clear().await.expect("clear");
        store.clear().await.expect("clear again");
        assert!(store.load().await.expect("load").is_none());
    }
}
