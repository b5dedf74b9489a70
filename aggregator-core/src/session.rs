use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::models::User;

pub const SESSION_FILE_NAME: &str = "session.json";

/// What gets written to disk. Token and user are only ever set together.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionData {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
}

impl SessionData {
    fn is_complete(&self) -> bool {
        self.token.is_some() && self.user.is_some()
    }
}

/// Handle to the current login. Clones share the same state.
#[derive(Debug, Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<SessionData>>,
    path: Option<PathBuf>,
}

impl SessionStore {
    pub fn in_memory() -> Self {
        Self {
            inner: Arc::new(RwLock::new(SessionData::default())),
            path: None,
        }
    }

    /// Restores a persisted session, falling back to the `.tmp` sibling when
    /// the main file is corrupted. Half-written sessions are discarded.
    pub async fn load_from(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let data = read_with_tmp_fallback(&path).await;
        let data = if data.is_complete() {
            info!(path = %path.display(), "restored persisted session");
            data
        } else {
            if data.token.is_some() || data.user.is_some() {
                warn!(path = %path.display(), "ignoring incomplete persisted session");
            }
            SessionData::default()
        };
        Self {
            inner: Arc::new(RwLock::new(data)),
            path: Some(path),
        }
    }

    /// Persists the new session, then makes it current. On a failed save the
    /// previous session stays in place.
    pub async fn login(&self, token: String, user: User) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let username = user.username.clone();
        let next = SessionData {
            token: Some(token),
            user: Some(user),
        };
        self.persist(&next).await?;
        *inner = next;
        info!(user = %username, "session opened");
        Ok(())
    }

    pub async fn logout(&self) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        self.remove_persisted().await?;
        if inner.token.is_none() && inner.user.is_none() {
            debug!("logout requested without an active session");
        } else {
            info!("session closed");
        }
        *inner = SessionData::default();
        Ok(())
    }

    pub async fn is_authenticated(&self) -> bool {
        self.inner.read().await.is_complete()
    }

    pub async fn token(&self) -> Option<String> {
        self.inner.read().await.token.clone()
    }

    pub async fn user(&self) -> Option<User> {
        self.inner.read().await.user.clone()
    }

    async fn persist(&self, data: &SessionData) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            debug!("session store is in-memory only; skipping persist");
            return Ok(());
        };
        let bytes = serde_json::to_vec_pretty(data)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &bytes).await?;
        if let Err(err) = tokio::fs::rename(&tmp, path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(err.into());
        }
        Ok(())
    }

    async fn remove_persisted(&self) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        for file in [path.clone(), path.with_extension("json.tmp")] {
            match tokio::fs::remove_file(&file).await {
                Ok(()) => {}
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => return Err(err.into()),
            }
        }
        Ok(())
    }
}

async fn read_with_tmp_fallback(path: &Path) -> SessionData {
    match tokio::fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice::<SessionData>(&bytes) {
            Ok(data) => data,
            Err(e) => {
                warn!(error = %e, path = %path.display(), "failed to parse session, trying tmp fallback");
                let tmp = path.with_extension("json.tmp");
                match tokio::fs::read(&tmp).await {
                    Ok(tmp_bytes) => serde_json::from_slice(&tmp_bytes).unwrap_or_default(),
                    Err(_) => SessionData::default(),
                }
            }
        },
        Err(_) => SessionData::default(),
    }
}
