//! Credential persistence.
//!
//! Keys live in a small TOML file (`jp_api_key`, `anthropic_api_key`), 0600 on
//! Unix. The file is read once when the store is opened; after that lookups
//! are served from memory and only `save_all` / `set` / `clear` touch disk.

use crate::domain::model::{CredentialKind, Credentials};
use crate::domain::ports::CredentialProvider;
use crate::utils::error::{LookupError, Result};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    current: RwLock<Credentials>,
}

impl FileCredentialStore {
    /// Opens the store at `path`. A missing file is an empty store, not an error.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let current = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            toml::from_str(&contents)?
        } else {
            Credentials::default()
        };

        tracing::debug!("Loaded credentials from {}", path.display());

        Ok(Self {
            path,
            current: RwLock::new(current),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn snapshot(&self) -> Credentials {
        self.current
            .read()
            .map(|c| (*c).clone())
            .unwrap_or_default()
    }

    pub fn is_complete(&self) -> bool {
        self.snapshot().is_complete()
    }

    /// Stores both keys at once. Both must be non-empty after trimming.
    pub fn save_all(&self, jp_api_key: &str, anthropic_api_key: &str) -> Result<()> {
        if jp_api_key.trim().is_empty() || anthropic_api_key.trim().is_empty() {
            return Err(LookupError::validation("Both API keys are required."));
        }

        self.update(|credentials| {
            credentials.set(CredentialKind::JoshuaProject, jp_api_key);
            credentials.set(CredentialKind::Anthropic, anthropic_api_key);
        })
    }

    pub fn set(&self, kind: CredentialKind, value: &str) -> Result<()> {
        if value.trim().is_empty() {
            return Err(LookupError::validation(format!(
                "{} API key cannot be empty",
                kind.service_name()
            )));
        }
        self.update(|credentials| credentials.set(kind, value))
    }

    /// Forgets both keys and removes the file.
    pub fn clear(&self) -> Result<()> {
        {
            let mut current = self.current.write().map_err(|_| poisoned())?;
            *current = Credentials::default();
        }

        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        tracing::info!("Cleared stored API keys");
        Ok(())
    }

    fn update<F>(&self, apply: F) -> Result<()>
    where
        F: FnOnce(&mut Credentials),
    {
        let snapshot = {
            let mut current = self.current.write().map_err(|_| poisoned())?;
            apply(&mut current);
            current.clone()
        };
        self.persist(&snapshot)
    }

    fn persist(&self, credentials: &Credentials) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let contents = toml::to_string(credentials)?;
        std::fs::write(&self.path, contents)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))?;
        }

        tracing::debug!("Saved credentials to {}", self.path.display());
        Ok(())
    }
}

fn poisoned() -> LookupError {
    LookupError::ConfigError {
        message: "credential store lock poisoned".to_string(),
    }
}

impl CredentialProvider for FileCredentialStore {
    fn credential(&self, kind: CredentialKind) -> Option<String> {
        self.current
            .read()
            .ok()
            .and_then(|c| c.get(kind).map(str::to_string))
    }
}
