use crate::domain::model::TokenPair;
use crate::domain::ports::TokenStore;
use crate::utils::error::Result;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError, RwLock};

#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    tokens: RwLock<Option<TokenPair>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tokens(tokens: TokenPair) -> Self {
        Self {
            tokens: RwLock::new(Some(tokens)),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> Result<Option<TokenPair>> {
        let guard = self.tokens.read().unwrap_or_else(PoisonError::into_inner);
        Ok(guard.clone())
    }

    fn set(&self, tokens: TokenPair) -> Result<()> {
        let mut guard = self.tokens.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Some(tokens);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut guard = self.tokens.write().unwrap_or_else(PoisonError::into_inner);
        *guard = None;
        Ok(())
    }
}

/// Token pair persisted as a JSON document.
///
/// Writes land in a sibling temp file which is then renamed over the target.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "tokens".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self) -> Result<Option<TokenPair>> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);

        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        if data.is_empty() {
            return Ok(None);
        }

        let tokens: TokenPair = serde_json::from_slice(&data).map_err(|e| {
            crate::utils::error::ClientError::Storage {
                message: format!("Corrupt token file {}: {}", self.path.display(), e),
            }
        })?;
        Ok(Some(tokens))
    }

    fn set(&self, tokens: TokenPair) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let data = serde_json::to_vec_pretty(&tokens)?;
        let temp = self.temp_path();
        fs::write(&temp, data)?;
        fs::rename(&temp, &self.path)?;

        tracing::debug!("Token pair written to {}", self.path.display());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);

        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
