//! Persisted state document.
//!
//! A single JSON object holding the marketplace credentials, the custodial
//! wallet key and the wallet settings. The whole document is rewritten on every
//! save; unknown keys found on load are dropped.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::blockchain::chains::Chain;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode state document: {0}")]
    Encode(#[from] serde_json::Error),
}

/// On-disk shape of the state file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(
        default,
        rename = "ai_id",
        alias = "agent_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub agent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_private_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_address: Option<String>,
    #[serde(default, deserialize_with = "lenient_chain")]
    pub chain: Chain,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub auto_pay: bool,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub auto_accept_candidates: bool,
}

// A hand-edited or outdated value in one field must not cost the whole document
// (and with it the wallet key), so settings fall back to their defaults.
fn lenient_chain<'de, D: Deserializer<'de>>(de: D) -> Result<Chain, D::Error> {
    let raw = Value::deserialize(de)?;
    let parsed = match &raw {
        Value::String(s) => Chain::parse(s),
        Value::Number(n) => Chain::parse(&n.to_string()),
        _ => None,
    };
    Ok(parsed.unwrap_or_else(|| {
        warn!("Unknown chain {} in state file, using {}", raw, Chain::default());
        Chain::default()
    }))
}

fn lenient_flag<'de, D: Deserializer<'de>>(de: D) -> Result<bool, D::Error> {
    let raw = Value::deserialize(de)?;
    Ok(match &raw {
        Value::Bool(b) => *b,
        Value::String(s) => matches!(s.trim().to_lowercase().as_str(), "true" | "yes" | "on" | "1"),
        Value::Number(n) => n.as_u64().map_or(false, |n| n != 0),
        _ => false,
    })
}

/// Reads and writes the state document at a fixed path.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the document. Missing or unreadable files yield an empty document.
    ///
    /// An unreadable file is moved aside first, so the next save cannot destroy
    /// the credentials or wallet key it may still hold.
    pub fn load(&self) -> StateDocument {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No saved state at {}", self.path.display());
                return StateDocument::default();
            }
            Err(e) => {
                warn!("Cannot read state file {}: {}", self.path.display(), e);
                self.quarantine();
                return StateDocument::default();
            }
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!("Ignoring unreadable state file {}: {}", self.path.display(), e);
            self.quarantine();
            StateDocument::default()
        })
    }

    /// First free `<file>.bak`, `<file>.bak.1`, ... next to the state file.
    pub fn backup_path(&self) -> PathBuf {
        let base = format!("{}.bak", self.path.display());
        let mut candidate = PathBuf::from(&base);
        let mut n = 1;
        while candidate.exists() {
            candidate = PathBuf::from(format!("{}.{}", base, n));
            n += 1;
        }
        candidate
    }

    fn quarantine(&self) {
        let backup = self.backup_path();
        match fs::rename(&self.path, &backup) {
            Ok(()) => warn!("Moved unreadable state file to {}", backup.display()),
            Err(e) => error!(
                "Could not move unreadable state file {} aside: {}",
                self.path.display(),
                e
            ),
        }
    }

    /// Overwrites the file with the full document.
    pub fn try_save(&self, doc: &StateDocument) -> Result<(), StoreError> {
        let io_err = |source: std::io::Error| StoreError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }
        let mut body = serde_json::to_string_pretty(doc)?;
        body.push('\n');
        fs::write(&self.path, body).map_err(io_err)?;
        restrict_permissions(&self.path);
        Ok(())
    }

    /// Like [`try_save`](Self::try_save) but only warns on failure.
    pub fn save(&self, doc: &StateDocument) -> bool {
        match self.try_save(doc) {
            Ok(()) => true,
            Err(e) => {
                warn!("Could not save state: {}", e);
                false
            }
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    if let Err(e) = fs::set_permissions(path, fs::Permissions::from_mode(0o600)) {
        debug!("Could not restrict permissions on {}: {}", path.display(), e);
    }
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) {}
