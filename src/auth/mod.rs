//! Persisted session (encrypted file-based storage)
//!
//! The signed-in user and their token are stored encrypted with AES-256-GCM
//! in ~/.config/ignite-gym/session.enc. The encryption key is derived from
//! machine-specific identifiers, so a copied file is useless elsewhere.

use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, KeyInit},
};
use anyhow::{Context, Result};
use rand::Rng;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::AuthSession;
use crate::paths;

const NONCE_SIZE: usize = 12;

/// Get machine ID for key derivation (cross-platform)
fn machine_id() -> String {
    // Linux: /etc/machine-id or /var/lib/dbus/machine-id
    #[cfg(target_os = "linux")]
    {
        for candidate in ["/etc/machine-id", "/var/lib/dbus/machine-id"] {
            if let Ok(id) = fs::read_to_string(candidate) {
                return id.trim().to_string();
            }
        }
    }

    // macOS: IOPlatformUUID via ioreg
    #[cfg(target_os = "macos")]
    {
        if let Ok(output) = std::process::Command::new("ioreg")
            .args(["-rd1", "-c", "IOPlatformExpertDevice"])
            .output()
        {
            let stdout = String::from_utf8_lossy(&output.stdout);
            if let Some(uuid) = stdout
                .lines()
                .find(|line| line.contains("IOPlatformUUID"))
                .and_then(|line| line.split('"').nth(3))
            {
                return uuid.to_string();
            }
        }
    }

    // Fallback: home directory path
    dirs::home_dir().map_or_else(
        || "ignite-gym-fallback-key".to_string(),
        |p| p.to_string_lossy().to_string(),
    )
}

/// Derive encryption key from machine-specific data
fn derive_key() -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(machine_id().as_bytes());
    if let Some(home) = dirs::home_dir() {
        hasher.update(home.to_string_lossy().as_bytes());
    }
    hasher.update(b"ignite-gym-session-v1");
    hasher.finalize().into()
}

fn cipher() -> Result<Aes256Gcm> {
    Aes256Gcm::new_from_slice(&derive_key()).map_err(|_| anyhow::anyhow!("Invalid key length"))
}

/// Encrypted on-disk session
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Store at the default location
    pub fn open() -> Result<Self> {
        Ok(Self::at(paths::session_path()?))
    }

    /// Store at a specific file
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored session.
    ///
    /// A missing, truncated, or undecryptable file reads as "signed out".
    pub fn load(&self) -> Option<AuthSession> {
        match self.try_load() {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(error = %e, path = %self.path.display(), "discarding unreadable session");
                None
            }
        }
    }

    fn try_load(&self) -> Result<Option<AuthSession>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let encrypted = fs::read(&self.path).context("Failed to read session file")?;
        if encrypted.len() < NONCE_SIZE {
            return Ok(None);
        }

        let (nonce_bytes, ciphertext) = encrypted.split_at(NONCE_SIZE);
        let plaintext = cipher()?
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|_| anyhow::anyhow!("Failed to decrypt session"))?;

        let session = serde_json::from_slice(&plaintext).context("Invalid session payload")?;
        Ok(Some(session))
    }

    /// Persist the session, replacing any previous one
    pub fn save(&self, session: &AuthSession) -> Result<()> {
        let json = serde_json::to_vec(session)?;

        let mut nonce_bytes = [0u8; NONCE_SIZE];
        rand::rng().fill(&mut nonce_bytes);

        let ciphertext = cipher()?
            .encrypt(Nonce::from_slice(&nonce_bytes), json.as_slice())
            .map_err(|_| anyhow::anyhow!("Failed to encrypt session"))?;

        let mut output = nonce_bytes.to_vec();
        output.extend(ciphertext);

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("Failed to create session directory")?;
        }
        fs::write(&self.path, output).context("Failed to write session file")?;

        // Set restrictive permissions on Unix
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(&self.path)?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&self.path, perms)?;
        }

        tracing::debug!(path = %self.path.display(), "session saved");
        Ok(())
    }

    /// Forget the stored session
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).context("Failed to remove session file"),
        }
    }
}
