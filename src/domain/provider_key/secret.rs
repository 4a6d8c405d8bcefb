//! Secret handling: encryption at rest, masking and admin key detection

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rand::RngCore;
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::domain::DomainError;

const NONCE_LEN: usize = 12;
const ADMIN_KEY_MIN_LEN: usize = 20;

/// AES-256-GCM cipher keyed by the SHA-256 digest of a configured secret.
///
/// Ciphertexts are encoded as `base64(nonce):base64(ciphertext)`.
#[derive(Clone)]
pub struct KeyCipher {
    cipher: Aes256Gcm,
}

impl std::fmt::Debug for KeyCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyCipher").finish_non_exhaustive()
    }
}

impl KeyCipher {
    pub fn new(secret: &str) -> Result<Self, DomainError> {
        if secret.is_empty() {
            return Err(DomainError::configuration(
                "security.encryption_key must not be empty",
            ));
        }

        let digest = Sha256::digest(secret.as_bytes());
        let cipher = Aes256Gcm::new_from_slice(&digest)
            .map_err(|e| DomainError::encryption(format!("Invalid key length: {}", e)))?;

        Ok(Self { cipher })
    }

    pub fn encrypt(&self, plaintext: &str) -> Result<String, DomainError> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|e| DomainError::encryption(format!("Encryption failed: {}", e)))?;

        Ok(format!(
            "{}:{}",
            STANDARD.encode(nonce_bytes),
            STANDARD.encode(ciphertext)
        ))
    }

    /// Values without a `:` separator predate encryption and are returned as-is
    pub fn decrypt(&self, stored: &str) -> Result<String, DomainError> {
        let Some((nonce_b64, ciphertext_b64)) = stored.split_once(':') else {
            warn!("Stored provider key is not encrypted; returning it unchanged");
            return Ok(stored.to_string());
        };

        let nonce_bytes = STANDARD
            .decode(nonce_b64)
            .map_err(|e| DomainError::encryption(format!("Invalid nonce encoding: {}", e)))?;
        if nonce_bytes.len() != NONCE_LEN {
            return Err(DomainError::encryption(format!(
                "Invalid nonce length: {}",
                nonce_bytes.len()
            )));
        }

        let ciphertext = STANDARD
            .decode(ciphertext_b64)
            .map_err(|e| DomainError::encryption(format!("Invalid ciphertext encoding: {}", e)))?;

        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(&nonce_bytes), ciphertext.as_ref())
            .map_err(|_| DomainError::encryption("Failed to decrypt provider key"))?;

        String::from_utf8(plaintext)
            .map_err(|e| DomainError::encryption(format!("Decrypted key is not UTF-8: {}", e)))
    }
}

/// Redacts a secret for logs, keeping the first and last four characters
/// of long secrets
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();

    if chars.len() > 12 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}{}{}", head, "•".repeat(chars.len() - 8), tail)
    } else {
        "•".repeat(chars.len())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminKeyKind {
    Anthropic,
    OpenAi,
}

/// Organization-scoped admin keys, recognised by prefix and minimum length
pub fn admin_key_kind(secret: &str) -> Option<AdminKeyKind> {
    let secret = secret.trim();
    if secret.len() < ADMIN_KEY_MIN_LEN {
        return None;
    }

    if secret.starts_with("sk-ant-admin") {
        Some(AdminKeyKind::Anthropic)
    } else if secret.starts_with("sk-admin-") {
        Some(AdminKeyKind::OpenAi)
    } else {
        None
    }
}
