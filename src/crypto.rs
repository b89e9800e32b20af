//! Symmetric codec for the contact payload.
//!
//! The list of contact identifiers is serialized to canonical JSON, then
//! encrypted with AES-256-GCM under one process-wide key supplied at start.
//!
//! Wire format (before base64): MAGIC (4 bytes) || nonce (12 bytes) || ciphertext
//!
//! The process starts without a key; in that state `encrypt` fails with
//! `EncryptionUnavailable` and the caller substitutes [`PLACEHOLDER`] so the
//! persisted record is obviously unusable rather than silently insecure.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::error::{AppError, Result};

/// Nonce size for AES-GCM (96 bits)
const NONCE_SIZE: usize = 12;

/// Key size (256 bits for AES-256)
const KEY_SIZE: usize = 32;

/// Magic bytes to identify encrypted payloads
const ENCRYPTED_MAGIC: &[u8] = b"RSG1";

/// Marker persisted in place of ciphertext when no key is configured.
pub const PLACEHOLDER: &str = "ENCRYPTION_UNAVAILABLE";

/// Holds the optional process-wide encryption key.
///
/// Cheaply cloneable; one instance lives in the application state for the
/// process lifetime. No rotation, no per-record keys.
#[derive(Clone)]
pub struct ContactCodec {
    key: Option<[u8; KEY_SIZE]>,
}

impl ContactCodec {
    /// Create a codec from a base64-encoded key. The decoded key must be
    /// exactly 32 bytes.
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let decoded = BASE64
            .decode(encoded.trim())
            .map_err(|e| AppError::Internal(format!("Invalid encryption key encoding: {}", e)))?;

        if decoded.len() != KEY_SIZE {
            return Err(AppError::Internal(format!(
                "Encryption key must be {} bytes, got {}",
                KEY_SIZE,
                decoded.len()
            )));
        }

        let mut key = [0u8; KEY_SIZE];
        key.copy_from_slice(&decoded);
        Ok(Self { key: Some(key) })
    }

    /// Codec without a key. Encryption and decryption both fail; the system
    /// still serves requests in this degraded mode.
    pub fn unconfigured() -> Self {
        Self { key: None }
    }

    /// Create a codec from raw bytes. Prefer `from_base64` outside tests.
    pub fn from_bytes(key: [u8; KEY_SIZE]) -> Self {
        Self { key: Some(key) }
    }

    /// Generate a new random key (for initial setup).
    /// Returns the key as a base64-encoded string.
    pub fn generate() -> String {
        use rand::rngs::OsRng;
        use rand::RngCore;
        let mut key = [0u8; KEY_SIZE];
        OsRng.fill_bytes(&mut key);
        BASE64.encode(key)
    }

    pub fn has_key(&self) -> bool {
        self.key.is_some()
    }

    /// Encrypt the contact list.
    /// Returns base64 of: MAGIC (4 bytes) || nonce (12 bytes) || ciphertext
    pub fn encrypt(&self, contacts: &[String]) -> Result<String> {
        use rand::rngs::OsRng;
        use rand::RngCore;

        let key = self.key.ok_or(AppError::EncryptionUnavailable)?;

        let plaintext = serde_json::to_vec(contacts)?;

        let cipher = Aes256Gcm::new_from_slice(&key)
            .map_err(|e| AppError::Internal(format!("Failed to create cipher: {}", e)))?;

        let mut nonce_bytes = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plaintext.as_slice())
            .map_err(|e| AppError::Internal(format!("Encryption failed: {}", e)))?;

        let mut framed = Vec::with_capacity(ENCRYPTED_MAGIC.len() + NONCE_SIZE + ciphertext.len());
        framed.extend_from_slice(ENCRYPTED_MAGIC);
        framed.extend_from_slice(&nonce_bytes);
        framed.extend_from_slice(&ciphertext);

        Ok(BASE64.encode(framed))
    }

    /// Decrypt a previously encrypted contact payload.
    ///
    /// Every failure mode (malformed input, missing magic, tampered or
    /// wrong-key ciphertext, unconfigured key) is reported as `Decode`,
    /// never a panic.
    pub fn decrypt(&self, encoded: &str) -> Result<Vec<String>> {
        let key = self
            .key
            .ok_or_else(|| AppError::Decode("No encryption key configured".into()))?;

        let framed = BASE64
            .decode(encoded.trim())
            .map_err(|e| AppError::Decode(format!("Invalid base64: {}", e)))?;

        if framed.len() < ENCRYPTED_MAGIC.len() + NONCE_SIZE + 1 {
            return Err(AppError::Decode("Ciphertext too short".into()));
        }

        if &framed[..ENCRYPTED_MAGIC.len()] != ENCRYPTED_MAGIC {
            return Err(AppError::Decode(
                "Invalid payload format (missing magic bytes)".into(),
            ));
        }

        let cipher = Aes256Gcm::new_from_slice(&key)
            .map_err(|e| AppError::Internal(format!("Failed to create cipher: {}", e)))?;

        let nonce_start = ENCRYPTED_MAGIC.len();
        let nonce_end = nonce_start + NONCE_SIZE;
        let nonce = Nonce::from_slice(&framed[nonce_start..nonce_end]);
        let ciphertext = &framed[nonce_end..];

        let plaintext = cipher
            .decrypt(nonce, ciphertext)
            .map_err(|_| AppError::Decode("Decryption failed (tampered or wrong key)".into()))?;

        serde_json::from_slice(&plaintext)
            .map_err(|e| AppError::Decode(format!("Invalid plaintext encoding: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_codec() -> ContactCodec {
        ContactCodec::from_bytes([7u8; 32])
    }

    #[test]
    fn test_round_trip() {
        let codec = test_codec();
        let contacts = vec!["a@x.com".to_string(), "b@x.com".to_string()];

        let encrypted = codec.encrypt(&contacts).expect("encrypt should succeed");
        assert_ne!(encrypted, PLACEHOLDER);

        let decrypted = codec.decrypt(&encrypted).expect("decrypt should succeed");
        assert_eq!(decrypted, contacts);
    }

    #[test]
    fn test_round_trip_single_contact() {
        let codec = test_codec();
        let contacts = vec!["solo@x.com".to_string()];
        let encrypted = codec.encrypt(&contacts).unwrap();
        assert_eq!(codec.decrypt(&encrypted).unwrap(), contacts);
    }

    #[test]
    fn test_encrypt_without_key_fails() {
        let codec = ContactCodec::unconfigured();
        let result = codec.encrypt(&["a@x.com".to_string()]);
        assert!(matches!(result, Err(AppError::EncryptionUnavailable)));
    }

    #[test]
    fn test_decrypt_without_key_is_decode_error() {
        let with_key = test_codec();
        let encrypted = with_key.encrypt(&["a@x.com".to_string()]).unwrap();

        let without_key = ContactCodec::unconfigured();
        assert!(matches!(
            without_key.decrypt(&encrypted),
            Err(AppError::Decode(_))
        ));
    }

    #[test]
    fn test_decrypt_wrong_key_is_decode_error() {
        let codec = test_codec();
        let encrypted = codec.encrypt(&["a@x.com".to_string()]).unwrap();

        let other = ContactCodec::from_bytes([9u8; 32]);
        assert!(matches!(other.decrypt(&encrypted), Err(AppError::Decode(_))));
    }

    #[test]
    fn test_decrypt_tampered_ciphertext_is_decode_error() {
        let codec = test_codec();
        let encrypted = codec.encrypt(&["a@x.com".to_string()]).unwrap();

        let mut framed = BASE64.decode(&encrypted).unwrap();
        let last = framed.len() - 1;
        framed[last] ^= 0xFF;
        let tampered = BASE64.encode(framed);

        assert!(matches!(codec.decrypt(&tampered), Err(AppError::Decode(_))));
    }

    #[test]
    fn test_decrypt_garbage_is_decode_error() {
        let codec = test_codec();
        assert!(matches!(codec.decrypt("not base64 !!!"), Err(AppError::Decode(_))));
        assert!(matches!(codec.decrypt(""), Err(AppError::Decode(_))));
        assert!(matches!(
            codec.decrypt(&BASE64.encode(b"XXXXshort")),
            Err(AppError::Decode(_))
        ));
    }

    #[test]
    fn test_generated_key_is_usable() {
        let encoded = ContactCodec::generate();
        let codec = ContactCodec::from_base64(&encoded).expect("generated key should parse");
        let contacts = vec!["c@x.com".to_string()];
        assert_eq!(codec.decrypt(&codec.encrypt(&contacts).unwrap()).unwrap(), contacts);
    }

    #[test]
    fn test_from_base64_rejects_wrong_length() {
        let short = BASE64.encode([0u8; 16]);
        assert!(ContactCodec::from_base64(&short).is_err());
    }
}
