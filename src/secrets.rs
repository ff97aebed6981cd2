//! Cookie secret material: generation, base64 encoding, and the
//! signing/encryption codec handed to the HTTP layer.
//!
//! Values produced by [`CookieCodec::encode`] have the shape
//! `base64url(timestamp|payload|mac)`, where `payload` is the (optionally
//! AES-GCM encrypted) JSON value in base64url form and `mac` is an
//! HMAC-SHA256 over `name|timestamp|payload`.

use std::fmt;

use aes_gcm::{
    aead::{consts::U12, Aead, KeyInit},
    aes::Aes192,
    Aes128Gcm,
    Aes256Gcm,
    AesGcm,
    Nonce,
};
use base64::{
    engine::general_purpose::{STANDARD as BASE64, URL_SAFE as BASE64_URL},
    Engine as _,
};
use chrono::Utc;
use hmac::{Hmac, Mac};
use rand::RngCore;
use serde::{de::DeserializeOwned, Serialize};
use sha2::Sha256;
use thiserror::Error;
use tracing::warn;

type HmacSha256 = Hmac<Sha256>;
type Aes192Gcm = AesGcm<Aes192, U12>;

/// Length of freshly generated hash and encryption keys, in raw bytes.
pub const SECRET_KEY_LENGTH: usize = 32;

/// Cookies older than this are rejected by [`CookieCodec::decode`] (30 days).
pub const DEFAULT_COOKIE_MAX_AGE_SECONDS: i64 = 86400 * 30;

/// Tolerated clock drift for cookies stamped slightly in the future.
pub const COOKIE_TIMESTAMP_SKEW_SECONDS: i64 = 60;

const NONCE_SIZE: usize = 12;



#[derive(Debug, Error)]
pub enum CookieError {
    #[error("cookie encryption key must be 16, 24 or 32 bytes long, got {length}")]
    InvalidEncryptionKeyLength { length: usize },

    #[error("cookie hash key was rejected by the signer")]
    InvalidHashKey,

    #[error("failed to (de)serialize cookie payload")]
    Payload(#[from] serde_json::Error),

    #[error("cookie value is malformed")]
    Malformed,

    #[error("cookie signature does not match")]
    InvalidSignature,

    #[error("cookie value has expired")]
    Expired,

    #[error("cookie value is timestamped in the future")]
    FromFuture,

    #[error("failed to encrypt cookie value")]
    Encryption,

    #[error("failed to decrypt cookie value")]
    Decryption,
}


/// A freshly generated pair of raw cookie keys.
#[derive(Clone, PartialEq, Eq)]
pub struct CookieSecretBytes {
    /// Key used to sign (HMAC) cookie values.
    pub hash_key: [u8; SECRET_KEY_LENGTH],

    /// Key used to encrypt cookie values.
    pub encryption_key: [u8; SECRET_KEY_LENGTH],
}

impl fmt::Debug for CookieSecretBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CookieSecretBytes")
            .field("hash_key", &"<redacted>")
            .field("encryption_key", &"<redacted>")
            .finish()
    }
}

impl CookieSecretBytes {
    /// Base64-encoded hash key, as stored in the `cookie_hash` field.
    pub fn encoded_hash_key(&self) -> String {
        encode_secret(&self.hash_key)
    }

    /// Base64-encoded encryption key, as stored in the `cookie_encryption` field.
    pub fn encoded_encryption_key(&self) -> String {
        encode_secret(&self.encryption_key)
    }
}


/// Generates a new hash key and encryption key.
///
/// Both come from the thread-local CSPRNG, which is seeded from the
/// operating system.
pub fn generate_secrets() -> CookieSecretBytes {
    let mut rng = rand::rng();

    let mut hash_key = [0u8; SECRET_KEY_LENGTH];
    let mut encryption_key = [0u8; SECRET_KEY_LENGTH];
    rng.fill_bytes(&mut hash_key);
    rng.fill_bytes(&mut encryption_key);

    CookieSecretBytes {
        hash_key,
        encryption_key,
    }
}

/// Encodes raw key bytes with the standard (padded) base64 alphabet.
pub fn encode_secret(bytes: &[u8]) -> String {
    BASE64.encode(bytes)
}


/// Outcome of decoding a stored secret.
///
/// A malformed value is not an error: it degrades to an empty key, which
/// still yields a working (if weak) codec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedSecret {
    Decoded(Vec<u8>),
    Empty,
    Malformed,
}

impl DecodedSecret {
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            DecodedSecret::Decoded(bytes) => bytes,
            DecodedSecret::Empty | DecodedSecret::Malformed => Vec::new(),
        }
    }
}

/// Decodes a base64 secret, falling back to [`DecodedSecret::Malformed`]
/// instead of failing.
pub fn decode_secret_tolerant(encoded: &str) -> DecodedSecret {
    if encoded.is_empty() {
        return DecodedSecret::Empty;
    }

    match BASE64.decode(encoded) {
        Ok(bytes) if bytes.is_empty() => DecodedSecret::Empty,
        Ok(bytes) => DecodedSecret::Decoded(bytes),
        Err(error) => {
            warn!(%error, "Cookie secret is not valid base64, using an empty key instead.");
            DecodedSecret::Malformed
        }
    }
}



#[derive(Clone)]
enum CookieCipher {
    Aes128(Aes128Gcm),
    Aes192(Aes192Gcm),
    Aes256(Aes256Gcm),
}

impl CookieCipher {
    fn from_key(key: &[u8]) -> Result<Self, CookieError> {
        let invalid_length = || CookieError::InvalidEncryptionKeyLength { length: key.len() };

        match key.len() {
            16 => Aes128Gcm::new_from_slice(key)
                .map(CookieCipher::Aes128)
                .map_err(|_| invalid_length()),
            24 => Aes192Gcm::new_from_slice(key)
                .map(CookieCipher::Aes192)
                .map_err(|_| invalid_length()),
            32 => Aes256Gcm::new_from_slice(key)
                .map(CookieCipher::Aes256)
                .map_err(|_| invalid_length()),
            _ => Err(invalid_length()),
        }
    }

    /// Returns `nonce || ciphertext`.
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CookieError> {
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        rand::rng().fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = match self {
            CookieCipher::Aes128(cipher) => cipher.encrypt(nonce, plaintext),
            CookieCipher::Aes192(cipher) => cipher.encrypt(nonce, plaintext),
            CookieCipher::Aes256(cipher) => cipher.encrypt(nonce, plaintext),
        }
        .map_err(|_| CookieError::Encryption)?;

        let mut output = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        output.extend_from_slice(&nonce_bytes);
        output.extend_from_slice(&ciphertext);
        Ok(output)
    }

    fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>, CookieError> {
        if data.len() < NONCE_SIZE {
            return Err(CookieError::Decryption);
        }

        let (nonce_bytes, ciphertext) = data.split_at(NONCE_SIZE);
        let nonce = Nonce::from_slice(nonce_bytes);

        match self {
            CookieCipher::Aes128(cipher) => cipher.decrypt(nonce, ciphertext),
            CookieCipher::Aes192(cipher) => cipher.decrypt(nonce, ciphertext),
            CookieCipher::Aes256(cipher) => cipher.decrypt(nonce, ciphertext),
        }
        .map_err(|_| CookieError::Decryption)
    }
}


/// Signs (and optionally encrypts) session cookie values.
#[derive(Clone)]
pub struct CookieCodec {
    hash_key: Vec<u8>,
    cipher: Option<CookieCipher>,
    max_age_seconds: i64,
}

impl fmt::Debug for CookieCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CookieCodec")
            .field("hash_key_length", &self.hash_key.len())
            .field("encrypting", &self.is_encrypting())
            .field("max_age_seconds", &self.max_age_seconds)
            .finish()
    }
}

impl CookieCodec {
    /// Builds a codec from decoded key bytes.
    ///
    /// An empty `hash_key` is accepted. HMAC zero-pads keys up to its block
    /// size, so it signs exactly like an all-zero key. A missing or empty
    /// `encryption_key` puts the codec in signing-only mode. Encryption keys
    /// of 16, 24 or 32 bytes select AES-128, AES-192 or AES-256.
    pub fn new(hash_key: &[u8], encryption_key: Option<&[u8]>) -> Result<Self, CookieError> {
        let cipher = match encryption_key {
            Some(key) if !key.is_empty() => Some(CookieCipher::from_key(key)?),
            _ => None,
        };

        Ok(Self {
            hash_key: hash_key.to_vec(),
            cipher,
            max_age_seconds: DEFAULT_COOKIE_MAX_AGE_SECONDS,
        })
    }

    /// Overrides the maximum accepted cookie age. Zero disables the check.
    pub fn with_max_age(mut self, max_age_seconds: i64) -> Self {
        self.max_age_seconds = max_age_seconds;
        self
    }

    pub fn is_encrypting(&self) -> bool {
        self.cipher.is_some()
    }

    pub fn has_empty_hash_key(&self) -> bool {
        self.hash_key.is_empty()
    }

    /// Serializes `value` to JSON, then encrypts (if configured) and signs it
    /// under the cookie `name`.
    pub fn encode<T: Serialize>(&self, name: &str, value: &T) -> Result<String, CookieError> {
        self.encode_at(name, value, Utc::now().timestamp())
    }

    pub(crate) fn encode_at<T: Serialize>(
        &self,
        name: &str,
        value: &T,
        timestamp: i64,
    ) -> Result<String, CookieError> {
        let mut payload = serde_json::to_vec(value)?;
        if let Some(cipher) = &self.cipher {
            payload = cipher.encrypt(&payload)?;
        }
        let payload = BASE64_URL.encode(payload);

        let signature = self.signer(name, timestamp, &payload)?.finalize().into_bytes();

        let mut assembled = format!("{timestamp}|{payload}|").into_bytes();
        assembled.extend_from_slice(&signature);

        Ok(BASE64_URL.encode(assembled))
    }

    /// Verifies, decrypts and deserializes a value produced by [`Self::encode`]
    /// under the same cookie `name`.
    pub fn decode<T: DeserializeOwned>(&self, name: &str, encoded: &str) -> Result<T, CookieError> {
        let raw = BASE64_URL
            .decode(encoded)
            .map_err(|_| CookieError::Malformed)?;

        let mut parts = raw.splitn(3, |byte| *byte == b'|');
        let (Some(timestamp), Some(payload), Some(signature)) =
            (parts.next(), parts.next(), parts.next())
        else {
            return Err(CookieError::Malformed);
        };

        let timestamp = std::str::from_utf8(timestamp)
            .ok()
            .and_then(|text| text.parse::<i64>().ok())
            .ok_or(CookieError::Malformed)?;
        let payload = std::str::from_utf8(payload).map_err(|_| CookieError::Malformed)?;

        self.signer(name, timestamp, payload)?
            .verify_slice(signature)
            .map_err(|_| CookieError::InvalidSignature)?;

        let now = Utc::now().timestamp();
        if timestamp > now + COOKIE_TIMESTAMP_SKEW_SECONDS {
            return Err(CookieError::FromFuture);
        }
        if self.max_age_seconds > 0 && timestamp < now - self.max_age_seconds {
            return Err(CookieError::Expired);
        }

        let mut plaintext = BASE64_URL
            .decode(payload)
            .map_err(|_| CookieError::Malformed)?;
        if let Some(cipher) = &self.cipher {
            plaintext = cipher.decrypt(&plaintext)?;
        }

        Ok(serde_json::from_slice(&plaintext)?)
    }

    fn signer(&self, name: &str, timestamp: i64, payload: &str) -> Result<HmacSha256, CookieError> {
        let mut mac = <HmacSha256 as Mac>::new_from_slice(&self.hash_key)
            .map_err(|_| CookieError::InvalidHashKey)?;
        mac.update(format!("{name}|{timestamp}|{payload}").as_bytes());
        Ok(mac)
    }
}



#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_secrets_are_distinct_and_nonzero() {
        let first = generate_secrets();
        let second = generate_secrets();

        assert_ne!(first.hash_key, first.encryption_key);
        assert_ne!(first, second);
        assert_ne!(first.hash_key, [0u8; SECRET_KEY_LENGTH]);
        assert_ne!(first.encryption_key, [0u8; SECRET_KEY_LENGTH]);
    }

    #[test]
    fn encoded_secret_decodes_to_original_bytes() {
        let secrets = generate_secrets();

        let decoded = decode_secret_tolerant(&secrets.encoded_hash_key());
        assert_eq!(decoded, DecodedSecret::Decoded(secrets.hash_key.to_vec()));

        let decoded = decode_secret_tolerant(&secrets.encoded_encryption_key()).into_bytes();
        assert_eq!(decoded.len(), SECRET_KEY_LENGTH);
        assert_eq!(decoded, secrets.encryption_key.to_vec());
    }

    #[test]
    fn malformed_secret_degrades_to_empty_key() {
        let decoded = decode_secret_tolerant("not*base64!");
        assert_eq!(decoded, DecodedSecret::Malformed);
        assert!(decoded.into_bytes().is_empty());

        assert_eq!(decode_secret_tolerant(""), DecodedSecret::Empty);
    }

    #[test]
    fn signing_only_codec_round_trips() {
        let secrets = generate_secrets();
        let codec = CookieCodec::new(&secrets.hash_key, None).unwrap();
        assert!(!codec.is_encrypting());

        let encoded = codec.encode("semaphore", &("user", 42)).unwrap();
        let decoded: (String, i32) = codec.decode("semaphore", &encoded).unwrap();
        assert_eq!(decoded, ("user".to_string(), 42));
    }

    #[test]
    fn encrypting_codec_round_trips_and_hides_payload() {
        let secrets = generate_secrets();
        let codec = CookieCodec::new(&secrets.hash_key, Some(secrets.encryption_key.as_slice())).unwrap();
        assert!(codec.is_encrypting());

        let encoded = codec.encode("semaphore", &"top-secret-session").unwrap();
        let raw = String::from_utf8_lossy(&BASE64_URL.decode(&encoded).unwrap()).into_owned();
        assert!(!raw.contains("top-secret-session"));

        let decoded: String = codec.decode("semaphore", &encoded).unwrap();
        assert_eq!(decoded, "top-secret-session");
    }

    #[test]
    fn empty_hash_key_signs_like_all_zero_key() {
        let empty = CookieCodec::new(&[], None).unwrap();
        assert!(empty.has_empty_hash_key());
        let zeroed = CookieCodec::new(&[0u8; SECRET_KEY_LENGTH], None).unwrap();

        let encoded = empty.encode("semaphore", &7u32).unwrap();
        let decoded: u32 = zeroed.decode("semaphore", &encoded).unwrap();
        assert_eq!(decoded, 7);
    }

    #[test]
    fn rejects_values_signed_for_another_name_or_key() {
        let secrets = generate_secrets();
        let codec = CookieCodec::new(&secrets.hash_key, None).unwrap();
        let encoded = codec.encode("semaphore", &1u8).unwrap();

        assert!(matches!(
            codec.decode::<u8>("other", &encoded),
            Err(CookieError::InvalidSignature)
        ));

        let other = CookieCodec::new(&generate_secrets().hash_key, None).unwrap();
        assert!(matches!(
            other.decode::<u8>("semaphore", &encoded),
            Err(CookieError::InvalidSignature)
        ));

        assert!(matches!(
            codec.decode::<u8>("semaphore", "%%%"),
            Err(CookieError::Malformed)
        ));
    }

    #[test]
    fn rejects_expired_values() {
        let codec = CookieCodec::new(b"key", None).unwrap().with_max_age(60);
        let stale = Utc::now().timestamp() - 3600;
        let encoded = codec.encode_at("semaphore", &1u8, stale).unwrap();

        assert!(matches!(
            codec.decode::<u8>("semaphore", &encoded),
            Err(CookieError::Expired)
        ));

        let lenient = codec.with_max_age(0);
        assert_eq!(lenient.decode::<u8>("semaphore", &encoded).unwrap(), 1);
    }

    #[test]
    fn rejects_values_timestamped_in_the_future() {
        let codec = CookieCodec::new(b"key", None).unwrap().with_max_age(0);
        let ten_years = 10 * 365 * 86400;
        let encoded = codec
            .encode_at("semaphore", &1u8, Utc::now().timestamp() + ten_years)
            .unwrap();

        assert!(matches!(
            codec.decode::<u8>("semaphore", &encoded),
            Err(CookieError::FromFuture)
        ));

        let slightly_ahead = codec
            .encode_at("semaphore", &2u8, Utc::now().timestamp() + 5)
            .unwrap();
        assert_eq!(codec.decode::<u8>("semaphore", &slightly_ahead).unwrap(), 2);
    }

    #[test]
    fn aes192_key_round_trips() {
        let codec = CookieCodec::new(b"hash", Some(&[7u8; 24][..])).unwrap();
        assert!(codec.is_encrypting());

        let encoded = codec.encode("semaphore", &"session").unwrap();
        let decoded: String = codec.decode("semaphore", &encoded).unwrap();
        assert_eq!(decoded, "session");
    }

    #[test]
    fn rejects_unsupported_encryption_key_length() {
        assert!(matches!(
            CookieCodec::new(b"hash", Some(&[1u8; 7][..])),
            Err(CookieError::InvalidEncryptionKeyLength { length: 7 })
        ));
        assert!(matches!(
            CookieCodec::new(b"hash", Some(&[1u8; 20][..])),
            Err(CookieError::InvalidEncryptionKeyLength { length: 20 })
        ));
        assert!(CookieCodec::new(b"hash", Some(&[1u8; 16][..])).unwrap().is_encrypting());
        assert!(!CookieCodec::new(b"hash", Some(&[][..])).unwrap().is_encrypting());
    }
}
