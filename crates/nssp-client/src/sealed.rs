//! In-memory encryption of the API token.
//!
//! A [`SealedToken`] owns a per-instance AES-256-GCM key and the token
//! encrypted under it. There is no accessor for the plaintext; the crate
//! opens the token only for the duration of a closure while building the
//! `Authorization` header.
//!
//! Keys come from the thread-local CSPRNG, every seal uses a fresh nonce, and
//! the key is wiped on drop via `zeroize`.

use std::fmt;

use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, KeyInit},
};
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use rand::RngCore;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::ClientError;

const KEY_LEN: usize = 32;
const NONCE_LEN: usize = 12;
const FORMAT_VERSION: u8 = 1;

/// Per-instance symmetric key.
#[derive(Zeroize, ZeroizeOnDrop)]
struct TokenKey([u8; KEY_LEN]);

impl TokenKey {
    fn generate() -> Self {
        let mut key = [0u8; KEY_LEN];
        rand::thread_rng().fill_bytes(&mut key);
        Self(key)
    }

    fn cipher(&self) -> Result<Aes256Gcm, ClientError> {
        Aes256Gcm::new_from_slice(&self.0)
            .map_err(|e| ClientError::Encryption(format!("Failed to create cipher: {e}")))
    }
}

// Written in clear only by the snapshot path.
impl Serialize for TokenKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let encoded = Zeroizing::new(BASE64.encode(self.0));
        serializer.serialize_str(&encoded)
    }
}

impl<'de> Deserialize<'de> for TokenKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let encoded = Zeroizing::new(String::deserialize(deserializer)?);
        let bytes = Zeroizing::new(
            BASE64
                .decode(encoded.as_bytes())
                .map_err(serde::de::Error::custom)?,
        );
        let key: [u8; KEY_LEN] = bytes.as_slice().try_into().map_err(|_| {
            serde::de::Error::custom(format!(
                "key must be {KEY_LEN} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(key))
    }
}

/// Ciphertext of the token plus what is needed to open it, except the key.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
struct EncryptedData {
    /// Format version (currently 1)
    version: u8,
    /// 12-byte GCM nonce
    #[serde(with = "base64_array")]
    nonce: [u8; NONCE_LEN],
    /// Ciphertext with the 16-byte GCM tag appended
    #[serde(with = "base64_bytes")]
    ciphertext: Vec<u8>,
}

/// An API token encrypted under a key only this value holds.
///
/// Constructing one is the only way to put a token in; the plaintext is
/// never returned. `Debug` output is redacted.
///
/// Serialization writes the key next to the ciphertext. A serialized
/// `SealedToken` therefore contains no plaintext, but anyone able to read it
/// can recover the token. The type is crate-private and only the snapshot
/// path serializes it.
#[derive(Serialize, Deserialize)]
pub(crate) struct SealedToken {
    key: TokenKey,
    token: EncryptedData,
}

impl SealedToken {
    /// Encrypts `token` under a freshly generated key.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Encryption`] if the cipher cannot be created or
    /// encryption fails.
    pub(crate) fn seal(token: &str) -> Result<Self, ClientError> {
        let key = TokenKey::generate();
        let cipher = key.cipher()?;

        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, token.as_bytes())
            .map_err(|e| ClientError::Encryption(format!("Encryption failed: {e}")))?;

        Ok(Self {
            key,
            token: EncryptedData {
                version: FORMAT_VERSION,
                nonce: nonce_bytes,
                ciphertext,
            },
        })
    }

    /// Opens the token and passes it to `f`.
    ///
    /// The decrypted buffer is wiped as soon as `f` returns. `f` must not
    /// keep or log the value it receives.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Decryption`] if the ciphertext fails
    /// authentication or does not decrypt to UTF-8.
    pub(crate) fn with_exposed<R>(&self, f: impl FnOnce(&str) -> R) -> Result<R, ClientError> {
        if self.token.version != FORMAT_VERSION {
            return Err(ClientError::Decryption(format!(
                "unsupported version: {}",
                self.token.version
            )));
        }

        let cipher = self
            .key
            .cipher()
            .map_err(|e| ClientError::Decryption(e.to_string()))?;
        let nonce = Nonce::from_slice(&self.token.nonce);

        let plaintext = Zeroizing::new(
            cipher
                .decrypt(nonce, self.token.ciphertext.as_ref())
                .map_err(|_| {
                    ClientError::Decryption("ciphertext failed authentication".to_string())
                })?,
        );
        let token = std::str::from_utf8(&plaintext)
            .map_err(|e| ClientError::Decryption(format!("token is not valid UTF-8: {e}")))?;

        Ok(f(token))
    }
}

impl fmt::Debug for SealedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SealedToken")
            .field("key", &"[REDACTED]")
            .field("token", &"[REDACTED]")
            .finish()
    }
}

mod base64_bytes {
    use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&BASE64.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        BASE64.decode(encoded).map_err(serde::de::Error::custom)
    }
}

mod base64_array {
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer, const N: usize>(
        bytes: &[u8; N],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        super::base64_bytes::serialize(bytes, serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>, const N: usize>(
        deserializer: D,
    ) -> Result<[u8; N], D::Error> {
        let bytes = super::base64_bytes::deserialize(deserializer)?;
        let len = bytes.len();
        bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom(format!("expected {N} bytes, got {len}")))
    }
}


#[cfg(test)]
mod proptests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::expect_used)]

    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn reveal_returns_sealed_token(token in ".*") {
            let sealed = SealedToken::seal(&token).unwrap();
            let revealed = sealed.with_exposed(str::to_string).unwrap();
            prop_assert_eq!(revealed, token);
        }

        #[test]
        fn serialized_and_debug_forms_hide_token(token in "[A-Za-z0-9]{12,64}") {
            let sealed = SealedToken::seal(&token).unwrap();

            let json = serde_json::to_string(&sealed).unwrap();
            prop_assert!(!json.contains(&token));

            let debug = format!("{sealed:?}");
            prop_assert!(!debug.contains(&token));
        }
    }
}
