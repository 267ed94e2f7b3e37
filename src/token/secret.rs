//! Secret key material.
//!
//! A [`Secret`] is owned by exactly one factory. It is wiped from memory
//! when dropped, compares in constant time, and never prints its bytes.

use crate::TokenError;
use rand::RngCore;
use std::fmt;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Default length of generated secrets, in bytes.
pub const DEFAULT_SECRET_LENGTH: usize = 32;

/// Opaque HMAC key bytes.
///
/// # Example
///
/// ```rust
/// use hash_token::Secret;
///
/// let generated = Secret::generate(32);
/// assert_eq!(generated.len(), 32);
///
/// let decoded = Secret::from_hex("736563726574")?;
/// assert_eq!(decoded, Secret::from(b"secret"));
/// assert_eq!(format!("{decoded:?}"), "Secret([REDACTED; 6 bytes])");
/// # Ok::<(), hash_token::TokenError>(())
/// ```
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Secret {
    bytes: Vec<u8>,
}

impl Secret {
    /// Generates `len` random bytes from the thread-local CSPRNG.
    pub fn generate(len: usize) -> Self {
        Self {
            bytes: generate_secret_bytes(len),
        }
    }

    /// Decodes a hexadecimal secret.
    pub fn from_hex(encoded: &str) -> Result<Self, TokenError> {
        hex::decode(encoded.trim())
            .map(|bytes| Self { bytes })
            .map_err(|e| TokenError::CryptoError(format!("Invalid hex secret: {e}")))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret([REDACTED; {} bytes])", self.bytes.len())
    }
}

impl PartialEq for Secret {
    fn eq(&self, other: &Self) -> bool {
        self.bytes.ct_eq(&other.bytes).into()
    }
}

impl Eq for Secret {}

impl From<Vec<u8>> for Secret {
    fn from(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }
}

impl From<&[u8]> for Secret {
    fn from(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.to_vec(),
        }
    }
}

impl<const N: usize> From<&[u8; N]> for Secret {
    fn from(bytes: &[u8; N]) -> Self {
        Self {
            bytes: bytes.to_vec(),
        }
    }
}

impl From<&str> for Secret {
    fn from(text: &str) -> Self {
        Self {
            bytes: text.as_bytes().to_vec(),
        }
    }
}

/// Returns `len` random bytes from the thread-local CSPRNG.
pub fn generate_secret_bytes(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes
}

/// Returns `len` random bytes rendered as `2 * len` lowercase hex characters.
pub fn generate_secret_hex(len: usize) -> String {
    let mut bytes = generate_secret_bytes(len);
    let encoded = hex::encode(&bytes);
    bytes.zeroize();
    encoded
}
