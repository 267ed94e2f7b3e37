//! Digest algorithm registry.
//!
//! Every factory resolves its hash primitive here, by name, when it is
//! built. The set of names is closed at compile time: the SHA-2 family is
//! always present and the remaining families are enabled through cargo
//! features (`algo-md5`, `algo-sha1`, `algo-sha3`, `algo-blake2`).

use crate::TokenError;
use hmac::{Hmac, Mac, SimpleHmac};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A hash primitive usable as the core of an HMAC.
///
/// The names match the conventional lowercase identifiers (`"sha256"`,
/// `"sha3_256"`, `"blake2b"`...), so configurations written for other
/// deployments resolve to the same primitive.
///
/// # Example
///
/// ```rust
/// use hash_token::Algorithm;
///
/// let algorithm = Algorithm::resolve("sha256")?;
/// assert_eq!(algorithm, Algorithm::Sha256);
/// assert_eq!(algorithm.digest_size(), 32);
/// assert!(Algorithm::resolve("shake_128").is_err());
/// # Ok::<(), hash_token::TokenError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Algorithm {
    #[cfg(feature = "algo-md5")]
    Md5,
    #[cfg(feature = "algo-sha1")]
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
    #[cfg(feature = "algo-sha3")]
    Sha3_224,
    #[cfg(feature = "algo-sha3")]
    Sha3_256,
    #[cfg(feature = "algo-sha3")]
    Sha3_384,
    #[cfg(feature = "algo-sha3")]
    Sha3_512,
    #[cfg(feature = "algo-blake2")]
    Blake2b,
    #[cfg(feature = "algo-blake2")]
    Blake2s,
}

impl Algorithm {
    /// Looks up an algorithm by name.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::UnknownAlgorithm`] when `name` is not in the
    /// compiled-in set.
    pub fn resolve(name: &str) -> Result<Self, TokenError> {
        Self::all()
            .iter()
            .copied()
            .find(|algorithm| algorithm.name() == name)
            .ok_or_else(|| TokenError::UnknownAlgorithm(name.to_string()))
    }

    /// Returns every algorithm compiled into this build.
    pub fn all() -> &'static [Algorithm] {
        &[
            #[cfg(feature = "algo-md5")]
            Self::Md5,
            #[cfg(feature = "algo-sha1")]
            Self::Sha1,
            Self::Sha224,
            Self::Sha256,
            Self::Sha384,
            Self::Sha512,
            #[cfg(feature = "algo-sha3")]
            Self::Sha3_224,
            #[cfg(feature = "algo-sha3")]
            Self::Sha3_256,
            #[cfg(feature = "algo-sha3")]
            Self::Sha3_384,
            #[cfg(feature = "algo-sha3")]
            Self::Sha3_512,
            #[cfg(feature = "algo-blake2")]
            Self::Blake2b,
            #[cfg(feature = "algo-blake2")]
            Self::Blake2s,
        ]
    }

    /// The canonical lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            #[cfg(feature = "algo-md5")]
            Self::Md5 => "md5",
            #[cfg(feature = "algo-sha1")]
            Self::Sha1 => "sha1",
            Self::Sha224 => "sha224",
            Self::Sha256 => "sha256",
            Self::Sha384 => "sha384",
            Self::Sha512 => "sha512",
            #[cfg(feature = "algo-sha3")]
            Self::Sha3_224 => "sha3_224",
            #[cfg(feature = "algo-sha3")]
            Self::Sha3_256 => "sha3_256",
            #[cfg(feature = "algo-sha3")]
            Self::Sha3_384 => "sha3_384",
            #[cfg(feature = "algo-sha3")]
            Self::Sha3_512 => "sha3_512",
            #[cfg(feature = "algo-blake2")]
            Self::Blake2b => "blake2b",
            #[cfg(feature = "algo-blake2")]
            Self::Blake2s => "blake2s",
        }
    }

    /// Output size of the digest, in bytes.
    pub fn digest_size(self) -> usize {
        match self {
            #[cfg(feature = "algo-md5")]
            Self::Md5 => 16,
            #[cfg(feature = "algo-sha1")]
            Self::Sha1 => 20,
            Self::Sha224 => 28,
            Self::Sha256 => 32,
            Self::Sha384 => 48,
            Self::Sha512 => 64,
            #[cfg(feature = "algo-sha3")]
            Self::Sha3_224 => 28,
            #[cfg(feature = "algo-sha3")]
            Self::Sha3_256 => 32,
            #[cfg(feature = "algo-sha3")]
            Self::Sha3_384 => 48,
            #[cfg(feature = "algo-sha3")]
            Self::Sha3_512 => 64,
            #[cfg(feature = "algo-blake2")]
            Self::Blake2b => 64,
            #[cfg(feature = "algo-blake2")]
            Self::Blake2s => 32,
        }
    }

    /// Whether the primitive is only kept for compatibility with existing tokens.
    pub fn is_legacy(self) -> bool {
        match self {
            #[cfg(feature = "algo-md5")]
            Self::Md5 => true,
            #[cfg(feature = "algo-sha1")]
            Self::Sha1 => true,
            _ => false,
        }
    }

    /// Computes `HMAC(key, parts[0] || parts[1] || ...)` with this primitive.
    ///
    /// Feeding the message in parts is equivalent to feeding the
    /// concatenation; callers use it to append a date or counter to a
    /// payload without allocating.
    pub fn hmac(self, key: &[u8], parts: &[&[u8]]) -> Result<Vec<u8>, TokenError> {
        match self {
            #[cfg(feature = "algo-md5")]
            Self::Md5 => compute::<Hmac<md5::Md5>>(key, parts),
            #[cfg(feature = "algo-sha1")]
            Self::Sha1 => compute::<Hmac<sha1::Sha1>>(key, parts),
            Self::Sha224 => compute::<Hmac<sha2::Sha224>>(key, parts),
            Self::Sha256 => compute::<Hmac<sha2::Sha256>>(key, parts),
            Self::Sha384 => compute::<Hmac<sha2::Sha384>>(key, parts),
            Self::Sha512 => compute::<Hmac<sha2::Sha512>>(key, parts),
            #[cfg(feature = "algo-sha3")]
            Self::Sha3_224 => compute::<Hmac<sha3::Sha3_224>>(key, parts),
            #[cfg(feature = "algo-sha3")]
            Self::Sha3_256 => compute::<Hmac<sha3::Sha3_256>>(key, parts),
            #[cfg(feature = "algo-sha3")]
            Self::Sha3_384 => compute::<Hmac<sha3::Sha3_384>>(key, parts),
            #[cfg(feature = "algo-sha3")]
            Self::Sha3_512 => compute::<Hmac<sha3::Sha3_512>>(key, parts),
            // BLAKE2 cores buffer lazily, which the block-level HMAC does not support.
            #[cfg(feature = "algo-blake2")]
            Self::Blake2b => compute::<SimpleHmac<blake2::Blake2b512>>(key, parts),
            #[cfg(feature = "algo-blake2")]
            Self::Blake2s => compute::<SimpleHmac<blake2::Blake2s256>>(key, parts),
        }
    }

    /// Same as [`hmac`](Self::hmac), rendered as lowercase hexadecimal.
    pub fn hmac_hex(self, key: &[u8], parts: &[&[u8]]) -> Result<String, TokenError> {
        self.hmac(key, parts).map(hex::encode)
    }
}

fn compute<M: Mac + hmac::digest::KeyInit>(
    key: &[u8],
    parts: &[&[u8]],
) -> Result<Vec<u8>, TokenError> {
    let mut mac = <M as Mac>::new_from_slice(key)
        .map_err(|e| TokenError::CryptoError(format!("Invalid HMAC key: {e}")))?;
    for part in parts {
        mac.update(part);
    }
    Ok(mac.finalize().into_bytes().to_vec())
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl AsRef<str> for Algorithm {
    fn as_ref(&self) -> &str {
        self.name()
    }
}

impl FromStr for Algorithm {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::resolve(s)
    }
}

impl TryFrom<&str> for Algorithm {
    type Error = TokenError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::resolve(value)
    }
}

impl TryFrom<String> for Algorithm {
    type Error = TokenError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::resolve(&value)
    }
}

impl From<Algorithm> for String {
    fn from(algorithm: Algorithm) -> Self {
        algorithm.name().to_string()
    }
}
