use thiserror::Error;

/// Error types that can occur while issuing or checking tokens.
///
/// Verification itself reports an ordinary mismatch as `Ok(false)`; the
/// variants here cover construction and configuration mistakes, clock
/// failures, and the caller-facing outcomes produced by
/// [`TokenFactory::check`](crate::TokenFactory::check).
///
/// # Error Categories
///
/// - **Construction Errors**: `UnknownAlgorithm`, `InvalidConfiguration`
/// - **Token Outcomes**: `InvalidToken`, `ExpiredToken`
/// - **System Errors**: `CryptoError`
///
/// # Example
///
/// ```rust
/// use hash_token::{TokenError, TokenFactory, WindowTokenFactory};
///
/// # fn example() -> Result<(), TokenError> {
/// let factory = WindowTokenFactory::new("sha256", b"secret")?;
/// let token = factory.generate("user@example.org")?;
///
/// match factory.check("user@example.org", &token) {
///     Ok(()) => println!("Token accepted"),
///     Err(TokenError::ExpiredToken(_)) => println!("Token too old"),
///     Err(TokenError::InvalidToken(_)) => println!("Token rejected"),
///     Err(e) => println!("Other error: {e}"),
/// }
///
/// assert!(matches!(
///     WindowTokenFactory::new("whirlpool", b"secret"),
///     Err(TokenError::UnknownAlgorithm(_))
/// ));
/// # Ok(())
/// # }
/// ```
#[derive(Error, Debug)]
pub enum TokenError {
    /// The requested digest algorithm is not part of the supported set.
    ///
    /// Raised when a factory is built, never when it is used. The name may
    /// be misspelled, belong to an extendable-output function such as
    /// `shake_128`, or belong to a digest family whose cargo feature is
    /// disabled.
    #[error("Unknown algorithm: {0}")]
    UnknownAlgorithm(String),

    /// The presented token does not match any acceptable value.
    #[error("Token '{0}' could not be parsed.")]
    InvalidToken(String),

    /// The presented token was valid once but its window has closed.
    ///
    /// Only reported when the token matches the period immediately
    /// preceding the acceptance window; older tokens are indistinguishable
    /// from forgeries and surface as `InvalidToken`.
    #[error("Token '{0}' is expired.")]
    ExpiredToken(String),

    /// A factory or configuration parameter is out of range.
    ///
    /// # When This Occurs
    ///
    /// - A zero-second step for the time-step scheme
    /// - A digit count outside `1..=10`
    /// - Malformed configuration input
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A cryptographic or clock operation failed.
    ///
    /// # When This Occurs
    ///
    /// - The system clock reports a time before the Unix epoch
    /// - A timestamp cannot be mapped onto a calendar date
    /// - Secret material cannot be decoded
    #[error("Crypto error: {0}")]
    CryptoError(String),
}
