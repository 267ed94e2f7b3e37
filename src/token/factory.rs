//! The contract shared by both token schemes.
//!
//! A factory is configured once with an algorithm and a secret and then
//! issues and checks tokens without storing anything. Two factories built
//! from the same configuration produce the same tokens for the same
//! payload and clock reading, which is what lets any instance verify a
//! token issued by another.

use crate::token::config::{TokenConfig, TokenScheme};
use crate::{Algorithm, Secret, StepTokenFactory, TokenError, WindowTokenFactory};
use subtle::ConstantTimeEq;

/// A keyed token scheme.
///
/// Implementations must be deterministic in `(algorithm, secret,
/// configuration, payload, clock)` and must compare tokens in constant
/// time.
///
/// # Example
///
/// ```rust
/// use hash_token::{StepTokenFactory, TokenFactory, WindowTokenFactory};
///
/// fn issue_and_check(factory: &dyn TokenFactory) -> Result<bool, hash_token::TokenError> {
///     let token = factory.generate("alice")?;
///     factory.verify("alice", &token)
/// }
///
/// # fn example() -> Result<(), hash_token::TokenError> {
/// assert!(issue_and_check(&WindowTokenFactory::new("sha256", b"secret")?)?);
/// assert!(issue_and_check(&StepTokenFactory::new("sha256", b"secret")?)?);
/// # Ok(())
/// # }
/// ```
pub trait TokenFactory: Send + Sync {
    /// Short identifier of the scheme, used in logs.
    fn name(&self) -> &'static str;

    /// The digest primitive this factory was built with.
    fn algorithm(&self) -> Algorithm;

    /// Issues a token binding `payload` to the current clock reading.
    fn generate(&self, payload: &str) -> Result<String, TokenError>;

    /// Returns whether `token` is currently acceptable for `payload`.
    ///
    /// A mismatch is `Ok(false)`; errors are reserved for clock and
    /// configuration failures.
    fn verify(&self, payload: &str, token: &str) -> Result<bool, TokenError>;

    /// Like [`verify`](Self::verify), but reports a rejected token as an error.
    ///
    /// The default implementation reports every rejection as
    /// [`TokenError::InvalidToken`]; schemes that can recognise a token
    /// which has just aged out report [`TokenError::ExpiredToken`] instead.
    fn check(&self, payload: &str, token: &str) -> Result<(), TokenError> {
        if self.verify(payload, token)? {
            Ok(())
        } else {
            Err(TokenError::InvalidToken(token.to_string()))
        }
    }
}

/// Builds the factory selected by `config.scheme`.
///
/// # Example
///
/// ```rust
/// use hash_token::{ConfigPreset, TokenConfig, create_factory};
///
/// let config = TokenConfig::from(ConfigPreset::Production);
/// let factory = create_factory(&config, b"secret")?;
/// assert_eq!(factory.name(), "window");
/// # Ok::<(), hash_token::TokenError>(())
/// ```
pub fn create_factory(
    config: &TokenConfig,
    secret: impl Into<Secret>,
) -> Result<Box<dyn TokenFactory>, TokenError> {
    for warning in config.validate() {
        tracing::warn!(%warning, "token configuration warning");
    }

    let factory: Box<dyn TokenFactory> = match config.scheme {
        TokenScheme::Window => Box::new(
            WindowTokenFactory::builder(config.algorithm, secret)
                .with_validity(config.window_days)
                .build()?,
        ),
        TokenScheme::Step => Box::new(
            StepTokenFactory::builder(config.algorithm, secret)
                .with_validity(config.step)
                .with_length(config.digits)
                .build()?,
        ),
    };
    Ok(factory)
}

/// Constant-time string equality. Length is not secret and may short-circuit.
pub(crate) fn tokens_match(expected: &str, presented: &str) -> bool {
    expected.as_bytes().ct_eq(presented.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const TEST_SECRET: &[u8] = b"test_secret_key_123";

    fn config(scheme: TokenScheme) -> TokenConfig {
        TokenConfig {
            scheme,
            algorithm: Algorithm::Sha256,
            window_days: 2,
            step: Duration::from_secs(60),
            digits: 6,
        }
    }

    #[test]
    fn test_tokens_match() {
        assert!(tokens_match("abc123", "abc123"));
        assert!(!tokens_match("abc123", "abc124"));
        assert!(!tokens_match("abc123", "abc12"));
        assert!(!tokens_match("abc123", ""));
    }

    #[test]
    fn test_create_window_factory() {
        let factory = create_factory(&config(TokenScheme::Window), TEST_SECRET).unwrap();
        assert_eq!(factory.name(), "window");
        assert_eq!(factory.algorithm(), Algorithm::Sha256);

        let token = factory.generate("payload").unwrap();
        assert_eq!(token.len(), 64);
        assert!(factory.verify("payload", &token).unwrap());
        assert!(!factory.verify("other", &token).unwrap());
    }

    #[test]
    fn test_create_step_factory() {
        let factory = create_factory(&config(TokenScheme::Step), TEST_SECRET).unwrap();
        assert_eq!(factory.name(), "step");

        let token = factory.generate("payload").unwrap();
        assert!(token.len() <= 6);
        assert!(factory.verify("payload", &token).unwrap());
    }

    #[test]
    fn test_create_factory_rejects_invalid_step() {
        let mut config = config(TokenScheme::Step);
        config.digits = 0;
        let result = create_factory(&config, TEST_SECRET);
        assert!(matches!(result, Err(TokenError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_default_check_reports_invalid_token() {
        struct Never;

        impl TokenFactory for Never {
            fn name(&self) -> &'static str {
                "never"
            }

            fn algorithm(&self) -> Algorithm {
                Algorithm::Sha256
            }

            fn generate(&self, _payload: &str) -> Result<String, TokenError> {
                Ok(String::new())
            }

            fn verify(&self, _payload: &str, _token: &str) -> Result<bool, TokenError> {
                Ok(false)
            }
        }

        let result = Never.check("payload", "token");
        assert!(matches!(result, Err(TokenError::InvalidToken(t)) if t == "token"));
    }

    #[test]
    fn test_factories_are_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn TokenFactory>();
        assert_send_sync::<WindowTokenFactory>();
        assert_send_sync::<StepTokenFactory>();
    }
}
