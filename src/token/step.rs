use crate::token::factory::tokens_match;
use crate::token::time_utils::{TimeProviderFn, system_time_provider, time_counter};
use crate::token::truncation::dynamic_truncate;
use crate::{Algorithm, Secret, TokenError, TokenFactory};
use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;
use zeroize::Zeroizing;

/// Default step length.
pub const DEFAULT_STEP: Duration = Duration::from_secs(30);

/// Default number of digits in a code.
pub const DEFAULT_DIGITS: usize = 8;

/// Largest useful digit count; the truncated window holds at most 32 bits.
pub const MAX_DIGITS: usize = 10;

/// Short decimal codes bound to a time step.
///
/// Wall-clock time is divided into buckets of `validity` seconds. The code
/// for bucket `t` is the dynamic truncation of
/// `HMAC(key, t as 8 big-endian bytes)`, where `key` is the secret itself
/// or, when a payload is given, `HMAC(secret, payload)`.
///
/// Only the current bucket is accepted: a code stops verifying the instant
/// the clock crosses into the next step.
///
/// # Example
///
/// ```rust
/// use hash_token::StepTokenFactory;
/// use std::time::Duration;
///
/// # fn example() -> Result<(), hash_token::TokenError> {
/// let factory = StepTokenFactory::builder("md5", b"secret")
///     .with_validity(Duration::from_secs(180))
///     .build()?;
///
/// // 2021-04-09 00:00:00 UTC
/// let code = factory.generate_at(1617926400, Some("my word"))?;
/// assert_eq!(code, "15726956");
///
/// // Two minutes later the bucket is unchanged.
/// assert!(factory.challenge_at(&code, Some("my word"), 1617926400 + 120)?);
/// // Two hours later it is not.
/// assert!(!factory.challenge_at(&code, Some("my word"), 1617926400 + 7200)?);
/// # Ok(())
/// # }
/// ```
pub struct StepTokenFactory {
    algorithm: Algorithm,
    secret: Secret,
    validity: AtomicU64,
    length: AtomicUsize,
    time_provider: TimeProviderFn,
}

impl StepTokenFactory {
    /// Creates a factory with a 30 second step, 8 digit codes and the system clock.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::UnknownAlgorithm`] if `algorithm` does not resolve.
    pub fn new(algorithm: impl AsRef<str>, secret: impl Into<Secret>) -> Result<Self, TokenError> {
        Self::builder(algorithm, secret).build()
    }

    /// Starts configuring a factory.
    pub fn builder(
        algorithm: impl AsRef<str>,
        secret: impl Into<Secret>,
    ) -> StepTokenFactoryBuilder {
        StepTokenFactoryBuilder {
            algorithm: algorithm.as_ref().to_string(),
            secret: secret.into(),
            validity: DEFAULT_STEP,
            length: DEFAULT_DIGITS,
            time_provider: None,
        }
    }

    /// Length of one time step.
    pub fn validity(&self) -> Duration {
        Duration::from_secs(self.validity.load(Ordering::Acquire))
    }

    /// Changes the step length.
    ///
    /// Codes issued under the previous step length stop verifying, since
    /// the step is part of the counter they were derived from.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::InvalidConfiguration`] for steps shorter than one second.
    pub fn set_validity(&self, validity: Duration) -> Result<(), TokenError> {
        let seconds = validate_step(validity)?;
        let previous = self.validity.swap(seconds, Ordering::AcqRel);
        tracing::debug!(previous, seconds, "step token validity changed");
        Ok(())
    }

    /// Maximum number of digits in a code.
    pub fn length(&self) -> usize {
        self.length.load(Ordering::Acquire)
    }

    /// Changes the code length.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::InvalidConfiguration`] unless `1 <= length <= 10`.
    pub fn set_length(&self, length: usize) -> Result<(), TokenError> {
        validate_length(length)?;
        let previous = self.length.swap(length, Ordering::AcqRel);
        tracing::debug!(previous, length, "step token length changed");
        Ok(())
    }

    /// The time counter for `timestamp` under the current step length.
    pub fn counter_at(&self, timestamp: u64) -> u64 {
        time_counter(timestamp, self.validity.load(Ordering::Acquire))
    }

    /// Issues the code for the current time step.
    ///
    /// `None` keys the code with the secret itself. Any `Some` payload,
    /// including `Some("")`, keys it with `HMAC(secret, payload)`, so an
    /// empty payload and no payload produce different codes.
    pub fn generate_token(&self, payload: Option<&str>) -> Result<String, TokenError> {
        self.generate_at((self.time_provider)()?, payload)
    }

    /// Issues the code for the time step containing `timestamp`.
    pub fn generate_at(&self, timestamp: u64, payload: Option<&str>) -> Result<String, TokenError> {
        self.code_for_counter(self.counter_at(timestamp), payload)
    }

    /// Checks `token` against the current time step only.
    pub fn challenge(&self, token: &str, payload: Option<&str>) -> Result<bool, TokenError> {
        self.challenge_at(token, payload, (self.time_provider)()?)
    }

    /// Checks `token` against the time step containing `timestamp`.
    pub fn challenge_at(
        &self,
        token: &str,
        payload: Option<&str>,
        timestamp: u64,
    ) -> Result<bool, TokenError> {
        let counter = self.counter_at(timestamp);
        let accepted = tokens_match(&self.code_for_counter(counter, payload)?, token);
        tracing::trace!(counter, accepted, "step token challenged");
        Ok(accepted)
    }

    fn code_for_counter(&self, counter: u64, payload: Option<&str>) -> Result<String, TokenError> {
        let key = match payload {
            Some(payload) => Zeroizing::new(
                self.algorithm
                    .hmac(self.secret.as_bytes(), &[payload.as_bytes()])?,
            ),
            None => Zeroizing::new(self.secret.as_bytes().to_vec()),
        };
        let raw = self.algorithm.hmac(&key, &[counter.to_be_bytes().as_slice()])?;
        Ok(dynamic_truncate(&raw, self.length()))
    }
}

impl TokenFactory for StepTokenFactory {
    fn name(&self) -> &'static str {
        "step"
    }

    fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    fn generate(&self, payload: &str) -> Result<String, TokenError> {
        self.generate_token(Some(payload))
    }

    fn verify(&self, payload: &str, token: &str) -> Result<bool, TokenError> {
        self.challenge(token, Some(payload))
    }

    /// Reports a code from the immediately preceding step as expired.
    fn check(&self, payload: &str, token: &str) -> Result<(), TokenError> {
        let counter = self.counter_at((self.time_provider)()?);
        if tokens_match(&self.code_for_counter(counter, Some(payload))?, token) {
            return Ok(());
        }

        if let Some(previous) = counter.checked_sub(1) {
            if tokens_match(&self.code_for_counter(previous, Some(payload))?, token) {
                return Err(TokenError::ExpiredToken(token.to_string()));
            }
        }
        Err(TokenError::InvalidToken(token.to_string()))
    }
}

impl fmt::Debug for StepTokenFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepTokenFactory")
            .field("algorithm", &self.algorithm)
            .field("secret", &self.secret)
            .field("validity", &self.validity())
            .field("length", &self.length())
            .finish_non_exhaustive()
    }
}

fn validate_step(validity: Duration) -> Result<u64, TokenError> {
    match validity.as_secs() {
        0 => Err(TokenError::InvalidConfiguration(format!(
            "Step length must be at least one second, got {validity:?}"
        ))),
        seconds => Ok(seconds),
    }
}

fn validate_length(length: usize) -> Result<(), TokenError> {
    if (1..=MAX_DIGITS).contains(&length) {
        Ok(())
    } else {
        Err(TokenError::InvalidConfiguration(format!(
            "Code length must be between 1 and {MAX_DIGITS} digits, got {length}"
        )))
    }
}

/// Builder for [`StepTokenFactory`].
#[must_use = "The builder does nothing unless `.build()` is called."]
pub struct StepTokenFactoryBuilder {
    algorithm: String,
    secret: Secret,
    validity: Duration,
    length: usize,
    time_provider: Option<TimeProviderFn>,
}

impl StepTokenFactoryBuilder {
    /// Sets the step length (default 30 seconds). Sub-second parts are ignored.
    pub fn with_validity(mut self, validity: Duration) -> Self {
        self.validity = validity;
        self
    }

    /// Sets the maximum number of digits in a code (default 8).
    pub fn with_length(mut self, length: usize) -> Self {
        self.length = length;
        self
    }

    /// Sets a custom time provider returning Unix seconds.
    pub fn with_time_provider<F>(mut self, provider: F) -> Self
    where
        F: Fn() -> Result<u64, TokenError> + Send + Sync + 'static,
    {
        self.time_provider = Some(Box::new(provider));
        self
    }

    /// Validates the configuration and builds the factory.
    ///
    /// # Errors
    ///
    /// - [`TokenError::UnknownAlgorithm`] if the algorithm name does not resolve
    /// - [`TokenError::InvalidConfiguration`] for a zero step or an out-of-range length
    pub fn build(self) -> Result<StepTokenFactory, TokenError> {
        let algorithm = Algorithm::resolve(&self.algorithm)?;
        let seconds = validate_step(self.validity)?;
        validate_length(self.length)?;
        tracing::debug!(
            algorithm = algorithm.name(),
            validity = seconds,
            length = self.length,
            "step token factory built"
        );

        Ok(StepTokenFactory {
            algorithm,
            secret: self.secret,
            validity: AtomicU64::new(seconds),
            length: AtomicUsize::new(self.length),
            time_provider: self.time_provider.unwrap_or_else(system_time_provider),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    /// 2021-04-09 00:00:00 UTC
    const APRIL_9: u64 = 1617926400;

    /// A factory whose clock can be moved by the test.
    fn factory_with_clock(
        algorithm: &str,
        validity: Duration,
        start: u64,
    ) -> (StepTokenFactory, Arc<AtomicU64>) {
        let clock = Arc::new(AtomicU64::new(start));
        let reader = Arc::clone(&clock);
        let factory = StepTokenFactory::builder(algorithm, b"secret")
            .with_validity(validity)
            .with_time_provider(move || Ok(reader.load(Ordering::SeqCst)))
            .build()
            .unwrap();
        (factory, clock)
    }

    #[test]
    fn test_construction_defaults() {
        let factory = StepTokenFactory::new("sha256", b"secret").unwrap();
        assert_eq!(factory.validity(), DEFAULT_STEP);
        assert_eq!(factory.length(), DEFAULT_DIGITS);
        assert_eq!(factory.algorithm(), Algorithm::Sha256);
        assert_eq!(factory.name(), "step");
    }

    #[test]
    fn test_construction_rejects_bad_parameters() {
        let result = StepTokenFactory::new("unknown", b"secret");
        assert!(matches!(result, Err(TokenError::UnknownAlgorithm(_))));

        let result = StepTokenFactory::builder("sha256", b"secret")
            .with_validity(Duration::ZERO)
            .build();
        assert!(matches!(result, Err(TokenError::InvalidConfiguration(_))));

        let result = StepTokenFactory::builder("sha256", b"secret")
            .with_validity(Duration::from_millis(500))
            .build();
        assert!(matches!(result, Err(TokenError::InvalidConfiguration(_))));

        for length in [0, 11] {
            let result = StepTokenFactory::builder("sha256", b"secret")
                .with_length(length)
                .build();
            assert!(matches!(result, Err(TokenError::InvalidConfiguration(_))));
        }
    }

    #[cfg(feature = "algo-md5")]
    #[test]
    fn test_md5_vectors() {
        let (factory, _) = factory_with_clock("md5", Duration::from_secs(180), APRIL_9);
        assert_eq!(factory.generate_at(APRIL_9, Some("my word")).unwrap(), "15726956");
        assert_eq!(
            factory.generate_at(APRIL_9 + 7200, Some("my word")).unwrap(),
            "35466790"
        );

        factory.set_validity(Duration::from_secs(30)).unwrap();
        assert_eq!(factory.generate_at(APRIL_9, None).unwrap(), "53919527");
    }

    #[test]
    fn test_sha2_vectors() {
        let factory = StepTokenFactory::builder("sha256", b"secret")
            .with_length(6)
            .build()
            .unwrap();
        assert_eq!(factory.generate_at(APRIL_9, None).unwrap(), "733260");

        let factory = StepTokenFactory::new("sha512", b"secret").unwrap();
        assert_eq!(
            factory.generate_at(APRIL_9, Some("my word")).unwrap(),
            "42772778"
        );
    }

    #[test]
    fn test_code_stable_within_step() {
        let (factory, clock) = factory_with_clock("sha256", Duration::from_secs(180), APRIL_9);
        let code = factory.generate_token(Some("my word")).unwrap();

        clock.store(APRIL_9 + 120, Ordering::SeqCst);
        assert_eq!(factory.generate_token(Some("my word")).unwrap(), code);
        assert!(factory.challenge(&code, Some("my word")).unwrap());

        clock.store(APRIL_9 + 7200, Ordering::SeqCst);
        assert_ne!(factory.generate_token(Some("my word")).unwrap(), code);
        assert!(!factory.challenge(&code, Some("my word")).unwrap());
    }

    #[test]
    fn test_no_grace_window_at_step_boundary() {
        let (factory, clock) = factory_with_clock("sha256", Duration::from_secs(30), APRIL_9);
        let code = factory.generate_token(None).unwrap();

        clock.store(APRIL_9 + 29, Ordering::SeqCst);
        assert!(factory.challenge(&code, None).unwrap());

        clock.store(APRIL_9 + 30, Ordering::SeqCst);
        assert!(!factory.challenge(&code, None).unwrap());
    }

    #[test]
    fn test_payload_changes_key() {
        let factory = StepTokenFactory::new("sha256", b"secret").unwrap();
        let bare = factory.generate_at(APRIL_9, None).unwrap();
        let bound = factory.generate_at(APRIL_9, Some("my word")).unwrap();
        let other = factory.generate_at(APRIL_9, Some("other word")).unwrap();

        assert_ne!(bare, bound);
        assert_ne!(bound, other);
        assert!(!factory.challenge_at(&bound, None, APRIL_9).unwrap());
        assert!(factory.challenge_at(&bound, Some("my word"), APRIL_9).unwrap());
    }

    #[test]
    fn test_empty_payload_is_still_a_payload() {
        let factory = StepTokenFactory::new("sha256", b"secret").unwrap();
        let empty = factory.generate_at(APRIL_9, Some("")).unwrap();
        let bare = factory.generate_at(APRIL_9, None).unwrap();

        assert_eq!(empty, "38898242");
        assert_eq!(bare, "59733260");
        assert!(!factory.challenge_at(&empty, None, APRIL_9).unwrap());

        let key = Algorithm::Sha256.hmac(b"secret", &[b"".as_slice()]).unwrap();
        let counter = factory.counter_at(APRIL_9);
        let raw = Algorithm::Sha256
            .hmac(&key, &[counter.to_be_bytes().as_slice()])
            .unwrap();
        assert_eq!(dynamic_truncate(&raw, 8), empty);
    }

    #[test]
    fn test_length_bounds_output() {
        let factory = StepTokenFactory::new("sha224", b"secret").unwrap();
        for length in 1..=MAX_DIGITS {
            factory.set_length(length).unwrap();
            for step in 0..50u64 {
                let code = factory.generate_at(APRIL_9 + step * 30, Some("x")).unwrap();
                assert!(code.len() <= length);
                assert!(code.bytes().all(|b| b.is_ascii_digit()));
            }
        }
    }

    #[test]
    fn test_validity_change_invalidates_issued_codes() {
        let (factory, clock) = factory_with_clock("sha256", Duration::from_secs(180), APRIL_9 + 200);
        let code = factory.generate_token(Some("my word")).unwrap();
        assert_eq!(factory.counter_at(APRIL_9 + 200), 8988481);

        factory.set_validity(Duration::from_secs(60)).unwrap();
        clock.store(APRIL_9 + 201, Ordering::SeqCst);
        assert_eq!(factory.counter_at(APRIL_9 + 201), 26965443);
        assert!(!factory.challenge(&code, Some("my word")).unwrap());

        assert!(matches!(
            factory.set_validity(Duration::ZERO),
            Err(TokenError::InvalidConfiguration(_))
        ));
        assert_eq!(factory.validity(), Duration::from_secs(60));
    }

    #[test]
    fn test_check_reports_previous_step_as_expired() {
        let (factory, clock) = factory_with_clock("sha256", Duration::from_secs(30), APRIL_9);
        let code = factory.generate("my word").unwrap();
        assert!(factory.check("my word", &code).is_ok());

        clock.store(APRIL_9 + 30, Ordering::SeqCst);
        assert!(matches!(
            factory.check("my word", &code),
            Err(TokenError::ExpiredToken(_))
        ));

        clock.store(APRIL_9 + 90, Ordering::SeqCst);
        assert!(matches!(
            factory.check("my word", &code),
            Err(TokenError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_trait_verify_matches_challenge() {
        let (factory, _) = factory_with_clock("sha256", Duration::from_secs(30), APRIL_9);
        let code = factory.generate("my word").unwrap();
        assert_eq!(code, factory.generate_token(Some("my word")).unwrap());
        assert!(factory.verify("my word", &code).unwrap());
        assert!(!factory.verify("my word", "00000000").unwrap() || code == "00000000");
    }

    #[test]
    fn test_set_length_rejects_out_of_range() {
        let factory = StepTokenFactory::new("sha256", b"secret").unwrap();
        assert!(factory.set_length(0).is_err());
        assert!(factory.set_length(MAX_DIGITS + 1).is_err());
        assert_eq!(factory.length(), DEFAULT_DIGITS);
    }

    #[test]
    fn test_debug_hides_secret() {
        let factory = StepTokenFactory::new("sha256", b"hunter2").unwrap();
        let debug = format!("{factory:?}");
        assert!(debug.contains("length: 8"));
        assert!(!debug.contains("hunter2"));
    }
}
