use crate::token::factory::tokens_match;
use crate::token::time_utils::{TimeProviderFn, system_time_provider, utc_date};
use crate::{Algorithm, Secret, TokenError, TokenFactory};
use chrono::{Days, NaiveDate};
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

/// Default number of trailing days a window token stays acceptable.
pub const DEFAULT_WINDOW_DAYS: u32 = 3;

/// Autodeprecating tokens bound to a calendar day.
///
/// A token is `hex(HMAC(secret, payload || "YYYY-MM-DD"))` for the UTC day
/// it was issued on. Nothing else is embedded: the verifier recomputes the
/// token for today and each of the previous `validity - 1` days and accepts
/// any match. Widening or narrowing the validity therefore applies to
/// tokens that were issued before the change.
///
/// # Example
///
/// ```rust
/// use hash_token::{TokenFactory, WindowTokenFactory};
/// use chrono::NaiveDate;
///
/// # fn example() -> Result<(), hash_token::TokenError> {
/// let factory = WindowTokenFactory::new("md5", b"secret")?;
///
/// let issued = NaiveDate::from_ymd_opt(2021, 4, 9).unwrap();
/// let token = factory.generate_for_date("my word", issued)?;
/// assert_eq!(token, "d2b93d1507fcb56e301e02e2f7e0d60f");
///
/// // Still valid two days later, rejected a week later.
/// let later = NaiveDate::from_ymd_opt(2021, 4, 11).unwrap();
/// assert!(factory.verify_at("my word", &token, later)?);
/// let week_later = NaiveDate::from_ymd_opt(2021, 4, 16).unwrap();
/// assert!(!factory.verify_at("my word", &token, week_later)?);
/// # Ok(())
/// # }
/// ```
pub struct WindowTokenFactory {
    algorithm: Algorithm,
    secret: Secret,
    validity: AtomicU32,
    time_provider: TimeProviderFn,
}

impl WindowTokenFactory {
    /// Creates a factory with the default validity and the system clock.
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
    ) -> WindowTokenFactoryBuilder {
        WindowTokenFactoryBuilder {
            algorithm: algorithm.as_ref().to_string(),
            secret: secret.into(),
            validity: DEFAULT_WINDOW_DAYS,
            time_provider: None,
        }
    }

    /// Number of trailing days, including today, a token is accepted for.
    pub fn validity(&self) -> u32 {
        self.validity.load(Ordering::Acquire)
    }

    /// Changes the validity window.
    ///
    /// Takes effect on the next verification, including for tokens issued
    /// before the change. A validity of zero rejects every token, and
    /// [`check`](TokenFactory::check) then reports them all as invalid
    /// rather than expired.
    pub fn set_validity(&self, days: u32) {
        let previous = self.validity.swap(days, Ordering::AcqRel);
        tracing::debug!(previous, days, "window token validity changed");
    }

    /// Today's UTC date according to the configured time provider.
    pub fn today(&self) -> Result<NaiveDate, TokenError> {
        utc_date((self.time_provider)()?)
    }

    /// Issues the token for `payload` as of `date`.
    pub fn generate_for_date(&self, payload: &str, date: NaiveDate) -> Result<String, TokenError> {
        let date = date.to_string();
        self.algorithm
            .hmac_hex(self.secret.as_bytes(), &[payload.as_bytes(), date.as_bytes()])
    }

    /// Verifies `token` as if the current date were `today`.
    pub fn verify_at(&self, payload: &str, token: &str, today: NaiveDate) -> Result<bool, TokenError> {
        Ok(self.matching_age(payload, token, today)?.is_some())
    }

    /// Age in days of the window day `token` was issued on, if any.
    fn matching_age(
        &self,
        payload: &str,
        token: &str,
        today: NaiveDate,
    ) -> Result<Option<u32>, TokenError> {
        for age in 0..self.validity() {
            let Some(day) = today.checked_sub_days(Days::new(u64::from(age))) else {
                break;
            };
            if tokens_match(&self.generate_for_date(payload, day)?, token) {
                tracing::trace!(age, "window token accepted");
                return Ok(Some(age));
            }
        }
        tracing::trace!(validity = self.validity(), "window token rejected");
        Ok(None)
    }
}

impl TokenFactory for WindowTokenFactory {
    fn name(&self) -> &'static str {
        "window"
    }

    fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    fn generate(&self, payload: &str) -> Result<String, TokenError> {
        self.generate_for_date(payload, self.today()?)
    }

    fn verify(&self, payload: &str, token: &str) -> Result<bool, TokenError> {
        self.verify_at(payload, token, self.today()?)
    }

    /// Reports a token issued on the day just before the window as expired.
    ///
    /// A zero-day window has no such day, so every token is invalid.
    fn check(&self, payload: &str, token: &str) -> Result<(), TokenError> {
        let today = self.today()?;
        if self.verify_at(payload, token, today)? {
            return Ok(());
        }

        let closed_day = match self.validity() {
            0 => None,
            days => today.checked_sub_days(Days::new(u64::from(days))),
        };
        if let Some(day) = closed_day {
            if tokens_match(&self.generate_for_date(payload, day)?, token) {
                return Err(TokenError::ExpiredToken(token.to_string()));
            }
        }
        Err(TokenError::InvalidToken(token.to_string()))
    }
}

impl fmt::Debug for WindowTokenFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindowTokenFactory")
            .field("algorithm", &self.algorithm)
            .field("secret", &self.secret)
            .field("validity", &self.validity())
            .finish_non_exhaustive()
    }
}

/// Builder for [`WindowTokenFactory`].
#[must_use = "The builder does nothing unless `.build()` is called."]
pub struct WindowTokenFactoryBuilder {
    algorithm: String,
    secret: Secret,
    validity: u32,
    time_provider: Option<TimeProviderFn>,
}

impl WindowTokenFactoryBuilder {
    /// Sets the number of trailing days a token stays valid (default 3).
    pub fn with_validity(mut self, days: u32) -> Self {
        self.validity = days;
        self
    }

    /// Sets a custom time provider returning Unix seconds.
    ///
    /// The UTC calendar date of the returned timestamp is "today".
    pub fn with_time_provider<F>(mut self, provider: F) -> Self
    where
        F: Fn() -> Result<u64, TokenError> + Send + Sync + 'static,
    {
        self.time_provider = Some(Box::new(provider));
        self
    }

    /// Resolves the algorithm and builds the factory.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::UnknownAlgorithm`] if the algorithm name does not resolve.
    pub fn build(self) -> Result<WindowTokenFactory, TokenError> {
        let algorithm = Algorithm::resolve(&self.algorithm)?;
        tracing::debug!(
            algorithm = algorithm.name(),
            validity = self.validity,
            "window token factory built"
        );

        Ok(WindowTokenFactory {
            algorithm,
            secret: self.secret,
            validity: AtomicU32::new(self.validity),
            time_provider: self.time_provider.unwrap_or_else(system_time_provider),
        })
    }
}
