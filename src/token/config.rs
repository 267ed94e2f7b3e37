use crate::token::step::{DEFAULT_DIGITS, DEFAULT_STEP};
use crate::token::window::DEFAULT_WINDOW_DAYS;
use crate::{Algorithm, TokenError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Which token scheme a configuration selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenScheme {
    /// Day-window hexadecimal tokens ([`WindowTokenFactory`](crate::WindowTokenFactory)).
    Window,
    /// Time-step decimal codes ([`StepTokenFactory`](crate::StepTokenFactory)).
    Step,
}

/// Predefined configuration presets for common use cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigPreset {
    /// Production-ready configuration.
    ///
    /// - Algorithm: sha256
    /// - Window: 3 days
    /// - Step: 30 seconds, 8 digits
    Production,

    /// Development-friendly configuration.
    ///
    /// - Algorithm: sha256
    /// - Window: 7 days (tokens survive a week of local testing)
    /// - Step: 2 minutes, 8 digits
    Development,

    /// High-security configuration.
    ///
    /// - Algorithm: sha512
    /// - Window: 1 day
    /// - Step: 30 seconds, 10 digits
    HighSecurity,

    /// Load configuration from environment variables.
    ///
    /// Reads configuration from:
    /// - `HASH_TOKEN_SCHEME`: `window` or `step` (default: window)
    /// - `HASH_TOKEN_ALGORITHM`: digest name (default: sha256)
    /// - `HASH_TOKEN_WINDOW_DAYS`: window validity in days (default: 3)
    /// - `HASH_TOKEN_STEP_SECONDS`: step length in seconds (default: 30)
    /// - `HASH_TOKEN_DIGITS`: digits per step code (default: 8)
    FromEnv,
}

/// Configuration shared by both token factories.
///
/// Unparseable environment values fall back to the built-in defaults.
///
/// # Example
///
/// ```rust
/// use hash_token::{Algorithm, TokenConfig, TokenScheme};
/// use std::time::Duration;
///
/// let config = TokenConfig {
///     scheme: TokenScheme::Step,
///     algorithm: Algorithm::Sha256,
///     window_days: 3,
///     step: Duration::from_secs(60),
///     digits: 6,
/// };
/// assert!(config.validate().is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Scheme built by [`create_factory`](crate::create_factory)
    pub scheme: TokenScheme,
    /// Digest primitive for every HMAC
    pub algorithm: Algorithm,
    /// Trailing days a window token stays valid
    pub window_days: u32,
    /// Length of one time step
    pub step: Duration,
    /// Maximum digits per step code
    pub digits: usize,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            scheme: env_value("HASH_TOKEN_SCHEME")
                .and_then(|s| match s.as_str() {
                    "window" => Some(TokenScheme::Window),
                    "step" => Some(TokenScheme::Step),
                    _ => None,
                })
                .unwrap_or(TokenScheme::Window),
            algorithm: env_value("HASH_TOKEN_ALGORITHM")
                .and_then(|s| Algorithm::resolve(&s).ok())
                .unwrap_or(Algorithm::Sha256),
            window_days: env_value("HASH_TOKEN_WINDOW_DAYS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_WINDOW_DAYS),
            step: env_value("HASH_TOKEN_STEP_SECONDS")
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_STEP),
            digits: env_value("HASH_TOKEN_DIGITS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_DIGITS),
        }
    }
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|s| s.trim().to_string())
}

impl TokenConfig {
    /// Parses a configuration from JSON.
    ///
    /// The step is written as `{"secs": .., "nanos": ..}`, the serde form of `Duration`.
    pub fn from_json(json: &str) -> Result<Self, TokenError> {
        serde_json::from_str(json).map_err(|e| {
            TokenError::InvalidConfiguration(format!("Invalid JSON configuration: {e}"))
        })
    }

    /// Serializes the configuration to JSON.
    pub fn to_json(&self) -> Result<String, TokenError> {
        serde_json::to_string(self).map_err(|e| {
            TokenError::InvalidConfiguration(format!("Cannot serialize configuration: {e}"))
        })
    }

    /// Validates the configuration and returns any warnings.
    ///
    /// # Returns
    ///
    /// A vector of warning messages for potentially problematic settings.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.algorithm.is_legacy() {
            warnings.push(format!(
                "Legacy digest {} should only be used to verify existing tokens",
                self.algorithm
            ));
        }

        // Check window settings
        if self.window_days == 0 {
            warnings.push("Window of 0 days rejects every window token".to_string());
        }
        if self.window_days > 30 {
            warnings.push("Long window (> 30 days) may increase replay risk".to_string());
        }

        // Check step settings
        if self.step.as_secs() < 15 {
            warnings.push(
                "Very short step (< 15 seconds) may reject codes before they are typed".to_string(),
            );
        }
        if self.step.as_secs() > 600 {
            warnings.push("Long step (> 10 minutes) may increase replay risk".to_string());
        }
        if self.digits < 6 {
            warnings.push("Fewer than 6 digits makes codes easy to guess".to_string());
        }

        warnings
    }

    /// Returns a summary of the current configuration.
    pub fn summary(&self) -> String {
        format!(
            "TokenConfig {{ Scheme: {:?}, Algorithm: {}, Window: {}d, Step: {}s, Digits: {} }}",
            self.scheme,
            self.algorithm,
            self.window_days,
            self.step.as_secs(),
            self.digits,
        )
    }
}

impl From<ConfigPreset> for TokenConfig {
    fn from(preset: ConfigPreset) -> Self {
        match preset {
            ConfigPreset::Production => Self {
                scheme: TokenScheme::Window,
                algorithm: Algorithm::Sha256,
                window_days: 3,
                step: Duration::from_secs(30),
                digits: 8,
            },
            ConfigPreset::Development => Self {
                scheme: TokenScheme::Window,
                algorithm: Algorithm::Sha256,
                window_days: 7,
                step: Duration::from_secs(120),
                digits: 8,
            },
            ConfigPreset::HighSecurity => Self {
                scheme: TokenScheme::Window,
                algorithm: Algorithm::Sha512,
                window_days: 1,
                step: Duration::from_secs(30),
                digits: 10,
            },
            ConfigPreset::FromEnv => Self::default(),
        }
    }
}
