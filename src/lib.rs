//! # Hash Token
//!
//! A Rust library for issuing and verifying short-lived proof tokens without
//! server-side storage.
//!
//! A token binds a payload (a password-reset address, an account id, a
//! one-time login) to a period of time and a secret key. Any holder of the
//! same key and configuration can recompute the token and compare, so
//! nothing about issued tokens needs to be stored.
//!
//! ## Features
//!
//! - **Window Tokens**: `HMAC(secret, payload || date)` as hex, valid for a
//!   configurable number of trailing UTC days
//! - **Step Codes**: short decimal codes derived from a time-step counter,
//!   valid only within the current step
//! - **Algorithm Registry**: md5, sha1, sha2, sha3 and blake2 families
//!   selectable by name, resolved at construction
//! - **Constant-Time Comparison**: tokens and secrets are compared without
//!   data-dependent early exits
//! - **Live Reconfiguration**: validity and code length can be changed on a
//!   shared factory from any thread
//! - **Injectable Clock**: every time-dependent operation reads an
//!   overridable time provider
//!
//! ## Quick Start
//!
//! ### Window Tokens
//!
//! ```rust
//! use hash_token::{TokenFactory, WindowTokenFactory};
//!
//! # fn example() -> Result<(), hash_token::TokenError> {
//! let factory = WindowTokenFactory::new("sha256", b"shared_secret_key")?;
//!
//! let token = factory.generate("user@example.org")?;
//! assert!(factory.verify("user@example.org", &token)?);
//! assert!(!factory.verify("someone@example.org", &token)?);
//! # Ok(())
//! # }
//! ```
//!
//! ### Step Codes
//!
//! ```rust
//! use hash_token::StepTokenFactory;
//! use std::time::Duration;
//!
//! # fn example() -> Result<(), hash_token::TokenError> {
//! let factory = StepTokenFactory::builder("sha256", b"shared_secret_key")
//!     .with_validity(Duration::from_secs(180))
//!     .with_length(6)
//!     .build()?;
//!
//! let code = factory.generate_token(Some("user@example.org"))?;
//! assert!(factory.challenge(&code, Some("user@example.org"))?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! Factories can be built from a [`TokenConfig`], which can be loaded from
//! presets, JSON, or environment variables:
//!
//! ```bash
//! export HASH_TOKEN_SCHEME="step"
//! export HASH_TOKEN_ALGORITHM="sha256"
//! export HASH_TOKEN_STEP_SECONDS="60"
//! export HASH_TOKEN_DIGITS="6"
//! ```
//!
//! ## Architecture
//!
//! - **[`TokenFactory`]**: The contract shared by both schemes
//! - **[`WindowTokenFactory`]**: Day-window hexadecimal tokens
//! - **[`StepTokenFactory`]**: Time-step decimal codes
//! - **[`Algorithm`]**: The digest registry
//! - **[`Secret`]**: Key material, zeroized on drop
//! - **[`TokenError`]**: Error handling for all failure modes

pub mod token;

// Re-export commonly used types
pub use token::{
    Algorithm, ConfigPreset, Secret, StepTokenFactory, TokenConfig, TokenError, TokenFactory,
    TokenScheme, WindowTokenFactory, create_factory,
};
