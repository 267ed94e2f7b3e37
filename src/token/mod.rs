// Core architecture components
mod error;
mod factory;
mod time_utils;

// Digest registry and key material
pub mod algorithm;
pub mod secret;

// Token schemes
pub mod step;
pub mod truncation;
pub mod window;

pub mod config;

// Core components exports
pub use error::TokenError;
pub use factory::{TokenFactory, create_factory};
pub use time_utils::{TimeProviderFn, current_timestamp, utc_date};

// Registry and secret exports
pub use algorithm::Algorithm;
pub use secret::{DEFAULT_SECRET_LENGTH, Secret, generate_secret_bytes, generate_secret_hex};

// Scheme exports
pub use config::{ConfigPreset, TokenConfig, TokenScheme};
pub use step::{StepTokenFactory, StepTokenFactoryBuilder};
pub use window::{WindowTokenFactory, WindowTokenFactoryBuilder};
