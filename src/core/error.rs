use std::path::PathBuf;

use thiserror::Error;

/// Reasons an economy record is refused by the service
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EconomyError {
    #[error("population must be finite and at least 1, got {0}")]
    InvalidPopulation(f64),

    #[error("wealth must be finite and non-negative, got {0}")]
    InvalidWealth(f64),

    #[error("budget must be finite and non-negative, got {0}")]
    InvalidBudget(f64),

    #[error("epoch must be a finite non-negative integer, got {0}")]
    InvalidEpoch(f64),

    #[error("development rate must be finite and positive, got {0}")]
    InvalidDevelopmentRate(f64),

    #[error("inventory entry {resource} is negative or not finite: {amount}")]
    InvalidInventory { resource: String, amount: f64 },
}

/// Failures while loading or checking an `EconomyConfig`
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read economy config from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse economy config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid economy config: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, EconomyError>;
