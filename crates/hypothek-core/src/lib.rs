pub mod config;
pub mod error;
pub mod financing;
pub mod snapshot;
pub mod types;

#[cfg(feature = "risk")]
pub mod risk;

#[cfg(feature = "tranches")]
pub mod tranches;

#[cfg(feature = "phases")]
pub mod phases;

pub use config::LendingConfig;
pub use error::HypoError;
pub use types::*;

/// Standard result type for all hypothek operations
pub type HypoResult<T> = Result<T, HypoError>;
