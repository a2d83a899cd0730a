//! Error types for extra account meta resolution.

use solana_program::pubkey::Pubkey;
use thiserror::Error;

/// Failure reported by an account fetch port.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Account fetch failed: {0}")]
pub struct FetchError(pub String);

impl FetchError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

// ── Resolution Errors ───────────────────────────────────────────────────────

/// Every variant is fatal to the resolution call that raised it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// An account whose data feeds a seed does not exist.
    #[error("Account not found: {0}")]
    AccountNotFound(Pubkey),

    /// The descriptor account violates the TLV / entry layout.
    #[error("Malformed extra account metas: {0}")]
    MalformedExtraMetas(&'static str),

    /// An instruction-data slice runs past the end of the payload.
    #[error("Seed out of bounds: needs {end} bytes of instruction data, have {len}")]
    SeedOutOfBounds { end: usize, len: usize },

    /// An account-data slice runs past the end of the account's data.
    #[error("Account data out of bounds for {address}: needs {end} bytes, have {len}")]
    AccountDataOutOfBounds {
        address: Pubkey,
        end: usize,
        len: usize,
    },

    /// A seed refers to an account index that has not been resolved yet.
    #[error("Unresolved seed reference: index {index}, {known} accounts known")]
    UnresolvedSeedReference { index: usize, known: usize },

    /// No bump in 255..=0 produced an off-curve address.
    #[error("Unable to find a viable program address bump seed")]
    AddressDerivationExhausted,

    /// Too many seeds, or a seed longer than the runtime accepts.
    #[error("Length of the seed is too long for address generation")]
    MaxSeedLengthExceeded,

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

// ── Configuration Errors ────────────────────────────────────────────────────

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}
