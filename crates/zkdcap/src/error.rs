// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Matter Labs

//! Crate level error type

use crate::{
    bincode::DecodeError, collateral::CollateralError, prover::error::ProverError,
    quote::error::QuoteError,
};
use thiserror::Error;

/// Result type used by callers driving the whole pipeline
pub type Result<T> = std::result::Result<T, Error>;

/// Error of any stage, the variant names the failing stage
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed or unsupported quote
    #[error(transparent)]
    Quote(#[from] QuoteError),

    /// Binary decoding failure
    #[error(transparent)]
    Codec(#[from] DecodeError),

    /// Collateral could not be assembled
    #[error(transparent)]
    Collateral(#[from] CollateralError),

    /// Proof generation failed
    #[error(transparent)]
    Prover(#[from] ProverError),
}

impl Error {
    /// Short label of the failing stage
    pub fn stage(&self) -> &'static str {
        match self {
            Error::Quote(_) => "quote",
            Error::Codec(_) => "codec",
            Error::Collateral(_) => "collateral",
            Error::Prover(ProverError::Decode { .. }) => "codec",
            Error::Prover(_) => "prover",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_labels() {
        let err: Error = QuoteError::QuoteVersion(9).into();
        assert_eq!(err.stage(), "quote");
        assert_eq!(err.to_string(), "unsupported quote version 9");

        let err: Error = ProverError::Cancelled.into();
        assert_eq!(err.stage(), "prover");

        let err: Error = ProverError::decode("proof", DecodeError::LengthOverflow(1)).into();
        assert_eq!(err.stage(), "codec");
    }
}
