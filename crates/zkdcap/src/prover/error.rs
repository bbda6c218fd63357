// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Matter Labs

//! Error types of the proving backends

use crate::{bincode::DecodeError, prover::ZkType};
use thiserror::Error;

/// Result type used throughout the proving backends
pub type Result<T> = std::result::Result<T, ProverError>;

/// Error types that can occur while generating a proof
#[derive(Error, Debug)]
pub enum ProverError {
    /// The remote service answered with a non-success status
    #[error("HTTP request failed with status {status_code}: {message}")]
    Http {
        /// HTTP status code
        status_code: u16,
        /// Response body
        message: String,
    },

    /// The request never got an answer
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A JSON response has an unexpected shape
    #[error("invalid JSON response: {0}")]
    Json(#[from] serde_json::Error),

    /// An endpoint URL could not be built
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// A downloaded artifact does not decode
    #[error("decoding {artifact}: {source}")]
    Decode {
        /// what was being decoded
        artifact: &'static str,
        /// the codec error, carrying the failing field path
        #[source]
        source: DecodeError,
    },

    /// The service reports success but does not say where the result is
    #[error("{0} reported as finished without a result URL")]
    MissingResult(&'static str),

    /// The proof request was not picked up by any prover
    #[error("proof unclaimed: [{reason}] {description}")]
    Unclaimed {
        /// remote reason code
        reason: String,
        /// remote description
        description: String,
    },

    /// A remote job ended in a failure state
    #[error("{job} {status}: {message}")]
    JobFailed {
        /// which job failed
        job: &'static str,
        /// the terminal status
        status: String,
        /// remote error message
        message: String,
    },

    /// Only Groth16 proofs can be turned into proof bytes
    #[error("unsupported proof mode: {0}")]
    UnsupportedProofMode(String),

    /// Signing a request failed
    #[error("signing request: {0}")]
    Signing(#[from] secp256k1::Error),

    /// The backend configuration is unusable
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// No client was configured for the requested proof type
    #[error("{0} backend not configured")]
    BackendNotConfigured(ZkType),

    /// A prover input component does not fit its length field
    #[error("{0} too large for the prover input")]
    InputTooLarge(&'static str),

    /// The caller cancelled the operation
    #[error("operation cancelled")]
    Cancelled,

    /// Hex string in a response does not decode
    #[error(transparent)]
    FromHex(#[from] hex::FromHexError),

    /// Reading a local artifact failed
    #[error("reading {path}: {source}")]
    Io {
        /// the file being read
        path: String,
        /// the I/O error
        #[source]
        source: std::io::Error,
    },
}

impl ProverError {
    /// Create a new decode error for a downloaded artifact
    pub fn decode(artifact: &'static str, source: DecodeError) -> Self {
        Self::Decode { artifact, source }
    }

    /// Create a new invalid configuration error
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig(reason.into())
    }
}
