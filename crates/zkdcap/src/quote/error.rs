// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Matter Labs

//! Quote Error type

use thiserror::Error;

/// Quote parsing error
#[derive(Error, Debug)]
#[allow(missing_docs)]
pub enum QuoteError {
    #[error("quote truncated: need {needed} bytes, have {available}")]
    Truncated { needed: usize, available: usize },
    #[error("unsupported quote version {0}")]
    QuoteVersion(u16),
    #[error("invalid tee type {0:#x}")]
    InvalidTeeType(u32),
    #[error("unexpected PEM type: {0}")]
    InvalidPemType(String),
    #[error("decoding PEM certificate chain: {0}")]
    Pem(#[from] pem::PemError),
    #[error("parsing certificate: {0}")]
    Certificate(#[from] x509_cert::der::Error),
    #[error("{0}: ASN.1 decode error")]
    Asn1(String),
    #[error("unknown pck issuer: {0}")]
    UnknownPckIssuer(String),
    #[error("empty certificate chain")]
    EmptyCertChain,
    #[error("SGX extension with FMSPC not found in PCK certificate")]
    MissingFmspc,
}

/// Usability trait for easy QuoteError annotation
pub trait QuoteContextErr {
    /// The Ok Type
    type Ok;
    /// Map the error to an ASN.1 decode error with context
    fn asn1_context<I: std::fmt::Display>(self, msg: I) -> Result<Self::Ok, QuoteError>;
}

impl<T, E: std::fmt::Display> QuoteContextErr for Result<T, E> {
    type Ok = T;
    fn asn1_context<I: std::fmt::Display>(self, msg: I) -> Result<T, QuoteError> {
        self.map_err(|e| QuoteError::Asn1(format!("{}: {}", msg, e)))
    }
}
