// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Matter Labs

//! SP1 prover network RPC types
//!
//! Byte fields travel as base64 strings and 64-bit integers as decimal strings.

use serde::{Deserialize, Serialize};
use serde_with::{base64::Base64, serde_as, DisplayFromStr};

/// Proof system requested from the network
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
#[allow(missing_docs)]
pub enum ProofMode {
    Unspecified = 0,
    Core = 1,
    Compressed = 2,
    Plonk = 3,
    Groth16 = 4,
}

impl ProofMode {
    /// Wire number of the mode
    pub const fn code(self) -> u32 {
        self as u32
    }
}

/// Status of a proof request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProofStatus {
    /// Unspecified or invalid status
    Unspecified,
    /// Created, awaiting submission by the requester
    Preparing,
    /// Submitted, awaiting a prover to claim it
    Requested,
    /// Claimed, awaiting fulfillment
    Claimed,
    /// Previously claimed, now unclaimed
    Unclaimed,
    /// Fulfilled and available for download
    Fulfilled,
    /// A status this client does not know
    Other(String),
}

impl ProofStatus {
    /// Parse the `PROOF_*` status string
    pub fn parse(status: &str) -> Self {
        match status {
            "PROOF_UNSPECIFIED_STATUS" => ProofStatus::Unspecified,
            "PROOF_PREPARING" => ProofStatus::Preparing,
            "PROOF_REQUESTED" => ProofStatus::Requested,
            "PROOF_CLAIMED" => ProofStatus::Claimed,
            "PROOF_UNCLAIMED" => ProofStatus::Unclaimed,
            "PROOF_FULFILLED" => ProofStatus::Fulfilled,
            other => ProofStatus::Other(other.to_string()),
        }
    }
}

#[serde_as]
#[derive(Debug, Clone, Serialize)]
#[allow(missing_docs)]
pub struct GetNonceRequest {
    #[serde_as(as = "Base64")]
    pub address: Vec<u8>,
}

#[serde_as]
#[derive(Debug, Clone, Deserialize)]
#[allow(missing_docs)]
pub struct GetNonceResponse {
    #[serde_as(as = "DisplayFromStr")]
    pub nonce: u64,
}

#[serde_as]
#[derive(Debug, Clone, Serialize)]
#[allow(missing_docs)]
pub struct CreateProofRequest {
    #[serde_as(as = "Base64")]
    pub signature: Vec<u8>,
    #[serde_as(as = "DisplayFromStr")]
    pub nonce: u64,
    pub mode: u32,
    /// latest time a fulfillment would be valid, unix seconds
    #[serde_as(as = "DisplayFromStr")]
    pub deadline: u64,
    pub circuit_version: String,
}

#[derive(Debug, Clone, Deserialize)]
#[allow(missing_docs)]
pub struct CreateProofResponse {
    pub proof_id: String,
    /// presigned URL for the program
    pub program_url: String,
    /// presigned URL for the stdin
    pub stdin_url: String,
}

#[serde_as]
#[derive(Debug, Clone, Serialize)]
#[allow(missing_docs)]
pub struct SubmitProofRequest {
    #[serde_as(as = "Base64")]
    pub signature: Vec<u8>,
    #[serde_as(as = "DisplayFromStr")]
    pub nonce: u64,
    pub proof_id: String,
}

/// Empty on success
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmitProofResponse {}

#[derive(Debug, Clone, Serialize)]
#[allow(missing_docs)]
pub struct GetProofStatusRequest {
    pub proof_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct GetProofStatusResponse {
    pub status: String,
    /// only set once the proof is fulfilled
    pub proof_url: Option<String>,
    pub unclaim_reason: Option<String>,
    pub unclaim_description: Option<String>,
}
