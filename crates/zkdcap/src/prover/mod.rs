// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Matter Labs

//! Proof generation for DCAP quotes
//!
//! [`ZkProofClient`] frames the quote and its collateral into the guest input,
//! hands it to the backend selected by [`ZkType`] and normalizes the result
//! into a [`ZkProof`].

pub mod config;
pub mod error;
pub mod http;
pub mod poll;
pub mod risc0;
pub mod sp1;

use crate::collateral::{Collateral, CollateralError};
use async_trait::async_trait;
use self::config::ZkProofConfig;
use error::{ProverError, Result};
use risc0::BonsaiClient;
use serde::{Deserialize, Serialize};
use serde_with::{hex::Hex, serde_as};
use sp1::Sp1Client;
use std::{
    fmt,
    str::FromStr,
    time::{SystemTime, UNIX_EPOCH},
};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Proof system of a [`ZkProof`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ZkType {
    /// RiscZero zkVM, proven by Bonsai
    #[serde(rename = "risc0")]
    RiscZero = 1,
    /// SP1 zkVM, proven by the Succinct prover network
    #[serde(rename = "succinct")]
    Succinct = 2,
}

impl ZkType {
    /// Numeric code used on chain
    pub const fn code(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for ZkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZkType::RiscZero => f.write_str("risc0"),
            ZkType::Succinct => f.write_str("succinct"),
        }
    }
}

impl FromStr for ZkType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "risc0" | "risczero" | "bonsai" | "1" => Ok(ZkType::RiscZero),
            "succinct" | "sp1" | "2" => Ok(ZkType::Succinct),
            other => Err(format!("unknown zk type `{other}`, expected risc0 or succinct")),
        }
    }
}

/// A proof of a verified quote
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZkProof {
    /// proof system
    pub zk_type: ZkType,
    /// public output of the guest
    #[serde_as(as = "Hex")]
    pub output: Vec<u8>,
    /// backend specific encoded proof
    #[serde_as(as = "Hex")]
    pub proof: Vec<u8>,
}

/// Backend result before normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawProof {
    /// public output of the guest
    pub output: Vec<u8>,
    /// backend specific encoded proof
    pub proof: Vec<u8>,
}

/// A remote proving backend
#[async_trait]
pub trait ZkProver: Send + Sync {
    /// Proof system the backend produces
    fn zk_type(&self) -> ZkType;

    /// Prove the guest on `input`, observing `token` while waiting
    async fn prove(&self, token: &CancellationToken, input: Vec<u8>) -> Result<RawProof>;
}

/// Current unix time in seconds
pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Frame the guest input
///
/// `u64 LE timestamp || u32 LE quote length || u32 LE collateral length || quote || collateral`
pub fn generate_input(quote: &[u8], collateral: &[u8], timestamp: u64) -> Result<Vec<u8>> {
    let quote_len = u32::try_from(quote.len()).map_err(|_| ProverError::InputTooLarge("quote"))?;
    let collateral_len =
        u32::try_from(collateral.len()).map_err(|_| ProverError::InputTooLarge("collateral"))?;

    let mut data = Vec::with_capacity(8 + 4 + 4 + quote.len() + collateral.len());
    data.extend_from_slice(&timestamp.to_le_bytes());
    data.extend_from_slice(&quote_len.to_le_bytes());
    data.extend_from_slice(&collateral_len.to_le_bytes());
    data.extend_from_slice(quote);
    data.extend_from_slice(collateral);
    Ok(data)
}

/// Dispatches proof requests to the configured backends
///
/// Holds no per request state, every call starts a new remote job.
#[derive(Debug, Clone, Default)]
pub struct ZkProofClient {
    bonsai: Option<BonsaiClient>,
    sp1: Option<Sp1Client>,
}

impl ZkProofClient {
    /// Create the backends present in an initialised configuration
    pub fn new(config: &ZkProofConfig) -> Result<Self> {
        Ok(Self {
            bonsai: config.bonsai.as_ref().map(BonsaiClient::new).transpose()?,
            sp1: config.sp1.as_ref().map(Sp1Client::new).transpose()?,
        })
    }

    /// Create from prepared backends
    pub fn with_backends(bonsai: Option<BonsaiClient>, sp1: Option<Sp1Client>) -> Self {
        Self { bonsai, sp1 }
    }

    /// The backend for a proof system
    pub fn backend(&self, zk_type: ZkType) -> Result<&dyn ZkProver> {
        let backend: Option<&dyn ZkProver> = match zk_type {
            ZkType::RiscZero => self.bonsai.as_ref().map(|c| c as &dyn ZkProver),
            ZkType::Succinct => self.sp1.as_ref().map(|c| c as &dyn ZkProver),
        };
        backend.ok_or(ProverError::BackendNotConfigured(zk_type))
    }

    /// Prove a quote with its collateral
    pub async fn prove_quote(
        &self,
        token: &CancellationToken,
        zk_type: ZkType,
        quote: &[u8],
        collateral: &Collateral,
    ) -> Result<ZkProof> {
        let backend = self.backend(zk_type)?;
        let collateral = collateral.encode().map_err(|e| match e {
            CollateralError::FieldTooLarge { field, .. } => ProverError::InputTooLarge(field),
            other => ProverError::invalid_config(other.to_string()),
        })?;
        let input = generate_input(quote, &collateral, unix_now())?;
        info!(%zk_type, input_len = input.len(), "proving quote");

        let raw = backend.prove(token, input).await?;
        Ok(ZkProof {
            zk_type: backend.zk_type(),
            output: raw.output,
            proof: raw.proof,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_framing() {
        let input = generate_input(&[0xaa, 0xbb], &[0xcc], 0x0102_0304).unwrap();
        #[rustfmt::skip]
        let expected = [
            4, 3, 2, 1, 0, 0, 0, 0,
            2, 0, 0, 0,
            1, 0, 0, 0,
            0xaa, 0xbb,
            0xcc,
        ];
        assert_eq!(input, expected);
    }

    #[test]
    fn zk_type_names() {
        assert_eq!("risc0".parse::<ZkType>().unwrap(), ZkType::RiscZero);
        assert_eq!("SP1".parse::<ZkType>().unwrap(), ZkType::Succinct);
        assert!("groth16".parse::<ZkType>().is_err());
        assert_eq!(ZkType::RiscZero.code(), 1);
        assert_eq!(ZkType::Succinct.code(), 2);
    }

    #[test]
    fn proof_json_is_hex() {
        let proof = ZkProof {
            zk_type: ZkType::Succinct,
            output: vec![1, 2],
            proof: vec![0xff],
        };
        assert_eq!(
            serde_json::to_value(&proof).unwrap(),
            serde_json::json!({"zk_type": "succinct", "output": "0102", "proof": "ff"})
        );
    }

    #[tokio::test]
    async fn missing_backend() {
        let client = ZkProofClient::default();
        let err = client
            .prove_quote(
                &CancellationToken::new(),
                ZkType::RiscZero,
                &[],
                &Collateral::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ProverError::BackendNotConfigured(ZkType::RiscZero)));
        assert_eq!(err.to_string(), "risc0 backend not configured");
    }
}
