// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Matter Labs

//! Quote verification collateral
//!
//! The collateral is everything the zkVM guest needs besides the quote itself:
//! the signed TCB info and enclave identity records plus the Intel root and
//! signing certificates with their revocation lists. It is fetched from a PCCS
//! through the [`CollateralSource`] interface.

use crate::quote::{error::QuoteError, QuoteParser};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use serde_with::{hex::Hex, serde_as};
use std::fmt;
use thiserror::Error;
use tracing::{debug, info};

/// Collateral error
#[derive(Error, Debug)]
#[allow(missing_docs)]
pub enum CollateralError {
    #[error(transparent)]
    Quote(#[from] QuoteError),
    #[error("fetching {what}: {source:#}")]
    Pccs {
        what: &'static str,
        #[source]
        source: anyhow::Error,
    },
    #[error("encoding collateral record: {0}")]
    Json(#[from] serde_json::Error),
    #[error("collateral field {field} too large: {len} bytes")]
    FieldTooLarge { field: &'static str, len: usize },
}

/// Certificate authority of the Intel PKI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum CaId {
    /// Intel SGX Root CA
    Root = 0,
    /// Intel SGX PCK Processor CA
    Processor = 1,
    /// Intel SGX PCK Platform CA
    Platform = 2,
    /// Intel SGX TCB Signing
    Signing = 3,
}

/// TCB info flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum TcbType {
    #[allow(missing_docs)]
    Sgx = 0,
    #[allow(missing_docs)]
    Tdx = 1,
}

/// Enclave identity flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum EnclaveIdType {
    /// quoting enclave
    Qe = 0,
    /// quote verification enclave
    Qve = 1,
    /// TDX quoting enclave
    Tdqe = 2,
}

macro_rules! impl_code {
    ($($ty:ty),*) => {
        $(
            impl $ty {
                /// Numeric code used by the PCCS interface
                pub const fn code(self) -> u8 {
                    self as u8
                }
            }

            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{:?}({})", self, self.code())
                }
            }
        )*
    };
}

impl_code!(CaId, TcbType, EnclaveIdType);

/// Everything needed to look up the collateral of one quote
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollateralKeys {
    /// hex encoded FMSPC of the platform
    pub fmspc: String,
    /// CA that issued the PCK certificate
    pub pck_ca: CaId,
    /// TCB info type
    pub tcb_type: TcbType,
    /// TCB info version
    pub tcb_version: u32,
    /// enclave identity type
    pub enclave_id_type: EnclaveIdType,
    /// enclave identity version
    pub enclave_id_version: u32,
}

/// Signed TCB info as served by the PCCS
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TcbInfo {
    /// TCB info JSON, kept byte exact because the signature covers it
    #[serde(rename = "tcbInfo")]
    pub tcb_info: Box<RawValue>,
    /// signature over `tcb_info`
    #[serde_as(as = "Hex")]
    pub signature: Vec<u8>,
}

/// Signed enclave identity as served by the PCCS
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnclaveIdentityInfo {
    /// enclave identity JSON, kept byte exact because the signature covers it
    #[serde(rename = "enclaveIdentity")]
    pub enclave_identity: Box<RawValue>,
    /// signature over `enclave_identity`
    #[serde_as(as = "Hex")]
    pub signature: Vec<u8>,
}

impl TcbInfo {
    /// Compact JSON encoding as consumed by the guest
    pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

impl EnclaveIdentityInfo {
    /// Compact JSON encoding as consumed by the guest
    pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

/// A DER certificate with its DER revocation list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CertCrl {
    #[allow(missing_docs)]
    pub cert: Vec<u8>,
    #[allow(missing_docs)]
    pub crl: Vec<u8>,
}

/// The PCCS, as far as collateral assembly is concerned
#[async_trait]
pub trait CollateralSource: Send + Sync {
    /// Signed TCB info for a platform
    async fn get_tcb_info(
        &self,
        tcb_type: TcbType,
        fmspc: &str,
        version: u32,
    ) -> anyhow::Result<TcbInfo>;

    /// Signed enclave identity
    async fn get_enclave_identity(
        &self,
        id: EnclaveIdType,
        version: u32,
    ) -> anyhow::Result<EnclaveIdentityInfo>;

    /// Certificate and CRL of one of the Intel CAs
    async fn get_cert_by_id(&self, ca: CaId) -> anyhow::Result<CertCrl>;
}

/// Quote verification collateral
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collateral {
    /// encoded [`TcbInfo`]
    #[serde_as(as = "Hex")]
    pub tcb_info: Vec<u8>,
    /// encoded [`EnclaveIdentityInfo`]
    #[serde_as(as = "Hex")]
    pub qe_identity: Vec<u8>,
    /// Intel SGX Root CA certificate
    #[serde_as(as = "Hex")]
    pub root_ca_der: Vec<u8>,
    /// TCB signing certificate
    #[serde_as(as = "Hex")]
    pub tcb_signing_der: Vec<u8>,
    /// Root CA revocation list
    #[serde_as(as = "Hex")]
    pub root_ca_crl_der: Vec<u8>,
    /// PCK Processor CA revocation list, empty for platform issued PCKs
    #[serde_as(as = "Hex")]
    pub pck_processor_crl_der: Vec<u8>,
    /// PCK Platform CA revocation list, empty for processor issued PCKs
    #[serde_as(as = "Hex")]
    pub pck_platform_crl_der: Vec<u8>,
}

impl Collateral {
    fn fields(&self) -> [(&'static str, &[u8]); 7] {
        [
            ("tcb_info", &self.tcb_info),
            ("qe_identity", &self.qe_identity),
            ("root_ca_der", &self.root_ca_der),
            ("tcb_signing_der", &self.tcb_signing_der),
            ("root_ca_crl_der", &self.root_ca_crl_der),
            ("pck_processor_crl_der", &self.pck_processor_crl_der),
            ("pck_platform_crl_der", &self.pck_platform_crl_der),
        ]
    }

    /// Canonical byte encoding
    ///
    /// Seven little-endian `u32` lengths in field order, then the fields.
    pub fn encode(&self) -> Result<Vec<u8>, CollateralError> {
        let fields = self.fields();
        let total = fields.iter().map(|(_, f)| f.len()).sum::<usize>();
        let mut out = Vec::with_capacity(fields.len() * 4 + total);
        for (name, field) in fields {
            out.extend_from_slice(&field_len(name, field.len())?.to_le_bytes());
        }
        for (_, field) in fields {
            out.extend_from_slice(field);
        }
        Ok(out)
    }

    /// Assemble the collateral for a parsed quote.
    pub async fn fetch(
        parser: &QuoteParser<'_>,
        source: &dyn CollateralSource,
    ) -> Result<Self, CollateralError> {
        let keys = parser.collateral_keys()?;
        info!(fmspc = %keys.fmspc, pck_ca = %keys.pck_ca, "fetching collateral");

        let tcb_info = source
            .get_tcb_info(keys.tcb_type, &keys.fmspc, keys.tcb_version)
            .await
            .map_err(|source| CollateralError::Pccs {
                what: "tcb info",
                source,
            })?;
        let qe_identity = source
            .get_enclave_identity(keys.enclave_id_type, keys.enclave_id_version)
            .await
            .map_err(|source| CollateralError::Pccs {
                what: "enclave identity",
                source,
            })?;

        let root = fetch_cert(source, CaId::Root).await?;
        let signing = fetch_cert(source, CaId::Signing).await?;
        let pck = fetch_cert(source, keys.pck_ca).await?;

        let mut collateral = Collateral {
            tcb_info: tcb_info.encode()?,
            qe_identity: qe_identity.encode()?,
            root_ca_der: root.cert,
            tcb_signing_der: signing.cert,
            root_ca_crl_der: root.crl,
            ..Default::default()
        };
        match keys.pck_ca {
            CaId::Processor => collateral.pck_processor_crl_der = pck.crl,
            _ => collateral.pck_platform_crl_der = pck.crl,
        }
        debug!(len = collateral.encode()?.len(), "collateral assembled");
        Ok(collateral)
    }
}

fn field_len(field: &'static str, len: usize) -> Result<u32, CollateralError> {
    u32::try_from(len).map_err(|_| CollateralError::FieldTooLarge { field, len })
}

async fn fetch_cert(source: &dyn CollateralSource, ca: CaId) -> Result<CertCrl, CollateralError> {
    source
        .get_cert_by_id(ca)
        .await
        .map_err(|source| CollateralError::Pccs {
            what: match ca {
                CaId::Root => "root CA certificate",
                CaId::Processor => "PCK processor CA certificate",
                CaId::Platform => "PCK platform CA certificate",
                CaId::Signing => "TCB signing certificate",
            },
            source,
        })
}
