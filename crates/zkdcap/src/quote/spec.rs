// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Matter Labs

//! Quote layout variants

use crate::{
    collateral::{EnclaveIdType, TcbType},
    quote::error::QuoteError,
};
use std::fmt;

/// TEE type of an SGX enclave quote
pub const TEE_TYPE_SGX: u32 = 0x0000_0000;
/// TEE type of a TDX trust domain quote
pub const TEE_TYPE_TDX: u32 = 0x0000_0081;

/// Version 3 quote
pub const QUOTE_VERSION_V3: u16 = 3;
/// Version 4 quote
pub const QUOTE_VERSION_V4: u16 = 4;

/// Byte offset of the TEE type field in the quote header
const TEE_TYPE_OFFSET: usize = 4;

/// The layout family of a DCAP quote
///
/// Selected once from the first 8 bytes of the quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteSpec {
    /// Version 3, SGX only
    V3,
    /// Version 4 SGX enclave quote
    V4Sgx,
    /// Version 4 TDX trust domain quote
    V4Tdx,
}

impl QuoteSpec {
    /// Select the layout from the quote header.
    pub fn detect(quote: &[u8]) -> Result<Self, QuoteError> {
        let header = quote
            .get(..TEE_TYPE_OFFSET + 4)
            .ok_or(QuoteError::Truncated {
                needed: TEE_TYPE_OFFSET + 4,
                available: quote.len(),
            })?;

        let version = u16::from_le_bytes([header[0], header[1]]);
        let tee_type = u32::from_le_bytes([
            header[TEE_TYPE_OFFSET],
            header[TEE_TYPE_OFFSET + 1],
            header[TEE_TYPE_OFFSET + 2],
            header[TEE_TYPE_OFFSET + 3],
        ]);

        match (version, tee_type) {
            (QUOTE_VERSION_V3, _) => Ok(QuoteSpec::V3),
            (QUOTE_VERSION_V4, TEE_TYPE_SGX) => Ok(QuoteSpec::V4Sgx),
            (QUOTE_VERSION_V4, TEE_TYPE_TDX) => Ok(QuoteSpec::V4Tdx),
            (QUOTE_VERSION_V4, other) => Err(QuoteError::InvalidTeeType(other)),
            (other, _) => Err(QuoteError::QuoteVersion(other)),
        }
    }

    /// Offset of the 2-byte auth data size field
    pub const fn auth_data_size_offset(self) -> usize {
        match self {
            // header 48 + report 384 + sig len 4 + sig 64 + att key 64 + qe report 384 + qe sig 64
            QuoteSpec::V3 => 1012,
            // as V3 plus cert data type 2 + cert data size 4
            QuoteSpec::V4Sgx => 1018,
            // TD report body is 584 bytes instead of 384
            QuoteSpec::V4Tdx => 1218,
        }
    }

    /// TCB info type to request from the PCCS
    pub const fn tcb_type(self) -> TcbType {
        match self {
            QuoteSpec::V3 | QuoteSpec::V4Sgx => TcbType::Sgx,
            QuoteSpec::V4Tdx => TcbType::Tdx,
        }
    }

    /// TCB info version to request from the PCCS
    pub const fn tcb_version(self) -> u32 {
        match self {
            QuoteSpec::V3 => 2,
            QuoteSpec::V4Sgx | QuoteSpec::V4Tdx => 3,
        }
    }

    /// Enclave identity to request from the PCCS
    pub const fn enclave_id_type(self) -> EnclaveIdType {
        match self {
            QuoteSpec::V3 | QuoteSpec::V4Sgx => EnclaveIdType::Qe,
            QuoteSpec::V4Tdx => EnclaveIdType::Tdqe,
        }
    }

    /// Quote version, also the enclave identity version to request
    pub const fn version(self) -> u32 {
        match self {
            QuoteSpec::V3 => 3,
            QuoteSpec::V4Sgx | QuoteSpec::V4Tdx => 4,
        }
    }

    /// TEE type the layout belongs to
    pub const fn tee_type(self) -> u32 {
        match self {
            QuoteSpec::V3 | QuoteSpec::V4Sgx => TEE_TYPE_SGX,
            QuoteSpec::V4Tdx => TEE_TYPE_TDX,
        }
    }
}

impl fmt::Display for QuoteSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuoteSpec::V3 => f.write_str("v3 sgx"),
            QuoteSpec::V4Sgx => f.write_str("v4 sgx"),
            QuoteSpec::V4Tdx => f.write_str("v4 tdx"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(version: u16, tee_type: u32) -> Vec<u8> {
        let mut h = vec![0u8; 8];
        h[..2].copy_from_slice(&version.to_le_bytes());
        h[4..8].copy_from_slice(&tee_type.to_le_bytes());
        h
    }

    #[test]
    fn detect_variants() {
        assert_eq!(
            QuoteSpec::detect(&header(3, 0)).unwrap(),
            QuoteSpec::V3
        );
        // V3 has no TEE type branch
        assert_eq!(
            QuoteSpec::detect(&header(3, TEE_TYPE_TDX)).unwrap(),
            QuoteSpec::V3
        );
        assert_eq!(
            QuoteSpec::detect(&header(4, TEE_TYPE_SGX)).unwrap(),
            QuoteSpec::V4Sgx
        );
        assert_eq!(
            QuoteSpec::detect(&header(4, TEE_TYPE_TDX)).unwrap(),
            QuoteSpec::V4Tdx
        );
    }

    #[test]
    fn detect_rejects_unknown() {
        assert!(matches!(
            QuoteSpec::detect(&header(5, 0)),
            Err(QuoteError::QuoteVersion(5))
        ));
        assert!(matches!(
            QuoteSpec::detect(&header(4, 0x7f)),
            Err(QuoteError::InvalidTeeType(0x7f))
        ));
        assert!(matches!(
            QuoteSpec::detect(&[3, 0, 0]),
            Err(QuoteError::Truncated {
                needed: 8,
                available: 3
            })
        ));
    }

    #[test]
    fn lookup_codes() {
        assert_eq!(QuoteSpec::V3.auth_data_size_offset(), 1012);
        assert_eq!(QuoteSpec::V4Sgx.auth_data_size_offset(), 1018);
        assert_eq!(QuoteSpec::V4Tdx.auth_data_size_offset(), 1218);

        assert_eq!(QuoteSpec::V3.tcb_type(), TcbType::Sgx);
        assert_eq!(QuoteSpec::V4Tdx.tcb_type(), TcbType::Tdx);
        assert_eq!(QuoteSpec::V3.tcb_version(), 2);
        assert_eq!(QuoteSpec::V4Sgx.tcb_version(), 3);
        assert_eq!(QuoteSpec::V4Sgx.enclave_id_type(), EnclaveIdType::Qe);
        assert_eq!(QuoteSpec::V4Tdx.enclave_id_type(), EnclaveIdType::Tdqe);
        assert_eq!(QuoteSpec::V3.version(), 3);
        assert_eq!(QuoteSpec::V4Tdx.version(), 4);
    }
}
