// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Matter Labs

//! DCAP quote parsing
//!
//! Only the parts of the quote needed to look up its collateral are read:
//! the header selects the layout, the auth data size field locates the
//! trailing PEM certificate chain, and the PCK leaf certificate carries the
//! platform FMSPC and the issuing CA.

pub mod error;
pub mod spec;
pub mod utils;

use crate::collateral::{
    CaId, CollateralKeys, CollateralSource, EnclaveIdentityInfo, TcbInfo,
};
use error::QuoteError;
pub use spec::QuoteSpec;
pub use utils::SgxExt;
use x509_cert::Certificate;

/// Issuer common name of PCK certificates issued by the platform CA
pub const PCK_PLATFORM_CA_CN: &str = "Intel SGX PCK Platform CA";
/// Issuer common name of PCK certificates issued by the processor CA
pub const PCK_PROCESSOR_CA_CN: &str = "Intel SGX PCK Processor CA";

/// Width of the auth data size field
const AUTH_DATA_SIZE_LEN: usize = 2;
/// Width of the QE certification data type field
const QE_CERT_DATA_TYPE_LEN: usize = 2;
/// Width of the QE certification data size field
const QE_CERT_DATA_SIZE_LEN: usize = 4;

/// A borrowed DCAP quote with its layout resolved
#[derive(Debug, Clone, Copy)]
pub struct QuoteParser<'a> {
    spec: QuoteSpec,
    quote: &'a [u8],
    cert_data_offset: usize,
}

impl<'a> QuoteParser<'a> {
    /// Detect the quote layout and locate the certificate data.
    ///
    /// Fails if the header is unknown or any offset lies outside the quote.
    pub fn new(quote: &'a [u8]) -> Result<Self, QuoteError> {
        let spec = QuoteSpec::detect(quote)?;

        let offset = spec.auth_data_size_offset();
        let field = quote
            .get(offset..offset + AUTH_DATA_SIZE_LEN)
            .ok_or(QuoteError::Truncated {
                needed: offset + AUTH_DATA_SIZE_LEN,
                available: quote.len(),
            })?;
        let auth_data_size = usize::from(u16::from_le_bytes([field[0], field[1]]));

        let cert_data_offset = offset
            + AUTH_DATA_SIZE_LEN
            + auth_data_size
            + QE_CERT_DATA_TYPE_LEN
            + QE_CERT_DATA_SIZE_LEN;
        if cert_data_offset > quote.len() {
            return Err(QuoteError::Truncated {
                needed: cert_data_offset,
                available: quote.len(),
            });
        }

        Ok(Self {
            spec,
            quote,
            cert_data_offset,
        })
    }

    /// The detected layout
    pub fn spec(&self) -> QuoteSpec {
        self.spec
    }

    /// The whole quote
    pub fn quote(&self) -> &'a [u8] {
        self.quote
    }

    /// Offset of the PEM certificate chain
    pub fn cert_data_offset(&self) -> usize {
        self.cert_data_offset
    }

    /// The PEM certificate chain and anything trailing it
    pub fn cert_data(&self) -> &'a [u8] {
        &self.quote[self.cert_data_offset..]
    }

    /// The embedded certificate chain, leaf first
    pub fn certificates(&self) -> Result<Vec<Certificate>, QuoteError> {
        utils::extract_certs(self.cert_data())
    }

    /// The PCK leaf certificate
    pub fn pck_certificate(&self) -> Result<Certificate, QuoteError> {
        self.certificates()?
            .into_iter()
            .next()
            .ok_or(QuoteError::EmptyCertChain)
    }

    /// Issuer common name of a certificate
    pub fn pck_issuer(cert: &Certificate) -> Option<String> {
        utils::issuer_common_name(cert)
    }

    /// Which PCK CA issued the certificate
    pub fn pck_type(cert: &Certificate) -> Result<CaId, QuoteError> {
        match Self::pck_issuer(cert).as_deref() {
            Some(PCK_PLATFORM_CA_CN) => Ok(CaId::Platform),
            Some(PCK_PROCESSOR_CA_CN) => Ok(CaId::Processor),
            Some(other) => Err(QuoteError::UnknownPckIssuer(other.to_string())),
            None => Err(QuoteError::UnknownPckIssuer(String::new())),
        }
    }

    /// The decoded SGX extension of a certificate, `None` if it has none
    pub fn sgx_extensions(cert: &Certificate) -> Result<Option<Vec<SgxExt>>, QuoteError> {
        utils::get_intel_extension(cert)
            .map(utils::parse_sgx_extensions)
            .transpose()
    }

    /// Hex encoded FMSPC from the SGX extension entries
    pub fn fmspc(exts: &[SgxExt]) -> Option<String> {
        utils::find_fmspc(exts)
    }

    /// Collateral lookup keys of the quote
    pub fn collateral_keys(&self) -> Result<CollateralKeys, QuoteError> {
        let pck = self.pck_certificate()?;
        let pck_ca = Self::pck_type(&pck)?;
        let fmspc = Self::sgx_extensions(&pck)?
            .as_deref()
            .and_then(Self::fmspc)
            .ok_or(QuoteError::MissingFmspc)?;

        Ok(CollateralKeys {
            fmspc,
            pck_ca,
            tcb_type: self.spec.tcb_type(),
            tcb_version: self.spec.tcb_version(),
            enclave_id_type: self.spec.enclave_id_type(),
            enclave_id_version: self.spec.version(),
        })
    }

    /// Fetch the TCB info matching this quote.
    pub async fn tcb_info(
        &self,
        source: &dyn CollateralSource,
        fmspc: &str,
    ) -> anyhow::Result<TcbInfo> {
        source
            .get_tcb_info(self.spec.tcb_type(), fmspc, self.spec.tcb_version())
            .await
    }

    /// Fetch the quoting enclave identity matching this quote.
    pub async fn enclave_identity(
        &self,
        source: &dyn CollateralSource,
    ) -> anyhow::Result<EnclaveIdentityInfo> {
        source
            .get_enclave_identity(self.spec.enclave_id_type(), self.spec.version())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(version: u16, tee_type: u32, auth_data_size: u16, tail: &[u8]) -> Vec<u8> {
        let spec = QuoteSpec::detect(&{
            let mut h = vec![0u8; 8];
            h[..2].copy_from_slice(&version.to_le_bytes());
            h[4..8].copy_from_slice(&tee_type.to_le_bytes());
            h
        })
        .unwrap();
        let offset = spec.auth_data_size_offset();
        let mut q = vec![0u8; offset];
        q[..2].copy_from_slice(&version.to_le_bytes());
        q[4..8].copy_from_slice(&tee_type.to_le_bytes());
        q.extend_from_slice(&auth_data_size.to_le_bytes());
        q.extend_from_slice(&vec![0u8; usize::from(auth_data_size) + 6]);
        q.extend_from_slice(tail);
        q
    }

    #[test]
    fn cert_data_offset_v3() {
        let q = quote(3, 0, 10, b"tail");
        let parser = QuoteParser::new(&q).unwrap();
        assert_eq!(parser.spec(), QuoteSpec::V3);
        assert_eq!(parser.cert_data_offset(), 1012 + 2 + 10 + 2 + 4);
        assert_eq!(parser.cert_data(), b"tail");
    }

    #[test]
    fn cert_data_offset_v4() {
        let q = quote(4, spec::TEE_TYPE_SGX, 0x100, &[]);
        let parser = QuoteParser::new(&q).unwrap();
        assert_eq!(parser.cert_data_offset(), 1018 + 2 + 0x100 + 2 + 4);
        assert!(parser.cert_data().is_empty());

        let q = quote(4, spec::TEE_TYPE_TDX, 7, &[]);
        let parser = QuoteParser::new(&q).unwrap();
        assert_eq!(parser.spec(), QuoteSpec::V4Tdx);
        assert_eq!(parser.cert_data_offset(), 1218 + 2 + 7 + 2 + 4);
    }

    #[test]
    fn truncated_before_auth_data_size() {
        let mut q = quote(3, 0, 0, &[]);
        q.truncate(1013);
        assert!(matches!(
            QuoteParser::new(&q),
            Err(QuoteError::Truncated {
                needed: 1014,
                available: 1013
            })
        ));
    }

    #[test]
    fn auth_data_size_past_end() {
        let mut q = quote(4, spec::TEE_TYPE_SGX, 0, &[]);
        q[1018..1020].copy_from_slice(&u16::MAX.to_le_bytes());
        assert!(matches!(
            QuoteParser::new(&q),
            Err(QuoteError::Truncated { .. })
        ));
    }

    #[test]
    fn no_certificates() {
        let q = quote(3, 0, 0, &[0]);
        let parser = QuoteParser::new(&q).unwrap();
        assert!(parser.certificates().unwrap().is_empty());
        assert!(matches!(
            parser.collateral_keys(),
            Err(QuoteError::EmptyCertChain)
        ));
    }
}
