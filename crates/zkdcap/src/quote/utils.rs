// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Matter Labs

//! Certificate and ASN.1 helpers for the PCK certificate

use crate::quote::error::{QuoteContextErr, QuoteError};
use asn1_der::{
    typed::{DerDecodable, Sequence},
    DerObject,
};
use const_oid::ObjectIdentifier;
use x509_cert::{der::Decode, Certificate};

/// Object identifiers found in PCK certificates
pub mod oids {
    use const_oid::ObjectIdentifier as OID;

    const fn oid(s: &str) -> OID {
        OID::new_unwrap(s)
    }

    /// X.520 common name
    pub const COMMON_NAME: OID = oid("2.5.4.3");
    /// Intel SGX extensions of a PCK certificate
    pub const SGX_EXTENSION: OID = oid("1.2.840.113741.1.13.1");
    /// FMSPC entry of the SGX extensions
    pub const FMSPC: OID = oid("1.2.840.113741.1.13.1.4");

    #[test]
    fn const_oid_works() {
        assert_eq!(
            SGX_EXTENSION.as_bytes(),
            oid("1.2.840.113741.1.13.1").as_bytes()
        );
        assert_eq!(FMSPC.parent(), Some(SGX_EXTENSION));
    }
}

/// One entry of the SGX extension sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SgxExt {
    /// entry identifier
    pub oid: ObjectIdentifier,
    /// DER content bytes of the entry value
    pub value: Vec<u8>,
}

/// Decode every PEM block of `data` into a certificate, in order.
///
/// Anything that is not inside a PEM block is skipped.
pub fn extract_certs(data: &[u8]) -> Result<Vec<Certificate>, QuoteError> {
    pem::parse_many(data)?
        .into_iter()
        .map(|block| {
            if block.tag() != "CERTIFICATE" {
                return Err(QuoteError::InvalidPemType(block.tag().to_string()));
            }
            Ok(Certificate::from_der(block.contents())?)
        })
        .collect()
}

/// The raw SGX extension of a certificate, if present
pub fn get_intel_extension(cert: &Certificate) -> Option<&[u8]> {
    cert.tbs_certificate
        .extensions
        .as_deref()
        .unwrap_or(&[])
        .iter()
        .find(|e| e.extn_id == oids::SGX_EXTENSION)
        .map(|e| e.extn_value.as_bytes())
}

/// Split the SGX extension into its `(OID, value)` entries.
pub fn parse_sgx_extensions(raw: &[u8]) -> Result<Vec<SgxExt>, QuoteError> {
    let obj = DerObject::decode(raw).asn1_context("SGX extension")?;
    let seq = Sequence::load(obj).asn1_context("SGX extension sequence")?;

    (0..seq.len())
        .map(|i| {
            let entry = seq.get(i).asn1_context("SGX extension entry")?;
            let entry = Sequence::load(entry).asn1_context("SGX extension entry")?;
            let name = entry.get(0).asn1_context("SGX extension entry oid")?;
            let value = entry.get(1).asn1_context("SGX extension entry value")?;
            let oid = ObjectIdentifier::from_bytes(name.value())
                .asn1_context("SGX extension entry oid")?;
            Ok(SgxExt {
                oid,
                value: value.value().to_vec(),
            })
        })
        .collect()
}

/// The hex encoded FMSPC entry of the SGX extension
pub fn find_fmspc(exts: &[SgxExt]) -> Option<String> {
    exts.iter()
        .find(|ext| ext.oid == oids::FMSPC)
        .map(|ext| hex::encode(&ext.value))
}

/// The common name of the certificate issuer
pub fn issuer_common_name(cert: &Certificate) -> Option<String> {
    cert.tbs_certificate
        .issuer
        .0
        .iter()
        .flat_map(|rdn| rdn.0.iter())
        .find(|atv| atv.oid == oids::COMMON_NAME)
        .and_then(|atv| std::str::from_utf8(atv.value.value()).ok())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    // SEQUENCE { SEQUENCE { OID fmspc, OCTET STRING 00906ed50000 } }
    fn sgx_extension(fmspc: &[u8]) -> Vec<u8> {
        let oid = oids::FMSPC.as_bytes();
        let mut entry = vec![0x06, oid.len() as u8];
        entry.extend_from_slice(oid);
        entry.push(0x04);
        entry.push(fmspc.len() as u8);
        entry.extend_from_slice(fmspc);

        let mut inner = vec![0x30, entry.len() as u8];
        inner.extend_from_slice(&entry);
        let mut outer = vec![0x30, inner.len() as u8];
        outer.extend_from_slice(&inner);
        outer
    }

    #[test]
    fn fmspc_from_extension() {
        let raw = sgx_extension(&[0x00, 0x90, 0x6e, 0xd5, 0x00, 0x00]);
        let exts = parse_sgx_extensions(&raw).unwrap();
        assert_eq!(exts.len(), 1);
        assert_eq!(exts[0].oid, oids::FMSPC);
        assert_eq!(find_fmspc(&exts).as_deref(), Some("00906ed50000"));
    }

    #[test]
    fn garbage_extension_is_an_asn1_error() {
        let err = parse_sgx_extensions(&[0x04, 0x01, 0x00]).unwrap_err();
        assert!(matches!(err, QuoteError::Asn1(_)));
    }

    #[test]
    fn missing_fmspc_entry() {
        let exts = vec![SgxExt {
            oid: oids::SGX_EXTENSION,
            value: vec![1],
        }];
        assert_eq!(find_fmspc(&exts), None);
    }

    #[test]
    fn wrong_pem_type() {
        let block = pem::Pem::new("PRIVATE KEY", vec![1, 2, 3]);
        let data = pem::encode(&block);
        let err = extract_certs(data.as_bytes()).unwrap_err();
        assert!(matches!(err, QuoteError::InvalidPemType(t) if t == "PRIVATE KEY"));
    }

    #[test]
    fn no_pem_block_is_an_empty_chain() {
        assert!(extract_certs(&[0u8; 16]).unwrap().is_empty());
    }
}
