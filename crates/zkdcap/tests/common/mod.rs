// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Matter Labs

#![allow(dead_code)]

use const_oid::{AssociatedOid, ObjectIdentifier};
use p256::{
    ecdsa::{DerSignature, SigningKey},
    pkcs8::EncodePublicKey,
};
use std::{str::FromStr, time::Duration};
use x509_cert::{
    builder::{Builder, CertificateBuilder, Profile},
    der::{asn1::OctetString, pem::LineEnding, EncodePem, Length, Writer},
    ext::{AsExtension, Extension},
    name::Name,
    serial_number::SerialNumber,
    spki::SubjectPublicKeyInfoOwned,
    time::Validity,
};
use zkdcap::quote::utils::oids;

pub const FMSPC: [u8; 6] = [0x00, 0x90, 0x6e, 0xd5, 0x00, 0x00];
pub const FMSPC_HEX: &str = "00906ed50000";

pub const PLATFORM_ISSUER: &str = "CN=Intel SGX PCK Platform CA,O=Intel Corporation,L=Santa Clara,ST=CA,C=US";
pub const PROCESSOR_ISSUER: &str = "CN=Intel SGX PCK Processor CA,O=Intel Corporation,L=Santa Clara,ST=CA,C=US";
pub const ROOT_SUBJECT: &str = "CN=Intel SGX Root CA,O=Intel Corporation,L=Santa Clara,ST=CA,C=US";

const TEST_KEY: [u8; 32] = [
    0x1f, 0x2e, 0x3d, 0x4c, 0x5b, 0x6a, 0x79, 0x88, 0x97, 0xa6, 0xb5, 0xc4, 0xd3, 0xe2, 0xf1, 0x01,
    0x12, 0x23, 0x34, 0x45, 0x56, 0x67, 0x78, 0x89, 0x9a, 0xab, 0xbc, 0xcd, 0xde, 0xef, 0xf0, 0x02,
];

/// The SGX extension carrying an FMSPC entry
struct SgxExtension {
    der: Vec<u8>,
}

impl SgxExtension {
    /// SEQUENCE { SEQUENCE { OID fmspc, OCTET STRING value } }
    fn with_fmspc(fmspc: &[u8]) -> Self {
        let oid = oids::FMSPC.as_bytes();
        let mut entry = vec![0x06, oid.len() as u8];
        entry.extend_from_slice(oid);
        entry.extend_from_slice(&[0x04, fmspc.len() as u8]);
        entry.extend_from_slice(fmspc);

        let mut inner = vec![0x30, entry.len() as u8];
        inner.extend_from_slice(&entry);
        let mut der = vec![0x30, inner.len() as u8];
        der.extend_from_slice(&inner);
        Self { der }
    }
}

impl AssociatedOid for SgxExtension {
    const OID: ObjectIdentifier = oids::SGX_EXTENSION;
}

impl x509_cert::der::Encode for SgxExtension {
    fn encoded_len(&self) -> x509_cert::der::Result<Length> {
        Length::try_from(self.der.len())
    }

    fn encode(&self, writer: &mut impl Writer) -> x509_cert::der::Result<()> {
        writer.write(&self.der)
    }
}

impl AsExtension for SgxExtension {
    fn critical(&self, _: &Name, _: &[Extension]) -> bool {
        false
    }

    fn to_extension(
        &self,
        _subject: &Name,
        _extensions: &[Extension],
    ) -> Result<Extension, x509_cert::der::Error> {
        Ok(Extension {
            extn_id: <Self as AssociatedOid>::OID,
            critical: false,
            extn_value: OctetString::new(self.der.as_slice())?,
        })
    }
}

/// A PEM certificate issued by `issuer`, with the SGX extension if `fmspc` is set
pub fn cert_pem(issuer: &str, subject: &str, fmspc: Option<&[u8]>) -> String {
    let signing_key = SigningKey::from_slice(&TEST_KEY).unwrap();
    let verifying_key_der = signing_key.verifying_key().to_public_key_der().unwrap();

    let mut builder = CertificateBuilder::new(
        Profile::Leaf {
            issuer: Name::from_str(issuer).unwrap(),
            enable_key_agreement: false,
            enable_key_encipherment: false,
        },
        SerialNumber::new(&[0x01, 0x02, 0x03]).unwrap(),
        Validity::from_now(Duration::from_secs(60 * 60 * 24)).unwrap(),
        Name::from_str(subject).unwrap(),
        SubjectPublicKeyInfoOwned::try_from(verifying_key_der.as_bytes()).unwrap(),
        &signing_key,
    )
    .unwrap();

    if let Some(fmspc) = fmspc {
        builder
            .add_extension(&SgxExtension::with_fmspc(fmspc))
            .unwrap();
    }

    builder
        .build::<DerSignature>()
        .unwrap()
        .to_pem(LineEnding::LF)
        .unwrap()
}

/// The PCK leaf followed by an intermediate
pub fn pck_chain(issuer: &str) -> String {
    let mut chain = cert_pem(issuer, "CN=Intel SGX PCK Certificate,O=Intel Corporation,C=US", Some(&FMSPC));
    chain.push_str(&cert_pem(ROOT_SUBJECT, issuer, None));
    chain.push_str(&cert_pem(ROOT_SUBJECT, ROOT_SUBJECT, None));
    chain
}

/// A synthesised quote
pub struct QuoteFixture {
    pub quote: Vec<u8>,
    pub cert_data_offset: usize,
}

/// Build a quote with zeroed body, `auth_data_size` bytes of auth data and
/// the given PEM chain as QE certification data.
pub fn build_quote(version: u16, tee_type: u32, auth_data_size: u16, chain: &str) -> QuoteFixture {
    let offset = match (version, tee_type) {
        (3, _) => 1012,
        (4, 0x81) => 1218,
        _ => 1018,
    };
    let mut quote = vec![0u8; offset];
    quote[..2].copy_from_slice(&version.to_le_bytes());
    quote[2..4].copy_from_slice(&2u16.to_le_bytes()); // attestation key type
    quote[4..8].copy_from_slice(&tee_type.to_le_bytes());

    quote.extend_from_slice(&auth_data_size.to_le_bytes());
    quote.extend(std::iter::repeat(0x11).take(usize::from(auth_data_size)));
    quote.extend_from_slice(&5u16.to_le_bytes()); // PCK cert chain
    quote.extend_from_slice(&(chain.len() as u32 + 1).to_le_bytes());

    let cert_data_offset = quote.len();
    quote.extend_from_slice(chain.as_bytes());
    quote.push(0);

    QuoteFixture {
        quote,
        cert_data_offset,
    }
}
