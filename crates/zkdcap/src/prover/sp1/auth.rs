// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Matter Labs

//! EIP-712 request signing for the SP1 prover network

use crate::prover::error::{ProverError, Result};
use secp256k1::{Message, PublicKey, SecretKey, SECP256K1};
use sha3::{Digest, Keccak256};

const DOMAIN_TYPE: &str = "EIP712Domain(string name,string version)";
const DOMAIN_NAME: &str = "succinct";
const DOMAIN_VERSION: &str = "1";

fn keccak(data: &[u8]) -> [u8; 32] {
    Keccak256::digest(data).into()
}

/// A uint of up to 64 bits as a 32 byte ABI word
fn uint_word(value: u64) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[24..].copy_from_slice(&value.to_be_bytes());
    word
}

/// A typed structured message
pub trait Eip712Message {
    /// The EIP-712 type string, e.g. `SubmitProof(uint64 nonce,string proof_id)`
    const TYPE: &'static str;

    /// ABI encoded member words in declaration order
    fn encode_data(&self) -> Vec<[u8; 32]>;

    /// `keccak(typeHash || encodeData)`
    fn struct_hash(&self) -> [u8; 32] {
        let mut buf = Vec::with_capacity(32 * 5);
        buf.extend_from_slice(&keccak(Self::TYPE.as_bytes()));
        for word in self.encode_data() {
            buf.extend_from_slice(&word);
        }
        keccak(&buf)
    }
}

/// Signed part of a CreateProof request
#[derive(Debug, Clone)]
pub struct CreateProofMsg<'a> {
    #[allow(missing_docs)]
    pub nonce: u64,
    #[allow(missing_docs)]
    pub deadline: u64,
    #[allow(missing_docs)]
    pub mode: u32,
    #[allow(missing_docs)]
    pub version: &'a str,
}

impl Eip712Message for CreateProofMsg<'_> {
    const TYPE: &'static str = "CreateProof(uint64 nonce,uint64 deadline,uint32 mode,string version)";

    fn encode_data(&self) -> Vec<[u8; 32]> {
        vec![
            uint_word(self.nonce),
            uint_word(self.deadline),
            uint_word(self.mode.into()),
            keccak(self.version.as_bytes()),
        ]
    }
}

/// Signed part of a SubmitProof request
#[derive(Debug, Clone)]
pub struct SubmitProofMsg<'a> {
    #[allow(missing_docs)]
    pub nonce: u64,
    #[allow(missing_docs)]
    pub proof_id: &'a str,
}

impl Eip712Message for SubmitProofMsg<'_> {
    const TYPE: &'static str = "SubmitProof(uint64 nonce,string proof_id)";

    fn encode_data(&self) -> Vec<[u8; 32]> {
        vec![uint_word(self.nonce), keccak(self.proof_id.as_bytes())]
    }
}

/// Domain separator of the prover network
pub fn domain_separator() -> [u8; 32] {
    let mut buf = Vec::with_capacity(32 * 3);
    buf.extend_from_slice(&keccak(DOMAIN_TYPE.as_bytes()));
    buf.extend_from_slice(&keccak(DOMAIN_NAME.as_bytes()));
    buf.extend_from_slice(&keccak(DOMAIN_VERSION.as_bytes()));
    keccak(&buf)
}

/// The digest that gets signed for a message
pub fn signing_hash<M: Eip712Message>(msg: &M) -> [u8; 32] {
    let mut buf = Vec::with_capacity(2 + 32 * 2);
    buf.extend_from_slice(&[0x19, 0x01]);
    buf.extend_from_slice(&domain_separator());
    buf.extend_from_slice(&msg.struct_hash());
    keccak(&buf)
}

/// Converts a public key into an Ethereum address by hashing the encoded public key with Keccak256.
pub fn public_key_to_ethereum_address(public: &PublicKey) -> [u8; 20] {
    let public_key_bytes = public.serialize_uncompressed();

    // Skip the first byte (0x04) which indicates uncompressed key
    let hash = keccak(&public_key_bytes[1..]);

    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..]);
    address
}

/// Account key signing network requests
pub struct Eip712Auth {
    secret: SecretKey,
    address: [u8; 20],
}

impl Eip712Auth {
    /// Create from a hex encoded secret key, with or without `0x`
    pub fn from_hex(key: &str) -> Result<Self> {
        let key = key.trim();
        let bytes = hex::decode(key.strip_prefix("0x").unwrap_or(key))?;
        let secret = SecretKey::from_byte_array(
            bytes
                .as_slice()
                .try_into()
                .map_err(|_| ProverError::invalid_config("private key must be 32 bytes"))?,
        )?;
        Ok(Self::new(secret))
    }

    /// Create from a secret key
    pub fn new(secret: SecretKey) -> Self {
        let public = PublicKey::from_secret_key_global(&secret);
        Self {
            secret,
            address: public_key_to_ethereum_address(&public),
        }
    }

    /// Ethereum address of the account
    pub fn address(&self) -> [u8; 20] {
        self.address
    }

    /// Sign a message, returning `r || s || v` with `v = 27 + recovery id`
    pub fn sign<M: Eip712Message>(&self, msg: &M) -> [u8; 65] {
        let message = Message::from_digest(signing_hash(msg));
        let s = SECP256K1.sign_ecdsa_recoverable(message, &self.secret);
        let (rec_id, data) = s.serialize_compact();

        let mut signature = [0u8; 65];
        signature[..64].copy_from_slice(&data);
        // as defined in the Ethereum Yellow Paper (Appendix F)
        signature[64] = 27 + i32::from(rec_id) as u8;
        signature
    }
}

impl std::fmt::Debug for Eip712Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Eip712Auth")
            .field("address", &hex::encode(self.address))
            .finish_non_exhaustive()
    }
}
