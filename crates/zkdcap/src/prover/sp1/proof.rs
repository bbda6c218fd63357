// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Matter Labs

//! SP1 artifacts exchanged with the prover network

use crate::{
    bincode::{decode_tag, from_slice, Decode, DecodeContext, DecodeError, Encode},
    prover::error::{ProverError, Result},
};

/// Standard input of an SP1 guest
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SP1Stdin {
    /// input buffers, read by the guest in order
    pub buffer: Vec<Vec<u8>>,
    /// read pointer into `buffer`
    pub ptr: u64,
    /// proofs to verify inside the guest, never used here
    pub proofs: Vec<u32>,
}

impl SP1Stdin {
    /// Stdin with a single input buffer
    pub fn from_input(input: Vec<u8>) -> Self {
        Self {
            buffer: vec![input],
            ..Default::default()
        }
    }
}

impl Encode for SP1Stdin {
    fn encode_to(&self, buf: &mut Vec<u8>) {
        self.buffer.encode_to(buf);
        self.ptr.encode_to(buf);
        self.proofs.encode_to(buf);
    }
}

impl Decode for SP1Stdin {
    fn decode(data: &[u8]) -> std::result::Result<(Self, &[u8]), DecodeError> {
        let (buffer, data) = Vec::<Vec<u8>>::decode(data).field("buffer")?;
        let (ptr, data) = u64::decode(data).field("ptr")?;
        let (proofs, data) = Vec::<u32>::decode(data).field("proofs")?;
        Ok((
            SP1Stdin {
                buffer,
                ptr,
                proofs,
            },
            data,
        ))
    }
}

/// A fulfilled proof as downloaded from the network
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SP1ProofWithPublicValues {
    #[allow(missing_docs)]
    pub proof: SP1Proof,
    /// the stdin the proof was generated from
    pub stdin: SP1Stdin,
    /// public output committed by the guest
    pub public_values: Vec<u8>,
    /// SP1 version of the prover
    pub sp1_version: String,
}

impl SP1ProofWithPublicValues {
    /// Decode a proof download
    ///
    /// Core and compressed proofs are valid artifacts that carry no
    /// on-chain proof, so they surface as an unsupported mode.
    pub fn from_download(bytes: &[u8]) -> Result<Self> {
        from_slice(bytes).map_err(|e| {
            let unsupported = match e.root_cause() {
                DecodeError::UnsupportedVariant {
                    type_name: "SP1Proof",
                    discriminant,
                } => Some(*discriminant),
                _ => None,
            };
            match unsupported {
                Some(tag) => ProverError::UnsupportedProofMode(SP1Proof::mode_name(tag).into()),
                None => ProverError::decode("proof", e),
            }
        })
    }

    /// On-chain proof bytes: the first four bytes of the verifying key hash
    /// followed by the encoded Groth16 proof.
    pub fn bytes(&self) -> Result<Vec<u8>> {
        match &self.proof {
            SP1Proof::Groth16(proof) => {
                let encoded = hex::decode(&proof.encoded_proof)?;
                let mut out = Vec::with_capacity(4 + encoded.len());
                out.extend_from_slice(&proof.vkey_hash[..4]);
                out.extend_from_slice(&encoded);
                Ok(out)
            }
            SP1Proof::Plonk(_) => Err(ProverError::UnsupportedProofMode("plonk".into())),
        }
    }
}

impl Decode for SP1ProofWithPublicValues {
    fn decode(data: &[u8]) -> std::result::Result<(Self, &[u8]), DecodeError> {
        let (proof, data) = SP1Proof::decode(data).field("proof")?;
        let (stdin, data) = SP1Stdin::decode(data).field("stdin")?;
        let (public_values, data) = Vec::<u8>::decode(data).field("public_values")?;
        let (sp1_version, data) = String::decode(data).field("sp1_version")?;
        Ok((
            SP1ProofWithPublicValues {
                proof,
                stdin,
                public_values,
                sp1_version,
            },
            data,
        ))
    }
}

/// Proof variants carrying a payload this crate decodes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SP1Proof {
    #[allow(missing_docs)]
    Plonk(Bn254Proof),
    #[allow(missing_docs)]
    Groth16(Bn254Proof),
}

impl SP1Proof {
    const CORE: u32 = 0;
    const COMPRESSED: u32 = 1;
    const PLONK: u32 = 2;
    const GROTH16: u32 = 3;

    fn mode_name(tag: u64) -> &'static str {
        match tag {
            0 => "core",
            1 => "compressed",
            2 => "plonk",
            3 => "groth16",
            _ => "unknown",
        }
    }
}

impl Decode for SP1Proof {
    fn decode(data: &[u8]) -> std::result::Result<(Self, &[u8]), DecodeError> {
        let (tag, data) = decode_tag(data)?;
        match tag {
            Self::GROTH16 => {
                let (proof, data) = Bn254Proof::decode(data).field("groth16")?;
                Ok((SP1Proof::Groth16(proof), data))
            }
            Self::PLONK => {
                let (proof, data) = Bn254Proof::decode(data).field("plonk")?;
                Ok((SP1Proof::Plonk(proof), data))
            }
            Self::CORE | Self::COMPRESSED => Err(DecodeError::UnsupportedVariant {
                type_name: "SP1Proof",
                discriminant: tag.into(),
            }),
            other => Err(DecodeError::UnknownVariant {
                type_name: "SP1Proof",
                discriminant: other.into(),
            }),
        }
    }
}

/// Groth16 or PLONK proof over BN254
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bn254Proof {
    /// verifying key hash and committed values digest, as decimal strings
    pub public_inputs: [String; 2],
    /// hex encoded proof as consumed by the verifier contract
    pub encoded_proof: String,
    /// hex encoded raw proof
    pub raw_proof: String,
    /// hash of the verifying key
    pub vkey_hash: [u8; 32],
}

impl Decode for Bn254Proof {
    fn decode(data: &[u8]) -> std::result::Result<(Self, &[u8]), DecodeError> {
        let (public_inputs, data) = <[String; 2]>::decode(data).field("public_inputs")?;
        let (encoded_proof, data) = String::decode(data).field("encoded_proof")?;
        let (raw_proof, data) = String::decode(data).field("raw_proof")?;
        let (vkey_hash, data) = <[u8; 32]>::decode(data).field("vkey_hash")?;
        Ok((
            Bn254Proof {
                public_inputs,
                encoded_proof,
                raw_proof,
                vkey_hash,
            },
            data,
        ))
    }
}
