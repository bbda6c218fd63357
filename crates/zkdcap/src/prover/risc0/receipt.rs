// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Matter Labs

//! RiscZero receipt as returned by the SNARK job

use crate::bincode::{decode_tag, Decode, DecodeContext, DecodeError};

/// Version tag of the Groth16 verifier the seals target
pub const GROTH16_SELECTOR: [u8; 4] = [0x50, 0xbd, 0x17, 0x69];

/// Prefix a Groth16 seal with the verifier selector.
pub fn groth16_encode(seal: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(GROTH16_SELECTOR.len() + seal.len());
    out.extend_from_slice(&GROTH16_SELECTOR);
    out.extend_from_slice(seal);
    out
}

/// SHA-256 digest, as eight little-endian words on the wire
pub type Digest = [u8; 32];

/// A receipt attesting to the execution of a guest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    /// the proof
    pub inner: InnerReceipt,
    /// public output of the guest
    pub journal: Vec<u8>,
    /// digest of the verifier parameters
    pub verifier_parameters: Digest,
}

/// Proof variants of a receipt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InnerReceipt {
    /// Groth16 SNARK, the only variant decoded
    Groth16(Groth16Receipt),
}

impl InnerReceipt {
    const COMPOSITE: u32 = 0;
    const SUCCINCT: u32 = 1;
    const GROTH16: u32 = 2;
    const FAKE: u32 = 3;

    /// The Groth16 receipt
    pub fn groth16(&self) -> &Groth16Receipt {
        match self {
            InnerReceipt::Groth16(receipt) => receipt,
        }
    }
}

/// Groth16 receipt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Groth16Receipt {
    /// the raw Groth16 proof
    pub seal: Vec<u8>,
    /// the claim the seal proves
    pub claim: MaybePruned<ReceiptClaim>,
    /// digest of the verifier parameters
    pub verifier_parameters: Digest,
}

/// A value or the digest it was pruned to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaybePruned<T> {
    #[allow(missing_docs)]
    Value(T),
    #[allow(missing_docs)]
    Pruned(Digest),
}

/// Claim of a guest execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptClaim {
    /// state before execution
    pub pre: MaybePruned<SystemState>,
    /// state after execution
    pub post: MaybePruned<SystemState>,
    /// how the execution ended
    pub exit_code: ExitCode,
    /// committed input, always empty today
    pub input: MaybePruned<Option<Input>>,
    /// committed output
    pub output: MaybePruned<Option<Output>>,
}

/// Program counter and memory root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemState {
    #[allow(missing_docs)]
    pub pc: u32,
    #[allow(missing_docs)]
    pub merkle_root: Digest,
}

/// Exit condition of a guest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum ExitCode {
    Halted(u32),
    Paused(u32),
    SystemSplit,
    SessionLimit,
}

/// Committed input; no value of it exists
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {}

/// Journal and assumptions of a guest execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    #[allow(missing_docs)]
    pub journal: MaybePruned<Vec<u8>>,
    #[allow(missing_docs)]
    pub assumptions: MaybePruned<Vec<MaybePruned<Assumption>>>,
}

/// A claim the execution depends on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assumption {
    #[allow(missing_docs)]
    pub claim: Digest,
    #[allow(missing_docs)]
    pub control_root: Digest,
}

impl Decode for Receipt {
    fn decode(data: &[u8]) -> Result<(Self, &[u8]), DecodeError> {
        let (inner, data) = InnerReceipt::decode(data).field("inner")?;
        let (journal, data) = Vec::<u8>::decode(data).field("journal")?;
        let (verifier_parameters, data) = Digest::decode(data).field("metadata")?;
        Ok((
            Receipt {
                inner,
                journal,
                verifier_parameters,
            },
            data,
        ))
    }
}

impl Decode for InnerReceipt {
    fn decode(data: &[u8]) -> Result<(Self, &[u8]), DecodeError> {
        let (tag, data) = decode_tag(data)?;
        match tag {
            Self::GROTH16 => {
                let (receipt, data) = Groth16Receipt::decode(data).field("groth16")?;
                Ok((InnerReceipt::Groth16(receipt), data))
            }
            Self::COMPOSITE | Self::SUCCINCT | Self::FAKE => {
                Err(DecodeError::UnsupportedVariant {
                    type_name: "InnerReceipt",
                    discriminant: tag.into(),
                })
            }
            other => Err(DecodeError::UnknownVariant {
                type_name: "InnerReceipt",
                discriminant: other.into(),
            }),
        }
    }
}

impl Decode for Groth16Receipt {
    fn decode(data: &[u8]) -> Result<(Self, &[u8]), DecodeError> {
        let (seal, data) = Vec::<u8>::decode(data).field("seal")?;
        let (claim, data) = MaybePruned::<ReceiptClaim>::decode(data).field("claim")?;
        let (verifier_parameters, data) = Digest::decode(data).field("verifier_parameters")?;
        Ok((
            Groth16Receipt {
                seal,
                claim,
                verifier_parameters,
            },
            data,
        ))
    }
}

impl<T: Decode> Decode for MaybePruned<T> {
    fn decode(data: &[u8]) -> Result<(Self, &[u8]), DecodeError> {
        let (tag, data) = decode_tag(data)?;
        match tag {
            0 => {
                let (value, data) = T::decode(data)?;
                Ok((MaybePruned::Value(value), data))
            }
            1 => {
                let (digest, data) = Digest::decode(data)?;
                Ok((MaybePruned::Pruned(digest), data))
            }
            other => Err(DecodeError::UnknownVariant {
                type_name: "MaybePruned",
                discriminant: other.into(),
            }),
        }
    }
}

impl Decode for ReceiptClaim {
    fn decode(data: &[u8]) -> Result<(Self, &[u8]), DecodeError> {
        let (pre, data) = MaybePruned::decode(data).field("pre")?;
        let (post, data) = MaybePruned::decode(data).field("post")?;
        let (exit_code, data) = ExitCode::decode(data).field("exit_code")?;
        let (input, data) = MaybePruned::decode(data).field("input")?;
        let (output, data) = MaybePruned::decode(data).field("output")?;
        Ok((
            ReceiptClaim {
                pre,
                post,
                exit_code,
                input,
                output,
            },
            data,
        ))
    }
}

impl Decode for SystemState {
    fn decode(data: &[u8]) -> Result<(Self, &[u8]), DecodeError> {
        let (pc, data) = u32::decode(data).field("pc")?;
        let (merkle_root, data) = Digest::decode(data).field("merkle_root")?;
        Ok((SystemState { pc, merkle_root }, data))
    }
}

impl Decode for ExitCode {
    fn decode(data: &[u8]) -> Result<(Self, &[u8]), DecodeError> {
        let (tag, data) = decode_tag(data)?;
        match tag {
            0 => {
                let (code, data) = u32::decode(data)?;
                Ok((ExitCode::Halted(code), data))
            }
            1 => {
                let (code, data) = u32::decode(data)?;
                Ok((ExitCode::Paused(code), data))
            }
            2 => Ok((ExitCode::SystemSplit, data)),
            3 => Ok((ExitCode::SessionLimit, data)),
            other => Err(DecodeError::UnknownVariant {
                type_name: "ExitCode",
                discriminant: other.into(),
            }),
        }
    }
}

impl Decode for Input {
    fn decode(_data: &[u8]) -> Result<(Self, &[u8]), DecodeError> {
        Err(DecodeError::UnsupportedVariant {
            type_name: "Input",
            discriminant: 1,
        })
    }
}

impl Decode for Output {
    fn decode(data: &[u8]) -> Result<(Self, &[u8]), DecodeError> {
        let (journal, data) = MaybePruned::decode(data).field("journal")?;
        let (assumptions, data) = MaybePruned::decode(data).field("assumptions")?;
        Ok((
            Output {
                journal,
                assumptions,
            },
            data,
        ))
    }
}

impl Decode for Vec<MaybePruned<Assumption>> {
    fn decode(data: &[u8]) -> Result<(Self, &[u8]), DecodeError> {
        crate::bincode::decode_collection(data)
    }
}

impl Decode for Assumption {
    fn decode(data: &[u8]) -> Result<(Self, &[u8]), DecodeError> {
        let (claim, data) = Digest::decode(data).field("claim")?;
        let (control_root, data) = Digest::decode(data).field("control_root")?;
        Ok((
            Assumption {
                claim,
                control_root,
            },
            data,
        ))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::bincode::{from_slice, Encode};

    impl Encode for SystemState {
        fn encode_to(&self, buf: &mut Vec<u8>) {
            self.pc.encode_to(buf);
            self.merkle_root.encode_to(buf);
        }
    }

    /// A Groth16 receipt with a halted claim and a pruned output
    pub(crate) fn groth16_receipt_bytes(seal: &[u8], journal: &[u8]) -> Vec<u8> {
        let mut buf = Vec::new();
        2u32.encode_to(&mut buf); // InnerReceipt::Groth16
        seal.to_vec().encode_to(&mut buf);
        0u32.encode_to(&mut buf); // claim: Value
        0u32.encode_to(&mut buf); // pre: Value
        SystemState {
            pc: 0x0020_0000,
            merkle_root: [1; 32],
        }
        .encode_to(&mut buf);
        1u32.encode_to(&mut buf); // post: Pruned
        [2u8; 32].encode_to(&mut buf);
        0u32.encode_to(&mut buf); // exit_code: Halted
        0u32.encode_to(&mut buf);
        0u32.encode_to(&mut buf); // input: Value
        buf.push(0); // None
        0u32.encode_to(&mut buf); // output: Value
        buf.push(1); // Some
        0u32.encode_to(&mut buf); // journal: Value
        journal.to_vec().encode_to(&mut buf);
        0u32.encode_to(&mut buf); // assumptions: Value
        0u64.encode_to(&mut buf);
        [3u8; 32].encode_to(&mut buf); // verifier_parameters
        journal.to_vec().encode_to(&mut buf);
        [3u8; 32].encode_to(&mut buf); // metadata
        buf
    }

    #[test]
    fn groth16_encode_prefixes_selector() {
        let seal = hex::decode("0a0b0c0d0e0f").unwrap();
        assert_eq!(
            hex::encode(groth16_encode(&seal)),
            "50bd17690a0b0c0d0e0f"
        );
        assert_eq!(groth16_encode(&[]), GROTH16_SELECTOR);
    }

    #[test]
    fn decode_groth16_receipt() {
        let bytes = groth16_receipt_bytes(&[9; 256], b"journal");
        let receipt: Receipt = from_slice(&bytes).unwrap();
        assert_eq!(receipt.journal, b"journal");
        assert_eq!(receipt.verifier_parameters, [3; 32]);

        let groth16 = receipt.inner.groth16();
        assert_eq!(groth16.seal, [9; 256]);
        let MaybePruned::Value(claim) = &groth16.claim else {
            panic!("claim pruned");
        };
        assert_eq!(claim.exit_code, ExitCode::Halted(0));
        assert_eq!(
            claim.pre,
            MaybePruned::Value(SystemState {
                pc: 0x0020_0000,
                merkle_root: [1; 32]
            })
        );
        assert_eq!(claim.post, MaybePruned::Pruned([2; 32]));
        assert_eq!(claim.input, MaybePruned::Value(None));
        let MaybePruned::Value(Some(output)) = &claim.output else {
            panic!("no output");
        };
        assert_eq!(output.journal, MaybePruned::Value(b"journal".to_vec()));
        assert_eq!(output.assumptions, MaybePruned::Value(vec![]));
    }

    #[test]
    fn succinct_receipt_is_unsupported() {
        let mut bytes = Vec::new();
        1u32.encode_to(&mut bytes);
        let err = from_slice::<Receipt>(&bytes).unwrap_err();
        assert_eq!(err.field_path(), ["inner"]);
        assert!(matches!(
            err.root_cause(),
            DecodeError::UnsupportedVariant {
                type_name: "InnerReceipt",
                discriminant: 1
            }
        ));
    }

    #[test]
    fn truncated_receipt_names_the_field() {
        let bytes = groth16_receipt_bytes(&[9; 4], b"out");
        let err = from_slice::<Receipt>(&bytes[..20]).unwrap_err();
        assert_eq!(err.field_path(), ["inner", "groth16", "claim", "pre", "tag"]);
    }
}
