// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Matter Labs

//! Zero-knowledge proofs of Intel DCAP quote verification.
//!
//! A DCAP quote is parsed to find its collateral lookup keys, the collateral
//! is fetched from a PCCS, and both are handed to a remote zkVM proving
//! network which returns a proof suitable for on-chain verification.

#![deny(missing_docs)]
#![deny(clippy::all)]

pub mod bincode;
pub mod collateral;
pub mod error;
pub mod log;
pub mod prover;
pub mod quote;

pub use collateral::Collateral;
pub use error::{Error, Result};
pub use prover::{ZkProof, ZkProofClient, ZkType};
pub use quote::QuoteParser;
