// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Matter Labs

//! SP1 proving through the Succinct prover network
//!
//! Every state changing request is signed with the account key over a fresh
//! nonce. A proof request is created, the program and stdin are uploaded to
//! the returned presigned URLs, the request is submitted, and its status is
//! polled until a prover fulfills it.

pub mod api;
pub mod auth;
pub mod proof;

use crate::{
    bincode::Encode,
    prover::{
        config::Sp1Config,
        error::{ProverError, Result},
        http::HttpClient,
        poll::{Poll, Poller, StatusMachine},
        unix_now, RawProof, ZkProver, ZkType,
    },
};
use api::{
    CreateProofRequest, CreateProofResponse, GetNonceRequest, GetNonceResponse,
    GetProofStatusRequest, GetProofStatusResponse, ProofMode, ProofStatus, SubmitProofRequest,
    SubmitProofResponse,
};
use async_trait::async_trait;
use auth::{CreateProofMsg, Eip712Auth, SubmitProofMsg};
use proof::{SP1ProofWithPublicValues, SP1Stdin};
use reqwest::header::HeaderMap;
use serde::{de::DeserializeOwned, Serialize};
use std::{path::PathBuf, sync::Arc, time::Duration};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use url::Url;

/// Validity window of a proof request
pub const DEADLINE_WINDOW: Duration = Duration::from_secs(10);

const SERVICE_PATH: &str = "network.NetworkService/";

/// Client of the SP1 prover network
#[derive(Debug, Clone)]
pub struct Sp1Client {
    http: HttpClient,
    rpc: Url,
    auth: Arc<Eip712Auth>,
    version: String,
    program_path: Option<PathBuf>,
    program: Option<Arc<Vec<u8>>>,
    poller: Poller,
}

impl Sp1Client {
    /// Create a new client from an initialised configuration
    pub fn new(config: &Sp1Config) -> Result<Self> {
        Ok(Self {
            http: HttpClient::new(config.timeout(), HeaderMap::new())?,
            rpc: Url::parse(&config.rpc)?,
            auth: Arc::new(Eip712Auth::from_hex(&config.private_key)?),
            version: config.version.clone(),
            program_path: config.program_path.clone(),
            program: None,
            poller: Poller::new(config.poll_interval()),
        })
    }

    /// Use an in-memory guest ELF instead of `program_path`
    pub fn with_program(mut self, elf: Vec<u8>) -> Self {
        self.program = Some(Arc::new(elf));
        self
    }

    /// Override the status poll interval
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poller = Poller::new(interval);
        self
    }

    /// Ethereum address of the requesting account
    pub fn address(&self) -> [u8; 20] {
        self.auth.address()
    }

    async fn program(&self) -> Result<Arc<Vec<u8>>> {
        if let Some(elf) = &self.program {
            return Ok(elf.clone());
        }
        let path = self
            .program_path
            .as_ref()
            .ok_or_else(|| ProverError::invalid_config("sp1 program_path not configured"))?;
        let elf = tokio::fs::read(path).await.map_err(|source| ProverError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Arc::new(elf))
    }

    async fn api<T: Serialize, R: DeserializeOwned>(&self, method: &str, req: &T) -> Result<R> {
        let url = self.rpc.join(SERVICE_PATH)?.join(method)?;
        debug!(method, "rpc call");
        self.http.post_json(&url, req).await
    }

    /// Current nonce of the account
    pub async fn get_nonce(&self) -> Result<u64> {
        let res: GetNonceResponse = self
            .api(
                "GetNonce",
                &GetNonceRequest {
                    address: self.address().to_vec(),
                },
            )
            .await?;
        info!(account = %hex::encode(self.address()), nonce = res.nonce, "fetched nonce");
        Ok(res.nonce)
    }

    async fn rpc_create_proof(
        &self,
        nonce: u64,
        deadline: u64,
        mode: ProofMode,
    ) -> Result<CreateProofResponse> {
        let signature = self.auth.sign(&CreateProofMsg {
            nonce,
            deadline,
            mode: mode.code(),
            version: &self.version,
        });
        self.api(
            "CreateProof",
            &CreateProofRequest {
                signature: signature.to_vec(),
                nonce,
                mode: mode.code(),
                deadline,
                circuit_version: self.version.clone(),
            },
        )
        .await
    }

    async fn rpc_submit_proof(&self, nonce: u64, proof_id: &str) -> Result<()> {
        let signature = self.auth.sign(&SubmitProofMsg { nonce, proof_id });
        let _: SubmitProofResponse = self
            .api(
                "SubmitProof",
                &SubmitProofRequest {
                    signature: signature.to_vec(),
                    nonce,
                    proof_id: proof_id.to_string(),
                },
            )
            .await?;
        Ok(())
    }

    /// Status of a proof request
    pub async fn get_proof_status(&self, proof_id: &str) -> Result<GetProofStatusResponse> {
        self.api(
            "GetProofStatus",
            &GetProofStatusRequest {
                proof_id: proof_id.to_string(),
            },
        )
        .await
    }

    /// Create a proof request, upload its artifacts and submit it
    ///
    /// Each signed request uses a freshly fetched nonce.
    pub async fn create_proof(&self, elf: &[u8], stdin: &SP1Stdin, mode: ProofMode) -> Result<String> {
        let nonce = self.get_nonce().await?;
        let deadline = unix_now() + DEADLINE_WINDOW.as_secs();
        let created = self.rpc_create_proof(nonce, deadline, mode).await?;
        info!(proof_id = %created.proof_id, deadline, "created proof request");

        let program = elf.encode();
        info!(len = program.len(), "uploading program");
        self.http.put(&Url::parse(&created.program_url)?, program).await?;

        let stdin = stdin.encode();
        info!(len = stdin.len(), "uploading stdin");
        self.http.put(&Url::parse(&created.stdin_url)?, stdin).await?;

        let nonce = self.get_nonce().await?;
        self.rpc_submit_proof(nonce, &created.proof_id).await?;
        info!(proof_id = %created.proof_id, "submitted proof request");
        Ok(created.proof_id)
    }

    /// Poll a proof request until it is fulfilled and download the proof
    pub async fn poll_proof(
        &self,
        token: &CancellationToken,
        proof_id: &str,
    ) -> Result<SP1ProofWithPublicValues> {
        let proof_url = self
            .poller
            .run(
                token,
                &mut ProofPoll {
                    client: self,
                    proof_id,
                    claimed: false,
                },
            )
            .await?;
        info!(%proof_id, "proof fulfilled");

        let bytes = self.http.get_bytes(&Url::parse(&proof_url)?).await?;
        SP1ProofWithPublicValues::from_download(&bytes)
    }

    /// Prove `stdin` with the configured program in Groth16 mode
    pub async fn prove_stdin(
        &self,
        token: &CancellationToken,
        stdin: &SP1Stdin,
    ) -> Result<SP1ProofWithPublicValues> {
        let elf = self.program().await?;
        let proof_id = self.create_proof(&elf, stdin, ProofMode::Groth16).await?;
        self.poll_proof(token, &proof_id).await
    }
}

#[async_trait]
impl ZkProver for Sp1Client {
    fn zk_type(&self) -> ZkType {
        ZkType::Succinct
    }

    async fn prove(&self, token: &CancellationToken, input: Vec<u8>) -> Result<RawProof> {
        let result = self.prove_stdin(token, &SP1Stdin::from_input(input)).await?;
        let proof = result.bytes()?;
        Ok(RawProof {
            output: result.public_values,
            proof,
        })
    }
}

struct ProofPoll<'a> {
    client: &'a Sp1Client,
    proof_id: &'a str,
    claimed: bool,
}

#[async_trait]
impl StatusMachine for ProofPoll<'_> {
    type Status = GetProofStatusResponse;
    type Output = String;

    async fn fetch(&mut self) -> Result<GetProofStatusResponse> {
        self.client.get_proof_status(self.proof_id).await
    }

    fn advance(&mut self, status: GetProofStatusResponse) -> Result<Poll<String>> {
        match ProofStatus::parse(&status.status) {
            ProofStatus::Fulfilled => match status.proof_url.filter(|url| !url.is_empty()) {
                Some(url) => Ok(Poll::Ready(url)),
                None => Err(ProverError::MissingResult("proof request")),
            },
            ProofStatus::Claimed => {
                if !self.claimed {
                    info!(proof_id = %self.proof_id, "proof request claimed, proving");
                    self.claimed = true;
                }
                Ok(Poll::Pending)
            }
            ProofStatus::Unclaimed => Err(ProverError::Unclaimed {
                reason: status.unclaim_reason.unwrap_or_default(),
                description: status.unclaim_description.unwrap_or_default(),
            }),
            _ => {
                info!(proof_id = %self.proof_id, status = %status.status, "proof request is running");
                Ok(Poll::Pending)
            }
        }
    }
}
