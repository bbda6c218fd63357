// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Matter Labs

//! RiscZero proving through the Bonsai service
//!
//! The input is uploaded, a proving session runs the guest image, and the
//! resulting receipt is wrapped into a Groth16 SNARK. Both remote jobs are
//! polled on a fixed interval.

pub mod api;
pub mod receipt;

use crate::{
    bincode::from_slice,
    prover::{
        config::BonsaiConfig,
        error::{ProverError, Result},
        http::HttpClient,
        poll::{Poll, Poller, StatusMachine},
        RawProof, ZkProver, ZkType,
    },
};
use api::{CreateRes, JobStatus, SessionCreate, SessionStatusRes, SnarkReq, SnarkStatusRes, UploadRes};
use async_trait::async_trait;
use receipt::{groth16_encode, Receipt};
use reqwest::header::{HeaderMap, HeaderValue};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use url::Url;

const API_KEY_HEADER: &str = "x-api-key";
const VERSION_HEADER: &str = "x-risc0-version";

/// Client of the Bonsai proving service
#[derive(Debug, Clone)]
pub struct BonsaiClient {
    http: HttpClient,
    base_url: Url,
    image_id: String,
    poller: Poller,
}

impl BonsaiClient {
    /// Create a new client from an initialised configuration
    pub fn new(config: &BonsaiConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            API_KEY_HEADER,
            HeaderValue::from_str(&config.api_key)
                .map_err(|_| ProverError::invalid_config("bonsai api key is not a header value"))?,
        );
        headers.insert(
            VERSION_HEADER,
            HeaderValue::from_str(&config.risc0_version).map_err(|_| {
                ProverError::invalid_config("risc0 version is not a header value")
            })?,
        );

        Ok(Self {
            http: HttpClient::new(config.timeout(), headers)?,
            base_url: Url::parse(&config.api_url)?,
            image_id: config.image_id.clone(),
            poller: Poller::new(config.poll_interval()),
        })
    }

    /// Override the status poll interval
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poller = Poller::new(interval);
        self
    }

    fn url(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    /// Upload the guest input, returning its id
    pub async fn upload_input(&self, input: Vec<u8>) -> Result<String> {
        let slot: UploadRes = self.http.get_json(&self.url("inputs/upload")?).await?;
        self.http.put(&Url::parse(&slot.url)?, input).await?;
        info!(input_id = %slot.uuid, "uploaded input");
        Ok(slot.uuid)
    }

    /// Start a proving session of the configured image
    pub async fn create_session(&self, input_id: &str) -> Result<String> {
        let res: CreateRes = self
            .http
            .post_json(
                &self.url("sessions/create")?,
                &SessionCreate {
                    img: &self.image_id,
                    input: input_id,
                    assumptions: vec![],
                    execute_only: false,
                },
            )
            .await?;
        info!(session_id = %res.uuid, image_id = %self.image_id, "created session");
        Ok(res.uuid)
    }

    /// Start wrapping a finished session into a Groth16 SNARK
    pub async fn create_snark(&self, session_id: &str) -> Result<String> {
        let res: CreateRes = self
            .http
            .post_json(&self.url("snark/create")?, &SnarkReq { session_id })
            .await?;
        info!(snark_id = %res.uuid, "created snark job");
        Ok(res.uuid)
    }

    /// Download and decode a receipt
    pub async fn download_receipt(&self, url: &str) -> Result<Receipt> {
        let bytes = self.http.get_bytes(&Url::parse(url)?).await?;
        from_slice(&bytes).map_err(|e| ProverError::decode("receipt", e))
    }

    /// Run the whole flow and return the Groth16 receipt
    pub async fn prove_receipt(&self, token: &CancellationToken, input: Vec<u8>) -> Result<Receipt> {
        let input_id = self.upload_input(input).await?;
        let session_id = self.create_session(&input_id).await?;
        self.poller
            .run(
                token,
                &mut SessionPoll {
                    client: self,
                    uuid: &session_id,
                },
            )
            .await?;
        info!(%session_id, "session succeeded");

        let snark_id = self.create_snark(&session_id).await?;
        let output = self
            .poller
            .run(
                token,
                &mut SnarkPoll {
                    client: self,
                    uuid: &snark_id,
                },
            )
            .await?;
        info!(%snark_id, "snark succeeded");

        self.download_receipt(&output).await
    }
}

#[async_trait]
impl ZkProver for BonsaiClient {
    fn zk_type(&self) -> ZkType {
        ZkType::RiscZero
    }

    async fn prove(&self, token: &CancellationToken, input: Vec<u8>) -> Result<RawProof> {
        let receipt = self.prove_receipt(token, input).await?;
        let proof = groth16_encode(&receipt.inner.groth16().seal);
        Ok(RawProof {
            output: receipt.journal,
            proof,
        })
    }
}

struct SessionPoll<'a> {
    client: &'a BonsaiClient,
    uuid: &'a str,
}

#[async_trait]
impl StatusMachine for SessionPoll<'_> {
    type Status = SessionStatusRes;
    type Output = ();

    async fn fetch(&mut self) -> Result<SessionStatusRes> {
        let url = self.client.url(&format!("sessions/status/{}", self.uuid))?;
        self.client.http.get_json(&url).await
    }

    fn advance(&mut self, status: SessionStatusRes) -> Result<Poll<()>> {
        match JobStatus::parse(&status.status) {
            JobStatus::Succeeded => Ok(Poll::Ready(())),
            JobStatus::Failed(status_str) => Err(ProverError::JobFailed {
                job: "session",
                status: status_str,
                message: status.error_msg.unwrap_or_default(),
            }),
            JobStatus::Running => {
                debug!(
                    session_id = %self.uuid,
                    status = %status.status,
                    state = status.state.as_deref().unwrap_or_default(),
                    elapsed = status.elapsed_time.unwrap_or_default(),
                    "session running"
                );
                Ok(Poll::Pending)
            }
        }
    }
}

struct SnarkPoll<'a> {
    client: &'a BonsaiClient,
    uuid: &'a str,
}

#[async_trait]
impl StatusMachine for SnarkPoll<'_> {
    type Status = SnarkStatusRes;
    type Output = String;

    async fn fetch(&mut self) -> Result<SnarkStatusRes> {
        let url = self.client.url(&format!("snark/status/{}", self.uuid))?;
        self.client.http.get_json(&url).await
    }

    fn advance(&mut self, status: SnarkStatusRes) -> Result<Poll<String>> {
        match JobStatus::parse(&status.status) {
            JobStatus::Succeeded => match status.output.filter(|url| !url.is_empty()) {
                Some(url) => Ok(Poll::Ready(url)),
                None => Err(ProverError::MissingResult("snark job")),
            },
            JobStatus::Failed(status_str) => Err(ProverError::JobFailed {
                job: "snark job",
                status: status_str,
                message: status.error_msg.unwrap_or_default(),
            }),
            JobStatus::Running => {
                debug!(snark_id = %self.uuid, status = %status.status, "snark running");
                Ok(Poll::Pending)
            }
        }
    }
}
