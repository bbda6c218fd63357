// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Matter Labs

//! Bonsai REST API types

use serde::{Deserialize, Serialize};

/// Presigned upload slot
#[derive(Debug, Clone, Deserialize)]
pub struct UploadRes {
    /// id of the uploaded object
    pub uuid: String,
    /// presigned PUT URL
    pub url: String,
}

/// Request to execute a guest
#[derive(Debug, Clone, Serialize)]
pub struct SessionCreate<'a> {
    /// image id
    pub img: &'a str,
    /// input id
    pub input: &'a str,
    /// receipt ids the execution may depend on
    pub assumptions: Vec<String>,
    /// run without proving
    pub execute_only: bool,
}

/// Id of a created job
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRes {
    #[allow(missing_docs)]
    pub uuid: String,
}

/// Status of a proving session
#[derive(Debug, Clone, Deserialize)]
pub struct SessionStatusRes {
    /// `RUNNING`, `SUCCEEDED`, `FAILED`, `TIMED_OUT` or `ABORTED`
    pub status: String,
    /// URL of the succinct receipt
    #[serde(default)]
    pub receipt_url: Option<String>,
    /// failure details
    #[serde(default)]
    pub error_msg: Option<String>,
    /// current stage of the session
    #[serde(default)]
    pub state: Option<String>,
    /// seconds the session has been running
    #[serde(default)]
    pub elapsed_time: Option<f64>,
}

/// Request to wrap a session receipt into a SNARK
#[derive(Debug, Clone, Serialize)]
pub struct SnarkReq<'a> {
    #[allow(missing_docs)]
    pub session_id: &'a str,
}

/// Status of a SNARK job
#[derive(Debug, Clone, Deserialize)]
pub struct SnarkStatusRes {
    /// same values as [`SessionStatusRes::status`]
    pub status: String,
    /// URL of the Groth16 receipt
    #[serde(default)]
    pub output: Option<String>,
    /// failure details
    #[serde(default)]
    pub error_msg: Option<String>,
}

/// Job status as understood by the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    /// still working
    Running,
    /// done
    Succeeded,
    /// terminal failure, with the remote status string
    Failed(String),
}

impl JobStatus {
    /// Classify a remote status string, unknown values count as running
    pub fn parse(status: &str) -> Self {
        match status {
            "SUCCEEDED" => JobStatus::Succeeded,
            "FAILED" | "TIMED_OUT" | "ABORTED" => JobStatus::Failed(status.to_string()),
            _ => JobStatus::Running,
        }
    }
}
