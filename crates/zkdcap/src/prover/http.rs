// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Matter Labs

//! HTTP client shared by the proving backends

use crate::prover::error::{ProverError, Result};
use reqwest::{header::HeaderMap, Client, Response};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use tracing::trace;
use url::Url;

/// Client for making HTTP requests
///
/// Cloning is cheap, clones share the connection pool.
#[derive(Clone, Debug)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a new HTTP client with a per request timeout and default headers
    pub fn new(timeout: Duration, headers: HeaderMap) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self { client })
    }

    /// POST a JSON body and parse the JSON response
    pub async fn post_json<T: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        url: &Url,
        body: &T,
    ) -> Result<R> {
        trace!(%url, "POST");
        let response = self.client.post(url.clone()).json(body).send().await?;
        let body = Self::handle_response(response).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// GET and parse the JSON response
    pub async fn get_json<R: DeserializeOwned>(&self, url: &Url) -> Result<R> {
        let body = self.get_bytes(url).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// GET the raw response body
    pub async fn get_bytes(&self, url: &Url) -> Result<Vec<u8>> {
        trace!(%url, "GET");
        let response = self.client.get(url.clone()).send().await?;
        Self::handle_response(response).await
    }

    /// PUT a raw body, typically to a presigned upload URL
    pub async fn put(&self, url: &Url, body: Vec<u8>) -> Result<()> {
        trace!(%url, len = body.len(), "PUT");
        let response = self.client.put(url.clone()).body(body).send().await?;
        Self::handle_response(response).await?;
        Ok(())
    }

    /// Map a non-success status to an error carrying the body
    async fn handle_response(response: Response) -> Result<Vec<u8>> {
        let status = response.status();
        let body = response.bytes().await?;

        if status.is_success() {
            Ok(body.to_vec())
        } else {
            Err(ProverError::Http {
                status_code: status.as_u16(),
                message: String::from_utf8_lossy(&body).into_owned(),
            })
        }
    }
}
