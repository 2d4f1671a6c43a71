// src/submit/mod.rs

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use tracing::warn;

pub const SOAP_CONTENT_TYPE: &str = "application/soap+xml; charset=utf-8";

/// Fixed detail strings that end up in the audit log.
pub const CONNECTION_ERROR_DETAIL: &str = "Error de conexión o timeout";
pub const EMPTY_RESPONSE_DETAIL: &str = "Respuesta vacía";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Status code plus raw body text; nothing in the body is interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoapResponse {
    pub status: u16,
    pub body: String,
}

impl SoapResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Trimmed body for the audit log, or the fixed empty-response marker.
    pub fn error_detail(&self) -> String {
        let trimmed = self.body.trim();
        if trimmed.is_empty() {
            EMPTY_RESPONSE_DETAIL.to_string()
        } else {
            trimmed.to_string()
        }
    }
}

/// Blocking client bound to one endpoint. One POST per row, no retries.
pub struct SoapClient {
    client: Client,
    endpoint: String,
}

impl SoapClient {
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("building HTTP client")?;
        Ok(SoapClient {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// POST one envelope. Every transport-level failure (refused connection,
    /// timeout, DNS, TLS, aborted body read) collapses into `None`; the
    /// caller cannot tell them apart and is not meant to.
    pub fn send(&self, envelope: &str) -> Option<SoapResponse> {
        let result = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, SOAP_CONTENT_TYPE)
            .body(envelope.as_bytes().to_vec())
            .send()
            .and_then(|response| {
                let status = response.status().as_u16();
                response.text().map(|body| SoapResponse { status, body })
            });

        match result {
            Ok(response) => Some(response),
            Err(e) => {
                warn!(endpoint = %self.endpoint, error = %e, "SOAP request got no response");
                None
            }
        }
    }
}
