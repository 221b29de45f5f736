//! HTTP signing-status client.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;

use super::{SignatureQueryError, SigningService};

const USER_AGENT: &str = "cla-core/signing-client";

/// Queries a CLA service over HTTP.
///
/// Blocking; see [`crate::forge::GitHubForge`] for the runtime caveat.
pub struct HttpSigningService {
    http_client: Client,
}

impl HttpSigningService {
    /// Creates a client with default timeouts.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new() -> Result<Self, SignatureQueryError> {
        let http_client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { http_client })
    }
}

#[derive(Debug, Default, Deserialize)]
struct SignedData {
    #[serde(default)]
    signed: bool,
}

#[derive(Debug, Default, Deserialize)]
struct SignedResponse {
    #[serde(default)]
    data: SignedData,
}

fn decode_signed(body: &str) -> Result<bool, SignatureQueryError> {
    let response: SignedResponse = serde_json::from_str(body)?;
    Ok(response.data.signed)
}

impl SigningService for HttpSigningService {
    fn is_signed(&self, check_url: &str, email: &str) -> Result<bool, SignatureQueryError> {
        let response = self
            .http_client
            .get(check_url)
            .query(&[("email", email)])
            .send()?;

        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(SignatureQueryError::Status {
                status: status.as_u16(),
                body,
            });
        }

        decode_signed(&body)
    }
}
