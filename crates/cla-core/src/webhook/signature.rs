//! HMAC-SHA256 signature validation for GitHub webhooks.
//!
//! GitHub signs each delivery with the shared secret and sends the result in
//! `X-Hub-Signature-256` as `sha256=<hex>`. Comparison is constant time.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::error::WebhookError;

type HmacSha256 = Hmac<Sha256>;

/// HMAC-SHA256 signature validator for GitHub webhooks.
#[derive(Clone)]
pub struct SignatureValidator {
    secret: SecretString,
}

impl SignatureValidator {
    /// Creates a validator for the given shared secret.
    #[must_use]
    pub const fn new(secret: SecretString) -> Self {
        Self { secret }
    }

    /// Verifies `signature_header` against the raw request body.
    ///
    /// # Errors
    ///
    /// Returns [`WebhookError::InvalidSignatureFormat`] for a malformed header
    /// and [`WebhookError::InvalidSignature`] when the HMAC does not match.
    pub fn verify(&self, payload: &[u8], signature_header: &str) -> Result<(), WebhookError> {
        let signature_hex = signature_header
            .strip_prefix("sha256=")
            .ok_or_else(|| WebhookError::InvalidSignatureFormat("missing sha256= prefix".into()))?;

        let expected_signature = hex::decode(signature_hex)
            .map_err(|e| WebhookError::InvalidSignatureFormat(format!("invalid hex: {e}")))?;

        let computed_signature = self.compute_signature(payload)?;

        if computed_signature.ct_eq(&expected_signature).into() {
            Ok(())
        } else {
            tracing::warn!("webhook signature verification failed");
            Err(WebhookError::InvalidSignature)
        }
    }

    /// Returns the `sha256=<hex>` header value for `payload`.
    ///
    /// # Errors
    ///
    /// Returns [`WebhookError::Internal`] if the MAC cannot be keyed.
    pub fn sign(&self, payload: &[u8]) -> Result<String, WebhookError> {
        Ok(format!("sha256={}", hex::encode(self.compute_signature(payload)?)))
    }

    fn compute_signature(&self, payload: &[u8]) -> Result<Vec<u8>, WebhookError> {
        let mut mac = HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .map_err(|e| WebhookError::Internal(format!("hmac key rejected: {e}")))?;
        mac.update(payload);
        Ok(mac.finalize().into_bytes().to_vec())
    }
}

impl std::fmt::Debug for SignatureValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureValidator").finish_non_exhaustive()
    }
}
