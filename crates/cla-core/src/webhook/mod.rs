//! GitHub webhook intake.
//!
//! ```text
//! raw delivery --verify--> SignatureValidator
//!              --decode--> ClaEvent
//!              --filter--> Option<ReconcileRequest>
//! ```
//!
//! The HTTP server itself lives in the daemon crate.

pub mod error;
pub mod filter;
pub mod payload;
pub mod signature;

pub use error::WebhookError;
pub use filter::{filter, is_trigger_comment};
pub use payload::ClaEvent;
pub use signature::SignatureValidator;

/// Header carrying the event name.
pub const EVENT_HEADER: &str = "x-github-event";

/// Header carrying the HMAC-SHA256 signature.
pub const SIGNATURE_HEADER: &str = "x-hub-signature-256";

/// Header carrying the delivery id.
pub const DELIVERY_HEADER: &str = "x-github-delivery";
