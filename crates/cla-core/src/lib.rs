//! cla-core - CLA verification and pull request reconciliation.
//!
//! This crate decides whether every commit author on a pull request has
//! signed the Contributor License Agreement and drives the pull request's
//! labels and guidance comment to match that verdict.
//!
//! # Pipeline
//!
//! ```text
//! ClaEvent (webhook payload)
//!     |
//!     v
//! webhook::filter      -> ReconcileRequest (or ignored)
//!     |
//!     v
//! cla::classify        -> one email per commit
//!     |
//!     v
//! cla::resolve         -> unsigned commits (pass-local signature cache)
//!     |
//!     v
//! cla::reconcile       -> ordered mutations, applied through the forge
//! ```
//!
//! # Modules
//!
//! - [`cla`]: The reconciliation pass and its stages
//! - [`config`]: Per-repository bot configuration and repo filters
//! - [`forge`]: Hosting platform abstraction and the GitHub REST adapter
//! - [`signing`]: CLA signing-status service client
//! - [`webhook`]: Webhook payloads, signature validation, event filtering

pub mod cla;
pub mod config;
pub mod forge;
pub mod signing;
pub mod webhook;

#[cfg(test)]
mod test_support;
