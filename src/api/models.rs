//! Response bodies for the HTTP surface.
//!
//! `POST /events` takes a lifecycle event as sent by the provisioning
//! control plane and answers with the [`ResultEnvelope`] that was
//! delivered to its `ResponseURL`:
//!
//! ```json
//! {
//!   "Status": "SUCCESS",
//!   "PhysicalResourceId": "3f1c...",
//!   "Data": { "Hex": "..." },
//!   "StackId": "arn:aws:cloudformation:...",
//!   "RequestId": "...",
//!   "LogicalResourceId": "Random"
//! }
//! ```
//!
//! [`ResultEnvelope`]: crate::handlers::ResultEnvelope

use serde::Serialize;

use crate::handlers::ResultEnvelope;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub backend: String,
}

/// Envelope plus the outcome of delivering it
#[derive(Debug, Serialize)]
pub struct EventResponse {
    #[serde(flatten)]
    pub envelope: ResultEnvelope,
    #[serde(rename = "Delivered")]
    pub delivered: bool,
    #[serde(rename = "DeliveryError", skip_serializing_if = "Option::is_none")]
    pub delivery_error: Option<String>,
}
