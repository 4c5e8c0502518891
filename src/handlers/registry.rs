use serde_json::Value;
use std::any::Any;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::api_gateway::ApiGatewayBinaryHandler;
use super::find_image::FindImageHandler;
use super::generate_password::GeneratePasswordHandler;
use super::hash_password::HashPasswordHandler;
use super::secure_random::SecureRandomHandler;
use super::traits::{HandlerError, ResourceHandler};
use super::types::{LifecycleEvent, ResourceKind, ResultEnvelope};
use crate::aws::Backends;
use crate::callback::{CallbackError, ResponseSink};
use crate::observability::Metrics;

/// Settings shared by the built-in handlers
#[derive(Debug, Clone, Copy)]
pub struct HandlerSettings {
    pub default_entropy: u32,
    pub max_random_bytes: usize,
}

impl Default for HandlerSettings {
    fn default() -> Self {
        Self {
            default_entropy: 48,
            max_random_bytes: 64 * 1024,
        }
    }
}

/// One handler instance per [`ResourceKind`]
#[derive(Clone)]
pub struct ResourceHandlers {
    api_gateway_binary: Arc<dyn ResourceHandler>,
    find_image: Arc<dyn ResourceHandler>,
    generate_password: Arc<dyn ResourceHandler>,
    hash_password: Arc<dyn ResourceHandler>,
    secure_random: Arc<dyn ResourceHandler>,
}

impl ResourceHandlers {
    pub fn new(backends: &Backends, settings: HandlerSettings) -> Self {
        Self {
            api_gateway_binary: Arc::new(ApiGatewayBinaryHandler::new(backends.apis.clone())),
            find_image: Arc::new(FindImageHandler::new(backends.images.clone())),
            generate_password: Arc::new(GeneratePasswordHandler::new(
                backends.keys.clone(),
                settings.default_entropy,
            )),
            hash_password: Arc::new(HashPasswordHandler::new(backends.keys.clone())),
            secure_random: Arc::new(SecureRandomHandler::new(settings.max_random_bytes)),
        }
    }

    pub fn get(&self, kind: ResourceKind) -> Arc<dyn ResourceHandler> {
        match kind {
            ResourceKind::ApiGatewayBinary => self.api_gateway_binary.clone(),
            ResourceKind::FindImage => self.find_image.clone(),
            ResourceKind::GeneratePassword => self.generate_password.clone(),
            ResourceKind::HashPassword => self.hash_password.clone(),
            ResourceKind::SecureRandom => self.secure_random.clone(),
        }
    }
}

/// Result of processing one event: the envelope and how its delivery went
#[derive(Debug)]
pub struct Outcome {
    pub envelope: ResultEnvelope,
    pub delivery: Result<(), CallbackError>,
}

/// Routes lifecycle events to handlers and always produces an envelope
#[derive(Clone)]
pub struct Dispatcher {
    handlers: Arc<ResourceHandlers>,
    sink: Arc<dyn ResponseSink>,
    metrics: Arc<Metrics>,
}

impl Dispatcher {
    pub fn new(handlers: ResourceHandlers, sink: Arc<dyn ResponseSink>, metrics: Arc<Metrics>) -> Self {
        Self {
            handlers: Arc::new(handlers),
            sink,
            metrics,
        }
    }

    /// Run the matching handler and normalize its result into an envelope.
    /// Handler errors and panics become FAILED envelopes.
    pub async fn dispatch(&self, event: &LifecycleEvent) -> ResultEnvelope {
        let result = match ResourceKind::from_resource_type(&event.resource_type) {
            None => Err(HandlerError::UnknownResourceType(event.resource_type.clone())),
            Some(kind) => {
                let handler = self.handlers.get(kind);
                let owned = event.clone();
                match tokio::spawn(async move { handler.handle(&owned).await }).await {
                    Ok(result) => result,
                    Err(join) if join.is_panic() => {
                        Err(HandlerError::Internal(panic_message(join.into_panic())))
                    }
                    Err(join) => Err(HandlerError::Internal(join.to_string())),
                }
            }
        };

        match result {
            Ok(data) => {
                let mut data = data.unwrap_or_default();
                let physical_resource_id = match data.remove("PhysicalResourceId") {
                    Some(Value::String(id)) => id,
                    Some(other) => other.to_string(),
                    None => physical_resource_id(event),
                };
                ResultEnvelope::success(event, physical_resource_id, data)
            }
            Err(err) => {
                error!(
                    resource_type = %event.resource_type,
                    request_id = %event.request_id,
                    logical_resource_id = %event.logical_resource_id,
                    kind = ?err.kind(),
                    error = %err,
                    "Handler failed"
                );
                ResultEnvelope::failure(event, physical_resource_id(event), err.to_string())
            }
        }
    }

    /// Dispatch the event and deliver the envelope to its response URL.
    pub async fn handle(&self, event: &LifecycleEvent) -> Outcome {
        self.metrics.event_received();
        info!(
            request_type = %event.request_type,
            resource_type = %event.resource_type,
            request_id = %event.request_id,
            logical_resource_id = %event.logical_resource_id,
            "Received event"
        );
        debug!(properties = ?event.redacted_properties(), "Event properties");

        let envelope = self.dispatch(event).await;
        if envelope.is_success() {
            self.metrics.event_succeeded();
        } else {
            self.metrics.event_failed();
        }
        debug!(
            status = ?envelope.status,
            physical_resource_id = %envelope.physical_resource_id,
            data_keys = ?envelope.data.as_ref().map(|d| d.keys().collect::<Vec<_>>()),
            "Built envelope"
        );

        let delivery = self.sink.deliver(&event.response_url, &envelope).await;
        match &delivery {
            Ok(()) => self.metrics.callback_delivered(),
            Err(err) => {
                self.metrics.callback_failed();
                warn!(request_id = %event.request_id, error = %err, "Failed to deliver response");
            }
        }

        Outcome { envelope, delivery }
    }
}

fn physical_resource_id(event: &LifecycleEvent) -> String {
    event
        .physical_resource_id
        .clone()
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    let detail = panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    format!("Handler panicked: {detail}")
}
