use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Data returned by a handler on success; `None` means no data.
pub type HandlerOutput = Option<Map<String, Value>>;

/// Properties whose values never appear in logs.
const SECRET_PROPERTIES: &[&str] = &["PlaintextPassword", "CiphertextBase64Password"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestType {
    Create,
    Update,
    Delete,
}

impl RequestType {
    pub fn is_delete(&self) -> bool {
        matches!(self, RequestType::Delete)
    }
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RequestType::Create => "Create",
            RequestType::Update => "Update",
            RequestType::Delete => "Delete",
        };
        f.write_str(name)
    }
}

/// Resource lifecycle event sent by the provisioning control plane
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LifecycleEvent {
    pub request_type: RequestType,
    pub resource_type: String,
    #[serde(default)]
    pub resource_properties: Map<String, Value>,
    pub stack_id: String,
    pub request_id: String,
    pub logical_resource_id: String,
    #[serde(rename = "ResponseURL")]
    pub response_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical_resource_id: Option<String>,
}

impl LifecycleEvent {
    /// Resource properties with secret values masked, for logging.
    pub fn redacted_properties(&self) -> Map<String, Value> {
        self.resource_properties
            .iter()
            .map(|(key, value)| {
                if SECRET_PROPERTIES.contains(&key.as_str()) {
                    (key.clone(), Value::String("****".to_string()))
                } else {
                    (key.clone(), value.clone())
                }
            })
            .collect()
    }
}

/// The five resource types this service implements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    ApiGatewayBinary,
    FindImage,
    GeneratePassword,
    HashPassword,
    SecureRandom,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 5] = [
        ResourceKind::ApiGatewayBinary,
        ResourceKind::FindImage,
        ResourceKind::GeneratePassword,
        ResourceKind::HashPassword,
        ResourceKind::SecureRandom,
    ];

    /// Exact, case-sensitive match on the resource type identifier.
    pub fn from_resource_type(resource_type: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.resource_type() == resource_type)
    }

    pub fn resource_type(&self) -> &'static str {
        match self {
            ResourceKind::ApiGatewayBinary => "Custom::ApiGatewayBinary",
            ResourceKind::FindImage => "Custom::FindImage",
            ResourceKind::GeneratePassword => "Custom::GeneratePassword",
            ResourceKind::HashPassword => "Custom::HashPassword",
            ResourceKind::SecureRandom => "Custom::SecureRandom",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Success,
    Failed,
}

/// Response reported back to the control plane
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResultEnvelope {
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub physical_resource_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, Value>>,
    pub stack_id: String,
    pub request_id: String,
    pub logical_resource_id: String,
}

impl ResultEnvelope {
    pub fn success(event: &LifecycleEvent, physical_resource_id: String, data: Map<String, Value>) -> Self {
        Self {
            status: Status::Success,
            reason: None,
            physical_resource_id,
            data: Some(data),
            stack_id: event.stack_id.clone(),
            request_id: event.request_id.clone(),
            logical_resource_id: event.logical_resource_id.clone(),
        }
    }

    pub fn failure(event: &LifecycleEvent, physical_resource_id: String, reason: String) -> Self {
        Self {
            status: Status::Failed,
            reason: Some(reason),
            physical_resource_id,
            data: None,
            stack_id: event.stack_id.clone(),
            request_id: event.request_id.clone(),
            logical_resource_id: event.logical_resource_id.clone(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }
}
