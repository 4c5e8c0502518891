use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use super::properties::Properties;
use super::traits::{HandlerError, HandlerResult, ResourceHandler};
use super::types::{LifecycleEvent, RequestType};
use crate::aws::{ALL_BINARY_MEDIA_PATH, ALL_MEDIA_TYPES, ApiManagement, PatchOp};

/// `Custom::ApiGatewayBinary`: enables `*/*` binary media support on a
/// REST API while the resource exists.
pub struct ApiGatewayBinaryHandler {
    apis: Arc<dyn ApiManagement>,
}

impl ApiGatewayBinaryHandler {
    pub fn new(apis: Arc<dyn ApiManagement>) -> Self {
        Self { apis }
    }
}

#[async_trait]
impl ResourceHandler for ApiGatewayBinaryHandler {
    async fn handle(&self, event: &LifecycleEvent) -> HandlerResult {
        let mut props = Properties::new(&event.resource_properties);
        let rest_api_id = props
            .take_str("RestApiId")?
            .ok_or_else(|| HandlerError::validation("RestApiId must be specified"))?;

        let enabled = self
            .apis
            .binary_media_types(rest_api_id)
            .await?
            .iter()
            .any(|media_type| media_type == ALL_MEDIA_TYPES);

        let op = match event.request_type {
            RequestType::Create | RequestType::Update if !enabled => Some(PatchOp::Add),
            RequestType::Delete if enabled => Some(PatchOp::Remove),
            _ => None,
        };

        match op {
            Some(op) => {
                self.apis
                    .patch_binary_media_types(rest_api_id, op, ALL_BINARY_MEDIA_PATH)
                    .await?;
                info!(rest_api_id, %op, "Updated binary media types");
            }
            None => info!(rest_api_id, enabled, "Binary media types already in desired state"),
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aws::memory::MemoryApiManagement;
    use serde_json::json;

    fn event(request_type: &str, properties: serde_json::Value) -> LifecycleEvent {
        serde_json::from_value(json!({
            "RequestType": request_type,
            "ResourceType": "Custom::ApiGatewayBinary",
            "ResourceProperties": properties,
            "StackId": "stack",
            "RequestId": "req",
            "LogicalResourceId": "Binary",
            "ResponseURL": "http://localhost/cb"
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_twice_patches_once() {
        let apis = Arc::new(MemoryApiManagement::new());
        apis.create_api("abc", vec!["image/png".to_string()]).await;
        let handler = ApiGatewayBinaryHandler::new(apis.clone());

        let create = event("Create", json!({"RestApiId": "abc"}));
        assert!(handler.handle(&create).await.unwrap().is_none());
        assert!(handler.handle(&create).await.unwrap().is_none());

        let patches = apis.patches().await;
        assert_eq!(patches.len(), 1);
        assert_eq!(patches[0].op, PatchOp::Add);
        assert_eq!(patches[0].path, "/binaryMediaTypes/*~1*");
        assert!(apis.binary_media_types("abc").await.unwrap().contains(&"*/*".to_string()));
    }

    #[tokio::test]
    async fn test_delete_removes_only_when_present() {
        let apis = Arc::new(MemoryApiManagement::new());
        apis.create_api("abc", vec![]).await;
        let handler = ApiGatewayBinaryHandler::new(apis.clone());

        let delete = event("Delete", json!({"RestApiId": "abc"}));
        handler.handle(&delete).await.unwrap();
        assert!(apis.patches().await.is_empty());

        handler.handle(&event("Update", json!({"RestApiId": "abc"}))).await.unwrap();
        handler.handle(&delete).await.unwrap();

        let ops: Vec<_> = apis.patches().await.into_iter().map(|p| p.op).collect();
        assert_eq!(ops, [PatchOp::Add, PatchOp::Remove]);
    }

    #[tokio::test]
    async fn test_missing_rest_api_id() {
        let handler = ApiGatewayBinaryHandler::new(Arc::new(MemoryApiManagement::new()));
        let err = handler.handle(&event("Create", json!({}))).await.unwrap_err();
        assert_eq!(err.to_string(), "RestApiId must be specified");
    }

    #[tokio::test]
    async fn test_unknown_api_is_collaborator_error() {
        let handler = ApiGatewayBinaryHandler::new(Arc::new(MemoryApiManagement::new()));
        let err = handler
            .handle(&event("Create", json!({"RestApiId": "missing"})))
            .await
            .unwrap_err();
        assert!(matches!(err, HandlerError::Collaborator(_)));
    }
}
