use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rand::RngCore;
use rand::rngs::OsRng;
use serde_json::{Map, Value, json};

use super::properties::Properties;
use super::traits::{HandlerError, HandlerResult, ResourceHandler};
use super::types::LifecycleEvent;

/// `Custom::SecureRandom`: `Size` bytes from the OS RNG in three encodings.
#[derive(Debug)]
pub struct SecureRandomHandler {
    max_size: usize,
}

impl SecureRandomHandler {
    pub fn new(max_size: usize) -> Self {
        Self { max_size }
    }

    fn parse_size(&self, value: &Value) -> Result<usize, HandlerError> {
        let size = match value {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        };

        let size = size
            .filter(|size| *size > 0)
            .and_then(|size| usize::try_from(size).ok())
            .ok_or_else(|| HandlerError::validation(format!("Invalid size parameter: {value}")))?;

        if size > self.max_size {
            return Err(HandlerError::validation(format!(
                "Size must not exceed {} bytes: {size}",
                self.max_size
            )));
        }
        Ok(size)
    }
}

impl Default for SecureRandomHandler {
    fn default() -> Self {
        Self::new(64 * 1024)
    }
}

#[async_trait]
impl ResourceHandler for SecureRandomHandler {
    async fn handle(&self, event: &LifecycleEvent) -> HandlerResult {
        if event.request_type.is_delete() {
            return Ok(None);
        }

        let mut props = Properties::new(&event.resource_properties);
        let size = props
            .take("Size")
            .ok_or_else(|| HandlerError::validation("Size must be specified"))
            .and_then(|value| self.parse_size(value))?;

        let mut bytes = vec![0u8; size];
        OsRng.fill_bytes(&mut bytes);

        let mut data = Map::new();
        data.insert("Raw".to_string(), json!(bytes.iter().map(|b| char::from(*b)).collect::<String>()));
        data.insert("Hex".to_string(), json!(hex::encode(&bytes)));
        data.insert("Base64".to_string(), json!(STANDARD.encode(&bytes)));
        Ok(Some(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(properties: Value) -> LifecycleEvent {
        serde_json::from_value(json!({
            "RequestType": "Create",
            "ResourceType": "Custom::SecureRandom",
            "ResourceProperties": properties,
            "StackId": "stack",
            "RequestId": "req",
            "LogicalResourceId": "Random",
            "ResponseURL": "http://localhost/cb"
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_encodings_agree() {
        let data = SecureRandomHandler::default()
            .handle(&event(json!({"Size": 16})))
            .await
            .unwrap()
            .unwrap();

        let hex_value = data["Hex"].as_str().unwrap();
        assert_eq!(hex_value.len(), 32);
        assert!(hex_value.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));

        let decoded = STANDARD.decode(data["Base64"].as_str().unwrap()).unwrap();
        assert_eq!(decoded, hex::decode(hex_value).unwrap());

        let raw: Vec<u8> = data["Raw"].as_str().unwrap().chars().map(|c| c as u8).collect();
        assert_eq!(raw, decoded);
    }

    #[tokio::test]
    async fn test_size_may_be_a_string() {
        let data = SecureRandomHandler::default()
            .handle(&event(json!({"Size": " 8 "})))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(data["Hex"].as_str().unwrap().len(), 16);
    }

    #[tokio::test]
    async fn test_invalid_sizes() {
        for (size, expected) in [
            (json!(0), "Invalid size parameter: 0"),
            (json!(-4), "Invalid size parameter: -4"),
            (json!("lots"), r#"Invalid size parameter: "lots""#),
            (json!(1.5), "Invalid size parameter: 1.5"),
        ] {
            let err = SecureRandomHandler::default()
                .handle(&event(json!({"Size": size})))
                .await
                .unwrap_err();
            assert_eq!(err.to_string(), expected);
        }

        let err = SecureRandomHandler::default().handle(&event(json!({}))).await.unwrap_err();
        assert_eq!(err.to_string(), "Size must be specified");
    }

    #[tokio::test]
    async fn test_size_is_capped() {
        let handler = SecureRandomHandler::new(32);
        let data = handler.handle(&event(json!({"Size": 32}))).await.unwrap().unwrap();
        assert_eq!(data["Hex"].as_str().unwrap().len(), 64);

        let err = handler.handle(&event(json!({"Size": 33}))).await.unwrap_err();
        assert_eq!(err.to_string(), "Size must not exceed 32 bytes: 33");

        let err = SecureRandomHandler::default()
            .handle(&event(json!({"Size": 200_000_000_000i64})))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Size must not exceed 65536 bytes: 200000000000");
        assert_eq!(err.kind(), crate::handlers::traits::ErrorKind::Validation);
    }
}
