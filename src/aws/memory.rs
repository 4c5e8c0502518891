//! In-process collaborators for development and tests

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tokio::sync::RwLock;

use super::{
    ApiManagement, CollaboratorError, EncryptionContext, ImageLookup, KeyManagement, PatchOp,
    unescape_pointer_segment,
};
use crate::images::{FilterSet, ImageRecord};

/// Image catalogue keyed by owner
#[derive(Debug, Default)]
pub struct MemoryImageLookup {
    images: RwLock<Vec<(String, ImageRecord)>>,
}

impl MemoryImageLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, owner: impl Into<String>, image: ImageRecord) {
        self.images.write().await.push((owner.into(), image));
    }

    pub async fn extend(&self, owner: &str, images: impl IntoIterator<Item = ImageRecord>) {
        let mut guard = self.images.write().await;
        guard.extend(images.into_iter().map(|image| (owner.to_string(), image)));
    }
}

fn filter_value(image: &ImageRecord, name: &str) -> Result<Option<String>, CollaboratorError> {
    let value = match name {
        "architecture" => image.architecture.clone(),
        "platform" => image.platform.clone(),
        "ena-support" => image.ena_support.map(|v| v.to_string()),
        "root-device-type" => Some(image.root_device_type.clone()),
        "virtualization-type" => Some(image.virtualization_type.clone()),
        other => {
            return Err(CollaboratorError::new(
                "ec2",
                "DescribeImages",
                format!("The filter '{other}' is invalid"),
            ));
        }
    };
    Ok(value)
}

#[async_trait]
impl ImageLookup for MemoryImageLookup {
    async fn describe_images(
        &self,
        owner: &str,
        filters: &FilterSet,
    ) -> Result<Vec<ImageRecord>, CollaboratorError> {
        let images = self.images.read().await;
        let mut matched = Vec::new();

        'images: for (image_owner, image) in images.iter() {
            if image_owner != owner {
                continue;
            }
            for (name, values) in filters {
                match filter_value(image, name)? {
                    Some(actual) if values.contains(&actual) => {}
                    _ => continue 'images,
                }
            }
            matched.push(image.clone());
        }

        tracing::debug!(owner, matched = matched.len(), "In-memory image lookup");
        Ok(matched)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    key_id: String,
    context: EncryptionContext,
    payload: String,
}

/// Reversible "encryption" that binds ciphertexts to a key id and context.
///
/// Not secret in any way. When keys are registered only those ids are
/// accepted; otherwise every key id is.
#[derive(Debug, Default)]
pub struct MemoryKeyManagement {
    keys: RwLock<BTreeSet<String>>,
}

impl MemoryKeyManagement {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register_key(&self, key_id: impl Into<String>) {
        self.keys.write().await.insert(key_id.into());
    }
}

#[async_trait]
impl KeyManagement for MemoryKeyManagement {
    async fn encrypt(
        &self,
        key_id: &str,
        plaintext: &[u8],
        context: &EncryptionContext,
    ) -> Result<Vec<u8>, CollaboratorError> {
        let keys = self.keys.read().await;
        if !keys.is_empty() && !keys.contains(key_id) {
            return Err(CollaboratorError::new(
                "kms",
                "Encrypt",
                format!("NotFoundException: key {key_id} does not exist"),
            ));
        }

        let envelope = Envelope {
            key_id: key_id.to_string(),
            context: context.clone(),
            payload: STANDARD.encode(plaintext),
        };
        serde_json::to_vec(&envelope).map_err(|e| CollaboratorError::new("kms", "Encrypt", e.to_string()))
    }

    async fn decrypt(
        &self,
        ciphertext: &[u8],
        context: &EncryptionContext,
    ) -> Result<Vec<u8>, CollaboratorError> {
        let invalid = || CollaboratorError::new("kms", "Decrypt", "InvalidCiphertextException");

        let envelope: Envelope = serde_json::from_slice(ciphertext).map_err(|_| invalid())?;
        if &envelope.context != context {
            return Err(invalid());
        }
        STANDARD.decode(envelope.payload).map_err(|_| invalid())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchRecord {
    pub rest_api_id: String,
    pub op: PatchOp,
    pub path: String,
}

/// REST APIs and their binary media types, with a log of every patch
#[derive(Debug, Default)]
pub struct MemoryApiManagement {
    apis: RwLock<BTreeMap<String, Vec<String>>>,
    patches: RwLock<Vec<PatchRecord>>,
}

impl MemoryApiManagement {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create_api(&self, rest_api_id: impl Into<String>, binary_media_types: Vec<String>) {
        self.apis
            .write()
            .await
            .insert(rest_api_id.into(), binary_media_types);
    }

    pub async fn patches(&self) -> Vec<PatchRecord> {
        self.patches.read().await.clone()
    }
}

fn not_found(operation: &'static str, rest_api_id: &str) -> CollaboratorError {
    CollaboratorError::new(
        "apigateway",
        operation,
        format!("NotFoundException: Invalid API identifier specified {rest_api_id}"),
    )
}

#[async_trait]
impl ApiManagement for MemoryApiManagement {
    async fn binary_media_types(&self, rest_api_id: &str) -> Result<Vec<String>, CollaboratorError> {
        self.apis
            .read()
            .await
            .get(rest_api_id)
            .cloned()
            .ok_or_else(|| not_found("GetRestApi", rest_api_id))
    }

    async fn patch_binary_media_types(
        &self,
        rest_api_id: &str,
        op: PatchOp,
        path: &str,
    ) -> Result<(), CollaboratorError> {
        let media_type = path
            .strip_prefix("/binaryMediaTypes/")
            .map(unescape_pointer_segment)
            .ok_or_else(|| {
                CollaboratorError::new("apigateway", "UpdateRestApi", format!("Invalid patch path {path}"))
            })?;

        let mut apis = self.apis.write().await;
        let types = apis
            .get_mut(rest_api_id)
            .ok_or_else(|| not_found("UpdateRestApi", rest_api_id))?;

        match op {
            PatchOp::Add => {
                if !types.contains(&media_type) {
                    types.push(media_type);
                }
            }
            PatchOp::Remove => types.retain(|t| *t != media_type),
        }

        self.patches.write().await.push(PatchRecord {
            rest_api_id: rest_api_id.to_string(),
            op,
            path: path.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aws::ALL_BINARY_MEDIA_PATH;

    fn image(id: &str, virt: &str) -> ImageRecord {
        ImageRecord {
            image_id: id.to_string(),
            name: id.to_string(),
            description: String::new(),
            creation_date: "2020-01-01T00:00:00Z".to_string(),
            virtualization_type: virt.to_string(),
            root_device_type: "ebs".to_string(),
            architecture: Some("x86_64".to_string()),
            platform: None,
            ena_support: Some(true),
        }
    }

    #[tokio::test]
    async fn test_image_lookup_filters_by_owner_and_values() {
        let lookup = MemoryImageLookup::new();
        lookup.extend("amazon", [image("ami-1", "hvm"), image("ami-2", "paravirtual")]).await;
        lookup.insert("someone-else", image("ami-3", "hvm")).await;

        let filters = FilterSet::from([
            ("virtualization-type".to_string(), vec!["hvm".to_string()]),
            ("ena-support".to_string(), vec!["true".to_string()]),
        ]);
        let found = lookup.describe_images("amazon", &filters).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].image_id, "ami-1");

        let platform = FilterSet::from([("platform".to_string(), vec!["windows".to_string()])]);
        assert!(lookup.describe_images("amazon", &platform).await.unwrap().is_empty());

        let bogus = FilterSet::from([("color".to_string(), vec!["red".to_string()])]);
        assert!(lookup.describe_images("amazon", &bogus).await.is_err());
    }

    #[tokio::test]
    async fn test_key_management_binds_context() {
        let kms = MemoryKeyManagement::new();
        let context = EncryptionContext::from([("app".to_string(), "db".to_string())]);

        let blob = kms.encrypt("alias/test", b"hunter2", &context).await.unwrap();
        assert_eq!(kms.decrypt(&blob, &context).await.unwrap(), b"hunter2");
        assert!(kms.decrypt(&blob, &EncryptionContext::new()).await.is_err());
        assert!(kms.decrypt(b"garbage", &context).await.is_err());
    }

    #[tokio::test]
    async fn test_key_management_rejects_unknown_registered_keys() {
        let kms = MemoryKeyManagement::new();
        kms.register_key("alias/known").await;
        assert!(kms.encrypt("alias/other", b"x", &EncryptionContext::new()).await.is_err());
        assert!(kms.encrypt("alias/known", b"x", &EncryptionContext::new()).await.is_ok());
    }

    #[tokio::test]
    async fn test_api_patches_are_logged() {
        let apis = MemoryApiManagement::new();
        apis.create_api("abc123", vec![]).await;

        apis.patch_binary_media_types("abc123", PatchOp::Add, ALL_BINARY_MEDIA_PATH)
            .await
            .unwrap();
        assert_eq!(apis.binary_media_types("abc123").await.unwrap(), ["*/*"]);

        apis.patch_binary_media_types("abc123", PatchOp::Remove, ALL_BINARY_MEDIA_PATH)
            .await
            .unwrap();
        assert!(apis.binary_media_types("abc123").await.unwrap().is_empty());
        assert_eq!(apis.patches().await.len(), 2);

        assert!(apis.binary_media_types("missing").await.is_err());
    }
}
