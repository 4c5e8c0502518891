//! Collaborators backed by the AWS SDK

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_apigateway::types::{Op, PatchOperation};
use aws_sdk_ec2::error::DisplayErrorContext;
use aws_sdk_ec2::types::Filter;
use aws_sdk_kms::primitives::Blob;
use std::collections::HashMap;
use std::sync::Arc;

use super::{
    ApiManagement, Backends, CollaboratorError, EncryptionContext, ImageLookup, KeyManagement,
    PatchOp,
};
use crate::images::{FilterSet, ImageRecord};

/// Build every collaborator from the default credential and region chain.
pub async fn load(region: Option<String>) -> Backends {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(region) = region {
        loader = loader.region(Region::new(region));
    }
    let shared = loader.load().await;
    tracing::info!(region = ?shared.region(), "Using AWS collaborators");

    Backends::new(
        Arc::new(Ec2ImageLookup {
            client: aws_sdk_ec2::Client::new(&shared),
        }),
        Arc::new(KmsKeyManagement {
            client: aws_sdk_kms::Client::new(&shared),
        }),
        Arc::new(ApiGatewayManagement {
            client: aws_sdk_apigateway::Client::new(&shared),
        }),
    )
}

fn sdk_error<E>(service: &'static str, operation: &'static str, err: E) -> CollaboratorError
where
    E: std::error::Error,
{
    CollaboratorError::new(service, operation, DisplayErrorContext(&err).to_string())
}

fn context_map(context: &EncryptionContext) -> Option<HashMap<String, String>> {
    (!context.is_empty()).then(|| context.clone().into_iter().collect())
}

pub struct Ec2ImageLookup {
    client: aws_sdk_ec2::Client,
}

#[async_trait]
impl ImageLookup for Ec2ImageLookup {
    async fn describe_images(
        &self,
        owner: &str,
        filters: &FilterSet,
    ) -> Result<Vec<ImageRecord>, CollaboratorError> {
        let filters: Vec<Filter> = filters
            .iter()
            .map(|(name, values)| {
                Filter::builder()
                    .name(name)
                    .set_values(Some(values.clone()))
                    .build()
            })
            .collect();

        let output = self
            .client
            .describe_images()
            .owners(owner)
            .set_filters(Some(filters))
            .send()
            .await
            .map_err(|e| sdk_error("ec2", "DescribeImages", e))?;

        let images = output
            .images()
            .iter()
            .filter_map(|image| {
                Some(ImageRecord {
                    image_id: image.image_id()?.to_string(),
                    name: image.name().unwrap_or_default().to_string(),
                    description: image.description().unwrap_or_default().to_string(),
                    creation_date: image.creation_date()?.to_string(),
                    virtualization_type: image.virtualization_type()?.as_str().to_string(),
                    root_device_type: image.root_device_type()?.as_str().to_string(),
                    architecture: image.architecture().map(|a| a.as_str().to_string()),
                    platform: image.platform().map(|p| p.as_str().to_string()),
                    ena_support: image.ena_support(),
                })
            })
            .collect();

        Ok(images)
    }
}

pub struct KmsKeyManagement {
    client: aws_sdk_kms::Client,
}

#[async_trait]
impl KeyManagement for KmsKeyManagement {
    async fn encrypt(
        &self,
        key_id: &str,
        plaintext: &[u8],
        context: &EncryptionContext,
    ) -> Result<Vec<u8>, CollaboratorError> {
        let output = self
            .client
            .encrypt()
            .key_id(key_id)
            .plaintext(Blob::new(plaintext))
            .set_encryption_context(context_map(context))
            .send()
            .await
            .map_err(|e| sdk_error("kms", "Encrypt", e))?;

        output
            .ciphertext_blob()
            .map(|blob| blob.as_ref().to_vec())
            .ok_or_else(|| CollaboratorError::new("kms", "Encrypt", "response had no ciphertext"))
    }

    async fn decrypt(
        &self,
        ciphertext: &[u8],
        context: &EncryptionContext,
    ) -> Result<Vec<u8>, CollaboratorError> {
        let output = self
            .client
            .decrypt()
            .ciphertext_blob(Blob::new(ciphertext))
            .set_encryption_context(context_map(context))
            .send()
            .await
            .map_err(|e| sdk_error("kms", "Decrypt", e))?;

        output
            .plaintext()
            .map(|blob| blob.as_ref().to_vec())
            .ok_or_else(|| CollaboratorError::new("kms", "Decrypt", "response had no plaintext"))
    }
}

pub struct ApiGatewayManagement {
    client: aws_sdk_apigateway::Client,
}

#[async_trait]
impl ApiManagement for ApiGatewayManagement {
    async fn binary_media_types(&self, rest_api_id: &str) -> Result<Vec<String>, CollaboratorError> {
        let output = self
            .client
            .get_rest_api()
            .rest_api_id(rest_api_id)
            .send()
            .await
            .map_err(|e| sdk_error("apigateway", "GetRestApi", e))?;

        Ok(output.binary_media_types().to_vec())
    }

    async fn patch_binary_media_types(
        &self,
        rest_api_id: &str,
        op: PatchOp,
        path: &str,
    ) -> Result<(), CollaboratorError> {
        let op = match op {
            PatchOp::Add => Op::Add,
            PatchOp::Remove => Op::Remove,
        };

        self.client
            .update_rest_api()
            .rest_api_id(rest_api_id)
            .patch_operations(PatchOperation::builder().op(op).path(path).build())
            .send()
            .await
            .map_err(|e| sdk_error("apigateway", "UpdateRestApi", e))?;

        Ok(())
    }
}
