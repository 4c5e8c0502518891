//! Machine image selection: request filters, name/description pattern
//! filters and preference ranking.

mod filters;
mod ranking;

pub use filters::{
    DIRECT_FILTERS, FilterSet, ImageField, NameFilter, apply_instance_type, apply_name_filters,
    compile_patterns, instance_family,
};
pub use ranking::{ImagePreferences, RankedImages, parse_creation_date, rank};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Image attributes returned by the image lookup collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ImageRecord {
    pub image_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub creation_date: String,
    pub virtualization_type: String,
    pub root_device_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub architecture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ena_support: Option<bool>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImageError {
    #[error("No AMIs found that match the filters applied.")]
    NoImages,

    #[error("No AMIs found that passed the {key} filter")]
    FilterRejectedAll { key: &'static str },

    #[error("Invalid regular expression in {key}: {message}")]
    InvalidPattern { key: &'static str, message: String },

    #[error("VirtualizationType must be {required} for {instance_type} instance types")]
    VirtualizationConflict {
        required: &'static str,
        instance_type: String,
    },

    #[error("RootDeviceType must be ebs for {instance_type} instance types")]
    RootDeviceConflict { instance_type: String },

    #[error("Invalid CreationDate for image {image_id}: {value}")]
    InvalidCreationDate { image_id: String, value: String },
}

impl ImageError {
    /// True when the error means no candidate survived selection.
    pub fn is_no_match(&self) -> bool {
        matches!(self, ImageError::NoImages | ImageError::FilterRejectedAll { .. })
    }
}
