use async_trait::async_trait;
use serde_json::{Map, Value, json};
use std::sync::Arc;
use tracing::{debug, info};

use super::properties::Properties;
use super::traits::{HandlerError, HandlerResult, ResourceHandler};
use super::types::LifecycleEvent;
use crate::aws::ImageLookup;
use crate::images::{
    self, DIRECT_FILTERS, FilterSet, ImageError, ImagePreferences, NameFilter,
};

/// `Custom::FindImage`: locate the best matching machine image.
pub struct FindImageHandler {
    images: Arc<dyn ImageLookup>,
}

impl FindImageHandler {
    pub fn new(images: Arc<dyn ImageLookup>) -> Self {
        Self { images }
    }
}

/// Wrap a scalar into a one-element list; lists must hold scalars.
fn listify(key: &str, value: &Value) -> Result<Vec<String>, HandlerError> {
    let scalar = |value: &Value| match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    };
    let invalid = || HandlerError::type_error(format!("{key} must be a string or a list of strings"));

    match value {
        Value::Array(items) => items.iter().map(|item| scalar(item).ok_or_else(invalid)).collect(),
        other => scalar(other).map(|s| vec![s]).ok_or_else(invalid),
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

fn name_filters(props: &mut Properties<'_>) -> Result<Vec<NameFilter>, HandlerError> {
    let mut filters = Vec::new();
    for (key, field, include) in NameFilter::KEYS {
        let Some(value) = props.take(key) else {
            continue;
        };
        if is_blank(value) {
            continue;
        }
        let patterns = listify(key, value)?;
        filters.push(NameFilter {
            key,
            field,
            include,
            pattern: images::compile_patterns(key, &patterns)?,
        });
    }
    Ok(filters)
}

#[async_trait]
impl ResourceHandler for FindImageHandler {
    async fn handle(&self, event: &LifecycleEvent) -> HandlerResult {
        if event.request_type.is_delete() {
            return Ok(None);
        }

        let mut props = Properties::new(&event.resource_properties);
        let owner = props
            .take_str("Owner")?
            .ok_or_else(|| HandlerError::validation("Owner must be specified"))?;

        let mut filters = FilterSet::new();
        for (property, filter) in DIRECT_FILTERS {
            if let Some(value) = props.take(property) {
                filters.insert(filter.to_string(), listify(property, value)?);
            }
        }
        if let Some(instance_type) = props.take_str("InstanceType")? {
            images::apply_instance_type(instance_type, &mut filters)?;
        }

        let name_filters = name_filters(&mut props)?;
        let preferences = ImagePreferences {
            virtualization_type: props.take_str("PreferredVirtualizationType")?.map(str::to_owned),
            root_device_type: props.take_str("PreferredRootDeviceType")?.map(str::to_owned),
        };

        debug!(owner, ?filters, "Describing images");
        let candidates = self.images.describe_images(owner, &filters).await?;
        if candidates.is_empty() {
            return Err(ImageError::NoImages.into());
        }

        let candidates = images::apply_name_filters(candidates, &name_filters)?;
        let ranked = images::rank(&candidates, &preferences)?;
        info!(owner, image_id = %ranked.best, candidates = ranked.image_ids.len(), "Selected image");

        let mut data = Map::new();
        data.insert("ImageId".to_string(), json!(ranked.best));
        data.insert("MatchingImageIds".to_string(), json!(ranked.image_ids));
        Ok(Some(data))
    }
}
