use regex::Regex;
use std::collections::BTreeMap;

use super::{ImageError, ImageRecord};

/// Lookup filters keyed by the service-side filter name.
pub type FilterSet = BTreeMap<String, Vec<String>>;

/// Request properties copied straight into the lookup filters.
pub const DIRECT_FILTERS: &[(&str, &str)] = &[
    ("Architecture", "architecture"),
    ("EnaSupport", "ena-support"),
    ("Platform", "platform"),
    ("RootDeviceType", "root-device-type"),
    ("VirtualizationType", "virtualization-type"),
];

const VIRTUALIZATION_TYPE: &str = "virtualization-type";
const ROOT_DEVICE_TYPE: &str = "root-device-type";
const PARAVIRTUAL: &str = "paravirtual";
const HVM: &str = "hvm";
const EBS: &str = "ebs";

/// Families that only support paravirtualization.
const PV_ONLY_FAMILIES: &[&str] = &["c1", "m1", "m2", "t1"];

/// Families that support both paravirtualization and HVM.
const PV_HVM_FAMILIES: &[&str] = &["c3", "hi1", "hs1", "m3"];

/// Families with instance storage available for the root volume.
const INSTANCE_STORE_FAMILIES: &[&str] = &[
    "c1", "c3", "cc2", "cg1", "cr1", "d2", "g2", "f1", "hi1", "hs1", "i2", "i3", "m1", "m2",
    "m3", "r3", "x1",
];

pub fn instance_family(instance_type: &str) -> &str {
    instance_type
        .split_once('.')
        .map_or(instance_type, |(family, _)| family)
}

/// Narrow the filters to what `instance_type` can actually boot.
pub fn apply_instance_type(instance_type: &str, filters: &mut FilterSet) -> Result<(), ImageError> {
    let family = instance_family(instance_type);

    if PV_ONLY_FAMILIES.contains(&family) {
        require_single(filters, VIRTUALIZATION_TYPE, PARAVIRTUAL).map_err(|_| {
            ImageError::VirtualizationConflict {
                required: PARAVIRTUAL,
                instance_type: instance_type.to_string(),
            }
        })?;
    } else if !PV_HVM_FAMILIES.contains(&family) {
        require_single(filters, VIRTUALIZATION_TYPE, HVM).map_err(|_| {
            ImageError::VirtualizationConflict {
                required: HVM,
                instance_type: instance_type.to_string(),
            }
        })?;
    }

    if !INSTANCE_STORE_FAMILIES.contains(&family) {
        require_single(filters, ROOT_DEVICE_TYPE, EBS).map_err(|_| ImageError::RootDeviceConflict {
            instance_type: instance_type.to_string(),
        })?;
    }

    Ok(())
}

/// Force `key` to exactly `[value]`, failing if it already holds anything else.
fn require_single(filters: &mut FilterSet, key: &str, value: &str) -> Result<(), ()> {
    match filters.get(key) {
        Some(existing) if existing.len() != 1 || existing[0] != value => Err(()),
        _ => {
            filters.insert(key.to_string(), vec![value.to_string()]);
            Ok(())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageField {
    Name,
    Description,
}

/// Include or exclude images whose field matches a pattern.
#[derive(Debug, Clone)]
pub struct NameFilter {
    pub key: &'static str,
    pub field: ImageField,
    pub include: bool,
    pub pattern: Regex,
}

impl NameFilter {
    /// Filters in the order they are applied, paired with their property name.
    pub const KEYS: [(&'static str, ImageField, bool); 4] = [
        ("IncludedDescriptions", ImageField::Description, true),
        ("IncludedNames", ImageField::Name, true),
        ("ExcludedDescriptions", ImageField::Description, false),
        ("ExcludedNames", ImageField::Name, false),
    ];

    fn keeps(&self, image: &ImageRecord) -> bool {
        let text = match self.field {
            ImageField::Name => &image.name,
            ImageField::Description => &image.description,
        };
        self.pattern.is_match(text) == self.include
    }
}

/// Compile a list of patterns into one alternation, matched anywhere.
pub fn compile_patterns(key: &'static str, patterns: &[String]) -> Result<Regex, ImageError> {
    let joined = patterns
        .iter()
        .map(|p| format!("(?:{p})"))
        .collect::<Vec<_>>()
        .join("|");

    Regex::new(&joined).map_err(|e| ImageError::InvalidPattern {
        key,
        message: e.to_string(),
    })
}

pub fn apply_name_filters(
    mut images: Vec<ImageRecord>,
    filters: &[NameFilter],
) -> Result<Vec<ImageRecord>, ImageError> {
    for filter in filters {
        images.retain(|image| filter.keeps(image));
        if images.is_empty() {
            return Err(ImageError::FilterRejectedAll { key: filter.key });
        }
    }
    Ok(images)
}
