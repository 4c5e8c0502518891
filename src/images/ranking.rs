use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use super::{ImageError, ImageRecord};

/// Soft preferences: they reorder candidates but never remove them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImagePreferences {
    pub virtualization_type: Option<String>,
    pub root_device_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedImages {
    pub best: String,
    pub image_ids: Vec<String>,
}

/// Parse an ISO-8601 creation timestamp; naive values are taken as UTC.
pub fn parse_creation_date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Order images best first: preferred virtualization type, then preferred
/// root device type, then newest. Ties keep their input order.
pub fn rank(images: &[ImageRecord], preferences: &ImagePreferences) -> Result<RankedImages, ImageError> {
    let matches = |preferred: &Option<String>, actual: &str| {
        preferred.as_deref().is_none_or(|p| p == actual)
    };

    let mut keyed = images
        .iter()
        .map(|image| {
            let created = parse_creation_date(&image.creation_date).ok_or_else(|| {
                ImageError::InvalidCreationDate {
                    image_id: image.image_id.clone(),
                    value: image.creation_date.clone(),
                }
            })?;
            let key = (
                matches(&preferences.virtualization_type, &image.virtualization_type),
                matches(&preferences.root_device_type, &image.root_device_type),
                created,
            );
            Ok((key, image.image_id.clone()))
        })
        .collect::<Result<Vec<_>, ImageError>>()?;

    keyed.sort_by(|(a, _), (b, _)| b.cmp(a));

    let image_ids: Vec<String> = keyed.into_iter().map(|(_, id)| id).collect();
    let best = image_ids.first().cloned().ok_or(ImageError::NoImages)?;

    Ok(RankedImages { best, image_ids })
}
