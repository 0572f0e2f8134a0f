//! Canonical content → UI part mapping.

use tracing::debug;

use crate::types::{ContentItem, DataContent, UIPart, DATA_TYPE_PREFIX};

/// Outcome of mapping one content item.
///
/// Content with no UI representation maps to `Unmapped` instead of failing.
#[derive(Debug, Clone, PartialEq)]
pub enum PartMapping {
    Part(UIPart),
    Unmapped,
}

impl PartMapping {
    pub fn into_part(self) -> Option<UIPart> {
        match self {
            Self::Part(part) => Some(part),
            Self::Unmapped => None,
        }
    }

    pub fn is_unmapped(&self) -> bool {
        matches!(self, Self::Unmapped)
    }
}

/// Map a content item to the part stored in a persisted turn.
///
/// Text passes through unless it carries annotations. Image data with a URI
/// becomes a file part and JSON data becomes a data part. Everything else,
/// including function calls and results (the folder handles those), is
/// unmapped.
pub fn to_ui_part(item: &ContentItem) -> PartMapping {
    match item {
        ContentItem::Text { text, annotations } if annotations.is_empty() => {
            PartMapping::Part(UIPart::text(text.clone()))
        }
        ContentItem::Data(data) => data_to_part(data),
        ContentItem::Text { .. }
        | ContentItem::Uri { .. }
        | ContentItem::FunctionCall(_)
        | ContentItem::FunctionResult(_)
        | ContentItem::Usage(_)
        | ContentItem::Reasoning { .. }
        | ContentItem::Error { .. }
        | ContentItem::Unsupported => PartMapping::Unmapped,
    }
}

/// File part for image data with a URI, data part for JSON payloads.
pub fn data_to_part(data: &DataContent) -> PartMapping {
    if data.is_image() {
        if let Some(uri) = data.uri.as_deref().filter(|uri| !uri.is_empty()) {
            return PartMapping::Part(UIPart::File {
                url: uri.to_string(),
                media_type: data.media_type.clone(),
            });
        }
    }

    if data.is_json() {
        match serde_json::from_slice(&data.bytes) {
            Ok(value) => {
                return PartMapping::Part(UIPart::Data {
                    data_type: data_part_type(data.name.as_deref()),
                    data: value,
                });
            }
            Err(e) => debug!(error = %e, name = ?data.name, "dropping undecodable JSON data"),
        }
    }

    PartMapping::Unmapped
}

/// The `data-<name>` tag for a data item's name.
pub fn data_part_type(name: Option<&str>) -> String {
    match name {
        None => format!("{DATA_TYPE_PREFIX}unknown"),
        Some(name) if name.starts_with(DATA_TYPE_PREFIX) => {
            if name.len() > DATA_TYPE_PREFIX.len() {
                name.to_string()
            } else {
                format!("{name}unknown")
            }
        }
        Some(name) => format!("{DATA_TYPE_PREFIX}{name}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn data_part_type_naming() {
        assert_eq!(data_part_type(None), "data-unknown");
        assert_eq!(data_part_type(Some("data-")), "data-unknown");
        assert_eq!(data_part_type(Some("data-weather")), "data-weather");
        assert_eq!(data_part_type(Some("weather")), "data-weather");
    }

    #[test]
    fn annotated_text_is_unmapped() {
        let item = ContentItem::cited("doc", "https://example.com", None);
        assert!(to_ui_part(&item).is_unmapped());
    }

    #[test]
    fn json_data_maps_to_data_part() {
        let item = ContentItem::json_data(Some("chart".into()), &json!({"x": 1}));
        assert_eq!(
            to_ui_part(&item).into_part(),
            Some(UIPart::Data {
                data_type: "data-chart".into(),
                data: json!({"x": 1}),
            })
        );
    }

    #[test]
    fn unsupported_content_is_unmapped() {
        assert!(to_ui_part(&ContentItem::Unsupported).is_unmapped());
        assert!(to_ui_part(&ContentItem::reasoning("hmm")).is_unmapped());
    }
}
