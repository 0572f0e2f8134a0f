//! Structured tool results, as returned by MCP-style tools.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A tool result made of content blocks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CallToolResult {
    pub content: Vec<ContentBlock>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    Image {
        data: String,
        #[serde(rename = "mimeType")]
        mime_type: String,
    },
    /// A resource embedded inline.
    Resource { resource: ResourceContents },
    /// A link to a resource the tool did not inline.
    ResourceLink {
        uri: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(default, rename = "mimeType", skip_serializing_if = "Option::is_none")]
        mime_type: Option<String>,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceContents {
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blob: Option<String>,
}

/// A resource referenced by a tool result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceReference {
    pub uri: String,
    pub title: Option<String>,
}

impl CallToolResult {
    /// Interpret an arbitrary tool result payload.
    ///
    /// Accepts a full result object or a single content block; returns `None`
    /// for anything else.
    pub fn from_value(value: &Value) -> Option<Self> {
        if let Ok(result) = serde_json::from_value::<CallToolResult>(value.clone()) {
            return Some(result);
        }
        match serde_json::from_value::<ContentBlock>(value.clone()) {
            Ok(ContentBlock::Other) | Err(_) => None,
            Ok(block) => Some(Self {
                content: vec![block],
                is_error: false,
            }),
        }
    }

    /// Embedded text resources and resource links, in block order.
    pub fn references(&self) -> Vec<ResourceReference> {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Resource { resource }
                    if resource.text.is_some() && !resource.uri.is_empty() =>
                {
                    Some(ResourceReference {
                        uri: resource.uri.clone(),
                        title: None,
                    })
                }
                ContentBlock::ResourceLink { uri, name, .. } if !uri.is_empty() => {
                    Some(ResourceReference {
                        uri: uri.clone(),
                        title: name.clone(),
                    })
                }
                _ => None,
            })
            .collect()
    }
}
