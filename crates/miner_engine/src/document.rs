use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{ItemFields, ItemTag};

/// Type directory used when the page has no breadcrumb classification.
pub const UNKNOWN_TYPE: &str = "unknown";

/// The persisted description of one wiki item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDocument {
    pub url_name: String,
    pub url: String,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: Option<String>,
    pub rarity: Option<String>,
    pub tags: Vec<ItemTag>,
    pub images: Vec<String>,
    pub hash: String,
}

impl ItemDocument {
    pub fn new(slug: &str, url: &str, fields: ItemFields) -> Self {
        let hash = content_hash(fields.name.as_deref(), fields.description.as_deref());
        Self {
            url_name: slug.to_string(),
            url: url.to_string(),
            name: fields.name,
            kind: fields.kind.unwrap_or_else(|| UNKNOWN_TYPE.to_string()),
            description: fields.description,
            rarity: fields.rarity,
            tags: fields.tags,
            images: fields.images,
            hash,
        }
    }
}

/// Hex SHA-256 of `name + description`; absent parts contribute nothing.
pub fn content_hash(name: Option<&str>, description: Option<&str>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(name.unwrap_or_default().as_bytes());
    hasher.update(description.unwrap_or_default().as_bytes());
    let digest = hasher.finalize();
    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest.iter() {
        use std::fmt::Write;
        let _ = write!(&mut hex, "{byte:02x}");
    }
    hex
}
