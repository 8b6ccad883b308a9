//! The display region and the renderer that fills it from search results.

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

pub const EMPTY_PLACEHOLDER: &str = "No image to display";

/// One stored-object reference from the photo index. Only `key` is
/// required; the other index fields are taken in whatever shape they come.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct SearchItem {
    pub key: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub bucket: Option<String>,
    #[serde(default, deserialize_with = "lenient_labels")]
    pub labels: Vec<String>,
    #[serde(default, rename = "createdTimestamp", deserialize_with = "lenient_text")]
    pub created_timestamp: Option<String>,
}

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    })
}

fn lenient_labels<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(values) => values
            .into_iter()
            .filter_map(|value| match value {
                Value::String(label) => Some(label),
                _ => None,
            })
            .collect(),
        Value::String(label) => vec![label],
        _ => Vec::new(),
    })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PresentationClass {
    Big,
    Vertical,
    Horizontal,
}

/// The four equally likely outcomes; `None` means no class.
const CLASS_CHOICES: [Option<PresentationClass>; 4] = [
    Some(PresentationClass::Big),
    Some(PresentationClass::Vertical),
    Some(PresentationClass::Horizontal),
    None,
];

pub fn random_class<R: Rng + ?Sized>(rng: &mut R) -> Option<PresentationClass> {
    CLASS_CHOICES.choose(rng).copied().flatten()
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum GalleryNode {
    Image {
        src: String,
        class: Option<PresentationClass>,
        alt: String,
    },
    Text {
        text: String,
    },
}

/// Ordered children of the display region.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Gallery {
    nodes: Vec<GalleryNode>,
}

impl Gallery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nodes(&self) -> &[GalleryNode] {
        &self.nodes
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    pub fn push(&mut self, node: GalleryNode) {
        self.nodes.push(node);
    }
}

#[cfg(test)]
impl Gallery {
    pub(crate) fn image_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| matches!(node, GalleryNode::Image { .. }))
            .count()
    }

    pub(crate) fn is_placeholder(&self) -> bool {
        matches!(self.nodes.as_slice(), [GalleryNode::Text { text }] if text == EMPTY_PLACEHOLDER)
    }
}

/// Decodes the `body` string of a search response. Anything that is not a
/// JSON array counts as no results; array entries without a string `key`
/// are skipped.
pub fn parse_search_body(body: Option<&str>) -> Vec<SearchItem> {
    let Some(body) = body else {
        warn!("search response carried no body; showing no results");
        return Vec::new();
    };
    let documents = match serde_json::from_str::<Vec<Value>>(body) {
        Ok(documents) => documents,
        Err(err) => {
            warn!(error = %err, "error parsing search response body");
            return Vec::new();
        }
    };
    documents
        .into_iter()
        .filter_map(|document| match serde_json::from_value::<SearchItem>(document) {
            Ok(item) => Some(item),
            Err(err) => {
                warn!(error = %err, "skipping search result without a usable key");
                None
            }
        })
        .collect()
}

/// Object name after the last `/` of a key.
pub fn object_name(key: &str) -> &str {
    key.rsplit_once('/').map_or(key, |(_, name)| name)
}

pub fn image_source(storage_base_url: &str, key: &str) -> String {
    format!(
        "{}/{}",
        storage_base_url.trim_end_matches('/'),
        object_name(key)
    )
}

/// Replaces the region's children with one image per item, or the
/// placeholder text when there are none.
pub fn render_results<R: Rng + ?Sized>(
    region: &mut Gallery,
    items: &[SearchItem],
    storage_base_url: &str,
    rng: &mut R,
) {
    region.clear();
    if items.is_empty() {
        region.push(GalleryNode::Text {
            text: EMPTY_PLACEHOLDER.to_string(),
        });
        return;
    }
    for item in items {
        region.push(GalleryNode::Image {
            src: image_source(storage_base_url, &item.key),
            class: random_class(rng),
            alt: item.labels.join(", "),
        });
    }
}
