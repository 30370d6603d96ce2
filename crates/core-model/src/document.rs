//! The persisted memo record.

use crate::markup::{self, MarkupError};
use core_layers::{Layer, LayerId, LayerRegistry, RegistryError, RegistryOptions};
use core_state::Session;
use core_text::Body;
use serde::{Deserialize, Serialize};

pub const UNTITLED: &str = "Untitled";

/// Blank titles are stored as `UNTITLED`.
pub(crate) fn title_or_untitled(title: &str) -> &str {
    if title.trim().is_empty() { UNTITLED } else { title }
}

/// One memo as it is written to a store. Keys are camelCase on disk.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredDocument {
    pub id: String,
    pub title: String,
    /// Body serialized as markup.
    pub content: String,
    pub layers: Vec<Layer>,
    pub active_layer_id: LayerId,
    #[serde(default)]
    pub category: Option<String>,
    /// Epoch milliseconds.
    pub created_at: u64,
    pub updated_at: u64,
}

impl StoredDocument {
    /// A fresh document with an empty body.
    pub fn new(id: impl Into<String>, title: &str, layers: &LayerRegistry, now: u64) -> Self {
        let title = title_or_untitled(title);
        Self {
            id: id.into(),
            title: title.to_string(),
            content: markup::serialize(&Body::default()),
            layers: layers.layers().to_vec(),
            active_layer_id: layers.active_id().clone(),
            category: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn body(&self) -> Result<Body, MarkupError> {
        markup::parse(&self.content)
    }

    pub fn registry(&self, options: RegistryOptions) -> Result<LayerRegistry, RegistryError> {
        LayerRegistry::from_snapshot(self.layers.clone(), self.active_layer_id.clone(), options)
    }

    /// Copy the session's body and layer state into this record.
    pub fn capture(&mut self, session: &Session, now: u64) {
        self.content = markup::serialize(session.body());
        self.layers = session.layers().layers().to_vec();
        self.active_layer_id = session.active_layer().clone();
        self.updated_at = now.max(self.created_at);
    }
}
