//! Ordered layer registry owning the active-layer notion.
//!
//! Invariants (hold after every public call):
//! - `layers` is never empty; deleting the last layer is refused.
//! - `active` always names a layer present in `layers`.
//! - Layer ids are unique within the registry.

use crate::color::{DEFAULT_PALETTE, Rgb};
use crate::{ColorMode, Layer, LayerId};
use thiserror::Error;
use tracing::{debug, trace};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("unknown layer `{0}`")]
    UnknownLayer(LayerId),
    #[error("refusing to delete `{0}`: it is the last remaining layer")]
    LastLayer(LayerId),
    #[error("a layer registry needs at least one layer")]
    Empty,
}

/// Knobs supplied by configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryOptions {
    pub palette: Vec<Rgb>,
    /// Prefix for generated labels (`"<prefix> <n>"`).
    pub label_prefix: String,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self {
            palette: DEFAULT_PALETTE.to_vec(),
            label_prefix: "Layer".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerRegistry {
    layers: Vec<Layer>,
    active: LayerId,
    next_seq: u64,
    options: RegistryOptions,
}

impl LayerRegistry {
    /// The three stock layers: Default, Dialogue (active) and Description.
    pub fn with_defaults(names: [&str; 3], options: RegistryOptions) -> Self {
        let colors = [DEFAULT_PALETTE[0], DEFAULT_PALETTE[1], DEFAULT_PALETTE[2]];
        let layers = names
            .iter()
            .zip(colors)
            .enumerate()
            .map(|(i, (name, color))| Layer::new(format!("layer-{i}"), *name, color))
            .collect::<Vec<_>>();
        let active = layers[1].id.clone();
        Self {
            layers,
            active,
            next_seq: 3,
            options: options.sanitized(),
        }
    }

    /// Restore from a saved snapshot. Repeated ids keep their first definition;
    /// a dangling `active` id is repointed to the first layer.
    pub fn from_snapshot(
        layers: Vec<Layer>,
        active: LayerId,
        options: RegistryOptions,
    ) -> Result<Self, RegistryError> {
        let mut unique: Vec<Layer> = Vec::with_capacity(layers.len());
        for layer in layers {
            if unique.iter().any(|l| l.id == layer.id) {
                debug!(target: "layers.registry", layer = %layer.id, "duplicate_layer_dropped");
                continue;
            }
            unique.push(layer);
        }
        let layers = unique;
        let Some(first) = layers.first() else {
            return Err(RegistryError::Empty);
        };
        let active = if layers.iter().any(|l| l.id == active) {
            active
        } else {
            debug!(target: "layers.registry", missing = %active, fallback = %first.id, "active_layer_repointed");
            first.id.clone()
        };
        let next_seq = layers.len() as u64;
        Ok(Self {
            layers,
            active,
            next_seq,
            options: options.sanitized(),
        })
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }
    pub fn len(&self) -> usize {
        self.layers.len()
    }
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
    pub fn get(&self, id: &LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| &l.id == id)
    }
    pub fn contains(&self, id: &LayerId) -> bool {
        self.get(id).is_some()
    }
    pub fn first(&self) -> &Layer {
        &self.layers[0]
    }
    pub fn active_id(&self) -> &LayerId {
        &self.active
    }
    pub fn active(&self) -> &Layer {
        self.get(&self.active).unwrap_or(&self.layers[0])
    }
    pub fn options(&self) -> &RegistryOptions {
        &self.options
    }

    /// Make `id` the active layer. Unknown ids are ignored.
    pub fn set_active(&mut self, id: &LayerId) -> bool {
        if !self.contains(id) {
            debug!(target: "layers.registry", layer = %id, "set_active_unknown_layer");
            return false;
        }
        self.active = id.clone();
        true
    }

    /// Append a layer colored from the palette and make it active.
    pub fn add_layer(&mut self) -> LayerId {
        let count = self.layers.len();
        let color = self.options.palette[count % self.options.palette.len()];
        let name = self.default_label(count);
        let id = self.fresh_id();
        self.layers.push(Layer::new(id.clone(), name, color));
        self.active = id.clone();
        trace!(target: "layers.registry", layer = %id, count = count + 1, "layer_added");
        id
    }

    /// Remove a layer. Returns the fallback (first remaining) layer runs should move to.
    pub fn delete_layer(&mut self, id: &LayerId) -> Result<LayerId, RegistryError> {
        let Some(idx) = self.index_of(id) else {
            return Err(RegistryError::UnknownLayer(id.clone()));
        };
        if self.layers.len() == 1 {
            return Err(RegistryError::LastLayer(id.clone()));
        }
        self.layers.remove(idx);
        let fallback = self.layers[0].id.clone();
        if &self.active == id {
            self.active = fallback.clone();
        }
        trace!(target: "layers.registry", layer = %id, fallback = %fallback, "layer_deleted");
        Ok(fallback)
    }

    pub fn toggle_visibility(&mut self, id: &LayerId) -> bool {
        self.update(id, |l| l.visible = !l.visible)
    }

    pub fn set_color(&mut self, id: &LayerId, color: Rgb) -> bool {
        self.update(id, |l| l.color = color)
    }

    /// Rename a layer; an empty or whitespace-only name falls back to the generated label.
    pub fn rename(&mut self, id: &LayerId, name: &str) -> bool {
        let Some(idx) = self.index_of(id) else {
            return false;
        };
        let trimmed = name.trim();
        self.layers[idx].name = if trimmed.is_empty() {
            self.default_label(idx)
        } else {
            trimmed.to_string()
        };
        true
    }

    pub fn cycle_color_mode(&mut self, id: &LayerId) -> Option<ColorMode> {
        let idx = self.index_of(id)?;
        let layer = &mut self.layers[idx];
        layer.color_mode = layer.color_mode.next();
        Some(layer.color_mode)
    }

    fn update(&mut self, id: &LayerId, f: impl FnOnce(&mut Layer)) -> bool {
        match self.index_of(id) {
            Some(idx) => {
                f(&mut self.layers[idx]);
                true
            }
            None => {
                debug!(target: "layers.registry", layer = %id, "update_unknown_layer");
                false
            }
        }
    }

    fn index_of(&self, id: &LayerId) -> Option<usize> {
        self.layers.iter().position(|l| &l.id == id)
    }

    fn default_label(&self, index: usize) -> String {
        format!("{} {}", self.options.label_prefix, index + 1)
    }

    fn fresh_id(&mut self) -> LayerId {
        loop {
            let candidate = LayerId::new(format!("layer-{}", self.next_seq));
            self.next_seq += 1;
            if !self.contains(&candidate) {
                return candidate;
            }
        }
    }
}

impl RegistryOptions {
    fn sanitized(mut self) -> Self {
        if self.palette.is_empty() {
            self.palette = DEFAULT_PALETTE.to_vec();
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn stock() -> LayerRegistry {
        LayerRegistry::with_defaults(
            ["Default", "Dialogue", "Description"],
            RegistryOptions::default(),
        )
    }

    #[test]
    fn defaults_activate_dialogue() {
        let reg = stock();
        assert_eq!(reg.len(), 3);
        assert_eq!(reg.active_id().as_str(), "layer-1");
        assert_eq!(reg.active().name, "Dialogue");
        assert_eq!(reg.first().color.to_hex(), "#94a3b8");
    }

    #[test]
    fn add_layer_cycles_palette_and_becomes_active() {
        let mut reg = stock();
        let id = reg.add_layer();
        assert_eq!(reg.active_id(), &id);
        let added = reg.get(&id).unwrap();
        assert_eq!(added.name, "Layer 4");
        assert_eq!(added.color, DEFAULT_PALETTE[3]);
        for _ in 0..3 {
            reg.add_layer();
        }
        // seven layers: the seventh wraps back to palette[0]
        assert_eq!(reg.layers()[6].color, DEFAULT_PALETTE[0]);
    }

    #[test]
    fn added_ids_are_unique_after_restore() {
        let layers = vec![
            Layer::new("layer-0", "A", DEFAULT_PALETTE[0]),
            Layer::new("layer-1", "B", DEFAULT_PALETTE[1]),
        ];
        let mut reg =
            LayerRegistry::from_snapshot(layers, LayerId::from("layer-0"), RegistryOptions::default())
                .unwrap();
        reg.delete_layer(&LayerId::from("layer-0")).unwrap();
        let a = reg.add_layer();
        let b = reg.add_layer();
        assert_ne!(a, b);
        assert_ne!(a.as_str(), "layer-1");
    }

    #[test]
    fn delete_active_falls_back_to_first() {
        let mut reg = stock();
        let fallback = reg.delete_layer(&LayerId::from("layer-1")).unwrap();
        assert_eq!(fallback.as_str(), "layer-0");
        assert_eq!(reg.active_id().as_str(), "layer-0");
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn last_layer_cannot_be_deleted() {
        let mut reg = stock();
        reg.delete_layer(&LayerId::from("layer-0")).unwrap();
        reg.delete_layer(&LayerId::from("layer-1")).unwrap();
        let err = reg.delete_layer(&LayerId::from("layer-2")).unwrap_err();
        assert_eq!(err, RegistryError::LastLayer(LayerId::from("layer-2")));
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.active_id().as_str(), "layer-2");
    }

    #[test]
    fn unknown_ids_are_no_ops() {
        let mut reg = stock();
        let before = reg.clone();
        let ghost = LayerId::from("ghost");
        assert!(!reg.toggle_visibility(&ghost));
        assert!(!reg.rename(&ghost, "x"));
        assert!(!reg.set_active(&ghost));
        assert_eq!(reg.cycle_color_mode(&ghost), None);
        assert!(matches!(reg.delete_layer(&ghost), Err(RegistryError::UnknownLayer(_))));
        assert_eq!(reg, before);
    }

    #[test]
    fn empty_rename_uses_generated_label() {
        let mut reg = stock();
        let id = LayerId::from("layer-2");
        assert!(reg.rename(&id, "   "));
        assert_eq!(reg.get(&id).unwrap().name, "Layer 3");
        assert!(reg.rename(&id, " Narration "));
        assert_eq!(reg.get(&id).unwrap().name, "Narration");
    }

    #[test]
    fn snapshot_restore_repoints_missing_active() {
        let layers = vec![Layer::new("a", "A", DEFAULT_PALETTE[0])];
        let reg =
            LayerRegistry::from_snapshot(layers, LayerId::from("gone"), RegistryOptions::default())
                .unwrap();
        assert_eq!(reg.active_id().as_str(), "a");
        assert_eq!(
            LayerRegistry::from_snapshot(vec![], LayerId::from("a"), RegistryOptions::default()),
            Err(RegistryError::Empty)
        );
    }

    #[test]
    fn snapshot_restore_keeps_first_of_duplicate_ids() {
        let layers = vec![
            Layer::new("a", "A", DEFAULT_PALETTE[0]),
            Layer::new("b", "B", DEFAULT_PALETTE[1]),
            Layer::new("a", "Again", DEFAULT_PALETTE[2]),
        ];
        let mut reg = LayerRegistry::from_snapshot(layers, LayerId::from("a"), RegistryOptions::default())
            .unwrap();
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.get(&LayerId::from("a")).unwrap().name, "A");
        assert!(reg.delete_layer(&LayerId::from("a")).is_ok());
        assert!(!reg.contains(&LayerId::from("a")));
    }

    #[test]
    fn visibility_color_and_mode_mutate_in_place() {
        let mut reg = stock();
        let id = LayerId::from("layer-0");
        assert!(reg.toggle_visibility(&id));
        assert!(!reg.get(&id).unwrap().visible);
        assert!(reg.set_color(&id, Rgb::new(1, 2, 3)));
        assert_eq!(reg.get(&id).unwrap().color, Rgb::new(1, 2, 3));
        assert_eq!(reg.cycle_color_mode(&id), Some(ColorMode::TextColor));
    }
}
