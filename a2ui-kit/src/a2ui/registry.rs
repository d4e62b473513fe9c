//! A2UI Component Registry
//!
//! Holds the component graph for one response session. Messages are applied
//! in stream order by a single consumer; nothing here is shared between
//! threads or producers.

use std::collections::{BTreeSet, HashMap};

use serde_json::{Map, Value};

use super::message::*;

/// The root pointer set by the most recent `BeginRendering`.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveRoot {
    pub root: ComponentId,
    pub surface_id: Option<String>,
    pub styles: Option<SurfaceStyles>,
}

/// What changed when a message was applied.
#[derive(Debug, Clone, PartialEq)]
pub enum RegistryEvent {
    /// Components were added or overwritten
    ComponentsUpdated { ids: Vec<ComponentId> },
    /// A root became active; a renderer should repaint
    RenderingBegan {
        root: ComponentId,
        surface_id: Option<String>,
    },
    /// Opaque data model keys were written
    DataModelUpdated { keys: Vec<String> },
    /// A named surface was dropped
    SurfaceDeleted { surface_id: String },
}

/// Component graph keyed by id, plus the active root.
///
/// # Example
///
/// ```rust,ignore
/// let mut registry = ComponentRegistry::new();
/// for message in decoder.push(chunk) {
///     if let Some(RegistryEvent::RenderingBegan { .. }) = registry.apply(&message) {
///         repaint(&registry);
///     }
/// }
/// ```
#[derive(Debug, Default, Clone)]
pub struct ComponentRegistry {
    /// Component definitions by ID
    components: HashMap<ComponentId, ComponentNode>,

    /// Set only by `BeginRendering`
    active: Option<ActiveRoot>,

    /// Root ids of named surfaces
    surfaces: HashMap<String, ComponentId>,

    /// Opaque data model contents, last write per key wins
    data_model: Map<String, Value>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one message. `Unrecognized` and `StatusEvent` change nothing.
    pub fn apply(&mut self, message: &ProtocolMessage) -> Option<RegistryEvent> {
        match message {
            ProtocolMessage::SurfaceUpdate(msg) => Some(self.apply_surface_update(msg)),
            ProtocolMessage::BeginRendering(msg) => Some(self.apply_begin_rendering(msg)),
            ProtocolMessage::DataModelUpdate(msg) => Some(self.apply_data_model_update(msg)),
            ProtocolMessage::DeleteSurface(msg) => Some(self.apply_delete_surface(msg)),
            ProtocolMessage::StatusEvent(_) | ProtocolMessage::Unrecognized { .. } => None,
        }
    }

    /// Apply messages in order, collecting the resulting events.
    pub fn apply_all<'a>(
        &mut self,
        messages: impl IntoIterator<Item = &'a ProtocolMessage>,
    ) -> Vec<RegistryEvent> {
        messages
            .into_iter()
            .filter_map(|message| self.apply(message))
            .collect()
    }

    /// Look up a component by id.
    pub fn resolve(&self, id: &str) -> Option<&ComponentNode> {
        self.components.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.components.contains_key(id)
    }

    /// Root to render, set by the most recent `BeginRendering`.
    pub fn active_root(&self) -> Option<&ComponentId> {
        self.active.as_ref().map(|active| &active.root)
    }

    pub fn active(&self) -> Option<&ActiveRoot> {
        self.active.as_ref()
    }

    /// Whether a root is active, i.e. the graph may be shown.
    pub fn is_ready(&self) -> bool {
        self.active.is_some()
    }

    /// Root id of a named surface.
    pub fn surface_root(&self, surface_id: &str) -> Option<&ComponentId> {
        self.surfaces.get(surface_id)
    }

    pub fn data_model(&self) -> &Map<String, Value> {
        &self.data_model
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// All registered ids, sorted, for diagnostics.
    pub fn ids(&self) -> Vec<&ComponentId> {
        let mut ids: Vec<&ComponentId> = self.components.keys().collect();
        ids.sort();
        ids
    }

    /// Child ids referenced somewhere in the graph but never registered.
    pub fn dangling_references(&self) -> BTreeSet<ComponentId> {
        let mut dangling = BTreeSet::new();
        let mut pending: Vec<&ComponentNode> = self.components.values().collect();
        while let Some(node) = pending.pop() {
            for child in node.children() {
                match child {
                    Child::Ref(id) if !self.contains(id.as_str()) => {
                        dangling.insert(id.clone());
                    }
                    Child::Ref(_) => {}
                    Child::Inline(inline) => pending.push(inline),
                }
            }
        }
        dangling
    }

    /// Drop all components, roots and data between sessions.
    pub fn reset(&mut self) {
        self.components.clear();
        self.active = None;
        self.surfaces.clear();
        self.data_model.clear();
    }

    // ========================================================================
    // Private processing methods
    // ========================================================================

    fn apply_surface_update(&mut self, msg: &SurfaceUpdate) -> RegistryEvent {
        let mut updated_ids = Vec::with_capacity(msg.components.len());

        for entry in &msg.components {
            updated_ids.push(entry.id.clone());
            if self
                .components
                .insert(entry.id.clone(), entry.component.clone())
                .is_some()
            {
                ::log::trace!("[A2UI registry] Overwrote component {}", entry.id);
            }
        }

        RegistryEvent::ComponentsUpdated { ids: updated_ids }
    }

    fn apply_begin_rendering(&mut self, msg: &BeginRendering) -> RegistryEvent {
        if let Some(surface_id) = &msg.surface_id {
            self.surfaces.insert(surface_id.clone(), msg.root.clone());
        }

        self.active = Some(ActiveRoot {
            root: msg.root.clone(),
            surface_id: msg.surface_id.clone(),
            styles: msg.styles.clone(),
        });

        RegistryEvent::RenderingBegan {
            root: msg.root.clone(),
            surface_id: msg.surface_id.clone(),
        }
    }

    fn apply_data_model_update(&mut self, msg: &DataModelUpdate) -> RegistryEvent {
        let keys = msg.contents.keys().cloned().collect();
        for (key, value) in &msg.contents {
            self.data_model.insert(key.clone(), value.clone());
        }
        RegistryEvent::DataModelUpdated { keys }
    }

    fn apply_delete_surface(&mut self, msg: &DeleteSurface) -> RegistryEvent {
        self.surfaces.remove(&msg.surface_id);

        let deletes_active = self
            .active
            .as_ref()
            .is_some_and(|active| active.surface_id.as_deref() == Some(msg.surface_id.as_str()));
        if deletes_active {
            self.active = None;
        }

        RegistryEvent::SurfaceDeleted {
            surface_id: msg.surface_id.clone(),
        }
    }
}
