//! A2UI wire types
//!
//! Rust types for the A2UI protocol messages carried on a JSONL stream.
//! Decoding goes through [`super::decoder`], which never fails outward;
//! these types define the shapes it accepts and how messages re-serialize
//! onto the wire (one self-contained JSON line per message).

use std::borrow::Borrow;
use std::fmt;

use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use super::value::StringValue;

/// Top-level keys recognized on the wire.
pub const SURFACE_UPDATE_KEY: &str = "surfaceUpdate";
pub const DATA_MODEL_UPDATE_KEY: &str = "dataModelUpdate";
pub const BEGIN_RENDERING_KEY: &str = "beginRendering";
pub const DELETE_SURFACE_KEY: &str = "deleteSurface";
/// Reserved key marking an out-of-band status event.
pub const META_KEY: &str = "_meta";

/// Lenient f64 deserializer: accepts numbers, ignores other types.
fn lenient_f64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    let val = Option::<Value>::deserialize(d)?.and_then(|v| v.as_f64());
    Ok(val)
}

// ============================================================================
// Component identifiers
// ============================================================================

/// Returned when a component id would be empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("component id must not be empty")]
pub struct EmptyComponentId;

/// A caller-chosen, non-empty string naming one node in the component graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ComponentId(String);

impl ComponentId {
    /// Create a component id, rejecting the empty string.
    pub fn new(id: impl Into<String>) -> Result<Self, EmptyComponentId> {
        let id = id.into();
        if id.is_empty() {
            return Err(EmptyComponentId);
        }
        Ok(ComponentId(id))
    }

    /// Id from a literal known to be non-empty.
    pub(crate) fn fixed(id: &'static str) -> ComponentId {
        debug_assert!(!id.is_empty());
        ComponentId(id.to_string())
    }

    /// Derive a new id by appending a suffix. Never empty.
    pub fn with_suffix(&self, suffix: &str) -> ComponentId {
        ComponentId(format!("{}{}", self.0, suffix))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ComponentId {
    type Error = EmptyComponentId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        ComponentId::new(value)
    }
}

impl From<ComponentId> for String {
    fn from(id: ComponentId) -> Self {
        id.0
    }
}

impl Borrow<str> for ComponentId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ComponentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for ComponentId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ComponentId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

// ============================================================================
// Protocol messages
// ============================================================================

/// One decoded A2UI record. Exactly one variant per message.
#[derive(Debug, Clone, PartialEq)]
pub enum ProtocolMessage {
    /// Add or overwrite components by id
    SurfaceUpdate(SurfaceUpdate),

    /// Opaque data model contents
    DataModelUpdate(DataModelUpdate),

    /// Activate a root component
    BeginRendering(BeginRendering),

    /// Drop a named surface
    DeleteSurface(DeleteSurface),

    /// Out-of-band orchestration signal, never part of the graph
    StatusEvent(StatusEvent),

    /// A record that failed to decode, kept for diagnostics
    Unrecognized { raw: String },
}

impl ProtocolMessage {
    /// Build a `SurfaceUpdate` on the primary surface.
    pub fn surface_update(components: Vec<ComponentEntry>) -> Self {
        ProtocolMessage::SurfaceUpdate(SurfaceUpdate {
            surface_id: None,
            components,
        })
    }

    /// Build a `BeginRendering` for the primary surface.
    pub fn begin_rendering(root: ComponentId) -> Self {
        ProtocolMessage::BeginRendering(BeginRendering {
            root,
            surface_id: None,
            styles: None,
        })
    }

    /// Build an empty `DataModelUpdate`.
    pub fn empty_data_model() -> Self {
        ProtocolMessage::DataModelUpdate(DataModelUpdate::default())
    }

    /// Build a status event.
    pub fn status(tag: impl Into<String>, payload: Map<String, Value>) -> Self {
        ProtocolMessage::StatusEvent(StatusEvent {
            tag: tag.into(),
            payload,
        })
    }

    /// Wire name of this message kind, for logging.
    pub fn kind_name(&self) -> &'static str {
        match self {
            ProtocolMessage::SurfaceUpdate(_) => SURFACE_UPDATE_KEY,
            ProtocolMessage::DataModelUpdate(_) => DATA_MODEL_UPDATE_KEY,
            ProtocolMessage::BeginRendering(_) => BEGIN_RENDERING_KEY,
            ProtocolMessage::DeleteSurface(_) => DELETE_SURFACE_KEY,
            ProtocolMessage::StatusEvent(_) => META_KEY,
            ProtocolMessage::Unrecognized { .. } => "unrecognized",
        }
    }

    pub fn is_unrecognized(&self) -> bool {
        matches!(self, ProtocolMessage::Unrecognized { .. })
    }

    /// Unrecognized text that never looked like a structured record.
    pub fn is_noise(&self) -> bool {
        match self {
            ProtocolMessage::Unrecognized { raw } => !looks_structured(raw),
            _ => false,
        }
    }

    /// Serialize to a single self-contained JSON line (no trailing newline).
    pub fn to_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Whether a record starts like a JSON object or array once trimmed.
pub(crate) fn looks_structured(record: &str) -> bool {
    let trimmed = record.trim_start();
    trimmed.starts_with('{') || trimmed.starts_with('[')
}

impl Serialize for ProtocolMessage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ProtocolMessage::SurfaceUpdate(m) => single_entry(serializer, SURFACE_UPDATE_KEY, m),
            ProtocolMessage::DataModelUpdate(m) => {
                single_entry(serializer, DATA_MODEL_UPDATE_KEY, m)
            }
            ProtocolMessage::BeginRendering(m) => single_entry(serializer, BEGIN_RENDERING_KEY, m),
            ProtocolMessage::DeleteSurface(m) => single_entry(serializer, DELETE_SURFACE_KEY, m),
            ProtocolMessage::StatusEvent(event) => {
                let mut map = serializer.serialize_map(Some(event.payload.len() + 1))?;
                map.serialize_entry(META_KEY, &event.tag)?;
                for (key, value) in &event.payload {
                    if key != META_KEY {
                        map.serialize_entry(key, value)?;
                    }
                }
                map.end()
            }
            // A JSON string keeps the raw text on one line and never decodes
            // back into a structured message.
            ProtocolMessage::Unrecognized { raw } => serializer.serialize_str(raw),
        }
    }
}

fn single_entry<S: Serializer, T: Serialize>(
    serializer: S,
    key: &str,
    value: &T,
) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(1))?;
    map.serialize_entry(key, value)?;
    map.end()
}

/// Adds components to the graph, overwriting entries with the same id.
///
/// ```text
/// {"surfaceUpdate": {"components": [
///     {"id": "main_root", "component": {"Column": {"children": {"explicitList": ["header"]}}}}
/// ]}}
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurfaceUpdate {
    /// Target surface ID, the primary surface when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surface_id: Option<String>,

    #[serde(default)]
    pub components: Vec<ComponentEntry>,
}

/// One node of the flat component list, addressed by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentEntry {
    /// Unique within a registry; a repeat overwrites
    pub id: ComponentId,

    /// Share of space inside a Row or Column
    #[serde(
        default,
        deserialize_with = "lenient_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub weight: Option<f64>,

    /// The component kind and properties
    pub component: ComponentNode,
}

impl ComponentEntry {
    pub fn new(id: ComponentId, component: ComponentNode) -> Self {
        ComponentEntry {
            id,
            weight: None,
            component,
        }
    }
}

/// Opaque data model contents.
///
/// Both the object form and the v0.8 list form are accepted:
///
/// ```text
/// {"dataModelUpdate": {"contents": {"name": "Alice"}}}
/// {"dataModelUpdate": {"contents": [{"key": "name", "valueString": "Alice"}]}}
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataModelUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surface_id: Option<String>,

    /// Base path for updates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(default, deserialize_with = "contents_map")]
    pub contents: Map<String, Value>,
}

fn contents_map<'de, D: Deserializer<'de>>(d: D) -> Result<Map<String, Value>, D::Error> {
    normalize_contents(Value::deserialize(d)?).map_err(D::Error::custom)
}

/// Fold either contents form into a single key/value mapping.
fn normalize_contents(value: Value) -> Result<Map<String, Value>, String> {
    match value {
        Value::Null => Ok(Map::new()),
        Value::Object(map) => Ok(map),
        Value::Array(items) => {
            let mut map = Map::new();
            for item in items {
                let Value::Object(mut entry) = item else {
                    return Err("data model entry must be an object".to_string());
                };
                let Some(Value::String(key)) = entry.remove("key") else {
                    return Err("data model entry is missing its key".to_string());
                };
                let value = match entry.into_iter().next() {
                    Some((kind, Value::Array(nested))) if kind == "valueMap" => {
                        Value::Object(normalize_contents(Value::Array(nested))?)
                    }
                    Some((_, value)) => value,
                    None => Value::Null,
                };
                map.insert(key, value);
            }
            Ok(map)
        }
        other => Err(format!("unsupported data model contents: {other}")),
    }
}

/// Makes a component the root to render.
///
/// ```text
/// {"beginRendering": {"root": "root-column", "surfaceId": "main"}}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeginRendering {
    pub root: ComponentId,

    /// Named surface, the primary surface when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surface_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub styles: Option<SurfaceStyles>,
}

/// Surface-level styling hints, passed through to the renderer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurfaceStyles {
    /// `#RRGGBB`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_color: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Drops the root pointer of a named surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteSurface {
    pub surface_id: String,
}

/// Orchestration signal, `{"_meta": tag, ...payload}` on the wire.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StatusEvent {
    pub tag: String,
    pub payload: Map<String, Value>,
}

// ============================================================================
// Component nodes
// ============================================================================

/// Component kind with its properties.
///
/// The wire form is a single-key object, `{"Text": {...}}`. Kinds this crate
/// does not know, and known kinds whose properties do not parse, are kept as
/// [`ComponentNode::Unknown`] so a renderer can show a placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentNode {
    // Layout
    Column(ColumnComponent),
    Row(RowComponent),
    List(ListComponent),
    Card(CardComponent),

    // Display
    Text(TextComponent),
    Image(ImageComponent),
    Divider(DividerComponent),
    Chart(ChartComponent),

    // Interactive
    Button(ButtonComponent),

    /// Any other kind, raw properties preserved
    Unknown { name: String, properties: Value },
}

/// A child reference, borrowed from a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Child<'a> {
    /// Reference to another registered component
    Ref(&'a ComponentId),
    /// Node defined in place
    Inline(&'a ComponentNode),
}

impl ComponentNode {
    /// Build a node from its kind name and raw properties.
    pub fn from_kind(name: String, properties: Value) -> Self {
        fn parse<T: for<'de> Deserialize<'de>>(
            name: String,
            properties: Value,
            wrap: fn(T) -> ComponentNode,
        ) -> ComponentNode {
            match serde_json::from_value::<T>(properties.clone()) {
                Ok(props) => wrap(props),
                Err(e) => {
                    ::log::debug!("[A2UI decoder] {} properties did not parse: {}", name, e);
                    ComponentNode::Unknown { name, properties }
                }
            }
        }

        match name.as_str() {
            "Column" => parse(name, properties, ComponentNode::Column),
            "Row" => parse(name, properties, ComponentNode::Row),
            "List" => parse(name, properties, ComponentNode::List),
            "Card" => parse(name, properties, ComponentNode::Card),
            "Text" => parse(name, properties, ComponentNode::Text),
            "Image" => parse(name, properties, ComponentNode::Image),
            "Divider" => parse(name, properties, ComponentNode::Divider),
            "Chart" => parse(name, properties, ComponentNode::Chart),
            "Button" => parse(name, properties, ComponentNode::Button),
            _ => ComponentNode::Unknown { name, properties },
        }
    }

    /// Text component with a literal string.
    pub fn text(text: impl Into<String>, usage_hint: Option<TextUsageHint>) -> Self {
        ComponentNode::Text(TextComponent {
            text: StringValue::literal(text),
            usage_hint,
            ..Default::default()
        })
    }

    /// Column over an explicit child list.
    pub fn column(children: Vec<ComponentId>) -> Self {
        ComponentNode::Column(ColumnComponent {
            children: ChildrenRef::ExplicitList(children),
            ..Default::default()
        })
    }

    /// The kind name as it appears on the wire.
    pub fn kind(&self) -> &str {
        match self {
            ComponentNode::Column(_) => "Column",
            ComponentNode::Row(_) => "Row",
            ComponentNode::List(_) => "List",
            ComponentNode::Card(_) => "Card",
            ComponentNode::Text(_) => "Text",
            ComponentNode::Image(_) => "Image",
            ComponentNode::Divider(_) => "Divider",
            ComponentNode::Chart(_) => "Chart",
            ComponentNode::Button(_) => "Button",
            ComponentNode::Unknown { name, .. } => name,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, ComponentNode::Unknown { .. })
    }

    /// Child references in display order.
    pub fn children(&self) -> Vec<Child<'_>> {
        match self {
            ComponentNode::Column(c) => c.children.ids().map(Child::Ref).collect(),
            ComponentNode::Row(r) => r.children.ids().map(Child::Ref).collect(),
            ComponentNode::List(l) => l.children.ids().map(Child::Ref).collect(),
            ComponentNode::Card(c) => c.child.iter().map(ChildRef::as_child).collect(),
            ComponentNode::Button(b) => b.child.iter().map(ChildRef::as_child).collect(),
            _ => Vec::new(),
        }
    }

    /// Short human-readable content, if the kind carries any.
    pub fn label(&self) -> Option<String> {
        match self {
            ComponentNode::Text(t) => Some(t.text.display_text()),
            ComponentNode::Button(b) => b.text.as_ref().map(StringValue::display_text),
            ComponentNode::Image(i) => Some(
                i.alt
                    .as_ref()
                    .unwrap_or(&i.url)
                    .display_text(),
            ),
            ComponentNode::Chart(c) => Some(format!("{} chart", c.chart_type)),
            _ => None,
        }
    }
}

impl Serialize for ComponentNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let kind = self.kind();
        match self {
            ComponentNode::Column(p) => single_entry(serializer, kind, p),
            ComponentNode::Row(p) => single_entry(serializer, kind, p),
            ComponentNode::List(p) => single_entry(serializer, kind, p),
            ComponentNode::Card(p) => single_entry(serializer, kind, p),
            ComponentNode::Text(p) => single_entry(serializer, kind, p),
            ComponentNode::Image(p) => single_entry(serializer, kind, p),
            ComponentNode::Divider(p) => single_entry(serializer, kind, p),
            ComponentNode::Chart(p) => single_entry(serializer, kind, p),
            ComponentNode::Button(p) => single_entry(serializer, kind, p),
            ComponentNode::Unknown { properties, .. } => {
                single_entry(serializer, kind, properties)
            }
        }
    }
}

impl<'de> Deserialize<'de> for ComponentNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = Map::<String, Value>::deserialize(deserializer)?;
        if map.len() != 1 {
            return Err(D::Error::custom(format!(
                "component must name exactly one kind, found {}",
                map.len()
            )));
        }
        let Some((name, properties)) = map.into_iter().next() else {
            return Err(D::Error::custom("component has no kind"));
        };
        Ok(ComponentNode::from_kind(name, properties))
    }
}

/// Children of a container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChildrenRef {
    /// Ids in display order
    ExplicitList(Vec<ComponentId>),

    /// One template component repeated over a data model list
    Template {
        #[serde(rename = "componentId")]
        component_id: ComponentId,
        #[serde(rename = "dataBinding")]
        data_binding: String,
    },
}

impl ChildrenRef {
    /// Referenced ids. A template contributes its template component once.
    pub fn ids(&self) -> impl Iterator<Item = &ComponentId> {
        let ids: &[ComponentId] = match self {
            ChildrenRef::ExplicitList(ids) => ids,
            ChildrenRef::Template { component_id, .. } => std::slice::from_ref(component_id),
        };
        ids.iter()
    }
}

impl Default for ChildrenRef {
    fn default() -> Self {
        ChildrenRef::ExplicitList(vec![])
    }
}

/// A single child, by id or defined inline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChildRef {
    Id(ComponentId),
    Inline(Box<ComponentNode>),
}

impl ChildRef {
    fn as_child(&self) -> Child<'_> {
        match self {
            ChildRef::Id(id) => Child::Ref(id),
            ChildRef::Inline(node) => Child::Inline(node),
        }
    }
}

/// Children stacked top to bottom
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnComponent {
    #[serde(default)]
    pub children: ChildrenRef,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment: Option<Alignment>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distribution: Option<Distribution>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Children laid out left to right
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowComponent {
    #[serde(default)]
    pub children: ChildrenRef,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment: Option<Alignment>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distribution: Option<Distribution>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Scrolling sequence of children
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListComponent {
    #[serde(default)]
    pub children: ChildrenRef,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<ListDirection>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Card container around a single child
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardComponent {
    /// Child component ID or inline node
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child: Option<ChildRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation: Option<u8>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextComponent {
    #[serde(default)]
    pub text: StringValue,

    /// Usage hint for styling (h1, h2, body, caption, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_hint: Option<TextUsageHint>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageComponent {
    #[serde(default)]
    pub url: StringValue,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<StringValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fit: Option<ImageFit>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Rule between siblings
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DividerComponent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orientation: Option<Orientation>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Chart with chart.js-style `type`, `data` and `options`.
///
/// The data is carried opaquely; drawing it is the renderer's business.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartComponent {
    /// `line`, `bar`, `pie`, `doughnut`, ...
    #[serde(rename = "type", default)]
    pub chart_type: String,

    #[serde(default)]
    pub data: Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Button labelled by a child or by plain text
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ButtonComponent {
    /// Child component (button content)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child: Option<ChildRef>,

    /// Plain label, used by generators that skip the child
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<StringValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<ActionDefinition>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Named action a button triggers, forwarded to the agent
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionDefinition {
    #[serde(default)]
    pub name: String,

    /// Context values, carried uninterpreted
    #[serde(default)]
    pub context: Vec<Value>,
}

// ============================================================================
// Enums
// ============================================================================

/// Cross-axis alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Alignment {
    #[default]
    Start,
    Center,
    End,
    Stretch,
    #[serde(other)]
    Unknown,
}

/// Main-axis distribution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Distribution {
    #[default]
    Start,
    Center,
    End,
    SpaceBetween,
    SpaceAround,
    SpaceEvenly,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ListDirection {
    #[default]
    Vertical,
    Horizontal,
    #[serde(other)]
    Unknown,
}

/// Text usage hints for styling. Upper-case spellings are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TextUsageHint {
    #[serde(alias = "H1")]
    H1,
    #[serde(alias = "H2")]
    H2,
    #[serde(alias = "H3")]
    H3,
    #[serde(alias = "H4")]
    H4,
    #[serde(alias = "H5")]
    H5,
    #[default]
    #[serde(alias = "Body")]
    Body,
    #[serde(alias = "Caption")]
    Caption,
    #[serde(alias = "Code")]
    Code,
    #[serde(other)]
    Unknown,
}

/// How an image fills its box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ImageFit {
    #[default]
    Contain,
    Cover,
    Fill,
    None,
    ScaleDown,
    #[serde(other)]
    Unknown,
}

/// Orientation for dividers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Orientation {
    #[default]
    Horizontal,
    Vertical,
    #[serde(other)]
    Unknown,
}
