//! Structural renderer
//!
//! Resolves the component graph from a root into a tree of [`RenderNode`]s.
//! This is the shape a UI layer paints from; drawing is not done here.
//! Every unresolvable reference becomes a placeholder node so one bad
//! fragment never blanks the whole surface.

use std::collections::HashSet;
use std::fmt::Write as _;

use super::message::{Child, ComponentId, ComponentNode};
use super::registry::ComponentRegistry;

/// Suffix for the synthetic id of an inline child.
pub const INLINE_SUFFIX: &str = "#inline";

/// One resolved node.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderNode {
    Element {
        id: ComponentId,
        kind: String,
        text: Option<String>,
        children: Vec<RenderNode>,
    },
    /// Referenced but never registered
    Missing { id: ComponentId },
    /// Kind this crate does not know how to show
    Unknown { id: ComponentId, kind: String },
    /// Reference back to an ancestor, cut here
    Cycle { id: ComponentId },
    /// Nested past the depth limit
    TooDeep { id: ComponentId },
    /// Left out once the node budget was spent
    OverBudget { id: ComponentId },
}

impl RenderNode {
    pub fn id(&self) -> &ComponentId {
        match self {
            RenderNode::Element { id, .. }
            | RenderNode::Missing { id }
            | RenderNode::Unknown { id, .. }
            | RenderNode::Cycle { id }
            | RenderNode::TooDeep { id }
            | RenderNode::OverBudget { id } => id,
        }
    }

    pub fn children(&self) -> &[RenderNode] {
        match self {
            RenderNode::Element { children, .. } => children,
            _ => &[],
        }
    }

    pub fn is_placeholder(&self) -> bool {
        !matches!(self, RenderNode::Element { .. })
    }

    /// Number of nodes in this subtree, placeholders included.
    pub fn count(&self) -> usize {
        1 + self.children().iter().map(RenderNode::count).sum::<usize>()
    }

    /// Indented text outline, two spaces per level.
    ///
    /// ```text
    /// Column #main_root
    ///   Text #header "Report"
    ///   [missing #slot_b]
    /// ```
    pub fn outline(&self) -> String {
        let mut out = String::new();
        self.write_outline(&mut out, 0);
        out
    }

    fn write_outline(&self, out: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        // Writing into a String cannot fail.
        let _ = match self {
            RenderNode::Element { id, kind, text, .. } => match text {
                Some(text) => writeln!(out, "{indent}{kind} #{id} {text:?}"),
                None => writeln!(out, "{indent}{kind} #{id}"),
            },
            RenderNode::Missing { id } => writeln!(out, "{indent}[missing #{id}]"),
            RenderNode::Unknown { id, kind } => writeln!(out, "{indent}[unknown {kind} #{id}]"),
            RenderNode::Cycle { id } => writeln!(out, "{indent}[cycle #{id}]"),
            RenderNode::TooDeep { id } => writeln!(out, "{indent}[too deep #{id}]"),
            RenderNode::OverBudget { id } => writeln!(out, "{indent}[over budget #{id}]"),
        };
        for child in self.children() {
            child.write_outline(out, depth + 1);
        }
    }
}

/// Bounds on a single render.
///
/// Past `max_depth` a reference becomes [`RenderNode::TooDeep`]. Once
/// `max_nodes` nodes are out, every further reference becomes
/// [`RenderNode::OverBudget`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderLimits {
    pub max_depth: usize,
    pub max_nodes: usize,
}

impl Default for RenderLimits {
    fn default() -> Self {
        RenderLimits {
            max_depth: 64,
            max_nodes: 10_000,
        }
    }
}

/// Render from the active root, or `None` before any `BeginRendering`.
pub fn render(registry: &ComponentRegistry) -> Option<RenderNode> {
    registry
        .active_root()
        .map(|root| render_from(registry, root))
}

/// Render the subtree under any id.
pub fn render_from(registry: &ComponentRegistry, id: &ComponentId) -> RenderNode {
    render_with(registry, id, RenderLimits::default())
}

/// Render the subtree under `id` within `limits`.
pub fn render_with(
    registry: &ComponentRegistry,
    id: &ComponentId,
    limits: RenderLimits,
) -> RenderNode {
    let mut walk = Walk {
        registry,
        limits,
        ancestors: HashSet::new(),
        depth: 0,
        emitted: 0,
    };
    let tree = walk.visit_ref(id);
    if walk.emitted > limits.max_nodes {
        ::log::warn!(
            "[A2UI render] Render of {} stopped at {} nodes",
            id,
            limits.max_nodes
        );
    }
    tree
}

struct Walk<'a> {
    registry: &'a ComponentRegistry,
    limits: RenderLimits,
    ancestors: HashSet<ComponentId>,
    depth: usize,
    emitted: usize,
}

impl Walk<'_> {
    fn visit_ref(&mut self, id: &ComponentId) -> RenderNode {
        if let Some(cut) = self.cut(id) {
            return cut;
        }
        if self.ancestors.contains(id) {
            ::log::debug!("[A2UI render] Cycle through {}", id);
            return RenderNode::Cycle { id: id.clone() };
        }
        let registry = self.registry;
        let Some(node) = registry.resolve(id.as_str()) else {
            return RenderNode::Missing { id: id.clone() };
        };

        self.ancestors.insert(id.clone());
        let rendered = self.visit_node(id, node);
        self.ancestors.remove(id);
        rendered
    }

    /// Placeholder for a node past the depth or node budget.
    fn cut(&mut self, id: &ComponentId) -> Option<RenderNode> {
        self.emitted += 1;
        if self.emitted > self.limits.max_nodes {
            Some(RenderNode::OverBudget { id: id.clone() })
        } else if self.depth >= self.limits.max_depth {
            ::log::debug!("[A2UI render] Depth limit reached at {}", id);
            Some(RenderNode::TooDeep { id: id.clone() })
        } else {
            None
        }
    }

    fn visit_node(&mut self, id: &ComponentId, node: &ComponentNode) -> RenderNode {
        if node.is_unknown() {
            return RenderNode::Unknown {
                id: id.clone(),
                kind: node.kind().to_string(),
            };
        }

        self.depth += 1;
        let children = node
            .children()
            .into_iter()
            .map(|child| match child {
                Child::Ref(child_id) => self.visit_ref(child_id),
                Child::Inline(inline) => {
                    let inline_id = id.with_suffix(INLINE_SUFFIX);
                    match self.cut(&inline_id) {
                        Some(cut) => cut,
                        None => self.visit_node(&inline_id, inline),
                    }
                }
            })
            .collect();
        self.depth -= 1;

        RenderNode::Element {
            id: id.clone(),
            kind: node.kind().to_string(),
            text: node.label(),
            children,
        }
    }
}
