//! Document tree and call vocabulary for the WebCee DSL.
//!
//! The DSL only knows two kinds of calls:
//!
//! 1. **Component calls** (`wce_card("Title") { ... }`) create a node.
//! 2. **Property calls** (`wce_css`, `wce_bind`, `wce_on_click`) annotate the
//!    node that is currently open.
//!
//! Every other call name resolves to [`Call::Unknown`]. Resolution goes through
//! one lookup table so the parser and the analyzer can never disagree on it.

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ═══════════════════════════════════════════════════════════════════════════════
// CALL VOCABULARY
// ═══════════════════════════════════════════════════════════════════════════════

/// Kind of a document node. `Unknown` covers any call name outside the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Container,
    Row,
    Col,
    Card,
    Panel,
    Text,
    Button,
    Input,
    Slider,
    Progress,
    Unknown,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Container => "container",
            NodeKind::Row => "row",
            NodeKind::Col => "col",
            NodeKind::Card => "card",
            NodeKind::Panel => "panel",
            NodeKind::Text => "text",
            NodeKind::Button => "button",
            NodeKind::Input => "input",
            NodeKind::Slider => "slider",
            NodeKind::Progress => "progress",
            NodeKind::Unknown => "unknown",
        }
    }

    /// Layout-only kinds, rendered as a plain `<div>` carrying the kind as class.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            NodeKind::Container | NodeKind::Row | NodeKind::Col | NodeKind::Card | NodeKind::Panel
        )
    }

    /// Kinds whose rendered element carries the binding attribute.
    pub fn is_bindable(&self) -> bool {
        matches!(
            self,
            NodeKind::Text | NodeKind::Input | NodeKind::Slider | NodeKind::Progress
        )
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The three calls that annotate the enclosing node instead of creating one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyCall {
    #[serde(rename = "wce_css")]
    Css,
    #[serde(rename = "wce_bind")]
    Bind,
    #[serde(rename = "wce_on_click")]
    OnClick,
}

impl PropertyCall {
    pub fn name(&self) -> &'static str {
        match self {
            PropertyCall::Css => "wce_css",
            PropertyCall::Bind => "wce_bind",
            PropertyCall::OnClick => "wce_on_click",
        }
    }
}

/// Resolved meaning of a call name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    Component(NodeKind),
    Property(PropertyCall),
    Unknown,
}

pub const COMPONENT_CALLS: [(&str, NodeKind); 10] = [
    ("wce_container", NodeKind::Container),
    ("wce_row", NodeKind::Row),
    ("wce_col", NodeKind::Col),
    ("wce_card", NodeKind::Card),
    ("wce_panel", NodeKind::Panel),
    ("wce_text", NodeKind::Text),
    ("wce_button", NodeKind::Button),
    ("wce_input", NodeKind::Input),
    ("wce_slider", NodeKind::Slider),
    ("wce_progress", NodeKind::Progress),
];

pub const PROPERTY_CALLS: [(&str, PropertyCall); 3] = [
    ("wce_css", PropertyCall::Css),
    ("wce_bind", PropertyCall::Bind),
    ("wce_on_click", PropertyCall::OnClick),
];

/// Prefix shared by every call of the vocabulary.
pub const CALL_PREFIX: &str = "wce_";

lazy_static! {
    static ref CALL_TABLE: HashMap<&'static str, Call> = {
        let mut m = HashMap::new();
        for (name, kind) in COMPONENT_CALLS {
            m.insert(name, Call::Component(kind));
        }
        for (name, prop) in PROPERTY_CALLS {
            m.insert(name, Call::Property(prop));
        }
        m
    };
}

/// Resolve a call name (case-sensitive).
pub fn resolve_call(name: &str) -> Call {
    CALL_TABLE.get(name).copied().unwrap_or(Call::Unknown)
}

/// Node kind created by a call name; property calls and unknown names map to `Unknown`.
pub fn node_kind_for_call(name: &str) -> NodeKind {
    match resolve_call(name) {
        Call::Component(kind) => kind,
        _ => NodeKind::Unknown,
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// DOCUMENT TREE
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_click: Option<String>,
    #[serde(default)]
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            label: None,
            style: None,
            bind: None,
            on_click: None,
            children: Vec::new(),
        }
    }

    /// The implicit document root: a bare container.
    pub fn root() -> Self {
        Self::new(NodeKind::Container)
    }

    /// Apply a property call to this node. Empty values are ignored.
    pub fn apply_property(&mut self, prop: PropertyCall, value: &str) {
        if value.is_empty() {
            return;
        }
        let slot = match prop {
            PropertyCall::Css => &mut self.style,
            PropertyCall::Bind => &mut self.bind,
            PropertyCall::OnClick => &mut self.on_click,
        };
        *slot = Some(value.to_string());
    }

    /// Depth-first, pre-order walk over this node and its descendants.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Node)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_call_table() {
        assert_eq!(resolve_call("wce_card"), Call::Component(NodeKind::Card));
        assert_eq!(resolve_call("wce_bind"), Call::Property(PropertyCall::Bind));
        assert_eq!(resolve_call("wce_Card"), Call::Unknown);
        assert_eq!(resolve_call("card"), Call::Unknown);
        assert_eq!(node_kind_for_call("wce_on_click"), NodeKind::Unknown);
    }

    #[test]
    fn test_node_serializes_with_wire_names() {
        let mut node = Node::new(NodeKind::Button);
        node.label = Some("Go".to_string());
        node.apply_property(PropertyCall::OnClick, "doit");
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["type"], "button");
        assert_eq!(json["onClick"], "doit");
        assert!(json.get("style").is_none());
    }

    #[test]
    fn test_empty_property_value_is_ignored() {
        let mut node = Node::new(NodeKind::Text);
        node.apply_property(PropertyCall::Bind, "");
        assert_eq!(node.bind, None);
    }
}
