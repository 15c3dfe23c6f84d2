use indexmap::{IndexMap, IndexSet};
use quiver_common::color::Color;
use quiver_shapes::svg::path_to_svg;
use serde::{Deserialize, Serialize};

/// Handle to a node in a [`crate::scene_graph::SceneGraph`].
///
/// Arena slots are reused after removal, but every reuse bumps the slot's
/// generation, so a stale id stops resolving instead of aliasing the new node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId {
    pub(crate) index: usize,
    pub(crate) generation: u32,
}

impl NodeId {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttrValue {
    Number(f64),
    Text(String),
    Color(Color),
    /// SVG path data
    Path(String),
}

impl AttrValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            AttrValue::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<Color> {
        match self {
            AttrValue::Color(c) => Some(*c),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) | AttrValue::Path(s) => Some(s),
            _ => None,
        }
    }

    /// Serialized attribute text
    pub fn to_attr_string(&self) -> String {
        match self {
            AttrValue::Number(v) => fmt_number(*v),
            AttrValue::Text(s) | AttrValue::Path(s) => s.clone(),
            AttrValue::Color(c) => c.to_css(),
        }
    }
}

/// Formats a number with at most three decimals and no trailing zeros
pub fn fmt_number(v: f64) -> String {
    if !v.is_finite() {
        return v.to_string();
    }
    let rounded = (v * 1000.0).round() / 1000.0;
    if rounded == 0.0 {
        return "0".to_string();
    }
    let s = format!("{rounded:.3}");
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// `translate(x,y)` transform attribute
pub fn translate(x: f64, y: f64) -> AttrValue {
    AttrValue::Text(format!("translate({},{})", fmt_number(x), fmt_number(y)))
}

impl From<f64> for AttrValue {
    fn from(v: f64) -> Self {
        AttrValue::Number(v)
    }
}

impl From<&str> for AttrValue {
    fn from(v: &str) -> Self {
        AttrValue::Text(v.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(v: String) -> Self {
        AttrValue::Text(v)
    }
}

impl From<Color> for AttrValue {
    fn from(v: Color) -> Self {
        AttrValue::Color(v)
    }
}

impl From<&lyon_path::Path> for AttrValue {
    fn from(path: &lyon_path::Path) -> Self {
        AttrValue::Path(path_to_svg(path))
    }
}

impl From<lyon_path::Path> for AttrValue {
    fn from(path: lyon_path::Path) -> Self {
        AttrValue::Path(path_to_svg(&path))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) tag: String,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) attrs: IndexMap<String, AttrValue>,
    pub(crate) classes: IndexSet<String>,
    pub(crate) text: Option<String>,
}

impl Node {
    pub(crate) fn new(id: NodeId, tag: &str, parent: Option<NodeId>) -> Self {
        Self {
            id,
            tag: tag.to_string(),
            parent,
            children: Vec::new(),
            attrs: IndexMap::new(),
            classes: IndexSet::new(),
            text: None,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn attr(&self, name: &str) -> Option<&AttrValue> {
        self.attrs.get(name)
    }

    pub fn attrs(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(String::as_str)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Value of the `id` attribute, if any
    pub fn element_id(&self) -> Option<&str> {
        self.attrs.get("id").and_then(AttrValue::as_text)
    }
}
