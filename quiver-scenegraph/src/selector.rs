use std::str::FromStr;

use crate::error::SceneGraphError;
use crate::node::Node;

/// A compound simple selector: optional tag, optional `#id`, any number of
/// `.class` parts, e.g. `rect.bar`, `#chart`, `.tooltip`, `g`, or `*`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selector {
    pub tag: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
}

impl Selector {
    pub fn parse(s: &str) -> Result<Self, SceneGraphError> {
        let s = s.trim();
        let invalid = || SceneGraphError::InvalidSelector(s.to_string());
        if s.is_empty() {
            return Err(invalid());
        }

        let mut selector = Selector::default();
        let mut rest = s;
        let tag_end = rest.find(['#', '.']).unwrap_or(rest.len());
        let tag = &rest[..tag_end];
        if !tag.is_empty() && tag != "*" {
            if !is_ident(tag) {
                return Err(invalid());
            }
            selector.tag = Some(tag.to_string());
        }
        rest = &rest[tag_end..];

        while let Some(marker) = rest.chars().next() {
            let body = &rest[1..];
            let end = body.find(['#', '.']).unwrap_or(body.len());
            let name = &body[..end];
            if !is_ident(name) {
                return Err(invalid());
            }
            match marker {
                '#' if selector.id.is_none() => selector.id = Some(name.to_string()),
                '.' => selector.classes.push(name.to_string()),
                _ => return Err(invalid()),
            }
            rest = &body[end..];
        }
        Ok(selector)
    }

    pub fn tag(tag: &str) -> Self {
        Self {
            tag: Some(tag.to_string()),
            ..Default::default()
        }
    }

    pub fn class(class: &str) -> Self {
        Self {
            classes: vec![class.to_string()],
            ..Default::default()
        }
    }

    pub fn matches(&self, node: &Node) -> bool {
        self.tag.as_deref().map_or(true, |tag| node.tag() == tag)
            && self.id.as_deref().map_or(true, |id| node.element_id() == Some(id))
            && self.classes.iter().all(|c| node.has_class(c))
    }
}

impl FromStr for Selector {
    type Err = SceneGraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn is_ident(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
}
