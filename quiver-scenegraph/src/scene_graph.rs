use log::debug;

use crate::error::SceneGraphError;
use crate::node::{AttrValue, Node, NodeId};
use crate::selector::Selector;

const ROOT: NodeId = NodeId {
    index: 0,
    generation: 0,
};

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Retained render tree rooted at an `svg` node.
///
/// Nodes live in a generational arena: removed slots go on a free list and
/// are handed out again with a bumped generation, so ids held elsewhere (data
/// bindings, transitions) never alias a new node.
#[derive(Debug, Clone)]
pub struct SceneGraph {
    slots: Vec<Slot>,
    free: Vec<usize>,
    live: usize,
}

impl SceneGraph {
    pub fn new(width: f64, height: f64) -> Self {
        let mut root = Node::new(ROOT, "svg", None);
        root.attrs.insert("width".to_string(), AttrValue::Number(width));
        root.attrs.insert("height".to_string(), AttrValue::Number(height));
        Self {
            slots: vec![Slot {
                generation: 0,
                node: Some(root),
            }],
            free: Vec::new(),
            live: 1,
        }
    }

    pub fn root(&self) -> NodeId {
        ROOT
    }

    /// Number of live nodes, including the root
    pub fn len(&self) -> usize {
        self.live
    }

    /// Arena slots allocated so far, live or free
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.slots
            .get(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    pub fn get(&self, id: NodeId) -> Result<&Node, SceneGraphError> {
        self.node(id).ok_or(SceneGraphError::NodeNotFound(id))
    }

    fn get_mut(&mut self, id: NodeId) -> Result<&mut Node, SceneGraphError> {
        self.slots
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
            .ok_or(SceneGraphError::NodeNotFound(id))
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(Node::children).unwrap_or(&[])
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(Node::parent)
    }

    /// Appends a new `tag` node as the last child of `parent`
    pub fn append(&mut self, parent: NodeId, tag: &str) -> Result<NodeId, SceneGraphError> {
        self.get(parent)?;
        let id = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index];
                slot.generation += 1;
                let id = NodeId {
                    index,
                    generation: slot.generation,
                };
                slot.node = Some(Node::new(id, tag, Some(parent)));
                id
            }
            None => {
                let id = NodeId {
                    index: self.slots.len(),
                    generation: 0,
                };
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(Node::new(id, tag, Some(parent))),
                });
                id
            }
        };
        self.live += 1;
        self.get_mut(parent)?.children.push(id);
        Ok(id)
    }

    /// Removes a node and its subtree, returning every removed id
    pub fn remove(&mut self, id: NodeId) -> Result<Vec<NodeId>, SceneGraphError> {
        if id == self.root() {
            return Err(SceneGraphError::RootNode);
        }
        let parent = self.get(id)?.parent;
        let removed = self.descendants(id);
        if let Some(parent) = parent {
            self.get_mut(parent)?.children.retain(|c| *c != id);
        }
        for node in &removed {
            self.slots[node.index].node = None;
            self.free.push(node.index);
        }
        self.live -= removed.len();
        debug!("removed {} nodes under {id:?}", removed.len());
        Ok(removed)
    }

    /// `id` and all of its descendants in document order
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(node) = self.node(next) {
                out.push(next);
                stack.extend(node.children.iter().rev());
            }
        }
        out
    }

    pub fn set_attr(
        &mut self,
        id: NodeId,
        name: &str,
        value: impl Into<AttrValue>,
    ) -> Result<(), SceneGraphError> {
        self.get_mut(id)?
            .attrs
            .insert(name.to_string(), value.into());
        Ok(())
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&AttrValue> {
        self.node(id).and_then(|n| n.attr(name))
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) -> Result<Option<AttrValue>, SceneGraphError> {
        Ok(self.get_mut(id)?.attrs.shift_remove(name))
    }

    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) -> Result<(), SceneGraphError> {
        self.get_mut(id)?.text = Some(text.into());
        Ok(())
    }

    /// Adds or removes `class` on the node
    pub fn classed(&mut self, id: NodeId, class: &str, on: bool) -> Result<(), SceneGraphError> {
        let node = self.get_mut(id)?;
        if on {
            node.classes.insert(class.to_string());
        } else {
            node.classes.shift_remove(class);
        }
        Ok(())
    }

    /// Moves the node to the end of its parent's children so it draws on top
    pub fn raise(&mut self, id: NodeId) -> Result<(), SceneGraphError> {
        let parent = self.get(id)?.parent.ok_or(SceneGraphError::RootNode)?;
        let siblings = &mut self.get_mut(parent)?.children;
        siblings.retain(|c| *c != id);
        siblings.push(id);
        Ok(())
    }

    /// Moves the node to the start of its parent's children
    pub fn lower(&mut self, id: NodeId) -> Result<(), SceneGraphError> {
        let parent = self.get(id)?.parent.ok_or(SceneGraphError::RootNode)?;
        let siblings = &mut self.get_mut(parent)?.children;
        siblings.retain(|c| *c != id);
        siblings.insert(0, id);
        Ok(())
    }

    /// Replaces the order of `parent`'s children. `order` must be a
    /// permutation of the current children.
    pub(crate) fn reorder_children(
        &mut self,
        parent: NodeId,
        order: Vec<NodeId>,
    ) -> Result<(), SceneGraphError> {
        let node = self.get_mut(parent)?;
        debug_assert_eq!(order.len(), node.children.len());
        node.children = order;
        Ok(())
    }

    /// First node in document order matching `selector`
    pub fn select(&self, selector: &str) -> Result<NodeId, SceneGraphError> {
        let parsed = Selector::parse(selector)?;
        self.select_within(self.root(), &parsed)
            .into_iter()
            .next()
            .ok_or_else(|| SceneGraphError::NoMatch(selector.to_string()))
    }

    /// All nodes in document order matching `selector`
    pub fn select_all(&self, selector: &str) -> Result<Vec<NodeId>, SceneGraphError> {
        let parsed = Selector::parse(selector)?;
        Ok(self.select_within(self.root(), &parsed))
    }

    /// Matching descendants of `scope`, which itself is included
    pub fn select_within(&self, scope: NodeId, selector: &Selector) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|id| self.node(*id).is_some_and(|n| selector.matches(n)))
            .collect()
    }

    /// Matching direct children of `parent`, in order
    pub fn select_children(&self, parent: NodeId, selector: &Selector) -> Vec<NodeId> {
        self.children(parent)
            .iter()
            .copied()
            .filter(|id| self.node(*id).is_some_and(|n| selector.matches(n)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chart() -> (SceneGraph, NodeId, Vec<NodeId>) {
        let mut scene = SceneGraph::new(400.0, 300.0);
        let g = scene.append(scene.root(), "g").unwrap();
        scene.set_attr(g, "id", "chart").unwrap();
        let bars = (0..3)
            .map(|_| {
                let bar = scene.append(g, "rect").unwrap();
                scene.classed(bar, "bar", true).unwrap();
                bar
            })
            .collect();
        (scene, g, bars)
    }

    #[test]
    fn test_select() {
        let (scene, g, bars) = chart();
        assert_eq!(scene.select("#chart").unwrap(), g);
        assert_eq!(scene.select("svg").unwrap(), scene.root());
        assert_eq!(scene.select_all(".bar").unwrap(), bars);
        assert_eq!(scene.select_all("rect.bar").unwrap(), bars);
        assert_eq!(
            scene.select("circle").unwrap_err(),
            SceneGraphError::NoMatch("circle".to_string())
        );
        assert!(matches!(
            scene.select("#"),
            Err(SceneGraphError::InvalidSelector(_))
        ));
    }

    #[test]
    fn test_remove_subtree() {
        let (mut scene, g, bars) = chart();
        let removed = scene.remove(g).unwrap();
        assert_eq!(removed.len(), 4);
        assert!(!scene.contains(bars[0]));
        assert!(scene.children(scene.root()).is_empty());
        assert_eq!(scene.len(), 1);
        assert_eq!(
            scene.set_attr(bars[1], "x", 1.0),
            Err(SceneGraphError::NodeNotFound(bars[1]))
        );
        assert_eq!(scene.remove(scene.root()), Err(SceneGraphError::RootNode));
    }

    #[test]
    fn test_removed_slots_are_reused_without_aliasing() {
        let (mut scene, g, bars) = chart();
        let capacity = scene.capacity();
        scene.remove(bars[1]).unwrap();
        assert_eq!(scene.len(), 4);

        let fresh = scene.append(g, "circle").unwrap();
        assert_eq!(scene.capacity(), capacity);
        assert_eq!(fresh.index(), bars[1].index());
        assert_ne!(fresh, bars[1]);
        assert!(!scene.contains(bars[1]));
        assert_eq!(scene.get(fresh).unwrap().tag(), "circle");
        assert_eq!(
            scene.set_attr(bars[1], "x", 1.0),
            Err(SceneGraphError::NodeNotFound(bars[1]))
        );
        assert_eq!(scene.children(g), &[bars[0], bars[2], fresh]);
        assert_eq!(scene.len(), 5);

        // Repeated churn stays within the slots already allocated
        for _ in 0..10 {
            let node = scene.append(g, "rect").unwrap();
            scene.remove(node).unwrap();
        }
        assert_eq!(scene.capacity(), capacity + 1);
    }

    #[test]
    fn test_raise_and_lower() {
        let (mut scene, g, bars) = chart();
        scene.raise(bars[0]).unwrap();
        assert_eq!(scene.children(g), &[bars[1], bars[2], bars[0]]);
        scene.lower(bars[2]).unwrap();
        assert_eq!(scene.children(g), &[bars[2], bars[1], bars[0]]);
    }

    #[test]
    fn test_attrs_text_and_classes() {
        let (mut scene, _, bars) = chart();
        scene.set_attr(bars[0], "height", 20.0).unwrap();
        scene.set_text(bars[0], "label").unwrap();
        scene.classed(bars[0], "bar", false).unwrap();
        scene.classed(bars[0], "highlight", true).unwrap();

        let node = scene.get(bars[0]).unwrap();
        assert_eq!(node.attr("height"), Some(&AttrValue::Number(20.0)));
        assert_eq!(node.text(), Some("label"));
        assert_eq!(node.classes().collect::<Vec<_>>(), vec!["highlight"]);
        assert_eq!(
            scene.remove_attr(bars[0], "height").unwrap(),
            Some(AttrValue::Number(20.0))
        );
        assert_eq!(scene.attr(bars[0], "height"), None);
    }
}
