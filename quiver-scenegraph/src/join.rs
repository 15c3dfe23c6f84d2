//! Keyed data join between a dataset and the children of a container node.
//!
//! A [`DataJoin`] owns the bound data for the nodes it manages, keyed by
//! [`NodeId`]. Each call to [`DataJoin::join`] partitions the new data into
//! entering, updating and exiting sets and leaves the bound nodes in data
//! order under the container.

use std::collections::{HashMap, HashSet};
use std::fmt::Debug;

use indexmap::IndexSet;
use log::{debug, warn};

use crate::error::SceneGraphError;
use crate::node::NodeId;
use crate::scene_graph::SceneGraph;
use crate::selector::Selector;

/// Identity of a datum across joins
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum JoinKey {
    /// Position in the data (the default)
    Index(usize),
    Key(String),
}

#[derive(Debug, Clone)]
struct Binding<T> {
    key: JoinKey,
    datum: T,
}

/// Node paired with the index of its datum in the joined data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundNode {
    pub node: NodeId,
    pub index: usize,
}

/// Result of one join. Entering nodes have already been created (with no
/// attributes) so the caller only sets their initial state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JoinSelection {
    pub entering: Vec<BoundNode>,
    pub updating: Vec<BoundNode>,
    /// Nodes whose datum left the data; still in the tree until removed
    pub exiting: Vec<NodeId>,
}

impl JoinSelection {
    /// Entering and updating nodes together, in data order
    pub fn merged(&self) -> Vec<BoundNode> {
        let mut all: Vec<BoundNode> = self
            .entering
            .iter()
            .chain(self.updating.iter())
            .copied()
            .collect();
        all.sort_by_key(|b| b.index);
        all
    }
}

pub struct DataJoin<T> {
    tag: String,
    selector: Selector,
    key: Option<Box<dyn Fn(&T) -> String>>,
    bound: HashMap<NodeId, Binding<T>>,
    exiting: IndexSet<NodeId>,
}

impl<T: Debug> Debug for DataJoin<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataJoin")
            .field("tag", &self.tag)
            .field("selector", &self.selector)
            .field("keyed", &self.key.is_some())
            .field("bound", &self.bound.len())
            .field("exiting", &self.exiting)
            .finish()
    }
}

impl<T: Clone> DataJoin<T> {
    /// Joins by position: the i-th datum goes to the i-th matching child.
    /// Entering nodes are created as `tag` elements carrying the classes of
    /// `selector`, so they match it on the next join.
    pub fn new(tag: &str, selector: Selector) -> Self {
        Self {
            tag: tag.to_string(),
            selector,
            key: None,
            bound: HashMap::new(),
            exiting: IndexSet::new(),
        }
    }

    /// Positional join over `tag` children
    pub fn for_tag(tag: &str) -> Self {
        Self::new(tag, Selector::tag(tag))
    }

    /// Joins by the string key `key` computes from each datum
    pub fn with_key(mut self, key: impl Fn(&T) -> String + 'static) -> Self {
        self.key = Some(Box::new(key));
        self
    }

    fn key_of(&self, datum: &T, index: usize) -> JoinKey {
        match &self.key {
            Some(key) => JoinKey::Key(key(datum)),
            None => JoinKey::Index(index),
        }
    }

    pub fn datum(&self, node: NodeId) -> Option<&T> {
        self.bound.get(&node).map(|b| &b.datum)
    }

    pub fn key(&self, node: NodeId) -> Option<&JoinKey> {
        self.bound.get(&node).map(|b| &b.key)
    }

    /// Binds a single datum to `node` without joining, e.g. one path for a
    /// whole series.
    pub fn set_datum(&mut self, node: NodeId, datum: T) {
        let key = self.key_of(&datum, 0);
        self.exiting.shift_remove(&node);
        self.bound.insert(node, Binding { key, datum });
    }

    /// Nodes from earlier joins that exited and have not been removed yet
    pub fn pending_exit(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.exiting.iter().copied()
    }

    /// Reconciles the matching children of `container` with `data`.
    ///
    /// Every datum ends up bound to exactly one node, and the bound nodes are
    /// reordered to follow `data`. If several data share a key only the last
    /// one is bound; earlier ones are dropped and appear in no partition. If
    /// several existing nodes share a key, the first is reused and the rest
    /// exit.
    pub fn join(
        &mut self,
        scene: &mut SceneGraph,
        container: NodeId,
        data: &[T],
    ) -> Result<JoinSelection, SceneGraphError> {
        scene.get(container)?;
        self.forget_removed(scene);

        // Children taking part in the join, in document order
        let existing: Vec<NodeId> = scene
            .select_children(container, &self.selector)
            .into_iter()
            .filter(|id| !self.exiting.contains(id))
            .collect();

        let mut by_key: HashMap<JoinKey, NodeId> = HashMap::new();
        let mut selection = JoinSelection::default();
        let mut duplicate_nodes = 0usize;
        for (position, node) in existing.iter().enumerate() {
            let key = match (&self.key, self.bound.get(node)) {
                (None, _) => Some(JoinKey::Index(position)),
                (Some(_), Some(binding)) => Some(binding.key.clone()),
                (Some(_), None) => None,
            };
            match key {
                Some(key) if !by_key.contains_key(&key) => {
                    by_key.insert(key, *node);
                }
                _ => {
                    duplicate_nodes += 1;
                    selection.exiting.push(*node);
                }
            }
        }

        let keys: Vec<JoinKey> = data
            .iter()
            .enumerate()
            .map(|(i, d)| self.key_of(d, i))
            .collect();
        let mut last_index: HashMap<&JoinKey, usize> = HashMap::new();
        for (i, key) in keys.iter().enumerate() {
            last_index.insert(key, i);
        }
        let duplicate_data = keys.len() - last_index.len();
        if duplicate_data > 0 {
            warn!("Dropping {duplicate_data} data that share a join key with a later datum");
        }
        if duplicate_nodes > 0 && self.key.is_some() {
            warn!("{duplicate_nodes} unbound or duplicate-key nodes exit");
        }

        let mut ordered = Vec::with_capacity(data.len());
        for (index, (datum, key)) in data.iter().zip(&keys).enumerate() {
            if last_index.get(key) != Some(&index) {
                continue;
            }
            let node = match by_key.remove(key) {
                Some(node) => {
                    selection.updating.push(BoundNode { node, index });
                    node
                }
                None => {
                    let node = scene.append(container, &self.tag)?;
                    for class in &self.selector.classes {
                        scene.classed(node, class, true)?;
                    }
                    if let Some(id) = &self.selector.id {
                        scene.set_attr(node, "id", id.as_str())?;
                    }
                    selection.entering.push(BoundNode { node, index });
                    node
                }
            };
            self.bound.insert(
                node,
                Binding {
                    key: key.clone(),
                    datum: datum.clone(),
                },
            );
            ordered.push(node);
        }

        // Leftover nodes exit in document order
        let leftover: HashSet<NodeId> = by_key.into_values().collect();
        selection
            .exiting
            .extend(existing.iter().filter(|n| leftover.contains(n)));
        selection.exiting.sort_by_key(|n| {
            existing
                .iter()
                .position(|e| e == n)
                .unwrap_or(usize::MAX)
        });
        self.exiting.extend(selection.exiting.iter().copied());

        self.order(scene, container, &ordered)?;

        debug!(
            "join under {container:?}: {} entering, {} updating, {} exiting",
            selection.entering.len(),
            selection.updating.len(),
            selection.exiting.len()
        );
        Ok(selection)
    }

    /// Puts `ordered` into data order within the slots they already occupy
    /// among `container`'s children; other children keep their positions.
    fn order(
        &self,
        scene: &mut SceneGraph,
        container: NodeId,
        ordered: &[NodeId],
    ) -> Result<(), SceneGraphError> {
        let members: HashSet<NodeId> = ordered.iter().copied().collect();
        let mut next = ordered.iter();
        let children: Vec<NodeId> = scene
            .children(container)
            .iter()
            .map(|child| {
                if members.contains(child) {
                    next.next().copied().unwrap_or(*child)
                } else {
                    *child
                }
            })
            .collect();
        scene.reorder_children(container, children)
    }

    /// Removes exiting nodes from the tree immediately
    pub fn remove_exiting(&mut self, scene: &mut SceneGraph) -> Vec<NodeId> {
        let exiting: Vec<NodeId> = self.exiting.drain(..).collect();
        for node in &exiting {
            self.bound.remove(node);
            // Already removed nodes are fine to skip
            let _ = scene.remove(*node);
        }
        exiting
    }

    /// Drops bindings for nodes that are no longer in the tree
    pub fn forget_removed(&mut self, scene: &SceneGraph) {
        self.bound.retain(|node, _| scene.contains(*node));
        self.exiting.retain(|node| scene.contains(*node));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn container() -> (SceneGraph, NodeId) {
        let mut scene = SceneGraph::new(100.0, 100.0);
        let g = scene.append(scene.root(), "g").unwrap();
        (scene, g)
    }

    fn data_order(scene: &SceneGraph, join: &DataJoin<&'static str>, g: NodeId) -> Vec<&'static str> {
        scene
            .children(g)
            .iter()
            .filter_map(|n| join.datum(*n).copied())
            .collect()
    }

    #[test]
    fn test_positional_enter_then_update() {
        let (mut scene, g) = container();
        let mut join = DataJoin::for_tag("rect");
        let data = [10.0, 20.0, 30.0, 40.0, 50.0];

        let first = join.join(&mut scene, g, &data).unwrap();
        assert_eq!(
            (first.entering.len(), first.updating.len(), first.exiting.len()),
            (5, 0, 0)
        );

        let second = join.join(&mut scene, g, &data).unwrap();
        assert_eq!(
            (second.entering.len(), second.updating.len(), second.exiting.len()),
            (0, 5, 0)
        );
        let reused: Vec<NodeId> = second.updating.iter().map(|b| b.node).collect();
        assert_eq!(reused, scene.children(g));
    }

    #[test]
    fn test_positional_shrink_exits_tail() {
        let (mut scene, g) = container();
        let mut join = DataJoin::for_tag("rect");
        join.join(&mut scene, g, &[1.0, 2.0, 3.0]).unwrap();
        let nodes = scene.children(g).to_vec();

        let selection = join.join(&mut scene, g, &[5.0, 6.0]).unwrap();
        assert_eq!(selection.exiting, vec![nodes[2]]);
        assert_eq!(join.datum(nodes[0]), Some(&5.0));

        // Exiting nodes stay until removed
        assert!(scene.contains(nodes[2]));
        assert_eq!(join.remove_exiting(&mut scene), vec![nodes[2]]);
        assert!(!scene.contains(nodes[2]));
        assert_eq!(scene.children(g).len(), 2);
    }

    #[test]
    fn test_keyed_identity() {
        let (mut scene, g) = container();
        let mut join = DataJoin::for_tag("circle").with_key(|d: &&str| d.to_string());
        join.join(&mut scene, g, &["A", "B", "C"]).unwrap();
        let nodes = scene.children(g).to_vec();

        let selection = join.join(&mut scene, g, &["A", "C"]).unwrap();
        assert!(selection.entering.is_empty());
        assert_eq!(
            selection.updating,
            vec![
                BoundNode { node: nodes[0], index: 0 },
                BoundNode { node: nodes[2], index: 1 },
            ]
        );
        assert_eq!(selection.exiting, vec![nodes[1]]);
    }

    #[test]
    fn test_keyed_reorder_follows_data() {
        let (mut scene, g) = container();
        let mut join = DataJoin::for_tag("text").with_key(|d: &&str| d.to_string());
        join.join(&mut scene, g, &["A", "B", "C"]).unwrap();
        let before = scene.children(g).to_vec();

        let selection = join.join(&mut scene, g, &["C", "D", "A"]).unwrap();
        assert_eq!(selection.entering.len(), 1);
        assert_eq!(selection.updating.len(), 2);
        assert_eq!(selection.exiting, vec![before[1]]);
        let live: Vec<NodeId> = scene
            .children(g)
            .iter()
            .copied()
            .filter(|n| !selection.exiting.contains(n))
            .collect();
        assert_eq!(
            live,
            selection.merged().iter().map(|b| b.node).collect::<Vec<_>>()
        );
        assert!(scene.contains(before[1]));

        join.remove_exiting(&mut scene);
        assert_eq!(data_order(&scene, &join, g), vec!["C", "D", "A"]);
    }

    #[test]
    fn test_duplicate_keys_last_wins() {
        let (mut scene, g) = container();
        let mut join = DataJoin::for_tag("rect").with_key(|d: &(&str, i32)| d.0.to_string());
        join.join(&mut scene, g, &[("a", 1)]).unwrap();
        let a = scene.children(g)[0];

        let selection = join.join(&mut scene, g, &[("a", 2), ("a", 3)]).unwrap();
        assert_eq!(selection.updating, vec![BoundNode { node: a, index: 1 }]);
        assert!(selection.entering.is_empty());
        assert_eq!(join.datum(a), Some(&("a", 3)));
        assert_eq!(scene.children(g), &[a]);
    }

    #[test]
    fn test_duplicate_keys_settle_on_rejoin() {
        let (mut scene, g) = container();
        let mut join = DataJoin::for_tag("rect").with_key(|d: &(&str, i32)| d.0.to_string());
        let data = [("a", 2), ("a", 3)];
        join.join(&mut scene, g, &data).unwrap();
        let a = scene.children(g)[0];

        for _ in 0..3 {
            let selection = join.join(&mut scene, g, &data).unwrap();
            join.remove_exiting(&mut scene);
            assert!(selection.entering.is_empty());
            assert!(selection.exiting.is_empty());
            assert_eq!(selection.updating, vec![BoundNode { node: a, index: 1 }]);
            assert_eq!(join.datum(a), Some(&("a", 3)));
        }
    }

    #[test]
    fn test_selector_limits_participants() {
        let (mut scene, g) = container();
        let title = scene.append(g, "text").unwrap();
        let mut join = DataJoin::new("text", Selector::class("label"));
        let selection = join.join(&mut scene, g, &["x", "y"]).unwrap();
        assert_eq!(selection.entering.len(), 2);
        assert!(selection
            .entering
            .iter()
            .all(|b| scene.get(b.node).unwrap().has_class("label")));
        assert_eq!(scene.children(g)[0], title);
        assert_eq!(join.datum(title), None);
    }

    #[test]
    fn test_removed_nodes_are_forgotten() {
        let (mut scene, g) = container();
        let mut join = DataJoin::for_tag("rect");
        join.join(&mut scene, g, &[1, 2]).unwrap();
        let first = scene.children(g)[0];
        scene.remove(first).unwrap();

        let selection = join.join(&mut scene, g, &[1, 2]).unwrap();
        assert_eq!(selection.updating.len(), 1);
        assert_eq!(selection.entering.len(), 1);
        assert_eq!(join.datum(first), None);
    }

    #[test]
    fn test_set_datum() {
        let (mut scene, g) = container();
        let path = scene.append(g, "path").unwrap();
        let mut join = DataJoin::for_tag("path");
        join.set_datum(path, vec![1.0, 2.0]);
        assert_eq!(join.datum(path), Some(&vec![1.0, 2.0]));

        // A later join reuses the node bound by datum
        let selection = join.join(&mut scene, g, &[vec![3.0]]).unwrap();
        assert_eq!(selection.updating, vec![BoundNode { node: path, index: 0 }]);
    }
}
