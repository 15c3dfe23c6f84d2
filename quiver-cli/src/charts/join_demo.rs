//! Selection and data join basics on a bare scene: create and style a node
//! by id, then join numbers to list items that partly exist already.

use anyhow::Result;
use log::info;
use quiver_scenegraph::join::{DataJoin, JoinSelection};
use quiver_scenegraph::node::{fmt_number, translate};
use quiver_scenegraph::scene_graph::SceneGraph;

/// List items present before the first join, standing in for static markup
pub const EXISTING_ITEMS: usize = 3;
const LINE_HEIGHT: f64 = 16.0;

pub const DEFAULT_DATA: [f64; 5] = [10.0, 20.0, 30.0, 40.0, 50.0];

fn apply(
    scene: &mut SceneGraph,
    data: &[f64],
    selection: &JoinSelection,
) -> Result<()> {
    for bound in &selection.entering {
        scene.set_attr(bound.node, "fill", "purple")?;
    }
    for bound in &selection.updating {
        scene.set_attr(bound.node, "fill", "green")?;
    }
    for bound in selection.merged() {
        scene.set_attr(bound.node, "y", (bound.index + 1) as f64 * LINE_HEIGHT)?;
        scene.set_text(bound.node, fmt_number(data[bound.index]))?;
    }
    info!(
        "{} entered, {} updated, {} exited",
        selection.entering.len(),
        selection.updating.len(),
        selection.exiting.len()
    );
    Ok(())
}

/// Joins `data` into the list and, when given, joins `next` into the same
/// list afterwards so that surplus items exit.
pub fn render(data: &[f64], next: Option<&[f64]>) -> Result<SceneGraph> {
    let mut scene = SceneGraph::new(400.0, 200.0);
    let root = scene.root();

    let section = scene.append(root, "g")?;
    scene.set_attr(section, "id", "section-1")?;
    let section = scene.select("#section-1")?;
    let p = scene.append(section, "text")?;
    scene.set_attr(p, "id", "foo")?;
    scene.classed(p, "bar", true)?;
    scene.classed(p, "baz", true)?;
    scene.set_attr(p, "y", LINE_HEIGHT)?;
    scene.set_attr(p, "fill", "blue")?;
    scene.set_text(p, "Text content replaced")?;

    let list = scene.append(root, "g")?;
    scene.classed(list, "list", true)?;
    scene.set_attr(list, "transform", translate(0.0, 2.0 * LINE_HEIGHT))?;
    for _ in 0..EXISTING_ITEMS {
        scene.append(list, "text")?;
    }

    let mut join = DataJoin::for_tag("text");
    let selection = join.join(&mut scene, list, data)?;
    apply(&mut scene, data, &selection)?;

    if let Some(next) = next {
        let selection = join.join(&mut scene, list, next)?;
        apply(&mut scene, next, &selection)?;
        join.remove_exiting(&mut scene);
    }
    Ok(scene)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiver_scenegraph::node::AttrValue;
    use quiver_scenegraph::selector::Selector;

    fn items(scene: &SceneGraph) -> Vec<(String, String)> {
        let list = scene.select("g.list").unwrap();
        scene
            .select_children(list, &Selector::tag("text"))
            .into_iter()
            .map(|t| {
                let fill = scene.attr(t, "fill").and_then(AttrValue::as_text).unwrap_or("");
                let text = scene.node(t).and_then(|n| n.text()).unwrap_or("");
                (text.to_string(), fill.to_string())
            })
            .collect()
    }

    #[test]
    fn test_styled_paragraph() {
        let scene = render(&DEFAULT_DATA, None).unwrap();
        let foo = scene.select("text#foo.bar.baz").unwrap();
        assert_eq!(scene.node(foo).and_then(|n| n.text()), Some("Text content replaced"));
    }

    #[test]
    fn test_existing_items_update_and_new_ones_enter() {
        let scene = render(&DEFAULT_DATA, None).unwrap();
        let expected: Vec<(String, String)> = [
            ("10", "green"),
            ("20", "green"),
            ("30", "green"),
            ("40", "purple"),
            ("50", "purple"),
        ]
        .iter()
        .map(|(t, f)| (t.to_string(), f.to_string()))
        .collect();
        assert_eq!(items(&scene), expected);
    }

    #[test]
    fn test_rejoin_removes_surplus() {
        let scene = render(&DEFAULT_DATA, Some(&[1.0, 2.0])).unwrap();
        let expected = vec![
            ("1".to_string(), "green".to_string()),
            ("2".to_string(), "green".to_string()),
        ];
        assert_eq!(items(&scene), expected);
    }
}
