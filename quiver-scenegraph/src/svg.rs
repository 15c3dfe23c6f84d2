use std::fmt::Write;

use crate::node::NodeId;
use crate::scene_graph::SceneGraph;

/// Serializes the whole scene graph as a standalone SVG document
pub fn to_svg(scene: &SceneGraph) -> String {
    let mut out = String::new();
    write_node(scene, scene.root(), 0, &mut out);
    out
}

/// Serializes one subtree
pub fn node_to_svg(scene: &SceneGraph, id: NodeId) -> String {
    let mut out = String::new();
    write_node(scene, id, 0, &mut out);
    out
}

fn write_node(scene: &SceneGraph, id: NodeId, depth: usize, out: &mut String) {
    let Some(node) = scene.node(id) else {
        return;
    };
    let indent = "  ".repeat(depth);
    // Writing to a String can not fail
    let _ = write!(out, "{indent}<{}", node.tag());
    if id == scene.root() && node.tag() == "svg" {
        out.push_str(r#" xmlns="http://www.w3.org/2000/svg""#);
    }
    for (name, value) in node.attrs() {
        let _ = write!(out, r#" {name}="{}""#, escape_xml(&value.to_attr_string()));
    }
    let classes: Vec<&str> = node.classes().collect();
    if !classes.is_empty() {
        let _ = write!(out, r#" class="{}""#, escape_xml(&classes.join(" ")));
    }

    let children = node.children();
    match (node.text(), children.is_empty()) {
        (None, true) => out.push_str("/>\n"),
        (Some(text), true) => {
            let _ = writeln!(out, ">{}</{}>", escape_xml(text), node.tag());
        }
        (text, false) => {
            out.push_str(">\n");
            if let Some(text) = text {
                let _ = writeln!(out, "{indent}  {}", escape_xml(text));
            }
            for child in children {
                write_node(scene, *child, depth + 1, out);
            }
            let _ = writeln!(out, "{indent}</{}>", node.tag());
        }
    }
}

pub fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::translate;
    use quiver_common::color::Color;

    #[test]
    fn test_document() {
        let mut scene = SceneGraph::new(200.0, 100.0);
        let g = scene.append(scene.root(), "g").unwrap();
        scene.set_attr(g, "transform", translate(2.0, 2.0)).unwrap();
        let rect = scene.append(g, "rect").unwrap();
        scene.set_attr(rect, "width", 27.0).unwrap();
        scene.set_attr(rect, "fill", Color::from_rgb8(0x33, 0x66, 0x99)).unwrap();
        scene.classed(rect, "box", true).unwrap();
        let label = scene.append(g, "text").unwrap();
        scene.set_text(label, "A & B").unwrap();

        let svg = to_svg(&scene);
        assert_eq!(
            svg,
            concat!(
                "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"200\" height=\"100\">\n",
                "  <g transform=\"translate(2,2)\">\n",
                "    <rect width=\"27\" fill=\"#336699\" class=\"box\"/>\n",
                "    <text>A &amp; B</text>\n",
                "  </g>\n",
                "</svg>\n",
            )
        );
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml(r#"<a href="x">'"#), "&lt;a href=&quot;x&quot;&gt;&apos;");
    }
}
