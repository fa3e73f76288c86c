//! XML serialization of an [`MxFile`]

use super::model::{Cell, CellKind, DiagramPage, Geometry, GraphModel, MxFile};
use crate::model::format_number;

/// Write XML elements incrementally
struct XmlWriter {
    out: String,
    pretty: bool,
    indent: usize,
}

type Attrs<'a> = Vec<(&'a str, String)>;

impl XmlWriter {
    fn new(pretty: bool) -> Self {
        Self {
            out: String::new(),
            pretty,
            indent: 0,
        }
    }

    fn indent_str(&self) -> String {
        if self.pretty {
            "  ".repeat(self.indent)
        } else {
            String::new()
        }
    }

    fn newline(&self) -> &'static str {
        if self.pretty {
            "\n"
        } else {
            ""
        }
    }

    fn declaration(&mut self) {
        self.out
            .push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        self.out.push_str(self.newline());
    }

    fn tag(&mut self, name: &str, attrs: &[(&str, String)], close: bool) {
        let mut line = format!("{}<{}", self.indent_str(), name);
        for (key, value) in attrs {
            line.push_str(&format!(r#" {}="{}""#, key, escape_xml(value)));
        }
        line.push_str(if close { "/>" } else { ">" });
        self.out.push_str(&line);
        self.out.push_str(self.newline());
    }

    fn open(&mut self, name: &str, attrs: &[(&str, String)]) {
        self.tag(name, attrs, false);
        self.indent += 1;
    }

    fn empty(&mut self, name: &str, attrs: &[(&str, String)]) {
        self.tag(name, attrs, true);
    }

    fn close(&mut self, name: &str) {
        self.indent = self.indent.saturating_sub(1);
        let line = format!("{}</{}>", self.indent_str(), name);
        self.out.push_str(&line);
        self.out.push_str(self.newline());
    }

    fn finish(self) -> String {
        self.out
    }
}

/// Serialize a document, including the XML declaration
pub fn write_mxfile(file: &MxFile, pretty: bool) -> String {
    let mut w = XmlWriter::new(pretty);
    w.declaration();
    w.open(
        "mxfile",
        &[
            ("host", file.host.clone()),
            ("agent", file.agent.clone()),
            ("version", file.version.clone()),
            ("type", "device".to_string()),
        ],
    );
    for diagram in &file.diagrams {
        write_diagram(&mut w, diagram);
    }
    w.close("mxfile");
    w.finish()
}

fn write_diagram(w: &mut XmlWriter, diagram: &DiagramPage) {
    w.open(
        "diagram",
        &[("id", diagram.id.clone()), ("name", diagram.name.clone())],
    );
    write_model(w, &diagram.model);
    w.close("diagram");
}

fn flag(value: bool) -> String {
    let digit = if value { "1" } else { "0" };
    digit.to_string()
}

fn write_model(w: &mut XmlWriter, model: &GraphModel) {
    let mut attrs: Attrs = vec![
        ("grid", flag(model.grid)),
        ("gridSize", model.grid_size.to_string()),
        ("guides", flag(true)),
        ("tooltips", flag(true)),
        ("connect", flag(true)),
        ("arrows", flag(true)),
        ("fold", flag(true)),
        ("page", flag(true)),
        ("pageScale", format_number(model.page_scale)),
        ("pageWidth", model.page_width.to_string()),
        ("pageHeight", model.page_height.to_string()),
    ];
    if let Some(background) = model.background.as_deref().filter(|b| !b.is_empty()) {
        attrs.push(("background", background.to_string()));
    }

    w.open("mxGraphModel", &attrs);
    w.open("root", &[]);
    for cell in &model.cells {
        write_cell(w, cell);
    }
    w.close("root");
    w.close("mxGraphModel");
}

fn write_cell(w: &mut XmlWriter, cell: &Cell) {
    let mut attrs: Attrs = vec![("id", cell.id.clone())];
    if let Some(value) = cell.value.as_deref().filter(|v| !v.is_empty()) {
        attrs.push(("value", value.to_string()));
    }
    if let Some(style) = cell.style.as_deref().filter(|s| !s.is_empty()) {
        attrs.push(("style", style.to_string()));
    }
    if let Some(parent) = &cell.parent {
        attrs.push(("parent", parent.clone()));
    }
    match cell.kind {
        CellKind::Vertex => attrs.push(("vertex", flag(true))),
        CellKind::Edge => attrs.push(("edge", flag(true))),
        CellKind::Plain => {}
    }
    if let Some(source) = &cell.source {
        attrs.push(("source", source.clone()));
    }
    if let Some(target) = &cell.target {
        attrs.push(("target", target.clone()));
    }
    if cell.collapsed {
        attrs.push(("collapsed", flag(true)));
    }

    match &cell.geometry {
        Some(geometry) => {
            w.open("mxCell", &attrs);
            write_geometry(w, geometry);
            w.close("mxCell");
        }
        None => w.empty("mxCell", &attrs),
    }
}

fn write_geometry(w: &mut XmlWriter, geometry: &Geometry) {
    let mut attrs: Attrs = Vec::new();
    for (key, value) in [
        ("x", geometry.x),
        ("y", geometry.y),
        ("width", geometry.width),
        ("height", geometry.height),
    ] {
        if value != 0.0 {
            attrs.push((key, format_number(value)));
        }
    }
    if geometry.relative {
        attrs.push(("relative", flag(true)));
    }
    attrs.push(("as", "geometry".to_string()));

    if geometry.points.is_empty() {
        w.empty("mxGeometry", &attrs);
        return;
    }

    w.open("mxGeometry", &attrs);
    w.open("Array", &[("as", "points".to_string())]);
    for point in &geometry.points {
        w.empty(
            "mxPoint",
            &[("x", format_number(point.x)), ("y", format_number(point.y))],
        );
    }
    w.close("Array");
    w.close("mxGeometry");
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Waypoint;

    fn file(cells: Vec<Cell>) -> MxFile {
        MxFile {
            host: "app.diagrams.net".into(),
            agent: "drawloom".into(),
            version: "24.7.17".into(),
            diagrams: vec![DiagramPage {
                id: "p1".into(),
                name: "Page 1".into(),
                model: GraphModel {
                    grid: false,
                    grid_size: 10,
                    page_scale: 1.0,
                    page_width: 827,
                    page_height: 1169,
                    background: None,
                    cells,
                },
            }],
        }
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a < b"), "a &lt; b");
        assert_eq!(escape_xml("R&D"), "R&amp;D");
        assert_eq!(escape_xml(r#""q""#), "&quot;q&quot;");
    }

    #[test]
    fn test_pretty_document() {
        let mut vertex = Cell::plain("s1", Some("1"));
        vertex.kind = CellKind::Vertex;
        vertex.value = Some("Hello".into());
        vertex.geometry = Some(Geometry {
            width: 120.0,
            height: 80.0,
            ..Geometry::default()
        });
        let xml = write_mxfile(
            &file(vec![Cell::plain("0", None), Cell::plain("1", Some("0")), vertex]),
            true,
        );

        insta::assert_snapshot!(xml.trim_end(), @r###"
        <?xml version="1.0" encoding="UTF-8"?>
        <mxfile host="app.diagrams.net" agent="drawloom" version="24.7.17" type="device">
          <diagram id="p1" name="Page 1">
            <mxGraphModel grid="0" gridSize="10" guides="1" tooltips="1" connect="1" arrows="1" fold="1" page="1" pageScale="1" pageWidth="827" pageHeight="1169">
              <root>
                <mxCell id="0"/>
                <mxCell id="1" parent="0"/>
                <mxCell id="s1" value="Hello" parent="1" vertex="1">
                  <mxGeometry width="120" height="80" as="geometry"/>
                </mxCell>
              </root>
            </mxGraphModel>
          </diagram>
        </mxfile>
        "###);
    }

    #[test]
    fn test_edge_points_and_compact_output() {
        let mut edge = Cell::plain("e", Some("1"));
        edge.kind = CellKind::Edge;
        edge.source = Some("a".into());
        edge.target = Some("b".into());
        edge.geometry = Some(Geometry {
            relative: true,
            points: vec![Waypoint { x: 10.0, y: 20.5 }],
            ..Geometry::default()
        });
        let xml = write_mxfile(&file(vec![edge]), false);

        assert!(xml.contains(
            r#"<mxCell id="e" parent="1" edge="1" source="a" target="b"><mxGeometry relative="1" as="geometry"><Array as="points"><mxPoint x="10" y="20.5"/></Array></mxGeometry></mxCell>"#
        ));
        assert!(!xml.contains('\n'));
    }
}
