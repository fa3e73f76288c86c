//! In-memory form of a draw.io file

use crate::model::Waypoint;

/// The `mxfile` root: one diagram per page
#[derive(Debug, Clone, PartialEq)]
pub struct MxFile {
    pub host: String,
    pub agent: String,
    pub version: String,
    pub diagrams: Vec<DiagramPage>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiagramPage {
    pub id: String,
    pub name: String,
    pub model: GraphModel,
}

/// `mxGraphModel` settings plus its flat cell list
#[derive(Debug, Clone, PartialEq)]
pub struct GraphModel {
    pub grid: bool,
    pub grid_size: u32,
    pub page_scale: f64,
    pub page_width: u32,
    pub page_height: u32,
    pub background: Option<String>,
    pub cells: Vec<Cell>,
}

impl GraphModel {
    pub fn cell(&self, id: &str) -> Option<&Cell> {
        self.cells.iter().find(|c| c.id == id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    /// The two implicit root cells and layers
    Plain,
    Vertex,
    Edge,
}

/// One `mxCell`
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub id: String,
    pub kind: CellKind,
    pub value: Option<String>,
    pub style: Option<String>,
    pub parent: Option<String>,
    pub source: Option<String>,
    pub target: Option<String>,
    pub collapsed: bool,
    pub geometry: Option<Geometry>,
}

impl Cell {
    pub fn plain(id: impl Into<String>, parent: Option<&str>) -> Self {
        Self {
            id: id.into(),
            kind: CellKind::Plain,
            value: None,
            style: None,
            parent: parent.map(str::to_string),
            source: None,
            target: None,
            collapsed: false,
            geometry: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Geometry {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Edge geometries are relative to their terminals
    pub relative: bool,
    pub points: Vec<Waypoint>,
}
