//! Element tree to draw.io cells

use std::collections::{HashMap, HashSet};

use log::{debug, info, warn};

use super::config::DrawioConfig;
use super::model::{Cell, CellKind, DiagramPage, Geometry, GraphModel, MxFile};
use super::style::{element_style, layer_style};
use super::GenerateError;
use crate::layout::{layout_tree, LayoutConfig};
use crate::model::{non_empty, DiagramConfig, DiagramProperties, Element, ElementType, Layer, Page};

const ROOT_ID: &str = "0";
const DEFAULT_PARENT_ID: &str = "1";

/// Builds draw.io documents from processed diagrams.
///
/// Generation works on a copy of each page, so the caller's tree keeps its
/// authored geometry.
#[derive(Debug, Clone, Default)]
pub struct Generator {
    config: DrawioConfig,
    layout: LayoutConfig,
}

impl Generator {
    pub fn new(config: DrawioConfig) -> Self {
        Self {
            config,
            layout: LayoutConfig::default(),
        }
    }

    pub fn with_layout(mut self, layout: LayoutConfig) -> Self {
        self.layout = layout;
        self
    }

    pub fn config(&self) -> &DrawioConfig {
        &self.config
    }

    /// Generate one diagram per page
    pub fn generate(&self, document: &DiagramConfig) -> Result<MxFile, GenerateError> {
        let properties = &document.diagram.properties;
        let diagrams = document
            .diagram
            .pages
            .iter()
            .map(|page| self.generate_page(page, properties))
            .collect::<Result<Vec<_>, _>>()?;

        info!(
            pages = diagrams.len(),
            cells = diagrams.iter().map(|d| d.model.cells.len()).sum::<usize>();
            "Generated draw.io document"
        );

        Ok(MxFile {
            host: self.config.host.clone(),
            agent: self.config.agent.clone(),
            version: self.config.version.clone(),
            diagrams,
        })
    }

    pub fn generate_page(
        &self,
        page: &Page,
        properties: &DiagramProperties,
    ) -> Result<DiagramPage, GenerateError> {
        validate_page(page)?;

        let mut layers = page.layers.clone();
        let mut elements = page.elements.clone();
        for element in layers
            .iter_mut()
            .flat_map(|l| l.elements.iter_mut())
            .chain(elements.iter_mut())
        {
            layout_tree(element, &self.layout);
        }

        let location = format!("page/{}", page.id);
        let index = PageIndex::build(&layers, &elements, &location)?;
        let mut emitter = Emitter {
            index: &index,
            cells: vec![
                Cell::plain(ROOT_ID, None),
                Cell::plain(DEFAULT_PARENT_ID, Some(ROOT_ID)),
            ],
        };

        for layer in &layers {
            let layer_id = layer_cell_id(layer).to_string();
            let mut cell = Cell::plain(layer_id.clone(), Some(ROOT_ID));
            cell.value = non_empty_str(&layer.name);
            cell.style = layer_style(layer);
            emitter.cells.push(cell);

            let layer_location = format!("{}/layer/{}", location, layer_id);
            for element in by_z(&layer.elements) {
                emitter.emit_root(element, &layer_id, &layer_location)?;
            }
        }
        for element in by_z(&elements) {
            emitter.emit_root(element, DEFAULT_PARENT_ID, &location)?;
        }

        debug!(page = page.id.as_str(), cells = emitter.cells.len(); "Generated page");

        Ok(DiagramPage {
            id: page.id.clone(),
            name: page.name.clone(),
            model: self.graph_model(page, properties, emitter.cells),
        })
    }

    fn graph_model(&self, page: &Page, properties: &DiagramProperties, cells: Vec<Cell>) -> GraphModel {
        let positive_or = |value: u32, fallback: u32| if value > 0 { value } else { fallback };

        let background = page
            .properties
            .background
            .clone()
            .filter(|b| !b.is_empty())
            .or_else(|| properties.background.color.clone())
            .filter(|b| !b.is_empty());

        GraphModel {
            grid: properties.grid.enabled,
            grid_size: positive_or(properties.grid.size, self.config.grid_size),
            page_scale: if properties.scale > 0.0 {
                properties.scale
            } else {
                1.0
            },
            page_width: positive_or(page.properties.width, self.config.page_width),
            page_height: positive_or(page.properties.height, self.config.page_height),
            background,
            cells,
        }
    }
}

fn non_empty_str(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

fn layer_cell_id(layer: &Layer) -> &str {
    if layer.id.is_empty() {
        &layer.name
    } else {
        &layer.id
    }
}

/// Siblings in ascending `z`, keeping authored order for ties
fn by_z(elements: &[Element]) -> Vec<&Element> {
    let mut ordered: Vec<&Element> = elements.iter().collect();
    ordered.sort_by_key(|e| e.properties.z);
    ordered
}

/// Check the id/name rules for a whole page before anything is emitted
fn validate_page(page: &Page) -> Result<(), GenerateError> {
    let location = format!("page/{}", page.id);
    if page.id.is_empty() {
        return Err(GenerateError::structural(location, "page ID is required"));
    }
    if page.name.is_empty() {
        return Err(GenerateError::structural(location, "page name is required"));
    }

    for layer in &page.layers {
        if layer_cell_id(layer).is_empty() {
            return Err(GenerateError::structural(
                format!("{}/layer", location),
                "layers must have either an 'id' or a 'name' field",
            ));
        }
        let layer_location = format!("{}/layer/{}", location, layer_cell_id(layer));
        for element in &layer.elements {
            validate_element(element, &layer_location, false)?;
        }
    }
    for element in &page.elements {
        validate_element(element, &location, true)?;
    }
    Ok(())
}

fn validate_element(element: &Element, parent: &str, page_level: bool) -> Result<(), GenerateError> {
    let location = format!("{}/{}", parent, element.display_name());
    if page_level && (element.id().is_none() || element.name().is_none()) {
        return Err(GenerateError::structural(
            location,
            "page-level elements must have both 'id' and 'name' fields",
        ));
    }
    if element.identifier().is_none() {
        return Err(GenerateError::structural(
            location,
            "elements must have either an 'id' or a 'name' field",
        ));
    }
    for child in &element.children {
        validate_element(child, &location, false)?;
    }
    Ok(())
}

fn child_path(parent: &str, child: &Element) -> String {
    format!("{}/{}", parent, child.identifier().unwrap_or_default())
}

/// Every cell id on a page, plus the ids an element can be referenced by
struct PageIndex {
    ids: HashSet<String>,
    /// Authored id or name to the hierarchical ids carrying it
    aliases: HashMap<String, Vec<String>>,
}

impl PageIndex {
    fn build(layers: &[Layer], elements: &[Element], location: &str) -> Result<Self, GenerateError> {
        let mut index = Self {
            ids: HashSet::from([ROOT_ID.to_string(), DEFAULT_PARENT_ID.to_string()]),
            aliases: HashMap::new(),
        };

        for layer in layers {
            let id = layer_cell_id(layer);
            if !index.ids.insert(id.to_string()) {
                return Err(GenerateError::structural(
                    format!("{}/layer/{}", location, id),
                    format!("duplicate cell id '{}'", id),
                ));
            }
        }
        for element in layers.iter().flat_map(|l| l.elements.iter()).chain(elements) {
            let path = element.identifier().unwrap_or_default().to_string();
            index.add(element, path, location)?;
        }
        Ok(index)
    }

    fn add(&mut self, element: &Element, path: String, parent: &str) -> Result<(), GenerateError> {
        let location = format!("{}/{}", parent, element.display_name());
        if !self.ids.insert(path.clone()) {
            return Err(GenerateError::structural(
                location,
                format!("duplicate cell id '{}'", path),
            ));
        }

        let mut names = vec![element.id(), element.name()];
        names.dedup();
        for name in names.into_iter().flatten() {
            self.aliases
                .entry(name.to_string())
                .or_default()
                .push(path.clone());
        }

        for child in &element.children {
            self.add(child, child_path(&path, child), &location)?;
        }
        Ok(())
    }

    /// Map a connector endpoint onto a cell id
    fn resolve(&self, reference: &str, location: &str) -> String {
        if self.ids.contains(reference) {
            return reference.to_string();
        }
        match self.aliases.get(reference).map(Vec::as_slice) {
            Some([only]) => only.clone(),
            Some(many) => {
                warn!(
                    reference = reference,
                    matches = many.len(),
                    location = location;
                    "Ambiguous connector endpoint, keeping it verbatim"
                );
                reference.to_string()
            }
            None => {
                warn!(reference = reference, location = location; "Unknown connector endpoint");
                reference.to_string()
            }
        }
    }
}

struct Emitter<'a> {
    index: &'a PageIndex,
    cells: Vec<Cell>,
}

impl Emitter<'_> {
    fn emit_root(&mut self, element: &Element, parent: &str, location: &str) -> Result<(), GenerateError> {
        let path = element.identifier().unwrap_or_default().to_string();
        self.emit(element, &path, parent, location)
    }

    fn emit(
        &mut self,
        element: &Element,
        path: &str,
        parent: &str,
        parent_location: &str,
    ) -> Result<(), GenerateError> {
        let location = format!("{}/{}", parent_location, element.display_name());
        let props = &element.properties;

        let cell = match &element.element_type {
            Some(
                ElementType::Shape
                | ElementType::Container
                | ElementType::Group
                | ElementType::Swimlane,
            ) => {
                let value = non_empty(&props.label)
                    .or_else(|| non_empty(&props.value))
                    .unwrap_or_else(|| element.display_name());
                self.vertex(element, path, parent, Some(value.to_string()))
            }
            Some(ElementType::Text) => {
                let value = non_empty(&props.label).or_else(|| non_empty(&props.value));
                self.vertex(element, path, parent, value.map(str::to_string))
            }
            Some(ElementType::Connector) => Cell {
                kind: CellKind::Edge,
                value: non_empty(&props.label)
                    .or_else(|| non_empty(&props.value))
                    .map(str::to_string),
                style: Some(element_style(element)),
                source: non_empty(&props.source).map(|s| self.index.resolve(s, &location)),
                target: non_empty(&props.target).map(|t| self.index.resolve(t, &location)),
                geometry: Some(Geometry {
                    relative: true,
                    points: props.waypoints.clone(),
                    ..Geometry::default()
                }),
                ..Cell::plain(path, Some(parent))
            },
            other => {
                return Err(GenerateError::UnsupportedElementType {
                    element: element.display_name().to_string(),
                    element_type: other.as_ref().map_or("", |t| t.as_str()).to_string(),
                    location,
                })
            }
        };

        let is_edge = cell.kind == CellKind::Edge;
        self.cells.push(cell);

        if !is_edge {
            for child in by_z(&element.children) {
                self.emit(child, &child_path(path, child), path, &location)?;
            }
        }
        Ok(())
    }

    fn vertex(&self, element: &Element, id: &str, parent: &str, value: Option<String>) -> Cell {
        let props = &element.properties;
        Cell {
            kind: CellKind::Vertex,
            value,
            style: Some(element_style(element)),
            collapsed: props.collapsed,
            geometry: Some(Geometry {
                x: props.x,
                y: props.y,
                width: props.width,
                height: props.height,
                ..Geometry::default()
            }),
            ..Cell::plain(id, Some(parent))
        }
    }
}
