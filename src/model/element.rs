//! The recursive element tree

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

use super::value::{Params, Value};

/// Kind of drawable element
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ElementType {
    Shape,
    Connector,
    Text,
    Group,
    Container,
    Swimlane,
    /// Placeholder for an element whose content comes from a template
    Template,
    /// Anything else the author wrote; rejected at generation time
    Other(String),
}

impl ElementType {
    pub fn as_str(&self) -> &str {
        match self {
            ElementType::Shape => "shape",
            ElementType::Connector => "connector",
            ElementType::Text => "text",
            ElementType::Group => "group",
            ElementType::Container => "container",
            ElementType::Swimlane => "swimlane",
            ElementType::Template => "template",
            ElementType::Other(other) => other,
        }
    }
}

impl From<String> for ElementType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "shape" => ElementType::Shape,
            "connector" => ElementType::Connector,
            "text" => ElementType::Text,
            "group" => ElementType::Group,
            "container" => ElementType::Container,
            "swimlane" => ElementType::Swimlane,
            "template" => ElementType::Template,
            _ => ElementType::Other(s),
        }
    }
}

impl From<ElementType> for String {
    fn from(t: ElementType) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a container treats its children
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NestingMode {
    Container,
    Group,
    Swimlane,
    Automatic,
    /// Set on elements instantiated from a template
    Child,
}

/// Child placement policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arrangement {
    Vertical,
    Horizontal,
    Grid,
    Free,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Padding {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Padding {
    pub fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// True when no side carries any padding
    pub fn is_zero(&self) -> bool {
        self.top == 0.0 && self.right == 0.0 && self.bottom == 0.0 && self.left == 0.0
    }
}

/// Child-layout configuration of a container element
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NestingConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<NestingMode>,
    pub auto_resize: bool,
    pub padding: Padding,
    pub spacing: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrangement: Option<Arrangement>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub x: f64,
    pub y: f64,
}

/// Position, size, content and connector endpoints of an element
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ElementProperties {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub z: i64,

    pub label: Option<String>,
    pub value: Option<String>,

    pub shape: Option<String>,
    pub shape_type: Option<String>,

    pub source: Option<String>,
    pub target: Option<String>,
    pub source_port: Option<String>,
    pub target_port: Option<String>,
    pub waypoints: Vec<Waypoint>,

    pub collapsible: bool,
    pub collapsed: bool,

    /// Arbitrary values, exposed to templates as substitution variables
    pub custom: IndexMap<String, Value>,
}

/// Visual attributes of an element
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Style {
    pub fill_color: Option<String>,
    pub fill_opacity: f64,

    pub stroke_color: Option<String>,
    pub stroke_width: f64,
    pub stroke_opacity: f64,
    pub stroke_dash_array: Option<String>,

    pub font_family: Option<String>,
    pub font_size: u32,
    pub font_color: Option<String>,
    pub font_style: Option<String>,
    pub text_align: Option<String>,
    pub vertical_align: Option<String>,
    pub label_position: Option<String>,
    pub vertical_label_position: Option<String>,

    pub rounded: bool,
    pub shadow: bool,
    pub glass: bool,
    pub sketch: bool,
    pub rotation: f64,

    /// Raw draw.io style entries, emitted verbatim after the known fields
    #[serde(deserialize_with = "scalar_string_map")]
    pub custom: IndexMap<String, String>,
}

/// Accept any scalar for custom style entries (`startSize: 30` is common).
fn scalar_string_map<'de, D>(deserializer: D) -> Result<IndexMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = IndexMap::<String, Value>::deserialize(deserializer)?;
    Ok(raw.into_iter().map(|(k, v)| (k, v.to_string())).collect())
}

/// A node in the diagram tree
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Element {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub element_type: Option<ElementType>,
    pub id: Option<String>,
    pub name: Option<String>,
    /// Reference to a template, possibly hive-qualified (`hive/name`)
    pub template: Option<String>,
    /// Provider resource reference (`provider-resourceType`)
    pub resource: Option<String>,
    /// Parameters handed to the resource provider
    pub parameters: Params,
    pub properties: ElementProperties,
    pub style: Style,
    pub nesting: NestingConfig,
    pub children: Vec<Element>,
    pub tags: Vec<String>,
}

/// Non-empty view of an optional string field
pub(crate) fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

impl Element {
    /// Create an element of the given type
    pub fn new(element_type: ElementType) -> Self {
        Self {
            element_type: Some(element_type),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.properties.label = Some(label.into());
        self
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.properties.width = width;
        self.properties.height = height;
        self
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn id(&self) -> Option<&str> {
        non_empty(&self.id)
    }

    pub fn name(&self) -> Option<&str> {
        non_empty(&self.name)
    }

    pub fn label(&self) -> Option<&str> {
        non_empty(&self.properties.label)
    }

    pub fn template_ref(&self) -> Option<&str> {
        non_empty(&self.template)
    }

    pub fn resource_ref(&self) -> Option<&str> {
        non_empty(&self.resource)
    }

    /// Identifier used for emitted cell ids: the id, falling back to the name
    pub fn identifier(&self) -> Option<&str> {
        self.id().or_else(|| self.name())
    }

    /// Human-facing name: the name, falling back to the id
    pub fn display_name(&self) -> &str {
        self.name().or_else(|| self.id()).unwrap_or("<unnamed>")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_from_yaml() {
        let element: Element = serde_yaml::from_str(
            r##"
type: shape
id: s1
name: Box
properties:
  width: 120
  height: 80
  label: Hello
  custom:
    tier: 2
style:
  fillColor: "#fff"
  custom:
    startSize: 30
nesting:
  arrangement: grid
  autoResize: true
children:
  - type: text
    name: caption
"##,
        )
        .unwrap();

        assert_eq!(element.element_type, Some(ElementType::Shape));
        assert_eq!(element.identifier(), Some("s1"));
        assert_eq!(element.display_name(), "Box");
        assert_eq!(element.properties.width, 120.0);
        assert_eq!(element.properties.custom["tier"], Value::Number(2.0));
        assert_eq!(element.style.custom["startSize"], "30");
        assert_eq!(element.nesting.arrangement, Some(Arrangement::Grid));
        assert!(element.nesting.auto_resize);
        assert_eq!(element.children[0].identifier(), Some("caption"));
    }

    #[test]
    fn test_unknown_type_is_kept() {
        let element: Element = serde_yaml::from_str("type: hexagon-ish\nid: x").unwrap();
        assert_eq!(
            element.element_type,
            Some(ElementType::Other("hexagon-ish".to_string()))
        );
    }

    #[test]
    fn test_empty_strings_count_as_unset() {
        let element = Element::new(ElementType::Shape).with_id("").with_name("only-name");
        assert_eq!(element.id(), None);
        assert_eq!(element.identifier(), Some("only-name"));
    }
}
