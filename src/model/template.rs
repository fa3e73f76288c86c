//! Template definitions as loaded from template files

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::element::{Arrangement, Element, ElementProperties, Padding, Style};
use super::value::Value;

/// A reusable group configuration applied to elements by reference
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Template {
    pub name: String,
    pub description: Option<String>,
    pub version: Option<String>,
    pub dependencies: Vec<Dependency>,
    pub parameters: Vec<Parameter>,
    pub group: GroupConfig,
    /// File the template was read from; relative icon paths resolve against it
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Template {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Declared parameter by name
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }
}

/// Defaults merged into elements instantiated from a template
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GroupConfig {
    pub properties: ElementProperties,
    pub style: Style,
    pub auto_resize: bool,
    pub padding: Padding,
    pub spacing: f64,
    pub arrangement: Option<Arrangement>,
    pub icon: Option<IconConfig>,
    /// Literal children copied into every instance
    pub children: Vec<Element>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IconConfig {
    /// `shape` or `image`
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Shape name, or image path / URI
    pub shape: Option<String>,
    pub fill_color: Option<String>,
    pub stroke_color: Option<String>,
    pub position: Option<String>,
    pub size: f64,
}

/// How a dependency relates the template to the one it names
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Relationship {
    #[default]
    Parent,
    Ancestor,
    Peer,
    Child,
    Other(String),
}

impl Relationship {
    pub fn as_str(&self) -> &str {
        match self {
            Relationship::Parent => "parent",
            Relationship::Ancestor => "ancestor",
            Relationship::Peer => "peer",
            Relationship::Child => "child",
            Relationship::Other(other) => other,
        }
    }
}

impl From<String> for Relationship {
    fn from(s: String) -> Self {
        match s.as_str() {
            "parent" => Relationship::Parent,
            "ancestor" => Relationship::Ancestor,
            "peer" => Relationship::Peer,
            "child" => Relationship::Child,
            _ => Relationship::Other(s),
        }
    }
}

impl From<Relationship> for String {
    fn from(r: Relationship) -> Self {
        r.as_str().to_string()
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dependency {
    pub name: String,
    /// Template the relationship points at
    #[serde(rename = "type")]
    pub template_type: String,
    pub required: bool,
    pub description: Option<String>,
    pub relationship: Relationship,
    pub multiple: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Parameter {
    pub name: String,
    /// string, number, boolean or color; informational
    #[serde(rename = "type")]
    pub param_type: Option<String>,
    pub default: Option<Value>,
    pub required: bool,
    pub description: Option<String>,
}
