//! Document root: pages, layers and the sources a document declares

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::element::Element;

/// Root of an input document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DiagramConfig {
    pub version: String,
    pub metadata: Metadata,
    /// Individual template files to load before processing
    pub templates: Vec<TemplateRef>,
    /// Template directories loaded under a hive name
    pub template_hives: Vec<TemplateHiveRef>,
    /// Provider declarations
    pub providers: Vec<ProviderRef>,
    pub diagram: Diagram,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Metadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    pub created: Option<String>,
    pub modified: Option<String>,
    pub tags: Vec<String>,
}

/// A single template file, registered under `name`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateRef {
    pub name: String,
    pub path: Option<PathBuf>,
    pub source: Option<String>,
}

/// A directory of templates registered under the hive `name`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateHiveRef {
    pub name: String,
    pub path: Option<PathBuf>,
    pub source: Option<String>,
    /// Glob matched against the file name or the hive-relative path
    pub include: Option<String>,
    pub exclude: Option<String>,
}

/// Where a declared provider should come from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Only providers compiled into the binary
    Builtin,
    /// Any registered provider
    #[default]
    Registry,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderRef {
    pub name: String,
    pub source: Option<String>,
    #[serde(rename = "type")]
    pub kind: ProviderKind,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Diagram {
    pub pages: Vec<Page>,
    pub properties: DiagramProperties,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagramProperties {
    pub grid: GridSettings,
    pub background: BackgroundSettings,
    pub scale: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSettings {
    pub enabled: bool,
    pub size: u32,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackgroundSettings {
    pub color: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Page {
    pub id: String,
    pub name: String,
    pub layers: Vec<Layer>,
    pub elements: Vec<Element>,
    pub properties: PageProperties,
}

/// Per-page overrides of the diagram-wide settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageProperties {
    pub width: u32,
    pub height: u32,
    pub background: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Layer {
    pub id: String,
    pub name: String,
    pub visible: bool,
    pub locked: bool,
    pub elements: Vec<Element>,
}

impl Default for Layer {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            visible: true,
            locked: false,
            elements: Vec::new(),
        }
    }
}

impl Page {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_element(mut self, element: Element) -> Self {
        self.elements.push(element);
        self
    }
}

impl DiagramConfig {
    /// A minimal document holding the given pages
    pub fn with_pages(pages: Vec<Page>) -> Self {
        Self {
            version: "1.0".to_string(),
            diagram: Diagram {
                pages,
                ..Diagram::default()
            },
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_sources_deserialize() {
        let config: DiagramConfig = serde_yaml::from_str(
            r#"
version: "1.0"
metadata:
  title: Sources
templates:
  - name: box
    path: shapes/box.yaml
templateHives:
  - name: net
    path: network
    include: "*.yaml"
providers:
  - name: core
    type: builtin
diagram:
  pages:
    - id: p1
      name: Page 1
      layers:
        - id: l1
          name: Background
"#,
        )
        .unwrap();

        assert_eq!(config.templates[0].path, Some(PathBuf::from("shapes/box.yaml")));
        assert_eq!(config.template_hives[0].include.as_deref(), Some("*.yaml"));
        assert_eq!(config.providers[0].kind, ProviderKind::Builtin);
        let layer = &config.diagram.pages[0].layers[0];
        assert!(layer.visible);
        assert!(!layer.locked);
    }
}
