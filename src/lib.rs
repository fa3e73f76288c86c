//! drawloom - declarative YAML diagrams rendered to draw.io files
//!
//! A document describes pages, layers and a tree of elements. Elements can
//! pull their look from reusable templates (`template: network/subnet`) or
//! from resource providers (`resource: core-shape`). After templates and
//! providers are applied, containers lay out their children and every
//! element becomes a draw.io cell.
//!
//! # Example
//!
//! ```rust
//! let xml = drawloom::convert(r#"
//! version: "1.0"
//! diagram:
//!   pages:
//!     - id: p1
//!       name: Page 1
//!       elements:
//!         - type: shape
//!           id: s1
//!           name: Box
//!           properties: { width: 120, height: 80, label: Hello }
//! "#).unwrap();
//!
//! assert!(xml.contains(r#"<mxCell id="s1" value="Hello""#));
//! ```

pub mod drawio;
pub mod error;
pub mod expr;
pub mod layout;
pub mod model;
pub mod provider;
pub mod settings;
pub mod template;

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::info;
use thiserror::Error;

pub use drawio::{DrawioConfig, GenerateError, Generator, MxFile};
pub use error::ExpressionError;
pub use layout::LayoutConfig;
pub use model::{DiagramConfig, Element, ElementType, Page, Value};
pub use provider::{CoreProvider, Provider, ProviderError, ProviderRegistry};
pub use settings::{Settings, SettingsError};
pub use template::{TemplateDefaults, TemplateError, TemplateProcessor, TemplateStore};

/// Errors that can occur anywhere in the conversion pipeline
#[derive(Debug, Error)]
pub enum Error {
    /// The input document is malformed or fails basic validation
    #[error("invalid document: {0}")]
    Document(String),

    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("template error: {0}")]
    Template(#[from] TemplateError),

    #[error("generation error: {0}")]
    Generate(#[from] GenerateError),

    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),
}

impl Error {
    /// Human-readable report; substitution syntax errors include the
    /// offending field text with the error position marked
    pub fn report(&self) -> String {
        match self {
            Error::Template(TemplateError::Expression {
                element,
                field,
                text,
                error,
                ..
            }) => format!(
                "{}\n{}",
                self,
                error.format(text, &format!("{}.{}", element, field))
            ),
            Error::Template(err) => match err.suggestions() {
                Some(suggestions) if !suggestions.is_empty() => {
                    format!("{}\n  did you mean: {}?", self, suggestions.join(", "))
                }
                _ => self.to_string(),
            },
            _ => self.to_string(),
        }
    }
}

/// Configuration for the complete conversion pipeline
#[derive(Debug, Clone, Default)]
pub struct RenderConfig {
    /// Nesting defaults
    pub layout: LayoutConfig,
    /// Output document settings
    pub drawio: DrawioConfig,
    /// Substitution fallbacks for `fillColor` and `strokeColor`
    pub template_defaults: TemplateDefaults,
    /// Directory whose templates are all loaded before processing
    pub template_dir: Option<PathBuf>,
    /// Base for relative template paths when `template_dir` is unset
    pub base_dir: Option<PathBuf>,
}

impl RenderConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a configuration from loaded settings
    pub fn from_settings(settings: Settings) -> Self {
        Self {
            layout: settings.layout,
            drawio: settings.output,
            template_defaults: settings.template,
            ..Self::default()
        }
    }

    pub fn with_layout(mut self, config: LayoutConfig) -> Self {
        self.layout = config;
        self
    }

    pub fn with_drawio(mut self, config: DrawioConfig) -> Self {
        self.drawio = config;
        self
    }

    pub fn with_template_defaults(mut self, defaults: TemplateDefaults) -> Self {
        self.template_defaults = defaults;
        self
    }

    pub fn with_template_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.template_dir = Some(dir.into());
        self
    }

    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }
}

/// Parse and validate a YAML document
pub fn parse_document(yaml: &str) -> Result<DiagramConfig, Error> {
    let config: DiagramConfig = serde_yaml::from_str(yaml)?;
    validate_document(&config)?;
    Ok(config)
}

/// Read, parse and validate a YAML document from disk
pub fn load_document(path: &Path) -> Result<DiagramConfig, Error> {
    let yaml = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_document(&yaml)
}

/// Document-level checks done before any template is applied
pub fn validate_document(config: &DiagramConfig) -> Result<(), Error> {
    if config.version.trim().is_empty() {
        return Err(Error::Document("version field is required".to_string()));
    }
    if config.diagram.pages.is_empty() {
        return Err(Error::Document("at least one page is required".to_string()));
    }

    let mut seen = HashSet::new();
    for page in &config.diagram.pages {
        if page.id.is_empty() {
            return Err(Error::Document("page ID is required".to_string()));
        }
        if !seen.insert(page.id.as_str()) {
            return Err(Error::Document(format!("duplicate page ID: {}", page.id)));
        }
    }
    Ok(())
}

/// Apply templates and provider resources to every page, in place
pub fn process(
    config: &mut DiagramConfig,
    registry: Arc<ProviderRegistry>,
    render: &RenderConfig,
) -> Result<(), Error> {
    let mut processor = TemplateProcessor::new(registry)
        .with_defaults(render.template_defaults.clone());
    if let Some(dir) = &render.base_dir {
        processor = processor.with_base_dir(dir);
    }
    if let Some(dir) = &render.template_dir {
        processor = processor.with_template_dir(dir);
        let loaded = processor.load_templates()?;
        info!(count = loaded, dir:? = dir; "Loaded templates");
    }

    processor.process_diagram(config)?;
    Ok(())
}

/// Generate the draw.io document for a processed diagram
pub fn generate(config: &DiagramConfig, render: &RenderConfig) -> Result<MxFile, Error> {
    let generator = Generator::new(render.drawio.clone()).with_layout(render.layout.clone());
    Ok(generator.generate(config)?)
}

/// Convert a YAML document to draw.io XML with default configuration and
/// the built-in providers
pub fn convert(yaml: &str) -> Result<String, Error> {
    convert_with(
        yaml,
        &RenderConfig::default(),
        Arc::new(ProviderRegistry::with_builtins()),
    )
}

/// Convert a YAML document to draw.io XML
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use drawloom::{convert_with, DrawioConfig, ProviderRegistry, RenderConfig};
///
/// let config = RenderConfig::new().with_drawio(DrawioConfig::new().with_pretty_print(false));
/// let xml = convert_with(
///     "version: '1.0'\ndiagram: { pages: [ { id: p1, name: One } ] }",
///     &config,
///     Arc::new(ProviderRegistry::with_builtins()),
/// )
/// .unwrap();
/// assert!(xml.contains(r#"<diagram id="p1" name="One">"#));
/// ```
pub fn convert_with(
    yaml: &str,
    render: &RenderConfig,
    registry: Arc<ProviderRegistry>,
) -> Result<String, Error> {
    let mut config = parse_document(yaml)?;
    process(&mut config, registry, render)?;
    let file = generate(&config, render)?;
    Ok(drawio::write_mxfile(&file, render.drawio.pretty_print))
}
