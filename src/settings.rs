//! TOML settings for layout defaults, substitution fallbacks and output
//!
//! Every key is optional; anything left out keeps the built-in default.
//!
//! ```toml
//! [layout]
//! default_width = 160
//! padding = { top = 40, right = 20, bottom = 20, left = 20 }
//!
//! [template]
//! fill_color = "#FFFFFF"
//!
//! [output]
//! pretty_print = false
//! ```

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::drawio::DrawioConfig;
use crate::layout::LayoutConfig;
use crate::model::Padding;
use crate::template::TemplateDefaults;

/// Errors that can occur when loading settings
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read settings file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse settings TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Resolved settings
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub layout: LayoutConfig,
    pub template: TemplateDefaults,
    pub output: DrawioConfig,
}

/// TOML structure for deserializing settings
#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct TomlSettings {
    #[serde(default)]
    layout: TomlLayout,
    #[serde(default)]
    template: TomlTemplate,
    #[serde(default)]
    output: TomlOutput,
}

#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct TomlLayout {
    default_width: Option<f64>,
    default_height: Option<f64>,
    spacing: Option<f64>,
    padding: Option<Padding>,
    max_grid_columns: Option<usize>,
    horizontal_max_children: Option<usize>,
}

#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct TomlTemplate {
    fill_color: Option<String>,
    stroke_color: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct TomlOutput {
    host: Option<String>,
    agent: Option<String>,
    version: Option<String>,
    page_width: Option<u32>,
    page_height: Option<u32>,
    grid_size: Option<u32>,
    pretty_print: Option<bool>,
}

/// Built-in settings, in the same format a settings file uses
const DEFAULT_SETTINGS: &str = r##"
[layout]
default_width = 140
default_height = 60
spacing = 20
padding = { top = 30, right = 20, bottom = 20, left = 20 }
max_grid_columns = 4
horizontal_max_children = 4

[template]
fill_color = "#E3F2FD"
stroke_color = "#1976D2"

[output]
host = "app.diagrams.net"
agent = "drawloom"
version = "24.7.17"
page_width = 827
page_height = 1169
grid_size = 10
pretty_print = true
"##;

impl Settings {
    /// Load settings from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load settings from a TOML string, layered over the built-in defaults
    pub fn from_str(content: &str) -> Result<Self, SettingsError> {
        let parsed: TomlSettings = toml::from_str(content)?;
        Ok(parsed.apply(Self::builtin()))
    }

    fn builtin() -> Self {
        Settings {
            layout: LayoutConfig::default(),
            template: TemplateDefaults::default(),
            output: DrawioConfig::default(),
        }
    }
}

impl TomlSettings {
    fn apply(self, mut settings: Settings) -> Settings {
        let layout = self.layout;
        let (mut width, mut height) = settings.layout.default_size;
        if let Some(w) = layout.default_width {
            width = w;
        }
        if let Some(h) = layout.default_height {
            height = h;
        }
        settings.layout = settings.layout.with_default_size(width, height);
        if let Some(spacing) = layout.spacing {
            settings.layout = settings.layout.with_spacing(spacing);
        }
        if let Some(padding) = layout.padding {
            settings.layout = settings.layout.with_padding(padding);
        }
        if let Some(columns) = layout.max_grid_columns {
            settings.layout = settings.layout.with_max_grid_columns(columns);
        }
        if let Some(count) = layout.horizontal_max_children {
            settings.layout = settings.layout.with_horizontal_max_children(count);
        }

        if let Some(color) = self.template.fill_color {
            settings.template = settings.template.with_fill_color(color);
        }
        if let Some(color) = self.template.stroke_color {
            settings.template = settings.template.with_stroke_color(color);
        }

        let output = self.output;
        let mut out = settings.output;
        if let Some(host) = output.host {
            out = out.with_host(host);
        }
        if let Some(agent) = output.agent {
            out = out.with_agent(agent);
        }
        if let Some(version) = output.version {
            out = out.with_version(version);
        }
        let page_width = output.page_width.unwrap_or(out.page_width);
        let page_height = output.page_height.unwrap_or(out.page_height);
        out = out.with_page_size(page_width, page_height);
        if let Some(size) = output.grid_size {
            out = out.with_grid_size(size);
        }
        if let Some(pretty) = output.pretty_print {
            out = out.with_pretty_print(pretty);
        }
        settings.output = out;

        settings
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_str(DEFAULT_SETTINGS).unwrap_or_else(|_| Self::builtin())
    }
}
