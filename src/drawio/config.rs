//! Configuration for draw.io output

/// Document-level attributes and page defaults of the generated file
#[derive(Debug, Clone, PartialEq)]
pub struct DrawioConfig {
    /// `host` attribute of the `mxfile` element
    pub host: String,

    /// `agent` attribute of the `mxfile` element
    pub agent: String,

    /// draw.io file-format version written to `mxfile`
    pub version: String,

    /// Page size used unless a page overrides it
    pub page_width: u32,
    pub page_height: u32,

    /// Grid size used unless the diagram sets one
    pub grid_size: u32,

    /// Whether to format output with indentation
    pub pretty_print: bool,
}

impl Default for DrawioConfig {
    fn default() -> Self {
        Self {
            host: "app.diagrams.net".to_string(),
            agent: "drawloom".to_string(),
            version: "24.7.17".to_string(),
            page_width: 827,
            page_height: 1169,
            grid_size: 10,
            pretty_print: true,
        }
    }
}

impl DrawioConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_agent(mut self, agent: impl Into<String>) -> Self {
        self.agent = agent.into();
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Set the default page size
    pub fn with_page_size(mut self, width: u32, height: u32) -> Self {
        self.page_width = width;
        self.page_height = height;
        self
    }

    pub fn with_grid_size(mut self, size: u32) -> Self {
        self.grid_size = size;
        self
    }

    pub fn with_pretty_print(mut self, pretty: bool) -> Self {
        self.pretty_print = pretty;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DrawioConfig::default();
        assert_eq!(config.host, "app.diagrams.net");
        assert_eq!(config.version, "24.7.17");
        assert_eq!((config.page_width, config.page_height), (827, 1169));
        assert_eq!(config.grid_size, 10);
        assert!(config.pretty_print);
    }

    #[test]
    fn test_builder_pattern() {
        let config = DrawioConfig::new()
            .with_agent("ci")
            .with_page_size(1169, 827)
            .with_pretty_print(false);

        assert_eq!(config.agent, "ci");
        assert_eq!(config.page_width, 1169);
        assert!(!config.pretty_print);
    }
}
