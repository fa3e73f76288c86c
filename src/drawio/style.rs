//! draw.io style strings
//!
//! A style is a `;`-joined list of `key=value` tokens (or bare flags such as
//! `text`). Tokens come from the element's populated style fields in a fixed
//! order, then its custom entries, then type-specific defaults that are only
//! added when the key is not present yet.

use crate::model::{format_number, non_empty, Element, ElementType, Layer};

/// Style of a swimlane that sets nothing itself
pub const SWIMLANE_FALLBACK_STYLE: &str = "swimlane;fontStyle=0;childLayout=stackLayout;horizontal=1;startSize=30;horizontalStack=0;resizeParent=1;resizeParentMax=0;resizeLast=0;collapsible=1;marginBottom=0;";

/// Style of a group or container that sets nothing itself
pub const GROUP_FALLBACK_STYLE: &str =
    "rounded=0;whiteSpace=wrap;html=1;container=1;collapsible=0;";

/// Ordered style tokens
#[derive(Debug, Default, Clone)]
pub struct StyleBuilder {
    tokens: Vec<String>,
}

impl StyleBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a token for `key` exists, either `key=...` or the bare flag
    pub fn contains(&self, key: &str) -> bool {
        self.tokens.iter().any(|t| {
            t == key
                || t.strip_prefix(key)
                    .is_some_and(|rest| rest.starts_with('='))
        })
    }

    pub fn push(&mut self, key: &str, value: impl AsRef<str>) {
        self.tokens.push(format!("{}={}", key, value.as_ref()));
    }

    pub fn push_flag(&mut self, flag: &str) {
        self.tokens.push(flag.to_string());
    }

    /// Add `key=value` unless `key` is already set
    pub fn push_default(&mut self, key: &str, value: &str) {
        if !self.contains(key) {
            self.push(key, value);
        }
    }

    fn push_flag_default(&mut self, flag: &str) {
        if !self.contains(flag) {
            self.push_flag(flag);
        }
    }

    fn push_opt(&mut self, key: &str, value: &Option<String>) {
        if let Some(value) = non_empty(value) {
            self.push(key, value);
        }
    }

    fn push_number(&mut self, key: &str, value: f64) {
        if value != 0.0 {
            self.push(key, format_number(value));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn build(&self) -> String {
        self.tokens.join(";")
    }
}

/// Map a named font style onto draw.io's bit flags; numbers pass through
pub fn font_style_code(style: &str) -> Option<String> {
    let code = match style.trim().to_ascii_lowercase().as_str() {
        "normal" | "" => 0,
        "bold" => 1,
        "italic" => 2,
        "bold italic" | "bolditalic" | "italic bold" => 3,
        "underline" => 4,
        other => return other.parse::<u32>().ok().map(|n| n.to_string()),
    };
    Some(code.to_string())
}

/// Relative attachment point of a connector port
pub fn port_point(port: &str) -> Option<(&'static str, &'static str)> {
    match port {
        "top" => Some(("0.5", "0")),
        "right" => Some(("1", "0.5")),
        "bottom" => Some(("0.5", "1")),
        "left" => Some(("0", "0.5")),
        "center" => Some(("0.5", "0.5")),
        _ => None,
    }
}

/// Tokens derived from the element's own properties and style
fn base_tokens(element: &Element) -> StyleBuilder {
    let mut builder = StyleBuilder::new();
    let style = &element.style;

    builder.push_opt("shape", &element.properties.shape);
    builder.push_opt("fillColor", &style.fill_color);
    builder.push_number("fillOpacity", style.fill_opacity);
    builder.push_opt("strokeColor", &style.stroke_color);
    builder.push_number("strokeWidth", style.stroke_width);
    builder.push_number("strokeOpacity", style.stroke_opacity);
    if let Some(dash) = non_empty(&style.stroke_dash_array) {
        builder.push("dashed", "1");
        builder.push("dashPattern", dash);
    }
    builder.push_opt("fontFamily", &style.font_family);
    if style.font_size > 0 {
        builder.push("fontSize", style.font_size.to_string());
    }
    builder.push_opt("fontColor", &style.font_color);
    if let Some(code) = non_empty(&style.font_style).and_then(font_style_code) {
        builder.push("fontStyle", code);
    }
    builder.push_opt("align", &style.text_align);
    builder.push_opt("verticalAlign", &style.vertical_align);
    builder.push_opt("labelPosition", &style.label_position);
    builder.push_opt("verticalLabelPosition", &style.vertical_label_position);
    for (flag, set) in [
        ("rounded", style.rounded),
        ("shadow", style.shadow),
        ("glass", style.glass),
        ("sketch", style.sketch),
    ] {
        if set {
            builder.push(flag, "1");
        }
    }
    builder.push_number("rotation", style.rotation);
    if element.properties.collapsible {
        builder.push("collapsible", "1");
    }

    for (key, value) in &style.custom {
        if value.is_empty() {
            builder.push_flag(key);
        } else {
            builder.push(key, value);
        }
    }

    builder
}

/// Full style string for an element's cell
pub fn element_style(element: &Element) -> String {
    let mut builder = base_tokens(element);

    match element.element_type {
        Some(ElementType::Connector) => {
            let props = &element.properties;
            if let Some((x, y)) = non_empty(&props.source_port).and_then(port_point) {
                builder.push_default("exitX", x);
                builder.push_default("exitY", y);
            }
            if let Some((x, y)) = non_empty(&props.target_port).and_then(port_point) {
                builder.push_default("entryX", x);
                builder.push_default("entryY", y);
            }
            builder.push_default("edgeStyle", "orthogonalEdgeStyle");
            builder.push_default("html", "1");
            builder.push_default("jettySize", "auto");
            builder.push_default("orthogonalLoop", "1");
        }
        Some(ElementType::Text) => {
            builder.push_flag_default("text");
            builder.push_default("html", "1");
        }
        Some(ElementType::Swimlane) if builder.is_empty() => {
            return SWIMLANE_FALLBACK_STYLE.to_string();
        }
        Some(ElementType::Group | ElementType::Container) => {
            if builder.is_empty() {
                return GROUP_FALLBACK_STYLE.to_string();
            }
            builder.push_default("container", "1");
        }
        _ => {
            if !element.children.is_empty() {
                builder.push_default("container", "1");
            }
        }
    }

    builder.build()
}

/// Style of a layer cell: hidden and locked flags only
pub fn layer_style(layer: &Layer) -> Option<String> {
    let mut builder = StyleBuilder::new();
    if !layer.visible {
        builder.push("visible", "0");
    }
    if layer.locked {
        builder.push("locked", "1");
    }
    (!builder.is_empty()).then(|| builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_matches_key_or_flag() {
        let mut builder = StyleBuilder::new();
        builder.push("html", "1");
        builder.push_flag("text");

        assert!(builder.contains("html"));
        assert!(builder.contains("text"));
        assert!(!builder.contains("htm"));
        assert!(!builder.contains("tex"));
    }

    #[test]
    fn test_shape_style_order() {
        let mut element = Element::new(ElementType::Shape).with_id("s");
        element.properties.shape = Some("ellipse".into());
        element.style.fill_color = Some("#E3F2FD".into());
        element.style.stroke_color = Some("#1976D2".into());
        element.style.stroke_width = 2.0;
        element.style.font_size = 14;
        element.style.font_style = Some("bold".into());
        element.style.rounded = true;
        element.style.custom.insert("whiteSpace".into(), "wrap".into());

        insta::assert_snapshot!(
            element_style(&element),
            @"shape=ellipse;fillColor=#E3F2FD;strokeColor=#1976D2;strokeWidth=2;fontSize=14;fontStyle=1;rounded=1;whiteSpace=wrap"
        );
    }

    #[test]
    fn test_dash_array_forces_dashed() {
        let mut element = Element::new(ElementType::Shape).with_id("s");
        element.style.stroke_dash_array = Some("5 5".into());
        insta::assert_snapshot!(element_style(&element), @"dashed=1;dashPattern=5 5");
    }

    #[test]
    fn test_connector_defaults_and_ports() {
        let mut element = Element::new(ElementType::Connector).with_id("c");
        element.properties.source_port = Some("right".into());
        element.properties.target_port = Some("top".into());
        element.style.custom.insert("html".into(), "0".into());

        insta::assert_snapshot!(
            element_style(&element),
            @"html=0;exitX=1;exitY=0.5;entryX=0.5;entryY=0;edgeStyle=orthogonalEdgeStyle;jettySize=auto;orthogonalLoop=1"
        );
    }

    #[test]
    fn test_text_defaults() {
        let element = Element::new(ElementType::Text).with_id("t");
        insta::assert_snapshot!(element_style(&element), @"text;html=1");
    }

    #[test]
    fn test_container_fallbacks() {
        let swimlane = Element::new(ElementType::Swimlane).with_id("lane");
        assert_eq!(element_style(&swimlane), SWIMLANE_FALLBACK_STYLE);

        let group = Element::new(ElementType::Group).with_id("g");
        assert_eq!(element_style(&group), GROUP_FALLBACK_STYLE);

        let mut styled = Element::new(ElementType::Group).with_id("g");
        styled.style.fill_color = Some("#F5F5F5".into());
        insta::assert_snapshot!(element_style(&styled), @"fillColor=#F5F5F5;container=1");
    }

    #[test]
    fn test_font_style_codes() {
        assert_eq!(font_style_code("bold italic").as_deref(), Some("3"));
        assert_eq!(font_style_code("Italic").as_deref(), Some("2"));
        assert_eq!(font_style_code("5").as_deref(), Some("5"));
        assert_eq!(font_style_code("wavy"), None);
    }

    #[test]
    fn test_layer_style() {
        let mut layer = Layer::default();
        assert_eq!(layer_style(&layer), None);
        layer.visible = false;
        layer.locked = true;
        assert_eq!(layer_style(&layer).as_deref(), Some("visible=0;locked=1"));
    }
}
