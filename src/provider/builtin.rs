//! The built-in `core` provider: plain draw.io building blocks

use indexmap::IndexMap;

use super::{Provider, ProviderError, ResourceDefinition, ResourceExample};
use crate::model::{Element, ElementType, Params, Value};

const PROVIDER_NAME: &str = "core";
const PROVIDER_VERSION: &str = "1.0.0";

const FONT_STYLES: &[&str] = &["normal", "bold", "italic", "bold italic"];
const STROKE_STYLES: &[&str] = &["solid", "dashed", "dotted"];
const PORTS: &[&str] = &["top", "right", "bottom", "left", "center"];

#[derive(Debug, Clone, Copy, PartialEq)]
enum ParamKind {
    String,
    Number,
    Integer,
    Boolean,
}

impl ParamKind {
    fn as_str(self) -> &'static str {
        match self {
            ParamKind::String => "string",
            ParamKind::Number => "number",
            ParamKind::Integer => "integer",
            ParamKind::Boolean => "boolean",
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum ParamDefault {
    None,
    Str(&'static str),
    Num(f64),
    Bool(bool),
}

/// Declared parameter of a core resource
#[derive(Debug)]
struct ParamSpec {
    name: &'static str,
    /// Used in validation messages (`font size must be ...`)
    human: &'static str,
    kind: ParamKind,
    description: &'static str,
    default: ParamDefault,
    minimum: Option<f64>,
    maximum: Option<f64>,
    allowed: &'static [&'static str],
}

const fn string(name: &'static str, description: &'static str, default: ParamDefault) -> ParamSpec {
    ParamSpec {
        name,
        human: name,
        kind: ParamKind::String,
        description,
        default,
        minimum: None,
        maximum: None,
        allowed: &[],
    }
}

const fn choice(
    name: &'static str,
    human: &'static str,
    description: &'static str,
    default: &'static str,
    allowed: &'static [&'static str],
) -> ParamSpec {
    ParamSpec {
        name,
        human,
        kind: ParamKind::String,
        description,
        default: ParamDefault::Str(default),
        minimum: None,
        maximum: None,
        allowed,
    }
}

const fn number(
    name: &'static str,
    human: &'static str,
    description: &'static str,
    default: f64,
    minimum: Option<f64>,
) -> ParamSpec {
    ParamSpec {
        name,
        human,
        kind: ParamKind::Number,
        description,
        default: ParamDefault::Num(default),
        minimum,
        maximum: None,
        allowed: &[],
    }
}

const fn font_size(default: f64, minimum: f64, maximum: Option<f64>) -> ParamSpec {
    ParamSpec {
        name: "fontSize",
        human: "font size",
        kind: ParamKind::Integer,
        description: "Font size in points",
        default: ParamDefault::Num(default),
        minimum: Some(minimum),
        maximum,
        allowed: &[],
    }
}

const fn boolean(name: &'static str, description: &'static str, default: bool) -> ParamSpec {
    ParamSpec {
        name,
        human: name,
        kind: ParamKind::Boolean,
        description,
        default: ParamDefault::Bool(default),
        minimum: None,
        maximum: None,
        allowed: &[],
    }
}

const SHAPE_PARAMS: &[ParamSpec] = &[
    string("label", "Text label for the shape", ParamDefault::Str("Shape Element")),
    choice(
        "shape",
        "shape type",
        "Shape type (rectangle, ellipse, triangle, diamond, etc.)",
        "rectangle",
        &["rectangle", "ellipse", "triangle", "diamond", "hexagon", "cloud", "cylinder"],
    ),
    number("width", "width", "Width of the shape", 120.0, Some(10.0)),
    number("height", "height", "Height of the shape", 80.0, Some(10.0)),
    number("x", "x", "X position", 100.0, None),
    number("y", "y", "Y position", 100.0, None),
    string("fillColor", "Fill color", ParamDefault::Str("#E3F2FD")),
    string("strokeColor", "Border color", ParamDefault::Str("#1976D2")),
    number("strokeWidth", "stroke width", "Border width", 2.0, Some(0.0)),
    font_size(14.0, 8.0, None),
    choice("fontStyle", "font style", "Font style", "normal", FONT_STYLES),
    boolean("rounded", "Enable rounded corners", true),
    boolean("shadow", "Enable shadow effect", false),
];

const CONNECTOR_PARAMS: &[ParamSpec] = &[
    string("source", "Source element ID", ParamDefault::None),
    string("target", "Target element ID", ParamDefault::None),
    choice("sourcePort", "source port value", "Source connection point", "right", PORTS),
    choice("targetPort", "target port value", "Target connection point", "left", PORTS),
    string("label", "Label for the connector", ParamDefault::Str("")),
    string("strokeColor", "Line color", ParamDefault::Str("#424242")),
    number("strokeWidth", "stroke width", "Line width", 2.0, Some(1.0)),
    choice("strokeStyle", "stroke style", "Line style", "solid", STROKE_STYLES),
    choice(
        "arrow",
        "arrow style",
        "Arrow style",
        "target",
        &["none", "source", "target", "both"],
    ),
];

const TEXT_PARAMS: &[ParamSpec] = &[
    string("label", "Text content to display", ParamDefault::None),
    number("x", "x", "X position", 0.0, None),
    number("y", "y", "Y position", 0.0, None),
    number("width", "width", "Text width", 100.0, Some(10.0)),
    number("height", "height", "Text height", 30.0, Some(10.0)),
    font_size(12.0, 6.0, Some(72.0)),
    string("fontFamily", "Font family", ParamDefault::Str("Arial")),
    string("fontColor", "Font color", ParamDefault::Str("#000000")),
    choice("fontStyle", "font style", "Font style", "normal", FONT_STYLES),
    choice(
        "textAlign",
        "text alignment",
        "Text alignment",
        "center",
        &["left", "center", "right"],
    ),
    choice(
        "verticalAlign",
        "vertical alignment",
        "Vertical alignment",
        "middle",
        &["top", "middle", "bottom"],
    ),
    string("fillColor", "Background color (optional)", ParamDefault::Str("")),
    string("strokeColor", "Border color (optional)", ParamDefault::Str("")),
    number("strokeWidth", "stroke width", "Border width", 0.0, Some(0.0)),
];

const GROUP_PARAMS: &[ParamSpec] = &[
    string("label", "Group title/label", ParamDefault::Str("")),
    number("x", "x", "X position", 0.0, None),
    number("y", "y", "Y position", 0.0, None),
    number("width", "width", "Group width", 200.0, Some(50.0)),
    number("height", "height", "Group height", 150.0, Some(50.0)),
    string("fillColor", "Background color", ParamDefault::Str("#F5F5F5")),
    string("strokeColor", "Border color", ParamDefault::Str("#CCCCCC")),
    number("strokeWidth", "stroke width", "Border width", 1.0, Some(0.0)),
    choice("strokeStyle", "stroke style", "Border style", "solid", STROKE_STYLES),
    boolean("rounded", "Rounded corners", false),
    boolean("collapsible", "Whether the group can be collapsed", false),
    boolean("collapsed", "Whether the group starts collapsed", false),
    font_size(12.0, 6.0, Some(72.0)),
    choice("fontStyle", "font style", "Font style for the label", "bold", FONT_STYLES),
    string("fontColor", "Font color for the label", ParamDefault::Str("#000000")),
];

const SWIMLANE_PARAMS: &[ParamSpec] = &[
    string("label", "Swimlane title/label", ParamDefault::Str("")),
    number("x", "x", "X position", 0.0, None),
    number("y", "y", "Y position", 0.0, None),
    number("width", "width", "Swimlane width", 300.0, Some(100.0)),
    number("height", "height", "Swimlane height", 200.0, Some(50.0)),
    choice(
        "orientation",
        "orientation",
        "Swimlane orientation",
        "horizontal",
        &["horizontal", "vertical"],
    ),
    number("startSize", "start size", "Size of the header area", 30.0, Some(20.0)),
    string("fillColor", "Background color", ParamDefault::Str("#F8F9FA")),
    string("strokeColor", "Border color", ParamDefault::Str("#6C757D")),
    number("strokeWidth", "stroke width", "Border width", 1.0, Some(0.0)),
    boolean("collapsible", "Whether the swimlane can be collapsed", true),
    boolean("collapsed", "Whether the swimlane starts collapsed", false),
    font_size(12.0, 6.0, Some(72.0)),
    choice("fontStyle", "font style", "Font style for the label", "bold", FONT_STYLES),
    string("fontColor", "Font color for the label", ParamDefault::Str("#000000")),
    choice(
        "childLayout",
        "child layout",
        "How children are laid out",
        "stackLayout",
        &["stackLayout", "flowLayout", "freeLayout"],
    ),
];

/// Resource types served by [`CoreProvider`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CoreResource {
    Shape,
    Connector,
    Text,
    Group,
    Swimlane,
}

impl CoreResource {
    const ALL: [CoreResource; 5] = [
        CoreResource::Shape,
        CoreResource::Connector,
        CoreResource::Text,
        CoreResource::Group,
        CoreResource::Swimlane,
    ];

    fn parse(resource_type: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.as_str() == resource_type)
    }

    fn as_str(self) -> &'static str {
        match self {
            CoreResource::Shape => "shape",
            CoreResource::Connector => "connector",
            CoreResource::Text => "text",
            CoreResource::Group => "group",
            CoreResource::Swimlane => "swimlane",
        }
    }

    fn params(self) -> &'static [ParamSpec] {
        match self {
            CoreResource::Shape => SHAPE_PARAMS,
            CoreResource::Connector => CONNECTOR_PARAMS,
            CoreResource::Text => TEXT_PARAMS,
            CoreResource::Group => GROUP_PARAMS,
            CoreResource::Swimlane => SWIMLANE_PARAMS,
        }
    }

    /// Required parameters and the message reported when one is missing
    fn required(self) -> &'static [(&'static str, &'static str)] {
        match self {
            CoreResource::Shape => &[("label", "label is required")],
            CoreResource::Connector => &[
                ("source", "source element ID is required"),
                ("target", "target element ID is required"),
            ],
            CoreResource::Text => &[("label", "label text is required")],
            CoreResource::Group | CoreResource::Swimlane => &[],
        }
    }

    fn definition(self) -> ResourceDefinition {
        let (name, description, category) = match self {
            CoreResource::Shape => (
                "Shape Element",
                "Basic shape element with customizable appearance and properties",
                "basic",
            ),
            CoreResource::Connector => (
                "Connector",
                "Connection line between elements with arrows and styling",
                "basic",
            ),
            CoreResource::Text => (
                "Text",
                "Standalone text element for labels and annotations",
                "basic",
            ),
            CoreResource::Group => (
                "Group",
                "Container element that groups related elements together",
                "container",
            ),
            CoreResource::Swimlane => (
                "Swimlane",
                "Horizontal or vertical lane for organizing process flows",
                "container",
            ),
        };

        ResourceDefinition {
            resource_type: self.as_str().to_string(),
            name: name.to_string(),
            description: description.to_string(),
            category: category.to_string(),
            schema: self.schema(),
            examples: self.examples(),
        }
    }

    fn schema(self) -> Value {
        let properties: IndexMap<String, Value> = self
            .params()
            .iter()
            .map(|spec| (spec.name.to_string(), spec.schema()))
            .collect();
        let required: Vec<&str> = self.required().iter().map(|(name, _)| *name).collect();

        Value::Map(IndexMap::from([
            ("type".to_string(), Value::from("object")),
            ("properties".to_string(), Value::Map(properties)),
            ("required".to_string(), Value::from(required)),
        ]))
    }

    fn examples(self) -> Vec<ResourceExample> {
        match self {
            CoreResource::Shape => vec![
                example(
                    "Basic Rectangle",
                    "Simple rectangular shape",
                    &[
                        ("label", "Basic Shape".into()),
                        ("shape", "rectangle".into()),
                        ("fillColor", "#E3F2FD".into()),
                        ("strokeColor", "#1976D2".into()),
                    ],
                ),
                example(
                    "Rounded Cloud",
                    "Cloud shape with rounded appearance",
                    &[
                        ("label", "Cloud Service".into()),
                        ("shape", "cloud".into()),
                        ("fillColor", "#FFF3E0".into()),
                        ("rounded", true.into()),
                        ("shadow", true.into()),
                    ],
                ),
            ],
            CoreResource::Connector => vec![
                example(
                    "Basic Connection",
                    "Simple connector between two elements",
                    &[
                        ("source", "element1".into()),
                        ("target", "element2".into()),
                        ("sourcePort", "right".into()),
                        ("targetPort", "left".into()),
                        ("strokeColor", "#424242".into()),
                    ],
                ),
                example(
                    "Labeled Dashed Line",
                    "Dashed connector with label",
                    &[
                        ("source", "start".into()),
                        ("target", "end".into()),
                        ("label", "Data Flow".into()),
                        ("strokeStyle", "dashed".into()),
                        ("arrow", "target".into()),
                    ],
                ),
            ],
            CoreResource::Text => vec![
                example(
                    "Simple Text",
                    "Basic text label",
                    &[
                        ("label", "Sample Text".into()),
                        ("x", Value::Number(100.0)),
                        ("y", Value::Number(50.0)),
                        ("fontSize", Value::Number(14.0)),
                        ("fontColor", "#333333".into()),
                    ],
                ),
                example(
                    "Styled Text Box",
                    "Text with background and border",
                    &[
                        ("label", "Important Note".into()),
                        ("width", Value::Number(150.0)),
                        ("height", Value::Number(40.0)),
                        ("fontStyle", "bold".into()),
                        ("fillColor", "#FFF3CD".into()),
                        ("strokeColor", "#856404".into()),
                        ("strokeWidth", Value::Number(2.0)),
                    ],
                ),
            ],
            CoreResource::Group => vec![
                example(
                    "Simple Group",
                    "Basic group container",
                    &[
                        ("label", "Process Group".into()),
                        ("width", Value::Number(250.0)),
                        ("height", Value::Number(200.0)),
                        ("fillColor", "#E8F5E8".into()),
                        ("strokeColor", "#4CAF50".into()),
                    ],
                ),
                example(
                    "Collapsible Group",
                    "Group that can be collapsed",
                    &[
                        ("label", "Advanced Settings".into()),
                        ("fillColor", "#FFF3E0".into()),
                        ("strokeColor", "#FF9800".into()),
                        ("rounded", true.into()),
                        ("collapsible", true.into()),
                    ],
                ),
            ],
            CoreResource::Swimlane => vec![
                example(
                    "Horizontal Swimlane",
                    "Basic horizontal swimlane for process flows",
                    &[
                        ("label", "Customer Service".into()),
                        ("width", Value::Number(400.0)),
                        ("height", Value::Number(150.0)),
                        ("orientation", "horizontal".into()),
                        ("startSize", Value::Number(35.0)),
                    ],
                ),
                example(
                    "Vertical Swimlane",
                    "Vertical swimlane for role-based organization",
                    &[
                        ("label", "Development Team".into()),
                        ("width", Value::Number(150.0)),
                        ("height", Value::Number(300.0)),
                        ("orientation", "vertical".into()),
                        ("startSize", Value::Number(40.0)),
                        ("collapsible", true.into()),
                    ],
                ),
            ],
        }
    }

    fn validate(self, params: &Params) -> Result<(), ProviderError> {
        for (name, message) in self.required() {
            let present = match params.get(*name) {
                None | Some(Value::Null) => false,
                Some(Value::String(s)) => !s.is_empty(),
                Some(_) => true,
            };
            if !present {
                return Err(ProviderError::validation(*name, *message));
            }
        }

        for spec in self.params() {
            if let Some(value) = params.get(spec.name) {
                spec.check(value)?;
            }
        }
        Ok(())
    }

    fn generate(self, params: &Params) -> Element {
        let args = Args {
            params,
            specs: self.params(),
        };

        match self {
            CoreResource::Shape => {
                let mut element = Element::new(ElementType::Shape);
                args.place(&mut element);
                element.properties.label = Some(args.string("label"));
                element.properties.shape = Some(shape_kind(&args.string("shape")).to_string());
                element.style.fill_color = Some(args.string("fillColor"));
                element.style.stroke_color = Some(args.string("strokeColor"));
                element.style.stroke_width = args.number("strokeWidth");
                element.style.font_size = args.font_size();
                element.style.font_style = Some(args.string("fontStyle"));
                element.style.rounded = args.boolean("rounded");
                element.style.shadow = args.boolean("shadow");
                element
            }
            CoreResource::Connector => {
                let stroke_style = args.string("strokeStyle");
                let arrow = args.string("arrow");

                let mut element = Element::new(ElementType::Connector);
                let props = &mut element.properties;
                props.source = Some(args.string("source"));
                props.target = Some(args.string("target"));
                props.source_port = Some(args.string("sourcePort"));
                props.target_port = Some(args.string("targetPort"));
                props.label = Some(args.string("label")).filter(|l| !l.is_empty());
                props
                    .custom
                    .insert("strokeStyle".to_string(), stroke_style.clone().into());
                props.custom.insert("arrow".to_string(), arrow.clone().into());

                element.style.stroke_color = Some(args.string("strokeColor"));
                element.style.stroke_width = args.number("strokeWidth");
                apply_stroke_style(&mut element.style.custom, &stroke_style);
                apply_arrow(&mut element.style.custom, &arrow);
                element
            }
            CoreResource::Text => {
                let mut element = Element::new(ElementType::Text);
                args.place(&mut element);
                element.properties.label = Some(args.string("label"));
                let style = &mut element.style;
                style.font_size = args.font_size();
                style.font_family = Some(args.string("fontFamily"));
                style.font_color = Some(args.string("fontColor"));
                style.font_style = Some(args.string("fontStyle"));
                style.text_align = Some(args.string("textAlign"));
                style.vertical_align = Some(args.string("verticalAlign"));
                style.fill_color = Some(args.string("fillColor")).filter(|c| !c.is_empty());
                style.stroke_color = Some(args.string("strokeColor")).filter(|c| !c.is_empty());
                style.stroke_width = args.number("strokeWidth");
                element
            }
            CoreResource::Group => {
                let mut element = Element::new(ElementType::Group);
                args.place(&mut element);
                element.properties.label = Some(args.string("label")).filter(|l| !l.is_empty());
                element.properties.collapsible = args.boolean("collapsible");
                element.properties.collapsed = args.boolean("collapsed");
                let style = &mut element.style;
                style.fill_color = Some(args.string("fillColor"));
                style.stroke_color = Some(args.string("strokeColor"));
                style.stroke_width = args.number("strokeWidth");
                style.rounded = args.boolean("rounded");
                style.font_size = args.font_size();
                style.font_style = Some(args.string("fontStyle"));
                style.font_color = Some(args.string("fontColor"));
                apply_stroke_style(&mut style.custom, &args.string("strokeStyle"));
                element
            }
            CoreResource::Swimlane => {
                let orientation = args.string("orientation");
                let start_size = args.number("startSize");
                let child_layout = args.string("childLayout");
                let horizontal = orientation == "horizontal";

                let mut element = Element::new(ElementType::Swimlane);
                args.place(&mut element);
                let props = &mut element.properties;
                props.label = Some(args.string("label")).filter(|l| !l.is_empty());
                props.shape = Some("swimlane".to_string());
                props.collapsible = args.boolean("collapsible");
                props.collapsed = args.boolean("collapsed");
                props
                    .custom
                    .insert("orientation".to_string(), orientation.into());
                props.custom.insert("startSize".to_string(), start_size.into());
                props
                    .custom
                    .insert("childLayout".to_string(), child_layout.clone().into());
                props.custom.insert("horizontal".to_string(), horizontal.into());

                let style = &mut element.style;
                style.fill_color = Some(args.string("fillColor"));
                style.stroke_color = Some(args.string("strokeColor"));
                style.stroke_width = args.number("strokeWidth");
                style.font_size = args.font_size();
                style.font_style = Some(args.string("fontStyle"));
                style.font_color = Some(args.string("fontColor"));
                style
                    .custom
                    .insert("horizontal".to_string(), if horizontal { "1" } else { "0" }.to_string());
                style
                    .custom
                    .insert("startSize".to_string(), Value::Number(start_size).to_string());
                style.custom.insert("childLayout".to_string(), child_layout);
                element
            }
        }
    }
}

impl ParamSpec {
    fn schema(&self) -> Value {
        let mut entry = IndexMap::from([
            ("type".to_string(), Value::from(self.kind.as_str())),
            ("description".to_string(), Value::from(self.description)),
        ]);
        match self.default {
            ParamDefault::None => {}
            ParamDefault::Str(s) => {
                entry.insert("default".to_string(), Value::from(s));
            }
            ParamDefault::Num(n) => {
                entry.insert("default".to_string(), Value::Number(n));
            }
            ParamDefault::Bool(b) => {
                entry.insert("default".to_string(), Value::Bool(b));
            }
        }
        if let Some(min) = self.minimum {
            entry.insert("minimum".to_string(), Value::Number(min));
        }
        if let Some(max) = self.maximum {
            entry.insert("maximum".to_string(), Value::Number(max));
        }
        if !self.allowed.is_empty() {
            entry.insert("enum".to_string(), Value::from(self.allowed.to_vec()));
        }
        Value::Map(entry)
    }

    fn check(&self, value: &Value) -> Result<(), ProviderError> {
        if value.is_null() {
            return Ok(());
        }
        let fail = |message: String| Err(ProviderError::validation(self.name, message));

        match self.kind {
            ParamKind::String => {
                let Some(s) = value.as_str() else {
                    return fail(format!("{} must be a string", self.name));
                };
                if !self.allowed.is_empty() && !self.allowed.contains(&s) {
                    return fail(format!("invalid {}", self.human));
                }
            }
            ParamKind::Number | ParamKind::Integer => {
                let Some(n) = value.as_f64() else {
                    return fail(format!("{} must be a number", self.name));
                };
                match (self.minimum, self.maximum) {
                    (Some(min), Some(max)) if n < min || n > max => {
                        return fail(format!("{} must be between {} and {}", self.human, min, max));
                    }
                    (Some(min), None) if n < min => {
                        return fail(if min == 0.0 {
                            format!("{} cannot be negative", self.human)
                        } else {
                            format!("{} must be at least {}", self.human, min)
                        });
                    }
                    _ => {}
                }
            }
            ParamKind::Boolean => {
                if value.as_bool().is_none() {
                    return fail(format!("{} must be a boolean", self.name));
                }
            }
        }
        Ok(())
    }
}

/// Parameter access with the declared defaults filled in
struct Args<'p> {
    params: &'p Params,
    specs: &'static [ParamSpec],
}

impl Args<'_> {
    fn default_of(&self, name: &str) -> ParamDefault {
        self.specs
            .iter()
            .find(|s| s.name == name)
            .map_or(ParamDefault::None, |s| s.default)
    }

    fn string(&self, name: &str) -> String {
        if let Some(s) = self.params.get(name).and_then(Value::as_str) {
            return s.to_string();
        }
        match self.default_of(name) {
            ParamDefault::Str(s) => s.to_string(),
            _ => String::new(),
        }
    }

    fn number(&self, name: &str) -> f64 {
        if let Some(n) = self.params.get(name).and_then(Value::as_f64) {
            return n;
        }
        match self.default_of(name) {
            ParamDefault::Num(n) => n,
            _ => 0.0,
        }
    }

    fn boolean(&self, name: &str) -> bool {
        if let Some(b) = self.params.get(name).and_then(Value::as_bool) {
            return b;
        }
        matches!(self.default_of(name), ParamDefault::Bool(true))
    }

    fn font_size(&self) -> u32 {
        self.number("fontSize").max(0.0) as u32
    }

    fn place(&self, element: &mut Element) {
        element.properties.x = self.number("x");
        element.properties.y = self.number("y");
        element.properties.width = self.number("width");
        element.properties.height = self.number("height");
    }
}

fn example(name: &str, description: &str, config: &[(&str, Value)]) -> ResourceExample {
    ResourceExample {
        name: name.to_string(),
        description: description.to_string(),
        config: config
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect(),
    }
}

/// draw.io calls the diamond a rhombus
fn shape_kind(shape: &str) -> &str {
    match shape {
        "diamond" => "rhombus",
        other => other,
    }
}

fn apply_stroke_style(custom: &mut IndexMap<String, String>, stroke_style: &str) {
    match stroke_style {
        "dashed" => {
            custom.insert("dashed".to_string(), "1".to_string());
        }
        "dotted" => {
            custom.insert("dashed".to_string(), "1".to_string());
            custom.insert("dashPattern".to_string(), "1 3".to_string());
        }
        _ => {}
    }
}

fn apply_arrow(custom: &mut IndexMap<String, String>, arrow: &str) {
    let (start, end) = match arrow {
        "none" => ("none", "none"),
        "source" => ("classic", "none"),
        "both" => ("classic", "classic"),
        _ => return,
    };
    custom.insert("startArrow".to_string(), start.to_string());
    custom.insert("endArrow".to_string(), end.to_string());
}

/// Built-in provider for the basic draw.io element kinds
#[derive(Debug, Default, Clone)]
pub struct CoreProvider;

impl CoreProvider {
    pub fn new() -> Self {
        Self
    }

    fn resource(&self, resource_type: &str) -> Result<CoreResource, ProviderError> {
        CoreResource::parse(resource_type).ok_or_else(|| ProviderError::UnsupportedResource {
            provider: PROVIDER_NAME.to_string(),
            resource_type: resource_type.to_string(),
        })
    }
}

impl Provider for CoreProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn version(&self) -> &str {
        PROVIDER_VERSION
    }

    fn resources(&self) -> Vec<ResourceDefinition> {
        CoreResource::ALL.iter().map(|r| r.definition()).collect()
    }

    fn validate(&self, resource_type: &str, params: &Params) -> Result<(), ProviderError> {
        self.resource(resource_type)?.validate(params)
    }

    fn generate_template(
        &self,
        resource_type: &str,
        params: &Params,
    ) -> Result<Element, ProviderError> {
        let resource = self.resource(resource_type)?;
        resource.validate(params)?;
        Ok(resource.generate(params))
    }

    fn schema(&self, resource_type: &str) -> Result<Value, ProviderError> {
        CoreResource::parse(resource_type)
            .map(CoreResource::schema)
            .ok_or_else(|| ProviderError::SchemaNotFound {
                provider: PROVIDER_NAME.to_string(),
                resource_type: resource_type.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn params(pairs: &[(&str, Value)]) -> Params {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_provider_identity() {
        let provider = CoreProvider::new();
        assert_eq!(provider.name(), "core");
        assert_eq!(provider.version(), "1.0.0");
        let types: Vec<String> = provider
            .resources()
            .into_iter()
            .map(|r| r.resource_type)
            .collect();
        assert_eq!(types, vec!["shape", "connector", "text", "group", "swimlane"]);
    }

    #[test]
    fn test_shape_defaults() {
        let element = CoreProvider::new()
            .generate_template("shape", &params(&[("label", "Web".into())]))
            .unwrap();

        assert_eq!(element.element_type, Some(ElementType::Shape));
        assert_eq!(element.label(), Some("Web"));
        assert_eq!(element.properties.shape.as_deref(), Some("rectangle"));
        assert_eq!(
            (element.properties.x, element.properties.y),
            (100.0, 100.0)
        );
        assert_eq!(
            (element.properties.width, element.properties.height),
            (120.0, 80.0)
        );
        assert_eq!(element.style.fill_color.as_deref(), Some("#E3F2FD"));
        assert_eq!(element.style.stroke_width, 2.0);
        assert_eq!(element.style.font_size, 14);
        assert!(element.style.rounded);
        assert!(!element.style.shadow);
    }

    #[test]
    fn test_integer_and_float_parameters_agree() {
        let provider = CoreProvider::new();
        let a = provider
            .generate_template(
                "shape",
                &serde_yaml::from_str::<Params>("{label: x, width: 200}").unwrap(),
            )
            .unwrap();
        let b = provider
            .generate_template(
                "shape",
                &serde_yaml::from_str::<Params>("{label: x, width: 200.0}").unwrap(),
            )
            .unwrap();
        assert_eq!(a.properties.width, 200.0);
        assert_eq!(a, b);
    }

    #[test]
    fn test_shape_validation_messages() {
        let provider = CoreProvider::new();
        assert_eq!(
            provider.validate("shape", &Params::new()),
            Err(ProviderError::validation("label", "label is required"))
        );
        assert_eq!(
            provider.validate(
                "shape",
                &params(&[("label", "x".into()), ("shape", "blob".into())])
            ),
            Err(ProviderError::validation("shape", "invalid shape type"))
        );
        assert_eq!(
            provider.validate("shape", &params(&[("label", "x".into()), ("width", Value::Number(5.0))])),
            Err(ProviderError::validation("width", "width must be at least 10"))
        );
    }

    #[test]
    fn test_connector_generation() {
        let element = CoreProvider::new()
            .generate_template(
                "connector",
                &params(&[
                    ("source", "a".into()),
                    ("target", "b".into()),
                    ("strokeStyle", "dashed".into()),
                    ("arrow", "both".into()),
                ]),
            )
            .unwrap();

        assert_eq!(element.element_type, Some(ElementType::Connector));
        assert_eq!(element.properties.source.as_deref(), Some("a"));
        assert_eq!(element.properties.source_port.as_deref(), Some("right"));
        assert_eq!(element.properties.target_port.as_deref(), Some("left"));
        assert_eq!(element.properties.custom["arrow"], Value::from("both"));
        assert_eq!(element.style.stroke_color.as_deref(), Some("#424242"));
        assert_eq!(element.style.custom["dashed"], "1");
        assert_eq!(element.style.custom["startArrow"], "classic");
    }

    #[test]
    fn test_connector_requires_endpoints() {
        assert_eq!(
            CoreProvider::new().validate("connector", &params(&[("source", "a".into())])),
            Err(ProviderError::validation(
                "target",
                "target element ID is required"
            ))
        );
    }

    #[test]
    fn test_text_font_size_range() {
        let provider = CoreProvider::new();
        let result = provider.validate(
            "text",
            &params(&[("label", "x".into()), ("fontSize", Value::Number(100.0))]),
        );
        assert_eq!(
            result,
            Err(ProviderError::validation(
                "fontSize",
                "font size must be between 6 and 72"
            ))
        );
        let result = provider.validate(
            "text",
            &params(&[("label", "x".into()), ("strokeWidth", Value::Number(-1.0))]),
        );
        assert_eq!(
            result,
            Err(ProviderError::validation(
                "strokeWidth",
                "stroke width cannot be negative"
            ))
        );
    }

    #[test]
    fn test_group_and_swimlane_need_no_parameters() {
        let provider = CoreProvider::new();
        let group = provider.generate_template("group", &Params::new()).unwrap();
        assert_eq!(
            (group.properties.width, group.properties.height),
            (200.0, 150.0)
        );
        assert_eq!(group.style.font_style.as_deref(), Some("bold"));

        let lane = provider
            .generate_template("swimlane", &params(&[("orientation", "vertical".into())]))
            .unwrap();
        assert_eq!(lane.element_type, Some(ElementType::Swimlane));
        assert_eq!(lane.properties.custom["horizontal"], Value::Bool(false));
        assert_eq!(lane.style.custom["startSize"], "30");
        assert!(lane.properties.collapsible);
    }

    #[test]
    fn test_swimlane_start_size_minimum() {
        assert_eq!(
            CoreProvider::new().validate("swimlane", &params(&[("startSize", Value::Number(10.0))])),
            Err(ProviderError::validation(
                "startSize",
                "start size must be at least 20"
            ))
        );
    }

    #[test]
    fn test_unknown_resource() {
        let provider = CoreProvider::new();
        assert!(matches!(
            provider.generate_template("database", &Params::new()),
            Err(ProviderError::UnsupportedResource { .. })
        ));
        assert!(matches!(
            provider.schema("database"),
            Err(ProviderError::SchemaNotFound { .. })
        ));
    }

    #[test]
    fn test_schema_shape() {
        let Value::Map(schema) = CoreProvider::new().schema("connector").unwrap() else {
            panic!("schema should be a map");
        };
        assert_eq!(schema["type"], Value::from("object"));
        assert_eq!(schema["required"], Value::from(vec!["source", "target"]));
        let Value::Map(props) = &schema["properties"] else {
            panic!("properties should be a map");
        };
        let Value::Map(width) = &props["strokeWidth"] else {
            panic!("strokeWidth should be a map");
        };
        assert_eq!(width["minimum"], Value::Number(1.0));
    }

    #[test]
    fn test_every_example_validates() {
        let provider = CoreProvider::new();
        for resource in provider.resources() {
            for example in &resource.examples {
                assert!(
                    provider
                        .validate(&resource.resource_type, &example.config)
                        .is_ok(),
                    "{} / {}",
                    resource.resource_type,
                    example.name
                );
            }
        }
    }
}
