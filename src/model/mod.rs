//! Data model shared by every stage of the pipeline
//!
//! Everything here is plain data with serde derives. Input documents and
//! template files deserialize straight into these types.

mod diagram;
mod element;
mod template;
mod value;

pub use diagram::{
    BackgroundSettings, Diagram, DiagramConfig, DiagramProperties, GridSettings, Layer, Metadata,
    Page, PageProperties, ProviderKind, ProviderRef, TemplateHiveRef, TemplateRef,
};
pub use element::{
    Arrangement, Element, ElementProperties, ElementType, NestingConfig, NestingMode, Padding,
    Style, Waypoint,
};
pub use template::{Dependency, GroupConfig, IconConfig, Parameter, Relationship, Template};
pub use value::{Params, Value};

pub(crate) use element::non_empty;
pub(crate) use value::format_number;
