//! draw.io output: cell generation, style synthesis and XML
//!
//! The [`Generator`] turns a processed document into an [`MxFile`]: per page
//! the two implicit root cells, one cell per layer, and one cell per element
//! with ids built from the element's path below its page or layer.

pub mod config;
mod generator;
pub mod model;
pub mod style;
mod xml;

use thiserror::Error;

pub use config::DrawioConfig;
pub use generator::Generator;
pub use model::{Cell, CellKind, DiagramPage, Geometry, GraphModel, MxFile};
pub use xml::write_mxfile;

/// Errors raised while generating cells
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenerateError {
    /// Id/name presence rule violated, or two cells would share an id
    #[error("{location}: {message}")]
    StructuralInvariant { location: String, message: String },

    #[error("unsupported element type '{element_type}' for element '{element}' at {location}")]
    UnsupportedElementType {
        element: String,
        element_type: String,
        location: String,
    },
}

impl GenerateError {
    pub(crate) fn structural(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StructuralInvariant {
            location: location.into(),
            message: message.into(),
        }
    }
}
