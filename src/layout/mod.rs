//! Nesting engine: positions children inside their container
//!
//! Containers pick an arrangement (vertical, horizontal, grid or free),
//! children without a size get the configured default, and containers with
//! `autoResize` grow to enclose their children.

pub mod config;
pub mod engine;

pub use config::LayoutConfig;
pub use engine::{apply_nesting, grid_columns, layout_tree, resolve_nesting, ResolvedNesting};
