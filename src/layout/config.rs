//! Configuration for the nesting engine

use crate::model::Padding;

/// Defaults filled in before children are arranged
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    /// Size given to children without a width or height (width, height)
    pub default_size: (f64, f64),

    /// Gap between siblings when the element sets none
    pub spacing: f64,

    /// Padding used when all four sides of the element's padding are zero
    pub padding: Padding,

    /// Upper bound on grid columns
    pub max_grid_columns: usize,

    /// Largest child count arranged horizontally by default; more become a grid
    pub horizontal_max_children: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            default_size: (140.0, 60.0),
            spacing: 20.0,
            padding: Padding::new(30.0, 20.0, 20.0, 20.0),
            max_grid_columns: 4,
            horizontal_max_children: 4,
        }
    }
}

impl LayoutConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default child size
    pub fn with_default_size(mut self, width: f64, height: f64) -> Self {
        self.default_size = (width, height);
        self
    }

    pub fn with_spacing(mut self, spacing: f64) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn with_padding(mut self, padding: Padding) -> Self {
        self.padding = padding;
        self
    }

    pub fn with_max_grid_columns(mut self, columns: usize) -> Self {
        self.max_grid_columns = columns.max(1);
        self
    }

    pub fn with_horizontal_max_children(mut self, count: usize) -> Self {
        self.horizontal_max_children = count;
        self
    }
}
