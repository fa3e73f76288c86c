//! Child placement and auto-resize
//!
//! Children are positioned relative to their parent's top-left corner. The
//! engine works bottom-up: a container's children are laid out (and possibly
//! resized) before the container itself arranges them.

use log::debug;

use super::config::LayoutConfig;
use crate::model::{Arrangement, Element, ElementType, NestingMode, Padding};

/// A nesting configuration with every default filled in
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedNesting {
    pub mode: NestingMode,
    pub arrangement: Arrangement,
    pub spacing: f64,
    pub padding: Padding,
    pub auto_resize: bool,
}

/// Fill in the defaults for `element`'s nesting configuration
pub fn resolve_nesting(element: &Element, config: &LayoutConfig) -> ResolvedNesting {
    let nesting = &element.nesting;

    let mode = nesting.mode.unwrap_or(match element.element_type {
        Some(ElementType::Container) => NestingMode::Container,
        Some(ElementType::Group) => NestingMode::Group,
        Some(ElementType::Swimlane) => NestingMode::Swimlane,
        _ => NestingMode::Automatic,
    });

    let arrangement = nesting.arrangement.unwrap_or({
        if element.children.len() <= config.horizontal_max_children {
            Arrangement::Horizontal
        } else {
            Arrangement::Grid
        }
    });

    let spacing = if nesting.spacing == 0.0 {
        config.spacing
    } else {
        nesting.spacing
    };

    let padding = if nesting.padding.is_zero() {
        config.padding
    } else {
        nesting.padding
    };

    ResolvedNesting {
        mode,
        arrangement,
        spacing,
        padding,
        auto_resize: nesting.auto_resize,
    }
}

/// Number of grid columns for `count` children
pub fn grid_columns(count: usize, max_columns: usize) -> usize {
    let root = (count as f64).sqrt().ceil() as usize;
    root.clamp(1, max_columns.max(1))
}

/// Lay out `element` and all of its descendants, deepest first
pub fn layout_tree(element: &mut Element, config: &LayoutConfig) {
    for child in &mut element.children {
        layout_tree(child, config);
    }
    apply_nesting(element, config);
}

/// Arrange `element`'s direct children and grow it to fit them if asked to.
///
/// Elements without children are left untouched.
pub fn apply_nesting(element: &mut Element, config: &LayoutConfig) {
    if element.children.is_empty() {
        return;
    }

    let nesting = resolve_nesting(element, config);
    debug!(
        element = element.display_name(),
        mode:? = nesting.mode,
        arrangement:? = nesting.arrangement,
        children = element.children.len();
        "Applying nesting"
    );

    let children = &mut element.children;
    match nesting.arrangement {
        Arrangement::Free => {}
        Arrangement::Vertical => {
            fill_default_sizes(children, config);
            arrange_vertical(children, &nesting);
        }
        Arrangement::Horizontal => {
            fill_default_sizes(children, config);
            arrange_horizontal(children, &nesting);
        }
        Arrangement::Grid => {
            fill_default_sizes(children, config);
            let columns = grid_columns(children.len(), config.max_grid_columns);
            arrange_grid(children, &nesting, columns);
        }
    }

    if nesting.auto_resize {
        auto_resize(element, &nesting.padding);
    }
}

fn fill_default_sizes(children: &mut [Element], config: &LayoutConfig) {
    let (width, height) = config.default_size;
    for child in children {
        let props = &mut child.properties;
        if props.width == 0.0 {
            props.width = width;
        }
        if props.height == 0.0 {
            props.height = height;
        }
    }
}

fn arrange_vertical(children: &mut [Element], nesting: &ResolvedNesting) {
    let mut y = nesting.padding.top;
    for child in children {
        child.properties.x = nesting.padding.left;
        child.properties.y = y;
        y += child.properties.height + nesting.spacing;
    }
}

fn arrange_horizontal(children: &mut [Element], nesting: &ResolvedNesting) {
    let mut x = nesting.padding.left;
    for child in children {
        child.properties.x = x;
        child.properties.y = nesting.padding.top;
        x += child.properties.width + nesting.spacing;
    }
}

/// Row-major placement; a new row starts below the previous child
fn arrange_grid(children: &mut [Element], nesting: &ResolvedNesting, columns: usize) {
    let mut x = nesting.padding.left;
    let mut y = nesting.padding.top;
    let mut previous_height = 0.0;

    for (i, child) in children.iter_mut().enumerate() {
        if i > 0 && i % columns == 0 {
            x = nesting.padding.left;
            y += previous_height + nesting.spacing;
        }
        child.properties.x = x;
        child.properties.y = y;
        x += child.properties.width + nesting.spacing;
        previous_height = child.properties.height;
    }
}

/// Grow `element` so every child fits inside it plus right/bottom padding
fn auto_resize(element: &mut Element, padding: &Padding) {
    let (right, bottom) = element
        .children
        .iter()
        .map(|c| {
            let p = &c.properties;
            (p.x + p.width, p.y + p.height)
        })
        .fold((0.0_f64, 0.0_f64), |(r, b), (x, y)| (r.max(x), b.max(y)));

    let props = &mut element.properties;
    props.width = props.width.max(right + padding.right);
    props.height = props.height.max(bottom + padding.bottom);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NestingConfig;
    use pretty_assertions::assert_eq;

    fn container(children: usize) -> Element {
        let mut parent = Element::new(ElementType::Container).with_id("parent");
        for i in 0..children {
            parent = parent.with_child(Element::new(ElementType::Shape).with_id(format!("c{}", i)));
        }
        parent
    }

    fn positions(element: &Element) -> Vec<(f64, f64)> {
        element
            .children
            .iter()
            .map(|c| (c.properties.x, c.properties.y))
            .collect()
    }

    #[test]
    fn test_grid_columns() {
        assert_eq!(grid_columns(1, 4), 1);
        assert_eq!(grid_columns(4, 4), 2);
        assert_eq!(grid_columns(5, 4), 3);
        assert_eq!(grid_columns(16, 4), 4);
        assert_eq!(grid_columns(25, 4), 4);
    }

    #[test]
    fn test_defaults_by_type_and_child_count() {
        let config = LayoutConfig::default();

        let few = resolve_nesting(&container(4), &config);
        assert_eq!(few.mode, NestingMode::Container);
        assert_eq!(few.arrangement, Arrangement::Horizontal);
        assert_eq!(few.spacing, 20.0);
        assert_eq!(few.padding, Padding::new(30.0, 20.0, 20.0, 20.0));

        let many = resolve_nesting(&container(5), &config);
        assert_eq!(many.arrangement, Arrangement::Grid);

        let shape = Element::new(ElementType::Shape);
        assert_eq!(resolve_nesting(&shape, &config).mode, NestingMode::Automatic);
    }

    #[test]
    fn test_partial_padding_is_kept() {
        let mut element = container(1);
        element.nesting.padding = Padding::new(0.0, 0.0, 5.0, 0.0);
        let nesting = resolve_nesting(&element, &LayoutConfig::default());
        assert_eq!(nesting.padding, Padding::new(0.0, 0.0, 5.0, 0.0));
    }

    #[test]
    fn test_horizontal_arrangement() {
        let mut parent = container(3);
        parent.children[1].properties.width = 200.0;
        apply_nesting(&mut parent, &LayoutConfig::default());

        assert_eq!(
            positions(&parent),
            vec![(20.0, 30.0), (180.0, 30.0), (400.0, 30.0)]
        );
        assert_eq!(parent.children[0].properties.height, 60.0);
    }

    #[test]
    fn test_vertical_arrangement() {
        let mut parent = container(3);
        parent.nesting.arrangement = Some(Arrangement::Vertical);
        parent.nesting.spacing = 10.0;
        apply_nesting(&mut parent, &LayoutConfig::default());

        assert_eq!(
            positions(&parent),
            vec![(20.0, 30.0), (20.0, 100.0), (20.0, 170.0)]
        );
    }

    #[test]
    fn test_grid_arrangement_wraps_rows() {
        let mut parent = container(5);
        apply_nesting(&mut parent, &LayoutConfig::default());

        assert_eq!(
            positions(&parent),
            vec![
                (20.0, 30.0),
                (180.0, 30.0),
                (340.0, 30.0),
                (20.0, 110.0),
                (180.0, 110.0),
            ]
        );
    }

    #[test]
    fn test_free_arrangement_leaves_children_alone() {
        let mut parent = container(2);
        parent.nesting.arrangement = Some(Arrangement::Free);
        parent.children[1].properties.x = 75.0;
        apply_nesting(&mut parent, &LayoutConfig::default());

        assert_eq!(positions(&parent), vec![(0.0, 0.0), (75.0, 0.0)]);
        assert_eq!(parent.children[0].properties.width, 0.0);
    }

    fn resizing_parent(width: f64) -> Element {
        let mut parent = container(1);
        parent.properties.width = width;
        parent.children[0].properties.width = 200.0;
        parent.nesting = NestingConfig {
            auto_resize: true,
            padding: Padding::new(10.0, 30.0, 10.0, 20.0),
            arrangement: Some(Arrangement::Horizontal),
            ..NestingConfig::default()
        };
        parent
    }

    #[test]
    fn test_auto_resize_grows() {
        let mut parent = resizing_parent(100.0);
        apply_nesting(&mut parent, &LayoutConfig::default());
        assert_eq!(parent.properties.width, 250.0);
        assert_eq!(parent.properties.height, 80.0);
    }

    #[test]
    fn test_auto_resize_never_shrinks() {
        let mut parent = resizing_parent(400.0);
        apply_nesting(&mut parent, &LayoutConfig::default());
        assert_eq!(parent.properties.width, 400.0);
    }

    #[test]
    fn test_layout_tree_sizes_inner_containers_first() {
        let mut inner = container(2);
        inner.id = Some("inner".into());
        inner.nesting.auto_resize = true;
        let mut outer = Element::new(ElementType::Group)
            .with_id("outer")
            .with_child(inner);
        outer.nesting.auto_resize = true;

        layout_tree(&mut outer, &LayoutConfig::default());

        // inner: two 140-wide children from x=20 with spacing 20, plus right padding
        let inner = &outer.children[0];
        assert_eq!(inner.properties.width, 340.0);
        assert_eq!(inner.properties.height, 110.0);
        assert_eq!(outer.properties.width, 380.0);
        assert_eq!(outer.properties.height, 160.0);
    }
}
