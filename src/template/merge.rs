//! Target-wins merge of a template's group configuration into an element

use crate::model::{Element, GroupConfig, NestingConfig, NestingMode, Style};

/// Copy unset geometry, text and style fields from `group` into `element`
/// and replace its nesting configuration with the template's.
///
/// A field is unset when it holds its zero value. Custom property and style
/// maps are unioned key by key, keeping the element's value on conflict.
pub(crate) fn merge_group(element: &mut Element, group: &GroupConfig) {
    let target = &mut element.properties;
    let source = &group.properties;

    if target.width == 0.0 && source.width > 0.0 {
        target.width = source.width;
    }
    if target.height == 0.0 && source.height > 0.0 {
        target.height = source.height;
    }
    fill_string(&mut target.label, &source.label);
    fill_string(&mut target.value, &source.value);
    fill_string(&mut target.shape, &source.shape);
    fill_string(&mut target.shape_type, &source.shape_type);

    for (key, value) in &source.custom {
        target
            .custom
            .entry(key.clone())
            .or_insert_with(|| value.clone());
    }

    merge_style(&mut element.style, &group.style);

    element.nesting = NestingConfig {
        mode: Some(NestingMode::Child),
        auto_resize: group.auto_resize,
        padding: group.padding,
        spacing: group.spacing,
        arrangement: group.arrangement,
    };
}

/// Fill unset style fields of `target` from `source`
pub(crate) fn merge_style(target: &mut Style, source: &Style) {
    fill_string(&mut target.fill_color, &source.fill_color);
    fill_string(&mut target.stroke_color, &source.stroke_color);
    fill_string(&mut target.stroke_dash_array, &source.stroke_dash_array);
    fill_string(&mut target.font_family, &source.font_family);
    fill_string(&mut target.font_color, &source.font_color);
    fill_string(&mut target.font_style, &source.font_style);
    fill_string(&mut target.text_align, &source.text_align);
    fill_string(&mut target.vertical_align, &source.vertical_align);
    fill_string(&mut target.label_position, &source.label_position);
    fill_string(
        &mut target.vertical_label_position,
        &source.vertical_label_position,
    );

    fill_number(&mut target.stroke_width, source.stroke_width);
    fill_number(&mut target.fill_opacity, source.fill_opacity);
    fill_number(&mut target.stroke_opacity, source.stroke_opacity);
    fill_number(&mut target.rotation, source.rotation);
    if target.font_size == 0 {
        target.font_size = source.font_size;
    }

    target.rounded |= source.rounded;
    target.shadow |= source.shadow;
    target.glass |= source.glass;
    target.sketch |= source.sketch;

    for (key, value) in &source.custom {
        target
            .custom
            .entry(key.clone())
            .or_insert_with(|| value.clone());
    }
}

fn fill_string(target: &mut Option<String>, source: &Option<String>) {
    let unset = target.as_deref().map_or(true, str::is_empty);
    if unset {
        if let Some(value) = source.as_deref().filter(|s| !s.is_empty()) {
            *target = Some(value.to_string());
        }
    }
}

fn fill_number(target: &mut f64, source: f64) {
    if *target == 0.0 && source != 0.0 {
        *target = source;
    }
}
