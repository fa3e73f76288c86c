//! Substitution variables and their application to element fields

use super::{TemplateDefaults, TemplateError};
use crate::expr::{self, Variables};
use crate::model::{Element, Template, Value};

/// Build the variable set for instantiating `template` on `element`.
///
/// Element identity, geometry and label come first, then the element's custom
/// properties, then declared parameter defaults for anything still missing,
/// and finally the colour fallbacks. A required parameter that is still
/// missing afterwards is an error reported at `location`.
pub(crate) fn template_variables(
    element: &Element,
    template: &Template,
    template_key: &str,
    defaults: &TemplateDefaults,
    location: &str,
) -> Result<Variables, TemplateError> {
    let mut vars = Variables::new();

    if let Some(id) = element.id() {
        vars.insert("id".to_string(), Value::from(id));
    }
    if let Some(name) = element.name() {
        vars.insert("name".to_string(), Value::from(name));
    }
    let props = &element.properties;
    vars.insert("x".to_string(), Value::Number(props.x));
    vars.insert("y".to_string(), Value::Number(props.y));
    vars.insert("width".to_string(), Value::Number(props.width));
    vars.insert("height".to_string(), Value::Number(props.height));
    if let Some(label) = element.label() {
        vars.insert("label".to_string(), Value::from(label));
    }

    for (key, value) in &props.custom {
        vars.insert(key.clone(), value.clone());
    }

    for param in &template.parameters {
        if let Some(default) = param.default.as_ref().filter(|d| !d.is_null()) {
            vars.entry(param.name.clone())
                .or_insert_with(|| default.clone());
        }
    }

    vars.entry("fillColor".to_string())
        .or_insert_with(|| Value::from(defaults.fill_color.as_str()));
    vars.entry("strokeColor".to_string())
        .or_insert_with(|| Value::from(defaults.stroke_color.as_str()));

    if let Some(missing) = template
        .parameters
        .iter()
        .find(|p| p.required && vars.get(&p.name).map_or(true, Value::is_null))
    {
        return Err(TemplateError::MissingParameter {
            element: element.display_name().to_string(),
            template: template_key.to_string(),
            parameter: missing.name.clone(),
            location: location.to_string(),
        });
    }

    Ok(vars)
}

/// Run every substitutable string field of `element` through the
/// substitution language
pub(crate) fn apply_variables(
    element: &mut Element,
    vars: &Variables,
    location: &str,
) -> Result<(), TemplateError> {
    let display = element.display_name().to_string();
    let substitute = |field: &str, slot: &mut Option<String>| -> Result<(), TemplateError> {
        if let Some(text) = slot.as_deref().filter(|s| !s.is_empty()) {
            let rendered = expr::render(text, vars).map_err(|error| TemplateError::Expression {
                element: display.clone(),
                location: location.to_string(),
                field: field.to_string(),
                text: text.to_string(),
                error,
            })?;
            *slot = Some(rendered);
        }
        Ok(())
    };

    let props = &mut element.properties;
    substitute("label", &mut props.label)?;
    substitute("value", &mut props.value)?;
    substitute("shape", &mut props.shape)?;

    let style = &mut element.style;
    substitute("fillColor", &mut style.fill_color)?;
    substitute("strokeColor", &mut style.stroke_color)?;
    substitute("strokeDashArray", &mut style.stroke_dash_array)?;
    substitute("fontFamily", &mut style.font_family)?;
    substitute("fontColor", &mut style.font_color)?;
    substitute("fontStyle", &mut style.font_style)?;
    substitute("textAlign", &mut style.text_align)?;
    substitute("verticalAlign", &mut style.vertical_align)?;
    substitute("labelPosition", &mut style.label_position)?;
    substitute("verticalLabelPosition", &mut style.vertical_label_position)?;

    for (key, value) in style.custom.iter_mut() {
        let mut slot = Some(std::mem::take(value));
        substitute(key, &mut slot)?;
        *value = slot.unwrap_or_default();
    }

    Ok(())
}
