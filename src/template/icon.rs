//! Template icons: a shape kind or an embedded image

use std::path::Path;

use base64::Engine as _;

use super::TemplateError;
use crate::model::{Element, IconConfig};

/// Apply `icon` to `element` without overriding anything the element sets.
///
/// `template_path` is the template file; relative image paths resolve
/// against its directory.
pub(crate) fn apply_icon(
    element: &mut Element,
    icon: &IconConfig,
    template_path: Option<&Path>,
) -> Result<(), TemplateError> {
    let Some(target) = icon.shape.as_deref().filter(|s| !s.is_empty()) else {
        return Ok(());
    };

    match icon.kind.as_deref().unwrap_or("shape") {
        "image" => {
            if !element.style.custom.contains_key("image") {
                let uri = image_uri(target, template_path)?;
                element.style.custom.insert("image".to_string(), uri);
            }
            let custom = &mut element.style.custom;
            if icon.size > 0.0 {
                let size = crate::model::format_number(icon.size);
                custom
                    .entry("imageWidth".to_string())
                    .or_insert_with(|| size.clone());
                custom.entry("imageHeight".to_string()).or_insert(size);
            }
            if let Some(position) = icon.position.as_deref().filter(|p| !p.is_empty()) {
                custom
                    .entry("imageAlign".to_string())
                    .or_insert_with(|| position.to_string());
            }
        }
        _ => {
            let props = &mut element.properties;
            if crate::model::non_empty(&props.shape).is_none() {
                props.shape = Some(target.to_string());
            }
            let style = &mut element.style;
            if crate::model::non_empty(&style.fill_color).is_none() {
                style.fill_color = icon.fill_color.clone();
            }
            if crate::model::non_empty(&style.stroke_color).is_none() {
                style.stroke_color = icon.stroke_color.clone();
            }
        }
    }
    Ok(())
}

/// Remote and inline URIs pass through; local files are embedded
fn image_uri(target: &str, template_path: Option<&Path>) -> Result<String, TemplateError> {
    if ["http://", "https://", "data:"]
        .iter()
        .any(|prefix| target.starts_with(prefix))
    {
        return Ok(target.to_string());
    }

    let path = match template_path.and_then(Path::parent) {
        Some(dir) if Path::new(target).is_relative() => dir.join(target),
        _ => Path::new(target).to_path_buf(),
    };
    let bytes = std::fs::read(&path).map_err(|e| TemplateError::load(&path, e))?;

    // draw.io styles are `;`-separated, so the `;base64` marker is omitted
    Ok(format!(
        "data:image/{},{}",
        media_subtype(&path),
        base64::engine::general_purpose::STANDARD.encode(bytes)
    ))
}

fn media_subtype(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("svg") => "svg+xml",
        Some("jpg" | "jpeg") => "jpeg",
        Some("gif") => "gif",
        Some("webp") => "webp",
        _ => "png",
    }
}
