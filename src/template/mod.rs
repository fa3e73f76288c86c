//! Template store and template/provider application
//!
//! Templates are YAML files describing a reusable group configuration. They
//! live in a [`TemplateStore`], keyed by name and optionally namespaced by a
//! hive (`network/subnet`). The [`TemplateProcessor`] walks a document,
//! replaces `resource:` elements with provider output and merges `template:`
//! references into the elements that carry them.

mod engine;
mod icon;
mod merge;
mod store;
mod vars;

use std::path::PathBuf;

use thiserror::Error;

use crate::error::ExpressionError;
use crate::model::Relationship;
use crate::provider::ProviderError;

pub use engine::TemplateProcessor;
pub use store::TemplateStore;

/// Errors raised while loading or applying templates
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Reference could not be resolved to a loaded template
    #[error("template '{reference}' not found for element '{element}' at {location} (resolved to: {resolved})")]
    NotFound {
        reference: String,
        resolved: String,
        element: String,
        location: String,
        suggestions: Vec<String>,
    },

    #[error(
        "required {relationship} dependency not satisfied at {location}: template {template} requires a {relationship} of type {required}, but element '{element}' has ancestors [{}]",
        ancestors.join(", ")
    )]
    DependencyUnsatisfied {
        element: String,
        template: String,
        required: String,
        relationship: Relationship,
        ancestors: Vec<String>,
        location: String,
    },

    #[error("required template parameter {parameter} not provided (template {template}, element '{element}' at {location})")]
    MissingParameter {
        element: String,
        template: String,
        parameter: String,
        location: String,
    },

    /// Id/name presence rule violated
    #[error("{location}: {message}")]
    StructuralInvariant { location: String, message: String },

    #[error("failed to load template {}: {message}", path.display())]
    Load { path: PathBuf, message: String },

    #[error("invalid glob pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },

    #[error("element '{element}' at {location}: {source}")]
    Provider {
        element: String,
        location: String,
        #[source]
        source: ProviderError,
    },

    #[error("invalid substitution in {field} of element '{element}' at {location}: {error}")]
    Expression {
        element: String,
        location: String,
        field: String,
        /// The raw field text, for source-annotated reports
        text: String,
        #[source]
        error: ExpressionError,
    },
}

impl TemplateError {
    pub(crate) fn structural(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StructuralInvariant {
            location: location.into(),
            message: message.into(),
        }
    }

    pub(crate) fn load(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Load {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Suggested template keys, if any
    pub fn suggestions(&self) -> Option<&[String]> {
        match self {
            Self::NotFound { suggestions, .. } => Some(suggestions),
            _ => None,
        }
    }
}

/// Values substituted for `fillColor` and `strokeColor` when neither the
/// element nor the template provides one
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateDefaults {
    pub fill_color: String,
    pub stroke_color: String,
}

impl Default for TemplateDefaults {
    fn default() -> Self {
        Self {
            fill_color: "#E3F2FD".to_string(),
            stroke_color: "#1976D2".to_string(),
        }
    }
}

impl TemplateDefaults {
    pub fn with_fill_color(mut self, color: impl Into<String>) -> Self {
        self.fill_color = color.into();
        self
    }

    pub fn with_stroke_color(mut self, color: impl Into<String>) -> Self {
        self.stroke_color = color.into();
        self
    }
}

/// Compute Levenshtein edit distance between two strings
fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let m = a_chars.len();
    let n = b_chars.len();

    if m == 0 {
        return n;
    }
    if n == 0 {
        return m;
    }

    let mut prev: Vec<usize> = (0..=n).collect();
    let mut curr = vec![0usize; n + 1];

    for i in 1..=m {
        curr[0] = i;
        for j in 1..=n {
            let cost = usize::from(a_chars[i - 1] != b_chars[j - 1]);
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}

/// Known names within `max_distance` edits of `target`, closest first
fn find_similar<'a>(
    known: impl IntoIterator<Item = &'a str>,
    target: &str,
    max_distance: usize,
) -> Vec<String> {
    let mut candidates: Vec<(&str, usize)> = known
        .into_iter()
        .filter_map(|name| {
            let dist = levenshtein_distance(name, target);
            (dist <= max_distance && dist > 0).then_some((name, dist))
        })
        .collect();

    candidates.sort_by(|(a, da), (b, db)| da.cmp(db).then_with(|| a.cmp(b)));
    candidates
        .into_iter()
        .map(|(name, _)| name.to_string())
        .take(3)
        .collect()
}
