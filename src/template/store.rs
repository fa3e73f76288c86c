//! On-disk template discovery and hive-aware lookup

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};
use indexmap::IndexMap;
use log::{debug, info};

use super::{find_similar, TemplateError};
use crate::model::{Template, TemplateHiveRef, TemplateRef};

/// `*` must not cross directory boundaries
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Loaded templates keyed by `name` or `hive/name`
#[derive(Debug, Default)]
pub struct TemplateStore {
    templates: HashMap<String, Template>,
    /// Hive name to the short names loaded into it, in load order
    hives: IndexMap<String, Vec<String>>,
}

impl TemplateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `.yaml`/`.yml` file under `root`.
    ///
    /// Files directly in `root` are keyed by their declared name; files in a
    /// subdirectory belong to the hive named after the first path segment and
    /// are keyed `hive/name`. A malformed file aborts the whole load.
    pub fn load(&mut self, root: &Path) -> Result<usize, TemplateError> {
        let mut loaded = 0;
        for path in files_under(root)? {
            if !has_template_extension(&path) {
                continue;
            }
            let template = read_template(&path)?;
            let hive = relative_path(root, &path)
                .and_then(|rel| rel.split_once('/').map(|(hive, _)| hive.to_string()));

            match hive {
                Some(hive) => {
                    let name = template.name.clone();
                    self.insert_in_hive(&hive, &name, template);
                }
                None => self.insert(template),
            }
            loaded += 1;
        }

        info!(root:? = root, templates = loaded; "Loaded template directory");
        Ok(loaded)
    }

    /// Load a hive declared by a document.
    ///
    /// Keys are `hive/relative-path-without-extension`. Without an `include`
    /// glob only YAML files are taken; both globs are matched against the file
    /// name and against the hive-relative path.
    pub fn load_hive(&mut self, hive: &TemplateHiveRef, base: &Path) -> Result<usize, TemplateError> {
        let root = match (&hive.source, &hive.path) {
            (Some(source), _) => {
                return Err(TemplateError::load(
                    source,
                    "external sources are not supported",
                ))
            }
            (None, Some(path)) => resolve_against(base, path),
            (None, None) => base.to_path_buf(),
        };

        let include = hive.include.as_deref().map(compile_pattern).transpose()?;
        let exclude = hive.exclude.as_deref().map(compile_pattern).transpose()?;

        let mut loaded = 0;
        for path in files_under(&root)? {
            let Some(rel) = relative_path(&root, &path) else {
                continue;
            };
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let matches = |p: &Pattern| {
                p.matches_with(&file_name, MATCH_OPTIONS) || p.matches_with(&rel, MATCH_OPTIONS)
            };

            let included = match &include {
                Some(pattern) => matches(pattern),
                None => has_template_extension(&path),
            };
            if !included || exclude.as_ref().is_some_and(matches) {
                continue;
            }

            let template = read_template(&path)?;
            let short = strip_extension(&rel);
            self.insert_in_hive(&hive.name, &short, template);
            loaded += 1;
        }

        info!(hive = hive.name.as_str(), root:? = root, templates = loaded; "Loaded template hive");
        Ok(loaded)
    }

    /// Load a single template file, registered under the reference's name
    pub fn load_ref(&mut self, reference: &TemplateRef, base: &Path) -> Result<(), TemplateError> {
        let path = match (&reference.source, &reference.path) {
            (Some(source), _) => {
                return Err(TemplateError::load(
                    source,
                    "external sources are not supported",
                ))
            }
            (None, Some(path)) => resolve_against(base, path),
            (None, None) => {
                return Err(TemplateError::load(
                    &reference.name,
                    format!("template {} must specify either source or path", reference.name),
                ))
            }
        };

        let mut template = read_template(&path)?;
        if !reference.name.is_empty() {
            template.name = reference.name.clone();
        }
        debug!(template = template.name.as_str(), path:? = path; "Loaded template reference");
        self.insert(template);
        Ok(())
    }

    /// Register a template at root scope under its own name
    pub fn insert(&mut self, template: Template) {
        self.templates.insert(template.name.clone(), template);
    }

    /// Register a template as `hive/short`
    pub fn insert_in_hive(&mut self, hive: &str, short: &str, template: Template) {
        self.templates.insert(format!("{}/{}", hive, short), template);
        self.hives
            .entry(hive.to_string())
            .or_default()
            .push(short.to_string());
    }

    /// Resolve a template reference against the current hive.
    ///
    /// Qualified references are returned unchanged. Otherwise the current
    /// hive, the root scope and finally every known hive are tried in that
    /// order. An unresolvable reference is returned as given.
    pub fn resolve(&self, reference: &str, current_hive: Option<&str>) -> String {
        if reference.contains('/') {
            return reference.to_string();
        }

        if let Some(hive) = current_hive.filter(|h| !h.is_empty()) {
            let key = format!("{}/{}", hive, reference);
            if self.templates.contains_key(&key) {
                return key;
            }
        }

        if self.templates.contains_key(reference) {
            return reference.to_string();
        }

        // a short name held by a single hive resolves from any context
        self.hives
            .keys()
            .map(|hive| format!("{}/{}", hive, reference))
            .find(|key| self.templates.contains_key(key))
            .unwrap_or_else(|| reference.to_string())
    }

    pub fn get(&self, key: &str) -> Option<&Template> {
        self.templates.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.templates.contains_key(key)
    }

    /// All template keys, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.templates.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Hive names in load order
    pub fn hives(&self) -> Vec<&str> {
        self.hives.keys().map(String::as_str).collect()
    }

    pub fn templates_in_hive(&self, hive: &str) -> &[String] {
        self.hives.get(hive).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Keys close to an unresolved reference
    pub fn suggestions(&self, reference: &str) -> Vec<String> {
        find_similar(self.templates.keys().map(String::as_str), reference, 2)
    }
}

fn read_template(path: &Path) -> Result<Template, TemplateError> {
    let content = std::fs::read_to_string(path).map_err(|e| TemplateError::load(path, e))?;
    let mut template: Template =
        serde_yaml::from_str(&content).map_err(|e| TemplateError::load(path, e))?;
    template.source_path = Some(path.to_path_buf());
    Ok(template)
}

/// Every regular file below `root`, in path order
fn files_under(root: &Path) -> Result<Vec<PathBuf>, TemplateError> {
    if !root.is_dir() {
        return Err(TemplateError::load(root, "not a directory"));
    }

    let escaped = Pattern::escape(&root.to_string_lossy());
    let pattern = format!("{}/**/*", escaped.trim_end_matches('/'));
    let entries = glob::glob(&pattern).map_err(|e| TemplateError::Pattern {
        pattern: pattern.clone(),
        message: e.to_string(),
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| TemplateError::load(e.path().to_path_buf(), e.error()))?;
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn compile_pattern(pattern: &str) -> Result<Pattern, TemplateError> {
    Pattern::new(pattern).map_err(|e| TemplateError::Pattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

fn has_template_extension(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml" | "yml")
    )
}

/// `path` relative to `root`, with forward slashes
fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(parts.join("/"))
}

fn strip_extension(rel: &str) -> String {
    match rel.rfind('.') {
        Some(dot) if !rel[dot..].contains('/') => rel[..dot].to_string(),
        _ => rel.to_string(),
    }
}

fn resolve_against(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "box.yaml", "name: box\n");
        write(dir.path(), "core/frame.yaml", "name: frame\n");
        write(dir.path(), "core/panel.yml", "name: panel\n");
        write(dir.path(), "net/vpc.yaml", "name: vpc\n");
        write(dir.path(), "README.md", "not a template");
        dir
    }

    #[test]
    fn test_load_assigns_hives_from_first_segment() {
        let dir = tree();
        let mut store = TemplateStore::new();
        let loaded = store.load(dir.path()).unwrap();

        assert_eq!(loaded, 4);
        assert_eq!(store.names(), vec!["box", "core/frame", "core/panel", "net/vpc"]);
        assert_eq!(store.hives(), vec!["core", "net"]);
        assert_eq!(store.templates_in_hive("core"), ["frame", "panel"]);
        assert!(store.get("core/frame").unwrap().source_path.is_some());
    }

    #[test]
    fn test_malformed_file_aborts_load() {
        let dir = tree();
        write(dir.path(), "broken.yaml", "name: [unclosed");
        let mut store = TemplateStore::new();
        assert!(matches!(
            store.load(dir.path()),
            Err(TemplateError::Load { .. })
        ));
    }

    #[test]
    fn test_resolution_order() {
        let mut store = TemplateStore::new();
        store.insert(Template::new("box"));
        store.insert_in_hive("core", "box", Template::new("box"));
        store.insert_in_hive("net", "vpc", Template::new("vpc"));

        assert_eq!(store.resolve("box", Some("core")), "core/box");
        assert_eq!(store.resolve("box", None), "box");
        assert_eq!(store.resolve("vpc", None), "net/vpc");
        assert_eq!(store.resolve("net/missing", None), "net/missing");
        assert_eq!(store.resolve("nothing", Some("core")), "nothing");
    }

    #[test]
    fn test_hive_include_and_exclude() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "aws/vpc.yaml", "name: vpc\n");
        write(dir.path(), "aws/subnet.yaml", "name: subnet\n");
        write(dir.path(), "aws/draft/old.yaml", "name: old\n");
        write(dir.path(), "azure/vnet.yaml", "name: vnet\n");

        let hive = TemplateHiveRef {
            name: "cloud".into(),
            path: None,
            source: None,
            include: Some("aws/*.yaml".into()),
            exclude: Some("subnet.yaml".into()),
        };
        let mut store = TemplateStore::new();
        store.load_hive(&hive, dir.path()).unwrap();

        assert_eq!(store.names(), vec!["cloud/aws/vpc"]);
        assert_eq!(store.templates_in_hive("cloud"), ["aws/vpc"]);
    }

    #[test]
    fn test_hive_defaults_to_yaml_files() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "net/vpc.yaml", "name: vpc\n");
        write(dir.path(), "net/notes.txt", "ignored");

        let hive = TemplateHiveRef {
            name: "network".into(),
            path: Some(PathBuf::from("net")),
            ..TemplateHiveRef::default()
        };
        let mut store = TemplateStore::new();
        assert_eq!(store.load_hive(&hive, dir.path()).unwrap(), 1);
        assert!(store.contains("network/vpc"));
    }

    #[test]
    fn test_external_sources_rejected() {
        let hive = TemplateHiveRef {
            name: "remote".into(),
            source: Some("https://example.com/hive.git".into()),
            ..TemplateHiveRef::default()
        };
        let err = TemplateStore::new()
            .load_hive(&hive, Path::new("."))
            .unwrap_err();
        assert!(err.to_string().contains("external sources are not supported"));
    }

    #[test]
    fn test_load_ref_overrides_name() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "shapes/server.yaml", "name: generic-server\n");

        let reference = TemplateRef {
            name: "server".into(),
            path: Some(PathBuf::from("shapes/server.yaml")),
            source: None,
        };
        let mut store = TemplateStore::new();
        store.load_ref(&reference, dir.path()).unwrap();

        assert_eq!(store.get("server").map(|t| t.name.as_str()), Some("server"));
        assert!(!store.contains("generic-server"));
    }

    #[test]
    fn test_load_ref_requires_path_or_source() {
        let reference = TemplateRef {
            name: "orphan".into(),
            ..TemplateRef::default()
        };
        let err = TemplateStore::new()
            .load_ref(&reference, Path::new("."))
            .unwrap_err();
        assert!(err.to_string().contains("must specify either source or path"));
    }

    #[test]
    fn test_suggestions() {
        let mut store = TemplateStore::new();
        store.insert_in_hive("core", "box", Template::new("box"));
        assert_eq!(store.suggestions("core/bx"), vec!["core/box"]);
    }
}
