//! Depth-first application of providers and templates to a document

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, info, warn};

use super::icon::apply_icon;
use super::merge::merge_group;
use super::vars::{apply_variables, template_variables};
use super::{TemplateDefaults, TemplateError, TemplateStore};
use crate::model::{
    DiagramConfig, Element, ElementType, Page, ProviderKind, ProviderRef, Relationship, Template,
    TemplateHiveRef, TemplateRef,
};
use crate::provider::{split_resource_reference, Provider, ProviderError, ProviderRegistry};

/// Resolves `resource:` and `template:` references across a document.
///
/// Elements are visited parent before children. Each visit receives the
/// resolved template keys of its ancestors, most recent first; the head of
/// that list selects the hive for short references and is what `parent`
/// dependencies are checked against.
#[derive(Debug)]
pub struct TemplateProcessor {
    store: TemplateStore,
    registry: Arc<ProviderRegistry>,
    provider_refs: HashMap<String, ProviderRef>,
    defaults: TemplateDefaults,
    /// Loaded in full by `load_templates`; also the base for relative paths
    template_dir: Option<PathBuf>,
    /// Base for relative paths when no template directory is set
    base_dir: Option<PathBuf>,
}

/// Position of the element being processed, for error messages
struct Scope<'a> {
    /// Resolved template keys of the ancestors, most recent first
    ancestors: &'a [String],
    /// Templates whose literal children produced this element, outermost
    /// first
    expansions: &'a [String],
    /// `page/<id>/...` followed by ancestor display names
    location: &'a str,
    page_level: bool,
}

impl TemplateProcessor {
    pub fn new(registry: Arc<ProviderRegistry>) -> Self {
        Self {
            store: TemplateStore::new(),
            registry,
            provider_refs: HashMap::new(),
            defaults: TemplateDefaults::default(),
            template_dir: None,
            base_dir: None,
        }
    }

    pub fn with_template_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.template_dir = Some(dir.into());
        self
    }

    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    pub fn with_defaults(mut self, defaults: TemplateDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn with_store(mut self, store: TemplateStore) -> Self {
        self.store = store;
        self
    }

    pub fn store(&self) -> &TemplateStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut TemplateStore {
        &mut self.store
    }

    fn base_dir(&self) -> &Path {
        self.template_dir
            .as_deref()
            .or(self.base_dir.as_deref())
            .unwrap_or_else(|| Path::new("."))
    }

    /// Load every template under the configured template directory
    pub fn load_templates(&mut self) -> Result<usize, TemplateError> {
        match self.template_dir.clone() {
            Some(dir) => self.store.load(&dir),
            None => Ok(0),
        }
    }

    pub fn load_provider_refs(&mut self, refs: &[ProviderRef]) {
        for provider_ref in refs {
            self.provider_refs
                .insert(provider_ref.name.clone(), provider_ref.clone());
        }
    }

    pub fn load_hive_refs(&mut self, hives: &[TemplateHiveRef]) -> Result<(), TemplateError> {
        let base = self.base_dir().to_path_buf();
        for hive in hives {
            self.store.load_hive(hive, &base)?;
        }
        Ok(())
    }

    pub fn load_template_refs(&mut self, refs: &[TemplateRef]) -> Result<(), TemplateError> {
        let base = self.base_dir().to_path_buf();
        for reference in refs {
            self.store.load_ref(reference, &base)?;
        }
        Ok(())
    }

    /// Load the sources a document declares, then process every page
    pub fn process_diagram(&mut self, config: &mut DiagramConfig) -> Result<(), TemplateError> {
        self.load_provider_refs(&config.providers);
        self.load_hive_refs(&config.template_hives)?;
        self.load_template_refs(&config.templates)?;

        for page in &mut config.diagram.pages {
            self.process_page(page)?;
        }

        info!(pages = config.diagram.pages.len(), templates = self.store.len(); "Processed diagram");
        Ok(())
    }

    /// Process layer elements, then page-level elements
    pub fn process_page(&self, page: &mut Page) -> Result<(), TemplateError> {
        let page_location = format!("page/{}", page.id);
        if page.id.is_empty() || page.name.is_empty() {
            return Err(TemplateError::structural(
                page_location,
                "page must have both 'id' and 'name' fields",
            ));
        }

        for layer in &mut page.layers {
            let location = format!("{}/layer/{}", page_location, layer.id);
            self.process_elements(&mut layer.elements, &[], &[], &location, false)?;
        }
        self.process_elements(&mut page.elements, &[], &[], &page_location, true)
    }

    fn process_elements(
        &self,
        elements: &mut [Element],
        ancestors: &[String],
        expansions: &[String],
        location: &str,
        page_level: bool,
    ) -> Result<(), TemplateError> {
        for element in elements {
            let scope = Scope {
                ancestors,
                expansions,
                location,
                page_level,
            };
            let authored = element.children.len();
            let applied = self.process_element(element, &scope)?;

            let child_location = format!("{}/{}", location, element.display_name());
            match applied {
                Some(key) => {
                    let mut child_ancestors = Vec::with_capacity(ancestors.len() + 1);
                    child_ancestors.push(key.clone());
                    child_ancestors.extend_from_slice(ancestors);

                    // children injected by the template carry it in their
                    // expansion chain; authored children do not
                    let mut child_expansions = expansions.to_vec();
                    child_expansions.push(key);

                    let (own, injected) = element.children.split_at_mut(authored);
                    self.process_elements(
                        own,
                        &child_ancestors,
                        expansions,
                        &child_location,
                        false,
                    )?;
                    self.process_elements(
                        injected,
                        &child_ancestors,
                        &child_expansions,
                        &child_location,
                        false,
                    )?;
                }
                None => self.process_elements(
                    &mut element.children,
                    ancestors,
                    expansions,
                    &child_location,
                    false,
                )?,
            }
        }
        Ok(())
    }

    /// Apply the element's resource or template. Returns the resolved
    /// template key when a template was applied.
    fn process_element(
        &self,
        element: &mut Element,
        scope: &Scope<'_>,
    ) -> Result<Option<String>, TemplateError> {
        check_identity(element, scope)?;

        if let Some(reference) = element.resource_ref().map(str::to_string) {
            self.apply_resource(element, &reference, scope)?;
            return Ok(None);
        }

        if let Some(reference) = element.template_ref().map(str::to_string) {
            let key = self.apply_template(element, &reference, scope)?;
            return Ok(Some(key));
        }

        Ok(None)
    }

    fn apply_resource(
        &self,
        element: &mut Element,
        reference: &str,
        scope: &Scope<'_>,
    ) -> Result<(), TemplateError> {
        let wrap = |source: ProviderError| TemplateError::Provider {
            element: element.display_name().to_string(),
            location: scope.location.to_string(),
            source,
        };

        let (provider_name, resource_type) = split_resource_reference(reference).map_err(wrap)?;
        let provider = self.resolve_provider(&provider_name, reference).map_err(wrap)?;
        provider
            .validate(&resource_type, &element.parameters)
            .map_err(wrap)?;
        let generated = provider
            .generate_template(&resource_type, &element.parameters)
            .map_err(wrap)?;

        debug!(
            element = element.display_name(),
            provider = provider.name(),
            resource = resource_type.as_str();
            "Generated provider resource"
        );

        element.element_type = generated.element_type;
        element.properties = generated.properties;
        element.style = generated.style;
        element.nesting = generated.nesting;
        Ok(())
    }

    /// Find the provider for a declared name, honouring the document's
    /// builtin/registry preference
    fn resolve_provider(
        &self,
        declared: &str,
        reference: &str,
    ) -> Result<Arc<dyn Provider>, ProviderError> {
        let provider_ref = self.provider_refs.get(declared);
        let actual = provider_ref
            .and_then(|r| r.source.as_deref())
            .and_then(|source| source.rsplit_once("provider-"))
            .map_or(declared, |(_, name)| name);

        let provider = match provider_ref.map(|r| r.kind) {
            Some(ProviderKind::Builtin) => self.registry.get_with_origin(actual, ProviderKind::Builtin),
            _ => self.registry.get(actual),
        };

        provider.ok_or_else(|| ProviderError::NotFound {
            provider: actual.to_string(),
            reference: reference.to_string(),
        })
    }

    fn apply_template(
        &self,
        element: &mut Element,
        reference: &str,
        scope: &Scope<'_>,
    ) -> Result<String, TemplateError> {
        let current_hive = scope
            .ancestors
            .first()
            .and_then(|head| head.split_once('/'))
            .map(|(hive, _)| hive);
        let key = self.store.resolve(reference, current_hive);

        if scope.expansions.contains(&key) {
            let chain: Vec<&str> = scope
                .expansions
                .iter()
                .map(String::as_str)
                .chain(std::iter::once(key.as_str()))
                .collect();
            return Err(TemplateError::structural(
                format!("{}/{}", scope.location, element.display_name()),
                format!("template cycle: {}", chain.join(" -> ")),
            ));
        }

        let Some(template) = self.store.get(&key) else {
            return Err(TemplateError::NotFound {
                reference: reference.to_string(),
                resolved: key.clone(),
                element: element.display_name().to_string(),
                location: scope.location.to_string(),
                suggestions: self.store.suggestions(&key),
            });
        };

        check_dependencies(element, template, &key, scope)?;

        let vars = template_variables(element, template, &key, &self.defaults, scope.location)?;

        element.element_type = Some(ElementType::Shape);
        merge_group(element, &template.group);
        if let Some(icon) = &template.group.icon {
            apply_icon(element, icon, template.source_path.as_deref())?;
        }

        let parent_id = element.identifier().unwrap_or_default().to_string();
        let child_location = format!("{}/{}", scope.location, element.display_name());
        for (i, child) in template.group.children.iter().enumerate() {
            let mut child = child.clone();
            if child.id().is_none() {
                child.id = Some(format!("{}-{}", parent_id, i));
            }
            apply_variables(&mut child, &vars, &child_location)?;
            element.children.push(child);
        }

        apply_variables(element, &vars, scope.location)?;

        debug!(element = element.display_name(), template = key.as_str(); "Applied template");
        Ok(key)
    }
}

/// Page-level elements need both an id and a name; any other element needs
/// at least one of them
fn check_identity(element: &Element, scope: &Scope<'_>) -> Result<(), TemplateError> {
    let (ok, message) = if scope.page_level {
        (
            element.id().is_some() && element.name().is_some(),
            "page-level elements must have both 'id' and 'name' fields",
        )
    } else {
        (
            element.identifier().is_some(),
            "elements must have either an 'id' or a 'name' field",
        )
    };

    if ok {
        Ok(())
    } else {
        Err(TemplateError::structural(
            format!("{}/{}", scope.location, element.display_name()),
            message,
        ))
    }
}

fn check_dependencies(
    element: &Element,
    template: &Template,
    key: &str,
    scope: &Scope<'_>,
) -> Result<(), TemplateError> {
    for dependency in template.dependencies.iter().filter(|d| d.required) {
        let required = dependency.template_type.as_str();
        let satisfied = match &dependency.relationship {
            Relationship::Parent => scope
                .ancestors
                .first()
                .is_some_and(|head| names_template(head, required)),
            Relationship::Ancestor => scope
                .ancestors
                .iter()
                .any(|ancestor| names_template(ancestor, required)),
            other => {
                warn!(
                    template = key,
                    relationship = other.as_str(),
                    dependency = dependency.name.as_str();
                    "Dependency relationship is not enforced"
                );
                true
            }
        };

        if !satisfied {
            return Err(TemplateError::DependencyUnsatisfied {
                element: element.display_name().to_string(),
                template: key.to_string(),
                required: required.to_string(),
                relationship: dependency.relationship.clone(),
                ancestors: scope.ancestors.to_vec(),
                location: scope.location.to_string(),
            });
        }
    }
    Ok(())
}

/// Whether the resolved key `ancestor` is the template `required`, either
/// exactly or by its name within a hive
fn names_template(ancestor: &str, required: &str) -> bool {
    ancestor == required
        || ancestor
            .split_once('/')
            .is_some_and(|(_, short)| short == required)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Dependency, GroupConfig, Value};
    use pretty_assertions::assert_eq;

    fn processor(store: TemplateStore) -> TemplateProcessor {
        TemplateProcessor::new(Arc::new(ProviderRegistry::with_builtins())).with_store(store)
    }

    fn page(elements: Vec<Element>) -> Page {
        let mut page = Page::new("p1", "Page 1");
        page.elements = elements;
        page
    }

    fn framed_store() -> TemplateStore {
        let mut store = TemplateStore::new();
        let mut frame = Template::new("frame");
        frame.group.properties.width = 400.0;
        frame.group.style.fill_color = Some("{{ .fillColor }}".into());
        store.insert_in_hive("core", "frame", frame);
        store.insert_in_hive("core", "box", Template::new("box"));
        store
    }

    #[test]
    fn test_template_applied_and_coerced_to_shape() {
        let processor = processor(framed_store());
        let mut page = page(vec![Element::new(ElementType::Group)
            .with_id("f")
            .with_name("Frame")
            .with_template("core/frame")]);

        processor.process_page(&mut page).unwrap();

        let element = &page.elements[0];
        assert_eq!(element.element_type, Some(ElementType::Shape));
        assert_eq!(element.properties.width, 400.0);
        assert_eq!(element.style.fill_color.as_deref(), Some("#E3F2FD"));
    }

    #[test]
    fn test_short_reference_resolves_in_ancestor_hive() {
        let processor = processor(framed_store());
        let mut page = page(vec![Element::new(ElementType::Shape)
            .with_id("f")
            .with_name("Frame")
            .with_template("core/frame")
            .with_child(Element::new(ElementType::Shape).with_id("b").with_template("box"))]);

        processor.process_page(&mut page).unwrap();
        assert_eq!(
            page.elements[0].children[0].element_type,
            Some(ElementType::Shape)
        );
    }

    #[test]
    fn test_unresolved_reference_reports_suggestions() {
        let processor = processor(framed_store());
        let mut page = page(vec![Element::new(ElementType::Shape)
            .with_id("b")
            .with_name("Box")
            .with_template("core/bxo")]);

        let err = processor.process_page(&mut page).unwrap_err();
        assert!(matches!(err, TemplateError::NotFound { ref resolved, .. } if resolved == "core/bxo"));
        assert_eq!(err.suggestions(), Some(&["core/box".to_string()][..]));
    }

    #[test]
    fn test_template_children_are_injected_with_synthetic_ids() {
        let mut store = TemplateStore::new();
        let mut server = Template::new("server");
        server.group = GroupConfig {
            children: vec![
                Element::new(ElementType::Text).with_label("{{ .name }}"),
                Element::new(ElementType::Shape).with_id("disk"),
            ],
            ..GroupConfig::default()
        };
        store.insert(server);

        let processor = processor(store);
        let mut page = page(vec![Element::new(ElementType::Shape)
            .with_id("web")
            .with_name("Web")
            .with_template("server")]);
        processor.process_page(&mut page).unwrap();

        let children = &page.elements[0].children;
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].id(), Some("web-0"));
        assert_eq!(children[0].label(), Some("Web"));
        assert_eq!(children[1].id(), Some("disk"));
    }

    #[test]
    fn test_parent_dependency() {
        let mut store = TemplateStore::new();
        store.insert(Template::new("vpc"));
        let mut subnet = Template::new("subnet");
        subnet.dependencies.push(Dependency {
            name: "network".into(),
            template_type: "vpc".into(),
            required: true,
            relationship: Relationship::Parent,
            ..Dependency::default()
        });
        store.insert(subnet);
        let processor = processor(store);

        let mut orphan = page(vec![Element::new(ElementType::Shape)
            .with_id("s")
            .with_name("Subnet")
            .with_template("subnet")]);
        let err = processor.process_page(&mut orphan).unwrap_err();
        assert!(matches!(err, TemplateError::DependencyUnsatisfied { .. }));

        let mut nested = page(vec![Element::new(ElementType::Shape)
            .with_id("v")
            .with_name("VPC")
            .with_template("vpc")
            .with_child(
                Element::new(ElementType::Shape)
                    .with_id("s")
                    .with_template("subnet"),
            )]);
        processor.process_page(&mut nested).unwrap();
    }

    #[test]
    fn test_ancestor_dependency_sees_through_plain_elements() {
        let mut store = TemplateStore::new();
        store.insert_in_hive("net", "vpc", Template::new("vpc"));
        let mut host = Template::new("host");
        host.dependencies.push(Dependency {
            template_type: "vpc".into(),
            required: true,
            relationship: Relationship::Ancestor,
            ..Dependency::default()
        });
        store.insert(host);
        let processor = processor(store);

        let mut page = page(vec![Element::new(ElementType::Shape)
            .with_id("v")
            .with_name("VPC")
            .with_template("net/vpc")
            .with_child(
                Element::new(ElementType::Group)
                    .with_id("g")
                    .with_child(Element::new(ElementType::Shape).with_id("h").with_template("host")),
            )]);
        processor.process_page(&mut page).unwrap();
    }

    #[test]
    fn test_resource_keeps_identity() {
        let processor = processor(TemplateStore::new());
        let mut element = Element::new(ElementType::Template)
            .with_id("s1")
            .with_name("Box");
        element.resource = Some("core-shape".into());
        element
            .parameters
            .insert("label".into(), Value::from("Hello"));
        let mut page = page(vec![element]);

        processor.process_page(&mut page).unwrap();

        let element = &page.elements[0];
        assert_eq!(element.id(), Some("s1"));
        assert_eq!(element.name(), Some("Box"));
        assert_eq!(element.element_type, Some(ElementType::Shape));
        assert_eq!(element.label(), Some("Hello"));
    }

    #[test]
    fn test_unknown_provider_is_an_error() {
        let processor = processor(TemplateStore::new());
        let mut element = Element::new(ElementType::Shape).with_id("x").with_name("X");
        element.resource = Some("foo-bar".into());
        let mut page = page(vec![element]);

        let err = processor.process_page(&mut page).unwrap_err();
        assert!(matches!(
            err,
            TemplateError::Provider {
                source: ProviderError::NotFound { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_builtin_preference_and_source_mapping() {
        let mut processor = processor(TemplateStore::new());
        processor.load_provider_refs(&[ProviderRef {
            name: "basic".into(),
            source: Some("acme/drawloom-provider-core".into()),
            kind: ProviderKind::Builtin,
            version: None,
        }]);

        let provider = processor.resolve_provider("basic", "basic-text").unwrap();
        assert_eq!(provider.name(), "core");
    }

    #[test]
    fn test_page_level_elements_need_id_and_name() {
        let processor = processor(TemplateStore::new());
        let mut page = page(vec![Element::new(ElementType::Shape).with_id("only-id")]);
        let err = processor.process_page(&mut page).unwrap_err();
        assert!(matches!(err, TemplateError::StructuralInvariant { .. }));
    }

    #[test]
    fn test_nested_elements_need_id_or_name() {
        let processor = processor(TemplateStore::new());
        let mut page = page(vec![Element::new(ElementType::Group)
            .with_id("g")
            .with_name("G")
            .with_child(Element::new(ElementType::Shape))]);

        let err = processor.process_page(&mut page).unwrap_err();
        match err {
            TemplateError::StructuralInvariant { location, .. } => {
                assert_eq!(location, "page/p1/G/<unnamed>");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    fn with_literal_child(name: &str, child_id: &str, reference: &str) -> Template {
        let mut template = Template::new(name);
        template.group.children.push(
            Element::new(ElementType::Shape)
                .with_id(child_id)
                .with_template(reference),
        );
        template
    }

    fn cycle_error(err: TemplateError) -> (String, String) {
        match err {
            TemplateError::StructuralInvariant { location, message } => (location, message),
            other => panic!("expected a template cycle, got {other}"),
        }
    }

    #[test]
    fn test_self_referencing_template_is_a_cycle() {
        let mut store = TemplateStore::new();
        store.insert(with_literal_child("loop", "inner", "loop"));
        let processor = processor(store);
        let mut page = page(vec![Element::new(ElementType::Shape)
            .with_id("a")
            .with_name("A")
            .with_template("loop")]);

        let (location, message) = cycle_error(processor.process_page(&mut page).unwrap_err());
        assert_eq!(location, "page/p1/A/inner");
        assert_eq!(message, "template cycle: loop -> loop");
    }

    #[test]
    fn test_mutually_referencing_templates_are_a_cycle() {
        let mut store = TemplateStore::new();
        store.insert_in_hive("core", "a", with_literal_child("a", "to-b", "b"));
        store.insert_in_hive("core", "b", with_literal_child("b", "to-a", "a"));
        let processor = processor(store);
        let mut page = page(vec![Element::new(ElementType::Shape)
            .with_id("start")
            .with_name("Start")
            .with_template("core/a")]);

        let (location, message) = cycle_error(processor.process_page(&mut page).unwrap_err());
        assert_eq!(location, "page/p1/Start/to-b/to-a");
        assert_eq!(message, "template cycle: core/a -> core/b -> core/a");
    }

    #[test]
    fn test_authored_nesting_of_the_same_template_is_allowed() {
        let processor = processor(framed_store());
        let mut page = page(vec![Element::new(ElementType::Shape)
            .with_id("outer")
            .with_name("Outer")
            .with_template("core/frame")
            .with_child(
                Element::new(ElementType::Shape)
                    .with_id("inner")
                    .with_template("core/frame"),
            )]);

        processor.process_page(&mut page).unwrap();
        assert_eq!(page.elements[0].children[0].properties.width, 400.0);
    }
}
