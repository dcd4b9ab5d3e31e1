//! Component declarations.
//!
//! A `Component` is immutable once built and shared through `Arc`, so the same
//! declaration can be imported by many pages (imports form a DAG) while child
//! pages form a tree.
//!
//! # Example
//!
//! ```ignore
//! let nav = Component::builder("nav", "components/nav.html", base)
//!     .selector("site-nav")
//!     .external_style("components/nav.css")
//!     .build();
//!
//! let home = Component::builder("index", "pages/home.html", base)
//!     .import(nav.clone())
//!     .global_style("styles/reset.css")
//!     .child(about)
//!     .build();
//! ```

pub mod manifest;

use crate::utils::path::resolve;
use serde_json::Value;
use std::{
    fmt,
    path::{Path, PathBuf},
    sync::Arc,
};

// ============================================================================
// Identity
// ============================================================================

/// Path-qualified component identity: `name@/abs/template.html`.
///
/// Two declarations sharing a name but not a template never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentKey(String);

impl ComponentKey {
    pub fn new(name: &str, template: &Path) -> Self {
        Self(format!("{name}@{}", template.display()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComponentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Declaration
// ============================================================================

/// An authored page or fragment.
#[derive(Debug, Clone)]
pub struct Component {
    name: String,
    template: PathBuf,
    selector: Option<String>,
    imports: Vec<Mount>,
    external_styles: Vec<PathBuf>,
    external_scripts: Vec<PathBuf>,
    global_styles: Vec<PathBuf>,
    global_scripts: Vec<PathBuf>,
    values: Option<Value>,
    children: Vec<Mount>,
}

impl Component {
    /// Start a declaration. Relative paths resolve against `base`.
    pub fn builder(
        name: impl Into<String>,
        template: impl AsRef<Path>,
        base: impl Into<PathBuf>,
    ) -> ComponentBuilder {
        let base = base.into();
        ComponentBuilder {
            component: Component {
                name: name.into(),
                template: resolve(&base, template.as_ref()),
                selector: None,
                imports: Vec::new(),
                external_styles: Vec::new(),
                external_scripts: Vec::new(),
                global_styles: Vec::new(),
                global_scripts: Vec::new(),
                values: None,
                children: Vec::new(),
            },
            base,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn template(&self) -> &Path {
        &self.template
    }

    pub fn selector(&self) -> Option<&str> {
        self.selector.as_deref()
    }

    pub fn imports(&self) -> &[Mount] {
        &self.imports
    }

    pub fn external_styles(&self) -> &[PathBuf] {
        &self.external_styles
    }

    pub fn external_scripts(&self) -> &[PathBuf] {
        &self.external_scripts
    }

    pub fn global_styles(&self) -> &[PathBuf] {
        &self.global_styles
    }

    pub fn global_scripts(&self) -> &[PathBuf] {
        &self.global_scripts
    }

    pub fn values(&self) -> Option<&Value> {
        self.values.as_ref()
    }

    pub fn children(&self) -> &[Mount] {
        &self.children
    }

    pub fn key(&self) -> ComponentKey {
        ComponentKey::new(&self.name, &self.template)
    }
}

/// Builder for [`Component`]; resolves every path against its base directory.
#[derive(Debug)]
pub struct ComponentBuilder {
    component: Component,
    base: PathBuf,
}

impl ComponentBuilder {
    pub fn selector(mut self, selector: impl Into<String>) -> Self {
        self.component.selector = Some(selector.into());
        self
    }

    pub fn import(mut self, import: impl Into<ComponentRef>) -> Self {
        self.component.imports.push(import.into().into());
        self
    }

    pub fn external_style(mut self, path: impl AsRef<Path>) -> Self {
        let path = resolve(&self.base, path.as_ref());
        self.component.external_styles.push(path);
        self
    }

    pub fn external_script(mut self, path: impl AsRef<Path>) -> Self {
        let path = resolve(&self.base, path.as_ref());
        self.component.external_scripts.push(path);
        self
    }

    pub fn global_style(mut self, path: impl AsRef<Path>) -> Self {
        let path = resolve(&self.base, path.as_ref());
        self.component.global_styles.push(path);
        self
    }

    pub fn global_script(mut self, path: impl AsRef<Path>) -> Self {
        let path = resolve(&self.base, path.as_ref());
        self.component.global_scripts.push(path);
        self
    }

    pub fn values(mut self, values: Value) -> Self {
        self.component.values = Some(values);
        self
    }

    pub fn child(mut self, child: impl Into<ComponentRef>) -> Self {
        self.component.children.push(child.into().into());
        self
    }

    pub fn build(self) -> Arc<Component> {
        Arc::new(self.component)
    }
}

// ============================================================================
// References
// ============================================================================

/// How an import or child is written: bare, or with value overrides.
#[derive(Debug, Clone)]
pub enum ComponentRef {
    Plain(Arc<Component>),
    WithValues(Arc<Component>, Value),
}

impl From<Arc<Component>> for ComponentRef {
    fn from(component: Arc<Component>) -> Self {
        Self::Plain(component)
    }
}

impl From<(Arc<Component>, Value)> for ComponentRef {
    fn from((component, values): (Arc<Component>, Value)) -> Self {
        Self::WithValues(component, values)
    }
}

/// A component together with the values it renders with.
///
/// Overrides win over the declaration's own values.
#[derive(Debug, Clone)]
pub struct Mount {
    component: Arc<Component>,
    overrides: Option<Value>,
}

impl Mount {
    pub fn new(component: Arc<Component>) -> Self {
        Self {
            component,
            overrides: None,
        }
    }

    pub fn component(&self) -> &Arc<Component> {
        &self.component
    }

    /// Effective values: overrides, else the declaration's own values.
    pub fn values(&self) -> Option<&Value> {
        self.overrides.as_ref().or(self.component.values.as_ref())
    }
}

impl From<ComponentRef> for Mount {
    fn from(reference: ComponentRef) -> Self {
        match reference {
            ComponentRef::Plain(component) => Self::new(component),
            ComponentRef::WithValues(component, values) => Self {
                component,
                overrides: Some(values),
            },
        }
    }
}
