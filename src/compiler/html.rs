//! HTML compilation.
//!
//! Compiling a mount:
//!
//! 1. Return the cached result for `(component key, values)` if any
//! 2. Read the template
//! 3. Render it with the mount's values (when a templating engine is set)
//! 4. Add the scope class to every tag (when the component has scoped styles)
//! 5. Compile every import that has a selector
//! 6. Replace each `<selector>` usage with the import's HTML
//! 7. Cache
//!
//! The cache belongs to one `HtmlCompiler`, i.e. one build run.

use super::engine::TemplateEngine;
use super::layout::Layout;
use super::pages::{Compiled, Pages};
use super::BuildError;
use crate::component::{ComponentKey, Mount};
use crate::utils::{fs, id::fingerprint, scope, tags};
use anyhow::{Context, Result};
use rustc_hash::FxHashMap;
use serde_json::{Map, Value};

/// Compile cache key: one entry per component per distinct set of values.
type CacheKey = (ComponentKey, Option<blake3::Hash>);

/// Recursive, memoizing template compiler.
pub struct HtmlCompiler<'a> {
    layout: &'a Layout,
    engine: Option<&'a dyn TemplateEngine>,
    cache: FxHashMap<CacheKey, String>,
}

impl<'a> HtmlCompiler<'a> {
    pub fn new(layout: &'a Layout, engine: Option<&'a dyn TemplateEngine>) -> Self {
        Self {
            layout,
            engine,
            cache: FxHashMap::default(),
        }
    }

    /// Compile every page of the layout, in layout order.
    pub fn compile_pages(&mut self) -> Result<Pages<Compiled>> {
        let layout = self.layout;
        let html = layout
            .nodes()
            .iter()
            .map(|node| {
                self.compile(node.mount())
                    .with_context(|| format!("failed to compile page `{}`", node.name()))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Pages::from_html(html))
    }

    /// Compile one mount (page or import), reusing cached output.
    pub fn compile(&mut self, mount: &Mount) -> Result<String> {
        let component = mount.component();
        let key = (component.key(), mount.values().map(fingerprint));
        if let Some(html) = self.cache.get(&key) {
            return Ok(html.clone());
        }

        let template = fs::read_text(component.template())?;
        let mut html = self.render(&template, mount)?;

        if !component.external_styles().is_empty() {
            let scope = self.layout.scope(&key.0)?;
            html = scope::inject_class(&html, &scope.class_name());
        }

        for import in component.imports() {
            let Some(selector) = import.component().selector() else {
                continue;
            };
            let fragment = self
                .compile(import)
                .with_context(|| format!("failed to compile import `{}`", import.component().name()))?;
            html = tags::substitute_tag(&html, selector, &fragment)?;
        }

        self.cache.insert(key, html.clone());
        Ok(html)
    }

    fn render(&self, template: &str, mount: &Mount) -> Result<String> {
        let Some(engine) = self.engine else {
            return Ok(template.to_owned());
        };

        let empty = Value::Object(Map::new());
        let values = mount.values().unwrap_or(&empty);
        engine.render(template, values).map_err(|err| {
            BuildError::Render {
                path: mount.component().template().to_path_buf(),
                message: format!("{err:#}"),
            }
            .into()
        })
    }
}
