//! Turning `[components]` tables into a component tree.
//!
//! Each table is built once and shared, so a component imported from many
//! places is one `Arc`. References are followed depth-first; meeting a
//! component that is still being built means a cycle.

use super::{Component, ComponentRef, Mount};
use crate::config::{ComponentConfig, ManifestError, MountConfig};
use rustc_hash::FxHashMap;
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    sync::Arc,
};

/// Build the tree rooted at `root`, resolving every path against `base`.
pub fn resolve(
    components: &BTreeMap<String, ComponentConfig>,
    root: &str,
    base: &Path,
) -> Result<Mount, ManifestError> {
    if !components.contains_key(root) {
        return Err(ManifestError::MissingRoot(root.to_owned()));
    }

    let mut resolver = Resolver {
        components,
        base: base.to_path_buf(),
        built: FxHashMap::default(),
        stack: Vec::new(),
    };
    let component = resolver.build(root, root)?;
    Ok(Mount::new(component))
}

struct Resolver<'a> {
    components: &'a BTreeMap<String, ComponentConfig>,
    base: PathBuf,
    built: FxHashMap<&'a str, Arc<Component>>,
    /// Keys currently being built, outermost first.
    stack: Vec<&'a str>,
}

impl<'a> Resolver<'a> {
    fn build(&mut self, key: &str, referenced_by: &str) -> Result<Arc<Component>, ManifestError> {
        let components = self.components;
        let Some((key, config)) = components.get_key_value(key) else {
            return Err(ManifestError::UnknownComponent {
                key: key.to_owned(),
                referenced_by: referenced_by.to_owned(),
            });
        };
        let key = key.as_str();

        if let Some(component) = self.built.get(key) {
            return Ok(component.clone());
        }
        if let Some(start) = self.stack.iter().position(|&k| k == key) {
            let mut cycle = self.stack[start..].to_vec();
            cycle.push(key);
            return Err(ManifestError::ImportCycle {
                cycle: cycle.join(" -> "),
            });
        }

        self.stack.push(key);
        let name = config.name.as_deref().unwrap_or(key);
        let mut builder = Component::builder(name, &config.template, self.base.clone());

        if let Some(selector) = &config.selector {
            builder = builder.selector(selector.clone());
        }
        if let Some(values) = &config.values {
            builder = builder.values(values.clone());
        }
        for path in &config.external_styles {
            builder = builder.external_style(path);
        }
        for path in &config.external_scripts {
            builder = builder.external_script(path);
        }
        for path in &config.global_styles {
            builder = builder.global_style(path);
        }
        for path in &config.global_scripts {
            builder = builder.global_script(path);
        }
        for import in &config.imports {
            builder = builder.import(self.reference(import, key)?);
        }
        for child in &config.children {
            builder = builder.child(self.reference(child, key)?);
        }

        self.stack.pop();
        let component = builder.build();
        self.built.insert(key, component.clone());
        Ok(component)
    }

    fn reference(&mut self, mount: &MountConfig, referenced_by: &str) -> Result<ComponentRef, ManifestError> {
        let component = self.build(mount.key(), referenced_by)?;
        Ok(match mount {
            MountConfig::Key(_) => ComponentRef::Plain(component),
            MountConfig::WithValues { values, .. } => ComponentRef::WithValues(component, values.clone()),
        })
    }
}
