//! Output layout: one directory per page node.
//!
//! ```text
//! index            → out/
//! ├── about        → out/about/
//! └── blog         → out/blog/
//!     └── first    → out/blog/first/
//! ```
//!
//! The walk runs once, before any other stage. It also hands out the scope id
//! of every component reachable from the tree, imports included, so later
//! stages only ever look ids up.

use crate::component::{Component, ComponentKey, Mount};
use crate::utils::fs::create_dir_fresh;
use crate::utils::id::{ScopeId, ScopeIdGenerator, ScopeRegistry};
use anyhow::{Context, Result};
use rustc_hash::{FxHashMap, FxHashSet};
use std::path::{Component as PathComponent, Path, PathBuf};
use thiserror::Error;

/// Invalid page trees.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("page `{parent}` has two children named `{name}`")]
    DuplicateName { parent: String, name: String },

    #[error("component `{0}` is mounted as a page more than once")]
    DuplicatePage(ComponentKey),

    #[error("`{0}` is not a valid directory name for a child page")]
    InvalidName(String),

    #[error("no scope id assigned to `{0}`")]
    UnknownScope(ComponentKey),
}

/// A page in the output tree.
#[derive(Debug)]
pub struct PageNode {
    mount: Mount,
    directory: PathBuf,
    children: Vec<usize>,
}

impl PageNode {
    pub fn mount(&self) -> &Mount {
        &self.mount
    }

    pub fn component(&self) -> &Component {
        self.mount.component()
    }

    pub fn name(&self) -> &str {
        self.component().name()
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn children(&self) -> &[usize] {
        &self.children
    }
}

/// Arena of page nodes in depth-first order; index 0 is the root page.
#[derive(Debug)]
pub struct Layout {
    nodes: Vec<PageNode>,
    scopes: FxHashMap<ComponentKey, ScopeId>,
}

impl Layout {
    pub const ROOT: usize = 0;

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, index: usize) -> &PageNode {
        &self.nodes[index]
    }

    pub fn nodes(&self) -> &[PageNode] {
        &self.nodes
    }

    /// Scope id of any component reachable from the tree.
    pub fn scope(&self, key: &ComponentKey) -> Result<&ScopeId, LayoutError> {
        self.scopes
            .get(key)
            .ok_or_else(|| LayoutError::UnknownScope(key.clone()))
    }
}

/// Assign directories and scope ids, creating each directory on disk.
///
/// The root page lands in `output`; every child in `parent/<child name>`.
pub fn walk(root: &Mount, output: &Path, ids: &mut dyn ScopeIdGenerator) -> Result<Layout> {
    let mut walker = Walker {
        nodes: Vec::new(),
        pages: FxHashSet::default(),
        scoped: FxHashSet::default(),
        registry: ScopeRegistry::new(ids),
    };
    walker.visit(root, output.to_path_buf())?;

    Ok(Layout {
        nodes: walker.nodes,
        scopes: walker.registry.into_map(),
    })
}

struct Walker<'g> {
    nodes: Vec<PageNode>,
    pages: FxHashSet<ComponentKey>,
    scoped: FxHashSet<ComponentKey>,
    registry: ScopeRegistry<'g>,
}

impl Walker<'_> {
    fn visit(&mut self, mount: &Mount, directory: PathBuf) -> Result<usize> {
        let component = mount.component();
        let key = component.key();
        if !self.pages.insert(key.clone()) {
            return Err(LayoutError::DuplicatePage(key).into());
        }

        create_dir_fresh(&directory)
            .with_context(|| format!("could not create directory for page `{}`", component.name()))?;

        self.registry.assign(&key);
        self.scope_imports(component);

        let index = self.nodes.len();
        self.nodes.push(PageNode {
            mount: mount.clone(),
            directory: directory.clone(),
            children: Vec::new(),
        });

        let mut names = FxHashSet::default();
        for child in component.children() {
            let name = child.component().name();
            validate_name(name)?;
            if !names.insert(name) {
                return Err(LayoutError::DuplicateName {
                    parent: component.name().to_owned(),
                    name: name.to_owned(),
                }
                .into());
            }

            let child_index = self.visit(child, directory.join(name))?;
            self.nodes[index].children.push(child_index);
        }

        Ok(index)
    }

    /// Give every import (transitively) a scope id.
    fn scope_imports(&mut self, component: &Component) {
        for import in component.imports() {
            let key = import.component().key();
            if self.scoped.insert(key.clone()) {
                self.registry.assign(&key);
                self.scope_imports(import.component());
            }
        }
    }
}

/// A child name must be exactly one normal path segment.
fn validate_name(name: &str) -> Result<(), LayoutError> {
    let mut parts = Path::new(name).components();
    match (parts.next(), parts.next()) {
        (Some(PathComponent::Normal(_)), None) => Ok(()),
        _ => Err(LayoutError::InvalidName(name.to_owned())),
    }
}
