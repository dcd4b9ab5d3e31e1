//! Script bundling.
//!
//! Same walk as style bundling, without scoping: a page's bundle is its
//! inherited and own global scripts, then its external scripts, then those of
//! every import (selector or not). The bundle is written as `<name>.js` and
//! referenced from the end of `<body>` or `<head>`.

use super::bundle::Bundle;
use super::engine::Transform;
use super::layout::Layout;
use super::pages::{Pages, Scripted, Styled};
use crate::component::{Component, ComponentKey};
use crate::utils::fs;
use anyhow::{Context, Result, ensure};
use rustc_hash::FxHashSet;
use serde::Deserialize;
use std::path::PathBuf;

/// Where the `<script>` reference goes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptPosition {
    /// Before `</body>`.
    #[default]
    Body,
    /// Before `</head>`.
    Head,
}

impl ScriptPosition {
    fn anchor(self) -> &'static str {
        match self {
            Self::Body => "</body>",
            Self::Head => "</head>",
        }
    }
}

/// How script bundles are produced.
pub struct ScriptOptions<'a> {
    pub position: ScriptPosition,
    pub transform: &'a dyn Transform,
}

/// Bundle and reference the scripts of every page.
pub fn bundle_scripts(
    layout: &Layout,
    pages: Pages<Styled>,
    options: &ScriptOptions<'_>,
) -> Result<Pages<Scripted>> {
    ensure!(pages.len() == layout.len(), "page count does not match layout");
    let mut html = pages.into_html();

    visit(layout, options, Layout::ROOT, &[], &mut html)?;
    Ok(Pages::from_html(html))
}

fn visit(
    layout: &Layout,
    options: &ScriptOptions<'_>,
    index: usize,
    inherited: &[PathBuf],
    html: &mut [String],
) -> Result<()> {
    let node = layout.node(index);
    let component = node.component();

    let globals: Vec<PathBuf> = inherited
        .iter()
        .chain(component.global_scripts())
        .cloned()
        .collect();

    let mut text = fs::read_concat(&globals)?;
    let mut seen = FxHashSet::default();
    seen.insert(component.key());
    gather(component, &mut seen, &mut text)?;

    let text = options
        .transform
        .apply(&text, node.directory())
        .with_context(|| format!("script transform failed for page `{}`", node.name()))?;

    let name = node.name();
    let bundle = Bundle {
        module: "scripts",
        file_name: format!("{name}.js"),
        tag: format!(r#"<script src="{name}.js"></script>"#),
        anchor: options.position.anchor(),
    };
    let page = std::mem::take(&mut html[index]);
    html[index] = bundle.emit(node.directory(), &text, page)?;

    for &child in node.children() {
        visit(layout, options, child, &globals, html)?;
    }
    Ok(())
}

fn gather(component: &Component, seen: &mut FxHashSet<ComponentKey>, out: &mut String) -> Result<()> {
    out.push_str(&fs::read_concat(component.external_scripts())?);
    for import in component.imports() {
        let imported = import.component();
        if seen.insert(imported.key()) {
            gather(imported, seen, out)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::engine::{Identity, JsMinify};
    use crate::compiler::layout::walk;
    use crate::component::Mount;
    use crate::utils::id::SequentialIds;
    use std::path::Path;
    use std::sync::Arc;
    use tempfile::{TempDir, tempdir};

    const PAGE: &str = "<html><head></head><body><p>x</p></body></html>";

    fn write(dir: &TempDir, name: &str, content: &str) {
        std::fs::write(dir.path().join(name), content).unwrap();
    }

    fn run(root: Arc<Component>, out: &Path, options: &ScriptOptions<'_>) -> Pages<Scripted> {
        let layout = walk(&Mount::new(root), out, &mut SequentialIds::default()).unwrap();
        let pages = Pages::from_html(vec![PAGE.to_owned(); layout.len()]);
        bundle_scripts(&layout, pages, options).unwrap()
    }

    #[test]
    fn test_scripts_in_body_by_default() {
        let dir = tempdir().unwrap();
        write(&dir, "index.js", "let a = 1;\n");
        let root = Component::builder("index", "index.html", dir.path())
            .external_script("index.js")
            .build();
        let out = dir.path().join("out");

        let options = ScriptOptions {
            position: ScriptPosition::default(),
            transform: &Identity,
        };
        let pages = run(root, &out, &options);

        assert_eq!(
            pages.get(0),
            Some(r#"<html><head></head><body><p>x</p><script src="index.js"></script></body></html>"#)
        );
        assert_eq!(std::fs::read_to_string(out.join("index.js")).unwrap(), "let a = 1;\n");
    }

    #[test]
    fn test_scripts_in_head() {
        let dir = tempdir().unwrap();
        write(&dir, "index.js", "run();");
        let root = Component::builder("index", "index.html", dir.path())
            .external_script("index.js")
            .build();
        let out = dir.path().join("out");

        let options = ScriptOptions {
            position: ScriptPosition::Head,
            transform: &Identity,
        };
        let pages = run(root, &out, &options);

        assert_eq!(
            pages.get(0),
            Some(r#"<html><head><script src="index.js"></script></head><body><p>x</p></body></html>"#)
        );
    }

    #[test]
    fn test_imports_contribute_without_selector_and_globals_lead() {
        let dir = tempdir().unwrap();
        write(&dir, "analytics.js", "/*g*/");
        write(&dir, "page.js", "/*page*/");
        write(&dir, "widget.js", "/*widget*/");
        write(&dir, "child.js", "/*child*/");

        let widget = Component::builder("widget", "widget.html", dir.path())
            .external_script("widget.js")
            .build();
        let child = Component::builder("docs", "docs.html", dir.path())
            .external_script("child.js")
            .build();
        let root = Component::builder("index", "index.html", dir.path())
            .global_script("analytics.js")
            .external_script("page.js")
            .import(widget)
            .child(child)
            .build();
        let out = dir.path().join("out");

        let options = ScriptOptions {
            position: ScriptPosition::Body,
            transform: &Identity,
        };
        run(root, &out, &options);

        let read = |path: &str| std::fs::read_to_string(out.join(path)).unwrap();
        assert_eq!(read("index.js"), "/*g*//*page*//*widget*/");
        assert_eq!(read("docs/docs.js"), "/*g*//*child*/");
    }

    #[test]
    fn test_no_scripts_leaves_page_untouched() {
        let dir = tempdir().unwrap();
        let root = Component::builder("index", "index.html", dir.path()).build();
        let out = dir.path().join("out");

        let options = ScriptOptions {
            position: ScriptPosition::Body,
            transform: &JsMinify,
        };
        let pages = run(root, &out, &options);

        assert_eq!(pages.get(0), Some(PAGE));
        assert!(!out.join("index.js").exists());
    }

    #[test]
    fn test_script_position_deserializes_lowercase() {
        #[derive(Deserialize)]
        struct Wrapper {
            position: ScriptPosition,
        }
        let parsed: Wrapper = toml::from_str(r#"position = "head""#).unwrap();
        assert_eq!(parsed.position, ScriptPosition::Head);
    }
}
