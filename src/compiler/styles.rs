//! Style bundling.
//!
//! For each page, depth-first from the root:
//!
//! ```text
//! bundle = globals (inherited ++ own, in declaration order)
//!        + scoped styles (own external styles, then every selector import's)
//! ```
//!
//! External styles are preprocessed and then scoped with the owner's
//! `-q<id>` class. Globals are passed unscoped to the page and all its
//! descendants. A non-blank bundle is transformed, written next to the page
//! as `<name>.css` and linked before `</head>`.

use super::bundle::Bundle;
use super::engine::{StylePreprocessor, Transform};
use super::layout::Layout;
use super::pages::{Compiled, Pages, Styled};
use crate::component::{Component, ComponentKey};
use crate::utils::{fs, scope};
use anyhow::{Context, Result, ensure};
use rustc_hash::FxHashSet;
use std::path::PathBuf;

const HEAD_CLOSE: &str = "</head>";

/// How style bundles are produced.
pub struct StyleOptions<'a> {
    pub preprocessor: Option<&'a dyn StylePreprocessor>,
    pub include_paths: &'a [PathBuf],
    pub transform: &'a dyn Transform,
}

/// Bundle and link the styles of every page.
pub fn bundle_styles(
    layout: &Layout,
    pages: Pages<Compiled>,
    options: &StyleOptions<'_>,
) -> Result<Pages<Styled>> {
    ensure!(pages.len() == layout.len(), "page count does not match layout");
    let mut html = pages.into_html();

    StyleBundler { layout, options }.visit(Layout::ROOT, &[], &mut html)?;
    Ok(Pages::from_html(html))
}

struct StyleBundler<'a> {
    layout: &'a Layout,
    options: &'a StyleOptions<'a>,
}

impl StyleBundler<'_> {
    fn visit(&self, index: usize, inherited: &[PathBuf], html: &mut [String]) -> Result<()> {
        let node = self.layout.node(index);
        let component = node.component();

        let globals: Vec<PathBuf> = inherited
            .iter()
            .chain(component.global_styles())
            .cloned()
            .collect();

        let mut text = fs::read_concat(&globals)?;
        let mut seen = FxHashSet::default();
        seen.insert(component.key());
        self.gather(component, &mut seen, &mut text)?;

        let text = self
            .options
            .transform
            .apply(&text, node.directory())
            .with_context(|| format!("style transform failed for page `{}`", node.name()))?;

        let name = node.name();
        let bundle = Bundle {
            module: "styles",
            file_name: format!("{name}.css"),
            tag: format!(r#"<link rel="stylesheet" href="{name}.css">"#),
            anchor: HEAD_CLOSE,
        };
        let page = std::mem::take(&mut html[index]);
        html[index] = bundle.emit(node.directory(), &text, page)?;

        for &child in node.children() {
            self.visit(child, &globals, html)?;
        }
        Ok(())
    }

    /// Append the scoped styles of `component` and of its selector imports.
    ///
    /// Each component contributes once per page.
    fn gather(
        &self,
        component: &Component,
        seen: &mut FxHashSet<ComponentKey>,
        out: &mut String,
    ) -> Result<()> {
        if !component.external_styles().is_empty() {
            let mut css = fs::read_concat(component.external_styles())?;
            if let Some(preprocessor) = self.options.preprocessor {
                css = preprocessor
                    .compile(&css, self.options.include_paths)
                    .with_context(|| format!("could not preprocess styles of `{}`", component.name()))?;
            }

            let scope = self.layout.scope(&component.key())?;
            out.push_str(&scope::scope_css(&css, &scope.class_name()));
        }

        for import in component.imports() {
            let imported = import.component();
            if imported.selector().is_some() && seen.insert(imported.key()) {
                self.gather(imported, seen, out)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::engine::Identity;
    use crate::compiler::layout::walk;
    use crate::component::Mount;
    use crate::utils::id::SequentialIds;
    use std::path::Path;
    use std::sync::Arc;
    use tempfile::{TempDir, tempdir};

    const PAGE: &str = "<html><head></head><body></body></html>";

    fn write(dir: &TempDir, name: &str, content: &str) {
        std::fs::write(dir.path().join(name), content).unwrap();
    }

    fn run(root: Arc<Component>, out: &Path, options: &StyleOptions<'_>) -> (Layout, Pages<Styled>) {
        let layout = walk(&Mount::new(root), out, &mut SequentialIds::default()).unwrap();
        let pages = Pages::from_html(vec![PAGE.to_owned(); layout.len()]);
        let styled = bundle_styles(&layout, pages, options).unwrap();
        (layout, styled)
    }

    fn plain() -> StyleOptions<'static> {
        StyleOptions {
            preprocessor: None,
            include_paths: &[],
            transform: &Identity,
        }
    }

    #[test]
    fn test_scoped_styles_with_imports() {
        let dir = tempdir().unwrap();
        write(&dir, "index.css", "h1:hover { color: red }\n");
        write(&dir, "nav.css", "a { color: blue }\n");

        let nav = Component::builder("nav", "nav.html", dir.path())
            .selector("x-nav")
            .external_style("nav.css")
            .build();
        let root = Component::builder("index", "index.html", dir.path())
            .external_style("index.css")
            .import(nav)
            .build();
        let out = dir.path().join("out");

        let (_, styled) = run(root, &out, &plain());

        let css = std::fs::read_to_string(out.join("index.css")).unwrap();
        assert_eq!(css, "h1.-q0:hover { color: red }\na.-q1 { color: blue }\n");
        assert_eq!(
            styled.get(0),
            Some(r#"<html><head><link rel="stylesheet" href="index.css"></head><body></body></html>"#)
        );
    }

    #[test]
    fn test_globals_first_and_inherited_by_descendants_only() {
        let dir = tempdir().unwrap();
        write(&dir, "reset.css", "/* reset */");
        write(&dir, "blog.css", "/* blog */");
        write(&dir, "post.css", "p { x: y }");

        let post = Component::builder("post", "post.html", dir.path())
            .external_style("post.css")
            .build();
        let blog = Component::builder("blog", "blog.html", dir.path())
            .global_style("blog.css")
            .child(post)
            .build();
        let about = Component::builder("about", "about.html", dir.path()).build();
        let root = Component::builder("index", "index.html", dir.path())
            .global_style("reset.css")
            .child(about)
            .child(blog)
            .build();
        let out = dir.path().join("out");

        let (layout, _) = run(root, &out, &plain());
        let read = |path: &str| std::fs::read_to_string(out.join(path)).unwrap();

        assert_eq!(read("index.css"), "/* reset */");
        assert_eq!(read("about/about.css"), "/* reset */");
        assert_eq!(read("blog/blog.css"), "/* reset *//* blog */");
        let class = layout.scope(&layout.node(3).component().key()).unwrap().class_name();
        assert_eq!(read("blog/post/post.css"), format!("/* reset *//* blog */p.{class} {{ x: y }}"));
    }

    #[test]
    fn test_no_styles_writes_nothing() {
        let dir = tempdir().unwrap();
        let root = Component::builder("index", "index.html", dir.path()).build();
        let out = dir.path().join("out");

        let (_, styled) = run(root, &out, &plain());
        assert!(!out.join("index.css").exists());
        assert_eq!(styled.get(0), Some(PAGE));
    }

    #[test]
    fn test_import_without_selector_contributes_nothing() {
        let dir = tempdir().unwrap();
        write(&dir, "hidden.css", "b { c: d }");
        let hidden = Component::builder("hidden", "hidden.html", dir.path())
            .external_style("hidden.css")
            .build();
        let root = Component::builder("index", "index.html", dir.path())
            .import(hidden)
            .build();
        let out = dir.path().join("out");

        run(root, &out, &plain());
        assert!(!out.join("index.css").exists());
    }

    #[test]
    fn test_shared_import_bundled_once_per_page() {
        let dir = tempdir().unwrap();
        write(&dir, "btn.css", "button { a: b }");
        let button = Component::builder("button", "btn.html", dir.path())
            .selector("x-button")
            .external_style("btn.css")
            .build();
        let card = Component::builder("card", "card.html", dir.path())
            .selector("x-card")
            .import(button.clone())
            .build();
        let root = Component::builder("index", "index.html", dir.path())
            .import(button)
            .import(card)
            .build();
        let out = dir.path().join("out");

        run(root, &out, &plain());
        let css = std::fs::read_to_string(out.join("index.css")).unwrap();
        assert_eq!(css.matches("button").count(), 1);
    }

    #[test]
    fn test_transform_receives_output_directory() {
        let dir = tempdir().unwrap();
        write(&dir, "reset.css", "x{}");
        let root = Component::builder("index", "index.html", dir.path())
            .global_style("reset.css")
            .build();
        let out = dir.path().join("out");

        let stamp = |text: &str, out_dir: &Path| -> Result<String> {
            Ok(format!("{text}/* {} */", out_dir.file_name().unwrap().to_string_lossy()))
        };
        let options = StyleOptions {
            transform: &stamp,
            ..plain()
        };
        run(root, &out, &options);

        assert_eq!(std::fs::read_to_string(out.join("index.css")).unwrap(), "x{}/* out */");
    }

    #[test]
    fn test_missing_stylesheet_fails() {
        let dir = tempdir().unwrap();
        let root = Component::builder("index", "index.html", dir.path())
            .external_style("nope.css")
            .build();
        let layout = walk(&Mount::new(root), &dir.path().join("out"), &mut SequentialIds::default()).unwrap();
        let pages = Pages::from_html(vec![PAGE.to_owned()]);

        let err = bundle_styles(&layout, pages, &plain()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<crate::compiler::BuildError>(),
            Some(crate::compiler::BuildError::Read(..))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_preprocessor_runs_before_scoping() {
        use crate::compiler::engine::CommandPreprocessor;

        let dir = tempdir().unwrap();
        write(&dir, "index.css", "H1 { x: y }");
        let root = Component::builder("index", "index.html", dir.path())
            .external_style("index.css")
            .build();
        let out = dir.path().join("out");

        let lower = CommandPreprocessor::new(vec!["tr".into(), "A-Z".into(), "a-z".into()], None);
        let options = StyleOptions {
            preprocessor: Some(&lower),
            ..plain()
        };
        run(root, &out, &options);

        assert_eq!(std::fs::read_to_string(out.join("index.css")).unwrap(), "h1.-q0 { x: y }");
    }
}
