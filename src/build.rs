//! Site building orchestration.
//!
//! Runs the build steps in order, stopping at the first failure.
//!
//! # Architecture
//!
//! ```text
//! build_site()
//!     │
//!     ├── clean   ──► fresh output directory
//!     ├── layout  ──► one directory + scope id per page
//!     ├── html    ──► Pages<Compiled>
//!     ├── styles  ──► Pages<Styled>    + <name>.css
//!     ├── scripts ──► Pages<Scripted>  + <name>.js
//!     ├── write   ──► index.html per page
//!     ├── assets  ──► [build.assets] contents
//!     └── copy    ──► [build.copy] entries
//! ```

use crate::{
    compiler::{
        CommandPreprocessor, HandlebarsEngine, HtmlCompiler, ScriptOptions, StyleOptions,
        StylePreprocessor, TemplateEngine, bundle_scripts, bundle_styles, walk, write_pages,
    },
    config::{PreprocessorKind, SiteConfig, TemplatingEngine},
    log,
    utils::{fs, id::ScopeIdGenerator},
};
use anyhow::{Result, bail};
use std::path::Path;

/// Build the whole site.
pub fn build_site(config: &SiteConfig) -> Result<()> {
    let mut ids = config.build.scope_ids.generator();
    build_with_ids(config, ids.as_mut())
}

/// Build the whole site, drawing scope ids from `ids`.
fn build_with_ids(config: &SiteConfig, ids: &mut dyn ScopeIdGenerator) -> Result<()> {
    let output = &config.build.output;
    log!("build"; "building `{}`", config.config_path.display());

    let root = config.root_mount()?;

    let engine = match config.build.templating {
        TemplatingEngine::None => None,
        TemplatingEngine::Handlebars => Some(HandlebarsEngine::new()),
    };
    let preprocessor = match config.build.styles.preprocessor {
        PreprocessorKind::None => None,
        PreprocessorKind::Command => Some(CommandPreprocessor::new(
            config.build.styles.command.clone(),
            Some(config.root_dir().to_path_buf()),
        )),
    };

    step("clean", "clean output directory", || {
        if config.build.clean {
            fs::remove_dir_all_guarded(output)?;
        }
        fs::create_dir_fresh(output)?;
        Ok(())
    })?;

    let layout = step("layout", "assign page directories", || walk(&root, output, ids))?;
    log!("layout"; "{} pages", layout.len());

    let pages = step("html", "compile html", || {
        let engine = engine.as_ref().map(|engine| engine as &dyn TemplateEngine);
        HtmlCompiler::new(&layout, engine).compile_pages()
    })?;

    let pages = step("styles", "build styles", || {
        let options = StyleOptions {
            preprocessor: preprocessor.as_ref().map(|pre| pre as &dyn StylePreprocessor),
            include_paths: &config.build.styles.include_paths,
            transform: config.build.styles.transform.for_styles(),
        };
        bundle_styles(&layout, pages, &options)
    })?;

    let pages = step("scripts", "build scripts", || {
        let options = ScriptOptions {
            position: config.build.scripts.position,
            transform: config.build.scripts.transform.for_scripts(),
        };
        bundle_scripts(&layout, pages, &options)
    })?;

    let written = step("write", "write html", || {
        write_pages(&layout, pages, config.build.minify)
    })?;

    step("assets", "copy static assets", || match &config.build.assets {
        Some(assets) => fs::copy_dir_contents(assets, output).map(|_| ()),
        None => Ok(()),
    })?;

    step("copy", "copy root files", || copy_root_files(config, output))?;

    log!("done"; "{} pages written to `{}`", written, output.display());
    Ok(())
}

/// Delete the output directory.
pub fn clean_site(config: &SiteConfig) -> Result<()> {
    step("clean", "delete output directory", || {
        fs::remove_dir_all_guarded(&config.build.output)
    })
}

/// Run one build step, logging before and after.
///
/// A failure is logged and returned with the step name attached.
fn step<T>(module: &str, name: &str, action: impl FnOnce() -> Result<T>) -> Result<T> {
    log!(module; "{}...", name);
    match action() {
        Ok(value) => {
            log!(module; "✔ {}", name);
            Ok(value)
        }
        Err(err) => {
            log!("error"; "failed step '{}': {:#}", name, err);
            Err(err.context(format!("failed step '{name}'")))
        }
    }
}

/// Copy `[build.copy]` entries into the output root.
fn copy_root_files(config: &SiteConfig, output: &Path) -> Result<()> {
    for target in config.copy_targets() {
        let path = &target.path;
        let Ok(metadata) = path.symlink_metadata() else {
            bail!("path `{}` does not exist", path.display());
        };

        if metadata.is_dir() {
            if target.contents_only {
                fs::copy_dir_contents(path, output)?;
            } else {
                fs::copy_dir(path, output)?;
            }
        } else if let Some(name) = path.file_name() {
            fs::copy_file(path, &output.join(name))?;
        }
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::id::SequentialIds;
    use std::path::PathBuf;
    use tempfile::{TempDir, tempdir};

    fn write(dir: &TempDir, path: &str, content: &str) {
        let path = dir.path().join(path);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn read(path: PathBuf) -> String {
        std::fs::read_to_string(&path).unwrap_or_else(|_| panic!("missing {}", path.display()))
    }

    /// Home page with a styled nav import and one child page.
    fn two_level_site() -> TempDir {
        let dir = tempdir().unwrap();
        write(&dir, "quoia.toml", r#"
            [build]
            output = "public"
            root = "home"
            copy = ["robots.txt", "media/"]

            [components.home]
            name = "index"
            template = "pages/home.html"
            imports = ["nav"]
            global_styles = ["styles/reset.css"]
            external_scripts = ["pages/home.js"]
            children = ["about"]

            [components.about]
            template = "pages/about.html"
            imports = ["nav"]
            external_styles = ["pages/about.css"]

            [components.nav]
            template = "components/nav.html"
            selector = "site-nav"
            external_styles = ["components/nav.css"]
        "#);
        write(&dir, "pages/home.html", "<html><head></head><body><site-nav/><h1>Home</h1></body></html>");
        write(&dir, "pages/about.html", "<html><head></head><body><site-nav></site-nav><p>About</p></body></html>");
        write(&dir, "pages/about.css", "p { margin: 0 }");
        write(&dir, "pages/home.js", "console.log('home');");
        write(&dir, "components/nav.html", r#"<nav><a href="/">Home</a></nav>"#);
        write(&dir, "components/nav.css", "a:hover { color: red }");
        write(&dir, "styles/reset.css", "* { box-sizing: border-box }");
        write(&dir, "robots.txt", "User-agent: *");
        write(&dir, "media/logo.svg", "<svg/>");
        dir
    }

    fn load(dir: &TempDir) -> SiteConfig {
        SiteConfig::from_path(&dir.path().join("quoia.toml")).unwrap()
    }

    #[test]
    fn test_build_two_level_tree() {
        let dir = two_level_site();
        let config = load(&dir);
        build_with_ids(&config, &mut SequentialIds::default()).unwrap();

        let out = config.build.output.clone();
        // ids: index 0, nav 1, about 2
        assert_eq!(
            read(out.join("index.html")),
            r#"<html><head><link rel="stylesheet" href="index.css"></head><body><nav class="-q1"><a href="/" class="-q1">Home</a></nav><h1>Home</h1><script src="index.js"></script></body></html>"#
        );
        assert_eq!(
            read(out.join("index.css")),
            "* { box-sizing: border-box }a.-q1:hover { color: red }"
        );
        assert_eq!(read(out.join("index.js")), "console.log('home');");

        assert_eq!(
            read(out.join("about/about.css")),
            "* { box-sizing: border-box }p.-q2 { margin: 0 }a.-q1:hover { color: red }"
        );
        let about = read(out.join("about/index.html"));
        assert!(about.contains(r#"<p class="-q2">About</p>"#));
        assert!(about.contains(r#"<nav class="-q1">"#));
        assert!(!about.contains("site-nav"));
        assert!(!out.join("about/about.js").exists());

        assert_eq!(read(out.join("robots.txt")), "User-agent: *");
        assert_eq!(read(out.join("logo.svg")), "<svg/>");
    }

    #[test]
    fn test_rebuild_is_byte_identical() {
        let dir = two_level_site();
        let config = load(&dir);
        let out = config.build.output.clone();

        build_site(&config).unwrap();
        let first = (read(out.join("index.html")), read(out.join("about/about.css")));
        build_site(&config).unwrap();
        let second = (read(out.join("index.html")), read(out.join("about/about.css")));

        assert_eq!(first, second);
    }

    #[test]
    fn test_clean_removes_stale_files() {
        let dir = two_level_site();
        let config = load(&dir);
        let out = config.build.output.clone();

        std::fs::create_dir_all(&out).unwrap();
        std::fs::write(out.join("stale.html"), "old").unwrap();
        build_site(&config).unwrap();
        assert!(!out.join("stale.html").exists());

        clean_site(&config).unwrap();
        assert!(!out.exists());
    }

    #[test]
    fn test_no_clean_keeps_existing_files() {
        let dir = two_level_site();
        let mut config = load(&dir);
        config.build.clean = false;
        let out = config.build.output.clone();

        std::fs::create_dir_all(&out).unwrap();
        std::fs::write(out.join("keep.txt"), "kept").unwrap();
        build_site(&config).unwrap();
        assert_eq!(read(out.join("keep.txt")), "kept");
    }

    #[test]
    fn test_copy_directory_itself_without_trailing_slash() {
        let dir = two_level_site();
        let mut config = load(&dir);
        config.build.copy = vec!["media".into()];

        build_site(&config).unwrap();
        assert_eq!(read(config.build.output.join("media/logo.svg")), "<svg/>");
    }

    #[test]
    fn test_missing_copy_path_fails_step() {
        let dir = two_level_site();
        let mut config = load(&dir);
        config.build.copy = vec!["nope.txt".into()];

        let err = build_site(&config).unwrap_err();
        assert!(format!("{err:#}").starts_with("failed step 'copy root files'"));
    }

    #[test]
    fn test_missing_template_fails_html_step() {
        let dir = two_level_site();
        std::fs::remove_file(dir.path().join("pages/about.html")).unwrap();
        let config = load(&dir);

        let err = build_site(&config).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.starts_with("failed step 'compile html'"));
        assert!(message.contains("about.html"));
    }

    #[test]
    fn test_handlebars_values_and_minify() {
        let dir = tempdir().unwrap();
        write(&dir, "quoia.toml", r#"
            [build]
            templating = "handlebars"
            minify = true

            [build.styles]
            transform = "minify"

            [components.index]
            template = "index.html"
            imports = [{ component = "card", values = { title = "Custom" } }]
            values = { heading = "Welcome" }

            [components.card]
            template = "card.html"
            selector = "x-card"
            external_styles = ["card.css"]
            values = { title = "Default" }
        "#);
        write(&dir, "index.html", "<html>\n<head></head>\n<body>\n  <h1>{{heading}}</h1>\n  <x-card/>\n</body>\n</html>\n");
        write(&dir, "card.html", "<div>{{title}}</div>");
        write(&dir, "card.css", "div {\n  color: #ff0000;\n}\n");
        let config = load(&dir);

        build_site(&config).unwrap();
        let out = &config.build.output;
        let html = read(out.join("index.html"));
        assert!(html.contains("Welcome"));
        assert!(html.contains("Custom"));
        assert!(!html.contains("Default"));
        assert!(!html.contains("\n  "));

        let css = read(out.join("index.css"));
        assert!(!css.contains('\n'));
        assert!(css.starts_with("div.-q"));
    }
}
