//! Plug-in contracts used by the build stages.
//!
//! | Contract            | Default    | Built-in                         |
//! |---------------------|------------|----------------------------------|
//! | `TemplateEngine`    | pass-through | `HandlebarsEngine`             |
//! | `StylePreprocessor` | pass-through | `CommandPreprocessor` (stdin)  |
//! | `Transform`         | `Identity` | `CssMinify`, `JsMinify`, closures |

use super::BuildError;
use crate::utils::{exec, minify};
use anyhow::Result;
use handlebars::Handlebars;
use serde_json::Value;
use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

// ============================================================================
// Templating
// ============================================================================

/// Renders template text with a value bag.
pub trait TemplateEngine {
    fn render(&self, template: &str, values: &Value) -> Result<String>;
}

/// Handlebars templating. Missing values render as empty text.
pub struct HandlebarsEngine {
    registry: Handlebars<'static>,
}

impl HandlebarsEngine {
    pub fn new() -> Self {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(false);
        Self { registry }
    }
}

impl Default for HandlebarsEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateEngine for HandlebarsEngine {
    fn render(&self, template: &str, values: &Value) -> Result<String> {
        Ok(self.registry.render_template(template, values)?)
    }
}

// ============================================================================
// Style preprocessing
// ============================================================================

/// Compiles preprocessor source (Sass, Less, ...) to plain CSS.
pub trait StylePreprocessor {
    fn compile(&self, css: &str, include_paths: &[PathBuf]) -> Result<String>;
}

/// Preprocessor run as an external filter, e.g. `sass --stdin`.
///
/// Include paths are passed as `--load-path=<path>`.
pub struct CommandPreprocessor {
    command: Vec<String>,
    root: Option<PathBuf>,
}

impl CommandPreprocessor {
    pub fn new(command: Vec<String>, root: Option<PathBuf>) -> Self {
        Self { command, root }
    }

    fn engine_name(&self) -> String {
        self.command.first().cloned().unwrap_or_else(|| "preprocessor".into())
    }
}

impl StylePreprocessor for CommandPreprocessor {
    fn compile(&self, css: &str, include_paths: &[PathBuf]) -> Result<String> {
        let args: Vec<OsString> = include_paths
            .iter()
            .map(|path| {
                let mut arg = OsString::from("--load-path=");
                arg.push(path);
                arg
            })
            .collect();

        exec::pipe(self.root.as_deref(), &self.command, &args, css).map_err(|err| {
            BuildError::Preprocess {
                engine: self.engine_name(),
                message: format!("{err:#}"),
            }
            .into()
        })
    }
}

// ============================================================================
// Transforms
// ============================================================================

/// Post-processes a bundle before it is written (minification, ...).
///
/// Receives the bundle's output directory as context.
pub trait Transform {
    fn apply(&self, text: &str, out_dir: &Path) -> Result<String>;
}

impl<F> Transform for F
where
    F: Fn(&str, &Path) -> Result<String>,
{
    fn apply(&self, text: &str, out_dir: &Path) -> Result<String> {
        self(text, out_dir)
    }
}

/// Leaves bundles untouched.
pub struct Identity;

impl Transform for Identity {
    fn apply(&self, text: &str, _out_dir: &Path) -> Result<String> {
        Ok(text.to_owned())
    }
}

/// Minifies style bundles.
pub struct CssMinify;

impl Transform for CssMinify {
    fn apply(&self, text: &str, _out_dir: &Path) -> Result<String> {
        if text.trim().is_empty() {
            return Ok(String::new());
        }
        minify::minify_css(text)
    }
}

/// Minifies script bundles.
pub struct JsMinify;

impl Transform for JsMinify {
    fn apply(&self, text: &str, _out_dir: &Path) -> Result<String> {
        if text.trim().is_empty() {
            return Ok(String::new());
        }
        Ok(minify::minify_js(text))
    }
}
