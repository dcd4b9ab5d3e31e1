//! `[build]` section configuration.
//!
//! Contains output paths, copy lists, minification and the style/script
//! pipeline settings.

use super::defaults;
use crate::compiler::{CssMinify, Identity, JsMinify, ScriptPosition, Transform};
use crate::utils::id::{HashedIds, ScopeIdGenerator, SequentialIds};
use educe::Educe;
use serde::Deserialize;
use std::path::PathBuf;

// ============================================================================
// Enums
// ============================================================================

/// Templating pass applied to every component template.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplatingEngine {
    /// Templates are used verbatim (default).
    #[default]
    None,
    /// Templates are Handlebars, rendered with the component's values.
    Handlebars,
}

/// Style preprocessing applied to scoped stylesheets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreprocessorKind {
    /// Stylesheets are plain CSS (default).
    #[default]
    None,
    /// Stylesheets are piped through `[build.styles.command]`.
    Command,
}

/// Post-processing of a written bundle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransformKind {
    #[default]
    None,
    Minify,
}

impl TransformKind {
    pub fn for_styles(self) -> &'static dyn Transform {
        match self {
            Self::None => &Identity,
            Self::Minify => &CssMinify,
        }
    }

    pub fn for_scripts(self) -> &'static dyn Transform {
        match self {
            Self::None => &Identity,
            Self::Minify => &JsMinify,
        }
    }
}

/// How scope ids are generated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeIdKind {
    /// Short hash of the component key, stable across builds (default).
    #[default]
    Hashed,
    /// `0`, `1`, ... in tree order; readable, but shifts when the tree changes.
    Sequential,
}

impl ScopeIdKind {
    pub fn generator(self) -> Box<dyn ScopeIdGenerator> {
        match self {
            Self::Hashed => Box::new(HashedIds),
            Self::Sequential => Box::new(SequentialIds::default()),
        }
    }
}

// ============================================================================
// Main BuildConfig
// ============================================================================

/// `[build]` section in quoia.toml - build pipeline configuration.
///
/// # Example
/// ```toml
/// [build]
/// output = "public"        # Output directory
/// root = "home"            # Root page component
/// assets = "static"        # Copied into the output root
/// copy = ["robots.txt", "media/"]
///
/// [build.styles]
/// preprocessor = "command"
/// command = ["sass", "--stdin"]
/// ```
#[derive(Debug, Clone, Educe, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Build output directory.
    #[serde(default = "defaults::build::output")]
    #[educe(Default = defaults::build::output())]
    pub output: PathBuf,

    /// Key of the root page in `[components]`.
    #[serde(default = "defaults::build::root")]
    #[educe(Default = defaults::build::root())]
    pub root: String,

    /// Static assets directory; its contents land in the output root.
    #[serde(default)]
    pub assets: Option<PathBuf>,

    /// Extra files and directories copied into the output root.
    ///
    /// A trailing `/` copies a directory's contents instead of the directory.
    #[serde(default)]
    pub copy: Vec<String>,

    /// Delete the output directory before building.
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub clean: bool,

    /// Minify written HTML.
    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub minify: bool,

    /// Templating engine for component templates.
    #[serde(default)]
    pub templating: TemplatingEngine,

    /// Scope id scheme.
    #[serde(default)]
    pub scope_ids: ScopeIdKind,

    /// Style bundling.
    #[serde(default)]
    pub styles: StylesConfig,

    /// Script bundling.
    #[serde(default)]
    pub scripts: ScriptsConfig,
}

// ============================================================================
// Sub-configurations
// ============================================================================

/// `[build.styles]` section
#[derive(Debug, Clone, Educe, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct StylesConfig {
    /// Preprocessor for component stylesheets
    #[serde(default)]
    pub preprocessor: PreprocessorKind,

    /// Preprocessor command and arguments (stdin → stdout)
    #[serde(default = "defaults::build::styles::command")]
    #[educe(Default = defaults::build::styles::command())]
    pub command: Vec<String>,

    /// Directories the preprocessor resolves imports from
    #[serde(default)]
    pub include_paths: Vec<PathBuf>,

    /// Transform applied to every style bundle
    #[serde(default)]
    pub transform: TransformKind,
}

/// `[build.scripts]` section
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScriptsConfig {
    /// Where the `<script>` tag goes: `body` or `head`
    #[serde(default)]
    pub position: ScriptPosition,

    /// Transform applied to every script bundle
    #[serde(default)]
    pub transform: TransformKind,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::super::SiteConfig;
    use super::*;

    #[test]
    fn test_build_config_defaults() {
        let config = SiteConfig::from_str("").unwrap();

        assert_eq!(config.build.output, PathBuf::from("public"));
        assert_eq!(config.build.root, "index");
        assert!(config.build.assets.is_none());
        assert!(config.build.copy.is_empty());
        assert!(config.build.clean);
        assert!(!config.build.minify);
        assert_eq!(config.build.templating, TemplatingEngine::None);
        assert_eq!(config.build.scope_ids, ScopeIdKind::Hashed);
        assert_eq!(config.build.styles.preprocessor, PreprocessorKind::None);
        assert_eq!(config.build.styles.command, vec!["sass", "--stdin"]);
        assert_eq!(config.build.scripts.position, ScriptPosition::Body);
    }

    #[test]
    fn test_build_config_full() {
        let config = r#"
            [build]
            output = "dist"
            root = "home"
            assets = "static"
            copy = ["robots.txt", "media/"]
            clean = false
            minify = true
            templating = "handlebars"
            scope_ids = "sequential"

            [build.styles]
            preprocessor = "command"
            command = ["lessc", "-"]
            include_paths = ["styles/partials"]
            transform = "minify"

            [build.scripts]
            position = "head"
            transform = "minify"
        "#;
        let config = SiteConfig::from_str(config).unwrap();

        assert_eq!(config.build.output, PathBuf::from("dist"));
        assert_eq!(config.build.root, "home");
        assert_eq!(config.build.assets, Some(PathBuf::from("static")));
        assert_eq!(config.build.copy, vec!["robots.txt", "media/"]);
        assert!(!config.build.clean);
        assert!(config.build.minify);
        assert_eq!(config.build.templating, TemplatingEngine::Handlebars);
        assert_eq!(config.build.scope_ids, ScopeIdKind::Sequential);
        assert_eq!(config.build.styles.preprocessor, PreprocessorKind::Command);
        assert_eq!(config.build.styles.command, vec!["lessc", "-"]);
        assert_eq!(config.build.styles.include_paths, vec![PathBuf::from("styles/partials")]);
        assert_eq!(config.build.styles.transform, TransformKind::Minify);
        assert_eq!(config.build.scripts.position, ScriptPosition::Head);
    }

    #[test]
    fn test_unknown_build_field_rejected() {
        assert!(SiteConfig::from_str("[build]\nouput = \"typo\"").is_err());
    }

    #[test]
    fn test_unknown_enum_value_rejected() {
        assert!(SiteConfig::from_str("[build]\ntemplating = \"jinja\"").is_err());
    }
}
