//! Project configuration management for `quoia.toml`.
//!
//! # Sections
//!
//! | Section              | Purpose                                        |
//! |----------------------|------------------------------------------------|
//! | `[build]`            | Output paths, copy lists, minification         |
//! | `[build.styles]`     | Style preprocessor and bundle transform        |
//! | `[build.scripts]`    | Script position and bundle transform           |
//! | `[components.<key>]` | Component declarations forming the page tree   |
//!
//! # Example
//!
//! ```toml
//! [build]
//! output = "public"
//! root = "home"
//!
//! [components.home]
//! name = "index"
//! template = "pages/home.html"
//! children = ["about"]
//!
//! [components.about]
//! template = "pages/about.html"
//! ```
//!
//! Every relative path, in `[build]` and in components alike, is resolved
//! against the directory holding the manifest.

mod build;
mod component;
pub mod defaults;
mod error;

pub use build::{BuildConfig, PreprocessorKind, TemplatingEngine};
pub use component::{ComponentConfig, MountConfig};
pub use error::{ConfigError, ManifestError};

use crate::cli::{Cli, Commands};
use crate::component::{Mount, manifest};
use crate::utils::path::{normalize_path, resolve};
use anyhow::{Context, Result, bail};
use educe::Educe;
use serde::Deserialize;
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration structure representing quoia.toml
#[derive(Debug, Clone, Educe, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// Absolute path to the config file (set after loading)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Build settings
    #[serde(default)]
    pub build: BuildConfig,

    /// Component declarations by key
    #[serde(default)]
    pub components: BTreeMap<String, ComponentConfig>,
}

/// An entry of `[build.copy]`, resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyTarget {
    pub path: PathBuf,
    /// Copy a directory's contents rather than the directory itself.
    pub contents_only: bool,
}

impl SiteConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: SiteConfig = toml::from_str(content).map_err(ConfigError::Toml)?;
        Ok(config)
    }

    /// Load configuration from file path, resolving paths against its directory
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        let mut config = Self::from_str(&content)
            .with_context(|| format!("invalid config `{}`", path.display()))?;
        config.config_path = normalize_path(path);
        config.resolve_paths();
        Ok(config)
    }

    /// Directory holding the manifest; every relative path is based here
    pub fn root_dir(&self) -> &Path {
        self.config_path.parent().unwrap_or(Path::new("/"))
    }

    /// Update configuration with CLI arguments
    pub fn update_with_cli(&mut self, cli: &Cli) {
        let root = self.root_dir().to_path_buf();
        if let Some(output) = &cli.output {
            self.build.output = resolve(&root, output);
        }
        if let Some(assets) = &cli.assets {
            self.build.assets = Some(resolve(&root, assets));
        }

        if let Commands::Build { build_args } = &cli.command {
            Self::update_option(&mut self.build.minify, build_args.minify.as_ref());
            if build_args.no_clean {
                self.build.clean = false;
            }
        }
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Normalize `[build]` paths to absolute, against the manifest directory
    fn resolve_paths(&mut self) {
        let root = self.root_dir().to_path_buf();
        self.build.output = resolve(&root, &self.build.output);
        self.build.assets = self.build.assets.as_ref().map(|path| resolve(&root, path));
        for path in &mut self.build.styles.include_paths {
            *path = resolve(&root, path);
        }
    }

    /// Resolved `[build.copy]` entries
    pub fn copy_targets(&self) -> Vec<CopyTarget> {
        let root = self.root_dir();
        self.build
            .copy
            .iter()
            .map(|raw| CopyTarget {
                path: resolve(root, Path::new(raw)),
                contents_only: raw.ends_with('/') || raw.ends_with('\\'),
            })
            .collect()
    }

    /// The root page with the whole component tree behind it
    pub fn root_mount(&self) -> Result<Mount> {
        let mount = manifest::resolve(&self.components, &self.build.root, self.root_dir())?;
        Ok(mount)
    }

    /// Validate configuration before a build
    pub fn validate(&self) -> Result<()> {
        if !self.config_path.exists() {
            bail!("Config file not found");
        }

        if !self.components.contains_key(&self.build.root) {
            bail!(ManifestError::MissingRoot(self.build.root.clone()));
        }

        let output = &self.build.output;
        if self.root_dir().starts_with(output) {
            bail!(ConfigError::Validation(format!(
                "[build.output] `{}` would delete the project directory",
                output.display()
            )));
        }

        if let Some(assets) = &self.build.assets
            && !assets.is_dir()
        {
            bail!(ConfigError::Validation(format!(
                "[build.assets] `{}` is not a directory",
                assets.display()
            )));
        }

        if self.build.styles.preprocessor == PreprocessorKind::Command {
            Self::check_command_installed("[build.styles.command]", &self.build.styles.command)?;
        }

        Ok(())
    }

    /// Check if a command is installed and available
    fn check_command_installed(field: &str, command: &[String]) -> Result<()> {
        if command.is_empty() {
            bail!(ConfigError::Validation(format!(
                "{field} must have at least one element"
            )));
        }

        let cmd = &command[0];
        which::which(cmd)
            .with_context(|| format!("`{cmd}` not found. Please install it first."))?;

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
