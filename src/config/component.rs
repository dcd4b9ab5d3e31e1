//! `[components.<key>]` tables.

use serde::Deserialize;
use serde_json::Value;
use std::path::PathBuf;

/// One declared component. Paths are relative to the manifest directory.
///
/// # Example
/// ```toml
/// [components.home]
/// name = "index"
/// template = "pages/home.html"
/// imports = ["nav", { component = "card", values = { title = "Hi" } }]
/// children = ["about"]
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComponentConfig {
    /// Output directory and bundle name; defaults to the table key.
    #[serde(default)]
    pub name: Option<String>,

    pub template: PathBuf,

    /// Tag name under which other components embed this one.
    #[serde(default)]
    pub selector: Option<String>,

    #[serde(default)]
    pub imports: Vec<MountConfig>,

    #[serde(default)]
    pub external_styles: Vec<PathBuf>,

    #[serde(default)]
    pub external_scripts: Vec<PathBuf>,

    #[serde(default)]
    pub global_styles: Vec<PathBuf>,

    #[serde(default)]
    pub global_scripts: Vec<PathBuf>,

    #[serde(default)]
    pub children: Vec<MountConfig>,

    #[serde(default)]
    pub values: Option<Value>,
}

/// A reference to another component: a bare key, or a key with values.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum MountConfig {
    Key(String),
    WithValues { component: String, values: Value },
}

impl MountConfig {
    pub fn key(&self) -> &str {
        match self {
            Self::Key(key) | Self::WithValues { component: key, .. } => key,
        }
    }
}
