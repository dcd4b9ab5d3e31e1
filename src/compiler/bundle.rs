//! Writing a page bundle and linking it from the page.

use crate::log;
use crate::utils::{fs, tags};
use anyhow::Result;
use std::path::Path;

/// A finished bundle for one page.
pub(super) struct Bundle<'a> {
    /// Log module of the stage emitting it.
    pub module: &'a str,
    /// Bundle file name, e.g. `index.css`.
    pub file_name: String,
    /// Tag referencing the bundle.
    pub tag: String,
    /// Closing tag the reference goes in front of.
    pub anchor: &'a str,
}

impl Bundle<'_> {
    /// Write `text` into `directory` and splice the reference into `html`.
    ///
    /// Blank bundles are neither written nor linked.
    pub fn emit(&self, directory: &Path, text: &str, html: String) -> Result<String> {
        if text.trim().is_empty() {
            return Ok(html);
        }

        fs::write_text(&directory.join(&self.file_name), text)?;

        match tags::splice_before(&html, self.anchor, &self.tag) {
            Some(linked) => Ok(linked),
            None => {
                log!("warn"; "{}: no `{}` in page, {} not linked", self.module, self.anchor, self.file_name);
                Ok(html)
            }
        }
    }
}
