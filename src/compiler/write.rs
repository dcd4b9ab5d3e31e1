//! Persisting finished pages.

use super::layout::Layout;
use super::pages::{Pages, Scripted};
use crate::utils::{fs, minify};
use anyhow::{Context, Result, ensure};
use rayon::prelude::*;

/// Write every page to `<directory>/index.html`.
///
/// Pages are independent, so writes run in parallel.
pub fn write_pages(layout: &Layout, pages: Pages<Scripted>, minify: bool) -> Result<usize> {
    ensure!(pages.len() == layout.len(), "page count does not match layout");
    let html = pages.into_html();

    layout
        .nodes()
        .par_iter()
        .zip(html.par_iter())
        .try_for_each(|(node, page)| -> Result<()> {
            let path = node.directory().join("index.html");
            let written = match minify {
                true => fs::write_text(&path, minify::minify_html(page.as_bytes())),
                false => fs::write_text(&path, page),
            };
            written.with_context(|| format!("failed to write page `{}`", node.name()))
        })?;

    Ok(html.len())
}
