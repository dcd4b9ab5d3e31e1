//! Minification for HTML pages and script/style bundles.
//!
//! - HTML and inline JavaScript go through the `minify_html` crate
//! - Stylesheets go through `lightningcss`

use anyhow::{Result, anyhow};
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};

const SCRIPT_OPEN: &str = "<script>";
const SCRIPT_CLOSE: &str = "</script>";

/// Minify an HTML page.
pub fn minify_html(html: &[u8]) -> Vec<u8> {
    minify_html::minify(html, &html_cfg())
}

/// Minify a stylesheet.
pub fn minify_css(css: &str) -> Result<String> {
    let mut sheet = StyleSheet::parse(css, ParserOptions::default())
        .map_err(|e| anyhow!("CSS parse error: {e}"))?;
    sheet
        .minify(MinifyOptions::default())
        .map_err(|e| anyhow!("CSS minify error: {e}"))?;
    let printed = sheet
        .to_css(PrinterOptions {
            minify: true,
            ..Default::default()
        })
        .map_err(|e| anyhow!("CSS print error: {e}"))?;
    Ok(printed.code)
}

/// Minify a script bundle.
///
/// The bundle is minified as the body of an inline `<script>`; if the result
/// is not shaped as expected the input is returned unchanged.
pub fn minify_js(js: &str) -> String {
    let wrapped = format!("{SCRIPT_OPEN}{js}{SCRIPT_CLOSE}");
    let minified = minify_html::minify(wrapped.as_bytes(), &html_cfg());
    let minified = String::from_utf8_lossy(&minified);

    minified
        .strip_prefix(SCRIPT_OPEN)
        .and_then(|rest| rest.strip_suffix(SCRIPT_CLOSE))
        .map_or_else(|| js.to_owned(), str::to_owned)
}

fn html_cfg() -> minify_html::Cfg {
    let mut cfg = minify_html::Cfg::new();
    cfg.keep_closing_tags = true;
    cfg.keep_html_and_head_opening_tags = true;
    cfg.keep_comments = false;
    cfg.minify_css = true;
    cfg.minify_js = true;
    cfg.remove_bangs = true;
    cfg.remove_processing_instructions = true;
    cfg
}
