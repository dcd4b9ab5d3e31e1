//! Tag-level markup substitution.
//!
//! - `substitute_tag`: replace usages of an imported component's selector
//! - `splice_before`: insert a tag before the first occurrence of an anchor
//!
//! A usage is an opening tag `<selector ...>` or a self-closing `<selector/>`.
//! The selector must be followed by whitespace, `/` or `>`, so `<nav>` never
//! matches `<nav-bar>`. A non self-closing usage owns the next `</selector>`
//! only when no other usage opens before it; the pair and everything between
//! is then replaced, so content written inside an import is discarded. An
//! unpaired usage is replaced on its own.

use anyhow::Result;
use regex::Regex;

/// Replace every usage of `<selector>` in `html` with `replacement`.
///
/// `replacement` is inserted literally (no `$` expansion).
pub fn substitute_tag(html: &str, selector: &str, replacement: &str) -> Result<String> {
    let name = regex::escape(selector);
    let open = Regex::new(&format!(
        r#"<\s*{name}(?:\s(?:[^>"']|"[^"]*"|'[^']*')*)?/?>"#
    ))?;
    let close = Regex::new(&format!(r"<\s*/\s*{name}\s*>"))?;

    let mut out = String::with_capacity(html.len() + replacement.len());
    let mut cursor = 0;

    while let Some(tag) = open.find_at(html, cursor) {
        out.push_str(&html[cursor..tag.start()]);
        out.push_str(replacement);

        cursor = if tag.as_str().ends_with("/>") {
            tag.end()
        } else {
            let next_open = open.find_at(html, tag.end()).map(|m| m.start());
            match close.find_at(html, tag.end()) {
                Some(end) if next_open.is_none_or(|next| end.start() < next) => end.end(),
                _ => tag.end(),
            }
        };
    }

    out.push_str(&html[cursor..]);
    Ok(out)
}

/// Insert `tag` right before the first `anchor` in `html`.
///
/// Returns `None` when the anchor does not occur.
pub fn splice_before(html: &str, anchor: &str, tag: &str) -> Option<String> {
    let at = html.find(anchor)?;
    let mut out = String::with_capacity(html.len() + tag.len());
    out.push_str(&html[..at]);
    out.push_str(tag);
    out.push_str(&html[at..]);
    Some(out)
}
