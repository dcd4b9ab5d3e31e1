//! Scoped-style rewriting for stylesheets and markup.
//!
//! Two halves of the same contract: every element of a component carries the
//! component's scope class, and every selector of the component's stylesheet
//! requires that class.
//!
//! This is deliberately not a CSS or HTML parser. The grammar assumptions are:
//!
//! - A style rule is `prelude { ... }`. The prelude is everything since the
//!   previous `}`, `;` or `{`. Comments inside it are kept but never scoped,
//!   and selectors on either side of them still are. Only preludes at the top level, or
//!   directly inside a conditional group rule (`@media`, `@supports`,
//!   `@layer`, `@container`, `@document`) are rewritten. Everything else,
//!   including `@keyframes` steps and nested rules, is copied verbatim.
//! - A selector list is split on commas outside `()`, `[]` and quotes. In each
//!   complex selector only the last compound selector is scoped: the class goes
//!   before its first `:` (pseudo-class or pseudo-element), or at its end.
//! - An opening tag is `<name attrs>` where `name` starts with an ASCII letter
//!   and attribute values may be quoted with `"` or `'`. Closing tags,
//!   comments and doctypes never match. Attributes are read one at a time, so
//!   `class=` inside another attribute's value is not a class attribute.
//! - The contents of `<script>` and `<style>` are raw text and left alone.
//!
//! # Example
//!
//! ```text
//! .card h1:hover, p { color: red }
//!   → .card h1.-qa1b2:hover, p.-qa1b2 { color: red }
//!
//! <div class="card"><img src="x.png"/></div>
//!   → <div class="card -qa1b2"><img src="x.png" class="-qa1b2"/></div>
//! ```

use regex::Regex;
use std::sync::LazyLock;

/// Opening (or self-closing) tag: name, then attributes with quoted values.
static OPEN_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<([A-Za-z][A-Za-z0-9:_-]*)((?:[^>"']|"[^"]*"|'[^']*')*)>"#).unwrap()
});

/// One attribute: name, then an optional double-quoted, single-quoted or bare value.
static ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([^\s"'=<>/`]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#).unwrap()
});

/// Elements whose contents are not markup.
const RAW_TEXT: &[&str] = &["script", "style"];

/// At-rules whose blocks contain ordinary style rules.
const GROUP_AT_RULES: &[&str] = &["@media", "@supports", "@layer", "@container", "@document"];

// ============================================================================
// Markup
// ============================================================================

/// Add `class` to every opening tag in `html`.
///
/// Tags with a `class` attribute get the class appended inside the existing
/// quotes; tags without one get a new `class="..."` attribute before `>` (or
/// before `/>` for self-closing tags). Tags already carrying the class are
/// left alone.
pub fn inject_class(html: &str, class: &str) -> String {
    let mut out = String::with_capacity(html.len() + html.len() / 8);
    let mut cursor = 0;

    while let Some(caps) = OPEN_TAG.captures_at(html, cursor) {
        let Some(tag) = caps.get(0) else { break };
        let name = &caps[1];
        let attrs = &caps[2];

        out.push_str(&html[cursor..tag.start()]);
        out.push('<');
        out.push_str(name);
        out.push_str(&rewrite_attrs(attrs, class));
        out.push('>');
        cursor = tag.end();

        let raw = RAW_TEXT.iter().any(|raw| name.eq_ignore_ascii_case(raw));
        if raw && !attrs.trim_end().ends_with('/') {
            let closer = format!("</{}", name.to_ascii_lowercase());
            let end = html[cursor..]
                .to_ascii_lowercase()
                .find(&closer)
                .map_or(html.len(), |at| cursor + at);
            out.push_str(&html[cursor..end]);
            cursor = end;
        }
    }

    out.push_str(&html[cursor..]);
    out
}

/// Value of the `class` attribute, and whether it is quoted.
fn class_value(attrs: &str) -> Option<(regex::Match<'_>, bool)> {
    let caps = ATTR
        .captures_iter(attrs)
        .find(|caps| caps[1].eq_ignore_ascii_case("class"))?;
    caps.get(2)
        .or_else(|| caps.get(3))
        .map(|value| (value, true))
        .or_else(|| caps.get(4).map(|value| (value, false)))
}

fn rewrite_attrs(attrs: &str, class: &str) -> String {
    if let Some((value, quoted)) = class_value(attrs) {
        let current = value.as_str();
        if current.split_whitespace().any(|c| c == class) {
            return attrs.to_owned();
        }
        let separator = if current.trim().is_empty() { "" } else { " " };
        let mut out = String::with_capacity(attrs.len() + class.len() + 3);
        if quoted {
            out.push_str(&attrs[..value.end()]);
            out.push_str(separator);
            out.push_str(class);
        } else {
            out.push_str(&attrs[..value.start()]);
            out.push('"');
            out.push_str(current);
            out.push_str(separator);
            out.push_str(class);
            out.push('"');
        }
        out.push_str(&attrs[value.end()..]);
        return out;
    }

    let trimmed = attrs.trim_end();
    match trimmed.strip_suffix('/') {
        // Self-closing: keep the slash (and any space before it) last
        Some(body) => {
            let head = body.trim_end();
            let gap = &body[head.len()..];
            format!("{head} class=\"{class}\"{gap}/{}", &attrs[trimmed.len()..])
        }
        None => format!("{trimmed} class=\"{class}\"{}", &attrs[trimmed.len()..]),
    }
}

// ============================================================================
// Stylesheets
// ============================================================================

/// Block kinds tracked while scanning a stylesheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Block {
    /// Style rule body (declarations, possibly nested rules)
    Rule,
    /// Conditional group rule whose children are scoped
    Group,
    /// Any other at-rule (`@keyframes`, `@font-face`, ...)
    Opaque,
}

/// Require `.{class}` on every top-level selector of `css`.
pub fn scope_css(css: &str, class: &str) -> String {
    let bytes = css.as_bytes();
    let mut out = String::with_capacity(css.len() + css.len() / 4);
    let mut stack: Vec<Block> = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = skip_comment(css, i);
            }
            quote @ (b'"' | b'\'') => {
                i = skip_string(bytes, i, quote);
            }
            b'{' => {
                let prelude = &css[start..i];
                let scoped_context = matches!(stack.last(), None | Some(Block::Group));
                let block = if trim_start_comments(prelude).starts_with('@') {
                    out.push_str(prelude);
                    if is_group_rule(prelude) { Block::Group } else { Block::Opaque }
                } else {
                    if scoped_context {
                        out.push_str(&scope_prelude(prelude, class));
                    } else {
                        out.push_str(prelude);
                    }
                    Block::Rule
                };
                stack.push(block);
                out.push('{');
                i += 1;
                start = i;
            }
            b'}' | b';' => {
                if bytes[i] == b'}' {
                    stack.pop();
                }
                out.push_str(&css[start..=i]);
                i += 1;
                start = i;
            }
            _ => i += 1,
        }
    }

    out.push_str(&css[start..]);
    out
}

/// Index just past the comment opened at `open`.
fn skip_comment(s: &str, open: usize) -> usize {
    s[open + 2..].find("*/").map_or(s.len(), |at| open + 2 + at + 2)
}

/// `s` without leading whitespace and comments.
fn trim_start_comments(mut s: &str) -> &str {
    loop {
        s = s.trim_start();
        match s.strip_prefix("/*") {
            Some(rest) => s = rest.find("*/").map_or("", |at| &rest[at + 2..]),
            None => return s,
        }
    }
}

/// `s` without trailing whitespace and comments.
fn trim_end_comments(mut s: &str) -> &str {
    loop {
        s = s.trim_end();
        match s
            .strip_suffix("*/")
            .and_then(|rest| rest.rfind("/*").map(|at| &rest[..at]))
        {
            Some(rest) => s = rest,
            None => return s,
        }
    }
}

/// Index just past the string literal opened at `open`.
fn skip_string(bytes: &[u8], open: usize, quote: u8) -> usize {
    let mut i = open + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b if b == quote => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

fn is_group_rule(prelude: &str) -> bool {
    let name = trim_start_comments(prelude)
        .split(|c: char| c.is_whitespace() || c == '(')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    GROUP_AT_RULES.contains(&name.as_str())
}

/// Scope each selector of a comma-separated list, keeping surrounding whitespace.
fn scope_prelude(prelude: &str, class: &str) -> String {
    let mut out = String::with_capacity(prelude.len() + class.len() * 2);
    for (index, part) in split_top_level(prelude, b',').into_iter().enumerate() {
        if index > 0 {
            out.push(',');
        }
        let rest = trim_start_comments(part);
        let lead = part.len() - rest.len();
        let core = trim_end_comments(rest);
        if core.is_empty() {
            out.push_str(part);
            continue;
        }
        out.push_str(&part[..lead]);
        out.push_str(&scope_selector(core, class));
        out.push_str(&part[lead + core.len()..]);
    }
    out
}

/// Split on `sep` outside of parentheses, brackets and quotes.
fn split_top_level(s: &str, sep: u8) -> Vec<&str> {
    let bytes = s.as_bytes();
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'(' | b'[' => depth += 1,
            b')' | b']' => depth = depth.saturating_sub(1),
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = skip_comment(s, i);
                continue;
            }
            quote @ (b'"' | b'\'') => {
                i = skip_string(bytes, i, quote);
                continue;
            }
            b if b == sep && depth == 0 => {
                parts.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    parts.push(&s[start..]);
    parts
}

/// Scope a single complex selector (`.a > .b:hover` → `.a > .b.-qX:hover`).
fn scope_selector(selector: &str, class: &str) -> String {
    let bytes = selector.as_bytes();
    let marker = format!(".{class}");

    // Start of the last compound selector
    let mut compound = 0;
    // First top-level `:` inside the current compound
    let mut colon: Option<usize> = None;
    let mut depth = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'(' | b'[' => depth += 1,
            b')' | b']' => depth = depth.saturating_sub(1),
            b'\\' => i += 1,
            b'/' if depth == 0 && bytes.get(i + 1) == Some(&b'*') => {
                i = skip_comment(selector, i);
                compound = i;
                colon = None;
                continue;
            }
            quote @ (b'"' | b'\'') => {
                i = skip_string(bytes, i, quote);
                continue;
            }
            b' ' | b'\t' | b'\n' | b'\r' | b'>' | b'+' | b'~' if depth == 0 => {
                compound = i + 1;
                colon = None;
            }
            b':' if depth == 0 && colon.is_none() => colon = Some(i),
            _ => {}
        }
        i += 1;
    }

    if selector[compound..].contains(&marker) {
        return selector.to_owned();
    }

    let at = colon.unwrap_or(selector.len());
    let mut out = String::with_capacity(selector.len() + marker.len());
    out.push_str(&selector[..at]);
    out.push_str(&marker);
    out.push_str(&selector[at..]);
    out
}

// ============================================================================
// Tests
// ============================================================================
