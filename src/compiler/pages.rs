//! Stage-typed page HTML.
//!
//! Each stage consumes the previous stage's pages and returns the next:
//!
//! ```text
//! HtmlCompiler ──► Pages<Compiled> ──► bundle_styles ──► Pages<Styled>
//!                                                           │
//!   write_pages ◄── Pages<Scripted> ◄── bundle_scripts ◄────┘
//! ```
//!
//! Stage markers make running a bundler twice, or writing before bundling,
//! a type error instead of duplicated tags or stale output.

use std::marker::PhantomData;

/// Output of the HTML compiler.
#[derive(Debug)]
pub enum Compiled {}

/// Stylesheet links spliced in.
#[derive(Debug)]
pub enum Styled {}

/// Script tags spliced in; ready to write.
#[derive(Debug)]
pub enum Scripted {}

/// HTML for every page node, indexed like [`Layout`](super::layout::Layout).
#[derive(Debug)]
pub struct Pages<S> {
    html: Vec<String>,
    _stage: PhantomData<S>,
}

impl<S> Pages<S> {
    /// Wrap HTML produced (or amended) by stage `S`.
    pub(super) fn from_html(html: Vec<String>) -> Self {
        Self {
            html,
            _stage: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.html.len()
    }

    #[cfg(test)]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.html.get(index).map(String::as_str)
    }

    /// Take the HTML out for the next stage to amend.
    pub(super) fn into_html(self) -> Vec<String> {
        self.html
    }
}
