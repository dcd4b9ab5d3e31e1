//! Component compilation pipeline.
//!
//! Every stage is a full pass over the page tree:
//!
//! - **layout**: assign output directories and scope ids
//! - **html**: render templates and substitute imports
//! - **styles**: gather, scope and link stylesheets
//! - **scripts**: gather and link scripts
//! - **write**: persist `index.html` for each page
//!
//! # Build Flow
//!
//! ```text
//! walk() ──► HtmlCompiler ──► bundle_styles() ──► bundle_scripts() ──► write_pages()
//!   │             │                 │                   │                   │
//!   ▼             ▼                 ▼                   ▼                   ▼
//! Layout    Pages<Compiled>   Pages<Styled>      Pages<Scripted>       index.html
//! ```

mod bundle;
pub mod engine;
mod error;
pub mod html;
pub mod layout;
pub mod pages;
pub mod scripts;
pub mod styles;
pub mod write;

// ============================================================================
// Public API
// ============================================================================

pub use engine::{
    CommandPreprocessor, CssMinify, HandlebarsEngine, Identity, JsMinify, StylePreprocessor,
    TemplateEngine, Transform,
};
pub use error::BuildError;
pub use html::HtmlCompiler;
pub use layout::walk;
pub use scripts::{ScriptOptions, ScriptPosition, bundle_scripts};
pub use styles::{StyleOptions, bundle_styles};
pub use write::write_pages;
