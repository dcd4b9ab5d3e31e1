//! Default values for configuration fields.
//!
//! These functions are used by serde for default deserialization.

// ============================================================================
// Common Defaults
// ============================================================================

pub fn r#true() -> bool {
    true
}

pub fn r#false() -> bool {
    false
}

// ============================================================================
// [build] Section Defaults
// ============================================================================

pub mod build {
    use std::path::PathBuf;

    pub fn output() -> PathBuf {
        "public".into()
    }

    pub fn root() -> String {
        "index".into()
    }

    pub mod styles {
        pub fn command() -> Vec<String> {
            vec!["sass".into(), "--stdin".into()]
        }
    }
}
