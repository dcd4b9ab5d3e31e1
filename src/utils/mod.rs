//! Utility modules for the component compiler.

pub mod exec;
pub mod fs;
pub mod id;
pub mod log;
pub mod minify;
pub mod path;
pub mod scope;
pub mod tags;
