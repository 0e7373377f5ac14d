//! CLI command implementations

pub mod completions;
pub mod import;
pub mod init;
pub mod template;
pub mod tree;
