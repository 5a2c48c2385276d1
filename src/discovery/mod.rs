//! Source tree scanning

pub mod scanner;

pub use scanner::{default_output_dir, scan};
