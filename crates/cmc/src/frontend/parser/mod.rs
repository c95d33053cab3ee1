//! Parser module for building the syntax tree

#[allow(clippy::module_inception)]
mod parser;

pub use parser::Parser;
