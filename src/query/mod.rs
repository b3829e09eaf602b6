//! Query parsing
//!
//! Turns the search page's URL query string into a search mode and a
//! keyword list.

pub mod parser;
pub mod urlencoding;

pub use parser::*;
