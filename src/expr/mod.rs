//! Minimal substitution language used in template string fields
//!
//! Supports `.name` lookups, `eq`/`ne`/`and`/`or`/`not` and
//! `if`/`else`/`end` blocks inside `{{ ... }}` actions.

pub mod ast;
mod eval;
mod grammar;
pub mod lexer;

pub use ast::*;
pub use eval::{evaluate, render, Variables};
pub use grammar::parse;
