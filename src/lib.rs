//! # WebCee Native Core
//!
//! Authoring tooling for the WebCee UI description language (`.wce` files).
//!
//! ## Pipeline
//!
//! 1. **Lex** (`lexer`): identifiers, string literals and single-character
//!    punctuation; whitespace and `//` comments are skipped.
//! 2. **Parse** (`parse`): `name(args) { block };` calls become a tree of
//!    [`Node`]s rooted at a bare container. Never fails.
//! 3. **Analyze / Lint** (`analyze`, `lint`): a second, position-accurate pass
//!    for editor diagnostics (brace balance, unknown calls, misplaced
//!    properties, unresolved handler and data names).
//! 4. **Render** (`render`): HTML page with `wce-bind` attributes, a parse
//!    error banner and the simulator bootstrap payload.
//! 5. **Simulate** (`sim`): the key/value backend a rendered page talks to,
//!    driven by the bootstrap's effect tables.
//!
//! ## Invariants
//!
//! - Operations on source text are total: problems are returned as data.
//! - Call names resolve through a single table (`ast::resolve_call`).
//! - The simulator's Store is owned by a `Session`; there is no global state.

#[cfg(feature = "napi")]
use napi_derive::napi;

pub mod analyze;
pub mod ast;
pub mod error;
pub mod lexer;
pub mod lint;
pub mod parse;
pub mod render;
pub mod sim;


pub use analyze::{analyze, Analysis, ByteRange, PropUsage, UnknownCall};
pub use ast::{Call, Node, NodeKind, PropertyCall};
pub use error::WebCeeError;
pub use lint::{lint, Diagnostic, ProjectSymbols, Severity};
pub use parse::{parse_document, ParseError, ParseResult};
pub use render::{render_to_html, RenderOptions, RenderOutput};
pub use sim::{Bootstrap, Request, Response, Runtime, Session, Store};

#[cfg(feature = "napi")]
pub use analyze::analyze_native;
#[cfg(feature = "napi")]
pub use lint::lint_native;
#[cfg(feature = "napi")]
pub use parse::parse_document_native;
#[cfg(feature = "napi")]
pub use render::render_to_html_native;

#[cfg(feature = "napi")]
#[napi]
pub fn compile_bridge() -> String {
    "WebCee Native Bridge Connected".to_string()
}
