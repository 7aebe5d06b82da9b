//! Parse Module for the WebCee DSL
//!
//! Recursive descent over `name(args) { block };` calls. The grammar is
//! permissive: unknown names still become (unknown) nodes and delimiter errors
//! are recorded and skipped, so every input produces a tree.

#[cfg(feature = "napi")]
use napi_derive::napi;
use serde::{Deserialize, Serialize};

use crate::ast::{resolve_call, Call, Node, NodeKind};
use crate::lexer::{Lexer, Token, TokenKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseError {
    pub message: String,
    /// Byte offset of the token where the error was detected.
    pub at: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseResult {
    pub root: Node,
    pub errors: Vec<ParseError>,
}

/// Parse a whole document. Never fails; syntax problems are collected in `errors`.
pub fn parse_document(source: &str) -> ParseResult {
    let mut parser = Parser::new(source);
    let mut root = Node::root();

    while !parser.tok.is_eof() {
        if parser.tok.kind == TokenKind::Ident {
            parser.call(&mut root);
        } else {
            parser.advance();
        }
    }

    log::debug!(
        "parsed {} top-level node(s), {} error(s)",
        root.children.len(),
        parser.errors.len()
    );

    ParseResult {
        root,
        errors: parser.errors,
    }
}

/// Blocks nested deeper than this are reported and skipped.
pub const MAX_NESTING_DEPTH: usize = 256;

struct Parser<'a> {
    lexer: Lexer<'a>,
    tok: Token,
    errors: Vec<ParseError>,
    /// Number of currently open blocks.
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        let mut lexer = Lexer::new(source);
        let tok = lexer.next_token();
        Self {
            lexer,
            tok,
            errors: Vec::new(),
            depth: 0,
        }
    }

    fn advance(&mut self) {
        self.tok = self.lexer.next_token();
    }

    fn error(&mut self, message: &str) {
        self.errors.push(ParseError {
            message: message.to_string(),
            at: self.tok.start,
        });
    }

    /// Parse one call whose name is the current token. `current` is the open
    /// node: property calls annotate it, other calls append a child to it.
    fn call(&mut self, current: &mut Node) {
        if self.tok.kind != TokenKind::Ident {
            return;
        }
        let name = std::mem::take(&mut self.tok.text);
        self.advance();

        if !self.tok.is_punct('(') {
            return;
        }
        self.advance();

        let args = self.arguments();
        let first = args.first().cloned().flatten();

        if self.tok.is_punct(';') {
            self.advance();
        }

        let kind = match resolve_call(&name) {
            Call::Property(prop) => {
                if let Some(value) = first {
                    current.apply_property(prop, &value);
                }
                return;
            }
            Call::Component(kind) => kind,
            Call::Unknown => NodeKind::Unknown,
        };

        let mut node = Node::new(kind);
        node.label = first.filter(|label| !label.is_empty());

        if self.tok.is_punct('{') {
            if self.depth >= MAX_NESTING_DEPTH {
                self.error("Nesting too deep");
                self.skip_block();
            } else {
                self.advance();
                self.depth += 1;
                self.block(&mut node);
                self.depth -= 1;
            }
        }

        current.children.push(node);
    }

    /// Collect arguments up to and including `)`. Non-string arguments are
    /// kept as `None` placeholders.
    fn arguments(&mut self) -> Vec<Option<String>> {
        let mut args = Vec::new();
        while !self.tok.is_eof() && !self.tok.is_punct(')') {
            match self.tok.kind {
                TokenKind::Str => args.push(Some(std::mem::take(&mut self.tok.text))),
                TokenKind::Punct if self.tok.is_punct(',') => {}
                _ => args.push(None),
            }
            self.advance();
        }

        if self.tok.is_punct(')') {
            self.advance();
        } else {
            self.error("Expected ')'");
        }
        args
    }

    /// Skip from `{` past its matching `}` (or to end of input) without
    /// building nodes.
    fn skip_block(&mut self) {
        let mut open = 0usize;
        while !self.tok.is_eof() {
            if self.tok.is_punct('{') {
                open += 1;
            } else if self.tok.is_punct('}') {
                open -= 1;
                if open == 0 {
                    self.advance();
                    return;
                }
            }
            self.advance();
        }
    }

    /// Parse nested calls after `{` until the matching `}`.
    fn block(&mut self, node: &mut Node) {
        while !self.tok.is_eof() && !self.tok.is_punct('}') {
            self.call(node);
            if self.tok.is_punct('}') {
                break;
            }
            if self.tok.kind != TokenKind::Ident {
                self.advance();
            }
        }

        if self.tok.is_punct('}') {
            self.advance();
        } else {
            self.error("Expected '}'");
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// NAPI EXPORTS
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(feature = "napi")]
#[napi]
pub fn parse_document_native(source: String) -> napi::Result<serde_json::Value> {
    serde_json::to_value(parse_document(&source)).map_err(|e| napi::Error::from_reason(e.to_string()))
}
