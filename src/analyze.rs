//! Diagnostic walk over the DSL.
//!
//! Independent from [`crate::parse`]: it keeps only a brace counter and a
//! stack of enclosing component kinds, and records exact byte ranges so the
//! linter can point at calls and their arguments even in documents the parser
//! would misshape.

#[cfg(feature = "napi")]
use napi_derive::napi;
use serde::{Deserialize, Serialize};

use crate::ast::{node_kind_for_call, resolve_call, Call, NodeKind, PropertyCall, CALL_PREFIX};
use crate::lexer::{Lexer, Token, TokenKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByteRange {
    pub start: usize,
    pub end: usize,
}

impl ByteRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Clamp both ends into `0..=len`.
    pub fn clamp(self, len: usize) -> Self {
        Self {
            start: self.start.min(len),
            end: self.end.min(len),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropUsage {
    pub name: PropertyCall,
    pub value: Option<String>,
    pub value_range: Option<ByteRange>,
    pub call_range: ByteRange,
    pub in_component: NodeKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnknownCall {
    pub name: String,
    pub range: ByteRange,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub props: Vec<PropUsage>,
    pub unknown_calls: Vec<UnknownCall>,
    /// Opened minus closed braces; zero when balanced.
    pub brace_delta: i64,
}

pub fn analyze(source: &str) -> Analysis {
    let mut lexer = Lexer::new(source);
    let mut analysis = Analysis::default();
    // Never popped below the implicit root.
    let mut stack: Vec<NodeKind> = vec![NodeKind::Container];
    // Kind of the call that immediately precedes a `{`, if any.
    let mut opening: Option<NodeKind> = None;

    let mut tok = lexer.next_token();
    while !tok.is_eof() {
        if tok.is_punct('{') {
            analysis.brace_delta += 1;
            let kind = opening
                .take()
                .unwrap_or_else(|| *stack.last().unwrap_or(&NodeKind::Unknown));
            stack.push(kind);
            tok = lexer.next_token();
            continue;
        }
        opening = None;

        if tok.is_punct('}') {
            analysis.brace_delta -= 1;
            if stack.len() > 1 {
                stack.pop();
            }
            tok = lexer.next_token();
            continue;
        }

        if tok.kind != TokenKind::Ident {
            tok = lexer.next_token();
            continue;
        }

        let name_tok = tok;
        tok = lexer.next_token();
        if !tok.is_punct('(') {
            continue;
        }

        let (close, first_string, next) = scan_arguments(&mut lexer);
        tok = next;
        let call_range = ByteRange::new(name_tok.start, close.end);

        if tok.is_punct(';') {
            tok = lexer.next_token();
        }

        let in_component = *stack.last().unwrap_or(&NodeKind::Unknown);
        let name = name_tok.text;

        match resolve_call(&name) {
            Call::Property(prop) => {
                analysis.props.push(PropUsage {
                    name: prop,
                    value_range: first_string.as_ref().map(|s| ByteRange::new(s.start, s.end)),
                    value: first_string.map(|s| s.text),
                    call_range,
                    in_component,
                });
                continue;
            }
            Call::Unknown if name.starts_with(CALL_PREFIX) => {
                analysis.unknown_calls.push(UnknownCall {
                    name: name.clone(),
                    range: call_range,
                });
            }
            _ => {}
        }

        if tok.is_punct('{') {
            opening = Some(node_kind_for_call(&name));
        }
    }

    log::debug!(
        "analysis: {} prop usage(s), {} unknown call(s), brace delta {}",
        analysis.props.len(),
        analysis.unknown_calls.len(),
        analysis.brace_delta
    );

    analysis
}

/// Scan from just after `(` to the closing `)` or end of input.
/// Returns the closing token, the first string argument and the token after
/// the arguments.
fn scan_arguments(lexer: &mut Lexer<'_>) -> (Token, Option<Token>, Token) {
    let mut first_string = None;
    let mut tok = lexer.next_token();
    while !tok.is_eof() && !tok.is_punct(')') {
        if first_string.is_none() && tok.kind == TokenKind::Str {
            first_string = Some(tok);
        }
        tok = lexer.next_token();
    }

    if tok.is_punct(')') {
        let next = lexer.next_token();
        (tok, first_string, next)
    } else {
        (tok.clone(), first_string, tok)
    }
}

#[cfg(feature = "napi")]
#[napi]
pub fn analyze_native(source: String) -> napi::Result<serde_json::Value> {
    serde_json::to_value(analyze(&source)).map_err(|e| napi::Error::from_reason(e.to_string()))
}
