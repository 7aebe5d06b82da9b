//! Token cursor shared by the parser and the analyzer.
//!
//! The lexer is a plain cursor over immutable source text: it never looks
//! ahead more than the token it returns, and callers that need to remember a
//! previous token keep it themselves. Offsets are byte offsets into the source.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Ident,
    Str,
    Punct,
    Eof,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Identifier text, decoded string contents, or the punctuation character.
    pub text: String,
    pub start: usize,
    pub end: usize,
}

impl Token {
    pub fn is_punct(&self, c: char) -> bool {
        self.kind == TokenKind::Punct && self.text.starts_with(c) && self.text.len() == c.len_utf8()
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }
}

#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source, pos: 0 }
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Rewind to the start of the source.
    pub fn reset(&mut self) {
        self.pos = 0;
    }

    /// Return the next token. Past the end of input this keeps returning `Eof`.
    pub fn next_token(&mut self) -> Token {
        self.skip_trivia();

        let start = self.pos;
        let Some(c) = self.source[start..].chars().next() else {
            return Token {
                kind: TokenKind::Eof,
                text: String::new(),
                start,
                end: start,
            };
        };

        if c == '"' {
            return self.string(start);
        }

        if c.is_ascii_alphabetic() || c == '_' {
            let bytes = self.source.as_bytes();
            let mut end = start + 1;
            while end < bytes.len() && (bytes[end].is_ascii_alphanumeric() || bytes[end] == b'_') {
                end += 1;
            }
            self.pos = end;
            return Token {
                kind: TokenKind::Ident,
                text: self.source[start..end].to_string(),
                start,
                end,
            };
        }

        self.pos = start + c.len_utf8();
        Token {
            kind: TokenKind::Punct,
            text: c.to_string(),
            start,
            end: self.pos,
        }
    }

    /// Decode a double-quoted string starting at `start`. Only `\"` and `\\`
    /// are escapes; an unterminated string runs to the end of input.
    fn string(&mut self, start: usize) -> Token {
        let mut out = String::new();
        let mut chars = self.source[start + 1..].char_indices().peekable();
        let mut end = self.source.len();

        while let Some((offset, c)) = chars.next() {
            match c {
                '"' => {
                    end = start + 1 + offset + 1;
                    break;
                }
                '\\' => match chars.peek() {
                    Some(&(_, next)) if next == '"' || next == '\\' => {
                        out.push(next);
                        chars.next();
                    }
                    _ => out.push(c),
                },
                _ => out.push(c),
            }
        }

        self.pos = end;
        Token {
            kind: TokenKind::Str,
            text: out,
            start,
            end,
        }
    }

    fn skip_trivia(&mut self) {
        let bytes = self.source.as_bytes();
        while self.pos < bytes.len() {
            match bytes[self.pos] {
                b' ' | b'\t' | b'\r' | b'\n' => self.pos += 1,
                b'/' if bytes.get(self.pos + 1) == Some(&b'/') => {
                    self.pos += 2;
                    while self.pos < bytes.len() && bytes[self.pos] != b'\n' {
                        self.pos += 1;
                    }
                }
                _ => break,
            }
        }
    }
}
