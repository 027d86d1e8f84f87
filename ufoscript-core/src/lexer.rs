//! Tokenizer for UFO script text
//!
//! Tokens are separated by whitespace. `{ } ( )` always stand alone,
//! `"..."` is one string token, and `//` / `/* */` comments are skipped.

use crate::diagnostics::{Diagnostic, DiagnosticKind, SourceLocation, Span};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Ident,
    Number,
    Str,
    LBrace,
    RBrace,
    LParen,
    RParen,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    /// Token text; for strings, the content without quotes
    pub text: String,
    pub span: Span,
    pub location: SourceLocation,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, span: Span, location: SourceLocation) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
            location,
        }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    /// Tokens that may name a block or serve as a field key
    pub fn is_word(&self) -> bool {
        matches!(self.kind, TokenKind::Ident | TokenKind::Str)
    }

    /// Human readable form for messages
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Str => format!("string \"{}\"", self.text),
            TokenKind::Number => format!("number '{}'", self.text),
            _ => format!("'{}'", self.text),
        }
    }
}

/// Lazy token source over a script
pub struct Lexer<'src> {
    source: &'src str,
    pos: usize,
    line: usize,
    column: usize,
    diagnostics: Vec<Diagnostic>,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            pos: 0,
            line: 1,
            column: 1,
            diagnostics: Vec::new(),
        }
    }

    /// Take the diagnostics produced so far
    pub fn drain_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    fn peek_char(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        let mut chars = self.source[self.pos..].chars();
        chars.next();
        chars.next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek_char()?;
        self.pos += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }

    /// Skip whitespace and comments; false once input is exhausted
    fn skip_trivia(&mut self) -> bool {
        loop {
            match (self.peek_char(), self.peek_second()) {
                (None, _) => return false,
                (Some(c), _) if c.is_whitespace() => {
                    self.bump();
                }
                (Some('/'), Some('/')) => {
                    while let Some(c) = self.bump() {
                        if c == '\n' {
                            break;
                        }
                    }
                }
                (Some('/'), Some('*')) => {
                    let start = self.pos;
                    let location = self.location();
                    self.bump();
                    self.bump();
                    let mut closed = false;
                    while let Some(c) = self.bump() {
                        if c == '*' && self.peek_char() == Some('/') {
                            self.bump();
                            closed = true;
                            break;
                        }
                    }
                    if !closed {
                        self.diagnostics.push(
                            Diagnostic::new(
                                DiagnosticKind::UnterminatedComment,
                                "block comment is never closed",
                            )
                            .at(Span::new(start, self.pos), location),
                        );
                        return false;
                    }
                }
                _ => return true,
            }
        }
    }

    fn lex_string(&mut self, start: usize, location: SourceLocation) -> Token {
        self.bump();
        let mut text = String::new();
        loop {
            match self.bump() {
                Some('"') => break,
                Some('\\') => match self.peek_char() {
                    Some(c @ ('"' | '\\')) => {
                        self.bump();
                        text.push(c);
                    }
                    _ => text.push('\\'),
                },
                Some(c) => text.push(c),
                None => {
                    self.diagnostics.push(
                        Diagnostic::new(DiagnosticKind::UnterminatedString, "string is never closed")
                            .at(Span::new(start, self.pos), location),
                    );
                    break;
                }
            }
        }
        Token::new(TokenKind::Str, text, Span::new(start, self.pos), location)
    }

    fn lex_word(&mut self, start: usize, location: SourceLocation) -> Token {
        while let Some(c) = self.peek_char() {
            if c.is_whitespace() || is_punct(c) || c == '"' {
                break;
            }
            if c == '/' && matches!(self.peek_second(), Some('/' | '*')) {
                break;
            }
            self.bump();
        }
        let text = &self.source[start..self.pos];
        let kind = if looks_numeric(text) && text.parse::<f64>().is_ok() {
            TokenKind::Number
        } else {
            TokenKind::Ident
        };
        Token::new(kind, text, Span::new(start, self.pos), location)
    }
}

// Rules out `inf`/`nan` and their signed forms, which `f64::from_str` accepts
fn looks_numeric(text: &str) -> bool {
    let unsigned = text.strip_prefix(|c: char| matches!(c, '-' | '+')).unwrap_or(text);
    unsigned.starts_with(|c: char| c.is_ascii_digit() || c == '.')
}

fn is_punct(c: char) -> bool {
    matches!(c, '{' | '}' | '(' | ')')
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if !self.skip_trivia() {
            return None;
        }
        let start = self.pos;
        let location = self.location();
        let ch = self.peek_char()?;

        let kind = match ch {
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '"' => return Some(self.lex_string(start, location)),
            _ => return Some(self.lex_word(start, location)),
        };
        self.bump();
        Some(Token::new(kind, ch.to_string(), Span::new(start, self.pos), location))
    }
}

/// Anything that can feed tokens to the parser
pub trait TokenSource {
    fn next_token(&mut self) -> Option<Token>;

    /// Problems found while producing tokens since the last call
    fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        Vec::new()
    }
}

impl TokenSource for Lexer<'_> {
    fn next_token(&mut self) -> Option<Token> {
        self.next()
    }

    fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        self.drain_diagnostics()
    }
}

/// Pre-lexed tokens
impl TokenSource for std::vec::IntoIter<Token> {
    fn next_token(&mut self) -> Option<Token> {
        self.next()
    }
}

/// Tokenize a whole script, returning tokens and lexer diagnostics
pub fn tokenize(source: &str) -> (Vec<Token>, Vec<Diagnostic>) {
    let mut lexer = Lexer::new(source);
    let tokens: Vec<Token> = lexer.by_ref().collect();
    (tokens, lexer.drain_diagnostics())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).0.into_iter().map(|t| t.kind).collect()
    }

    fn texts(source: &str) -> Vec<String> {
        tokenize(source).0.into_iter().map(|t| t.text).collect()
    }

    #[test]
    fn test_block_header() {
        assert_eq!(
            kinds("physics soldier1 { }"),
            vec![TokenKind::Ident, TokenKind::Ident, TokenKind::LBrace, TokenKind::RBrace]
        );
    }

    #[test]
    fn test_braces_split_words() {
        assert_eq!(texts("physics{a}"), vec!["physics", "{", "a", "}"]);
    }

    #[test]
    fn test_numbers_and_idents() {
        let (tokens, _) = tokenize("time 12 rate -0.5 nan");
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Ident,
                TokenKind::Number,
                TokenKind::Ident,
                TokenKind::Number,
                TokenKind::Ident
            ]
        );
    }

    #[test]
    fn test_signed_non_finite_words_are_idents() {
        let (tokens, _) = tokenize("-inf +nan -infinity +3 -.5");
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Ident,
                TokenKind::Ident,
                TokenKind::Ident,
                TokenKind::Number,
                TokenKind::Number
            ]
        );
    }

    #[test]
    fn test_quoted_string() {
        let (tokens, diags) = tokenize(r#"name "_Laser \"Rifle\"""#);
        assert!(diags.is_empty());
        assert_eq!(tokens[1].kind, TokenKind::Str);
        assert_eq!(tokens[1].text, "_Laser \"Rifle\"");
    }

    #[test]
    fn test_comments_are_skipped() {
        let source = "// header\nphysics /* inline */ a { } // trailing";
        assert_eq!(texts(source), vec!["physics", "a", "{", "}"]);
    }

    #[test]
    fn test_locations_are_one_based() {
        let (tokens, _) = tokenize("physics\n  a {");
        assert_eq!(tokens[0].location, SourceLocation::new(1, 1));
        assert_eq!(tokens[1].location, SourceLocation::new(2, 3));
        assert_eq!(tokens[2].span, Span::new(12, 13));
    }

    #[test]
    fn test_unterminated_string() {
        let (tokens, diags) = tokenize("name \"open");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1].text, "open");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::UnterminatedString);
    }

    #[test]
    fn test_unterminated_comment() {
        let (tokens, diags) = tokenize("physics a /* never closed {");
        assert_eq!(tokens.len(), 2);
        assert_eq!(diags[0].kind, DiagnosticKind::UnterminatedComment);
    }
}
