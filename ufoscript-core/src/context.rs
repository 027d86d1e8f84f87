//! Shared state for one parse run
//!
//! The context owns the token source and the diagnostics sink. It is handed
//! by `&mut` to whichever sub-parser currently holds control.

use crate::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, SourceLocation, Span};
use crate::lexer::{Lexer, Token, TokenKind, TokenSource};
use crate::registry::Registry;

pub struct ParserContext<'r, 'src> {
    registry: &'r Registry,
    tokens: Box<dyn TokenSource + 'src>,
    peeked: Option<Token>,
    diagnostics: Diagnostics,
    /// Brace nesting of everything consumed so far
    depth: usize,
    /// End of the last consumed token, used to place end-of-input errors
    last_span: Span,
    last_location: SourceLocation,
}

impl<'r, 'src> ParserContext<'r, 'src> {
    pub fn new(registry: &'r Registry, tokens: impl TokenSource + 'src) -> Self {
        Self {
            registry,
            tokens: Box::new(tokens),
            peeked: None,
            diagnostics: Diagnostics::new(),
            depth: 0,
            last_span: Span::new(0, 0),
            last_location: SourceLocation::new(1, 1),
        }
    }

    /// Context reading tokens straight from script text
    pub fn from_source(registry: &'r Registry, source: &'src str) -> Self {
        Self::new(registry, Lexer::new(source))
    }

    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    fn pull(&mut self) -> Option<Token> {
        let token = self.tokens.next_token();
        let lexed = self.tokens.take_diagnostics();
        self.diagnostics.extend(lexed);
        token
    }

    pub fn peek(&mut self) -> Option<&Token> {
        if self.peeked.is_none() {
            self.peeked = self.pull();
        }
        self.peeked.as_ref()
    }

    pub fn peek_kind(&mut self) -> Option<TokenKind> {
        self.peek().map(|t| t.kind)
    }

    pub fn at(&mut self, kind: TokenKind) -> bool {
        self.peek_kind() == Some(kind)
    }

    pub fn at_end(&mut self) -> bool {
        self.peek().is_none()
    }

    /// Consume the next token, keeping brace depth up to date
    pub fn next_token(&mut self) -> Option<Token> {
        let token = match self.peeked.take() {
            Some(token) => Some(token),
            None => self.pull(),
        }?;
        match token.kind {
            TokenKind::LBrace => self.depth += 1,
            TokenKind::RBrace => self.depth = self.depth.saturating_sub(1),
            _ => {}
        }
        self.last_span = token.span;
        self.last_location = token.location;
        Some(token)
    }

    /// Consume the next token only if it has the given kind
    pub fn eat(&mut self, kind: TokenKind) -> Option<Token> {
        if self.at(kind) {
            self.next_token()
        } else {
            None
        }
    }

    pub fn last_span(&self) -> Span {
        self.last_span
    }

    pub fn report(&mut self, diagnostic: Diagnostic) {
        tracing::debug!(kind = diagnostic.kind.code(), "{}", diagnostic.message);
        self.diagnostics.push(diagnostic);
    }

    pub fn report_at(&mut self, kind: DiagnosticKind, message: impl Into<String>, token: &Token) {
        self.report(Diagnostic::new(kind, message).at(token.span, token.location));
    }

    /// Report a problem at the end of the last consumed token
    pub fn report_at_end(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        let end = self.last_span.end;
        let mut location = self.last_location;
        location.column += self.last_span.len();
        self.report(Diagnostic::new(kind, message).at(Span::new(end, end), location));
    }

    /// Consume tokens until the block opened at `body_depth` is closed.
    ///
    /// `body_depth` is the depth right after that block's `{`. Returns false
    /// when input ends first.
    pub fn skip_to_close(&mut self, body_depth: usize) -> bool {
        while self.depth >= body_depth && body_depth > 0 {
            if self.next_token().is_none() {
                return false;
            }
        }
        true
    }

    /// Consume a `{ ... }` group starting at the next token
    pub fn skip_group(&mut self) -> bool {
        if self.eat(TokenKind::LBrace).is_none() {
            return true;
        }
        let body_depth = self.depth;
        self.skip_to_close(body_depth)
    }

    /// Hand back the diagnostics collected during the run
    pub fn finish(mut self) -> Diagnostics {
        let lexed = self.tokens.take_diagnostics();
        self.diagnostics.extend(lexed);
        self.diagnostics
    }
}
