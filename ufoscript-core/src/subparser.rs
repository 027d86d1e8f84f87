//! Sub-parsers: one instance per block occurrence
//!
//! A [`SubParser`] is created by a [`BlockKind`](crate::registry::BlockKind)
//! once the dispatcher has consumed the block header and its opening brace.
//! The grammar of the body is a [`BlockBody`] strategy stored on the kind.

use crate::ast::{BlockOutcome, BlockResult, FailedBlock};
use crate::context::ParserContext;
use crate::diagnostics::{Diagnostic, DiagnosticKind, SourceLocation, Span};
use crate::lexer::Token;
use std::fmt;

/// Keyword, optional name and start of a block, as read by the dispatcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockHeader {
    pub keyword: String,
    pub name: Option<String>,
    pub span: Span,
}

/// Why a body grammar gave up
#[derive(Debug, Clone, PartialEq)]
pub enum BodyError {
    Malformed {
        message: String,
        span: Option<Span>,
        location: Option<SourceLocation>,
    },
    /// Input ended before the closing brace
    UnexpectedEof,
}

impl BodyError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
            span: None,
            location: None,
        }
    }

    pub fn malformed_at(token: &Token, message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
            span: Some(token.span),
            location: Some(token.location),
        }
    }
}

/// Grammar of one block kind's body.
///
/// `parse_body` is called with the opening `{` already consumed and must
/// consume everything up to and including the matching `}`. The default
/// implementation accepts any balanced content and records no fields.
pub trait BlockBody: fmt::Debug + Send + Sync {
    fn parse_body(
        &self,
        ctx: &mut ParserContext<'_, '_>,
        _block: &mut BlockResult,
    ) -> Result<(), BodyError> {
        let body_depth = ctx.depth();
        if ctx.skip_to_close(body_depth) {
            Ok(())
        } else {
            Err(BodyError::UnexpectedEof)
        }
    }
}

/// Body that is accepted as-is without field parsing
#[derive(Debug, Clone, Copy, Default)]
pub struct Unstructured;

impl BlockBody for Unstructured {}

/// Parses exactly one block body, then is discarded
pub struct SubParser<'c, 'r, 'src> {
    ctx: &'c mut ParserContext<'r, 'src>,
    body: &'c dyn BlockBody,
}

impl<'c, 'r, 'src> SubParser<'c, 'r, 'src> {
    pub(crate) fn new(ctx: &'c mut ParserContext<'r, 'src>, body: &'c dyn BlockBody) -> Self {
        Self { ctx, body }
    }

    /// Run the body grammar. Problems are reported to the context and turn
    /// the outcome into [`BlockOutcome::Failed`]; the token source is left
    /// right after the block's closing brace either way.
    pub fn parse(self, header: BlockHeader) -> BlockOutcome {
        let Self { ctx, body } = self;
        let body_depth = ctx.depth();
        let mut block = BlockResult::new(header.keyword, header.name, header.span);

        let result = body.parse_body(ctx, &mut block);
        if result.is_ok() && ctx.depth() >= body_depth {
            // Body grammar returned early; drop what it left behind.
            if !ctx.skip_to_close(body_depth) {
                return eof(ctx, block);
            }
        }

        match result {
            Ok(()) => {
                block.span.end = ctx.last_span().end;
                BlockOutcome::Parsed(block)
            }
            Err(BodyError::Malformed {
                message,
                span,
                location,
            }) => {
                let mut diagnostic = Diagnostic::new(
                    DiagnosticKind::MalformedBody,
                    format!("in '{}' block: {}", block.keyword, message),
                );
                if let (Some(span), Some(location)) = (span, location) {
                    diagnostic = diagnostic.at(span, location);
                }
                ctx.report(diagnostic);
                if !ctx.skip_to_close(body_depth) {
                    return eof(ctx, block);
                }
                failed(ctx, block)
            }
            Err(BodyError::UnexpectedEof) => eof(ctx, block),
        }
    }
}

fn failed(ctx: &ParserContext<'_, '_>, block: BlockResult) -> BlockOutcome {
    BlockOutcome::Failed(FailedBlock {
        keyword: block.keyword,
        name: block.name,
        span: Span::new(block.span.start, ctx.last_span().end),
    })
}

fn eof(ctx: &mut ParserContext<'_, '_>, block: BlockResult) -> BlockOutcome {
    ctx.report_at_end(
        DiagnosticKind::UnexpectedEof,
        format!("input ended inside '{}' block", block.keyword),
    );
    failed(ctx, block)
}
