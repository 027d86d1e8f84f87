//! Block dispatcher
//!
//! A script is a flat sequence of `keyword [name] { body }` blocks. The
//! dispatcher reads each keyword, looks its kind up in the [`Registry`],
//! reads the name when the kind asks for one, and hands the body to a fresh
//! sub-parser. Bad input is reported and skipped; parsing always reaches the
//! end of the token stream.

use crate::ast::{BlockOutcome, FailedBlock, ParseOutput};
use crate::context::ParserContext;
use crate::diagnostics::{DiagnosticKind, Span};
use crate::lexer::{Token, TokenKind};
use crate::registry::{BlockKind, Registry};
use crate::subparser::BlockHeader;

/// Parse script text with the given block kinds
#[tracing::instrument(skip_all, fields(source_len = source.len()))]
pub fn parse_script(source: &str, registry: &Registry) -> ParseOutput {
    parse_with_context(ParserContext::from_source(registry, source))
}

/// Parse tokens produced by some other token source
#[tracing::instrument(skip_all, fields(token_count = tokens.len()))]
pub fn parse_tokens(tokens: Vec<Token>, registry: &Registry) -> ParseOutput {
    parse_with_context(ParserContext::new(registry, tokens.into_iter()))
}

/// Drive a prepared context to the end of its input
pub fn parse_with_context(mut ctx: ParserContext<'_, '_>) -> ParseOutput {
    let mut blocks = Vec::new();

    while let Some(token) = ctx.peek().cloned() {
        if !token.is(TokenKind::Ident) {
            skip_stray(&mut ctx);
            continue;
        }
        ctx.next_token();

        let registry = ctx.registry();
        match registry.lookup(&token.text) {
            Some(kind) => blocks.push(dispatch(&mut ctx, kind, token)),
            None => {
                ctx.report_at(
                    DiagnosticKind::UnknownKeyword,
                    format!("unknown block keyword '{}'", token.text),
                    &token,
                );
                skip_unknown_block(&mut ctx);
            }
        }
    }

    let diagnostics = ctx.finish();
    tracing::debug!(
        blocks = blocks.len(),
        diagnostics = diagnostics.len(),
        "parse finished"
    );
    ParseOutput {
        blocks,
        diagnostics,
    }
}

fn dispatch(ctx: &mut ParserContext<'_, '_>, kind: &BlockKind, keyword: Token) -> BlockOutcome {
    let name = if kind.is_id_name() { read_name(ctx, &keyword) } else { None };

    if ctx.eat(TokenKind::LBrace).is_none() {
        let message = format!("'{}' block has no '{{' body", keyword.text);
        match ctx.peek().cloned() {
            Some(next) => ctx.report_at(
                DiagnosticKind::MissingBody,
                format!("{}, found {}", message, next.describe()),
                &next,
            ),
            None => ctx.report_at_end(DiagnosticKind::MissingBody, message),
        }
        return BlockOutcome::Failed(FailedBlock {
            keyword: keyword.text,
            name,
            span: Span::new(keyword.span.start, ctx.last_span().end),
        });
    }

    tracing::debug!(keyword = %keyword.text, name = ?name, "dispatching block");
    let header = BlockHeader {
        keyword: keyword.text,
        name,
        span: Span::new(keyword.span.start, ctx.last_span().end),
    };
    kind.create(ctx).parse(header)
}

/// Name token after the keyword of a named kind. A missing or malformed name
/// is reported and the block continues unnamed; a malformed name token is
/// consumed, a brace is left for the body.
fn read_name(ctx: &mut ParserContext<'_, '_>, keyword: &Token) -> Option<String> {
    match ctx.peek().cloned() {
        Some(token) if token.is_word() => ctx.next_token().map(|t| t.text),
        Some(token) => {
            if !matches!(token.kind, TokenKind::LBrace | TokenKind::RBrace) {
                ctx.next_token();
            }
            ctx.report_at(
                DiagnosticKind::MissingName,
                format!(
                    "'{}' block needs a name, found {}",
                    keyword.text,
                    token.describe()
                ),
                &token,
            );
            None
        }
        None => {
            ctx.report_at_end(
                DiagnosticKind::MissingName,
                format!("'{}' block needs a name", keyword.text),
            );
            None
        }
    }
}

/// Skip `[name] { ... }` after an unregistered keyword. A registered
/// keyword is never taken for the name.
fn skip_unknown_block(ctx: &mut ParserContext<'_, '_>) {
    let registry = ctx.registry();
    let takes_name = match ctx.peek() {
        Some(token) if token.is(TokenKind::Ident) => registry.lookup(&token.text).is_none(),
        Some(token) => matches!(token.kind, TokenKind::Str | TokenKind::Number),
        None => false,
    };
    if takes_name {
        ctx.next_token();
    }
    if ctx.at(TokenKind::LBrace) && !ctx.skip_group() {
        ctx.report_at_end(
            DiagnosticKind::UnexpectedEof,
            "input ended inside an unknown block",
        );
    }
}

/// Recover from a token that cannot start a block: report it once, then skip
/// up to the next identifier or past the next `{ ... }` group
fn skip_stray(ctx: &mut ParserContext<'_, '_>) {
    let Some(first) = ctx.next_token() else {
        return;
    };
    ctx.report_at(
        DiagnosticKind::UnexpectedToken,
        format!("expected a block keyword, found {}", first.describe()),
        &first,
    );

    if first.is(TokenKind::LBrace) {
        let body_depth = ctx.depth();
        if !ctx.skip_to_close(body_depth) {
            ctx.report_at_end(DiagnosticKind::UnexpectedEof, "input ended inside a '{' group");
        }
        return;
    }

    loop {
        match ctx.peek_kind() {
            None | Some(TokenKind::Ident) => return,
            Some(TokenKind::LBrace) => {
                if !ctx.skip_group() {
                    ctx.report_at_end(DiagnosticKind::UnexpectedEof, "input ended inside a '{' group");
                }
                return;
            }
            Some(_) => {
                ctx.next_token();
            }
        }
    }
}
