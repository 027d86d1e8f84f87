//! Table-driven body grammar
//!
//! Most script blocks are a flat list of `key value` entries where every key
//! comes from a fixed table. [`FieldTable`] parses such bodies into typed
//! [`Value`]s.

use crate::ast::{BlockResult, Field, Value};
use crate::context::ParserContext;
use crate::diagnostics::Span;
use crate::lexer::{Token, TokenKind};
use crate::subparser::{BlockBody, BodyError};
use glam::{Vec2, Vec3, Vec4};
use std::borrow::Cow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Int,
    Float,
    /// `true`, `false`, `1` or `0`
    Bool,
    String,
    /// String that may carry the `_` translation marker
    Translation,
    /// Quoted `"x y"`
    Vec2,
    /// Quoted `"x y z"`
    Vec3,
    /// Quoted `"r g b a"`
    Vec4,
    /// `{ a b c }`
    List,
    /// Several values in a row
    Record(&'static [ValueType]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub ty: ValueType,
    pub repeatable: bool,
}

impl FieldSpec {
    pub const fn new(name: &'static str, ty: ValueType) -> Self {
        Self {
            name,
            ty,
            repeatable: false,
        }
    }

    /// Allow the key to appear more than once in a body
    pub const fn repeatable(self) -> Self {
        Self {
            repeatable: true,
            ..self
        }
    }
}

/// Body made of entries whose keys come from a fixed table
#[derive(Debug, Clone)]
pub struct FieldTable {
    fields: Cow<'static, [FieldSpec]>,
}

impl FieldTable {
    pub const fn new(fields: &'static [FieldSpec]) -> Self {
        Self {
            fields: Cow::Borrowed(fields),
        }
    }

    pub fn from_vec(fields: Vec<FieldSpec>) -> Self {
        Self {
            fields: Cow::Owned(fields),
        }
    }

    pub fn spec(&self, key: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == key)
    }

    pub fn specs(&self) -> &[FieldSpec] {
        &self.fields
    }
}

impl BlockBody for FieldTable {
    fn parse_body(
        &self,
        ctx: &mut ParserContext<'_, '_>,
        block: &mut BlockResult,
    ) -> Result<(), BodyError> {
        loop {
            let key = ctx.next_token().ok_or(BodyError::UnexpectedEof)?;
            match key.kind {
                TokenKind::RBrace => return Ok(()),
                TokenKind::Ident | TokenKind::Str => {}
                _ => {
                    return Err(BodyError::malformed_at(
                        &key,
                        format!("expected a field name, found {}", key.describe()),
                    ))
                }
            }

            let spec = self.spec(&key.text).ok_or_else(|| {
                BodyError::malformed_at(&key, format!("unknown field '{}'", key.text))
            })?;
            if !spec.repeatable && block.field(spec.name).is_some() {
                return Err(BodyError::malformed_at(
                    &key,
                    format!("field '{}' is given more than once", spec.name),
                ));
            }

            let value = parse_value(ctx, spec.ty, &key)?;
            block.fields.push(Field {
                key: spec.name.to_string(),
                value,
                span: Span::new(key.span.start, ctx.last_span().end),
            });
        }
    }
}

/// Read one value of type `ty` for the field named by `key`
pub fn parse_value(
    ctx: &mut ParserContext<'_, '_>,
    ty: ValueType,
    key: &Token,
) -> Result<Value, BodyError> {
    match ty {
        ValueType::List => parse_list(ctx, key),
        ValueType::Record(parts) => parts
            .iter()
            .map(|part| parse_value(ctx, *part, key))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Record),
        scalar => {
            let token = expect_scalar(ctx, key)?;
            convert_scalar(scalar, &token, key)
        }
    }
}

fn expect_scalar(ctx: &mut ParserContext<'_, '_>, key: &Token) -> Result<Token, BodyError> {
    let next = ctx.peek().cloned().ok_or(BodyError::UnexpectedEof)?;
    match next.kind {
        TokenKind::Ident | TokenKind::Number | TokenKind::Str => {
            ctx.next_token().ok_or(BodyError::UnexpectedEof)
        }
        // Left in place so the closing brace still ends the block
        _ => Err(BodyError::malformed_at(
            &next,
            format!("expected a value for '{}', found {}", key.text, next.describe()),
        )),
    }
}

fn convert_scalar(ty: ValueType, token: &Token, key: &Token) -> Result<Value, BodyError> {
    let text = token.text.as_str();
    let bad = |what: &str| {
        BodyError::malformed_at(
            token,
            format!("'{}' expects {}, found {}", key.text, what, token.describe()),
        )
    };

    match ty {
        ValueType::Int => text.parse().map(Value::Int).map_err(|_| bad("an integer")),
        ValueType::Float => text
            .parse::<f32>()
            .ok()
            .filter(|v| v.is_finite())
            .map(Value::Float)
            .ok_or_else(|| bad("a number")),
        ValueType::Bool => match text {
            "true" | "1" => Ok(Value::Bool(true)),
            "false" | "0" => Ok(Value::Bool(false)),
            _ => Err(bad("true or false")),
        },
        ValueType::String => Ok(Value::String(text.to_string())),
        ValueType::Translation => Ok(match text.strip_prefix('_') {
            Some(rest) => Value::Translation(rest.to_string()),
            None => Value::String(text.to_string()),
        }),
        ValueType::Vec2 => floats::<2>(text)
            .map(|v| Value::Vec2(Vec2::from_array(v)))
            .ok_or_else(|| bad("two numbers")),
        ValueType::Vec3 => floats::<3>(text)
            .map(|v| Value::Vec3(Vec3::from_array(v)))
            .ok_or_else(|| bad("three numbers")),
        ValueType::Vec4 => floats::<4>(text)
            .map(|v| Value::Vec4(Vec4::from_array(v)))
            .ok_or_else(|| bad("four numbers")),
        ValueType::List | ValueType::Record(_) => Err(bad("a single value")),
    }
}

fn floats<const N: usize>(text: &str) -> Option<[f32; N]> {
    let mut out = [0.0; N];
    let mut parts = text.split_whitespace();
    for slot in out.iter_mut() {
        *slot = parts.next()?.parse().ok().filter(|v: &f32| v.is_finite())?;
    }
    if parts.next().is_some() {
        return None;
    }
    Some(out)
}

fn parse_list(ctx: &mut ParserContext<'_, '_>, key: &Token) -> Result<Value, BodyError> {
    let open = ctx.peek().cloned().ok_or(BodyError::UnexpectedEof)?;
    if !open.is(TokenKind::LBrace) {
        return Err(BodyError::malformed_at(
            &open,
            format!("'{}' expects a '{{ ... }}' list, found {}", key.text, open.describe()),
        ));
    }
    ctx.next_token();

    let mut items = Vec::new();
    loop {
        let token = ctx.next_token().ok_or(BodyError::UnexpectedEof)?;
        match token.kind {
            TokenKind::RBrace => return Ok(Value::List(items)),
            TokenKind::Ident | TokenKind::Number | TokenKind::Str => items.push(token.text),
            _ => {
                return Err(BodyError::malformed_at(
                    &token,
                    format!("unexpected {} in '{}' list", token.describe(), key.text),
                ))
            }
        }
    }
}
