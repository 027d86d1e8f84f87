use crate::diagnostics::{Diagnostics, Span};
use glam::{Vec2, Vec3, Vec4};
use serde::Serialize;
use std::fmt;

/// A typed field value inside a block body
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    Int(i64),
    Float(f32),
    Bool(bool),
    String(String),
    /// Quoted text marked for translation with a leading `_`
    Translation(String),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    /// `{ a b c }`
    List(Vec<String>),
    /// Several values given on one entry, e.g. `item plasma_ammo 2 %`
    Record(Vec<Value>),
}

impl Value {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Int(v) => Some(*v as f32),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) | Self::Translation(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }
}

/// Renders the value back in script syntax
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::Bool(v) => write!(f, "{}", v),
            Self::String(s) => write_word(f, s),
            Self::Translation(s) => write_quoted(f, &format!("_{}", s)),
            Self::Vec2(v) => write!(f, "\"{} {}\"", v.x, v.y),
            Self::Vec3(v) => write!(f, "\"{} {} {}\"", v.x, v.y, v.z),
            Self::Vec4(v) => write!(f, "\"{} {} {} {}\"", v.x, v.y, v.z, v.w),
            Self::List(items) => {
                f.write_str("{")?;
                for item in items {
                    f.write_str(" ")?;
                    write_word(f, item)?;
                }
                f.write_str(" }")
            }
            Self::Record(parts) => {
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}", part)?;
                }
                Ok(())
            }
        }
    }
}

/// Bare word when it would lex back as one token, quoted otherwise
fn write_word(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    let needs_quotes = s.is_empty()
        || s.contains("//")
        || s.contains("/*")
        || s
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '{' | '}' | '(' | ')' | '"' | '\\'));
    if needs_quotes {
        write_quoted(f, s)
    } else {
        f.write_str(s)
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_str("\"")?;
    for c in s.chars() {
        if matches!(c, '"' | '\\') {
            f.write_str("\\")?;
        }
        write!(f, "{}", c)?;
    }
    f.write_str("\"")
}

/// `key value...` entry of a block body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub key: String,
    pub value: Value,
    pub span: Span,
}

/// Successfully parsed block
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockResult {
    pub keyword: String,
    pub name: Option<String>,
    pub fields: Vec<Field>,
    /// From the keyword through the closing brace
    pub span: Span,
}

impl BlockResult {
    pub fn new(keyword: impl Into<String>, name: Option<String>, span: Span) -> Self {
        Self {
            keyword: keyword.into(),
            name,
            fields: Vec::new(),
            span,
        }
    }

    /// First value recorded under `key`
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.iter().find(|f| f.key == key).map(|f| &f.value)
    }

    /// Every value recorded under `key`, in source order
    pub fn fields_named<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a Value> + 'a {
        self.fields.iter().filter(move |f| f.key == key).map(|f| &f.value)
    }
}

/// Block whose body could not be parsed; see the diagnostics for why
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedBlock {
    pub keyword: String,
    pub name: Option<String>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum BlockOutcome {
    Parsed(BlockResult),
    Failed(FailedBlock),
}

impl BlockOutcome {
    pub fn keyword(&self) -> &str {
        match self {
            Self::Parsed(block) => &block.keyword,
            Self::Failed(block) => &block.keyword,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Parsed(block) => block.name.as_deref(),
            Self::Failed(block) => block.name.as_deref(),
        }
    }

    pub fn as_parsed(&self) -> Option<&BlockResult> {
        match self {
            Self::Parsed(block) => Some(block),
            Self::Failed(_) => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Everything one parse run produces, in source order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParseOutput {
    pub blocks: Vec<BlockOutcome>,
    pub diagnostics: Diagnostics,
}

impl ParseOutput {
    pub fn parsed(&self) -> impl Iterator<Item = &BlockResult> {
        self.blocks.iter().filter_map(BlockOutcome::as_parsed)
    }

    pub fn failed(&self) -> impl Iterator<Item = &BlockOutcome> {
        self.blocks.iter().filter(|b| b.is_failed())
    }

    /// First parsed block with this keyword and name
    pub fn find(&self, keyword: &str, name: Option<&str>) -> Option<&BlockResult> {
        self.parsed()
            .find(|b| b.keyword == keyword && b.name.as_deref() == name)
    }
}
